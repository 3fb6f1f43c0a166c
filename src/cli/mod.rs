// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2:
//   1. `train`     — trains an rnn or transformer model
//   2. `translate` — loads the checkpoint and translates
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, TrainArgs, TranslateArgs};

#[derive(Parser, Debug)]
#[command(
    name = "enja-seq2seq",
    version = "0.1.0",
    about = "Train RNN-attention or Transformer English-Japanese translators, then translate."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the matching use case; the CLI never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)     => run_train(args),
            Commands::Translate(args) => run_translate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Training {:?} model on '{}'", args.model, args.data_dir);
    TrainUseCase::new(args.into()).execute()?;

    println!("Training complete. Checkpoint saved.");
    Ok(())
}

fn run_translate(args: TranslateArgs) -> Result<()> {
    use crate::application::translate_use_case::TranslateUseCase;

    let use_case = TranslateUseCase::new(&args.checkpoint_dir)?;
    let outputs  = use_case.translate_all(&args.sentences)?;
    for (source, output) in args.sentences.iter().zip(outputs) {
        println!("> {}", source);
        println!("< {}", output);
    }
    Ok(())
}

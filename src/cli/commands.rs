// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `translate`, and
// their flags. Defaults reproduce the reference runs:
//
//   train --model rnn           hidden 256, 20 epochs
//   train --model transformer   N=3, h=4, d_model=128, 30 epochs
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::train_use_case::TrainConfig;
use crate::domain::model_kind::ModelKind;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a translation model on a parallel corpus
    Train(TrainArgs),

    /// Translate sentences with a trained checkpoint
    Translate(TranslateArgs),
}

/// Architecture flag. Kept apart from the domain enum so the
/// domain layer does not depend on clap.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelArg {
    Rnn,
    Transformer,
}

impl From<ModelArg> for ModelKind {
    fn from(m: ModelArg) -> Self {
        match m {
            ModelArg::Rnn         => ModelKind::Rnn,
            ModelArg::Transformer => ModelKind::Transformer,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Which architecture to train
    #[arg(long, value_enum, default_value_t = ModelArg::Rnn)]
    pub model: ModelArg,

    /// Directory holding train.en/train.ja and test.en/test.ja
    #[arg(long, default_value = "data/small_parallel_enja")]
    pub data_dir: String,

    /// Directory for checkpoints, vocabularies and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Translate Japanese → English instead
    #[arg(long)]
    pub reverse: bool,

    /// Passes over the training data (default: 20 rnn, 30 transformer)
    #[arg(long)]
    pub epochs: Option<usize>,

    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    #[arg(long, default_value_t = 1234)]
    pub seed: u64,

    /// LSTM hidden size (rnn)
    #[arg(long, default_value_t = 256)]
    pub hidden_dim: usize,

    /// Probability that a training batch is teacher-forced (rnn)
    #[arg(long, default_value_t = 0.5)]
    pub teacher_forcing_rate: f64,

    /// Model width (transformer); must be divisible by num_heads
    #[arg(long, default_value_t = 128)]
    pub d_model: usize,

    #[arg(long, default_value_t = 4)]
    pub num_heads: usize,

    /// Encoder and decoder layers each (transformer)
    #[arg(long, default_value_t = 3)]
    pub num_layers: usize,

    /// Feed-forward inner size (transformer)
    #[arg(long, default_value_t = 128)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Positional table size (transformer)
    #[arg(long, default_value_t = 128)]
    pub max_positions: usize,

    /// Longest greedy output, in tokens
    #[arg(long, default_value_t = 20)]
    pub max_decode_len: usize,

    /// Per-language vocabulary cap, reserved tokens included
    #[arg(long, default_value_t = 20_000)]
    pub vocab_size: usize,

    /// Keep at most this many training pairs
    #[arg(long, default_value_t = 40_000)]
    pub train_limit: usize,

    /// Keep at most this many validation pairs
    #[arg(long, default_value_t = 200)]
    pub valid_limit: usize,

    /// Test pairs translated after each epoch
    #[arg(long, default_value_t = 10)]
    pub sample_count: usize,
}

/// CLI args → application config; the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        let kind     = ModelKind::from(a.model);
        let defaults = TrainConfig::for_model(kind);
        TrainConfig {
            model:                kind,
            data_dir:             a.data_dir,
            checkpoint_dir:       a.checkpoint_dir,
            reverse:              a.reverse,
            epochs:               a.epochs.unwrap_or(defaults.epochs),
            batch_size:           a.batch_size,
            lr:                   a.lr,
            seed:                 a.seed,
            hidden_dim:           a.hidden_dim,
            teacher_forcing_rate: a.teacher_forcing_rate,
            d_model:              a.d_model,
            num_heads:            a.num_heads,
            num_layers:           a.num_layers,
            d_ff:                 a.d_ff,
            dropout:              a.dropout,
            max_positions:        a.max_positions,
            max_decode_len:       a.max_decode_len,
            vocab_size:           a.vocab_size,
            train_limit:          Some(a.train_limit),
            valid_limit:          Some(a.valid_limit),
            sample_count:         a.sample_count,
        }
    }
}

#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// Sentences to translate; words separated by spaces
    #[arg(required = true)]
    pub sentences: Vec<String>,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn train_config(args: &[&str]) -> TrainConfig {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Train(a) => a.into(),
            other => panic!("expected train, got {other:?}"),
        }
    }

    #[test]
    fn test_epochs_default_per_model() {
        assert_eq!(train_config(&["enja", "train"]).epochs, 20);
        let t = train_config(&["enja", "train", "--model", "transformer"]);
        assert_eq!(t.model, ModelKind::Transformer);
        assert_eq!(t.epochs, 30);
        assert_eq!(train_config(&["enja", "train", "--epochs", "2"]).epochs, 2);
    }

    #[test]
    fn test_translate_requires_a_sentence() {
        assert!(Cli::try_parse_from(["enja", "translate"]).is_err());
        let cli = Cli::try_parse_from(["enja", "translate", "i am here ."]).unwrap();
        assert!(matches!(cli.command, Commands::Translate(a) if a.sentences.len() == 1));
    }
}

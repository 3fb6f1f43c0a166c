// ============================================================
// Layer 5 — Training Loop
// ============================================================
// One loop drives both architectures through the Seq2Seq trait.
//
// Per epoch:
//   1. train     — autodiff backend; masked loss, backward, Adam
//   2. validate  — model.valid() on the inner backend (dropout off),
//                  no teacher forcing
//   3. report    — epoch line, metrics.csv row, checkpoint
//   4. samples   — greedy translations of the first test pairs
//
// Batches come out of the loader in corpus order. The corpus is
// sorted by length, so not shuffling keeps every batch made of
// sentences of about the same length.
//
// The RNN flips a coin per batch (StdRng, seeded from the
// config): heads feeds the reference tokens, tails its own
// predictions. The Transformer always trains in parallel under
// its causal mask.
//
// `run_training` pins the loop to Wgpu; `train_loop` itself takes
// any autodiff backend.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    backend::{wgpu::WgpuDevice, Autodiff, Wgpu},
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    tensor::backend::AutodiffBackend,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::TranslationBatcher,
    dataset::{TranslationDataset, TranslationSample},
    vocab::Vocabulary,
};
use crate::domain::model_kind::ModelKind;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::{
    loss::{masked_cross_entropy, token_accuracy},
    rnn::EncoderDecoderConfig,
    seq2seq::{translate_ids, Seq2Seq},
    transformer::TransformerConfig,
};

pub type MyBackend      = Autodiff<Wgpu>;
pub type MyInnerBackend = Wgpu;

/// Everything the loop needs besides the config.
pub struct TrainingData {
    pub train:        TranslationDataset,
    pub valid:        TranslationDataset,
    /// Printed as sample translations after each epoch
    pub test:         Vec<TranslationSample>,
    pub source_vocab: Vocabulary,
    pub target_vocab: Vocabulary,
}

pub fn rnn_config(cfg: &TrainConfig, source_vocab: usize, target_vocab: usize) -> EncoderDecoderConfig {
    EncoderDecoderConfig::new(source_vocab, target_vocab).with_hidden_dim(cfg.hidden_dim)
}

pub fn transformer_config(cfg: &TrainConfig, source_vocab: usize, target_vocab: usize) -> TransformerConfig {
    TransformerConfig::new(source_vocab, target_vocab)
        .with_n_layers(cfg.num_layers)
        .with_n_heads(cfg.num_heads)
        .with_d_model(cfg.d_model)
        .with_d_ff(cfg.d_ff)
        .with_dropout(cfg.dropout)
        .with_max_len(cfg.max_positions)
}

pub fn run_training(cfg: &TrainConfig, data: TrainingData, ckpt_manager: CheckpointManager) -> Result<()> {
    let device = WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    MyBackend::seed(cfg.seed);

    let (src, tgt) = (data.source_vocab.size(), data.target_vocab.size());
    match cfg.model {
        ModelKind::Rnn => {
            let model = rnn_config(cfg, src, tgt).init::<MyBackend>(&device);
            train_loop(cfg, model, data, ckpt_manager, device)?;
        }
        ModelKind::Transformer => {
            let model_cfg = transformer_config(cfg, src, tgt);
            model_cfg.validate()?;
            let model = model_cfg.init::<MyBackend>(&device);
            train_loop(cfg, model, data, ckpt_manager, device)?;
        }
    }
    Ok(())
}

/// Train `model` for `cfg.epochs` epochs and return one metrics row per epoch.
pub fn train_loop<B, M>(
    cfg:          &TrainConfig,
    mut model:    M,
    data:         TrainingData,
    ckpt_manager: CheckpointManager,
    device:       B::Device,
) -> Result<Vec<EpochMetrics>>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Seq2Seq<B>,
    M::InnerModule: Seq2Seq<B::InnerBackend>,
{
    tracing::info!("{} model ready: {} parameters", cfg.model, model.num_params());

    let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g
    // v = β2*v + (1-β2)*g²
    // θ = θ - lr * m / (√v + ε)
    let mut optim = AdamConfig::new().init::<B, M>();

    let train_size   = data.train.sample_count();
    let train_loader = DataLoaderBuilder::new(TranslationBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(data.train);

    let valid_size   = data.valid.sample_count();
    let valid_loader = DataLoaderBuilder::new(TranslationBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(data.valid);

    let mut best_valid_loss = f64::INFINITY;
    let mut history = Vec::with_capacity(cfg.epochs);

    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        // Batch losses are per-sentence means; weight them back by
        // batch size so the epoch figure is a per-sentence mean too.
        let mut train_loss_sum = 0.0f64;

        for batch in train_loader.iter() {
            let rows = batch.source.dims()[0];
            let teacher_forcing = rng.gen_bool(cfg.teacher_forcing_rate);

            let logits = model.forward_logits(batch.source, batch.target_input, teacher_forcing);
            let loss   = masked_cross_entropy(logits, batch.target_output);
            train_loss_sum += loss.clone().into_scalar().elem::<f64>() * rows as f64;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(cfg.lr, model, grads);
        }
        let train_loss = train_loss_sum / train_size.max(1) as f64;

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();

        let mut valid_loss_sum = 0.0f64;
        let mut correct = 0usize;
        let mut total   = 0usize;

        for batch in valid_loader.iter() {
            let rows   = batch.source.dims()[0];
            let logits = model_valid.forward_logits(batch.source, batch.target_input, false);

            let loss: f64 = masked_cross_entropy(logits.clone(), batch.target_output.clone())
                .into_scalar()
                .elem::<f64>();
            valid_loss_sum += loss * rows as f64;

            let (c, t) = token_accuracy(logits, batch.target_output);
            correct += c;
            total   += t;
        }
        let valid_loss = valid_loss_sum / valid_size.max(1) as f64;
        let valid_acc  = if total > 0 { correct as f64 / total as f64 } else { 0.0 };

        println!(
            "Epoch {:>3}/{} | train_loss={:.3} | valid_loss={:.3} | valid_acc={:.1}%",
            epoch, cfg.epochs, train_loss, valid_loss, valid_acc * 100.0,
        );

        let row = EpochMetrics::new(epoch, train_loss, valid_loss, valid_acc);
        if row.is_improvement(best_valid_loss) {
            best_valid_loss = valid_loss;
            tracing::info!("New best validation loss {:.4} at epoch {}", valid_loss, epoch);
        }
        metrics.log(&row)?;
        history.push(row);

        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);

        // ── Sample translations ───────────────────────────────────────────────
        for sample in &data.test {
            let output = translate_ids::<B::InnerBackend, _>(
                &model_valid,
                &sample.source_ids,
                cfg.max_decode_len,
                &device,
            );
            println!("> {}", data.source_vocab.decode(&sample.source_ids));
            println!("= {}", data.target_vocab.decode(sample.reference_ids()));
            println!("< {}", data.target_vocab.decode(&output));
            println!();
        }
    }

    tracing::info!("Training complete! Metrics written to '{}'", metrics.csv_path().display());
    Ok(history)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::application::train_use_case::encode_pairs;
    use crate::domain::sentence_pair::SentencePair;
    use crate::infra::tokenizer_store::build_vocabulary;

    type TestBackend = Autodiff<NdArray>;

    fn tiny_data() -> TrainingData {
        let pairs = vec![
            SentencePair::new("i see .",      "見え る 。"),
            SentencePair::new("you see .",    "あなた は 見え る 。"),
            SentencePair::new("i run .",      "走る 。"),
            SentencePair::new("you run .",    "あなた は 走る 。"),
        ];
        let source_vocab = build_vocabulary(pairs.iter().map(|p| p.source.as_str()), 100).unwrap();
        let target_vocab = build_vocabulary(pairs.iter().map(|p| p.target.as_str()), 100).unwrap();
        let samples = encode_pairs(&pairs, &source_vocab, &target_vocab, 16).unwrap();
        TrainingData {
            train: TranslationDataset::new(samples.clone()),
            valid: TranslationDataset::new(samples[..2].to_vec()),
            test:  samples[..1].to_vec(),
            source_vocab,
            target_vocab,
        }
    }

    #[test]
    fn test_train_loop_lowers_loss_and_writes_artifacts() {
        let dir = std::env::temp_dir()
            .join(format!("enja-train-loop-{}", std::process::id()))
            .to_string_lossy()
            .to_string();
        let cfg = TrainConfig {
            model:                ModelKind::Rnn,
            checkpoint_dir:       dir.clone(),
            epochs:               4,
            batch_size:           2,
            lr:                   1e-2,
            hidden_dim:           8,
            teacher_forcing_rate: 1.0,
            max_decode_len:       5,
            ..TrainConfig::default()
        };
        let data   = tiny_data();
        let device = Default::default();
        let model  = rnn_config(&cfg, data.source_vocab.size(), data.target_vocab.size())
            .init::<TestBackend>(&device);
        let ckpt = CheckpointManager::new(&dir);

        let history = train_loop::<TestBackend, _>(&cfg, model, data, ckpt, device).unwrap();

        assert_eq!(history.len(), 4);
        assert!(history[3].train_loss < history[0].train_loss);

        let csv = std::fs::read_to_string(std::path::Path::new(&dir).join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 1 + 4);
        assert_eq!(CheckpointManager::new(&dir).latest_epoch().unwrap(), 4);
        std::fs::remove_dir_all(dir).ok();
    }
}

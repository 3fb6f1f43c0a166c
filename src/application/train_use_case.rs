// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load train + test splits     (Layer 4 - data)
//   Step 2: Split train/validation 80/20 (Layer 4 - data)
//   Step 3: Sort each split by length    (Layer 4 - data)
//   Step 4: Apply size limits            (Layer 2)
//   Step 5: Build both vocabularies      (Layer 6 - infra)
//   Step 6: Encode samples               (Layer 4 - data)
//   Step 7: Save config                  (Layer 6 - infra)
//   Step 8: Run training loop            (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::{TranslationDataset, TranslationSample},
    loader::{Direction, ParallelCorpusLoader},
    sorter::sort_by_length,
    splitter::split_train_val,
    vocab::Vocabulary,
};
use crate::domain::{
    model_kind::ModelKind,
    sentence_pair::SentencePair,
    traits::CorpusSource,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    tokenizer_store::{Side, TokenizerStore},
};
use crate::ml::trainer::{run_training, TrainingData};

// ─── Training Configuration ──────────────────────────────────────────────────
// Every hyperparameter of a run. Saved as train_config.json so
// `translate` can rebuild the exact architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub model:               ModelKind,
    pub data_dir:            String,
    pub checkpoint_dir:      String,
    /// false: English → Japanese, true: Japanese → English
    pub reverse:             bool,
    pub epochs:              usize,
    pub batch_size:          usize,
    pub lr:                  f64,
    pub seed:                u64,

    // RNN
    pub hidden_dim:          usize,
    pub teacher_forcing_rate: f64,

    // Transformer
    pub d_model:             usize,
    pub num_heads:           usize,
    pub num_layers:          usize,
    pub d_ff:                usize,
    pub dropout:             f64,
    /// Longest sequence the positional table covers
    pub max_positions:       usize,

    /// Greedy decoding length for sample translations and `translate`
    pub max_decode_len:      usize,
    pub vocab_size:          usize,
    pub train_limit:         Option<usize>,
    pub valid_limit:         Option<usize>,
    /// Test pairs translated and printed after each epoch
    pub sample_count:        usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model:               ModelKind::Rnn,
            data_dir:            "data/small_parallel_enja".to_string(),
            checkpoint_dir:      "checkpoints".to_string(),
            reverse:             false,
            epochs:              20,
            batch_size:          100,
            lr:                  1e-3,
            seed:                1234,
            hidden_dim:          256,
            teacher_forcing_rate: 0.5,
            d_model:             128,
            num_heads:           4,
            num_layers:          3,
            d_ff:                128,
            dropout:             0.1,
            max_positions:       128,
            max_decode_len:      20,
            vocab_size:          20_000,
            train_limit:         Some(40_000),
            valid_limit:         Some(200),
            sample_count:        10,
        }
    }
}

impl TrainConfig {
    /// Defaults for `kind`; the Transformer trains for 30 epochs.
    pub fn for_model(kind: ModelKind) -> Self {
        let epochs = match kind {
            ModelKind::Rnn         => 20,
            ModelKind::Transformer => 30,
        };
        Self { model: kind, epochs, ..Self::default() }
    }

    pub fn direction(&self) -> Direction {
        if self.reverse { Direction::JaToEn } else { Direction::EnToJa }
    }

    /// Checks that don't need the corpus. Model-shape checks live
    /// with the model configs.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.epochs == 0 {
            bail!("epochs must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.teacher_forcing_rate) {
            bail!("teacher_forcing_rate must be in [0, 1], got {}", self.teacher_forcing_rate);
        }
        if self.vocab_size <= crate::domain::special_tokens::NUM_SPECIAL {
            bail!("vocab_size must leave room for words beyond the reserved tokens");
        }
        if self.model == ModelKind::Transformer && self.max_decode_len >= self.max_positions {
            bail!(
                "max_decode_len ({}) must be smaller than max_positions ({})",
                self.max_decode_len, self.max_positions
            );
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load the corpus ───────────────────────────────────────────
        tracing::info!("Loading corpus from '{}' ({:?})", cfg.data_dir, cfg.direction());
        let train_pairs = ParallelCorpusLoader::new(&cfg.data_dir, "train", cfg.direction()).load_pairs()?;
        let test_pairs  = ParallelCorpusLoader::new(&cfg.data_dir, "test",  cfg.direction()).load_pairs()?;
        if train_pairs.is_empty() {
            bail!("Training split in '{}' has no usable sentence pairs", cfg.data_dir);
        }

        // ── Step 2: Train / validation split (80/20, no shuffle) ──────────────
        let (train_pairs, valid_pairs) = split_train_val(train_pairs, 0.8);

        // ── Step 3: Length bucketing ──────────────────────────────────────────
        // Neighbouring sentences have similar lengths, so each batch
        // carries little padding. The loaders don't shuffle.
        let train_pairs = sort_by_length(train_pairs);
        let valid_pairs = sort_by_length(valid_pairs);
        let test_pairs  = sort_by_length(test_pairs);

        // ── Step 4: Size limits ───────────────────────────────────────────────
        let train_pairs = truncate(train_pairs, cfg.train_limit);
        let valid_pairs = truncate(valid_pairs, cfg.valid_limit);
        let test_pairs  = truncate(test_pairs,  Some(cfg.sample_count));
        tracing::info!(
            "Split: {} train, {} validation, {} test samples",
            train_pairs.len(), valid_pairs.len(), test_pairs.len()
        );
        if valid_pairs.is_empty() {
            bail!("Validation split is empty; the corpus is too small");
        }

        // ── Step 5: Vocabularies (built from training data only) ──────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        let (source_vocab, target_vocab) = prepare_vocabularies(cfg, &train_pairs, &ckpt_manager)?;

        // ── Step 6: Encode ────────────────────────────────────────────────────
        let max_target = cfg.max_positions;
        let train = encode_pairs(&train_pairs, &source_vocab, &target_vocab, max_target)?;
        let valid = encode_pairs(&valid_pairs, &source_vocab, &target_vocab, max_target)?;
        let test  = encode_pairs(&test_pairs,  &source_vocab, &target_vocab, max_target)?;

        // ── Step 7: Save config for inference ─────────────────────────────────
        ckpt_manager.save_config(cfg)?;

        // ── Step 8: Run training loop (Layer 5) ───────────────────────────────
        let data = TrainingData {
            train:        TranslationDataset::new(train),
            valid:        TranslationDataset::new(valid),
            test,
            source_vocab,
            target_vocab,
        };
        run_training(cfg, data, ckpt_manager)
    }
}

/// True when vocabularies saved under `previous` were built from
/// different sentences than `cfg` would use.
fn vocabularies_stale(previous: &TrainConfig, cfg: &TrainConfig) -> bool {
    previous.reverse     != cfg.reverse
        || previous.vocab_size  != cfg.vocab_size
        || previous.data_dir    != cfg.data_dir
        || previous.train_limit != cfg.train_limit
}

/// Load the checkpoint dir's vocabularies, or build them from
/// `train_pairs`. Saved ones are only reused when the config
/// that produced them matches `cfg`.
pub fn prepare_vocabularies(
    cfg:          &TrainConfig,
    train_pairs:  &[SentencePair],
    ckpt_manager: &CheckpointManager,
) -> Result<(Vocabulary, Vocabulary)> {
    let store = TokenizerStore::new(&cfg.checkpoint_dir);

    let reusable = match ckpt_manager.load_config() {
        Ok(previous) => !vocabularies_stale(&previous, cfg),
        Err(_)       => false,
    };
    if !reusable {
        tracing::warn!("Saved vocabularies (if any) don't match this run; rebuilding");
        store.clear()?;
    }

    let source_vocab = store.load_or_build(
        Side::Source,
        train_pairs.iter().map(|p| p.source.as_str()),
        cfg.vocab_size,
    )?;
    let target_vocab = store.load_or_build(
        Side::Target,
        train_pairs.iter().map(|p| p.target.as_str()),
        cfg.vocab_size,
    )?;
    tracing::info!(
        "Vocabulary sizes: source={}, target={}",
        source_vocab.size(), target_vocab.size()
    );
    Ok((source_vocab, target_vocab))
}

fn truncate<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(n) = limit {
        items.truncate(n);
    }
    items
}

/// Tokenise pairs. Pairs whose sequences would not fit the
/// positional table (`<s>`/`</s>` included) are dropped.
pub fn encode_pairs(
    pairs:        &[SentencePair],
    source_vocab: &Vocabulary,
    target_vocab: &Vocabulary,
    max_len:      usize,
) -> Result<Vec<TranslationSample>> {
    let mut samples = Vec::with_capacity(pairs.len());
    let mut dropped = 0usize;

    for pair in pairs {
        let source_ids = source_vocab.encode(&pair.source)?;
        let target_ids = target_vocab.encode_target(&pair.target)?;
        // Decoder input is target_ids minus its last token
        if source_ids.len() > max_len || target_ids.len() - 1 > max_len {
            dropped += 1;
            continue;
        }
        samples.push(TranslationSample::new(source_ids, target_ids));
    }

    if dropped > 0 {
        tracing::warn!("Dropped {} pairs longer than {} tokens", dropped, max_len);
    }
    Ok(samples)
}

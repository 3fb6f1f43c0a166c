// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// File layout:
//   checkpoints/
//     model_epoch_1.mpk.gz   ← weights after epoch 1
//     model_epoch_2.mpk.gz
//     ...
//     latest_epoch.json      ← number of the newest epoch
//     train_config.json      ← TrainConfig (model kind + shapes)
//
// Weights alone are not enough to rebuild a model: `translate`
// reads train_config.json first to know whether to build an
// EncoderDecoder or a Transformer, and with which dimensions,
// then loads the record into it. Loading fails if the shapes
// don't match.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;

const LATEST_FILE: &str = "latest_epoch.json";
const CONFIG_FILE: &str = "train_config.json";

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", self.dir.display()))
    }

    /// Write `{dir}/model_epoch_{epoch}.mpk.gz` and point
    /// latest_epoch.json at it. Works for either architecture.
    pub fn save_model<B: Backend, M: Module<B>>(&self, model: &M, epoch: usize) -> Result<()> {
        self.ensure_dir()?;
        // The recorder appends the extension
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        let recorder = CompactRecorder::new();
        Recorder::<B>::record(&recorder, model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let latest_path = self.dir.join(LATEST_FILE);
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write {LATEST_FILE}"))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the newest checkpoint into `model`, which must have
    /// been built with the same config as the saved one.
    pub fn load_model<B: Backend, M: Module<B>>(&self, model: M, device: &B::Device) -> Result<M> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);
        let recorder = CompactRecorder::new();
        let record: M::Record = Recorder::<B>::load(&recorder, path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// Written once before training starts.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'translate'.",
                    path.display()
                )
            })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }

    /// Epoch number stored in latest_epoch.json.
    pub fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join(LATEST_FILE);
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot find '{LATEST_FILE}'. Have you run 'train' first?"))?;
        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::domain::model_kind::ModelKind;
    use crate::ml::rnn::{EncoderDecoder, EncoderDecoderConfig};

    type TB = NdArray;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("enja-ckpt-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_config_round_trip() {
        let dir  = scratch("config");
        let ckpt = CheckpointManager::new(dir.to_string_lossy());
        let cfg  = TrainConfig { model: ModelKind::Transformer, epochs: 3, ..TrainConfig::default() };

        ckpt.save_config(&cfg).unwrap();
        let back = ckpt.load_config().unwrap();
        assert_eq!(back.model, ModelKind::Transformer);
        assert_eq!(back.epochs, 3);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let ckpt = CheckpointManager::new(scratch("missing").to_string_lossy());
        assert!(ckpt.latest_epoch().is_err());
        assert!(ckpt.load_config().is_err());
    }

    #[test]
    fn test_weights_survive_save_and_load() {
        let dir    = scratch("weights");
        let ckpt   = CheckpointManager::new(dir.to_string_lossy());
        let device = Default::default();
        let config = EncoderDecoderConfig::new(6, 7).with_hidden_dim(4);

        let trained: EncoderDecoder<TB> = config.init(&device);
        ckpt.save_model(&trained, 2).unwrap();
        assert_eq!(ckpt.latest_epoch().unwrap(), 2);

        let fresh: EncoderDecoder<TB> = config.init(&device);
        let loaded = ckpt.load_model(fresh, &device).unwrap();

        let a = trained.decoder.output.weight.val();
        let b = loaded.decoder.output.weight.val();
        // CompactRecorder stores half precision
        let diff: f32 = (a - b).abs().max().into_scalar().elem();
        assert!(diff < 1e-2);
        fs::remove_dir_all(dir).ok();
    }
}

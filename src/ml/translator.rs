// ============================================================
// Layer 5 — Translator
// ============================================================
// Rebuilds a trained model from the checkpoint directory and
// greedy-translates free text:
//
//   train_config.json  → which architecture, which dimensions
//   tokenizer_*.json   → source / target vocabularies
//   model_epoch_N      → weights of the latest epoch
//
// Input is cleaned and lower-cased the way the corpus is;
// words the source vocabulary never saw become <unk>. A
// Transformer cannot read more tokens than its positional
// table has rows, so longer input is rejected with an error.

use anyhow::{bail, Result};
use burn::prelude::*;

use crate::data::{preprocessor::Preprocessor, vocab::Vocabulary};
use crate::domain::{model_kind::ModelKind, traits::Translator};
use crate::infra::{
    checkpoint::CheckpointManager,
    tokenizer_store::{Side, TokenizerStore},
};
use crate::ml::{
    rnn::EncoderDecoder,
    seq2seq::translate_ids,
    trainer::{rnn_config, transformer_config},
    transformer::Transformer,
};

/// Either architecture, loaded behind one type
pub enum LoadedModel<B: Backend> {
    Rnn(EncoderDecoder<B>),
    Transformer(Transformer<B>),
}

impl<B: Backend> LoadedModel<B> {
    fn greedy(&self, source_ids: &[u32], max_len: usize, device: &B::Device) -> Vec<u32> {
        match self {
            LoadedModel::Rnn(m)         => translate_ids(m, source_ids, max_len, device),
            LoadedModel::Transformer(m) => translate_ids(m, source_ids, max_len, device),
        }
    }

    /// Longest source the model can encode, if bounded
    fn max_source_len(&self) -> Option<usize> {
        match self {
            LoadedModel::Rnn(_)         => None,
            LoadedModel::Transformer(m) => Some(m.encoder.positional.max_len),
        }
    }
}

pub struct SentenceTranslator<B: Backend> {
    model:          LoadedModel<B>,
    source_vocab:   Vocabulary,
    target_vocab:   Vocabulary,
    preprocessor:   Preprocessor,
    max_decode_len: usize,
    device:         B::Device,
}

impl<B: Backend> SentenceTranslator<B> {
    pub fn from_checkpoint(checkpoint_dir: &str, device: B::Device) -> Result<Self> {
        let ckpt = CheckpointManager::new(checkpoint_dir);
        let cfg  = ckpt.load_config()?;

        let store        = TokenizerStore::new(checkpoint_dir);
        let source_vocab = store.load(Side::Source)?;
        let target_vocab = store.load(Side::Target)?;
        let (src, tgt)   = (source_vocab.size(), target_vocab.size());

        let model = match cfg.model {
            ModelKind::Rnn => {
                let model = rnn_config(&cfg, src, tgt).init::<B>(&device);
                LoadedModel::Rnn(ckpt.load_model(model, &device)?)
            }
            ModelKind::Transformer => {
                let model_cfg = transformer_config(&cfg, src, tgt);
                model_cfg.validate()?;
                let model = model_cfg.init::<B>(&device);
                LoadedModel::Transformer(ckpt.load_model(model, &device)?)
            }
        };
        tracing::info!("{} model loaded from '{}'", cfg.model, checkpoint_dir);

        Ok(Self {
            model,
            source_vocab,
            target_vocab,
            preprocessor:   Preprocessor::new(),
            max_decode_len: cfg.max_decode_len,
            device,
        })
    }
}

impl<B: Backend> Translator for SentenceTranslator<B> {
    fn translate(&self, sentence: &str) -> Result<String> {
        let cleaned    = self.preprocessor.clean(sentence).to_lowercase();
        let source_ids = self.source_vocab.encode(&cleaned)?;
        tracing::debug!("'{}' → {:?}", cleaned, source_ids);

        if let Some(limit) = self.model.max_source_len() {
            if source_ids.len() > limit {
                bail!(
                    "Sentence has {} tokens; this model accepts at most {}",
                    source_ids.len(), limit
                );
            }
        }

        let output = self.model.greedy(&source_ids, self.max_decode_len, &self.device);
        Ok(self.target_vocab.decode(&output))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::application::train_use_case::TrainConfig;

    type TB = NdArray;

    /// Lay out a checkpoint dir by hand: config, vocabularies, untrained weights.
    fn write_checkpoint(name: &str, model: ModelKind) -> String {
        let dir = std::env::temp_dir()
            .join(format!("enja-translator-{}-{}", name, std::process::id()))
            .to_string_lossy()
            .to_string();
        let cfg = TrainConfig {
            model,
            checkpoint_dir: dir.clone(),
            hidden_dim:     8,
            d_model:        8,
            num_heads:      2,
            num_layers:     1,
            d_ff:           8,
            max_positions:  16,
            max_decode_len: 5,
            ..TrainConfig::default()
        };

        let store = TokenizerStore::new(&dir);
        let src = store.load_or_build(Side::Source, ["i like cats .", "you like dogs ."], 50).unwrap();
        let tgt = store.load_or_build(Side::Target, ["猫 が 好き 。", "犬 が 好き 。"], 50).unwrap();

        let ckpt   = CheckpointManager::new(&dir);
        let device = Default::default();
        ckpt.save_config(&cfg).unwrap();
        match model {
            ModelKind::Rnn => {
                let m = rnn_config(&cfg, src.size(), tgt.size()).init::<TB>(&device);
                ckpt.save_model(&m, 1).unwrap();
            }
            ModelKind::Transformer => {
                let m = transformer_config(&cfg, src.size(), tgt.size()).init::<TB>(&device);
                ckpt.save_model(&m, 1).unwrap();
            }
        }
        dir
    }

    #[test]
    fn test_translates_with_either_architecture() {
        for (name, kind) in [("rnn", ModelKind::Rnn), ("transformer", ModelKind::Transformer)] {
            let dir = write_checkpoint(name, kind);
            let translator = SentenceTranslator::<TB>::from_checkpoint(&dir, Default::default()).unwrap();

            // Untrained weights: only the shape of the output is predictable
            let out = translator.translate("I like  CATS .").unwrap();
            assert!(out.split(' ').filter(|w| !w.is_empty()).count() <= 5);

            // Unknown words are accepted
            assert!(translator.translate("zebras run").is_ok());
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_overlong_sentence_is_an_error_for_transformer_only() {
        // max_positions is 16 in write_checkpoint
        let long = vec!["cats"; 20].join(" ");

        let dir = write_checkpoint("long-transformer", ModelKind::Transformer);
        let translator = SentenceTranslator::<TB>::from_checkpoint(&dir, Default::default()).unwrap();
        let err = translator.translate(&long).unwrap_err();
        assert!(err.to_string().contains("at most 16"));
        // Exactly at the limit still works
        assert!(translator.translate(&vec!["cats"; 16].join(" ")).is_ok());
        std::fs::remove_dir_all(dir).ok();

        let dir = write_checkpoint("long-rnn", ModelKind::Rnn);
        let translator = SentenceTranslator::<TB>::from_checkpoint(&dir, Default::default()).unwrap();
        assert!(translator.translate(&long).is_ok());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = std::env::temp_dir().join("enja-translator-nowhere");
        assert!(SentenceTranslator::<TB>::from_checkpoint(&dir.to_string_lossy(), Default::default()).is_err());
    }
}

// ============================================================
// Layer 2 — TranslateUseCase
// ============================================================
// Loads a trained checkpoint once and translates sentences
// one at a time, on the Wgpu backend.

use anyhow::Result;
use burn::backend::{wgpu::WgpuDevice, Wgpu};

use crate::domain::traits::Translator;
use crate::ml::translator::SentenceTranslator;

pub struct TranslateUseCase {
    translator: Box<dyn Translator>,
}

impl TranslateUseCase {
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        let translator = SentenceTranslator::<Wgpu>::from_checkpoint(checkpoint_dir, WgpuDevice::default())?;
        Ok(Self::with_translator(Box::new(translator)))
    }

    pub fn with_translator(translator: Box<dyn Translator>) -> Self {
        Self { translator }
    }

    /// Translate each sentence, in order
    pub fn translate_all(&self, sentences: &[String]) -> Result<Vec<String>> {
        sentences
            .iter()
            .map(|s| self.translator.translate(s))
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Reverses word order; enough to check the plumbing.
    struct Reverser;

    impl Translator for Reverser {
        fn translate(&self, sentence: &str) -> Result<String> {
            Ok(sentence.split(' ').rev().collect::<Vec<_>>().join(" "))
        }
    }

    #[test]
    fn test_translate_all_keeps_order() {
        let use_case = TranslateUseCase::with_translator(Box::new(Reverser));
        let out = use_case
            .translate_all(&["a b".to_string(), "c d e".to_string()])
            .unwrap();
        assert_eq!(out, vec!["b a", "e d c"]);
    }
}

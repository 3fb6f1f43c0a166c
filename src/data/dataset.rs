use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::special_tokens::{BOS_ID, EOS_ID};

/// One tokenised sentence pair, not yet padded.
/// `target_ids` always has the form `<s> w1 .. wn </s>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationSample {
    pub source_ids: Vec<u32>,
    pub target_ids: Vec<u32>,
}

impl TranslationSample {
    pub fn new(source_ids: Vec<u32>, target_ids: Vec<u32>) -> Self {
        debug_assert_eq!(target_ids.first(), Some(&BOS_ID));
        debug_assert_eq!(target_ids.last(),  Some(&EOS_ID));
        Self { source_ids, target_ids }
    }

    /// Reference words without the <s> / </s> markers
    pub fn reference_ids(&self) -> &[u32] {
        let n = self.target_ids.len();
        &self.target_ids[1..n.saturating_sub(1).max(1)]
    }
}

pub struct TranslationDataset {
    samples: Vec<TranslationSample>,
}

impl TranslationDataset {
    pub fn new(samples: Vec<TranslationSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<TranslationSample> for TranslationDataset {
    fn get(&self, index: usize) -> Option<TranslationSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_ids_strip_markers() {
        let s = TranslationSample::new(vec![7], vec![BOS_ID, 9, 10, EOS_ID]);
        assert_eq!(s.reference_ids(), &[9, 10]);
    }

    #[test]
    fn test_dataset_get_and_len() {
        let ds = TranslationDataset::new(vec![
            TranslationSample::new(vec![5], vec![BOS_ID, 6, EOS_ID]),
        ]);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get(0).unwrap().source_ids, vec![5]);
        assert!(ds.get(1).is_none());
    }
}

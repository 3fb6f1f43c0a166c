// ============================================================
// Layer 4 — Translation Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec of unpadded
// TranslationSamples into tensors.
//
// Padding is dynamic: every row is post-padded with <pad> (0)
// to the longest sequence *in this batch*. Because the corpus
// is sorted by length first, that is rarely more than a token
// or two.
//
// The target is split into the two shifted views used for
// teacher forcing:
//
//   target        = <s>  私   は   猫  </s>
//   target_input  = <s>  私   は   猫          ← decoder reads
//   target_output =      私   は   猫  </s>    ← decoder predicts
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::TranslationSample;
use crate::domain::special_tokens::PAD_ID;

// ─── TranslationBatch ─────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct TranslationBatch<B: Backend> {
    /// Source token ids — shape: [batch_size, src_len]
    pub source: Tensor<B, 2, Int>,

    /// Decoder inputs (`<s>` first) — shape: [batch_size, tgt_len]
    pub target_input: Tensor<B, 2, Int>,

    /// Decoder labels (`</s>` last) — shape: [batch_size, tgt_len]
    pub target_output: Tensor<B, 2, Int>,
}

// ─── TranslationBatcher ───────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct TranslationBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TranslationBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    fn to_tensor(&self, rows: &[&[u32]]) -> Tensor<B, 2, Int> {
        let (flat, width) = pad_rows(rows);
        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([rows.len(), width])
    }
}

impl<B: Backend> Batcher<TranslationSample, TranslationBatch<B>> for TranslationBatcher<B> {
    fn batch(&self, items: Vec<TranslationSample>) -> TranslationBatch<B> {
        let sources: Vec<&[u32]> = items.iter().map(|s| s.source_ids.as_slice()).collect();

        // Shifted views of each target; the sample invariant guarantees
        // at least `<s> </s>`, so both slices are non-empty.
        let inputs: Vec<&[u32]> = items
            .iter()
            .map(|s| &s.target_ids[..s.target_ids.len() - 1])
            .collect();
        let outputs: Vec<&[u32]> = items
            .iter()
            .map(|s| &s.target_ids[1..])
            .collect();

        TranslationBatch {
            source:        self.to_tensor(&sources),
            target_input:  self.to_tensor(&inputs),
            target_output: self.to_tensor(&outputs),
        }
    }
}

/// Post-pad every row with <pad> to the longest row.
/// Returns the row-major flat buffer and the padded width.
pub fn pad_rows(rows: &[&[u32]]) -> (Vec<i32>, usize) {
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0).max(1);
    let mut flat = Vec::with_capacity(rows.len() * width);
    for row in rows {
        flat.extend(row.iter().map(|&id| id as i32));
        flat.extend(std::iter::repeat(PAD_ID as i32).take(width - row.len()));
    }
    (flat, width)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::domain::special_tokens::{BOS_ID, EOS_ID};

    fn ints(t: Tensor<NdArray, 2, Int>) -> Vec<i64> {
        t.into_data().convert::<i64>().to_vec::<i64>().unwrap()
    }

    #[test]
    fn test_pad_rows_post_pads_to_longest() {
        let rows: [&[u32]; 2] = [&[5, 6, 7], &[8]];
        let (flat, width) = pad_rows(&rows);
        assert_eq!(width, 3);
        assert_eq!(flat, vec![5, 6, 7, 8, 0, 0]);
    }

    #[test]
    fn test_pad_rows_all_empty_keeps_one_column() {
        let rows: [&[u32]; 2] = [&[], &[]];
        let (flat, width) = pad_rows(&rows);
        assert_eq!(width, 1);
        assert_eq!(flat, vec![0, 0]);
    }

    #[test]
    fn test_batch_shapes_and_shift() {
        let batcher = TranslationBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(vec![
            TranslationSample::new(vec![10, 11, 12], vec![BOS_ID, 20, 21, EOS_ID]),
            TranslationSample::new(vec![13],         vec![BOS_ID, 22, EOS_ID]),
        ]);

        assert_eq!(batch.source.dims(),        [2, 3]);
        assert_eq!(batch.target_input.dims(),  [2, 3]);
        assert_eq!(batch.target_output.dims(), [2, 3]);

        assert_eq!(ints(batch.source),        vec![10, 11, 12, 13, 0, 0]);
        assert_eq!(ints(batch.target_input),  vec![1, 20, 21, 1, 22, 0]);
        assert_eq!(ints(batch.target_output), vec![20, 21, 2, 22, 2, 0]);
    }
}

// ============================================================
// Layer 5 — Seq2Seq Trait
// ============================================================
// The seam between the two architectures and everything that
// drives them. The trainer and the translator only ever see
// this trait.

use burn::prelude::*;

use crate::data::batcher::pad_rows;
use crate::domain::special_tokens::{BOS_ID, EOS_ID};

pub trait Seq2Seq<B: Backend> {
    /// Vocabulary logits for every target position.
    ///
    /// source [B, S], target_input [B, T] (starts with `<s>`)
    /// → logits [B, T, V]
    ///
    /// `teacher_forcing` only matters for step-wise decoders: when
    /// false, step t reads the argmax of step t-1 instead of
    /// `target_input[.., t]`.
    fn forward_logits(
        &self,
        source:          Tensor<B, 2, Int>,
        target_input:    Tensor<B, 2, Int>,
        teacher_forcing: bool,
    ) -> Tensor<B, 3>;

    /// Greedy argmax decoding from `<s>`, without the `<s>` itself.
    /// Stops after `max_len` tokens or once every row emitted `</s>`.
    /// → [B, <= max_len]
    fn greedy_decode(&self, source: Tensor<B, 2, Int>, max_len: usize) -> Tensor<B, 2, Int>;
}

/// `[B, 1]` column of `<s>`
pub fn bos_column<B: Backend>(batch: usize, device: &B::Device) -> Tensor<B, 2, Int> {
    Tensor::<B, 2, Int>::ones([batch, 1], device).mul_scalar(BOS_ID as i64)
}

/// Fold the newest tokens [B, 1] into the running `</s>` flags [B, 1].
/// A row stays finished once it has emitted `</s>`.
pub fn mark_finished<B: Backend>(
    finished: Tensor<B, 2, Bool>,
    tokens:   Tensor<B, 2, Int>,
) -> Tensor<B, 2, Bool> {
    (finished.int() + tokens.equal_elem(EOS_ID as i64).int()).greater_elem(0)
}

/// True when every row's flag is set.
pub fn all_finished<B: Backend>(finished: Tensor<B, 2, Bool>) -> bool {
    let [batch, _] = finished.dims();
    let done: i64 = finished.int().sum().into_scalar().elem();
    done as usize == batch
}

/// No row finished yet. Shape: [B, 1]
pub fn unfinished<B: Backend>(batch: usize, device: &B::Device) -> Tensor<B, 2, Bool> {
    Tensor::<B, 2, Int>::zeros([batch, 1], device).greater_elem(0)
}

/// Pull decoded ids back to the host, one Vec per row.
pub fn rows_to_vecs<B: Backend>(ids: Tensor<B, 2, Int>) -> Vec<Vec<u32>> {
    let [batch, len] = ids.dims();
    let flat: Vec<i64> = ids.into_data().iter::<i64>().collect();
    (0..batch)
        .map(|b| flat[b * len..(b + 1) * len].iter().map(|&x| x as u32).collect())
        .collect()
}

/// Greedy-translate one tokenised sentence. An empty sentence is
/// fed as a single <pad>, which both encoders treat as no input.
pub fn translate_ids<B: Backend, M: Seq2Seq<B>>(
    model:      &M,
    source_ids: &[u32],
    max_len:    usize,
    device:     &B::Device,
) -> Vec<u32> {
    let (flat, width) = pad_rows(&[source_ids]);
    let source = Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device).reshape([1, width]);
    rows_to_vecs(model.greedy_decode(source, max_len))
        .into_iter()
        .next()
        .unwrap_or_default()
}

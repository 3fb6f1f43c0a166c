// ============================================================
// Layer 5 — Masked Loss and Accuracy
// ============================================================
// Targets are post-padded, so every metric must ignore <pad>:
//
//   loss = - Σ_{b,t : y[b,t] ≠ pad} log p(y[b,t]) / batch_size
//
// i.e. the summed token NLL per sentence. Padded positions
// contribute neither loss nor gradient.

use burn::{
    prelude::*,
    tensor::activation::log_softmax,
};

use crate::ml::masks::padding_mask;

/// logits [B, T, V], targets [B, T] → scalar loss [1]
pub fn masked_cross_entropy<B: Backend>(
    logits:  Tensor<B, 3>,
    targets: Tensor<B, 2, Int>,
) -> Tensor<B, 1> {
    let [batch, len, _] = logits.dims();

    let log_probs = log_softmax(logits, 2);
    let picked    = log_probs
        .gather(2, targets.clone().unsqueeze_dim::<3>(2))
        .reshape([batch, len]);
    let keep = padding_mask(targets).bool_not().float();

    picked.mul(keep).sum().neg().div_scalar(batch as f64)
}

/// Returns (correct, total) over non-<pad> target tokens.
pub fn token_accuracy<B: Backend>(
    logits:  Tensor<B, 3>,
    targets: Tensor<B, 2, Int>,
) -> (usize, usize) {
    let [batch, len, _] = logits.dims();

    let predicted = logits.argmax(2).reshape([batch, len]);
    let keep      = padding_mask(targets.clone()).bool_not().int();
    let hits      = predicted.equal(targets).int().mul(keep.clone());

    let correct: i64 = hits.sum().into_scalar().elem();
    let total:   i64 = keep.sum().into_scalar().elem();
    (correct as usize, total as usize)
}

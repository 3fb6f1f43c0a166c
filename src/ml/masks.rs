// ============================================================
// Layer 5 — Attention Masks
// ============================================================
// Every mask in this crate is a Bool tensor where `true` means
// BLOCKED: the score at that position is replaced by a large
// negative number before the softmax, so it gets ~0 weight.
//
//   padding_mask       [B, S]        <pad> tokens
//   key_padding_mask   [B, Sq, Sk]   <pad> keys, for every query
//   subsequent_mask    [L, L]        keys in the future (j > i)
//   decoder_self_mask  [B, T, T]     <pad> keys OR future keys
//
// Example for a target row `<s> 私 は <pad>` (T = 4):
//
//          k0 k1 k2 k3
//     q0 [  .  x  x  x ]
//     q1 [  .  .  x  x ]
//     q2 [  .  .  .  x ]
//     q3 [  .  .  .  x ]      x = blocked
//
// Reference: Vaswani et al. (2017) §3.2.3

use burn::prelude::*;

use crate::domain::special_tokens::PAD_ID;

/// `true` wherever `tokens` holds <pad>. Shape: [B, S]
pub fn padding_mask<B: Backend>(tokens: Tensor<B, 2, Int>) -> Tensor<B, 2, Bool> {
    tokens.equal_elem(PAD_ID as i64)
}

/// Broadcast a key padding mask over `query_len` queries.
/// [B, Sk] → [B, Sq, Sk]
pub fn key_padding_mask<B: Backend>(
    pad:       Tensor<B, 2, Bool>,
    query_len: usize,
) -> Tensor<B, 3, Bool> {
    let [batch, key_len] = pad.dims();
    pad.unsqueeze_dim::<3>(1).expand([batch, query_len, key_len])
}

/// `true` strictly above the diagonal. Shape: [L, L]
pub fn subsequent_mask<B: Backend>(len: usize, device: &B::Device) -> Tensor<B, 2, Bool> {
    let rows = Tensor::<B, 1, Int>::arange(0..len as i64, device)
        .reshape([len, 1])
        .expand([len, len]);
    let cols = Tensor::<B, 1, Int>::arange(0..len as i64, device)
        .reshape([1, len])
        .expand([len, len]);
    cols.greater(rows)
}

/// Decoder self-attention mask: padded keys and future keys.
/// [B, T] → [B, T, T]
pub fn decoder_self_mask<B: Backend>(target: Tensor<B, 2, Int>) -> Tensor<B, 3, Bool> {
    let [batch, len] = target.dims();
    let device = target.device();

    let pad    = key_padding_mask(padding_mask(target), len).int();
    let future = subsequent_mask::<B>(len, &device)
        .int()
        .unsqueeze_dim::<3>(0)
        .expand([batch, len, len]);

    (pad + future).greater_elem(0)
}

// ============================================================
// Layer 5 — RNN Encoder-Decoder with Attention
// ============================================================
// Architecture (hidden size H everywhere):
//
//   source ids ─► Embedding ─► LSTM ─► encoder states h_s [B, S, H]
//                                 │
//                                 └─► final (h, c) initialises the decoder
//
//   decoder step t:
//     y_{t-1} ─► Embedding ─► LSTM step ─► h_t
//     LuongAttention(h_t, h_s) ─► tanh(W_c [c_t; h_t]) ─► Linear ─► logits_t
//
// <pad> handling: a time step whose input token is <pad> leaves
// the LSTM state unchanged, so the encoder hands the decoder the
// state at each sentence's real end, and attention never looks
// at padded source positions.
//
// Training runs the decoder for |target_input| steps. With
// teacher forcing step t reads the reference token, otherwise
// it reads its own previous argmax.
//
// Reference: Luong et al. (2015) Effective Approaches to
//            Attention-based Neural Machine Translation
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
        Lstm, LstmConfig, LstmState,
    },
    prelude::*,
};

use crate::ml::attention::{LuongAttention, LuongAttentionConfig};
use crate::ml::masks::padding_mask;
use crate::ml::seq2seq::{all_finished, bos_column, mark_finished, unfinished, Seq2Seq};

#[derive(Config, Debug)]
pub struct EncoderDecoderConfig {
    pub source_vocab: usize,
    pub target_vocab: usize,
    #[config(default = 256)]
    pub hidden_dim:   usize,
}

impl EncoderDecoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> EncoderDecoder<B> {
        let h = self.hidden_dim;
        let encoder = RnnEncoder {
            embedding: EmbeddingConfig::new(self.source_vocab, h).init(device),
            lstm:      LstmConfig::new(h, h, true).init(device),
        };
        let decoder = RnnDecoder {
            embedding: EmbeddingConfig::new(self.target_vocab, h).init(device),
            lstm:      LstmConfig::new(h, h, true).init(device),
            attention: LuongAttentionConfig::new(h, h).init(device),
            output:    LinearConfig::new(h, self.target_vocab).init(device),
        };
        EncoderDecoder { encoder, decoder }
    }
}

/// One LSTM step over `x` [B, 1, E]. Rows whose `tokens` [B, 1]
/// entry is <pad> keep their previous state.
fn masked_step<B: Backend>(
    lstm:   &Lstm<B>,
    x:      Tensor<B, 3>,
    tokens: Tensor<B, 2, Int>,
    state:  LstmState<B, 2>,
) -> LstmState<B, 2> {
    let [batch, hidden] = state.hidden.dims();
    let previous = LstmState {
        cell:   state.cell.clone(),
        hidden: state.hidden.clone(),
    };
    let (_, next) = lstm.forward(x, Some(previous));

    let is_pad = padding_mask(tokens).expand([batch, hidden]);
    LstmState {
        cell:   next.cell.mask_where(is_pad.clone(), state.cell),
        hidden: next.hidden.mask_where(is_pad, state.hidden),
    }
}

fn zero_state<B: Backend>(batch: usize, hidden: usize, device: &B::Device) -> LstmState<B, 2> {
    LstmState {
        cell:   Tensor::zeros([batch, hidden], device),
        hidden: Tensor::zeros([batch, hidden], device),
    }
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct RnnEncoder<B: Backend> {
    pub embedding: Embedding<B>,
    pub lstm:      Lstm<B>,
}

impl<B: Backend> RnnEncoder<B> {
    /// source [B, S] → (states [B, S, H], final state)
    pub fn forward(&self, source: Tensor<B, 2, Int>) -> (Tensor<B, 3>, LstmState<B, 2>) {
        let [batch, len] = source.dims();
        let embedded     = self.embedding.forward(source.clone());
        let [_, _, dim]  = embedded.dims();

        let mut state   = zero_state::<B>(batch, dim, &embedded.device());
        let mut outputs = Vec::with_capacity(len);
        for t in 0..len {
            let x_t   = embedded.clone().slice([0..batch, t..t + 1, 0..dim]);
            let tok_t = source.clone().slice([0..batch, t..t + 1]);
            state = masked_step(&self.lstm, x_t, tok_t, state);
            outputs.push(state.hidden.clone().unsqueeze_dim::<3>(1));
        }

        (Tensor::cat(outputs, 1), state)
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct RnnDecoder<B: Backend> {
    pub embedding: Embedding<B>,
    pub lstm:      Lstm<B>,
    pub attention: LuongAttention<B>,
    pub output:    Linear<B>,
}

impl<B: Backend> RnnDecoder<B> {
    /// One decoding step.
    /// token [B, 1], encoder states [B, S, H], source_pad [B, S]
    /// → (logits [B, V], next state)
    pub fn step(
        &self,
        token:      Tensor<B, 2, Int>,
        encoder:    Tensor<B, 3>,
        source_pad: Tensor<B, 2, Bool>,
        state:      LstmState<B, 2>,
    ) -> (Tensor<B, 2>, LstmState<B, 2>) {
        let x     = self.embedding.forward(token.clone());
        let state = masked_step(&self.lstm, x, token, state);

        let attended = self.attention.forward(
            state.hidden.clone().unsqueeze_dim::<3>(1),
            encoder,
            Some(source_pad),
        );
        let logits = self.output.forward(attended);
        let [batch, _, vocab] = logits.dims();
        (logits.reshape([batch, vocab]), state)
    }
}

// ─── EncoderDecoder ───────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct EncoderDecoder<B: Backend> {
    pub encoder: RnnEncoder<B>,
    pub decoder: RnnDecoder<B>,
}

impl<B: Backend> Seq2Seq<B> for EncoderDecoder<B> {
    fn forward_logits(
        &self,
        source:          Tensor<B, 2, Int>,
        target_input:    Tensor<B, 2, Int>,
        teacher_forcing: bool,
    ) -> Tensor<B, 3> {
        let [batch, steps] = target_input.dims();
        let device = source.device();

        let (encoder, mut state) = self.encoder.forward(source.clone());
        let source_pad = padding_mask(source);

        let mut previous = bos_column::<B>(batch, &device);
        let mut logits   = Vec::with_capacity(steps);
        for t in 0..steps {
            let input = if teacher_forcing {
                target_input.clone().slice([0..batch, t..t + 1])
            } else {
                previous
            };
            let (step_logits, next) =
                self.decoder.step(input, encoder.clone(), source_pad.clone(), state);
            state    = next;
            previous = step_logits.clone().argmax(1);
            logits.push(step_logits.unsqueeze_dim::<3>(1));
        }

        Tensor::cat(logits, 1)
    }

    fn greedy_decode(&self, source: Tensor<B, 2, Int>, max_len: usize) -> Tensor<B, 2, Int> {
        let [batch, _] = source.dims();
        let device = source.device();

        let (encoder, mut state) = self.encoder.forward(source.clone());
        let source_pad = padding_mask(source);

        let mut token     = bos_column::<B>(batch, &device);
        let mut finished  = unfinished::<B>(batch, &device);
        let mut generated = Vec::with_capacity(max_len);
        for _ in 0..max_len.max(1) {
            let (logits, next) =
                self.decoder.step(token, encoder.clone(), source_pad.clone(), state);
            state    = next;
            token    = logits.argmax(1);
            finished = mark_finished(finished, token.clone());
            generated.push(token.clone());

            if all_finished(finished.clone()) {
                break;
            }
        }

        Tensor::cat(generated, 1)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TB = NdArray;

    fn model() -> EncoderDecoder<TB> {
        EncoderDecoderConfig::new(12, 15)
            .with_hidden_dim(8)
            .init::<TB>(&Default::default())
    }

    fn ids(values: &[i32], rows: usize) -> Tensor<TB, 2, Int> {
        Tensor::<TB, 1, Int>::from_ints(values, &Default::default())
            .reshape([rows, values.len() / rows])
    }

    fn max_abs_diff<const D: usize>(a: Tensor<TB, D>, b: Tensor<TB, D>) -> f32 {
        (a - b).abs().max().into_scalar().elem()
    }

    #[test]
    fn test_forward_logits_shape() {
        let m = model();
        let source = ids(&[5, 6, 7, 8, 0, 0], 2);
        let target = ids(&[1, 9, 10, 1, 11, 0], 2);
        assert_eq!(m.forward_logits(source.clone(), target.clone(), true).dims(), [2, 3, 15]);
        assert_eq!(m.forward_logits(source, target, false).dims(), [2, 3, 15]);
    }

    #[test]
    fn test_encoder_state_ignores_trailing_padding() {
        let m = model();
        let (out_short, state_short) = m.encoder.forward(ids(&[5, 6], 1));
        let (out_padded, state_padded) = m.encoder.forward(ids(&[5, 6, 0, 0], 1));

        assert!(max_abs_diff(state_short.hidden, state_padded.hidden) < 1e-6);
        assert!(max_abs_diff(state_short.cell, state_padded.cell) < 1e-6);
        assert!(max_abs_diff(out_short, out_padded.slice([0..1, 0..2, 0..8])) < 1e-6);
    }

    #[test]
    fn test_first_step_is_the_same_with_or_without_teacher_forcing() {
        let m = model();
        let source = ids(&[5, 6, 7], 1);
        let target = ids(&[1, 9, 10, 11], 1);
        let forced = m.forward_logits(source.clone(), target.clone(), true);
        let free   = m.forward_logits(source, target, false);
        assert!(max_abs_diff(forced.slice([0..1, 0..1, 0..15]), free.slice([0..1, 0..1, 0..15])) < 1e-6);
    }

    #[test]
    fn test_teacher_forcing_feeds_reference_token_at_each_step() {
        let m = model();
        let source = ids(&[5, 6, 7], 1);
        let a = m.forward_logits(source.clone(), ids(&[1, 9, 10, 11], 1), true);
        let b = m.forward_logits(source, ids(&[1, 9, 12, 11], 1), true);

        let steps = |t: Tensor<TB, 3>, r: std::ops::Range<usize>| t.slice([0..1, r, 0..15]);
        // Steps 0 and 1 read identical inputs
        assert!(max_abs_diff(steps(a.clone(), 0..2), steps(b.clone(), 0..2)) < 1e-6);
        // Step 2 reads target_input[2], which differs
        assert!(max_abs_diff(steps(a, 2..3), steps(b, 2..3)) > 1e-6);
    }

    #[test]
    fn test_free_running_ignores_target_tokens() {
        let m = model();
        let source = ids(&[5, 6, 7], 1);
        let a = m.forward_logits(source.clone(), ids(&[1, 9, 10, 11], 1), false);
        let b = m.forward_logits(source, ids(&[1, 13, 12, 4], 1), false);
        // Only the length of target_input matters
        assert_eq!(a.dims(), b.dims());
        assert!(max_abs_diff(a, b) < 1e-6);
    }

    #[test]
    fn test_greedy_decode_respects_max_len() {
        let m   = model();
        let out = m.greedy_decode(ids(&[5, 6, 7, 8, 9, 0], 2), 4);
        let [batch, len] = out.dims();
        assert_eq!(batch, 2);
        assert!(len >= 1 && len <= 4);
        let max_id: i64 = out.max().into_scalar().elem();
        assert!(max_id < 15);
    }
}

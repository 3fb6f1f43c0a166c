// ============================================================
// Layer 5 — Transformer Encoder-Decoder
// ============================================================
// Post-LN Transformer (Vaswani et al. 2017):
//
//   Encoder layer:  x = Norm1(x + Drop(SelfAttn(x)))
//                   x = Norm2(x + Drop(FFN(x)))
//
//   Decoder layer:  y = Norm1(y + Drop(MaskedSelfAttn(y)))
//                   y = Norm2(y + Drop(CrossAttn(y, memory)))
//                   y = Norm3(y + Drop(FFN(y)))
//
//   FFN(x) = W2 · relu(W1 · x + b1) + b2
//
// Both stacks start with Embedding → PositionalEncoding.
// Encoder self-attention and cross-attention block <pad> source
// keys; decoder self-attention additionally blocks future keys,
// in training and in greedy decoding alike.
//
// Reference: Vaswani et al. (2017) §3.1–§3.5
//            Burn Book §3 (Building Blocks)

use anyhow::{bail, Result};
use burn::{
    nn::{
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::ml::attention::{MultiHeadAttention, MultiHeadAttentionConfig};
use crate::ml::masks::{decoder_self_mask, key_padding_mask, padding_mask};
use crate::ml::positional::{PositionalEncoding, PositionalEncodingConfig};
use crate::ml::seq2seq::{all_finished, bos_column, mark_finished, unfinished, Seq2Seq};

#[derive(Config, Debug)]
pub struct TransformerConfig {
    pub source_vocab: usize,
    pub target_vocab: usize,
    #[config(default = 3)]
    pub n_layers:     usize,
    #[config(default = 4)]
    pub n_heads:      usize,
    #[config(default = 128)]
    pub d_model:      usize,
    #[config(default = 128)]
    pub d_ff:         usize,
    #[config(default = 0.1)]
    pub dropout:      f64,
    /// Rows of the positional table: the longest sequence either stack accepts
    #[config(default = 128)]
    pub max_len:      usize,
}

impl TransformerConfig {
    /// Reject shapes `init` cannot build.
    pub fn validate(&self) -> Result<()> {
        MultiHeadAttentionConfig::new(self.d_model, self.n_heads).validate()?;
        if self.n_layers == 0 {
            bail!("num_layers must be at least 1");
        }
        if !(0.0..1.0).contains(&self.dropout) {
            bail!("dropout must be in [0, 1), got {}", self.dropout);
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Transformer<B> {
        let encoder = TransformerEncoder {
            embedding:  EmbeddingConfig::new(self.source_vocab, self.d_model).init(device),
            positional: self.build_positional(device),
            layers:     (0..self.n_layers).map(|_| self.build_encoder_layer(device)).collect(),
        };
        let decoder = TransformerDecoder {
            embedding:  EmbeddingConfig::new(self.target_vocab, self.d_model).init(device),
            positional: self.build_positional(device),
            layers:     (0..self.n_layers).map(|_| self.build_decoder_layer(device)).collect(),
        };
        let output = LinearConfig::new(self.d_model, self.target_vocab).init(device);
        Transformer { encoder, decoder, output }
    }

    fn build_positional<B: Backend>(&self, device: &B::Device) -> PositionalEncoding<B> {
        PositionalEncodingConfig::new(self.d_model)
            .with_max_len(self.max_len)
            .with_dropout(self.dropout)
            .init(device)
    }

    fn build_attention<B: Backend>(&self, device: &B::Device) -> MultiHeadAttention<B> {
        MultiHeadAttentionConfig::new(self.d_model, self.n_heads).init(device)
    }

    fn build_ffn<B: Backend>(&self, device: &B::Device) -> FeedForward<B> {
        FeedForward {
            linear1: LinearConfig::new(self.d_model, self.d_ff).init(device),
            linear2: LinearConfig::new(self.d_ff, self.d_model).init(device),
        }
    }

    fn build_encoder_layer<B: Backend>(&self, device: &B::Device) -> EncoderLayer<B> {
        EncoderLayer {
            self_attn: self.build_attention(device),
            ffn:       self.build_ffn(device),
            norm1:     LayerNormConfig::new(self.d_model).init(device),
            norm2:     LayerNormConfig::new(self.d_model).init(device),
            dropout:   DropoutConfig::new(self.dropout).init(),
        }
    }

    fn build_decoder_layer<B: Backend>(&self, device: &B::Device) -> DecoderLayer<B> {
        DecoderLayer {
            self_attn:  self.build_attention(device),
            cross_attn: self.build_attention(device),
            ffn:        self.build_ffn(device),
            norm1:      LayerNormConfig::new(self.d_model).init(device),
            norm2:      LayerNormConfig::new(self.d_model).init(device),
            norm3:      LayerNormConfig::new(self.d_model).init(device),
            dropout:    DropoutConfig::new(self.dropout).init(),
        }
    }
}

// ─── Position-wise Feed-Forward ───────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct FeedForward<B: Backend> {
    pub linear1: Linear<B>,
    pub linear2: Linear<B>,
}

impl<B: Backend> FeedForward<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        self.linear2.forward(relu(self.linear1.forward(x)))
    }
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct EncoderLayer<B: Backend> {
    pub self_attn: MultiHeadAttention<B>,
    pub ffn:       FeedForward<B>,
    pub norm1:     LayerNorm<B>,
    pub norm2:     LayerNorm<B>,
    pub dropout:   Dropout,
}

impl<B: Backend> EncoderLayer<B> {
    /// x [B, S, D], mask [B, S, S] → [B, S, D]
    pub fn forward(&self, x: Tensor<B, 3>, mask: Tensor<B, 3, Bool>) -> Tensor<B, 3> {
        let attn = self.self_attn.forward(x.clone(), x.clone(), x.clone(), Some(mask));
        let x    = self.norm1.forward(x + self.dropout.forward(attn));
        let ffn  = self.ffn.forward(x.clone());
        self.norm2.forward(x + self.dropout.forward(ffn))
    }
}

#[derive(Module, Debug)]
pub struct TransformerEncoder<B: Backend> {
    pub embedding:  Embedding<B>,
    pub positional: PositionalEncoding<B>,
    pub layers:     Vec<EncoderLayer<B>>,
}

impl<B: Backend> TransformerEncoder<B> {
    /// source [B, S], source_pad [B, S] → memory [B, S, D]
    pub fn forward(&self, source: Tensor<B, 2, Int>, source_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let [_, len] = source.dims();
        let mask = key_padding_mask(source_pad, len);

        let mut x = self.positional.forward(self.embedding.forward(source));
        for layer in &self.layers {
            x = layer.forward(x, mask.clone());
        }
        x
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct DecoderLayer<B: Backend> {
    pub self_attn:  MultiHeadAttention<B>,
    pub cross_attn: MultiHeadAttention<B>,
    pub ffn:        FeedForward<B>,
    pub norm1:      LayerNorm<B>,
    pub norm2:      LayerNorm<B>,
    pub norm3:      LayerNorm<B>,
    pub dropout:    Dropout,
}

impl<B: Backend> DecoderLayer<B> {
    /// y [B, T, D], memory [B, S, D], self_mask [B, T, T], cross_mask [B, T, S]
    pub fn forward(
        &self,
        y:          Tensor<B, 3>,
        memory:     Tensor<B, 3>,
        self_mask:  Tensor<B, 3, Bool>,
        cross_mask: Tensor<B, 3, Bool>,
    ) -> Tensor<B, 3> {
        let attn = self.self_attn.forward(y.clone(), y.clone(), y.clone(), Some(self_mask));
        let y    = self.norm1.forward(y + self.dropout.forward(attn));

        let attn = self.cross_attn.forward(y.clone(), memory.clone(), memory, Some(cross_mask));
        let y    = self.norm2.forward(y + self.dropout.forward(attn));

        let ffn = self.ffn.forward(y.clone());
        self.norm3.forward(y + self.dropout.forward(ffn))
    }
}

#[derive(Module, Debug)]
pub struct TransformerDecoder<B: Backend> {
    pub embedding:  Embedding<B>,
    pub positional: PositionalEncoding<B>,
    pub layers:     Vec<DecoderLayer<B>>,
}

impl<B: Backend> TransformerDecoder<B> {
    /// target [B, T], memory [B, S, D], source_pad [B, S] → [B, T, D]
    pub fn forward(
        &self,
        target:     Tensor<B, 2, Int>,
        memory:     Tensor<B, 3>,
        source_pad: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        let [_, len] = target.dims();
        let self_mask  = decoder_self_mask(target.clone());
        let cross_mask = key_padding_mask(source_pad, len);

        let mut y = self.positional.forward(self.embedding.forward(target));
        for layer in &self.layers {
            y = layer.forward(y, memory.clone(), self_mask.clone(), cross_mask.clone());
        }
        y
    }
}

// ─── Transformer ──────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Transformer<B: Backend> {
    pub encoder: TransformerEncoder<B>,
    pub decoder: TransformerDecoder<B>,
    pub output:  Linear<B>,
}

impl<B: Backend> Transformer<B> {
    /// source [B, S] → (memory [B, S, D], source_pad [B, S])
    pub fn encode(&self, source: Tensor<B, 2, Int>) -> (Tensor<B, 3>, Tensor<B, 2, Bool>) {
        let source_pad = padding_mask(source.clone());
        let memory     = self.encoder.forward(source, source_pad.clone());
        (memory, source_pad)
    }

    /// target [B, T] → logits [B, T, V]
    pub fn decode(
        &self,
        target:     Tensor<B, 2, Int>,
        memory:     Tensor<B, 3>,
        source_pad: Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        self.output.forward(self.decoder.forward(target, memory, source_pad))
    }
}

impl<B: Backend> Seq2Seq<B> for Transformer<B> {
    /// All target positions in parallel; the causal mask stands in
    /// for step-wise feeding, so `teacher_forcing` is ignored.
    fn forward_logits(
        &self,
        source:           Tensor<B, 2, Int>,
        target_input:     Tensor<B, 2, Int>,
        _teacher_forcing: bool,
    ) -> Tensor<B, 3> {
        let (memory, source_pad) = self.encode(source);
        self.decode(target_input, memory, source_pad)
    }

    fn greedy_decode(&self, source: Tensor<B, 2, Int>, max_len: usize) -> Tensor<B, 2, Int> {
        let [batch, _] = source.dims();
        let device = source.device();
        let (memory, source_pad) = self.encode(source);

        // ys keeps the leading <s>; it is sliced off on return
        let mut ys       = bos_column::<B>(batch, &device);
        let mut finished = unfinished::<B>(batch, &device);
        for _ in 0..max_len.max(1) {
            let logits = self.decode(ys.clone(), memory.clone(), source_pad.clone());
            let [_, len, vocab] = logits.dims();
            let next = logits
                .slice([0..batch, len - 1..len, 0..vocab])
                .argmax(2)
                .reshape([batch, 1]);
            finished = mark_finished(finished, next.clone());
            ys = Tensor::cat(vec![ys, next], 1);

            if all_finished(finished.clone()) {
                break;
            }
        }

        let [_, len] = ys.dims();
        ys.slice([0..batch, 1..len])
    }
}

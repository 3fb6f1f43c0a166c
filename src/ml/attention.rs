// ============================================================
// Layer 5 — Attention
// ============================================================
// Two attention mechanisms, one per architecture:
//
//   scaled_dot_product_attention  softmax(Q·Kᵀ / √d_k) · V
//   MultiHeadAttention            h heads of the above over
//                                 learned projections of Q, K, V,
//                                 concatenated and projected back
//   LuongAttention                "general" score h_t·W_a·h_s,
//                                 context c = Σ a·h_s,
//                                 output tanh(W_c [c; h_t] + b)
//
// Masks follow ml::masks: `true` = blocked. Blocked scores are
// filled with MASK_FILL before the softmax, which drives their
// weight to zero while keeping fully-blocked rows finite.
//
// Reference: Vaswani et al. (2017) §3.2
//            Luong et al. (2015) §3.1

use anyhow::{bail, Result};
use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::activation::softmax,
};

/// Score written into blocked positions before the softmax
pub const MASK_FILL: f32 = -1.0e9;

/// Returns `(context, weights)`.
///
/// Shapes: query [B, H, Sq, Dk], key/value [B, H, Sk, Dk],
/// mask [B, H, Sq, Sk] → context [B, H, Sq, Dk], weights [B, H, Sq, Sk]
pub fn scaled_dot_product_attention<B: Backend>(
    query: Tensor<B, 4>,
    key:   Tensor<B, 4>,
    value: Tensor<B, 4>,
    mask:  Option<Tensor<B, 4, Bool>>,
) -> (Tensor<B, 4>, Tensor<B, 4>) {
    let d_k = query.dims()[3] as f64;

    let scores = query.matmul(key.swap_dims(2, 3)).div_scalar(d_k.sqrt());
    let scores = match mask {
        Some(mask) => scores.mask_fill(mask, MASK_FILL),
        None       => scores,
    };

    let weights = softmax(scores, 3);
    (weights.clone().matmul(value), weights)
}

// ─── Multi-Head Attention ─────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct MultiHeadAttentionConfig {
    pub d_model: usize,
    pub n_heads: usize,
}

impl MultiHeadAttentionConfig {
    /// Head split check, reported as an error. Model configs run it
    /// from their own `validate` before calling `init`.
    pub fn validate(&self) -> Result<()> {
        if self.n_heads == 0 || self.d_model % self.n_heads != 0 {
            bail!("d_model ({}) must be divisible by num_heads ({})", self.d_model, self.n_heads);
        }
        Ok(())
    }

    /// Call `validate` first.
    ///
    /// # Panics
    /// Panics if `d_model` is not divisible by `n_heads`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> MultiHeadAttention<B> {
        assert!(
            self.n_heads > 0 && self.d_model % self.n_heads == 0,
            "d_model ({}) must be divisible by n_heads ({})",
            self.d_model,
            self.n_heads
        );
        let proj = || LinearConfig::new(self.d_model, self.d_model).init::<B>(device);
        MultiHeadAttention {
            query:   proj(),
            key:     proj(),
            value:   proj(),
            output:  proj(),
            n_heads: self.n_heads,
            d_k:     self.d_model / self.n_heads,
        }
    }
}

#[derive(Module, Debug)]
pub struct MultiHeadAttention<B: Backend> {
    pub query:   Linear<B>,
    pub key:     Linear<B>,
    pub value:   Linear<B>,
    pub output:  Linear<B>,
    pub n_heads: usize,
    pub d_k:     usize,
}

impl<B: Backend> MultiHeadAttention<B> {
    /// query [B, Sq, D], key/value [B, Sk, D], mask [B, Sq, Sk] → [B, Sq, D]
    pub fn forward(
        &self,
        query: Tensor<B, 3>,
        key:   Tensor<B, 3>,
        value: Tensor<B, 3>,
        mask:  Option<Tensor<B, 3, Bool>>,
    ) -> Tensor<B, 3> {
        let [batch, q_len, _] = query.dims();
        let k_len = key.dims()[1];

        let q = self.split_heads(self.query.forward(query));
        let k = self.split_heads(self.key.forward(key));
        let v = self.split_heads(self.value.forward(value));

        // Same mask for every head
        let mask = mask.map(|m| {
            m.unsqueeze_dim::<4>(1).expand([batch, self.n_heads, q_len, k_len])
        });

        let (context, _) = scaled_dot_product_attention(q, k, v, mask);

        // [B, H, Sq, Dk] → [B, Sq, H·Dk]
        let context = context
            .swap_dims(1, 2)
            .reshape([batch, q_len, self.n_heads * self.d_k]);
        self.output.forward(context)
    }

    /// [B, S, D] → [B, H, S, Dk]
    fn split_heads(&self, x: Tensor<B, 3>) -> Tensor<B, 4> {
        let [batch, len, _] = x.dims();
        x.reshape([batch, len, self.n_heads, self.d_k]).swap_dims(1, 2)
    }
}

// ─── Luong Attention ──────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct LuongAttentionConfig {
    pub hidden_dim: usize,
    pub output_dim: usize,
}

impl LuongAttentionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> LuongAttention<B> {
        LuongAttention {
            w_a: LinearConfig::new(self.hidden_dim, self.hidden_dim)
                .with_bias(false)
                .init(device),
            w_c: LinearConfig::new(self.hidden_dim * 2, self.output_dim).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct LuongAttention<B: Backend> {
    pub w_a: Linear<B>,
    pub w_c: Linear<B>,
}

impl<B: Backend> LuongAttention<B> {
    /// Attention weights over source positions.
    /// decoder [B, Tq, H], encoder [B, Ts, H], source_pad [B, Ts] → [B, Tq, Ts]
    pub fn alignment(
        &self,
        decoder:    Tensor<B, 3>,
        encoder:    Tensor<B, 3>,
        source_pad: Option<Tensor<B, 2, Bool>>,
    ) -> Tensor<B, 3> {
        let [batch, q_len, _] = decoder.dims();
        let src_len = encoder.dims()[1];

        let keys   = self.w_a.forward(encoder);
        let scores = decoder.matmul(keys.swap_dims(1, 2));
        let scores = match source_pad {
            Some(pad) => scores.mask_fill(
                pad.unsqueeze_dim::<3>(1).expand([batch, q_len, src_len]),
                MASK_FILL,
            ),
            None => scores,
        };
        softmax(scores, 2)
    }

    /// decoder [B, Tq, H], encoder [B, Ts, H] → attentional state [B, Tq, out]
    pub fn forward(
        &self,
        decoder:    Tensor<B, 3>,
        encoder:    Tensor<B, 3>,
        source_pad: Option<Tensor<B, 2, Bool>>,
    ) -> Tensor<B, 3> {
        let weights = self.alignment(decoder.clone(), encoder.clone(), source_pad);
        let context = weights.matmul(encoder);
        self.w_c.forward(Tensor::cat(vec![context, decoder], 2)).tanh()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::{Distribution, TensorData};

    type TB = NdArray;

    fn floats<const D: usize>(t: Tensor<TB, D>) -> Vec<f32> {
        t.into_data().convert::<f32>().to_vec::<f32>().unwrap()
    }

    fn normal<const D: usize>(shape: [usize; D]) -> Tensor<TB, D> {
        Tensor::random(shape, Distribution::Normal(0.0, 1.0), &Default::default())
    }

    #[test]
    fn test_sdpa_weights_are_a_distribution() {
        let q = normal([2, 2, 3, 4]);
        let k = normal([2, 2, 5, 4]);
        let v = normal([2, 2, 5, 4]);
        let (context, weights) = scaled_dot_product_attention(q, k, v, None);

        assert_eq!(context.dims(), [2, 2, 3, 4]);
        for s in floats(weights.sum_dim(3)) {
            assert!((s - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sdpa_masked_keys_get_zero_weight() {
        let device = Default::default();
        let q = normal([1, 1, 2, 4]);
        let k = normal([1, 1, 3, 4]);
        let v = normal([1, 1, 3, 4]);
        let mask = Tensor::<TB, 4, Bool>::from_data(
            TensorData::new(vec![false, false, true, false, false, true], [1, 1, 2, 3]),
            &device,
        );
        let (_, weights) = scaled_dot_product_attention(q, k, v, Some(mask));
        let w = floats(weights);
        assert!(w[2] < 1e-6);
        assert!(w[5] < 1e-6);
        assert!((w[0] + w[1] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sdpa_identical_keys_give_uniform_weights() {
        let q = normal([1, 1, 1, 4]);
        let k = Tensor::<TB, 4>::ones([1, 1, 4, 4], &Default::default());
        let v = normal([1, 1, 4, 4]);
        let (_, weights) = scaled_dot_product_attention(q, k, v, None);
        for w in floats(weights) {
            assert!((w - 0.25).abs() < 1e-5);
        }
    }

    #[test]
    fn test_mha_output_shape_for_cross_attention() {
        let mha = MultiHeadAttentionConfig::new(8, 2).init::<TB>(&Default::default());
        let out = mha.forward(normal([2, 3, 8]), normal([2, 5, 8]), normal([2, 5, 8]), None);
        assert_eq!(out.dims(), [2, 3, 8]);
    }

    #[test]
    fn test_mha_ignores_masked_keys() {
        let device = Default::default();
        let mha = MultiHeadAttentionConfig::new(8, 2).init::<TB>(&device);
        let query = normal([1, 2, 8]);

        // Same memory except for the last (padded) position
        let base: Vec<f32> = (0..24).map(|i| (i as f32 * 0.37).sin()).collect();
        let mut altered = base.clone();
        for x in &mut altered[16..] {
            *x += 5.0;
        }
        let memory_a = Tensor::<TB, 3>::from_data(TensorData::new(base, [1, 3, 8]), &device);
        let memory_b = Tensor::<TB, 3>::from_data(TensorData::new(altered, [1, 3, 8]), &device);

        let mask = Tensor::<TB, 3, Bool>::from_data(
            TensorData::new(vec![false, false, true, false, false, true], [1, 2, 3]),
            &device,
        );

        let a = mha.forward(query.clone(), memory_a.clone(), memory_a, Some(mask.clone()));
        let b = mha.forward(query, memory_b.clone(), memory_b, Some(mask));
        let diff: f32 = (a - b).abs().max().into_scalar().elem();
        assert!(diff < 1e-5);
    }

    #[test]
    fn test_mha_validate_reports_bad_head_count() {
        assert!(MultiHeadAttentionConfig::new(8, 2).validate().is_ok());
        assert!(MultiHeadAttentionConfig::new(10, 3).validate().is_err());
        assert!(MultiHeadAttentionConfig::new(8, 0).validate().is_err());
    }

    #[test]
    #[should_panic]
    fn test_mha_rejects_indivisible_heads() {
        let _ = MultiHeadAttentionConfig::new(10, 3).init::<TB>(&Default::default());
    }

    #[test]
    fn test_luong_alignment_skips_source_padding() {
        let device = Default::default();
        let attn = LuongAttentionConfig::new(4, 4).init::<TB>(&device);
        let pad = Tensor::<TB, 2, Bool>::from_data(
            TensorData::new(vec![false, false, true], [1, 3]),
            &device,
        );

        let weights = attn.alignment(normal([1, 1, 4]), normal([1, 3, 4]), Some(pad.clone()));
        let w = floats(weights);
        assert!(w[2] < 1e-6);
        assert!((w[0] + w[1] - 1.0).abs() < 1e-5);

        let out = attn.forward(normal([1, 1, 4]), normal([1, 3, 4]), Some(pad));
        assert_eq!(out.dims(), [1, 1, 4]);
        // tanh output range
        assert!(floats(out).iter().all(|x| x.abs() <= 1.0));
    }
}

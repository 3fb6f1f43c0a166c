// ============================================================
// Layer 5 — Sinusoidal Positional Encoding
// ============================================================
// Attention has no notion of order, so the Transformer adds a
// fixed position signal to every embedding:
//
//   PE[pos, 2i]   = sin(pos / 10000^(2i / d_model))
//   PE[pos, 2i+1] = cos(pos / 10000^(2i / d_model))
//
// The table is computed once at init for `max_len` positions and
// stored as a constant tensor (no gradient flows into it).
//
// Reference: Vaswani et al. (2017) §3.5

use burn::{
    nn::{Dropout, DropoutConfig},
    prelude::*,
};

/// Row-major [max_len, d_model] sinusoid table.
pub fn sinusoid_table(max_len: usize, d_model: usize) -> Vec<f32> {
    let mut table = vec![0.0f32; max_len * d_model];
    for pos in 0..max_len {
        for i in 0..d_model {
            // Pairs (2i, 2i+1) share one frequency
            let exponent = (2 * (i / 2)) as f64 / d_model as f64;
            let angle    = pos as f64 / 10000f64.powf(exponent);
            let value    = if i % 2 == 0 { angle.sin() } else { angle.cos() };
            table[pos * d_model + i] = value as f32;
        }
    }
    table
}

#[derive(Config, Debug)]
pub struct PositionalEncodingConfig {
    pub d_model: usize,
    #[config(default = 128)]
    pub max_len: usize,
    #[config(default = 0.1)]
    pub dropout: f64,
}

impl PositionalEncodingConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> PositionalEncoding<B> {
        let table = Tensor::<B, 2>::from_data(
            TensorData::new(sinusoid_table(self.max_len, self.d_model), [self.max_len, self.d_model]),
            device,
        );
        PositionalEncoding {
            table,
            dropout: DropoutConfig::new(self.dropout).init(),
            max_len: self.max_len,
        }
    }
}

#[derive(Module, Debug)]
pub struct PositionalEncoding<B: Backend> {
    pub table:   Tensor<B, 2>,
    pub dropout: Dropout,
    pub max_len: usize,
}

impl<B: Backend> PositionalEncoding<B> {
    /// x: [batch, seq_len, d_model] → same shape, position added.
    ///
    /// # Panics
    /// Panics if `seq_len` exceeds the table size.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, seq_len, d_model] = x.dims();
        assert!(
            seq_len <= self.max_len,
            "sequence length {} exceeds positional table size {}",
            seq_len,
            self.max_len
        );

        let pe = self.table
            .clone()
            .slice([0..seq_len, 0..d_model])
            .unsqueeze_dim::<3>(0)
            .expand([batch, seq_len, d_model]);
        self.dropout.forward(x + pe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_position_zero_is_sin0_cos0() {
        let t = sinusoid_table(4, 6);
        assert_eq!(&t[0..6], &[0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_first_pair_uses_unit_frequency() {
        let t = sinusoid_table(3, 4);
        // pos 2, i = 0/1 → sin(2), cos(2)
        assert!((t[8] - 2.0f32.sin()).abs() < 1e-6);
        assert!((t[9] - 2.0f32.cos()).abs() < 1e-6);
        // pos 2, i = 2/3 → angle 2 / 10000^(2/4) = 0.02
        assert!((t[10] - 0.02f32.sin()).abs() < 1e-6);
        assert!((t[11] - 0.02f32.cos()).abs() < 1e-6);
    }

    #[test]
    fn test_forward_adds_table_to_zero_input() {
        let device = Default::default();
        let pe = PositionalEncodingConfig::new(4)
            .with_max_len(8)
            .with_dropout(0.0)
            .init::<NdArray>(&device);
        let out = pe.forward(Tensor::zeros([2, 3, 4], &device));
        assert_eq!(out.dims(), [2, 3, 4]);

        let values = out.into_data().convert::<f32>().to_vec::<f32>().unwrap();
        let table  = sinusoid_table(3, 4);
        assert_eq!(&values[..12], table.as_slice());
        assert_eq!(&values[12..], table.as_slice());
    }

    #[test]
    #[should_panic]
    fn test_sequence_longer_than_table_panics() {
        let device = Default::default();
        let pe = PositionalEncodingConfig::new(4).with_max_len(2).init::<NdArray>(&device);
        let _ = pe.forward(Tensor::zeros([1, 3, 4], &device));
    }
}

// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All tensor code lives here.
//
//   masks.rs       — <pad> and causal masks (true = blocked)
//   attention.rs   — scaled dot-product, multi-head, Luong
//   positional.rs  — sinusoidal positional encoding
//   rnn.rs         — LSTM encoder-decoder with attention
//   transformer.rs — N-layer encoder-decoder Transformer
//   seq2seq.rs     — the trait both models implement
//   loss.rs        — <pad>-masked cross-entropy and accuracy
//   trainer.rs     — training / validation loop
//   translator.rs  — checkpoint → greedy translation
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need
//            Luong et al. (2015) Effective Approaches to
//            Attention-based Neural Machine Translation

pub mod masks;

pub mod attention;

pub mod positional;

/// LSTM encoder-decoder with Luong attention
pub mod rnn;

/// Encoder-decoder Transformer
pub mod transformer;

pub mod seq2seq;

pub mod loss;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Loads a checkpoint and translates sentences
pub mod translator;

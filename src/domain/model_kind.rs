// ============================================================
// Layer 3 — ModelKind
// ============================================================
// The two architectures this crate can train. Stored in
// train_config.json so `translate` rebuilds the right model.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// LSTM encoder + LSTM decoder with Luong attention
    Rnn,
    /// Encoder-decoder Transformer
    Transformer,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Rnn         => write!(f, "rnn"),
            ModelKind::Transformer => write!(f, "transformer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ModelKind::Transformer).unwrap();
        assert_eq!(json, "\"transformer\"");
        let back: ModelKind = serde_json::from_str("\"rnn\"").unwrap();
        assert_eq!(back, ModelKind::Rnn);
    }
}

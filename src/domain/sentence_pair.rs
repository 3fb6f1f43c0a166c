// ============================================================
// Layer 3 — SentencePair Domain Type
// ============================================================
// One aligned line of the parallel corpus. Both sides are
// already word-segmented: tokens are separated by single
// spaces, e.g.
//
//   source: "i can 't tell who will arrive first ."
//   target: "誰 が 一番 に 着 く か 私 に は 分か り ま せ ん 。"
//
// Reference: Rust Book §5 (Structs)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentencePair {
    /// Sentence in the language we translate from
    pub source: String,

    /// Reference translation in the language we translate into
    pub target: String,
}

impl SentencePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Number of space-separated tokens on the source side
    pub fn source_len(&self) -> usize {
        self.source.split_whitespace().count()
    }

    /// Swap source and target (used for the ja → en direction)
    pub fn reversed(self) -> Self {
        Self {
            source: self.target,
            target: self.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_counts() {
        let p = SentencePair::new("i am a cat .", "吾輩 は 猫 で あ る 。");
        assert_eq!(p.source_len(), 5);
        assert_eq!(p.reversed().source_len(), 7);
    }

    #[test]
    fn test_reversed_swaps_sides() {
        let p = SentencePair::new("hello .", "こんにちは 。").reversed();
        assert_eq!(p.source, "こんにちは 。");
        assert_eq!(p.target, "hello .");
    }
}

// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to these traits, not to the
// concrete corpus reader or model wrapper:
//   - ParallelCorpusLoader implements CorpusSource
//   - ml::translator::SentenceTranslator implements Translator
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::sentence_pair::SentencePair;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Anything that can produce aligned sentence pairs.
pub trait CorpusSource {
    /// Load every pair of this source in file order.
    fn load_pairs(&self) -> Result<Vec<SentencePair>>;
}

// ─── Translator ───────────────────────────────────────────────────────────────
/// Anything that can translate one space-separated sentence.
pub trait Translator {
    /// Returns the translated sentence, tokens joined by spaces.
    fn translate(&self, sentence: &str) -> Result<String>;
}

// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe the translation task itself:
// sentence pairs, the reserved token ids shared by both
// vocabularies, which architecture is being trained, and the
// traits the outer layers implement.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, constants, and traits
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

/// One source/target sentence pair from the parallel corpus
pub mod sentence_pair;

/// Reserved token ids (<pad>, <s>, </s>, <unk>)
pub mod special_tokens;

/// Which seq2seq architecture to train or load
pub mod model_kind;

/// Core abstractions (traits) that other layers implement
pub mod traits;

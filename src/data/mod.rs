// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From the two aligned text files to GPU-ready batches:
//
//   train.en / train.ja
//       │
//       ▼
//   ParallelCorpusLoader → aligned SentencePairs
//       │                  (Preprocessor cleans each line)
//       ▼
//   split_train_val      → first 80% train, rest validation
//       │
//       ▼
//   sort_by_length       → length-bucketed order
//       │
//       ▼
//   Vocabulary           → words to ids, <s> … </s> on targets
//       │
//       ▼
//   TranslationDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   TranslationBatcher   → post-padded, shifted tensor batches
//       │
//       ▼
//   DataLoader           → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Reads `<split>.en` / `<split>.ja` into sentence pairs
pub mod loader;

/// Cleans and normalises raw lines
pub mod preprocessor;

/// Stable sort by source length
pub mod sorter;

/// Deterministic train/validation split
pub mod splitter;

/// Word-level vocabulary over a `tokenizers::Tokenizer`
pub mod vocab;

/// Implements Burn's Dataset trait for translation samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

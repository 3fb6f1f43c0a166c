// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the checkpoint directory:
//
//   checkpoint.rs      — model weights (CompactRecorder),
//                        latest_epoch.json, train_config.json
//
//   tokenizer_store.rs — per-language word-level vocabularies,
//                        built from the training split once and
//                        reloaded by `translate`
//
//   metrics.rs         — per-epoch loss / accuracy CSV
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Vocabulary building, saving, and loading
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;

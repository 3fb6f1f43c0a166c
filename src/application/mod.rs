// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: no tensor code, no printing.
//
//   train_use_case.rs     — corpus → vocabularies → training loop
//   translate_use_case.rs — checkpoint → translations
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// The inference workflow
pub mod translate_use_case;

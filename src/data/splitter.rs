// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Splits the training corpus into two sets:
//   - Training set:   used to update model weights
//   - Validation set: used to measure loss on unseen pairs
//
// The split is a deterministic prefix split: the first
// `round(n * train_fraction)` items train, the rest validate.
// The corpus lines are in no meaningful order, so no shuffle
// is applied and repeated runs see the same validation set.
//
// Split ratio: 80% training, 20% validation (configurable)
//
// Reference: Rust Book §8 (Vectors)

/// Split `items` into (train, validation) at `train_fraction`.
///
/// # Example
/// ```ignore
/// let (train, val) = split_train_val(all_pairs, 0.8);
/// // train has the first 80% of pairs, val the last 20%
/// ```
pub fn split_train_val<T>(mut items: Vec<T>, train_fraction: f64) -> (Vec<T>, Vec<T>) {
    let total    = items.len();
    let split_at = ((total as f64) * train_fraction.clamp(0.0, 1.0)).round() as usize;
    let split_at = split_at.min(total);

    // split_off(n) removes elements [n..] from the Vec and returns them
    let val = items.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        items.len(),
        val.len(),
    );

    (items, val)
}

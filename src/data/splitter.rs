// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles items and splits them into two sets:
//   - Training set:   used to update model weights
//   - Validation set: used to measure performance on unseen data
//
// The caller passes the RNG, so a seeded run always produces
// the same split.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use rand::{seq::SliceRandom, Rng};

/// Shuffle `items` and split into (train, validation).
///
/// # Arguments
/// * `items`          - All available items (consumed by this function)
/// * `train_fraction` - Proportion for training, e.g. 0.8 = 80%
/// * `rng`            - Source of the shuffle
pub fn split_train_val<T, R: Rng + ?Sized>(
    mut items:      Vec<T>,
    train_fraction: f64,
    rng:            &mut R,
) -> (Vec<T>, Vec<T>) {
    items.shuffle(rng);

    let total    = items.len();
    let split_at = ((total as f64) * train_fraction.clamp(0.0, 1.0)).round() as usize;
    let split_at = split_at.min(total);

    // After this: items = [0..split_at], val = [split_at..total]
    let val = items.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation",
        items.len(),
        val.len(),
    );

    (items, val)
}

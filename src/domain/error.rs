// ============================================================
// Layer 3 — Domain Errors
// ============================================================
// The three ways a core operation can fail. All of them mean
// the caller handed over something inconsistent; none of them
// are transient, so nothing in the crate retries on them.
//
//   Configuration   — malformed pool / dataset construction
//   DataUnavailable — a class pool needed for a sample is empty
//   ShapeMismatch   — scorer inputs don't match its input_dim
//
// The outer layers wrap these in anyhow::Error via `?`.
//
// Reference: Rust Book §9 (Recoverable Errors with Result)

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// The dataset or pool was built from inconsistent inputs.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No items exist for a class that a sample requires.
    #[error("no items available for class {class}")]
    DataUnavailable { class: u8 },

    /// A scorer input has the wrong length, or there is nothing to score.
    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what:     &'static str,
        expected: usize,
        found:    usize,
    },
}

impl SelectError {
    pub fn config(msg: impl Into<String>) -> Self {
        SelectError::Configuration(msg.into())
    }
}

// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer asks for a Corpus through this trait
// and never sees the on-disk format:
//
//   - IdxLoader implements CorpusSource (MNIST / Fashion-MNIST)
//   - tests build a Corpus in memory and skip the trait entirely
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::item::Corpus;

/// Which half of a corpus to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can produce a labelled image corpus.
pub trait CorpusSource {
    /// Load every image of the requested split.
    fn load(&self, split: Split) -> Result<Corpus>;
}

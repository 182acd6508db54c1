// ============================================================
// Layer 3 — Items and the Labelled Corpus
// ============================================================
// An Item is one flattened image: a fixed-length Vec<f32>
// with every value already scaled into [0, 1].
//
// A Corpus is the read-only source collection that the
// selection dataset and the classifier both draw from:
//
//   images[i]  — the pixels of image i
//   labels[i]  — its class in 0..=9
//
// Nothing in this file knows about IDX files or tensors.
//
// Reference: Rust Book §5 (Structs), §8 (Vectors)

use serde::{Deserialize, Serialize};

/// Number of classes in MNIST and Fashion-MNIST.
pub const NUM_CLASSES: u8 = 10;

/// Flattened pixel vector of a single image.
pub type Item = Vec<f32>;

/// The class whose items count as the "right answer" for a query of `class`.
///
/// Example: successor_class(5) == 6, successor_class(9) == 0
///
/// Only meaningful for `class < NUM_CLASSES`; never overflows.
pub fn successor_class(class: u8) -> u8 {
    ((u16::from(class) + 1) % u16::from(NUM_CLASSES)) as u8
}

/// One image together with its label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledImage {
    pub pixels: Item,
    pub label:  u8,
}

/// An ordered, labelled collection of equally sized images.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    images: Vec<Item>,
    labels: Vec<u8>,
}

impl Corpus {
    /// Build a corpus from parallel image / label vectors.
    /// The loader guarantees both have the same length.
    pub fn new(images: Vec<Item>, labels: Vec<u8>) -> Self {
        debug_assert_eq!(images.len(), labels.len());
        Self { images, labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Length of every item, or 0 for an empty corpus.
    pub fn item_dim(&self) -> usize {
        self.images.first().map(Vec::len).unwrap_or(0)
    }

    pub fn item(&self, index: usize) -> Option<&[f32]> {
        self.images.get(index).map(Vec::as_slice)
    }

    pub fn label(&self, index: usize) -> Option<u8> {
        self.labels.get(index).copied()
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn get(&self, index: usize) -> Option<LabeledImage> {
        Some(LabeledImage {
            pixels: self.images.get(index)?.clone(),
            label:  self.label(index)?,
        })
    }

    /// Keep only the first `n` images (used for quick runs).
    pub fn truncate(&mut self, n: usize) {
        self.images.truncate(n);
        self.labels.truncate(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successor_wraps_around() {
        assert_eq!(successor_class(5), 6);
        assert_eq!(successor_class(9), 0);
        assert_eq!(successor_class(0), 1);
        // Out-of-range labels must not overflow.
        assert_eq!(successor_class(255), 6);
    }

    #[test]
    fn test_corpus_accessors() {
        let mut corpus = Corpus::new(vec![vec![0.0; 4], vec![1.0; 4]], vec![3, 7]);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.item_dim(), 4);
        assert_eq!(corpus.label(1), Some(7));
        assert_eq!(corpus.get(0).map(|i| i.label), Some(3));
        assert!(corpus.item(2).is_none());

        corpus.truncate(1);
        assert_eq!(corpus.len(), 1);
    }
}

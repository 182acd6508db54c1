// ============================================================
// Layer 4 — Labelled Pool
// ============================================================
// Groups corpus indices by class so a sample can ask for
// "a random image of class k" in O(1):
//
//   classes[0] = [12, 40, 77, ...]   ← corpus indices of 0s
//   classes[1] = [ 3,  8, 91, ...]   ← corpus indices of 1s
//   ...
//
// The pool stores indices, not pixels; the images stay in the
// shared Arc<Corpus>. Once built it is never mutated, so any
// number of threads can draw from it at the same time.

use rand::{seq::SliceRandom, Rng};
use std::sync::Arc;

use crate::domain::error::SelectError;
use crate::domain::item::{Corpus, NUM_CLASSES};

#[derive(Debug, Clone)]
pub struct LabeledPool {
    corpus:  Arc<Corpus>,
    classes: Vec<Vec<usize>>,
}

impl LabeledPool {
    /// Partition `corpus` by label, keeping at most `per_class` indices per
    /// class in corpus order. Performs no validation: classes may end up
    /// empty, and labels outside 0..10 are skipped.
    pub fn partition(corpus: Arc<Corpus>, per_class: usize) -> Self {
        let mut classes = vec![Vec::new(); NUM_CLASSES as usize];
        for (index, &label) in corpus.labels().iter().enumerate() {
            if let Some(bucket) = classes.get_mut(label as usize) {
                if bucket.len() < per_class {
                    bucket.push(index);
                }
            }
        }
        Self { corpus, classes }
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    pub fn class_len(&self, class: u8) -> usize {
        self.classes.get(class as usize).map(Vec::len).unwrap_or(0)
    }

    /// Classes that ended up with no items at all.
    pub fn empty_classes(&self) -> Vec<u8> {
        (0..NUM_CLASSES).filter(|&c| self.class_len(c) == 0).collect()
    }

    /// Draw one corpus index uniformly from the pool of `class`.
    pub fn draw<R: Rng + ?Sized>(&self, class: u8, rng: &mut R) -> Result<usize, SelectError> {
        self.classes
            .get(class as usize)
            .and_then(|bucket| bucket.choose(rng))
            .copied()
            .ok_or(SelectError::DataUnavailable { class })
    }
}

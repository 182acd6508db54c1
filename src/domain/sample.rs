// ============================================================
// Layer 3 — Selection Sample Domain Type
// ============================================================
// One training / evaluation example for the successor task:
//
//   query          — an image of class c
//   candidates     — N images
//   correct_index  — the one candidate drawn from class (c+1) % 10
//
// Example (N = 4, query is a "5"):
//   candidate labels: [2, 6, 9, 2]   correct_index: 1
//
// The labels are carried along so callers (and tests) can
// check the sampling invariants without a separate lookup.
//
// Reference: Rust Book §5 (Structs)

use serde::{Deserialize, Serialize};

use crate::domain::item::{successor_class, Item};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub query:            Item,
    pub query_label:      u8,
    pub candidates:       Vec<Item>,
    pub candidate_labels: Vec<u8>,
    pub correct_index:    usize,
}

impl Sample {
    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// The class every correct answer must belong to.
    pub fn target_class(&self) -> u8 {
        successor_class(self.query_label)
    }

    pub fn correct_candidate(&self) -> &[f32] {
        &self.candidates[self.correct_index]
    }

    /// True when the candidate at `correct_index` is from the successor
    /// class and no other position is.
    pub fn is_consistent(&self) -> bool {
        let target = self.target_class();
        self.correct_index < self.candidate_labels.len()
            && self.candidate_labels.iter().enumerate().all(|(i, &label)| {
                (i == self.correct_index) == (label == target)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(labels: Vec<u8>, correct_index: usize) -> Sample {
        Sample {
            query:            vec![0.0; 2],
            query_label:      5,
            candidates:       labels.iter().map(|&l| vec![l as f32; 2]).collect(),
            candidate_labels: labels,
            correct_index,
        }
    }

    #[test]
    fn test_consistent_sample() {
        let s = sample(vec![2, 6, 9, 2], 1);
        assert_eq!(s.target_class(), 6);
        assert_eq!(s.correct_candidate(), &[6.0, 6.0]);
        assert!(s.is_consistent());
    }

    #[test]
    fn test_distractor_from_target_class_is_inconsistent() {
        assert!(!sample(vec![6, 6, 1], 0).is_consistent());
        assert!(!sample(vec![1, 6], 0).is_consistent());
    }
}

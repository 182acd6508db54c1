// ============================================================
// Layer 4 — Selection Dataset
// ============================================================
// Produces an unlimited stream of "find the successor" samples:
//
//   query: an image of class c
//   candidates: N images, exactly one of class (c+1) % 10
//
// Three types live here:
//
//   SelectionDataset — owns the LabeledPool; build() validates
//                      it, generate_sample() draws one Sample
//   SelectionSamples — Burn Dataset view over a list of query
//                      indices; every get() draws a new Sample
//   ImageDataset     — Burn Dataset of plain labelled images
//                      for the MLP classifier
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

use burn::data::dataset::Dataset;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;

use crate::data::pool::LabeledPool;
use crate::domain::error::SelectError;
use crate::domain::item::{successor_class, Corpus, LabeledImage, NUM_CLASSES};
use crate::domain::sample::Sample;

// ─── SelectionDataset ─────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct SelectionDataset {
    pool: LabeledPool,
}

impl SelectionDataset {
    /// Partition `corpus` into a pool of at most `pool_size_per_class`
    /// items per class.
    ///
    /// Fails with `Configuration` when the pool size is zero, when a label
    /// is outside 0..10, or when any class has no items.
    pub fn build(pool_size_per_class: usize, corpus: Arc<Corpus>) -> Result<Self, SelectError> {
        if pool_size_per_class == 0 {
            return Err(SelectError::config("pool_size_per_class must be at least 1"));
        }
        if let Some(bad) = corpus.labels().iter().find(|&&l| l >= NUM_CLASSES) {
            return Err(SelectError::config(format!("label {bad} is outside 0..{NUM_CLASSES}")));
        }

        let pool    = LabeledPool::partition(corpus, pool_size_per_class);
        let missing = pool.empty_classes();
        if !missing.is_empty() {
            return Err(SelectError::config(format!("no items for classes {missing:?}")));
        }

        tracing::debug!(
            "Built labelled pool: {} items per class (max)",
            pool_size_per_class
        );
        Ok(Self { pool })
    }

    /// Wrap a pool without validating it.
    pub fn from_pool(pool: LabeledPool) -> Self {
        Self { pool }
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        self.pool.corpus()
    }

    pub fn pool(&self) -> &LabeledPool {
        &self.pool
    }

    /// Draw one sample for the query at `query_index`.
    ///
    /// Distractor classes are drawn independently per position and may
    /// repeat; they are never the successor class.
    pub fn generate_sample<R: Rng + ?Sized>(
        &self,
        query_index:    usize,
        num_candidates: usize,
        rng:            &mut R,
    ) -> Result<Sample, SelectError> {
        if num_candidates == 0 {
            return Err(SelectError::config("num_candidates must be at least 1"));
        }
        let corpus = self.pool.corpus();
        let (Some(query), Some(query_label)) = (corpus.item(query_index), corpus.label(query_index))
        else {
            return Err(SelectError::config(format!(
                "query index {query_index} out of range for corpus of {}",
                corpus.len()
            )));
        };

        if query_label >= NUM_CLASSES {
            return Err(SelectError::config(format!(
                "query {query_index} has label {query_label}, outside 0..{NUM_CLASSES}"
            )));
        }

        let target        = successor_class(query_label);
        let correct_index = rng.gen_range(0..num_candidates);

        let mut candidates       = Vec::with_capacity(num_candidates);
        let mut candidate_labels = Vec::with_capacity(num_candidates);

        for position in 0..num_candidates {
            let class = if position == correct_index {
                target
            } else {
                // Uniform over the nine classes other than `target`.
                let d = rng.gen_range(0..NUM_CLASSES - 1);
                if d >= target { d + 1 } else { d }
            };
            let index = self.pool.draw(class, rng)?;
            candidates.push(corpus.item(index).map(<[f32]>::to_vec).unwrap_or_default());
            candidate_labels.push(class);
        }

        let sample = Sample {
            query: query.to_vec(),
            query_label,
            candidates,
            candidate_labels,
            correct_index,
        };
        debug_assert!(sample.is_consistent());
        Ok(sample)
    }
}

// ─── SelectionSamples ─────────────────────────────────────────────────────────
/// Burn Dataset over a fixed list of query indices.
///
/// With a seed, get(i) always returns the same sample for the same i, no
/// matter which worker asks. Without one, each call uses the thread-local RNG
/// and yields a fresh sample.
#[derive(Debug, Clone)]
pub struct SelectionSamples {
    dataset:        Arc<SelectionDataset>,
    queries:        Vec<usize>,
    num_candidates: usize,
    seed:           Option<u64>,
}

impl SelectionSamples {
    pub fn new(
        dataset:        Arc<SelectionDataset>,
        queries:        Vec<usize>,
        num_candidates: usize,
        seed:           Option<u64>,
    ) -> Result<Self, SelectError> {
        if num_candidates == 0 {
            return Err(SelectError::config("num_candidates must be at least 1"));
        }
        let corpus_len = dataset.corpus().len();
        if let Some(bad) = queries.iter().find(|&&q| q >= corpus_len) {
            return Err(SelectError::config(format!(
                "query index {bad} out of range for corpus of {corpus_len}"
            )));
        }
        // The data loader stops at the first None, so every failure that
        // get() could hit is rejected here instead.
        let corpus = dataset.corpus();
        if let Some(&bad) = queries
            .iter()
            .find(|&&q| corpus.label(q).map_or(true, |l| l >= NUM_CLASSES))
        {
            return Err(SelectError::config(format!(
                "query {bad} has no label in 0..{NUM_CLASSES}"
            )));
        }
        if let Some(&class) = dataset.pool().empty_classes().first() {
            return Err(SelectError::DataUnavailable { class });
        }
        Ok(Self { dataset, queries, num_candidates, seed })
    }

    pub fn num_candidates(&self) -> usize {
        self.num_candidates
    }

    fn rng_for(seed: u64, index: usize) -> StdRng {
        StdRng::seed_from_u64(seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

impl Dataset<Sample> for SelectionSamples {
    fn get(&self, index: usize) -> Option<Sample> {
        let query_index = *self.queries.get(index)?;
        let result = match self.seed {
            Some(seed) => {
                let mut rng = Self::rng_for(seed, index);
                self.dataset.generate_sample(query_index, self.num_candidates, &mut rng)
            }
            None => {
                let mut rng = rand::thread_rng();
                self.dataset.generate_sample(query_index, self.num_candidates, &mut rng)
            }
        };
        match result {
            Ok(sample) => Some(sample),
            Err(e) => {
                tracing::error!("Cannot generate sample for query {}: {}", query_index, e);
                None
            }
        }
    }

    fn len(&self) -> usize {
        self.queries.len()
    }
}

// ─── ImageDataset ─────────────────────────────────────────────────────────────
/// Burn Dataset of labelled images, used by the classifier.
#[derive(Debug, Clone)]
pub struct ImageDataset {
    corpus:  Arc<Corpus>,
    indices: Vec<usize>,
}

impl ImageDataset {
    pub fn new(corpus: Arc<Corpus>, indices: Vec<usize>) -> Self {
        Self { corpus, indices }
    }

    /// Every image in the corpus, in order.
    pub fn full(corpus: Arc<Corpus>) -> Self {
        let indices = (0..corpus.len()).collect();
        Self { corpus, indices }
    }
}

impl Dataset<LabeledImage> for ImageDataset {
    fn get(&self, index: usize) -> Option<LabeledImage> {
        self.corpus.get(*self.indices.get(index)?)
    }

    fn len(&self) -> usize {
        self.indices.len()
    }
}

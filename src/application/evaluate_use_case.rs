// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Reloads a trained pointer network and measures it on the
// held-out IDX test split:
//
//   1. Read train_config.json   → exact architecture + N
//   2. Load test corpus         → fresh labelled pool
//   3. Rebuild model, load weights
//   4. Accuracy over seeded samples (same sets every run)
//   5. A few example selections with probabilities

use anyhow::Result;
use burn::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;

use crate::application::train_use_case::SavedPointerRun;
use crate::data::{
    dataset::{SelectionDataset, SelectionSamples},
    loader::IdxLoader,
};
use crate::domain::{
    sample::Sample,
    traits::{CorpusSource, Split},
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::device::{cpu_device, gpu_device, CpuBackend, DeviceKind, GpuBackend};
use crate::ml::evaluator::evaluate_pointer;
use crate::ml::inferencer::{Selection, Selector};

#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    pub checkpoint_dir: String,
    /// Falls back to the directory used for training
    pub corpus_dir:     Option<String>,
    /// Falls back to the device used for training
    pub device:         Option<DeviceKind>,
    pub max_images:     Option<usize>,
    pub batch_size:     usize,
    pub examples:       usize,
    pub seed:           u64,
}

/// One printed example: the sample and what the model chose.
#[derive(Debug, Clone)]
pub struct Example {
    pub sample:    Sample,
    pub selection: Selection,
}

impl Example {
    pub fn is_correct(&self) -> bool {
        self.selection.index == self.sample.correct_index
    }
}

#[derive(Debug, Clone)]
pub struct EvaluationSummary {
    pub num_candidates: usize,
    pub samples:        usize,
    pub loss:           f64,
    pub accuracy:       f64,
    pub examples:       Vec<Example>,
}

pub struct EvaluateUseCase {
    config: EvaluateConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvaluateConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<EvaluationSummary> {
        let cfg   = &self.config;
        let ckpt  = CheckpointManager::new(&cfg.checkpoint_dir)?;
        let saved: SavedPointerRun = ckpt.load_config()?;

        let corpus_dir = cfg.corpus_dir.clone().unwrap_or_else(|| saved.train.corpus_dir.clone());
        let corpus     = Arc::new(
            IdxLoader::new(&corpus_dir).with_limit(cfg.max_images).load(Split::Test)?,
        );
        let dataset = Arc::new(SelectionDataset::build(
            saved.train.pool_size_per_class,
            corpus.clone(),
        )?);

        match cfg.device.unwrap_or(saved.train.device) {
            DeviceKind::Cpu  => self.run::<CpuBackend>(&ckpt, &saved, dataset, cpu_device()),
            DeviceKind::Wgpu => self.run::<GpuBackend>(&ckpt, &saved, dataset, gpu_device()),
        }
    }

    fn run<B: Backend>(
        &self,
        ckpt:    &CheckpointManager,
        saved:   &SavedPointerRun,
        dataset: Arc<SelectionDataset>,
        device:  B::Device,
    ) -> Result<EvaluationSummary> {
        let cfg            = &self.config;
        let num_candidates = saved.train.num_candidates;
        let selector       = Selector::<B>::from_checkpoint(ckpt, &saved.model, device.clone())?;

        let queries: Vec<usize> = (0..dataset.corpus().len()).collect();
        let samples = SelectionSamples::new(
            dataset.clone(),
            queries.clone(),
            num_candidates,
            Some(cfg.seed),
        )?;
        let report = evaluate_pointer(selector.model(), samples, cfg.batch_size, device);

        tracing::info!(
            "Test: {} samples, loss {:.4}, accuracy {:.2}%",
            report.accuracy.samples,
            report.loss,
            report.accuracy.accuracy() * 100.0
        );

        let mut rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(1));
        let mut examples = Vec::with_capacity(cfg.examples);
        for &query_index in queries.iter().take(cfg.examples) {
            let sample    = dataset.generate_sample(query_index, num_candidates, &mut rng)?;
            let selection = selector.select(&sample.query, &sample.candidates)?;
            examples.push(Example { sample, selection });
        }

        Ok(EvaluationSummary {
            num_candidates,
            samples:  report.accuracy.samples,
            loss:     report.loss,
            accuracy: report.accuracy.accuracy(),
            examples,
        })
    }
}

// ============================================================
// Layer 2 — TrainUseCase (pointer network)
// ============================================================
// Orchestrates the pointer-network training pipeline:
//
//   Step 1: Load the IDX training split   (Layer 4 - data)
//   Step 2: Build the labelled pool       (Layer 4 - data)
//   Step 3: Split query indices           (Layer 4 - data)
//   Step 4: Wrap them as Burn datasets    (Layer 4 - data)
//   Step 5: Save config                   (Layer 6 - infra)
//   Step 6: Run training loop             (Layer 5 - ml)
//
// Training samples are drawn fresh on every access, so each
// epoch sees new candidate sets. Validation samples are
// seeded so every epoch is measured on the same sets.

use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Arc};

use crate::data::{
    dataset::{SelectionDataset, SelectionSamples},
    loader::IdxLoader,
    splitter::split_train_val,
};
use crate::domain::traits::{CorpusSource, Split};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::device::DeviceKind;
use crate::ml::model::PointerNetConfig;
use crate::ml::scorer::ScorerKind;
use crate::ml::sequential::LayerSpec;
use crate::ml::trainer::{run_pointer_training, RunOutputs};

// ─── Training Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub corpus_dir:          String,
    pub checkpoint_dir:      String,
    pub device:              DeviceKind,
    pub scorer:              ScorerKind,
    pub hidden_dim:          usize,
    /// Widths of the Linear+ReLU encoder layers (empty = raw pixels)
    pub encoder_dims:        Vec<usize>,
    pub num_candidates:      usize,
    pub pool_size_per_class: usize,
    /// Read at most this many training images
    pub max_images:          Option<usize>,
    pub train_fraction:      f64,
    pub batch_size:          usize,
    pub epochs:              usize,
    pub lr:                  f64,
    pub seed:                u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            corpus_dir:          "data/mnist".to_string(),
            checkpoint_dir:      "checkpoints/pointer".to_string(),
            device:              DeviceKind::Cpu,
            scorer:              ScorerKind::Additive,
            hidden_dim:          128,
            encoder_dims:        vec![256],
            num_candidates:      10,
            pool_size_per_class: 1000,
            max_images:          None,
            train_fraction:      0.9,
            batch_size:          64,
            epochs:              5,
            lr:                  1e-3,
            seed:                42,
        }
    }
}

impl TrainConfig {
    pub fn encoder_specs(&self) -> Vec<LayerSpec> {
        self.encoder_dims
            .iter()
            .flat_map(|&out| [LayerSpec::Linear { out }, LayerSpec::Relu])
            .collect()
    }

    pub fn model_config(&self, input_dim: usize) -> PointerNetConfig {
        PointerNetConfig::new(input_dim, self.encoder_specs(), self.scorer, self.hidden_dim)
    }
}

/// What gets written to train_config.json: the run settings plus the exact
/// architecture, so evaluation can rebuild the model without the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPointerRun {
    pub train: TrainConfig,
    pub model: PointerNetConfig,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Load the training split ──────────────────────────────────
        let loader = IdxLoader::new(&cfg.corpus_dir).with_limit(cfg.max_images);
        let corpus = Arc::new(loader.load(Split::Train)?);

        // ── Step 2: Labelled pool ────────────────────────────────────────────
        let dataset = Arc::new(SelectionDataset::build(cfg.pool_size_per_class, corpus.clone())?);

        // ── Step 3: Train / validation split of the query indices ────────────
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let (train_queries, val_queries) =
            split_train_val((0..corpus.len()).collect(), cfg.train_fraction, &mut rng);
        tracing::info!(
            "Split: {} train queries, {} validation queries",
            train_queries.len(),
            val_queries.len()
        );

        // ── Step 4: Burn datasets ────────────────────────────────────────────
        let train = SelectionSamples::new(dataset.clone(), train_queries, cfg.num_candidates, None)?;
        let val   = SelectionSamples::new(dataset, val_queries, cfg.num_candidates, Some(cfg.seed))?;

        // ── Step 5: Save config for evaluation ───────────────────────────────
        let model_cfg = cfg.model_config(corpus.item_dim());
        let ckpt      = CheckpointManager::new(PathBuf::from(&cfg.checkpoint_dir))?;
        ckpt.save_config(&SavedPointerRun { train: cfg.clone(), model: model_cfg.clone() })?;
        let metrics   = MetricsLogger::new(ckpt.dir())?;

        // ── Step 6: Training loop ────────────────────────────────────────────
        let history = run_pointer_training(
            cfg,
            &model_cfg,
            train,
            val,
            RunOutputs { checkpoints: ckpt, metrics },
        )?;

        if let Some(best) = history.iter().max_by(|a, b| a.val_acc.total_cmp(&b.val_acc)) {
            tracing::info!(
                "Best validation accuracy {:.2}% at epoch {}",
                best.val_acc * 100.0,
                best.epoch
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_specs_pair_linear_with_relu() {
        let cfg = TrainConfig { encoder_dims: vec![64, 32], ..TrainConfig::default() };
        assert_eq!(
            cfg.encoder_specs(),
            vec![
                LayerSpec::Linear { out: 64 },
                LayerSpec::Relu,
                LayerSpec::Linear { out: 32 },
                LayerSpec::Relu,
            ]
        );
    }

    #[test]
    fn test_model_config_uses_item_dim() {
        let cfg   = TrainConfig { scorer: ScorerKind::Dot, ..TrainConfig::default() };
        let model = cfg.model_config(784);
        assert_eq!(model.input_dim, 784);
        assert_eq!(model.scorer, ScorerKind::Dot);
        assert_eq!(model.hidden_dim, cfg.hidden_dim);
    }

    #[test]
    fn test_saved_run_round_trips_through_json() {
        let cfg   = TrainConfig::default();
        let saved = SavedPointerRun { model: cfg.model_config(784), train: cfg };
        let json  = serde_json::to_string(&saved).unwrap();
        let back: SavedPointerRun = serde_json::from_str(&json).unwrap();
        assert_eq!(back.train.num_candidates, 10);
        assert_eq!(back.model.encoder.len(), 2);
    }

    #[test]
    fn test_missing_corpus_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            corpus_dir:     dir.path().join("nope").display().to_string(),
            checkpoint_dir: dir.path().join("ckpt").display().to_string(),
            ..TrainConfig::default()
        };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }
}

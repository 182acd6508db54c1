// ============================================================
// Layer 2 — ClassifyUseCase (MLP image classifier)
// ============================================================
//   Step 1: Load train and test splits    (Layer 4 - data)
//   Step 2: Wrap them as Burn datasets    (Layer 4 - data)
//   Step 3: Save config                   (Layer 6 - infra)
//   Step 4: Run training loop             (Layer 5 - ml)
//
// The test split doubles as the per-epoch evaluation set.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::{dataset::ImageDataset, loader::IdxLoader};
use crate::domain::traits::{CorpusSource, Split};
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::device::DeviceKind;
use crate::ml::model::MlpClassifierConfig;
use crate::ml::trainer::{run_classifier_training, RunOutputs};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub corpus_dir:     String,
    pub checkpoint_dir: String,
    pub device:         DeviceKind,
    pub hidden:         Vec<usize>,
    pub dropout:        f64,
    pub max_images:     Option<usize>,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub seed:           u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            corpus_dir:     "data/mnist".to_string(),
            checkpoint_dir: "checkpoints/classifier".to_string(),
            device:         DeviceKind::Cpu,
            hidden:         vec![128, 64],
            dropout:        0.0,
            max_images:     None,
            batch_size:     64,
            epochs:         5,
            lr:             1e-3,
            seed:           42,
        }
    }
}

impl ClassifierConfig {
    pub fn model_config(&self, input_dim: usize) -> MlpClassifierConfig {
        MlpClassifierConfig::new(input_dim, self.hidden.clone()).with_dropout(self.dropout)
    }
}

pub struct ClassifyUseCase {
    config: ClassifierConfig,
}

impl ClassifyUseCase {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg    = &self.config;
        let loader = IdxLoader::new(&cfg.corpus_dir).with_limit(cfg.max_images);

        let train_corpus = Arc::new(loader.load(Split::Train)?);
        let test_corpus  = Arc::new(loader.load(Split::Test)?);

        let model_cfg = cfg.model_config(train_corpus.item_dim());
        let ckpt      = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt.save_config(cfg)?;
        let metrics   = MetricsLogger::new(ckpt.dir())?;

        let history = run_classifier_training(
            cfg,
            &model_cfg,
            ImageDataset::full(train_corpus),
            ImageDataset::full(test_corpus),
            RunOutputs { checkpoints: ckpt, metrics },
        )?;

        if let Some(last) = history.last() {
            tracing::info!("Final test accuracy: {:.2}%", last.val_acc * 100.0);
        }
        Ok(())
    }
}

// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved per checkpoint directory:
//   1. Model weights (.mpk.gz file) — all learned parameters
//   2. latest_epoch.json            — which epoch was last saved
//   3. train_config.json            — the run configuration,
//                                     including the architecture
//
// The config has to be loaded first: it is the only way to
// rebuild a model of the right shape before the weights are
// poured into it.
//
// File naming convention:
//   checkpoints/pointer/
//     model_epoch_1.mpk.gz
//     model_epoch_2.mpk.gz
//     latest_epoch.json
//     train_config.json
//     metrics.csv
//
// Works for any Burn Module, so the pointer network and the
// classifier share it.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    module::Module,
    record::CompactRecorder,
    tensor::backend::Backend,
};

const CONFIG_FILE: &str = "train_config.json";
const LATEST_FILE: &str = "latest_epoch.json";

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save model weights for a given epoch and mark it as the latest.
    pub fn save_model<B: Backend, M: Module<B>>(&self, model: &M, epoch: usize) -> Result<()> {
        // The recorder adds the extension.
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        model
            .clone()
            .save_file(path.clone(), &CompactRecorder::new())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        fs::write(self.dir.join(LATEST_FILE), serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write {LATEST_FILE}"))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the latest saved weights into `model`.
    ///
    /// `model` must have the same architecture as the saved one; build it
    /// from `load_config` first.
    pub fn load_model<B: Backend, M: Module<B>>(&self, model: M, device: &B::Device) -> Result<M> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        model
            .load_file(path.clone(), &CompactRecorder::new(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })
    }

    /// Save the run configuration to JSON.
    pub fn save_config<T: Serialize>(&self, cfg: &T) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the run configuration saved by `save_config`.
    pub fn load_config<T: DeserializeOwned>(&self) -> Result<T> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run training first.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config in '{}'", path.display()))
    }

    /// Read latest_epoch.json and return the epoch number.
    pub fn latest_epoch(&self) -> Result<usize> {
        let s = fs::read_to_string(self.dir.join(LATEST_FILE))
            .with_context(|| {
                format!("Cannot find '{LATEST_FILE}'. Have you run training first?")
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

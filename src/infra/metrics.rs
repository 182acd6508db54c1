// ============================================================
// Layer 6 — Metrics
// ============================================================
// Two things live here:
//
//   AccuracyCounter — running correct / total tally. The total
//                     is the number of SAMPLES seen, never the
//                     number of batches.
//   MetricsLogger   — appends one CSV row per epoch.
//
// Output file: <checkpoint_dir>/metrics.csv
//
//   epoch,train_loss,val_loss,val_acc
//   1,2.251300,2.198400,0.184000
//   2,1.904100,1.887300,0.352000
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

// ─── AccuracyCounter ──────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyCounter {
    pub correct: usize,
    pub samples: usize,
}

impl AccuracyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one batch: `correct` hits out of `batch_size` samples.
    pub fn add_batch(&mut self, correct: usize, batch_size: usize) {
        self.correct += correct.min(batch_size);
        self.samples += batch_size;
    }

    /// Fraction in [0, 1]; 0 when nothing has been counted.
    pub fn accuracy(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.correct as f64 / self.samples as f64
        }
    }
}

// ─── EpochMetrics ─────────────────────────────────────────────────────────────
/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average cross-entropy loss over all training batches
    pub train_loss: f64,

    /// Average cross-entropy loss on the validation set
    pub val_loss: f64,

    /// Fraction of validation samples predicted correctly
    pub val_acc: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, val_acc: f64) -> Self {
        Self { epoch, train_loss, val_loss, val_acc }
    }

    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

// ─── MetricsLogger ────────────────────────────────────────────────────────────
/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");

        // Header only for a new file, so reruns append to the same log.
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,val_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch,
            m.train_loss,
            m.val_loss,
            m.val_acc,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 2.5, 2.3, 0.2);
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
    }

    #[test]
    fn test_accuracy_uses_sample_count() {
        let mut acc = AccuracyCounter::new();
        // Three batches of 64, 64 and 32 samples.
        acc.add_batch(32, 64);
        acc.add_batch(64, 64);
        acc.add_batch(16, 32);
        assert_eq!(acc.samples, 160);
        assert!((acc.accuracy() - 112.0 / 160.0).abs() < 1e-12);
        assert!(acc.accuracy() <= 1.0);
    }

    #[test]
    fn test_empty_accuracy_is_zero() {
        assert_eq!(AccuracyCounter::new().accuracy(), 0.0);
    }

    #[test]
    fn test_csv_appends_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 2.0, 1.5, 0.25)).unwrap();
        logger.log(&EpochMetrics::new(2, 1.0, 0.5, 0.75)).unwrap();

        // A second logger on the same dir must not rewrite the header.
        let again = MetricsLogger::new(dir.path()).unwrap();
        let csv   = fs::read_to_string(again.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,train_loss,val_loss,val_acc");
        assert_eq!(lines[2], "2,1.000000,0.500000,0.750000");
    }
}

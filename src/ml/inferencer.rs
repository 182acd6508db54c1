// ============================================================
// Layer 5 — Selector (inference)
// ============================================================
// Loads a trained pointer network and picks one candidate
// for a given query:
//
//   raw scores     → model (no normalisation inside)
//   probabilities  → softmax over the scores, applied here
//   chosen index   → arg-max of the scores
use anyhow::Result;
use burn::{prelude::*, tensor::activation::softmax};

use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{PointerNet, PointerNetConfig};
use crate::ml::scorer::CandidateScorer;

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub index:         usize,
    pub confidence:    f32,
    pub scores:        Vec<f32>,
    pub probabilities: Vec<f32>,
}

/// Index of the largest score; the first one wins ties.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((i, s)),
        })
        .map(|(i, _)| i)
}

pub struct Selector<B: Backend> {
    model:  PointerNet<B>,
    device: B::Device,
}

impl<B: Backend> Selector<B> {
    pub fn new(model: PointerNet<B>, device: B::Device) -> Self {
        Self { model, device }
    }

    pub fn from_checkpoint(
        ckpt:      &CheckpointManager,
        model_cfg: &PointerNetConfig,
        device:    B::Device,
    ) -> Result<Self> {
        let model: PointerNet<B> = model_cfg.init(&device)?;
        let model = ckpt.load_model::<B, _>(model, &device)?;
        tracing::info!("Pointer model loaded from checkpoint");
        Ok(Self { model, device })
    }

    pub fn model(&self) -> &PointerNet<B> {
        &self.model
    }

    pub fn select(&self, query: &[f32], candidates: &[Vec<f32>]) -> Result<Selection> {
        let scores = self.model.score_items(query, candidates, &self.device)?;

        let probabilities: Vec<f32> = softmax(
            Tensor::<B, 1>::from_floats(scores.as_slice(), &self.device),
            0,
        )
        .into_data()
        .iter::<f32>()
        .collect();

        // score_items never returns an empty vector.
        let index      = argmax(&scores).unwrap_or(0);
        let confidence = probabilities.get(index).copied().unwrap_or(0.0);

        tracing::debug!("Selected candidate {} (p={:.4})", index, confidence);
        Ok(Selection { index, confidence, scores, probabilities })
    }
}

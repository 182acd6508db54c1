use burn::{
    nn::loss::CrossEntropyLossConfig,
    prelude::*,
};

use crate::domain::error::SelectError;
use crate::ml::scorer::{CandidateScorer, Scorer, ScorerConfig, ScorerKind};
use crate::ml::sequential::{LayerSpec, Sequential, SequentialBuilder};

// Persisted inside train_config.json; evaluation rebuilds the model from it.
#[derive(Config, Debug)]
pub struct PointerNetConfig {
    /// Length of a flattened image
    pub input_dim:  usize,
    /// Layers applied to query and candidates before scoring (may be empty)
    pub encoder:    Vec<LayerSpec>,
    pub scorer:     ScorerKind,
    pub hidden_dim: usize,
}

impl PointerNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<PointerNet<B>, SelectError> {
        let encoder = SequentialBuilder::from_specs(self.input_dim, &self.encoder).build(device)?;
        let scorer  = ScorerConfig::new(self.scorer, encoder.output_dim, self.hidden_dim).init(device)?;
        Ok(PointerNet { encoder, scorer })
    }
}

/// Encoder + scorer. Points at one of N candidates by emitting one raw
/// score per candidate.
#[derive(Module, Debug)]
pub struct PointerNet<B: Backend> {
    pub encoder: Sequential<B>,
    pub scorer:  Scorer<B>,
}

impl<B: Backend> PointerNet<B> {
    pub fn forward_loss(
        &self,
        queries:    Tensor<B, 2>,
        candidates: Tensor<B, 3>,
        targets:    Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let scores = self.forward(queries, candidates);
        // Cross-entropy takes the raw scores; softmax happens inside the loss.
        let ce   = CrossEntropyLossConfig::new().init(&scores.device());
        let loss = ce.forward(scores.clone(), targets);
        (loss, scores)
    }
}

impl<B: Backend> CandidateScorer<B> for PointerNet<B> {
    fn input_dim(&self) -> usize {
        self.encoder.input_dim
    }

    /// queries: [batch, input_dim], candidates: [batch, n, input_dim] → [batch, n]
    fn forward(&self, queries: Tensor<B, 2>, candidates: Tensor<B, 3>) -> Tensor<B, 2> {
        let queries    = self.encoder.forward(queries);
        let candidates = self.encoder.forward(candidates);
        self.scorer.forward(queries, candidates)
    }
}

// ─── MLP Classifier ───────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct MlpClassifierConfig {
    pub input_dim:   usize,
    pub hidden:      Vec<usize>,
    #[config(default = 10)]
    pub num_classes: usize,
    #[config(default = 0.0)]
    pub dropout:     f64,
}

impl MlpClassifierConfig {
    /// input → [Linear → ReLU → (Dropout)]* → Linear(num_classes)
    pub fn builder(&self) -> SequentialBuilder {
        let mut builder = SequentialBuilder::new(self.input_dim);
        for &width in &self.hidden {
            builder = builder.linear(width).relu();
            if self.dropout > 0.0 {
                builder = builder.dropout(self.dropout);
            }
        }
        builder.linear(self.num_classes)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<MlpClassifier<B>, SelectError> {
        Ok(MlpClassifier { layers: self.builder().build(device)? })
    }
}

#[derive(Module, Debug)]
pub struct MlpClassifier<B: Backend> {
    pub layers: Sequential<B>,
}

impl<B: Backend> MlpClassifier<B> {
    /// images: [batch, input_dim] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        self.layers.forward(images)
    }

    pub fn forward_loss(
        &self,
        images: Tensor<B, 2>,
        labels: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(images);
        let ce     = CrossEntropyLossConfig::new().init(&logits.device());
        let loss   = ce.forward(logits.clone(), labels);
        (loss, logits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::optim::{AdamConfig, GradientsParams, Optimizer};
    use burn::tensor::ElementConversion;

    type TestBackend = NdArray;

    fn pointer_config() -> PointerNetConfig {
        PointerNetConfig::new(
            6,
            vec![LayerSpec::Linear { out: 5 }, LayerSpec::Relu],
            ScorerKind::Additive,
            4,
        )
    }

    #[test]
    fn test_pointer_scores_one_per_candidate() {
        let device = Default::default();
        let model  = pointer_config().init::<TestBackend>(&device).unwrap();
        assert_eq!(model.input_dim(), 6);
        assert_eq!(model.scorer.input_dim(), 5);

        let queries    = Tensor::<TestBackend, 2>::ones([3, 6], &device);
        let candidates = Tensor::<TestBackend, 3>::ones([3, 4, 6], &device);
        assert_eq!(model.forward(queries, candidates).dims(), [3, 4]);
    }

    #[test]
    fn test_pointer_rejects_wrong_item_size() {
        let device = Default::default();
        let model  = pointer_config().init::<TestBackend>(&device).unwrap();
        let err    = model.score_items(&[0.0; 5], &[vec![0.0; 6]], &device).unwrap_err();
        assert!(matches!(err, SelectError::ShapeMismatch { what: "query", .. }));
    }

    #[test]
    fn test_pointer_without_encoder() {
        let device = Default::default();
        let cfg    = PointerNetConfig::new(3, vec![], ScorerKind::Dot, 2);
        let model  = cfg.init::<TestBackend>(&device).unwrap();
        assert!(model.encoder.is_empty());
        assert_eq!(model.score_items(&[1.0; 3], &vec![vec![0.0; 3]; 5], &device).unwrap().len(), 5);
    }

    #[test]
    fn test_pointer_loss_is_finite_and_step_runs() {
        type Train = Autodiff<NdArray>;
        let device = Default::default();
        let model  = pointer_config().init::<Train>(&device).unwrap();

        let queries    = Tensor::<Train, 2>::ones([2, 6], &device);
        let candidates = Tensor::<Train, 3>::zeros([2, 3, 6], &device);
        let targets    = Tensor::<Train, 1, Int>::from_ints([0, 2], &device);

        let (loss, scores) = model.forward_loss(queries, candidates, targets);
        assert_eq!(scores.dims(), [2, 3]);
        let value: f32 = loss.clone().into_scalar().elem();
        assert!(value.is_finite());

        let mut optim = AdamConfig::new().init();
        let grads     = GradientsParams::from_grads(loss.backward(), &model);
        let _model    = optim.step(1e-3, model, grads);
    }

    #[test]
    fn test_classifier_shapes() {
        let device = Default::default();
        let cfg    = MlpClassifierConfig::new(8, vec![6, 4]).with_dropout(0.1);
        assert_eq!(cfg.builder().specs().len(), 7);

        let model  = cfg.init::<TestBackend>(&device).unwrap();
        let images = Tensor::<TestBackend, 2>::zeros([5, 8], &device);
        let labels = Tensor::<TestBackend, 1, Int>::from_ints([0, 1, 2, 3, 9], &device);

        let (loss, logits) = model.forward_loss(images, labels);
        assert_eq!(logits.dims(), [5, 10]);
        assert!(loss.into_scalar().elem::<f32>().is_finite());
    }
}

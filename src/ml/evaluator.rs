// ============================================================
// Layer 5 — Evaluation
// ============================================================
// Runs a model over a dataset without gradients and reports
// the mean loss and accuracy. Shared by the per-epoch
// validation pass and by the `evaluate` command.
//
// Both numbers are normalised by the number of SAMPLES, so a
// short final batch does not skew them.
//
// argmax(1) returns shape [batch, 1]; flatten to [batch]
// before comparing with the targets.

use burn::{
    data::dataloader::DataLoaderBuilder,
    prelude::*,
    tensor::ElementConversion,
};

use crate::data::{
    batcher::{ImageBatcher, SelectionBatcher},
    dataset::{ImageDataset, SelectionSamples},
};
use crate::infra::metrics::AccuracyCounter;
use crate::ml::model::{MlpClassifier, PointerNet};

#[derive(Debug, Clone, Copy)]
pub struct EvalReport {
    /// Mean cross-entropy per sample (NaN when nothing was evaluated)
    pub loss:     f64,
    pub accuracy: AccuracyCounter,
}

impl EvalReport {
    fn from_sums(loss_sum: f64, accuracy: AccuracyCounter) -> Self {
        let loss = if accuracy.samples > 0 {
            loss_sum / accuracy.samples as f64
        } else {
            f64::NAN
        };
        Self { loss, accuracy }
    }
}

/// Number of rows whose arg-max equals the target.
pub fn count_correct<B: Backend>(scores: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    let predicted = scores.argmax(1).flatten::<1>(0, 1);
    let hits: i64 = predicted.equal(targets).int().sum().into_scalar().elem::<i64>();
    hits.max(0) as usize
}

pub fn evaluate_pointer<B: Backend>(
    model:      &PointerNet<B>,
    samples:    SelectionSamples,
    batch_size: usize,
    device:     B::Device,
) -> EvalReport {
    let loader = DataLoaderBuilder::new(SelectionBatcher::<B>::new(device))
        .batch_size(batch_size)
        .num_workers(1)
        .build(samples);

    let mut loss_sum = 0.0f64;
    let mut accuracy = AccuracyCounter::new();

    for batch in loader.iter() {
        let batch_len = batch.targets.dims()[0];
        let (loss, scores) = model.forward_loss(
            batch.queries,
            batch.candidates,
            batch.targets.clone(),
        );
        loss_sum += loss.into_scalar().elem::<f64>() * batch_len as f64;
        accuracy.add_batch(count_correct(scores, batch.targets), batch_len);
    }

    EvalReport::from_sums(loss_sum, accuracy)
}

pub fn evaluate_classifier<B: Backend>(
    model:      &MlpClassifier<B>,
    dataset:    ImageDataset,
    batch_size: usize,
    device:     B::Device,
) -> EvalReport {
    let loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(device))
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset);

    let mut loss_sum = 0.0f64;
    let mut accuracy = AccuracyCounter::new();

    for batch in loader.iter() {
        let batch_len = batch.labels.dims()[0];
        let (loss, logits) = model.forward_loss(batch.images, batch.labels.clone());
        loss_sum += loss.into_scalar().elem::<f64>() * batch_len as f64;
        accuracy.add_batch(count_correct(logits, batch.labels), batch_len);
    }

    EvalReport::from_sums(loss_sum, accuracy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use std::sync::Arc;

    use crate::data::dataset::SelectionDataset;
    use crate::domain::item::{Corpus, NUM_CLASSES};
    use crate::ml::model::{MlpClassifierConfig, PointerNetConfig};
    use crate::ml::scorer::ScorerKind;

    type TestBackend = NdArray;

    fn toy_corpus() -> Arc<Corpus> {
        let mut images = Vec::new();
        let mut labels = Vec::new();
        for rep in 0..2 {
            for class in 0..NUM_CLASSES {
                images.push(vec![class as f32 / 10.0 + rep as f32 * 0.01; 4]);
                labels.push(class);
            }
        }
        Arc::new(Corpus::new(images, labels))
    }

    #[test]
    fn test_count_correct() {
        let device = Default::default();
        let scores = Tensor::<TestBackend, 2>::from_floats(
            [[0.1, 0.9, 0.0], [2.0, 1.0, 0.0], [0.0, 0.0, 5.0]],
            &device,
        );
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 2], &device);
        assert_eq!(count_correct(scores, targets), 2);
    }

    #[test]
    fn test_pointer_evaluation_counts_every_sample() {
        let device  = Default::default();
        let dataset = Arc::new(SelectionDataset::build(2, toy_corpus()).unwrap());
        let samples = SelectionSamples::new(dataset, (0..7).collect(), 3, Some(1)).unwrap();
        let model   = PointerNetConfig::new(4, vec![], ScorerKind::Additive, 3)
            .init::<TestBackend>(&device)
            .unwrap();

        // Batch size 3 over 7 samples: batches of 3, 3 and 1.
        let report = evaluate_pointer(&model, samples, 3, device);
        assert_eq!(report.accuracy.samples, 7);
        assert!(report.accuracy.accuracy() <= 1.0);
        assert!(report.loss.is_finite());
    }

    #[test]
    fn test_classifier_evaluation() {
        let device = Default::default();
        let model  = MlpClassifierConfig::new(4, vec![5])
            .init::<TestBackend>(&device)
            .unwrap();

        let report = evaluate_classifier(&model, ImageDataset::full(toy_corpus()), 8, device);
        assert_eq!(report.accuracy.samples, 20);
        assert!(report.loss.is_finite());
    }

    #[test]
    fn test_empty_report() {
        let report = EvalReport::from_sums(0.0, AccuracyCounter::new());
        assert!(report.loss.is_nan());
        assert_eq!(report.accuracy.accuracy(), 0.0);
    }
}

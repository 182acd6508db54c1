// ============================================================
// Layer 4 — Batchers
// ============================================================
// Implement Burn's Batcher trait to stack samples into tensors.
//
//   SelectionBatcher: Vec<Sample> →
//       queries    [batch, dim]
//       candidates [batch, num_candidates, dim]
//       targets    [batch]            (correct_index, Int)
//
//   ImageBatcher: Vec<LabeledImage> →
//       images [batch, dim]
//       labels [batch]                (Int)
//
// Every vector is flattened into one long Vec and reshaped,
// the same trick for all tensors. All samples in a batch must
// share num_candidates and dim; the dataset guarantees this.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::item::LabeledImage;
use crate::domain::sample::Sample;

// ─── SelectionBatch ───────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct SelectionBatch<B: Backend> {
    /// Query images — shape: [batch_size, dim]
    pub queries: Tensor<B, 2>,

    /// Candidate images — shape: [batch_size, num_candidates, dim]
    pub candidates: Tensor<B, 3>,

    /// Index of the correct candidate per sample — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct SelectionBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SelectionBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<Sample, SelectionBatch<B>> for SelectionBatcher<B> {
    fn batch(&self, items: Vec<Sample>) -> SelectionBatch<B> {
        let batch_size     = items.len();
        let dim            = items[0].query.len();
        let num_candidates = items[0].candidates.len();

        let query_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.query.iter().copied())
            .collect();

        let cand_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.candidates.iter().flat_map(|c| c.iter().copied()))
            .collect();

        let targets: Vec<i32> = items
            .iter()
            .map(|s| s.correct_index as i32)
            .collect();

        let queries = Tensor::<B, 1>::from_floats(query_flat.as_slice(), &self.device)
            .reshape([batch_size, dim]);

        let candidates = Tensor::<B, 1>::from_floats(cand_flat.as_slice(), &self.device)
            .reshape([batch_size, num_candidates, dim]);

        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device);

        SelectionBatch { queries, candidates, targets }
    }
}

// ─── ImageBatch ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Flattened images — shape: [batch_size, dim]
    pub images: Tensor<B, 2>,

    /// Class labels — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<LabeledImage, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<LabeledImage>) -> ImageBatch<B> {
        let batch_size = items.len();
        let dim        = items[0].pixels.len();

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|img| img.pixels.iter().copied())
            .collect();
        let labels: Vec<i32> = items.iter().map(|img| img.label as i32).collect();

        let images = Tensor::<B, 1>::from_floats(pixels.as_slice(), &self.device)
            .reshape([batch_size, dim]);
        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        ImageBatch { images, labels }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn sample(correct_index: usize, fill: f32) -> Sample {
        Sample {
            query:            vec![fill; 3],
            query_label:      1,
            candidates:       vec![vec![0.0; 3], vec![fill; 3]],
            candidate_labels: vec![0, 2],
            correct_index,
        }
    }

    #[test]
    fn test_selection_batch_shapes() {
        let batcher = SelectionBatcher::<TestBackend>::new(Default::default());
        let batch   = batcher.batch(vec![sample(1, 0.5), sample(0, 0.25)]);

        assert_eq!(batch.queries.dims(), [2, 3]);
        assert_eq!(batch.candidates.dims(), [2, 2, 3]);
        assert_eq!(batch.targets.dims(), [2]);

        let targets: Vec<i64> = batch.targets.into_data().iter::<i64>().collect();
        assert_eq!(targets, vec![1, 0]);
    }

    #[test]
    fn test_candidates_keep_their_order() {
        let batcher = SelectionBatcher::<TestBackend>::new(Default::default());
        let batch   = batcher.batch(vec![sample(1, 0.5)]);

        let values = batch.candidates.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![0.0, 0.0, 0.0, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_image_batch_shapes() {
        let batcher = ImageBatcher::<TestBackend>::new(Default::default());
        let items   = vec![
            LabeledImage { pixels: vec![0.0; 4], label: 3 },
            LabeledImage { pixels: vec![1.0; 4], label: 8 },
        ];
        let batch = batcher.batch(items);
        assert_eq!(batch.images.dims(), [2, 4]);
        assert_eq!(batch.labels.dims(), [2]);
    }
}

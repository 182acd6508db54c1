// ============================================================
// Layer 5 — Sequential Layer Stack
// ============================================================
// An ordered list of typed layer records applied one after
// the other. The architecture is described by plain, serde-
// serialisable LayerSpec values so it can be written next to
// a checkpoint and rebuilt exactly at load time:
//
//   SequentialBuilder::new(784)
//       .linear(256)     → Linear 784 → 256
//       .relu()          → ReLU
//       .dropout(0.1)    → Dropout
//       .linear(10)      → Linear 256 → 10
//       .build(&device)
//
// An empty stack is the identity.
//
// Reference: Burn Book §3 (Building Blocks)

use burn::{
    nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu, Tanh},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::domain::error::SelectError;

/// Serialisable description of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LayerSpec {
    Linear { out: usize },
    Relu,
    Tanh,
    Dropout { prob: f64 },
}

#[derive(Module, Debug)]
pub enum Layer<B: Backend> {
    Linear(Linear<B>),
    Relu(Relu),
    Tanh(Tanh),
    Dropout(Dropout),
}

impl<B: Backend> Layer<B> {
    pub fn forward<const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Layer::Linear(linear)   => linear.forward(x),
            Layer::Relu(relu)       => relu.forward(x),
            Layer::Tanh(tanh)       => tanh.forward(x),
            Layer::Dropout(dropout) => dropout.forward(x),
        }
    }
}

#[derive(Module, Debug)]
pub struct Sequential<B: Backend> {
    pub layers:     Vec<Layer<B>>,
    pub input_dim:  usize,
    pub output_dim: usize,
}

impl<B: Backend> Sequential<B> {
    /// Apply every layer in order; operates on the last dimension.
    pub fn forward<const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        self.layers.iter().fold(x, |x, layer| layer.forward(x))
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

// ─── SequentialBuilder ────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq)]
pub struct SequentialBuilder {
    input_dim: usize,
    specs:     Vec<LayerSpec>,
}

impl SequentialBuilder {
    pub fn new(input_dim: usize) -> Self {
        Self { input_dim, specs: Vec::new() }
    }

    pub fn from_specs(input_dim: usize, specs: &[LayerSpec]) -> Self {
        Self { input_dim, specs: specs.to_vec() }
    }

    pub fn push(mut self, spec: LayerSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn linear(self, out: usize) -> Self {
        self.push(LayerSpec::Linear { out })
    }

    pub fn relu(self) -> Self {
        self.push(LayerSpec::Relu)
    }

    pub fn tanh(self) -> Self {
        self.push(LayerSpec::Tanh)
    }

    pub fn dropout(self, prob: f64) -> Self {
        self.push(LayerSpec::Dropout { prob })
    }

    pub fn specs(&self) -> &[LayerSpec] {
        &self.specs
    }

    /// Width of the vectors leaving the last Linear layer.
    pub fn output_dim(&self) -> usize {
        self.specs.iter().fold(self.input_dim, |dim, spec| match spec {
            LayerSpec::Linear { out } => *out,
            _ => dim,
        })
    }

    pub fn build<B: Backend>(&self, device: &B::Device) -> Result<Sequential<B>, SelectError> {
        if self.input_dim == 0 {
            return Err(SelectError::config("sequential input_dim must be at least 1"));
        }

        let mut layers = Vec::with_capacity(self.specs.len());
        let mut dim    = self.input_dim;

        for spec in &self.specs {
            let layer = match *spec {
                LayerSpec::Linear { out } => {
                    if out == 0 {
                        return Err(SelectError::config("linear layer needs at least one output"));
                    }
                    let linear = LinearConfig::new(dim, out).init(device);
                    dim = out;
                    Layer::Linear(linear)
                }
                LayerSpec::Relu => Layer::Relu(Relu::new()),
                LayerSpec::Tanh => Layer::Tanh(Tanh::new()),
                LayerSpec::Dropout { prob } => {
                    if !(0.0..1.0).contains(&prob) {
                        return Err(SelectError::config(format!(
                            "dropout probability {prob} outside [0, 1)"
                        )));
                    }
                    Layer::Dropout(DropoutConfig::new(prob).init())
                }
            };
            layers.push(layer);
        }

        Ok(Sequential { layers, input_dim: self.input_dim, output_dim: dim })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_builder_tracks_dims() {
        let builder = SequentialBuilder::new(8).linear(6).relu().dropout(0.2).linear(3);
        assert_eq!(builder.output_dim(), 3);

        let seq = builder.build::<TestBackend>(&Default::default()).unwrap();
        assert_eq!(seq.layers.len(), 4);
        assert_eq!((seq.input_dim, seq.output_dim), (8, 3));

        let x = Tensor::<TestBackend, 2>::zeros([5, 8], &Default::default());
        assert_eq!(seq.forward(x).dims(), [5, 3]);
    }

    #[test]
    fn test_empty_stack_is_identity() {
        let device = Default::default();
        let seq    = SequentialBuilder::new(4).build::<TestBackend>(&device).unwrap();
        assert!(seq.is_empty());

        let x   = Tensor::<TestBackend, 1>::from_floats([1.0, -2.0, 3.0, 0.5], &device);
        let out = seq.forward(x.clone().reshape([1, 1, 4]));
        assert_eq!(out.into_data().to_vec::<f32>().unwrap(), x.into_data().to_vec::<f32>().unwrap());
    }

    #[test]
    fn test_relu_then_tanh() {
        let device = Default::default();
        let seq    = SequentialBuilder::new(2).relu().tanh().build::<TestBackend>(&device).unwrap();
        let x      = Tensor::<TestBackend, 2>::from_floats([[-1.0, 1.0]], &device);
        let out    = seq.forward(x).into_data().to_vec::<f32>().unwrap();
        assert_eq!(out[0], 0.0);
        assert!((out[1] - 1.0f32.tanh()).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_specs() {
        let device = Default::default();
        assert!(SequentialBuilder::new(4).linear(0).build::<TestBackend>(&device).is_err());
        assert!(SequentialBuilder::new(4).dropout(1.5).build::<TestBackend>(&device).is_err());
        assert!(SequentialBuilder::new(0).build::<TestBackend>(&device).is_err());
    }

    #[test]
    fn test_specs_serialise() {
        let specs = vec![LayerSpec::Linear { out: 16 }, LayerSpec::Relu, LayerSpec::Dropout { prob: 0.1 }];
        let json  = serde_json::to_string(&specs).unwrap();
        assert!(json.contains("\"op\":\"linear\""));
        let back: Vec<LayerSpec> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, specs);
    }
}

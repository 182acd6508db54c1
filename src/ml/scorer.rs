// ============================================================
// Layer 5 — Candidate Scorers
// ============================================================
// Given one query vector and N candidate (key) vectors, a
// scorer returns one raw compatibility score per candidate.
//
// Additive (Bahdanau) scorer:
//
//   proj_q     = tanh(W_q · query)            computed once
//   proj_k_i   = tanh(W_k · candidate_i)
//   combined_i = tanh(proj_q + proj_k_i)
//   score_i    = w_v · combined_i
//
// Dot-product scorer:
//
//   score_i = (W_k · candidate_i) · (W_q · query)  [/ sqrt(hidden)]
//
// Scores are NOT normalised. Cross-entropy takes them as they
// are; callers that want probabilities apply softmax, callers
// that want a hard choice take the arg-max.
//
// Both scorers implement CandidateScorer, so the model and
// the checkpoint code never care which one is in use.
//
// Reference: Bahdanau et al. (2015), Vinyals et al. (2015)

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::activation::tanh,
};
use serde::{Deserialize, Serialize};

use crate::domain::error::SelectError;

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), SelectError> {
    if expected == found {
        Ok(())
    } else {
        Err(SelectError::ShapeMismatch { what, expected, found })
    }
}

fn check_non_empty(count: usize) -> Result<(), SelectError> {
    if count == 0 {
        Err(SelectError::ShapeMismatch { what: "candidate count", expected: 1, found: 0 })
    } else {
        Ok(())
    }
}

// ─── CandidateScorer ──────────────────────────────────────────────────────────
/// Scores candidates against a query. Implementors supply the batched
/// `forward`; the checked single-query entry points come for free.
pub trait CandidateScorer<B: Backend> {
    /// Length every query and candidate must have.
    fn input_dim(&self) -> usize;

    /// queries: [batch, dim], candidates: [batch, n, dim] → scores: [batch, n]
    ///
    /// Shapes are not checked here; this is the training hot path.
    fn forward(&self, queries: Tensor<B, 2>, candidates: Tensor<B, 3>) -> Tensor<B, 2>;

    /// query: [dim], candidates: [n, dim] → scores: [n]
    fn score(
        &self,
        query:      Tensor<B, 1>,
        candidates: Tensor<B, 2>,
    ) -> Result<Tensor<B, 1>, SelectError> {
        let [query_dim]  = query.dims();
        let [n, cand_dim] = candidates.dims();
        check_len("query", self.input_dim(), query_dim)?;
        check_non_empty(n)?;
        check_len("candidate", self.input_dim(), cand_dim)?;

        let scores = self.forward(query.unsqueeze::<2>(), candidates.unsqueeze::<3>());
        Ok(scores.reshape([n]))
    }

    /// Plain-vector entry point. `device` is the execution context the
    /// tensors are created on.
    fn score_items(
        &self,
        query:      &[f32],
        candidates: &[Vec<f32>],
        device:     &B::Device,
    ) -> Result<Vec<f32>, SelectError> {
        let dim = self.input_dim();
        check_len("query", dim, query.len())?;
        check_non_empty(candidates.len())?;
        for candidate in candidates {
            check_len("candidate", dim, candidate.len())?;
        }

        let flat: Vec<f32> = candidates.iter().flat_map(|c| c.iter().copied()).collect();
        let query_t = Tensor::<B, 1>::from_floats(query, device);
        let cands_t = Tensor::<B, 1>::from_floats(flat.as_slice(), device)
            .reshape([candidates.len(), dim]);

        let scores = self.score(query_t, cands_t)?;
        Ok(scores.into_data().iter::<f32>().collect())
    }
}

// ─── AdditiveScorer ───────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct AdditiveScorer<B: Backend> {
    /// input_dim → hidden_dim
    pub w_q: Linear<B>,
    /// input_dim → hidden_dim
    pub w_k: Linear<B>,
    /// hidden_dim → 1
    pub w_v: Linear<B>,
    pub input_dim: usize,
}

impl<B: Backend> CandidateScorer<B> for AdditiveScorer<B> {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn forward(&self, queries: Tensor<B, 2>, candidates: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch, n, _] = candidates.dims();

        // One projection per query, then a broadcast view over the n slots.
        let proj_q = tanh(self.w_q.forward(queries));
        let [_, hidden] = proj_q.dims();
        let proj_q = proj_q.unsqueeze_dim::<3>(1).expand([batch, n, hidden]);

        let proj_k   = tanh(self.w_k.forward(candidates));
        let combined = tanh(proj_q + proj_k);

        self.w_v.forward(combined).reshape([batch, n])
    }
}

// ─── DotProductScorer ─────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct DotProductScorer<B: Backend> {
    /// input_dim → hidden_dim
    pub w_q: Linear<B>,
    /// input_dim → hidden_dim
    pub w_k: Linear<B>,
    pub input_dim: usize,
    /// 1 for the plain variant, 1/sqrt(hidden_dim) for the scaled one
    pub scale: f64,
}

impl<B: Backend> CandidateScorer<B> for DotProductScorer<B> {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn forward(&self, queries: Tensor<B, 2>, candidates: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch, n, _] = candidates.dims();

        let q = self.w_q.forward(queries).unsqueeze_dim::<3>(2); // [batch, hidden, 1]
        let k = self.w_k.forward(candidates);                    // [batch, n, hidden]

        k.matmul(q).reshape([batch, n]).mul_scalar(self.scale)
    }
}

// ─── Scorer (either kind) ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScorerKind {
    Additive,
    Dot,
    ScaledDot,
}

#[derive(Module, Debug)]
pub enum Scorer<B: Backend> {
    Additive(AdditiveScorer<B>),
    DotProduct(DotProductScorer<B>),
}

impl<B: Backend> CandidateScorer<B> for Scorer<B> {
    fn input_dim(&self) -> usize {
        match self {
            Scorer::Additive(s)   => s.input_dim(),
            Scorer::DotProduct(s) => s.input_dim(),
        }
    }

    fn forward(&self, queries: Tensor<B, 2>, candidates: Tensor<B, 3>) -> Tensor<B, 2> {
        match self {
            Scorer::Additive(s)   => s.forward(queries, candidates),
            Scorer::DotProduct(s) => s.forward(queries, candidates),
        }
    }
}

#[derive(Config, Debug)]
pub struct ScorerConfig {
    pub kind:       ScorerKind,
    pub input_dim:  usize,
    pub hidden_dim: usize,
    #[config(default = true)]
    pub bias:       bool,
}

impl ScorerConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<Scorer<B>, SelectError> {
        if self.input_dim == 0 || self.hidden_dim == 0 {
            return Err(SelectError::config(format!(
                "scorer dims must be positive (input_dim={}, hidden_dim={})",
                self.input_dim, self.hidden_dim
            )));
        }
        let project = |out: usize| {
            LinearConfig::new(self.input_dim, out).with_bias(self.bias).init(device)
        };

        let scorer = match self.kind {
            ScorerKind::Additive => Scorer::Additive(AdditiveScorer {
                w_q:       project(self.hidden_dim),
                w_k:       project(self.hidden_dim),
                w_v:       LinearConfig::new(self.hidden_dim, 1).with_bias(self.bias).init(device),
                input_dim: self.input_dim,
            }),
            ScorerKind::Dot | ScorerKind::ScaledDot => {
                let scale = if self.kind == ScorerKind::ScaledDot {
                    1.0 / (self.hidden_dim as f64).sqrt()
                } else {
                    1.0
                };
                Scorer::DotProduct(DotProductScorer {
                    w_q:       project(self.hidden_dim),
                    w_k:       project(self.hidden_dim),
                    input_dim: self.input_dim,
                    scale,
                })
            }
        };
        Ok(scorer)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, module::Param};

    type TestBackend = NdArray;

    const DIM: usize = 4;

    fn device() -> <TestBackend as Backend>::Device {
        Default::default()
    }

    /// Linear layer without bias whose weight matrix is `fill` on the
    /// diagonal (or everywhere, for a single output).
    fn fixed_linear(input: usize, output: usize, fill: f32) -> Linear<TestBackend> {
        let mut linear = LinearConfig::new(input, output).with_bias(false).init(&device());
        let mut values = vec![0.0f32; input * output];
        for i in 0..input {
            for o in 0..output {
                if output == 1 || i == o {
                    values[i * output + o] = fill;
                }
            }
        }
        let weight = Tensor::<TestBackend, 1>::from_floats(values.as_slice(), &device())
            .reshape([input, output]);
        linear.weight = Param::from_tensor(weight);
        linear
    }

    fn closed_form_additive() -> AdditiveScorer<TestBackend> {
        AdditiveScorer {
            w_q:       fixed_linear(DIM, DIM, 0.0),
            w_k:       fixed_linear(DIM, DIM, 1.0),
            w_v:       fixed_linear(DIM, 1, 1.0),
            input_dim: DIM,
        }
    }

    fn random_scorer(kind: ScorerKind) -> Scorer<TestBackend> {
        ScorerConfig::new(kind, DIM, 6).init(&device()).unwrap()
    }

    fn candidates(n: usize) -> Vec<Vec<f32>> {
        (0..n).map(|i| (0..DIM).map(|j| ((i * DIM + j) as f32 * 0.37).sin()).collect()).collect()
    }

    #[test]
    fn test_additive_closed_form() {
        let scorer = closed_form_additive();
        let mut cands = vec![vec![0.0; DIM]; 10];
        cands[3] = vec![1.0; DIM];

        let scores = scorer.score_items(&[0.5; DIM], &cands, &device()).unwrap();
        assert_eq!(scores.len(), 10);

        let expected = DIM as f32 * 1.0f32.tanh().tanh();
        assert!((scores[3] - expected).abs() < 1e-5, "score_3 = {}", scores[3]);
        for (i, s) in scores.iter().enumerate() {
            if i != 3 {
                assert!(s.abs() < 1e-6);
                assert!(*s < scores[3]);
            }
        }
    }

    #[test]
    fn test_dot_product_closed_form() {
        let make = |scale: f64| DotProductScorer {
            w_q:       fixed_linear(DIM, DIM, 1.0),
            w_k:       fixed_linear(DIM, DIM, 1.0),
            input_dim: DIM,
            scale,
        };
        let cands: Vec<Vec<f32>> = (0..3).map(|i| vec![i as f32; DIM]).collect();

        let plain = make(1.0).score_items(&[1.0; DIM], &cands, &device()).unwrap();
        assert_eq!(plain, vec![0.0, 4.0, 8.0]);

        let scaled = make(1.0 / (DIM as f64).sqrt()).score_items(&[1.0; DIM], &cands, &device()).unwrap();
        assert_eq!(scaled, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_scaled_dot_config_sets_scale() {
        let Scorer::DotProduct(s) = ScorerConfig::new(ScorerKind::ScaledDot, DIM, 16).init::<TestBackend>(&device()).unwrap()
        else {
            panic!("expected a dot-product scorer");
        };
        assert!((s.scale - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_output_length_matches_candidates() {
        for kind in [ScorerKind::Additive, ScorerKind::Dot, ScorerKind::ScaledDot] {
            let scorer = random_scorer(kind);
            for n in [1, 2, 7] {
                let scores = scorer.score_items(&[0.1; DIM], &candidates(n), &device()).unwrap();
                assert_eq!(scores.len(), n);
            }
        }
    }

    #[test]
    fn test_permuting_candidates_permutes_scores() {
        for kind in [ScorerKind::Additive, ScorerKind::ScaledDot] {
            let scorer   = random_scorer(kind);
            let cands    = candidates(5);
            let order    = [3, 0, 4, 1, 2];
            let permuted: Vec<Vec<f32>> = order.iter().map(|&i| cands[i].clone()).collect();

            let query = [0.3, -0.2, 0.9, 0.0];
            let base  = scorer.score_items(&query, &cands, &device()).unwrap();
            let perm  = scorer.score_items(&query, &permuted, &device()).unwrap();

            for (slot, &src) in order.iter().enumerate() {
                assert!((perm[slot] - base[src]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_repeated_calls_are_bit_identical() {
        let scorer = random_scorer(ScorerKind::Additive);
        let cands  = candidates(6);
        let a = scorer.score_items(&[0.7; DIM], &cands, &device()).unwrap();
        let b = scorer.score_items(&[0.7; DIM], &cands, &device()).unwrap();
        assert_eq!(
            a.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            b.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_batched_forward_matches_single() {
        let scorer = random_scorer(ScorerKind::Additive);
        let cands  = candidates(3);
        let single = scorer.score_items(&[0.2; DIM], &cands, &device()).unwrap();

        // Same candidate set twice, paired with two different queries.
        let flat: Vec<f32> = cands.iter().chain(cands.iter()).flatten().copied().collect();
        let cand_t = Tensor::<TestBackend, 1>::from_floats(flat.as_slice(), &device()).reshape([2, 3, DIM]);
        let query  = Tensor::<TestBackend, 2>::from_floats([[0.2; DIM], [0.9; DIM]], &device());
        let batch  = scorer.forward(query, cand_t);

        assert_eq!(batch.dims(), [2, 3]);
        let values = batch.into_data().to_vec::<f32>().unwrap();
        for i in 0..3 {
            assert!((values[i] - single[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_shape_mismatches() {
        let scorer = random_scorer(ScorerKind::Additive);

        let err = scorer.score_items(&[0.0; 3], &candidates(2), &device()).unwrap_err();
        assert_eq!(err, SelectError::ShapeMismatch { what: "query", expected: DIM, found: 3 });

        let mut cands = candidates(3);
        cands[1].push(1.0);
        let err = scorer.score_items(&[0.0; DIM], &cands, &device()).unwrap_err();
        assert_eq!(err, SelectError::ShapeMismatch { what: "candidate", expected: DIM, found: DIM + 1 });

        let err = scorer.score_items(&[0.0; DIM], &[], &device()).unwrap_err();
        assert!(matches!(err, SelectError::ShapeMismatch { found: 0, .. }));
    }

    #[test]
    fn test_tensor_score_checks_shapes() {
        let scorer = random_scorer(ScorerKind::Dot);
        let query  = Tensor::<TestBackend, 1>::zeros([DIM + 1], &device());
        let cands  = Tensor::<TestBackend, 2>::zeros([2, DIM], &device());
        assert!(scorer.score(query, cands).is_err());
    }

    #[test]
    fn test_zero_dims_rejected() {
        assert!(ScorerConfig::new(ScorerKind::Additive, 0, 4).init::<TestBackend>(&device()).is_err());
        assert!(ScorerConfig::new(ScorerKind::Dot, 4, 0).init::<TestBackend>(&device()).is_err());
    }
}

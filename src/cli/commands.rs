// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and all their flags:
//
//   train             — pointer network on (query, candidates)
//   train-classifier  — plain MLP digit classifier
//   evaluate          — test a trained pointer checkpoint
//   sample            — print one generated selection sample
//
// Enum flags (scorer, device, split) are clap ValueEnums local
// to this layer and converted into their application types.

use clap::{Args, Subcommand, ValueEnum};

use crate::application::{
    classify_use_case::ClassifierConfig,
    evaluate_use_case::EvaluateConfig,
    sample_use_case::SampleConfig,
    train_use_case::TrainConfig,
};
use crate::domain::traits::Split;
use crate::ml::device::DeviceKind;
use crate::ml::scorer::ScorerKind;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the pointer network to pick the successor-class candidate
    Train(TrainArgs),

    /// Train an MLP digit classifier on the same images
    TrainClassifier(ClassifierArgs),

    /// Evaluate a trained pointer checkpoint on the test split
    Evaluate(EvaluateArgs),

    /// Generate and print a single selection sample
    Sample(SampleArgs),
}

// ─── Value enums ──────────────────────────────────────────────────────────────
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ScorerArg {
    /// tanh(W_q q + W_k c) projected by w_v
    Additive,
    /// (W_k c) · (W_q q)
    Dot,
    /// Dot product divided by sqrt(hidden_dim)
    ScaledDot,
}

impl From<ScorerArg> for ScorerKind {
    fn from(a: ScorerArg) -> Self {
        match a {
            ScorerArg::Additive  => ScorerKind::Additive,
            ScorerArg::Dot       => ScorerKind::Dot,
            ScorerArg::ScaledDot => ScorerKind::ScaledDot,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DeviceArg {
    /// NdArray backend on the CPU
    Cpu,
    /// Wgpu backend on the default GPU
    Wgpu,
}

impl From<DeviceArg> for DeviceKind {
    fn from(a: DeviceArg) -> Self {
        match a {
            DeviceArg::Cpu  => DeviceKind::Cpu,
            DeviceArg::Wgpu => DeviceKind::Wgpu,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SplitArg {
    Train,
    Test,
}

impl From<SplitArg> for Split {
    fn from(a: SplitArg) -> Self {
        match a {
            SplitArg::Train => Split::Train,
            SplitArg::Test  => Split::Test,
        }
    }
}

// ─── train ────────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory holding the IDX files (train-images-idx3-ubyte, ...)
    #[arg(long, default_value = "data/mnist")]
    pub corpus_dir: String,

    /// Directory for checkpoints, train_config.json and metrics.csv
    #[arg(long, default_value = "checkpoints/pointer")]
    pub checkpoint_dir: String,

    #[arg(long, value_enum, default_value_t = DeviceArg::Cpu)]
    pub device: DeviceArg,

    #[arg(long, value_enum, default_value_t = ScorerArg::Additive)]
    pub scorer: ScorerArg,

    /// Width of the scorer's projection space
    #[arg(long, default_value_t = 128)]
    pub hidden_dim: usize,

    /// Linear+ReLU encoder widths, comma separated
    #[arg(long, value_delimiter = ',', default_value = "256")]
    pub encoder_dims: Vec<usize>,

    /// Score raw pixels with no encoder in front of the scorer
    #[arg(long)]
    pub no_encoder: bool,

    /// Candidates per sample (N)
    #[arg(long, default_value_t = 10)]
    pub num_candidates: usize,

    /// Images kept per class in the candidate pool
    #[arg(long, default_value_t = 1000)]
    pub pool_size_per_class: usize,

    /// Read at most this many training images
    #[arg(long)]
    pub max_images: Option<usize>,

    /// Fraction of query images used for training; the rest validate
    #[arg(long, default_value_t = 0.9)]
    pub train_fraction: f64,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            corpus_dir:          a.corpus_dir,
            checkpoint_dir:      a.checkpoint_dir,
            device:              a.device.into(),
            scorer:              a.scorer.into(),
            hidden_dim:          a.hidden_dim,
            encoder_dims:        if a.no_encoder { Vec::new() } else { a.encoder_dims },
            num_candidates:      a.num_candidates,
            pool_size_per_class: a.pool_size_per_class,
            max_images:          a.max_images,
            train_fraction:      a.train_fraction,
            batch_size:          a.batch_size,
            epochs:              a.epochs,
            lr:                  a.lr,
            seed:                a.seed,
        }
    }
}

// ─── train-classifier ─────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct ClassifierArgs {
    #[arg(long, default_value = "data/mnist")]
    pub corpus_dir: String,

    #[arg(long, default_value = "checkpoints/classifier")]
    pub checkpoint_dir: String,

    #[arg(long, value_enum, default_value_t = DeviceArg::Cpu)]
    pub device: DeviceArg,

    /// Hidden layer widths, comma separated
    #[arg(long, value_delimiter = ',', default_value = "128,64")]
    pub hidden: Vec<usize>,

    /// Dropout after each hidden layer (0 disables it)
    #[arg(long, default_value_t = 0.0)]
    pub dropout: f64,

    #[arg(long)]
    pub max_images: Option<usize>,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<ClassifierArgs> for ClassifierConfig {
    fn from(a: ClassifierArgs) -> Self {
        ClassifierConfig {
            corpus_dir:     a.corpus_dir,
            checkpoint_dir: a.checkpoint_dir,
            device:         a.device.into(),
            hidden:         a.hidden,
            dropout:        a.dropout,
            max_images:     a.max_images,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            seed:           a.seed,
        }
    }
}

// ─── evaluate ─────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory written by `train`
    #[arg(long, default_value = "checkpoints/pointer")]
    pub checkpoint_dir: String,

    /// Override the IDX directory recorded at training time
    #[arg(long)]
    pub corpus_dir: Option<String>,

    /// Override the device recorded at training time
    #[arg(long, value_enum)]
    pub device: Option<DeviceArg>,

    /// Evaluate on at most this many test images
    #[arg(long)]
    pub max_images: Option<usize>,

    #[arg(long, default_value_t = 256)]
    pub batch_size: usize,

    /// How many example selections to print
    #[arg(long, default_value_t = 5)]
    pub examples: usize,

    /// Seed for the test candidate sets
    #[arg(long, default_value_t = 7)]
    pub seed: u64,
}

impl From<EvaluateArgs> for EvaluateConfig {
    fn from(a: EvaluateArgs) -> Self {
        EvaluateConfig {
            checkpoint_dir: a.checkpoint_dir,
            corpus_dir:     a.corpus_dir,
            device:         a.device.map(Into::into),
            max_images:     a.max_images,
            batch_size:     a.batch_size,
            examples:       a.examples,
            seed:           a.seed,
        }
    }
}

// ─── sample ───────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct SampleArgs {
    #[arg(long, default_value = "data/mnist")]
    pub corpus_dir: String,

    #[arg(long, value_enum, default_value_t = SplitArg::Test)]
    pub split: SplitArg,

    #[arg(long, default_value_t = 10)]
    pub num_candidates: usize,

    #[arg(long, default_value_t = 1000)]
    pub pool_size_per_class: usize,

    #[arg(long)]
    pub max_images: Option<usize>,

    /// Query image index; random when omitted
    #[arg(long)]
    pub query_index: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,
}

impl From<SampleArgs> for SampleConfig {
    fn from(a: SampleArgs) -> Self {
        SampleConfig {
            corpus_dir:          a.corpus_dir,
            split:               a.split.into(),
            num_candidates:      a.num_candidates,
            pool_size_per_class: a.pool_size_per_class,
            max_images:          a.max_images,
            query_index:         a.query_index,
            seed:                a.seed,
        }
    }
}

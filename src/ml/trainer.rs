// ============================================================
// Layer 5 — Training Loops
// ============================================================
// Train + validation loops using Burn's DataLoader and Adam,
// one for the pointer network and one for the classifier.
//
// Both are generic over the autodiff backend:
//   - training runs on B (Autodiff<NdArray> or Autodiff<Wgpu>)
//   - model.valid() returns the model on B::InnerBackend
//   - the validation batcher is built for B::InnerBackend too
//
// run_* picks the backend from the config's DeviceKind and
// hands the device down explicitly.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    backend::Autodiff,
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion},
};

use crate::application::classify_use_case::ClassifierConfig;
use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{ImageBatcher, SelectionBatcher},
    dataset::{ImageDataset, SelectionSamples},
};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::device::{cpu_device, gpu_device, CpuBackend, DeviceKind, GpuBackend};
use crate::ml::evaluator::{evaluate_classifier, evaluate_pointer};
use crate::ml::model::{MlpClassifier, MlpClassifierConfig, PointerNet, PointerNetConfig};

/// Everything a training loop writes to disk.
pub struct RunOutputs {
    pub checkpoints: CheckpointManager,
    pub metrics:     MetricsLogger,
}

// ─── Pointer network ──────────────────────────────────────────────────────────
pub fn run_pointer_training(
    cfg:       &TrainConfig,
    model_cfg: &PointerNetConfig,
    train:     SelectionSamples,
    val:       SelectionSamples,
    outputs:   RunOutputs,
) -> Result<Vec<EpochMetrics>> {
    match cfg.device {
        DeviceKind::Cpu => {
            tracing::info!("Using CPU (NdArray) backend");
            pointer_loop::<Autodiff<CpuBackend>>(cfg, model_cfg, train, val, outputs, cpu_device())
        }
        DeviceKind::Wgpu => {
            let device = gpu_device();
            tracing::info!("Using WGPU device: {:?}", device);
            pointer_loop::<Autodiff<GpuBackend>>(cfg, model_cfg, train, val, outputs, device)
        }
    }
}

fn pointer_loop<B: AutodiffBackend>(
    cfg:       &TrainConfig,
    model_cfg: &PointerNetConfig,
    train:     SelectionSamples,
    val:       SelectionSamples,
    outputs:   RunOutputs,
    device:    B::Device,
) -> Result<Vec<EpochMetrics>> {
    let mut model: PointerNet<B> = model_cfg.init(&device)?;
    tracing::info!(
        "Pointer model ready: {:?} scorer, hidden_dim={}, {} encoder layers",
        model_cfg.scorer,
        model_cfg.hidden_dim,
        model_cfg.encoder.len()
    );

    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    let train_loader = DataLoaderBuilder::new(SelectionBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train);

    let mut history       = Vec::with_capacity(cfg.epochs);
    let mut best_val_loss = f64::INFINITY;

    for epoch in 1..=cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.queries, batch.candidates, batch.targets);

            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches  += 1;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };

        // Validation on the inner backend, dropout disabled.
        let report = evaluate_pointer::<B::InnerBackend>(
            &model.valid(),
            val.clone(),
            cfg.batch_size,
            device.clone(),
        );

        let m = EpochMetrics::new(epoch, train_loss, report.loss, report.accuracy.accuracy());
        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}% ({}/{})",
            epoch, cfg.epochs, m.train_loss, m.val_loss, m.val_acc * 100.0,
            report.accuracy.correct, report.accuracy.samples,
        );

        if m.is_improvement(best_val_loss) {
            best_val_loss = m.val_loss;
            tracing::info!("New best validation loss {:.4}", best_val_loss);
        }

        outputs.metrics.log(&m)?;
        outputs.checkpoints.save_model::<B, _>(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
        history.push(m);
    }

    tracing::info!("Training complete!");
    Ok(history)
}

// ─── MLP classifier ───────────────────────────────────────────────────────────
pub fn run_classifier_training(
    cfg:       &ClassifierConfig,
    model_cfg: &MlpClassifierConfig,
    train:     ImageDataset,
    val:       ImageDataset,
    outputs:   RunOutputs,
) -> Result<Vec<EpochMetrics>> {
    match cfg.device {
        DeviceKind::Cpu => {
            classifier_loop::<Autodiff<CpuBackend>>(cfg, model_cfg, train, val, outputs, cpu_device())
        }
        DeviceKind::Wgpu => {
            classifier_loop::<Autodiff<GpuBackend>>(cfg, model_cfg, train, val, outputs, gpu_device())
        }
    }
}

fn classifier_loop<B: AutodiffBackend>(
    cfg:       &ClassifierConfig,
    model_cfg: &MlpClassifierConfig,
    train:     ImageDataset,
    val:       ImageDataset,
    outputs:   RunOutputs,
    device:    B::Device,
) -> Result<Vec<EpochMetrics>> {
    let mut model: MlpClassifier<B> = model_cfg.init(&device)?;
    tracing::info!("Classifier ready: hidden layers {:?}", model_cfg.hidden);

    let mut optim = AdamConfig::new().init();

    let train_loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train);

    let mut history = Vec::with_capacity(cfg.epochs);

    for epoch in 1..=cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(batch.images, batch.labels);
            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches  += 1;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
        let report = evaluate_classifier::<B::InnerBackend>(
            &model.valid(),
            val.clone(),
            cfg.batch_size,
            device.clone(),
        );

        let m = EpochMetrics::new(epoch, train_loss, report.loss, report.accuracy.accuracy());
        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | test_loss={:.4} | test_acc={:.2}%",
            epoch, cfg.epochs, m.train_loss, m.val_loss, m.val_acc * 100.0,
        );

        outputs.metrics.log(&m)?;
        outputs.checkpoints.save_model::<B, _>(&model, epoch)?;
        history.push(m);
    }

    Ok(history)
}

// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here:
//
//   sequential.rs — ordered list of typed layers + builder
//   scorer.rs     — additive and dot-product candidate scorers
//   model.rs      — PointerNet (encoder + scorer) and the MLP
//                   classifier
//   device.rs     — backend / device selection
//   trainer.rs    — training loops (Adam, per-epoch checkpoint)
//   evaluator.rs  — loss + sample-count accuracy over a dataset
//   inferencer.rs — loads a checkpoint and selects candidates
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Bahdanau et al. (2015), Vinyals et al. (2015)

/// Sequential layer stack and its builder
pub mod sequential;

/// Query / candidate scorers
pub mod scorer;

/// Pointer network and MLP classifier
pub mod model;

/// Execution context: backend and device choice
pub mod device;

/// Training loops
pub mod trainer;

/// Evaluation over a dataset
pub mod evaluator;

/// Checkpoint-backed candidate selection
pub mod inferencer;

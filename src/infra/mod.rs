// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several other layers:
//
//   checkpoint.rs — saving and loading model weights with
//                   Burn's CompactRecorder, plus the run config
//                   as JSON so evaluation can rebuild the model
//
//   metrics.rs    — sample-count accuracy and a per-epoch
//                   CSV log (loss, accuracy)
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Accuracy tally and training metrics CSV logger
pub mod metrics;

// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the IDX files on disk and the tensor
// batches the models consume:
//
//   IDX files
//       │
//       ▼
//   IdxLoader         → reads images + labels, checks headers
//       │
//       ▼
//   Preprocessor      → scales pixels into [0, 1]
//       │
//       ▼
//   LabeledPool       → groups corpus indices by class
//       │
//       ▼
//   SelectionDataset  → draws (query, candidates, correct_index)
//       │
//       ▼
//   SelectionBatcher  → stacks samples into tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// The classifier takes the short path:
//   IdxLoader → ImageDataset → ImageBatcher → DataLoader
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads MNIST / Fashion-MNIST IDX files
pub mod loader;

/// Scales raw pixels into [0, 1]
pub mod preprocessor;

/// Class → corpus indices lookup
pub mod pool;

/// Successor-selection samples and Burn Dataset adapters
pub mod dataset;

/// Burn Batcher implementations
pub mod batcher;

/// Seeded train/validation split
pub mod splitter;

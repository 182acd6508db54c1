// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Each use case wires the data, ml and infra layers together
// for one command:
//
//   train_use_case    — pointer network training
//   classify_use_case — MLP classifier training
//   evaluate_use_case — reload a pointer checkpoint, test it
//   sample_use_case   — draw one selection sample
//
// Rules for this layer:
//   - No model math here (Layer 5)
//   - No printing here (Layer 1)
//   - No file formats here (Layers 4 and 6)

// Pointer network training workflow
pub mod train_use_case;

// Digit classifier training workflow
pub mod classify_use_case;

// Checkpoint evaluation workflow
pub mod evaluate_use_case;

pub mod sample_use_case;

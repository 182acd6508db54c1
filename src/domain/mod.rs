// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that describe what the
// system works with: images, labels, samples and errors.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Typed failures of the core operations
pub mod error;

// Items (flattened images) and the labelled corpus
pub mod item;

// A (query, candidates, correct_index) selection example
pub mod sample;

// Abstractions implemented by other layers
pub mod traits;

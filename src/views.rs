/// Linearization pass lifecycle, shared buffers and the published output
pub mod base;
/// Growable pass buffers with fallible allocation
pub mod buffers;
/// Tuning constants loadable from JSON
pub mod config;
/// Per-element refinement depth heuristic
pub mod levels;
/// Continuous solution sampling
pub mod linearizer;
/// Polynomial order visualization
pub mod orderizer;
/// Immutable result of a linearization pass
pub mod output;
/// Resolution of hanging vertices into conforming triangles
pub mod regularize;
/// Vertex buffer with midpoint deduplication
pub mod vertex_hash;
/// Legacy VTK writers
pub mod vtk;

pub use base::{DataGuard, ElementSampler, LinearizerBase, Pass};
pub use buffers::{AllocationPolicy, BufferKind, BufferLimits, DynamicArray};
pub use config::{ConfigError, LinearizerConfig};
pub use levels::{LevelCache, LevelPolicy};
pub use linearizer::{Linearizer, LinearizerOptions};
pub use orderizer::Orderizer;
pub use output::{Label, LinearizedOutput, Vertex};

use thiserror::Error;

/// Failure of a linearization pass or of one of its exports
#[derive(Debug, Error)]
pub enum LinError {
    /// A pass buffer could not grow; the whole pass was rolled back
    #[error("out of memory while growing the {buffer} buffer to {requested} entries")]
    OutOfMemory { buffer: BufferKind, requested: usize },
    /// The mesh, field or space is not ready to be sampled
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Pinned maximum values must not be negative
    #[error("maximum absolute value must be non-negative (got {0})")]
    NegativeMaxAbsoluteValue(f64),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

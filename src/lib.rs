//! Adaptive linearization of 2D hp-FEM fields
//!
//! A [Linearizer] samples a scalar field over a curved, h-refined [Mesh] of Triangles and Quads and produces a
//! conforming triangle mesh with per-vertex values, ready for plotting. An [Orderizer] draws the polynomial order
//! distribution of a space in the same format. Both can export their results to VTK files.
//!
//! ```no_run
//! use fem_2d_views::prelude::*;
//!
//! let mut mesh = Mesh::from_file("./test_input/square_tris.json").unwrap();
//! mesh.set_global_expansion_orders([3, 3]).unwrap();
//!
//! let field = scalar_field(&mesh, |x, y| (x * 3.0).sin() * y);
//! let linearizer = Linearizer::new();
//! linearizer
//!     .save_solution_vtk(&field, &mesh, &LinearizerOptions::default(), "./test_output/field.vtk", "u", true)
//!     .unwrap();
//! ```

/// Meshes, fields and the traits the views sample through
pub mod domain;
/// Linearizer and Orderizer
pub mod views;

pub use domain::{Mesh, MeshFunction, MeshTopology, OrderSpace, ReferenceMap};
pub use views::{LinError, LinearizedOutput, Linearizer, LinearizerConfig, LinearizerOptions, Orderizer};

/// Commonly used items
pub mod prelude {
    pub use crate::domain::mesh::h_refinement::HRef;
    pub use crate::domain::{scalar_field, Mesh, MeshFunction, MeshTopology, OrderSpace, ValueItem};
    pub use crate::views::{LinearizedOutput, Linearizer, LinearizerConfig, LinearizerOptions, Orderizer};
}

use std::fmt;

/// Description of an h-Refinement
///
/// Triangles only support isotropic refinement. Quads additionally support anisotropic refinement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HRef {
    /// isotropic: Triangles are split into four by joining their edge midpoints, Quads into four about their center
    T,
    /// anisotropic about the u-direction: a Quad is split into a left and a right child
    U,
    /// anisotropic about the v-direction: a Quad is split into a bottom and a top child
    V,
}

impl HRef {
    pub fn num_children(&self) -> usize {
        match self {
            Self::T => 4,
            Self::U | Self::V => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HRefError {
    ElemDoesntExist(usize),
    ElemHasChildren(usize),
    DoubleRefinement(usize),
    AnisotropicTriangle(usize),
    CurvedElem(usize),
    CurvedEdge(usize),
    EdgeHasChildren(usize),
    MinEdgeLength(usize),
}

impl fmt::Display for HRefError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ElemDoesntExist(elem_id) => write!(f, "Element {} does not exist; Cannot apply h-Refinement!", elem_id),
            Self::ElemHasChildren(elem_id) => write!(f, "Element {} already has children; Cannot apply h-Refinement!", elem_id),
            Self::DoubleRefinement(elem_id) => write!(f, "Multiple h-refinements were specified for Element {}; Cannot apply h-Refinements!", elem_id),
            Self::AnisotropicTriangle(elem_id) => write!(f, "Element {} is a triangle; Only T-Type h-Refinement is supported!", elem_id),
            Self::CurvedElem(elem_id) => write!(f, "Element {} has a curved edge; Cannot apply h-Refinement!", elem_id),
            Self::CurvedEdge(edge_id) => write!(f, "Edge {} is curved; Cannot h-Refine!", edge_id),
            Self::EdgeHasChildren(edge_id) => write!(f, "Edge {} already has children; Cannot h-Refine!", edge_id),
            Self::MinEdgeLength(edge_id) => write!(f, "Edge {} is too short to be h-Refined!", edge_id),
        }
    }
}

impl std::error::Error for HRefError {}

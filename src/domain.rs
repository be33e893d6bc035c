/// Structures used to evaluate solution fields over a Mesh
pub mod fields;
/// The internal geometric structure of a Domain
pub mod mesh;

pub use fields::{scalar_field, ExactField, FieldValue, ValueItem};
pub use mesh::{
    element::ElementShape,
    p_refinement::PolyOrders,
    space::{BoundingBox, Point, V2D},
    Mesh,
};

use smallvec::SmallVec;

/// Read-only view of a (possibly h-refined) mesh of Triangles and Quads
///
/// Element ids are dense and stable. Inactive (refined) Elements keep their ids, such that `max_element_id` is an
/// exclusive upper bound for every id returned by `active_elements`.
pub trait MeshTopology: Sync {
    /// Ids of all active (leaf) Elements in ascending order
    fn active_elements(&self) -> Box<dyn Iterator<Item = usize> + '_>;
    /// Number of active Elements
    fn element_count(&self) -> usize;
    fn max_element_id(&self) -> usize;
    fn node_count(&self) -> usize;

    fn element_shape(&self, elem_id: usize) -> ElementShape;
    /// Node ids of an Element in counter-clockwise order
    fn element_nodes(&self, elem_id: usize) -> SmallVec<[usize; 4]>;
    fn element_marker(&self, elem_id: usize) -> i32;
    fn element_area(&self, elem_id: usize) -> f64;
    /// True if any of the Element's edges is a curved arc
    fn is_curved(&self, elem_id: usize) -> bool;

    fn node_point(&self, node_id: usize) -> Point;
    /// The two Nodes of the Edge whose midpoint this Node is (for Nodes created through h-refinement)
    fn node_parents(&self, node_id: usize) -> Option<[usize; 2]>;

    /// Marker of local edge `k` of an Element
    fn edge_marker(&self, elem_id: usize, k: usize) -> i32;
    fn is_boundary_edge(&self, elem_id: usize, k: usize) -> bool;

    fn bounding_box(&self) -> Option<BoundingBox>;

    fn is_ready(&self) -> bool {
        self.element_count() > 0
    }
}

/// Mapping from an Element's reference domain into real space
pub trait ReferenceMap: Sync {
    fn physical_coordinates(&self, elem_id: usize, r: V2D) -> Point;
}

/// A scalar field which can be evaluated at reference coordinates of the Elements of a Mesh
pub trait MeshFunction: Sync {
    fn evaluate(&self, elem_id: usize, r: V2D) -> FieldValue;
    fn polynomial_order(&self, elem_id: usize) -> PolyOrders;

    fn is_ready(&self) -> bool {
        true
    }
}

/// Assignment of polynomial orders to the Elements (and Edges) of a Mesh
pub trait OrderSpace: Sync {
    type Mesh: MeshTopology + ReferenceMap;

    fn mesh(&self) -> &Self::Mesh;
    fn element_orders(&self, elem_id: usize) -> PolyOrders;
    /// Order along local edge `k` of an Element
    fn edge_order(&self, elem_id: usize, k: usize) -> u8;

    fn is_ready(&self) -> bool {
        self.mesh().is_ready()
    }
}

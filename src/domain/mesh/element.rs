use super::p_refinement::PolyOrders;
#[cfg(feature = "json_export")]
use json::{object, JsonValue};
use smallvec::SmallVec;

/// Geometric shape of an `Element`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementShape {
    Triangle,
    Quad,
}

impl ElementShape {
    pub fn from_num_nodes(num_nodes: usize) -> Option<Self> {
        match num_nodes {
            3 => Some(Self::Triangle),
            4 => Some(Self::Quad),
            _ => None,
        }
    }

    pub const fn num_vertices(&self) -> usize {
        match self {
            Self::Triangle => 3,
            Self::Quad => 4,
        }
    }
}

/// The `Element`s are the basic geometric unit of the Mesh.
///
/// `Element`s are responsible for keeping track of:
/// * Connections to their `Node`s and `Edge`s (counter-clockwise)
/// * Connections to their parent `Element` and their children (h-refinement state)
/// * Polynomial expansion orders (p-refinement state)
/// * Their region marker
///
/// ## Layout
/// Edge `k` runs from `nodes[k]` to `nodes[(k + 1) % n]`:
///
/// ```text
///        3 --------- 2              2
///        |     2     |              | \
///        |           |              |   \
///      3 |           | 1          2 |     \ 1
///        |           |              |       \
///        |     0     |              |   0     \
///        0 --------- 1              0 --------- 1
/// ```
///
/// ## h-Refinement
///
/// Child `Element`s keep the orientation of their parent. A T-Type refinement of a Triangle produces the three corner
/// Triangles followed by the central one; a T-Type refinement of a Quad produces the four corner Quads counter-clockwise
/// from `nodes[0]`.
#[derive(Debug, Clone)]
pub struct Element {
    pub id: usize,
    pub shape: ElementShape,
    pub nodes: SmallVec<[usize; 4]>,
    pub edges: SmallVec<[usize; 4]>,
    pub marker: i32,
    pub poly_orders: PolyOrders,
    parent: Option<usize>,
    children: Option<SmallVec<[usize; 4]>>,
}

impl Element {
    pub fn new(
        id: usize,
        shape: ElementShape,
        nodes: SmallVec<[usize; 4]>,
        edges: SmallVec<[usize; 4]>,
        marker: i32,
        poly_orders: PolyOrders,
    ) -> Self {
        Self {
            id,
            shape,
            nodes,
            edges,
            marker,
            poly_orders,
            parent: None,
            children: None,
        }
    }

    pub(crate) fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn num_edges(&self) -> usize {
        self.shape.num_vertices()
    }

    /// The two Node ids of local edge `k` in traversal order
    pub fn edge_nodes(&self, k: usize) -> [usize; 2] {
        [self.nodes[k], self.nodes[(k + 1) % self.nodes.len()]]
    }

    /// Index of `edge_id` among this Element's edges
    pub fn local_edge_index(&self, edge_id: usize) -> Option<usize> {
        self.edges.iter().position(|e| *e == edge_id)
    }

    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.children.is_none()
    }

    pub fn child_ids(&self) -> Option<&[usize]> {
        self.children.as_deref()
    }

    pub fn parent_id(&self) -> Option<usize> {
        self.parent
    }

    pub(crate) fn set_children(&mut self, children: SmallVec<[usize; 4]>) {
        self.children = Some(children);
    }

    /// Polynomial order along local edge `k`
    ///
    /// Quad edges 0 and 2 are u-directed and edges 1 and 3 are v-directed
    pub fn directional_order(&self, k: usize) -> u8 {
        match (self.shape, k % 2) {
            (ElementShape::Triangle, _) => self.poly_orders.ni,
            (ElementShape::Quad, 0) => self.poly_orders.ni,
            (ElementShape::Quad, _) => self.poly_orders.nj,
        }
    }

    /// Produce a Json Object that describes this Element
    #[cfg(feature = "json_export")]
    pub fn to_json(&self) -> JsonValue {
        object! {
            "id": self.id,
            "node_ids": self.nodes.to_vec(),
            "edges": self.edges.to_vec(),
            "marker": self.marker,
            "orders": self.poly_orders,
            "parent": self.parent,
            "children": match &self.children {
                Some(children) => JsonValue::from(children.to_vec()),
                None => JsonValue::Null,
            },
        }
    }
}

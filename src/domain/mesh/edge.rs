use super::{h_refinement::HRefError, MIN_EDGE_LENGTH};
#[cfg(feature = "json_export")]
use json::{object, JsonValue};
use smallvec::SmallVec;

/// Edges describe a line in real space between two `Node`s
///
/// Edges keep track of every `Element` which references them (active or not), their boundary marker and, optionally,
/// the circular arc which replaces the straight line between their `Node`s.
///
/// Indices of child-edges after h-refinement:
/// ```text
///    nodes[0]    0     mid    1     nodes[1]
///         *-----------*-----------*
/// ```
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: usize,
    /// Node ids in the order the Edge was first described
    pub nodes: [usize; 2],
    /// Boundary or interface marker (`0` for unmarked interior edges)
    pub marker: i32,
    /// True if the Edge (or the Edge it was refined from) lies on the boundary of the Mesh
    pub boundary: bool,
    /// Signed arc angle in radians, relative to the direction `nodes[0] -> nodes[1]`.
    /// Positive angles bulge to the right of that direction.
    pub curve: Option<f64>,
    pub length: f64,
    pub(crate) elems: SmallVec<[usize; 2]>,
    parent: Option<usize>,
    children: Option<[usize; 2]>,
    child_node: Option<usize>,
}

impl Edge {
    pub fn new(id: usize, nodes: [usize; 2], length: f64) -> Self {
        Self {
            id,
            nodes,
            marker: 0,
            boundary: false,
            curve: None,
            length,
            elems: SmallVec::new(),
            parent: None,
            children: None,
            child_node: None,
        }
    }

    /// The Node ids sorted in ascending order. Used to look up Edges by their endpoints.
    pub fn key(nodes: [usize; 2]) -> [usize; 2] {
        if nodes[0] <= nodes[1] {
            nodes
        } else {
            [nodes[1], nodes[0]]
        }
    }

    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    pub fn child_ids(&self) -> Option<[usize; 2]> {
        self.children
    }

    pub fn child_node_id(&self) -> Option<usize> {
        self.child_node
    }

    pub fn parent_id(&self) -> Option<usize> {
        self.parent
    }

    /// IDs of all `Element`s which reference this Edge directly
    pub fn elem_ids(&self) -> &[usize] {
        &self.elems
    }

    /// The arc angle as seen when traversing the Edge from `from_node` to the other Node
    pub fn curve_from(&self, from_node: usize) -> Option<f64> {
        self.curve.map(|angle| {
            if from_node == self.nodes[0] {
                angle
            } else {
                -angle
            }
        })
    }

    /// Produce two child Edges from this Edge, which share a new Node at its center
    ///
    /// The child Edges inherit the boundary status and the marker of their parent
    pub(crate) fn h_refine(
        &mut self,
        new_ids: [usize; 2],
        new_node_id: usize,
    ) -> Result<[Self; 2], HRefError> {
        if self.children.is_some() {
            return Err(HRefError::EdgeHasChildren(self.id));
        }
        if self.curve.is_some() {
            return Err(HRefError::CurvedEdge(self.id));
        }

        let child_edge_length = self.length / 2.0;
        if child_edge_length < MIN_EDGE_LENGTH {
            return Err(HRefError::MinEdgeLength(self.id));
        }

        self.children = Some(new_ids);
        self.child_node = Some(new_node_id);

        Ok([
            self.child(new_ids[0], [self.nodes[0], new_node_id], child_edge_length),
            self.child(new_ids[1], [new_node_id, self.nodes[1]], child_edge_length),
        ])
    }

    fn child(&self, id: usize, nodes: [usize; 2], length: f64) -> Self {
        let mut child = Self::new(id, nodes, length);
        child.marker = self.marker;
        child.boundary = self.boundary;
        child.parent = Some(self.id);
        child
    }

    #[cfg(feature = "json_export")]
    pub fn to_json(&self) -> JsonValue {
        object! {
            "id": self.id,
            "nodes": self.nodes.to_vec(),
            "marker": self.marker,
            "boundary": self.boundary,
            "curve": self.curve,
            "children": match self.children {
                Some(children) => JsonValue::from(children.to_vec()),
                None => JsonValue::Null,
            },
        }
    }
}

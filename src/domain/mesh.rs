/// A line between two Nodes
pub mod edge;
/// A Finite Element (Triangle or Quad) in Real Space
pub mod element;
/// Structures and Functions to facilitate isotropic and anisotropic h-refinement
pub mod h_refinement;
/// A Point in Real Space
pub mod node;
/// Structures and Functions to facilitate anisotropic p-refinement
pub mod p_refinement;
/// Mappings between the reference domains and Real Space
pub mod refmap;
/// Structures to describe the 2D real and parametric spaces defining a Mesh
pub mod space;

use edge::Edge;
use element::{Element, ElementShape};
use h_refinement::{HRef, HRefError};
use node::Node;
use p_refinement::{PRef, PRefError, PolyOrders};
use space::{BoundingBox, Point, V2D};

use super::{MeshTopology, OrderSpace, ReferenceMap};

#[cfg(feature = "json_export")]
use json::object;
use json::JsonValue;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fs::read_to_string;
#[cfg(feature = "json_export")]
use std::{fs::File, io::BufWriter};
use thiserror::Error;

/// Minimum Edge length in Real Space. h-Refinements will fail after edges are smaller than this value.
pub const MIN_EDGE_LENGTH: f64 = 3.0518e-5; // 15ish refinement layers with unit sized cells

/// Maximum Polynomial expansion. p-Refinements will fail when an Element's expansion orders exceed this value.
pub const MAX_POLYNOMIAL_ORDER: u8 = 20;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("unable to read mesh file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse mesh file as JSON: {0}")]
    Json(#[from] json::Error),
    #[error("invalid mesh description: {0}")]
    Format(String),
    #[error("all Nodes must be at unique locations")]
    DuplicateNodes,
    #[error("Element {0} is degenerate or its nodes are not in counter-clockwise order")]
    Orientation(usize),
    #[error("Edge {0:?} is shared by more than two Elements")]
    NonManifoldEdge([usize; 2]),
    #[error("{kind} entry references Edge {nodes:?} which is not part of any Element")]
    UnknownEdge {
        kind: &'static str,
        nodes: [usize; 2],
    },
    #[error(transparent)]
    Orders(#[from] PRefError),
}

fn format_err(msg: impl Into<String>) -> MeshError {
    MeshError::Format(msg.into())
}

/// Information used to Define the geometric structure and refinement state of a Domain.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub nodes: Vec<Node>,
    pub elems: Vec<Element>,
    pub edges: Vec<Edge>,
    edge_lookup: BTreeMap<[usize; 2], usize>,
}

impl Mesh {
    /// Construct a completely empty Mesh
    pub fn blank() -> Self {
        Self {
            nodes: Vec::new(),
            elems: Vec::new(),
            edges: Vec::new(),
            edge_lookup: BTreeMap::new(),
        }
    }

    /// Construct a Mesh from a JSON file with the following format
    ///
    /// The following file describes this two element mesh, with a curved right-hand boundary:
    /// ```text
    ///     3               2
    /// 1.0 *---------------*
    ///     |             / |
    ///     |    (1)    /   |)
    ///     |         /     |)   <- 30° arc
    ///     |       /       |)
    ///     |     /   (0)   |
    ///     |   /           |
    /// 0.0 *---------------*
    ///  y  0               1
    ///  x 0.0             1.0
    /// ```
    ///
    /// mesh.json
    /// ```JSON
    /// {
    ///     "Nodes": [
    ///         [0.0, 0.0],
    ///         [1.0, 0.0],
    ///         [1.0, 1.0],
    ///         [0.0, 1.0]
    ///     ],
    ///     "Elements": [
    ///         { "node_ids": [0, 1, 2], "marker": 1, "orders": [3] },
    ///         { "node_ids": [0, 2, 3], "marker": 2, "orders": [2] }
    ///     ],
    ///     "Boundaries": [
    ///         { "node_ids": [0, 1], "marker": 1 },
    ///         { "node_ids": [1, 2], "marker": 2 },
    ///         { "node_ids": [2, 3], "marker": 3 },
    ///         { "node_ids": [3, 0], "marker": 4 }
    ///     ],
    ///     "Curves": [
    ///         { "node_ids": [1, 2], "angle": 30.0 }
    ///     ]
    /// }
    /// ```
    ///
    /// * Elements list 3 (Triangle) or 4 (Quad) node ids in counter-clockwise order. `marker` defaults to `0`, and
    ///   `orders` (one value, or horizontal and vertical values for Quads) defaults to `1`
    /// * Boundaries assign markers to Edges. Edges not listed are unmarked (`0`)
    /// * Curves replace an Edge by a circular arc spanning `angle` degrees. Positive angles bulge to the right of the
    ///   direction `node_ids[0] -> node_ids[1]`
    pub fn from_file(path: impl AsRef<str>) -> Result<Self, MeshError> {
        let mesh_file_contents = read_to_string(path.as_ref())?;
        Self::from_json_str(&mesh_file_contents)
    }

    /// Construct a Mesh from the contents of a JSON mesh file. See [Mesh::from_file]
    pub fn from_json_str(contents: &str) -> Result<Self, MeshError> {
        let mesh_file_json = json::parse(contents)?;

        let points = parse_node_information(&mesh_file_json)?;
        let elements = parse_element_information(&mesh_file_json, points.len())?;

        let mut mesh = Self::blank();
        mesh.nodes = points
            .iter()
            .enumerate()
            .map(|(node_id, point)| Node::new(node_id, *point))
            .collect();

        for (shape, node_ids, marker, poly_orders) in elements {
            let elem_id = mesh.elems.len();
            let corners: SmallVec<[Point; 4]> =
                node_ids.iter().map(|id| mesh.nodes[*id].coords).collect();
            if refmap::signed_area(&corners) <= 0.0 {
                return Err(MeshError::Orientation(elem_id));
            }

            mesh.add_element(shape, node_ids, marker, poly_orders, None);
        }

        // edges with only one adjacent element lie on the boundary
        for edge in mesh.edges.iter_mut() {
            match edge.elems.len() {
                1 => edge.boundary = true,
                2 => edge.boundary = false,
                _ => return Err(MeshError::NonManifoldEdge(edge.nodes)),
            }
        }

        for (nodes, marker) in parse_boundary_information(&mesh_file_json, points.len())? {
            let edge_id = mesh.edge_id_between("Boundaries", nodes)?;
            mesh.edges[edge_id].marker = marker;
        }

        for (nodes, angle) in parse_curve_information(&mesh_file_json, points.len())? {
            let edge_id = mesh.edge_id_between("Curves", nodes)?;
            let edge = &mut mesh.edges[edge_id];
            let radians = angle.to_radians();
            edge.curve = Some(if edge.nodes == nodes { radians } else { -radians });
        }

        Ok(mesh)
    }

    /// Print the mesh to a JSON file specified by path.
    #[cfg(feature = "json_export")]
    pub fn export_to_json(&self, path: impl AsRef<str>) -> std::io::Result<()> {
        let f = File::create(path.as_ref())?;
        let mut w = BufWriter::new(&f);

        let mesh_object = object! {
            "Nodes": JsonValue::from(self.nodes.iter().map(|node| node.to_json()).collect::<Vec<_>>()),
            "Elements": JsonValue::from(self.elems.iter().map(|elem| elem.to_json()).collect::<Vec<_>>()),
            "Edges": JsonValue::from(self.edges.iter().map(|edge| edge.to_json()).collect::<Vec<_>>()),
        };

        mesh_object.write_pretty(&mut w, 4)?;

        Ok(())
    }

    // ----------------------------------------------------------------------------------------------------
    // General Data Retrieval
    // ----------------------------------------------------------------------------------------------------

    /// Get the [Point]s composing an [Element] (counter-clockwise)
    pub fn elem_points(&self, elem_id: usize) -> SmallVec<[Point; 4]> {
        self.elems[elem_id]
            .nodes
            .iter()
            .map(|node_id| self.nodes[*node_id].coords)
            .collect()
    }

    /// Get the two [Point]s composing an [Edge]
    pub fn edge_points(&self, edge_id: usize) -> [&Point; 2] {
        [
            &self.nodes[self.edges[edge_id].nodes[0]].coords,
            &self.nodes[self.edges[edge_id].nodes[1]].coords,
        ]
    }

    /// Get the arc angle of each of an [Element]'s edges relative to the Element's traversal direction
    pub fn elem_arcs(&self, elem_id: usize) -> SmallVec<[Option<f64>; 4]> {
        let elem = &self.elems[elem_id];
        elem.edges
            .iter()
            .zip(elem.nodes.iter())
            .map(|(edge_id, start_node)| self.edges[*edge_id].curve_from(*start_node))
            .collect()
    }

    /// Get a list of an [Element]s descendant's IDs
    pub fn descendant_elems(
        &self,
        elem_id: usize,
        include_starting_elem: bool,
    ) -> Result<Vec<usize>, String> {
        if elem_id >= self.elems.len() {
            Err(format!(
                "Element {} doesn't exist; Cannot retrieve descendant Elements!",
                elem_id
            ))
        } else {
            let mut descendants = Vec::new();
            self.rec_descendant_elems(elem_id, include_starting_elem, &mut descendants);
            Ok(descendants)
        }
    }

    fn rec_descendant_elems(&self, elem_id: usize, include: bool, desc: &mut Vec<usize>) {
        if include {
            desc.push(elem_id);
        }
        if let Some(child_elem_ids) = self.elems[elem_id].child_ids() {
            for cei in child_elem_ids {
                self.rec_descendant_elems(*cei, true, desc);
            }
        }
    }

    /// Get a list of an [Element]s ancestors's IDs
    pub fn ancestor_elems(
        &self,
        elem_id: usize,
        include_starting_elem: bool,
    ) -> Result<Vec<usize>, String> {
        if elem_id >= self.elems.len() {
            Err(format!(
                "Element {} doesn't exist; Cannot retrieve ancestor Elements!",
                elem_id
            ))
        } else {
            let mut ancestors = Vec::new();
            if include_starting_elem {
                ancestors.push(elem_id);
            }
            let mut current = self.elems[elem_id].parent_id();
            while let Some(parent_id) = current {
                ancestors.push(parent_id);
                current = self.elems[parent_id].parent_id();
            }
            Ok(ancestors)
        }
    }

    // every Edge which overlaps `edge_id`: its ancestors, itself, and its descendants
    fn edge_family(&self, edge_id: usize) -> Vec<usize> {
        let mut family = Vec::new();
        let mut current = self.edges[edge_id].parent_id();
        while let Some(parent_id) = current {
            family.push(parent_id);
            current = self.edges[parent_id].parent_id();
        }
        self.rec_descendant_edges(edge_id, &mut family);
        family
    }

    fn rec_descendant_edges(&self, edge_id: usize, desc: &mut Vec<usize>) {
        desc.push(edge_id);
        if let Some(child_edge_ids) = self.edges[edge_id].child_ids() {
            for cei in child_edge_ids {
                self.rec_descendant_edges(cei, desc);
            }
        }
    }

    /// Maximum polynomial expansion orders represented among all active `Element`s in the `Mesh`
    pub fn max_expansion_orders(&self) -> [u8; 2] {
        self.elems
            .iter()
            .filter(|elem| elem.is_active())
            .fold([0; 2], |acc, elem| elem.poly_orders.max_with(acc))
    }

    /// True if any of the [Element]'s Edges is a circular arc
    pub fn elem_is_curved(&self, elem_id: usize) -> bool {
        self.elems[elem_id]
            .edges
            .iter()
            .any(|edge_id| self.edges[*edge_id].curve.is_some())
    }

    /// Determine if this Element can be h-refined
    /// * returns false if the Element already has children or is curved
    /// * returns false if any of the Element's Edges are shorter than twice the [MIN_EDGE_LENGTH]
    /// * returns an `Err` if the Mesh doesn't have `elem_id`
    pub fn elem_is_h_refineable(&self, elem_id: usize) -> Result<bool, HRefError> {
        if elem_id >= self.elems.len() {
            Err(HRefError::ElemDoesntExist(elem_id))
        } else {
            let elem = &self.elems[elem_id];
            Ok(!elem.has_children()
                && !self.elem_is_curved(elem_id)
                && elem
                    .edges
                    .iter()
                    .all(|edge_id| self.edges[*edge_id].length / 2.0 >= MIN_EDGE_LENGTH))
        }
    }

    /// Determine if this Element can be p-refined (in the positive direction)
    /// * returns false if the Element's expansion orders have reached [MAX_POLYNOMIAL_ORDER] in either direction
    /// * returns an `Err` if the Mesh doesn't have `elem_id`
    pub fn elem_is_p_refineable(&self, elem_id: usize) -> Result<bool, PRefError> {
        if elem_id >= self.elems.len() {
            Err(PRefError::ElemDoesntExist(elem_id))
        } else {
            Ok(self.elems[elem_id].poly_orders.ni < MAX_POLYNOMIAL_ORDER
                && self.elems[elem_id].poly_orders.nj < MAX_POLYNOMIAL_ORDER)
        }
    }

    // ----------------------------------------------------------------------------------------------------
    // construction helpers
    // ----------------------------------------------------------------------------------------------------

    fn add_element(
        &mut self,
        shape: ElementShape,
        nodes: SmallVec<[usize; 4]>,
        marker: i32,
        poly_orders: PolyOrders,
        parent: Option<usize>,
    ) -> usize {
        let elem_id = self.elems.len();
        let num_nodes = nodes.len();

        let mut edges = SmallVec::new();
        for k in 0..num_nodes {
            let edge_id = self.find_or_create_edge([nodes[k], nodes[(k + 1) % num_nodes]]);
            self.edges[edge_id].elems.push(elem_id);
            edges.push(edge_id);
        }

        let elem = Element::new(elem_id, shape, nodes, edges, marker, poly_orders);
        self.elems.push(match parent {
            Some(parent_id) => elem.with_parent(parent_id),
            None => elem,
        });

        elem_id
    }

    fn find_or_create_edge(&mut self, nodes: [usize; 2]) -> usize {
        if let Some(edge_id) = self.edge_lookup.get(&Edge::key(nodes)) {
            return *edge_id;
        }

        let edge_id = self.edges.len();
        let length = self.nodes[nodes[0]]
            .coords
            .dist(&self.nodes[nodes[1]].coords);

        self.edges.push(Edge::new(edge_id, nodes, length));
        self.edge_lookup.insert(Edge::key(nodes), edge_id);

        edge_id
    }

    fn edge_id_between(&self, kind: &'static str, nodes: [usize; 2]) -> Result<usize, MeshError> {
        self.edge_lookup
            .get(&Edge::key(nodes))
            .copied()
            .ok_or(MeshError::UnknownEdge { kind, nodes })
    }

    // ----------------------------------------------------------------------------------------------------
    // h-refinement methods
    // ----------------------------------------------------------------------------------------------------

    /// Apply an [HRef] to all active [Element]s in the Mesh that are eligible for h-refinement
    ///
    /// Triangles are always refined isotropically
    pub fn global_h_refinement(&mut self, refinement: HRef) -> Result<(), HRefError> {
        self.h_refine_with_filter(|elem| match elem.shape {
            ElementShape::Triangle => Some(HRef::T),
            ElementShape::Quad => Some(refinement),
        })
    }

    /// Apply an [HRef] to a list of [Element]s by their ID
    pub fn h_refine_elems(&mut self, elems: Vec<usize>, refinement: HRef) -> Result<(), HRefError> {
        self.execute_h_refinements(elems.iter().map(|elem_id| (*elem_id, refinement)).collect())
    }

    /// h-refine eligible [Element]s according to an external filter function
    pub fn h_refine_with_filter<F>(&mut self, filt: F) -> Result<(), HRefError>
    where
        F: Fn(&Element) -> Option<HRef>,
    {
        let mut refinements = Vec::new();
        for elem in self.elems.iter() {
            if self.elem_is_h_refineable(elem.id)? {
                if let Some(refinement) = filt(elem) {
                    refinements.push((elem.id, refinement));
                }
            }
        }

        self.execute_h_refinements(refinements)
    }

    /// Execute a series of [HRef]s on [Element]s specified by their id
    ///
    /// All refinements are validated before the Mesh is modified
    pub fn execute_h_refinements(
        &mut self,
        refinements: Vec<(usize, HRef)>,
    ) -> Result<(), HRefError> {
        let mut refinements_map: BTreeMap<usize, HRef> = BTreeMap::new();
        for (elem_id, h_ref) in refinements {
            if elem_id >= self.elems.len() {
                return Err(HRefError::ElemDoesntExist(elem_id));
            }
            if refinements_map.insert(elem_id, h_ref).is_some() {
                return Err(HRefError::DoubleRefinement(elem_id));
            }
        }

        for (&elem_id, &refinement) in refinements_map.iter() {
            let elem = &self.elems[elem_id];
            if elem.has_children() {
                return Err(HRefError::ElemHasChildren(elem_id));
            }
            if elem.shape == ElementShape::Triangle && refinement != HRef::T {
                return Err(HRefError::AnisotropicTriangle(elem_id));
            }
            if self.elem_is_curved(elem_id) {
                return Err(HRefError::CurvedElem(elem_id));
            }
            for k in split_edge_indices(elem.shape, refinement) {
                let edge = &self.edges[elem.edges[*k]];
                if !edge.has_children() && edge.length / 2.0 < MIN_EDGE_LENGTH {
                    return Err(HRefError::MinEdgeLength(edge.id));
                }
            }
        }

        for (elem_id, refinement) in refinements_map {
            let children = match (self.elems[elem_id].shape, refinement) {
                (ElementShape::Triangle, _) => self.execute_triangle_refinement(elem_id)?,
                (ElementShape::Quad, HRef::T) => self.execute_quad_t_refinement(elem_id)?,
                (ElementShape::Quad, HRef::U) => self.execute_quad_u_refinement(elem_id)?,
                (ElementShape::Quad, HRef::V) => self.execute_quad_v_refinement(elem_id)?,
            };
            self.elems[elem_id].set_children(children);
        }

        Ok(())
    }

    fn execute_triangle_refinement(
        &mut self,
        parent_elem_id: usize,
    ) -> Result<SmallVec<[usize; 4]>, HRefError> {
        let n = self.elems[parent_elem_id].nodes.clone();
        let m = [
            self.edge_mid_node(parent_elem_id, 0)?,
            self.edge_mid_node(parent_elem_id, 1)?,
            self.edge_mid_node(parent_elem_id, 2)?,
        ];

        // three corner triangles followed by the central one
        Ok([
            [n[0], m[0], m[2]],
            [m[0], n[1], m[1]],
            [m[2], m[1], n[2]],
            [m[0], m[1], m[2]],
        ]
        .iter()
        .map(|nodes| self.add_child_elem(parent_elem_id, nodes))
        .collect())
    }

    fn execute_quad_t_refinement(
        &mut self,
        parent_elem_id: usize,
    ) -> Result<SmallVec<[usize; 4]>, HRefError> {
        let n = self.elems[parent_elem_id].nodes.clone();
        let m = [
            self.edge_mid_node(parent_elem_id, 0)?,
            self.edge_mid_node(parent_elem_id, 1)?,
            self.edge_mid_node(parent_elem_id, 2)?,
            self.edge_mid_node(parent_elem_id, 3)?,
        ];

        // create a new node in the center of the parent Element
        let points = self.elem_points(parent_elem_id);
        let center_point = (points[0] + points[1] + points[2] + points[3]) / 4.0;
        let center_node_id = self.nodes.len();
        self.nodes.push(Node::new(center_node_id, center_point));
        let c = center_node_id;

        Ok([
            [n[0], m[0], c, m[3]],
            [m[0], n[1], m[1], c],
            [c, m[1], n[2], m[2]],
            [m[3], c, m[2], n[3]],
        ]
        .iter()
        .map(|nodes| self.add_child_elem(parent_elem_id, nodes))
        .collect())
    }

    fn execute_quad_u_refinement(
        &mut self,
        parent_elem_id: usize,
    ) -> Result<SmallVec<[usize; 4]>, HRefError> {
        let n = self.elems[parent_elem_id].nodes.clone();
        let m0 = self.edge_mid_node(parent_elem_id, 0)?;
        let m2 = self.edge_mid_node(parent_elem_id, 2)?;

        // left child, then right child
        Ok([[n[0], m0, m2, n[3]], [m0, n[1], n[2], m2]]
            .iter()
            .map(|nodes| self.add_child_elem(parent_elem_id, nodes))
            .collect())
    }

    fn execute_quad_v_refinement(
        &mut self,
        parent_elem_id: usize,
    ) -> Result<SmallVec<[usize; 4]>, HRefError> {
        let n = self.elems[parent_elem_id].nodes.clone();
        let m1 = self.edge_mid_node(parent_elem_id, 1)?;
        let m3 = self.edge_mid_node(parent_elem_id, 3)?;

        // bottom child, then top child
        Ok([[n[0], n[1], m1, m3], [m3, m1, n[2], n[3]]]
            .iter()
            .map(|nodes| self.add_child_elem(parent_elem_id, nodes))
            .collect())
    }

    fn add_child_elem(&mut self, parent_elem_id: usize, nodes: &[usize]) -> usize {
        let parent = &self.elems[parent_elem_id];
        let (shape, marker, poly_orders) = (parent.shape, parent.marker, parent.poly_orders);

        self.add_element(
            shape,
            SmallVec::from_slice(nodes),
            marker,
            poly_orders,
            Some(parent_elem_id),
        )
    }

    fn edge_mid_node(&mut self, elem_id: usize, k: usize) -> Result<usize, HRefError> {
        let (_, mid_node_id) = self.h_refine_edge_if_needed(self.elems[elem_id].edges[k])?;
        Ok(mid_node_id)
    }

    fn h_refine_edge_if_needed(
        &mut self,
        parent_edge_id: usize,
    ) -> Result<([usize; 2], usize), HRefError> {
        let parent_edge = &self.edges[parent_edge_id];
        if let (Some(child_edge_ids), Some(child_node_id)) =
            (parent_edge.child_ids(), parent_edge.child_node_id())
        {
            return Ok((child_edge_ids, child_node_id));
        }

        let new_edge_ids = [self.edges.len(), self.edges.len() + 1];
        let new_node_id = self.nodes.len();

        let new_edges = self.edges[parent_edge_id].h_refine(new_edge_ids, new_node_id)?;

        let parent_nodes = self.edges[parent_edge_id].nodes;
        let [p0, p1] = self.edge_points(parent_edge_id);
        let node_coords = Point::between(p0, p1);
        self.nodes
            .push(Node::between(new_node_id, node_coords, parent_nodes));

        for edge in new_edges {
            self.edge_lookup.insert(Edge::key(edge.nodes), edge.id);
            self.edges.push(edge);
        }

        Ok((new_edge_ids, new_node_id))
    }

    // ----------------------------------------------------------------------------------------------------
    // p-refinement methods
    // ----------------------------------------------------------------------------------------------------

    /// Apply a [PRef] to all active [Element]s
    pub fn global_p_refinement(&mut self, refinement: PRef) -> Result<(), PRefError> {
        self.execute_p_refinements(
            self.elems
                .iter()
                .filter(|elem| elem.is_active())
                .map(|elem| (elem.id, refinement))
                .collect(),
        )
    }

    /// Apply a [PRef] to a list of [Element]s by their ID
    pub fn p_refine_elems(&mut self, elems: Vec<usize>, refinement: PRef) -> Result<(), PRefError> {
        self.execute_p_refinements(elems.iter().map(|elem_id| (*elem_id, refinement)).collect())
    }

    /// p-refine [Element]s according to an external filter function
    pub fn p_refine_with_filter<F>(&mut self, filt: F) -> Result<(), PRefError>
    where
        F: Fn(&Element) -> Option<PRef>,
    {
        self.execute_p_refinements(
            self.elems
                .iter()
                .filter_map(|elem| filt(elem).map(|refinement| (elem.id, refinement)))
                .collect(),
        )
    }

    /// Execute a series of [PRef]s on [Element]s specified by their id
    pub fn execute_p_refinements(
        &mut self,
        refinements: Vec<(usize, PRef)>,
    ) -> Result<(), PRefError> {
        let mut refinements_map: BTreeMap<usize, PRef> = BTreeMap::new();
        for (elem_id, p_ref) in refinements {
            if elem_id >= self.elems.len() {
                return Err(PRefError::ElemDoesntExist(elem_id));
            }
            if self.elems[elem_id].shape == ElementShape::Triangle && !p_ref.is_isotropic() {
                return Err(PRefError::AnisotropicTriangle(elem_id));
            }
            if refinements_map.insert(elem_id, p_ref).is_some() {
                return Err(PRefError::DoubleRefinement(elem_id));
            }
        }

        for (elem_id, refinement) in refinements_map {
            self.elems[elem_id].poly_orders.refine(refinement)?;
        }

        Ok(())
    }

    /// Set the expansion orders on all [Element]s
    pub fn set_global_expansion_orders(&mut self, orders: [u8; 2]) -> Result<(), PRefError> {
        self.set_expansion_orders(
            self.elems
                .iter()
                .map(|elem| match elem.shape {
                    ElementShape::Triangle => (elem.id, [orders[0]; 2]),
                    ElementShape::Quad => (elem.id, orders),
                })
                .collect(),
        )
    }

    /// Set the expansion orders on a list of [Element]s by their ID
    pub fn set_expansion_on_elems(
        &mut self,
        elems: Vec<usize>,
        orders: [u8; 2],
    ) -> Result<(), PRefError> {
        self.set_expansion_orders(elems.iter().map(|elem_id| (*elem_id, orders)).collect())
    }

    pub fn set_expansion_orders(
        &mut self,
        poly_orders: Vec<(usize, [u8; 2])>,
    ) -> Result<(), PRefError> {
        let mut poly_orders_map: BTreeMap<usize, [u8; 2]> = BTreeMap::new();
        for (elem_id, orders) in poly_orders {
            if elem_id >= self.elems.len() {
                return Err(PRefError::ElemDoesntExist(elem_id));
            }
            if self.elems[elem_id].shape == ElementShape::Triangle && orders[0] != orders[1] {
                return Err(PRefError::AnisotropicTriangle(elem_id));
            }
            if poly_orders_map.insert(elem_id, orders).is_some() {
                return Err(PRefError::DoubleRefinement(elem_id));
            }
        }

        for (elem_id, orders) in poly_orders_map {
            self.elems[elem_id].poly_orders.set(orders)?;
        }

        Ok(())
    }
}

// local edges which are bisected by each type of h-refinement
fn split_edge_indices(shape: ElementShape, refinement: HRef) -> &'static [usize] {
    match (shape, refinement) {
        (ElementShape::Triangle, _) => &[0, 1, 2],
        (ElementShape::Quad, HRef::T) => &[0, 1, 2, 3],
        (ElementShape::Quad, HRef::U) => &[0, 2],
        (ElementShape::Quad, HRef::V) => &[1, 3],
    }
}

impl MeshTopology for Mesh {
    fn active_elements(&self) -> Box<dyn Iterator<Item = usize> + '_> {
        Box::new(
            self.elems
                .iter()
                .filter(|elem| elem.is_active())
                .map(|elem| elem.id),
        )
    }

    fn element_count(&self) -> usize {
        self.elems.iter().filter(|elem| elem.is_active()).count()
    }

    fn max_element_id(&self) -> usize {
        self.elems.len()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn element_shape(&self, elem_id: usize) -> ElementShape {
        self.elems[elem_id].shape
    }

    fn element_nodes(&self, elem_id: usize) -> SmallVec<[usize; 4]> {
        self.elems[elem_id].nodes.clone()
    }

    fn element_marker(&self, elem_id: usize) -> i32 {
        self.elems[elem_id].marker
    }

    fn element_area(&self, elem_id: usize) -> f64 {
        refmap::signed_area(&self.elem_points(elem_id)).abs()
    }

    fn is_curved(&self, elem_id: usize) -> bool {
        self.elem_is_curved(elem_id)
    }

    fn node_point(&self, node_id: usize) -> Point {
        self.nodes[node_id].coords
    }

    fn node_parents(&self, node_id: usize) -> Option<[usize; 2]> {
        self.nodes[node_id].parents
    }

    fn edge_marker(&self, elem_id: usize, k: usize) -> i32 {
        self.edges[self.elems[elem_id].edges[k]].marker
    }

    fn is_boundary_edge(&self, elem_id: usize, k: usize) -> bool {
        self.edges[self.elems[elem_id].edges[k]].boundary
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::around(self.nodes.iter().map(|node| [node.coords.x, node.coords.y]))
    }
}

impl ReferenceMap for Mesh {
    fn physical_coordinates(&self, elem_id: usize, r: V2D) -> Point {
        let elem = &self.elems[elem_id];
        let corners = self.elem_points(elem_id);

        if self.elem_is_curved(elem_id) {
            refmap::map_to_physical(elem.shape, &corners, &self.elem_arcs(elem_id), r)
        } else {
            refmap::map_to_physical(elem.shape, &corners, &[], r)
        }
    }
}

impl OrderSpace for Mesh {
    type Mesh = Self;

    fn mesh(&self) -> &Self {
        self
    }

    fn element_orders(&self, elem_id: usize) -> PolyOrders {
        self.elems[elem_id].poly_orders
    }

    /// The order along an edge is the minimum directional order of all active Elements touching it
    /// (including finer or coarser neighbors across hanging Nodes)
    fn edge_order(&self, elem_id: usize, k: usize) -> u8 {
        let elem = &self.elems[elem_id];

        self.edge_family(elem.edges[k])
            .iter()
            .flat_map(|edge_id| {
                self.edges[*edge_id]
                    .elem_ids()
                    .iter()
                    .map(move |adj_elem_id| (*edge_id, &self.elems[*adj_elem_id]))
            })
            .filter(|(_, adj_elem)| adj_elem.is_active())
            .filter_map(|(edge_id, adj_elem)| {
                adj_elem
                    .local_edge_index(edge_id)
                    .map(|adj_k| adj_elem.directional_order(adj_k))
            })
            .fold(elem.directional_order(k), std::cmp::min)
    }
}

// ----------------------------------------------------------------------------------------------------
// Mesh construction from JSON Utility functions
// ----------------------------------------------------------------------------------------------------

type ElementDescription = (ElementShape, SmallVec<[usize; 4]>, i32, PolyOrders);

fn parse_element_information(
    mesh_file_json: &JsonValue,
    num_nodes: usize,
) -> Result<Vec<ElementDescription>, MeshError> {
    if !mesh_file_json["Elements"].is_array() {
        return Err(format_err("Elements must be an Array!"));
    }

    mesh_file_json["Elements"]
        .members()
        .enumerate()
        .map(|(elem_id, json_element)| {
            if !json_element["node_ids"].is_array() {
                return Err(format_err(format!(
                    "Element {} must have an Array of node_ids!",
                    elem_id
                )));
            }

            let node_ids = json_element["node_ids"]
                .members()
                .map(|node_id_json| parse_node_id(node_id_json, num_nodes))
                .collect::<Result<SmallVec<[usize; 4]>, MeshError>>()?;

            let shape = ElementShape::from_num_nodes(node_ids.len()).ok_or_else(|| {
                format_err(format!("Element {} must have 3 or 4 node_ids!", elem_id))
            })?;
            if has_duplicates(&node_ids) {
                return Err(format_err(format!(
                    "Element {}'s node_ids should be unique!",
                    elem_id
                )));
            }

            let marker = match &json_element["marker"] {
                JsonValue::Null => 0,
                json_marker => json_marker.as_i32().ok_or_else(|| {
                    format_err(format!("Element {}'s marker must be an integer!", elem_id))
                })?,
            };

            let mut poly_orders = PolyOrders::default();
            if !json_element["orders"].is_null() {
                let orders = json_element["orders"]
                    .members()
                    .map(|order| order.as_u8())
                    .collect::<Option<SmallVec<[u8; 2]>>>()
                    .ok_or_else(|| {
                        format_err(format!("Element {}'s orders must be integers!", elem_id))
                    })?;

                let orders = match (shape, orders.as_slice()) {
                    (_, [n]) => [*n, *n],
                    (ElementShape::Quad, [ni, nj]) => [*ni, *nj],
                    (ElementShape::Triangle, [ni, nj]) if ni == nj => [*ni, *nj],
                    _ => {
                        return Err(format_err(format!(
                            "Element {} must have a single order (or two for Quads)!",
                            elem_id
                        )))
                    }
                };
                poly_orders.set(orders)?;
            }

            Ok((shape, node_ids, marker, poly_orders))
        })
        .collect()
}

fn parse_node_information(mesh_file_json: &JsonValue) -> Result<Vec<Point>, MeshError> {
    if !mesh_file_json["Nodes"].is_array() {
        return Err(format_err("Nodes must be an Array!"));
    }

    let node_points = mesh_file_json["Nodes"]
        .members()
        .map(|json_node_point| {
            if !json_node_point.is_array() || json_node_point.members().count() != 2 {
                return Err(format_err("nodes must be arrays of length 2!"));
            }

            match (json_node_point[0].as_f64(), json_node_point[1].as_f64()) {
                (Some(x), Some(y)) => Ok(Point::new(x, y)),
                _ => Err(format_err("nodes must be composed of numerical values!")),
            }
        })
        .collect::<Result<Vec<Point>, MeshError>>()?;

    if has_duplicates(&node_points) {
        return Err(MeshError::DuplicateNodes);
    }

    Ok(node_points)
}

fn parse_boundary_information(
    mesh_file_json: &JsonValue,
    num_nodes: usize,
) -> Result<Vec<([usize; 2], i32)>, MeshError> {
    parse_edge_entries(mesh_file_json, "Boundaries", num_nodes, |entry| {
        entry["marker"].as_i32()
    })
}

fn parse_curve_information(
    mesh_file_json: &JsonValue,
    num_nodes: usize,
) -> Result<Vec<([usize; 2], f64)>, MeshError> {
    parse_edge_entries(mesh_file_json, "Curves", num_nodes, |entry| {
        entry["angle"]
            .as_f64()
            .filter(|angle| *angle != 0.0 && angle.abs() < 360.0)
    })
}

// Parse an optional array of {"node_ids": [a, b], ...} entries
fn parse_edge_entries<T, F>(
    mesh_file_json: &JsonValue,
    kind: &'static str,
    num_nodes: usize,
    value: F,
) -> Result<Vec<([usize; 2], T)>, MeshError>
where
    F: Fn(&JsonValue) -> Option<T>,
{
    let entries = &mesh_file_json[kind];
    if entries.is_null() {
        return Ok(Vec::new());
    }
    if !entries.is_array() {
        return Err(format_err(format!("{} must be an Array!", kind)));
    }

    entries
        .members()
        .map(|entry| {
            let node_ids = &entry["node_ids"];
            if !node_ids.is_array() || node_ids.members().count() != 2 {
                return Err(format_err(format!(
                    "{} entries must have an Array of 2 node_ids!",
                    kind
                )));
            }
            let nodes = [
                parse_node_id(&node_ids[0], num_nodes)?,
                parse_node_id(&node_ids[1], num_nodes)?,
            ];
            let entry_value = value(entry)
                .ok_or_else(|| format_err(format!("{} entry {:?} has an invalid value!", kind, nodes)))?;

            Ok((nodes, entry_value))
        })
        .collect()
}

fn parse_node_id(node_id_json: &JsonValue, num_nodes: usize) -> Result<usize, MeshError> {
    node_id_json
        .as_usize()
        .filter(|node_id| *node_id < num_nodes)
        .ok_or_else(|| {
            format_err("node_ids must be positive integers smaller than the total number of nodes!")
        })
}

fn has_duplicates<T>(values: &[T]) -> bool
where
    T: PartialEq,
{
    for (i, val) in values.iter().enumerate() {
        for val_cmp in values.iter().skip(i + 1) {
            if val == val_cmp {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_from_file() {
        let mesh = Mesh::from_file("./test_input/square_tris.json").unwrap();

        assert_eq!(mesh.nodes.len(), 4);
        assert_eq!(mesh.elems.len(), 2);
        assert_eq!(mesh.edges.len(), 5);
        assert_eq!(mesh.element_count(), 2);

        // outer edges are boundaries with the markers given in the file; the diagonal is not
        for (elem_id, k, marker) in [(0, 0, 1), (0, 1, 2), (1, 1, 3), (1, 2, 4)] {
            assert!(mesh.is_boundary_edge(elem_id, k));
            assert_eq!(mesh.edge_marker(elem_id, k), marker);
        }
        assert!(!mesh.is_boundary_edge(0, 2));
        assert!(!mesh.is_boundary_edge(1, 0));
        assert_eq!(mesh.elems[0].edges[2], mesh.elems[1].edges[0]);

        assert_eq!(mesh.element_marker(1), 2);
        assert!((mesh.element_area(0) - 0.5).abs() < 1e-15);
        assert_eq!(mesh.element_orders(0), PolyOrders::uniform(1));

        let bbox = mesh.bounding_box().unwrap();
        assert!((bbox.area() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn quad_mesh_orders() {
        let mesh = Mesh::from_file("./test_input/two_quads.json").unwrap();

        assert_eq!(mesh.element_orders(0), PolyOrders::from(2, 3));
        assert_eq!(mesh.element_orders(1), PolyOrders::uniform(4));
        assert_eq!(mesh.max_expansion_orders(), [4, 4]);

        // the shared (v-directed) edge takes the smaller of the two orders
        assert_eq!(mesh.edge_order(0, 1), 3);
        assert_eq!(mesh.edge_order(1, 3), 3);
        assert_eq!(mesh.edge_order(0, 0), 2);
        assert_eq!(mesh.edge_order(1, 0), 4);
    }

    #[test]
    fn clockwise_element_rejected() {
        assert!(matches!(
            Mesh::from_file("./test_input/clockwise_tri.json"),
            Err(MeshError::Orientation(0))
        ));
    }

    #[test]
    fn bad_mesh_descriptions() {
        assert!(matches!(
            Mesh::from_json_str(r#"{ "Nodes": [[0, 0], [0, 0]], "Elements": [] }"#),
            Err(MeshError::DuplicateNodes)
        ));
        assert!(matches!(
            Mesh::from_json_str(r#"{ "Nodes": [[0, 0], [1, 0]], "Elements": [{ "node_ids": [0, 1] }] }"#),
            Err(MeshError::Format(_))
        ));
        assert!(matches!(
            Mesh::from_json_str(r#"{ "Nodes": [[0, 0], [1, 0], [0, 1]], "Elements": [{ "node_ids": [0, 1, 5] }] }"#),
            Err(MeshError::Format(_))
        ));
        assert!(matches!(
            Mesh::from_json_str(
                r#"{ "Nodes": [[0, 0], [1, 0], [0, 1]], "Elements": [{ "node_ids": [0, 1, 2] }], "Boundaries": [{ "node_ids": [0, 3], "marker": 1 }] }"#
            ),
            Err(MeshError::Format(_))
        ));
        assert!(matches!(
            Mesh::from_json_str(r#"{ "Nodes": [[0, 0], [1, 0], [0, 1]], "Elements": [{ "node_ids": [0, 1, 2], "orders": [25] }] }"#),
            Err(MeshError::Orders(PRefError::ExceededMaxExpansion))
        ));
        assert!(matches!(Mesh::from_json_str("{ Nodes"), Err(MeshError::Json(_))));
    }

    #[test]
    fn curved_quad() {
        let mesh = Mesh::from_file("./test_input/quad_arc.json").unwrap();

        assert!(mesh.is_curved(0));
        let arc = mesh.elem_arcs(0)[0].unwrap();
        assert!((arc - std::f64::consts::FRAC_PI_2).abs() < 1e-14);
        assert_eq!(mesh.elem_arcs(0)[1], None);

        // the bottom edge bulges out of the unit square
        let p = mesh.physical_coordinates(0, V2D::from([0.0, -1.0]));
        assert!(p.y < -0.1);
        assert!((p.x - 0.5).abs() < 1e-12);

        assert!(!mesh.elem_is_h_refineable(0).unwrap());
        assert_eq!(
            mesh.clone().h_refine_elems(vec![0], HRef::T),
            Err(HRefError::CurvedElem(0))
        );
    }

    #[test]
    fn basic_h_refinements() {
        let mut mesh = Mesh::from_file("./test_input/two_quads.json").unwrap();
        mesh.h_refine_elems(vec![0], HRef::T).unwrap();

        // 4 edge midpoints and a center node
        assert_eq!(mesh.nodes.len(), 11);
        assert_eq!(mesh.elems.len(), 6);
        assert_eq!(mesh.element_count(), 5);
        assert_eq!(mesh.elems[0].child_ids(), Some(&[2, 3, 4, 5][..]));
        assert_eq!(mesh.ancestor_elems(4, false).unwrap(), vec![0]);
        assert_eq!(mesh.descendant_elems(0, true).unwrap(), vec![0, 2, 3, 4, 5]);

        // the midpoint of the shared edge hangs from the coarse neighbor's perspective
        let shared_edge = mesh.elems[1].edges[3];
        let hanging_node = mesh.edges[shared_edge].child_node_id().unwrap();
        let mut parents = mesh.node_parents(hanging_node).unwrap();
        parents.sort();
        assert_eq!(parents, [1, 4]);
        assert_eq!(mesh.node_point(hanging_node), Point::new(1.0, 0.5));

        // the child Elements are counter-clockwise and share edges with each other
        for child in mesh.elems[0].child_ids().unwrap() {
            assert!((mesh.element_area(*child) - 0.25).abs() < 1e-15);
            assert!(refmap::signed_area(&mesh.elem_points(*child)) > 0.0);
        }
        assert_eq!(mesh.elems[2].edges[1], mesh.elems[3].edges[3]);

        // child edges inherit the boundary status and marker of their parent
        assert!(mesh.is_boundary_edge(2, 0));
        assert_eq!(mesh.edge_marker(2, 0), 1);
        assert!(!mesh.is_boundary_edge(3, 1));

        mesh.h_refine_elems(vec![1], HRef::U).unwrap();
        mesh.h_refine_elems(vec![7], HRef::V).unwrap();
        assert_eq!(mesh.element_count(), 7);
    }

    #[test]
    fn hanging_node_edge_orders() {
        let mut mesh = Mesh::from_file("./test_input/two_quads.json").unwrap();
        mesh.h_refine_elems(vec![1], HRef::T).unwrap();
        mesh.set_expansion_on_elems(vec![2, 3, 4, 5], [5, 1]).unwrap();

        // coarse edge 1 of Element 0 now borders two fine Elements with v-order 1
        assert_eq!(mesh.edge_order(0, 1), 1);
        // the fine children see the coarse Element's v-order of 3 and their own of 1
        assert_eq!(mesh.edge_order(2, 3), 1);
        assert_eq!(mesh.edge_order(2, 0), 5);
    }

    #[test]
    fn triangle_h_refinement() {
        let mut mesh = Mesh::from_file("./test_input/square_tris.json").unwrap();
        mesh.global_h_refinement(HRef::T).unwrap();

        assert_eq!(mesh.element_count(), 8);
        assert_eq!(mesh.nodes.len(), 9);
        for elem_id in mesh.active_elements() {
            assert!((mesh.element_area(elem_id) - 0.125).abs() < 1e-15);
        }

        assert_eq!(
            mesh.h_refine_elems(vec![2], HRef::U),
            Err(HRefError::AnisotropicTriangle(2))
        );
    }

    #[test]
    #[should_panic]
    fn h_refine_non_existent() {
        let mut mesh = Mesh::from_file("./test_input/two_quads.json").unwrap();
        mesh.h_refine_elems(vec![0, 2], HRef::T).unwrap();
    }

    #[test]
    #[should_panic]
    fn h_refine_elem_with_children() {
        let mut mesh = Mesh::from_file("./test_input/two_quads.json").unwrap();
        mesh.h_refine_elems(vec![0], HRef::T).unwrap();
        mesh.h_refine_elems(vec![0], HRef::T).unwrap();
    }

    #[test]
    #[should_panic]
    fn double_h_refinement() {
        let mut mesh = Mesh::from_file("./test_input/two_quads.json").unwrap();
        mesh.execute_h_refinements(vec![(0, HRef::T), (1, HRef::T), (0, HRef::U)])
            .unwrap();
    }

    #[test]
    fn minimum_edge_length_exceeded() {
        let mut mesh = Mesh::from_file("./test_input/two_quads.json").unwrap();

        // repeatedly refine the bottom left cell
        let mut result = Ok(());
        for _ in 0..18 {
            let bottom_left = mesh
                .elems
                .iter()
                .find(|elem| elem.is_active() && elem.nodes[0] == 0)
                .map(|elem| elem.id)
                .unwrap();

            result = mesh.h_refine_elems(vec![bottom_left], HRef::T);
            if result.is_err() {
                break;
            }
        }

        assert!(matches!(result, Err(HRefError::MinEdgeLength(_))));
    }

    #[test]
    fn basic_p_refinements() {
        let mut mesh = Mesh::from_file("./test_input/mixed.json").unwrap();
        mesh.p_refine_elems(vec![0], PRef::from(2, 1)).unwrap();
        mesh.p_refine_elems(vec![1], PRef::from(1, 1)).unwrap();

        assert_eq!(mesh.elems[0].poly_orders, PolyOrders::from(4, 3));
        assert_eq!(mesh.elems[1].poly_orders, PolyOrders::uniform(4));

        assert_eq!(
            mesh.p_refine_elems(vec![1], PRef::from(1, 0)),
            Err(PRefError::AnisotropicTriangle(1))
        );
        assert_eq!(
            mesh.set_expansion_on_elems(vec![1], [2, 3]),
            Err(PRefError::AnisotropicTriangle(1))
        );

        mesh.set_global_expansion_orders([2, 5]).unwrap();
        assert_eq!(mesh.elems[0].poly_orders, PolyOrders::from(2, 5));
        assert_eq!(mesh.elems[1].poly_orders, PolyOrders::uniform(2));
    }

    #[test]
    #[should_panic]
    fn double_p_refinement() {
        let mut mesh = Mesh::from_file("./test_input/two_quads.json").unwrap();
        mesh.p_refine_elems(vec![0, 0], PRef::from(1, 1)).unwrap();
    }

    #[test]
    #[should_panic]
    fn p_refinement_over_max_i() {
        let mut mesh = Mesh::from_file("./test_input/two_quads.json").unwrap();
        let max_exp_as_i8 = MAX_POLYNOMIAL_ORDER.try_into().unwrap();
        mesh.p_refine_elems(vec![0], PRef::from(max_exp_as_i8, 0))
            .unwrap();
    }

    #[cfg(feature = "json_export")]
    #[test]
    fn refined_mesh_to_file() {
        let mut mesh = Mesh::from_file("./test_input/mixed.json").unwrap();
        mesh.h_refine_elems(vec![0, 1], HRef::T).unwrap();

        let path = std::env::temp_dir().join("fem_2d_views_mixed_refined.json");
        mesh.export_to_json(path.to_string_lossy()).unwrap();

        let exported = json::parse(&read_to_string(&path).unwrap()).unwrap();
        assert_eq!(exported["Elements"].members().count(), mesh.elems.len());
        assert_eq!(exported["Nodes"].members().count(), mesh.nodes.len());
    }
}

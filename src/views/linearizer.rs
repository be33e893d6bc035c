use super::base::{canonical_orientation, ElementSampler, LinearizerBase, Pass};
use super::config::LinearizerConfig;
use super::output::Vertex;
use super::vtk;
use super::LinError;
use crate::domain::mesh::refmap::reference_corners;
use crate::domain::{ElementShape, MeshFunction, MeshTopology, ReferenceMap, ValueItem, V2D};
use std::ops::Deref;

/// Per-call settings of [Linearizer::process_solution]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinearizerOptions {
    /// Component of the field which is sampled
    pub item: ValueItem,
    /// Also emit the edges between neighboring Elements (boundary edges are always emitted)
    pub include_interior_edges: bool,
    /// Sample Elements on the rayon thread pool
    pub parallel: bool,
}

/// Converts a continuous field over a (possibly h-refined, curved) mesh into a conforming triangle mesh
///
/// Each Element is subdivided uniformly according to its refinement level, sampling the field through the reference
/// map. Vertices on shared edges (including hanging Nodes) are deduplicated, and T-junctions between Elements of
/// different levels are removed afterwards.
///
/// ```text
/// let linearizer = Linearizer::new();
/// linearizer.process_solution(&field, &mesh, &LinearizerOptions::default())?;
/// let output = linearizer.output();
/// ```
pub struct Linearizer {
    base: LinearizerBase,
}

impl Default for Linearizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Linearizer {
    type Target = LinearizerBase;

    fn deref(&self) -> &LinearizerBase {
        &self.base
    }
}

impl Linearizer {
    pub fn new() -> Self {
        Self::with_config(LinearizerConfig::default())
    }

    pub fn with_config(config: LinearizerConfig) -> Self {
        Self {
            base: LinearizerBase::new(config),
        }
    }

    /// Linearize `field` over the active Elements of `mesh`, replacing the published output
    pub fn process_solution<F, M>(&self, field: &F, mesh: &M, options: &LinearizerOptions) -> Result<(), LinError>
    where
        F: MeshFunction,
        M: MeshTopology + ReferenceMap,
    {
        let sampler = SolutionSampler {
            field,
            item: options.item,
            include_interior_edges: options.include_interior_edges,
        };

        self.base.run(mesh, &sampler, options.parallel)
    }

    /// Linearize `field` and write the result to a VTK file
    ///
    /// In 3D mode the sampled value is used as the z coordinate.
    pub fn save_solution_vtk<F, M>(
        &self,
        field: &F,
        mesh: &M,
        options: &LinearizerOptions,
        path: impl AsRef<str>,
        quantity_name: &str,
        mode_3d: bool,
    ) -> Result<(), LinError>
    where
        F: MeshFunction,
        M: MeshTopology + ReferenceMap,
    {
        self.process_solution(field, mesh, options)?;
        vtk::write_solution(&self.lock_data(), path, quantity_name, mode_3d)?;
        Ok(())
    }
}

/// A vertex id together with the reference point it was sampled at
type Corner = (u32, V2D);

struct SolutionSampler<'f, F: MeshFunction> {
    field: &'f F,
    item: ValueItem,
    include_interior_edges: bool,
}

impl<'f, F: MeshFunction> SolutionSampler<'f, F> {
    fn sample<M: ReferenceMap>(&self, mesh: &M, elem_id: usize, r: V2D) -> Vertex {
        let p = mesh.physical_coordinates(elem_id, r);
        Vertex::new(p.x, p.y, self.field.evaluate(elem_id, r).item(self.item))
    }

    fn midpoint<M: ReferenceMap>(
        &self,
        mesh: &M,
        pass: &Pass,
        elem_id: usize,
        a: Corner,
        b: Corner,
    ) -> Result<Corner, LinError> {
        let r = V2D::between(a.1, b.1);
        let index = pass.midpoint(a.0, b.0, || self.sample(mesh, elem_id, r))?;
        Ok((index, r))
    }

    fn process_triangle<M: ReferenceMap>(
        &self,
        mesh: &M,
        pass: &Pass,
        elem_id: usize,
        [c0, c1, c2]: [Corner; 3],
        level: u8,
        marker: i32,
    ) -> Result<(), LinError> {
        if level == 0 {
            return pass.add_triangle([c0.0, c1.0, c2.0], marker);
        }

        let m0 = self.midpoint(mesh, pass, elem_id, c0, c1)?;
        let m1 = self.midpoint(mesh, pass, elem_id, c1, c2)?;
        let m2 = self.midpoint(mesh, pass, elem_id, c2, c0)?;

        for child in [[c0, m0, m2], [m0, c1, m1], [m2, m1, c2], [m0, m1, m2]] {
            self.process_triangle(mesh, pass, elem_id, child, level - 1, marker)?;
        }

        Ok(())
    }

    fn process_quad<M: ReferenceMap>(
        &self,
        mesh: &M,
        pass: &Pass,
        elem_id: usize,
        [c0, c1, c2, c3]: [Corner; 4],
        level: u8,
        marker: i32,
    ) -> Result<(), LinError> {
        if level == 0 {
            pass.add_triangle([c0.0, c1.0, c2.0], marker)?;
            return pass.add_triangle([c0.0, c2.0, c3.0], marker);
        }

        let m0 = self.midpoint(mesh, pass, elem_id, c0, c1)?;
        let m1 = self.midpoint(mesh, pass, elem_id, c1, c2)?;
        let m2 = self.midpoint(mesh, pass, elem_id, c2, c3)?;
        let m3 = self.midpoint(mesh, pass, elem_id, c3, c0)?;
        // keyed by two midpoints which never share an output edge
        let center = self.midpoint(mesh, pass, elem_id, m0, m2)?;

        for child in [
            [c0, m0, center, m3],
            [m0, c1, m1, center],
            [center, m1, c2, m2],
            [m3, center, m2, c3],
        ] {
            self.process_quad(mesh, pass, elem_id, child, level - 1, marker)?;
        }

        Ok(())
    }

    fn corner_vertices<M: MeshTopology>(&self, mesh: &M, pass: &Pass, elem_id: usize) -> Result<Vec<u32>, LinError> {
        mesh.element_nodes(elem_id)
            .iter()
            .map(|node_id| {
                pass.node_vertex(*node_id).ok_or_else(|| {
                    LinError::InvalidInput(format!("Node {} of Element {} was not sampled", node_id, elem_id))
                })
            })
            .collect()
    }
}

impl<'f, F, M> ElementSampler<M> for SolutionSampler<'f, F>
where
    F: MeshFunction,
    M: MeshTopology + ReferenceMap,
{
    fn validate(&self, mesh: &M) -> Result<(), LinError> {
        if !mesh.is_ready() {
            return Err(LinError::InvalidInput(String::from("the mesh has no active Elements")));
        }
        if !self.field.is_ready() {
            return Err(LinError::InvalidInput(String::from("the field is not ready to be evaluated")));
        }
        Ok(())
    }

    /// Sample every mesh Node once. Hanging Nodes become the midpoint vertex of their parent Nodes, so that they are
    /// shared with the coarser neighbor's subdivision.
    fn prepare(&self, mesh: &M, pass: &Pass) -> Result<(), LinError> {
        let mut owners: Vec<Option<(usize, usize)>> = vec![None; mesh.node_count()];
        for elem_id in mesh.active_elements() {
            for (k, node_id) in mesh.element_nodes(elem_id).iter().enumerate() {
                if let Some(owner @ None) = owners.get_mut(*node_id) {
                    *owner = Some((elem_id, k));
                }
            }
        }

        for (node_id, owner) in owners.into_iter().enumerate() {
            let (elem_id, k) = match owner {
                Some(owner) => owner,
                None => continue,
            };

            let vertex = self.sample(mesh, elem_id, reference_corners(mesh.element_shape(elem_id))[k]);
            let parents = mesh
                .node_parents(node_id)
                .and_then(|[a, b]| Some((pass.node_vertex(a)?, pass.node_vertex(b)?)));

            let index = match parents {
                Some((va, vb)) => pass.midpoint(va, vb, || vertex)?,
                None => pass.push_vertex(vertex)?,
            };
            pass.set_node_vertex(node_id, index);
        }

        Ok(())
    }

    fn sample_element(&self, mesh: &M, pass: &Pass, elem_id: usize) -> Result<(), LinError> {
        let shape = mesh.element_shape(elem_id);
        let level = pass.element_level(mesh, elem_id, self.field.polynomial_order(elem_id));
        let marker = mesh.element_marker(elem_id);

        let ids = self.corner_vertices(mesh, pass, elem_id)?;
        let refs = reference_corners(shape);
        let corner = |k: usize| (ids[k], refs[k]);

        match shape {
            ElementShape::Triangle => {
                self.process_triangle(mesh, pass, elem_id, [corner(0), corner(1), corner(2)], level, marker)
            }
            ElementShape::Quad => self.process_quad(
                mesh,
                pass,
                elem_id,
                [corner(0), corner(1), corner(2), corner(3)],
                level,
                marker,
            ),
        }
    }

    /// Remove T-junctions, then emit the requested Element edges
    fn finish(&self, mesh: &M, pass: &Pass) -> Result<(), LinError> {
        pass.regularize_triangles()?;

        for elem_id in mesh.active_elements() {
            let ids = self.corner_vertices(mesh, pass, elem_id)?;
            let n = ids.len();

            for k in 0..n {
                let (v1, v2) = (ids[k], ids[(k + 1) % n]);
                let emit = mesh.is_boundary_edge(elem_id, k)
                    || (self.include_interior_edges && {
                        let (a, b) = (pass.vertex(v1), pass.vertex(v2));
                        canonical_orientation([a.x, a.y], [b.x, b.y])
                    });

                if emit {
                    pass.split_edge(v1, v2, mesh.edge_marker(elem_id, k))?;
                }
            }
        }

        Ok(())
    }
}

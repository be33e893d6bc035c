use super::base::{canonical_orientation, ElementSampler, LinearizerBase, Pass};
use super::config::LinearizerConfig;
use super::output::{Label, Vertex};
use super::vtk;
use super::LinError;
use crate::domain::mesh::refmap::reference_corners;
use crate::domain::{BoundingBox, ElementShape, MeshTopology, OrderSpace, PolyOrders, ReferenceMap, V2D};
use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::ops::Deref;

/// Largest order with a precomputed label
pub const MAX_LABELED_ORDER: u8 = 10;

/// "i" for isotropic orders, "h|v" otherwise, for every pair of orders up to [MAX_LABELED_ORDER]
static ORDER_LABELS: Lazy<Vec<Vec<String>>> = Lazy::new(|| {
    (0..=MAX_LABELED_ORDER)
        .map(|h| (0..=MAX_LABELED_ORDER).map(|v| format_label(h, v)).collect())
        .collect()
});

fn format_label(h: u8, v: u8) -> String {
    PolyOrders::from(h, v).to_string()
}

/// Label text of an Element with horizontal order `h` and vertical order `v`
pub fn order_label(h: u8, v: u8) -> Cow<'static, str> {
    let labels: &'static Vec<Vec<String>> = &ORDER_LABELS;
    match labels.get(h as usize).and_then(|row| row.get(v as usize)) {
        Some(label) => Cow::Borrowed(label.as_str()),
        None => Cow::Owned(format_label(h, v)),
    }
}

/// Which order colors a sample point
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OrderSource {
    Horizontal,
    Vertical,
    Edge(usize),
}

/// An Element edge segment between two layout points
#[derive(Clone, Copy, Debug)]
struct LayoutEdge {
    from: usize,
    to: usize,
    /// local edge of the Element
    edge: usize,
}

/// Triangulation of a reference Element used to display its orders
///
/// Points are not shared between regions of different color. Point 0 anchors the Element's label.
#[derive(Debug)]
struct Layout {
    points: Vec<(V2D, OrderSource)>,
    triangles: Vec<[usize; 3]>,
    edges: Vec<LayoutEdge>,
}

/// Inner contour of the edge strips, relative to the Element's center
const CORE_SCALE: f64 = 0.7;

fn directional_source(k: usize) -> OrderSource {
    if k % 2 == 0 {
        OrderSource::Horizontal
    } else {
        OrderSource::Vertical
    }
}

impl Layout {
    fn new(center: V2D) -> Self {
        Self {
            points: vec![(center, OrderSource::Horizontal)],
            triangles: Vec::new(),
            edges: Vec::new(),
        }
    }

    fn point(&mut self, r: V2D, source: OrderSource) -> usize {
        self.points.push((r, source));
        self.points.len() - 1
    }

    /// Triangle colored by `h` (or a fan of Quad triangles colored by `h` and `v`) spanning `corners`
    fn core(&mut self, shape: ElementShape, center: V2D, corners: &[V2D]) -> Vec<[usize; 2]> {
        let n = corners.len();
        match shape {
            ElementShape::Triangle => {
                let ids: Vec<usize> = corners
                    .iter()
                    .map(|c| self.point(*c, OrderSource::Horizontal))
                    .collect();
                self.triangles.push([ids[0], ids[1], ids[2]]);
                (0..n).map(|k| [ids[k], ids[(k + 1) % n]]).collect()
            }
            ElementShape::Quad => (0..n)
                .map(|k| {
                    let source = directional_source(k);
                    let ids = [center, corners[k], corners[(k + 1) % n]].map(|r| self.point(r, source));
                    self.triangles.push(ids);
                    [ids[1], ids[2]]
                })
                .collect(),
        }
    }

    /// Flat coloring: the whole Element shows its order(s)
    fn simple(shape: ElementShape) -> Self {
        let corners = reference_corners(shape);
        let center = centroid(corners);

        let mut layout = Self::new(center);
        let sides = layout.core(shape, center, corners);
        layout.edges = sides
            .into_iter()
            .enumerate()
            .map(|(edge, [from, to])| LayoutEdge { from, to, edge })
            .collect();

        layout
    }

    /// A strip along each edge colored by the edge order, around a core colored by the Element order(s)
    ///
    /// Edges are sampled at their midpoints as well, such that curved edges are visible.
    fn full(shape: ElementShape) -> Self {
        let corners = reference_corners(shape);
        let n = corners.len();
        let center = centroid(corners);
        let inner: Vec<V2D> = corners
            .iter()
            .map(|c| center + (*c - center) * CORE_SCALE)
            .collect();

        let mut layout = Self::new(center);
        layout.core(shape, center, &inner);

        for k in 0..n {
            let next = (k + 1) % n;
            let source = OrderSource::Edge(k);

            let [o0, om, o1] = [corners[k], V2D::between(corners[k], corners[next]), corners[next]]
                .map(|r| layout.point(r, source));
            let [i0, im, i1] =
                [inner[k], V2D::between(inner[k], inner[next]), inner[next]].map(|r| layout.point(r, source));

            layout
                .triangles
                .extend([[o0, om, im], [o0, im, i0], [om, o1, i1], [om, i1, im]]);
            layout.edges.push(LayoutEdge {
                from: o0,
                to: om,
                edge: k,
            });
            layout.edges.push(LayoutEdge {
                from: om,
                to: o1,
                edge: k,
            });
        }

        layout
    }
}

fn centroid(points: &[V2D]) -> V2D {
    points.iter().fold(V2D::default(), |acc, p| acc + *p) / points.len() as f64
}

/// `[simple, full]` layouts of each Element shape
static LAYOUTS: Lazy<[[Layout; 2]; 2]> = Lazy::new(|| {
    [
        [
            Layout::simple(ElementShape::Triangle),
            Layout::full(ElementShape::Triangle),
        ],
        [Layout::simple(ElementShape::Quad), Layout::full(ElementShape::Quad)],
    ]
});

fn layout(shape: ElementShape, full: bool) -> &'static Layout {
    let layouts: &'static [[Layout; 2]; 2] = &LAYOUTS;
    let by_shape = match shape {
        ElementShape::Triangle => &layouts[0],
        ElementShape::Quad => &layouts[1],
    };
    &by_shape[usize::from(full)]
}

/// Displays the distribution of polynomial orders over a space
///
/// Each active Element is drawn as a small set of flat-colored triangles whose vertex values are orders, and gets a
/// label with its order(s). Curved Elements, and all Elements when edge orders are requested, are drawn with a strip
/// along each edge.
///
/// Vertices are not shared between Elements, since the order field is discontinuous.
pub struct Orderizer {
    base: LinearizerBase,
}

impl Default for Orderizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Orderizer {
    type Target = LinearizerBase;

    fn deref(&self) -> &LinearizerBase {
        &self.base
    }
}

impl Orderizer {
    pub fn new() -> Self {
        Self::with_config(LinearizerConfig::default())
    }

    pub fn with_config(config: LinearizerConfig) -> Self {
        Self {
            base: LinearizerBase::new(config),
        }
    }

    pub fn process_space<S: OrderSpace>(&self, space: &S, show_edge_orders: bool) -> Result<(), LinError> {
        let sampler = OrderSampler {
            space,
            show_edge_orders,
        };
        self.base.run(space.mesh(), &sampler, false)
    }

    /// Labels of the published output: anchor vertex, text and Element bounding box size
    pub fn labels(&self) -> Vec<Label> {
        self.output().labels.clone()
    }

    /// Write the order distribution of `space` to a VTK file
    pub fn save_orders_vtk<S: OrderSpace>(&self, space: &S, path: impl AsRef<str>) -> Result<(), LinError> {
        self.process_space(space, false)?;
        vtk::write_solution(&self.lock_data(), path, "Orders", false)?;
        Ok(())
    }

    /// Write the Element markers of `space`'s mesh to a VTK file
    pub fn save_markers_vtk<S: OrderSpace>(&self, space: &S, path: impl AsRef<str>) -> Result<(), LinError> {
        self.process_space(space, false)?;
        vtk::write_markers(&self.lock_data(), path)?;
        Ok(())
    }

    /// Write the Element edges of `space`'s mesh to a VTK file
    pub fn save_mesh_vtk<S: OrderSpace>(&self, space: &S, path: impl AsRef<str>) -> Result<(), LinError> {
        self.process_space(space, false)?;
        vtk::write_edges(&self.lock_data(), path)?;
        Ok(())
    }
}

struct OrderSampler<'s, S: OrderSpace> {
    space: &'s S,
    show_edge_orders: bool,
}

impl<'s, S: OrderSpace> ElementSampler<S::Mesh> for OrderSampler<'s, S> {
    fn validate(&self, mesh: &S::Mesh) -> Result<(), LinError> {
        if !mesh.is_ready() || !self.space.is_ready() {
            return Err(LinError::InvalidInput(String::from("the space has no active Elements")));
        }
        Ok(())
    }

    fn uses_labels(&self) -> bool {
        true
    }

    fn sample_element(&self, mesh: &S::Mesh, pass: &Pass, elem_id: usize) -> Result<(), LinError> {
        let shape = mesh.element_shape(elem_id);
        let orders = self.space.element_orders(elem_id);
        let (h, v) = match shape {
            ElementShape::Triangle => (orders.ni, orders.ni),
            ElementShape::Quad => (orders.ni, orders.nj),
        };

        let layout = layout(shape, self.show_edge_orders || mesh.is_curved(elem_id));
        let edge_order = |k: usize| {
            if self.show_edge_orders {
                self.space.edge_order(elem_id, k)
            } else {
                h
            }
        };

        let mut ids = Vec::with_capacity(layout.points.len());
        let mut positions = Vec::with_capacity(layout.points.len());
        for (r, source) in layout.points.iter() {
            let p = mesh.physical_coordinates(elem_id, *r);
            let order = match source {
                OrderSource::Horizontal => h,
                OrderSource::Vertical => v,
                OrderSource::Edge(k) => edge_order(*k),
            };
            ids.push(pass.push_vertex(Vertex::new(p.x, p.y, f64::from(order)))?);
            positions.push([p.x, p.y]);
        }

        let marker = mesh.element_marker(elem_id);
        for [a, b, c] in layout.triangles.iter() {
            pass.add_triangle([ids[*a], ids[*b], ids[*c]], marker)?;
        }

        for edge in layout.edges.iter() {
            if mesh.is_boundary_edge(elem_id, edge.edge)
                || canonical_orientation(positions[edge.from], positions[edge.to])
            {
                pass.add_edge([ids[edge.from], ids[edge.to]], mesh.edge_marker(elem_id, edge.edge))?;
            }
        }

        let bbox = BoundingBox::around(
            mesh.element_nodes(elem_id)
                .iter()
                .map(|node_id| mesh.node_point(*node_id))
                .map(|p| [p.x, p.y]),
        )
        .map_or([0.0; 2], |bbox| [bbox.width(), bbox.height()]);

        pass.add_label(Label {
            vertex: ids[0],
            text: order_label(h, v),
            bbox,
        })
    }
}

use crate::domain::BoundingBox;
use std::borrow::Cow;

#[cfg(feature = "json_export")]
use json::{object, JsonValue};
#[cfg(feature = "json_export")]
use std::fs::File;
#[cfg(feature = "json_export")]
use std::io::BufWriter;

/// An output vertex: real-space position and the sampled value
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl Vertex {
    pub const fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }
}

/// Text placed on an Element by the Orderizer
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    /// Index of the vertex the label is anchored at
    pub vertex: u32,
    pub text: Cow<'static, str>,
    /// Width and height of the Element's bounding box
    pub bbox: [f64; 2],
}

/// The published result of a successful linearization pass
///
/// Triangles and Edges index into `vertices`. Marker arrays run parallel to their primitives.
#[derive(Clone, Debug, Default)]
pub struct LinearizedOutput {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<[u32; 3]>,
    pub triangle_markers: Vec<i32>,
    pub edges: Vec<[u32; 2]>,
    pub edge_markers: Vec<i32>,
    pub labels: Vec<Label>,
    pub min_val: f64,
    pub max_val: f64,
}

impl LinearizedOutput {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Axis aligned box around all output vertices (`None` if there are none)
    pub fn vertices_aabb(&self) -> Option<BoundingBox> {
        BoundingBox::around(self.vertices.iter().map(|v| [v.x, v.y]))
    }

    /// Smallest and largest finite vertex value (`(0, 0)` if there are none)
    pub(crate) fn value_range(vertices: &[Vertex]) -> (f64, f64) {
        vertices
            .iter()
            .map(|v| v.value)
            .filter(|value| value.is_finite())
            .fold(None, |range, value| match range {
                None => Some((value, value)),
                Some((min, max)) => Some((f64::min(min, value), f64::max(max, value))),
            })
            .unwrap_or((0.0, 0.0))
    }

    /// Produce a Json Object that describes the linearized mesh
    #[cfg(feature = "json_export")]
    pub fn to_json(&self) -> JsonValue {
        object! {
            "Vertices": self.vertices.iter().map(|v| vec![v.x, v.y, v.value]).collect::<Vec<_>>(),
            "Triangles": self.triangles.iter().zip(self.triangle_markers.iter()).map(|(t, marker)| object! {
                "vertex_ids": t.to_vec(),
                "marker": *marker,
            }).collect::<Vec<_>>(),
            "Edges": self.edges.iter().zip(self.edge_markers.iter()).map(|(e, marker)| object! {
                "vertex_ids": e.to_vec(),
                "marker": *marker,
            }).collect::<Vec<_>>(),
            "Labels": self.labels.iter().map(|label| object! {
                "vertex_id": label.vertex,
                "text": label.text.as_ref(),
                "bbox": label.bbox.to_vec(),
            }).collect::<Vec<_>>(),
            "range": vec![self.min_val, self.max_val],
        }
    }

    /// Export the linearized mesh to a JSON file
    #[cfg(feature = "json_export")]
    pub fn export_to_json(&self, path: impl AsRef<str>) -> std::io::Result<()> {
        let f = File::create(path.as_ref())?;
        let mut w = BufWriter::new(&f);

        self.to_json().write_pretty(&mut w, 4)?;

        Ok(())
    }
}

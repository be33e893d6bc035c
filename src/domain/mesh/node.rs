use super::space::Point;

#[cfg(feature = "json_export")]
use json::{object, JsonValue};

/// A point in 2D space.
/// Pairs of Nodes describe Edges and groups of 3 or 4 Nodes describe Elements.
///
/// Nodes created by h-refinement sit at the center of an existing Edge and remember that Edge's two Nodes as `parents`.
/// If only one side of the parent Edge was refined, the Node is "hanging" from the coarse side's perspective.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: usize,
    pub coords: Point,
    pub parents: Option<[usize; 2]>,
}

impl Node {
    pub fn new(id: usize, coords: Point) -> Self {
        Self {
            id,
            coords,
            parents: None,
        }
    }

    pub fn between(id: usize, coords: Point, parents: [usize; 2]) -> Self {
        Self {
            id,
            coords,
            parents: Some(parents),
        }
    }

    #[cfg(feature = "json_export")]
    pub fn to_json(&self) -> JsonValue {
        object! {
            "id": self.id,
            "coords": self.coords,
            "parents": match self.parents {
                Some(parents) => JsonValue::from(parents.to_vec()),
                None => JsonValue::Null,
            },
        }
    }
}

use crate::domain::{BoundingBox, ElementShape, PolyOrders};
use std::sync::atomic::{AtomicU8, Ordering};

/// Heuristic for the number of uniform subdivisions applied to an Element
///
/// Larger Elements and higher polynomial orders are subdivided more often. Linear Quads (curved or not) get two
/// levels so that their bilinear shading is visible, and other curved Elements always get `max_level`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelPolicy {
    pub max_level: u8,
    /// Area (as a fraction of the mesh bounding box) of an Element which is considered "large"
    pub large_element_fraction: f64,
    pub exponent: f64,
}

impl Default for LevelPolicy {
    fn default() -> Self {
        Self {
            max_level: 5,
            large_element_fraction: 1e-2,
            exponent: 0.2,
        }
    }
}

const LINEAR_QUAD_LEVEL: u8 = 2;

impl LevelPolicy {
    pub fn level(
        &self,
        shape: ElementShape,
        curved: bool,
        area: f64,
        mesh_bbox: Option<BoundingBox>,
        orders: PolyOrders,
    ) -> u8 {
        let order = match shape {
            ElementShape::Triangle => orders.ni,
            ElementShape::Quad => orders.max_order(),
        };

        if shape == ElementShape::Quad && order == 1 {
            return LINEAR_QUAD_LEVEL.min(self.max_level);
        }
        if curved {
            return self.max_level;
        }

        let reference_area = match mesh_bbox {
            Some(bbox) if bbox.area() > 0.0 => self.large_element_fraction * bbox.area(),
            _ => return self.max_level,
        };

        let ratio = f64::from(self.max_level)
            * (area.max(0.0) / reference_area).powf(self.exponent)
            * (f64::from(order.max(1)) - 1.0).sqrt();

        if ratio.is_nan() {
            self.max_level
        } else {
            ratio.floor().min(f64::from(self.max_level)) as u8
        }
    }
}

const UNSET: u8 = u8::MAX;

/// Per-pass memoization of Element levels, indexed by Element id
///
/// Lookups from several threads may race to compute the same level; the heuristic is pure so they agree.
#[derive(Debug)]
pub struct LevelCache {
    levels: Vec<AtomicU8>,
}

impl LevelCache {
    pub fn new(max_element_id: usize) -> Self {
        Self {
            levels: (0..max_element_id).map(|_| AtomicU8::new(UNSET)).collect(),
        }
    }

    pub fn get(&self, elem_id: usize) -> Option<u8> {
        self.levels
            .get(elem_id)
            .map(|level| level.load(Ordering::Relaxed))
            .filter(|level| *level != UNSET)
    }

    /// The cached level of an Element, computing it on first use
    pub fn level_for<F>(&self, elem_id: usize, compute: F) -> u8
    where
        F: FnOnce() -> u8,
    {
        match self.levels.get(elem_id) {
            Some(slot) => match slot.load(Ordering::Relaxed) {
                UNSET => {
                    let level = compute();
                    slot.store(level, Ordering::Relaxed);
                    level
                }
                level => level,
            },
            None => compute(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn unit_box() -> Option<BoundingBox> {
        BoundingBox::around([[0.0, 0.0], [1.0, 1.0]])
    }

    #[test]
    fn order_and_area_heuristic() {
        let policy = LevelPolicy::default();
        let tri = ElementShape::Triangle;

        assert_eq!(policy.level(tri, false, 0.5, unit_box(), PolyOrders::uniform(1)), 0);
        assert_eq!(policy.level(tri, false, 0.5, unit_box(), PolyOrders::uniform(3)), 5);
        // 5 * (1e-4 / 1e-2)^0.2 ~ 1.99
        assert_eq!(policy.level(tri, false, 1e-4, unit_box(), PolyOrders::uniform(2)), 1);
        assert_eq!(policy.level(tri, false, 0.01, unit_box(), PolyOrders::uniform(2)), 5);
    }

    #[test]
    fn special_cases() {
        let policy = LevelPolicy::default();
        let quad = ElementShape::Quad;

        assert_eq!(policy.level(quad, false, 0.25, unit_box(), PolyOrders::uniform(1)), 2);
        assert_eq!(policy.level(quad, true, 1e-8, unit_box(), PolyOrders::uniform(1)), 2);
        assert_eq!(policy.level(quad, true, 0.25, unit_box(), PolyOrders::uniform(1)), 2);
        assert_eq!(policy.level(quad, true, 0.25, unit_box(), PolyOrders::uniform(2)), 5);
        assert_eq!(policy.level(quad, false, 0.25, None, PolyOrders::uniform(2)), 5);

        // the quad order is the larger of the two directional orders
        let anisotropic = PolyOrders::from(1, 3);
        assert_eq!(
            policy.level(quad, false, 1e-4, unit_box(), anisotropic),
            policy.level(quad, false, 1e-4, unit_box(), PolyOrders::uniform(3))
        );

        let shallow = LevelPolicy {
            max_level: 1,
            ..Default::default()
        };
        assert_eq!(shallow.level(quad, false, 0.25, unit_box(), PolyOrders::uniform(1)), 1);
    }

    #[test]
    fn cached_levels() {
        let cache = LevelCache::new(3);
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            4
        };

        assert_eq!(cache.get(1), None);
        assert_eq!(cache.level_for(1, compute), 4);
        assert_eq!(cache.level_for(1, compute), 4);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.get(1), Some(4));

        // a fresh pass recomputes
        let next_pass = LevelCache::new(3);
        assert_eq!(next_pass.level_for(1, || 2), 2);
    }
}

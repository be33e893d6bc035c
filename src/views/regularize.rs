//! Conforming subdivision of raw triangles
//!
//! Neighboring Elements may be sampled at different refinement levels, leaving vertices in the middle of a coarse
//! triangle's edge (T-junctions). Each raw triangle is recursively split through the midpoint vertices found on its
//! edges until none of the emitted triangles has a vertex strictly inside one of its edges.
//!
//! Both functions are pure: `lookup(a, b)` returns the midpoint vertex between `a` and `b` (if any) and `emit`
//! receives the output primitives.

use super::LinError;

/// Emit the triangle `corners` split conformingly through the midpoints `mids` (`mids[k]` lies on edge `k`, which
/// runs from `corners[k]` to `corners[(k + 1) % 3]`)
pub fn regularize_triangle<L, E>(
    corners: [u32; 3],
    mids: [Option<u32>; 3],
    marker: i32,
    lookup: &L,
    emit: &mut E,
) -> Result<(), LinError>
where
    L: Fn(u32, u32) -> Option<u32>,
    E: FnMut([u32; 3], i32) -> Result<(), LinError>,
{
    let [iv0, iv1, iv2] = corners;
    let mut sub = |c: [u32; 3], m: [Option<u32>; 3]| regularize_triangle(c, m, marker, lookup, &mut *emit);

    match mids {
        [None, None, None] => emit(corners, marker),
        [Some(m0), Some(m1), Some(m2)] => {
            sub([iv0, m0, m2], [lookup(iv0, m0), None, lookup(m2, iv0)])?;
            sub([m0, iv1, m1], [lookup(m0, iv1), lookup(iv1, m1), None])?;
            sub([m2, m1, iv2], [None, lookup(m1, iv2), lookup(iv2, m2)])?;
            sub([m0, m1, m2], [None, None, None])
        }
        [None, Some(m1), Some(m2)] => {
            sub([iv0, iv1, m1], [lookup(iv0, iv1), lookup(iv1, m1), None])?;
            sub([m2, iv0, m1], [lookup(m2, iv0), None, None])?;
            sub([m2, m1, iv2], [None, lookup(m1, iv2), lookup(iv2, m2)])
        }
        [Some(m0), None, Some(m2)] => {
            sub([iv1, iv2, m2], [lookup(iv1, iv2), lookup(iv2, m2), None])?;
            sub([m0, iv1, m2], [lookup(m0, iv1), None, None])?;
            sub([m0, m2, iv0], [None, lookup(m2, iv0), lookup(iv0, m0)])
        }
        [Some(m0), Some(m1), None] => {
            sub([iv2, iv0, m0], [lookup(iv2, iv0), lookup(iv0, m0), None])?;
            sub([m1, iv2, m0], [lookup(m1, iv2), None, None])?;
            sub([m1, m0, iv1], [None, lookup(m0, iv1), lookup(iv1, m1)])
        }
        [Some(m0), None, None] => {
            sub([iv0, m0, iv2], [lookup(iv0, m0), None, lookup(iv2, iv0)])?;
            sub([m0, iv1, iv2], [lookup(m0, iv1), lookup(iv1, iv2), None])
        }
        [None, Some(m1), None] => {
            sub([iv1, m1, iv0], [lookup(iv1, m1), None, lookup(iv0, iv1)])?;
            sub([m1, iv2, iv0], [lookup(m1, iv2), lookup(iv2, iv0), None])
        }
        [None, None, Some(m2)] => {
            sub([iv2, m2, iv1], [lookup(iv2, m2), None, lookup(iv1, iv2)])?;
            sub([m2, iv0, iv1], [lookup(m2, iv0), lookup(iv0, iv1), None])
        }
    }
}

/// Emit the segment `v1 -> v2` split recursively through existing midpoints
pub fn split_edge<L, E>(v1: u32, v2: u32, marker: i32, lookup: &L, emit: &mut E) -> Result<(), LinError>
where
    L: Fn(u32, u32) -> Option<u32>,
    E: FnMut([u32; 2], i32) -> Result<(), LinError>,
{
    match lookup(v1, v2) {
        Some(mid) => {
            split_edge(v1, mid, marker, lookup, emit)?;
            split_edge(mid, v2, marker, lookup, emit)
        }
        None => emit([v1, v2], marker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// Vertices in the plane with midpoints registered by sorted parent pair
    struct Points {
        coords: Vec<[f64; 2]>,
        mids: HashMap<[u32; 2], u32>,
    }

    impl Points {
        fn triangle() -> Self {
            Self {
                coords: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
                mids: HashMap::new(),
            }
        }

        fn key(a: u32, b: u32) -> [u32; 2] {
            [a.min(b), a.max(b)]
        }

        fn split(&mut self, a: u32, b: u32) -> u32 {
            if let Some(m) = self.mids.get(&Self::key(a, b)) {
                return *m;
            }
            let [pa, pb] = [self.coords[a as usize], self.coords[b as usize]];
            self.coords.push([(pa[0] + pb[0]) / 2.0, (pa[1] + pb[1]) / 2.0]);
            let m = self.coords.len() as u32 - 1;
            self.mids.insert(Self::key(a, b), m);
            m
        }

        fn lookup(&self, a: u32, b: u32) -> Option<u32> {
            self.mids.get(&Self::key(a, b)).copied()
        }

        fn regularize(&self) -> Vec<[u32; 3]> {
            let mut out = Vec::new();
            let mids = [self.lookup(0, 1), self.lookup(1, 2), self.lookup(2, 0)];
            regularize_triangle(
                [0, 1, 2],
                mids,
                3,
                &|a, b| self.lookup(a, b),
                &mut |t, marker| {
                    assert_eq!(marker, 3);
                    out.push(t);
                    Ok(())
                },
            )
            .unwrap();
            out
        }

        fn area(&self, [a, b, c]: [u32; 3]) -> f64 {
            let [pa, pb, pc] = [
                self.coords[a as usize],
                self.coords[b as usize],
                self.coords[c as usize],
            ];
            ((pb[0] - pa[0]) * (pc[1] - pa[1]) - (pc[0] - pa[0]) * (pb[1] - pa[1])) / 2.0
        }

        // true if vertex `v` lies strictly inside the segment a-b
        fn inside(&self, v: u32, a: u32, b: u32) -> bool {
            let [p, pa, pb] = [
                self.coords[v as usize],
                self.coords[a as usize],
                self.coords[b as usize],
            ];
            let cross = (pb[0] - pa[0]) * (p[1] - pa[1]) - (pb[1] - pa[1]) * (p[0] - pa[0]);
            let dot = (p[0] - pa[0]) * (pb[0] - pa[0]) + (p[1] - pa[1]) * (pb[1] - pa[1]);
            let len2 = (pb[0] - pa[0]).powi(2) + (pb[1] - pa[1]).powi(2);
            cross.abs() < 1e-12 && dot > 1e-12 && dot < len2 - 1e-12
        }
    }

    #[test]
    fn triangle_counts_by_case() {
        let mut points = Points::triangle();
        assert_eq!(points.regularize(), vec![[0, 1, 2]]);

        points.split(0, 1);
        assert_eq!(points.regularize().len(), 2);

        points.split(1, 2);
        assert_eq!(points.regularize().len(), 3);

        points.split(2, 0);
        assert_eq!(points.regularize().len(), 4);
    }

    #[test]
    fn each_single_midpoint() {
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            let mut points = Points::triangle();
            let m = points.split(a, b);
            let triangles = points.regularize();

            assert_eq!(triangles.len(), 2);
            assert!(triangles.iter().all(|t| t.contains(&m)));
            assert!(triangles.iter().all(|t| points.area(*t) > 0.0));
        }
    }

    #[test]
    fn nested_midpoints() {
        let mut points = Points::triangle();
        let m = points.split(0, 1);
        points.split(0, m);
        points.split(m, 1);

        // bottom edge split into quarters: each half is split once more
        let triangles = points.regularize();
        assert_eq!(triangles.len(), 4);
        let total: f64 = triangles.iter().map(|t| points.area(*t)).sum();
        assert!((total - 0.5).abs() < 1e-12);
    }

    #[test]
    fn edge_split_through_midpoints() {
        let mut points = Points::triangle();
        let m = points.split(0, 1);
        let q = points.split(m, 1);

        let mut segments = Vec::new();
        split_edge(0, 1, 7, &|a, b| points.lookup(a, b), &mut |e, marker| {
            segments.push((e, marker));
            Ok(())
        })
        .unwrap();

        assert_eq!(segments, vec![([0, m], 7), ([m, q], 7), ([q, 1], 7)]);
    }

    #[test]
    fn emit_failure_propagates() {
        let mut points = Points::triangle();
        points.split(0, 1);

        let mut emitted = 0;
        let result = regularize_triangle(
            [0, 1, 2],
            [points.lookup(0, 1), None, None],
            1,
            &|a, b| points.lookup(a, b),
            &mut |_, _| {
                emitted += 1;
                Err(LinError::InvalidInput(String::from("full")))
            },
        );

        assert!(result.is_err());
        assert_eq!(emitted, 1);
    }

    proptest! {
        #[test]
        fn conforming_and_area_preserving(picks in prop::collection::vec(0usize..64, 0..12)) {
            let mut points = Points::triangle();
            let mut segments: Vec<(u32, u32)> = vec![(0, 1), (1, 2), (2, 0)];

            // refine randomly chosen boundary segments, producing hanging vertices of varying depth
            for pick in picks {
                let (a, b) = segments.remove(pick % segments.len());
                let m = points.split(a, b);
                segments.push((a, m));
                segments.push((m, b));
            }

            let triangles = points.regularize();
            let total: f64 = triangles.iter().map(|t| points.area(*t)).sum();
            prop_assert!((total - 0.5).abs() < 1e-12);

            let vertex_count = points.coords.len() as u32;
            for t in triangles.iter() {
                prop_assert!(points.area(*t) > 0.0);
                for k in 0..3 {
                    let (a, b) = (t[k], t[(k + 1) % 3]);
                    for v in 0..vertex_count {
                        prop_assert!(!points.inside(v, a, b));
                    }
                }
            }
        }
    }
}

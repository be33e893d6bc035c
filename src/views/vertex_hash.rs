use super::buffers::{BufferKind, DynamicArray};
use super::output::Vertex;
use super::LinError;

const NO_VERTEX: u32 = u32::MAX;

#[derive(Clone, Copy, Debug)]
struct VertexEntry {
    vertex: Vertex,
    /// Canonical parent pair of a midpoint vertex; `NO_VERTEX` for primary vertices
    parents: [u32; 2],
    /// Next midpoint vertex in the same hash bucket
    next: u32,
}

/// Vertex buffer of a linearization pass with deduplication of edge midpoints
///
/// Every vertex created by splitting the edge between two existing vertices is registered under its (sorted) parent
/// pair, so neighboring Elements which split the same edge share a single vertex. The parent pairs are stored in an
/// open hash table whose chains run through the vertex records themselves.
///
/// Primary vertices (sampled at mesh Nodes) are tracked separately by Node id.
#[derive(Debug)]
pub struct VertexStore {
    entries: DynamicArray<VertexEntry>,
    table: Vec<u32>,
    node_vertices: Vec<u32>,
}

fn canonical(p1: u32, p2: u32) -> [u32; 2] {
    if p1 <= p2 {
        [p1, p2]
    } else {
        [p2, p1]
    }
}

impl VertexStore {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            entries: DynamicArray::with_limit(BufferKind::Vertices, limit),
            table: vec![NO_VERTEX],
            node_vertices: Vec::new(),
        }
    }

    /// Start a new pass: forget all vertices and size the table for `capacity` vertices
    pub fn reset(&mut self, capacity: usize, node_count: usize) -> Result<(), LinError> {
        self.entries.reset(capacity)?;
        self.rebuild_table();
        self.node_vertices.clear();
        self.node_vertices.resize(node_count, NO_VERTEX);
        Ok(())
    }

    pub fn free(&mut self) {
        self.entries.free();
        self.table = vec![NO_VERTEX];
        self.node_vertices = Vec::new();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn vertex(&self, index: u32) -> Vertex {
        self.entries[index as usize].vertex
    }

    fn hash(&self, [p1, p2]: [u32; 2]) -> usize {
        let h = 984_120_265_u32
            .wrapping_mul(p1)
            .wrapping_add(125_965_121_u32.wrapping_mul(p2));
        h as usize & (self.table.len() - 1)
    }

    fn rebuild_table(&mut self) {
        let size = self.entries.capacity().max(1).next_power_of_two();
        self.table.clear();
        self.table.resize(size, NO_VERTEX);

        for index in 0..self.entries.len() {
            let parents = self.entries[index].parents;
            if parents[0] != NO_VERTEX {
                let bucket = self.hash(parents);
                self.entries[index].next = self.table[bucket];
                self.table[bucket] = index as u32;
            }
        }
    }

    /// The midpoint vertex between `p1` and `p2`, if it exists
    pub fn peek(&self, p1: u32, p2: u32) -> Option<u32> {
        let parents = canonical(p1, p2);
        let mut index = self.table[self.hash(parents)];

        while index != NO_VERTEX {
            let entry = &self.entries[index as usize];
            if entry.parents == parents {
                return Some(index);
            }
            index = entry.next;
        }

        None
    }

    fn push_entry(&mut self, vertex: Vertex, parents: [u32; 2]) -> Result<u32, LinError> {
        let capacity = self.entries.capacity();
        let pushed = self.entries.push(VertexEntry {
            vertex,
            parents,
            next: NO_VERTEX,
        });
        let index = match pushed {
            Ok(index) => index,
            Err(err) => {
                // the table must not point into released storage
                self.free();
                return Err(err);
            }
        };

        if self.entries.capacity() != capacity && self.entries.capacity() > self.table.len() {
            // chains are rebuilt with the new entry included
            self.rebuild_table();
        } else if parents[0] != NO_VERTEX {
            let bucket = self.hash(parents);
            self.entries[index].next = self.table[bucket];
            self.table[bucket] = index as u32;
        }

        Ok(index as u32)
    }

    /// Add a vertex which is not the midpoint of any other pair of vertices
    pub fn push_primary(&mut self, vertex: Vertex) -> Result<u32, LinError> {
        self.push_entry(vertex, [NO_VERTEX; 2])
    }

    /// The midpoint vertex between `p1` and `p2`; `make_vertex` is only called if it does not exist yet
    pub fn get_or_insert_midpoint<F>(&mut self, p1: u32, p2: u32, make_vertex: F) -> Result<u32, LinError>
    where
        F: FnOnce() -> Vertex,
    {
        match self.peek(p1, p2) {
            Some(index) => Ok(index),
            None => self.push_entry(make_vertex(), canonical(p1, p2)),
        }
    }

    pub fn node_vertex(&self, node_id: usize) -> Option<u32> {
        self.node_vertices
            .get(node_id)
            .copied()
            .filter(|index| *index != NO_VERTEX)
    }

    pub fn set_node_vertex(&mut self, node_id: usize, index: u32) {
        if node_id >= self.node_vertices.len() {
            self.node_vertices.resize(node_id + 1, NO_VERTEX);
        }
        self.node_vertices[node_id] = index;
    }

    /// Move the vertices out of the store
    pub fn take_vertices(&mut self) -> Vec<Vertex> {
        let vertices = self.entries.iter().map(|entry| entry.vertex).collect();
        self.entries.take();
        self.rebuild_table();
        vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn v(x: f64) -> Vertex {
        Vertex::new(x, 0.0, x)
    }

    #[test]
    fn midpoints_are_shared() {
        let mut store = VertexStore::new(None);
        store.reset(16, 0).unwrap();

        let a = store.push_primary(v(0.0)).unwrap();
        let b = store.push_primary(v(1.0)).unwrap();
        assert_eq!(store.peek(a, b), None);

        let m = store.get_or_insert_midpoint(a, b, || v(0.5)).unwrap();
        assert_eq!(store.peek(a, b), Some(m));
        assert_eq!(store.peek(b, a), Some(m));

        let again = store
            .get_or_insert_midpoint(b, a, || panic!("midpoint sampled twice"))
            .unwrap();
        assert_eq!(again, m);
        assert_eq!(store.len(), 3);
        assert_eq!(store.vertex(m), v(0.5));
    }

    #[test]
    fn colliding_pairs_coexist() {
        let mut store = VertexStore::new(None);
        store.reset(1, 0).unwrap();
        assert_eq!(store.table.len(), 1);

        // with a single bucket every pair collides until the table is rehashed
        let ids: Vec<u32> = (0..4).map(|i| store.push_primary(v(i as f64)).unwrap()).collect();
        let m01 = store.get_or_insert_midpoint(ids[0], ids[1], || v(0.5)).unwrap();
        let m12 = store.get_or_insert_midpoint(ids[1], ids[2], || v(1.5)).unwrap();
        let m23 = store.get_or_insert_midpoint(ids[2], ids[3], || v(2.5)).unwrap();

        assert!(store.table.len() > 1);
        assert_eq!(store.peek(ids[1], ids[0]), Some(m01));
        assert_eq!(store.peek(ids[2], ids[1]), Some(m12));
        assert_eq!(store.peek(ids[3], ids[2]), Some(m23));
        assert_eq!(store.peek(ids[0], ids[3]), None);
    }

    #[test]
    fn reset_forgets_midpoints() {
        let mut store = VertexStore::new(None);
        store.reset(8, 2).unwrap();
        let a = store.push_primary(v(0.0)).unwrap();
        let b = store.push_primary(v(1.0)).unwrap();
        store.get_or_insert_midpoint(a, b, || v(0.5)).unwrap();
        store.set_node_vertex(1, b);
        assert_eq!(store.node_vertex(1), Some(b));
        assert_eq!(store.node_vertex(0), None);

        store.reset(8, 2).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.peek(a, b), None);
        assert_eq!(store.node_vertex(1), None);
    }

    #[test]
    fn vertex_limit() {
        let mut store = VertexStore::new(Some(2));
        store.reset(2, 0).unwrap();
        store.push_primary(v(0.0)).unwrap();
        store.push_primary(v(1.0)).unwrap();

        assert!(matches!(
            store.get_or_insert_midpoint(0, 1, || v(0.5)),
            Err(LinError::OutOfMemory {
                buffer: BufferKind::Vertices,
                ..
            })
        ));
    }

    proptest! {
        #[test]
        fn one_vertex_per_parent_pair(
            pairs in prop::collection::vec((0u32..12, 0u32..12), 1..200),
            capacity in 1usize..64,
        ) {
            let mut store = VertexStore::new(None);
            store.reset(capacity, 0).unwrap();
            for i in 0..12 {
                store.push_primary(v(i as f64)).unwrap();
            }

            let mut expected = HashMap::new();
            for (p1, p2) in pairs.into_iter().filter(|(p1, p2)| p1 != p2) {
                let index = store.get_or_insert_midpoint(p1, p2, || v(100.0)).unwrap();
                let known = *expected.entry(canonical(p1, p2)).or_insert(index);
                prop_assert_eq!(known, index);
            }

            prop_assert_eq!(store.len(), 12 + expected.len());
            for (parents, index) in expected {
                prop_assert_eq!(store.peek(parents[1], parents[0]), Some(index));
            }
        }
    }
}

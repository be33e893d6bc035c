use super::LinError;
use std::fmt;
use std::ops::{Index, IndexMut};

/// The pass buffers, named in allocation errors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertices,
    Triangles,
    Edges,
    Labels,
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Vertices => "vertex",
            Self::Triangles => "triangle",
            Self::Edges => "edge",
            Self::Labels => "label",
        };
        write!(f, "{}", name)
    }
}

/// Growable array which reports allocation failure instead of aborting
///
/// The logical capacity grows by a factor of 1.5 whenever the array is full, and never shrinks until [DynamicArray::free]
/// is called. An optional `limit` caps the logical capacity; exceeding it behaves exactly like a failed allocation.
///
/// After any failure the array has released its storage.
#[derive(Debug)]
pub struct DynamicArray<T> {
    data: Vec<T>,
    capacity: usize,
    limit: Option<usize>,
    kind: BufferKind,
}

impl<T> DynamicArray<T> {
    pub fn new(kind: BufferKind) -> Self {
        Self::with_limit(kind, None)
    }

    pub fn with_limit(kind: BufferKind, limit: Option<usize>) -> Self {
        Self {
            data: Vec::new(),
            capacity: 0,
            limit,
            kind,
        }
    }

    /// Clear the contents and ensure room for at least `capacity` entries
    pub fn reset(&mut self, capacity: usize) -> Result<(), LinError> {
        self.data.clear();
        if capacity > self.capacity {
            self.grow_to(capacity)?;
        }
        Ok(())
    }

    /// Append a value, returning its index
    pub fn push(&mut self, value: T) -> Result<usize, LinError> {
        if self.data.len() >= self.capacity {
            let grown = self.capacity + (self.capacity / 2).max(1);
            self.grow_to(grown)?;
        }

        self.data.push(value);
        Ok(self.data.len() - 1)
    }

    fn grow_to(&mut self, capacity: usize) -> Result<(), LinError> {
        let within_limit = self.limit.map_or(true, |limit| capacity <= limit);
        let additional = capacity.saturating_sub(self.data.len());

        if !within_limit || self.data.try_reserve_exact(additional).is_err() {
            self.free();
            return Err(LinError::OutOfMemory {
                buffer: self.kind,
                requested: capacity,
            });
        }

        self.capacity = capacity;
        Ok(())
    }

    /// Release all storage
    pub fn free(&mut self) {
        self.data = Vec::new();
        self.capacity = 0;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Move the contents out, leaving the array empty but keeping its logical capacity
    pub fn take(&mut self) -> Vec<T> {
        std::mem::take(&mut self.data)
    }
}

impl<T> Index<usize> for DynamicArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for DynamicArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

/// Optional hard caps on the capacity of each pass buffer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferLimits {
    pub vertices: Option<usize>,
    pub triangles: Option<usize>,
    pub edges: Option<usize>,
    pub labels: Option<usize>,
}

impl BufferLimits {
    pub fn get(&self, kind: BufferKind) -> Option<usize> {
        match kind {
            BufferKind::Vertices => self.vertices,
            BufferKind::Triangles => self.triangles,
            BufferKind::Edges => self.edges,
            BufferKind::Labels => self.labels,
        }
    }
}

/// Initial sizing of the pass buffers
///
/// Each buffer starts a pass with `max(multiplier * element_count, previous capacity, minimum)` slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocationPolicy {
    pub min_vertices: usize,
    pub min_triangles: usize,
    pub min_edges: usize,
    pub vertex_multiplier: usize,
    pub triangle_multiplier: usize,
    pub edge_multiplier: usize,
    /// Labels get one slot per element plus this many
    pub label_extra: usize,
    pub limits: BufferLimits,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            min_vertices: 10_000,
            min_triangles: 10_000,
            min_edges: 15_000,
            vertex_multiplier: 6,
            triangle_multiplier: 6,
            edge_multiplier: 10,
            label_extra: 10,
            limits: BufferLimits::default(),
        }
    }
}

impl AllocationPolicy {
    pub fn initial_capacity(&self, kind: BufferKind, element_count: usize, previous: usize) -> usize {
        let (multiplier, minimum) = match kind {
            BufferKind::Vertices => (self.vertex_multiplier, self.min_vertices),
            BufferKind::Triangles => (self.triangle_multiplier, self.min_triangles),
            BufferKind::Edges => (self.edge_multiplier, self.min_edges),
            BufferKind::Labels => return (element_count + self.label_extra).max(previous),
        };

        multiplier
            .saturating_mul(element_count)
            .max(previous)
            .max(minimum)
    }

    /// A fresh, empty buffer of the given kind honoring this policy's limit
    pub fn buffer<T>(&self, kind: BufferKind) -> DynamicArray<T> {
        DynamicArray::with_limit(kind, self.limits.get(kind))
    }
}

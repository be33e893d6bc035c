use super::buffers::{BufferKind, DynamicArray};
use super::config::LinearizerConfig;
use super::levels::{LevelCache, LevelPolicy};
use super::output::{Label, LinearizedOutput, Vertex};
use super::regularize::{regularize_triangle, split_edge};
use super::vertex_hash::VertexStore;
use super::LinError;
use crate::domain::{BoundingBox, MeshTopology, PolyOrders};
use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use rayon::prelude::*;
use std::cell::RefCell;
use std::ops::Deref;
use std::sync::Arc;

/// Strategy which turns the active Elements of a mesh into output primitives
///
/// A pass calls `validate` before touching any buffer, then `prepare` once, `sample_element` for every active Element
/// (possibly from several threads), and finally `finish`.
pub trait ElementSampler<M: MeshTopology>: Sync {
    /// Reject input which is not ready to be sampled
    fn validate(&self, mesh: &M) -> Result<(), LinError>;

    /// Whether the pass needs a label buffer
    fn uses_labels(&self) -> bool {
        false
    }

    fn prepare(&self, _mesh: &M, _pass: &Pass) -> Result<(), LinError> {
        Ok(())
    }

    fn sample_element(&self, mesh: &M, pass: &Pass, elem_id: usize) -> Result<(), LinError>;

    fn finish(&self, _mesh: &M, _pass: &Pass) -> Result<(), LinError> {
        Ok(())
    }
}

/// True if `a -> b` is the orientation under which an edge shared by two Elements is emitted
pub(crate) fn canonical_orientation(a: [f64; 2], b: [f64; 2]) -> bool {
    a[1] < b[1] || (a[1] == b[1] && a[0] < b[0])
}

/// High-water capacities of the pass buffers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Capacities {
    vertices: usize,
    triangles: usize,
    edges: usize,
    labels: usize,
}

/// Buffers of a single linearization pass
///
/// Each buffer sits behind its own lock, such that Elements can be sampled concurrently. Locks are only held for the
/// duration of a single lookup or append.
pub struct Pass<'p> {
    vertices: Mutex<VertexStore>,
    triangles: Mutex<DynamicArray<([u32; 3], i32)>>,
    edges: Mutex<DynamicArray<([u32; 2], i32)>>,
    labels: Mutex<DynamicArray<Label>>,
    levels: LevelCache,
    policy: &'p LevelPolicy,
    mesh_bbox: Option<BoundingBox>,
}

impl<'p> Pass<'p> {
    fn new<M: MeshTopology>(
        config: &'p LinearizerConfig,
        previous: Capacities,
        mesh: &M,
        with_labels: bool,
    ) -> Result<Self, LinError> {
        let allocation = &config.allocation;
        let element_count = mesh.element_count();

        let mut vertices = VertexStore::new(allocation.limits.vertices);
        vertices.reset(
            allocation.initial_capacity(BufferKind::Vertices, element_count, previous.vertices),
            mesh.node_count(),
        )?;

        let mut triangles = allocation.buffer(BufferKind::Triangles);
        triangles.reset(allocation.initial_capacity(
            BufferKind::Triangles,
            element_count,
            previous.triangles,
        ))?;

        let mut edges = allocation.buffer(BufferKind::Edges);
        edges.reset(allocation.initial_capacity(BufferKind::Edges, element_count, previous.edges))?;

        let mut labels = allocation.buffer(BufferKind::Labels);
        if with_labels {
            labels.reset(allocation.initial_capacity(BufferKind::Labels, element_count, previous.labels))?;
        }

        Ok(Self {
            vertices: Mutex::new(vertices),
            triangles: Mutex::new(triangles),
            edges: Mutex::new(edges),
            labels: Mutex::new(labels),
            levels: LevelCache::new(mesh.max_element_id()),
            policy: &config.levels,
            mesh_bbox: mesh.bounding_box(),
        })
    }

    pub fn vertex(&self, index: u32) -> Vertex {
        self.vertices.lock().vertex(index)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.lock().len()
    }

    pub fn push_vertex(&self, vertex: Vertex) -> Result<u32, LinError> {
        self.vertices.lock().push_primary(vertex)
    }

    pub fn node_vertex(&self, node_id: usize) -> Option<u32> {
        self.vertices.lock().node_vertex(node_id)
    }

    pub fn set_node_vertex(&self, node_id: usize, index: u32) {
        self.vertices.lock().set_node_vertex(node_id, index)
    }

    pub fn peek(&self, p1: u32, p2: u32) -> Option<u32> {
        self.vertices.lock().peek(p1, p2)
    }

    /// The shared midpoint vertex between `p1` and `p2`
    ///
    /// `sample` runs without holding the vertex lock. If another thread inserts the same midpoint in the meantime, its
    /// vertex wins and this sample is discarded.
    pub fn midpoint<F>(&self, p1: u32, p2: u32, sample: F) -> Result<u32, LinError>
    where
        F: FnOnce() -> Vertex,
    {
        if let Some(index) = self.peek(p1, p2) {
            return Ok(index);
        }

        let vertex = sample();
        self.vertices.lock().get_or_insert_midpoint(p1, p2, || vertex)
    }

    pub fn add_triangle(&self, triangle: [u32; 3], marker: i32) -> Result<(), LinError> {
        self.triangles.lock().push((triangle, marker)).map(|_| ())
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.lock().len()
    }

    pub fn add_edge(&self, edge: [u32; 2], marker: i32) -> Result<(), LinError> {
        self.edges.lock().push((edge, marker)).map(|_| ())
    }

    pub fn add_label(&self, label: Label) -> Result<(), LinError> {
        self.labels.lock().push(label).map(|_| ())
    }

    /// Refinement level of an Element, computed once per pass
    pub fn element_level<M: MeshTopology>(&self, mesh: &M, elem_id: usize, orders: PolyOrders) -> u8 {
        self.levels.level_for(elem_id, || {
            self.policy.level(
                mesh.element_shape(elem_id),
                mesh.is_curved(elem_id),
                mesh.element_area(elem_id),
                self.mesh_bbox,
                orders,
            )
        })
    }

    /// Replace every triangle with a hanging vertex on one of its edges by its conforming subdivision
    ///
    /// The first sub-triangle takes the slot of the original, the others are appended.
    pub fn regularize_triangles(&self) -> Result<(), LinError> {
        let store = self.vertices.lock();
        let mut triangles = self.triangles.lock();
        let lookup = |a: u32, b: u32| store.peek(a, b);

        let raw_count = triangles.len();
        for index in 0..raw_count {
            let (corners, marker) = triangles[index];
            let [a, b, c] = corners;
            let mids = [lookup(a, b), lookup(b, c), lookup(c, a)];
            if mids == [None; 3] {
                continue;
            }

            let mut first = true;
            regularize_triangle(corners, mids, marker, &lookup, &mut |triangle, marker| {
                if first {
                    first = false;
                    triangles[index] = (triangle, marker);
                    Ok(())
                } else {
                    triangles.push((triangle, marker)).map(|_| ())
                }
            })?;
        }

        Ok(())
    }

    /// Emit the edge `v1 -> v2`, split through any midpoint vertices lying on it
    pub fn split_edge(&self, v1: u32, v2: u32, marker: i32) -> Result<(), LinError> {
        let store = self.vertices.lock();
        let mut edges = self.edges.lock();

        split_edge(v1, v2, marker, &|a: u32, b: u32| store.peek(a, b), &mut |edge, marker| {
            edges.push((edge, marker)).map(|_| ())
        })
    }

    fn into_output(self) -> (LinearizedOutput, Capacities) {
        let mut store = self.vertices.into_inner();
        let mut triangles = self.triangles.into_inner();
        let mut edges = self.edges.into_inner();
        let mut labels = self.labels.into_inner();

        let capacities = Capacities {
            vertices: store.capacity(),
            triangles: triangles.capacity(),
            edges: edges.capacity(),
            labels: labels.capacity(),
        };

        let (triangles, triangle_markers) = triangles.take().into_iter().unzip();
        let (edges, edge_markers) = edges.take().into_iter().unzip();

        let output = LinearizedOutput {
            vertices: store.take_vertices(),
            triangles,
            triangle_markers,
            edges,
            edge_markers,
            labels: labels.take(),
            ..Default::default()
        };

        (output, capacities)
    }
}

type SharedOutput = RefCell<Arc<LinearizedOutput>>;

/// Read access to the published output which keeps it from being replaced
///
/// The lock is reentrant: the holding thread may start new passes or take further guards. Other threads wait until
/// the guard is dropped before starting a pass.
pub struct DataGuard<'a> {
    _guard: ReentrantMutexGuard<'a, SharedOutput>,
    output: Arc<LinearizedOutput>,
}

impl<'a> Deref for DataGuard<'a> {
    type Target = LinearizedOutput;

    fn deref(&self) -> &LinearizedOutput {
        &self.output
    }
}

/// Common machinery of the [Linearizer](super::Linearizer) and the [Orderizer](super::Orderizer)
///
/// Runs one pass at a time and publishes its result as an immutable snapshot. A failed pass publishes the empty
/// output, so readers never observe partial results.
pub struct LinearizerBase {
    config: LinearizerConfig,
    pass_lock: Mutex<()>,
    capacities: Mutex<Capacities>,
    pinned_max: Mutex<Option<f64>>,
    data: ReentrantMutex<SharedOutput>,
}

impl Default for LinearizerBase {
    fn default() -> Self {
        Self::new(LinearizerConfig::default())
    }
}

impl LinearizerBase {
    pub fn new(config: LinearizerConfig) -> Self {
        Self {
            config,
            pass_lock: Mutex::new(()),
            capacities: Mutex::new(Capacities::default()),
            pinned_max: Mutex::new(None),
            data: ReentrantMutex::new(RefCell::new(Arc::new(LinearizedOutput::default()))),
        }
    }

    pub fn config(&self) -> &LinearizerConfig {
        &self.config
    }

    /// Hold the published output until the guard is dropped
    pub fn lock_data(&self) -> DataGuard<'_> {
        let guard = self.data.lock();
        let output = Arc::clone(&guard.borrow());
        DataGuard {
            _guard: guard,
            output,
        }
    }

    /// Snapshot of the published output
    pub fn output(&self) -> Arc<LinearizedOutput> {
        Arc::clone(&self.data.lock().borrow())
    }

    pub fn is_empty(&self) -> bool {
        self.output().is_empty()
    }

    pub fn min_value(&self) -> f64 {
        self.output().min_val
    }

    pub fn max_value(&self) -> f64 {
        self.output().max_val
    }

    /// Fix the maximum of the value range instead of computing it from the vertices
    ///
    /// Negative values are rejected and leave the current setting unchanged.
    pub fn set_max_absolute_value(&self, max_abs: f64) -> Result<(), LinError> {
        if !(max_abs >= 0.0) {
            log::warn!("maximum absolute value must be non-negative; ignoring {}", max_abs);
            return Err(LinError::NegativeMaxAbsoluteValue(max_abs));
        }

        *self.pinned_max.lock() = Some(max_abs);

        let guard = self.data.lock();
        let mut current = guard.borrow_mut();
        Arc::make_mut(&mut current).max_val = max_abs;

        Ok(())
    }

    /// Compute the maximum from the vertex values again (on the next pass)
    pub fn set_auto_max(&self) {
        *self.pinned_max.lock() = None;
    }

    /// Release the published output and forget the buffer capacities of previous passes
    pub fn free(&self) {
        let _data = self.data.lock();
        let _pass = self.pass_lock.lock();
        *self.capacities.lock() = Capacities::default();
        self.publish(LinearizedOutput::default());
    }

    fn publish(&self, output: LinearizedOutput) {
        let guard = self.data.lock();
        *guard.borrow_mut() = Arc::new(output);
    }

    /// Run a complete pass of `sampler` over the active Elements of `mesh`
    ///
    /// The data lock is held for the whole pass and always taken before the pass lock, so a thread holding a
    /// [DataGuard] may start a pass while another thread is running one.
    pub fn run<M, S>(&self, mesh: &M, sampler: &S, parallel: bool) -> Result<(), LinError>
    where
        M: MeshTopology,
        S: ElementSampler<M>,
    {
        let _data = self.data.lock();
        let _pass = self.pass_lock.lock();
        sampler.validate(mesh)?;

        log::debug!(
            "linearizing {} elements ({} nodes, parallel: {})",
            mesh.element_count(),
            mesh.node_count(),
            parallel
        );

        let previous = *self.capacities.lock();
        match self.execute(mesh, sampler, parallel, previous) {
            Ok((mut output, capacities)) => {
                *self.capacities.lock() = capacities;

                let (min_val, max_val) = LinearizedOutput::value_range(&output.vertices);
                output.min_val = min_val;
                output.max_val = self.pinned_max.lock().unwrap_or(max_val);

                log::debug!(
                    "linearized into {} vertices, {} triangles, {} edges",
                    output.vertex_count(),
                    output.triangle_count(),
                    output.edge_count()
                );

                self.publish(output);
                Ok(())
            }
            Err(err) => {
                log::error!("linearization pass rolled back: {}", err);
                self.publish(LinearizedOutput::default());
                Err(err)
            }
        }
    }

    fn execute<M, S>(
        &self,
        mesh: &M,
        sampler: &S,
        parallel: bool,
        previous: Capacities,
    ) -> Result<(LinearizedOutput, Capacities), LinError>
    where
        M: MeshTopology,
        S: ElementSampler<M>,
    {
        let pass = Pass::new(&self.config, previous, mesh, sampler.uses_labels())?;
        sampler.prepare(mesh, &pass)?;

        let elements: Vec<usize> = mesh.active_elements().collect();
        if parallel {
            elements
                .par_iter()
                .try_for_each(|elem_id| sampler.sample_element(mesh, &pass, *elem_id))?;
        } else {
            elements
                .iter()
                .try_for_each(|elem_id| sampler.sample_element(mesh, &pass, *elem_id))?;
        }

        sampler.finish(mesh, &pass)?;
        Ok(pass.into_output())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Mesh;
    use crate::views::buffers::BufferLimits;
    use once_cell::sync::Lazy;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Barrier};
    use std::thread::{self, ThreadId};
    use std::time::Duration;

    /// Emits one triangle per Element through the corners' primary vertices
    struct CornerSampler;

    impl ElementSampler<Mesh> for CornerSampler {
        fn validate(&self, mesh: &Mesh) -> Result<(), LinError> {
            if mesh.is_ready() {
                Ok(())
            } else {
                Err(LinError::InvalidInput(String::from("empty mesh")))
            }
        }

        fn sample_element(&self, mesh: &Mesh, pass: &Pass, elem_id: usize) -> Result<(), LinError> {
            let nodes = mesh.element_nodes(elem_id);
            let mut ids = [0; 3];
            for (id, node) in ids.iter_mut().zip(nodes.iter()) {
                let p = mesh.node_point(*node);
                *id = pass.push_vertex(Vertex::new(p.x, p.y, p.x - p.y))?;
            }
            pass.add_triangle(ids, mesh.element_marker(elem_id))
        }
    }

    /// Behaves like [CornerSampler], but waits at `gate` when sampling the first Element
    struct GatedSampler {
        gate: Barrier,
        entered: AtomicBool,
    }

    impl ElementSampler<Mesh> for GatedSampler {
        fn validate(&self, mesh: &Mesh) -> Result<(), LinError> {
            CornerSampler.validate(mesh)
        }

        fn sample_element(&self, mesh: &Mesh, pass: &Pass, elem_id: usize) -> Result<(), LinError> {
            if !self.entered.swap(true, Ordering::SeqCst) {
                self.gate.wait();
            }
            CornerSampler.sample_element(mesh, pass, elem_id)
        }
    }

    /// Keeps every log record together with the thread which emitted it
    struct CaptureLogger {
        records: Mutex<Vec<(ThreadId, log::Level, String)>>,
    }

    impl log::Log for CaptureLogger {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            self.records
                .lock()
                .push((thread::current().id(), record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    static LOGGER: Lazy<CaptureLogger> = Lazy::new(|| CaptureLogger {
        records: Mutex::new(Vec::new()),
    });

    fn capture_logs() {
        // only the first call installs the logger
        let _ = log::set_logger(&*LOGGER);
        log::set_max_level(log::LevelFilter::Trace);
    }

    fn logged_on_this_thread(level: log::Level) -> Vec<String> {
        let id = thread::current().id();
        LOGGER
            .records
            .lock()
            .iter()
            .filter(|(thread_id, record_level, _)| *thread_id == id && *record_level == level)
            .map(|(_, _, message)| message.clone())
            .collect()
    }

    fn square() -> Mesh {
        Mesh::from_file("./test_input/square_tris.json").unwrap()
    }

    #[test]
    fn publish_and_range() {
        let base = LinearizerBase::default();
        assert!(base.is_empty());

        base.run(&square(), &CornerSampler, false).unwrap();

        let output = base.output();
        assert_eq!(output.vertex_count(), 6);
        assert_eq!(output.triangle_markers, vec![1, 2]);
        assert_eq!(base.min_value(), -1.0);
        assert_eq!(base.max_value(), 1.0);
    }

    #[test]
    fn pinned_maximum() {
        let base = LinearizerBase::default();
        base.run(&square(), &CornerSampler, false).unwrap();

        assert!(matches!(
            base.set_max_absolute_value(-2.0),
            Err(LinError::NegativeMaxAbsoluteValue(_))
        ));
        assert_eq!(base.max_value(), 1.0);

        let before = base.output();
        base.set_max_absolute_value(10.0).unwrap();
        assert_eq!(base.max_value(), 10.0);
        // earlier snapshots are not modified
        assert_eq!(before.max_val, 1.0);

        base.run(&square(), &CornerSampler, false).unwrap();
        assert_eq!(base.max_value(), 10.0);
        assert_eq!(base.min_value(), -1.0);

        base.set_auto_max();
        base.run(&square(), &CornerSampler, false).unwrap();
        assert_eq!(base.max_value(), 1.0);
    }

    #[test]
    fn rejected_maximum_is_logged() {
        capture_logs();
        let base = LinearizerBase::default();

        assert!(base.set_max_absolute_value(-0.5).is_err());
        let warnings = logged_on_this_thread(log::Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("-0.5"));

        base.set_max_absolute_value(0.5).unwrap();
        assert_eq!(logged_on_this_thread(log::Level::Warn).len(), 1);
    }

    #[test]
    fn invalid_input_leaves_output() {
        let base = LinearizerBase::default();
        base.run(&square(), &CornerSampler, false).unwrap();

        assert!(matches!(
            base.run(&Mesh::blank(), &CornerSampler, false),
            Err(LinError::InvalidInput(_))
        ));
        assert_eq!(base.output().triangle_count(), 2);
    }

    #[test]
    fn failed_pass_rolls_back() {
        let mut config = LinearizerConfig::default();
        config.allocation.min_triangles = 1;
        config.allocation.triangle_multiplier = 0;
        config.allocation.limits = BufferLimits {
            triangles: Some(1),
            ..Default::default()
        };
        let base = LinearizerBase::new(config);

        let result = base.run(&square(), &CornerSampler, false);
        assert!(matches!(
            result,
            Err(LinError::OutOfMemory {
                buffer: BufferKind::Triangles,
                requested: 2
            })
        ));

        let output = base.lock_data();
        assert!(output.is_empty());
        assert_eq!(output.triangle_count(), 0);
        assert_eq!(output.edge_count(), 0);
    }

    #[test]
    fn capacities_persist_until_freed() {
        let mut config = LinearizerConfig::default();
        config.allocation.min_vertices = 4;
        config.allocation.vertex_multiplier = 1;
        let base = LinearizerBase::new(config);

        base.run(&square(), &CornerSampler, false).unwrap();
        // 6 vertices: 4 -> 6
        assert_eq!(base.capacities.lock().vertices, 6);

        base.free();
        assert!(base.is_empty());
        assert_eq!(*base.capacities.lock(), Capacities::default());
    }

    #[test]
    fn parallel_sampling() {
        let base = LinearizerBase::default();
        base.run(&square(), &CornerSampler, true).unwrap();

        let output = base.output();
        assert_eq!(output.triangle_count(), 2);
        let mut markers = output.triangle_markers.clone();
        markers.sort_unstable();
        assert_eq!(markers, vec![1, 2]);
    }

    #[test]
    fn data_lock_is_reentrant() {
        let base = LinearizerBase::default();
        let guard = base.lock_data();
        assert!(guard.is_empty());

        // the same thread may publish while holding the guard
        base.run(&square(), &CornerSampler, false).unwrap();
        assert!(guard.is_empty());
        assert_eq!(base.lock_data().triangle_count(), 2);
    }

    #[test]
    fn readers_block_publishing() {
        let base = LinearizerBase::default();
        let (tx, rx) = mpsc::channel();

        thread::scope(|s| {
            let guard = base.lock_data();
            let writer = &base;
            s.spawn(move || {
                writer.run(&square(), &CornerSampler, false).unwrap();
                tx.send(()).unwrap();
            });

            // the pass cannot publish while the guard is held
            assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
            assert!(guard.is_empty());
            drop(guard);

            rx.recv().unwrap();
        });

        assert_eq!(base.output().triangle_count(), 2);
    }

    #[test]
    fn reader_starts_pass_during_another_pass() {
        let base = LinearizerBase::default();
        let gated = GatedSampler {
            gate: Barrier::new(2),
            entered: AtomicBool::new(false),
        };
        let (tx, rx) = mpsc::channel();

        thread::scope(|s| {
            let (shared, first_pass) = (&base, &gated);
            s.spawn(move || shared.run(&square(), first_pass, false).unwrap());

            // the first pass is sampling once the gate opens
            gated.gate.wait();
            s.spawn(move || {
                let guard = shared.lock_data();
                let published = guard.triangle_count();
                shared.run(&square(), &CornerSampler, false).unwrap();
                tx.send(published).unwrap();
            });

            // the guard is only granted after the first pass published its output
            assert_eq!(rx.recv_timeout(Duration::from_secs(10)), Ok(2));
        });

        assert_eq!(base.output().triangle_count(), 2);
    }

    #[test]
    fn midpoints_and_regularization() {
        let base = LinearizerBase::default();
        let mesh = square();
        let pass = Pass::new(&base.config, Capacities::default(), &mesh, false).unwrap();

        let ids: Vec<u32> = [[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]]
            .iter()
            .map(|[x, y]| pass.push_vertex(Vertex::new(*x, *y, 0.0)).unwrap())
            .collect();
        pass.add_triangle([ids[0], ids[1], ids[2]], 4).unwrap();

        let m = pass.midpoint(ids[0], ids[1], || Vertex::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(pass.midpoint(ids[1], ids[0], || unreachable!()).unwrap(), m);

        pass.regularize_triangles().unwrap();
        assert_eq!(pass.triangle_count(), 2);

        pass.split_edge(ids[1], ids[0], 9).unwrap();
        let (output, _) = pass.into_output();
        assert_eq!(output.edges, vec![[ids[1], m], [m, ids[0]]]);
        assert_eq!(output.edge_markers, vec![9, 9]);
        assert_eq!(output.triangles[0], [ids[0], m, ids[2]]);
        assert_eq!(output.triangle_markers, vec![4, 4]);
    }

    #[test]
    fn cached_element_levels() {
        let base = LinearizerBase::default();
        let mesh = square();
        let pass = Pass::new(&base.config, Capacities::default(), &mesh, false).unwrap();

        assert_eq!(pass.element_level(&mesh, 0, PolyOrders::uniform(1)), 0);
        // the first result is kept for the rest of the pass
        assert_eq!(pass.element_level(&mesh, 0, PolyOrders::uniform(4)), 0);
        assert_eq!(pass.element_level(&mesh, 1, PolyOrders::uniform(4)), 5);
    }

    #[test]
    fn orientation_rule() {
        assert!(canonical_orientation([1.0, 0.0], [0.0, 1.0]));
        assert!(canonical_orientation([0.0, 1.0], [1.0, 1.0]));
        assert!(!canonical_orientation([1.0, 1.0], [0.0, 1.0]));
        assert!(!canonical_orientation([0.0, 0.0], [0.0, 0.0]));
    }
}

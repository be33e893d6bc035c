use super::mesh::{p_refinement::PolyOrders, space::{Point, V2D}};
use super::{MeshFunction, OrderSpace, ReferenceMap};

/// Value of a scalar field and its first derivatives at a single point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldValue {
    pub value: f64,
    pub dx: f64,
    pub dy: f64,
}

impl FieldValue {
    pub const fn new(value: f64, dx: f64, dy: f64) -> Self {
        Self { value, dx, dy }
    }

    /// Extract the requested component
    pub fn item(&self, item: ValueItem) -> f64 {
        match item {
            ValueItem::Value => self.value,
            ValueItem::Dx => self.dx,
            ValueItem::Dy => self.dy,
        }
    }
}

/// Which component of a [FieldValue] is sampled by a linearization
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ValueItem {
    #[default]
    Value,
    Dx,
    Dy,
}

/// A field defined by a closure of real-space coordinates
///
/// The polynomial orders reported to the linearizer are taken from the `OrderSpace` the field is defined over.
/// Fields computed from a discrete solution would implement [MeshFunction] directly.
pub struct ExactField<'m, M, F>
where
    M: OrderSpace,
    F: Fn(Point) -> FieldValue + Sync,
{
    space: &'m M,
    f: F,
}

impl<'m, M, F> ExactField<'m, M, F>
where
    M: OrderSpace,
    F: Fn(Point) -> FieldValue + Sync,
{
    pub fn new(space: &'m M, f: F) -> Self {
        Self { space, f }
    }

    pub fn space(&self) -> &'m M {
        self.space
    }

    /// Evaluate the field directly at a Point in real space
    pub fn at(&self, p: Point) -> FieldValue {
        (self.f)(p)
    }
}

impl<'m, M, F> MeshFunction for ExactField<'m, M, F>
where
    M: OrderSpace,
    F: Fn(Point) -> FieldValue + Sync,
{
    fn evaluate(&self, elem_id: usize, r: V2D) -> FieldValue {
        (self.f)(self.space.mesh().physical_coordinates(elem_id, r))
    }

    fn polynomial_order(&self, elem_id: usize) -> PolyOrders {
        self.space.element_orders(elem_id)
    }

    fn is_ready(&self) -> bool {
        self.space.is_ready()
    }
}

const DIFF_STEP: f64 = 1e-6;

/// Build an [ExactField] from a scalar function of `(x, y)`. Derivatives are approximated with central differences.
pub fn scalar_field<'m, M, G>(
    space: &'m M,
    g: G,
) -> ExactField<'m, M, impl Fn(Point) -> FieldValue + Sync>
where
    M: OrderSpace,
    G: Fn(f64, f64) -> f64 + Sync,
{
    ExactField::new(space, move |p: Point| {
        FieldValue::new(
            g(p.x, p.y),
            (g(p.x + DIFF_STEP, p.y) - g(p.x - DIFF_STEP, p.y)) / (2.0 * DIFF_STEP),
            (g(p.x, p.y + DIFF_STEP) - g(p.x, p.y - DIFF_STEP)) / (2.0 * DIFF_STEP),
        )
    })
}

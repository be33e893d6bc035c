use super::MAX_POLYNOMIAL_ORDER;
#[cfg(feature = "json_export")]
use json::{object, JsonValue};
use std::fmt;

/// Polynomial expansion orders of an `Element`
///
/// Quadrilaterals carry independent horizontal (`ni`, u-directed) and vertical (`nj`, v-directed) orders.
/// Triangles carry a single order, stored in both fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolyOrders {
    /// Maximum u-directed polynomial expansion order
    pub ni: u8,
    /// Maximum v-directed polynomial expansion order
    pub nj: u8,
}

impl PolyOrders {
    pub const fn from(i: u8, j: u8) -> Self {
        Self { ni: i, nj: j }
    }

    pub const fn uniform(n: u8) -> Self {
        Self { ni: n, nj: n }
    }

    /// Update the u- and v-directed expansion orders according to a [PRef]
    pub fn refine(&mut self, refinement: PRef) -> Result<(), PRefError> {
        self.ni = refinement.refine_i(self.ni)?;
        self.nj = refinement.refine_j(self.nj)?;

        Ok(())
    }

    pub fn set(&mut self, [ni, nj]: [u8; 2]) -> Result<(), PRefError> {
        if ni > MAX_POLYNOMIAL_ORDER || nj > MAX_POLYNOMIAL_ORDER {
            return Err(PRefError::ExceededMaxExpansion);
        }
        if ni == 0 || nj == 0 {
            return Err(PRefError::NegExpansion);
        }

        self.ni = ni;
        self.nj = nj;

        Ok(())
    }

    /// The larger of the two directional orders
    pub fn max_order(&self) -> u8 {
        std::cmp::max(self.ni, self.nj)
    }

    pub fn max_with(&self, orders: [u8; 2]) -> [u8; 2] {
        [
            std::cmp::max(self.ni, orders[0]),
            std::cmp::max(self.nj, orders[1]),
        ]
    }
}

impl Default for PolyOrders {
    fn default() -> Self {
        Self { ni: 1, nj: 1 }
    }
}

impl fmt::Display for PolyOrders {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.ni == self.nj {
            write!(f, "{}", self.ni)
        } else {
            write!(f, "{}|{}", self.ni, self.nj)
        }
    }
}

#[cfg(feature = "json_export")]
impl From<PolyOrders> for JsonValue {
    fn from(orders: PolyOrders) -> Self {
        object! {
            "u": orders.ni,
            "v": orders.nj,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PRefInt {
    Increment(u8),
    Decrement(u8),
    None,
}

impl PRefInt {
    const fn from(delta: i8) -> Self {
        match delta {
            0 => Self::None,
            d if d > 0 => Self::Increment(d as u8),
            d => Self::Decrement(d.unsigned_abs()),
        }
    }

    fn refine(&self, n: u8) -> Result<u8, PRefError> {
        match self {
            Self::Increment(delta) => {
                if n.saturating_add(*delta) > MAX_POLYNOMIAL_ORDER {
                    Err(PRefError::ExceededMaxExpansion)
                } else {
                    Ok(n + *delta)
                }
            }
            Self::Decrement(delta) => {
                if *delta >= n {
                    Err(PRefError::NegExpansion)
                } else {
                    Ok(n - *delta)
                }
            }
            Self::None => Ok(n),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Description of a p-Refinement
pub struct PRef {
    di: PRefInt,
    dj: PRefInt,
}

impl PRef {
    pub const fn from(i: i8, j: i8) -> Self {
        Self {
            di: PRefInt::from(i),
            dj: PRefInt::from(j),
        }
    }

    /// True if both directions are refined by the same amount
    pub fn is_isotropic(&self) -> bool {
        self.di == self.dj
    }

    fn refine_i(&self, i_current: u8) -> Result<u8, PRefError> {
        self.di.refine(i_current)
    }

    fn refine_j(&self, j_current: u8) -> Result<u8, PRefError> {
        self.dj.refine(j_current)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PRefError {
    NegExpansion,
    ExceededMaxExpansion,
    ElemDoesntExist(usize),
    DoubleRefinement(usize),
    AnisotropicTriangle(usize),
}

impl fmt::Display for PRefError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NegExpansion => write!(f, "Negative p-Refinement will result in 0 or negative expansion; Cannot p-Refine!"),
            Self::ExceededMaxExpansion => write!(f, "Positive p-Refinement will result in expansion order over maximum; Cannot p-Refine!"),
            Self::ElemDoesntExist(elem_id) => write!(f, "Element {} does not exist; Cannot apply p-Refinement!", elem_id),
            Self::DoubleRefinement(elem_id) => write!(f, "Multiple p-refinements were specified for Element {}; Cannot apply p-Refinements", elem_id),
            Self::AnisotropicTriangle(elem_id) => write!(f, "Element {} is a triangle and only supports a single expansion order; Cannot apply p-Refinement!", elem_id),
        }
    }
}

impl std::error::Error for PRefError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refine_orders() {
        let mut orders = PolyOrders::default();
        orders.refine(PRef::from(2, 1)).unwrap();
        assert_eq!(orders, PolyOrders::from(3, 2));

        orders.refine(PRef::from(-1, 0)).unwrap();
        assert_eq!(orders, PolyOrders::from(2, 2));
        assert_eq!(orders.max_order(), 2);
    }

    #[test]
    fn refine_past_limits() {
        let mut orders = PolyOrders::from(2, 2);
        assert_eq!(orders.refine(PRef::from(-2, 0)), Err(PRefError::NegExpansion));

        let max_as_i8 = MAX_POLYNOMIAL_ORDER as i8;
        assert_eq!(
            orders.refine(PRef::from(0, max_as_i8)),
            Err(PRefError::ExceededMaxExpansion)
        );
        assert_eq!(orders.set([0, 1]), Err(PRefError::NegExpansion));
    }

    #[test]
    fn display_orders() {
        assert_eq!(PolyOrders::uniform(4).to_string(), "4");
        assert_eq!(PolyOrders::from(2, 5).to_string(), "2|5");
    }
}

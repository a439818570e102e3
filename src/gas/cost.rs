//! Fuel units and per-key comparison costs.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// An abstract, non-negative quantity of computational fuel.
///
/// Costs are additive across sub-steps of an operation. All arithmetic
/// saturates at the representable maximum rather than wrapping, so a cost can
/// never silently shrink; a saturated cost simply exhausts any finite meter.
/// No floating point is involved anywhere, keeping accounting deterministic
/// across platforms.
///
/// # Examples
///
/// ```rust
/// use carbonated_map::gas::Cost;
///
/// let lookup = Cost::new(50) + Cost::new(3) * 4;
/// assert_eq!(lookup, Cost::new(62));
/// assert_eq!(Cost::new(u64::MAX) + Cost::new(1), Cost::new(u64::MAX));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Cost(u64);

impl Cost {
    /// The zero cost.
    pub const ZERO: Self = Self(0);

    /// Creates a cost of `units` fuel units.
    #[inline]
    #[must_use]
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    /// Returns the raw number of fuel units.
    #[inline]
    #[must_use]
    pub const fn units(self) -> u64 {
        self.0
    }

    /// Adds two costs, saturating at the representable maximum.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts `other`, saturating at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Scales this cost by `factor`, saturating at the representable maximum.
    #[must_use]
    pub const fn saturating_mul(self, factor: u64) -> Self {
        Self(self.0.saturating_mul(factor))
    }

    /// Adds two costs, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(units) => Some(Self(units)),
            None => None,
        }
    }
}

impl Add for Cost {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, other: Self) {
        *self = self.saturating_add(other);
    }
}

impl Mul<u64> for Cost {
    type Output = Self;

    fn mul(self, factor: u64) -> Self {
        self.saturating_mul(factor)
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl From<u64> for Cost {
    fn from(units: u64) -> Self {
        Self(units)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Comparison cost for fixed-width scalar keys.
const WORD_COMPARE: Cost = Cost::new(1);

/// Comparison cost for a variable-length key of `len` bytes.
///
/// One word charge plus one unit per eight-byte run, so longer keys pay
/// proportionally more.
const fn bytes_compare(len: usize) -> Cost {
    Cost::new(1 + (len as u64) / 8)
}

/// Reports the gas cost of comparing a key against another key of the same
/// type.
///
/// The cost is a property of the specific key instance, not of the type: a
/// long byte-string key is more expensive to compare than a short one.
/// [`CarbonatedMap`](crate::map::CarbonatedMap) queries this capability on
/// the key actually being processed whenever it prices a lookup or an update.
///
/// # Examples
///
/// ```rust
/// use carbonated_map::gas::CompareCost;
///
/// assert_eq!(7_u64.compare_cost(), 42_u64.compare_cost());
/// assert!("a-rather-long-contract-address".compare_cost() > "k".compare_cost());
/// ```
pub trait CompareCost {
    /// The gas cost of one comparison involving this key.
    fn compare_cost(&self) -> Cost;
}

macro_rules! word_compare_cost {
    ($($scalar:ty),* $(,)?) => {
        $(
            impl CompareCost for $scalar {
                fn compare_cost(&self) -> Cost {
                    WORD_COMPARE
                }
            }
        )*
    };
}

word_compare_cost!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char);

impl CompareCost for str {
    fn compare_cost(&self) -> Cost {
        bytes_compare(self.len())
    }
}

impl CompareCost for String {
    fn compare_cost(&self) -> Cost {
        self.as_str().compare_cost()
    }
}

impl CompareCost for [u8] {
    fn compare_cost(&self) -> Cost {
        bytes_compare(self.len())
    }
}

impl CompareCost for Vec<u8> {
    fn compare_cost(&self) -> Cost {
        self.as_slice().compare_cost()
    }
}

impl<T: CompareCost + ?Sized> CompareCost for &T {
    fn compare_cost(&self) -> Cost {
        (**self).compare_cost()
    }
}

static_assertions::assert_impl_all!(Cost: Copy, Ord, Send, Sync);

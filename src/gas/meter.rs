//! The fuel counter capability and a reference meter.

use std::fmt;

use super::cost::Cost;

/// A required charge could not be covered by the remaining fuel.
///
/// This condition is permanent for the failing call: repeating it against the
/// same meter state fails identically. Retrying requires a meter with more
/// fuel; the map machinery never retries or suppresses it.
///
/// # Examples
///
/// ```rust
/// use carbonated_map::gas::{Cost, GasBudget, GasMeter};
///
/// let mut gas = GasBudget::new(Cost::new(10));
/// let error = gas.consume(Cost::new(25)).unwrap_err();
/// assert_eq!(error.requested, Cost::new(25));
/// assert_eq!(error.remaining, Cost::new(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasExhausted {
    /// The cost of the refused charge.
    pub requested: Cost,
    /// Fuel that remained when the charge was refused.
    pub remaining: Cost,
}

impl fmt::Display for GasExhausted {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "gas exhausted: charge of {} refused with {} remaining",
            self.requested, self.remaining
        )
    }
}

impl std::error::Error for GasExhausted {}

/// A monotonically decreasing fuel counter.
///
/// This is the external capability every metered map operation consumes. The
/// contract is consume-then-act: the caller of [`consume`](Self::consume)
/// must charge the full cost of a step before performing it, and a refused
/// charge must leave the meter unchanged so that accounting stays exact up to
/// the failure point.
///
/// Sharing one meter across threads is out of contract; distinct map versions
/// may be shared freely, the meter may not.
pub trait GasMeter {
    /// Subtracts `cost` from the remaining fuel.
    ///
    /// # Errors
    ///
    /// Returns [`GasExhausted`] if the remaining fuel cannot cover `cost`,
    /// in which case the meter is left untouched.
    fn consume(&mut self, cost: Cost) -> Result<(), GasExhausted>;
}

/// A [`GasMeter`] backed by a fixed fuel limit.
///
/// Charges accumulate in `used` and are checked against `limit` before being
/// committed, so a refused charge never moves the counter.
///
/// # Examples
///
/// ```rust
/// use carbonated_map::gas::{Cost, GasBudget, GasMeter};
///
/// let mut gas = GasBudget::new(Cost::new(1_000));
/// gas.consume(Cost::new(300)).unwrap();
/// assert_eq!(gas.consumed(), Cost::new(300));
/// assert_eq!(gas.remaining(), Cost::new(700));
/// assert!(!gas.is_exhausted());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasBudget {
    limit: Cost,
    used: Cost,
}

impl GasBudget {
    /// Creates a meter that refuses charges beyond `limit`.
    #[must_use]
    pub const fn new(limit: Cost) -> Self {
        Self {
            limit,
            used: Cost::ZERO,
        }
    }

    /// Creates a meter with the maximum representable limit.
    ///
    /// Intended for tests and for contexts that account but never abort.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self::new(Cost::new(u64::MAX))
    }

    /// Total fuel consumed so far.
    #[must_use]
    pub const fn consumed(&self) -> Cost {
        self.used
    }

    /// Fuel still available before the limit is reached.
    #[must_use]
    pub const fn remaining(&self) -> Cost {
        self.limit.saturating_sub(self.used)
    }

    /// The fuel limit this meter was created with.
    #[must_use]
    pub const fn limit(&self) -> Cost {
        self.limit
    }

    /// Returns `true` once no fuel remains.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }
}

impl GasMeter for GasBudget {
    fn consume(&mut self, cost: Cost) -> Result<(), GasExhausted> {
        match self.used.checked_add(cost) {
            Some(next) if next <= self.limit => {
                self.used = next;
                Ok(())
            }
            _ => Err(GasExhausted {
                requested: cost,
                remaining: self.remaining(),
            }),
        }
    }
}

static_assertions::assert_impl_all!(GasBudget: Clone, Send, Sync);

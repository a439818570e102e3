//! # carbonated-map
//!
//! A gas-metered persistent ordered map for deterministic state accounting.
//!
//! ## Overview
//!
//! This library provides [`map::CarbonatedMap`], an immutable ordered map in
//! which every lookup, insertion, removal, and traversal first charges an
//! abstract fuel cost ("gas") against a caller-supplied meter. Running out of
//! fuel deterministically aborts the operation before it commits anything,
//! which makes the container suitable for ledger-style state layers where
//! resource usage must be identical across every node replaying the same
//! operations. It includes:
//!
//! - **Gas accounting**: [`gas::Cost`] units, the [`gas::GasMeter`] capability,
//!   and the [`gas::GasBudget`] reference meter
//! - **Cost formulas**: the pluggable [`gas::CostModel`] trait with a
//!   calibratable balanced-tree default
//! - **Per-key comparison costs**: [`gas::CompareCost`], so variable-length
//!   keys report their own comparison price
//! - **Persistent storage**: a structurally-shared red-black tree, so old and
//!   new map versions coexist without copying
//!
//! ## Feature Flags
//!
//! - `arc`: use `Arc` instead of `Rc` for tree nodes, allowing distinct map
//!   versions to be held across threads
//!
//! ## Example
//!
//! ```rust
//! use carbonated_map::prelude::*;
//!
//! let mut gas = GasBudget::new(Cost::new(10_000));
//! let map: CarbonatedMap<&str, u64> = CarbonatedMap::new();
//!
//! let map = map
//!     .update(&mut gas, "wheat", |_, _| Ok::<_, ()>(Some(12)))
//!     .unwrap();
//!
//! assert_eq!(map.find(&mut gas, &"wheat").unwrap(), Some(&12));
//! assert!(gas.consumed() > Cost::ZERO);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use carbonated_map::prelude::*;
/// ```
pub mod prelude {
    pub use crate::gas::{
        BalancedTreeCostModel, CompareCost, Cost, CostModel, GasBudget, GasExhausted, GasMeter,
    };
    pub use crate::map::{CarbonatedError, CarbonatedMap};
}

pub mod gas;

pub mod map;

#[cfg(test)]
mod tests {
    use crate::map::CarbonatedMap;

    #[test]
    fn library_compiles() {
        let map: CarbonatedMap<u64, u64> = CarbonatedMap::new();
        assert!(map.is_empty());
    }
}

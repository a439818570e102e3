//! Gas accounting: fuel units, the meter capability, and cost formulas.
//!
//! Every mutating or traversing operation on a
//! [`CarbonatedMap`](crate::map::CarbonatedMap) threads a [`GasMeter`] and
//! charges a [`Cost`] computed by a [`CostModel`] before touching the tree.
//! The discipline is consume-then-act: a charge that cannot be covered fails
//! with [`GasExhausted`] and nothing else happens.
//!
//! # Examples
//!
//! ```rust
//! use carbonated_map::gas::{Cost, GasBudget, GasMeter};
//!
//! let mut gas = GasBudget::new(Cost::new(100));
//! gas.consume(Cost::new(40)).unwrap();
//! assert_eq!(gas.remaining(), Cost::new(60));
//!
//! // A refused charge leaves the meter untouched.
//! assert!(gas.consume(Cost::new(61)).is_err());
//! assert_eq!(gas.consumed(), Cost::new(40));
//! ```

mod cost;
mod meter;
mod model;

pub use cost::CompareCost;
pub use cost::Cost;
pub use meter::GasBudget;
pub use meter::GasExhausted;
pub use meter::GasMeter;
pub use model::BalancedTreeCostModel;
pub use model::CostModel;

//! Gas-metered persistent ordered map.
//!
//! [`CarbonatedMap`] is an immutable associative container backed by a
//! structurally-shared red-black tree: every "mutation" returns a new map
//! value while old versions stay valid, and untouched subtrees are shared
//! between versions. What sets it apart from an ordinary persistent map is
//! that every lookup, update, and traversal charges a gas cost through a
//! caller-supplied [`GasMeter`](crate::gas::GasMeter) before doing any work,
//! and aborts with no partial effects when the fuel runs out.
//!
//! # Structural Sharing
//!
//! ```rust
//! use carbonated_map::gas::GasBudget;
//! use carbonated_map::map::CarbonatedMap;
//!
//! let mut gas = GasBudget::unlimited();
//! let map: CarbonatedMap<u32, &str> = CarbonatedMap::new();
//! let map = map.update(&mut gas, 1, |_, _| Ok::<_, ()>(Some("one"))).unwrap();
//!
//! // The original version survives the update untouched.
//! let updated = map.update(&mut gas, 1, |_, _| Ok::<_, ()>(Some("ONE"))).unwrap();
//! assert_eq!(map.find(&mut gas, &1).unwrap(), Some(&"one"));
//! assert_eq!(updated.find(&mut gas, &1).unwrap(), Some(&"ONE"));
//! ```

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`, which lets
/// distinct map versions be held across threads at a slight overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod carbonated;
mod tree;

pub use carbonated::CarbonatedError;
pub use carbonated::CarbonatedMap;

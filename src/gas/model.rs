//! Cost formulas for balanced-tree operations.

use super::cost::Cost;

/// Base charge for a lookup traversal.
const LOOKUP_BASE: Cost = Cost::new(50);

/// Base charge for an insertion or removal, covering rebalancing work.
const REBALANCE_BASE: Cost = Cost::new(130);

/// Base charge for starting a full traversal.
const TRAVERSE_BASE: Cost = Cost::new(10);

/// Charge per entry visited by a full traversal.
const TRAVERSE_PER_ENTRY: Cost = Cost::new(20);

/// Pure cost formulas priced from the map's cached size and the key's own
/// comparison cost.
///
/// Implementations must be deterministic, side-effect free, additive, and
/// monotone in both arguments. The numeric shape is a calibration concern:
/// callers with a benchmarked reference engine can supply their own model
/// without touching the map.
pub trait CostModel {
    /// Cost of looking a key up in a map of `size` entries.
    fn find_cost(&self, compare_cost: Cost, size: usize) -> Cost;

    /// Cost of inserting, replacing, or removing a binding in a map of
    /// `size` entries.
    ///
    /// Shares the shape of [`find_cost`](Self::find_cost) but is priced
    /// independently: writes do constant extra rebalancing work beyond a
    /// pure lookup.
    fn update_cost(&self, compare_cost: Cost, size: usize) -> Cost;

    /// Cost of traversing every entry of a map of `size` entries.
    fn fold_cost(&self, size: usize) -> Cost;
}

/// Number of key comparisons on a root-to-leaf path of a balanced tree
/// holding `size` entries: the bit length of `size`, zero for the empty tree.
const fn path_comparisons(size: usize) -> u64 {
    (usize::BITS - size.leading_zeros()) as u64
}

/// [`CostModel`] for a balanced binary search tree.
///
/// Lookups and updates pay a base charge plus the key's comparison cost once
/// per expected tree level; full traversals pay a base charge plus a flat
/// per-entry charge. The default constants are starting points, not a
/// correctness contract; [`new`](Self::new) builds a recalibrated instance.
///
/// # Examples
///
/// ```rust
/// use carbonated_map::gas::{BalancedTreeCostModel, CompareCost, CostModel};
///
/// let costs = BalancedTreeCostModel::default();
/// let key_cost = "storage-key".compare_cost();
///
/// // Deeper trees pay more comparisons.
/// assert!(costs.find_cost(key_cost, 1_000) > costs.find_cost(key_cost, 1));
/// // Writes are priced above reads of the same shape.
/// assert!(costs.update_cost(key_cost, 64) > costs.find_cost(key_cost, 64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancedTreeCostModel {
    lookup_base: Cost,
    rebalance_base: Cost,
    traverse_base: Cost,
    traverse_per_entry: Cost,
}

impl BalancedTreeCostModel {
    /// Builds a model from calibrated constants.
    #[must_use]
    pub const fn new(
        lookup_base: Cost,
        rebalance_base: Cost,
        traverse_base: Cost,
        traverse_per_entry: Cost,
    ) -> Self {
        Self {
            lookup_base,
            rebalance_base,
            traverse_base,
            traverse_per_entry,
        }
    }
}

impl Default for BalancedTreeCostModel {
    fn default() -> Self {
        Self::new(LOOKUP_BASE, REBALANCE_BASE, TRAVERSE_BASE, TRAVERSE_PER_ENTRY)
    }
}

impl CostModel for BalancedTreeCostModel {
    fn find_cost(&self, compare_cost: Cost, size: usize) -> Cost {
        self.lookup_base
            .saturating_add(compare_cost.saturating_mul(path_comparisons(size)))
    }

    fn update_cost(&self, compare_cost: Cost, size: usize) -> Cost {
        self.rebalance_base
            .saturating_add(compare_cost.saturating_mul(path_comparisons(size)))
    }

    fn fold_cost(&self, size: usize) -> Cost {
        self.traverse_base
            .saturating_add(self.traverse_per_entry.saturating_mul(size as u64))
    }
}

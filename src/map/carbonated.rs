//! The gas-metered map and its error type.

use std::fmt;

use super::tree::Tree;
use crate::gas::{BalancedTreeCostModel, CompareCost, CostModel, GasExhausted, GasMeter};

/// Error returned by map operations that run caller-supplied callbacks.
///
/// Gas failures raised by the map machinery and failures raised by the
/// caller's own callbacks travel side by side; the latter are opaque to the
/// map and pass through unchanged.
///
/// # Examples
///
/// ```rust
/// use carbonated_map::gas::GasBudget;
/// use carbonated_map::map::{CarbonatedError, CarbonatedMap};
///
/// let mut gas = GasBudget::unlimited();
/// let map: CarbonatedMap<u32, u32> = CarbonatedMap::new();
///
/// let error = map
///     .update(&mut gas, 1, |_, _| Err::<Option<u32>, &str>("rejected"))
///     .unwrap_err();
/// assert_eq!(error, CarbonatedError::Caller("rejected"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarbonatedError<E> {
    /// The gas meter refused a charge required by the map machinery.
    Gas(GasExhausted),
    /// A caller-supplied callback failed; the inner error is untouched.
    Caller(E),
}

impl<E> From<GasExhausted> for CarbonatedError<E> {
    fn from(error: GasExhausted) -> Self {
        Self::Gas(error)
    }
}

impl<E: fmt::Display> fmt::Display for CarbonatedError<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gas(error) => write!(formatter, "{error}"),
            Self::Caller(error) => write!(formatter, "{error}"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for CarbonatedError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gas(error) => Some(error),
            Self::Caller(error) => Some(error),
        }
    }
}

/// A gas-metered persistent ordered map.
///
/// Keys are unique and strictly ordered by `K`'s total order; no insertion
/// order is preserved. Every operation that touches the tree first charges a
/// cost from a caller-supplied [`GasMeter`], computed by the map's
/// [`CostModel`] from the cached entry count and the key's own
/// [`CompareCost`]. A refused charge aborts the operation before any tree
/// work happens, so a failed call never yields a partially-updated map; the
/// gas consumed up to the failure point is the only observable effect.
///
/// The map is immutable: mutating operations return a new version that
/// shares untouched subtrees with the original.
///
/// # Charges
///
/// | Operation           | Charge                                            |
/// |---------------------|---------------------------------------------------|
/// | `new`, `singleton`  | none                                              |
/// | `len`, `is_empty`   | none (cached count)                               |
/// | `find`              | `find_cost`                                       |
/// | `update`            | `find_cost`, then `update_cost` unless a no-op    |
/// | `add`               | `find_cost` + `update_cost`                       |
/// | `to_list`, `fold`   | `fold_cost`                                       |
/// | `of_list`           | one `add` charge per input entry                  |
/// | `merge`             | `fold_cost` of the other map + one `add` per entry|
/// | `map`               | `fold_cost` + one `update_cost` per entry         |
///
/// # Examples
///
/// ```rust
/// use carbonated_map::gas::{Cost, GasBudget};
/// use carbonated_map::map::CarbonatedMap;
///
/// let mut gas = GasBudget::new(Cost::new(10_000));
/// let scripts: CarbonatedMap<&str, u64> = CarbonatedMap::new();
///
/// let scripts = scripts
///     .update(&mut gas, "transfer", |_, _| Ok::<_, ()>(Some(3)))
///     .unwrap()
///     .update(&mut gas, "mint", |_, _| Ok::<_, ()>(Some(8)))
///     .unwrap();
///
/// assert_eq!(scripts.len(), 2);
/// assert_eq!(scripts.find(&mut gas, &"mint").unwrap(), Some(&8));
/// ```
#[derive(Clone)]
pub struct CarbonatedMap<K, V, C = BalancedTreeCostModel> {
    tree: Tree<K, V>,
    size: usize,
    costs: C,
}

impl<K, V, C> CarbonatedMap<K, V, C> {
    /// Creates an empty map priced by `costs`.
    ///
    /// No gas is charged for obtaining an empty map.
    #[must_use]
    pub const fn with_cost_model(costs: C) -> Self {
        Self {
            tree: Tree::new(),
            size: 0,
            costs,
        }
    }

    /// Returns the number of bound keys.
    ///
    /// O(1) and uncharged: the count is cached so size-dependent cost
    /// formulas never pay for a traversal.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl<K, V, C: Default> CarbonatedMap<K, V, C> {
    /// Creates an empty map with the default cost model.
    ///
    /// No gas is charged for obtaining an empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carbonated_map::map::CarbonatedMap;
    ///
    /// let map: CarbonatedMap<u64, String> = CarbonatedMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_cost_model(C::default())
    }
}

impl<K, V, C: Default> Default for CarbonatedMap<K, V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone> CarbonatedMap<K, V> {
    /// Creates a map containing a single binding, priced by the default
    /// cost model.
    ///
    /// No gas is charged: building a one-entry map performs no comparisons.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carbonated_map::map::CarbonatedMap;
    ///
    /// let map = CarbonatedMap::singleton("genesis", 0_u64);
    /// assert_eq!(map.len(), 1);
    /// ```
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        let (tree, _) = Tree::new().insert(key, value);
        Self {
            tree,
            size: 1,
            costs: BalancedTreeCostModel::default(),
        }
    }
}

impl<K, V, C> CarbonatedMap<K, V, C>
where
    K: Ord + Clone + CompareCost,
    V: Clone,
    C: CostModel + Clone,
{
    /// Looks up the value bound to `key`.
    ///
    /// Charges `find_cost(key, len)` before examining the tree; with
    /// insufficient gas the lookup fails immediately and nothing is
    /// examined. The map is never mutated.
    ///
    /// # Errors
    ///
    /// Returns [`GasExhausted`] if the meter cannot cover the lookup charge.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carbonated_map::gas::{Cost, GasBudget};
    /// use carbonated_map::map::CarbonatedMap;
    ///
    /// let mut gas = GasBudget::new(Cost::new(1_000));
    /// let map = CarbonatedMap::singleton(7_u32, "seven");
    ///
    /// assert_eq!(map.find(&mut gas, &7).unwrap(), Some(&"seven"));
    /// assert_eq!(map.find(&mut gas, &8).unwrap(), None);
    /// ```
    pub fn find<G: GasMeter>(&self, gas: &mut G, key: &K) -> Result<Option<&V>, GasExhausted> {
        gas.consume(self.costs.find_cost(key.compare_cost(), self.size))?;
        Ok(self.tree.get(key))
    }

    /// Inserts, replaces, or removes the binding for `key` through a
    /// mutator.
    ///
    /// The mutator sees the current binding (if any) and decides the new
    /// one: `Some` binds, `None` unbinds. Charging happens in this order:
    ///
    /// 1. `find_cost(key, len)` for the lookup, before anything else.
    /// 2. The mutator runs; its own gas use and failures are its business.
    ///    A mutator failure propagates as [`CarbonatedError::Caller`] and
    ///    the lookup charge is not refunded.
    /// 3. `update_cost(key, len)` for the write, unless the mutator turned
    ///    an absent binding into an absent binding, in which case nothing
    ///    more is charged and the original map is returned.
    ///
    /// # Errors
    ///
    /// [`CarbonatedError::Gas`] if either charge is refused;
    /// [`CarbonatedError::Caller`] with the mutator's error otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carbonated_map::gas::{Cost, GasBudget};
    /// use carbonated_map::map::CarbonatedMap;
    ///
    /// let mut gas = GasBudget::new(Cost::new(5_000));
    /// let map: CarbonatedMap<&str, u32> = CarbonatedMap::new();
    ///
    /// // Insert.
    /// let map = map
    ///     .update(&mut gas, "x", |_, _| Ok::<_, ()>(Some(10)))
    ///     .unwrap();
    /// assert_eq!(map.len(), 1);
    ///
    /// // Remove.
    /// let map = map.update(&mut gas, "x", |_, _| Ok::<_, ()>(None)).unwrap();
    /// assert!(map.is_empty());
    /// ```
    pub fn update<G, F, E>(
        &self,
        gas: &mut G,
        key: K,
        mutator: F,
    ) -> Result<Self, CarbonatedError<E>>
    where
        G: GasMeter,
        F: FnOnce(&mut G, Option<&V>) -> Result<Option<V>, E>,
    {
        let compare = key.compare_cost();
        gas.consume(self.costs.find_cost(compare, self.size))?;
        let previous = self.tree.get(&key);
        let had_previous = previous.is_some();
        let replacement = mutator(gas, previous).map_err(CarbonatedError::Caller)?;
        match (had_previous, replacement) {
            (false, None) => Ok(self.clone()),
            (true, None) => {
                gas.consume(self.costs.update_cost(compare, self.size))?;
                Ok(Self {
                    tree: self.tree.remove(&key),
                    size: self.size - 1,
                    costs: self.costs.clone(),
                })
            }
            (_, Some(value)) => {
                gas.consume(self.costs.update_cost(compare, self.size))?;
                let (tree, added) = self.tree.insert(key, value);
                Ok(Self {
                    tree,
                    size: if added { self.size + 1 } else { self.size },
                    costs: self.costs.clone(),
                })
            }
        }
    }

    /// Binds `key` to `value`, reconciling an existing binding through
    /// `merge_overlap`.
    ///
    /// This is the primitive under [`of_list`](Self::of_list) and
    /// [`merge`](Self::merge). It always charges `find_cost(key, len)` then
    /// `update_cost(key, len)`, whether or not the key was already bound.
    /// When it was, `merge_overlap` receives the existing value and the
    /// incoming one, in that order, and decides what to retain.
    ///
    /// # Errors
    ///
    /// [`CarbonatedError::Gas`] if a charge is refused;
    /// [`CarbonatedError::Caller`] with `merge_overlap`'s error otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carbonated_map::gas::GasBudget;
    /// use carbonated_map::map::CarbonatedMap;
    ///
    /// let mut gas = GasBudget::unlimited();
    /// let map = CarbonatedMap::singleton("hits", 2_u32);
    ///
    /// let map = map
    ///     .add(&mut gas, |_, existing, incoming| Ok::<_, ()>(existing + incoming), "hits", 3)
    ///     .unwrap();
    /// assert_eq!(map.find(&mut gas, &"hits").unwrap(), Some(&5));
    /// ```
    pub fn add<G, F, E>(
        &self,
        gas: &mut G,
        merge_overlap: F,
        key: K,
        value: V,
    ) -> Result<Self, CarbonatedError<E>>
    where
        G: GasMeter,
        F: FnOnce(&mut G, V, V) -> Result<V, E>,
    {
        let compare = key.compare_cost();
        gas.consume(self.costs.find_cost(compare, self.size))?;
        gas.consume(self.costs.update_cost(compare, self.size))?;
        let (resolved, size) = match self.tree.get(&key) {
            Some(existing) => (
                merge_overlap(gas, existing.clone(), value).map_err(CarbonatedError::Caller)?,
                self.size,
            ),
            None => (value, self.size + 1),
        };
        let (tree, _) = self.tree.insert(key, resolved);
        Ok(Self {
            tree,
            size,
            costs: self.costs.clone(),
        })
    }

    /// Materializes the bindings in ascending key order.
    ///
    /// Charges a single `fold_cost(len)` up front. The ordering is a
    /// contract, not an accident: consumers may rely on deterministic
    /// enumeration.
    ///
    /// # Errors
    ///
    /// Returns [`GasExhausted`] if the meter cannot cover the traversal
    /// charge; nothing is materialized in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carbonated_map::gas::GasBudget;
    /// use carbonated_map::map::CarbonatedMap;
    ///
    /// let mut gas = GasBudget::unlimited();
    /// let map = CarbonatedMap::<u32, &str>::of_list(
    ///     &mut gas,
    ///     |_, _, incoming| Ok::<_, ()>(incoming),
    ///     [(3, "three"), (1, "one"), (2, "two")],
    /// )
    /// .unwrap();
    ///
    /// let entries = map.to_list(&mut gas).unwrap();
    /// assert_eq!(entries, vec![(1, "one"), (2, "two"), (3, "three")]);
    /// ```
    pub fn to_list<G: GasMeter>(&self, gas: &mut G) -> Result<Vec<(K, V)>, GasExhausted> {
        gas.consume(self.costs.fold_cost(self.size))?;
        Ok(self
            .tree
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    /// Builds a map from a sequence of bindings, folding
    /// [`add`](Self::add) left to right from the empty map.
    ///
    /// Duplicate keys in the input are reconciled by `merge_overlap`, which
    /// receives the previously-folded value and the new one, in that order.
    /// On failure the gas spent up to the failing entry stays consumed and
    /// no map is produced.
    ///
    /// # Errors
    ///
    /// [`CarbonatedError::Gas`] as soon as any step exhausts the meter;
    /// [`CarbonatedError::Caller`] with `merge_overlap`'s error otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carbonated_map::gas::GasBudget;
    /// use carbonated_map::map::CarbonatedMap;
    ///
    /// let mut gas = GasBudget::unlimited();
    /// let tally = CarbonatedMap::<&str, u32>::of_list(
    ///     &mut gas,
    ///     |_, existing, incoming| Ok::<_, ()>(existing + incoming),
    ///     [("a", 1), ("b", 2), ("a", 40)],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(tally.len(), 2);
    /// assert_eq!(tally.find(&mut gas, &"a").unwrap(), Some(&41));
    /// ```
    pub fn of_list<G, I, F, E>(
        gas: &mut G,
        mut merge_overlap: F,
        entries: I,
    ) -> Result<Self, CarbonatedError<E>>
    where
        G: GasMeter,
        I: IntoIterator<Item = (K, V)>,
        F: FnMut(&mut G, V, V) -> Result<V, E>,
        C: Default,
    {
        let mut map = Self::new();
        for (key, value) in entries {
            map = map.add(gas, &mut merge_overlap, key, value)?;
        }
        Ok(map)
    }

    /// Folds every binding of `other` into `self`.
    ///
    /// Charges `fold_cost(other.len())` up front for traversing `other`,
    /// then one [`add`](Self::add) per entry. Bindings of `self` absent from
    /// `other` are retained unchanged and uncharged. Overlapping keys are
    /// reconciled by `merge_overlap`, which receives the previously-folded
    /// value and the incoming one, in that order.
    ///
    /// # Errors
    ///
    /// [`CarbonatedError::Gas`] as soon as any step exhausts the meter;
    /// [`CarbonatedError::Caller`] with `merge_overlap`'s error otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carbonated_map::gas::GasBudget;
    /// use carbonated_map::map::CarbonatedMap;
    ///
    /// let mut gas = GasBudget::unlimited();
    /// let keep = |_: &mut GasBudget, _: u32, incoming: u32| Ok::<_, ()>(incoming);
    /// let left = CarbonatedMap::<&str, u32>::of_list(&mut gas, keep, [("a", 1), ("b", 2)]).unwrap();
    /// let right = CarbonatedMap::<&str, u32>::of_list(&mut gas, keep, [("b", 3), ("c", 4)]).unwrap();
    ///
    /// let merged = left
    ///     .merge(&mut gas, |_, existing, incoming| Ok::<_, ()>(existing + incoming), &right)
    ///     .unwrap();
    /// assert_eq!(merged.to_list(&mut gas).unwrap(), vec![("a", 1), ("b", 5), ("c", 4)]);
    /// ```
    pub fn merge<G, F, E>(
        &self,
        gas: &mut G,
        mut merge_overlap: F,
        other: &Self,
    ) -> Result<Self, CarbonatedError<E>>
    where
        G: GasMeter,
        F: FnMut(&mut G, V, V) -> Result<V, E>,
    {
        gas.consume(self.costs.fold_cost(other.size))?;
        let mut merged = self.clone();
        for (key, value) in other.tree.iter() {
            merged = merged.add(gas, &mut merge_overlap, key.clone(), value.clone())?;
        }
        Ok(merged)
    }

    /// Transforms every value, producing a map with the same keys.
    ///
    /// Charges `fold_cost(len)` up front, then for each entry runs
    /// `transform` and charges `update_cost(key, len)` to bind the result.
    /// Every reinsertion is priced against the original map's size, so the
    /// total charge is predictable from the input alone. Stops at the first
    /// failure; later entries are not visited.
    ///
    /// # Errors
    ///
    /// [`CarbonatedError::Gas`] as soon as a charge is refused;
    /// [`CarbonatedError::Caller`] with `transform`'s error otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carbonated_map::gas::GasBudget;
    /// use carbonated_map::map::CarbonatedMap;
    ///
    /// let mut gas = GasBudget::unlimited();
    /// let map = CarbonatedMap::singleton(1_u32, 10_u32);
    ///
    /// let doubled = map
    ///     .map(&mut gas, |_, _, value| Ok::<_, ()>(value * 2))
    ///     .unwrap();
    /// assert_eq!(doubled.find(&mut gas, &1).unwrap(), Some(&20));
    /// ```
    pub fn map<G, W, F, E>(
        &self,
        gas: &mut G,
        mut transform: F,
    ) -> Result<CarbonatedMap<K, W, C>, CarbonatedError<E>>
    where
        G: GasMeter,
        W: Clone,
        F: FnMut(&mut G, &K, &V) -> Result<W, E>,
    {
        gas.consume(self.costs.fold_cost(self.size))?;
        let mut tree = Tree::new();
        for (key, value) in self.tree.iter() {
            let mapped = transform(gas, key, value).map_err(CarbonatedError::Caller)?;
            gas.consume(self.costs.update_cost(key.compare_cost(), self.size))?;
            tree = tree.insert(key.clone(), mapped).0;
        }
        Ok(CarbonatedMap {
            tree,
            size: self.size,
            costs: self.costs.clone(),
        })
    }

    /// Folds an accumulator over the bindings in ascending key order.
    ///
    /// Charges `fold_cost(len)` up front for the traversal itself,
    /// independent of what `folder` does; the folder's own gas use is its
    /// business. Aborts at the first failure and discards the partial
    /// accumulator.
    ///
    /// # Errors
    ///
    /// [`CarbonatedError::Gas`] if a charge is refused;
    /// [`CarbonatedError::Caller`] with `folder`'s error otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carbonated_map::gas::GasBudget;
    /// use carbonated_map::map::CarbonatedMap;
    ///
    /// let mut gas = GasBudget::unlimited();
    /// let keep = |_: &mut GasBudget, _: u32, incoming: u32| Ok::<_, ()>(incoming);
    /// let map =
    ///     CarbonatedMap::<u32, u32>::of_list(&mut gas, keep, [(1, 10), (2, 20), (3, 30)]).unwrap();
    ///
    /// let total = map
    ///     .fold(&mut gas, 0_u32, |_, sum, _, value| Ok::<_, ()>(sum + value))
    ///     .unwrap();
    /// assert_eq!(total, 60);
    /// ```
    pub fn fold<G, A, F, E>(
        &self,
        gas: &mut G,
        init: A,
        mut folder: F,
    ) -> Result<A, CarbonatedError<E>>
    where
        G: GasMeter,
        F: FnMut(&mut G, A, &K, &V) -> Result<A, E>,
    {
        gas.consume(self.costs.fold_cost(self.size))?;
        let mut accumulator = init;
        for (key, value) in self.tree.iter() {
            accumulator = folder(gas, accumulator, key, value).map_err(CarbonatedError::Caller)?;
        }
        Ok(accumulator)
    }
}

/// Two maps are equal when they hold the same bindings; cost models are not
/// compared.
impl<K: PartialEq, V: PartialEq, C> PartialEq for CarbonatedMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.tree.iter().eq(other.tree.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for CarbonatedMap<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for CarbonatedMap<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.tree.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display, C> fmt::Display for CarbonatedMap<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self.tree.iter() {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

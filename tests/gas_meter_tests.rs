//! Unit tests for the gas accounting layer: Cost arithmetic, the GasBudget
//! meter, and the balanced-tree cost model.

use carbonated_map::gas::{
    BalancedTreeCostModel, CompareCost, Cost, CostModel, GasBudget, GasMeter,
};
use rstest::rstest;

// =============================================================================
// Cost Arithmetic Tests
// =============================================================================

#[rstest]
fn cost_addition_saturates() {
    assert_eq!(Cost::new(2) + Cost::new(3), Cost::new(5));
    assert_eq!(Cost::new(u64::MAX) + Cost::new(1), Cost::new(u64::MAX));
}

#[rstest]
fn cost_multiplication_saturates() {
    assert_eq!(Cost::new(7) * 6, Cost::new(42));
    assert_eq!(Cost::new(u64::MAX) * 2, Cost::new(u64::MAX));
}

#[rstest]
fn cost_subtraction_saturates_at_zero() {
    assert_eq!(Cost::new(5).saturating_sub(Cost::new(2)), Cost::new(3));
    assert_eq!(Cost::new(2).saturating_sub(Cost::new(5)), Cost::ZERO);
}

#[rstest]
fn cost_checked_add_detects_overflow() {
    assert_eq!(
        Cost::new(1).checked_add(Cost::new(2)),
        Some(Cost::new(3))
    );
    assert_eq!(Cost::new(u64::MAX).checked_add(Cost::new(1)), None);
}

#[rstest]
fn cost_sums_over_iterators() {
    let total: Cost = [Cost::new(1), Cost::new(2), Cost::new(3)].into_iter().sum();
    assert_eq!(total, Cost::new(6));
}

// =============================================================================
// Compare Cost Tests
// =============================================================================

#[rstest]
fn scalar_keys_share_a_constant_comparison_cost() {
    assert_eq!(0_u64.compare_cost(), u64::MAX.compare_cost());
    assert_eq!(7_i32.compare_cost(), (-7_i32).compare_cost());
}

#[rstest]
fn longer_byte_keys_cost_more_to_compare() {
    let short = [0_u8; 1].as_slice().compare_cost();
    let long = [0_u8; 64].as_slice().compare_cost();
    assert!(long > short);

    assert!("contracts/alpha/storage/root".compare_cost() > "k".compare_cost());
}

#[rstest]
fn string_and_str_report_the_same_cost() {
    let owned = String::from("carbonated");
    assert_eq!(owned.compare_cost(), "carbonated".compare_cost());
}

// =============================================================================
// GasBudget Tests
// =============================================================================

#[rstest]
fn budget_tracks_consumed_and_remaining() {
    let mut gas = GasBudget::new(Cost::new(1_000));
    assert_eq!(gas.limit(), Cost::new(1_000));
    assert_eq!(gas.consumed(), Cost::ZERO);

    gas.consume(Cost::new(100)).unwrap();
    assert_eq!(gas.consumed(), Cost::new(100));
    assert_eq!(gas.remaining(), Cost::new(900));
    assert!(!gas.is_exhausted());
}

#[rstest]
fn budget_allows_spending_to_the_exact_limit() {
    let mut gas = GasBudget::new(Cost::new(100));
    gas.consume(Cost::new(100)).unwrap();
    assert_eq!(gas.remaining(), Cost::ZERO);
    assert!(gas.is_exhausted());
    assert!(gas.consume(Cost::new(1)).is_err());
}

#[rstest]
fn refused_charge_leaves_the_meter_untouched() {
    let mut gas = GasBudget::new(Cost::new(100));
    gas.consume(Cost::new(50)).unwrap();

    let error = gas.consume(Cost::new(51)).unwrap_err();
    assert_eq!(error.requested, Cost::new(51));
    assert_eq!(error.remaining, Cost::new(50));
    assert_eq!(gas.consumed(), Cost::new(50));

    // A smaller charge still fits afterwards.
    gas.consume(Cost::new(50)).unwrap();
}

#[rstest]
fn budget_refuses_charges_that_would_overflow_the_counter() {
    let mut gas = GasBudget::new(Cost::new(u64::MAX));
    gas.consume(Cost::new(u64::MAX - 1)).unwrap();
    assert!(gas.consume(Cost::new(2)).is_err());
    assert_eq!(gas.consumed(), Cost::new(u64::MAX - 1));
}

#[rstest]
fn unlimited_budget_absorbs_large_charges() {
    let mut gas = GasBudget::unlimited();
    gas.consume(Cost::new(1_000_000_000)).unwrap();
    assert_eq!(gas.consumed(), Cost::new(1_000_000_000));
}

#[rstest]
fn zero_charge_is_free() {
    let mut gas = GasBudget::new(Cost::new(10));
    gas.consume(Cost::ZERO).unwrap();
    assert_eq!(gas.consumed(), Cost::ZERO);
}

// =============================================================================
// Cost Model Tests
// =============================================================================

#[rstest]
fn find_cost_grows_with_map_size() {
    let costs = BalancedTreeCostModel::default();
    let compare = Cost::new(3);
    assert!(costs.find_cost(compare, 1) < costs.find_cost(compare, 100));
    assert!(costs.find_cost(compare, 100) < costs.find_cost(compare, 100_000));
}

#[rstest]
fn find_cost_on_the_empty_map_ignores_the_comparison_cost() {
    let costs = BalancedTreeCostModel::default();
    assert_eq!(
        costs.find_cost(Cost::new(1), 0),
        costs.find_cost(Cost::new(1_000), 0)
    );
}

#[rstest]
fn update_cost_exceeds_find_cost_for_the_same_shape() {
    let costs = BalancedTreeCostModel::default();
    let compare = Cost::new(2);
    for size in [0, 1, 8, 1_000] {
        assert!(costs.update_cost(compare, size) > costs.find_cost(compare, size));
    }
}

#[rstest]
fn expensive_keys_raise_lookup_costs() {
    let costs = BalancedTreeCostModel::default();
    assert!(costs.find_cost(Cost::new(40), 64) > costs.find_cost(Cost::new(1), 64));
}

#[rstest]
fn fold_cost_is_linear_in_the_entry_count() {
    let costs = BalancedTreeCostModel::default();
    let step = costs.fold_cost(5).saturating_sub(costs.fold_cost(4));
    assert!(step > Cost::ZERO);
    assert_eq!(
        costs.fold_cost(9).saturating_sub(costs.fold_cost(8)),
        step
    );
}

#[rstest]
fn recalibrated_models_use_their_own_constants() {
    let costs = BalancedTreeCostModel::new(
        Cost::new(1),
        Cost::new(2),
        Cost::new(3),
        Cost::new(4),
    );
    assert_eq!(costs.find_cost(Cost::ZERO, 0), Cost::new(1));
    assert_eq!(costs.update_cost(Cost::ZERO, 0), Cost::new(2));
    assert_eq!(costs.fold_cost(0), Cost::new(3));
    assert_eq!(costs.fold_cost(10), Cost::new(3 + 4 * 10));
}

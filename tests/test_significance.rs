//! Tests for the significance metrics

use quickreduct::reduct::{
    AttributeSubset, BoundaryPartition, ConditionalEntropy, DecisionPartition, DecisionTable,
    DependencyDegree, DiscernibilityDegree, HashPartitioner, Partitioner, PositiveRegion, Record,
    RefinementStable, Sig, SignificanceMetric,
};

mod common;

/// Positive region by definition: a record counts when every record sharing
/// its values on `subset` also shares its decision.
fn brute_force_positive_region(table: &DecisionTable, subset: &AttributeSubset) -> usize {
    let decision = table.schema().decision;
    let records = table.records();
    records
        .iter()
        .filter(|r| {
            records
                .iter()
                .filter(|o| r.agrees_with(o, subset))
                .all(|o| o.value(decision) == r.value(decision))
        })
        .count()
}

fn evaluate<M: SignificanceMetric>(metric: &M, records: &[Record], subset: &AttributeSubset, decision: usize) -> M::Value {
    let d = DecisionPartition::new(&HashPartitioner, records, decision);
    let p = HashPartitioner.partition(records, subset);
    metric.evaluate(&p, &d)
}

#[test]
fn test_example_positive_region() {
    let table = common::example_table();
    let all = AttributeSubset::new([0, 1, 2]);
    assert_eq!(
        evaluate(&PositiveRegion, table.records(), &all, 3),
        4,
        "Every class under all conditions maps into one decision class"
    );
    assert_eq!(
        evaluate(&PositiveRegion, table.records(), &AttributeSubset::single(0), 3),
        2,
        "Only the class of records 0 and 2 is consistent under attribute 0"
    );
}

#[test]
fn test_positive_region_matches_definition() {
    for seed in 0..6 {
        let table = common::random_table(seed, 60, 4, 3, 2);
        for subset in [
            AttributeSubset::empty(),
            AttributeSubset::single(0),
            AttributeSubset::new([1, 2]),
            AttributeSubset::new([0, 1, 3]),
            AttributeSubset::new([0, 1, 2, 3]),
        ] {
            assert_eq!(
                evaluate(&PositiveRegion, table.records(), &subset, 4),
                brute_force_positive_region(&table, &subset),
                "Positive region mismatch for seed {} subset {}",
                seed,
                subset
            );
        }
    }
}

#[test]
fn test_metrics_agree_on_consistency() {
    let table = common::dependent_table(3, 200);
    let decision = table.schema().decision;
    let determining = AttributeSubset::new([0, 2]);

    assert_eq!(
        evaluate(&PositiveRegion, table.records(), &determining, decision),
        table.len()
    );
    assert_eq!(
        evaluate(&DependencyDegree, table.records(), &determining, decision),
        1.0
    );
    assert_eq!(
        evaluate(&ConditionalEntropy, table.records(), &determining, decision),
        0.0
    );
    assert_eq!(
        evaluate(&DiscernibilityDegree, table.records(), &determining, decision),
        0
    );
}

fn assert_monotone<M: SignificanceMetric>(metric: &M) {
    for seed in 20..24 {
        let table = common::random_table(seed, 90, 5, 3, 3);
        let mut subset = AttributeSubset::empty();
        let mut previous = evaluate(metric, table.records(), &subset, 5);
        for attribute in [3, 0, 4, 1, 2] {
            subset = subset.with(attribute);
            let current = evaluate(metric, table.records(), &subset, 5);
            assert!(
                !metric.value_is_better(previous, current, 0.0),
                "{}: adding attribute {} made significance worse ({} -> {})",
                metric.name(),
                attribute,
                previous,
                current
            );
            previous = current;
        }
    }
}

#[test]
fn test_metrics_are_monotone_under_refinement() {
    assert_monotone(&PositiveRegion);
    assert_monotone(&DependencyDegree);
    assert_monotone(&ConditionalEntropy);
    assert_monotone(&DiscernibilityDegree);
}

fn assert_boundary_equivalent<M: RefinementStable>(metric: &M) {
    for seed in 30..34 {
        let table = common::random_table(seed, 100, 4, 3, 2);
        let records = table.records();
        let d = DecisionPartition::new(&HashPartitioner, records, 4);

        let start = HashPartitioner.partition(records, &AttributeSubset::single(1));
        let mut boundary = BoundaryPartition::new(start, &d);
        for attribute in [3, 0, 2] {
            boundary = boundary.refine(&HashPartitioner, attribute, &d);
            let exact = HashPartitioner.partition(records, boundary.subset());
            let pruned = metric.calculate(boundary.classes(), &d);
            let full = metric.evaluate(&exact, &d);
            assert!(
                (pruned.as_f64() - full.as_f64()).abs() < 1e-9,
                "{}: boundary value {} differs from exact value {} under {}",
                metric.name(),
                pruned,
                full,
                boundary.subset()
            );
        }
    }
}

#[test]
fn test_boundary_pruning_preserves_every_metric() {
    assert_boundary_equivalent(&PositiveRegion);
    assert_boundary_equivalent(&DependencyDegree);
    assert_boundary_equivalent(&ConditionalEntropy);
    assert_boundary_equivalent(&DiscernibilityDegree);
}

#[test]
fn test_direction_aware_comparison() {
    // Higher is better for the positive region
    assert!(PositiveRegion.value_is_better(4, 2, 0.0));
    assert!(!PositiveRegion.value_is_better(2, 4, 0.0));
    assert!(!PositiveRegion.value_is_better(4, 3, 1.0), "Within tolerance");

    // Lower is better for discernibility
    assert!(DiscernibilityDegree.value_is_better(1, 3, 0.0));
    assert!(!DiscernibilityDegree.value_is_better(3, 1, 0.0));
    assert_eq!(DiscernibilityDegree.difference(1, 3), 2.0);
}

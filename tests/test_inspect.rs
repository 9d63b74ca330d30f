//! Tests for backward redundancy inspection

use quickreduct::reduct::{
    inspect, inspect_grouped, DecisionPartition, DecisionTable, Evaluator, HashPartitioner,
    InspectOrder, PositiveRegion, Record, Reduct, ReductConfig, ReductEngine,
};

mod common;

fn duplicate_columns_table() -> DecisionTable {
    DecisionTable::from_rows(
        vec![
            vec![0, 0, 5, 0],
            vec![1, 1, 5, 1],
            vec![0, 0, 6, 0],
            vec![1, 1, 6, 1],
            vec![2, 2, 5, 0],
        ],
        3,
    )
    .unwrap()
}

fn engine(order: InspectOrder, group_size: Option<usize>) -> ReductEngine<HashPartitioner, PositiveRegion> {
    ReductEngine::new(
        HashPartitioner,
        PositiveRegion,
        ReductConfig {
            inspect_order: order,
            inspect_group_size: group_size,
            ..Default::default()
        },
    )
}

#[test]
fn test_order_decides_which_duplicate_survives() {
    let table = duplicate_columns_table();
    let candidate = Reduct::new([0, 1]);

    let reversed = engine(InspectOrder::Reversed, None)
        .refine(&table, &candidate)
        .unwrap();
    assert_eq!(
        reversed.reduct.attributes(),
        &[0],
        "Reversed order tries the last-added attribute first"
    );
    assert_eq!(reversed.removed, vec![1]);

    let as_given = engine(InspectOrder::AsGiven, None)
        .refine(&table, &candidate)
        .unwrap();
    assert_eq!(as_given.reduct.attributes(), &[1]);
    assert_eq!(as_given.removed, vec![0]);
}

#[test]
fn test_refine_keeps_candidate_significance() {
    let table = duplicate_columns_table();
    let outcome = engine(InspectOrder::Reversed, None)
        .refine(&table, &Reduct::new([2, 1, 0]))
        .unwrap();
    assert_eq!(outcome.global_significance, 5);
    assert_eq!(outcome.significance, 5);
    assert_eq!(outcome.reduct.attributes(), &[1]);
    assert_eq!(outcome.removed, vec![0, 2]);
}

#[test]
fn test_inspection_is_idempotent() {
    for seed in 0..5 {
        let table = common::random_table(seed, 90, 6, 3, 2);
        let engine = engine(InspectOrder::Reversed, None);
        let outcome = engine
            .refine(&table, &Reduct::new(table.condition_attributes()))
            .unwrap();
        let again = engine.refine(&table, &outcome.reduct).unwrap();
        assert_eq!(again.reduct, outcome.reduct, "A second pass must change nothing");
        assert!(again.removed.is_empty());
    }
}

#[test]
fn test_inspection_keeps_insertion_order() {
    let table = common::dependent_table(9, 400);
    let outcome = engine(InspectOrder::Reversed, None)
        .refine(&table, &Reduct::new([4, 2, 1, 0, 3]))
        .unwrap();
    assert_eq!(outcome.reduct.attributes(), &[2, 0]);
}

#[test]
fn test_grouped_matches_plain_result_quality() {
    for seed in 10..15 {
        let table = common::random_table(seed, 100, 8, 3, 2);
        let universe: Vec<&Record> = table.records().iter().collect();
        let decision = DecisionPartition::new(&HashPartitioner, universe.iter().copied(), 8);
        let eval = Evaluator::new(&HashPartitioner, &PositiveRegion, 0.0, &universe, &decision).unwrap();

        let candidate = Reduct::new(table.condition_attributes());
        let global = eval.significance(&candidate.to_subset());

        for group_size in [1, 2, 3, 8] {
            let grouped = inspect_grouped(&eval, &candidate, InspectOrder::Reversed, group_size);
            let subset = grouped.reduct.to_subset();
            assert_eq!(
                eval.significance(&subset),
                global,
                "Grouped inspection (size {}) must keep significance",
                group_size
            );
            for attribute in grouped.reduct.attributes() {
                assert!(
                    eval.significance(&subset.without(*attribute)) < global,
                    "Attribute {} left redundant by grouped inspection (size {})",
                    attribute,
                    group_size
                );
            }
            assert_eq!(
                grouped.reduct.len() + grouped.removed.len(),
                candidate.len(),
                "Every attribute is either kept or removed"
            );
        }

        // Groups of one test the same removals in the same order as plain inspection
        let plain = inspect(&eval, &candidate, InspectOrder::Reversed);
        let singles = inspect_grouped(&eval, &candidate, InspectOrder::Reversed, 1);
        assert_eq!(plain, singles);
    }
}

#[test]
fn test_grouped_drops_whole_redundant_group() {
    let table = common::dependent_table(5, 300);
    let universe: Vec<&Record> = table.records().iter().collect();
    let decision = DecisionPartition::new(&HashPartitioner, universe.iter().copied(), 6);
    let eval = Evaluator::new(&HashPartitioner, &PositiveRegion, 0.0, &universe, &decision).unwrap();

    // Noise attributes 1, 3 and 4 come last, so the first reversed group is all noise
    let candidate = Reduct::new([0, 2, 1, 3, 4]);
    let outcome = inspect_grouped(&eval, &candidate, InspectOrder::Reversed, 3);
    assert_eq!(outcome.removed, vec![4, 3, 1]);
    assert_eq!(outcome.reduct.attributes(), &[0, 2]);
}

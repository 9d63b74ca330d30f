//! Backward redundancy inspection
//!
//! Strips attributes from a candidate reduct while the reduct's significance
//! holds. The reference significance is fixed once, from the reduct as given.
//! The result is irreducible with respect to the processing order; other
//! orders may legitimately keep a different, equally minimal set.

use std::collections::HashSet;

use serde::Serialize;

use super::evaluator::Evaluator;
use super::partition::Partitioner;
use super::record::AttributeSubset;
use super::search::Reduct;
use super::significance::SignificanceMetric;

/// Order in which reduct attributes are considered for removal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InspectOrder {
    /// Insertion order.
    AsGiven,
    /// Reverse of insertion order: attributes added last go first.
    #[default]
    Reversed,
}

impl InspectOrder {
    pub fn arrange(&self, reduct: &Reduct) -> Vec<usize> {
        let mut order = reduct.attributes().to_vec();
        if *self == InspectOrder::Reversed {
            order.reverse();
        }
        order
    }
}

impl std::fmt::Display for InspectOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InspectOrder::AsGiven => write!(f, "as-given"),
            InspectOrder::Reversed => write!(f, "reversed"),
        }
    }
}

impl std::str::FromStr for InspectOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "as-given" | "forward" => Ok(InspectOrder::AsGiven),
            "reversed" | "reverse" => Ok(InspectOrder::Reversed),
            _ => Err(format!(
                "Unknown inspect order: '{}'. Use 'as-given' or 'reversed'.",
                s
            )),
        }
    }
}

/// Inspector result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectOutcome {
    /// Surviving attributes, in the input reduct's insertion order.
    pub reduct: Reduct,
    /// Attributes found redundant, in the order they were dropped.
    pub removed: Vec<usize>,
}

/// Inspect `reduct` one attribute at a time against its own significance.
pub fn inspect<P, M>(
    eval: &Evaluator<'_, '_, P, M>,
    reduct: &Reduct,
    order: InspectOrder,
) -> InspectOutcome
where
    P: Partitioner + Sync,
    M: SignificanceMetric + Sync,
{
    let global = eval.significance(&reduct.to_subset());
    inspect_against(eval, reduct, order, global)
}

/// Inspect `reduct` one attribute at a time against a fixed `global`.
pub fn inspect_against<P, M>(
    eval: &Evaluator<'_, '_, P, M>,
    reduct: &Reduct,
    order: InspectOrder,
    global: M::Value,
) -> InspectOutcome
where
    P: Partitioner + Sync,
    M: SignificanceMetric + Sync,
{
    let mut current = reduct.to_subset();
    let mut removed = Vec::new();

    for attribute in order.arrange(reduct) {
        let shrunk = current.without(attribute);
        if !eval.is_better(global, eval.significance(&shrunk)) {
            current = shrunk;
            removed.push(attribute);
        }
    }

    finish(reduct, removed)
}

/// Inspect `reduct` in groups of up to `group_size` attributes.
///
/// A worklist of groups replaces recursion. Each group is first tried as a
/// whole; a group that cannot be dropped is split in halves which go back on
/// the worklist, and single attributes are tested on their own. Attributes
/// already found redundant are carried in an explicit set and excluded from
/// every later test.
pub fn inspect_grouped<P, M>(
    eval: &Evaluator<'_, '_, P, M>,
    reduct: &Reduct,
    order: InspectOrder,
    group_size: usize,
) -> InspectOutcome
where
    P: Partitioner + Sync,
    M: SignificanceMetric + Sync,
{
    let all = reduct.to_subset();
    let global = eval.significance(&all);
    let arranged = order.arrange(reduct);

    // Stack of groups; the first group in processing order is on top
    let mut worklist: Vec<Vec<usize>> = arranged
        .chunks(group_size.max(1))
        .rev()
        .map(<[usize]>::to_vec)
        .collect();

    let mut redundant: HashSet<usize> = HashSet::new();
    let mut removed = Vec::new();

    while let Some(group) = worklist.pop() {
        let gone = AttributeSubset::new(redundant.iter().copied().chain(group.iter().copied()));
        let shrunk = all.difference(&gone);

        if !eval.is_better(global, eval.significance(&shrunk)) {
            for &attribute in &group {
                redundant.insert(attribute);
                removed.push(attribute);
            }
        } else if group.len() > 1 {
            let (head, tail) = group.split_at(group.len() / 2);
            worklist.push(tail.to_vec());
            worklist.push(head.to_vec());
        }
    }

    finish(reduct, removed)
}

fn finish(reduct: &Reduct, removed: Vec<usize>) -> InspectOutcome {
    let kept = Reduct::new(
        reduct
            .attributes()
            .iter()
            .copied()
            .filter(|a| !removed.contains(a)),
    );
    InspectOutcome {
        reduct: kept,
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrange_orders() {
        let r = Reduct::new([4, 1, 7]);
        assert_eq!(InspectOrder::AsGiven.arrange(&r), vec![4, 1, 7]);
        assert_eq!(InspectOrder::Reversed.arrange(&r), vec![7, 1, 4]);
    }

    #[test]
    fn test_inspect_order_from_str() {
        assert_eq!(
            "as-given".parse::<InspectOrder>().unwrap(),
            InspectOrder::AsGiven
        );
        assert_eq!(
            "REVERSED".parse::<InspectOrder>().unwrap(),
            InspectOrder::Reversed
        );
        assert!("random".parse::<InspectOrder>().is_err());
    }
}

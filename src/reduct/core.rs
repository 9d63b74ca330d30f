//! Core attribute detection
//!
//! An attribute is core when dropping it from the full attribute set makes
//! significance strictly worse than the global significance, beyond the
//! tolerance. Core attributes belong to every reduct.

use super::evaluator::Evaluator;
use super::partition::Partitioner;
use super::record::AttributeSubset;
use super::significance::SignificanceMetric;

/// Find the core of `attributes`, returned in the caller's order.
///
/// `global` is the significance of the full attribute set.
pub fn find_core<P, M>(
    eval: &Evaluator<'_, '_, P, M>,
    global: M::Value,
    attributes: &[usize],
) -> Vec<usize>
where
    P: Partitioner + Sync,
    M: SignificanceMetric + Sync,
{
    let removal_sets = removal_sets(attributes);
    let scores = eval.score_all(&removal_sets, |(_, subset)| eval.significance(subset));

    let core: AttributeSubset = removal_sets
        .iter()
        .zip(scores)
        .filter(|(_, sig)| eval.is_better(global, *sig))
        .map(|((removed, _), _)| *removed)
        .collect();

    attributes
        .iter()
        .copied()
        .filter(|&a| core.contains(a))
        .collect()
}

/// Each attribute paired with the full set minus that attribute.
///
/// Walks the sorted attribute list once: the set missing `sorted[i]` differs
/// from the set missing `sorted[i - 1]` in exactly one slot, so each step
/// overwrites that slot instead of rebuilding the set.
fn removal_sets(attributes: &[usize]) -> Vec<(usize, AttributeSubset)> {
    let full = AttributeSubset::new(attributes.iter().copied());
    let sorted = full.as_slice();
    let Some((&first, rest)) = sorted.split_first() else {
        return Vec::new();
    };

    let mut current = AttributeSubset::new(rest.iter().copied());
    let mut sets = Vec::with_capacity(sorted.len());
    sets.push((first, current.clone()));
    for i in 1..sorted.len() {
        current.replace_at(i - 1, sorted[i - 1]);
        sets.push((sorted[i], current.clone()));
    }
    sets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_sets_drop_one_each() {
        let sets = removal_sets(&[3, 0, 2, 1]);
        let expected: Vec<(usize, Vec<usize>)> = vec![
            (0, vec![1, 2, 3]),
            (1, vec![0, 2, 3]),
            (2, vec![0, 1, 3]),
            (3, vec![0, 1, 2]),
        ];
        let actual: Vec<(usize, Vec<usize>)> = sets
            .into_iter()
            .map(|(a, s)| (a, s.as_slice().to_vec()))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_removal_sets_single_attribute() {
        let sets = removal_sets(&[5]);
        assert_eq!(sets.len(), 1);
        assert!(sets[0].1.is_empty());
    }

    #[test]
    fn test_removal_sets_empty() {
        assert!(removal_sets(&[]).is_empty());
    }
}

//! Concrete significance metrics
//!
//! All four metrics are decided class by class: a class contributes according
//! to how its members spread over the decision classes. A decision-consistent
//! class contributes the same whether or not it is split further, which is
//! what makes every metric here [`RefinementStable`].

use std::collections::HashMap;

use super::partition::{DecisionPartition, EquivalenceClass};
use super::significance::{Direction, RefinementStable, SignificanceMetric};

/// Sizes of the intersections of `class` with each decision class.
fn decision_spread(class: &EquivalenceClass<'_>, decision: &DecisionPartition<'_>) -> Vec<usize> {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    let mut foreign = 0;
    for record in class.members() {
        match decision.label(record) {
            Some(label) => *counts.entry(label).or_insert(0) += 1,
            None => foreign += 1,
        }
    }
    // A record with no known decision is discernible from every other one
    let mut spread: Vec<usize> = counts
        .into_values()
        .chain(std::iter::repeat(1).take(foreign))
        .collect();
    spread.sort_unstable();
    spread
}

/// Entropy differences below this are summation noise.
const ENTROPY_EPSILON: f64 = 1e-12;

/// Size of the positive region: records whose class lies inside one decision class.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositiveRegion;

impl PositiveRegion {
    fn count<'c, 'a: 'c, I>(classes: I, decision: &DecisionPartition<'_>) -> usize
    where
        I: IntoIterator<Item = &'c EquivalenceClass<'a>>,
    {
        classes
            .into_iter()
            .filter(|class| decision.is_consistent(class.members()))
            .map(EquivalenceClass::len)
            .sum()
    }
}

impl SignificanceMetric for PositiveRegion {
    type Value = usize;

    fn name(&self) -> &'static str {
        "positive-region"
    }

    fn direction(&self) -> Direction {
        Direction::HigherIsBetter
    }

    fn calculate<'c, 'a: 'c, I>(&self, classes: I, decision: &DecisionPartition<'_>) -> usize
    where
        I: IntoIterator<Item = &'c EquivalenceClass<'a>>,
    {
        Self::count(classes, decision)
    }
}

impl RefinementStable for PositiveRegion {}

/// Dependency degree γ(B, D) = |POS_B(D)| / |U|.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyDegree;

impl SignificanceMetric for DependencyDegree {
    type Value = f64;

    fn name(&self) -> &'static str {
        "dependency"
    }

    fn direction(&self) -> Direction {
        Direction::HigherIsBetter
    }

    fn calculate<'c, 'a: 'c, I>(&self, classes: I, decision: &DecisionPartition<'_>) -> f64
    where
        I: IntoIterator<Item = &'c EquivalenceClass<'a>>,
    {
        if decision.is_empty() {
            return 0.0;
        }
        PositiveRegion::count(classes, decision) as f64 / decision.len() as f64
    }
}

impl RefinementStable for DependencyDegree {}

/// Shannon conditional entropy H(D | B) in bits. Zero means B determines D.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalEntropy;

impl SignificanceMetric for ConditionalEntropy {
    type Value = f64;

    fn name(&self) -> &'static str {
        "entropy"
    }

    fn direction(&self) -> Direction {
        Direction::LowerIsBetter
    }

    fn calculate<'c, 'a: 'c, I>(&self, classes: I, decision: &DecisionPartition<'_>) -> f64
    where
        I: IntoIterator<Item = &'c EquivalenceClass<'a>>,
    {
        if decision.is_empty() {
            return 0.0;
        }
        let universe = decision.len() as f64;

        let mut entropy = 0.0;
        for class in classes {
            let spread = decision_spread(class, decision);
            if spread.len() < 2 {
                continue;
            }
            let size = class.len() as f64;
            let inner: f64 = spread
                .iter()
                .map(|&n| {
                    let p = n as f64 / size;
                    -p * p.log2()
                })
                .sum();
            entropy += size / universe * inner;
        }
        entropy
    }

    fn difference(&self, a: f64, b: f64) -> f64 {
        let d = b - a;
        if d.abs() < ENTROPY_EPSILON {
            0.0
        } else {
            d
        }
    }
}

impl RefinementStable for ConditionalEntropy {}

/// Number of record pairs indiscernible under B yet labeled differently.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscernibilityDegree;

impl SignificanceMetric for DiscernibilityDegree {
    type Value = usize;

    fn name(&self) -> &'static str {
        "discernibility"
    }

    fn direction(&self) -> Direction {
        Direction::LowerIsBetter
    }

    fn calculate<'c, 'a: 'c, I>(&self, classes: I, decision: &DecisionPartition<'_>) -> usize
    where
        I: IntoIterator<Item = &'c EquivalenceClass<'a>>,
    {
        classes
            .into_iter()
            .map(|class| {
                let spread = decision_spread(class, decision);
                let same: usize = spread.iter().map(|n| n * n).sum();
                (class.len() * class.len() - same) / 2
            })
            .sum()
    }
}

impl RefinementStable for DiscernibilityDegree {}

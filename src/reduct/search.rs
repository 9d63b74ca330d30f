//! Greedy forward search (Quick-Reduct)
//!
//! Starting from a seed reduct (usually the core), each round adds the
//! attribute whose addition gains the most significance, until the reduct
//! reaches the global significance within tolerance. Ties go to the attribute
//! that comes first in the caller's scan order.

use serde::Serialize;

use super::error::{EngineResult, ReductError};
use super::evaluator::Evaluator;
use super::partition::{BoundaryPartition, Partitioner};
use super::record::AttributeSubset;
use super::significance::{RefinementStable, Sig, SignificanceMetric};

/// Attribute set kept in insertion order.
///
/// Insertion order matters: backward inspection commonly walks it in reverse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reduct {
    attributes: Vec<usize>,
}

impl Reduct {
    /// Build from attributes in insertion order; repeats keep their first slot.
    pub fn new<I: IntoIterator<Item = usize>>(attributes: I) -> Self {
        let mut reduct = Self::default();
        for a in attributes {
            reduct.push(a);
        }
        reduct
    }

    pub fn attributes(&self) -> &[usize] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn contains(&self, attribute: usize) -> bool {
        self.attributes.contains(&attribute)
    }

    pub fn push(&mut self, attribute: usize) {
        if !self.contains(attribute) {
            self.attributes.push(attribute);
        }
    }

    pub fn remove(&mut self, attribute: usize) {
        self.attributes.retain(|&a| a != attribute);
    }

    pub fn to_subset(&self) -> AttributeSubset {
        AttributeSubset::new(self.attributes.iter().copied())
    }

    /// Attributes in ascending order.
    pub fn sorted(&self) -> Vec<usize> {
        self.to_subset().as_slice().to_vec()
    }
}

/// One round of forward search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRound<V> {
    pub attribute: usize,
    pub significance: V,
    /// Improvement over the previous round's significance.
    pub gain: f64,
}

/// Converged reduct with the significance trace that led to it.
#[derive(Debug, Clone)]
pub struct SearchOutcome<V> {
    pub reduct: Reduct,
    pub significance: V,
    pub rounds: Vec<SearchRound<V>>,
}

/// Run Quick-Reduct over `attributes`, repartitioning the universe per candidate.
///
/// Fails with [`ReductError::SearchExhausted`] when every attribute is in the
/// reduct but the global significance is still out of reach.
pub fn forward_search<P, M>(
    eval: &Evaluator<'_, '_, P, M>,
    attributes: &[usize],
    initial: Reduct,
    global: M::Value,
) -> EngineResult<SearchOutcome<M::Value>>
where
    P: Partitioner + Sync,
    M: SignificanceMetric + Sync,
{
    let mut reduct = initial;
    let mut subset = reduct.to_subset();
    let mut significance = eval.significance(&subset);
    let mut rounds = Vec::new();

    while eval.is_better(global, significance) {
        let candidates = remaining(attributes, &subset);
        let scores = eval.score_all(&candidates, |&a| eval.significance(&subset.with(a)));

        let (attribute, value, gain) = pick_best(eval, &candidates, scores, significance)
            .ok_or_else(|| exhausted(&reduct, significance, global))?;

        reduct.push(attribute);
        subset = subset.with(attribute);
        significance = value;
        rounds.push(SearchRound {
            attribute,
            significance,
            gain,
        });
    }

    Ok(SearchOutcome {
        reduct,
        significance,
        rounds,
    })
}

/// Quick-Reduct that only refines the boundary region.
///
/// `start` must be the partition of the universe under `initial`. Classes that
/// become decision-consistent are set aside and never split again, so later
/// rounds only pay for the shrinking boundary. Returns the refined partition
/// alongside the outcome.
pub fn boundary_search<'a, P, M>(
    eval: &Evaluator<'_, 'a, P, M>,
    attributes: &[usize],
    initial: Reduct,
    start: BoundaryPartition<'a>,
    global: M::Value,
) -> EngineResult<(SearchOutcome<M::Value>, BoundaryPartition<'a>)>
where
    P: Partitioner + Sync,
    M: RefinementStable + Sync,
{
    debug_assert_eq!(start.subset(), &initial.to_subset());

    let metric = eval.metric();
    let decision = eval.decision();
    let mut reduct = initial;
    let mut boundary = start;
    let mut significance = metric.calculate(boundary.classes(), decision);
    let mut rounds = Vec::new();

    while eval.is_better(global, significance) {
        let candidates = remaining(attributes, boundary.subset());
        let scores = eval.score_all(&candidates, |&a| {
            let split = boundary.split_boundary(eval.partitioner(), a);
            metric.calculate(boundary.resolved().iter().chain(split.iter()), decision)
        });

        let (attribute, value, gain) = pick_best(eval, &candidates, scores, significance)
            .ok_or_else(|| exhausted(&reduct, significance, global))?;

        reduct.push(attribute);
        boundary = boundary.refine(eval.partitioner(), attribute, decision);
        significance = value;
        rounds.push(SearchRound {
            attribute,
            significance,
            gain,
        });
    }

    Ok((
        SearchOutcome {
            reduct,
            significance,
            rounds,
        },
        boundary,
    ))
}

fn remaining(attributes: &[usize], subset: &AttributeSubset) -> Vec<usize> {
    attributes
        .iter()
        .copied()
        .filter(|&a| !subset.contains(a))
        .collect()
}

/// Leftmost candidate with the largest gain over `current`.
fn pick_best<P, M>(
    eval: &Evaluator<'_, '_, P, M>,
    candidates: &[usize],
    scores: Vec<M::Value>,
    current: M::Value,
) -> Option<(usize, M::Value, f64)>
where
    P: Partitioner + Sync,
    M: SignificanceMetric + Sync,
{
    let mut best: Option<(usize, M::Value, f64)> = None;
    for (&attribute, value) in candidates.iter().zip(scores) {
        let gain = eval.gain(value, current);
        if best.map_or(true, |(_, _, best_gain)| gain > best_gain) {
            best = Some((attribute, value, gain));
        }
    }
    best
}

fn exhausted<V: Sig>(reduct: &Reduct, significance: V, global: V) -> ReductError {
    ReductError::SearchExhausted {
        reduct: reduct.attributes().to_vec(),
        significance: significance.as_f64(),
        global: global.as_f64(),
    }
}

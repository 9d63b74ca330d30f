//! Shared evaluation context for core finding, search and inspection
//!
//! Bundles the immutable collaborators of one computation: the partitioning
//! strategy, the metric, the tolerance, the record universe and its decision
//! partition. Every step receives it explicitly.

use rayon::prelude::*;

use super::error::{EngineResult, ReductError};
use super::partition::{DecisionPartition, Partition, Partitioner};
use super::record::{AttributeSubset, Record};
use super::significance::SignificanceMetric;

pub struct Evaluator<'e, 'a, P, M> {
    partitioner: &'e P,
    metric: &'e M,
    deviation: f64,
    universe: &'e [&'a Record],
    decision: &'e DecisionPartition<'a>,
    parallel: bool,
}

impl<'e, 'a, P, M> Evaluator<'e, 'a, P, M>
where
    P: Partitioner + Sync,
    M: SignificanceMetric + Sync,
{
    pub fn new(
        partitioner: &'e P,
        metric: &'e M,
        deviation: f64,
        universe: &'e [&'a Record],
        decision: &'e DecisionPartition<'a>,
    ) -> EngineResult<Self> {
        if !deviation.is_finite() || deviation < 0.0 {
            return Err(ReductError::InvalidDeviation { deviation });
        }
        Ok(Self {
            partitioner,
            metric,
            deviation,
            universe,
            decision,
            parallel: false,
        })
    }

    /// Evaluate candidate attributes on the rayon pool.
    ///
    /// Results are collected in candidate order, so tie-breaks are unchanged.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn partitioner(&self) -> &'e P {
        self.partitioner
    }

    pub fn metric(&self) -> &'e M {
        self.metric
    }

    pub fn deviation(&self) -> f64 {
        self.deviation
    }

    pub fn universe(&self) -> &'e [&'a Record] {
        self.universe
    }

    pub fn decision(&self) -> &'e DecisionPartition<'a> {
        self.decision
    }

    pub fn partition(&self, subset: &AttributeSubset) -> Partition<'a> {
        self.partitioner
            .partition(self.universe.iter().copied(), subset)
    }

    pub fn significance(&self, subset: &AttributeSubset) -> M::Value {
        self.metric.evaluate(&self.partition(subset), self.decision)
    }

    /// `a` beats `b` beyond the tolerance.
    pub fn is_better(&self, a: M::Value, b: M::Value) -> bool {
        self.metric.value_is_better(a, b, self.deviation)
    }

    pub fn gain(&self, a: M::Value, b: M::Value) -> f64 {
        self.metric.difference(a, b)
    }

    /// Score every item, keeping input order.
    pub fn score_all<T, F>(&self, items: &[T], score: F) -> Vec<M::Value>
    where
        T: Sync,
        F: Fn(&T) -> M::Value + Sync,
    {
        if self.parallel {
            items.par_iter().map(&score).collect()
        } else {
            items.iter().map(score).collect()
        }
    }
}

//! Reduct engine: composes partitioning, metric, search and inspection
//!
//! One generic engine covers every variant: the partitioning strategy and the
//! significance metric are type parameters, and streaming updates are
//! available whenever the metric tolerates boundary pruning.

use std::mem;

use serde::Serialize;

use super::core::find_core;
use super::error::EngineResult;
use super::evaluator::Evaluator;
use super::incremental::merge;
use super::inspect::{inspect, inspect_grouped, InspectOrder, InspectOutcome};
use super::partition::{BoundaryPartition, DecisionPartition, Partition, Partitioner};
use super::record::{check_batch, AttributeSubset, DecisionTable, Record, Schema};
use super::search::{boundary_search, forward_search, Reduct, SearchOutcome, SearchRound};
use super::significance::{RefinementStable, SignificanceMetric};

/// Engine settings
#[derive(Debug, Clone, Serialize)]
pub struct ReductConfig {
    /// Tolerance below which two significance values count as equal
    pub deviation: f64,
    /// Processing order for backward inspection
    pub inspect_order: InspectOrder,
    /// Start forward search from the core instead of the empty set
    pub seed_with_core: bool,
    /// Evaluate candidate attributes on the rayon pool
    pub parallel: bool,
    /// Inspect in groups of this size instead of one attribute at a time
    pub inspect_group_size: Option<usize>,
}

impl Default for ReductConfig {
    fn default() -> Self {
        Self {
            deviation: 0.0,
            inspect_order: InspectOrder::Reversed,
            seed_with_core: true,
            parallel: false,
            inspect_group_size: None,
        }
    }
}

/// Final reduct with everything that led to it.
#[derive(Debug, Clone)]
pub struct ReductOutcome<V> {
    pub reduct: Reduct,
    pub core: Vec<usize>,
    pub significance: V,
    pub global_significance: V,
    pub rounds: Vec<SearchRound<V>>,
    /// Attributes dropped by backward inspection.
    pub removed: Vec<usize>,
}

/// What a streaming update did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No mixed classes and the reduct still matches the global significance.
    FastExit,
    /// Search and inspection ran; lists the reduct changes.
    Searched {
        added: Vec<usize>,
        removed: Vec<usize>,
    },
}

/// Report for one streamed batch.
#[derive(Debug, Clone)]
pub struct StreamUpdate<V> {
    pub outcome: UpdateOutcome,
    /// Mixed classes in the reduct-induced merge.
    pub reduct_mixed: usize,
    /// Mixed classes in the decision-induced merge.
    pub decision_mixed: usize,
    pub significance: V,
    pub global_significance: V,
    pub rounds: Vec<SearchRound<V>>,
}

/// Partitions and reduct retained between streamed batches.
#[derive(Debug, Clone)]
pub struct StreamState<'a, V> {
    schema: Schema,
    attributes: Vec<usize>,
    universe: Vec<&'a Record>,
    decision: DecisionPartition<'a>,
    full_partition: Partition<'a>,
    reduct_partition: Partition<'a>,
    reduct: Reduct,
    significance: V,
    global_significance: V,
}

impl<'a, V: Copy> StreamState<'a, V> {
    pub fn reduct(&self) -> &Reduct {
        &self.reduct
    }

    pub fn significance(&self) -> V {
        self.significance
    }

    pub fn global_significance(&self) -> V {
        self.global_significance
    }

    pub fn record_count(&self) -> usize {
        self.universe.len()
    }

    pub fn reduct_partition(&self) -> &Partition<'a> {
        &self.reduct_partition
    }

    pub fn decision(&self) -> &DecisionPartition<'a> {
        &self.decision
    }
}

pub struct ReductEngine<P, M> {
    partitioner: P,
    metric: M,
    config: ReductConfig,
}

impl<P, M> ReductEngine<P, M>
where
    P: Partitioner + Sync,
    M: SignificanceMetric + Sync,
{
    pub fn new(partitioner: P, metric: M, config: ReductConfig) -> Self {
        Self {
            partitioner,
            metric,
            config,
        }
    }

    pub fn config(&self) -> &ReductConfig {
        &self.config
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub fn partitioner(&self) -> &P {
        &self.partitioner
    }

    /// Reduce over all condition attributes in index order.
    pub fn reduce(&self, table: &DecisionTable) -> EngineResult<ReductOutcome<M::Value>> {
        self.reduce_with(table, &table.condition_attributes())
    }

    /// Reduce over `attributes`, scanned in the given order.
    pub fn reduce_with(
        &self,
        table: &DecisionTable,
        attributes: &[usize],
    ) -> EngineResult<ReductOutcome<M::Value>> {
        let schema = table.schema();
        schema.check_attributes(attributes)?;

        let universe: Vec<&Record> = table.records().iter().collect();
        let decision = DecisionPartition::new(&self.partitioner, universe.iter().copied(), schema.decision);
        let eval = self.evaluator(&universe, &decision)?;

        let global = eval.significance(&AttributeSubset::new(attributes.iter().copied()));
        self.search_and_inspect(&eval, attributes, global)
    }

    /// Run only the inspector over `candidate`.
    ///
    /// Lets an outer optimizer polish a candidate reduct it found by other
    /// means. The reference significance is the candidate's own.
    pub fn refine(
        &self,
        table: &DecisionTable,
        candidate: &Reduct,
    ) -> EngineResult<ReductOutcome<M::Value>> {
        let schema = table.schema();
        schema.check_attributes(candidate.attributes())?;

        let universe: Vec<&Record> = table.records().iter().collect();
        let decision = DecisionPartition::new(&self.partitioner, universe.iter().copied(), schema.decision);
        let eval = self.evaluator(&universe, &decision)?;

        let global = eval.significance(&candidate.to_subset());
        let inspected = self.inspect_reduct(&eval, candidate);
        let significance = eval.significance(&inspected.reduct.to_subset());

        Ok(ReductOutcome {
            reduct: inspected.reduct,
            core: Vec::new(),
            significance,
            global_significance: global,
            rounds: Vec::new(),
            removed: inspected.removed,
        })
    }

    fn evaluator<'e, 'a>(
        &'e self,
        universe: &'e [&'a Record],
        decision: &'e DecisionPartition<'a>,
    ) -> EngineResult<Evaluator<'e, 'a, P, M>> {
        Evaluator::new(
            &self.partitioner,
            &self.metric,
            self.config.deviation,
            universe,
            decision,
        )
        .map(|eval| eval.with_parallel(self.config.parallel))
    }

    fn search_and_inspect(
        &self,
        eval: &Evaluator<'_, '_, P, M>,
        attributes: &[usize],
        global: M::Value,
    ) -> EngineResult<ReductOutcome<M::Value>> {
        let core = if self.config.seed_with_core {
            find_core(eval, global, attributes)
        } else {
            Vec::new()
        };

        let search = forward_search(eval, attributes, Reduct::new(core.iter().copied()), global)?;
        let inspected = self.inspect_reduct(eval, &search.reduct);
        let significance = if inspected.removed.is_empty() {
            search.significance
        } else {
            eval.significance(&inspected.reduct.to_subset())
        };

        Ok(ReductOutcome {
            reduct: inspected.reduct,
            core,
            significance,
            global_significance: global,
            rounds: search.rounds,
            removed: inspected.removed,
        })
    }

    fn inspect_reduct(&self, eval: &Evaluator<'_, '_, P, M>, reduct: &Reduct) -> InspectOutcome {
        match self.config.inspect_group_size {
            Some(size) => inspect_grouped(eval, reduct, self.config.inspect_order, size),
            None => inspect(eval, reduct, self.config.inspect_order),
        }
    }
}

impl<P, M> ReductEngine<P, M>
where
    P: Partitioner + Sync,
    M: RefinementStable + Sync,
{
    /// Reduce the first batch and retain its partitions for later updates.
    pub fn begin_stream<'a>(
        &self,
        table: &'a DecisionTable,
    ) -> EngineResult<(StreamState<'a, M::Value>, ReductOutcome<M::Value>)> {
        self.begin_stream_with(table, &table.condition_attributes())
    }

    pub fn begin_stream_with<'a>(
        &self,
        table: &'a DecisionTable,
        attributes: &[usize],
    ) -> EngineResult<(StreamState<'a, M::Value>, ReductOutcome<M::Value>)> {
        self.start_stream(table.schema(), table.records(), attributes)
    }

    /// Start a stream from a borrowed slice of records.
    ///
    /// The records are checked the same way [`DecisionTable::new`] checks
    /// them, so a table can be streamed without copying its first batch.
    pub fn begin_stream_records<'a>(
        &self,
        schema: Schema,
        records: &'a [Record],
    ) -> EngineResult<(StreamState<'a, M::Value>, ReductOutcome<M::Value>)> {
        check_batch(&schema, records, |_| false)?;
        self.start_stream(schema, records, &schema.condition_attributes())
    }

    fn start_stream<'a>(
        &self,
        schema: Schema,
        records: &'a [Record],
        attributes: &[usize],
    ) -> EngineResult<(StreamState<'a, M::Value>, ReductOutcome<M::Value>)> {
        schema.check_attributes(attributes)?;

        let universe: Vec<&'a Record> = records.iter().collect();
        let decision = DecisionPartition::new(&self.partitioner, universe.iter().copied(), schema.decision);

        let (full_partition, reduct_partition, outcome) = {
            let eval = self.evaluator(&universe, &decision)?;
            let full_partition = eval.partition(&AttributeSubset::new(attributes.iter().copied()));
            let global = self.metric.evaluate(&full_partition, &decision);
            let outcome = self.search_and_inspect(&eval, attributes, global)?;
            let reduct_partition = eval.partition(&outcome.reduct.to_subset());
            (full_partition, reduct_partition, outcome)
        };

        let state = StreamState {
            schema,
            attributes: attributes.to_vec(),
            universe,
            decision,
            full_partition,
            reduct_partition,
            reduct: outcome.reduct.clone(),
            significance: outcome.significance,
            global_significance: outcome.global_significance,
        };
        Ok((state, outcome))
    }

    /// Fold `batch` into the retained state.
    ///
    /// Only the batch is partitioned; its classes are merged with the retained
    /// ones. When neither the reduct-induced nor the decision-induced merge
    /// produced a mixed class and the reduct still reaches the global
    /// significance, the reduct is kept as is. Otherwise forward search resumes
    /// from the previous reduct over the boundary region only, and the result
    /// is inspected again over the whole universe.
    ///
    /// On error `state` is left as it was before the call, so a rejected batch
    /// can be skipped and the stream continued.
    pub fn update_stream<'a>(
        &self,
        state: &mut StreamState<'a, M::Value>,
        batch: &'a [Record],
    ) -> EngineResult<StreamUpdate<M::Value>> {
        check_batch(&state.schema, batch, |id| state.decision.contains(id))?;

        let known = state.universe.len();
        let result = self.fold_batch(state, batch);
        if result.is_err() {
            self.rewind(state, known);
        }
        result
    }

    fn fold_batch<'a>(
        &self,
        state: &mut StreamState<'a, M::Value>,
        batch: &'a [Record],
    ) -> EngineResult<StreamUpdate<M::Value>> {
        let p = &self.partitioner;
        let full_subset = state.full_partition.subset().clone();
        let reduct_subset = state.reduct_partition.subset().clone();
        let merged_full = merge(
            mem::take(&mut state.full_partition),
            p.partition(batch, &full_subset),
        )?;
        let merged_reduct = merge(
            mem::take(&mut state.reduct_partition),
            p.partition(batch, &reduct_subset),
        )?;
        let merged_decision = merge(
            mem::take(&mut state.decision).into_partition(),
            p.partition(batch, &state.schema.decision_subset()),
        )?;

        let reduct_mixed = merged_reduct.mixed_count();
        let decision_mixed = merged_decision.mixed_count();

        state.universe.extend(batch.iter());
        state.decision = DecisionPartition::from_partition(merged_decision.into_partition());
        state.full_partition = merged_full.into_partition();
        let reduct_partition = merged_reduct.into_partition();

        let global = self.metric.evaluate(&state.full_partition, &state.decision);
        let current = self.metric.evaluate(&reduct_partition, &state.decision);
        let sufficient = !self
            .metric
            .value_is_better(global, current, self.config.deviation);

        if sufficient && reduct_mixed == 0 && decision_mixed == 0 {
            state.reduct_partition = reduct_partition;
            state.significance = current;
            state.global_significance = global;
            return Ok(StreamUpdate {
                outcome: UpdateOutcome::FastExit,
                reduct_mixed,
                decision_mixed,
                significance: current,
                global_significance: global,
                rounds: Vec::new(),
            });
        }

        let (next, significance, rounds, reduct_partition) = {
            let eval = self.evaluator(&state.universe, &state.decision)?;
            let reduct = &state.reduct;

            // The merged partition stays exact only while the reduct is unchanged
            let (search, retained) = if sufficient {
                let search = SearchOutcome {
                    reduct: reduct.clone(),
                    significance: current,
                    rounds: Vec::new(),
                };
                (search, Some(reduct_partition))
            } else {
                let start = BoundaryPartition::new(reduct_partition, &state.decision);
                let (search, _) =
                    boundary_search(&eval, &state.attributes, reduct.clone(), start, global)?;
                (search, None)
            };

            let next = self.inspect_reduct(&eval, &search.reduct).reduct;
            let (significance, partition) = match retained {
                Some(partition) if next == *reduct => (search.significance, partition),
                _ => {
                    let partition = eval.partition(&next.to_subset());
                    (self.metric.evaluate(&partition, &state.decision), partition)
                }
            };
            (next, significance, search.rounds, partition)
        };

        let added: Vec<usize> = next
            .attributes()
            .iter()
            .copied()
            .filter(|&a| !state.reduct.contains(a))
            .collect();
        let removed: Vec<usize> = state
            .reduct
            .attributes()
            .iter()
            .copied()
            .filter(|&a| !next.contains(a))
            .collect();

        state.reduct_partition = reduct_partition;
        state.reduct = next;
        state.significance = significance;
        state.global_significance = global;

        Ok(StreamUpdate {
            outcome: UpdateOutcome::Searched { added, removed },
            reduct_mixed,
            decision_mixed,
            significance,
            global_significance: global,
            rounds,
        })
    }

    /// Cut the universe back to its first `known` records and repartition it.
    ///
    /// Both partitioners emit classes in first-seen order, so this rebuilds the
    /// same partitions the state held before the failed update.
    fn rewind<'a>(&self, state: &mut StreamState<'a, M::Value>, known: usize) {
        let p = &self.partitioner;
        state.universe.truncate(known);
        state.decision =
            DecisionPartition::new(p, state.universe.iter().copied(), state.schema.decision);
        state.full_partition = p.partition(
            state.universe.iter().copied(),
            &AttributeSubset::new(state.attributes.iter().copied()),
        );
        state.reduct_partition = p.partition(state.universe.iter().copied(), &state.reduct.to_subset());
    }
}

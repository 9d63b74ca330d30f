//! Quickreduct: Rough-Set Attribute Reduction CLI Tool
//!
//! Loads a decision table, finds a reduct with greedy forward search and
//! backward inspection, and optionally folds the table in batch by batch.

use std::collections::HashSet;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use quickreduct::cli::Cli;
use quickreduct::reduct::{
    load_decision_table, ConditionalEntropy, DependencyDegree, DiscernibilityDegree,
    HashPartitioner, LoadedTable, MetricKind, PartitionStrategy, Partitioner, PositiveRegion,
    ReductEngine, RefinementStable, SequentialPartitioner, Sig, UpdateOutcome,
};
use quickreduct::report::{export_reduct_report, ReductReportBuilder, ReductSummary, ReportBuilderParams};
use quickreduct::utils::{
    create_batch_bar, create_spinner, finish_with_failure, finish_with_success, print_banner,
    print_completion, print_config, print_count, print_info, print_step_header, print_step_time,
    print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.reduct_config();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        &cli.input,
        &cli.target,
        &cli.metric.to_string(),
        &cli.partitioner.to_string(),
        cli.batches,
        &config,
    );

    // Step 1: Load the decision table
    print_step_header(1, "Load Decision Table");
    let step_start = Instant::now();
    let spinner = create_spinner("Loading dataset...");
    let loaded = match load_decision_table(
        &cli.input,
        &cli.target,
        &cli.drop_columns,
        cli.infer_schema_length,
    ) {
        Ok(loaded) => loaded,
        Err(e) => {
            finish_with_failure(&spinner, "Failed to load dataset");
            return Err(e);
        }
    };
    finish_with_success(&spinner, "Dataset loaded");

    let decision = loaded.table.schema().decision;
    let decision_classes = loaded
        .table
        .records()
        .iter()
        .map(|r| r.value(decision))
        .collect::<HashSet<_>>()
        .len();

    println!("\n    {} Decision Table:", style("✧").cyan());
    println!("      Records: {}", loaded.table.len());
    println!(
        "      Condition attributes: {}",
        loaded.table.condition_attributes().len()
    );
    println!("      Decision classes: {}", decision_classes);

    let mut summary = ReductSummary::new(
        loaded.table.len(),
        loaded.table.condition_attributes().len(),
        &cli.metric.to_string(),
    );
    summary.decision_classes = decision_classes;
    summary.batches = cli.batches;
    let load_elapsed = step_start.elapsed();
    summary.set_load_time(load_elapsed);
    print_step_time(load_elapsed);

    // Step 2: Search for a reduct
    let title = if cli.is_streaming() {
        "Streamed Reduct Search"
    } else {
        "Reduct Search"
    };
    print_step_header(2, title);

    let mut builder = ReductReportBuilder::new(ReportBuilderParams {
        input_file: cli.input.display().to_string(),
        columns: loaded.columns.clone(),
        condition_attributes: loaded.table.condition_attributes(),
        target_column: cli.target.clone(),
        metric: cli.metric.to_string(),
        partitioner: cli.partitioner.to_string(),
        batches: cli.batches,
        config: config.clone(),
    });

    let step_start = Instant::now();
    let mut run = Run {
        loaded: &loaded,
        batches: cli.batches,
        summary: &mut summary,
        builder: &mut builder,
    };
    match cli.partitioner {
        PartitionStrategy::Hash => run.with_metric(HashPartitioner, &cli)?,
        PartitionStrategy::Sequential => run.with_metric(SequentialPartitioner, &cli)?,
    }
    let reduct_elapsed = step_start.elapsed();
    summary.set_reduct_time(reduct_elapsed);
    print_step_time(reduct_elapsed);

    summary.display();

    if let Some(report_path) = &cli.report {
        builder.set_timing(&summary);
        let report = builder.build();
        export_reduct_report(&report, report_path)?;
        print_success(&format!("Report written to {}", report_path.display()));
    }

    print_completion();
    Ok(())
}

/// Shared state for one reduction run
struct Run<'r> {
    loaded: &'r LoadedTable,
    batches: usize,
    summary: &'r mut ReductSummary,
    builder: &'r mut ReductReportBuilder,
}

impl Run<'_> {
    fn with_metric<P>(&mut self, partitioner: P, cli: &Cli) -> Result<()>
    where
        P: Partitioner + Sync,
    {
        let config = cli.reduct_config();
        match cli.metric {
            MetricKind::PositiveRegion => {
                self.reduce(ReductEngine::new(partitioner, PositiveRegion, config))
            }
            MetricKind::Dependency => {
                self.reduce(ReductEngine::new(partitioner, DependencyDegree, config))
            }
            MetricKind::Entropy => {
                self.reduce(ReductEngine::new(partitioner, ConditionalEntropy, config))
            }
            MetricKind::Discernibility => {
                self.reduce(ReductEngine::new(partitioner, DiscernibilityDegree, config))
            }
        }
    }

    fn reduce<P, M>(&mut self, engine: ReductEngine<P, M>) -> Result<()>
    where
        P: Partitioner + Sync,
        M: RefinementStable + Sync,
    {
        if self.batches <= 1 {
            self.reduce_whole(&engine)
        } else {
            self.reduce_streamed(&engine)
        }
    }

    fn reduce_whole<P, M>(&mut self, engine: &ReductEngine<P, M>) -> Result<()>
    where
        P: Partitioner + Sync,
        M: RefinementStable + Sync,
    {
        let table = &self.loaded.table;
        let spinner = create_spinner("Searching for a reduct...");
        let outcome = match engine.reduce(table) {
            Ok(outcome) => outcome,
            Err(e) => {
                finish_with_failure(&spinner, "Reduct search failed");
                return Err(e).context("Reduction did not converge");
            }
        };
        finish_with_success(&spinner, "Reduct found");

        self.report_search(&outcome.core, outcome.rounds.len(), &outcome.removed);
        self.builder.set_outcome(table.len(), &outcome);
        self.finish(
            outcome.core,
            outcome.reduct.attributes(),
            outcome.removed,
            outcome.rounds.len(),
            outcome.significance,
            outcome.global_significance,
        );
        Ok(())
    }

    fn reduce_streamed<P, M>(&mut self, engine: &ReductEngine<P, M>) -> Result<()>
    where
        P: Partitioner + Sync,
        M: RefinementStable + Sync,
    {
        let table = &self.loaded.table;
        let chunk = table.len().div_ceil(self.batches).max(1);
        let (head, rest) = table.records().split_at(chunk.min(table.len()));

        let spinner = create_spinner("Reducing the first batch...");
        let (mut state, outcome) = match engine.begin_stream_records(table.schema(), head) {
            Ok(started) => started,
            Err(e) => {
                finish_with_failure(&spinner, "Reduct search failed");
                return Err(e).context("Reduction of the first batch did not converge");
            }
        };
        finish_with_success(
            &spinner,
            &format!("First batch reduced ({} records)", head.len()),
        );
        self.report_search(&outcome.core, outcome.rounds.len(), &outcome.removed);
        self.builder.set_outcome(head.len(), &outcome);

        let mut rounds = outcome.rounds.len();
        let mut removed: Vec<usize> = outcome.removed;
        let mut fast_exits = 0;

        let batches: Vec<_> = rest.chunks(chunk).collect();
        let bar = create_batch_bar(batches.len() as u64);
        for batch in batches {
            let update = engine
                .update_stream(&mut state, batch)
                .with_context(|| format!("Failed to fold in a batch of {} records", batch.len()))?;

            rounds += update.rounds.len();
            match &update.outcome {
                UpdateOutcome::FastExit => fast_exits += 1,
                UpdateOutcome::Searched { removed: dropped, .. } => {
                    removed.extend(dropped.iter().copied())
                }
            }
            self.builder.add_batch(batch.len(), &update, state.reduct());
            bar.inc(1);
        }
        finish_with_success(&bar, "All batches folded in");

        print_count("batch(es) kept the reduct unchanged", fast_exits, None);
        self.summary.fast_exits = fast_exits;
        removed.retain(|&a| !state.reduct().contains(a));
        removed.sort_unstable();
        removed.dedup();
        self.finish(
            outcome.core,
            state.reduct().attributes(),
            removed,
            rounds,
            state.significance(),
            state.global_significance(),
        );
        Ok(())
    }

    fn report_search(&self, core: &[usize], rounds: usize, removed: &[usize]) {
        if core.is_empty() {
            print_info("Core is empty");
        } else {
            print_count("core attribute(s)", core.len(), None);
        }
        print_count("attribute(s) added by forward search", rounds, None);
        print_count("redundant attribute(s) removed", removed.len(), None);
    }

    fn finish<V: Sig>(
        &mut self,
        core: Vec<usize>,
        reduct: &[usize],
        removed: Vec<usize>,
        rounds: usize,
        significance: V,
        global_significance: V,
    ) {
        let loaded = self.loaded;
        self.summary.core = loaded.attribute_names(&core);
        self.summary.reduct = loaded.attribute_names(reduct);
        self.summary.removed = loaded.attribute_names(&removed);
        self.summary.rounds = rounds;
        self.summary.significance = significance.as_f64();
        self.summary.global_significance = global_significance.as_f64();
    }
}

//! JSON report of a reduction run
//!
//! Documents every condition attribute with its final status (core, selected,
//! removed by inspection, or never chosen), the search trace that selected it,
//! and, when the table was streamed, what each batch did to the reduct.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::reduct::{Reduct, ReductConfig, ReductOutcome, Sig, StreamUpdate, UpdateOutcome};
use crate::report::ReductSummary;

/// Final status of a condition attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeStatus {
    Core,
    Selected,
    Removed,
    Unused,
}

/// Single attribute entry in the report
#[derive(Debug, Clone, Serialize)]
pub struct AttributeEntry {
    pub name: String,
    pub index: usize,
    pub status: AttributeStatus,
    /// Batch in which forward search picked the attribute (0 = initial table)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_in_batch: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub significance_after: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,
}

/// What one streamed batch did
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub index: usize,
    pub records: usize,
    pub outcome: String,
    pub reduct_mixed: usize,
    pub decision_mixed: usize,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub significance: f64,
    pub global_significance: f64,
}

/// Settings used in the run
#[derive(Debug, Clone, Serialize)]
pub struct ReportSettings {
    pub target_column: String,
    pub metric: String,
    pub partitioner: String,
    pub batches: usize,
    #[serde(flatten)]
    pub config: ReductConfig,
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub quickreduct_version: String,
    pub input_file: String,
    pub settings: ReportSettings,
}

/// Timing information in milliseconds
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingInfo {
    pub load_ms: u64,
    pub reduct_ms: u64,
    pub total_ms: u64,
}

/// Report summary
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub records: usize,
    pub condition_attributes: usize,
    pub core_size: usize,
    pub reduct_size: usize,
    pub reduct: Vec<String>,
    pub significance: f64,
    pub global_significance: f64,
    pub timing: TimingInfo,
}

/// Complete reduction report
#[derive(Debug, Clone, Serialize)]
pub struct ReductReport {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub attributes: Vec<AttributeEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub batches: Vec<BatchEntry>,
}

/// Parameters for creating a ReductReportBuilder
pub struct ReportBuilderParams {
    pub input_file: String,
    pub columns: Vec<String>,
    pub condition_attributes: Vec<usize>,
    pub target_column: String,
    pub metric: String,
    pub partitioner: String,
    pub batches: usize,
    pub config: ReductConfig,
}

#[derive(Debug, Clone, Copy)]
struct Selection {
    batch: usize,
    significance: f64,
    gain: f64,
}

/// Collects results while the reduction runs
pub struct ReductReportBuilder {
    params: ReportBuilderParams,
    records: usize,
    core: Vec<usize>,
    reduct: Reduct,
    significance: f64,
    global_significance: f64,
    selections: HashMap<usize, Selection>,
    removed: HashSet<usize>,
    batches: Vec<BatchEntry>,
    timing: TimingInfo,
}

impl ReductReportBuilder {
    pub fn new(params: ReportBuilderParams) -> Self {
        Self {
            params,
            records: 0,
            core: Vec::new(),
            reduct: Reduct::default(),
            significance: 0.0,
            global_significance: 0.0,
            selections: HashMap::new(),
            removed: HashSet::new(),
            batches: Vec::new(),
            timing: TimingInfo::default(),
        }
    }

    /// Record the reduction of the initial table.
    pub fn set_outcome<V: Sig>(&mut self, records: usize, outcome: &ReductOutcome<V>) {
        self.records = records;
        self.core = outcome.core.clone();
        for round in &outcome.rounds {
            self.selections.insert(
                round.attribute,
                Selection {
                    batch: 0,
                    significance: round.significance.as_f64(),
                    gain: round.gain,
                },
            );
        }
        self.removed.extend(outcome.removed.iter().copied());
        self.reduct = outcome.reduct.clone();
        self.significance = outcome.significance.as_f64();
        self.global_significance = outcome.global_significance.as_f64();
    }

    /// Record one streamed batch and the reduct it left behind.
    pub fn add_batch<V: Sig>(&mut self, records: usize, update: &StreamUpdate<V>, reduct: &Reduct) {
        let index = self.batches.len() + 1;
        self.records += records;

        for round in &update.rounds {
            self.selections.insert(
                round.attribute,
                Selection {
                    batch: index,
                    significance: round.significance.as_f64(),
                    gain: round.gain,
                },
            );
        }

        let (outcome, added, removed) = match &update.outcome {
            UpdateOutcome::FastExit => ("fast-exit", Vec::new(), Vec::new()),
            UpdateOutcome::Searched { added, removed } => {
                self.removed.extend(removed.iter().copied());
                ("searched", self.names(added), self.names(removed))
            }
        };

        self.batches.push(BatchEntry {
            index,
            records,
            outcome: outcome.to_string(),
            reduct_mixed: update.reduct_mixed,
            decision_mixed: update.decision_mixed,
            added,
            removed,
            significance: update.significance.as_f64(),
            global_significance: update.global_significance.as_f64(),
        });

        self.reduct = reduct.clone();
        self.significance = update.significance.as_f64();
        self.global_significance = update.global_significance.as_f64();
    }

    /// Set timing information from the ReductSummary
    pub fn set_timing(&mut self, summary: &ReductSummary) {
        self.timing = TimingInfo {
            load_ms: summary.load_time.as_millis() as u64,
            reduct_ms: summary.reduct_time.as_millis() as u64,
            total_ms: summary.total_time().as_millis() as u64,
        };
    }

    fn name(&self, attribute: usize) -> String {
        self.params
            .columns
            .get(attribute)
            .cloned()
            .unwrap_or_else(|| format!("#{}", attribute))
    }

    fn names(&self, attributes: &[usize]) -> Vec<String> {
        attributes.iter().map(|&a| self.name(a)).collect()
    }

    fn status(&self, attribute: usize) -> AttributeStatus {
        if self.reduct.contains(attribute) {
            if self.core.contains(&attribute) {
                AttributeStatus::Core
            } else {
                AttributeStatus::Selected
            }
        } else if self.removed.contains(&attribute) {
            AttributeStatus::Removed
        } else {
            AttributeStatus::Unused
        }
    }

    /// Build the final report
    pub fn build(self) -> ReductReport {
        let mut attributes: Vec<AttributeEntry> = self
            .params
            .condition_attributes
            .iter()
            .map(|&index| {
                let selection = self.selections.get(&index);
                AttributeEntry {
                    name: self.name(index),
                    index,
                    status: self.status(index),
                    selected_in_batch: selection.map(|s| s.batch),
                    significance_after: selection.map(|s| s.significance),
                    gain: selection.map(|s| s.gain),
                }
            })
            .collect();

        // Reduct members first, then by column index
        attributes.sort_by_key(|entry| {
            let rank = match entry.status {
                AttributeStatus::Core => 0,
                AttributeStatus::Selected => 1,
                AttributeStatus::Removed => 2,
                AttributeStatus::Unused => 3,
            };
            (rank, entry.index)
        });

        let reduct = self.names(self.reduct.attributes());

        ReductReport {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                quickreduct_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: self.params.input_file,
                settings: ReportSettings {
                    target_column: self.params.target_column,
                    metric: self.params.metric,
                    partitioner: self.params.partitioner,
                    batches: self.params.batches,
                    config: self.params.config,
                },
            },
            summary: ReportSummary {
                records: self.records,
                condition_attributes: self.params.condition_attributes.len(),
                core_size: self.core.len(),
                reduct_size: reduct.len(),
                reduct,
                significance: self.significance,
                global_significance: self.global_significance,
                timing: self.timing,
            },
            attributes,
            batches: self.batches,
        }
    }
}

/// Export the reduction report to a JSON file
pub fn export_reduct_report(report: &ReductReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize reduction report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write reduction report to {}", output_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduct::SearchRound;

    fn create_test_builder() -> ReductReportBuilder {
        ReductReportBuilder::new(ReportBuilderParams {
            input_file: "table.csv".to_string(),
            columns: vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "d".to_string(),
                "label".to_string(),
            ],
            condition_attributes: vec![0, 1, 2, 3],
            target_column: "label".to_string(),
            metric: "positive-region".to_string(),
            partitioner: "hash".to_string(),
            batches: 2,
            config: ReductConfig::default(),
        })
    }

    fn outcome() -> ReductOutcome<usize> {
        ReductOutcome {
            reduct: Reduct::new([2, 0]),
            core: vec![2],
            significance: 8,
            global_significance: 8,
            rounds: vec![
                SearchRound {
                    attribute: 0,
                    significance: 6,
                    gain: 4.0,
                },
                SearchRound {
                    attribute: 1,
                    significance: 8,
                    gain: 2.0,
                },
            ],
            removed: vec![1],
        }
    }

    #[test]
    fn test_build_report_statuses() {
        let mut builder = create_test_builder();
        builder.set_outcome(8, &outcome());
        let report = builder.build();

        let statuses: Vec<(&str, AttributeStatus)> = report
            .attributes
            .iter()
            .map(|e| (e.name.as_str(), e.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("c", AttributeStatus::Core),
                ("a", AttributeStatus::Selected),
                ("b", AttributeStatus::Removed),
                ("d", AttributeStatus::Unused),
            ]
        );
        assert_eq!(report.summary.reduct, vec!["c", "a"]);
        assert_eq!(report.summary.records, 8);
        assert_eq!(report.attributes[1].gain, Some(4.0));
        assert!(report.attributes[3].selected_in_batch.is_none());
    }

    #[test]
    fn test_add_batch_tracks_changes() {
        let mut builder = create_test_builder();
        builder.set_outcome(8, &outcome());

        let update = StreamUpdate {
            outcome: UpdateOutcome::Searched {
                added: vec![3],
                removed: vec![0],
            },
            reduct_mixed: 1,
            decision_mixed: 0,
            significance: 10usize,
            global_significance: 10usize,
            rounds: vec![SearchRound {
                attribute: 3,
                significance: 10,
                gain: 1.0,
            }],
        };
        builder.add_batch(2, &update, &Reduct::new([2, 3]));
        let report = builder.build();

        assert_eq!(report.batches.len(), 1);
        assert_eq!(report.batches[0].outcome, "searched");
        assert_eq!(report.batches[0].added, vec!["d"]);
        assert_eq!(report.batches[0].removed, vec!["a"]);
        assert_eq!(report.summary.records, 10);

        let d = report.attributes.iter().find(|e| e.name == "d").unwrap();
        assert_eq!(d.status, AttributeStatus::Selected);
        assert_eq!(d.selected_in_batch, Some(1));
        let a = report.attributes.iter().find(|e| e.name == "a").unwrap();
        assert_eq!(a.status, AttributeStatus::Removed);
    }

    #[test]
    fn test_report_serializes() {
        let mut builder = create_test_builder();
        builder.set_outcome(8, &outcome());
        let json = serde_json::to_string(&builder.build()).unwrap();
        assert!(json.contains("\"status\":\"core\""));
        assert!(json.contains("\"inspect_order\":\"reversed\""));
        assert!(!json.contains("\"batches\":["));
    }
}

//! Reduction summary shown at the end of a run

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

/// Summary of one reduction run
#[derive(Debug, Default)]
pub struct ReductSummary {
    pub records: usize,
    pub condition_attributes: usize,
    pub decision_classes: usize,
    pub metric: String,
    pub core: Vec<String>,
    pub reduct: Vec<String>,
    pub removed: Vec<String>,
    pub significance: f64,
    pub global_significance: f64,
    pub rounds: usize,
    pub batches: usize,
    pub fast_exits: usize,
    pub load_time: Duration,
    pub reduct_time: Duration,
}

impl ReductSummary {
    pub fn new(records: usize, condition_attributes: usize, metric: &str) -> Self {
        Self {
            records,
            condition_attributes,
            metric: metric.to_string(),
            batches: 1,
            ..Default::default()
        }
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = elapsed;
    }

    pub fn set_reduct_time(&mut self, elapsed: Duration) {
        self.reduct_time = elapsed;
    }

    pub fn total_time(&self) -> Duration {
        self.load_time + self.reduct_time
    }

    /// Share of condition attributes left out of the reduct, in percent.
    pub fn reduction_pct(&self) -> f64 {
        if self.condition_attributes == 0 {
            return 0.0;
        }
        let dropped = self.condition_attributes.saturating_sub(self.reduct.len());
        dropped as f64 / self.condition_attributes as f64 * 100.0
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("REDUCT SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("Records"), Cell::new(self.records)]);
        table.add_row(vec![
            Cell::new("Decision Classes"),
            Cell::new(self.decision_classes),
        ]);
        table.add_row(vec![
            Cell::new("Condition Attributes"),
            Cell::new(self.condition_attributes),
        ]);
        table.add_row(vec![Cell::new("Core Size"), Cell::new(self.core.len())]);
        table.add_row(vec![
            Cell::new("Removed by Inspection"),
            Cell::new(self.removed.len()).fg(if self.removed.is_empty() {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);
        table.add_row(vec![
            Cell::new("Reduct Size"),
            Cell::new(self.reduct.len())
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new(format!("Significance ({})", self.metric)),
            Cell::new(format!(
                "{:.4} / {:.4}",
                self.significance, self.global_significance
            )),
        ]);
        table.add_row(vec![Cell::new("Search Rounds"), Cell::new(self.rounds)]);

        if self.batches > 1 {
            table.add_row(vec![
                Cell::new("Batches (fast exits)"),
                Cell::new(format!("{} ({})", self.batches, self.fast_exits)),
            ]);
        }

        let reduction_pct = self.reduction_pct();
        let color = if reduction_pct > 50.0 {
            Color::Green
        } else if reduction_pct > 20.0 {
            Color::Yellow
        } else {
            Color::Cyan
        };
        table.add_row(vec![
            Cell::new("Reduction"),
            Cell::new(format!("{:.1}%", reduction_pct))
                .fg(color)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("Time"),
            Cell::new(format!("{:.2}s", self.total_time().as_secs_f64())),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        println!();
        println!(
            "    {} {}",
            style("📝").cyan(),
            style("REDUCT").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        for attribute in &self.reduct {
            let marker = if self.core.contains(attribute) {
                style("core").magenta()
            } else {
                style("selected").dim()
            };
            println!("        {} {} {}", style("•").dim(), attribute, marker);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction_pct() {
        let mut summary = ReductSummary::new(10, 4, "positive-region");
        summary.reduct = vec!["a".to_string()];
        assert!((summary.reduction_pct() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_reduction_pct_without_attributes() {
        let summary = ReductSummary::new(0, 0, "entropy");
        assert_eq!(summary.reduction_pct(), 0.0);
    }

    #[test]
    fn test_total_time() {
        let mut summary = ReductSummary::new(1, 1, "dependency");
        summary.set_load_time(Duration::from_millis(200));
        summary.set_reduct_time(Duration::from_millis(300));
        assert_eq!(summary.total_time(), Duration::from_millis(500));
    }
}

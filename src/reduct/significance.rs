//! Significance metrics over partitions
//!
//! A metric turns the equivalence classes of an attribute subset into a
//! comparable value describing how well that subset discerns the decision.
//! The engine never inspects the value directly; it only asks the metric
//! whether one value beats another outside a tolerance band, and by how much.

use std::fmt;

use serde::Serialize;

use super::partition::{DecisionPartition, EquivalenceClass, Partition};

/// Numeric significance value.
pub trait Sig: Copy + PartialOrd + fmt::Debug + fmt::Display + Send + Sync {
    fn as_f64(self) -> f64;
}

impl Sig for usize {
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Sig for f64 {
    fn as_f64(self) -> f64 {
        self
    }
}

/// Which end of the scale is better for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Pluggable significance measure.
///
/// Implementations must be pure functions of their inputs. The provided
/// `difference` and `value_is_better` follow the metric's [`Direction`]; an
/// override must keep `value_is_better(a, b, d) == false` whenever
/// `|a - b| <= d`, otherwise search and inspection may disagree with each
/// other.
pub trait SignificanceMetric {
    type Value: Sig;

    fn name(&self) -> &'static str;

    fn direction(&self) -> Direction;

    /// Compute the value of a partition given by its classes.
    ///
    /// `decision` covers the whole universe; the classes may be a coarser
    /// view in which consistent classes were left unsplit.
    fn calculate<'c, 'a: 'c, I>(&self, classes: I, decision: &DecisionPartition<'_>) -> Self::Value
    where
        I: IntoIterator<Item = &'c EquivalenceClass<'a>>;

    fn evaluate(&self, partition: &Partition<'_>, decision: &DecisionPartition<'_>) -> Self::Value {
        self.calculate(partition.classes(), decision)
    }

    /// Signed improvement of `a` over `b`; positive means `a` is better.
    fn difference(&self, a: Self::Value, b: Self::Value) -> f64 {
        match self.direction() {
            Direction::HigherIsBetter => a.as_f64() - b.as_f64(),
            Direction::LowerIsBetter => b.as_f64() - a.as_f64(),
        }
    }

    /// Whether `a` is strictly better than `b` beyond `deviation`.
    fn value_is_better(&self, a: Self::Value, b: Self::Value, deviation: f64) -> bool {
        self.difference(a, b) > deviation
    }
}

/// Marker for metrics unaffected by splitting decision-consistent classes.
///
/// Only such metrics may be evaluated over a [`super::partition::BoundaryPartition`],
/// whose resolved classes are never refined.
pub trait RefinementStable: SignificanceMetric {}

/// Concrete metric selectable at runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    #[default]
    PositiveRegion,
    Dependency,
    Entropy,
    Discernibility,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::PositiveRegion => write!(f, "positive-region"),
            MetricKind::Dependency => write!(f, "dependency"),
            MetricKind::Entropy => write!(f, "entropy"),
            MetricKind::Discernibility => write!(f, "discernibility"),
        }
    }
}

impl std::str::FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "positive-region" | "pos" => Ok(MetricKind::PositiveRegion),
            "dependency" => Ok(MetricKind::Dependency),
            "entropy" => Ok(MetricKind::Entropy),
            "discernibility" => Ok(MetricKind::Discernibility),
            _ => Err(format!(
                "Unknown metric: '{}'. Use 'positive-region', 'dependency', 'entropy' or 'discernibility'.",
                s
            )),
        }
    }
}

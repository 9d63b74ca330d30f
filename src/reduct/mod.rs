//! Reduct module - rough-set attribute reduction

pub mod core;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod incremental;
pub mod inspect;
pub mod loader;
pub mod metrics;
pub mod partition;
pub mod record;
pub mod search;
pub mod significance;

pub use self::core::find_core;
pub use engine::*;
pub use error::*;
pub use evaluator::Evaluator;
pub use incremental::*;
pub use inspect::*;
pub use loader::*;
pub use metrics::*;
pub use partition::*;
pub use record::{AttributeSubset, AttributeValue, DecisionTable, Record, RecordId, Schema, Signature};
pub use search::*;
pub use significance::*;

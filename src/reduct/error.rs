//! Error types for the reduction engine.
//!
//! Every engine operation either returns a valid result or fails fast with
//! one of these variants. Nothing here is transient, so nothing is retried.

use thiserror::Error;

use super::record::RecordId;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, ReductError>;

/// Errors raised by partitioning, search, inspection and incremental updates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReductError {
    /// No candidate condition attributes were supplied.
    #[error("Attribute domain is empty: at least one condition attribute is required")]
    EmptyAttributeDomain,

    /// A record's value vector disagrees with the declared attribute count.
    #[error("Record {record_id} has {found} values, expected {expected}")]
    RecordLength {
        /// Identity of the offending record.
        record_id: RecordId,
        /// Declared attribute count (decision included).
        expected: usize,
        /// Actual length of the record's value vector.
        found: usize,
    },

    /// An attribute index points past the end of the record vector.
    #[error("Attribute {attribute} is out of range for records of width {width}")]
    AttributeOutOfRange { attribute: usize, width: usize },

    /// The decision index was listed as a condition attribute.
    #[error("Attribute {attribute} is the decision attribute and cannot be a condition attribute")]
    DecisionAttribute { attribute: usize },

    /// The same attribute appears twice in a candidate list.
    #[error("Attribute {attribute} is listed more than once")]
    DuplicateAttribute { attribute: usize },

    /// Two records share one identity.
    #[error("Record id {record_id} is not unique")]
    DuplicateRecordId { record_id: RecordId },

    /// Partitions taken under different attribute subsets cannot be merged.
    #[error("Cannot merge partitions over different subsets: {previous:?} vs {new:?}")]
    SubsetMismatch {
        previous: Vec<usize>,
        new: Vec<usize>,
    },

    /// The significance tolerance is negative or not a finite number.
    #[error("Significance deviation must be a finite, non-negative number, got {deviation}")]
    InvalidDeviation { deviation: f64 },

    /// Forward search ran out of candidate attributes before converging.
    ///
    /// This means the global significance was computed over a different
    /// attribute universe than the search domain.
    #[error(
        "Search exhausted all candidates with reduct {reduct:?} at significance {significance}, \
         global significance is {global}"
    )]
    SearchExhausted {
        /// Attributes selected when the search gave up.
        reduct: Vec<usize>,
        /// Significance of that reduct.
        significance: f64,
        /// Significance the search was trying to reach.
        global: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_length_display() {
        let err = ReductError::RecordLength {
            record_id: 7,
            expected: 4,
            found: 3,
        };
        assert_eq!(err.to_string(), "Record 7 has 3 values, expected 4");
    }

    #[test]
    fn test_subset_mismatch_display() {
        let err = ReductError::SubsetMismatch {
            previous: vec![0, 1],
            new: vec![2],
        };
        assert_eq!(
            err.to_string(),
            "Cannot merge partitions over different subsets: [0, 1] vs [2]"
        );
    }

    #[test]
    fn test_search_exhausted_display() {
        let err = ReductError::SearchExhausted {
            reduct: vec![0],
            significance: 2.0,
            global: 4.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("[0]"));
        assert!(msg.contains("global significance is 4"));
    }

    #[test]
    fn test_invalid_deviation_display() {
        let err = ReductError::InvalidDeviation { deviation: -0.5 };
        assert!(err.to_string().contains("-0.5"));
    }
}

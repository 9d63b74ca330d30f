//! Record and attribute model
//!
//! A record is an immutable vector of integer attribute values with one
//! designated decision slot. Attribute subsets are kept in canonical (sorted)
//! order so that the same set of attributes always yields the same signature.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::error::{EngineResult, ReductError};

/// Stable record identity assigned at ingestion.
pub type RecordId = u64;

/// Discrete attribute value.
pub type AttributeValue = i64;

/// A single labeled record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    values: Box<[AttributeValue]>,
}

impl Record {
    pub fn new(id: RecordId, values: Vec<AttributeValue>) -> Self {
        Self {
            id,
            values: values.into_boxed_slice(),
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// Value at `attribute`. Callers validate indices against the [`Schema`].
    pub fn value(&self, attribute: usize) -> AttributeValue {
        self.values[attribute]
    }

    /// Project this record onto `subset`, producing its equivalence key.
    ///
    /// Every attribute in `subset` must be below [`Record::width`].
    pub fn project(&self, subset: &AttributeSubset) -> Signature {
        Signature(subset.iter().map(|a| self.values[a]).collect())
    }

    /// Whether this record agrees with `other` on every attribute in `subset`.
    ///
    /// Equivalent to comparing projected signatures without allocating them.
    /// Both records must be wide enough for `subset`.
    pub fn agrees_with(&self, other: &Record, subset: &AttributeSubset) -> bool {
        subset.iter().all(|a| self.values[a] == other.values[a])
    }
}

/// Tuple of a record's values at the positions named by an attribute subset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(Vec<AttributeValue>);

impl Signature {
    pub fn values(&self) -> &[AttributeValue] {
        &self.0
    }
}

/// Set of attribute indices in canonical ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AttributeSubset(Vec<usize>);

impl AttributeSubset {
    /// Build a subset from attributes in any order; duplicates collapse.
    pub fn new<I: IntoIterator<Item = usize>>(attributes: I) -> Self {
        let mut attrs: Vec<usize> = attributes.into_iter().collect();
        attrs.sort_unstable();
        attrs.dedup();
        Self(attrs)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn single(attribute: usize) -> Self {
        Self(vec![attribute])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, attribute: usize) -> bool {
        self.0.binary_search(&attribute).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// New subset with `attribute` added.
    pub fn with(&self, attribute: usize) -> Self {
        let mut attrs = self.0.clone();
        if let Err(pos) = attrs.binary_search(&attribute) {
            attrs.insert(pos, attribute);
        }
        Self(attrs)
    }

    /// New subset with `attribute` removed.
    pub fn without(&self, attribute: usize) -> Self {
        Self(self.0.iter().copied().filter(|&a| a != attribute).collect())
    }

    /// New subset with every attribute of `other` removed.
    pub fn difference(&self, other: &AttributeSubset) -> Self {
        Self(
            self.0
                .iter()
                .copied()
                .filter(|&a| !other.contains(a))
                .collect(),
        )
    }

    /// Overwrite the slot at `position` in place.
    ///
    /// The caller must keep the ascending order intact; the core finder uses
    /// this to walk the "all but one" subsets without rebuilding each one.
    pub(crate) fn replace_at(&mut self, position: usize, attribute: usize) {
        self.0[position] = attribute;
        debug_assert!(self.0.windows(2).all(|w| w[0] < w[1]));
    }
}

impl fmt::Display for AttributeSubset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, a) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", a)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<usize> for AttributeSubset {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Width of a record vector plus the position of the decision value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub width: usize,
    pub decision: usize,
}

impl Schema {
    pub fn new(width: usize, decision: usize) -> EngineResult<Self> {
        if decision >= width {
            return Err(ReductError::AttributeOutOfRange {
                attribute: decision,
                width,
            });
        }
        Ok(Self { width, decision })
    }

    /// Condition attributes in natural index order.
    pub fn condition_attributes(&self) -> Vec<usize> {
        (0..self.width).filter(|&a| a != self.decision).collect()
    }

    pub fn decision_subset(&self) -> AttributeSubset {
        AttributeSubset::single(self.decision)
    }

    pub fn check_record(&self, record: &Record) -> EngineResult<()> {
        if record.width() != self.width {
            return Err(ReductError::RecordLength {
                record_id: record.id(),
                expected: self.width,
                found: record.width(),
            });
        }
        Ok(())
    }

    /// Validate a caller-supplied attribute scan order.
    ///
    /// The order itself is preserved; it drives tie-breaks during search.
    pub fn check_attributes(&self, attributes: &[usize]) -> EngineResult<()> {
        if attributes.is_empty() {
            return Err(ReductError::EmptyAttributeDomain);
        }
        let mut seen = HashSet::with_capacity(attributes.len());
        for &attribute in attributes {
            if attribute >= self.width {
                return Err(ReductError::AttributeOutOfRange {
                    attribute,
                    width: self.width,
                });
            }
            if attribute == self.decision {
                return Err(ReductError::DecisionAttribute { attribute });
            }
            if !seen.insert(attribute) {
                return Err(ReductError::DuplicateAttribute { attribute });
            }
        }
        Ok(())
    }
}

/// Validated, in-memory collection of records sharing one schema.
#[derive(Debug, Clone)]
pub struct DecisionTable {
    schema: Schema,
    records: Vec<Record>,
}

impl DecisionTable {
    /// Validate record widths and identity uniqueness.
    pub fn new(schema: Schema, records: Vec<Record>) -> EngineResult<Self> {
        check_batch(&schema, &records, |_| false)?;
        Ok(Self { schema, records })
    }

    /// Build a table from raw rows, assigning ids `0..n` in row order.
    ///
    /// The width is taken from the first row; every other row must match it.
    pub fn from_rows(rows: Vec<Vec<AttributeValue>>, decision: usize) -> EngineResult<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(decision + 1);
        let schema = Schema::new(width, decision)?;
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, values)| Record::new(i as RecordId, values))
            .collect();
        Self::new(schema, records)
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn condition_attributes(&self) -> Vec<usize> {
        self.schema.condition_attributes()
    }

    /// Split into the first `head` records and the rest, keeping the schema.
    pub fn split_at(self, head: usize) -> (DecisionTable, Vec<Record>) {
        let mut records = self.records;
        let tail = records.split_off(head.min(records.len()));
        (
            DecisionTable {
                schema: self.schema,
                records,
            },
            tail,
        )
    }
}

/// Validate a batch against `schema`; `known` reports ids seen before the batch.
pub(crate) fn check_batch<F>(schema: &Schema, records: &[Record], known: F) -> EngineResult<()>
where
    F: Fn(RecordId) -> bool,
{
    let mut ids = HashSet::with_capacity(records.len());
    for record in records {
        schema.check_record(record)?;
        if known(record.id()) || !ids.insert(record.id()) {
            return Err(ReductError::DuplicateRecordId {
                record_id: record.id(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_is_order_independent() {
        let a = AttributeSubset::new([2, 0, 1]);
        let b = AttributeSubset::new([1, 2, 0, 2]);
        assert_eq!(a, b);

        let record = Record::new(0, vec![10, 20, 30, 1]);
        assert_eq!(record.project(&a), record.project(&b));
        assert_eq!(record.project(&a).values(), &[10, 20, 30]);
    }

    #[test]
    fn test_subset_with_and_without() {
        let s = AttributeSubset::new([0, 2]);
        assert_eq!(s.with(1).as_slice(), &[0, 1, 2]);
        assert_eq!(s.with(2).as_slice(), &[0, 2]);
        assert_eq!(s.without(0).as_slice(), &[2]);
        assert_eq!(s.to_string(), "{0, 2}");
    }

    #[test]
    fn test_schema_rejects_bad_attributes() {
        let schema = Schema::new(4, 3).unwrap();
        assert_eq!(
            schema.check_attributes(&[]),
            Err(ReductError::EmptyAttributeDomain)
        );
        assert_eq!(
            schema.check_attributes(&[0, 3]),
            Err(ReductError::DecisionAttribute { attribute: 3 })
        );
        assert_eq!(
            schema.check_attributes(&[0, 5]),
            Err(ReductError::AttributeOutOfRange {
                attribute: 5,
                width: 4
            })
        );
        assert_eq!(
            schema.check_attributes(&[1, 1]),
            Err(ReductError::DuplicateAttribute { attribute: 1 })
        );
        assert!(schema.check_attributes(&[2, 0, 1]).is_ok());
    }

    #[test]
    fn test_table_rejects_short_record() {
        let result = DecisionTable::from_rows(vec![vec![1, 2, 0], vec![1, 0]], 2);
        assert_eq!(
            result.unwrap_err(),
            ReductError::RecordLength {
                record_id: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_table_rejects_duplicate_ids() {
        let schema = Schema::new(2, 1).unwrap();
        let records = vec![Record::new(4, vec![1, 0]), Record::new(4, vec![2, 1])];
        assert_eq!(
            DecisionTable::new(schema, records).unwrap_err(),
            ReductError::DuplicateRecordId { record_id: 4 }
        );
    }

    #[test]
    fn test_split_at_keeps_schema() {
        let table = DecisionTable::from_rows(vec![vec![1, 0], vec![2, 1], vec![3, 0]], 1).unwrap();
        let (head, tail) = table.split_at(2);
        assert_eq!(head.len(), 2);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].id(), 2);
        assert_eq!(head.schema().decision, 1);
    }
}

//! Equivalence-class partitioning of record sets
//!
//! Two strategies group records by their signature under an attribute subset:
//! a hash join on the signature (near-linear) and a sequential scan against
//! class representatives (quadratic, needs only equality). Both produce the
//! same classes in the same first-seen order.

use std::collections::HashMap;

use serde::Serialize;

use super::record::{AttributeSubset, Record, RecordId, Signature};

/// A non-empty group of records sharing one signature.
#[derive(Debug, Clone)]
pub struct EquivalenceClass<'a> {
    signature: Signature,
    members: Vec<&'a Record>,
}

impl<'a> EquivalenceClass<'a> {
    pub fn new(signature: Signature, members: Vec<&'a Record>) -> Self {
        debug_assert!(!members.is_empty());
        Self { signature, members }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn members(&self) -> &[&'a Record] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.members.iter().map(|r| r.id())
    }

    pub(crate) fn into_parts(self) -> (Signature, Vec<&'a Record>) {
        (self.signature, self.members)
    }
}

/// Classes produced by one partitioning call, together with the subset used.
#[derive(Debug, Clone, Default)]
pub struct Partition<'a> {
    subset: AttributeSubset,
    classes: Vec<EquivalenceClass<'a>>,
}

impl<'a> Partition<'a> {
    pub fn new(subset: AttributeSubset, classes: Vec<EquivalenceClass<'a>>) -> Self {
        Self { subset, classes }
    }

    pub fn subset(&self) -> &AttributeSubset {
        &self.subset
    }

    pub fn classes(&self) -> &[EquivalenceClass<'a>] {
        &self.classes
    }

    pub fn into_classes(self) -> Vec<EquivalenceClass<'a>> {
        self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Total number of records across all classes.
    pub fn record_count(&self) -> usize {
        self.classes.iter().map(EquivalenceClass::len).sum()
    }

    /// Every record of the partitioned universe, class by class.
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.classes.iter().flat_map(|c| c.members.iter().copied())
    }
}

/// Strategy for grouping records into equivalence classes.
///
/// Records are indexed directly by the attributes in the subset, so every
/// record must be wider than the largest attribute index. Inputs that have
/// not passed [`Schema::check_record`] and [`Schema::check_attributes`] can
/// panic here; the engine and [`DecisionTable`] run those checks up front.
///
/// [`Schema::check_record`]: super::record::Schema::check_record
/// [`Schema::check_attributes`]: super::record::Schema::check_attributes
/// [`DecisionTable`]: super::record::DecisionTable
pub trait Partitioner {
    fn partition<'a, I>(&self, records: I, subset: &AttributeSubset) -> Partition<'a>
    where
        I: IntoIterator<Item = &'a Record>;
}

/// Signature → bucket map. Cost O(n·k).
#[derive(Debug, Clone, Copy, Default)]
pub struct HashPartitioner;

impl Partitioner for HashPartitioner {
    fn partition<'a, I>(&self, records: I, subset: &AttributeSubset) -> Partition<'a>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut index: HashMap<Signature, usize> = HashMap::new();
        let mut buckets: Vec<(Signature, Vec<&'a Record>)> = Vec::new();

        for record in records {
            let signature = record.project(subset);
            match index.get(&signature) {
                Some(&slot) => buckets[slot].1.push(record),
                None => {
                    index.insert(signature.clone(), buckets.len());
                    buckets.push((signature, vec![record]));
                }
            }
        }

        let classes = buckets
            .into_iter()
            .map(|(signature, members)| EquivalenceClass::new(signature, members))
            .collect();
        Partition::new(subset.clone(), classes)
    }
}

/// Linear scan against class representatives. Cost O(n²·k) worst case.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialPartitioner;

impl Partitioner for SequentialPartitioner {
    fn partition<'a, I>(&self, records: I, subset: &AttributeSubset) -> Partition<'a>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        // The first member of each bucket is its representative
        let mut buckets: Vec<Vec<&'a Record>> = Vec::new();

        for record in records {
            match buckets
                .iter_mut()
                .find(|members| members[0].agrees_with(record, subset))
            {
                Some(members) => members.push(record),
                None => buckets.push(vec![record]),
            }
        }

        let classes = buckets
            .into_iter()
            .map(|members| EquivalenceClass::new(members[0].project(subset), members))
            .collect();
        Partition::new(subset.clone(), classes)
    }
}

/// Partitioning strategy selectable at runtime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartitionStrategy {
    #[default]
    Hash,
    Sequential,
}

impl std::fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartitionStrategy::Hash => write!(f, "hash"),
            PartitionStrategy::Sequential => write!(f, "sequential"),
        }
    }
}

impl std::str::FromStr for PartitionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hash" => Ok(PartitionStrategy::Hash),
            "sequential" => Ok(PartitionStrategy::Sequential),
            _ => Err(format!(
                "Unknown partition strategy: '{}'. Use 'hash' or 'sequential'.",
                s
            )),
        }
    }
}

/// Partition induced by the decision attribute alone.
///
/// Computed once per universe and reused by every significance evaluation.
/// Each record maps to the index of its decision class.
#[derive(Debug, Clone, Default)]
pub struct DecisionPartition<'a> {
    partition: Partition<'a>,
    label_of: HashMap<RecordId, usize>,
}

impl<'a> DecisionPartition<'a> {
    pub fn new<P, I>(partitioner: &P, records: I, decision: usize) -> Self
    where
        P: Partitioner,
        I: IntoIterator<Item = &'a Record>,
    {
        Self::from_partition(partitioner.partition(records, &AttributeSubset::single(decision)))
    }

    /// Wrap an existing partition taken under the decision attribute.
    pub fn from_partition(partition: Partition<'a>) -> Self {
        let mut label_of = HashMap::with_capacity(partition.record_count());
        for (label, class) in partition.classes().iter().enumerate() {
            for id in class.ids() {
                label_of.insert(id, label);
            }
        }
        Self {
            partition,
            label_of,
        }
    }

    pub fn partition(&self) -> &Partition<'a> {
        &self.partition
    }

    pub fn into_partition(self) -> Partition<'a> {
        self.partition
    }

    /// Number of records in the universe.
    pub fn len(&self) -> usize {
        self.label_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.label_of.is_empty()
    }

    pub fn class_count(&self) -> usize {
        self.partition.len()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.label_of.contains_key(&id)
    }

    /// Decision class index of `record`, or `None` for a record outside the
    /// universe.
    pub fn label(&self, record: &Record) -> Option<usize> {
        self.label_of.get(&record.id()).copied()
    }

    /// Whether all `members` fall into one decision class.
    ///
    /// A record outside the universe has no known decision, so any group
    /// holding one is inconsistent.
    pub fn is_consistent(&self, members: &[&Record]) -> bool {
        let mut labels = members.iter().map(|r| self.label(r));
        match labels.next() {
            None => true,
            Some(None) => false,
            Some(first) => labels.all(|label| label == first),
        }
    }
}

/// A partition split into resolved and boundary classes.
///
/// Resolved classes are decision-consistent and are never split again; they
/// keep the signature they were resolved under. Boundary classes are exact
/// classes under the current subset. Refining by one more attribute only
/// touches the boundary, so this is only a faithful stand-in for the true
/// partition under metrics where splitting a consistent class changes nothing.
#[derive(Debug, Clone)]
pub struct BoundaryPartition<'a> {
    subset: AttributeSubset,
    resolved: Vec<EquivalenceClass<'a>>,
    boundary: Vec<EquivalenceClass<'a>>,
}

impl<'a> BoundaryPartition<'a> {
    pub fn new(partition: Partition<'a>, decision: &DecisionPartition<'a>) -> Self {
        let subset = partition.subset().clone();
        let (resolved, boundary): (Vec<_>, Vec<_>) = partition
            .into_classes()
            .into_iter()
            .partition(|class| decision.is_consistent(class.members()));
        Self {
            subset,
            resolved,
            boundary,
        }
    }

    pub fn subset(&self) -> &AttributeSubset {
        &self.subset
    }

    pub fn resolved(&self) -> &[EquivalenceClass<'a>] {
        &self.resolved
    }

    pub fn boundary(&self) -> &[EquivalenceClass<'a>] {
        &self.boundary
    }

    pub fn resolved_records(&self) -> usize {
        self.resolved.iter().map(EquivalenceClass::len).sum()
    }

    pub fn boundary_records(&self) -> usize {
        self.boundary.iter().map(EquivalenceClass::len).sum()
    }

    /// All classes, resolved first.
    pub fn classes(&self) -> impl Iterator<Item = &EquivalenceClass<'a>> + '_ {
        self.resolved.iter().chain(self.boundary.iter())
    }

    /// Boundary classes split by the current subset plus `attribute`.
    pub fn split_boundary<P: Partitioner>(
        &self,
        partitioner: &P,
        attribute: usize,
    ) -> Vec<EquivalenceClass<'a>> {
        let subset = self.subset.with(attribute);
        self.boundary
            .iter()
            .flat_map(|class| {
                partitioner
                    .partition(class.members().iter().copied(), &subset)
                    .into_classes()
            })
            .collect()
    }

    /// Refine by `attribute`, moving newly consistent classes to resolved.
    pub fn refine<P: Partitioner>(
        self,
        partitioner: &P,
        attribute: usize,
        decision: &DecisionPartition<'a>,
    ) -> Self {
        let split = self.split_boundary(partitioner, attribute);
        let mut resolved = self.resolved;
        let mut boundary = Vec::new();
        for class in split {
            if decision.is_consistent(class.members()) {
                resolved.push(class);
            } else {
                boundary.push(class);
            }
        }
        Self {
            subset: self.subset.with(attribute),
            resolved,
            boundary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
            Record::new(0, vec![1, 1, 1, 0]),
            Record::new(1, vec![2, 2, 1, 1]),
            Record::new(2, vec![1, 1, 1, 0]),
            Record::new(3, vec![2, 3, 3, 0]),
        ]
    }

    fn member_ids(partition: &Partition<'_>) -> Vec<Vec<RecordId>> {
        partition
            .classes()
            .iter()
            .map(|c| c.ids().collect())
            .collect()
    }

    #[test]
    fn test_hash_partition_single_attribute() {
        let recs = records();
        let p = HashPartitioner.partition(&recs, &AttributeSubset::single(0));
        assert_eq!(member_ids(&p), vec![vec![0, 2], vec![1, 3]]);
        assert_eq!(p.classes()[0].signature().values(), &[1]);
    }

    #[test]
    fn test_sequential_matches_hash_order() {
        let recs = records();
        let subset = AttributeSubset::new([0, 1, 2]);
        let h = HashPartitioner.partition(&recs, &subset);
        let s = SequentialPartitioner.partition(&recs, &subset);
        assert_eq!(member_ids(&h), member_ids(&s));
        assert_eq!(member_ids(&h), vec![vec![0, 2], vec![1], vec![3]]);
    }

    #[test]
    fn test_empty_records_give_no_classes() {
        let recs: Vec<Record> = Vec::new();
        let p = HashPartitioner.partition(&recs, &AttributeSubset::single(0));
        assert!(p.is_empty());
        let p = SequentialPartitioner.partition(&recs, &AttributeSubset::single(0));
        assert!(p.is_empty());
    }

    #[test]
    fn test_empty_subset_gives_single_class() {
        let recs = records();
        let p = HashPartitioner.partition(&recs, &AttributeSubset::empty());
        assert_eq!(p.len(), 1);
        assert_eq!(p.record_count(), 4);
        let p = SequentialPartitioner.partition(&recs, &AttributeSubset::empty());
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn test_decision_partition_labels() {
        let recs = records();
        let d = DecisionPartition::new(&HashPartitioner, &recs, 3);
        assert_eq!(d.class_count(), 2);
        assert_eq!(d.len(), 4);
        assert_eq!(d.label(&recs[0]), d.label(&recs[3]));
        assert_ne!(d.label(&recs[0]), d.label(&recs[1]));
        assert!(d.is_consistent(&[&recs[0], &recs[2], &recs[3]]));
        assert!(!d.is_consistent(&[&recs[1], &recs[3]]));
    }

    #[test]
    fn test_foreign_records_are_never_consistent() {
        let recs = records();
        let d = DecisionPartition::new(&HashPartitioner, &recs[..2], 3);
        let foreign = [Record::new(10, vec![1, 1, 1, 0]), Record::new(11, vec![1, 1, 1, 1])];

        assert_eq!(d.label(&recs[0]), Some(0));
        assert_eq!(d.label(&foreign[0]), None);
        assert!(!d.is_consistent(&[&foreign[0], &foreign[1]]));
        assert!(!d.is_consistent(&[&foreign[0]]));
        assert!(!d.is_consistent(&[&recs[0], &foreign[0]]));
        assert!(d.is_consistent(&[]));
    }

    #[test]
    fn test_boundary_refine_resolves_classes() {
        let recs = records();
        let d = DecisionPartition::new(&HashPartitioner, &recs, 3);
        let p = HashPartitioner.partition(&recs, &AttributeSubset::single(0));
        let b = BoundaryPartition::new(p, &d);
        assert_eq!(b.resolved_records(), 2);
        assert_eq!(b.boundary_records(), 2);

        let b = b.refine(&HashPartitioner, 1, &d);
        assert_eq!(b.subset().as_slice(), &[0, 1]);
        assert_eq!(b.resolved_records(), 4);
        assert!(b.boundary().is_empty());
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "Sequential".parse::<PartitionStrategy>().unwrap(),
            PartitionStrategy::Sequential
        );
        assert!("tree".parse::<PartitionStrategy>().is_err());
    }
}

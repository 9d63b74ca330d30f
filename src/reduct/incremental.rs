//! Incremental merging of previous and newly arrived partitions
//!
//! When records arrive in batches, only the new batch is partitioned; its
//! classes are then joined with the retained classes of earlier batches by
//! signature. A merged class holding both earlier and new records is
//! *mixed*; the number of mixed classes tells streaming callers whether the
//! new batch touched existing structure at all.

use std::collections::HashMap;

use serde::Serialize;

use super::error::{EngineResult, ReductError};
use super::partition::{EquivalenceClass, Partition};
use super::record::{AttributeSubset, Record, Signature};

/// Where the members of a merged class came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Previous,
    New,
    Mixed,
}

/// Merged class tracking previous and new members separately.
#[derive(Debug, Clone)]
pub struct MixedEquivalenceClass<'a> {
    signature: Signature,
    previous: Vec<&'a Record>,
    new: Vec<&'a Record>,
}

impl<'a> MixedEquivalenceClass<'a> {
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn previous(&self) -> &[&'a Record] {
        &self.previous
    }

    pub fn new_records(&self) -> &[&'a Record] {
        &self.new
    }

    pub fn previous_count(&self) -> usize {
        self.previous.len()
    }

    pub fn new_count(&self) -> usize {
        self.new.len()
    }

    pub fn total(&self) -> usize {
        self.previous.len() + self.new.len()
    }

    pub fn is_mixed(&self) -> bool {
        !self.previous.is_empty() && !self.new.is_empty()
    }

    pub fn kind(&self) -> ClassKind {
        match (self.previous.is_empty(), self.new.is_empty()) {
            (false, false) => ClassKind::Mixed,
            (false, true) => ClassKind::Previous,
            _ => ClassKind::New,
        }
    }

    /// Plain class with previous members first.
    pub fn into_class(self) -> EquivalenceClass<'a> {
        let mut members = self.previous;
        members.extend(self.new);
        EquivalenceClass::new(self.signature, members)
    }
}

/// Result of merging two partitions taken under the same subset.
#[derive(Debug, Clone)]
pub struct MixedPartition<'a> {
    subset: AttributeSubset,
    classes: Vec<MixedEquivalenceClass<'a>>,
    mixed_count: usize,
}

impl<'a> MixedPartition<'a> {
    pub fn subset(&self) -> &AttributeSubset {
        &self.subset
    }

    pub fn classes(&self) -> &[MixedEquivalenceClass<'a>] {
        &self.classes
    }

    /// Number of classes holding both previous and new records.
    pub fn mixed_count(&self) -> usize {
        self.mixed_count
    }

    pub fn count_of(&self, kind: ClassKind) -> usize {
        self.classes.iter().filter(|c| c.kind() == kind).count()
    }

    pub fn record_count(&self) -> usize {
        self.classes.iter().map(MixedEquivalenceClass::total).sum()
    }

    /// Forget the previous/new split.
    pub fn into_partition(self) -> Partition<'a> {
        let classes = self
            .classes
            .into_iter()
            .map(MixedEquivalenceClass::into_class)
            .collect();
        Partition::new(self.subset, classes)
    }
}

/// Join `previous` and `new` classes that share a signature.
///
/// Previous classes keep their order; new-only classes follow in their own
/// order. Fails when the two partitions were taken under different subsets.
pub fn merge<'a>(previous: Partition<'a>, new: Partition<'a>) -> EngineResult<MixedPartition<'a>> {
    if previous.subset() != new.subset() {
        return Err(ReductError::SubsetMismatch {
            previous: previous.subset().as_slice().to_vec(),
            new: new.subset().as_slice().to_vec(),
        });
    }
    let subset = previous.subset().clone();

    let mut index: HashMap<Signature, usize> = HashMap::with_capacity(previous.len() + new.len());
    let mut classes: Vec<MixedEquivalenceClass<'a>> = Vec::with_capacity(previous.len());

    for class in previous.into_classes() {
        let (signature, members) = class.into_parts();
        index.insert(signature.clone(), classes.len());
        classes.push(MixedEquivalenceClass {
            signature,
            previous: members,
            new: Vec::new(),
        });
    }

    for class in new.into_classes() {
        let (signature, members) = class.into_parts();
        match index.get(&signature) {
            Some(&slot) => classes[slot].new.extend(members),
            None => {
                index.insert(signature.clone(), classes.len());
                classes.push(MixedEquivalenceClass {
                    signature,
                    previous: Vec::new(),
                    new: members,
                });
            }
        }
    }

    let mixed_count = classes.iter().filter(|c| c.is_mixed()).count();
    Ok(MixedPartition {
        subset,
        classes,
        mixed_count,
    })
}

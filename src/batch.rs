//! Contribution batches: one fragment's subject → records mapping.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One fragment's contribution: an insertion-ordered map from subject key
/// (a library or module name) to the records listed under it.
///
/// Records are opaque to the registry. Record order within a subject and
/// subject order within the batch are kept exactly as inserted.
///
/// # Examples
///
/// ```rust
/// use xref_registry::ContributionBatch;
///
/// let batch = ContributionBatch::new()
///     .with_subject("winit", vec!["impl Clone for ControlFlow", "impl Debug for ControlFlow"]);
///
/// assert_eq!(batch.records("winit").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributionBatch<R> {
    subjects: IndexMap<String, Vec<R>>,
}

impl<R> ContributionBatch<R> {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self {
            subjects: IndexMap::new(),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_subject(mut self, subject: impl Into<String>, records: Vec<R>) -> Self {
        self.insert(subject, records);
        self
    }

    /// Set the records for `subject`, returning the previous list if the key was present.
    ///
    /// Keys are unique within a batch; re-inserting keeps the key's original position.
    pub fn insert(&mut self, subject: impl Into<String>, records: Vec<R>) -> Option<Vec<R>> {
        self.subjects.insert(subject.into(), records)
    }

    /// Records listed under `subject`, in insertion order.
    pub fn records(&self, subject: &str) -> Option<&[R]> {
        self.subjects.get(subject).map(Vec::as_slice)
    }

    /// Subject keys in insertion order.
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.subjects.keys().map(String::as_str)
    }

    /// `(subject, records)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[R])> {
        self.subjects
            .iter()
            .map(|(subject, records)| (subject.as_str(), records.as_slice()))
    }

    /// Number of subject keys.
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Whether the batch lists no subjects at all.
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Total number of records across all subjects.
    pub fn record_count(&self) -> usize {
        self.subjects.values().map(Vec::len).sum()
    }
}

impl<R> Default for ContributionBatch<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> IntoIterator for ContributionBatch<R> {
    type Item = (String, Vec<R>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.subjects.into_iter()
    }
}

impl<R, K: Into<String>> FromIterator<(K, Vec<R>)> for ContributionBatch<R> {
    fn from_iter<I: IntoIterator<Item = (K, Vec<R>)>>(iter: I) -> Self {
        let mut batch = Self::new();
        for (subject, records) in iter {
            batch.insert(subject, records);
        }
        batch
    }
}

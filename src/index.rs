//! A consumer that merges delivered batches into one cross-reference index.
//!
//! The registry hands over batches as-is; a subject contributed by several
//! fragments arrives once per batch. [`MergedIndex`] concatenates those lists.

use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;

use crate::{Consumer, ContributionBatch, DeliveryError};

/// All records seen so far, grouped by subject.
///
/// Subjects keep the order in which they were first delivered. Records for a
/// subject are appended batch by batch, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedIndex<R> {
    subjects: IndexMap<String, Vec<R>>,
    batches: usize,
}

impl<R> MergedIndex<R> {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            subjects: IndexMap::new(),
            batches: 0,
        }
    }

    /// Merge one batch into the index.
    pub fn absorb(&mut self, batch: ContributionBatch<R>) {
        for (subject, records) in batch {
            self.subjects.entry(subject).or_default().extend(records);
        }
        self.batches += 1;
    }

    /// Every record delivered for `subject` so far, in delivery order.
    pub fn records(&self, subject: &str) -> Option<&[R]> {
        self.subjects.get(subject).map(Vec::as_slice)
    }

    /// Subjects in the order they were first delivered.
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.subjects.keys().map(String::as_str)
    }

    /// Number of distinct subjects.
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Whether no subject has been delivered yet.
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Number of batches absorbed.
    pub fn batches(&self) -> usize {
        self.batches
    }
}

impl<R> Default for MergedIndex<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Consumer<R> for MergedIndex<R> {
    fn deliver(&mut self, batch: ContributionBatch<R>) -> Result<(), DeliveryError> {
        self.absorb(batch);
        Ok(())
    }
}

/// A cloneable handle to a [`MergedIndex`].
///
/// Install one clone into a registry and keep another to query the index.
///
/// # Examples
///
/// ```
/// use xref_registry::{ContributionBatch, Registry, SharedIndex};
///
/// let registry = Registry::new();
/// registry.submit(ContributionBatch::new().with_subject("winit", vec!["impl Clone for Event"])).unwrap();
///
/// let index = SharedIndex::new();
/// registry.install(index.clone()).unwrap();
/// registry.submit(ContributionBatch::new().with_subject("winit", vec!["impl Debug for Event"])).unwrap();
///
/// assert_eq!(
///     index.records("winit"),
///     Some(vec!["impl Clone for Event", "impl Debug for Event"])
/// );
/// ```
pub struct SharedIndex<R> {
    inner: Arc<Mutex<MergedIndex<R>>>,
}

impl<R> SharedIndex<R> {
    /// Create a handle to a new, empty index.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MergedIndex::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MergedIndex<R>> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Run `f` against the current index.
    ///
    /// # Lock Poisoning Recovery
    ///
    /// If a previous holder of the lock panicked, the index is used as it was left;
    /// `absorb` only ever appends.
    pub fn with<T>(&self, f: impl FnOnce(&MergedIndex<R>) -> T) -> T {
        f(&*self.lock())
    }

    /// Number of distinct subjects.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no subject has been delivered yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Owned copy of the subject keys, in first-delivery order.
    pub fn subjects(&self) -> Vec<String> {
        self.lock().subjects().map(str::to_owned).collect()
    }
}

impl<R: Clone> SharedIndex<R> {
    /// Clone of the records listed under `subject`.
    pub fn records(&self, subject: &str) -> Option<Vec<R>> {
        self.lock().records(subject).map(<[R]>::to_vec)
    }

    /// Clone of the whole index.
    pub fn snapshot(&self) -> MergedIndex<R> {
        self.lock().clone()
    }
}

impl<R> Clone for SharedIndex<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> Default for SharedIndex<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for SharedIndex<R>
where
    R: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedIndex").field(&*self.lock()).finish()
    }
}

impl<R> Consumer<R> for SharedIndex<R> {
    fn deliver(&mut self, batch: ContributionBatch<R>) -> Result<(), DeliveryError> {
        self.lock().absorb(batch);
        Ok(())
    }
}

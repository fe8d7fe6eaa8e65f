//! Decoding fragment payloads into contribution batches.
//!
//! A fragment carries a JSON object whose keys are subject names and whose values
//! are arrays of records, e.g. `{"winit": ["impl Clone for ControlFlow", ...]}`.
//! Key order and record order are kept as written.

use serde::de::DeserializeOwned;

use crate::{ContributionBatch, Registry, RegistryError};

/// Parse a fragment payload.
///
/// A key repeated inside one payload keeps its first position and its last value.
///
/// # Errors
///
/// [`RegistryError::MalformedFragment`] if the payload is not a JSON object of arrays,
/// or a record does not deserialize into `R`.
///
/// # Examples
///
/// ```
/// use xref_registry::fragment::parse_fragment;
///
/// let batch = parse_fragment::<String>(r#"{"lib1": ["r1", "r2"], "lib2": ["r3"]}"#).unwrap();
/// assert_eq!(batch.subjects().collect::<Vec<_>>(), ["lib1", "lib2"]);
/// assert_eq!(batch.records("lib1").unwrap(), ["r1", "r2"]);
/// ```
pub fn parse_fragment<R: DeserializeOwned>(
    payload: &str,
) -> Result<ContributionBatch<R>, RegistryError> {
    let batch: ContributionBatch<R> = serde_json::from_str(payload)?;

    tracing::trace!(
        subjects = batch.len(),
        records = batch.record_count(),
        "Fragment parsed"
    );

    Ok(batch)
}

impl<R: DeserializeOwned> Registry<R> {
    /// Parse a fragment payload and submit it.
    ///
    /// Nothing is submitted when parsing fails.
    pub fn submit_fragment(&self, payload: &str) -> Result<(), RegistryError> {
        let batch = parse_fragment(payload)?;
        self.submit(batch)
    }
}

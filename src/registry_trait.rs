//! Core trait for process-wide registries.
//!
//! This module provides the `RegistryApi` trait with default implementations that
//! forward to a `'static` [`Registry`]. Implementors only supply the accessor; the
//! [`define_registry!`](crate::define_registry) macro generates one.

use crate::{
    Consumer, ContributionBatch, Registry, RegistryError, RegistryEvent, RegistryStateKind,
    RegistryStats,
};

/// Access to a registry that lives for the whole process.
///
/// Fragment loaders and the consumer installer can be written against
/// `impl RegistryApi<Record = R>` instead of naming a particular static.
pub trait RegistryApi {
    /// Record payload carried by the registry.
    type Record: Send + 'static;

    /// Access the registry static.
    ///
    /// This method must be implemented to provide access to the process-wide registry.
    fn registry() -> &'static Registry<Self::Record>;

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback for registry operations.
    fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        Self::registry().set_trace_callback(callback);
    }

    /// Clear the tracing callback.
    fn clear_trace_callback(&self) {
        Self::registry().clear_trace_callback();
    }

    // -------------------------------------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------------------------------------

    /// Submit one fragment's contribution. See [`Registry::submit`].
    fn submit(&self, batch: ContributionBatch<Self::Record>) -> Result<(), RegistryError> {
        Self::registry().submit(batch)
    }

    /// Install the delivery target. See [`Registry::install`].
    fn install<C>(&self, consumer: C) -> Result<(), RegistryError>
    where
        C: Consumer<Self::Record> + Send + 'static,
    {
        Self::registry().install(consumer)
    }

    fn state_kind(&self) -> RegistryStateKind {
        Self::registry().state_kind()
    }

    fn is_installed(&self) -> bool {
        Self::registry().is_installed()
    }

    fn pending_len(&self) -> usize {
        Self::registry().pending_len()
    }

    fn stats(&self) -> RegistryStats {
        Self::registry().stats()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

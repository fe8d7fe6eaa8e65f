//! Macros for declaring process-wide registries.

/// Declares a process-wide, lazily initialized registry in its own module.
///
/// The macro generates a module containing:
/// - A `LazyLock<Registry<R>>` static (hidden)
/// - An `Api` struct implementing `RegistryApi`, plus an `API` constant
/// - Free functions (`submit`, `install`, `pending_len`, ...) that delegate to `API`
///
/// The record type and the optional config expression are resolved inside the generated
/// module, which glob-imports its parent module. Items local to a function body are not
/// visible there; use full paths or module-level types.
///
/// # Examples
///
/// ```rust
/// use xref_registry::{define_registry, ContributionBatch, DeliveryError};
///
/// define_registry!(implementors, String);
///
/// // Fragments may load before the viewer is ready.
/// implementors::submit(
///     ContributionBatch::new().with_subject("winit", vec!["impl Debug for Event".to_string()]),
/// )
/// .unwrap();
/// assert_eq!(implementors::pending_len(), 1);
///
/// implementors::install(|batch: ContributionBatch<String>| -> Result<(), DeliveryError> {
///     assert!(batch.records("winit").is_some());
///     Ok(())
/// })
/// .unwrap();
/// assert!(implementors::is_installed());
/// ```
///
/// # Custom configuration
///
/// ```rust
/// use xref_registry::{define_registry, ReinstallPolicy};
///
/// define_registry!(
///     strict,
///     String,
///     xref_registry::RegistryConfig::default().reinstall(xref_registry::ReinstallPolicy::Reject)
/// );
///
/// assert_eq!(strict::registry().config().reinstall, ReinstallPolicy::Reject);
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident, $record:ty) => {
        $crate::define_registry!($name, $record, $crate::RegistryConfig::default());
    };
    ($name:ident, $record:ty, $config:expr) => {
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;

            use std::sync::LazyLock;

            // Registry storage (module-private)
            static REGISTRY: LazyLock<$crate::Registry<$record>> =
                LazyLock::new(|| $crate::Registry::with_config($config));

            /// Zero-sized type that implements the registry API.
            pub struct Api;

            impl $crate::RegistryApi for Api {
                type Record = $record;

                fn registry() -> &'static $crate::Registry<$record> {
                    &REGISTRY
                }
            }

            /// Convenient constant for accessing the registry API.
            pub const API: Api = Api;

            /// The underlying registry.
            pub fn registry() -> &'static $crate::Registry<$record> {
                &REGISTRY
            }

            /// Submit one fragment's contribution.
            pub fn submit(
                batch: $crate::ContributionBatch<$record>,
            ) -> Result<(), $crate::RegistryError> {
                use $crate::RegistryApi;
                API.submit(batch)
            }

            /// Install the consumer that receives every batch.
            pub fn install<C>(consumer: C) -> Result<(), $crate::RegistryError>
            where
                C: $crate::Consumer<$record> + Send + 'static,
            {
                use $crate::RegistryApi;
                API.install(consumer)
            }

            /// Whether a consumer has been installed.
            pub fn is_installed() -> bool {
                use $crate::RegistryApi;
                API.is_installed()
            }

            /// Number of batches waiting for a consumer.
            pub fn pending_len() -> usize {
                use $crate::RegistryApi;
                API.pending_len()
            }

            /// Submission and delivery counters.
            pub fn stats() -> $crate::RegistryStats {
                use $crate::RegistryApi;
                API.stats()
            }

            /// Set a tracing callback for registry operations.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::RegistryEvent) + Send + Sync + 'static,
            ) {
                use $crate::RegistryApi;
                API.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                use $crate::RegistryApi;
                API.clear_trace_callback()
            }
        }
    };
}

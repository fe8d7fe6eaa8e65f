//! # xref-registry
//!
//! An order-independent registry for cross-reference fragments, such as the
//! per-library implementor lists of a generated documentation index.
//!
//! Fragments load independently and in any order. Each one submits a
//! [`ContributionBatch`] (subject key → ordered records). A viewer installs one
//! [`Consumer`]. Batches that arrived first are queued and drained into the
//! consumer on install, in submission order; batches that arrive later are
//! delivered immediately. Every batch is delivered exactly once.
//!
//! ## Quick Start
//!
//! ```rust
//! use xref_registry::{ContributionBatch, Registry, SharedIndex};
//!
//! let registry = Registry::new();
//!
//! // A fragment loads before the viewer.
//! registry
//!     .submit(ContributionBatch::new().with_subject("lib1", vec!["r1", "r2"]))
//!     .unwrap();
//!
//! // The viewer installs its consumer and receives the queued batch.
//! let index = SharedIndex::new();
//! registry.install(index.clone()).unwrap();
//!
//! // Later fragments go straight through.
//! registry
//!     .submit(ContributionBatch::new().with_subject("lib2", vec!["r3"]))
//!     .unwrap();
//!
//! assert_eq!(index.records("lib1"), Some(vec!["r1", "r2"]));
//! assert_eq!(index.records("lib2"), Some(vec!["r3"]));
//! ```
//!
//! ## Features
//!
//! - **Order-independent**: fragments may load before or after the consumer
//! - **Exactly-once delivery**: nothing is replayed, nothing is dropped
//! - **Opaque records**: the record type is a generic parameter
//! - **Process-wide registries**: [`define_registry!`] declares a lazily initialized static
//! - **Tracing support**: a callback hook for [`RegistryEvent`]s plus `tracing` logs
//!
//! ## Main Types
//!
//! - [`Registry`] - buffers batches and delivers them to the installed consumer
//! - [`ContributionBatch`] - one fragment's subject → records mapping
//! - [`Consumer`] - the delivery target; any matching closure qualifies
//! - [`MergedIndex`] / [`SharedIndex`] - a consumer that merges subjects across batches
//! - [`fragment::parse_fragment`] - decode a JSON fragment payload

mod batch;
mod config;
mod consumer;
pub mod fragment;
mod index;
mod macros;
mod registry;
mod registry_error;
mod registry_event;
mod registry_trait;

pub use batch::ContributionBatch;
pub use config::{RegistryConfig, ReinstallPolicy};
pub use consumer::Consumer;
pub use index::{MergedIndex, SharedIndex};
pub use registry::{BoxedConsumer, Registry, RegistryStateKind, RegistryStats, TraceCallback};
pub use registry_error::{DeliveryError, RegistryError};
pub use registry_event::RegistryEvent;
pub use registry_trait::RegistryApi;

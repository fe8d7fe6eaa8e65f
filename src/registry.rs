//! The contribution registry.
//!
//! A [`Registry`] accepts [`ContributionBatch`]es from any number of independently
//! loaded fragments and hands each one to a single installed [`Consumer`] exactly once,
//! no matter whether the fragment arrived before or after the consumer.
//!
//! # Examples
//!
//! ```
//! use xref_registry::{ContributionBatch, DeliveryError, Registry};
//! use std::sync::{Arc, Mutex};
//!
//! let registry: Registry<String> = Registry::new();
//!
//! // A fragment loads before the viewer is ready: the batch is buffered.
//! registry
//!     .submit(ContributionBatch::new().with_subject("lib1", vec!["r1".into()]))
//!     .unwrap();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! registry
//!     .install(move |batch: ContributionBatch<String>| -> Result<(), DeliveryError> {
//!         sink.lock().unwrap().push(batch);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(seen.lock().unwrap().len(), 1);
//! assert_eq!(registry.pending_len(), 0);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    Consumer, ContributionBatch, RegistryConfig, RegistryError, RegistryEvent, ReinstallPolicy,
};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` after every registry
/// operation. It must be thread-safe because a registry may be shared globally.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// A consumer boxed for storage inside the registry.
pub type BoxedConsumer<R> = Box<dyn Consumer<R> + Send>;

/// Lifecycle of a registry. The only transition is
/// `AwaitingConsumer -> ConsumerInstalled`, taken by the first successful `install`.
enum RegistryState<R> {
    AwaitingConsumer {
        pending: VecDeque<ContributionBatch<R>>,
    },
    ConsumerInstalled {
        consumer: BoxedConsumer<R>,
    },
}

/// Which side of the lifecycle a registry is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryStateKind {
    AwaitingConsumer,
    ConsumerInstalled,
}

/// Counters describing what a registry has seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Batches accepted by `submit`
    pub submitted: u64,
    /// Batches handed to a consumer (including calls that returned an error)
    pub delivered: u64,
    /// Batches still waiting for a consumer
    pub pending: usize,
}

struct Inner<R> {
    state: RegistryState<R>,
    submitted: u64,
    delivered: u64,
}

/// Buffers contribution batches until a consumer is installed, then delivers
/// every batch to it exactly once.
///
/// All operations take `&self`; the registry is `Sync` and can be shared across
/// fragment loaders by reference, in an `Arc`, or as a `static` through
/// [`define_registry!`](crate::define_registry).
///
/// Each `submit` and `install` runs as one step under a single lock, consumer calls
/// included, so batches reach the consumer in submission order and the drain on
/// `install` completes before any later `submit` is delivered.
pub struct Registry<R> {
    inner: Mutex<Inner<R>>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
    config: RegistryConfig,
}

impl<R> Registry<R> {
    /// Create a registry with the default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: RegistryState::AwaitingConsumer {
                    pending: VecDeque::new(),
                },
                submitted: 0,
                delivered: 0,
            }),
            trace: Mutex::new(None),
            config,
        }
    }

    /// The configuration this registry was created with
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ---------------------------------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------------------------------

    /// Set a tracing callback for registry operations.
    ///
    /// Events are emitted after the operation has released the state lock, so the
    /// callback may read [`stats`](Self::stats) or submit to this registry.
    ///
    /// If a consumer panics, the events of that operation are not emitted, including
    /// the `Delivered` event of the batch it panicked on. [`stats`](Self::stats)
    /// still counts that batch.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    fn emit_events(&self, events: &[RegistryEvent]) {
        if events.is_empty() {
            return;
        }

        let callback = self
            .trace
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();

        if let Some(callback) = callback {
            for event in events {
                callback(event);
            }
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------------------------------

    // A consumer that panicked mid-delivery poisons the lock. The state is still
    // consistent at that point: drained batches are popped one at a time and the
    // consumer is only stored once the queue is empty.
    fn lock_inner(&self) -> MutexGuard<'_, Inner<R>> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Submit one fragment's contribution.
    ///
    /// With a consumer installed the batch is delivered synchronously; otherwise it
    /// is appended to the pending queue. Batch contents are never inspected.
    ///
    /// # Errors
    ///
    /// Only [`RegistryError::Delivery`], when the installed consumer rejects the batch.
    /// The batch still counts as delivered and the consumer stays installed.
    ///
    /// # Panics
    ///
    /// A panic in the consumer propagates to the caller. The consumer stays
    /// installed and later batches are still delivered to it.
    pub fn submit(&self, batch: ContributionBatch<R>) -> Result<(), RegistryError> {
        let mut events = Vec::with_capacity(1);
        let result = {
            let mut guard = self.lock_inner();
            self.submit_locked(&mut guard, batch, &mut events)
        };

        self.emit_events(&events);
        result
    }

    fn submit_locked(
        &self,
        inner: &mut Inner<R>,
        batch: ContributionBatch<R>,
        events: &mut Vec<RegistryEvent>,
    ) -> Result<(), RegistryError> {
        let subjects = batch.len();
        inner.submitted += 1;

        match &mut inner.state {
            RegistryState::ConsumerInstalled { consumer } => {
                inner.delivered += 1;
                events.push(RegistryEvent::Delivered {
                    subjects,
                    from_queue: false,
                });
                tracing::debug!(subjects = subjects, "Batch delivered to installed consumer");

                consumer.deliver(batch).map_err(|source| {
                    tracing::warn!(subjects = subjects, error = %source, "Consumer rejected batch");
                    RegistryError::delivery(source)
                })
            }
            RegistryState::AwaitingConsumer { pending } => {
                pending.push_back(batch);
                let pending_len = pending.len();

                events.push(RegistryEvent::Queued {
                    subjects,
                    pending: pending_len,
                });
                tracing::debug!(
                    subjects = subjects,
                    pending = pending_len,
                    "Batch queued, no consumer installed"
                );

                if self.config.pending_warn_threshold == Some(pending_len) {
                    tracing::warn!(
                        pending = pending_len,
                        "Pending queue reached warning threshold, is a consumer ever installed?"
                    );
                }

                Ok(())
            }
        }
    }

    /// Install the consumer that receives every batch.
    ///
    /// Queued batches are delivered first, in submission order, and the queue is
    /// cleared. The consumer then receives each later `submit` immediately.
    ///
    /// With a consumer already installed, [`ReinstallPolicy::Replace`] swaps in the new
    /// one without re-delivering anything, and [`ReinstallPolicy::Reject`] fails.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::ConsumerAlreadyInstalled`] under `ReinstallPolicy::Reject`
    /// - [`RegistryError::Delivery`] if the consumer fails while draining the queue.
    ///   The failing batch counts as delivered, the rest stay queued, the consumer is
    ///   dropped and the registry keeps waiting for another `install`.
    ///
    /// # Panics
    ///
    /// A panic in the consumer propagates to the caller. Batches delivered before
    /// the panic, and the one it panicked on, are gone from the queue; the rest stay
    /// queued and the registry keeps waiting for another `install`. No trace events
    /// are emitted for the interrupted install.
    pub fn install<C>(&self, consumer: C) -> Result<(), RegistryError>
    where
        C: Consumer<R> + Send + 'static,
    {
        self.install_boxed(Box::new(consumer))
    }

    /// [`install`](Self::install) for an already boxed consumer.
    pub fn install_boxed(&self, consumer: BoxedConsumer<R>) -> Result<(), RegistryError> {
        let mut events = Vec::new();
        let result = {
            let mut guard = self.lock_inner();
            self.install_locked(&mut guard, consumer, &mut events)
        };

        self.emit_events(&events);
        result
    }

    fn install_locked(
        &self,
        inner: &mut Inner<R>,
        mut consumer: BoxedConsumer<R>,
        events: &mut Vec<RegistryEvent>,
    ) -> Result<(), RegistryError> {
        let pending = match &mut inner.state {
            RegistryState::ConsumerInstalled { consumer: active } => {
                return match self.config.reinstall {
                    ReinstallPolicy::Replace => {
                        *active = consumer;
                        events.push(RegistryEvent::Installed {
                            drained: 0,
                            replaced: true,
                        });
                        tracing::info!("Consumer replaced, delivered batches are not replayed");
                        Ok(())
                    }
                    ReinstallPolicy::Reject => {
                        events.push(RegistryEvent::InstallRejected);
                        tracing::warn!("Consumer already installed, install rejected");
                        Err(RegistryError::ConsumerAlreadyInstalled)
                    }
                };
            }
            RegistryState::AwaitingConsumer { pending } => pending,
        };

        let mut drained = 0usize;
        while let Some(batch) = pending.pop_front() {
            drained += 1;
            inner.delivered += 1;
            events.push(RegistryEvent::Delivered {
                subjects: batch.len(),
                from_queue: true,
            });

            if let Err(source) = consumer.deliver(batch) {
                tracing::warn!(
                    drained = drained,
                    remaining = pending.len(),
                    error = %source,
                    "Consumer failed while draining, remaining batches stay queued"
                );
                return Err(RegistryError::delivery(source));
            }
        }

        inner.state = RegistryState::ConsumerInstalled { consumer };
        events.push(RegistryEvent::Installed {
            drained,
            replaced: false,
        });
        tracing::info!(drained = drained, "Consumer installed");

        Ok(())
    }

    // ---------------------------------------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------------------------------------

    /// Which side of the lifecycle the registry is on.
    ///
    /// # Lock Poisoning Recovery
    ///
    /// A consumer that panicked poisons the state lock; the state is read anyway,
    /// since a panicking delivery never leaves it half-updated.
    pub fn state_kind(&self) -> RegistryStateKind {
        match self.lock_inner().state {
            RegistryState::AwaitingConsumer { .. } => RegistryStateKind::AwaitingConsumer,
            RegistryState::ConsumerInstalled { .. } => RegistryStateKind::ConsumerInstalled,
        }
    }

    /// Whether a consumer is currently installed.
    pub fn is_installed(&self) -> bool {
        self.state_kind() == RegistryStateKind::ConsumerInstalled
    }

    /// Number of batches waiting for a consumer. Always zero once one is installed.
    pub fn pending_len(&self) -> usize {
        match &self.lock_inner().state {
            RegistryState::AwaitingConsumer { pending } => pending.len(),
            RegistryState::ConsumerInstalled { .. } => 0,
        }
    }

    /// Snapshot of the submit and delivery counters.
    ///
    /// A batch whose consumer call failed or panicked still counts as delivered.
    pub fn stats(&self) -> RegistryStats {
        let inner = self.lock_inner();
        let pending = match &inner.state {
            RegistryState::AwaitingConsumer { pending } => pending.len(),
            RegistryState::ConsumerInstalled { .. } => 0,
        };

        RegistryStats {
            submitted: inner.submitted,
            delivered: inner.delivered,
            pending,
        }
    }
}

impl<R> Default for Registry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Registry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("state", &self.state_kind())
            .field("stats", &self.stats())
            .field("config", &self.config)
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

/// Events emitted by the registry during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use xref_registry::RegistryEvent;
///
/// let event = RegistryEvent::Queued { subjects: 1, pending: 3 };
/// println!("{}", event);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A batch arrived before any consumer and was buffered.
    Queued {
        /// Number of subject keys in the batch
        subjects: usize,
        /// Queue length after the batch was appended
        pending: usize,
    },

    /// A batch was handed to the installed consumer.
    Delivered {
        /// Number of subject keys in the batch
        subjects: usize,
        /// Whether the batch came out of the pending queue
        from_queue: bool,
    },

    /// A consumer became the active delivery target.
    Installed {
        /// Number of queued batches drained into it
        drained: usize,
        /// Whether a previous consumer was replaced
        replaced: bool,
    },

    /// A second consumer was refused.
    InstallRejected,
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Queued { subjects, pending } => {
                write!(f, "queued {{ subjects: {subjects}, pending: {pending} }}")
            }
            RegistryEvent::Delivered {
                subjects,
                from_queue,
            } => {
                write!(
                    f,
                    "delivered {{ subjects: {subjects}, from_queue: {from_queue} }}"
                )
            }
            RegistryEvent::Installed { drained, replaced } => {
                write!(f, "installed {{ drained: {drained}, replaced: {replaced} }}")
            }
            RegistryEvent::InstallRejected => write!(f, "install rejected"),
        }
    }
}

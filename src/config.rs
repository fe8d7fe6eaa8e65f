//! Registry configuration

/// What `install` does when a consumer is already active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReinstallPolicy {
    /// The new consumer takes over future deliveries. Batches already delivered
    /// to the old consumer are not re-delivered.
    #[default]
    Replace,
    /// `install` fails with [`RegistryError::ConsumerAlreadyInstalled`](crate::RegistryError::ConsumerAlreadyInstalled)
    /// and the current consumer stays in place.
    Reject,
}

/// Registry configuration options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Behavior of a second `install`
    pub reinstall: ReinstallPolicy,

    /// Log a warning when the pending queue reaches this many batches (None = never).
    ///
    /// Buffering is unbounded; this only makes a missing consumer visible.
    pub pending_warn_threshold: Option<usize>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            reinstall: ReinstallPolicy::Replace,
            pending_warn_threshold: Some(1024),
        }
    }
}

impl RegistryConfig {
    /// Set the re-install policy
    pub fn reinstall(mut self, policy: ReinstallPolicy) -> Self {
        self.reinstall = policy;
        self
    }

    /// Set the pending queue warning threshold
    pub fn pending_warn_threshold(mut self, threshold: Option<usize>) -> Self {
        self.pending_warn_threshold = threshold;
        self
    }
}

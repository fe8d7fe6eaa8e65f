use thiserror::Error;

/// Error returned by a [`Consumer`](crate::Consumer) that could not accept a batch.
pub type DeliveryError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// `install` was called on a registry configured with [`ReinstallPolicy::Reject`](crate::ReinstallPolicy::Reject)
    /// while a consumer was already active.
    #[error("a consumer is already installed in the registry")]
    ConsumerAlreadyInstalled,

    /// The installed consumer failed while handling a batch.
    #[error("consumer failed to accept a batch: {source}")]
    Delivery {
        #[source]
        source: DeliveryError,
    },

    /// A fragment payload was not a JSON object of subject → record list.
    #[error("malformed fragment payload: {0}")]
    MalformedFragment(#[from] serde_json::Error),
}

impl RegistryError {
    pub(crate) fn delivery(source: DeliveryError) -> Self {
        RegistryError::Delivery { source }
    }
}

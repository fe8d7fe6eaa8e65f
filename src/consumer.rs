//! The delivery target installed into a registry.

use crate::{ContributionBatch, DeliveryError};

/// Receives each contribution batch exactly once.
///
/// Any `FnMut(ContributionBatch<R>) -> Result<(), DeliveryError>` closure is a consumer.
/// An error is returned unchanged to whoever called `submit` or `install`; the registry
/// never retries a batch.
///
/// # Safety Restrictions
///
/// `deliver` runs while the registry's state lock is held. It must NOT call back into
/// the same registry, as this will deadlock.
pub trait Consumer<R> {
    fn deliver(&mut self, batch: ContributionBatch<R>) -> Result<(), DeliveryError>;
}

impl<R, F> Consumer<R> for F
where
    F: FnMut(ContributionBatch<R>) -> Result<(), DeliveryError>,
{
    fn deliver(&mut self, batch: ContributionBatch<R>) -> Result<(), DeliveryError> {
        self(batch)
    }
}

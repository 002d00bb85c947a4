//! Contracts implemented by consumers of the persistence lifecycle.
//!
//! - [`GameData`] - the aggregate holding all persistable state
//! - [`Participant`] - an object owning one fragment of that aggregate
//! - [`StorageBackend`] - reads and writes the aggregate somewhere durable

use crate::error::BackendError;

/// The single aggregate value holding all persistable state for a session.
///
/// Fields are entirely consumer-defined. The manager only asks whether the
/// aggregate is internally consistent. Aggregates own their data (`'static`).
pub trait GameData: 'static {
    /// Returns true when the aggregate is internally consistent.
    fn is_valid(&self) -> bool;
}

/// An object that owns one fragment of the shared aggregate.
///
/// Every method is called synchronously during a fan-out, in registration
/// order. A participant must only touch its own fragment of `data`; the
/// manager does not enforce this. None of these calls can fail: normal
/// absence of data is handled by the participant itself.
pub trait Participant<D> {
    /// Populate this participant's fragment into a freshly built aggregate.
    fn create(&mut self, data: &mut D);

    /// Pull this participant's fragment out of a loaded aggregate.
    fn load(&mut self, data: &D);

    /// Write the current in-memory fragment into the aggregate.
    fn save(&mut self, data: &mut D);

    /// Reset the in-memory fragment to its empty state.
    fn clear(&mut self, data: &D);
}

/// Persists and restores the aggregate.
pub trait StorageBackend<D> {
    /// Read the persisted aggregate.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet, and an error
    /// when stored data exists but cannot be decoded.
    fn load(&mut self) -> Result<Option<D>, BackendError>;

    /// Persist the aggregate.
    fn save(&mut self, data: &D) -> Result<(), BackendError>;
}

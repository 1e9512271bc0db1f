//! Error types for the maktab engine.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MaktabError>;

/// Errors surfaced by the engine and its collaborators.
#[derive(Error, Debug)]
pub enum MaktabError {
    /// Input failed validation (malformed coordinates, bad GeoJSON, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No district with this id exists in the boundary index.
    #[error("District not found: {0}")]
    DistrictNotFound(u64),

    /// No school with this id exists in the store.
    #[error("School not found: {0}")]
    SchoolNotFound(u64),

    /// The school store failed. Not retried internally; retry policy
    /// belongs to the caller.
    #[error("Datastore error: {0}")]
    Datastore(String),

    /// Failed to encode a value as JSON/GeoJSON.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O failure while loading boundary data.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

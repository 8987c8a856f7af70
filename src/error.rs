//! Error types

use thiserror::Error;

/// Failure while loading the catalog from the API
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Request for {resource} failed: {source}")]
    Http {
        resource: &'static str,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("HTTP error {status} for {resource}")]
    Status { resource: &'static str, status: u16 },

    #[error("Failed to decode {resource}: {source}")]
    Decode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read {resource}: {source}")]
    Read {
        resource: &'static str,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("Fetch worker for {0} panicked")]
    Worker(&'static str),
}

impl CatalogError {
    /// Name of the JSON resource that failed
    pub fn resource(&self) -> &'static str {
        match self {
            CatalogError::Http { resource, .. }
            | CatalogError::Status { resource, .. }
            | CatalogError::Decode { resource, .. }
            | CatalogError::Read { resource, .. } => resource,
            CatalogError::Worker(resource) => resource,
        }
    }
}

//! Sync error types.

use thiserror::Error;

/// Failures of a single HTTP exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("HTTP request failed: {0}")]
    Http(String),
    /// The server answered with a non-2xx status
    #[error("Server returned status {0}")]
    Status(u16),
    /// The request payload could not be encoded
    #[error("Invalid request body: {0}")]
    Encode(String),
    /// The response body was not the expected JSON document
    #[error("Invalid response body: {0}")]
    Decode(String),
    /// A created entity came back without `_links.self.href`
    #[error("Response entity has no self link")]
    MissingSelfLink,
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => TransportError::Status(status.as_u16()),
            None => TransportError::Http(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        TransportError::Decode(e.to_string())
    }
}

/// Errors surfaced by collection operations.
///
/// Every variant is terminal for the operation that raised it; nothing is
/// retried and the local collection is left as it was before the call.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to load {resource}: {source}")]
    FetchFailure {
        resource: String,
        #[source]
        source: TransportError,
    },
    #[error("Failed to create {resource}: {source}")]
    WriteFailure {
        resource: String,
        #[source]
        source: TransportError,
    },
    #[error("Failed to update {resource}: {source}")]
    UpdateFailure {
        resource: String,
        #[source]
        source: TransportError,
    },
    #[error("Failed to delete {resource}: {source}")]
    DeleteFailure {
        resource: String,
        #[source]
        source: TransportError,
    },
    /// The entity has not been round-tripped through the server yet.
    #[error("{resource} entity has no self link; save it before updating or deleting it")]
    MissingIdentity { resource: String },
    #[error("Failed to reset demo data: {0}")]
    ResetFailure(#[source] TransportError),
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl SyncError {
    pub(crate) fn fetch(resource: &str, source: TransportError) -> Self {
        SyncError::FetchFailure {
            resource: resource.to_string(),
            source,
        }
    }

    pub(crate) fn write(resource: &str, source: TransportError) -> Self {
        SyncError::WriteFailure {
            resource: resource.to_string(),
            source,
        }
    }

    pub(crate) fn update(resource: &str, source: TransportError) -> Self {
        SyncError::UpdateFailure {
            resource: resource.to_string(),
            source,
        }
    }

    pub(crate) fn delete(resource: &str, source: TransportError) -> Self {
        SyncError::DeleteFailure {
            resource: resource.to_string(),
            source,
        }
    }

    pub(crate) fn missing_identity(resource: &str) -> Self {
        SyncError::MissingIdentity {
            resource: resource.to_string(),
        }
    }
}

use std::time::Duration;

use thiserror::Error;

use crate::types::ResourceKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid quantity {raw:?}: {reason}")]
pub struct QuantityError {
    pub raw: String,
    pub reason: &'static str,
}

impl QuantityError {
    pub(crate) fn new(raw: &str, reason: &'static str) -> Self {
        Self {
            raw: raw.to_string(),
            reason,
        }
    }
}

/// Failure of a single list call against the API server.
#[derive(Debug, Error)]
pub enum ListError {
    #[error(transparent)]
    Api(#[from] kube::Error),
    #[error("build request: {0}")]
    Request(#[from] http::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors handed to the error sink during a gather cycle. None of them abort the cycle.
#[derive(Debug, Error)]
pub enum GatherError {
    #[error("failed to list {resource}: {source}")]
    List {
        resource: ResourceKind,
        #[source]
        source: ListError,
    },
    #[error(transparent)]
    Quantity(#[from] QuantityError),
}

impl GatherError {
    pub fn list(resource: ResourceKind, source: ListError) -> Self {
        GatherError::List { resource, source }
    }
}

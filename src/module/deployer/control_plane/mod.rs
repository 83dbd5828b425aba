//! Glue layer for the API server resources are submitted to

use crate::domain::Manifest;
use async_trait::async_trait;
use kube::error::Error as KubeError;
use thiserror::Error;

mod kubernetes;
#[cfg(test)]
pub(crate) mod mock;

pub use kubernetes::KubernetesControlPlane;

/// HTTP status code returned by the API server for absent resources
const STATUS_NOT_FOUND: u16 = 404;

/// Request rejected by the control plane or failed in transit
///
/// Conflicts, validation and transport failures are not distinguished further
/// except for the not-found case which callers may want to tolerate.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API server rejected the request or could not be reached
    #[error("control plane request failed")]
    Request(#[from] KubeError),
    /// A deleted resource was still present when the wait for its removal gave up
    #[error("{kind} {name} was not removed in time")]
    DeletionPending {
        /// Kubernetes kind of the lingering resource
        kind: &'static str,
        /// Name of the lingering resource
        name: String,
    },
}

impl ApiError {
    /// Status code of the rejection, if the API server responded at all
    pub fn code(&self) -> Option<u16> {
        match self {
            ApiError::Request(KubeError::Api(response)) => Some(response.code),
            _ => None,
        }
    }

    /// Whether the request failed because the addressed resource does not exist
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(STATUS_NOT_FOUND)
    }
}

/// Namespaced API accepting and removing resources
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Creates the resource in the given namespace
    async fn submit<K: Manifest>(&self, namespace: &str, resource: &K) -> Result<(), ApiError>;

    /// Removes the resource of type `K` with the given name and returns once it is gone.
    /// When `ignore_not_found` is set, an absent resource is reported as success.
    async fn delete<K: Manifest>(
        &self,
        namespace: &str,
        name: &str,
        ignore_not_found: bool,
    ) -> Result<(), ApiError>;
}

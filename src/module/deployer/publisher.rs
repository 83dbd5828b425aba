use super::control_plane::{ApiError, ControlPlane};
use crate::domain::ConfigurationPayload;
use k8s_openapi::api::core::v1::ConfigMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Error thrown while replacing a configuration payload
#[derive(Debug, Error)]
pub enum PublishError {
    /// The previous payload exists but could not be removed
    #[error("unable to remove previous configuration payload {name}")]
    Delete {
        /// Name of the payload
        name: String,
        /// Rejection returned by the control plane
        #[source]
        source: ApiError,
    },

    /// The new payload could not be created
    #[error("unable to create configuration payload {name}")]
    Create {
        /// Name of the payload
        name: String,
        /// Rejection returned by the control plane
        #[source]
        source: ApiError,
    },
}

/// Idempotently publishes configuration payloads under a name derived from their owner
///
/// Payloads are never updated in place. Any previous payload with the same name is deleted
/// and the deletion has to complete before the new payload is created, so re-running a
/// deployment replaces the payload instead of failing or duplicating it.
pub struct PayloadPublisher<C> {
    control_plane: Arc<C>,
    namespace: String,
    prefix: String,
}

impl<C: ControlPlane> PayloadPublisher<C> {
    /// Creates a new publisher operating in the given namespace
    pub fn new(
        control_plane: Arc<C>,
        namespace: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            control_plane,
            namespace: namespace.into(),
            prefix: prefix.into(),
        }
    }

    /// Replaces the payload owned by `owner` with one containing `content` and returns its name
    pub async fn publish(&self, content: &str, owner: &str) -> Result<String, PublishError> {
        let payload = ConfigurationPayload::new(&self.prefix, owner, &self.namespace, content);
        let name = payload.name.clone();

        debug!("Replacing configuration payload {}", name);

        self.control_plane
            .delete::<ConfigMap>(&self.namespace, &name, true)
            .await
            .map_err(|source| PublishError::Delete {
                name: name.clone(),
                source,
            })?;

        self.control_plane
            .submit(&self.namespace, &payload.into_config_map())
            .await
            .map_err(|source| PublishError::Create {
                name: name.clone(),
                source,
            })?;

        info!("Published configuration payload {}", name);

        Ok(name)
    }
}

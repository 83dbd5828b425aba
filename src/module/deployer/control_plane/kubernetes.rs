use super::{ApiError, ControlPlane};
use crate::domain::Manifest;
use async_trait::async_trait;
use kube::api::{Api, DeleteParams, PostParams, PropagationPolicy};
use kube::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, trace};

/// Pause between two lookups of a resource whose deletion is still in progress
const REMOVAL_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Lookups after which a resource that is still terminating is considered stuck
const REMOVAL_POLL_ATTEMPTS: u32 = 60;

/// Implementation based on the [Kubernetes API server](https://kubernetes.io/docs/reference/using-api/api-concepts/)
///
/// The client is handed in explicitly, no process-wide default client is consulted.
#[derive(Clone)]
pub struct KubernetesControlPlane {
    client: Client,
    dry_run: bool,
    removal_interval: Duration,
    removal_attempts: u32,
}

impl KubernetesControlPlane {
    /// Creates a new instance talking to the API server through the given client
    pub fn new(client: Client) -> Self {
        Self {
            client,
            dry_run: false,
            removal_interval: REMOVAL_POLL_INTERVAL,
            removal_attempts: REMOVAL_POLL_ATTEMPTS,
        }
    }

    /// Submits and deletes resources in server-side dry run mode so nothing gets persisted
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Changes how often and how long a deleted resource is looked up until it is gone
    pub fn with_removal_polling(mut self, interval: Duration, attempts: u32) -> Self {
        self.removal_interval = interval;
        self.removal_attempts = attempts;
        self
    }

    fn api<K: Manifest>(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn await_removal<K: Manifest>(&self, api: &Api<K>, name: &str) -> Result<(), ApiError> {
        for _ in 0..self.removal_attempts {
            match api.get(name).await {
                Ok(_) => {
                    trace!("{} {} is still terminating", K::KIND, name);
                    sleep(self.removal_interval).await;
                }
                Err(e) => {
                    let e = ApiError::from(e);

                    if e.is_not_found() {
                        debug!("Deleted {} {}", K::KIND, name);
                        return Ok(());
                    }

                    error!("Failed to look up deleted {} {:?}", K::KIND, e);
                    return Err(e);
                }
            }
        }

        error!("{} {} is still present after deletion", K::KIND, name);

        Err(ApiError::DeletionPending {
            kind: K::KIND,
            name: name.to_owned(),
        })
    }
}

#[async_trait]
impl ControlPlane for KubernetesControlPlane {
    async fn submit<K: Manifest>(&self, namespace: &str, resource: &K) -> Result<(), ApiError> {
        let api = self.api::<K>(namespace);
        let params = PostParams {
            dry_run: self.dry_run,
            field_manager: None,
        };

        match api.create(&params, resource).await {
            Ok(created) => {
                let name = created.meta().name.as_deref().unwrap_or_default();
                info!("Created {} {} in {}", K::KIND, name, namespace);
                Ok(())
            }
            Err(e) => {
                error!("Failed to create {} {:?}", K::KIND, e);
                Err(e.into())
            }
        }
    }

    async fn delete<K: Manifest>(
        &self,
        namespace: &str,
        name: &str,
        ignore_not_found: bool,
    ) -> Result<(), ApiError> {
        let api = self.api::<K>(namespace);

        let params = DeleteParams {
            dry_run: self.dry_run,
            grace_period_seconds: None,
            propagation_policy: Some(PropagationPolicy::Background),
            preconditions: None,
        };

        match api.delete(name, &params).await {
            Ok(response) if response.is_right() => {
                debug!("Deleted {} {}", K::KIND, name);
                Ok(())
            }
            Ok(_) if self.dry_run => {
                debug!("Deletion of {} {} accepted in dry run", K::KIND, name);
                Ok(())
            }
            Ok(_) => {
                debug!("Deletion of {} {} scheduled", K::KIND, name);
                self.await_removal(&api, name).await
            }
            Err(e) => {
                let e = ApiError::from(e);

                if ignore_not_found && e.is_not_found() {
                    debug!("{} {} does not exist, nothing to delete", K::KIND, name);
                    Ok(())
                } else {
                    error!("Failed to delete {} {:?}", K::KIND, e);
                    Err(e)
                }
            }
        }
    }
}

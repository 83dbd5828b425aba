use super::{ApiError, ControlPlane};
use crate::domain::{Manifest, ManifestKind};
use async_trait::async_trait;
use kube::error::{Error as KubeError, ErrorResponse};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Submit,
    Delete,
    /// Lookup of a deleted resource that is still terminating
    Observe,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub kind: ManifestKind,
    pub namespace: String,
    pub name: String,
}

type ResourceKey = (ManifestKind, String, String);

/// In-memory control plane which records every call and keeps submitted resources around
#[derive(Default)]
pub struct MockControlPlane {
    resources: Mutex<BTreeMap<ResourceKey, Value>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<(Operation, ManifestKind), u16>>,
    lingering_lookups: Mutex<usize>,
}

fn rejection(code: u16, message: &str) -> ApiError {
    ApiError::Request(KubeError::Api(ErrorResponse {
        status: "Failure".into(),
        message: message.into(),
        reason: "Mocked".into(),
        code,
    }))
}

impl MockControlPlane {
    /// Rejects every future `operation` on resources of `kind` with the given status code
    pub fn fail_on(&self, operation: Operation, kind: ManifestKind, code: u16) -> &Self {
        self.failures
            .lock()
            .unwrap()
            .insert((operation, kind), code);
        self
    }

    /// Keeps deleted resources around for the given number of lookups before they disappear
    pub fn linger_deletions(&self, lookups: usize) -> &Self {
        *self.lingering_lookups.lock().unwrap() = lookups;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: Operation, kind: ManifestKind) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.operation == operation && call.kind == kind)
            .count()
    }

    /// Number of resources of the given kind currently stored
    pub fn stored(&self, kind: ManifestKind) -> usize {
        self.resources
            .lock()
            .unwrap()
            .keys()
            .filter(|(k, _, _)| *k == kind)
            .count()
    }

    pub fn get<K: Manifest>(&self, namespace: &str, name: &str) -> Option<K> {
        let key = (K::MANIFEST_KIND, namespace.to_owned(), name.to_owned());

        self.resources
            .lock()
            .unwrap()
            .get(&key)
            .map(|value| serde_json::from_value(value.clone()).unwrap())
    }

    fn record(&self, operation: Operation, kind: ManifestKind, namespace: &str, name: &str) {
        self.calls.lock().unwrap().push(Call {
            operation,
            kind,
            namespace: namespace.to_owned(),
            name: name.to_owned(),
        });
    }

    fn injected_failure(&self, operation: Operation, kind: ManifestKind) -> Option<ApiError> {
        self.failures
            .lock()
            .unwrap()
            .get(&(operation, kind))
            .map(|code| rejection(*code, "injected failure"))
    }
}

#[async_trait]
impl ControlPlane for MockControlPlane {
    async fn submit<K: Manifest>(&self, namespace: &str, resource: &K) -> Result<(), ApiError> {
        let kind = K::MANIFEST_KIND;
        let name = resource.meta().name.clone().unwrap_or_default();
        self.record(Operation::Submit, kind, namespace, &name);

        if let Some(error) = self.injected_failure(Operation::Submit, kind) {
            return Err(error);
        }

        let mut resources = self.resources.lock().unwrap();
        let key = (kind, namespace.to_owned(), name);

        if resources.contains_key(&key) {
            return Err(rejection(409, "already exists"));
        }

        resources.insert(key, serde_json::to_value(resource).unwrap());
        Ok(())
    }

    async fn delete<K: Manifest>(
        &self,
        namespace: &str,
        name: &str,
        ignore_not_found: bool,
    ) -> Result<(), ApiError> {
        let kind = K::MANIFEST_KIND;
        self.record(Operation::Delete, kind, namespace, name);

        if let Some(error) = self.injected_failure(Operation::Delete, kind) {
            return Err(error);
        }

        let key = (kind, namespace.to_owned(), name.to_owned());

        if !self.resources.lock().unwrap().contains_key(&key) {
            return if ignore_not_found {
                Ok(())
            } else {
                Err(rejection(404, "not found"))
            };
        }

        let lookups = *self.lingering_lookups.lock().unwrap();
        for _ in 0..lookups {
            self.record(Operation::Observe, kind, namespace, name);
            tokio::task::yield_now().await;
        }

        self.resources.lock().unwrap().remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::domain::ConfigurationPayload;
    use k8s_openapi::api::core::v1::ConfigMap;

    fn config_map(name: &str) -> ConfigMap {
        ConfigurationPayload::new("", name, "default", "{}").into_config_map()
    }

    #[tokio::test]
    async fn reject_duplicate_submission() {
        let control_plane = MockControlPlane::default();
        control_plane.submit("default", &config_map("a")).await.unwrap();

        let error = control_plane
            .submit("default", &config_map("a"))
            .await
            .unwrap_err();

        assert_eq!(error.code(), Some(409));
    }

    #[tokio::test]
    async fn remove_lingering_resource_before_returning() {
        let control_plane = MockControlPlane::default();
        control_plane.linger_deletions(2);
        control_plane.submit("default", &config_map("a")).await.unwrap();

        control_plane
            .delete::<ConfigMap>("default", "a", true)
            .await
            .unwrap();

        assert_eq!(control_plane.count(Operation::Observe, ManifestKind::ConfigurationPayload), 2);
        assert_eq!(control_plane.stored(ManifestKind::ConfigurationPayload), 0);
    }

    #[tokio::test]
    async fn tolerate_absent_resource_only_when_asked() {
        let control_plane = MockControlPlane::default();

        assert!(control_plane
            .delete::<ConfigMap>("default", "a", true)
            .await
            .is_ok());
        assert!(control_plane
            .delete::<ConfigMap>("default", "a", false)
            .await
            .unwrap_err()
            .is_not_found());
    }
}

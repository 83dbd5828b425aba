use super::{BindingError, ManifestKind};
use crate::constants::LABEL_KEY;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Error thrown when a requested resource name can not be used
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The requested name is empty or consists of whitespace only
    #[error("resource name must not be empty")]
    EmptyName,
}

/// Canonical name and label of a resource
///
/// The label value is always identical to the name. Every label and selector written in this crate
/// is derived from an identity so that pods, deployments and services can not drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadIdentity {
    name: String,
    label_key: &'static str,
}

impl WorkloadIdentity {
    /// Creates an identity for the requested name using the default [`LABEL_KEY`]
    pub fn new(name: impl Into<String>) -> Result<Self, IdentityError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(IdentityError::EmptyName);
        }

        Ok(Self {
            name,
            label_key: LABEL_KEY,
        })
    }

    /// Name of the resource
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key under which the identity is labelled
    pub fn label_key(&self) -> &str {
        self.label_key
    }

    /// Value of the label, identical to [`name`](Self::name)
    pub fn label_value(&self) -> &str {
        &self.name
    }

    /// Label map selecting this identity
    pub fn labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(self.label_key.to_owned(), self.name.clone());
        labels
    }

    fn apply_to(&self, target: &mut Option<BTreeMap<String, String>>) {
        target
            .get_or_insert_with(BTreeMap::new)
            .insert(self.label_key.to_owned(), self.name.clone());
    }

    /// Names the deployment after this identity and labels it, its selector, and its pod template accordingly
    ///
    /// Labels already present in the template are retained.
    pub fn bind_workload(&self, deployment: &mut Deployment) -> Result<(), BindingError> {
        deployment.metadata.name = Some(self.name.clone());
        self.apply_to(&mut deployment.metadata.labels);

        let spec = deployment
            .spec
            .as_mut()
            .ok_or_else(|| BindingError::new(ManifestKind::Workload, "spec"))?;

        self.apply_to(&mut spec.selector.match_labels);

        let pod_metadata = spec.template.metadata.get_or_insert_with(Default::default);
        self.apply_to(&mut pod_metadata.labels);

        Ok(())
    }

    /// Names and labels the service after this identity while selecting the pods of the given workload
    pub fn bind_service(
        &self,
        service: &mut Service,
        workload: &WorkloadIdentity,
    ) -> Result<(), BindingError> {
        service.metadata.name = Some(self.name.clone());
        self.apply_to(&mut service.metadata.labels);

        let spec = service
            .spec
            .as_mut()
            .ok_or_else(|| BindingError::new(ManifestKind::NetworkService, "spec"))?;

        workload.apply_to(&mut spec.selector);

        Ok(())
    }
}

impl fmt::Display for WorkloadIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label_key, self.name)
    }
}

use crate::library::helpers::load_config;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::Resource;
use kube::api::Resource as KubeResource;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::{self, Debug};
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::trace;

const DEPLOYMENT_TEMPLATE: &str = include_str!("../../templates/deployment.yml");
const SERVICE_TEMPLATE: &str = include_str!("../../templates/service.yml");
const INGRESS_TEMPLATE: &str = include_str!("../../templates/ingress.yml");

/// The four kinds of resources provisioned for a workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ManifestKind {
    /// Replicated pods running the container image
    Workload,
    /// Stable virtual address load-balancing to the workload pods
    NetworkService,
    /// External HTTP path routing to the network service
    Route,
    /// Configuration file mounted into the workload
    ConfigurationPayload,
}

impl ManifestKind {
    /// File name of the template from which resources of this kind are bound
    ///
    /// Configuration payloads are built from scratch and have no template.
    pub fn template_file(&self) -> Option<&'static str> {
        match self {
            ManifestKind::Workload => Some("deployment.yml"),
            ManifestKind::NetworkService => Some("service.yml"),
            ManifestKind::Route => Some("ingress.yml"),
            ManifestKind::ConfigurationPayload => None,
        }
    }

    fn embedded_template(&self) -> Option<&'static str> {
        match self {
            ManifestKind::Workload => Some(DEPLOYMENT_TEMPLATE),
            ManifestKind::NetworkService => Some(SERVICE_TEMPLATE),
            ManifestKind::Route => Some(INGRESS_TEMPLATE),
            ManifestKind::ConfigurationPayload => None,
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ManifestKind::Workload => Deployment::KIND,
            ManifestKind::NetworkService => Service::KIND,
            ManifestKind::Route => Ingress::KIND,
            ManifestKind::ConfigurationPayload => ConfigMap::KIND,
        };

        write!(f, "{}", kind)
    }
}

/// Kubernetes resource which can be loaded from a template and submitted to the control plane
pub trait Manifest:
    Resource
    + KubeResource<DynamicType = ()>
    + DeserializeOwned
    + Serialize
    + Clone
    + Debug
    + Send
    + Sync
    + 'static
{
    /// Role the resource plays for a workload
    const MANIFEST_KIND: ManifestKind;
}

impl Manifest for Deployment {
    const MANIFEST_KIND: ManifestKind = ManifestKind::Workload;
}

impl Manifest for Service {
    const MANIFEST_KIND: ManifestKind = ManifestKind::NetworkService;
}

impl Manifest for Ingress {
    const MANIFEST_KIND: ManifestKind = ManifestKind::Route;
}

impl Manifest for ConfigMap {
    const MANIFEST_KIND: ManifestKind = ManifestKind::ConfigurationPayload;
}

/// Error thrown while loading a template
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template exists for the requested kind
    #[error("{kind} template {location} unreadable")]
    NotFound {
        /// Requested kind
        kind: ManifestKind,
        /// Where the template was looked up
        location: String,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The template is not a valid document of the requested kind
    #[error("invalid {kind} template yml")]
    Parse {
        /// Requested kind
        kind: ManifestKind,
        /// Underlying parser failure
        #[source]
        source: serde_yaml::Error,
    },
}

/// Source of resource templates
///
/// Every call to [`load`](Self::load) parses a fresh document. Callers mutate the returned
/// resource in place, so parsed documents are never cached or shared.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    directory: Option<PathBuf>,
}

impl TemplateStore {
    /// Uses the templates compiled into the binary
    pub fn embedded() -> Self {
        Self { directory: None }
    }

    /// Reads templates from the given directory
    pub fn from_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
        }
    }

    fn read(&self, kind: ManifestKind) -> Result<String, TemplateError> {
        let missing = |location: String| TemplateError::NotFound {
            kind,
            location,
            source: io::Error::new(io::ErrorKind::NotFound, "no template exists for this kind"),
        };

        match (&self.directory, kind.template_file()) {
            (Some(directory), Some(file)) => {
                load_config(directory, file).map_err(|source| TemplateError::NotFound {
                    kind,
                    location: directory.join(file).display().to_string(),
                    source,
                })
            }
            (Some(directory), None) => Err(missing(directory.display().to_string())),
            (None, _) => kind
                .embedded_template()
                .map(str::to_owned)
                .ok_or_else(|| missing("<embedded>".to_owned())),
        }
    }

    /// Loads and parses the template for resources of type `K`
    pub fn load<K: Manifest>(&self) -> Result<K, TemplateError> {
        let kind = K::MANIFEST_KIND;
        let yaml = self.read(kind)?;

        trace!("{} template YAML {}", kind, yaml);

        serde_yaml::from_str(&yaml).map_err(|source| TemplateError::Parse { kind, source })
    }
}

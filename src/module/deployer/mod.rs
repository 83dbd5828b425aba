//! Module binding the resource templates of a workload and submitting them in dependency order
//!
//! A deployment walks through the following steps, each passing the name it produced to the next one:
//!
//! 1. Replace the configuration payload of the workload ([`PayloadPublisher`])
//! 2. Create the workload, mounting the payload
//! 3. Create the network service, selecting the pods of the workload
//! 4. Create the route, forwarding to the network service
//!
//! A failing payload is recorded and the deployment continues without it. Any other failure ends the
//! deployment since its successors would lack a name to refer to. Nothing is rolled back, resources
//! created by earlier steps are left in place and get replaced or rejected by a subsequent run.

use crate::constants::{
    CONFIG_MAP_PREFIX, DEFAULT_CONFIG_PAYLOAD, DEFAULT_IMAGE, DEFAULT_NAMESPACE, DEFAULT_ROUTE_NAME,
    DEFAULT_ROUTE_PATH, DEFAULT_SERVICE_NAME,
};
use crate::domain::{
    BindingError, IdentityError, Manifest, ManifestKind, TemplateError, TemplateStore,
    WorkloadIdentity,
};
use crate::library::helpers::error_chain;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::Ingress;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, trace, warn};

mod binding;
mod options;
mod publisher;
mod report;

pub mod control_plane;

pub use control_plane::{ApiError, ControlPlane, KubernetesControlPlane};
pub use options::Options;
pub use publisher::{PayloadPublisher, PublishError};
pub use report::{DeployReport, DeployState, FailurePolicy, StageFailure};

/// Cause of a failed step
#[derive(Debug, Error)]
pub enum StepError {
    /// The requested name can not be used
    #[error("invalid resource name")]
    Identity(#[from] IdentityError),

    /// The template could not be loaded
    #[error("template unavailable")]
    Template(#[from] TemplateError),

    /// The template does not have the expected shape
    #[error("template does not match the expected shape")]
    Binding(#[from] BindingError),

    /// The control plane rejected the resource
    #[error("control plane rejected the resource")]
    Api(#[from] ApiError),

    /// The configuration payload could not be replaced
    #[error("configuration payload could not be published")]
    Publish(#[from] PublishError),
}

/// Deployment which ended before all resources were created
#[derive(Debug, Error)]
#[error("failed to provision {kind} after reaching {reached}")]
pub struct DeployError {
    /// Kind of resource which could not be provisioned
    pub kind: ManifestKind,
    /// Last state reached before the failure
    pub reached: DeployState,
    /// Resources provisioned up to the failure
    pub report: DeployReport,
    /// Cause of the failure
    #[source]
    pub source: StepError,
}

impl DeployError {
    fn new(kind: ManifestKind, report: &DeployReport, source: StepError) -> Self {
        let reached = report.state;
        let mut report = report.clone();
        report.finish();

        Self {
            kind,
            reached,
            report,
            source,
        }
    }
}

/// Values shared by every deployment executed by a [`Deployer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    /// Namespace all resources are created in
    pub namespace: String,
    /// Container image run by the workload
    pub image: String,
    /// Name of the network service
    pub service_name: String,
    /// Name of the route
    pub route_name: String,
    /// Path pattern routed to the network service
    pub route_path: String,
    /// Prefix of configuration payload names
    pub config_prefix: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            image: DEFAULT_IMAGE.to_owned(),
            service_name: DEFAULT_SERVICE_NAME.to_owned(),
            route_name: DEFAULT_ROUTE_NAME.to_owned(),
            route_path: DEFAULT_ROUTE_PATH.to_owned(),
            config_prefix: CONFIG_MAP_PREFIX.to_owned(),
        }
    }
}

/// Workload to provision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Requested name of the workload
    pub workload_name: String,
    /// Content of the configuration file mounted into the workload
    pub config_payload: String,
}

impl DeployRequest {
    /// Creates a request for the given workload with an empty JSON object as configuration
    pub fn new(workload_name: impl Into<String>) -> Self {
        Self {
            workload_name: workload_name.into(),
            config_payload: DEFAULT_CONFIG_PAYLOAD.to_owned(),
        }
    }

    /// Replaces the configuration file content
    pub fn with_config_payload(mut self, config_payload: impl Into<String>) -> Self {
        self.config_payload = config_payload.into();
        self
    }
}

/// Orchestrates the provisioning of a workload and its dependents
pub struct Deployer<C> {
    control_plane: Arc<C>,
    templates: TemplateStore,
    publisher: PayloadPublisher<C>,
    config: DeployConfig,
}

impl<C: ControlPlane> Deployer<C> {
    /// Creates a new instance from raw parts
    pub fn new(control_plane: Arc<C>, templates: TemplateStore, config: DeployConfig) -> Self {
        let publisher = PayloadPublisher::new(
            control_plane.clone(),
            config.namespace.clone(),
            config.config_prefix.clone(),
        );

        Self {
            control_plane,
            templates,
            publisher,
            config,
        }
    }

    /// Provisions the requested workload
    ///
    /// Never panics. The returned report lists every resource created, including a failed
    /// configuration payload if the remaining steps succeeded regardless.
    pub async fn deploy(&self, request: &DeployRequest) -> Result<DeployReport, DeployError> {
        let mut report = DeployReport::new(self.config.namespace.clone());

        let identity = match WorkloadIdentity::new(request.workload_name.as_str()) {
            Ok(identity) => identity,
            Err(e) => {
                let e = StepError::from(e);
                report.record(ManifestKind::Workload, &e);
                error!("Refusing to deploy workload: {}", error_chain(&e));
                return Err(DeployError::new(ManifestKind::Workload, &report, e));
            }
        };

        info!(
            "Deploying workload {} selected by {} to namespace {}",
            identity.name(),
            identity,
            self.config.namespace
        );

        let published = self
            .publisher
            .publish(&request.config_payload, identity.name())
            .await
            .map_err(StepError::from);
        let config_map = settle(&mut report, ManifestKind::ConfigurationPayload, published)?;
        if !config_map.is_empty() {
            report.config_map = Some(config_map.clone());
        }
        report.advance(DeployState::ConfigPublished);

        let workload = self.submit_workload(&identity, &config_map).await;
        let workload = settle(&mut report, ManifestKind::Workload, workload)?;
        report.workload = Some(workload);
        report.advance(DeployState::WorkloadSubmitted);

        let service = self.submit_service(&identity).await;
        let service = settle(&mut report, ManifestKind::NetworkService, service)?;
        report.service = Some(service.clone());
        report.advance(DeployState::ServiceSubmitted);

        let route = self.submit_route(&service).await;
        let route = settle(&mut report, ManifestKind::Route, route)?;
        report.route = Some(route);
        report.advance(DeployState::RouteSubmitted);

        report.finish();

        info!(
            "Deployment of workload {} finished in state {}",
            identity.name(),
            report.state
        );

        Ok(report)
    }

    async fn submit<K: Manifest>(&self, resource: &K) -> Result<(), ApiError> {
        if let Ok(yaml) = serde_yaml::to_string(resource) {
            trace!("{} YAML {}", K::MANIFEST_KIND, yaml);
        }

        self.control_plane
            .submit(&self.config.namespace, resource)
            .await
    }

    async fn submit_workload(
        &self,
        identity: &WorkloadIdentity,
        config_map: &str,
    ) -> Result<String, StepError> {
        let mut deployment: Deployment = self.templates.load()?;

        identity.bind_workload(&mut deployment)?;
        binding::bind_container(&mut deployment, identity, &self.config.image)?;
        binding::bind_config_volume(&mut deployment, config_map)?;

        self.submit(&deployment).await?;

        Ok(identity.name().to_owned())
    }

    async fn submit_service(&self, workload: &WorkloadIdentity) -> Result<String, StepError> {
        let identity = WorkloadIdentity::new(self.config.service_name.as_str())?;
        let mut service: Service = self.templates.load()?;

        identity.bind_service(&mut service, workload)?;

        self.submit(&service).await?;

        Ok(identity.name().to_owned())
    }

    async fn submit_route(&self, service_name: &str) -> Result<String, StepError> {
        let mut ingress: Ingress = self.templates.load()?;

        binding::bind_route(
            &mut ingress,
            &self.config.route_name,
            &self.config.route_path,
            service_name,
        )?;

        self.submit(&ingress).await?;

        Ok(self.config.route_name.clone())
    }
}

/// Applies the [`FailurePolicy`] of the given kind to the result of a step
///
/// Best effort failures resolve to the default value which acts as an empty reference for the following steps.
fn settle<T: Default>(
    report: &mut DeployReport,
    kind: ManifestKind,
    result: Result<T, StepError>,
) -> Result<T, DeployError> {
    let error = match result {
        Ok(value) => return Ok(value),
        Err(error) => error,
    };

    match report.record(kind, &error) {
        FailurePolicy::BestEffort => {
            warn!(
                "Failed to provision {}, continuing without it: {}",
                kind,
                error_chain(&error)
            );
            Ok(T::default())
        }
        FailurePolicy::FailFast => {
            error!("Failed to provision {}: {}", kind, error_chain(&error));
            Err(DeployError::new(kind, report, error))
        }
    }
}

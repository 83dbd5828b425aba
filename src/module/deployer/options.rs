use super::{DeployConfig, DeployRequest};
use crate::constants::{
    CONFIG_MAP_PREFIX, DEFAULT_IMAGE, DEFAULT_ROUTE_NAME, DEFAULT_ROUTE_PATH, DEFAULT_SERVICE_NAME,
};
use crate::domain::TemplateStore;
use std::path::PathBuf;
use structopt::StructOpt;

/// Options for the deployer module
#[derive(Debug, StructOpt)]
pub struct Options {
    /// Name of the workload. Used for the deployment, its labels
    /// and to derive the name of the configuration payload.
    #[structopt(env = "SHIPYARD_WORKLOAD_NAME")]
    pub name: String,

    /// Container image run by the workload
    #[structopt(long, env = "SHIPYARD_IMAGE", default_value = DEFAULT_IMAGE)]
    pub image: String,

    /// File whose content is published as `config.json` and mounted into the workload.
    /// An empty JSON object is used when omitted.
    #[structopt(long, env = "SHIPYARD_CONFIG_FILE", value_name = "path")]
    pub config_file: Option<PathBuf>,

    /// Name of the service exposing the workload
    #[structopt(long, env = "SHIPYARD_SERVICE_NAME", default_value = DEFAULT_SERVICE_NAME)]
    pub service_name: String,

    /// Name of the ingress routing to the service
    #[structopt(long, env = "SHIPYARD_ROUTE_NAME", default_value = DEFAULT_ROUTE_NAME)]
    pub route_name: String,

    /// Path pattern of the ingress rule
    #[structopt(long, env = "SHIPYARD_ROUTE_PATH", default_value = DEFAULT_ROUTE_PATH)]
    pub route_path: String,

    /// Prefix prepended to the workload name to form the config map name
    #[structopt(long, env = "SHIPYARD_CONFIG_PREFIX", default_value = CONFIG_MAP_PREFIX)]
    pub config_prefix: String,

    /// Directory containing `deployment.yml`, `service.yml` and `ingress.yml`.
    /// The templates bundled with the binary are used when omitted.
    #[structopt(long, env = "SHIPYARD_TEMPLATE_DIR", value_name = "dir")]
    pub templates: Option<PathBuf>,

    /// Let the API server validate all resources without persisting them
    #[structopt(long)]
    pub dry_run: bool,
}

impl Options {
    /// Deployment configuration for the given namespace
    pub fn config(&self, namespace: &str) -> DeployConfig {
        DeployConfig {
            namespace: namespace.to_owned(),
            image: self.image.clone(),
            service_name: self.service_name.clone(),
            route_name: self.route_name.clone(),
            route_path: self.route_path.clone(),
            config_prefix: self.config_prefix.clone(),
        }
    }

    /// Template source selected by the options
    pub fn template_store(&self) -> TemplateStore {
        match &self.templates {
            Some(directory) => TemplateStore::from_directory(directory),
            None => TemplateStore::embedded(),
        }
    }

    /// Request for the configured workload, reading the configuration file from disk if one is set
    pub fn request(&self) -> Result<DeployRequest, std::io::Error> {
        let request = DeployRequest::new(self.name.clone());

        Ok(match &self.config_file {
            Some(path) => request.with_config_payload(std::fs::read_to_string(path)?),
            None => request,
        })
    }
}

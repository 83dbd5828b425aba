//! Field substitutions which do not involve labels
//!
//! Labels and selectors are exclusively written by [`WorkloadIdentity`].

use crate::constants::CONFIG_FILE_KEY;
use crate::domain::{BindingError, ManifestKind, WorkloadIdentity};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::PodSpec;
use k8s_openapi::api::networking::v1::Ingress;

fn pod_spec(deployment: &mut Deployment) -> Result<&mut PodSpec, BindingError> {
    deployment
        .spec
        .as_mut()
        .and_then(|spec| spec.template.spec.as_mut())
        .ok_or_else(|| BindingError::new(ManifestKind::Workload, "spec.template.spec"))
}

/// Names the first container after the workload and points it to the given image
pub fn bind_container(
    deployment: &mut Deployment,
    identity: &WorkloadIdentity,
    image: &str,
) -> Result<(), BindingError> {
    let container = pod_spec(deployment)?
        .containers
        .first_mut()
        .ok_or_else(|| BindingError::new(ManifestKind::Workload, "spec.template.spec.containers"))?;

    container.name = identity.name().to_owned();
    container.image = Some(image.to_owned());

    Ok(())
}

/// Points the first volume to the configuration payload and maps its config file into the volume
///
/// Key and path are both set to [`CONFIG_FILE_KEY`], the same key the payload is published under.
pub fn bind_config_volume(
    deployment: &mut Deployment,
    config_map_name: &str,
) -> Result<(), BindingError> {
    let config_map = pod_spec(deployment)?
        .volumes
        .as_mut()
        .and_then(|volumes| volumes.first_mut())
        .and_then(|volume| volume.config_map.as_mut())
        .ok_or_else(|| {
            BindingError::new(ManifestKind::Workload, "spec.template.spec.volumes[0].configMap")
        })?;

    config_map.name = Some(config_map_name.to_owned());

    let item = config_map
        .items
        .as_mut()
        .and_then(|items| items.first_mut())
        .ok_or_else(|| {
            BindingError::new(
                ManifestKind::Workload,
                "spec.template.spec.volumes[0].configMap.items",
            )
        })?;

    item.key = CONFIG_FILE_KEY.to_owned();
    item.path = CONFIG_FILE_KEY.to_owned();

    Ok(())
}

/// Names the ingress and routes its first HTTP path to the given service
pub fn bind_route(
    ingress: &mut Ingress,
    name: &str,
    path: &str,
    service_name: &str,
) -> Result<(), BindingError> {
    ingress.metadata.name = Some(name.to_owned());

    let http_path = ingress
        .spec
        .as_mut()
        .and_then(|spec| spec.rules.as_mut())
        .and_then(|rules| rules.first_mut())
        .and_then(|rule| rule.http.as_mut())
        .and_then(|http| http.paths.first_mut())
        .ok_or_else(|| BindingError::new(ManifestKind::Route, "spec.rules[0].http.paths"))?;

    http_path.path = Some(path.to_owned());

    let backend = http_path
        .backend
        .service
        .as_mut()
        .ok_or_else(|| BindingError::new(ManifestKind::Route, "backend.service"))?;

    backend.name = service_name.to_owned();

    Ok(())
}

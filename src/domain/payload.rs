use crate::constants::CONFIG_FILE_KEY;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Configuration file published for a workload
///
/// The payload contains exactly one file, named [`CONFIG_FILE_KEY`], which is mounted into the workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationPayload {
    /// Name derived from the owning workload
    pub name: String,
    /// Namespace the payload lives in
    pub namespace: String,
    /// Mapping from file name to file content
    pub data: BTreeMap<String, String>,
}

impl ConfigurationPayload {
    /// Derives the name of the payload belonging to the given workload
    pub fn derive_name(prefix: &str, owner: &str) -> String {
        format!("{}{}", prefix, owner)
    }

    /// Creates a new payload for the given owner with `content` as its only file
    pub fn new(prefix: &str, owner: &str, namespace: &str, content: &str) -> Self {
        let mut data = BTreeMap::new();
        data.insert(CONFIG_FILE_KEY.to_owned(), content.to_owned());

        Self {
            name: Self::derive_name(prefix, owner),
            namespace: namespace.to_owned(),
            data,
        }
    }

    /// Converts the payload into a submittable resource
    pub fn into_config_map(self) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some(self.name),
                namespace: Some(self.namespace),
                ..Default::default()
            },
            data: Some(self.data),
            ..Default::default()
        }
    }
}

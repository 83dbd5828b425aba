//! Well-known names, keys and defaults shared across the crate

/// Label key used for every workload selector
pub const LABEL_KEY: &str = "app";

/// Prefix prepended to the workload name to derive the configuration payload name
pub const CONFIG_MAP_PREFIX: &str = "configMap-";

/// Key of the single file contained in a configuration payload.
/// It doubles as the file name inside the mounted volume.
pub const CONFIG_FILE_KEY: &str = "config.json";

/// Payload content used when none is provided
pub const DEFAULT_CONFIG_PAYLOAD: &str = "{}";

/// Namespace used when none is provided
pub const DEFAULT_NAMESPACE: &str = "default";

/// Container image deployed when none is provided
pub const DEFAULT_IMAGE: &str = "test-mirror-name";

/// Name of the network service fronting the workload
pub const DEFAULT_SERVICE_NAME: &str = "service-name";

/// Name of the ingress routing external traffic to the service
pub const DEFAULT_ROUTE_NAME: &str = "ingress-service-deployment";

/// Path pattern of the ingress rule
pub const DEFAULT_ROUTE_PATH: &str = "/api/(/|$)(.*)";

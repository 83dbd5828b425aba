use shipyard::constants::DEFAULT_NAMESPACE;
use std::path::PathBuf;
use std::str::FromStr;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    about = "Turns a configuration payload and a container image into a reachable Kubernetes service.",
    version = env!("SHIPYARD_VERSION")
)]
pub struct MainOptions {
    /// Log level, scopable to different modules
    ///
    /// Levels: trace, debug, info, warn, error
    #[structopt(
        short,
        long,
        global = true,
        default_value = "info,kube=warn,hyper=warn,tower=warn,rustls=warn",
        env = "RUST_LOG",
        value_name = "level"
    )]
    pub log: String,

    /// Log output format
    ///
    /// Formats: text, compact, json
    #[structopt(long, global = true, env = "SHIPYARD_LOG_FORMAT", default_value = "text", value_name = "format")]
    pub log_format: LogFormat,

    /// Kubeconfig used to reach the API server.
    /// When the file does not exist, the configuration is inferred
    /// from the environment or the in-cluster service account.
    #[structopt(
        long,
        global = true,
        env = "KUBECONFIG",
        default_value = "kubeConfig/config",
        value_name = "path"
    )]
    pub kubeconfig: PathBuf,

    /// Namespace all resources are created in
    #[structopt(short, long, global = true, env = "SHIPYARD_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    #[structopt(subcommand)]
    pub command: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Publishes the configuration payload and creates the deployment, service and ingress
    Deploy(shipyard::module::deployer::Options),
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Text,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("unknown log format '{}'", s)),
        }
    }
}

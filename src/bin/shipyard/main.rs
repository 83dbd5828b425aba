use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use options::{Command, LogFormat, MainOptions};
use shipyard::library::helpers::error_chain;
use shipyard::module::deployer::{self, Deployer, KubernetesControlPlane};
use std::path::Path;
use std::sync::Arc;
use structopt::StructOpt;
use tracing::{debug, error, info};

mod options;

#[tokio::main]
async fn main() -> Result<()> {
    let options = init();

    match options.command {
        Command::Deploy(ref deploy_options) => {
            deploy(&options.kubeconfig, &options.namespace, deploy_options).await
        }
    }
}

fn init() -> MainOptions {
    let options = MainOptions::from_args();

    let formatter = tracing_subscriber::fmt().with_env_filter(options.log.as_str());

    match options.log_format {
        LogFormat::Text => formatter.init(),
        LogFormat::Compact => formatter.compact().init(),
        LogFormat::Json => formatter.json().init(),
    };

    info!("Shipyard {}", env!("SHIPYARD_VERSION"));

    options
}

async fn connect(kubeconfig: &Path) -> Result<Client> {
    if !kubeconfig.exists() {
        debug!(
            "Kubeconfig {} not found, inferring configuration",
            kubeconfig.display()
        );
        return Ok(Client::try_default().await?);
    }

    let kubeconfig_content = Kubeconfig::read_from(kubeconfig)
        .with_context(|| format!("unable to read kubeconfig {}", kubeconfig.display()))?;
    let config =
        Config::from_custom_kubeconfig(kubeconfig_content, &KubeConfigOptions::default()).await?;

    Ok(Client::try_from(config)?)
}

async fn deploy(kubeconfig: &Path, namespace: &str, options: &deployer::Options) -> Result<()> {
    let request = options.request().context("unable to read configuration file")?;

    let client = connect(kubeconfig).await?;
    let control_plane = KubernetesControlPlane::new(client).with_dry_run(options.dry_run);
    let deployer = Deployer::new(
        Arc::new(control_plane),
        options.template_store(),
        options.config(namespace),
    );

    match deployer.deploy(&request).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(e) => {
            error!("{}", error_chain(&e));
            println!("{}", serde_json::to_string_pretty(&e.report)?);
            Err(e.into())
        }
    }
}

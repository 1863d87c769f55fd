/// hub-upgrade
///
/// Upgrades the Helm chart of a BinderHub deployment running on Azure
/// Kubernetes Service: logs into Azure, refreshes the local chart's
/// dependencies, runs `helm upgrade` and lists the resulting pods.
mod azure;
mod config;
mod error;
mod helm;
mod k8s;
mod logging;
mod upgrade;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::{ConfigOverrides, UpgradeConfig};
use crate::error::UpgradeError;
use crate::logging::LogSettings;
use crate::upgrade::Upgrader;
use crate::utils::command::SystemRunner;

#[derive(Parser, Debug)]
#[command(name = "hub-upgrade")]
#[command(about = "Upgrade a helm chart for a BinderHub deployment on Azure", long_about = None)]
struct Cli {
    /// BinderHub name/Helm release name [default: hub23]
    #[arg(short = 'n', long)]
    hub_name: Option<String>,

    /// Local Helm chart name [default: hub23-chart]
    #[arg(short = 'z', long)]
    chart_name: Option<PathBuf>,

    /// Name of Azure Kubernetes Service [default: hub23cluster]
    #[arg(short = 'c', long)]
    cluster_name: Option<String>,

    /// Azure Resource Group [default: Hub23]
    #[arg(short = 'g', long)]
    resource_group: Option<String>,

    /// Azure subscription for resources [default: Turing-BinderHub]
    #[arg(short = 's', long)]
    subscription: Option<String>,

    /// Login to Azure using a Managed System Identity
    #[arg(long)]
    identity: bool,

    /// Performs a dry-run upgrade of the Helm Chart
    #[arg(long)]
    dry_run: bool,

    /// Adds debugging output to helm upgrade command
    #[arg(long)]
    debug: bool,

    /// YAML file with settings; flags given on the command line take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// File the log is appended to
    #[arg(long, default_value = "upgrade.log")]
    log_file: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,

    /// Also print log lines to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Do not check that az, helm and kubectl are installed
    #[arg(long)]
    skip_preflight: bool,

    /// Print the resolved configuration as YAML and exit without upgrading
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            hub_name: self.hub_name.clone(),
            chart_name: self.chart_name.clone(),
            cluster_name: self.cluster_name.clone(),
            resource_group: self.resource_group.clone(),
            subscription: self.subscription.clone(),
            identity: self.identity,
            dry_run: self.dry_run,
            debug: self.debug,
        }
    }

    fn log_settings(&self) -> LogSettings {
        LogSettings {
            file: self.log_file.clone(),
            level: self.log_level.clone(),
            console: self.verbose,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let subscriber = match logging::subscriber(&cli.log_settings()) {
        Ok(subscriber) => subscriber,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    let _log_guard = tracing::subscriber::set_default(subscriber);

    if let Err(e) = run(&cli).await {
        if let Some(step) = e.downcast_ref::<UpgradeError>().and_then(UpgradeError::step) {
            error!("Upgrade aborted at step: {}", step);
        }
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Load the configuration and run the upgrade
async fn run(cli: &Cli) -> Result<()> {
    let config = UpgradeConfig::load(cli.config.as_deref(), cli.overrides())
        .context("Failed to load configuration")?;

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let upgrader = Upgrader::new(config, SystemRunner);
    info!(
        "Upgrading release {} from chart {}",
        upgrader.config().hub_name,
        upgrader.config().chart_name.display()
    );

    if !cli.skip_preflight {
        upgrader.check_prerequisites().await?;
    }

    upgrader.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_aliases() {
        let cli = Cli::try_parse_from([
            "hub-upgrade",
            "-n",
            "demo",
            "-z",
            "demo-chart",
            "-c",
            "demo-cluster",
            "-g",
            "Demo",
            "-s",
            "My Subscription",
            "--identity",
            "--dry-run",
            "--debug",
        ])
        .unwrap();

        let config = UpgradeConfig::default().with_overrides(cli.overrides());
        assert_eq!(config.hub_name, "demo");
        assert_eq!(config.chart_name, PathBuf::from("demo-chart"));
        assert_eq!(config.cluster_name, "demo-cluster");
        assert_eq!(config.resource_group, "Demo");
        assert_eq!(config.subscription, "My Subscription");
        assert!(config.identity && config.dry_run && config.debug);
    }

    #[test]
    fn test_no_flags_keep_defaults() {
        let cli = Cli::try_parse_from(["hub-upgrade"]).unwrap();

        let config = UpgradeConfig::default().with_overrides(cli.overrides());
        assert_eq!(config, UpgradeConfig::default());

        let log = cli.log_settings();
        assert_eq!(log.file, PathBuf::from("upgrade.log"));
        assert_eq!(log.level, "debug");
        assert!(!log.console);
        assert!(!cli.print_config);
    }
}

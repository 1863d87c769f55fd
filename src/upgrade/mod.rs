/// Upgrade orchestration for a BinderHub Helm release
mod step;

pub use step::Step;

use tracing::info;

use crate::azure::AzureCli;
use crate::config::UpgradeConfig;
use crate::error::UpgradeError;
use crate::helm::{HelmCli, UpgradeMode};
use crate::k8s::KubectlCli;
use crate::utils::command::CommandRunner;

/// Runs the login, chart update, upgrade and pod listing sequence.
///
/// Every step stops the run on its first failure. Nothing is retried and
/// nothing already applied is rolled back.
pub struct Upgrader<R> {
    config: UpgradeConfig,
    runner: R,
}

impl<R: CommandRunner> Upgrader<R> {
    pub fn new(config: UpgradeConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &UpgradeConfig {
        &self.config
    }

    pub fn mode(&self) -> UpgradeMode {
        UpgradeMode::from_flags(self.config.dry_run, self.config.debug)
    }

    /// Verify az, helm and kubectl can be launched
    pub async fn check_prerequisites(&self) -> Result<(), UpgradeError> {
        AzureCli::new(&self.runner).check_installed().await?;
        HelmCli::new(&self.runner).check_installed().await?;
        KubectlCli::new(&self.runner).check_installed().await?;
        Ok(())
    }

    /// Run the full sequence
    pub async fn run(&self) -> Result<(), UpgradeError> {
        if self.mode().is_dry_run() {
            info!("THIS IS A DRY-RUN. HELM CHART WILL NOT BE UPGRADED.");
        }

        self.login().await?;
        self.update_local_chart().await?;
        self.upgrade().await?;
        self.print_pods().await?;

        info!("✓ Upgrade of {} completed", self.config.hub_name);
        Ok(())
    }

    /// Log into Azure, select the subscription, fetch the cluster
    /// credentials and initialise the Helm client
    pub async fn login(&self) -> Result<(), UpgradeError> {
        let az = AzureCli::new(&self.runner);
        az.login(self.config.identity).await?;
        az.set_subscription(&self.config.subscription).await?;
        az.get_credentials(&self.config.cluster_name, &self.config.resource_group)
            .await?;

        HelmCli::new(&self.runner).init_client_only().await
    }

    /// Refresh the local chart's dependencies
    pub async fn update_local_chart(&self) -> Result<(), UpgradeError> {
        HelmCli::new(&self.runner)
            .dependency_update(&self.config.chart_name)
            .await
    }

    /// Upgrade the release with the configured value overlays
    pub async fn upgrade(&self) -> Result<String, UpgradeError> {
        HelmCli::new(&self.runner)
            .upgrade(
                &self.config.hub_name,
                &self.config.chart_name,
                &self.config.values_files,
                self.mode(),
            )
            .await
    }

    /// List the pods in the release's namespace
    pub async fn print_pods(&self) -> Result<String, UpgradeError> {
        KubectlCli::new(&self.runner)
            .get_pods(self.config.namespace())
            .await
    }
}

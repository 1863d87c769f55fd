/// Helm client: client init, chart dependency update and chart upgrade
use std::path::{Path, PathBuf};
use tracing::info;

use super::mode::UpgradeMode;
use crate::error::UpgradeError;
use crate::upgrade::Step;
use crate::utils::command::{check_tool_installed, CommandRunner, CommandSpec};

/// Helm client for chart operations
pub struct HelmCli<'a, R: ?Sized> {
    runner: &'a R,
}

impl<'a, R: CommandRunner + ?Sized> HelmCli<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Check if helm is installed
    pub async fn check_installed(&self) -> Result<(), UpgradeError> {
        check_tool_installed(
            self.runner,
            "helm",
            &["version", "--client"],
            "https://helm.sh/docs/intro/install/",
        )
        .await
    }

    /// Initialise the local Helm client without touching the cluster
    pub async fn init_client_only(&self) -> Result<(), UpgradeError> {
        info!("Initialising Helm");

        self.runner
            .run_step(Step::InitClient, &init_client_only_command())
            .await?;

        Ok(())
    }

    /// Refresh the dependencies of the local chart
    pub async fn dependency_update(&self, chart_dir: &Path) -> Result<(), UpgradeError> {
        info!(
            "Updating local chart dependencies: {}",
            chart_dir.display()
        );

        self.runner
            .run_step(
                Step::UpdateDependencies,
                &dependency_update_command(chart_dir),
            )
            .await?;

        Ok(())
    }

    /// Upgrade `release` to the local `chart` with the given value overlays
    pub async fn upgrade(
        &self,
        release: &str,
        chart: &Path,
        values_files: &[PathBuf],
        mode: UpgradeMode,
    ) -> Result<String, UpgradeError> {
        info!("{}", mode.description());

        self.runner
            .run_step(
                Step::Upgrade,
                &upgrade_command(release, chart, values_files, mode),
            )
            .await
    }
}

/// `helm init --client-only`
pub fn init_client_only_command() -> CommandSpec {
    CommandSpec::new("helm").args(["init", "--client-only"])
}

/// `helm dependency update`, run inside the chart directory
pub fn dependency_update_command(chart_dir: &Path) -> CommandSpec {
    CommandSpec::new("helm")
        .args(["dependency", "update"])
        .current_dir(chart_dir)
}

/// `helm upgrade <release> <chart> -f <values>... --wait [mode flags]`
pub fn upgrade_command(
    release: &str,
    chart: &Path,
    values_files: &[PathBuf],
    mode: UpgradeMode,
) -> CommandSpec {
    let mut spec = CommandSpec::new("helm")
        .arg("upgrade")
        .arg(release)
        .arg(chart.to_string_lossy());

    for values in values_files {
        spec = spec.arg("-f").arg(values.to_string_lossy());
    }

    spec.arg("--wait").args(mode.flags().iter().copied())
}

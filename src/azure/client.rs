/// Azure client: login, subscription selection and AKS credentials
use std::borrow::Cow;
use tracing::info;

use crate::error::UpgradeError;
use crate::upgrade::Step;
use crate::utils::command::{check_tool_installed, CommandRunner, CommandSpec};

/// Azure client for `az` operations
pub struct AzureCli<'a, R: ?Sized> {
    runner: &'a R,
}

impl<'a, R: CommandRunner + ?Sized> AzureCli<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Check if az is installed
    pub async fn check_installed(&self) -> Result<(), UpgradeError> {
        check_tool_installed(
            self.runner,
            "az",
            &["version"],
            "https://learn.microsoft.com/cli/azure/install-azure-cli",
        )
        .await
    }

    /// Log into Azure, optionally with a managed identity
    pub async fn login(&self, identity: bool) -> Result<(), UpgradeError> {
        if identity {
            info!("Logging into Azure with a Managed System Identity");
        } else {
            info!("Logging into Azure");
        }

        self.runner
            .run_step(Step::Login, &login_command(identity))
            .await?;

        info!("Successfully logged into Azure");
        Ok(())
    }

    /// Make `subscription` the active subscription
    pub async fn set_subscription(&self, subscription: &str) -> Result<(), UpgradeError> {
        info!("Setting Azure subscription: {}", subscription);

        self.runner
            .run_step(Step::SetSubscription, &set_subscription_command(subscription))
            .await?;

        info!("Successfully set Azure subscription: {}", subscription);
        Ok(())
    }

    /// Merge the AKS cluster credentials into the local kubeconfig
    pub async fn get_credentials(
        &self,
        cluster_name: &str,
        resource_group: &str,
    ) -> Result<(), UpgradeError> {
        info!("Setting kubectl context for: {}", cluster_name);

        self.runner
            .run_step(
                Step::FetchCredentials,
                &get_credentials_command(cluster_name, resource_group),
            )
            .await?;

        Ok(())
    }
}

/// `az login [--identity]`
pub fn login_command(identity: bool) -> CommandSpec {
    let spec = CommandSpec::new("az").arg("login");
    if identity {
        spec.arg("--identity")
    } else {
        spec
    }
}

/// `az account set -s <subscription>`
pub fn set_subscription_command(subscription: &str) -> CommandSpec {
    CommandSpec::new("az")
        .args(["account", "set", "-s"])
        .arg(quote_subscription(subscription))
}

/// `az aks get-credentials -n <cluster> -g <resource group>`
pub fn get_credentials_command(cluster_name: &str, resource_group: &str) -> CommandSpec {
    CommandSpec::new("az")
        .args(["aks", "get-credentials", "-n", cluster_name, "-g", resource_group])
}

/// Wrap subscription names containing a space in double quotes
pub fn quote_subscription(subscription: &str) -> Cow<'_, str> {
    if subscription.contains(' ') {
        Cow::Owned(format!("\"{}\"", subscription))
    } else {
        Cow::Borrowed(subscription)
    }
}

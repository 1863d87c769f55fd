/// Kubernetes operations client
use tracing::info;

use crate::error::UpgradeError;
use crate::upgrade::Step;
use crate::utils::command::{check_tool_installed, CommandRunner, CommandSpec};

/// Kubernetes client for kubectl operations
pub struct KubectlCli<'a, R: ?Sized> {
    runner: &'a R,
}

impl<'a, R: CommandRunner + ?Sized> KubectlCli<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Check if kubectl is installed
    pub async fn check_installed(&self) -> Result<(), UpgradeError> {
        check_tool_installed(
            self.runner,
            "kubectl",
            &["version", "--client"],
            "https://kubernetes.io/docs/tasks/tools/",
        )
        .await
    }

    /// List the pods in `namespace`; the listing is logged by the runner
    pub async fn get_pods(&self, namespace: &str) -> Result<String, UpgradeError> {
        info!("Fetching the Kubernetes pods");

        self.runner
            .run_step(Step::ListPods, &get_pods_command(namespace))
            .await
    }
}

/// `kubectl get pods -n <namespace>`
pub fn get_pods_command(namespace: &str) -> CommandSpec {
    CommandSpec::new("kubectl").args(["get", "pods", "-n", namespace])
}

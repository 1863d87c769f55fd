/// Configuration management for hub-upgrade
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for one upgrade run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeConfig {
    /// BinderHub name, also the Helm release name and the namespace
    pub hub_name: String,

    /// Path to the local Helm chart
    pub chart_name: PathBuf,

    /// Name of the Azure Kubernetes Service cluster
    pub cluster_name: String,

    /// Azure resource group holding the cluster
    pub resource_group: String,

    /// Azure subscription for the resources
    pub subscription: String,

    /// Log into Azure with a Managed System Identity
    pub identity: bool,

    /// Compute the upgrade without applying it
    pub dry_run: bool,

    /// Ask helm for debugging output
    pub debug: bool,

    /// Value overlays passed to `helm upgrade`, in order
    pub values_files: Vec<PathBuf>,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            hub_name: "hub23".to_string(),
            chart_name: PathBuf::from("hub23-chart"),
            cluster_name: "hub23cluster".to_string(),
            resource_group: "Hub23".to_string(),
            subscription: "Turing-BinderHub".to_string(),
            identity: false,
            dry_run: false,
            debug: false,
            values_files: vec![
                Path::new("deploy").join("prod.yaml"),
                Path::new(".secret").join("prod.yaml"),
            ],
        }
    }
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub hub_name: Option<String>,
    pub chart_name: Option<PathBuf>,
    pub cluster_name: Option<String>,
    pub resource_group: Option<String>,
    pub subscription: Option<String>,
    pub identity: bool,
    pub dry_run: bool,
    pub debug: bool,
}

impl UpgradeConfig {
    /// Load configuration from a YAML file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: UpgradeConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Build the configuration for a run: defaults, then the optional file,
    /// then command-line overrides
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> anyhow::Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line values on top of this configuration.
    /// Boolean switches can only turn a setting on.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(hub_name) = overrides.hub_name {
            self.hub_name = hub_name;
        }
        if let Some(chart_name) = overrides.chart_name {
            self.chart_name = chart_name;
        }
        if let Some(cluster_name) = overrides.cluster_name {
            self.cluster_name = cluster_name;
        }
        if let Some(resource_group) = overrides.resource_group {
            self.resource_group = resource_group;
        }
        if let Some(subscription) = overrides.subscription {
            self.subscription = subscription;
        }
        self.identity |= overrides.identity;
        self.dry_run |= overrides.dry_run;
        self.debug |= overrides.debug;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let names = [
            ("hub_name", self.hub_name.as_str()),
            ("cluster_name", self.cluster_name.as_str()),
            ("resource_group", self.resource_group.as_str()),
            ("subscription", self.subscription.as_str()),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", field);
            }
        }

        if self.chart_name.as_os_str().is_empty() {
            anyhow::bail!("chart_name cannot be empty");
        }

        if self.values_files.is_empty() {
            anyhow::bail!("at least one values file is required");
        }

        Ok(())
    }

    /// Render the configuration as YAML, in the format `--config` reads
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration")
    }

    /// Namespace the release is deployed into
    pub fn namespace(&self) -> &str {
        &self.hub_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = UpgradeConfig::default();
        assert_eq!(config.hub_name, "hub23");
        assert_eq!(config.chart_name, PathBuf::from("hub23-chart"));
        assert_eq!(config.cluster_name, "hub23cluster");
        assert_eq!(config.resource_group, "Hub23");
        assert_eq!(config.subscription, "Turing-BinderHub");
        assert!(!config.identity && !config.dry_run && !config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = UpgradeConfig::default();
        config.hub_name = String::new();
        assert!(config.validate().is_err());

        let mut config = UpgradeConfig::default();
        config.values_files.clear();
        assert!(config.validate().is_err());

        let mut config = UpgradeConfig::default();
        config.subscription = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_replace_only_given_values() {
        let config = UpgradeConfig::default().with_overrides(ConfigOverrides {
            hub_name: Some("demo".to_string()),
            dry_run: true,
            ..Default::default()
        });

        assert_eq!(config.hub_name, "demo");
        assert_eq!(config.namespace(), "demo");
        assert_eq!(config.cluster_name, "hub23cluster");
        assert!(config.dry_run);
        assert!(!config.debug);
    }

    #[test]
    fn test_load_from_file_then_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "hub_name: staging\ncluster_name: staging-cluster\ndebug: true\nvalues_files:\n  - deploy/staging.yaml"
        )
        .unwrap();

        let config = UpgradeConfig::load(
            Some(file.path()),
            ConfigOverrides {
                cluster_name: Some("override-cluster".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(config.hub_name, "staging");
        assert_eq!(config.cluster_name, "override-cluster");
        assert_eq!(config.resource_group, "Hub23");
        assert!(config.debug);
        assert_eq!(config.values_files, vec![PathBuf::from("deploy/staging.yaml")]);
    }

    #[test]
    fn test_printed_config_loads_back() {
        let config = UpgradeConfig::default().with_overrides(ConfigOverrides {
            hub_name: Some("demo".to_string()),
            subscription: Some("My Subscription".to_string()),
            debug: true,
            ..Default::default()
        });

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("hub_name: demo"), "{yaml}");
        assert!(yaml.contains("- deploy/prod.yaml"), "{yaml}");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        assert_eq!(UpgradeConfig::from_file(file.path()).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hub_name: [not, a, string]").unwrap();

        assert!(UpgradeConfig::load(Some(file.path()), ConfigOverrides::default()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = UpgradeConfig::load(
            Some(Path::new("/nonexistent/hub-upgrade.yaml")),
            ConfigOverrides::default(),
        );
        assert!(result.is_err());
    }
}

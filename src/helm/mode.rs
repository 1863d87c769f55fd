/// Flag combinations for `helm upgrade`
use std::fmt;

/// How `helm upgrade` is run, derived from the dry-run and debug flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeMode {
    DryRunDebug,
    DryRun,
    Debug,
    Apply,
}

impl UpgradeMode {
    pub fn from_flags(dry_run: bool, debug: bool) -> Self {
        match (dry_run, debug) {
            (true, true) => Self::DryRunDebug,
            (true, false) => Self::DryRun,
            (false, true) => Self::Debug,
            (false, false) => Self::Apply,
        }
    }

    /// Extra arguments appended after `--wait`
    pub fn flags(self) -> &'static [&'static str] {
        match self {
            Self::DryRunDebug => &["--dry-run", "--debug"],
            Self::DryRun => &["--dry-run"],
            Self::Debug => &["--debug"],
            Self::Apply => &[],
        }
    }

    pub fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRunDebug | Self::DryRun)
    }

    /// Log line announcing the mode before the upgrade runs
    pub fn description(self) -> &'static str {
        match self {
            Self::DryRunDebug => "Performing a dry-run helm upgrade with debugging output",
            Self::DryRun => "Performing a dry-run helm upgrade",
            Self::Debug => "Performing a helm upgrade with debugging output",
            Self::Apply => "Upgrading helm chart",
        }
    }
}

impl fmt::Display for UpgradeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

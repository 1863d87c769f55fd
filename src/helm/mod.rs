/// Helm chart management
pub mod client;
pub mod mode;

pub use client::HelmCli;
pub use mode::UpgradeMode;

/// Azure CLI operations
pub mod client;

pub use client::AzureCli;

//! Stackform core configuration
//!
//! This crate holds the configuration model for Stackform environments
//! (cluster sizing, load balancer, service discovery, network targeting),
//! YAML config loading, and git metadata discovery used to tag every
//! infrastructure operation with a source revision and repo slug.

pub mod config;
pub mod error;
pub mod git;
pub mod model;

// Re-exports
pub use config::{Config, RepoInfo, DEFAULT_NAMESPACE};
pub use error::{CoreError, Result};
pub use model::{
    Cluster, Discovery, EnvProvider, Environment, Loadbalancer, ProviderRuntime, VpcTarget,
};

//! Stack naming, tagging, and outcome classification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters submitted with a stack template.
pub type StackParams = HashMap<String, String>;

/// Tags attached to a stack.
pub type TagMap = HashMap<String, String>;

/// Prefix for every tag key written by Stackform.
pub const TAG_PREFIX: &str = "stackform";

/// Kind of infrastructure layer a stack provisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackType {
    /// Managed network
    Vpc,
    /// Passthrough referencing an externally supplied network
    Target,
    /// IAM rolesets
    Iam,
    /// Load balancer
    LoadBalancer,
    /// Compute cluster
    Env,
}

impl StackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackType::Vpc => "vpc",
            StackType::Target => "target",
            StackType::Iam => "iam",
            StackType::LoadBalancer => "loadbalancer",
            StackType::Env => "environment",
        }
    }
}

impl std::fmt::Display for StackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the canonical stack name for a layer of an environment.
pub fn stack_name(namespace: &str, stack_type: StackType, name: &str) -> String {
    format!("{namespace}-{stack_type}-{name}")
}

/// Uniform label set attached to every environment stack operation.
#[derive(Debug, Clone)]
pub struct EnvironmentTags<'a> {
    pub environment: &'a str,
    pub stack_type: StackType,
    pub provider: &'a str,
    pub revision: &'a str,
    pub repo: &'a str,
}

impl EnvironmentTags<'_> {
    /// Render the tags as the prefixed key/value map the control plane
    /// expects.
    pub fn tag_map(&self) -> TagMap {
        let mut tags = TagMap::new();
        tags.insert(format!("{TAG_PREFIX}:environment"), self.environment.to_string());
        tags.insert(format!("{TAG_PREFIX}:type"), self.stack_type.to_string());
        tags.insert(format!("{TAG_PREFIX}:provider"), self.provider.to_string());
        tags.insert(format!("{TAG_PREFIX}:revision"), self.revision.to_string());
        tags.insert(format!("{TAG_PREFIX}:repo"), self.repo.to_string());
        tags
    }
}

/// Terminal result of an asynchronous stack operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StackOutcome {
    /// Raw terminal status string from the control plane
    pub status: String,

    /// Human-readable reason accompanying the status
    pub status_reason: String,

    /// Output key/value mapping published by the stack
    pub outputs: HashMap<String, String>,

    /// When the stack last changed, if the control plane reports it
    pub last_updated: Option<DateTime<Utc>>,
}

impl StackOutcome {
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    /// Whether the terminal status is a clean success.
    ///
    /// Suffix matching is deliberate: the control plane's status vocabulary
    /// has several distinct `_COMPLETE` strings, and every rollback variant
    /// ends with `ROLLBACK_COMPLETE`.
    pub fn succeeded(&self) -> bool {
        self.status.ends_with("_COMPLETE") && !self.status.ends_with("ROLLBACK_COMPLETE")
    }
}

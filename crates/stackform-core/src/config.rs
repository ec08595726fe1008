//! Configuration loading
//!
//! The config file (`stackform.yml`) declares a namespace and the list of
//! environments. Repo metadata is not part of the file; it is discovered
//! from the surrounding git checkout and attached afterwards.

use crate::error::Result;
use crate::git;
use crate::model::Environment;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Namespace used when the config file does not set one.
pub const DEFAULT_NAMESPACE: &str = "stackform";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Prefix for every stack name managed by this config
    pub namespace: String,

    /// Declared environments
    pub environments: Vec<Environment>,

    /// Source metadata attached to stack tags; discovered, not configured
    #[serde(skip)]
    pub repo: RepoInfo,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            environments: Vec::new(),
            repo: RepoInfo::default(),
        }
    }
}

impl Config {
    /// Parse a config from YAML, defaulting the namespace when empty.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        if config.namespace.is_empty() {
            config.namespace = DEFAULT_NAMESPACE.to_string();
        }
        tracing::debug!(
            namespace = %config.namespace,
            environments = config.environments.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Load a config file and attach repo metadata discovered from the
    /// directory containing it. Missing git metadata is not fatal; the
    /// corresponding tags are simply left empty.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&yaml)?;

        let start = path.parent().unwrap_or_else(|| Path::new("."));
        match git::discover(start) {
            Ok(repo) => config.repo = repo,
            Err(err) => {
                tracing::warn!(error = %err, "unable to discover git metadata");
            }
        }
        Ok(config)
    }

    pub fn with_repo(mut self, repo: RepoInfo) -> Self {
        self.repo = repo;
        self
    }
}

/// Source repo metadata recorded on every stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoInfo {
    /// Repo slug, e.g. "acme/platform"
    pub slug: String,

    /// Abbreviated HEAD revision
    pub revision: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_environments() {
        let config = Config::from_yaml(
            r#"
namespace: acme
environments:
  - name: staging
    cluster:
      desiredCapacity: 2
      sshAllow: 10.0.0.0/8
    loadbalancer:
      hostedZone: example.com
      internal: true
  - name: production
    provider: ecs-fargate
"#,
        )
        .unwrap();

        assert_eq!(config.namespace, "acme");
        assert_eq!(config.environments.len(), 2);

        let staging = &config.environments[0];
        assert_eq!(staging.name, "staging");
        assert!(staging.provider.is_none());
        assert_eq!(staging.cluster.desired_capacity, Some(2));
        assert_eq!(staging.cluster.ssh_allow.as_deref(), Some("10.0.0.0/8"));
        assert_eq!(
            staging.loadbalancer.hosted_zone.as_deref(),
            Some("example.com")
        );
        assert!(staging.loadbalancer.internal);

        assert_eq!(
            config.environments[1].provider,
            Some(crate::model::EnvProvider::EcsFargate)
        );
    }

    #[test]
    fn namespace_defaults_when_missing() {
        let config = Config::from_yaml("environments: []").unwrap();
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn vpc_target_round_trip() {
        let config = Config::from_yaml(
            r#"
environments:
  - name: dev
    vpcTarget:
      vpcId: vpc-12345
      instanceSubnetIds: [subnet-1, subnet-2]
      elbSubnetIds: [subnet-3]
"#,
        )
        .unwrap();

        let target = &config.environments[0].vpc_target;
        assert_eq!(target.vpc_id.as_deref(), Some("vpc-12345"));
        assert_eq!(target.instance_subnet_ids, vec!["subnet-1", "subnet-2"]);
        assert_eq!(target.elb_subnet_ids, vec!["subnet-3"]);
    }
}

//! Environment configuration model
//!
//! An [`Environment`] describes one named deployment target: which compute
//! provider backs it, how its cluster is sized, how its load balancer is
//! exposed, and whether it manages its own network or points at an existing
//! one.

use serde::{Deserialize, Serialize};

/// AMI name glob for the ECS-optimized base image.
pub const ECS_IMAGE_PATTERN: &str = "amzn-ami-*-amazon-ecs-optimized";

/// AMI name glob for the plain EC2 base image (also used for bastions).
pub const EC2_IMAGE_PATTERN: &str = "amzn-ami-hvm-*-x86_64-gp2";

/// Compute provider backing an environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvProvider {
    /// ECS cluster on EC2 instances
    #[default]
    Ecs,
    /// ECS cluster on Fargate
    EcsFargate,
    /// Plain EC2 autoscaling group
    Ec2,
}

impl EnvProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvProvider::Ecs => "ecs",
            EnvProvider::EcsFargate => "ecs-fargate",
            EnvProvider::Ec2 => "ec2",
        }
    }

    /// Runtime characteristics for this provider: which template the
    /// compute stack uses, which base image to search for, and the
    /// container launch mode.
    pub fn runtime(&self) -> ProviderRuntime {
        match self {
            EnvProvider::Ecs => ProviderRuntime {
                template: "env-ecs.yml",
                image_pattern: ECS_IMAGE_PATTERN,
                launch_type: "EC2",
            },
            EnvProvider::EcsFargate => ProviderRuntime {
                template: "env-ecs.yml",
                image_pattern: ECS_IMAGE_PATTERN,
                launch_type: "FARGATE",
            },
            EnvProvider::Ec2 => ProviderRuntime {
                template: "env-ec2.yml",
                image_pattern: EC2_IMAGE_PATTERN,
                launch_type: "",
            },
        }
    }
}

impl std::fmt::Display for EnvProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-provider compute runtime selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderRuntime {
    /// Template name for the compute stack
    pub template: &'static str,

    /// AMI name glob used when no explicit image id is configured
    pub image_pattern: &'static str,

    /// Launch mode for containerized workloads ("" for plain EC2)
    pub launch_type: &'static str,
}

/// One named deployment environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Environment {
    /// Unique name, matched case-insensitively
    pub name: String,

    /// Compute provider; `None` defaults to ECS at resolution time
    pub provider: Option<EnvProvider>,

    /// Cluster sizing and instance configuration
    pub cluster: Cluster,

    /// Load balancer exposure
    pub loadbalancer: Loadbalancer,

    /// Service discovery configuration
    pub discovery: Discovery,

    /// Existing network to target instead of managing one
    pub vpc_target: VpcTarget,
}

/// Cluster sizing and instance configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cluster {
    /// EC2 instance type
    pub instance_type: Option<String>,

    /// Explicit AMI id; when unset the latest image matching the
    /// provider's pattern is used
    pub image_id: Option<String>,

    /// OS family tag passed through to the template
    pub image_os_type: Option<String>,

    /// VPC instance tenancy (default or dedicated)
    pub instance_tenancy: Option<String>,

    pub desired_capacity: Option<u32>,
    pub min_size: Option<u32>,
    pub max_size: Option<u32>,

    /// SSH key pair name; also enables the bastion host in a managed network
    pub key_name: Option<String>,

    /// CIDR allowed to reach SSH; defaults to open
    pub ssh_allow: Option<String>,

    /// Autoscaling target CPU reservation percentage
    pub target_cpu_reservation: Option<u32>,

    /// Autoscaling target memory reservation percentage
    pub target_memory_reservation: Option<u32>,

    /// HTTP proxy injected into instance user data
    pub http_proxy: Option<String>,

    /// Free-form user data appended to the launch configuration
    pub extra_user_data: Option<String>,
}

/// Load balancer exposure for an environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Loadbalancer {
    /// TLS certificate identifier
    pub certificate: Option<String>,

    /// Route53 hosted zone to register in
    pub hosted_zone: Option<String>,

    /// Host name within the hosted zone; defaults to the environment name
    pub name: Option<String>,

    /// Internal (true) or internet-facing (false)
    pub internal: bool,
}

/// Service discovery configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Discovery {
    /// Discovery provider; "consul" is no longer supported
    pub provider: Option<String>,

    /// Private namespace name; defaults to `<environment>.<namespace>.local`
    pub name: Option<String>,
}

/// Reference to a network not managed by this environment.
///
/// Either another environment's network (by name, optionally in a different
/// namespace) or an externally supplied one (by VPC id and subnet lists).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VpcTarget {
    /// Borrow the network of this environment
    pub environment: Option<String>,

    /// Namespace of the borrowed environment, when different from ours
    pub namespace: Option<String>,

    /// Externally supplied VPC id
    pub vpc_id: Option<String>,

    /// Subnets for cluster instances
    pub instance_subnet_ids: Vec<String>,

    /// Subnets for the load balancer
    pub elb_subnet_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_runtime_ecs() {
        let runtime = EnvProvider::Ecs.runtime();
        assert_eq!(runtime.template, "env-ecs.yml");
        assert_eq!(runtime.image_pattern, ECS_IMAGE_PATTERN);
        assert_eq!(runtime.launch_type, "EC2");
    }

    #[test]
    fn provider_runtime_fargate() {
        let runtime = EnvProvider::EcsFargate.runtime();
        assert_eq!(runtime.template, "env-ecs.yml");
        assert_eq!(runtime.image_pattern, ECS_IMAGE_PATTERN);
        assert_eq!(runtime.launch_type, "FARGATE");
    }

    #[test]
    fn provider_runtime_ec2() {
        let runtime = EnvProvider::Ec2.runtime();
        assert_eq!(runtime.template, "env-ec2.yml");
        assert_eq!(runtime.image_pattern, EC2_IMAGE_PATTERN);
        assert_eq!(runtime.launch_type, "");
    }

    #[test]
    fn provider_defaults_to_ecs() {
        assert_eq!(EnvProvider::default(), EnvProvider::Ecs);
    }

    #[test]
    fn provider_deserializes_kebab_case() {
        let p: EnvProvider = serde_yaml::from_str("ecs-fargate").unwrap();
        assert_eq!(p, EnvProvider::EcsFargate);
    }
}

//! Network (VPC) stage

use super::{EnvironmentContext, OPEN_CIDR};
use crate::error::{Result, WorkflowError};
use crate::executor::Stage;
use async_trait::async_trait;
use stackform_cloud::{stack_name, AzCounter, ImageFinder, StackManager, StackParams, StackType};
use stackform_core::model::EC2_IMAGE_PATTERN;
use std::sync::Arc;

const MANAGED_TEMPLATE: &str = "vpc.yml";
const TARGET_TEMPLATE: &str = "vpc-target.yml";

/// Provisions or resolves the environment's network, then publishes the
/// symbolic network outputs consumed by the load balancer and compute
/// stages.
///
/// Three mutually exclusive branches, in priority order:
/// 1. borrow another environment's network (no template submitted),
/// 2. reference an externally supplied network by attributes,
/// 3. manage the full network lifecycle here.
pub(crate) struct NetworkStage {
    namespace: String,
    stacks: Arc<dyn StackManager>,
    images: Arc<dyn ImageFinder>,
    azs: Arc<dyn AzCounter>,
}

impl NetworkStage {
    pub(crate) fn new(
        namespace: String,
        stacks: Arc<dyn StackManager>,
        images: Arc<dyn ImageFinder>,
        azs: Arc<dyn AzCounter>,
    ) -> Self {
        Self {
            namespace,
            stacks,
            images,
            azs,
        }
    }
}

#[async_trait]
impl Stage<EnvironmentContext> for NetworkStage {
    fn name(&self) -> &str {
        "upsert-network"
    }

    async fn run(&self, ctx: &mut EnvironmentContext) -> Result<()> {
        let environment = ctx.environment()?.clone();
        let target = &environment.vpc_target;
        let mut vpc_params = StackParams::new();

        let (vpc_stack_name, template) = if let Some(target_env) =
            super::non_empty(&target.environment)
        {
            // Another environment owns the network; no health check is made
            // here, the symbolic references are resolved downstream.
            tracing::debug!("network target references another environment; borrowing its network");
            let target_namespace =
                super::non_empty(&target.namespace).unwrap_or(self.namespace.as_str());
            (
                stack_name(target_namespace, StackType::Vpc, target_env),
                None,
            )
        } else if let Some(vpc_id) = super::non_empty(&target.vpc_id) {
            tracing::debug!("network target supplies attributes; upserting the passthrough stack");
            vpc_params.insert("VpcId".to_string(), vpc_id.to_string());
            vpc_params.insert("ElbSubnetIds".to_string(), target.elb_subnet_ids.join(","));
            vpc_params.insert(
                "InstanceSubnetIds".to_string(),
                target.instance_subnet_ids.join(","),
            );
            (
                stack_name(&self.namespace, StackType::Target, &environment.name),
                Some(TARGET_TEMPLATE),
            )
        } else {
            tracing::debug!("no network target; upserting the managed network stack");
            let cluster = &environment.cluster;

            if let Some(tenancy) = super::non_empty(&cluster.instance_tenancy) {
                vpc_params.insert("InstanceTenancy".to_string(), tenancy.to_string());
            }
            vpc_params.insert(
                "SshAllow".to_string(),
                super::non_empty(&cluster.ssh_allow)
                    .unwrap_or(OPEN_CIDR)
                    .to_string(),
            );
            if let Some(key_name) = super::non_empty(&cluster.key_name) {
                vpc_params.insert("BastionKeyName".to_string(), key_name.to_string());
                let bastion_image = self.images.find_latest_image_id(EC2_IMAGE_PATTERN).await?;
                vpc_params.insert("BastionImageId".to_string(), bastion_image);
            }
            vpc_params.insert(
                "ElbInternal".to_string(),
                environment.loadbalancer.internal.to_string(),
            );
            (
                stack_name(&self.namespace, StackType::Vpc, &environment.name),
                Some(MANAGED_TEMPLATE),
            )
        };

        let az_count = self.azs.count_azs().await?;
        if az_count < 2 {
            return Err(WorkflowError::InsufficientAvailabilityZones(az_count));
        }
        // Only the managed template sizes itself by AZ count.
        if template == Some(MANAGED_TEMPLATE) {
            vpc_params.insert("AZCount".to_string(), az_count.to_string());
        }

        if let Some(template) = template {
            tracing::info!(environment = %environment.name, "upserting network for environment");

            let tags = super::build_tags(&environment, StackType::Vpc, ctx);
            let data = super::template_data(&environment)?;
            self.stacks
                .upsert_stack(
                    &vpc_stack_name,
                    template,
                    &data,
                    &vpc_params,
                    &tags,
                    &ctx.cloudformation_role_arn,
                )
                .await?;
            super::await_clean_completion(self.stacks.as_ref(), &vpc_stack_name).await?;
        }

        ctx.compute_params
            .insert("VpcId".to_string(), format!("{vpc_stack_name}-VpcId"));
        ctx.compute_params.insert(
            "InstanceSubnetIds".to_string(),
            format!("{vpc_stack_name}-InstanceSubnetIds"),
        );
        ctx.elb_params
            .insert("VpcId".to_string(), format!("{vpc_stack_name}-VpcId"));
        ctx.elb_params.insert(
            "ElbSubnetIds".to_string(),
            format!("{vpc_stack_name}-ElbSubnetIds"),
        );

        Ok(())
    }
}

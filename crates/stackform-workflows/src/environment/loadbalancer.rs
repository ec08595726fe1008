//! Load balancer stage

use super::EnvironmentContext;
use crate::error::Result;
use crate::executor::Stage;
use async_trait::async_trait;
use stackform_cloud::{stack_name, StackManager, StackType};
use std::sync::Arc;

const ELB_TEMPLATE: &str = "elb.yml";

/// Provisions the environment's load balancer on top of the network
/// parameters already published, then publishes the security group
/// reference the compute stage uses for ingress rules.
pub(crate) struct LoadBalancerStage {
    namespace: String,
    stacks: Arc<dyn StackManager>,
}

impl LoadBalancerStage {
    pub(crate) fn new(namespace: String, stacks: Arc<dyn StackManager>) -> Self {
        Self { namespace, stacks }
    }
}

#[async_trait]
impl Stage<EnvironmentContext> for LoadBalancerStage {
    fn name(&self) -> &str {
        "upsert-loadbalancer"
    }

    async fn run(&self, ctx: &mut EnvironmentContext) -> Result<()> {
        let environment = ctx.environment()?.clone();
        let elb_stack_name = stack_name(&self.namespace, StackType::LoadBalancer, &environment.name);

        tracing::info!(environment = %environment.name, "upserting load balancer for environment");

        let loadbalancer = &environment.loadbalancer;
        if let Some(certificate) = super::non_empty(&loadbalancer.certificate) {
            ctx.elb_params
                .insert("ElbCert".to_string(), certificate.to_string());
        }
        if let Some(hosted_zone) = super::non_empty(&loadbalancer.hosted_zone) {
            ctx.elb_params
                .insert("ElbDomainName".to_string(), hosted_zone.to_string());
            let host_name = super::non_empty(&loadbalancer.name).unwrap_or(&environment.name);
            ctx.elb_params
                .insert("ElbHostName".to_string(), host_name.to_string());
        }

        let discovery_name = match super::non_empty(&environment.discovery.name) {
            Some(name) => name.to_string(),
            None => format!("{}.{}.local", environment.name, self.namespace),
        };
        ctx.elb_params
            .insert("ServiceDiscoveryName".to_string(), discovery_name);
        ctx.elb_params.insert(
            "ElbInternal".to_string(),
            loadbalancer.internal.to_string(),
        );

        let tags = super::build_tags(&environment, StackType::LoadBalancer, ctx);
        let data = super::template_data(&environment)?;
        self.stacks
            .upsert_stack(
                &elb_stack_name,
                ELB_TEMPLATE,
                &data,
                &ctx.elb_params,
                &tags,
                &ctx.cloudformation_role_arn,
            )
            .await?;
        super::await_clean_completion(self.stacks.as_ref(), &elb_stack_name).await?;

        ctx.compute_params.insert(
            "ElbSecurityGroup".to_string(),
            format!("{elb_stack_name}-ElbInstanceSecurityGroup"),
        );

        Ok(())
    }
}

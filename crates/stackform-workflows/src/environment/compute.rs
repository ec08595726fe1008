//! Compute cluster stage

use super::{EnvironmentContext, OPEN_CIDR};
use crate::error::Result;
use crate::executor::Stage;
use async_trait::async_trait;
use stackform_cloud::{stack_name, ImageFinder, StackManager, StackType};
use std::sync::Arc;

/// Provisions the compute cluster, the terminal stage of the pipeline.
///
/// The provider variant picks the template, base-image pattern, and launch
/// mode; everything else is an optional scalar copied from configuration
/// only when present.
pub(crate) struct ComputeStage {
    namespace: String,
    stacks: Arc<dyn StackManager>,
    images: Arc<dyn ImageFinder>,
}

impl ComputeStage {
    pub(crate) fn new(
        namespace: String,
        stacks: Arc<dyn StackManager>,
        images: Arc<dyn ImageFinder>,
    ) -> Self {
        Self {
            namespace,
            stacks,
            images,
        }
    }
}

#[async_trait]
impl Stage<EnvironmentContext> for ComputeStage {
    fn name(&self) -> &str {
        "upsert-compute"
    }

    async fn run(&self, ctx: &mut EnvironmentContext) -> Result<()> {
        let environment = ctx.environment()?.clone();
        let provider = environment.provider.unwrap_or_default();
        tracing::debug!(provider = %provider, "using provider for environment");

        let runtime = provider.runtime();
        let env_stack_name = stack_name(&self.namespace, StackType::Env, &environment.name);

        ctx.compute_params
            .insert("LaunchType".to_string(), runtime.launch_type.to_string());

        tracing::info!(environment = %environment.name, "upserting compute cluster for environment");

        let cluster = &environment.cluster;
        ctx.compute_params.insert(
            "SshAllow".to_string(),
            super::non_empty(&cluster.ssh_allow)
                .unwrap_or(OPEN_CIDR)
                .to_string(),
        );
        if let Some(instance_type) = super::non_empty(&cluster.instance_type) {
            ctx.compute_params
                .insert("InstanceType".to_string(), instance_type.to_string());
        }
        if let Some(user_data) = super::non_empty(&cluster.extra_user_data) {
            ctx.compute_params
                .insert("ExtraUserData".to_string(), user_data.to_string());
        }
        let image_id = match super::non_empty(&cluster.image_id) {
            Some(image_id) => image_id.to_string(),
            None => {
                self.images
                    .find_latest_image_id(runtime.image_pattern)
                    .await?
            }
        };
        ctx.compute_params.insert("ImageId".to_string(), image_id);
        if let Some(os_type) = super::non_empty(&cluster.image_os_type) {
            ctx.compute_params
                .insert("ImageOsType".to_string(), os_type.to_string());
        }
        if let Some(desired) = cluster.desired_capacity {
            ctx.compute_params
                .insert("DesiredCapacity".to_string(), desired.to_string());
        }
        if let Some(min_size) = cluster.min_size {
            ctx.compute_params
                .insert("MinSize".to_string(), min_size.to_string());
        }
        if let Some(max_size) = cluster.max_size {
            ctx.compute_params
                .insert("MaxSize".to_string(), max_size.to_string());
        }
        if let Some(key_name) = super::non_empty(&cluster.key_name) {
            ctx.compute_params
                .insert("KeyName".to_string(), key_name.to_string());
        }
        if let Some(cpu) = cluster.target_cpu_reservation {
            ctx.compute_params
                .insert("TargetCPUReservation".to_string(), cpu.to_string());
        }
        if let Some(memory) = cluster.target_memory_reservation {
            ctx.compute_params
                .insert("TargetMemoryReservation".to_string(), memory.to_string());
        }
        if let Some(proxy) = super::non_empty(&cluster.http_proxy) {
            ctx.compute_params
                .insert("HttpProxy".to_string(), proxy.to_string());
        }

        let tags = super::build_tags(&environment, StackType::Env, ctx);
        let data = super::template_data(&environment)?;
        self.stacks
            .upsert_stack(
                &env_stack_name,
                runtime.template,
                &data,
                &ctx.compute_params,
                &tags,
                &ctx.cloudformation_role_arn,
            )
            .await?;
        super::await_clean_completion(self.stacks.as_ref(), &env_stack_name).await?;

        Ok(())
    }
}

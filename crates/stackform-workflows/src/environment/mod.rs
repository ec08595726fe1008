//! Environment upsert workflow
//!
//! Provisions the layered infrastructure of one named environment: IAM
//! rolesets, network, load balancer, then the compute cluster. Each layer
//! is an idempotent upsert followed by a blocking wait for terminal status;
//! earlier layers publish parameters consumed by later ones through the
//! [`EnvironmentContext`].

mod compute;
mod loadbalancer;
mod network;
mod resolver;
mod roleset;

use crate::error::{Result, WorkflowError};
use crate::executor::{Pipeline, Stage};
use stackform_cloud::{
    CloudServices, EnvironmentTags, StackManager, StackOutcome, StackParams, StackType, TagMap,
};
use stackform_core::{Config, Environment, RepoInfo};

/// CIDR used when no SSH allow range is configured.
const OPEN_CIDR: &str = "0.0.0.0/0";

/// Mutable state shared across the stages of one upsert invocation.
///
/// Owned by exactly one workflow; stages receive it by exclusive reference,
/// so there is no aliasing between invocations or stages.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentContext {
    pub(crate) environment: Option<Environment>,
    pub(crate) cloudformation_role_arn: String,
    pub(crate) compute_params: StackParams,
    pub(crate) elb_params: StackParams,
    pub(crate) revision: String,
    pub(crate) repo_slug: String,
}

impl EnvironmentContext {
    fn new(repo: &RepoInfo) -> Self {
        Self {
            revision: repo.revision.clone(),
            repo_slug: repo.slug.clone(),
            ..Self::default()
        }
    }

    /// The environment resolved from configuration. Errors if the resolver
    /// stage has not run yet.
    pub fn environment(&self) -> Result<&Environment> {
        self.environment
            .as_ref()
            .ok_or(WorkflowError::EnvironmentNotResolved)
    }

    /// Parameters accumulated for the compute stack.
    pub fn compute_params(&self) -> &StackParams {
        &self.compute_params
    }

    /// Parameters accumulated for the load balancer stack.
    pub fn loadbalancer_params(&self) -> &StackParams {
        &self.elb_params
    }

    /// Administrative role ARN every stack submission runs under.
    pub fn cloudformation_role_arn(&self) -> &str {
        &self.cloudformation_role_arn
    }
}

/// Workflow that upserts every layer of one environment.
pub struct EnvironmentUpserter {
    pipeline: Pipeline<EnvironmentContext>,
    context: EnvironmentContext,
}

impl EnvironmentUpserter {
    /// Build the fixed pipeline for `environment_name`. The dependency
    /// chain is linear by construction: rolesets, then network, then load
    /// balancer, then compute. Each layer only consumes parameters written
    /// by layers strictly before it.
    pub fn new(
        config: &Config,
        environment_name: impl Into<String>,
        services: CloudServices,
    ) -> Self {
        let context = EnvironmentContext::new(&config.repo);
        let namespace = config.namespace.clone();

        let stages: Vec<Box<dyn Stage<EnvironmentContext>>> = vec![
            Box::new(resolver::EnvironmentResolver::new(
                config.environments.clone(),
                environment_name,
            )),
            Box::new(roleset::RolesetStage::new(services.rolesets)),
            Box::new(network::NetworkStage::new(
                namespace.clone(),
                services.stacks.clone(),
                services.images.clone(),
                services.azs,
            )),
            Box::new(loadbalancer::LoadBalancerStage::new(
                namespace.clone(),
                services.stacks.clone(),
            )),
            Box::new(compute::ComputeStage::new(
                namespace,
                services.stacks,
                services.images,
            )),
        ];

        Self {
            pipeline: Pipeline::new(stages),
            context,
        }
    }

    /// Run the pipeline to completion, returning the final context.
    pub async fn run(mut self) -> Result<EnvironmentContext> {
        self.pipeline.run(&mut self.context).await?;
        Ok(self.context)
    }
}

/// Treat `Some("")` from configuration the same as unset.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Tag set attached to every stack of this environment.
pub(crate) fn build_tags(
    environment: &Environment,
    stack_type: StackType,
    ctx: &EnvironmentContext,
) -> TagMap {
    EnvironmentTags {
        environment: &environment.name,
        stack_type,
        provider: environment.provider.unwrap_or_default().as_str(),
        revision: &ctx.revision,
        repo: &ctx.repo_slug,
    }
    .tag_map()
}

/// Environment payload handed to the stack manager for template rendering.
pub(crate) fn template_data(environment: &Environment) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(environment).map_err(stackform_cloud::CloudError::Json)?)
}

/// Block until the named stack is terminal and classify the outcome.
///
/// An absent outcome is a hard failure naming the stack; a terminal status
/// that is not a clean success fails with status and reason.
pub(crate) async fn await_clean_completion(
    stacks: &dyn StackManager,
    stack_name: &str,
) -> Result<StackOutcome> {
    tracing::debug!(stack = stack_name, "waiting for stack to complete");

    let Some(outcome) = stacks.await_final_status(stack_name).await else {
        return Err(WorkflowError::StackUntracked(stack_name.to_string()));
    };
    if !outcome.succeeded() {
        return Err(WorkflowError::StackFailed {
            name: stack_name.to_string(),
            status: outcome.status,
            reason: outcome.status_reason,
        });
    }
    Ok(outcome)
}

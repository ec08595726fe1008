//! IAM roleset stage

use super::EnvironmentContext;
use crate::error::Result;
use crate::executor::Stage;
use async_trait::async_trait;
use stackform_cloud::RolesetManager;
use std::sync::Arc;

/// Upserts the shared and environment-scoped rolesets.
///
/// Later stack submissions run under the administrative role read back
/// here, rather than under the caller's own credentials. Identity setup is
/// not optional; any failure aborts the pipeline.
pub(crate) struct RolesetStage {
    rolesets: Arc<dyn RolesetManager>,
}

impl RolesetStage {
    pub(crate) fn new(rolesets: Arc<dyn RolesetManager>) -> Self {
        Self { rolesets }
    }
}

#[async_trait]
impl Stage<EnvironmentContext> for RolesetStage {
    fn name(&self) -> &str {
        "upsert-rolesets"
    }

    async fn run(&self, ctx: &mut EnvironmentContext) -> Result<()> {
        self.rolesets.upsert_common_roleset().await?;

        let common = self.rolesets.get_common_roleset().await?;
        ctx.cloudformation_role_arn = common
            .get("CloudFormationRoleArn")
            .cloned()
            .unwrap_or_default();

        let environment_name = ctx.environment()?.name.clone();
        self.rolesets
            .upsert_environment_roleset(&environment_name)
            .await?;

        let environment_roles = self
            .rolesets
            .get_environment_roleset(&environment_name)
            .await?;
        ctx.compute_params.insert(
            "EC2InstanceProfileArn".to_string(),
            environment_roles
                .get("EC2InstanceProfileArn")
                .cloned()
                .unwrap_or_default(),
        );

        Ok(())
    }
}

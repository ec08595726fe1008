//! Environment resolution stage

use super::EnvironmentContext;
use crate::error::{Result, WorkflowError};
use crate::executor::Stage;
use async_trait::async_trait;
use stackform_core::{EnvProvider, Environment};

/// Finds the target environment in configuration and stores it in the
/// context for every later stage.
pub(crate) struct EnvironmentResolver {
    environments: Vec<Environment>,
    target: String,
}

impl EnvironmentResolver {
    pub(crate) fn new(environments: Vec<Environment>, target: impl Into<String>) -> Self {
        Self {
            environments,
            target: target.into(),
        }
    }
}

#[async_trait]
impl Stage<EnvironmentContext> for EnvironmentResolver {
    fn name(&self) -> &str {
        "resolve-environment"
    }

    async fn run(&self, ctx: &mut EnvironmentContext) -> Result<()> {
        for environment in &self.environments {
            if !environment.name.eq_ignore_ascii_case(&self.target) {
                continue;
            }

            if let Some(provider) = super::non_empty(&environment.discovery.provider)
                && provider == "consul"
            {
                return Err(WorkflowError::UnsupportedDiscoveryProvider(
                    provider.to_string(),
                ));
            }

            let mut environment = environment.clone();
            if environment.provider.is_none() {
                environment.provider = Some(EnvProvider::default());
            }
            ctx.environment = Some(environment);
            return Ok(());
        }
        Err(WorkflowError::EnvironmentNotFound(self.target.clone()))
    }
}

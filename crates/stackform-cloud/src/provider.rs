//! Control-plane capability traits
//!
//! Each trait covers one capability the workflow engine needs. A real
//! control-plane manager typically implements several of them on the same
//! type; the workflow only depends on the trait objects bundled in
//! [`CloudServices`].

use crate::error::Result;
use crate::stack::{StackOutcome, StackParams, TagMap};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Role name to ARN mapping returned by roleset reads.
pub type Roleset = HashMap<String, String>;

/// Idempotent create-or-update of an infrastructure stack.
#[async_trait]
pub trait StackUpserter: Send + Sync {
    /// Submit a stack operation. Must be safe to call when the stack
    /// already exists in a matching configuration; a no-op outcome is
    /// acceptable.
    async fn upsert_stack(
        &self,
        name: &str,
        template: &str,
        data: &serde_json::Value,
        params: &StackParams,
        tags: &TagMap,
        role_arn: &str,
    ) -> Result<()>;
}

/// Blocking wait for a stack operation to reach a terminal state.
#[async_trait]
pub trait StackWaiter: Send + Sync {
    /// Block until the named operation is terminal. `None` means the
    /// operation could not be tracked at all.
    async fn await_final_status(&self, name: &str) -> Option<StackOutcome>;
}

/// Combined submit-and-wait capability of a stack manager.
pub trait StackManager: StackUpserter + StackWaiter {}

impl<T: StackUpserter + StackWaiter> StackManager for T {}

/// Resolution of the most recent base image matching a name pattern.
#[async_trait]
pub trait ImageFinder: Send + Sync {
    async fn find_latest_image_id(&self, pattern: &str) -> Result<String>;
}

/// Availability-zone count for the target region.
#[async_trait]
pub trait AzCounter: Send + Sync {
    async fn count_azs(&self) -> Result<usize>;
}

/// Management of the shared and per-environment IAM rolesets.
#[async_trait]
pub trait RolesetManager: Send + Sync {
    /// Upsert the roleset shared by every environment.
    async fn upsert_common_roleset(&self) -> Result<()>;

    /// Read back the shared roleset.
    async fn get_common_roleset(&self) -> Result<Roleset>;

    /// Upsert the roleset scoped to one environment.
    async fn upsert_environment_roleset(&self, environment_name: &str) -> Result<()>;

    /// Read back an environment's roleset.
    async fn get_environment_roleset(&self, environment_name: &str) -> Result<Roleset>;
}

/// Bundle of control-plane handles threaded into a workflow.
#[derive(Clone)]
pub struct CloudServices {
    pub stacks: Arc<dyn StackManager>,
    pub rolesets: Arc<dyn RolesetManager>,
    pub images: Arc<dyn ImageFinder>,
    pub azs: Arc<dyn AzCounter>,
}

//! Sequential pipeline executor
//!
//! The control backbone of every workflow: an ordered list of stages run
//! one at a time against a mutable context. The context is handed to each
//! stage by exclusive reference, so writes made by stage N are visible to
//! stage N+1 without any shared-state aliasing.

use crate::error::Result;
use async_trait::async_trait;

/// One unit of work in a pipeline.
#[async_trait]
pub trait Stage<C>: Send + Sync {
    /// Stage name, used for logging only.
    fn name(&self) -> &str;

    async fn run(&self, ctx: &mut C) -> Result<()>;
}

/// Ordered sequence of stages, halting at the first failure.
///
/// No retries, no parallelism, no rollback of already-applied stages;
/// failures are reported upward for the operator to remediate.
pub struct Pipeline<C> {
    stages: Vec<Box<dyn Stage<C>>>,
}

impl<C: Send> Pipeline<C> {
    pub fn new(stages: Vec<Box<dyn Stage<C>>>) -> Self {
        Self { stages }
    }

    /// Run every stage in order. Returns `Ok(())` only if all succeeded.
    pub async fn run(&self, ctx: &mut C) -> Result<()> {
        for stage in &self.stages {
            tracing::debug!(stage = stage.name(), "running stage");
            if let Err(err) = stage.run(ctx).await {
                tracing::debug!(stage = stage.name(), error = %err, "stage failed, halting pipeline");
                return Err(err);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkflowError;

    struct Record {
        label: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl Stage<Vec<&'static str>> for Record {
        fn name(&self) -> &str {
            self.label
        }

        async fn run(&self, ctx: &mut Vec<&'static str>) -> Result<()> {
            ctx.push(self.label);
            if self.fail {
                Err(WorkflowError::StackUntracked(self.label.into()))
            } else {
                Ok(())
            }
        }
    }

    fn stage(label: &'static str, fail: bool) -> Box<dyn Stage<Vec<&'static str>>> {
        Box::new(Record { label, fail })
    }

    #[tokio::test]
    async fn runs_stages_in_order() {
        let pipeline = Pipeline::new(vec![
            stage("first", false),
            stage("second", false),
            stage("third", false),
        ]);

        let mut ran = Vec::new();
        pipeline.run(&mut ran).await.unwrap();
        assert_eq!(ran, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn halts_at_first_failure() {
        let pipeline = Pipeline::new(vec![
            stage("first", false),
            stage("second", true),
            stage("third", false),
        ]);

        let mut ran = Vec::new();
        let err = pipeline.run(&mut ran).await.unwrap_err();
        assert_eq!(ran, vec!["first", "second"]);
        assert!(matches!(err, WorkflowError::StackUntracked(name) if name == "second"));
    }

    #[tokio::test]
    async fn empty_pipeline_succeeds() {
        let pipeline: Pipeline<Vec<&'static str>> = Pipeline::new(Vec::new());
        let mut ran = Vec::new();
        pipeline.run(&mut ran).await.unwrap();
        assert!(ran.is_empty());
    }
}

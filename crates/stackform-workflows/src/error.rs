//! Workflow error types

use stackform_cloud::CloudError;
use thiserror::Error;

/// Errors produced while running a workflow.
///
/// The first failure at any stage aborts the rest of the pipeline; nothing
/// already applied is rolled back.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Warning class: nothing to do rather than something broke.
    #[error("unable to find environment named '{0}' in configuration")]
    EnvironmentNotFound(String),

    /// A stage ran before the resolver populated the context. Indicates a
    /// miswired pipeline, not bad user input.
    #[error("environment has not been resolved")]
    EnvironmentNotResolved,

    #[error("'{0}' is no longer supported as a service discovery provider")]
    UnsupportedDiscoveryProvider(String),

    #[error("only found {0} availability zones, need at least 2")]
    InsufficientAvailabilityZones(usize),

    /// The control plane could not track the submitted operation at all.
    #[error("unable to create stack '{0}'")]
    StackUntracked(String),

    #[error("stack '{name}' ended in failed status {status} {reason}")]
    StackFailed {
        name: String,
        status: String,
        reason: String,
    },

    #[error(transparent)]
    Cloud(#[from] CloudError),
}

impl WorkflowError {
    /// Whether this error signals "nothing to do" rather than a defect.
    pub fn is_warning(&self) -> bool {
        matches!(self, WorkflowError::EnvironmentNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_not_found_is_a_warning() {
        let err = WorkflowError::EnvironmentNotFound("staging".into());
        assert!(err.is_warning());
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn other_errors_are_not_warnings() {
        assert!(!WorkflowError::InsufficientAvailabilityZones(1).is_warning());
        assert!(!WorkflowError::UnsupportedDiscoveryProvider("consul".into()).is_warning());
        assert!(!WorkflowError::StackUntracked("acme-vpc-staging".into()).is_warning());
    }

    #[test]
    fn stack_failure_names_status_and_reason() {
        let err = WorkflowError::StackFailed {
            name: "acme-vpc-staging".into(),
            status: "UPDATE_ROLLBACK_COMPLETE".into(),
            reason: "resource limit exceeded".into(),
        };
        let message = err.to_string();
        assert!(message.contains("acme-vpc-staging"));
        assert!(message.contains("UPDATE_ROLLBACK_COMPLETE"));
        assert!(message.contains("resource limit exceeded"));
    }
}

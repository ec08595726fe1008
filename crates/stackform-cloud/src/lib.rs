//! Stackform control-plane contracts
//!
//! This crate defines the capability traits the workflow engine calls into:
//! idempotent stack upserts, blocking waits for terminal status, roleset
//! management, base-image lookup, and availability-zone counting. Concrete
//! implementations (the AWS CloudFormation manager, dry-run recorders, test
//! doubles) live elsewhere; the workflow crate only ever sees these traits.
//!
//! It also carries the small vocabulary shared by every stack operation:
//! stack naming, the uniform tag set, and terminal-status classification.

pub mod error;
pub mod provider;
pub mod stack;

// Re-exports
pub use error::{CloudError, Result};
pub use provider::{
    AzCounter, CloudServices, ImageFinder, Roleset, RolesetManager, StackManager, StackUpserter,
    StackWaiter,
};
pub use stack::{
    stack_name, EnvironmentTags, StackOutcome, StackParams, StackType, TagMap, TAG_PREFIX,
};

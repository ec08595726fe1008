//! Stackform workflows
//!
//! Workflows compose idempotent upsert-and-wait operations against the
//! infrastructure control plane into ordered pipelines. A pipeline halts at
//! the first failing stage; already-applied stages stay applied and a
//! repeated invocation relies on upsert idempotency to converge.
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │              EnvironmentUpserter                    │
//! │                                                     │
//! │  resolve ─▶ rolesets ─▶ network ─▶ elb ─▶ compute  │
//! │     │           │          │        │        │      │
//! │     └───────────┴────── &mut EnvironmentContext ───┘│
//! └───────────────────────┬────────────────────────────┘
//!                         │
//!               ┌─────────▼──────────┐
//!               │  stackform-cloud   │
//!               │  capability traits │
//!               └────────────────────┘
//! ```

pub mod environment;
pub mod error;
pub mod executor;

// Re-exports
pub use environment::{EnvironmentContext, EnvironmentUpserter};
pub use error::{Result, WorkflowError};
pub use executor::{Pipeline, Stage};

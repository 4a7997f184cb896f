//! Application layer for Eclipse.
//!
//! Coordinates the session store and the completion client: turn submission
//! with the single in-flight guard, and the composition object handed to
//! presentation layers.

pub mod context;
pub mod orchestrator;

pub use context::AppContext;
pub use orchestrator::{MessagingOrchestrator, RejectReason, SubmitOutcome};

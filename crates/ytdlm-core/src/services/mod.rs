//! Core services - the application's business logic layer.
//!
//! Services orchestrate between ports and domain logic; they don't know
//! about concrete implementations.

mod queue;

pub use queue::{EnqueueOutcome, QueueError, QueueService};

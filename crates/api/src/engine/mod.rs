//! The background job-tracking engine.
//!
//! [`Submitter`] validates and submits new generation/remix requests, then
//! launches a detached [`PollEngine`] task that owns the record until it
//! reaches a terminal state: it polls the provider with linear backoff,
//! persists each observed transition, and publishes live updates on the
//! event bus.

pub mod poller;
pub mod submit;

pub use poller::PollEngine;
pub use submit::{SubmitVideoRequest, Submitter};

//! Integration scenarios.

#[cfg(test)]
pub mod fixtures;

mod end_to_end;
mod example_scenario;
mod follow_flow;
mod idempotency;

//! # Social Graph Test Suite
//!
//! Cross-crate scenarios that need more than one subsystem.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs          # Harness over the full service container
//!     ├── example_scenario.rs  # Publish to followers, then request and accept
//!     ├── idempotency.rs       # Redelivery, republish, chunked fanout
//!     ├── follow_flow.rs       # Accept atomicity, decline cleanup, self rejection
//!     └── end_to_end.rs        # Store writes driving handlers through the router
//! tests/benches/
//! └── fanout_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sg-tests
//! cargo test -p sg-tests integration::end_to_end
//! cargo bench -p sg-tests
//! ```

pub mod integration;

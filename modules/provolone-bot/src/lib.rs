pub mod bot;
pub mod content;
pub mod context;
pub mod generation;
pub mod heuristics;
pub mod infra;
pub mod miner;
pub mod publisher;
pub mod report;
pub mod scheduling;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

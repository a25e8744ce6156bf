pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, RunMode};
pub use error::ProvoloneError;
pub use types::*;

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(test)]
mod testing;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{console::ConsoleSink, postgrest::SupabaseStore};
pub use config::{lambda::LambdaConfig, resolve_environment, Environment, ResolvedConfig};
pub use core::{reporting::Reporter, sweep::ExpirySweep, workflow::YardWorkflow};
pub use utils::error::{Result, YardError};

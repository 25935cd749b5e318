// Port Layer - Interfaces for external dependencies

pub mod command_runner;

// Re-exports
pub use command_runner::{CommandOutput, CommandRunner, RunnerError};

// npmkit Infrastructure - System Adapters
// Implements: CommandRunner

pub mod shell_runner;

pub use shell_runner::ShellRunner;

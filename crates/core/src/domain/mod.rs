// Domain Layer - Pure command composition, no I/O

pub mod command;
pub mod matching;
pub mod options;
pub mod scope;
pub mod settings;

// Re-exports
pub use command::{CommandSpec, Escalation, NpmCommandBuilder};
pub use matching::contains_word;
pub use options::InstallOptions;
pub use scope::Scope;
pub use settings::NpmSettings;

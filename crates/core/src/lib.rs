// npmkit Core - Domain Logic & Ports
// NO process spawning here: adapters live in infra-system

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{FailureCause, NpmError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

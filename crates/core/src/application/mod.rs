// Application Layer - Use Cases

pub mod group;
pub mod installer;
mod outcome;

// Re-exports
pub use group::GroupMembership;
pub use installer::{InstallRequest, PackageInstaller};

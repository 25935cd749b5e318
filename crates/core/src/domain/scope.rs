// Install scope: system-wide prefix or a project directory

use std::path::PathBuf;

/// Where an npm operation applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// System prefix, run as the npm service account
    Global,
    /// A project directory; `None` means the caller's current directory
    Local { path: Option<PathBuf> },
}

impl Scope {
    pub fn local() -> Self {
        Scope::Local { path: None }
    }

    pub fn local_in(path: impl Into<PathBuf>) -> Self {
        Scope::Local {
            path: Some(path.into()),
        }
    }

    /// Scope used by listing queries when the caller does not pick one.
    /// Package checks default to the global registry.
    pub fn default_listing() -> Self {
        Scope::Global
    }

    /// Short label for structured logs
    pub fn label(&self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Local { .. } => "local",
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::local()
    }
}

// Central Error Type for npm operations

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why a subprocess-backed operation did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// Process ran and exited with a nonzero code
    ExitCode(i32),
    /// Process was terminated by a signal (no exit code)
    Signal,
    /// Process could not be started
    Spawn(String),
    /// Directory has no package.json (absent, or not a regular file)
    MissingManifest(PathBuf),
    /// Filesystem check failed for a reason other than absence (e.g. EACCES)
    Io(String),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::ExitCode(code) => write!(f, "exit code {}", code),
            FailureCause::Signal => write!(f, "terminated by signal"),
            FailureCause::Spawn(reason) => write!(f, "spawn failed: {}", reason),
            FailureCause::MissingManifest(path) => {
                write!(f, "no package.json at {}", path.display())
            }
            FailureCause::Io(reason) => write!(f, "I/O error: {}", reason),
        }
    }
}

/// Closed set of errors raised by npm operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NpmError {
    #[error("NPM install of {target} failed, check logs for info")]
    Install { target: String, cause: FailureCause },

    #[error("Failed to remove {target} via npm, check logs for info")]
    Removal { target: String, cause: FailureCause },

    #[error("NPM group add for {user} failed, check logs for info")]
    GroupAdd { user: String, cause: FailureCause },
}

impl NpmError {
    pub fn cause(&self) -> &FailureCause {
        match self {
            NpmError::Install { cause, .. }
            | NpmError::Removal { cause, .. }
            | NpmError::GroupAdd { cause, .. } => cause,
        }
    }
}

/// Result type alias using NpmError
pub type Result<T> = std::result::Result<T, NpmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_point_at_logs() {
        let err = NpmError::Install {
            target: "left-pad".to_string(),
            cause: FailureCause::ExitCode(1),
        };
        assert_eq!(
            err.to_string(),
            "NPM install of left-pad failed, check logs for info"
        );

        let err = NpmError::GroupAdd {
            user: "alice".to_string(),
            cause: FailureCause::Signal,
        };
        assert!(err.to_string().contains("alice"));
        assert_eq!(err.cause(), &FailureCause::Signal);
    }

    #[test]
    fn test_cause_display() {
        assert_eq!(FailureCause::ExitCode(127).to_string(), "exit code 127");
        assert_eq!(
            FailureCause::MissingManifest(PathBuf::from("/srv/app/package.json")).to_string(),
            "no package.json at /srv/app/package.json"
        );
        assert_eq!(
            FailureCause::Io("permission denied".to_string()).to_string(),
            "I/O error: permission denied"
        );
    }
}

// Command Runner Port
// Abstraction for running one external command to completion

use std::borrow::Cow;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::CommandSpec;

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub duration_ms: i64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

/// Runner errors (the command never produced an exit status)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Command Runner trait
///
/// Implementations:
/// - ShellRunner (infra-system): spawns a real child process
/// - MockCommandRunner: scripted responses for tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command and wait for it to exit
    ///
    /// A nonzero exit is NOT an error here: callers inspect `exit_code`.
    ///
    /// # Errors
    /// - RunnerError::SpawnFailed if the process cannot be started
    /// - RunnerError::IoError if waiting on the process fails
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RunnerError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scripted outcome of one mock run
    #[derive(Debug, Clone)]
    pub enum MockResponse {
        /// Exit with code and captured output
        Exit {
            code: i32,
            stdout: String,
            stderr: String,
        },
        /// Terminated by signal
        Signal,
        /// Fail to spawn with message
        SpawnFail(String),
    }

    impl MockResponse {
        pub fn ok(stdout: impl Into<String>) -> Self {
            MockResponse::Exit {
                code: 0,
                stdout: stdout.into(),
                stderr: String::new(),
            }
        }

        pub fn exit(code: i32, stderr: impl Into<String>) -> Self {
            MockResponse::Exit {
                code,
                stdout: String::new(),
                stderr: stderr.into(),
            }
        }
    }

    /// Mock Command Runner for testing
    ///
    /// Queued responses are consumed in order, then `fallback` repeats.
    pub struct MockCommandRunner {
        queued: Arc<Mutex<VecDeque<MockResponse>>>,
        fallback: MockResponse,
        calls: Arc<Mutex<Vec<CommandSpec>>>,
    }

    impl MockCommandRunner {
        pub fn new(fallback: MockResponse) -> Self {
            Self {
                queued: Arc::new(Mutex::new(VecDeque::new())),
                fallback,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
        pub fn new_success() -> Self {
            Self::new(MockResponse::ok(""))
        }
        pub fn new_stdout(stdout: impl Into<String>) -> Self {
            Self::new(MockResponse::ok(stdout))
        }
        pub fn new_exit(code: i32, stderr: impl Into<String>) -> Self {
            Self::new(MockResponse::exit(code, stderr))
        }
        pub fn push(&self, response: MockResponse) {
            self.queued.lock().unwrap().push_back(response);
        }
        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
        pub fn last_call(&self) -> Option<CommandSpec> {
            self.calls.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RunnerError> {
            self.calls.lock().unwrap().push(spec.clone());

            let response = self
                .queued
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());

            match response {
                MockResponse::Exit {
                    code,
                    stdout,
                    stderr,
                } => Ok(CommandOutput {
                    exit_code: Some(code),
                    stdout: stdout.into_bytes(),
                    stderr: stderr.into_bytes(),
                    duration_ms: 1,
                }),
                MockResponse::Signal => Ok(CommandOutput {
                    exit_code: None,
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                    duration_ms: 1,
                }),
                MockResponse::SpawnFail(msg) => Err(RunnerError::SpawnFailed(msg)),
            }
        }
    }
}

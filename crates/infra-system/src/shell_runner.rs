// Shell runner implementation
// reason: tokio for async process management, working directory passed per child
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::info;

use npmkit_core::domain::CommandSpec;
use npmkit_core::port::command_runner::{CommandOutput, CommandRunner, RunnerError};

/// Shell runner
/// Spawns one child process per command and waits for it, capturing stdout/stderr.
/// The child's working directory is set on the child only; this process's
/// current directory is never changed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl ShellRunner {
    /// Create a runner inheriting this process's environment
    ///
    /// # Example
    /// ```ignore
    /// let runner = ShellRunner::new();
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Spawn child process and wait for output
    async fn spawn_and_wait(
        &self,
        spec: &CommandSpec,
    ) -> Result<std::process::Output, RunnerError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }

        let child = command
            .spawn()
            .map_err(|e| RunnerError::SpawnFailed(format!("{}: {}", spec.program, e)))?;

        child
            .wait_with_output()
            .await
            .map_err(|e| RunnerError::IoError(e.to_string()))
    }

    /// Build command output from process output
    fn build_output(&self, output: std::process::Output, duration_ms: i64) -> CommandOutput {
        CommandOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
            duration_ms,
        }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RunnerError> {
        let start = Instant::now();

        info!(
            program = %spec.program,
            args = ?spec.args,
            working_dir = ?spec.working_dir,
            "Starting subprocess"
        );

        let output = self.spawn_and_wait(spec).await?;
        let duration_ms = start.elapsed().as_millis() as i64;
        let result = self.build_output(output, duration_ms);

        info!(
            program = %spec.program,
            duration_ms = %duration_ms,
            exit_code = ?result.exit_code,
            "Subprocess completed"
        );

        Ok(result)
    }
}

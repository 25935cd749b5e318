// Exit status classification shared by the services
use tracing::info;

use crate::domain::CommandSpec;
use crate::error::FailureCause;
use crate::port::{CommandOutput, CommandRunner, RunnerError};

/// Run a command and split the outcome into output or failure cause
///
/// On failure the captured output (if any) is returned alongside so callers
/// can log stderr before surfacing their own error kind.
pub(crate) async fn run_checked(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
) -> Result<CommandOutput, (FailureCause, Option<CommandOutput>)> {
    info!(
        command = %spec,
        working_dir = ?spec.working_dir,
        "Running command"
    );

    let output = match runner.run(spec).await {
        Ok(output) => output,
        Err(RunnerError::SpawnFailed(reason)) | Err(RunnerError::IoError(reason)) => {
            return Err((FailureCause::Spawn(reason), None));
        }
    };

    info!(
        command = %spec,
        exit_code = ?output.exit_code,
        duration_ms = %output.duration_ms,
        "Command completed"
    );

    match output.exit_code {
        Some(0) => Ok(output),
        Some(code) => Err((FailureCause::ExitCode(code), Some(output))),
        None => Err((FailureCause::Signal, Some(output))),
    }
}

/// Captured stderr for a log line, empty when nothing ran
pub(crate) fn stderr_of(output: &Option<CommandOutput>) -> String {
    output
        .as_ref()
        .map(|o| o.stderr_lossy().into_owned())
        .unwrap_or_default()
}

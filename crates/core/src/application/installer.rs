// Package Installer - install, remove and query npm packages
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::outcome::{run_checked, stderr_of};
use crate::domain::options::assignment_args;
use crate::domain::settings::MANIFEST_FILE;
use crate::domain::{contains_word, InstallOptions, NpmCommandBuilder, NpmSettings, Scope};
use crate::error::{FailureCause, NpmError, Result};
use crate::port::CommandRunner;

/// Install request (packages + flags + scope)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallRequest {
    pub packages: Vec<String>,
    pub options: InstallOptions,
    pub scope: Scope,
}

impl InstallRequest {
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_options(mut self, options: InstallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Space-joined package names, used in logs and errors
    pub fn target(&self) -> String {
        self.packages.join(" ")
    }
}

/// Package Installer
///
/// Each call spawns exactly one subprocess (or none when a precondition fails)
/// and never touches the process-wide current directory.
pub struct PackageInstaller {
    runner: Arc<dyn CommandRunner>,
    settings: Arc<NpmSettings>,
}

impl PackageInstaller {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: Arc<NpmSettings>) -> Self {
        Self { runner, settings }
    }

    fn builder(&self) -> NpmCommandBuilder<'_> {
        NpmCommandBuilder::new(&self.settings)
    }

    /// Install packages
    ///
    /// # Errors
    /// - NpmError::Install on nonzero exit or spawn failure
    pub async fn install(&self, request: &InstallRequest) -> Result<()> {
        let mut trailing = request.packages.clone();
        trailing.extend(request.options.to_args());

        let spec = self.builder().install(&request.scope, &trailing);
        let target = request.target();

        if let Err((cause, output)) = run_checked(self.runner.as_ref(), &spec).await {
            error!(
                command = %spec,
                scope = request.scope.label(),
                cause = %cause,
                "NPM install of {} failed; log output follows:\n{}",
                target,
                stderr_of(&output)
            );
            return Err(NpmError::Install { target, cause });
        }

        Ok(())
    }

    /// Install the dependencies declared in `<path>/package.json`
    ///
    /// # Arguments
    /// * `path` - Directory holding package.json (also the working directory)
    /// * `stage` - Deployment stage flag, e.g. `Some("production")` -> `--production`
    /// * `options` - Extra `key=value` pairs rendered as `--key=value`
    ///
    /// # Errors
    /// - NpmError::Install if package.json is missing or cannot be stat'ed (nothing is spawned)
    /// - NpmError::Install on nonzero exit or spawn failure
    pub async fn install_from_manifest(
        &self,
        path: &Path,
        stage: Option<&str>,
        options: &[(String, String)],
    ) -> Result<()> {
        let target = path.display().to_string();

        let manifest = path.join(MANIFEST_FILE);
        let missing = match tokio::fs::metadata(&manifest).await {
            Ok(meta) if meta.is_file() => None,
            Ok(_) => Some(FailureCause::MissingManifest(manifest.clone())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Some(FailureCause::MissingManifest(manifest.clone()))
            }
            Err(e) => Some(FailureCause::Io(e.to_string())),
        };
        if let Some(cause) = missing {
            error!(
                manifest = %manifest.display(),
                cause = %cause,
                "NPM install of {} failed; manifest is not readable",
                target
            );
            return Err(NpmError::Install { target, cause });
        }

        let mut trailing = Vec::with_capacity(options.len() + 1);
        if let Some(stage) = stage.filter(|s| !s.is_empty()) {
            trailing.push(format!("--{}", stage));
        }
        trailing.extend(assignment_args(options));

        let spec = self.builder().install(&Scope::local_in(path), &trailing);

        if let Err((cause, output)) = run_checked(self.runner.as_ref(), &spec).await {
            error!(
                command = %spec,
                cause = %cause,
                "NPM install of {} failed; log output follows:\n{}",
                target,
                stderr_of(&output)
            );
            return Err(NpmError::Install { target, cause });
        }

        Ok(())
    }

    /// Uninstall packages
    ///
    /// # Errors
    /// - NpmError::Removal on nonzero exit or spawn failure
    pub async fn remove(&self, packages: &[String], scope: &Scope) -> Result<()> {
        let spec = self.builder().uninstall(scope, packages);
        let target = packages.join(" ");

        if let Err((cause, output)) = run_checked(self.runner.as_ref(), &spec).await {
            error!(
                command = %spec,
                scope = scope.label(),
                cause = %cause,
                "Failed to remove {} via npm; log output follows:\n{}",
                target,
                stderr_of(&output)
            );
            return Err(NpmError::Removal { target, cause });
        }

        Ok(())
    }

    /// Check whether a package shows up in `npm ls -p --depth 0`
    ///
    /// Never fails: a command that cannot run counts as "not installed".
    /// Only stdout is searched, regardless of exit code (npm ls exits
    /// nonzero on peer-dependency problems while still listing packages).
    pub async fn is_installed(&self, name: &str, scope: &Scope) -> bool {
        let spec = self.builder().list(scope);

        let stdout = match self.runner.run(&spec).await {
            Ok(output) => output.stdout_lossy().into_owned(),
            Err(e) => {
                warn!(command = %spec, error = %e, "Package listing failed");
                return false;
            }
        };

        let installed = contains_word(&stdout, name);
        debug!(
            package = %name,
            scope = scope.label(),
            installed = %installed,
            "Package check completed"
        );
        installed
    }
}

//! npmkit CLI - install, remove and inspect npm packages from the shell

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use npmkit_core::application::{GroupMembership, InstallRequest, PackageInstaller};
use npmkit_core::domain::settings::{
    DEFAULT_GLOBAL_PREFIX, DEFAULT_GROUP, DEFAULT_MANIFEST_STAGE, DEFAULT_NPM_BIN,
    DEFAULT_SERVICE_ACCOUNT,
};
use npmkit_core::domain::{Escalation, InstallOptions, NpmSettings, Scope};
use npmkit_infra_system::ShellRunner;

#[derive(Parser)]
#[command(name = "npmkit")]
#[command(about = "Thin npm wrapper: install, remove and check packages", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,
}

#[derive(Args)]
struct SettingsArgs {
    /// npm executable
    #[arg(long, env = "NPMKIT_NPM_BIN", default_value = DEFAULT_NPM_BIN, global = true)]
    npm_bin: String,

    /// Working directory for global operations
    #[arg(
        long,
        env = "NPMKIT_GLOBAL_PREFIX",
        default_value = DEFAULT_GLOBAL_PREFIX,
        global = true
    )]
    global_prefix: String,

    /// Account global operations run as
    #[arg(
        long,
        env = "NPMKIT_SERVICE_ACCOUNT",
        default_value = DEFAULT_SERVICE_ACCOUNT,
        global = true
    )]
    service_account: String,

    /// Group granting access to the global prefix
    #[arg(long, env = "NPMKIT_GROUP", default_value = DEFAULT_GROUP, global = true)]
    group: String,

    /// Privilege wrapper (sudo or gksu)
    #[arg(long, env = "NPMKIT_ESCALATION", default_value = "sudo", global = true)]
    escalation: Escalation,
}

impl SettingsArgs {
    fn into_settings(self) -> NpmSettings {
        NpmSettings {
            npm_bin: self.npm_bin,
            global_prefix: expand_path(&self.global_prefix),
            service_account: self.service_account,
            group: self.group,
            escalation: self.escalation,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Install packages
    Install {
        /// Package names (e.g. left-pad, @vue/cli, express@4)
        #[arg(required = true)]
        packages: Vec<String>,

        /// `KEY=VALUE` -> `--KEY=VALUE`, bare `KEY` -> `--KEY` (repeatable)
        #[arg(long = "opt", value_name = "KEY[=VALUE]")]
        opts: Vec<String>,

        /// `KEY=VALUE` -> `--KEY VALUE` (repeatable)
        #[arg(long = "arg", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        args: Vec<(String, String)>,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Install dependencies declared in a package.json
    InstallManifest {
        /// Directory containing package.json
        path: String,

        /// Stage flag passed as `--STAGE`
        #[arg(long, default_value = DEFAULT_MANIFEST_STAGE, conflicts_with = "no_stage")]
        stage: String,

        /// Do not pass a stage flag
        #[arg(long)]
        no_stage: bool,

        /// `KEY=VALUE` -> `--KEY=VALUE` (repeatable)
        #[arg(long = "opt", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        opts: Vec<(String, String)>,
    },

    /// Remove packages
    Remove {
        /// Package names
        #[arg(required = true)]
        packages: Vec<String>,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Check whether a package is installed (exit 0 if yes, 1 if no)
    IsInstalled {
        /// Package name
        name: String,

        /// Check a project instead of the global prefix
        #[arg(long)]
        local: bool,

        /// Project directory (implies --local)
        #[arg(long)]
        path: Option<String>,
    },

    /// Check whether a user is in the npm group (exit 0 if yes, 1 if no)
    UserInGroup {
        /// User name
        user: String,
    },

    /// Add a user to the npm group
    AddUser {
        /// User name
        user: String,
    },
}

#[derive(Args)]
struct ScopeArgs {
    /// Operate on the global prefix as the service account
    #[arg(short, long, conflicts_with = "path")]
    global: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long)]
    path: Option<String>,
}

impl ScopeArgs {
    fn into_scope(self) -> Scope {
        if self.global {
            Scope::Global
        } else {
            Scope::Local {
                path: self.path.as_deref().map(expand_path),
            }
        }
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

/// `--opt` entries glue their value, `--arg` entries keep it separate
fn build_options(opts: &[String], args: &[(String, String)]) -> InstallOptions {
    let mut options = InstallOptions::new();
    for opt in opts {
        options = match opt.split_once('=') {
            Some((key, value)) => options.assign(key, value),
            None => options.flag(opt.as_str()),
        };
    }
    for (key, value) in args {
        options = options.set(key.as_str(), value.as_str());
    }
    options
}

fn init_logging() -> Result<()> {
    let log_format = std::env::var("NPMKIT_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("npmkit=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

fn report_done(format: OutputFormat, operation: &str, target: &str, message: String) {
    match format {
        OutputFormat::Json => {
            println!("{}", json!({ "operation": operation, "target": target, "ok": true }));
        }
        OutputFormat::Text => println!("{}", format!("✓ {}", message).green().bold()),
    }
}

fn report_check(format: OutputFormat, check: &str, subject: &str, value: bool) -> ExitCode {
    match format {
        OutputFormat::Json => {
            println!("{}", json!({ "check": check, "subject": subject, "result": value }));
        }
        OutputFormat::Text => {
            let text = if value { "true".green() } else { "false".yellow() };
            println!("{}", text);
        }
    }

    if value {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging()?;
    info!("npmkit v{} starting", npmkit_core::VERSION);

    let settings = Arc::new(cli.settings.into_settings());
    let runner = Arc::new(ShellRunner::new());
    let installer = PackageInstaller::new(runner.clone(), settings.clone());
    let membership = GroupMembership::new(runner, settings);
    let format = cli.format;

    match cli.command {
        Commands::Install {
            packages,
            opts,
            args,
            scope,
        } => {
            let request = InstallRequest::new(packages)
                .with_options(build_options(&opts, &args))
                .with_scope(scope.into_scope());
            let target = request.target();

            installer.install(&request).await?;

            report_done(format, "install", &target, format!("Installed {}", target));
        }

        Commands::InstallManifest {
            path,
            stage,
            no_stage,
            opts,
        } => {
            let dir = expand_path(&path);
            let stage = (!no_stage).then_some(stage.as_str());

            installer.install_from_manifest(&dir, stage, &opts).await?;

            let target = dir.display().to_string();
            report_done(
                format,
                "install-manifest",
                &target,
                format!("Installed dependencies of {}", target),
            );
        }

        Commands::Remove { packages, scope } => {
            let target = packages.join(" ");

            installer.remove(&packages, &scope.into_scope()).await?;

            report_done(format, "remove", &target, format!("Removed {}", target));
        }

        Commands::IsInstalled { name, local, path } => {
            let scope = match (local, path) {
                (_, Some(path)) => Scope::local_in(expand_path(&path)),
                (true, None) => Scope::local(),
                (false, None) => Scope::default_listing(),
            };

            let installed = installer.is_installed(&name, &scope).await;

            return Ok(report_check(format, "is-installed", &name, installed));
        }

        Commands::UserInGroup { user } => {
            let member = membership.user_in_group(&user).await;

            return Ok(report_check(format, "user-in-group", &user, member));
        }

        Commands::AddUser { user } => {
            membership.add_user_to_group(&user).await?;

            report_done(
                format,
                "add-user",
                &user,
                format!("Added {} to group {}", user, membership.group()),
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

// Command Builder - composes npm and group invocations
//
// Arguments are kept as an argv and never pass through a shell.
// The only exception is gksu, which takes one command string; its tokens are quoted.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::scope::Scope;
use super::settings::NpmSettings;

/// `npm install`
pub const INSTALL: &[&str] = &["install"];

/// `npm uninstall`
pub const UNINSTALL: &[&str] = &["uninstall"];

/// `npm ls -p --depth 0` (parseable, top level only)
pub const LIST: &[&str] = &["ls", "-p", "--depth", "0"];

/// A fully composed subprocess invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Directory the child starts in; `None` inherits the caller's
    pub working_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Shell-like rendering, used for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Quote a token for display or for a gksu command string
fn quote(token: &str) -> String {
    let safe = !token.is_empty()
        && !token.starts_with('~')
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-~".contains(c));
    if safe {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

/// Privilege wrapper used for global operations and group changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Escalation {
    #[default]
    Sudo,
    Gksu,
}

impl Escalation {
    pub fn program(&self) -> &'static str {
        match self {
            Escalation::Sudo => "sudo",
            Escalation::Gksu => "gksu",
        }
    }

    /// Run `inner` as `account`
    pub fn run_as(&self, account: &str, inner: Vec<String>) -> CommandSpec {
        let spec = CommandSpec::new(self.program()).args(["-u", account]);
        self.append_inner(spec, inner)
    }

    /// Run `inner` as root
    pub fn run_privileged(&self, inner: Vec<String>) -> CommandSpec {
        self.append_inner(CommandSpec::new(self.program()), inner)
    }

    fn append_inner(&self, spec: CommandSpec, inner: Vec<String>) -> CommandSpec {
        match self {
            Escalation::Sudo => spec.args(inner),
            Escalation::Gksu => {
                let line = inner.iter().map(|t| quote(t)).collect::<Vec<_>>().join(" ");
                spec.arg(line)
            }
        }
    }
}

impl fmt::Display for Escalation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for Escalation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sudo" => Ok(Escalation::Sudo),
            "gksu" => Ok(Escalation::Gksu),
            other => Err(format!(
                "unknown escalation tool '{}' (expected sudo or gksu)",
                other
            )),
        }
    }
}

/// Builds commands from settings
pub struct NpmCommandBuilder<'a> {
    settings: &'a NpmSettings,
}

impl<'a> NpmCommandBuilder<'a> {
    pub fn new(settings: &'a NpmSettings) -> Self {
        Self { settings }
    }

    /// Compose `npm <subcommand> [-g] <trailing..>` for a scope
    ///
    /// - Global: runs in the global prefix as the service account, with `-g`
    /// - Local: runs in the scope's path when set, otherwise inherits the caller's directory
    pub fn npm(&self, subcommand: &[&str], scope: &Scope, trailing: &[String]) -> CommandSpec {
        match scope {
            Scope::Global => {
                let mut inner = Vec::with_capacity(subcommand.len() + trailing.len() + 2);
                inner.push(self.settings.npm_bin.clone());
                inner.extend(subcommand.iter().map(|s| s.to_string()));
                inner.push("-g".to_string());
                inner.extend(trailing.iter().cloned());

                self.settings
                    .escalation
                    .run_as(&self.settings.service_account, inner)
                    .current_dir(&self.settings.global_prefix)
            }
            Scope::Local { path } => {
                let spec = CommandSpec::new(self.settings.npm_bin.as_str())
                    .args(subcommand.iter().copied())
                    .args(trailing.iter().cloned());
                match path {
                    Some(dir) => spec.current_dir(dir),
                    None => spec,
                }
            }
        }
    }

    pub fn install(&self, scope: &Scope, trailing: &[String]) -> CommandSpec {
        self.npm(INSTALL, scope, trailing)
    }

    pub fn uninstall(&self, scope: &Scope, packages: &[String]) -> CommandSpec {
        self.npm(UNINSTALL, scope, packages)
    }

    pub fn list(&self, scope: &Scope) -> CommandSpec {
        self.npm(LIST, scope, &[])
    }

    /// `groups <user>`
    pub fn groups(&self, user: &str) -> CommandSpec {
        CommandSpec::new("groups").arg(user)
    }

    /// Privileged `gpasswd -a <user> <group>`
    pub fn group_add(&self, user: &str) -> CommandSpec {
        self.settings.escalation.run_privileged(vec![
            "gpasswd".to_string(),
            "-a".to_string(),
            user.to_string(),
            self.settings.group.clone(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_local_install_in_path() {
        let settings = NpmSettings::default();
        let builder = NpmCommandBuilder::new(&settings);

        let spec = builder.install(
            &Scope::local_in("/srv/app"),
            &strings(&["left-pad", "--save-prefix=~"]),
        );

        assert_eq!(spec.program, "npm");
        assert_eq!(spec.args, strings(&["install", "left-pad", "--save-prefix=~"]));
        assert_eq!(spec.working_dir, Some(PathBuf::from("/srv/app")));
    }

    #[test]
    fn test_local_without_path_inherits_directory() {
        let settings = NpmSettings::default();
        let spec = NpmCommandBuilder::new(&settings).list(&Scope::local());

        assert_eq!(spec.to_string(), "npm ls -p --depth 0");
        assert_eq!(spec.working_dir, None);
    }

    #[test]
    fn test_global_sudo() {
        let settings = NpmSettings::default();
        let spec = NpmCommandBuilder::new(&settings)
            .install(&Scope::Global, &strings(&["pm2", "--no-audit"]));

        assert_eq!(spec.program, "sudo");
        assert_eq!(
            spec.args,
            strings(&["-u", "npm", "npm", "install", "-g", "pm2", "--no-audit"])
        );
        assert_eq!(spec.working_dir, Some(PathBuf::from("/var/lib/npm")));
    }

    #[test]
    fn test_global_gksu_single_command_string() {
        let settings = NpmSettings {
            escalation: Escalation::Gksu,
            ..Default::default()
        };
        let spec = NpmCommandBuilder::new(&settings).list(&Scope::Global);

        assert_eq!(spec.program, "gksu");
        assert_eq!(spec.args, strings(&["-u", "npm", "npm ls -p --depth 0 -g"]));
        assert_eq!(spec.to_string(), "gksu -u npm 'npm ls -p --depth 0 -g'");
    }

    #[test]
    fn test_gksu_quotes_hostile_tokens() {
        let inner = strings(&["gpasswd", "-a", "bob; rm -rf /", "npm"]);
        let spec = Escalation::Gksu.run_privileged(inner);
        assert_eq!(spec.args, strings(&["gpasswd -a 'bob; rm -rf /' npm"]));
    }

    #[test]
    fn test_gksu_quotes_leading_tilde() {
        let settings = NpmSettings {
            escalation: Escalation::Gksu,
            ..Default::default()
        };
        let spec = NpmCommandBuilder::new(&settings)
            .install(&Scope::Global, &strings(&["~root", "--save-prefix=~"]));

        assert_eq!(
            spec.args,
            strings(&["-u", "npm", "npm install -g '~root' --save-prefix=~"])
        );
    }

    #[test]
    fn test_group_commands() {
        let settings = NpmSettings {
            group: "nodeusers".to_string(),
            ..Default::default()
        };
        let builder = NpmCommandBuilder::new(&settings);

        assert_eq!(builder.groups("alice").to_string(), "groups alice");
        assert_eq!(
            builder.group_add("alice").to_string(),
            "sudo gpasswd -a alice nodeusers"
        );
    }

    #[test]
    fn test_quote_display() {
        assert_eq!(quote("plain-token_1.0"), "plain-token_1.0");
        assert_eq!(quote(""), "''");
        assert_eq!(quote("it's"), r"'it'\''s'");
        assert_eq!(quote("two words"), "'two words'");
        assert_eq!(quote("~"), "'~'");
        assert_eq!(quote("~/pkg"), "'~/pkg'");
        assert_eq!(quote("a~b"), "a~b");
    }

    #[test]
    fn test_escalation_from_str() {
        assert_eq!("SUDO".parse::<Escalation>(), Ok(Escalation::Sudo));
        assert_eq!("gksu".parse::<Escalation>(), Ok(Escalation::Gksu));
        assert!("doas".parse::<Escalation>().is_err());
    }
}

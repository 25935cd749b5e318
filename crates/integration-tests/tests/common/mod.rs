//! Shared fixtures: a scripted stand-in for the npm binary

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use npmkit_core::domain::NpmSettings;
use tempfile::TempDir;

const ETXTBSY: i32 = 26;

/// Fake npm recording each call as `<pwd>|<args>` in `calls.log`
///
/// - `--version` answers without logging
/// - `install` fails when any argument contains `fail-pkg`
/// - `uninstall` fails when any argument is `missing-pkg`
/// - `ls` prints two node_modules paths under the working directory
pub struct FakeNpm {
    pub dir: TempDir,
    pub bin: PathBuf,
    pub log: PathBuf,
}

impl FakeNpm {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let bin = root.join("npm");
        let log = root.join("calls.log");

        let script = format!(
            r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "10.0.0"; exit 0; fi
echo "$(pwd)|$*" >> '{log}'
case "$1" in
  install)
    for a in "$@"; do
      case "$a" in
        *fail-pkg*) echo "npm ERR! 404 'fail-pkg' is not in the registry" >&2; exit 1 ;;
      esac
    done ;;
  uninstall)
    for a in "$@"; do
      if [ "$a" = "missing-pkg" ]; then echo "npm ERR! missing-pkg not installed" >&2; exit 1; fi
    done ;;
  ls)
    echo "$(pwd)"
    echo "$(pwd)/node_modules/left-pad"
    echo "$(pwd)/node_modules/@scope/pkg" ;;
esac
exit 0
"#,
            log = log.display()
        );

        fs::write(&bin, script).unwrap();
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();
        wait_until_executable(&bin);

        Self { dir, bin, log }
    }

    pub fn settings(&self) -> Arc<NpmSettings> {
        Arc::new(NpmSettings {
            npm_bin: self.bin.display().to_string(),
            ..Default::default()
        })
    }

    /// Fresh project directory inside the fixture
    pub fn project(&self, name: &str, with_manifest: bool) -> PathBuf {
        let dir = self.dir.path().canonicalize().unwrap().join(name);
        fs::create_dir_all(&dir).unwrap();
        if with_manifest {
            fs::write(
                dir.join("package.json"),
                r#"{"name":"app","version":"1.0.0","dependencies":{"left-pad":"^1.3.0"}}"#,
            )
            .unwrap();
        }
        dir
    }

    pub fn calls(&self) -> Vec<String> {
        read_lines(&self.log)
    }
}

/// A fork in a parallel test can briefly hold the script's write handle (ETXTBSY)
fn wait_until_executable(bin: &Path) {
    for _ in 0..50 {
        match Command::new(bin).arg("--version").output() {
            Ok(_) => return,
            Err(e) if e.raw_os_error() == Some(ETXTBSY) => {
                std::thread::sleep(Duration::from_millis(20))
            }
            Err(e) => panic!("fake npm not runnable: {}", e),
        }
    }
    panic!("fake npm stayed busy");
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

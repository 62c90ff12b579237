use std::{path::PathBuf, sync::Mutex};

use assert_cmd::{assert::Assert, Command};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh data root for one shell run.
pub fn test_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Runs `input` through the CLI in script mode with `home` as its data root.
#[allow(dead_code)]
pub fn run_script(home: &std::path::Path, input: &str) -> Assert {
    Command::cargo_bin("muscat_bay_cli")
        .expect("binary built")
        .env("MUSCAT_BAY_CLI_SCRIPT", "1")
        .env("MUSCAT_BAY_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .write_stdin(input.to_string())
        .assert()
}

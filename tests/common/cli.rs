#![allow(dead_code)]

use assert_cmd::Command;
use std::ffi::OsStr;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug)]
pub struct TkrRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

pub struct TkrWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl TkrWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }
}

pub fn run_tkr<I, S>(workspace: &TkrWorkspace, args: I) -> TkrRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tkr"));
    cmd.current_dir(&workspace.root);
    cmd.args(args);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "tracker_rust=debug");
    cmd.env("RUST_BACKTRACE", "1");
    cmd.env("HOME", &workspace.root);
    cmd.env_remove("TKR_ACTOR");
    cmd.env_remove("TRACKER_DIR");

    let output = cmd.output().expect("run tkr");

    TkrRun {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status,
    }
}

/// Extract the first JSON payload from mixed stdout.
pub fn extract_json_payload(stdout: &str) -> String {
    let lines: Vec<&str> = stdout.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            return lines[idx..].join("\n").trim().to_string();
        }
    }
    stdout.trim().to_string()
}

/// Parse `Created issue #N: title` output into the issue id.
pub fn parse_created_id(stdout: &str) -> i64 {
    let line = stdout.lines().next().unwrap_or("");
    line.strip_prefix("Created issue #")
        .and_then(|rest| rest.split(':').next())
        .and_then(|id| id.trim().parse().ok())
        .unwrap_or_else(|| panic!("unexpected create output: {line}"))
}

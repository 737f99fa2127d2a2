//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Config that keeps the post-run polling from sleeping
const FAST_BACKOFF: &str = r#"[backoff]
initial_delay_secs = 0
interval_secs = 0
factor = 1.0
ceiling_secs = 0
"#;

/// A scratch directory with a releaser.toml, used as the working directory of the binary
pub struct Sandbox {
  _root: TempDir,
  pub path: PathBuf,
}

impl Sandbox {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    std::fs::write(path.join("releaser.toml"), FAST_BACKOFF)?;
    Ok(Self { _root: root, path })
  }

  /// Run `releaser <args>` against the API at `api_url` with a test token
  pub fn run(&self, api_url: &str, args: &[&str]) -> Result<Output> {
    run_releaser(&self.path, &[("GITHUB_TOKEN", "test-token"), ("GITHUB_API_URL", api_url)], args)
  }
}

/// Run the releaser binary with a scrubbed environment plus `env`
///
/// Stdin is closed, so every confirmation prompt is declined.
pub fn run_releaser(cwd: &Path, env: &[(&str, &str)], args: &[&str]) -> Result<Output> {
  releaser_cmd(cwd, env, args)
    .stdin(Stdio::null())
    .output()
    .with_context(|| format!("Failed to run releaser {}", args.join(" ")))
}

/// Like [`run_releaser`], answering prompts with the lines of `input`
pub fn run_releaser_with_input(cwd: &Path, env: &[(&str, &str)], args: &[&str], input: &str) -> Result<Output> {
  let mut child = releaser_cmd(cwd, env, args)
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .with_context(|| format!("Failed to run releaser {}", args.join(" ")))?;
  if let Some(mut stdin) = child.stdin.take() {
    stdin.write_all(input.as_bytes())?;
  }
  Ok(child.wait_with_output()?)
}

fn releaser_cmd(cwd: &Path, env: &[(&str, &str)], args: &[&str]) -> Command {
  let releaser_bin = env!("CARGO_BIN_EXE_releaser");

  let mut cmd = Command::new(releaser_bin);
  cmd
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .env_remove("NO_MATRIX")
    .env_remove("GITHUB_TOKEN")
    .env_remove("GITHUB_API_URL")
    .env_remove("MATRIX_TOKEN")
    .env_remove("MATRIX_USER")
    .env_remove("MATRIX_PASSWORD")
    .env("GIT_REMOTE_BASE", cwd.join("no-remote"));
  for (key, value) in env {
    cmd.env(key, value);
  }
  cmd
}

/// Run git in `cwd`, failing with its stderr
pub fn git(cwd: &Path, args: &[&str]) -> Result<String> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(["-c", "user.name=Test User", "-c", "user.email=test@example.com"])
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Bare `<base>/ipfs/kubo` remote with one commit on master; returns the base dir and the commit
pub fn bare_kubo_remote() -> Result<(TempDir, String)> {
  let base = TempDir::new()?;
  let bare = base.path().join("ipfs").join("kubo");
  std::fs::create_dir_all(&bare)?;
  git(&bare, &["init", "--quiet", "--bare"])?;
  git(&bare, &["config", "uploadpack.allowAnySHA1InWant", "true"])?;

  let seed = base.path().join("seed");
  std::fs::create_dir_all(&seed)?;
  git(&seed, &["init", "--quiet", "-b", "master"])?;
  std::fs::write(seed.join("version.go"), "const CurrentVersionNumber = \"0.18.0\"\n")?;
  git(&seed, &["add", "."])?;
  git(&seed, &["commit", "--quiet", "-m", "Release v0.18.0"])?;
  git(&seed, &["push", "--quiet", &bare.to_string_lossy(), "master:release"])?;
  let head = git(&seed, &["rev-parse", "HEAD"])?;

  Ok((base, head))
}

pub fn exit_code(output: &Output) -> i32 {
  output.status.code().unwrap_or(-1)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}

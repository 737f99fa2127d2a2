//! Argument handling and start-up failures, before any stage runs

use crate::helpers::{Sandbox, exit_code, run_releaser, stderr, stdout};
use anyhow::Result;

#[test]
fn test_help_lists_every_stage() -> Result<()> {
  let sandbox = Sandbox::new()?;
  let output = run_releaser(&sandbox.path, &[], &["release", "--help"])?;
  assert!(output.status.success());

  let help = stdout(&output);
  for stage in [
    "prepare-branch",
    "tag",
    "publish-to-github",
    "publish-to-dockerhub",
    "publish-to-npm",
    "publish-to-distributions",
    "update-interop",
    "update-ipfs-desktop",
    "update-ipfs-blog",
    "update-ipfs-docs",
    "test-ipfs-companion",
    "merge-branch",
    "prepare-next",
    "promote",
    "notify-bifrost",
  ] {
    assert!(help.contains(stage), "help does not mention {}:\n{}", stage, help);
  }
  Ok(())
}

#[test]
fn test_invalid_version_is_a_user_error() -> Result<()> {
  let sandbox = Sandbox::new()?;
  let output = sandbox.run("http://127.0.0.1:9", &["release", "--version", "0.18.0", "tag"])?;

  assert_eq!(exit_code(&output), 1);
  let err = stderr(&output);
  assert!(err.contains("Invalid version '0.18.0'"), "stderr: {}", err);
  assert!(err.contains("💡 Help"));
  Ok(())
}

#[test]
fn test_missing_token_names_the_variable() -> Result<()> {
  let sandbox = Sandbox::new()?;
  let output = run_releaser(&sandbox.path, &[], &["release", "--version", "v0.18.0", "tag"])?;

  assert_eq!(exit_code(&output), 1);
  assert!(stderr(&output).contains("GITHUB_TOKEN"));
  Ok(())
}

#[test]
fn test_explicit_config_must_exist() -> Result<()> {
  let sandbox = Sandbox::new()?;
  let output = sandbox.run(
    "http://127.0.0.1:9",
    &["--config", "missing.toml", "release", "--version", "v0.18.0", "tag"],
  )?;

  assert_eq!(exit_code(&output), 1);
  assert!(stderr(&output).contains("Configuration file not found"));
  Ok(())
}

#[test]
fn test_invalid_backoff_is_rejected() -> Result<()> {
  let sandbox = Sandbox::new()?;
  std::fs::write(sandbox.path.join("releaser.toml"), "[backoff]\nfactor = 0.5\n")?;
  let output = sandbox.run("http://127.0.0.1:9", &["release", "--version", "v0.18.0", "tag"])?;

  assert_eq!(exit_code(&output), 1);
  assert!(stderr(&output).contains("backoff.factor"));
  Ok(())
}

#[test]
fn test_unknown_log_level_is_rejected() -> Result<()> {
  let sandbox = Sandbox::new()?;
  let output = sandbox.run(
    "http://127.0.0.1:9",
    &["--log-level", "loud", "release", "--version", "v0.18.0", "tag"],
  )?;

  assert_eq!(exit_code(&output), 1);
  assert!(stderr(&output).contains("--log-level"));
  Ok(())
}

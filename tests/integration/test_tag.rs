//! `releaser release tag` against a mock GitHub API

use crate::helpers::{Sandbox, bare_kubo_remote, exit_code, git, run_releaser_with_input, stderr, stdout};
use anyhow::Result;
use mockito::{Matcher, Server};

#[test]
fn test_existing_tag_is_already_complete() -> Result<()> {
  let mut server = Server::new();
  let lookup = server
    .mock("GET", "/repos/ipfs/kubo/git/ref/tags/v0.18.0")
    .match_header("authorization", "Bearer test-token")
    .with_body(r#"{"ref": "refs/tags/v0.18.0", "object": {"sha": "abc123"}}"#)
    .expect(1)
    .create();
  let branch = server
    .mock("GET", Matcher::Regex("^/repos/ipfs/kubo/branches/".to_string()))
    .expect(0)
    .create();

  let sandbox = Sandbox::new()?;
  let output = sandbox.run(&server.url(), &["release", "--version", "v0.18.0", "tag"])?;

  assert_eq!(exit_code(&output), 0, "stderr: {}", stderr(&output));
  assert!(stdout(&output).contains("✅ tag is already complete"));
  lookup.assert();
  branch.assert();
  Ok(())
}

#[test]
fn test_check_only_reports_missing_tag() -> Result<()> {
  let mut server = Server::new();
  server
    .mock("GET", "/repos/ipfs/kubo/git/ref/tags/v0.18.0")
    .with_status(404)
    .with_body(r#"{"message": "Not Found"}"#)
    .expect(2)
    .create();

  let sandbox = Sandbox::new()?;
  let output = sandbox.run(&server.url(), &["--skip-run", "release", "--version", "v0.18.0", "tag"])?;

  assert_eq!(exit_code(&output), 4);
  let err = stderr(&output);
  assert!(err.contains("tag [incomplete]: tag v0.18.0 does not exist in ipfs/kubo"), "stderr: {}", err);
  Ok(())
}

#[test]
fn test_missing_source_branch_stops_the_run() -> Result<()> {
  let mut server = Server::new();
  server
    .mock("GET", "/repos/ipfs/kubo/git/ref/tags/v0.18.0-rc1")
    .with_status(404)
    .create();
  server
    .mock("GET", "/repos/ipfs/kubo/branches/release-v0.18.0")
    .with_status(404)
    .create();

  let sandbox = Sandbox::new()?;
  let output = sandbox.run(&server.url(), &["release", "--version", "v0.18.0-rc1", "tag"])?;

  assert_eq!(exit_code(&output), 1);
  assert!(stderr(&output).contains("release-v0.18.0"));
  Ok(())
}

#[test]
fn test_api_errors_are_system_errors() -> Result<()> {
  let mut server = Server::new();
  server
    .mock("GET", "/repos/ipfs/kubo/git/ref/tags/v0.18.0")
    .with_status(500)
    .with_body(r#"{"message": "Server Error"}"#)
    .create();

  let sandbox = Sandbox::new()?;
  let output = sandbox.run(&server.url(), &["release", "--version", "v0.18.0", "tag"])?;

  assert_eq!(exit_code(&output), 2);
  assert!(stderr(&output).contains("500"));
  Ok(())
}

#[test]
fn test_tag_is_pushed_after_approval() -> Result<()> {
  let (remote, head) = bare_kubo_remote()?;
  let mut server = Server::new();
  server
    .mock("GET", "/repos/ipfs/kubo/git/ref/tags/v0.18.0")
    .with_status(404)
    .create();
  server
    .mock("GET", "/repos/ipfs/kubo/branches/release")
    .with_body(format!(r#"{{"name": "release", "commit": {{"sha": "{}"}}}}"#, head))
    .create();

  let sandbox = Sandbox::new()?;
  let remote_base = format!("file://{}", remote.path().display());
  let url = server.url();
  let output = run_releaser_with_input(
    &sandbox.path,
    &[
      ("GITHUB_TOKEN", "test-token"),
      ("GITHUB_API_URL", url.as_str()),
      ("GIT_REMOTE_BASE", remote_base.as_str()),
    ],
    &["--skip-check-after", "release", "--version", "v0.18.0", "tag"],
    "yes\n",
  )?;

  assert_eq!(exit_code(&output), 0, "stderr: {}", stderr(&output));
  let out = stdout(&output);
  assert!(out.contains("Push tag v0.18.0 to ipfs/kubo?"));
  assert!(out.contains("The tag is not signed"));

  let bare = remote.path().join("ipfs").join("kubo");
  assert_eq!(git(&bare, &["rev-parse", "v0.18.0^{commit}"])?, head);
  assert_eq!(git(&bare, &["cat-file", "-t", "v0.18.0"])?, "tag");
  Ok(())
}

#[test]
fn test_declined_push_leaves_remote_untouched() -> Result<()> {
  let (remote, head) = bare_kubo_remote()?;
  let mut server = Server::new();
  server
    .mock("GET", "/repos/ipfs/kubo/git/ref/tags/v0.18.0")
    .with_status(404)
    .create();
  server
    .mock("GET", "/repos/ipfs/kubo/branches/release")
    .with_body(format!(r#"{{"name": "release", "commit": {{"sha": "{}"}}}}"#, head))
    .create();

  let sandbox = Sandbox::new()?;
  let remote_base = format!("file://{}", remote.path().display());
  let url = server.url();
  let output = run_releaser_with_input(
    &sandbox.path,
    &[
      ("GITHUB_TOKEN", "test-token"),
      ("GITHUB_API_URL", url.as_str()),
      ("GIT_REMOTE_BASE", remote_base.as_str()),
    ],
    &["release", "--version", "v0.18.0", "tag"],
    "no\n",
  )?;

  assert_eq!(exit_code(&output), 1);
  assert!(stderr(&output).contains("Pushing tag v0.18.0 was not confirmed"));
  let bare = remote.path().join("ipfs").join("kubo");
  assert!(git(&bare, &["tag", "--list"])?.is_empty());
  Ok(())
}

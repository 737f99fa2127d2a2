//! System git backend
//!
//! Every working copy is a fresh `git init` in a temporary directory followed by a
//! depth-1 fetch of exactly one commit. Commands run with:
//! - an isolated environment (PATH, HOME and GnuPG variables only)
//! - identity and auth passed as `-c` overrides, never written to config
//! - safe overrides for protocol and output quoting

use super::{Checkout, LocalCommand, VersionControl};
use crate::core::config::ReleaserConfig;
use crate::core::error::{GitError, ReleaseError, ReleaseResult, ResultExt};
use crate::release::repos::RepoRef;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Connection and identity settings shared by every checkout
#[derive(Debug, Clone)]
pub struct GitSettings {
  pub remote_base: String,
  pub token: Option<String>,
  pub user_name: String,
  pub user_email: String,
  pub signing_key: Option<String>,
}

impl GitSettings {
  /// `Authorization` header GitHub accepts for token-authenticated git over https
  pub fn auth_header(&self) -> Option<String> {
    self
      .token
      .as_ref()
      .map(|token| format!("Authorization: Basic {}", URL_SAFE.encode(format!("pat:{}", token))))
  }

  pub fn remote_url(&self, repo: &RepoRef) -> String {
    format!("{}/{}/{}", self.remote_base.trim_end_matches('/'), repo.owner, repo.name)
  }
}

/// Git backend using the system `git` binary
pub struct SystemGit {
  settings: GitSettings,
}

impl SystemGit {
  pub fn new(settings: GitSettings) -> Self {
    Self { settings }
  }

  pub fn from_config(config: &ReleaserConfig) -> Self {
    Self::new(GitSettings {
      remote_base: config.git.remote_base.clone(),
      token: config.github.token.clone(),
      user_name: config.git.user_name.clone(),
      user_email: config.git.user_email.clone(),
      signing_key: config.git.signing_key.clone(),
    })
  }
}

impl VersionControl for SystemGit {
  fn checkout(&self, repo: &RepoRef, branch: &str, sha: &str) -> ReleaseResult<Box<dyn Checkout>> {
    let dir = tempfile::Builder::new()
      .prefix("releaser-")
      .tempdir()
      .context("Failed to create a temporary directory for the working copy")?;

    tracing::debug!("checking out {}@{} ({}) into {}", repo, branch, sha, dir.path().display());

    let checkout = GitCheckout {
      dir,
      branch: branch.to_string(),
      settings: self.settings.clone(),
    };

    checkout.git(&["init", "--quiet"])?;
    checkout.git(&["remote", "add", "origin", &self.settings.remote_url(repo)])?;
    let refspec = format!("+{}:refs/remotes/origin/{}", sha, branch);
    checkout.git(&["fetch", "--quiet", "--no-tags", "--depth", "1", "origin", &refspec])?;
    checkout.git(&["checkout", "--quiet", "-b", branch, sha])?;

    Ok(Box::new(checkout))
  }
}

/// A working copy in a temporary directory, removed on drop
pub struct GitCheckout {
  pub(crate) dir: TempDir,
  pub(crate) branch: String,
  pub(crate) settings: GitSettings,
}

impl GitCheckout {
  pub(crate) fn root(&self) -> &Path {
    self.dir.path()
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the checkout
  /// - Clears environment variables, keeping PATH, HOME and GnuPG's agent variables
  /// - Adds identity, auth and safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(self.root());

    cmd.env_clear();
    for key in ["PATH", "HOME", "GNUPGHOME", "GPG_TTY"] {
      if let Ok(value) = std::env::var(key) {
        cmd.env(key, value);
      }
    }

    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false");
    cmd.arg("-c").arg("init.defaultBranch=releaser-init");
    cmd.arg("-c").arg(format!("user.name={}", self.settings.user_name));
    cmd.arg("-c").arg(format!("user.email={}", self.settings.user_email));
    if let Some(header) = self.settings.auth_header() {
      cmd.arg("-c").arg(format!("http.extraheader={}", header));
    }

    cmd
  }

  /// Run git with `args`, failing with the command line and stderr on non-zero exit
  pub(crate) fn git(&self, args: &[&str]) -> ReleaseResult<Output> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
      return Err(ReleaseError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(output)
  }

  pub(crate) fn git_stdout(&self, args: &[&str]) -> ReleaseResult<String> {
    let output = self.git(args)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  pub(crate) fn run_local(&self, command: &LocalCommand) -> ReleaseResult<String> {
    let output = Command::new(&command.program)
      .args(&command.args)
      .current_dir(self.root())
      .output()
      .with_context(|| format!("Failed to execute {}", command))?;

    if !output.status.success() {
      return Err(ReleaseError::Git(GitError::LocalCommandFailed {
        command: command.to_string(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }
}

//! Scoped working copies
//!
//! A [`Checkout`] lives in a temporary directory that is removed when the value is
//! dropped, so every exit path (including errors and declined confirmations) cleans up.

pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::ReleaseResult;
use crate::release::repos::RepoRef;
use std::fmt;
use std::path::Path;

/// A program run inside a working copy (e.g. `./dist.sh add-version kubo v0.18.0`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCommand {
  pub program: String,
  pub args: Vec<String>,
}

impl LocalCommand {
  pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      program: program.into(),
      args: args.into_iter().map(Into::into).collect(),
    }
  }
}

impl fmt::Display for LocalCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// A tag object created in a working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
  pub name: String,
  /// Object id of the tag itself (not the tagged commit)
  pub sha: String,
  pub target: String,
  /// Armored signature, when the tag was signed
  pub signature: Option<String>,
}

/// Opens working copies of remote repositories
pub trait VersionControl {
  /// Fetch `sha` of `repo` into a fresh working copy with local branch `branch` checked out
  fn checkout(&self, repo: &RepoRef, branch: &str, sha: &str) -> ReleaseResult<Box<dyn Checkout>>;
}

/// Operations on one working copy
pub trait Checkout {
  fn path(&self) -> &Path;

  fn branch(&self) -> &str;

  /// Read a file relative to the working copy root; `None` when absent
  fn read_file(&self, rel: &str) -> ReleaseResult<Option<String>>;

  fn write_file(&self, rel: &str, content: &str) -> ReleaseResult<()>;

  /// Run a program with the working copy as its directory, returning stdout
  fn run(&self, command: &LocalCommand) -> ReleaseResult<String>;

  /// Stage `pathspec` and commit; `None` when nothing changed
  fn commit(&self, pathspec: &str, message: &str) -> ReleaseResult<Option<String>>;

  /// Create an annotated (signed when a key is configured) tag on `target`
  fn tag(&self, target: &str, name: &str, message: &str) -> ReleaseResult<TagInfo>;

  /// Push the checked-out branch to origin
  fn push_branch(&self) -> ReleaseResult<()>;

  fn push_tag(&self, name: &str) -> ReleaseResult<()>;
}

/// Check out `branch` at `sha`, run `commands`, then commit `pathspec` and push when anything changed
///
/// Returns the new commit, or `None` when the commands left the tree untouched.
pub fn run_and_push(
  vcs: &dyn VersionControl,
  repo: &RepoRef,
  branch: &str,
  sha: &str,
  pathspec: &str,
  message: &str,
  commands: &[LocalCommand],
) -> ReleaseResult<Option<String>> {
  let checkout = vcs.checkout(repo, branch, sha)?;
  tracing::debug!("working copy of {}@{} at {}", repo, branch, checkout.path().display());
  for command in commands {
    tracing::info!("running `{}` in {}@{}", command, repo, branch);
    checkout.run(command)?;
  }
  commit_and_push(checkout.as_ref(), pathspec, message)
}

/// Commit `pathspec` in an open checkout and push it when a commit was made
pub fn commit_and_push(checkout: &dyn Checkout, pathspec: &str, message: &str) -> ReleaseResult<Option<String>> {
  match checkout.commit(pathspec, message)? {
    Some(sha) => {
      checkout.push_branch()?;
      tracing::info!("pushed {} to {}", &sha[..sha.len().min(7)], checkout.branch());
      Ok(Some(sha))
    }
    None => {
      tracing::info!("nothing to commit on {}", checkout.branch());
      Ok(None)
    }
  }
}

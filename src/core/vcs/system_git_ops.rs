//! Working copy operations for SystemGit checkouts (files, commits, tags, pushes)

use super::system_git::GitCheckout;
use super::{Checkout, LocalCommand, TagInfo};
use crate::core::error::{GitError, ReleaseError, ReleaseResult, ResultExt};
use std::fs;
use std::path::Path;

const SIGNATURE_HEADER: &str = "-----BEGIN PGP SIGNATURE-----";

impl Checkout for GitCheckout {
  fn path(&self) -> &Path {
    self.root()
  }

  fn branch(&self) -> &str {
    &self.branch
  }

  fn read_file(&self, rel: &str) -> ReleaseResult<Option<String>> {
    let path = self.root().join(rel);
    if !path.exists() {
      return Ok(None);
    }
    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", rel))?;
    Ok(Some(content))
  }

  fn write_file(&self, rel: &str, content: &str) -> ReleaseResult<()> {
    let path = self.root().join(rel);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create directory for {}", rel))?;
    }
    fs::write(&path, content).with_context(|| format!("Failed to write {}", rel))?;
    Ok(())
  }

  fn run(&self, command: &LocalCommand) -> ReleaseResult<String> {
    self.run_local(command)
  }

  fn commit(&self, pathspec: &str, message: &str) -> ReleaseResult<Option<String>> {
    self.git(&["add", "-A", "--", pathspec])?;

    // exit status 1 means the index differs from HEAD
    let staged = self
      .git_cmd()
      .args(["diff", "--cached", "--quiet"])
      .status()
      .context("Failed to execute git diff --cached")?;
    match staged.code() {
      Some(0) => return Ok(None),
      Some(1) => {}
      _ => {
        return Err(ReleaseError::Git(GitError::CommandFailed {
          command: "git diff --cached --quiet".to_string(),
          stderr: format!("exited with {}", staged),
        }));
      }
    }

    self.git(&["commit", "--quiet", "--no-verify", "-m", message])?;
    let sha = self.git_stdout(&["rev-parse", "HEAD"])?;
    tracing::debug!("committed {} on {}: {}", sha, self.branch, message);
    Ok(Some(sha))
  }

  fn tag(&self, target: &str, name: &str, message: &str) -> ReleaseResult<TagInfo> {
    match &self.settings.signing_key {
      Some(key) => self.git(&["tag", "-s", "-u", key, "-m", message, name, target])?,
      None => self.git(&["tag", "-a", "-m", message, name, target])?,
    };

    let reference = format!("refs/tags/{}", name);
    let sha = self.git_stdout(&["rev-parse", &reference])?;
    let object = self.git_stdout(&["cat-file", "-p", &reference])?;

    Ok(TagInfo {
      name: name.to_string(),
      sha,
      target: target.to_string(),
      signature: extract_signature(&object),
    })
  }

  fn push_branch(&self) -> ReleaseResult<()> {
    let refspec = format!("refs/heads/{0}:refs/heads/{0}", self.branch);
    self.push(&refspec)
  }

  fn push_tag(&self, name: &str) -> ReleaseResult<()> {
    let refspec = format!("refs/tags/{0}:refs/tags/{0}", name);
    self.push(&refspec)
  }
}

impl GitCheckout {
  fn push(&self, refspec: &str) -> ReleaseResult<()> {
    tracing::debug!("pushing {}", refspec);
    match self.git(&["push", "--quiet", "origin", refspec]) {
      Ok(_) => Ok(()),
      Err(ReleaseError::Git(GitError::CommandFailed { stderr, .. })) => Err(ReleaseError::Git(GitError::PushFailed {
        remote: "origin".to_string(),
        refspec: refspec.to_string(),
        reason: stderr,
      })),
      Err(e) => Err(e),
    }
  }
}

/// Armored signature block from `git cat-file -p <tag>` output
fn extract_signature(object: &str) -> Option<String> {
  object.find(SIGNATURE_HEADER).map(|i| object[i..].trim_end().to_string())
}

//! Operator sign-off for steps the tool cannot perform or verify itself

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::github::PullRequest;
use std::io::{self, BufRead, Write};

pub trait Confirm {
  /// Show `prompt` and return whether the operator approved
  fn confirm(&self, prompt: &str) -> ReleaseResult<bool>;
}

/// Reads approvals from stdin; only the exact answer `yes` approves
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
  fn confirm(&self, prompt: &str) -> ReleaseResult<bool> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    ask(&mut stdin.lock(), &mut stdout.lock(), prompt).context("Failed to read confirmation from stdin")
  }
}

pub(crate) fn ask(reader: &mut impl BufRead, writer: &mut impl Write, prompt: &str) -> io::Result<bool> {
  write!(
    writer,
    "\n{}\nOnly 'yes' will be accepted to approve.\n\nEnter a value: ",
    prompt
  )?;
  writer.flush()?;

  let mut answer = String::new();
  reader.read_line(&mut answer)?;
  Ok(answer.trim_end_matches(['\r', '\n']) == "yes")
}

/// Ask for approval, failing with `Declined { what }` when it is not given
pub fn require(confirm: &dyn Confirm, prompt: &str, what: &str) -> ReleaseResult<()> {
  if confirm.confirm(prompt)? {
    Ok(())
  } else {
    Err(ReleaseError::declined(what))
  }
}

/// Ask the operator to merge `pr`; returns immediately when it is already merged
pub fn confirm_merged(confirm: &dyn Confirm, pr: &PullRequest) -> ReleaseResult<()> {
  if pr.merged {
    return Ok(());
  }
  let prompt = format!("Please merge {} and approve once it is merged.", pr.url);
  require(confirm, &prompt, &format!("Merging {}", pr.url))
}

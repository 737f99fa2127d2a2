//! Release context - build once in the command layer, hand to every action
//!
//! Holds the adapters and the release-wide values (version, repository table) so an
//! action is constructed from one value instead of a long argument list.

use crate::core::vcs::VersionControl;
use crate::github::SourceHost;
use crate::release::repos::{ProjectConfig, RepoRef, Repos};
use crate::release::version::Version;
use crate::ui::Confirm;

#[derive(Clone)]
pub struct ReleaseContext<'a> {
  pub host: &'a dyn SourceHost,
  pub vcs: &'a dyn VersionControl,
  pub confirm: &'a dyn Confirm,
  pub repos: &'a Repos,
  /// The version being released
  pub version: Version,
}

impl<'a> ReleaseContext<'a> {
  pub fn new(
    host: &'a dyn SourceHost,
    vcs: &'a dyn VersionControl,
    confirm: &'a dyn Confirm,
    repos: &'a Repos,
    version: Version,
  ) -> Self {
    Self {
      host,
      vcs,
      confirm,
      repos,
      version,
    }
  }

  pub fn project(&self) -> &ProjectConfig {
    &self.repos.project
  }

  /// The released repository
  pub fn project_repo(&self) -> RepoRef {
    self.repos.project.repo()
  }
}

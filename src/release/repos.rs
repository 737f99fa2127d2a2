//! Repositories, branches and workflows a release touches
//!
//! Defaults describe the Kubo release; every entry can be overridden under `[repos]`
//! in releaser.toml (forks, staging organisations, tests).

use crate::release::version::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `owner/name` of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
  pub owner: String,
  pub name: String,
}

impl RepoRef {
  pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      owner: owner.into(),
      name: name.into(),
    }
  }

  /// Web URL of a path inside the repository, for diagnostics
  pub fn web_url(&self, path: &str) -> String {
    format!("https://github.com/{}/{}/{}", self.owner, self.name, path.trim_start_matches('/'))
  }
}

impl fmt::Display for RepoRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.owner, self.name)
  }
}

/// A repository plus the branch changes are proposed against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
  pub owner: String,
  pub name: String,
  pub default_branch: String,
}

impl RepoConfig {
  fn new(owner: &str, name: &str, default_branch: &str) -> Self {
    Self {
      owner: owner.to_string(),
      name: name.to_string(),
      default_branch: default_branch.to_string(),
    }
  }

  pub fn repo(&self) -> RepoRef {
    RepoRef::new(&self.owner, &self.name)
  }
}

/// A repository whose part of the release is a GitHub Actions workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRepoConfig {
  #[serde(flatten)]
  pub repo: RepoConfig,
  /// Workflow file name under .github/workflows
  pub workflow: String,
  /// Job whose log must mention the released version
  pub job: String,
}

impl WorkflowRepoConfig {
  fn new(owner: &str, name: &str, default_branch: &str, workflow: &str, job: &str) -> Self {
    Self {
      repo: RepoConfig::new(owner, name, default_branch),
      workflow: workflow.to_string(),
      job: job.to_string(),
    }
  }
}

/// The project being released
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
  pub owner: String,
  pub name: String,
  pub default_branch: String,
  /// Long-lived branch final releases are merged into and tagged from
  pub release_branch: String,
  pub sync_assets_workflow: String,
  pub sync_assets_job: String,
  pub docker_workflow: String,
  pub docker_job: String,
}

impl ProjectConfig {
  pub fn repo(&self) -> RepoRef {
    RepoRef::new(&self.owner, &self.name)
  }

  /// `release-v0.18.1`
  pub fn version_release_branch(&self, version: &Version) -> String {
    format!("release-{}", version.major_minor_patch())
  }

  /// `version-update-v0.18`
  pub fn version_update_branch(&self, version: &Version) -> String {
    format!("version-update-{}", version.major_minor())
  }

  /// `merge-release-v0.18.1`
  pub fn release_merge_branch(&self, version: &Version) -> String {
    format!("merge-release-{}", version.major_minor_patch())
  }

  /// `changelog-v0.19.0`
  pub fn changelog_branch(&self, version: &Version) -> String {
    format!("changelog-{}", version.major_minor_patch())
  }

  /// `Release 0.18` for the first release of a cycle, `Release 0.18.1` for patches
  pub fn release_issue_title(&self, version: &Version) -> String {
    let number = &version.major_minor_patch()[1..];
    format!("Release {}", number.strip_suffix(".0").unwrap_or(number))
  }

  /// `docs/changelogs/v0.18.md`
  pub fn changelog_path(&self, version: &Version) -> String {
    format!("docs/changelogs/{}.md", version.major_minor())
  }

  pub fn release_url(&self, version: &Version) -> String {
    self.repo().web_url(&format!("releases/tag/{}", version))
  }

  /// Branch the tag is cut from: the release branch for final releases, the
  /// version branch for prereleases (their PR is never merged)
  pub fn tag_source_branch(&self, version: &Version) -> String {
    if version.is_prerelease() {
      self.version_release_branch(version)
    } else {
      self.release_branch.clone()
    }
  }
}

/// Every repository a release touches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repos {
  pub project: ProjectConfig,
  /// Library whose unreleased commits are listed in the release PR
  pub boxo: RepoConfig,
  pub distributions: RepoConfig,
  pub interop: RepoConfig,
  pub ipfs_desktop: RepoConfig,
  pub ipfs_blog: RepoConfig,
  pub npm: WorkflowRepoConfig,
  pub ipfs_docs: WorkflowRepoConfig,
  pub ipfs_companion: WorkflowRepoConfig,
  pub bifrost: RepoConfig,
}

impl Default for Repos {
  fn default() -> Self {
    Self {
      project: ProjectConfig {
        owner: "ipfs".to_string(),
        name: "kubo".to_string(),
        default_branch: "master".to_string(),
        release_branch: "release".to_string(),
        sync_assets_workflow: "sync-release-assets.yml".to_string(),
        sync_assets_job: "dist-ipfs-tech".to_string(),
        docker_workflow: "docker-image.yml".to_string(),
        docker_job: "Push Docker image to Docker Hub".to_string(),
      },
      boxo: RepoConfig::new("ipfs", "boxo", "main"),
      distributions: RepoConfig::new("ipfs", "distributions", "master"),
      interop: RepoConfig::new("ipfs", "interop", "master"),
      ipfs_desktop: RepoConfig::new("ipfs", "ipfs-desktop", "main"),
      ipfs_blog: RepoConfig::new("ipfs", "ipfs-blog", "main"),
      npm: WorkflowRepoConfig::new("ipfs", "npm-go-ipfs", "master", "main.yml", "publish"),
      ipfs_docs: WorkflowRepoConfig::new("ipfs", "ipfs-docs", "main", "update-on-new-ipfs-tag.yml", "update"),
      ipfs_companion: WorkflowRepoConfig::new("ipfs", "ipfs-companion", "main", "e2e.yml", "test"),
      bifrost: RepoConfig::new("ipfs", "bifrost-infra", "master"),
    }
  }
}

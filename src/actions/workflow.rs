use super::probes::{literal, WorkflowProbe};
use super::{Action, CheckOutcome};
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::github::SourceHost;
use regex::Regex;

/// Stage carried out entirely by a GitHub Actions workflow
///
/// Done once the latest run of the workflow succeeded and the configured job's log
/// mentions the release. `run` dispatches a new run only when no matching or in-flight
/// run exists.
pub struct WorkflowDispatch<'a> {
  host: &'a dyn SourceHost,
  name: &'static str,
  description: &'static str,
  probe: WorkflowProbe,
  /// Branch or tag the run is dispatched on
  reference: String,
  inputs: Vec<(String, String)>,
}

impl<'a> WorkflowDispatch<'a> {
  /// `docker-image.yml` on the release tag
  pub fn docker(ctx: &ReleaseContext<'a>) -> ReleaseResult<Self> {
    let project = &ctx.repos.project;
    let tag = ctx.version.to_string();
    Ok(Self {
      host: ctx.host,
      name: "publish-to-dockerhub",
      description: "Publishing the Docker image",
      probe: WorkflowProbe {
        repo: project.repo(),
        file: project.docker_workflow.clone(),
        branch: Some(tag.clone()),
        job: project.docker_job.clone(),
        pattern: literal(&format!("{}/{}:{}", project.owner, project.name, tag))?,
      },
      reference: tag,
      inputs: Vec::new(),
    })
  }

  /// npm wrapper package publish
  pub fn npm(ctx: &ReleaseContext<'a>) -> ReleaseResult<Self> {
    let npm = &ctx.repos.npm;
    Ok(Self {
      host: ctx.host,
      name: "publish-to-npm",
      description: "Publishing the npm package",
      probe: WorkflowProbe {
        repo: npm.repo.repo(),
        file: npm.workflow.clone(),
        branch: Some(npm.repo.default_branch.clone()),
        job: npm.job.clone(),
        pattern: literal(ctx.version.as_str())?,
      },
      reference: npm.repo.default_branch.clone(),
      inputs: Vec::new(),
    })
  }

  /// Documentation update triggered by the new tag
  pub fn docs(ctx: &ReleaseContext<'a>) -> ReleaseResult<Self> {
    let docs = &ctx.repos.ipfs_docs;
    Ok(Self {
      host: ctx.host,
      name: "update-ipfs-docs",
      description: "Updating the documentation",
      probe: WorkflowProbe {
        repo: docs.repo.repo(),
        file: docs.workflow.clone(),
        branch: Some(docs.repo.default_branch.clone()),
        job: docs.job.clone(),
        pattern: Regex::new(&format!(r"(?m) {}\r?$", regex::escape(ctx.version.as_str())))?,
      },
      reference: docs.repo.default_branch.clone(),
      inputs: Vec::new(),
    })
  }

  /// Browser extension end-to-end tests against the release
  pub fn companion(ctx: &ReleaseContext<'a>) -> ReleaseResult<Self> {
    let companion = &ctx.repos.ipfs_companion;
    Ok(Self {
      host: ctx.host,
      name: "test-ipfs-companion",
      description: "Testing the browser companion",
      probe: WorkflowProbe {
        repo: companion.repo.repo(),
        file: companion.workflow.clone(),
        branch: Some(companion.repo.default_branch.clone()),
        job: companion.job.clone(),
        pattern: literal(ctx.version.as_str())?,
      },
      reference: companion.repo.default_branch.clone(),
      inputs: vec![("kubo-version".to_string(), ctx.version.to_string())],
    })
  }
}

impl Action for WorkflowDispatch<'_> {
  fn name(&self) -> &str {
    self.name
  }

  fn description(&self) -> &str {
    self.description
  }

  fn check(&self) -> ReleaseResult<CheckOutcome> {
    self.probe.check(self.host)
  }

  fn run(&self) -> ReleaseResult<()> {
    if !self.probe.needs_dispatch(self.host)? {
      tracing::info!("{} in {} is running or done, not dispatching", self.probe.file, self.probe.repo);
      return Ok(());
    }
    self
      .host
      .trigger_workflow(&self.probe.repo, &self.probe.file, &self.reference, &self.inputs)?;
    println!(
      "🚀 Dispatched {} on {}@{}: {}",
      self.probe.file,
      self.probe.repo,
      self.reference,
      self.probe.repo.web_url(&format!("actions/workflows/{}", self.probe.file))
    );
    Ok(())
  }
}

//! `releaser release` - build one stage and hand it to the executor
//!
//! Adapters are constructed here, once per invocation, from the loaded
//! [`ReleaserConfig`]. Nothing below this layer reads the environment.

use crate::actions::promote::Chat;
use crate::actions::{
  Action, DownstreamUpdate, MergeBranch, NotifyBifrost, PrepareBranch, PrepareNext, Promote, PublishToDistributions,
  PublishToGitHub, Tag, WorkflowDispatch,
};
use crate::core::config::ReleaserConfig;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::core::executor::{Completion, ExecuteOptions, Executor, ThreadSleeper};
use crate::core::vcs::SystemGit;
use crate::github::GitHubClient;
use crate::matrix::MatrixClient;
use crate::release::{ReleaseDate, Version};
use crate::ui::StdinConfirm;
use chrono::NaiveDate;
use clap::Subcommand;

/// Release stages, in the order a release normally goes through them
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  /// Open the release PR (and the dev version PR for the first release of a cycle)
  PrepareBranch,
  /// Tag the release branch head
  Tag,
  /// Create the GitHub release and sync its assets
  PublishToGithub,
  /// Push the Docker image for the tag
  PublishToDockerhub,
  /// Publish the npm package
  PublishToNpm,
  /// Add the release to dist.ipfs.tech
  PublishToDistributions,
  /// Bump the version in the interop test suite
  UpdateInterop,
  /// Bump the version in IPFS Desktop
  UpdateIpfsDesktop,
  /// Add a release note to the blog
  UpdateIpfsBlog,
  /// Update the docs to the new version
  UpdateIpfsDocs,
  /// Run the companion end-to-end tests against the new version
  TestIpfsCompanion,
  /// Merge the release branch back into the default branch
  MergeBranch,
  /// Open the next release issue and changelog
  PrepareNext,
  /// Announce the release
  Promote,
  /// Tell the infrastructure team about the rollout
  NotifyBifrost,
}

/// Per-invocation parameters of `releaser release`
#[derive(Debug, Clone)]
pub struct ReleaseArgs {
  pub version: String,
  pub date: Option<String>,
  pub skip_matrix: bool,
  pub stage: Stage,
}

/// Run the release command
pub fn run_release(config: &ReleaserConfig, options: ExecuteOptions, args: &ReleaseArgs) -> ReleaseResult<()> {
  let version = Version::parse(&args.version)?;
  let today = ReleaseDate::today();
  let date = ReleaseDate::resolve(args.date.as_deref(), today)?;

  let host = GitHubClient::from_config(config)?;
  let vcs = SystemGit::from_config(config);
  let confirm = StdinConfirm;
  let matrix = matrix_client(config, args)?;
  let chat = matrix.as_ref().map(|client| Chat {
    client,
    room: &config.matrix.room,
    announcer: &config.matrix.announcer,
  });

  let ctx = ReleaseContext::new(&host, &vcs, &confirm, &config.repos, version);
  let action = build_action(args.stage, ctx, chat, date, today)?;

  let sleeper = ThreadSleeper;
  let executor = Executor::new(options, config.backoff.policy(), &sleeper);
  match executor.execute(action.as_ref())? {
    Completion::Unverified => println!("⚠️  {} ran without verification", action.name()),
    Completion::AlreadyComplete | Completion::Converged => {}
  }
  Ok(())
}

/// Matrix is only contacted by `promote`, and only when it can log in
fn matrix_client(config: &ReleaserConfig, args: &ReleaseArgs) -> ReleaseResult<Option<MatrixClient>> {
  if args.stage != Stage::Promote {
    return Ok(None);
  }
  if args.skip_matrix {
    tracing::info!("Matrix disabled with --skip-matrix");
    return Ok(None);
  }
  if !config.matrix.has_credentials() {
    tracing::warn!("no Matrix credentials configured (MATRIX_TOKEN or MATRIX_USER/MATRIX_PASSWORD)");
    return Ok(None);
  }
  Ok(Some(MatrixClient::from_config(&config.matrix)?))
}

pub(crate) fn build_action<'a>(
  stage: Stage,
  ctx: ReleaseContext<'a>,
  chat: Option<Chat<'a>>,
  date: ReleaseDate,
  today: NaiveDate,
) -> ReleaseResult<Box<dyn Action + 'a>> {
  Ok(match stage {
    Stage::PrepareBranch => Box::new(PrepareBranch::new(ctx)),
    Stage::Tag => Box::new(Tag::new(ctx)),
    Stage::PublishToGithub => Box::new(PublishToGitHub::new(ctx)?),
    Stage::PublishToDockerhub => Box::new(WorkflowDispatch::docker(&ctx)?),
    Stage::PublishToNpm => Box::new(WorkflowDispatch::npm(&ctx)?),
    Stage::PublishToDistributions => Box::new(PublishToDistributions::new(ctx)),
    Stage::UpdateInterop => Box::new(DownstreamUpdate::interop(ctx)),
    Stage::UpdateIpfsDesktop => Box::new(DownstreamUpdate::desktop(ctx)),
    Stage::UpdateIpfsBlog => Box::new(DownstreamUpdate::blog(ctx, date)),
    Stage::UpdateIpfsDocs => Box::new(WorkflowDispatch::docs(&ctx)?),
    Stage::TestIpfsCompanion => Box::new(WorkflowDispatch::companion(&ctx)?),
    Stage::MergeBranch => Box::new(MergeBranch::new(ctx)),
    Stage::PrepareNext => Box::new(PrepareNext::new(ctx)?),
    Stage::Promote => Box::new(Promote::new(ctx, chat)),
    Stage::NotifyBifrost => Box::new(NotifyBifrost::new(ctx, date, today)),
  })
}

//! GitHub REST client (blocking)

use super::SourceHost;
use super::types::*;
use crate::core::config::ReleaserConfig;
use crate::core::error::{ApiError, ConfigError, ReleaseError, ReleaseResult};
use crate::release::repos::RepoRef;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::json;

const PER_PAGE: usize = 100;

pub struct GitHubClient {
  http: Client,
  api_url: String,
}

impl GitHubClient {
  pub fn new(api_url: &str, token: &str) -> ReleaseResult<Self> {
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
      ReleaseError::Config(ConfigError::Invalid {
        field: "github.token".to_string(),
        reason: "contains characters not allowed in an HTTP header".to_string(),
      })
    })?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));

    let http = Client::builder()
      .user_agent(concat!("releaser/", env!("CARGO_PKG_VERSION")))
      .default_headers(headers)
      .build()?;

    Ok(Self {
      http,
      api_url: api_url.trim_end_matches('/').to_string(),
    })
  }

  pub fn from_config(config: &ReleaserConfig) -> ReleaseResult<Self> {
    Self::new(&config.github.api_url, config.github_token()?)
  }

  fn repo_url(&self, repo: &RepoRef, path: &str) -> String {
    format!("{}/repos/{}/{}/{}", self.api_url, repo.owner, repo.name, path)
  }

  /// Send a request; 404 becomes `None` when `missing_ok`, any other failure is an `ApiError`
  fn send(
    &self,
    method: Method,
    url: &str,
    build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    missing_ok: bool,
  ) -> ReleaseResult<Option<Response>> {
    tracing::debug!("{} {}", method, url);
    let response = build(self.http.request(method.clone(), url)).send()?;
    let status = response.status();

    if status.is_success() {
      return Ok(Some(response));
    }
    if missing_ok && status == reqwest::StatusCode::NOT_FOUND {
      return Ok(None);
    }

    let text = response.text().unwrap_or_default();
    let message = serde_json::from_str::<WireErrorBody>(&text)
      .map(|b| b.message)
      .unwrap_or(text);
    Err(ReleaseError::Api(ApiError::Status {
      method: method.to_string(),
      url: url.to_string(),
      status: status.as_u16(),
      message,
    }))
  }

  fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> ReleaseResult<Option<T>> {
    match self.send(Method::GET, url, |r| r.query(query), true)? {
      Some(response) => Ok(Some(response.json()?)),
      None => Ok(None),
    }
  }

  fn write_json<T: DeserializeOwned>(&self, method: Method, url: &str, body: serde_json::Value) -> ReleaseResult<T> {
    match self.send(method, url, |r| r.json(&body), false)? {
      Some(response) => Ok(response.json()?),
      None => Err(ReleaseError::message(format!("{} returned no response", url))),
    }
  }

  /// Follow `page=` pagination until a short page
  fn get_paginated<W, T>(
    &self,
    url: &str,
    query: &[(&str, String)],
    items: impl Fn(W) -> Vec<T>,
  ) -> ReleaseResult<Vec<T>>
  where
    W: DeserializeOwned,
  {
    let mut all = Vec::new();
    for page in 1.. {
      let mut q = query.to_vec();
      q.push(("per_page", PER_PAGE.to_string()));
      q.push(("page", page.to_string()));

      let Some(wire) = self.get_json::<W>(url, &q)? else {
        break;
      };
      let batch = items(wire);
      let len = batch.len();
      all.extend(batch);
      if len < PER_PAGE {
        break;
      }
    }
    Ok(all)
  }
}

impl SourceHost for GitHubClient {
  fn get_branch(&self, repo: &RepoRef, name: &str) -> ReleaseResult<Option<Branch>> {
    let url = self.repo_url(repo, &format!("branches/{}", name));
    Ok(self.get_json::<WireBranch>(&url, &[])?.map(Branch::from))
  }

  fn create_branch(&self, repo: &RepoRef, name: &str, source: &str) -> ReleaseResult<Branch> {
    let source_url = self.repo_url(repo, &format!("git/ref/heads/{}", source));
    let source_ref = self.get_json::<WireRef>(&source_url, &[])?.ok_or_else(|| {
      ReleaseError::message(format!(
        "🚨 source branch {} not found ({})",
        source,
        repo.web_url(&format!("tree/{}", source))
      ))
    })?;

    let created: WireRef = self.write_json(
      Method::POST,
      &self.repo_url(repo, "git/refs"),
      json!({ "ref": format!("refs/heads/{}", name), "sha": source_ref.object.sha }),
    )?;

    Ok(Branch {
      name: created
        .reference
        .strip_prefix("refs/heads/")
        .unwrap_or(name)
        .to_string(),
      sha: created.object.sha,
    })
  }

  fn get_pull_request(&self, repo: &RepoRef, head: &str) -> ReleaseResult<Option<PullRequest>> {
    let url = self.repo_url(repo, "pulls");
    let query = [
      ("head", format!("{}:{}", repo.owner, head)),
      ("state", "all".to_string()),
      ("per_page", "1".to_string()),
    ];
    let prs = self.get_json::<Vec<WirePullRequest>>(&url, &query)?.unwrap_or_default();
    Ok(prs.into_iter().next().map(PullRequest::from))
  }

  fn create_pull_request(&self, repo: &RepoRef, pr: &NewPullRequest) -> ReleaseResult<PullRequest> {
    let created: WirePullRequest = self.write_json(
      Method::POST,
      &self.repo_url(repo, "pulls"),
      json!({
        "head": pr.head,
        "base": pr.base,
        "title": pr.title,
        "body": pr.body,
        "draft": pr.draft,
      }),
    )?;
    Ok(created.into())
  }

  fn update_pull_request_body(&self, repo: &RepoRef, number: u64, body: &str) -> ReleaseResult<PullRequest> {
    let updated: WirePullRequest = self.write_json(
      Method::PATCH,
      &self.repo_url(repo, &format!("pulls/{}", number)),
      json!({ "body": body }),
    )?;
    Ok(updated.into())
  }

  fn get_issue(&self, repo: &RepoRef, title: &str) -> ReleaseResult<Option<Issue>> {
    let url = format!("{}/search/issues", self.api_url);
    let search = format!("repo:{} is:issue in:title \"{}\"", repo, title.replace('"', ""));

    // Search matches words, so the exact title can sit on any page
    for page in 1.. {
      let query = [
        ("q", search.clone()),
        ("per_page", PER_PAGE.to_string()),
        ("page", page.to_string()),
      ];
      let Some(results) = self.get_json::<WireSearch<WireIssue>>(&url, &query)? else {
        break;
      };
      let len = results.items.len();
      if let Some(issue) = results
        .items
        .into_iter()
        .find(|i| i.pull_request.is_none() && i.title == title)
      {
        return Ok(Some(issue.into()));
      }
      if len < PER_PAGE {
        break;
      }
    }
    Ok(None)
  }

  fn create_issue(&self, repo: &RepoRef, title: &str, body: &str) -> ReleaseResult<Issue> {
    let created: WireIssue = self.write_json(
      Method::POST,
      &self.repo_url(repo, "issues"),
      json!({ "title": title, "body": body }),
    )?;
    Ok(created.into())
  }

  fn get_issue_comment(&self, repo: &RepoRef, number: u64, body: &str) -> ReleaseResult<Option<IssueComment>> {
    let url = self.repo_url(repo, &format!("issues/{}/comments", number));
    let comments = self.get_paginated(&url, &[], |w: Vec<WireComment>| w)?;
    Ok(
      comments
        .into_iter()
        .map(IssueComment::from)
        .find(|c| c.body == body),
    )
  }

  fn create_issue_comment(&self, repo: &RepoRef, number: u64, body: &str) -> ReleaseResult<IssueComment> {
    let created: WireComment = self.write_json(
      Method::POST,
      &self.repo_url(repo, &format!("issues/{}/comments", number)),
      json!({ "body": body }),
    )?;
    Ok(created.into())
  }

  fn get_file(&self, repo: &RepoRef, path: &str, reference: &str) -> ReleaseResult<Option<String>> {
    let url = self.repo_url(repo, &format!("contents/{}", path));
    let Some(content) = self.get_json::<WireContent>(&url, &[("ref", reference.to_string())])? else {
      return Ok(None);
    };
    if content.encoding != "base64" {
      return Err(ReleaseError::message(format!(
        "{} at {} has unsupported encoding '{}'",
        path, reference, content.encoding
      )));
    }

    let packed: String = content.content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(packed)?;
    Ok(Some(String::from_utf8(bytes)?))
  }

  fn get_tag(&self, repo: &RepoRef, name: &str) -> ReleaseResult<Option<TagRef>> {
    let url = self.repo_url(repo, &format!("git/ref/tags/{}", name));
    Ok(self.get_json::<WireRef>(&url, &[])?.map(|r| TagRef {
      name: r.reference.strip_prefix("refs/tags/").unwrap_or(name).to_string(),
      sha: r.object.sha,
    }))
  }

  fn get_release(&self, repo: &RepoRef, tag: &str) -> ReleaseResult<Option<Release>> {
    let url = self.repo_url(repo, &format!("releases/tags/{}", tag));
    Ok(self.get_json::<WireRelease>(&url, &[])?.map(Release::from))
  }

  fn get_latest_release(&self, repo: &RepoRef) -> ReleaseResult<Option<Release>> {
    let url = self.repo_url(repo, "releases/latest");
    Ok(self.get_json::<WireRelease>(&url, &[])?.map(Release::from))
  }

  fn create_release(&self, repo: &RepoRef, release: &NewRelease) -> ReleaseResult<Release> {
    let created: WireRelease = self.write_json(
      Method::POST,
      &self.repo_url(repo, "releases"),
      json!({
        "tag_name": release.tag,
        "name": release.name,
        "body": release.body,
        "prerelease": release.prerelease,
        "make_latest": if release.make_latest { "true" } else { "false" },
      }),
    )?;
    Ok(created.into())
  }

  fn list_check_runs(&self, repo: &RepoRef, reference: &str) -> ReleaseResult<Vec<CheckRun>> {
    let url = self.repo_url(repo, &format!("commits/{}/check-runs", reference));
    let runs = self.get_paginated(&url, &[], |w: WireCheckRuns| w.check_runs)?;
    Ok(runs.into_iter().map(CheckRun::from).collect())
  }

  fn trigger_workflow(
    &self,
    repo: &RepoRef,
    file: &str,
    reference: &str,
    inputs: &[(String, String)],
  ) -> ReleaseResult<()> {
    let url = self.repo_url(repo, &format!("actions/workflows/{}/dispatches", file));
    let inputs: serde_json::Map<String, serde_json::Value> = inputs
      .iter()
      .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
      .collect();
    // 204 No Content on success
    self.send(
      Method::POST,
      &url,
      |r| r.json(&json!({ "ref": reference, "inputs": inputs })),
      false,
    )?;
    tracing::info!("dispatched {} on {} in {}", file, reference, repo);
    Ok(())
  }

  fn get_latest_workflow_run(
    &self,
    repo: &RepoRef,
    file: &str,
    branch: Option<&str>,
  ) -> ReleaseResult<Option<WorkflowRun>> {
    let url = self.repo_url(repo, &format!("actions/workflows/{}/runs", file));
    let mut query = vec![("per_page", "1".to_string())];
    if let Some(branch) = branch {
      query.push(("branch", branch.to_string()));
    }
    let runs = self
      .get_json::<WireWorkflowRuns>(&url, &query)?
      .map(|w| w.workflow_runs)
      .unwrap_or_default();
    Ok(runs.into_iter().next().map(WorkflowRun::from))
  }

  fn get_workflow_run_logs(&self, repo: &RepoRef, run_id: u64) -> ReleaseResult<WorkflowLogs> {
    let url = self.repo_url(repo, &format!("actions/runs/{}/jobs", run_id));
    let jobs = self.get_paginated(&url, &[], |w: WireJobs| w.jobs)?;

    let mut logs = WorkflowLogs::default();
    for job in jobs {
      let log_url = self.repo_url(repo, &format!("actions/jobs/{}/logs", job.id));
      // redirected to blob storage; expired logs come back as 404/410
      let text = match self.send(Method::GET, &log_url, |r| r, true) {
        Ok(Some(response)) => response.text()?,
        Ok(None) => continue,
        Err(ReleaseError::Api(ApiError::Status { status: 410, .. })) => continue,
        Err(e) => return Err(e),
      };
      logs.jobs.insert(job.name, text);
    }
    Ok(logs)
  }

  fn compare(&self, repo: &RepoRef, base: &str, head: &str) -> ReleaseResult<Vec<CommitSummary>> {
    let url = self.repo_url(repo, &format!("compare/{}...{}", base, head));
    let comparison = self.get_json::<WireComparison>(&url, &[])?.ok_or_else(|| {
      ReleaseError::message(format!("🚨 cannot compare {}...{} in {}", base, head, repo))
    })?;
    Ok(
      comparison
        .commits
        .into_iter()
        .map(|c| CommitSummary {
          sha: c.sha,
          message: c.commit.message,
        })
        .collect(),
    )
  }
}

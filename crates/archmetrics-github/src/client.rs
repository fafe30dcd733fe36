use crate::{Credential, GitHubError, Issue, Repository, WorkflowRuns};
use archmetrics_core::{GitHubConfig, RepositoryRef, WorkflowSummary};
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

const API_VERSION: &str = "2022-11-28";
const JSON_ACCEPT: &str = "application/vnd.github+json";
const RAW_ACCEPT: &str = "application/vnd.github.raw+json";
const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    Open,
    Closed,
    All,
}

impl IssueState {
    fn as_str(self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::All => "all",
        }
    }
}

/// Authenticated client for the GitHub REST API.
///
/// A missing credential does not prevent construction; every request method
/// fails with [`GitHubError::MissingCredential`] before anything is sent.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: String,
    credential: Option<Credential>,
}

impl GitHubClient {
    /// Builds a client from settings, resolving the credential from
    /// `github.token` or the environment.
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let credential = match Credential::resolve(config.token.as_ref()) {
            Ok(credential) => {
                info!(source = credential.source(), "GitHub credential resolved");
                Some(credential)
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        };
        Self::with_credential(config, credential)
    }

    pub fn with_credential(
        config: &GitHubConfig,
        credential: Option<Credential>,
    ) -> Result<Self, GitHubError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GitHubError::Client(e.to_string()))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credential,
        })
    }

    pub fn credential(&self) -> Result<&Credential, GitHubError> {
        self.credential
            .as_ref()
            .ok_or_else(|| GitHubError::MissingCredential {
                checked: crate::CREDENTIAL_ENV_VARS
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            })
    }

    /// Repositories of `org`, most recently updated first. A 404 from the
    /// organization endpoint falls back to the authenticated user's repositories.
    pub async fn list_repos(&self, org: &str, limit: u32) -> Result<Vec<Repository>, GitHubError> {
        let per_page = clamp_page(limit).to_string();
        let query = [("sort", "updated"), ("per_page", per_page.as_str())];

        match self
            .get_json::<Vec<Repository>>(&format!("/orgs/{}/repos", org), &query)
            .await
        {
            Err(GitHubError::Http { status: 404, .. }) => {
                warn!(org, "organization not found, falling back to user repositories");
                self.get_json("/user/repos", &query)
                    .await
                    .map_err(|e| GitHubError::OrganizationNotFound {
                        org: org.to_string(),
                        fallback: e.to_string(),
                    })
            }
            other => other,
        }
    }

    /// One page of issues and pull requests for `repo`. `limit` is clamped to 1..=100.
    pub async fn list_issues(
        &self,
        repo: &RepositoryRef,
        state: IssueState,
        limit: u32,
    ) -> Result<Vec<Issue>, GitHubError> {
        let per_page = clamp_page(limit).to_string();
        self.get_json(
            &format!("/repos/{}/{}/issues", repo.owner, repo.name),
            &[("state", state.as_str()), ("per_page", per_page.as_str())],
        )
        .await
    }

    /// Open issues and pull requests not updated within `threshold_days`.
    pub async fn count_stale_issues(
        &self,
        repo: &RepositoryRef,
        threshold_days: u32,
    ) -> Result<u32, GitHubError> {
        let issues = self
            .list_issues(repo, IssueState::Open, MAX_PER_PAGE)
            .await?;
        Ok(count_stale(&issues, threshold_days))
    }

    /// Latest workflow run on `branch`. Returns `None` when there are no runs
    /// or Actions is unavailable for the repository.
    pub async fn get_workflow_status(
        &self,
        repo: &RepositoryRef,
        branch: &str,
    ) -> Result<Option<WorkflowSummary>, GitHubError> {
        let path = format!("/repos/{}/{}/actions/runs", repo.owner, repo.name);
        match self
            .get_json::<WorkflowRuns>(&path, &[("branch", branch), ("per_page", "1")])
            .await
        {
            Ok(runs) => Ok(runs.workflow_runs.into_iter().next().map(Into::into)),
            Err(e) if e.is_missing_credential() => Err(e),
            Err(e) => {
                debug!(repository = %repo, error = %e, "workflow status unavailable");
                Ok(None)
            }
        }
    }

    /// Raw bytes of a file from the contents API.
    pub async fn get_file_contents(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Vec<u8>, GitHubError> {
        let path = format!("/repos/{}/{}/contents/{}", org, repo, path.trim_start_matches('/'));
        let response = self.send(&path, &[("ref", branch)], RAW_ACCEPT).await?;
        let url = response.url().to_string();
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| GitHubError::Transport {
                url,
                message: e.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GitHubError> {
        let response = self.send(path, query, JSON_ACCEPT).await?;
        let url = response.url().to_string();
        response.json::<T>().await.map_err(|e| GitHubError::Decode {
            url,
            message: e.to_string(),
        })
    }

    async fn send(
        &self,
        path: &str,
        query: &[(&str, &str)],
        accept: &str,
    ) -> Result<Response, GitHubError> {
        let credential = self.credential()?;
        let url = format!("{}{}", self.api_base, path);
        debug!(url = %url, "GitHub request");

        let response = self
            .http
            .get(&url)
            .query(query)
            .header(header::ACCEPT, accept)
            .header(header::AUTHORIZATION, credential.header_value())
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| GitHubError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
                warn!(url = %url, status = status.as_u16(), "GitHub request rejected");
            }
            return Err(GitHubError::Http {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response)
    }
}

fn clamp_page(limit: u32) -> u32 {
    limit.clamp(1, MAX_PER_PAGE)
}

/// Items whose `updated_at` is older than `now - threshold_days`.
pub(crate) fn count_stale(issues: &[Issue], threshold_days: u32) -> u32 {
    let cutoff = Utc::now() - ChronoDuration::days(i64::from(threshold_days));
    issues.iter().filter(|i| i.updated_at < cutoff).count() as u32
}

use crate::client::count_stale;
use crate::{GitHubClient, GitHubError, IssueKind, IssueState};
use archmetrics_core::{
    ArchMetricsError, FetchError, IssueCounts, RepoSignalSource, RepositoryRef, WorkflowSummary,
};
use async_trait::async_trait;

const ISSUE_PAGE: u32 = 100;

fn fetch_error(repo: &RepositoryRef, err: GitHubError) -> FetchError {
    FetchError::new(repo.full_name(), err.to_string())
}

#[async_trait]
impl RepoSignalSource for GitHubClient {
    fn ensure_ready(&self) -> archmetrics_core::Result<()> {
        self.credential()
            .map(|_| ())
            .map_err(ArchMetricsError::from)
    }

    async fn issue_counts(
        &self,
        repo: &RepositoryRef,
        stale_threshold_days: u32,
    ) -> Result<IssueCounts, FetchError> {
        let items = self
            .list_issues(repo, IssueState::Open, ISSUE_PAGE)
            .await
            .map_err(|e| fetch_error(repo, e))?;

        let pull_requests = items
            .iter()
            .filter(|i| i.kind() == IssueKind::PullRequest)
            .count() as u32;
        Ok(IssueCounts {
            issues: items.len() as u32 - pull_requests,
            pull_requests,
            stale: count_stale(&items, stale_threshold_days),
        })
    }

    async fn latest_workflow(
        &self,
        repo: &RepositoryRef,
        branch: &str,
    ) -> Result<Option<WorkflowSummary>, FetchError> {
        self.get_workflow_status(repo, branch)
            .await
            .map_err(|e| fetch_error(repo, e))
    }
}

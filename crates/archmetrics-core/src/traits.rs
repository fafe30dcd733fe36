use crate::{
    ArchitectureDefinition, ArchitectureKey, FetchError, IssueCounts, RepositoryRef, Result,
    WorkflowSummary,
};
use async_trait::async_trait;

/// Loads an architecture definition for a key. Implemented by the GitHub
/// loader; the cache sits in front of it.
#[async_trait]
pub trait ArchitectureSource: Send + Sync {
    async fn load(&self, key: &ArchitectureKey) -> Result<ArchitectureDefinition>;
}

/// Per-repository health signals from the hosting API.
#[async_trait]
pub trait RepoSignalSource: Send + Sync {
    /// Fails when the source cannot make any request at all (e.g. no credential).
    fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    /// Open issue, pull request and stale counts from one listing of `repo`.
    async fn issue_counts(
        &self,
        repo: &RepositoryRef,
        stale_threshold_days: u32,
    ) -> std::result::Result<IssueCounts, FetchError>;

    async fn latest_workflow(
        &self,
        repo: &RepositoryRef,
        branch: &str,
    ) -> std::result::Result<Option<WorkflowSummary>, FetchError>;
}

//! Per-repository signal collection.
//!
//! Every repository produces a `Result<_, FetchError>`; the fold maps errors
//! to the zeroed "unavailable" row, so the output always has exactly one entry
//! per input reference, in input order.

use crate::{
    ArchMetricsError, FetchError, HealthScorer, RepoMetrics, RepoSignalSource, RepoSignals,
    RepoStatus, RepositoryRef, Result,
};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Upper bound on simultaneous in-flight repository fetches.
    pub max_concurrent: usize,
    pub stale_threshold_days: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            stale_threshold_days: 30,
        }
    }
}

#[derive(Clone)]
pub struct MetricsCollector {
    source: Arc<dyn RepoSignalSource>,
    scorer: Arc<dyn HealthScorer>,
    config: CollectorConfig,
}

impl MetricsCollector {
    pub fn new(
        source: Arc<dyn RepoSignalSource>,
        scorer: Arc<dyn HealthScorer>,
        config: CollectorConfig,
    ) -> Self {
        Self {
            source,
            scorer,
            config,
        }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    pub fn scorer(&self) -> &Arc<dyn HealthScorer> {
        &self.scorer
    }

    /// Metrics for each reference, one entry per input in the same order.
    pub async fn collect(
        &self,
        refs: &[RepositoryRef],
        cancel: &CancellationToken,
    ) -> Result<Vec<RepoMetrics>> {
        let results = self
            .fan_out(refs, cancel, |repo| async move { self.fetch_signals(&repo).await })
            .await?;

        Ok(refs
            .iter()
            .zip(results)
            .map(|(repo, result)| self.fold_metrics(repo, result))
            .collect())
    }

    /// Status rows (counts plus latest workflow on `branch`) for each reference.
    pub async fn statuses(
        &self,
        refs: &[RepositoryRef],
        branch: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<RepoStatus>> {
        let results = self
            .fan_out(refs, cancel, |repo| async move {
                let signals = self.fetch_signals(&repo).await?;
                let workflow = self.source.latest_workflow(&repo, branch).await?;
                Ok((signals, workflow))
            })
            .await?;

        Ok(refs
            .iter()
            .zip(results)
            .map(|(repo, result)| match result {
                Ok((signals, last_workflow)) => RepoStatus {
                    owner: repo.owner.clone(),
                    name: repo.name.clone(),
                    open_issues: signals.open_issues,
                    open_prs: signals.open_pull_requests,
                    stale_prs: signals.stale,
                    last_workflow,
                    metrics_available: true,
                },
                Err(e) => {
                    warn!(repository = %repo, error = %e, "status unavailable for repository");
                    RepoStatus::unavailable(repo)
                }
            })
            .collect())
    }

    /// Maps one repository's outcome to its summary row.
    pub fn fold_metrics(
        &self,
        repo: &RepositoryRef,
        result: std::result::Result<RepoSignals, FetchError>,
    ) -> RepoMetrics {
        match result {
            Ok(signals) => RepoMetrics {
                owner: repo.owner.clone(),
                name: repo.name.clone(),
                issues_open: signals.open_issues,
                stale_prs: signals.stale,
                health: self.scorer.score_repository(&signals),
                metrics_available: true,
            },
            Err(e) => {
                warn!(repository = %repo, error = %e, "metrics unavailable for repository");
                RepoMetrics::unavailable(repo)
            }
        }
    }

    async fn fetch_signals(
        &self,
        repo: &RepositoryRef,
    ) -> std::result::Result<RepoSignals, FetchError> {
        debug!(repository = %repo, "fetching repository signals");
        let counts = self
            .source
            .issue_counts(repo, self.config.stale_threshold_days)
            .await?;
        Ok(RepoSignals {
            open_issues: counts.issues,
            open_pull_requests: counts.pull_requests,
            stale: counts.stale,
        })
    }

    /// Runs `fetch` for every reference with bounded concurrency. `buffered`
    /// yields results in input order regardless of completion order.
    async fn fan_out<'a, T, F, Fut>(
        &'a self,
        refs: &[RepositoryRef],
        cancel: &CancellationToken,
        fetch: F,
    ) -> Result<Vec<std::result::Result<T, FetchError>>>
    where
        F: Fn(RepositoryRef) -> Fut + 'a,
        Fut: Future<Output = std::result::Result<T, FetchError>> + 'a,
    {
        let limit = self.config.max_concurrent.max(1);
        let work = stream::iter(refs.iter().cloned().map(fetch))
            .buffered(limit)
            .collect::<Vec<_>>();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(repositories = refs.len(), "collection cancelled");
                Err(ArchMetricsError::Cancelled)
            }
            results = work => Ok(results),
        }
    }
}

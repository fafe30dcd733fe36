use archmetrics_cache::ArchitectureCache;
use archmetrics_core::{
    aggregate, extract, ArchitectureConfig, ArchitectureDefinition, ArchitectureKey,
    ArchitectureSource, MetricsCollector, RepoSignalSource, RepoStatus, Result, Summary,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Runs the load, extract, collect and aggregate pipeline for one request.
pub struct SummaryService {
    cache: Arc<ArchitectureCache>,
    source: Arc<dyn ArchitectureSource>,
    signals: Arc<dyn RepoSignalSource>,
    collector: MetricsCollector,
    defaults: ArchitectureConfig,
}

impl SummaryService {
    pub fn new(
        cache: Arc<ArchitectureCache>,
        source: Arc<dyn ArchitectureSource>,
        signals: Arc<dyn RepoSignalSource>,
        collector: MetricsCollector,
        defaults: ArchitectureConfig,
    ) -> Self {
        Self {
            cache,
            source,
            signals,
            collector,
            defaults,
        }
    }

    /// Cache key with `branch` and `path` falling back to the configured defaults.
    pub fn key(
        &self,
        org: &str,
        repo: &str,
        branch: Option<String>,
        path: Option<String>,
    ) -> ArchitectureKey {
        ArchitectureKey::new(
            org,
            repo,
            branch
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| self.defaults.default_branch.clone()),
            path.filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| self.defaults.default_path.clone()),
        )
    }

    pub fn default_key(&self, branch: Option<String>, path: Option<String>) -> ArchitectureKey {
        self.key(
            &self.defaults.default_org,
            &self.defaults.default_repo,
            branch,
            path,
        )
    }

    pub async fn architecture(&self, key: &ArchitectureKey) -> Result<Arc<ArchitectureDefinition>> {
        self.cache.get_or_load(key, self.source.as_ref()).await
    }

    /// Aggregated summary of every repository the architecture references.
    /// Owner-less repositories resolve against the key's organization.
    pub async fn summary(&self, key: &ArchitectureKey, cancel: &CancellationToken) -> Result<Summary> {
        self.signals.ensure_ready()?;
        let adf = self.architecture(key).await?;
        let refs = extract(&adf, &key.org);
        info!(key = %key, repositories = refs.len(), "collecting architecture metrics");

        let metrics = self.collector.collect(&refs, cancel).await?;
        Ok(aggregate(&adf, metrics, self.collector.scorer().as_ref()))
    }

    /// Status rows for every referenced repository, with workflows on the key's branch.
    pub async fn repo_statuses(
        &self,
        key: &ArchitectureKey,
        cancel: &CancellationToken,
    ) -> Result<Vec<RepoStatus>> {
        self.signals.ensure_ready()?;
        let adf = self.architecture(key).await?;
        let refs = extract(&adf, &key.org);
        self.collector.statuses(&refs, &key.branch, cancel).await
    }
}

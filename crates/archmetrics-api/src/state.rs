use crate::SummaryService;
use archmetrics_cache::ArchitectureCache;
use archmetrics_core::{HealthScorer, JitterHealthScorer, MetricsCollector, Settings};
use archmetrics_github::{ArchitectureLoader, GitHubClient, GitHubError};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub cache: Arc<ArchitectureCache>,
    pub github: Arc<GitHubClient>,
    pub summaries: Arc<SummaryService>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, GitHubError> {
        let github = Arc::new(GitHubClient::new(&settings.github)?);
        Ok(Self::from_parts(
            settings,
            github,
            Arc::new(JitterHealthScorer::default()),
        ))
    }

    pub fn from_parts(
        settings: Settings,
        github: Arc<GitHubClient>,
        scorer: Arc<dyn HealthScorer>,
    ) -> Self {
        let cache = Arc::new(ArchitectureCache::new(Duration::from_secs(
            settings.architecture.cache_ttl_secs,
        )));
        let loader = Arc::new(ArchitectureLoader::new(
            github.clone(),
            &settings.architecture,
        ));
        let collector = MetricsCollector::new(
            github.clone(),
            scorer,
            settings.collector.to_collector_config(),
        );
        let summaries = Arc::new(SummaryService::new(
            cache.clone(),
            loader,
            github.clone(),
            collector,
            settings.architecture.clone(),
        ));

        Self {
            settings: Arc::new(settings),
            cache,
            github,
            summaries,
        }
    }
}

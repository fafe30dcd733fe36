use crate::GitHubClient;
use archmetrics_core::{
    ArchitectureConfig, ArchitectureDefinition, ArchitectureKey, ArchitectureSource, Result,
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Loads ADF documents from repository contents, or from a bundled local file
/// for the default architecture.
pub struct ArchitectureLoader {
    client: Arc<GitHubClient>,
    default_repo: String,
    default_path: String,
    local_file: Option<PathBuf>,
}

impl ArchitectureLoader {
    pub fn new(client: Arc<GitHubClient>, config: &ArchitectureConfig) -> Self {
        Self {
            client,
            default_repo: config.default_repo.clone(),
            default_path: config.default_path.clone(),
            local_file: config.local_file.clone(),
        }
    }

    fn local_source(&self, key: &ArchitectureKey) -> Option<&PathBuf> {
        if key.repo == self.default_repo && key.path == self.default_path {
            self.local_file.as_ref()
        } else {
            None
        }
    }
}

#[async_trait]
impl ArchitectureSource for ArchitectureLoader {
    async fn load(&self, key: &ArchitectureKey) -> Result<ArchitectureDefinition> {
        if let Some(path) = self.local_source(key) {
            info!(key = %key, path = %path.display(), "loading architecture from local file");
            let bytes = tokio::fs::read(path).await?;
            return ArchitectureDefinition::from_slice(&bytes);
        }

        debug!(key = %key, "fetching architecture from repository contents");
        let bytes = self
            .client
            .get_file_contents(&key.org, &key.repo, &key.path, &key.branch)
            .await?;
        ArchitectureDefinition::from_slice(&bytes)
    }
}

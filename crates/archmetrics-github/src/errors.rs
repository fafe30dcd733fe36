use archmetrics_core::ArchMetricsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("No GitHub credential found. Checked environment variables: {}", checked.join(", "))]
    MissingCredential { checked: Vec<String> },

    #[error("GitHub API error ({status}) for {url}")]
    Http { status: u16, url: String },

    #[error("Organization '{org}' not found and user repositories fallback failed: {fallback}")]
    OrganizationNotFound { org: String, fallback: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Unexpected response body from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl GitHubError {
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, GitHubError::MissingCredential { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<GitHubError> for ArchMetricsError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::MissingCredential { checked } => {
                ArchMetricsError::MissingCredential { checked }
            }
            GitHubError::Http { status, url } => ArchMetricsError::Http { status, url },
            GitHubError::OrganizationNotFound { org, fallback } => {
                ArchMetricsError::OrganizationNotFound { org, fallback }
            }
            GitHubError::Transport { .. } | GitHubError::Decode { .. } => {
                ArchMetricsError::Transport(err.to_string())
            }
            GitHubError::Client(message) => ArchMetricsError::Config(message),
        }
    }
}

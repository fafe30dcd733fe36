use thiserror::Error;

/// Failure fetching one repository's signals. Always recovered by the collector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to fetch signals for {repository}: {message}")]
pub struct FetchError {
    pub repository: String,
    pub message: String,
}

impl FetchError {
    pub fn new(repository: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ArchMetricsError {
    #[error("No GitHub credential found. Checked environment variables: {}", checked.join(", "))]
    MissingCredential { checked: Vec<String> },

    #[error("Malformed architecture definition: {0}")]
    MalformedArchitecture(String),

    #[error(
        "Organization '{org}' not found (GET /orgs/{org}/repos returned 404) and the user repositories fallback failed: {fallback}"
    )]
    OrganizationNotFound { org: String, fallback: String },

    #[error("GitHub API error ({status}) for {url}")]
    Http { status: u16, url: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ArchMetricsError>;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A repository identified by `(owner, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Splits `owner/name` on the first `/`; a bare name is paired with `default_owner`.
    pub fn parse(raw: &str, default_owner: &str) -> Self {
        match raw.split_once('/') {
            Some((owner, name)) => Self::new(owner.trim(), name.trim()),
            None => Self::new(default_owner, raw.trim()),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Cache key for a loaded architecture definition.
///
/// Equality and hashing cover the four fields as a tuple, so two keys are
/// equal only when every component is equal. The `Display` form is for logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchitectureKey {
    pub org: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
}

impl ArchitectureKey {
    pub fn new(
        org: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            branch: branch.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for ArchitectureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.org, self.repo, self.branch, self.path)
    }
}

/// Per-repository metrics emitted in a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoMetrics {
    pub owner: String,
    pub name: String,
    pub issues_open: u32,
    #[serde(rename = "stalePRs")]
    pub stale_prs: u32,
    pub health: u8,
    pub metrics_available: bool,
}

impl RepoMetrics {
    /// Entry emitted when a repository's signals could not be fetched.
    pub fn unavailable(repo: &RepositoryRef) -> Self {
        Self {
            owner: repo.owner.clone(),
            name: repo.name.clone(),
            issues_open: 0,
            stale_prs: 0,
            health: 0,
            metrics_available: false,
        }
    }
}

/// Open issue and pull request counts for one repository, taken from a
/// single listing so `stale` is counted over the same items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IssueCounts {
    pub issues: u32,
    pub pull_requests: u32,
    /// Open items of either kind not updated within the stale threshold.
    pub stale: u32,
}

/// Raw signals gathered for one repository before scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoSignals {
    pub open_issues: u32,
    pub open_pull_requests: u32,
    pub stale: u32,
}

/// The most recent workflow run on a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub id: u64,
    pub name: Option<String>,
    pub status: Option<String>,
    pub conclusion: Option<String>,
    pub branch: Option<String>,
    pub html_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Per-repository status row for the repository listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStatus {
    pub owner: String,
    pub name: String,
    pub open_issues: u32,
    #[serde(rename = "openPRs")]
    pub open_prs: u32,
    #[serde(rename = "stalePRs")]
    pub stale_prs: u32,
    pub last_workflow: Option<WorkflowSummary>,
    pub metrics_available: bool,
}

impl RepoStatus {
    pub fn unavailable(repo: &RepositoryRef) -> Self {
        Self {
            owner: repo.owner.clone(),
            name: repo.name.clone(),
            open_issues: 0,
            open_prs: 0,
            stale_prs: 0,
            last_workflow: None,
            metrics_available: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_first_slash() {
        let r = RepositoryRef::parse("acme/tools/extra", "default");
        assert_eq!(r.owner, "acme");
        assert_eq!(r.name, "tools/extra");

        let bare = RepositoryRef::parse("widget", "acme");
        assert_eq!(bare, RepositoryRef::new("acme", "widget"));
    }

    #[test]
    fn keys_with_slashes_do_not_collide() {
        let a = ArchitectureKey::new("o", "r", "feature/x", "adf.json");
        let b = ArchitectureKey::new("o", "r", "feature", "x/adf.json");
        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn repo_metrics_serializes_with_wire_names() {
        let m = RepoMetrics::unavailable(&RepositoryRef::new("acme", "api"));
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["issuesOpen"], 0);
        assert_eq!(v["stalePRs"], 0);
        assert_eq!(v["metricsAvailable"], false);
    }
}

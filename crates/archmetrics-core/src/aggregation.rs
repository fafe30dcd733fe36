use crate::{
    ArchitectureDefinition, Container, HealthScorer, Relationship, RepoMetrics, RepositorySpec,
    BASELINE_OVERALL_HEALTH,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEST_COVERAGE: f64 = 0.0;
pub const DEFAULT_BUILD_STATUS: &str = "pending";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub architecture: ArchitectureInfo,
    pub repositories: Vec<RepoMetrics>,
    pub containers: Vec<ContainerSummary>,
    pub aggregated_metrics: AggregatedMetrics,
    pub relationships: Vec<Relationship>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchitectureInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    pub repositories: Vec<String>,
    pub health_score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMetrics {
    pub overall_health: u8,
    pub total_issues: u32,
    #[serde(rename = "stalePRs")]
    pub stale_prs: u32,
    pub test_coverage: f64,
    pub build_status: String,
    pub total_repositories: usize,
    pub repositories_with_metrics: usize,
}

/// Folds per-repository metrics and the architecture's own metadata into a
/// summary. Performs no I/O.
pub fn aggregate(
    adf: &ArchitectureDefinition,
    repositories: Vec<RepoMetrics>,
    scorer: &dyn HealthScorer,
) -> Summary {
    let total_issues = repositories.iter().map(|m| m.issues_open).sum();
    let stale_prs = repositories.iter().map(|m| m.stale_prs).sum();

    let available: Vec<u32> = repositories
        .iter()
        .filter(|m| m.metrics_available)
        .map(|m| u32::from(m.health))
        .collect();

    let containers = adf
        .containers()
        .iter()
        .map(|c| summarize_container(c, scorer))
        .collect();

    let metrics = adf.metrics.as_ref();

    Summary {
        architecture: ArchitectureInfo {
            name: adf.name.clone(),
            version: adf.version.clone(),
            description: adf.description.clone(),
        },
        aggregated_metrics: AggregatedMetrics {
            overall_health: overall_health(&available),
            total_issues,
            stale_prs,
            test_coverage: metrics
                .and_then(|m| m.test_coverage)
                .unwrap_or(DEFAULT_TEST_COVERAGE),
            build_status: metrics
                .and_then(|m| m.build_status.clone())
                .unwrap_or_else(|| DEFAULT_BUILD_STATUS.to_string()),
            total_repositories: repositories.len(),
            repositories_with_metrics: available.len(),
        },
        repositories,
        containers,
        relationships: adf.all_relationships(),
        generated_at: Utc::now(),
    }
}

fn overall_health(available: &[u32]) -> u8 {
    if available.is_empty() {
        return BASELINE_OVERALL_HEALTH;
    }
    let mean = available.iter().sum::<u32>() as f64 / available.len() as f64;
    mean.round().clamp(0.0, 100.0) as u8
}

fn summarize_container(container: &Container, scorer: &dyn HealthScorer) -> ContainerSummary {
    let health_score = container
        .metrics
        .as_ref()
        .and_then(|m| m.health_score)
        .filter(|s| s.is_finite())
        .map(declared_health)
        .unwrap_or_else(|| scorer.score_container());

    ContainerSummary {
        id: container.id.clone(),
        name: container.name.clone(),
        kind: container.kind.clone(),
        description: container.description.clone(),
        team: container.team.clone(),
        repositories: container.repositories.iter().map(spec_label).collect(),
        health_score,
    }
}

/// ADFs declare `healthScore` either as a 0..1 fraction or on a 0..100 scale.
fn declared_health(score: f64) -> u8 {
    let scaled = if score <= 1.0 { score * 100.0 } else { score };
    scaled.round().clamp(0.0, 100.0) as u8
}

fn spec_label(spec: &RepositorySpec) -> String {
    match &spec.owner {
        Some(owner) => format!("{}/{}", owner, spec.name),
        None => spec.name.clone(),
    }
}

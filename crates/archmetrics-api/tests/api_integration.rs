use archmetrics_api::{create_router, AppState};
use archmetrics_core::{FixedHealthScorer, Settings};
use archmetrics_github::{Credential, GitHubClient};
use axum_test::TestServer;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(github: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.github.api_base = github.uri();
    settings.github.timeout_secs = 5;
    settings.architecture.default_org = "acme".into();
    settings.architecture.default_repo = "platform".into();
    settings.collector.max_concurrent = 2;
    settings
}

fn test_server(github: &MockServer, token: Option<&str>) -> TestServer {
    let settings = settings(github);
    let credential = token.map(|t| Credential::new(SecretString::from(t.to_string()), "test"));
    let client = Arc::new(GitHubClient::with_credential(&settings.github, credential).unwrap());
    let state = AppState::from_parts(settings, client, Arc::new(FixedHealthScorer(80)));
    TestServer::new(create_router(state)).unwrap()
}

fn platform_adf() -> Value {
    json!({
        "name": "Platform",
        "version": "3.1.0",
        "description": "platform architecture",
        "c4Model": {
            "containers": [
                { "id": "a", "name": "A", "type": "service", "repository": "a" },
                { "id": "b", "name": "B", "type": "service", "repository": "acme/b" },
                { "id": "c", "name": "C", "type": "service", "repositories": ["c", "a"] }
            ],
            "relationships": [{ "from": "a", "to": "b", "type": "calls" }]
        }
    })
}

async fn mount_adf(server: &MockServer, body: Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/repos/acme/platform/contents/adf.json"))
        .and(query_param("ref", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_issues(server: &MockServer, repo: &str, status: u16) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(json!([
            { "number": 1, "state": "open", "created_at": "2099-01-01T00:00:00Z", "updated_at": "2099-01-01T00:00:00Z" },
            { "number": 2, "state": "open", "created_at": "2020-01-01T00:00:00Z", "updated_at": "2020-01-01T00:00:00Z",
              "pull_request": { "url": "x" } }
        ]))
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("GET"))
        .and(path(format!("/repos/acme/{repo}/issues")))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let github = MockServer::start().await;
    let server = test_server(&github, None);

    let resp = server.get("/health").await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn summary_keeps_repositories_whose_fetch_failed() {
    let github = MockServer::start().await;
    mount_adf(&github, platform_adf(), 1).await;
    mount_issues(&github, "a", 200).await;
    mount_issues(&github, "b", 500).await;
    mount_issues(&github, "c", 200).await;
    let server = test_server(&github, Some("ghp_test"));

    let resp = server.get("/api/summary/architecture/acme/platform").await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();

    let repos = body["repositories"].as_array().unwrap();
    let names: Vec<&str> = repos.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    assert_eq!(repos[1]["metricsAvailable"], false);
    assert_eq!(repos[1]["issuesOpen"], 0);
    assert_eq!(repos[1]["stalePRs"], 0);
    assert_eq!(repos[1]["health"], 0);

    assert_eq!(repos[0]["metricsAvailable"], true);
    assert_eq!(repos[0]["issuesOpen"], 1);
    assert_eq!(repos[0]["stalePRs"], 1);

    let metrics = &body["aggregatedMetrics"];
    assert_eq!(metrics["totalIssues"], 2);
    assert_eq!(metrics["stalePRs"], 2);
    assert_eq!(metrics["overallHealth"], 80);
    assert_eq!(metrics["testCoverage"], 0.0);
    assert_eq!(metrics["buildStatus"], "pending");
    assert_eq!(body["architecture"]["name"], "Platform");
    assert_eq!(body["relationships"][0]["type"], "calls");
}

#[tokio::test]
async fn default_summary_uses_configured_architecture() {
    let github = MockServer::start().await;
    mount_adf(&github, json!({ "name": "Platform", "c4Model": { "containers": [] } }), 1).await;
    let server = test_server(&github, Some("ghp_test"));

    let resp = server.get("/api/summary/architecture").await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body["aggregatedMetrics"]["overallHealth"], 75);
    assert_eq!(body["repositories"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn missing_credential_is_a_client_error() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&github)
        .await;
    let server = test_server(&github, None);

    let resp = server.get("/api/summary/architecture/acme/platform").await;
    assert_eq!(resp.status_code(), 400);
    let body: Value = resp.json();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("GITHUB_TOKEN"));
    assert!(message.contains("GH_TOKEN"));
    assert!(message.contains("GITHUB_PAT"));
}

#[tokio::test]
async fn malformed_architecture_is_rejected() {
    let github = MockServer::start().await;
    mount_adf(
        &github,
        json!({ "name": "Broken", "c4Model": { "containers": [{ "id": "x", "repository": 42 }] } }),
        1,
    )
    .await;
    let server = test_server(&github, Some("ghp_test"));

    let resp = server.get("/api/summary/architecture/acme/platform").await;
    assert_eq!(resp.status_code(), 400);
    let body: Value = resp.json();
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().contains("Malformed architecture"));
}

#[tokio::test]
async fn architecture_is_served_from_cache() {
    let github = MockServer::start().await;
    mount_adf(&github, platform_adf(), 1).await;
    let server = test_server(&github, Some("ghp_test"));

    for _ in 0..2 {
        let resp = server.get("/api/adf/acme/platform").await;
        assert_eq!(resp.status_code(), 200);
        let body: Value = resp.json();
        assert_eq!(body["name"], "Platform");
        assert_eq!(body, platform_adf());
    }

    let stats: Value = server.get("/api/adf/cache/stats").await.json();
    assert_eq!(stats, json!({ "hits": 1, "misses": 1, "size": 1 }));

    let cleared: Value = server.delete("/api/adf/cache").await.json();
    assert_eq!(cleared["size"], 1);
    let stats: Value = server.get("/api/adf/cache/stats").await.json();
    assert_eq!(stats, json!({ "hits": 0, "misses": 0, "size": 0 }));
}

#[tokio::test]
async fn export_formats() {
    let github = MockServer::start().await;
    mount_adf(&github, platform_adf(), 1).await;
    let server = test_server(&github, Some("ghp_test"));

    let resp = server
        .get("/api/adf/acme/platform/export")
        .add_query_param("format", "graphml")
        .await;
    assert_eq!(resp.status_code(), 200);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(content_type.contains("xml"));
    let xml = resp.text();
    assert!(xml.contains("<edge id=\"e0\" source=\"a\" target=\"b\">"));
    assert!(xml.contains("<data key=\"label\">calls</data>"));

    let resp = server
        .get("/api/adf/acme/platform/export")
        .add_query_param("format", "mermaid")
        .await;
    assert_eq!(resp.status_code(), 200);
    let diagram = resp.text();
    assert!(diagram.starts_with("graph TB\n    subgraph System[\"Platform\"]"));
    assert!(diagram.contains("    a -->|calls| b"));

    let resp = server
        .get("/api/adf/acme/platform/export")
        .add_query_param("format", "plantuml")
        .await;
    assert_eq!(resp.status_code(), 200);
    let diagram = resp.text();
    assert!(diagram.contains("    Container(c, \"C\", \"service\")"));
    assert!(diagram.contains("Rel(a, b, \"calls\")"));

    let resp = server
        .get("/api/adf/acme/platform/export")
        .add_query_param("format", "yaml")
        .await;
    assert_eq!(resp.status_code(), 200);
    assert!(resp.text().contains("name: Platform"));

    let resp = server
        .get("/api/adf/acme/platform/export")
        .add_query_param("format", "docx")
        .await;
    assert_eq!(resp.status_code(), 400);
}

#[tokio::test]
async fn repo_statuses_include_latest_workflow() {
    let github = MockServer::start().await;
    mount_adf(
        &github,
        json!({ "name": "Platform", "c4Model": { "containers": [{ "id": "a", "name": "A", "repository": "a" }] } }),
        1,
    )
    .await;
    mount_issues(&github, "a", 200).await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/a/actions/runs"))
        .and(query_param("branch", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "workflow_runs": [{ "id": 5, "name": "CI", "status": "completed", "conclusion": "failure", "head_branch": "main" }]
        })))
        .mount(&github)
        .await;
    let server = test_server(&github, Some("ghp_test"));

    let resp = server.get("/api/repos/architecture/acme/platform").await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body[0]["openIssues"], 1);
    assert_eq!(body[0]["openPRs"], 1);
    assert_eq!(body[0]["lastWorkflow"]["conclusion"], "failure");
}

#[tokio::test]
async fn org_listing_falls_back_to_user_repositories() {
    let github = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/someone/repos"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&github)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 7, "name": "notes", "full_name": "someone/notes", "owner": { "login": "someone" }
        }])))
        .mount(&github)
        .await;
    let server = test_server(&github, Some("ghp_test"));

    let resp = server
        .get("/api/repos/someone")
        .add_query_param("limit", 10)
        .await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body[0]["full_name"], "someone/notes");
}

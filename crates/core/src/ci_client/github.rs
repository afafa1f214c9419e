//! GitHub Actions backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::GithubConfig;
use crate::workflow::WorkflowName;

use super::{CiClient, CiClientError, WorkflowRun};

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("ocmts-orchestrator/", env!("CARGO_PKG_VERSION"));

/// `GET .../actions/workflows/{id}/runs` response body.
#[derive(Debug, Deserialize)]
struct WorkflowRunsPage {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

/// GitHub Actions client bound to one repository.
pub struct GithubClient {
    client: Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self, CiClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CiClientError::ConnectionFailed(format!("HTTP client setup: {}", e)))?;

        Ok(Self { client, config })
    }

    fn api_url(&self) -> &str {
        self.config.api_url.trim_end_matches('/')
    }

    fn repo_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_url(),
            urlencoding::encode(&self.config.owner),
            urlencoding::encode(&self.config.repo)
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.config.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response, CiClientError> {
        let response = self.authorized(builder).send().await.map_err(|e| {
            if e.is_timeout() {
                CiClientError::Timeout
            } else if e.is_connect() {
                CiClientError::ConnectionFailed(e.to_string())
            } else {
                CiClientError::ApiError(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(200).collect();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                CiClientError::Unauthorized(format!("HTTP {}: {}", status, body))
            }
            StatusCode::NOT_FOUND => CiClientError::NotFound(what.to_string()),
            _ => CiClientError::ApiError(format!("HTTP {}: {}", status, body)),
        })
    }
}

#[async_trait]
impl CiClient for GithubClient {
    fn name(&self) -> &str {
        "github"
    }

    async fn dispatch(&self, workflow: &WorkflowName, git_ref: &str) -> Result<(), CiClientError> {
        let url = format!(
            "{}/actions/workflows/{}/dispatches",
            self.repo_url(),
            urlencoding::encode(workflow.as_str())
        );
        debug!(workflow = %workflow, git_ref = git_ref, "Dispatching workflow");

        let body = serde_json::json!({ "ref": git_ref });
        self.send(self.client.post(&url).json(&body), &format!("workflow {}", workflow))
            .await?;
        Ok(())
    }

    async fn list_in_progress_runs(
        &self,
        workflow: &WorkflowName,
        branch: &str,
    ) -> Result<Vec<WorkflowRun>, CiClientError> {
        let url = format!(
            "{}/actions/workflows/{}/runs",
            self.repo_url(),
            urlencoding::encode(workflow.as_str())
        );
        let per_page = self.config.per_page.to_string();
        let request = self.client.get(&url).query(&[
            ("status", "in_progress"),
            ("branch", branch),
            ("per_page", per_page.as_str()),
        ]);

        let page: WorkflowRunsPage = self
            .send(request, &format!("workflow {}", workflow))
            .await?
            .json()
            .await
            .map_err(|e| CiClientError::InvalidResponse(e.to_string()))?;

        debug!(
            workflow = %workflow,
            total = page.total_count,
            returned = page.workflow_runs.len(),
            "Listed in-progress runs"
        );
        Ok(page.workflow_runs)
    }

    async fn get_run(&self, run_id: u64) -> Result<WorkflowRun, CiClientError> {
        let url = format!("{}/actions/runs/{}", self.repo_url(), run_id);
        self.send(self.client.get(&url), &format!("run {}", run_id))
            .await?
            .json()
            .await
            .map_err(|e| CiClientError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci_client::{Conclusion, RunState};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> GithubConfig {
        GithubConfig {
            api_url: server.uri(),
            token: "test-token".to_string(),
            owner: "cs3org".to_string(),
            repo: "ocm-test-suite".to_string(),
            ..GithubConfig::default()
        }
    }

    #[tokio::test]
    async fn test_dispatch_posts_ref() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/repos/cs3org/ocm-test-suite/actions/workflows/login-nc-v27.yml/dispatches",
            ))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(json!({ "ref": "refs/heads/main" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = GithubClient::new(config_for(&server)).unwrap();
        client
            .dispatch(&WorkflowName::from("login-nc-v27.yml"), "refs/heads/main")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_in_progress_runs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/repos/cs3org/ocm-test-suite/actions/workflows/login-oc-v10.yml/runs",
            ))
            .and(query_param("status", "in_progress"))
            .and(query_param("branch", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 1,
                "workflow_runs": [
                    { "id": 42, "status": "in_progress", "conclusion": null }
                ]
            })))
            .mount(&server)
            .await;

        let client = GithubClient::new(config_for(&server)).unwrap();
        let runs = client
            .list_in_progress_runs(&WorkflowName::from("login-oc-v10.yml"), "main")
            .await
            .unwrap();

        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, 42);
        assert_eq!(runs[0].status, RunState::InProgress);
    }

    #[tokio::test]
    async fn test_get_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/cs3org/ocm-test-suite/actions/runs/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "status": "completed",
                "conclusion": "failure",
                "html_url": "https://github.com/cs3org/ocm-test-suite/actions/runs/42"
            })))
            .mount(&server)
            .await;

        let client = GithubClient::new(config_for(&server)).unwrap();
        let run = client.get_run(42).await.unwrap();
        assert!(run.is_completed());
        assert_eq!(run.conclusion, Some(Conclusion::Failure));
    }

    #[tokio::test]
    async fn test_status_codes_map_to_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/cs3org/ocm-test-suite/actions/runs/1"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/cs3org/ocm-test-suite/actions/runs/2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/cs3org/ocm-test-suite/actions/runs/3"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/cs3org/ocm-test-suite/actions/runs/4"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = GithubClient::new(config_for(&server)).unwrap();

        let err = client.get_run(1).await.unwrap_err();
        assert!(matches!(err, CiClientError::Unauthorized(_)));
        assert!(err.to_string().contains("Bad credentials"));

        let err = client.get_run(2).await.unwrap_err();
        assert!(matches!(err, CiClientError::NotFound(_)));

        let err = client.get_run(3).await.unwrap_err();
        assert!(matches!(err, CiClientError::ApiError(ref m) if m.contains("502")));

        let err = client.get_run(4).await.unwrap_err();
        assert!(matches!(err, CiClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let config = GithubConfig {
            api_url: "http://127.0.0.1:1".to_string(),
            token: "t".to_string(),
            owner: "o".to_string(),
            repo: "r".to_string(),
            ..GithubConfig::default()
        };
        let client = GithubClient::new(config).unwrap();
        let err = client.get_run(1).await.unwrap_err();
        assert!(matches!(err, CiClientError::ConnectionFailed(_)));
    }
}

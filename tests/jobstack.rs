//! Job search server tests: search, cache, snapshots and the HTTP client

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_test::assert_ok;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gmail_jobstack_mcp::error::{JobsApiError, Result};
use gmail_jobstack_mcp::jobs::client::{JobSearchApi, JobStackClient};
use gmail_jobstack_mcp::jobs::snapshot::SnapshotWriter;
use gmail_jobstack_mcp::jobs::tools::JobToolHandler;
use gmail_jobstack_mcp::jobs::types::{SearchRequest, UserProfile};
use gmail_jobstack_mcp::mcp::handler::McpHandler;
use gmail_jobstack_mcp::mcp::McpServer;

/// Returns a fixed response and counts searches
struct StubSearch {
    response: std::result::Result<Value, u16>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl JobSearchApi for StubSearch {
    async fn search(&self, _request: &SearchRequest) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(value) => Ok(value.clone()),
            Err(status) => Err(JobsApiError::RequestFailed {
                status: *status,
                body: "upstream down".to_string(),
            }
            .into()),
        }
    }
}

fn job(id: i64, title: &str, description: &str) -> Value {
    json!({
        "id": id,
        "job_title": title,
        "url": format!("https://jobs.example.com/{}", id),
        "date_posted": "2024-05-01",
        "location": "Bengaluru, India",
        "country_code": "IN",
        "remote": false,
        "hybrid": true,
        "salary_string": "30-40 LPA",
        "min_annual_salary_usd": 36000.0,
        "seniority": "mid_level",
        "employment_statuses": ["full_time"],
        "description": description,
        "company_object": {
            "name": "Acme AI",
            "domain": "acme.ai",
            "technology_slugs": ["greenhouse"],
            "company_keywords": ["llm"]
        }
    })
}

fn search_response(count: i64) -> Value {
    let mut data: Vec<Value> = (1..=count)
        .map(|id| job(id, "Machine Learning Engineer", "Build RAG pipelines with LangChain and Python."))
        .collect();
    // no id: skipped with a warning
    data.push(json!({"job_title": "Broken record"}));
    json!({"metadata": {"total_results": count + 1}, "data": data})
}

struct Setup {
    handler: JobToolHandler<StubSearch>,
    calls: Arc<AtomicUsize>,
    dir: tempfile::TempDir,
}

fn setup(response: std::result::Result<Value, u16>) -> Setup {
    let dir = tempfile::tempdir().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = JobToolHandler::new(StubSearch {
        response,
        calls: calls.clone(),
    })
    .with_snapshots(SnapshotWriter::new(dir.path().join("outputs")));

    Setup { handler, calls, dir }
}

fn snapshot_names(dir: &tempfile::TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path().join("outputs"))
        .map(|entries| {
            entries
                .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

mod search_tests {
    use super::*;

    #[tokio::test]
    async fn test_search_summarizes_and_caches() {
        let mut setup = setup(Ok(search_response(12)));

        let result = setup
            .handler
            .call_tool("search-jobs", json!({"countries": ["IN", "US"]}))
            .await
            .unwrap();
        assert!(!result.is_error);

        let summary = result.structured_content.unwrap();
        assert_eq!(summary["total_jobs"], 12);
        assert_eq!(summary["jobs"].as_array().unwrap().len(), 10);
        assert_eq!(
            summary["search_criteria"],
            json!({"technologies": ["greenhouse"], "countries": ["IN", "US"], "max_age_days": 7})
        );

        let first = &summary["jobs"][0];
        assert_eq!(first["company"]["name"], "Acme AI");
        assert_eq!(first["min_salary_usd"], 36000.0);
        assert!(first.get("description").is_none());

        assert_eq!(setup.handler.cache().len(), 12);
        assert_eq!(setup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_search_writes_both_snapshots() {
        let mut setup = setup(Ok(search_response(2)));
        setup.handler.call_tool("search-jobs", Value::Null).await.unwrap();

        let names = snapshot_names(&setup.dir);
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("job_search_full_"));
        assert!(names[1].starts_with("job_search_processed_"));

        let processed: Value = serde_json::from_str(
            &std::fs::read_to_string(setup.dir.path().join("outputs").join(&names[1])).unwrap(),
        )
        .unwrap();
        assert_eq!(processed["metadata"]["total_results"], 3);
        assert_eq!(processed["jobs"].as_array().unwrap().len(), 2);
        assert_eq!(
            processed["search_criteria"]["titles"],
            json!(["AI", "ML", "Machine", "NLP", "Applied"])
        );
        assert!(processed["jobs"][0]["company"].get("technology_slugs").is_none());
        assert!(processed["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_api_failure_is_remote_error_result() {
        let mut setup = setup(Err(500));
        let result = setup.handler.call_tool("search-jobs", json!({})).await.unwrap();

        assert!(result.is_error);
        let error = &result.structured_content.unwrap()["error"];
        assert_eq!(error["kind"], "remote_api");
        assert!(error["message"].as_str().unwrap().contains("API request failed: 500"));
        assert!(setup.handler.cache().is_empty());
        assert!(snapshot_names(&setup.dir).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_arguments_skip_the_api() {
        let mut setup = setup(Ok(search_response(1)));
        assert!(setup.handler.call_tool("search-jobs", json!({"max_age_days": 0})).await.is_err());
        assert!(setup.handler.call_tool("search-jobs", json!({"countries": "IN"})).await.is_err());
        assert!(setup.handler.call_tool("get-job-details", json!({})).await.is_err());
        assert!(setup.handler.call_tool("find-me-a-job", json!({})).await.is_err());
        assert_eq!(setup.calls.load(Ordering::SeqCst), 0);
    }
}

mod cache_tests {
    use super::*;

    #[tokio::test]
    async fn test_details_and_match_need_a_search_first() {
        let mut setup = setup(Ok(search_response(1)));

        let miss = setup
            .handler
            .call_tool("get-job-details", json!({"job_id": 1}))
            .await
            .unwrap();
        assert!(miss.is_error);
        assert_eq!(miss.structured_content.as_ref().unwrap()["error"]["kind"], "not_found");
        assert_eq!(
            miss.first_text().unwrap(),
            "Error: Job search API error: Job 1 not found in cache. Search first."
        );

        setup.handler.call_tool("search-jobs", json!({})).await.unwrap();

        let details = setup
            .handler
            .call_tool("get-job-details", json!({"job_id": 1}))
            .await
            .unwrap()
            .structured_content
            .unwrap();
        assert_eq!(details["title"], "Machine Learning Engineer");
        assert_eq!(details["company"], "Acme AI");
        assert_eq!(details["salary"], "30-40 LPA");
        assert_eq!(details["hybrid"], true);
        assert_eq!(details["url"], "https://jobs.example.com/1");
    }

    #[tokio::test]
    async fn test_match_analysis_uses_profile() {
        let mut setup = setup(Ok(search_response(1)));
        setup.handler.call_tool("search-jobs", json!({})).await.unwrap();

        let analysis = setup
            .handler
            .call_tool("analyze-job-match", json!({"job_id": 1}))
            .await
            .unwrap()
            .structured_content
            .unwrap();

        // rag, langchain, python of the eight default skills
        assert_eq!(analysis["match_score"], 37.5);
        assert_eq!(analysis["recommendation"], "Good Match");
        assert_eq!(analysis["matching_skills"], json!(["rag", "langchain", "python"]));
        assert_eq!(analysis["remote"], false);
    }

    #[tokio::test]
    async fn test_custom_profile_changes_score() {
        let mut setup = setup(Ok(search_response(1)));
        let profile = UserProfile {
            skills: vec!["Python".to_string(), "RAG".to_string()],
            ..Default::default()
        };
        setup.handler = setup.handler.with_profile(profile);
        setup.handler.call_tool("search-jobs", json!({})).await.unwrap();

        let analysis = setup
            .handler
            .call_tool("analyze-job-match", json!({"job_id": 1}))
            .await
            .unwrap()
            .structured_content
            .unwrap();
        assert_eq!(analysis["match_score"], 100.0);
        assert_eq!(analysis["recommendation"], "Strong Match");
    }
}

mod transport_tests {
    use super::*;

    #[tokio::test]
    async fn test_job_server_over_transport() {
        let setup = setup(Ok(search_response(3)));
        let mut server = McpServer::new(setup.handler);

        let input = [
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
                "name": "search-jobs", "arguments": {"technologies": ["lever"]}
            }}),
            json!({"jsonrpc": "2.0", "id": 4, "method": "prompts/get", "params": {
                "name": "job-application", "arguments": {"job_id": "2"}
            }}),
        ]
        .iter()
        .map(|l| format!("{}\n", l))
        .collect::<String>();

        let mut output = Vec::new();
        assert_ok!(
            server
                .run(tokio::io::BufReader::new(input.as_bytes()), &mut output)
                .await
        );

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "jobstack");
        assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 3);
        assert_eq!(
            responses[2]["result"]["structuredContent"]["search_criteria"]["technologies"],
            json!(["lever"])
        );
        let text = responses[3]["result"]["messages"][0]["content"]["text"].as_str().unwrap();
        assert!(text.starts_with("Create application for job ID: 2"));
        assert_eq!(server.handler().cache().len(), 3);
    }
}

mod client_tests {
    use super::*;
    use gmail_jobstack_mcp::jobs::types::SearchCriteria;

    fn request() -> SearchRequest {
        SearchRequest::for_criteria(&SearchCriteria {
            technologies: vec!["greenhouse".to_string()],
            countries: vec!["IN".to_string()],
            max_age_days: 7,
        })
    }

    #[tokio::test]
    async fn test_client_posts_payload_with_bearer_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/jobs/search"))
            .and(header("authorization", "Bearer secret-key"))
            .and(body_partial_json(json!({
                "posted_at_max_age_days": 7,
                "company_technology_slug_or": ["greenhouse"],
                "job_country_code_or": ["IN"],
                "limit": 50
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"metadata": {}, "data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = JobStackClient::new("secret-key").with_base_url(server.uri());
        let body = client.search(&request()).await.unwrap();
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_client_maps_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/jobs/search"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let client = JobStackClient::new("wrong").with_base_url(server.uri());
        let err = client.search(&request()).await.unwrap_err();
        assert_eq!(err.to_string(), "Job search API error: API request failed: 401");
    }
}

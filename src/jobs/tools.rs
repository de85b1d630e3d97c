//! Job tool catalog and dispatcher
//!
//! The handler owns the session's [`JobCache`]: search-jobs fills it, and
//! get-job-details / analyze-job-match only ever read from it.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::config::jobs::{
    DEFAULT_COUNTRY, DEFAULT_MAX_AGE_DAYS, DEFAULT_OUTPUT_DIR, DEFAULT_TECHNOLOGY, SUMMARY_JOBS, TITLES,
};
use crate::error::{AdapterError, JobsApiError, McpError, Result, ValidationError};
use crate::jobs::cache::JobCache;
use crate::jobs::client::JobSearchApi;
use crate::jobs::matching::{analyze, details};
use crate::jobs::prompts::job_prompts;
use crate::jobs::snapshot::{SnapshotWriter, PROCESSED_PREFIX, RAW_PREFIX};
use crate::jobs::types::*;
use crate::mcp::handler::McpHandler;
use crate::mcp::prompts::PromptRegistry;
use crate::mcp::schema::{parse_args, tool_def};
use crate::mcp::types::{CallToolResult, ServerInfo, Tool};

/// Name reported during `initialize`
pub const SERVER_NAME: &str = "jobstack";

#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct SearchJobsArgs {
    /// Company slugs (defaults to ['greenhouse'])
    #[serde(default)]
    pub technologies: Option<Vec<String>>,

    /// Country codes (defaults to ['IN'])
    #[serde(default)]
    pub countries: Option<Vec<String>>,

    /// Max age in days (default: 7)
    #[serde(default)]
    #[validate(range(min = 1))]
    pub max_age_days: Option<u32>,
}

impl SearchJobsArgs {
    /// Fill in defaults; empty lists count as missing
    pub fn criteria(self) -> SearchCriteria {
        let or_default = |values: Option<Vec<String>>, default: &str| {
            values
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| vec![default.to_string()])
        };

        SearchCriteria {
            technologies: or_default(self.technologies, DEFAULT_TECHNOLOGY),
            countries: or_default(self.countries, DEFAULT_COUNTRY),
            max_age_days: self.max_age_days.unwrap_or(DEFAULT_MAX_AGE_DAYS),
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct JobIdArgs {
    /// Job ID from a previous search
    #[validate(range(min = 1))]
    pub job_id: i64,
}

/// A validated job tool invocation
#[derive(Debug, Clone)]
pub enum JobToolCall {
    SearchJobs(SearchJobsArgs),
    GetJobDetails(JobIdArgs),
    AnalyzeJobMatch(JobIdArgs),
}

impl JobToolCall {
    /// Resolve a tool name and validate its arguments
    pub fn parse(name: &str, args: Value) -> std::result::Result<Self, McpError> {
        Ok(match name {
            "search-jobs" => Self::SearchJobs(parse_args(args)?),
            "get-job-details" => Self::GetJobDetails(parse_args(args)?),
            "analyze-job-match" => Self::AnalyzeJobMatch(parse_args(args)?),
            _ => {
                return Err(McpError::UnknownTool {
                    name: name.to_string(),
                })
            }
        })
    }
}

/// The job tool catalog
pub fn job_tools() -> Vec<Tool> {
    vec![
        tool_def::<SearchJobsArgs>(
            "search-jobs",
            "Search AI/ML jobs (saves full data to JSON, returns compact summary)",
        ),
        tool_def::<JobIdArgs>("get-job-details", "Get compact job details from cache"),
        tool_def::<JobIdArgs>("analyze-job-match", "Analyze job-profile match"),
    ]
}

/// Tool handler for the job search server
pub struct JobToolHandler<C> {
    api: C,
    cache: JobCache,
    snapshots: SnapshotWriter,
    profile: UserProfile,
    prompts: PromptRegistry,
}

impl<C: JobSearchApi> JobToolHandler<C> {
    /// Handler with the built-in profile, writing snapshots to `outputs/`
    pub fn new(api: C) -> Self {
        let profile = UserProfile::default();
        Self {
            api,
            cache: JobCache::new(),
            snapshots: SnapshotWriter::new(DEFAULT_OUTPUT_DIR),
            prompts: job_prompts(&profile),
            profile,
        }
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.prompts = job_prompts(&profile);
        self.profile = profile;
        self
    }

    pub fn with_snapshots(mut self, snapshots: SnapshotWriter) -> Self {
        self.snapshots = snapshots;
        self
    }

    pub fn cache(&self) -> &JobCache {
        &self.cache
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Run a validated call
    pub async fn execute(&mut self, call: JobToolCall) -> Result<CallToolResult> {
        match call {
            JobToolCall::SearchJobs(args) => {
                let summary = self.search(args.criteria()).await?;
                Ok(json_result("search", &summary))
            }
            JobToolCall::GetJobDetails(args) => {
                let job = self.cached(args.job_id)?;
                Ok(json_result("job", &details(job)))
            }
            JobToolCall::AnalyzeJobMatch(args) => {
                let job = self.cached(args.job_id)?;
                Ok(json_result("analysis", &analyze(&self.profile, job)))
            }
        }
    }

    fn cached(&self, job_id: i64) -> Result<&FullJobListing> {
        self.cache
            .get(job_id)
            .ok_or_else(|| JobsApiError::JobNotFound { job_id }.into())
    }

    /// One search page: snapshot, convert, cache, summarize
    async fn search(&mut self, criteria: SearchCriteria) -> Result<SearchSummary> {
        let request = SearchRequest::for_criteria(&criteria);
        let raw = self.api.search(&request).await?;
        self.snapshots.write(RAW_PREFIX, &raw).await;

        let records = match raw.get("data") {
            Some(Value::Array(records)) => records.clone(),
            _ => Vec::new(),
        };

        let mut compact_jobs = Vec::with_capacity(records.len());
        let mut full_jobs = Vec::with_capacity(records.len());

        for record in records {
            let record_id = record.get("id").cloned().unwrap_or(Value::Null);
            let converted = serde_json::from_value::<RawJob>(record)
                .map_err(AdapterError::from)
                .and_then(|job| job.into_listings().map_err(AdapterError::from));

            match converted {
                Ok((compact, full)) => {
                    compact_jobs.push(compact);
                    self.cache.insert(full.clone());
                    full_jobs.push(full);
                }
                Err(e) => {
                    tracing::warn!("Error processing job {}: {}", record_id, e);
                }
            }
        }

        let processed = ProcessedSnapshot {
            metadata: raw.get("metadata").cloned().unwrap_or_else(|| Value::Object(Default::default())),
            jobs: full_jobs,
            search_criteria: SnapshotCriteria {
                titles: TITLES.iter().map(|t| t.to_string()).collect(),
                criteria: criteria.clone(),
            },
            timestamp: chrono::Local::now().to_rfc3339(),
        };
        self.snapshots.write(PROCESSED_PREFIX, &processed).await;

        tracing::info!(
            "Job search returned {} jobs ({} cached)",
            compact_jobs.len(),
            self.cache.len()
        );

        let total_jobs = compact_jobs.len();
        compact_jobs.truncate(SUMMARY_JOBS);

        Ok(SearchSummary {
            total_jobs,
            jobs: compact_jobs,
            search_criteria: criteria,
        })
    }
}

#[async_trait]
impl<C: JobSearchApi> McpHandler for JobToolHandler<C> {
    fn server_info(&self) -> ServerInfo {
        ServerInfo::named(SERVER_NAME)
    }

    fn list_tools(&self) -> Vec<Tool> {
        job_tools()
    }

    async fn call_tool(&mut self, name: &str, arguments: Value) -> std::result::Result<CallToolResult, McpError> {
        let call = JobToolCall::parse(name, arguments)?;

        Ok(self.execute(call).await.unwrap_or_else(|e| {
            tracing::warn!("Tool {} failed: {}", name, e);
            CallToolResult::failure(e.kind(), e.to_string())
        }))
    }

    fn prompts(&self) -> &PromptRegistry {
        &self.prompts
    }
}

fn json_result<T: Serialize>(key: &str, payload: &T) -> CallToolResult {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => CallToolResult::with_structured(text, key, payload),
        Err(e) => {
            let error: AdapterError = ValidationError::MessageBuild {
                message: e.to_string(),
            }
            .into();
            CallToolResult::failure(error.kind(), error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog() {
        let tools = job_tools();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["search-jobs", "get-job-details", "analyze-job-match"]);

        let details = &tools[1];
        assert_eq!(details.input_schema["required"], json!(["job_id"]));
        assert!(tools[0].input_schema.get("required").is_none());
    }

    #[test]
    fn test_search_defaults() {
        let criteria = SearchJobsArgs::default().criteria();
        assert_eq!(criteria.technologies, vec!["greenhouse".to_string()]);
        assert_eq!(criteria.countries, vec!["IN".to_string()]);
        assert_eq!(criteria.max_age_days, 7);

        let criteria = SearchJobsArgs {
            technologies: Some(vec![]),
            countries: Some(vec!["US".to_string()]),
            max_age_days: Some(30),
        }
        .criteria();
        assert_eq!(criteria.technologies, vec!["greenhouse".to_string()]);
        assert_eq!(criteria.countries, vec!["US".to_string()]);
        assert_eq!(criteria.max_age_days, 30);
    }

    #[test]
    fn test_parse_rejects_bad_job_ids() {
        assert!(JobToolCall::parse("get-job-details", json!({})).is_err());
        assert!(JobToolCall::parse("get-job-details", json!({"job_id": 0})).is_err());
        assert!(JobToolCall::parse("analyze-job-match", json!({"job_id": "12"})).is_err());
        assert!(JobToolCall::parse("analyze-job-match", json!({"job_id": 12})).is_ok());
    }

    #[test]
    fn test_parse_search_args() {
        assert!(JobToolCall::parse("search-jobs", Value::Null).is_ok());
        assert!(JobToolCall::parse("search-jobs", json!({"max_age_days": 0})).is_err());
        assert!(JobToolCall::parse("search-jobs", json!({"limit": 5})).is_err());
        assert!(matches!(
            JobToolCall::parse("apply-everywhere", json!({})),
            Err(McpError::UnknownTool { .. })
        ));
    }
}

//! TheirStack job search types
//!
//! Raw records are read leniently (every field optional) and then split into
//! a compact listing for clients and a full listing for the cache and
//! snapshots.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::jobs::{PAGE_LIMIT, TITLES};
use crate::error::JobsApiError;
use crate::jobs::clean::clean_description;

/// Candidate profile used for prompts and match scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub preferred_locations: Vec<String>,
    #[serde(default)]
    pub years_of_experience: Option<u32>,
    #[serde(default)]
    pub experience: Option<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "AI/ML Engineer".to_string(),
            skills: ["AI/ML", "NLP", "LLM", "RAG", "LangChain", "PyTorch", "Python", "FastAPI"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            preferred_locations: vec!["India".to_string(), "Remote".to_string()],
            years_of_experience: Some(1),
            experience: Some(String::new()),
        }
    }
}

/// Sort key for the search request
#[derive(Debug, Clone, Serialize)]
pub struct OrderBy {
    pub desc: bool,
    pub field: String,
}

/// Body of `POST /jobs/search`
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub include_total_results: bool,
    pub order_by: Vec<OrderBy>,
    pub posted_at_max_age_days: u32,
    pub company_technology_slug_or: Vec<String>,
    pub job_country_code_or: Vec<String>,
    pub job_title_or: Vec<String>,
    pub page: u32,
    pub limit: u32,
    pub blur_company_data: bool,
}

impl SearchRequest {
    /// First page of AI/ML titles for the given criteria
    pub fn for_criteria(criteria: &SearchCriteria) -> Self {
        Self {
            include_total_results: false,
            order_by: vec![OrderBy {
                desc: true,
                field: "num_jobs".to_string(),
            }],
            posted_at_max_age_days: criteria.max_age_days,
            company_technology_slug_or: criteria.technologies.clone(),
            job_country_code_or: criteria.countries.clone(),
            job_title_or: TITLES.iter().map(|t| t.to_string()).collect(),
            page: 0,
            limit: PAGE_LIMIT,
            blur_company_data: false,
        }
    }
}

/// Effective search parameters, echoed back to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub technologies: Vec<String>,
    pub countries: Vec<String>,
    pub max_age_days: u32,
}

/// Company fields kept in compact listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactCompanyInfo {
    pub name: String,
    pub domain: String,
    pub industry: String,
    pub country_code: String,
    pub employee_count_range: String,
    pub is_recruiting_agency: bool,
}

impl CompactCompanyInfo {
    fn from_object(company: &Map<String, Value>) -> Self {
        let text = |key: &str, default: &str| {
            company
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string()
        };

        Self {
            name: text("name", "Unknown"),
            domain: text("domain", ""),
            industry: text("industry", ""),
            country_code: text("country_code", ""),
            employee_count_range: text("employee_count_range", ""),
            is_recruiting_agency: company
                .get("is_recruiting_agency")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

/// Listing returned to the client from search-jobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactJobListing {
    pub id: i64,
    pub job_title: String,
    pub url: String,
    pub date_posted: String,
    pub location: String,
    pub country_code: String,
    pub remote: bool,
    pub hybrid: bool,
    pub salary_string: String,
    pub min_salary_usd: Option<f64>,
    pub max_salary_usd: Option<f64>,
    pub seniority: String,
    pub employment_statuses: Vec<String>,
    pub easy_apply: bool,
    pub clean_description: String,
    pub company: CompactCompanyInfo,
}

/// Listing kept in the cache and written to snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullJobListing {
    pub id: i64,
    pub job_title: String,
    pub url: String,
    pub final_url: String,
    pub date_posted: String,
    pub location: String,
    pub country: String,
    pub country_code: String,
    pub remote: bool,
    pub hybrid: bool,
    pub salary_string: String,
    pub min_annual_salary_usd: Option<f64>,
    pub max_annual_salary_usd: Option<f64>,
    pub avg_annual_salary_usd: Option<f64>,
    pub seniority: String,
    pub employment_statuses: Vec<String>,
    pub easy_apply: bool,
    pub description: String,
    pub company: Map<String, Value>,
}

impl FullJobListing {
    /// Company name, or "Unknown"
    pub fn company_name(&self) -> &str {
        self.company
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
    }
}

/// Company fields too long to keep
const DROPPED_COMPANY_FIELDS: [&str; 3] = ["company_keywords", "technology_slugs", "technology_names"];

/// One record from the search response; every field may be absent or null
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawJob {
    pub id: Option<i64>,
    pub job_title: Option<String>,
    pub url: Option<String>,
    pub final_url: Option<String>,
    pub date_posted: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub remote: Option<bool>,
    pub hybrid: Option<bool>,
    pub salary_string: Option<String>,
    pub min_annual_salary_usd: Option<f64>,
    pub max_annual_salary_usd: Option<f64>,
    pub avg_annual_salary_usd: Option<f64>,
    pub seniority: Option<String>,
    pub employment_statuses: Option<Vec<String>>,
    pub easy_apply: Option<bool>,
    pub description: Option<String>,
    pub company_object: Option<Map<String, Value>>,
}

impl RawJob {
    /// Build both listing shapes; records without an id are rejected
    pub fn into_listings(self) -> Result<(CompactJobListing, FullJobListing), JobsApiError> {
        let id = self.id.ok_or_else(|| JobsApiError::InvalidResponse {
            message: "job record has no id".to_string(),
        })?;

        let company = self.company_object.unwrap_or_default();
        let description = self.description.unwrap_or_default();
        let employment_statuses = self.employment_statuses.unwrap_or_default();

        let compact = CompactJobListing {
            id,
            job_title: self.job_title.clone().unwrap_or_default(),
            url: self.url.clone().unwrap_or_default(),
            date_posted: self.date_posted.clone().unwrap_or_default(),
            location: self.location.clone().unwrap_or_default(),
            country_code: self.country_code.clone().unwrap_or_default(),
            remote: self.remote.unwrap_or(false),
            hybrid: self.hybrid.unwrap_or(false),
            salary_string: self.salary_string.clone().unwrap_or_default(),
            min_salary_usd: self.min_annual_salary_usd,
            max_salary_usd: self.max_annual_salary_usd,
            seniority: self.seniority.clone().unwrap_or_default(),
            employment_statuses: employment_statuses.clone(),
            easy_apply: self.easy_apply.unwrap_or(false),
            clean_description: clean_description(&description),
            company: CompactCompanyInfo::from_object(&company),
        };

        let mut company = company;
        for field in DROPPED_COMPANY_FIELDS {
            company.remove(field);
        }

        let full = FullJobListing {
            id,
            job_title: self.job_title.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            final_url: self.final_url.unwrap_or_default(),
            date_posted: self.date_posted.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            country_code: self.country_code.unwrap_or_default(),
            remote: self.remote.unwrap_or(false),
            hybrid: self.hybrid.unwrap_or(false),
            salary_string: self.salary_string.unwrap_or_default(),
            min_annual_salary_usd: self.min_annual_salary_usd,
            max_annual_salary_usd: self.max_annual_salary_usd,
            avg_annual_salary_usd: self.avg_annual_salary_usd,
            seniority: self.seniority.unwrap_or_default(),
            employment_statuses,
            easy_apply: self.easy_apply.unwrap_or(false),
            description,
            company,
        };

        Ok((compact, full))
    }
}

/// What search-jobs returns to the client
#[derive(Debug, Clone, Serialize)]
pub struct SearchSummary {
    pub total_jobs: usize,
    pub jobs: Vec<CompactJobListing>,
    pub search_criteria: SearchCriteria,
}

/// Criteria as recorded in the processed snapshot
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotCriteria {
    pub titles: Vec<String>,
    #[serde(flatten)]
    pub criteria: SearchCriteria,
}

/// Body of the processed snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedSnapshot {
    pub metadata: Value,
    pub jobs: Vec<FullJobListing>,
    pub search_criteria: SnapshotCriteria,
    pub timestamp: String,
}

/// Short view of a cached job for get-job-details
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetails {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub remote: bool,
    pub hybrid: bool,
    pub salary: String,
    pub seniority: String,
    pub description: String,
    pub url: String,
}

/// Result of analyze-job-match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchAnalysis {
    pub job_id: i64,
    pub title: String,
    pub company: String,
    pub match_score: f64,
    pub matching_skills: Vec<String>,
    pub recommendation: String,
    pub salary: String,
    pub location: String,
    pub remote: bool,
}

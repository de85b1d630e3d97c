//! Prompt templates for the job search server

use crate::config::jobs::{DEFAULT_COUNTRY, DEFAULT_MAX_AGE_DAYS, DEFAULT_TECHNOLOGY};
use crate::jobs::types::UserProfile;
use crate::mcp::prompts::{PromptArgs, PromptRegistry, PromptTemplate};

/// Comma-separated prompt argument as a list, or `None` when blank
fn csv(args: &PromptArgs, name: &str) -> Option<Vec<String>> {
    let values: Vec<String> = args
        .get(name)?
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    (!values.is_empty()).then_some(values)
}

fn profile_line(profile: &UserProfile) -> String {
    match profile.years_of_experience {
        Some(years) => format!("{} with {}+ years of experience", profile.name, years),
        None => profile.name.clone(),
    }
}

fn experience(profile: &UserProfile) -> &str {
    match profile.experience.as_deref() {
        Some(text) if !text.trim().is_empty() => text,
        _ => "None",
    }
}

/// Both job prompts, rendered against `profile`
pub fn job_prompts(profile: &UserProfile) -> PromptRegistry {
    let search_profile = profile.clone();
    let application_profile = profile.clone();

    PromptRegistry::new()
        .with(
            PromptTemplate::new("search-jobs", "Search for AI/ML jobs matching the profile", move |args| {
                let technologies = csv(args, "technologies")
                    .map(|v| v.join(", "))
                    .unwrap_or_else(|| format!("{} (default)", DEFAULT_TECHNOLOGY));
                let countries = csv(args, "countries")
                    .map(|v| v.join(", "))
                    .unwrap_or_else(|| format!("{} (default)", DEFAULT_COUNTRY));
                let max_age = args
                    .get("max_age_days")
                    .and_then(|v| v.trim().parse::<u32>().ok())
                    .filter(|days| *days > 0)
                    .unwrap_or(DEFAULT_MAX_AGE_DAYS);

                format!(
                    "Search AI/ML jobs:\n\nParameters:\n- Technologies: {}\n- Countries: {}\n- Max Age: {} days\n\n\
                     Profile: {}\nSkills: {}\nExperience: {}\n\n\
                     Use search-jobs tool to find matching positions.",
                    technologies,
                    countries,
                    max_age,
                    profile_line(&search_profile),
                    search_profile.skills.join(", "),
                    experience(&search_profile),
                )
            })
            .optional(
                "technologies",
                "Company technology slugs (comma-separated, defaults to 'greenhouse')",
            )
            .optional("countries", "Country codes (comma-separated, defaults to 'IN')")
            .optional("max_age_days", "Maximum age of job postings in days (default: 7)"),
        )
        .with(
            PromptTemplate::new("job-application", "Prepare an application for a cached job", move |args| {
                format!(
                    "Create application for job ID: {}\n\nProfile: {}\nSkills: {}\nCustom message: {}\n\n\
                     Use get-job-details and analyze-job-match tools to create tailored application.",
                    args.get_or("job_id", ""),
                    profile_line(&application_profile),
                    application_profile.skills.join(", "),
                    args.get_or("custom_message", "None"),
                )
            })
            .required("job_id", "ID of a job returned by search-jobs")
            .optional("custom_message", "Extra notes to include in the application"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::McpError;
    use crate::mcp::types::ToolResultContent;
    use std::collections::HashMap;

    fn render(name: &str, args: &[(&str, &str)]) -> String {
        let args: HashMap<String, String> = args
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let result = job_prompts(&UserProfile::default()).get(name, Some(args)).unwrap();
        match &result.messages[0].content {
            ToolResultContent::Text { text } => text.clone(),
        }
    }

    #[test]
    fn test_catalog() {
        let prompts = job_prompts(&UserProfile::default()).list();
        let names: Vec<&str> = prompts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["search-jobs", "job-application"]);
        assert!(prompts[0].arguments.iter().all(|a| !a.required));
        assert!(prompts[1].arguments[0].required);
    }

    #[test]
    fn test_search_defaults() {
        let text = render("search-jobs", &[]);
        assert!(text.contains("- Technologies: greenhouse (default)"));
        assert!(text.contains("- Countries: IN (default)"));
        assert!(text.contains("- Max Age: 7 days"));
        assert!(text.contains("Profile: AI/ML Engineer with 1+ years of experience"));
        assert!(text.contains("Experience: None"));
    }

    #[test]
    fn test_search_with_arguments() {
        let text = render(
            "search-jobs",
            &[("technologies", "lever, greenhouse"), ("countries", "US"), ("max_age_days", "14")],
        );
        assert!(text.contains("- Technologies: lever, greenhouse"));
        assert!(text.contains("- Countries: US"));
        assert!(text.contains("- Max Age: 14 days"));
    }

    #[test]
    fn test_application_requires_job_id() {
        let err = job_prompts(&UserProfile::default())
            .get("job-application", None)
            .unwrap_err();
        assert!(matches!(err, McpError::InvalidArguments { .. }));

        let text = render("job-application", &[("job_id", "42")]);
        assert!(text.starts_with("Create application for job ID: 42"));
        assert!(text.contains("Custom message: None"));
    }

    #[test]
    fn test_profile_skills_rendered() {
        let profile = UserProfile {
            name: "Data Engineer".to_string(),
            skills: vec!["Spark".to_string(), "SQL".to_string()],
            years_of_experience: None,
            ..Default::default()
        };
        let result = job_prompts(&profile)
            .get("search-jobs", None)
            .unwrap();
        match &result.messages[0].content {
            ToolResultContent::Text { text } => {
                assert!(text.contains("Profile: Data Engineer\n"));
                assert!(text.contains("Skills: Spark, SQL"));
            }
        }
    }
}

//! Skill-overlap scoring between the profile and a cached job

use crate::jobs::types::{FullJobListing, JobDetails, MatchAnalysis, UserProfile};

/// Descriptions longer than this are cut in get-job-details
pub const DETAIL_DESCRIPTION_CHARS: usize = 1000;

/// Score a job by how many profile skills appear in its title or description
///
/// Skills are compared lowercased as substrings. The score is the matched
/// share of distinct skills, as a percentage rounded to one decimal.
pub fn analyze(profile: &UserProfile, job: &FullJobListing) -> MatchAnalysis {
    let mut skills: Vec<String> = Vec::new();
    for skill in &profile.skills {
        let skill = skill.to_lowercase();
        if !skill.is_empty() && !skills.contains(&skill) {
            skills.push(skill);
        }
    }

    let haystack = format!("{} {}", job.job_title, job.description).to_lowercase();
    let matching_skills: Vec<String> = skills
        .iter()
        .filter(|skill| haystack.contains(skill.as_str()))
        .cloned()
        .collect();

    let match_score = if skills.is_empty() {
        0.0
    } else {
        let raw = matching_skills.len() as f64 / skills.len() as f64 * 100.0;
        (raw * 10.0).round() / 10.0
    };

    MatchAnalysis {
        job_id: job.id,
        title: job.job_title.clone(),
        company: job.company_name().to_string(),
        match_score,
        matching_skills,
        recommendation: recommendation(match_score).to_string(),
        salary: job.salary_string.clone(),
        location: job.location.clone(),
        remote: job.remote,
    }
}

fn recommendation(score: f64) -> &'static str {
    if score > 40.0 {
        "Strong Match"
    } else if score > 20.0 {
        "Good Match"
    } else {
        "Consider"
    }
}

/// Short view of a cached job
pub fn details(job: &FullJobListing) -> JobDetails {
    let description = if job.description.chars().count() > DETAIL_DESCRIPTION_CHARS {
        job.description
            .chars()
            .take(DETAIL_DESCRIPTION_CHARS)
            .collect::<String>()
            + "..."
    } else {
        job.description.clone()
    };

    JobDetails {
        id: job.id,
        title: job.job_title.clone(),
        company: job.company_name().to_string(),
        location: job.location.clone(),
        remote: job.remote,
        hybrid: job.hybrid,
        salary: job.salary_string.clone(),
        seniority: job.seniority.clone(),
        description,
        url: job.url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::types::RawJob;
    use serde_json::json;

    fn job(title: &str, description: &str) -> FullJobListing {
        let raw: RawJob = serde_json::from_value(json!({
            "id": 9,
            "job_title": title,
            "description": description,
            "salary_string": "20-30 LPA",
            "location": "Bengaluru",
            "remote": true,
            "company_object": {"name": "Acme"}
        }))
        .unwrap();
        raw.into_listings().unwrap().1
    }

    fn profile(skills: &[&str]) -> UserProfile {
        UserProfile {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_profile_match() {
        let analysis = analyze(
            &UserProfile::default(),
            &job("NLP Engineer", "Work with PyTorch and Python on LLM systems"),
        );
        // nlp, llm, pytorch, python out of 8
        assert_eq!(analysis.matching_skills.len(), 4);
        assert_eq!(analysis.match_score, 50.0);
        assert_eq!(analysis.recommendation, "Strong Match");
        assert_eq!(analysis.company, "Acme");
        assert!(analysis.remote);
    }

    #[test]
    fn test_score_rounding_and_thresholds() {
        let analysis = analyze(&profile(&["rust", "go", "zig"]), &job("Rust dev", ""));
        assert_eq!(analysis.match_score, 33.3);
        assert_eq!(analysis.recommendation, "Good Match");

        let analysis = analyze(&profile(&["rust", "go", "zig", "c", "d"]), &job("Rust dev", ""));
        assert_eq!(analysis.match_score, 40.0);
        assert_eq!(analysis.recommendation, "Good Match");

        let analysis = analyze(&profile(&["haskell"]), &job("Rust dev", ""));
        assert_eq!(analysis.match_score, 0.0);
        assert_eq!(analysis.recommendation, "Consider");
    }

    #[test]
    fn test_duplicate_skills_count_once() {
        let analysis = analyze(&profile(&["Rust", "rust", "go"]), &job("Rust dev", ""));
        assert_eq!(analysis.matching_skills, vec!["rust".to_string()]);
        assert_eq!(analysis.match_score, 50.0);
    }

    #[test]
    fn test_empty_profile_scores_zero() {
        let analysis = analyze(&profile(&[]), &job("Rust dev", ""));
        assert_eq!(analysis.match_score, 0.0);
    }

    #[test]
    fn test_details_truncates_description() {
        let view = details(&job("ML", &"a".repeat(1200)));
        assert_eq!(view.description.chars().count(), DETAIL_DESCRIPTION_CHARS + 3);
        assert_eq!(view.salary, "20-30 LPA");

        let view = details(&job("ML", "short"));
        assert_eq!(view.description, "short");
    }
}

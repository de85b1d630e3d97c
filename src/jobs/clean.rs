//! Job description cleanup
//!
//! Strips company boilerplate ("About Acme: ...", "Our mission ...") that
//! precedes the first job-related heading, then caps the length.

use std::sync::LazyLock;

use regex::Regex;

/// Longest cleaned description kept, in characters
pub const MAX_CLEAN_CHARS: usize = 800;

/// Each pattern captures the heading that ends the boilerplate so it can be
/// written back; the heading itself is never removed.
static BOILERPLATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    const HEADING: &str = r"(?P<heading>Job|Role|Position|Requirements|Responsibilities|What|We're|You'll)";
    [
        r"About\s+[A-Za-z\s]+:.*?",
        r"Our\s+(?:company|mission|vision|values).*?",
        r"We\s+are\s+a.*?",
        r"Company\s+Overview.*?",
    ]
    .iter()
    .map(|intro| {
        Regex::new(&format!("(?is){}{}", intro, HEADING)).expect("Failed to compile boilerplate regex")
    })
    .collect()
});

/// Remove boilerplate and truncate to [`MAX_CLEAN_CHARS`] plus "..."
pub fn clean_description(description: &str) -> String {
    let mut cleaned = description.to_string();
    for pattern in BOILERPLATE.iter() {
        cleaned = pattern.replace_all(&cleaned, "$heading").into_owned();
    }

    if cleaned.chars().count() > MAX_CLEAN_CHARS {
        cleaned = cleaned.chars().take(MAX_CLEAN_CHARS).collect::<String>() + "...";
    }

    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_about_section() {
        let text = "About Acme Corp: we build rockets and love it. Responsibilities: train models";
        assert_eq!(clean_description(text), "Responsibilities: train models");
    }

    #[test]
    fn test_strips_mission_case_insensitive() {
        let text = "OUR MISSION is to help.\nROLE: ML engineer";
        assert_eq!(clean_description(text), "ROLE: ML engineer");
    }

    #[test]
    fn test_keeps_text_without_heading() {
        let text = "We are a small team building tools.";
        assert_eq!(clean_description(text), text);
    }

    #[test]
    fn test_truncates_long_text() {
        let text = "x".repeat(1000);
        let cleaned = clean_description(&text);
        assert_eq!(cleaned.chars().count(), MAX_CLEAN_CHARS + 3);
        assert!(cleaned.ends_with("..."));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "é".repeat(900);
        let cleaned = clean_description(&text);
        assert!(cleaned.starts_with("éé"));
        assert_eq!(cleaned.chars().count(), MAX_CLEAN_CHARS + 3);
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(clean_description("  Role: build  \n"), "Role: build");
    }
}

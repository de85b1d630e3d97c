//! Outgoing message composition

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use mail_builder::MessageBuilder;

use crate::error::{Result, ValidationError};

/// Subject and body after applying a leading `Subject:` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    pub subject: String,
    pub body: String,
}

/// Let the body's first line override the subject.
///
/// A body starting with `Subject: ...` loses that line; its remainder becomes
/// the subject. Either way the body is trimmed.
pub fn apply_subject_override(subject: &str, body: &str) -> Composed {
    let mut lines = body.split('\n');

    if let Some(first) = lines.next() {
        if let Some(rest) = first.strip_prefix("Subject:") {
            let remaining: Vec<&str> = lines.collect();
            return Composed {
                subject: rest.trim().to_string(),
                body: remaining.join("\n").trim().to_string(),
            };
        }
    }

    Composed {
        subject: subject.to_string(),
        body: body.trim().to_string(),
    }
}

/// Build an RFC 822 message and encode it for the `raw` field
pub fn build_raw_message(from: Option<&str>, to: &str, subject: &str, body: &str) -> Result<String> {
    let mut builder = MessageBuilder::new()
        .to(to)
        .subject(subject)
        .text_body(body);

    if let Some(from) = from {
        builder = builder.from(from);
    }

    let bytes = builder.write_to_vec().map_err(|e| ValidationError::MessageBuild {
        message: e.to_string(),
    })?;

    Ok(URL_SAFE.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_line_overrides_subject() {
        let composed = apply_subject_override("Ignored", "Subject: Hello\nBody text");
        assert_eq!(composed.subject, "Hello");
        assert_eq!(composed.body, "Body text");
    }

    #[test]
    fn test_subject_override_trims_and_keeps_inner_lines() {
        let composed = apply_subject_override("x", "Subject:   Quarterly plan  \n\n  Line one\nLine two\n\n");
        assert_eq!(composed.subject, "Quarterly plan");
        assert_eq!(composed.body, "Line one\nLine two");
    }

    #[test]
    fn test_plain_body_keeps_given_subject() {
        let composed = apply_subject_override("Given", "  Hi there\n");
        assert_eq!(composed.subject, "Given");
        assert_eq!(composed.body, "Hi there");
    }

    #[test]
    fn test_indented_subject_line_is_body_text() {
        let composed = apply_subject_override("Given", "  Subject: Not a header\nBody");
        assert_eq!(composed.subject, "Given");
        assert_eq!(composed.body, "Subject: Not a header\nBody");
    }

    #[test]
    fn test_subject_only_body() {
        let composed = apply_subject_override("x", "Subject: Only");
        assert_eq!(composed.subject, "Only");
        assert_eq!(composed.body, "");
    }

    #[test]
    fn test_raw_message_round_trips_headers() {
        let raw = build_raw_message(Some("me@example.com"), "you@example.com", "Hello", "Body").unwrap();
        let decoded = String::from_utf8(URL_SAFE.decode(raw).unwrap()).unwrap();
        assert!(decoded.contains("Subject: Hello"));
        assert!(decoded.contains("you@example.com"));
        assert!(decoded.contains("me@example.com"));
        assert!(decoded.contains("Body"));
    }
}

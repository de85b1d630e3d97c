//! Parsing of raw RFC 822 messages
//!
//! Only what read-email needs: header unfolding, content-type parameters,
//! multipart splitting, transfer decoding and RFC 2047 encoded words.

use std::collections::HashMap;
use std::sync::LazyLock;

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD},
    Engine as _,
};
use regex::{Captures, Regex};

use crate::error::{Result, ValidationError};
use crate::gmail::types::EmailContent;

/// One RFC 2047 encoded word: charset, encoding, text
static ENCODED_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"=\?([^?]+)\?([bBqQ])\?([^?]*)\?=").expect("Failed to compile encoded-word regex")
});

/// Whitespace separating two adjacent encoded words
static ENCODED_WORD_GAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\?=\s+=\?").expect("Failed to compile encoded-word gap regex")
});

/// Nesting limit for multipart bodies
const MAX_DEPTH: usize = 16;

/// Decode base64url data from the Gmail API, padded or not
pub fn decode_base64url(data: &str) -> Result<Vec<u8>> {
    let data = data.trim();
    URL_SAFE_NO_PAD
        .decode(data)
        .or_else(|_| URL_SAFE.decode(data))
        .or_else(|_| STANDARD.decode(data))
        .map_err(|e| {
            ValidationError::InvalidParameter {
                name: "raw".to_string(),
                message: e.to_string(),
            }
            .into()
        })
}

/// A MIME entity: unfolded headers plus the undecoded body bytes
#[derive(Debug, Clone)]
pub struct MailPart<'a> {
    headers: Vec<(String, String)>,
    body: &'a [u8],
}

impl<'a> MailPart<'a> {
    /// Split an entity at the first blank line
    pub fn parse(raw: &'a [u8]) -> Self {
        let (head, body) = split_head(raw);
        Self {
            headers: parse_headers(head),
            body,
        }
    }

    /// First header with this name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Lower-cased media type and its parameters; defaults to text/plain
    pub fn content_type(&self) -> (String, HashMap<String, String>) {
        match self.header("Content-Type") {
            Some(value) => parse_content_type(value),
            None => ("text/plain".to_string(), HashMap::new()),
        }
    }

    /// Body with its transfer encoding undone and charset applied
    pub fn decoded_text(&self) -> String {
        let encoding = self
            .header("Content-Transfer-Encoding")
            .unwrap_or("7bit")
            .trim()
            .to_ascii_lowercase();

        let bytes = match encoding.as_str() {
            "base64" => decode_base64_body(self.body),
            "quoted-printable" => decode_quoted_printable(self.body),
            _ => self.body.to_vec(),
        };

        let (_, params) = self.content_type();
        decode_charset(&bytes, params.get("charset").map(String::as_str))
    }

    /// First text/plain part, depth first; a non-multipart entity is its own body
    pub fn plain_text(&self) -> Option<String> {
        self.plain_text_at(0)
    }

    fn plain_text_at(&self, depth: usize) -> Option<String> {
        let (mime_type, params) = self.content_type();

        if !mime_type.starts_with("multipart/") {
            return (depth == 0 || mime_type == "text/plain").then(|| self.decoded_text());
        }

        if depth >= MAX_DEPTH {
            return None;
        }

        let boundary = params.get("boundary")?;
        split_multipart(self.body, boundary)
            .into_iter()
            .map(MailPart::parse)
            .find_map(|part| part.plain_text_at(depth + 1))
    }
}

/// Parse a raw message into the fields read-email reports
pub fn extract_email(raw: &[u8]) -> EmailContent {
    let message = MailPart::parse(raw);
    let header = |name: &str| message.header(name).unwrap_or("").to_string();

    EmailContent {
        subject: decode_encoded_words(message.header("Subject").unwrap_or("")),
        from: header("From"),
        to: header("To"),
        date: header("Date"),
        content: message.plain_text().unwrap_or_default(),
    }
}

/// Decode RFC 2047 encoded words inside a header value
pub fn decode_encoded_words(value: &str) -> String {
    let joined = ENCODED_WORD_GAP.replace_all(value, "?==?");

    ENCODED_WORD
        .replace_all(&joined, |caps: &Captures| {
            let charset = &caps[1];
            let text = &caps[3];
            let bytes = match &caps[2] {
                "B" | "b" => STANDARD
                    .decode(text)
                    .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(text))
                    .ok(),
                _ => Some(decode_q_word(text)),
            };

            match bytes {
                Some(bytes) => decode_charset(&bytes, Some(charset)),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn split_head(raw: &[u8]) -> (&[u8], &[u8]) {
    let mut offset = 0;
    for line in raw.split(|b| *b == b'\n') {
        let next = offset + line.len() + 1;
        if line == b"" || line == b"\r" {
            return (&raw[..offset], raw.get(next..).unwrap_or(&[]));
        }
        offset = next;
    }
    (raw, &[])
}

fn parse_headers(head: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(head);
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }

        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    headers
}

fn parse_content_type(value: &str) -> (String, HashMap<String, String>) {
    let mut pieces = value.split(';');
    let mime_type = pieces.next().unwrap_or("").trim().to_ascii_lowercase();

    let params = pieces
        .filter_map(|piece| piece.split_once('='))
        .map(|(k, v)| {
            (
                k.trim().to_ascii_lowercase(),
                v.trim().trim_matches('"').to_string(),
            )
        })
        .collect();

    (mime_type, params)
}

fn split_multipart<'a>(body: &'a [u8], boundary: &str) -> Vec<&'a [u8]> {
    let delimiter = format!("--{}", boundary);
    let delimiter = delimiter.as_bytes();

    let mut parts = Vec::new();
    let mut part_start: Option<usize> = None;
    let mut offset = 0;

    for line in body.split(|b| *b == b'\n') {
        let line_start = offset;
        offset += line.len() + 1;

        let trimmed = line.strip_suffix(b"\r").unwrap_or(line);
        let Some(rest) = trimmed.strip_prefix(delimiter) else {
            continue;
        };
        let closing = rest.starts_with(b"--");
        let tail = if closing { &rest[2..] } else { rest };
        // only transport padding may follow the boundary
        if !tail.iter().all(|b| *b == b' ' || *b == b'\t') {
            continue;
        }

        if let Some(start) = part_start.take() {
            let end = line_start.saturating_sub(1).max(start);
            let part = &body[start..end];
            parts.push(part.strip_suffix(b"\r").unwrap_or(part));
        }

        if closing {
            break;
        }
        part_start = Some(offset.min(body.len()));
    }

    parts
}

fn decode_base64_body(body: &[u8]) -> Vec<u8> {
    let compact: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    STANDARD
        .decode(&compact)
        .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(&compact))
        .unwrap_or_else(|_| body.to_vec())
}

fn decode_quoted_printable(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut i = 0;

    while i < body.len() {
        if body[i] != b'=' {
            out.push(body[i]);
            i += 1;
            continue;
        }

        match (body.get(i + 1), body.get(i + 2)) {
            (Some(b'\r'), Some(b'\n')) => i += 3,
            (Some(b'\n'), _) => i += 2,
            (Some(&hi), Some(&lo)) => match (hex_value(hi), hex_value(lo)) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    i += 3;
                }
                _ => {
                    out.push(b'=');
                    i += 1;
                }
            },
            _ => {
                out.push(b'=');
                i += 1;
            }
        }
    }

    out
}

fn decode_q_word(text: &str) -> Vec<u8> {
    let spaced: Vec<u8> = text
        .bytes()
        .map(|b| if b == b'_' { b' ' } else { b })
        .collect();
    decode_quoted_printable(&spaced)
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

/// Windows-1252 characters for 0x80..=0x9F; unassigned slots keep the C1 code point
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

fn decode_charset(bytes: &[u8], charset: Option<&str>) -> String {
    match charset.map(|c| c.trim().to_ascii_lowercase()).as_deref() {
        Some("iso-8859-1" | "latin1" | "latin-1") => bytes.iter().map(|&b| b as char).collect(),
        Some("windows-1252" | "cp1252") => bytes
            .iter()
            .map(|&b| match b {
                0x80..=0x9F => CP1252_HIGH[usize::from(b - 0x80)],
                _ => b as char,
            })
            .collect(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

//! Log sanitization for survey answers and contact details.
//!
//! Formatted log lines pass through `SanitizingMakeWriter`, which rewrites:
//! - health metric key/value pairs (`glucose=140`, `weight: 82.5`)
//! - raw feature vectors (`[0.0, 1.0, 63.0, ...]`)
//! - email addresses, phone numbers and UUIDs
//!
//! Structured fields are printed by `tracing_subscriber::fmt` as `key=value`,
//! so a `tracing::debug!(glucose = x)` call is caught by the same rule.
//!
//! # Performance
//!
//! `sanitize()` caps the number of bytes scanned per call (see
//! `VITALCHECK_SANITIZE_MAX_BYTES`).

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

/// Maximum number of bytes to sanitize per call. Defaults to 16 KiB.
const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

/// Metric names whose values never reach the log.
const HEALTH_KEYS: &str = "age|height|weight|bmi|sex|cholesterol|glucose|blood_glucose_level|\
systolic|diastolic|systolic_blood_pressure|diastolic_blood_pressure|resting_blood_pressure|\
heart_rate|resting_heart_rate|maximum_heart_rate|body_temperature|temperature|\
general_health_evaluation|mental_health_month_decline|physical_health_month_decline";

struct Pattern {
    regex: Regex,
    replacement: &'static str,
}

struct Patterns {
    set: RegexSet,
    rules: Vec<Pattern>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes.min(input.len());
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var("VITALCHECK_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn get_patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let health = format!(
            r#"(?i)\b({HEALTH_KEYS})\b("?\s*[:=]\s*"?)-?\d+(?:\.\d+)?"#
        );
        let rules: Vec<(String, &'static str)> = vec![
            (health, "${1}${2}[REDACTED]"),
            // Four or more comma-separated numbers in brackets
            (
                r"\[\s*-?\d+(?:\.\d+)?(?:\s*,\s*-?\d+(?:\.\d+)?){3,}\s*\]".to_string(),
                "[REDACTED-FEATURES]",
            ),
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}"
                    .to_string(),
                "[REDACTED-UUID]",
            ),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b"
                    .to_string(),
                "[REDACTED-EMAIL]",
            ),
            (
                r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b".to_string(),
                "[REDACTED-PHONE]",
            ),
        ];

        let set = RegexSet::new(rules.iter().map(|(p, _)| p.as_str())).expect("Valid regex set");
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Pattern {
                regex: Regex::new(&pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        Patterns { set, rules }
    })
}

/// Sanitize a string by replacing health metrics and contact details.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = get_patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let rule = &patterns.rules[idx];
        result = rule.regex.replace_all(&result, rule.replacement).to_string();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// Check if a string contains anything `sanitize` would redact.
#[must_use]
pub fn contains_sensitive(input: &str) -> bool {
    let (prefix, _truncated) = truncate_to_char_boundary(input, max_sanitize_bytes());
    get_patterns().set.is_match(prefix)
}

/// A `tracing_subscriber` writer wrapper that sanitizes formatted log output
/// before it is written to the underlying sink.
#[derive(Debug)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<M> Clone for SanitizingMakeWriter<M>
where
    M: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Line-buffered writer produced by `SanitizingMakeWriter`.
pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }
}

impl<W> SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = self.buffer.drain(..=pos).collect::<Vec<u8>>();
            let sanitized = sanitize(&String::from_utf8_lossy(&line));
            self.inner.write_all(sanitized.as_bytes())?;
        }
        Ok(())
    }
}

impl<W> std::io::Write for SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A single line with no newline must not buffer forever.
        let hard_cap = max_sanitize_bytes().saturating_mul(2);
        if hard_cap > 0 && self.buffer.len() > hard_cap {
            let sanitized = sanitize(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(sanitized.as_bytes())?;
            self.inner.write_all(b"\n[TRUNCATED]\n")?;
            self.buffer.clear();
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;

        if !self.buffer.is_empty() {
            let sanitized = sanitize(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(sanitized.as_bytes())?;
            self.buffer.clear();
        }

        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_sanitize_structured_metric() {
        let sanitized = sanitize("DEBUG run: glucose=140 cholesterol=230.5 task=heart-disease");
        assert!(!sanitized.contains("140"));
        assert!(!sanitized.contains("230.5"));
        assert!(sanitized.contains("glucose=[REDACTED]"));
        assert!(sanitized.contains("task=heart-disease"));
    }

    #[test]
    fn test_sanitize_json_metric() {
        let sanitized = sanitize(r#"{"weight": 82.5, "height": 1.8}"#);
        assert!(!sanitized.contains("82.5"));
        assert!(!sanitized.contains("1.8"));
    }

    #[test]
    fn test_sanitize_feature_vector() {
        let sanitized = sanitize("input [63.0, 1.0, 0.0, 145.0, 233.0]");
        assert!(sanitized.contains("[REDACTED-FEATURES]"));
        assert!(!sanitized.contains("233.0"));
    }

    #[test]
    fn test_short_lists_are_kept() {
        let sanitized = sanitize("percentages [12.5, 87.5]");
        assert_eq!(sanitized, "percentages [12.5, 87.5]");
    }

    #[test]
    fn test_sanitize_email_and_phone() {
        let sanitized = sanitize("Contact: someone@example.com or 555-123-4567");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(sanitized.contains("[REDACTED-PHONE]"));
    }

    #[test]
    fn test_contains_sensitive() {
        assert!(contains_sensitive("age=42"));
        assert!(contains_sensitive("id 550e8400-e29b-41d4-a716-446655440000"));
        assert!(!contains_sensitive("Model session loaded"));
    }

    #[test]
    fn test_model_digest_is_not_redacted() {
        let digest = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        assert_eq!(sanitize(digest), digest);
    }

    #[test]
    fn test_sanitize_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("prefix age=42 and much more text", 10);
        assert!(sanitized.ends_with("[TRUNCATED]"));
    }

    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_sanitizes_complete_lines() {
        let sink = Sink::default();
        let mut writer = SanitizingWriter::new(sink.clone());
        writer.write_all(b"weight=9").unwrap();
        writer.write_all(b"0 kg\n").unwrap();
        writer.flush().unwrap();
        let out = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        assert_eq!(out, "weight=[REDACTED] kg\n");
    }
}

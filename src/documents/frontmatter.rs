//! Frontmatter parsing.
//!
//! Splits raw file content into an optional delimited header block and a
//! Markdown body, then recovers `published_at` and `title` through ordered
//! fallback strategies. The parser is total: it always produces a document,
//! falling back to the supplied clock when no date can be recovered.
//!
//! The header is not modeled as key-value pairs. Only the date and title are
//! pattern-searched; every other field is opaque and survives round-trips
//! via `raw_content`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::Document;

/// Leading header block: a dashes line, arbitrary content, a closing dashes
/// line, optionally followed by one blank line. The full match (delimiters
/// included) is what `save` preserves byte-for-byte.
static HEADER_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A---[ \t]*\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n)?(?:\r?\n)?").unwrap()
});

/// `publishDate: 2025-12-27 12:00`-style header field. The key name varies
/// across existing files, so several spellings are accepted.
static HEADER_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:publishDate|publishedAt|published_at|date)[ \t]*:[ \t]*(.+?)[ \t]*$")
        .unwrap()
});

static HEADER_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^[ \t]*title[ \t]*:[ \t]*(.+?)[ \t]*$").unwrap());

/// First top-level heading in the body.
static BODY_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*$").unwrap());

/// `YYYY-MM-DD` prefix of a file name.
static FILENAME_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A(\d{4})-(\d{2})-(\d{2})(.*)\z").unwrap());

/// Which extraction strategy produced a document's `published_at`.
///
/// Evaluated in declaration order; the first success wins. Kept as an
/// explicit tag so the fallback chain stays auditable: a `CurrentTime`
/// result means the document carries no recoverable date at all and its
/// timeline position is an artifact of when it was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    /// A date-like key inside the header block.
    HeaderField,
    /// A `YYYY-MM-DD` (plus optional `HHMMSS` segment) file name.
    FilenamePattern,
    /// Neither header nor file name yielded a date.
    CurrentTime,
}

/// Split raw content into its verbatim header block (delimiters and any
/// trailing blank line included) and the remainder.
pub fn split_header(raw: &str) -> (Option<&str>, &str) {
    match HEADER_BLOCK.find(raw) {
        Some(m) => (Some(m.as_str()), &raw[m.end()..]),
        None => (None, raw),
    }
}

/// Parse raw file content into a document, using the real clock for the
/// final date fallback.
pub fn parse(raw: &str, id: &str) -> Document {
    parse_with_now(raw, id, Utc::now().naive_utc())
}

/// Parse with an injected clock. Equivalent to [`parse`] but deterministic.
pub fn parse_with_now(raw: &str, id: &str, now: NaiveDateTime) -> Document {
    parse_dated(raw, id, now).0
}

/// Parse and report which strategy produced the publish date.
pub fn parse_dated(raw: &str, id: &str, now: NaiveDateTime) -> (Document, DateSource) {
    let (header, rest) = split_header(raw);
    let header_text = header.unwrap_or("");
    let body = rest.trim().to_string();

    let (published_at, source) = resolve_published_at(header_text, id, now);
    let title = resolve_title(header_text, &body);

    let document = Document {
        id: id.to_string(),
        sha: None,
        title,
        published_at,
        body,
        raw_content: raw.to_string(),
    };
    (document, source)
}

/// Ordered date strategies: header field, then file name, then the clock.
fn resolve_published_at(header: &str, id: &str, now: NaiveDateTime) -> (NaiveDateTime, DateSource) {
    if let Some(date) = date_from_header(header) {
        return (date, DateSource::HeaderField);
    }
    if let Some(date) = date_from_filename(id) {
        return (date, DateSource::FilenamePattern);
    }
    (now, DateSource::CurrentTime)
}

/// Try each accepted value format against a date-like header field, most
/// precise first.
fn date_from_header(header: &str) -> Option<NaiveDateTime> {
    let value = HEADER_DATE
        .captures(header)?
        .get(1)?
        .as_str()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();
    parse_date_value(value)
}

fn parse_date_value(value: &str) -> Option<NaiveDateTime> {
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap())
}

/// Recover a date from file names of the form `YYYY-MM-DD[-slug][-HHMMSS].md`.
///
/// Generated names put the `HHMMSS` segment last, but older hand-named files
/// put it right after the date, so any dash-separated 6-digit segment counts.
/// Missing time components default to midnight.
fn date_from_filename(id: &str) -> Option<NaiveDateTime> {
    let stem = id.strip_suffix(".md").unwrap_or(id);
    let caps = FILENAME_DATE.captures(stem)?;
    let date = NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )?;

    let time = caps[4]
        .split('-')
        .filter(|s| s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit()))
        .find_map(|s| {
            NaiveTime::from_hms_opt(
                s[0..2].parse().ok()?,
                s[2..4].parse().ok()?,
                s[4..6].parse().ok()?,
            )
        })
        .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).unwrap());

    Some(date.and_time(time))
}

/// Ordered title strategies: header field (quotes trimmed), then the first
/// top-level heading in the body.
fn resolve_title(header: &str, body: &str) -> Option<String> {
    if let Some(caps) = HEADER_TITLE.captures(header) {
        let value = caps[1]
            .trim_matches(|c| c == '"' || c == '\'')
            .trim()
            .to_string();
        if !value.is_empty() {
            return Some(value);
        }
    }
    BODY_HEADING
        .captures(body)
        .map(|caps| caps[1].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 23)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    const WITH_HEADER: &str = "---\ntitle: \"Hello\"\npublishDate: 2025-12-27 12:00\n---\n\nBody text here.\n";

    #[test]
    fn test_header_date_wins_over_filename() {
        let (doc, source) = parse_dated(WITH_HEADER, "2024-01-01-090000.md", fixed_now());
        assert_eq!(doc.published_at, at(2025, 12, 27, 12, 0, 0));
        assert_eq!(source, DateSource::HeaderField);
    }

    #[test]
    fn test_filename_date_with_time_segment() {
        let (doc, source) = parse_dated("just a body", "2025-12-27-143000-test.md", fixed_now());
        assert_eq!(doc.published_at, at(2025, 12, 27, 14, 30, 0));
        assert_eq!(source, DateSource::FilenamePattern);
    }

    #[test]
    fn test_filename_date_with_trailing_time_segment() {
        let doc = parse_with_now("body", "2025-12-27-小记-143059.md", fixed_now());
        assert_eq!(doc.published_at, at(2025, 12, 27, 14, 30, 59));
    }

    #[test]
    fn test_filename_date_without_time_defaults_to_midnight() {
        let doc = parse_with_now("body", "2025-12-27-notes.md", fixed_now());
        assert_eq!(doc.published_at, at(2025, 12, 27, 0, 0, 0));
    }

    #[test]
    fn test_current_time_fallback() {
        let (doc, source) = parse_dated("no dates anywhere", "untitled.md", fixed_now());
        assert_eq!(doc.published_at, fixed_now());
        assert_eq!(source, DateSource::CurrentTime);
    }

    #[test]
    fn test_invalid_filename_time_segment_ignored() {
        // 996100 is not a valid HHMMSS; date still parses, time defaults
        let doc = parse_with_now("body", "2025-12-27-996100.md", fixed_now());
        assert_eq!(doc.published_at, at(2025, 12, 27, 0, 0, 0));
    }

    #[test]
    fn test_header_date_formats() {
        for (value, expected) in [
            ("2025-12-27 12:30:45", at(2025, 12, 27, 12, 30, 45)),
            ("2025-12-27 12:30", at(2025, 12, 27, 12, 30, 0)),
            ("2025-12-27", at(2025, 12, 27, 0, 0, 0)),
            ("\"2025-12-27\"", at(2025, 12, 27, 0, 0, 0)),
            ("'2025-12-27 12:30'", at(2025, 12, 27, 12, 30, 0)),
        ] {
            let raw = format!("---\ndate: {}\n---\nbody", value);
            let doc = parse_with_now(&raw, "x.md", fixed_now());
            assert_eq!(doc.published_at, expected, "value: {}", value);
        }
    }

    #[test]
    fn test_title_from_header_trims_quotes() {
        let doc = parse_with_now(WITH_HEADER, "x.md", fixed_now());
        assert_eq!(doc.title.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_title_from_first_heading() {
        let doc = parse_with_now("# World\n\nmore text", "x.md", fixed_now());
        assert_eq!(doc.title.as_deref(), Some("World"));
    }

    #[test]
    fn test_title_absent() {
        let doc = parse_with_now("plain text, no heading", "x.md", fixed_now());
        assert_eq!(doc.title, None);
    }

    #[test]
    fn test_header_title_beats_body_heading() {
        let raw = "---\ntitle: From Header\n---\n\n# From Body\n";
        let doc = parse_with_now(raw, "x.md", fixed_now());
        assert_eq!(doc.title.as_deref(), Some("From Header"));
    }

    #[test]
    fn test_raw_content_round_trip() {
        let doc = parse_with_now(WITH_HEADER, "x.md", fixed_now());
        assert_eq!(doc.raw_content, WITH_HEADER);
        assert_eq!(doc.body, "Body text here.");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = parse_with_now(WITH_HEADER, "x.md", fixed_now());
        let second = parse_with_now(&first.raw_content, "x.md", fixed_now());
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_header_body_is_trimmed() {
        let doc = parse_with_now("\n\n  plain body  \n", "x.md", fixed_now());
        assert_eq!(doc.body, "plain body");
        assert_eq!(doc.raw_content, "\n\n  plain body  \n");
    }

    #[test]
    fn test_split_header_preserves_delimiters() {
        let (header, rest) = split_header(WITH_HEADER);
        let header = header.unwrap();
        assert!(header.starts_with("---\n"));
        assert!(header.ends_with("---\n\n"));
        assert_eq!(rest, "Body text here.\n");
        assert_eq!(format!("{}{}", header, rest), WITH_HEADER);
    }

    #[test]
    fn test_unclosed_header_treated_as_body() {
        let raw = "---\ntitle: broken\nno closing line";
        let (header, _) = split_header(raw);
        assert!(header.is_none());
        let doc = parse_with_now(raw, "x.md", fixed_now());
        assert_eq!(doc.body, raw.trim());
    }

    #[test]
    fn test_unknown_header_fields_survive_via_raw_content() {
        let raw = "---\ntitle: T\ncustomField: kept\n---\nbody";
        let doc = parse_with_now(raw, "x.md", fixed_now());
        assert!(doc.raw_content.contains("customField: kept"));
    }
}

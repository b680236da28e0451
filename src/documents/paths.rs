//! Storage path generation.
//!
//! Paths are derived deterministically from content and a timestamp. Two
//! calls a second apart (or with different content) are extremely unlikely
//! to collide, but uniqueness is not guaranteed here: a real collision is
//! caught by the optimistic-concurrency check on write.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use super::frontmatter::split_header;
use super::DocumentKind;

/// Markdown image syntax, removed entirely (alt text is not prose).
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());

/// Markdown link syntax, replaced by its text so URLs never leak into slugs.
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());

/// Characters that survive in a post slug: word characters (which cover CJK
/// under Unicode `\w`), whitespace, and hyphens.
static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Derive the storage path for a new document of the given kind.
pub fn generate_path(kind: DocumentKind, title: &str, body: &str, now: NaiveDateTime) -> String {
    let dir = kind.directory();
    let date = now.format("%Y-%m-%d");
    let time = now.format("%H%M%S");

    match kind {
        DocumentKind::Essay => match essay_slug(body) {
            Some(slug) => format!("{}/{}-{}-{}.md", dir, date, slug, time),
            None => format!("{}/{}-{}.md", dir, date, time),
        },
        DocumentKind::Post => format!("{}/{}-{}.md", dir, post_slug(title), time),
        // Gallery manifests carry no usable title or prose; a
        // fractional-seconds timestamp alone avoids collision.
        DocumentKind::Gallery => {
            format!("{}/{}-{}.md", dir, date, high_res_stamp(now))
        }
    }
}

/// Destination for an uploaded binary asset, bucketed by year/month.
pub fn generate_asset_path(extension: &str, now: NaiveDateTime) -> String {
    format!(
        "assets/{}/{}.{}",
        now.format("%Y/%m"),
        high_res_stamp(now),
        extension.trim_start_matches('.')
    )
}

/// Seconds since epoch with microsecond resolution, e.g. `1766843400.123456`.
fn high_res_stamp(now: NaiveDateTime) -> String {
    format!(
        "{}.{:06}",
        now.and_utc().timestamp(),
        now.and_utc().timestamp_subsec_micros()
    )
}

/// First four CJK or Latin letters of the body once the header block, image
/// and link syntax, and Markdown punctuation are stripped. `None` when no
/// such characters exist.
fn essay_slug(body: &str) -> Option<String> {
    let (_, text) = split_header(body);
    let text = IMAGE.replace_all(text, "");
    let text = LINK.replace_all(&text, "$1");

    let slug: String = text
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || is_cjk(*c))
        .take(4)
        .collect();
    if slug.is_empty() { None } else { Some(slug) }
}

/// Slug for a long-form post: drop everything that is not a word character,
/// whitespace, or hyphen, then collapse whitespace runs to single hyphens
/// and lowercase.
fn post_slug(title: &str) -> String {
    let cleaned = NON_SLUG.replace_all(title, "");
    WHITESPACE_RUN
        .replace_all(cleaned.trim(), "-")
        .to_lowercase()
}

/// CJK unified ideographs, including extension A.
fn is_cjk(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}')
}

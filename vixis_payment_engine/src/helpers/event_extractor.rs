//! Best-effort extraction of event metadata from third-party ticketing pages.
//!
//! These pages have no stable markup contract, so everything here is opportunistic pattern
//! matching with an explicit "not found" result. The functions are pure (they operate on the
//! fetched HTML text) so they can be tested without network access.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventPlatform {
    Passline,
    StartGg,
    DuelPlus,
    Unknown,
}

impl EventPlatform {
    pub fn as_str(&self) -> &str {
        match self {
            EventPlatform::Passline => "passline",
            EventPlatform::StartGg => "startgg",
            EventPlatform::DuelPlus => "duelplus",
            EventPlatform::Unknown => "unknown",
        }
    }
}

/// Identify the ticketing platform from the event URL.
pub fn detect_platform(url: &str) -> EventPlatform {
    if url.contains("passline.com") {
        EventPlatform::Passline
    } else if url.contains("start.gg") || url.contains("smash.gg") {
        EventPlatform::StartGg
    } else if url.contains("duel.plus") {
        EventPlatform::DuelPlus
    } else {
        EventPlatform::Unknown
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedEventData {
    pub title: String,
    pub date: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub location: Option<String>,
    pub platform: EventPlatform,
}

/// Extract event metadata from an HTML document.
///
/// Returns `None` when not even a title can be found; all other fields are individually optional.
pub fn extract_event_data(html: &str, url: &str) -> Option<ExtractedEventData> {
    let title = extract_title(html)?;
    let thumbnail_url = extract_thumbnail(html).map(|t| absolutize(&t, url));
    Some(ExtractedEventData {
        title,
        date: extract_date(html),
        description: extract_description(html),
        thumbnail_url,
        location: extract_location(html),
        platform: detect_platform(url),
    })
}

fn case_insensitive(pattern: &str) -> Regex {
    RegexBuilder::new(pattern).case_insensitive(true).dot_matches_new_line(true).build().unwrap()
}

fn first_capture(html: &str, pattern: &str) -> Option<String> {
    let text = case_insensitive(pattern).captures(html)?.get(1)?.as_str();
    let text = strip_tags(text);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn extract_title(html: &str) -> Option<String> {
    first_capture(html, r#"<meta[^>]+property=["']og:title["'][^>]+content=["']([^"']+)["']"#)
        .or_else(|| first_capture(html, r"<h1[^>]*>(.*?)</h1>"))
        .or_else(|| first_capture(html, r"<title[^>]*>(.*?)</title>"))
}

fn extract_date(html: &str) -> Option<String> {
    // `<time datetime="...">` is the only marker we trust; keep the date part only.
    let datetime = first_capture(html, r#"<time[^>]+datetime=["']([^"']+)["']"#)?;
    Some(datetime.split('T').next().unwrap_or(&datetime).to_string())
}

fn extract_description(html: &str) -> Option<String> {
    let description = first_capture(html, r#"<meta[^>]+name=["']description["'][^>]+content=["']([^"']+)["']"#)
        .or_else(|| first_capture(html, r#"<meta[^>]+property=["']og:description["'][^>]+content=["']([^"']+)["']"#))?;
    if description.chars().count() > 500 {
        let truncated: String = description.chars().take(500).collect();
        Some(format!("{truncated}..."))
    } else {
        Some(description)
    }
}

fn extract_thumbnail(html: &str) -> Option<String> {
    first_capture(html, r#"<meta[^>]+property=["']og:image["'][^>]+content=["']([^"']+)["']"#)
        .or_else(|| first_capture(html, r#"<img[^>]+src=["']([^"']+)["']"#))
}

fn extract_location(html: &str) -> Option<String> {
    first_capture(html, r#"<[^>]+class=["'][^"']*(?:location|venue|ubicacion)[^"']*["'][^>]*>(.*?)</"#)
}

/// Resolve a relative thumbnail path against the origin of the event page URL.
fn absolutize(thumbnail: &str, page_url: &str) -> String {
    if thumbnail.starts_with("http") {
        return thumbnail.to_string();
    }
    let origin = match page_url.find("://").map(|i| i + 3) {
        Some(start) => match page_url[start..].find('/') {
            Some(end) => &page_url[..start + end],
            None => page_url,
        },
        None => page_url,
    };
    format!("{origin}{thumbnail}")
}

fn strip_tags(text: &str) -> String {
    let stripped = Regex::new(r"<[^>]*>").unwrap().replace_all(text, "");
    stripped.trim().to_string()
}

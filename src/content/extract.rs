use regex::Regex;
use std::sync::LazyLock;

use super::sections::{SectionKind, section_body};

pub const BULLET: char = '•';

const BULLET_MOJIBAKE: [&str; 2] = ["â€¢", "â\u{80}¢"];

static HEADER_BOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*([^*]+)\*\*\s*-\s*For\s*Sale").expect("header pattern is valid")
});
static HEADER_LOOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^-\n]+)\s*-\s*For\s*Sale").expect("header pattern is valid"));
static INLINE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"•[ \t]*([^•\n]+)").expect("bullet pattern is valid"));
static CTA_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Call[^*]*\*\*").expect("cta pattern is valid"));
static CTA_LOOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Call[^!]*!").expect("cta pattern is valid"));

/// `**Title** - For Sale`, else `Title - For Sale` on a single line.
pub fn extract_header(raw: &str) -> Option<String> {
    let bold = HEADER_BOLD
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|text| !text.is_empty());
    if let Some(text) = bold {
        return Some(text.to_string());
    }
    HEADER_LOOSE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches(|ch: char| ch == '*' || ch.is_whitespace()))
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

pub fn extract_highlights(raw: &str) -> Option<Vec<String>> {
    let lines = raw
        .lines()
        .filter_map(|line| normalize_bullet_line(line.trim()))
        .collect::<Vec<_>>();
    if !lines.is_empty() {
        return Some(lines);
    }

    let repaired = repair_bullets(raw);
    let inline = INLINE_BULLET
        .captures_iter(&repaired)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("{} {}", BULLET, segment))
        .collect::<Vec<_>>();
    if inline.is_empty() {
        None
    } else {
        Some(inline)
    }
}

/// `**Call ...**` with the markers removed, else `Call ... !`.
pub fn extract_cta(raw: &str) -> Option<String> {
    if let Some(m) = CTA_BOLD.find(raw) {
        let text = m.as_str().replace("**", "");
        let text = text.trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }
    CTA_LOOSE.find(raw).map(|m| m.as_str().to_string())
}

pub fn extract_location(raw: &str) -> Option<String> {
    section_body(raw, "location", SectionKind::Prose)
}

pub fn extract_about_us(raw: &str) -> Option<String> {
    section_body(raw, "about us", SectionKind::Prose)
}

pub fn extract_services(raw: &str) -> Option<String> {
    section_body(raw, "services", SectionKind::List)
}

pub(crate) fn is_bullet_line(trimmed: &str) -> bool {
    normalize_bullet_line(trimmed).is_some()
}

fn normalize_bullet_line(trimmed: &str) -> Option<String> {
    if trimmed.starts_with(BULLET) {
        return Some(trimmed.to_string());
    }
    BULLET_MOJIBAKE.iter().find_map(|variant| {
        trimmed
            .strip_prefix(variant)
            .map(|rest| format!("{}{}", BULLET, rest))
    })
}

fn repair_bullets(raw: &str) -> String {
    BULLET_MOJIBAKE
        .iter()
        .fold(raw.to_string(), |text, variant| text.replace(variant, "•"))
}

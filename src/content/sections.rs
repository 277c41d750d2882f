use super::extract::is_bullet_line;

const MAX_HEADING_WORDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionKind {
    Prose,
    List,
}

/// Body under the first short heading whose label contains `keyword`.
pub(crate) fn section_body(raw: &str, keyword: &str, kind: SectionKind) -> Option<String> {
    let lines = raw.lines().collect::<Vec<_>>();
    let start = lines
        .iter()
        .position(|line| heading_matches(line, keyword))?;

    if let Some(inline) = inline_body(lines[start]) {
        return Some(inline);
    }

    let body = lines[start + 1..]
        .iter()
        .map(|line| line.trim())
        .skip_while(|line| line.is_empty())
        .take_while(|line| !line.is_empty() && !is_heading_like(line))
        .take_while(|line| kind == SectionKind::List || !is_bullet_line(line))
        .map(strip_emphasis)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();
    if body.is_empty() {
        None
    } else {
        Some(body.join("\n"))
    }
}

fn heading_matches(line: &str, keyword: &str) -> bool {
    let trimmed = line.trim_start();
    if is_bullet_line(trimmed) || trimmed.starts_with('-') {
        return false;
    }
    let label = heading_label(line);
    if label.is_empty() || label.split_whitespace().count() > MAX_HEADING_WORDS {
        return false;
    }
    label.to_lowercase().contains(keyword)
}

fn heading_label(line: &str) -> &str {
    let trimmed = line.trim().trim_start_matches('#');
    let label = trimmed.split(':').next().unwrap_or_default();
    label.trim_matches(|ch: char| ch == '*' || ch.is_whitespace())
}

fn inline_body(line: &str) -> Option<String> {
    let (_, rest) = line.split_once(':')?;
    let rest = strip_emphasis(rest.trim());
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

fn is_heading_like(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("**")
}

fn strip_emphasis(line: &str) -> &str {
    line.trim_matches(|ch: char| ch == '*' || ch.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_paragraph_under_bold_heading() {
        let raw = "**Location Benefits:**\nWalk to the lake and downtown.\nQuiet street.\n\n**Call now!**";
        assert_eq!(
            section_body(raw, "location", SectionKind::Prose).as_deref(),
            Some("Walk to the lake and downtown.\nQuiet street.")
        );
    }

    #[test]
    fn reads_inline_heading_text() {
        let raw = "Location: **Maple Ridge, near schools**";
        assert_eq!(
            section_body(raw, "location", SectionKind::Prose).as_deref(),
            Some("Maple Ridge, near schools")
        );
    }

    #[test]
    fn stops_at_next_heading() {
        let raw = "## Our Services\n• Kitchens\n• Bathrooms\n**Call us today!**";
        assert_eq!(
            section_body(raw, "services", SectionKind::List).as_deref(),
            Some("• Kitchens\n• Bathrooms")
        );
    }

    #[test]
    fn ignores_long_sentences_mentioning_keyword() {
        let raw = "The location of this home is simply wonderful for everyone\nNext line";
        assert_eq!(section_body(raw, "location", SectionKind::Prose), None);
    }

    #[test]
    fn bullet_lines_are_never_headings() {
        let raw = "• Great location\nNear the park";
        assert_eq!(section_body(raw, "location", SectionKind::Prose), None);
    }

    #[test]
    fn prose_section_stops_at_bullets() {
        let raw = "**Location:**\nNear the river.\n• Pool\n• Garage";
        assert_eq!(
            section_body(raw, "location", SectionKind::Prose).as_deref(),
            Some("Near the river.")
        );
        let only_bullets = "**Location:**\nâ€¢ Pool\n• Garage";
        assert_eq!(section_body(only_bullets, "location", SectionKind::Prose), None);
    }

    #[test]
    fn empty_section_is_none() {
        assert_eq!(section_body("**About Us**\n\n", "about us", SectionKind::Prose), None);
    }
}

use serde::{Deserialize, Serialize};

use crate::templates::Role;

mod extract;
mod sections;

pub use extract::{
    BULLET, extract_about_us, extract_cta, extract_header, extract_highlights, extract_location,
    extract_services,
};

pub const DEFAULT_HEADER: &str = "Beautiful Property For Sale";
pub const DEFAULT_COMPANY_NAME: &str = "Professional Real Estate";
pub const DEFAULT_DESCRIPTION: &str = "Discover your dream home with this amazing property offering excellent features and prime location.";
pub const DEFAULT_LOCATION: &str = "Prime location with excellent amenities and easy access to shopping, schools, and transportation.";
pub const DEFAULT_CTA: &str = "Call today to schedule a private showing!";
pub const DEFAULT_HIGHLIGHTS: [&str; 4] = [
    "• Beautiful property with excellent features",
    "• Prime location with great amenities",
    "• Perfect for families and professionals",
    "• Don't miss this amazing opportunity!",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedContent {
    pub header: String,
    pub company_name: String,
    pub description: String,
    pub highlights: Vec<String>,
    pub location: String,
    pub cta: String,
    pub about_us: String,
    pub services: String,
}

impl Default for ParsedContent {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            highlights: default_highlights(),
            location: DEFAULT_LOCATION.to_string(),
            cta: DEFAULT_CTA.to_string(),
            about_us: String::new(),
            services: String::new(),
        }
    }
}

impl ParsedContent {
    pub fn text_for(&self, role: Role) -> Option<String> {
        let text = match role {
            Role::Header => self.header.clone(),
            Role::CompanyName => self.company_name.clone(),
            Role::Description => self.description.clone(),
            Role::Highlights => self.highlights.join("\n"),
            Role::Location => self.location.clone(),
            Role::Cta => self.cta.clone(),
            Role::AboutUs => self.about_us.clone(),
            Role::Services => self.services.clone(),
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

pub fn default_highlights() -> Vec<String> {
    DEFAULT_HIGHLIGHTS
        .iter()
        .map(|line| line.to_string())
        .collect()
}

/// Must be total: every input, including "", yields a full value.
pub trait ContentParser: Send + Sync {
    fn parse(&self, raw: &str) -> ParsedContent;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicParser;

impl ContentParser for HeuristicParser {
    fn parse(&self, raw: &str) -> ParsedContent {
        parse(raw)
    }
}

pub fn parse(raw: &str) -> ParsedContent {
    ParsedContent {
        header: extract_header(raw).unwrap_or_else(|| DEFAULT_HEADER.to_string()),
        company_name: DEFAULT_COMPANY_NAME.to_string(),
        description: DEFAULT_DESCRIPTION.to_string(),
        highlights: extract_highlights(raw).unwrap_or_else(default_highlights),
        location: extract_location(raw).unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        cta: extract_cta(raw).unwrap_or_else(|| DEFAULT_CTA.to_string()),
        about_us: extract_about_us(raw).unwrap_or_default(),
        services: extract_services(raw).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_yields_defaults() {
        assert_eq!(parse(""), ParsedContent::default());
    }

    #[test]
    fn parses_canonical_listing() {
        let content = parse("**Lakeside Villa** - For Sale!\n• Pool\n• Garage\n**Call now!**");
        assert_eq!(content.header, "Lakeside Villa");
        assert_eq!(content.highlights, vec!["• Pool", "• Garage"]);
        assert_eq!(content.cta, "Call now!");
        assert_eq!(content.company_name, DEFAULT_COMPANY_NAME);
        assert_eq!(content.location, DEFAULT_LOCATION);
        assert!(content.about_us.is_empty());
    }

    #[test]
    fn text_for_skips_empty_slots() {
        let content = ParsedContent::default();
        assert_eq!(content.text_for(Role::AboutUs), None);
        assert_eq!(
            content.text_for(Role::Highlights).unwrap(),
            DEFAULT_HIGHLIGHTS.join("\n")
        );
    }

    #[test]
    fn heuristic_parser_delegates_to_parse() {
        let raw = "Sunny loft - For Sale";
        assert_eq!(HeuristicParser.parse(raw), parse(raw));
    }
}

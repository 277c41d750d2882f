use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::debug;

use crate::content::{ContentParser, HeuristicParser, ParsedContent};
use crate::error::FlyerError;
use crate::templates::{Template, TemplateCatalog};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlyerDocument {
    #[serde(flatten)]
    pub template: Template,
    pub content: ParsedContent,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct FlyerComposer<P: ContentParser = HeuristicParser> {
    catalog: Arc<TemplateCatalog>,
    parser: P,
}

impl FlyerComposer<HeuristicParser> {
    pub fn new(catalog: Arc<TemplateCatalog>) -> Self {
        Self::with_parser(catalog, HeuristicParser)
    }
}

impl<P: ContentParser> FlyerComposer<P> {
    pub fn with_parser(catalog: Arc<TemplateCatalog>, parser: P) -> Self {
        Self { catalog, parser }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn compose(&self, template_id: &str, raw: &str) -> Result<FlyerDocument, FlyerError> {
        self.compose_at(template_id, raw, OffsetDateTime::now_utc())
    }

    pub fn compose_at(
        &self,
        template_id: &str,
        raw: &str,
        generated_at: OffsetDateTime,
    ) -> Result<FlyerDocument, FlyerError> {
        let template_id = template_id.trim();
        if template_id.is_empty() || raw.trim().is_empty() {
            return Err(FlyerError::invalid_argument(
                "Template ID and content are required",
            ));
        }
        let template = self.catalog.get_template(template_id)?;
        let content = self.parser.parse(raw);
        debug!(
            "composed flyer (template={}, highlights={})",
            template.id,
            content.highlights.len()
        );
        Ok(FlyerDocument {
            template: template.clone(),
            content,
            generated_at,
        })
    }
}

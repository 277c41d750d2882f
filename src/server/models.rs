use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::composer::FlyerDocument;
use crate::templates::Template;

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    pub(crate) template_id: Option<String>,
    pub(crate) content: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct EnhanceRequest {
    pub(crate) text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RenderRequest {
    pub(crate) template_id: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) format: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) service: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) timestamp: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub(crate) struct TemplatesResponse<'a> {
    pub(crate) success: bool,
    pub(crate) templates: &'a [Template],
    pub(crate) count: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct TemplateResponse<'a> {
    pub(crate) success: bool,
    pub(crate) template: &'a Template,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateResponse {
    pub(crate) success: bool,
    pub(crate) flyer: FlyerDocument,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnhanceResponse {
    pub(crate) success: bool,
    pub(crate) original_text: String,
    pub(crate) enhanced_text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) timestamp: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) note: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) success: bool,
    pub(crate) message: String,
}

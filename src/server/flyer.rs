use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use time::OffsetDateTime;
use tracing::{error, info};

use crate::error::FlyerError;
use crate::render::{ExportFormat, RenderPlan, export};

use super::models::{EnhanceRequest, EnhanceResponse, ErrorResponse, RenderRequest};
use super::state::ServerState;

#[derive(Debug)]
pub(crate) struct ServerError {
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl ServerError {
    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<FlyerError> for ServerError {
    fn from(err: FlyerError) -> Self {
        let message = match &err {
            FlyerError::UpstreamUnavailable(_) => "Upstream service unavailable".to_string(),
            other => other.to_string(),
        };
        Self {
            status: err.status(),
            message,
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("Invalid request body: {}", rejection.body_text()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                success: false,
                message: self.message,
            }),
        )
            .into_response()
    }
}

pub(crate) async fn enhance_request(
    state: &ServerState,
    request: EnhanceRequest,
) -> Result<EnhanceResponse, ServerError> {
    let text = request.text.unwrap_or_default();
    let enhancement = state.enhancer.enhance(&text).await?;
    Ok(EnhanceResponse {
        success: true,
        original_text: text,
        enhanced_text: enhancement.text,
        timestamp: OffsetDateTime::now_utc(),
        note: enhancement.note,
    })
}

pub(crate) struct RenderedFlyer {
    pub(crate) format: ExportFormat,
    pub(crate) bytes: Vec<u8>,
}

pub(crate) async fn render_request(
    state: &ServerState,
    request: RenderRequest,
) -> Result<RenderedFlyer, ServerError> {
    let format = match request.format.as_deref().filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .parse::<ExportFormat>()
            .map_err(|err| FlyerError::invalid_argument(err.to_string()))?,
        None => state.settings.render_format,
    };
    let document = state.composer.compose(
        request.template_id.as_deref().unwrap_or_default(),
        request.content.as_deref().unwrap_or_default(),
    )?;
    let plan = RenderPlan::from_document(&document);
    let resolved = if format.is_visual() && state.settings.render_fetch_images {
        plan.resolve(state.images.as_ref()).await
    } else {
        plan.without_images()
    };

    let font_family = state.settings.render_font_family.clone();
    let bytes = tokio::task::spawn_blocking(move || {
        export(&document, &resolved, format, &font_family)
    })
    .await
    .map_err(|err| ServerError::internal(format!("render task failed: {}", err)))?
    .map_err(|err| {
        error!("render failed: {:#}", err);
        ServerError::internal("Failed to render flyer")
    })?;
    info!("rendered flyer ({}, {} bytes)", format.extension(), bytes.len());
    Ok(RenderedFlyer { format, bytes })
}

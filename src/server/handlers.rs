use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode, header};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::info;

use super::flyer::{ServerError, enhance_request, render_request};
use super::models::{
    EnhanceRequest, EnhanceResponse, GenerateRequest, GenerateResponse, HealthResponse,
    RenderRequest, TemplateResponse, TemplatesResponse,
};
use super::state::ServerState;

pub async fn run_server(state: ServerState, addr: String) -> Result<()> {
    let app = router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind server address {}", addr))?;
    info!("flyer service listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/templates", get(list_templates))
        .route("/templates/:id", get(get_template))
        .route("/generate", post(generate))
        .route("/enhance", post(enhance))
        .route("/render", post(render))
        .route("/api/flyers/templates", get(list_templates))
        .route("/api/flyers/templates/:id", get(get_template))
        .route("/api/flyers/generate", post(generate))
        .route("/api/ai/enhance-text", post(enhance))
        .fallback(not_found)
        .with_state(state)
        .layer(axum::middleware::from_fn(cors_middleware))
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK",
        service: "Flyer Service",
        timestamp: OffsetDateTime::now_utc(),
    })
}

async fn not_found() -> ServerError {
    ServerError::not_found("Endpoint not found")
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type,authorization,accept,origin,x-requested-with"),
    );
}

async fn list_templates(State(state): State<Arc<ServerState>>) -> Response<Body> {
    let templates = state.composer.catalog().list_templates();
    Json(TemplatesResponse {
        success: true,
        templates,
        count: templates.len(),
    })
    .into_response()
}

async fn get_template(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Response<Body>, ServerError> {
    let template = state.composer.catalog().get_template(&id)?;
    Ok(Json(TemplateResponse {
        success: true,
        template,
    })
    .into_response())
}

async fn generate(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ServerError> {
    let Json(payload) = payload?;
    let flyer = state.composer.compose(
        payload.template_id.as_deref().unwrap_or_default(),
        payload.content.as_deref().unwrap_or_default(),
    )?;
    info!("generated flyer (template={})", flyer.template.id);
    Ok(Json(GenerateResponse {
        success: true,
        flyer,
    }))
}

async fn enhance(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<EnhanceRequest>, JsonRejection>,
) -> Result<Json<EnhanceResponse>, ServerError> {
    let Json(payload) = payload?;
    Ok(Json(enhance_request(state.as_ref(), payload).await?))
}

async fn render(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Response<Body>, ServerError> {
    let Json(payload) = payload?;
    let rendered = render_request(state.as_ref(), payload).await?;
    let disposition = format!(
        "inline; filename=\"flyer.{}\"",
        rendered.format.extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, rendered.format.mime().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        rendered.bytes,
    )
        .into_response())
}

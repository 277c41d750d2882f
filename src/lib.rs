use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub mod composer;
pub mod content;
pub mod enhance;
pub mod error;
pub mod logging;
pub mod providers;
pub mod render;
pub mod server;
pub mod settings;
pub mod templates;
#[cfg(test)]
mod test_util;

pub use composer::{FlyerComposer, FlyerDocument};
pub use content::{ContentParser, HeuristicParser, ParsedContent};
pub use enhance::{Enhancement, Enhancer};
pub use error::FlyerError;
pub use providers::{Provider, ProviderImpl, ProviderKind, ProviderUsage};
pub use render::{ExportFormat, RenderPlan};
pub use templates::{Template, TemplateCatalog};

#[derive(Debug, Clone)]
pub struct Config {
    pub template: String,
    pub model: Option<String>,
    pub key: Option<String>,
    pub format: Option<String>,
    pub enhance: bool,
    pub settings_path: Option<String>,
    pub catalog_path: Option<String>,
    pub list_templates: bool,
    pub with_using_model: bool,
    pub with_using_tokens: bool,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub bytes: Vec<u8>,
    pub format: Option<ExportFormat>,
    pub notes: Vec<String>,
}

impl RunOutput {
    pub fn is_text(&self) -> bool {
        matches!(
            self.format,
            None | Some(ExportFormat::Json) | Some(ExportFormat::Svg)
        )
    }
}

pub async fn run(config: Config, input: Option<String>) -> Result<RunOutput> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let mut settings = settings::load_settings(settings_path)?;
    if let Some(path) = config.catalog_path.as_deref() {
        settings.catalog_path = Some(path.into());
    }
    let catalog = Arc::new(TemplateCatalog::load(settings.catalog_path.as_deref())?);

    if config.list_templates {
        return Ok(RunOutput {
            bytes: format_template_list(&catalog).into_bytes(),
            format: None,
            notes: Vec::new(),
        });
    }

    let input = input.unwrap_or_default();
    let input = input.trim();
    if input.is_empty() {
        return Err(anyhow!("stdin is empty"));
    }
    let format = match config.format.as_deref() {
        Some(value) => value.parse::<ExportFormat>()?,
        None => settings.render_format,
    };

    let mut notes = Vec::new();
    let copy = if config.enhance && settings.enhance_enabled {
        let enhancer = build_enhancer(&settings, config.model.as_deref(), config.key.as_deref())?;
        let enhancement = enhancer.enhance(input).await?;
        notes.extend(enhancement_notes(
            &enhancement,
            config.with_using_model,
            config.with_using_tokens,
        ));
        enhancement.text
    } else {
        input.to_string()
    };

    let composer = FlyerComposer::new(catalog);
    let document = composer.compose(&config.template, &copy)?;
    let plan = RenderPlan::from_document(&document);
    let resolved = if format.is_visual() && settings.render_fetch_images {
        plan.resolve(build_image_source(&settings).as_ref()).await
    } else {
        plan.without_images()
    };
    let bytes = render::export(&document, &resolved, format, &settings.render_font_family)
        .with_context(|| format!("failed to export flyer as {}", format.extension()))?;
    info!(
        "flyer ready (template={}, format={}, {} bytes)",
        document.template.id,
        format.extension(),
        bytes.len()
    );

    Ok(RunOutput {
        bytes,
        format: Some(format),
        notes,
    })
}

pub fn build_enhancer(
    settings: &settings::Settings,
    model: Option<&str>,
    key: Option<&str>,
) -> Result<Enhancer<ProviderImpl>> {
    let model = model.or(settings.enhance_model.as_deref());
    let provider = if settings.enhance_enabled {
        providers::provider_from_env(model, key)?
    } else {
        None
    };
    if provider.is_none() {
        warn!("no text-enhancement provider configured; fallback copy will be used");
    }
    Ok(
        Enhancer::new(provider, Duration::from_secs(settings.enhance_timeout_secs))
            .with_audience(settings.enhance_audience.clone()),
    )
}

pub fn build_image_source(settings: &settings::Settings) -> Arc<dyn render::ImageSource> {
    if settings.render_fetch_images {
        Arc::new(render::HttpImageSource::new(Duration::from_secs(
            settings.render_image_timeout_secs,
        )))
    } else {
        Arc::new(render::OfflineImageSource)
    }
}

pub fn build_server_state(
    settings: settings::Settings,
    model: Option<&str>,
    key: Option<&str>,
) -> Result<server::ServerState> {
    let catalog = Arc::new(TemplateCatalog::load(settings.catalog_path.as_deref())?);
    let enhancer = build_enhancer(&settings, model, key)?;
    let images = build_image_source(&settings);
    Ok(server::ServerState::new(
        FlyerComposer::new(catalog),
        enhancer,
        images,
        settings,
    ))
}

fn format_template_list(catalog: &TemplateCatalog) -> String {
    catalog
        .list_templates()
        .iter()
        .map(|template| {
            format!(
                "{}\t{}\t{}x{}\t{}",
                template.id, template.name, template.width, template.height, template.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn enhancement_notes(
    enhancement: &Enhancement,
    with_using_model: bool,
    with_using_tokens: bool,
) -> Vec<String> {
    let mut notes = Vec::new();
    if let Some(note) = enhancement.note.as_deref() {
        notes.push(format!("note: {}", note));
    }
    if with_using_model {
        let model = enhancement.model.as_deref().unwrap_or("unavailable");
        notes.push(format!("model: {}", model));
    }
    if with_using_tokens {
        notes.push(format_usage(enhancement.usage.as_ref()));
    }
    notes
}

fn format_usage(usage: Option<&ProviderUsage>) -> String {
    let Some(usage) = usage else {
        return "tokens: unavailable".to_string();
    };
    let total = usage.total_tokens.or_else(|| {
        usage
            .prompt_tokens
            .zip(usage.completion_tokens)
            .map(|(prompt, completion)| prompt + completion)
    });

    let mut parts = Vec::new();
    if let Some(prompt) = usage.prompt_tokens {
        parts.push(format!("prompt={}", prompt));
    }
    if let Some(completion) = usage.completion_tokens {
        parts.push(format!("completion={}", completion));
    }
    if let Some(total) = total {
        parts.push(format!("total={}", total));
    }

    if parts.is_empty() {
        "tokens: unavailable".to_string()
    } else {
        format!("tokens: {}", parts.join(", "))
    }
}

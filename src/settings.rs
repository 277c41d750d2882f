use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::render::ExportFormat;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_addr: String,
    pub enhance_model: Option<String>,
    pub enhance_timeout_secs: u64,
    pub enhance_enabled: bool,
    pub enhance_audience: String,
    pub render_font_family: String,
    pub render_image_timeout_secs: u64,
    pub render_fetch_images: bool,
    pub render_format: ExportFormat,
    pub catalog_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:5003".to_string(),
            enhance_model: None,
            enhance_timeout_secs: 30,
            enhance_enabled: true,
            enhance_audience: "real estate".to_string(),
            render_font_family: "Arial, sans-serif".to_string(),
            render_image_timeout_secs: 10,
            render_fetch_images: true,
            render_format: ExportFormat::Png,
            catalog_path: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    server: Option<ServerSettings>,
    enhance: Option<EnhanceSettings>,
    render: Option<RenderSettings>,
    catalog: Option<CatalogSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSettings {
    addr: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EnhanceSettings {
    model: Option<String>,
    timeout_secs: Option<u64>,
    enabled: Option<bool>,
    audience: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RenderSettings {
    font_family: Option<String>,
    image_timeout_secs: Option<u64>,
    fetch_images: Option<bool>,
    format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogSettings {
    path: Option<String>,
}

/// Merges, lowest priority first: the working directory's `settings.toml`
/// and `settings.local.toml`, the same pair under `~/.llm-flyer-rust/`, and
/// `extra_path` when given.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];
    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            settings
                .merge_toml(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
        }
    }

    Ok(settings)
}

impl Settings {
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let parsed: SettingsFile = toml::from_str(content)?;
        self.merge(parsed)
    }

    fn merge(&mut self, incoming: SettingsFile) -> Result<()> {
        if let Some(server) = incoming.server
            && let Some(addr) = non_empty(server.addr)
        {
            self.server_addr = addr;
        }
        if let Some(enhance) = incoming.enhance {
            if let Some(model) = non_empty(enhance.model) {
                self.enhance_model = Some(model);
            }
            if let Some(secs) = enhance.timeout_secs
                && secs > 0
            {
                self.enhance_timeout_secs = secs;
            }
            if let Some(enabled) = enhance.enabled {
                self.enhance_enabled = enabled;
            }
            if let Some(audience) = non_empty(enhance.audience) {
                self.enhance_audience = audience;
            }
        }
        if let Some(render) = incoming.render {
            if let Some(family) = non_empty(render.font_family) {
                self.render_font_family = family;
            }
            if let Some(secs) = render.image_timeout_secs
                && secs > 0
            {
                self.render_image_timeout_secs = secs;
            }
            if let Some(fetch) = render.fetch_images {
                self.render_fetch_images = fetch;
            }
            if let Some(format) = non_empty(render.format) {
                self.render_format = format.parse()?;
            }
        }
        if let Some(catalog) = incoming.catalog
            && let Some(path) = non_empty(catalog.path)
        {
            self.catalog_path = Some(PathBuf::from(path));
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".llm-flyer-rust"))
        }
    })
}

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use std::time::Duration;
use tera::{Context as TeraContext, Tera};
use tracing::{info, warn};

use crate::content::{BULLET, DEFAULT_HIGHLIGHTS};
use crate::error::FlyerError;
use crate::providers::{Provider, ProviderUsage};

mod normalize;

pub use normalize::normalize_text;

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("prompts/system_prompt.tera");
const FALLBACK_NOTE: &str = "AI enhancement failed, using fallback text";
const MAX_HIGHLIGHTS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enhancement {
    pub text: String,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<ProviderUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Enhancement {
    fn fallback_for(input: &str) -> Self {
        Self {
            text: fallback_text(input),
            fallback: true,
            model: None,
            usage: None,
            note: Some(FALLBACK_NOTE.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Enhancer<P: Provider> {
    provider: Option<P>,
    timeout: Duration,
    audience: String,
}

impl<P: Provider> Enhancer<P> {
    pub fn new(provider: Option<P>, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            audience: "real estate".to_string(),
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        let audience = audience.into();
        if !audience.trim().is_empty() {
            self.audience = audience;
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn enhance(&self, input: &str) -> Result<Enhancement, FlyerError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(FlyerError::invalid_argument("Text input is required"));
        }
        match self.generate(input).await {
            Ok(enhancement) => {
                info!("enhanced text generated ({} chars)", enhancement.text.len());
                Ok(enhancement)
            }
            Err(err) => {
                warn!("{}", FlyerError::upstream(format!("{:#}", err)));
                Ok(Enhancement::fallback_for(input))
            }
        }
    }

    async fn generate(&self, input: &str) -> Result<Enhancement> {
        let provider = self
            .provider
            .clone()
            .ok_or_else(|| anyhow!("no text-enhancement provider configured"))?;
        let system_prompt = render_system_prompt(&self.audience)?;
        let call = provider
            .append_system_input(system_prompt)
            .append_user_input(input.to_string())
            .generate();
        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| anyhow!("enhancement timed out after {:?}", self.timeout))??;

        let text = normalize_text(&response.text);
        let text = text.trim();
        if text.is_empty() {
            return Err(anyhow!("enhancement returned empty text"));
        }
        Ok(Enhancement {
            text: text.to_string(),
            fallback: false,
            model: response.model,
            usage: response.usage,
            note: None,
        })
    }
}

pub fn render_system_prompt(audience: &str) -> Result<String> {
    let mut context = TeraContext::new();
    context.insert("audience", audience);
    context.insert("bullet", &BULLET.to_string());
    context.insert("highlight_examples", &["<highlight>", "<highlight>"]);
    context.insert("max_highlights", &MAX_HIGHLIGHTS);
    Tera::one_off(SYSTEM_PROMPT_TEMPLATE, &context, false)
        .with_context(|| "failed to render enhancement prompt")
}

pub fn fallback_text(input: &str) -> String {
    let mut text = format!("**{}** - For Sale!\n\n**Property Highlights:**\n", input.trim());
    for line in DEFAULT_HIGHLIGHTS {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("\n**Call Today for More Information!**\n");
    text
}

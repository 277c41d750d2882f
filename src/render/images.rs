use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

pub type ImageFuture<'a> = Pin<Box<dyn Future<Output = Result<FetchedImage>> + Send + 'a>>;

pub trait ImageSource: Send + Sync {
    fn fetch<'a>(&'a self, uri: &'a str) -> ImageFuture<'a>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FetchedImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }

    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| anyhow!("not a data URI"))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| anyhow!("data URI has no payload"))?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| anyhow!("only base64 data URIs are supported"))?;
        let bytes = BASE64
            .decode(payload.trim())
            .with_context(|| "failed to decode data URI payload")?;
        let mime = if mime.is_empty() {
            sniff_mime(&bytes)?
        } else {
            mime.to_string()
        };
        Ok(Self { mime, bytes })
    }
}

#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpImageSource {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    async fn download(&self, uri: &str) -> Result<FetchedImage> {
        let response = self
            .client
            .get(uri)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("failed to request {}", uri))?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("image request returned {}", status));
        }
        let bytes = response
            .bytes()
            .await
            .with_context(|| "failed to read image body")?
            .to_vec();
        let mime = sniff_mime(&bytes)?;
        debug!("fetched image {} ({}, {} bytes)", uri, mime, bytes.len());
        Ok(FetchedImage { mime, bytes })
    }
}

impl ImageSource for HttpImageSource {
    fn fetch<'a>(&'a self, uri: &'a str) -> ImageFuture<'a> {
        Box::pin(async move {
            if uri.starts_with("data:") {
                return FetchedImage::from_data_uri(uri);
            }
            self.download(uri).await
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineImageSource;

impl ImageSource for OfflineImageSource {
    fn fetch<'a>(&'a self, uri: &'a str) -> ImageFuture<'a> {
        Box::pin(async move {
            if uri.starts_with("data:") {
                return FetchedImage::from_data_uri(uri);
            }
            Err(anyhow!("image fetching is disabled"))
        })
    }
}

fn sniff_mime(bytes: &[u8]) -> Result<String> {
    let format = image::guess_format(bytes).with_context(|| "unrecognized image data")?;
    Ok(format.to_mime_type().to_string())
}

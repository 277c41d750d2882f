use futures_util::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::composer::FlyerDocument;
use crate::error::FlyerError;
use crate::templates::{ROLE_TABLE, RegionLayout, Role};

mod export;
mod images;
mod svg;

pub use export::{ExportFormat, export, png_to_pdf, svg_to_png};
pub use images::{FetchedImage, HttpImageSource, ImageFuture, ImageSource, OfflineImageSource};
pub use svg::render_svg;

const DEFAULT_LINE_HEIGHT: f32 = 1.2;
const STRIP_GAP: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    fn parse(value: Option<&str>) -> Self {
        match value.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("center") => TextAlign::Center,
            Some("right") | Some("end") => TextAlign::Right,
            _ => TextAlign::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub fill: String,
    pub padding: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    pub role: Role,
    pub region: String,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: Option<f32>,
    pub font_size: f32,
    pub font_weight: Option<String>,
    pub text_align: TextAlign,
    pub fill: String,
    pub line_height: f32,
    pub panel: Option<Panel>,
}

impl TextNode {
    pub fn padding(&self) -> f32 {
        self.panel.as_ref().map(|panel| panel.padding).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSlot {
    pub uri: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPlan {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub background_image: Option<String>,
    pub placeholder_color: String,
    pub text_nodes: Vec<TextNode>,
    pub image_slots: Vec<ImageSlot>,
}

impl RenderPlan {
    pub fn from_document(doc: &FlyerDocument) -> Self {
        let template = &doc.template;
        let text_nodes = ROLE_TABLE
            .iter()
            .filter_map(|binding| {
                let (region, layout) = template.region_for(binding.role)?;
                let text = doc.content.text_for(binding.role)?;
                Some(TextNode {
                    role: binding.role,
                    region: region.to_string(),
                    text,
                    x: layout.x,
                    y: layout.y,
                    width: layout.width,
                    height: layout.height,
                    font_size: layout.font_size,
                    font_weight: layout.font_weight.clone(),
                    text_align: TextAlign::parse(layout.text_align.as_deref()),
                    fill: template.resolve_color(binding.role, layout),
                    line_height: layout.line_height.unwrap_or(DEFAULT_LINE_HEIGHT),
                    panel: panel_for(layout),
                })
            })
            .collect();

        let image_slots = template
            .regions
            .values()
            .filter(|layout| !layout.images.is_empty())
            .flat_map(strip_slots)
            .collect();

        Self {
            width: template.width,
            height: template.height,
            background_color: template.background_color.clone(),
            background_image: template
                .background_image
                .clone()
                .filter(|uri| !uri.trim().is_empty()),
            placeholder_color: template.accent_color.clone(),
            text_nodes,
            image_slots,
        }
    }

    pub async fn resolve<S: ImageSource + ?Sized>(self, source: &S) -> ResolvedPlan {
        let background = match self.background_image.as_deref() {
            Some(uri) => fetch_or_warn(source, uri).await,
            None => None,
        };
        let slot_images = join_all(
            self.image_slots
                .iter()
                .map(|slot| fetch_or_warn(source, &slot.uri)),
        )
        .await;
        ResolvedPlan {
            plan: self,
            background,
            slot_images,
        }
    }

    pub fn without_images(self) -> ResolvedPlan {
        let slot_images = vec![None; self.image_slots.len()];
        ResolvedPlan {
            plan: self,
            background: None,
            slot_images,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPlan {
    pub plan: RenderPlan,
    pub background: Option<FetchedImage>,
    pub slot_images: Vec<Option<FetchedImage>>,
}

async fn fetch_or_warn<S: ImageSource + ?Sized>(source: &S, uri: &str) -> Option<FetchedImage> {
    match source.fetch(uri).await {
        Ok(image) => Some(image),
        Err(err) => {
            warn!(
                "{}; using flat fill",
                FlyerError::upstream(format!("image {} ({:#})", uri, err))
            );
            None
        }
    }
}

fn panel_for(layout: &RegionLayout) -> Option<Panel> {
    let fill = layout.background_color.clone()?;
    Some(Panel {
        fill,
        padding: layout.padding.unwrap_or(0.0),
        radius: layout.border_radius.unwrap_or(0.0),
    })
}

fn strip_slots(layout: &RegionLayout) -> Vec<ImageSlot> {
    let count = layout.images.len() as f32;
    let slot_width = ((layout.width - STRIP_GAP * (count - 1.0)) / count).max(1.0);
    let slot_height = layout.height.unwrap_or(slot_width * 0.75);
    layout
        .images
        .iter()
        .enumerate()
        .map(|(idx, uri)| ImageSlot {
            uri: uri.clone(),
            x: layout.x + idx as f32 * (slot_width + STRIP_GAP),
            y: layout.y,
            width: slot_width,
            height: slot_height,
        })
        .collect()
}

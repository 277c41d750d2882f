use anyhow::{Context, Result, anyhow};
use std::io::Cursor;
use std::str::FromStr;
use std::sync::Arc;
use tiny_skia::Pixmap;
use usvg::{Options, Tree, fontdb};

use super::{ResolvedPlan, render_svg};
use crate::composer::FlyerDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Json,
    Svg,
    #[default]
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Png => "image/png",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn is_visual(self) -> bool {
        !matches!(self, ExportFormat::Json)
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "svg" => Ok(ExportFormat::Svg),
            "png" | "image" => Ok(ExportFormat::Png),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(anyhow!(
                "unsupported export format '{}' (expected json, svg, png or pdf)",
                other
            )),
        }
    }
}

pub fn export(
    document: &FlyerDocument,
    resolved: &ResolvedPlan,
    format: ExportFormat,
    font_family: &str,
) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Json => {
            serde_json::to_vec_pretty(document).with_context(|| "failed to serialize flyer")
        }
        ExportFormat::Svg => Ok(render_svg(resolved, font_family).into_bytes()),
        ExportFormat::Png => svg_to_png(&render_svg(resolved, font_family)),
        ExportFormat::Pdf => {
            let png = svg_to_png(&render_svg(resolved, font_family))?;
            png_to_pdf(&png)
        }
    }
}

pub fn svg_to_png(svg: &str) -> Result<Vec<u8>> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let options = Options {
        fontdb: Arc::new(db),
        ..Options::default()
    };
    let tree = Tree::from_str(svg, &options).with_context(|| "failed to parse SVG")?;
    let size = tree.size().to_int_size();
    let mut pixmap =
        Pixmap::new(size.width(), size.height()).ok_or_else(|| anyhow!("empty SVG size"))?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    let image = image::RgbaImage::from_raw(size.width(), size.height(), pixmap.data().to_vec())
        .ok_or_else(|| anyhow!("failed to build image buffer from SVG"))?;
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .with_context(|| "failed to encode PNG")?;
    Ok(bytes)
}

/// Wraps a raster page in a single-page PDF sized to the image at 72 dpi.
pub fn png_to_pdf(png: &[u8]) -> Result<Vec<u8>> {
    use printpdf::{Image, ImageTransform, Mm, PdfDocument};

    let image = printpdf::image_crate::load_from_memory(png)
        .with_context(|| "failed to decode rendered page")?;
    // printpdf cannot embed an alpha channel.
    let image = printpdf::image_crate::DynamicImage::ImageRgb8(image.to_rgb8());
    let (doc, page, layer) = PdfDocument::new(
        "flyer",
        Mm(px_to_mm(image.width())),
        Mm(px_to_mm(image.height())),
        "Layer 1",
    );
    let current_layer = doc.get_page(page).get_layer(layer);
    Image::from_dynamic_image(&image).add_to_layer(
        current_layer,
        ImageTransform {
            translate_x: Some(Mm(0.0)),
            translate_y: Some(Mm(0.0)),
            rotate: None,
            scale_x: Some(1.0),
            scale_y: Some(1.0),
            dpi: Some(72.0),
        },
    );

    let mut buffer = Vec::new();
    {
        let mut writer = std::io::BufWriter::new(&mut buffer);
        doc.save(&mut writer).with_context(|| "failed to write pdf")?;
    }
    Ok(buffer)
}

fn px_to_mm(px: u32) -> f32 {
    let inches = px as f32 / 72.0;
    inches * 25.4
}

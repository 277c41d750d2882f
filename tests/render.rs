use llm_flyer_rust::render::{
    self, ExportFormat, FetchedImage, ImageFuture, ImageSource, OfflineImageSource, RenderPlan,
};
use llm_flyer_rust::{FlyerComposer, FlyerDocument, TemplateCatalog};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

const RAW: &str = "**Lakeside Villa** - For Sale!\n• Pool\n• Garage\n**Call now!**";

fn document(template_id: &str) -> FlyerDocument {
    FlyerComposer::new(Arc::new(TemplateCatalog::builtin().unwrap()))
        .compose(template_id, RAW)
        .unwrap()
}

/// Serves one fixed image for every URI and counts requests.
struct StubSource {
    calls: AtomicUsize,
}

impl ImageSource for StubSource {
    fn fetch<'a>(&'a self, _uri: &'a str) -> ImageFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            FetchedImage::from_data_uri(&format!("data:image/png;base64,{}", PNG_1X1))
        })
    }
}

#[tokio::test]
async fn resolve_fetches_background_and_every_strip_image() {
    let source = StubSource {
        calls: AtomicUsize::new(0),
    };
    let resolved = RenderPlan::from_document(&document("interior-design"))
        .resolve(&source)
        .await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 5);
    assert!(resolved.background.is_some());
    assert!(resolved.slot_images.iter().all(Option::is_some));

    let svg = render::render_svg(&resolved, "Arial");
    assert_eq!(svg.matches("<image").count(), 5);
    let background = svg.find("<image").unwrap();
    let first_text = svg.find("<text").unwrap();
    assert!(background < first_text);
}

#[tokio::test]
async fn offline_render_degrades_to_flat_fills() {
    let resolved = RenderPlan::from_document(&document("real-estate-2"))
        .resolve(&OfflineImageSource)
        .await;
    assert!(resolved.background.is_none());
    let svg = render::render_svg(&resolved, "Arial");
    assert!(!svg.contains("<image"));
    assert_eq!(svg.matches(r#"fill-opacity="0.3""#).count(), 3);
    assert!(svg.contains("Lakeside Villa"));
}

#[test]
fn png_export_keeps_canvas_size_and_background() {
    let document = document("real-estate-1");
    let resolved = RenderPlan::from_document(&document).without_images();
    let png = render::export(&document, &resolved, ExportFormat::Png, "Arial").unwrap();
    let image = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (800, 1200));
    assert_eq!(image.get_pixel(5, 5).0, [0x1a, 0x1a, 0x2e, 255]);
}

#[test]
fn pdf_export_produces_a_document() {
    let document = document("real-estate-3");
    let resolved = RenderPlan::from_document(&document).without_images();
    let pdf = render::export(&document, &resolved, ExportFormat::Pdf, "Arial").unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
}

#[test]
fn json_export_is_the_flyer_document() {
    let document = document("real-estate-1");
    let resolved = RenderPlan::from_document(&document).without_images();
    let bytes = render::export(&document, &resolved, ExportFormat::Json, "Arial").unwrap();
    let parsed: FlyerDocument = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed, document);
}

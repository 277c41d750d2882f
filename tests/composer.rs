use llm_flyer_rust::content::{ContentParser, ParsedContent};
use llm_flyer_rust::render::RenderPlan;
use llm_flyer_rust::{FlyerComposer, FlyerError, TemplateCatalog};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const UNMATCHED_CATALOG: &str = r##"
[[templates]]
id = "poster"
name = "Bare Poster"
width = 600
height = 400
backgroundColor = "#000000"
textColor = "#ffffff"
accentColor = "#ff0000"

[templates.layout.banner]
x = 0
y = 0
width = 600
fontSize = 30
"##;

#[derive(Default)]
struct CountingParser {
    calls: Arc<AtomicUsize>,
}

impl ContentParser for CountingParser {
    fn parse(&self, raw: &str) -> ParsedContent {
        self.calls.fetch_add(1, Ordering::SeqCst);
        llm_flyer_rust::content::parse(raw)
    }
}

fn builtin() -> Arc<TemplateCatalog> {
    Arc::new(TemplateCatalog::builtin().unwrap())
}

#[test]
fn unknown_template_never_reaches_the_parser() {
    let parser = CountingParser::default();
    let calls = parser.calls.clone();
    let composer = FlyerComposer::with_parser(builtin(), parser);
    let err = composer
        .compose("does-not-exist", "**Villa** - For Sale!")
        .unwrap_err();
    assert_eq!(err, FlyerError::NotFound("Template not found".to_string()));
    assert_eq!(err.status().as_u16(), 404);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    composer.compose("real-estate-1", "**Villa** - For Sale!").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn missing_arguments_are_rejected_before_lookup() {
    let composer = FlyerComposer::new(builtin());
    for (id, raw) in [("", "text"), ("real-estate-1", ""), ("  ", "  ")] {
        let err = composer.compose(id, raw).unwrap_err();
        assert_eq!(
            err,
            FlyerError::InvalidArgument("Template ID and content are required".to_string())
        );
    }
}

#[test]
fn concurrent_compositions_are_isolated() {
    let composer = FlyerComposer::new(builtin());
    let inputs = (0..16)
        .map(|idx| format!("**Listing {idx}** - For Sale!\n• Feature {idx}\n**Call {idx} now**"))
        .collect::<Vec<_>>();

    let documents = std::thread::scope(|scope| {
        let handles = inputs
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                let composer = &composer;
                let id = if idx % 2 == 0 {
                    "real-estate-2"
                } else {
                    "interior-design"
                };
                scope.spawn(move || composer.compose(id, raw).unwrap())
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    for (idx, document) in documents.iter().enumerate() {
        assert_eq!(document.content.header, format!("Listing {idx}"));
        assert_eq!(document.content.highlights, vec![format!("• Feature {idx}")]);
        assert_eq!(document.content.cta, format!("Call {idx} now"));
        let expected = if idx % 2 == 0 {
            "real-estate-2"
        } else {
            "interior-design"
        };
        assert_eq!(document.template.id, expected);
    }
}

#[test]
fn template_without_matching_regions_still_composes() {
    let catalog = Arc::new(TemplateCatalog::from_toml_str(UNMATCHED_CATALOG).unwrap());
    let composer = FlyerComposer::new(catalog);
    let document = composer
        .compose("poster", "**Villa** - For Sale!\n• Pool")
        .unwrap();
    assert_eq!(document.content.header, "Villa");
    let plan = RenderPlan::from_document(&document);
    assert!(plan.text_nodes.is_empty());
    assert!(plan.image_slots.is_empty());
    assert_eq!((plan.width, plan.height), (600, 400));
}

#[test]
fn listed_templates_round_trip_through_lookup() {
    let catalog = builtin();
    for template in catalog.list_templates() {
        assert_eq!(catalog.get_template(&template.id).unwrap(), template);
    }
}

#[test]
fn document_json_carries_template_fields_at_top_level() {
    let composer = FlyerComposer::new(builtin());
    let document = composer
        .compose("real-estate-3", "**Villa** - For Sale!")
        .unwrap();
    let value = serde_json::to_value(&document).unwrap();
    assert_eq!(value["id"], "real-estate-3");
    assert_eq!(value["accentColor"], "#27ae60");
    assert_eq!(value["regions"]["cta"]["fontSize"], 24.0);
    assert_eq!(value["content"]["header"], "Villa");
    assert!(value["generatedAt"].as_str().unwrap().ends_with('Z'));
}

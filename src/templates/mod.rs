use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::FlyerError;

mod roles;

pub use roles::{ROLE_TABLE, Role, RoleBinding, Tone};

const BUILTIN_CATALOG_TOML: &str = include_str!("catalog.toml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub text_color: String,
    pub accent_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(alias = "layout")]
    pub regions: BTreeMap<String, RegionLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default)]
    pub font_size: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl Template {
    pub fn region_for(&self, role: Role) -> Option<(&str, &RegionLayout)> {
        role.binding()
            .region_names
            .iter()
            .find_map(|name| self.regions.get_key_value(*name))
            .map(|(name, layout)| (name.as_str(), layout))
    }

    pub fn resolve_color(&self, role: Role, layout: &RegionLayout) -> String {
        if let Some(color) = layout.color.as_deref()
            && !color.trim().is_empty()
        {
            return color.to_string();
        }
        match role.binding().tone {
            Tone::Accent => self.accent_color.clone(),
            Tone::Text => self.text_color.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    templates: Vec<Template>,
}

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
    index: HashMap<String, usize>,
}

impl TemplateCatalog {
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG_TOML).with_context(|| "failed to load builtin catalog")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Self::builtin();
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to load catalog: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let parsed: CatalogFile =
            toml::from_str(content).with_context(|| "failed to parse catalog TOML")?;
        Self::new(parsed.templates)
    }

    pub fn new(templates: Vec<Template>) -> Result<Self> {
        if templates.is_empty() {
            return Err(anyhow!("catalog has no templates"));
        }
        let mut seen = HashSet::new();
        for template in &templates {
            validate_template(template)?;
            if !seen.insert(template.id.clone()) {
                return Err(anyhow!("duplicate template id '{}'", template.id));
            }
        }
        let index = templates
            .iter()
            .enumerate()
            .map(|(idx, template)| (template.id.clone(), idx))
            .collect();
        Ok(Self { templates, index })
    }

    pub fn list_templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn get_template(&self, id: &str) -> Result<&Template, FlyerError> {
        self.index
            .get(id)
            .map(|idx| &self.templates[*idx])
            .ok_or_else(|| FlyerError::not_found("Template not found"))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn validate_template(template: &Template) -> Result<()> {
    if template.id.trim().is_empty() {
        return Err(anyhow!("template id is empty"));
    }
    if template.width == 0 || template.height == 0 {
        return Err(anyhow!(
            "template '{}' must have a positive canvas size",
            template.id
        ));
    }
    if template.regions.is_empty() {
        return Err(anyhow!("template '{}' declares no regions", template.id));
    }
    for (name, region) in &template.regions {
        if region.width <= 0.0 {
            return Err(anyhow!(
                "region '{}' of template '{}' must have a positive width",
                name,
                template.id
            ));
        }
        // Image strips carry no text, so only text regions need a size.
        if region.images.is_empty() && region.font_size <= 0.0 {
            return Err(anyhow!(
                "text region '{}' of template '{}' needs a positive fontSize",
                name,
                template.id
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_catalog_keeps_declaration_order() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let ids = catalog
            .list_templates()
            .iter()
            .map(|template| template.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![
                "real-estate-1",
                "real-estate-2",
                "real-estate-3",
                "interior-design"
            ]
        );
    }

    #[test]
    fn list_then_get_returns_equal_templates() {
        let catalog = TemplateCatalog::builtin().unwrap();
        for template in catalog.list_templates() {
            assert_eq!(catalog.get_template(&template.id).unwrap(), template);
        }
    }

    #[test]
    fn unknown_id_is_not_found() {
        let catalog = TemplateCatalog::builtin().unwrap();
        assert!(matches!(
            catalog.get_template("nope"),
            Err(FlyerError::NotFound(_))
        ));
    }

    #[test]
    fn accepts_layout_alias_and_optional_fields() {
        let catalog = TemplateCatalog::from_toml_str(
            r##"
[[templates]]
id = "mini"
name = "Mini"
width = 300
height = 200
backgroundColor = "#000"
textColor = "#fff"
accentColor = "#f00"

[templates.layout.header]
x = 10
y = 10
width = 280
fontSize = 20
"##,
        )
        .unwrap();
        let template = catalog.get_template("mini").unwrap();
        assert!(template.background_image.is_none());
        let header = &template.regions["header"];
        assert_eq!(header.height, None);
        assert_eq!(header.font_size, 20.0);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let template = TemplateCatalog::builtin().unwrap().list_templates()[0].clone();
        let err = TemplateCatalog::new(vec![template.clone(), template]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_template_without_regions() {
        let mut template = TemplateCatalog::builtin().unwrap().list_templates()[0].clone();
        template.regions.clear();
        assert!(TemplateCatalog::new(vec![template]).is_err());
    }

    #[test]
    fn rejects_zero_canvas() {
        let mut template = TemplateCatalog::builtin().unwrap().list_templates()[0].clone();
        template.height = 0;
        let err = TemplateCatalog::new(vec![template]).unwrap_err();
        assert!(err.to_string().contains("positive canvas size"));
    }

    #[test]
    fn rejects_non_positive_region_width() {
        let mut template = TemplateCatalog::builtin().unwrap().list_templates()[0].clone();
        if let Some(header) = template.regions.get_mut("header") {
            header.width = 0.0;
        }
        let err = TemplateCatalog::new(vec![template]).unwrap_err();
        assert!(err.to_string().contains("region 'header'"));
    }

    #[test]
    fn text_region_without_font_size_is_rejected() {
        let err = TemplateCatalog::from_toml_str(
            r##"
[[templates]]
id = "mini"
name = "Mini"
width = 300
height = 200
backgroundColor = "#000"
textColor = "#fff"
accentColor = "#f00"

[templates.regions.header]
x = 10
y = 10
width = 280
"##,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("needs a positive fontSize"));
    }

    #[test]
    fn image_strip_needs_no_font_size() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let strip = &catalog.get_template("real-estate-1").unwrap().regions["smallImages"];
        assert_eq!(strip.font_size, 0.0);
        assert_eq!(strip.images.len(), 3);
    }

    #[test]
    fn region_lookup_follows_role_priority() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let first = catalog.get_template("real-estate-1").unwrap();
        assert_eq!(
            first.region_for(Role::Highlights).map(|(name, _)| name),
            Some("propertyFeatures")
        );
        assert_eq!(
            first.region_for(Role::Location).map(|(name, _)| name),
            Some("contactInfo")
        );
        assert!(first.region_for(Role::Cta).is_none());

        let second = catalog.get_template("real-estate-2").unwrap();
        assert_eq!(
            second.region_for(Role::Highlights).map(|(name, _)| name),
            Some("features")
        );
    }

    #[test]
    fn color_falls_back_by_tone() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let template = catalog.get_template("interior-design").unwrap();
        let header = &template.regions["header"];
        assert_eq!(template.resolve_color(Role::Header, header), "#e74c3c");
        let about = &template.regions["aboutUs"];
        assert_eq!(template.resolve_color(Role::AboutUs, about), "#ffffff");
        let cta = &template.regions["cta"];
        assert_eq!(template.resolve_color(Role::Cta, cta), "#ffffff");
    }
}

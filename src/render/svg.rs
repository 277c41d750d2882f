use super::{ResolvedPlan, TextAlign, TextNode};

const GLYPH_ADVANCE: f32 = 0.55;

// Draw order: background, background image, strips, then text in role order.
pub fn render_svg(resolved: &ResolvedPlan, font_family: &str) -> String {
    let plan = &resolved.plan;
    let font_family = if font_family.trim().is_empty() {
        "Arial, sans-serif"
    } else {
        font_family
    };

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = plan.width,
        h = plan.height
    ));
    svg.push_str(&format!(
        r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
        plan.width,
        plan.height,
        escape_xml(&plan.background_color)
    ));
    if let Some(image) = resolved.background.as_ref() {
        push_image(
            &mut svg,
            &image.data_uri(),
            0.0,
            0.0,
            plan.width as f32,
            plan.height as f32,
        );
    }

    for (slot, image) in plan.image_slots.iter().zip(resolved.slot_images.iter()) {
        match image {
            Some(image) => push_image(
                &mut svg,
                &image.data_uri(),
                slot.x,
                slot.y,
                slot.width,
                slot.height,
            ),
            None => svg.push_str(&format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" rx="8" fill="{}" fill-opacity="0.3"/>"#,
                slot.x,
                slot.y,
                slot.width,
                slot.height,
                escape_xml(&plan.placeholder_color)
            )),
        }
    }

    for node in &plan.text_nodes {
        push_text_node(&mut svg, node, font_family);
    }

    svg.push_str("</svg>");
    svg
}

fn push_image(svg: &mut String, uri: &str, x: f32, y: f32, width: f32, height: f32) {
    svg.push_str(&format!(
        r#"<image href="{uri}" xlink:href="{uri}" x="{x}" y="{y}" width="{width}" height="{height}" preserveAspectRatio="xMidYMid slice"/>"#,
    ));
}

fn push_text_node(svg: &mut String, node: &TextNode, font_family: &str) {
    let padding = node.padding();
    let inner_width = (node.width - padding * 2.0).max(node.font_size);
    let lines = wrap_text(&node.text, node.font_size, inner_width);
    let step = node.line_height * node.font_size;

    if let Some(panel) = node.panel.as_ref() {
        let height = node
            .height
            .unwrap_or(lines.len() as f32 * step + padding * 2.0);
        svg.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}"/>"#,
            node.x,
            node.y,
            node.width,
            height,
            panel.radius,
            escape_xml(&panel.fill)
        ));
    }

    let (anchor, x) = match node.text_align {
        TextAlign::Left => ("start", node.x + padding),
        TextAlign::Center => ("middle", node.x + node.width / 2.0),
        TextAlign::Right => ("end", node.x + node.width - padding),
    };
    let baseline = node.y + padding + node.font_size;

    svg.push_str(&format!(
        r#"<text x="{}" y="{}" font-family="{}" font-size="{}" fill="{}" text-anchor="{}""#,
        x,
        baseline,
        escape_xml(font_family),
        node.font_size,
        escape_xml(&node.fill),
        anchor
    ));
    if let Some(weight) = node.font_weight.as_deref() {
        svg.push_str(&format!(r#" font-weight="{}""#, escape_xml(weight)));
    }
    svg.push('>');
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { step };
        svg.push_str(&format!(
            r#"<tspan x="{}" dy="{}">{}</tspan>"#,
            x,
            dy,
            escape_xml(line)
        ));
    }
    svg.push_str("</text>");
}

// Greedy wrap; explicit newlines always break, long words stay whole.
pub(crate) fn wrap_text(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let max_chars = ((max_width / (font_size * GLYPH_ADVANCE)).floor() as usize).max(1);
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}

pub(crate) fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{FetchedImage, ImageSlot, Panel, RenderPlan};
    use crate::templates::Role;

    fn node(text: &str, align: TextAlign) -> TextNode {
        TextNode {
            role: Role::Cta,
            region: "cta".to_string(),
            text: text.to_string(),
            x: 50.0,
            y: 100.0,
            width: 700.0,
            height: Some(80.0),
            font_size: 20.0,
            font_weight: Some("bold".to_string()),
            text_align: align,
            fill: "#ffffff".to_string(),
            line_height: 1.5,
            panel: Some(Panel {
                fill: "#e74c3c".to_string(),
                padding: 15.0,
                radius: 10.0,
            }),
        }
    }

    fn resolved(text_nodes: Vec<TextNode>, slot_image: Option<FetchedImage>) -> ResolvedPlan {
        ResolvedPlan {
            plan: RenderPlan {
                width: 800,
                height: 1200,
                background_color: "#34495e".to_string(),
                background_image: None,
                placeholder_color: "#e74c3c".to_string(),
                text_nodes,
                image_slots: vec![ImageSlot {
                    uri: "https://example.com/a.png".to_string(),
                    x: 50.0,
                    y: 850.0,
                    width: 160.0,
                    height: 200.0,
                }],
            },
            background: None,
            slot_images: vec![slot_image],
        }
    }

    #[test]
    fn wraps_on_words_and_newlines() {
        // 100px at 20px font fits 9 characters per line.
        let lines = wrap_text("alpha beta gamma\n• delta", 20.0, 100.0);
        assert_eq!(lines, vec!["alpha", "beta", "gamma", "• delta"]);
    }

    #[test]
    fn long_word_is_not_split() {
        assert_eq!(
            wrap_text("supercalifragilistic", 20.0, 50.0),
            vec!["supercalifragilistic"]
        );
    }

    #[test]
    fn centered_text_anchors_at_region_middle() {
        let svg = render_svg(&resolved(vec![node("Call now", TextAlign::Center)], None), "");
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r#"<text x="400" y="135""#));
        assert!(svg.contains(r#"font-family="Arial, sans-serif""#));
        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains(r##"rx="10" fill="#e74c3c""##));
    }

    #[test]
    fn escapes_markup_in_content() {
        let svg = render_svg(
            &resolved(vec![node("Tom & Jerry <3", TextAlign::Left)], None),
            "Inter",
        );
        assert!(svg.contains("Tom &amp; Jerry &lt;3"));
        assert!(svg.contains(r#"text-anchor="start""#));
    }

    #[test]
    fn missing_strip_image_draws_placeholder() {
        let svg = render_svg(&resolved(Vec::new(), None), "Inter");
        assert!(svg.contains(r##"fill="#e74c3c" fill-opacity="0.3""##));
        assert!(!svg.contains("<image"));
    }

    #[test]
    fn fetched_strip_image_is_inlined() {
        let image = FetchedImage {
            mime: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        };
        let svg = render_svg(&resolved(Vec::new(), Some(image)), "Inter");
        assert!(svg.contains(r#"href="data:image/png;base64,AQID""#));
        assert!(svg.contains(r#"preserveAspectRatio="xMidYMid slice""#));
    }
}

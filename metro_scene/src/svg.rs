// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loading a scene from SVG markup and writing it back out.

use std::fmt::Write as _;

use crate::error::SceneError;
use crate::tree::Scene;
use crate::types::{Element, NodeId};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

fn qualified_name(attr: &roxmltree::Attribute<'_, '_>) -> String {
    match attr.namespace() {
        Some(XLINK_NS) => format!("xlink:{}", attr.name()),
        Some(XML_NS) => format!("xml:{}", attr.name()),
        _ => attr.name().to_string(),
    }
}

fn element_of(node: roxmltree::Node<'_, '_>) -> Element {
    let attrs = node
        .attributes()
        .map(|a| (qualified_name(&a), a.value().to_string()))
        .collect();
    let text: String = node
        .children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect();
    let keep_text = matches!(node.tag_name().name(), "text" | "tspan" | "style" | "title")
        || !text.trim().is_empty();
    Element {
        tag: node.tag_name().name().to_string(),
        attrs,
        text: keep_text.then_some(text).filter(|t| !t.is_empty()),
    }
}

fn build_children(scene: &mut Scene, parent: NodeId, node: roxmltree::Node<'_, '_>) {
    for child in node.children().filter(|c| c.is_element()) {
        let id = scene.insert(parent, element_of(child));
        build_children(scene, id, child);
    }
}

impl Scene {
    /// Parse SVG markup. The outermost `svg` element becomes the root.
    ///
    /// Only elements and their character data are kept; comments, processing
    /// instructions and namespace declarations are dropped. The returned
    /// scene is already committed.
    pub fn parse_svg(text: &str) -> Result<Self, SceneError> {
        let doc = roxmltree::Document::parse(text)?;
        let svg = doc
            .descendants()
            .find(|n| n.has_tag_name("svg"))
            .ok_or(SceneError::MissingSvgRoot)?;
        let mut scene = Self::new(element_of(svg));
        let root = scene.root();
        build_children(&mut scene, root, svg);
        scene.refresh_text_geometry();
        scene.commit();
        tracing::debug!(elements = scene.len(), "parsed svg scene");
        Ok(scene)
    }

    /// Serialize the scene back to SVG markup.
    ///
    /// Class lists are written as `class` attributes in their current state,
    /// so toggles made through the scene show up in the output.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        self.write_element(&mut out, self.root());
        out
    }

    fn write_element(&self, out: &mut String, id: NodeId) {
        let element = self.element(id);
        out.push('<');
        out.push_str(&element.tag);
        if id == self.root() {
            if element.attr("xmlns").is_none() {
                let _ = write!(out, " xmlns=\"{SVG_NS}\"");
            }
            if self.uses_xlink() {
                let _ = write!(out, " xmlns:xlink=\"{XLINK_NS}\"");
            }
        }
        for (k, v) in &element.attrs {
            let _ = write!(out, " {k}=\"{}\"", escape(v, true));
        }
        if let Some(class) = self.attr(id, "class") {
            let _ = write!(out, " class=\"{}\"", escape(&class, true));
        }
        let children = self.children(id);
        if children.is_empty() && element.text.is_none() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &element.text {
            out.push_str(&escape(text, false));
        }
        for &c in children {
            self.write_element(out, c);
        }
        let _ = write!(out, "</{}>", element.tag);
    }

    fn uses_xlink(&self) -> bool {
        self.descendants(self.root()).into_iter().any(|n| {
            self.element(n)
                .attrs
                .iter()
                .any(|(k, _)| k.starts_with("xlink:"))
        })
    }
}

fn escape(s: &str, attr: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Rect};

    const MAP: &str = r##"<?xml version="1.0" encoding="utf-8"?>
<!-- exported -->
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="400" height="300">
  <g id="s1" class="st0">
    <circle cx="50" cy="60" r="5" class="st29"/>
    <text transform="matrix(1 0 0 1 60 65)" font-size="20"><tspan>Маяковская</tspan></text>
  </g>
  <use xlink:href="#s1" x="10" y="10" width="1" height="1"/>
</svg>"##;

    #[test]
    fn parses_elements_text_and_geometry() {
        let scene = Scene::parse_svg(MAP).unwrap();
        let root = scene.root();
        assert_eq!(scene.tag(root), "svg");
        let s1 = scene.element_by_id("s1").unwrap();
        assert!(scene.has_class(s1, "st0"));
        assert_eq!(scene.text_content(s1).trim(), "Маяковская");
        let circle = scene.children(s1)[0];
        assert_eq!(
            scene.world_bounds(circle),
            Some(Rect::new(45.0, 55.0, 55.0, 65.0))
        );
        let text = scene.children(s1)[1];
        let tb = scene.world_bounds(text).unwrap();
        assert_eq!(tb.x0, 60.0);
        assert!(tb.width() > 100.0, "ten characters at 20px");
        let hit = scene
            .hit_test_point(Point::new(50.0, 60.0), crate::QueryFilter::POINTER)
            .unwrap();
        assert_eq!(hit.node, circle);
    }

    #[test]
    fn xlink_attributes_keep_their_prefix() {
        let scene = Scene::parse_svg(MAP).unwrap();
        let use_el = scene.find_by_attr("xlink:href");
        assert_eq!(use_el.len(), 1);
        assert_eq!(scene.tag(use_el[0]), "use");
    }

    #[test]
    fn round_trips_through_markup() {
        let mut scene = Scene::parse_svg(MAP).unwrap();
        let s1 = scene.element_by_id("s1").unwrap();
        scene.add_class(s1, "disabled");
        scene.set_attr(s1, "metro-station-name", "Маяковская & Co");
        let text = scene.to_svg_string();
        assert!(text.contains(r#"class="st0 disabled""#));
        assert!(text.contains("Маяковская &amp; Co"));
        let again = Scene::parse_svg(&text).unwrap();
        assert_eq!(again.len(), scene.len());
        let s1 = again.element_by_id("s1").unwrap();
        assert!(again.has_class(s1, "disabled"));
        assert_eq!(
            again.attr(s1, "metro-station-name").as_deref(),
            Some("Маяковская & Co")
        );
    }

    #[test]
    fn rejects_documents_without_svg() {
        assert!(matches!(
            Scene::parse_svg("<html><body/></html>"),
            Err(SceneError::MissingSvgRoot)
        ));
        assert!(matches!(
            Scene::parse_svg("<svg><g></svg>"),
            Err(SceneError::Xml(_))
        ));
    }
}

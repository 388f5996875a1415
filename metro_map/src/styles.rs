// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The map's behavioural stylesheet.

use metro_scene::{Element, Scene};

use crate::markup::MarkupConvention;

/// `id` of the injected `<style>` element.
pub const STYLESHEET_ID: &str = "dvhb_metro_styles";

/// CSS for `convention`: pointer cursor on stations, disabled stations greyed
/// with their markers hidden, selected labels bold.
pub fn stylesheet(convention: &MarkupConvention) -> String {
    let MarkupConvention {
        station_attr,
        group_attr,
        marker_class,
        station_class,
        disabled_class,
        selected_class,
    } = convention;
    let any = format!("g.{station_class},[{station_attr}],[{group_attr}]");
    let each = |suffix: &str| {
        [
            format!("g.{station_class}{suffix}"),
            format!("[{station_attr}]{suffix}"),
            format!("[{group_attr}]{suffix}"),
        ]
        .join(",")
    };
    let off = format!(".{disabled_class}");
    let on = format!(".{selected_class}");
    [
        format!("{any}{{cursor:pointer}}"),
        format!("{}{{cursor:initial}}", each(&off)),
        format!(
            "{},{}{{font-weight:700!important}}",
            each(&format!("{on} text")),
            each(&format!("{on} tspan"))
        ),
        format!(
            "{},{}{{fill:gray;cursor:initial}}",
            each(&format!("{off} text")),
            each(&format!("{off} tspan"))
        ),
        format!("{}{{display:none}}", each(&format!("{off} .{marker_class}"))),
    ]
    .concat()
}

/// Insert the stylesheet as the first child of the root unless an element
/// with [`STYLESHEET_ID`] already exists. Returns `true` if it was inserted.
pub fn ensure_styles(scene: &mut Scene, convention: &MarkupConvention) -> bool {
    if scene.element_by_id(STYLESHEET_ID).is_some() {
        return false;
    }
    let root = scene.root();
    scene.insert_at(
        root,
        0,
        Element::new("style")
            .with_attr("id", STYLESHEET_ID)
            .with_attr("type", "text/css")
            .with_text(stylesheet(convention)),
    );
    tracing::debug!("inserted map stylesheet");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_once_as_first_child() {
        let mut scene =
            Scene::parse_svg(r#"<svg width="10" height="10"><g id="a"/></svg>"#).unwrap();
        let conv = MarkupConvention::metro();
        assert!(ensure_styles(&mut scene, &conv));
        assert!(!ensure_styles(&mut scene, &conv));
        let root = scene.root();
        let first = scene.children(root)[0];
        assert_eq!(scene.tag(first), "style");
        assert_eq!(scene.attr(first, "id").as_deref(), Some(STYLESHEET_ID));
        assert_eq!(scene.find_by_attr_value("id", STYLESHEET_ID).len(), 1);
    }

    #[test]
    fn css_hides_markers_of_disabled_stations() {
        let css = stylesheet(&MarkupConvention::metro());
        assert!(css.contains("g.metro-station.disabled .metro-point"));
        assert!(css.contains("[metro-station-name].selected text"));
        assert!(css.starts_with("g.metro-station,[metro-station-name],[metro-station-group]{cursor:pointer}"));
        let css = stylesheet(&MarkupConvention::subway());
        assert!(css.ends_with("[subway-station-group].disabled .subway-point{display:none}"));
    }

    #[test]
    fn existing_sheet_is_respected() {
        let mut scene = Scene::parse_svg(
            r#"<svg><style id="dvhb_metro_styles">g{}</style><g/></svg>"#,
        )
        .unwrap();
        assert!(!ensure_styles(&mut scene, &MarkupConvention::metro()));
        assert_eq!(scene.len(), 3);
    }
}

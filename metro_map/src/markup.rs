// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Markup conventions and the preparation pass for raw map exports.

use metro_scene::{NodeId, Scene};
use serde::{Deserialize, Serialize};

/// Attribute and class names shared between the markup and the map.
///
/// The markup and the map must agree on these; a station tagged
/// `subway-station-name` is invisible to a map using the metro preset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConventionRepr")]
pub struct MarkupConvention {
    /// Attribute carrying a station's name.
    pub station_attr: String,
    /// Attribute marking an interchange group.
    pub group_attr: String,
    /// Class of the circle that anchors the popup.
    pub marker_class: String,
    /// Class given to stations and groups by [`prepare_markup`].
    pub station_class: String,
    /// Class toggled on disabled stations and groups.
    pub disabled_class: String,
    /// Class toggled on active stations in multi-select mode.
    pub selected_class: String,
}

impl MarkupConvention {
    /// `metro-station-name`, `metro-station-group`, `metro-point`.
    pub fn metro() -> Self {
        Self::with_prefix("metro")
    }

    /// `subway-station-name`, `subway-station-group`, `subway-point`.
    pub fn subway() -> Self {
        Self::with_prefix("subway")
    }

    fn with_prefix(prefix: &str) -> Self {
        Self {
            station_attr: format!("{prefix}-station-name"),
            group_attr: format!("{prefix}-station-group"),
            marker_class: format!("{prefix}-point"),
            station_class: "metro-station".into(),
            disabled_class: "disabled".into(),
            selected_class: "selected".into(),
        }
    }
}

impl Default for MarkupConvention {
    fn default() -> Self {
        Self::metro()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum Preset {
    Metro,
    Subway,
}

#[derive(Deserialize)]
#[serde(default)]
struct ConventionFields {
    station_attr: String,
    group_attr: String,
    marker_class: String,
    station_class: String,
    disabled_class: String,
    selected_class: String,
}

impl Default for ConventionFields {
    fn default() -> Self {
        let m = MarkupConvention::metro();
        Self {
            station_attr: m.station_attr,
            group_attr: m.group_attr,
            marker_class: m.marker_class,
            station_class: m.station_class,
            disabled_class: m.disabled_class,
            selected_class: m.selected_class,
        }
    }
}

// Either `"subway"` or a table of overrides on top of the metro preset.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConventionRepr {
    Preset(Preset),
    Fields(ConventionFields),
}

impl From<ConventionRepr> for MarkupConvention {
    fn from(value: ConventionRepr) -> Self {
        match value {
            ConventionRepr::Preset(Preset::Metro) => Self::metro(),
            ConventionRepr::Preset(Preset::Subway) => Self::subway(),
            ConventionRepr::Fields(f) => Self {
                station_attr: f.station_attr,
                group_attr: f.group_attr,
                marker_class: f.marker_class,
                station_class: f.station_class,
                disabled_class: f.disabled_class,
                selected_class: f.selected_class,
            },
        }
    }
}

/// What [`prepare_markup`] tagged.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PreparedMarkup {
    /// Elements turned into named stations.
    pub stations: usize,
    /// Elements turned into groups.
    pub groups: usize,
    /// Station candidates skipped for lack of a label.
    pub unnamed: usize,
}

/// Tag a raw map export so the map can find its stations.
///
/// Design tools export stations as `<g id="s…">` and interchanges as
/// `<g id="g…">` without any map attributes. For every element below the root:
///
/// - `id` starting with `s`: the class becomes the station class, the station
///   attribute is set to the trimmed text of its last `text` descendant, and the
///   marker class is appended to its last `circle` descendant.
/// - `id` starting with `g`: the class becomes the station class and the
///   group attribute is set.
///
/// Candidates without any label text are left untouched.
pub fn prepare_markup(scene: &mut Scene, convention: &MarkupConvention) -> PreparedMarkup {
    let mut out = PreparedMarkup::default();
    let root = scene.root();
    let candidates: Vec<(NodeId, String)> = scene
        .descendants(root)
        .into_iter()
        .filter(|&n| n != root)
        .filter_map(|n| scene.attr(n, "id").map(|id| (n, id)))
        .collect();

    for (node, id) in candidates {
        if id.starts_with('s') {
            let below = scene.descendants(node);
            let label = below
                .iter()
                .rev()
                .find(|&&d| scene.tag(d) == "text")
                .map(|&t| scene.text_content(t).trim().to_string())
                .filter(|t| !t.is_empty());
            let Some(name) = label else {
                tracing::warn!(id = %id, "station element has no label, skipped");
                out.unnamed += 1;
                continue;
            };
            scene.set_attr(node, "class", &convention.station_class);
            scene.set_attr(node, &convention.station_attr, &name);
            if let Some(&circle) = below.iter().rev().find(|&&d| scene.tag(d) == "circle") {
                scene.add_class(circle, &convention.marker_class);
            }
            out.stations += 1;
        } else if id.starts_with('g') {
            scene.set_attr(node, "class", &convention.station_class);
            scene.set_attr(node, &convention.group_attr, "");
            out.groups += 1;
        }
    }
    // Markup edits are not visual changes a host has to mirror.
    let _ = scene.take_class_changes();
    tracing::debug!(
        stations = out.stations,
        groups = out.groups,
        unnamed = out.unnamed,
        "prepared map markup"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = r#"<svg width="300" height="200">
        <g id="g1">
          <g id="s1" class="st0">
            <circle cx="10" cy="10" r="3" class="st29"/>
            <circle cx="10" cy="10" r="6" class="st32"/>
            <text x="20" y="14">Курская</text>
          </g>
          <g id="s2">
            <circle cx="30" cy="10" r="6"/>
            <text x="40" y="5">old</text>
            <text x="40" y="14"> Чкаловская </text>
          </g>
        </g>
        <g id="s3"><circle cx="90" cy="90" r="6"/></g>
        <path id="line5" d="M0 0 L10 10"/>
    </svg>"#;

    #[test]
    fn tags_stations_groups_and_markers() {
        let mut scene = Scene::parse_svg(RAW).unwrap();
        let conv = MarkupConvention::metro();
        let out = prepare_markup(&mut scene, &conv);
        assert_eq!(
            out,
            PreparedMarkup {
                stations: 2,
                groups: 1,
                unnamed: 1
            }
        );

        let s1 = scene.element_by_id("s1").unwrap();
        assert_eq!(scene.attr(s1, "metro-station-name").as_deref(), Some("Курская"));
        assert_eq!(scene.classes(s1), ["metro-station"]);
        let marker = scene.children(s1)[1];
        assert!(scene.has_class(marker, "st32"));
        assert!(scene.has_class(marker, "metro-point"));
        assert!(!scene.has_class(scene.children(s1)[0], "metro-point"));

        let s2 = scene.element_by_id("s2").unwrap();
        assert_eq!(
            scene.attr(s2, "metro-station-name").as_deref(),
            Some("Чкаловская"),
            "last label wins, trimmed"
        );

        let g1 = scene.element_by_id("g1").unwrap();
        assert!(scene.has_attr(g1, "metro-station-group"));

        let s3 = scene.element_by_id("s3").unwrap();
        assert!(!scene.has_attr(s3, "metro-station-name"));
        assert!(scene.take_class_changes().is_empty());
    }

    #[test]
    fn subway_preset_uses_its_own_names() {
        let mut scene = Scene::parse_svg(RAW).unwrap();
        prepare_markup(&mut scene, &MarkupConvention::subway());
        assert_eq!(scene.find_by_attr("subway-station-name").len(), 2);
        assert_eq!(scene.find_by_attr("subway-station-group").len(), 1);
        assert!(scene.find_by_attr("metro-station-name").is_empty());
    }

    #[test]
    fn convention_reads_from_preset_or_fields() {
        let c: MarkupConvention = serde_json::from_str(r#""subway""#).unwrap();
        assert_eq!(c, MarkupConvention::subway());
        let c: MarkupConvention =
            serde_json::from_str(r#"{"disabled_class": "off"}"#).unwrap();
        assert_eq!(c.disabled_class, "off");
        assert_eq!(c.station_attr, "metro-station-name");
    }
}

// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local geometry derived from SVG presentation attributes.
//!
//! Bounds are conservative axis-aligned boxes. Text has no font metrics here,
//! so its width is estimated from the character count and font size.

use kurbo::{Affine, BezPath, Point, Rect, Shape, Vec2};

use crate::types::{Element, LocalNode, NodeFlags};

const DEFAULT_FONT_SIZE: f64 = 16.0;
// Average advance of a proportional sans face, as a fraction of the font size.
const AVERAGE_ADVANCE: f64 = 0.6;

/// Compute the bounding box of `rect` after `affine`.
pub(crate) fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let p0 = affine * Point::new(rect.x0, rect.y0);
    let p1 = affine * Point::new(rect.x1, rect.y0);
    let p2 = affine * Point::new(rect.x0, rect.y1);
    let p3 = affine * Point::new(rect.x1, rect.y1);
    let min_x = p0.x.min(p1.x).min(p2.x).min(p3.x);
    let min_y = p0.y.min(p1.y).min(p2.y).min(p3.y);
    let max_x = p0.x.max(p1.x).max(p2.x).max(p3.x);
    let max_y = p0.y.max(p1.y).max(p2.y).max(p3.y);
    Rect::new(min_x, min_y, max_x, max_y)
}

/// Parse an SVG length, ignoring a trailing `px` unit.
///
/// Percentages and other units are not resolved and yield `None`.
pub fn parse_length(value: &str) -> Option<f64> {
    let v = value.trim();
    let v = v.strip_suffix("px").unwrap_or(v).trim();
    v.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Look up `name` in an inline `style` declaration list.
pub fn style_property<'a>(style: &'a str, name: &str) -> Option<&'a str> {
    style.split(';').find_map(|decl| {
        let (k, v) = decl.split_once(':')?;
        (k.trim() == name).then(|| v.trim())
    })
}

fn numbers(list: &str) -> Vec<f64> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(parse_length)
        .collect()
}

/// Parse an SVG `transform` attribute into a single affine.
///
/// Supports `matrix`, `translate`, `scale`, `rotate` (with optional center),
/// `skewX` and `skewY`. Unknown or malformed functions are skipped.
pub fn parse_transform(value: &str) -> Affine {
    let mut out = Affine::IDENTITY;
    let mut rest = value;
    while let Some(open) = rest.find('(') {
        let name = rest[..open]
            .trim_matches(|c: char| c == ',' || c.is_whitespace())
            .to_string();
        let Some(close) = rest[open..].find(')') else {
            break;
        };
        let args = numbers(&rest[open + 1..open + close]);
        rest = &rest[open + close + 1..];
        let step = match (name.as_str(), args.as_slice()) {
            ("matrix", &[a, b, c, d, e, f]) => Affine::new([a, b, c, d, e, f]),
            ("translate", &[x]) => Affine::translate(Vec2::new(x, 0.0)),
            ("translate", &[x, y]) => Affine::translate(Vec2::new(x, y)),
            ("scale", &[s]) => Affine::scale(s),
            ("scale", &[sx, sy]) => Affine::scale_non_uniform(sx, sy),
            ("rotate", &[deg]) => Affine::rotate(deg.to_radians()),
            ("rotate", &[deg, cx, cy]) => Affine::rotate_about(deg.to_radians(), Point::new(cx, cy)),
            ("skewX", &[deg]) => Affine::skew(deg.to_radians().tan(), 0.0),
            ("skewY", &[deg]) => Affine::skew(0.0, deg.to_radians().tan()),
            _ => {
                tracing::trace!(function = %name, "skipping unsupported transform");
                continue;
            }
        };
        out = out * step;
    }
    out
}

fn num(element: &Element, name: &str) -> f64 {
    element
        .attr(name)
        .and_then(|v| numbers(v).first().copied())
        .unwrap_or(0.0)
}

fn font_size(element: &Element) -> f64 {
    element
        .attr("style")
        .and_then(|s| style_property(s, "font-size"))
        .or_else(|| element.attr("font-size"))
        .and_then(parse_length)
        .unwrap_or(DEFAULT_FONT_SIZE)
}

fn text_bounds(element: &Element, chars: usize) -> Rect {
    // A `tspan` without its own position flows inside its `text`.
    if element.tag == "tspan" && element.attr("x").is_none() && element.attr("y").is_none() {
        return Rect::ZERO;
    }
    let size = font_size(element);
    #[allow(
        clippy::cast_precision_loss,
        reason = "Character counts of map labels are tiny."
    )]
    let width = chars as f64 * size * AVERAGE_ADVANCE;
    let x = num(element, "x");
    let y = num(element, "y");
    let x0 = match element.attr("text-anchor").map(str::trim) {
        Some("middle") => x - width / 2.0,
        Some("end") => x - width,
        _ => x,
    };
    // Baseline sits at `y`; ascent above, a little descent below.
    Rect::new(x0, y - size * 0.8, x0 + width, y + size * 0.2)
}

fn points_bounds(list: &str) -> Rect {
    let nums = numbers(list);
    let mut pts = nums.chunks_exact(2).map(|p| Point::new(p[0], p[1]));
    let Some(first) = pts.next() else {
        return Rect::ZERO;
    };
    pts.fold(Rect::from_points(first, first), |acc, p| acc.union_pt(p))
}

fn root_geometry(element: &Element) -> (Rect, Affine) {
    let width = element.attr("width").and_then(parse_length);
    let height = element.attr("height").and_then(parse_length);
    let view_box = element
        .attr("viewBox")
        .map(numbers)
        .filter(|v| v.len() == 4 && v[2] > 0.0 && v[3] > 0.0);
    match (view_box, width, height) {
        (Some(vb), Some(w), Some(h)) => {
            let tf = Affine::scale_non_uniform(w / vb[2], h / vb[3])
                * Affine::translate(Vec2::new(-vb[0], -vb[1]));
            (Rect::new(vb[0], vb[1], vb[0] + vb[2], vb[1] + vb[3]), tf)
        }
        (Some(vb), _, _) => (
            Rect::new(vb[0], vb[1], vb[0] + vb[2], vb[1] + vb[3]),
            Affine::IDENTITY,
        ),
        (None, Some(w), Some(h)) => (Rect::new(0.0, 0.0, w, h), Affine::IDENTITY),
        _ => (Rect::ZERO, Affine::IDENTITY),
    }
}

fn is_hidden(element: &Element) -> bool {
    let display = element
        .attr("style")
        .and_then(|s| style_property(s, "display"))
        .or_else(|| element.attr("display"));
    let visibility = element
        .attr("style")
        .and_then(|s| style_property(s, "visibility"))
        .or_else(|| element.attr("visibility"));
    display.map(str::trim) == Some("none") || visibility.map(str::trim) == Some("hidden")
}

/// Derive local geometry for an element from its attributes.
pub(crate) fn derive_local(element: &Element) -> LocalNode {
    let chars = element
        .text
        .as_deref()
        .map_or(0, |t| t.trim().chars().count());
    derive_local_with_text(element, chars)
}

/// Like [`derive_local`], with the label length supplied by the caller.
///
/// A `text` element usually keeps its characters in `tspan` children, so the
/// scene measures the whole subtree and passes the count here.
pub(crate) fn derive_local_with_text(element: &Element, chars: usize) -> LocalNode {
    let mut local_transform = element
        .attr("transform")
        .map(parse_transform)
        .unwrap_or(Affine::IDENTITY);

    let local_bounds = match element.tag.as_str() {
        "svg" => {
            let (bounds, viewport) = root_geometry(element);
            local_transform = viewport * local_transform;
            bounds
        }
        "circle" => {
            let (cx, cy, r) = (num(element, "cx"), num(element, "cy"), num(element, "r"));
            Rect::new(cx - r, cy - r, cx + r, cy + r)
        }
        "ellipse" => {
            let (cx, cy) = (num(element, "cx"), num(element, "cy"));
            let (rx, ry) = (num(element, "rx"), num(element, "ry"));
            Rect::new(cx - rx, cy - ry, cx + rx, cy + ry)
        }
        "rect" | "image" | "use" | "foreignObject" => {
            let (x, y) = (num(element, "x"), num(element, "y"));
            Rect::new(x, y, x + num(element, "width"), y + num(element, "height"))
        }
        "line" => Rect::from_points(
            Point::new(num(element, "x1"), num(element, "y1")),
            Point::new(num(element, "x2"), num(element, "y2")),
        ),
        "polyline" | "polygon" => element.attr("points").map_or(Rect::ZERO, points_bounds),
        "path" => element
            .attr("d")
            .and_then(|d| BezPath::from_svg(d).ok())
            .map_or(Rect::ZERO, |p| p.bounding_box()),
        "text" | "tspan" => text_bounds(element, chars),
        _ => Rect::ZERO,
    };

    let mut flags = NodeFlags::default();
    if is_hidden(element) {
        flags.remove(NodeFlags::VISIBLE);
    }
    if element.attr("pointer-events").map(str::trim) == Some("none") {
        flags.remove(NodeFlags::PICKABLE);
    }

    LocalNode {
        local_bounds,
        local_transform,
        z_index: 0,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Rect, b: Rect) -> bool {
        (a.x0 - b.x0).abs() < 1e-9
            && (a.y0 - b.y0).abs() < 1e-9
            && (a.x1 - b.x1).abs() < 1e-9
            && (a.y1 - b.y1).abs() < 1e-9
    }

    #[test]
    fn transform_list_composes_left_to_right() {
        let tf = parse_transform("translate(10, 20) scale(2)");
        assert_eq!(tf * Point::new(1.0, 1.0), Point::new(12.0, 22.0));
        let tf = parse_transform("matrix(1 0 0 1 5 6)");
        assert_eq!(tf * Point::ZERO, Point::new(5.0, 6.0));
    }

    #[test]
    fn unknown_transform_is_skipped() {
        let tf = parse_transform("perspective(3) translate(4)");
        assert_eq!(tf * Point::ZERO, Point::new(4.0, 0.0));
    }

    #[test]
    fn shapes_have_bounds() {
        let c = derive_local(
            &Element::new("circle")
                .with_attr("cx", "10")
                .with_attr("cy", "20")
                .with_attr("r", "4.5"),
        );
        assert!(close(c.local_bounds, Rect::new(5.5, 15.5, 14.5, 24.5)));
        let p = derive_local(&Element::new("path").with_attr("d", "M0 0 L10 5 L3 8 Z"));
        assert!(close(p.local_bounds, Rect::new(0.0, 0.0, 10.0, 8.0)));
        let pl = derive_local(&Element::new("polyline").with_attr("points", "1,2 5,9 -3,4"));
        assert!(close(pl.local_bounds, Rect::new(-3.0, 2.0, 5.0, 9.0)));
        let g = derive_local(&Element::new("g"));
        assert!(!g.has_shape());
    }

    #[test]
    fn text_width_scales_with_length_and_anchor() {
        let t = derive_local(
            &Element::new("text")
                .with_attr("x", "100")
                .with_attr("y", "50")
                .with_attr("font-size", "10px")
                .with_attr("text-anchor", "end")
                .with_text("Арбат"),
        );
        assert!(close(t.local_bounds, Rect::new(70.0, 42.0, 100.0, 52.0)));
        let flowing = derive_local(&Element::new("tspan").with_text("Арбат"));
        assert!(!flowing.has_shape());
        let placed = derive_local_with_text(
            &Element::new("text").with_attr("transform", "matrix(1 0 0 1 10 20)"),
            2,
        );
        assert!(close(placed.local_bounds, Rect::new(0.0, -12.8, 19.2, 3.2)));
    }

    #[test]
    fn root_viewport_scales_view_box() {
        let root = derive_local(
            &Element::new("svg")
                .with_attr("viewBox", "0 0 100 50")
                .with_attr("width", "200px")
                .with_attr("height", "100"),
        );
        assert!(close(root.local_bounds, Rect::new(0.0, 0.0, 100.0, 50.0)));
        assert_eq!(
            root.local_transform * Point::new(100.0, 50.0),
            Point::new(200.0, 100.0)
        );
    }

    #[test]
    fn display_none_and_pointer_events() {
        let hidden = derive_local(&Element::new("g").with_attr("style", "display: none"));
        assert!(!hidden.flags.contains(NodeFlags::VISIBLE));
        let inert = derive_local(&Element::new("rect").with_attr("pointer-events", "none"));
        assert!(!inert.flags.contains(NodeFlags::PICKABLE));
        assert!(inert.flags.contains(NodeFlags::VISIBLE));
    }
}

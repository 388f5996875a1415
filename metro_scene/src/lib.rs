// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Metro Scene: a Kurbo-native SVG element tree for interactive maps.
//!
//! A [`Scene`] holds the elements of one SVG document together with enough
//! geometry to answer the questions an interactive map asks of its markup:
//!
//! - Which elements carry a given attribute, and what is its value?
//! - What classes does an element have, and which class changes must be mirrored into a live DOM?
//! - Where is an element on screen ([`Scene::world_bounds`]), and what is under the pointer ([`Scene::hit_test_point`])?
//! - What fill color does an element paint with ([`Scene::fill`])?
//!
//! ## Not a renderer
//!
//! This crate does not rasterize or apply CSS. Geometry comes from SVG
//! presentation attributes (`cx`/`cy`/`r`, `x`/`y`/`width`/`height`, `d`,
//! `points`, `transform`, the root `viewBox`) and text is measured with a
//! fixed average advance. That is precise enough to anchor a popup next to a
//! station marker and to route clicks; it is not a layout engine.
//!
//! ## API overview
//!
//! - [`Scene::parse_svg`] → [`Scene`]; [`Scene::to_svg_string`] writes it back.
//! - [`Scene::insert`] / [`Scene::insert_at`] add [`Element`]s.
//! - [`Scene::find_by_attr`], [`Scene::attr`], [`Scene::set_attr`], [`Scene::text_content`].
//! - [`Scene::toggle_class`] and friends; [`Scene::take_class_changes`] drains the [`ClassChange`] log.
//! - [`Scene::commit`] recomputes world transforms and bounds.
//! - [`Scene::hit_test_point`] with a [`QueryFilter`] returns a [`Hit`] with the root→target path.
//!
//! ## Minimal usage
//!
//! ```
//! use kurbo::Point;
//! use metro_scene::{QueryFilter, Scene};
//!
//! let scene = Scene::parse_svg(
//!     r#"<svg width="100" height="100">
//!          <g metro-station-name="Арбатская"><circle cx="20" cy="20" r="4"/></g>
//!        </svg>"#,
//! )
//! .unwrap();
//!
//! let station = scene.find_by_attr("metro-station-name")[0];
//! let hit = scene.hit_test_point(Point::new(21.0, 19.0), QueryFilter::POINTER).unwrap();
//! assert_eq!(hit.path[1], station);
//! ```

mod error;
mod geometry;
mod svg;
mod tree;
mod types;

pub use error::SceneError;
pub use geometry::{parse_length, parse_transform, style_property};
pub use tree::{Hit, QueryFilter, Scene};
pub use types::{ClassChange, Element, LocalNode, NodeFlags, NodeId};

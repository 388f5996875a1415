// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Metro Map: the state and click model of an interactive SVG transit map.
//!
//! ## Overview
//!
//! A [`MetroMap`] sits on top of a [`metro_scene::Scene`] and keeps three things consistent:
//!
//! - [`StationRegistry`]: one shared [`StationState`] per station name, with the
//!   disabled flag derived from the host's [`EnabledStations`].
//! - [`GroupAggregator`]: interchange groups whose disabled flag is derived
//!   from their members (disabled iff every member is).
//! - [`SelectionController`]: turns clicks into [`SelectionEvent`]s, places the
//!   [`Popup`], and closes it again on a click anywhere else.
//!
//! Markup and maps agree on attribute names through a [`MarkupConvention`].
//! Raw exports from a design tool can be tagged first with [`prepare_markup`].
//!
//! ## Clicks
//!
//! Clicks are routed through [`metro_responder`] from the root of the
//! document to the element under the pointer. The innermost station or group
//! binding handles the click and records a token; the container binding at the
//! root sees the same click last and only closes the popup when no token was
//! recorded. Disabled stations and fully disabled groups swallow the click
//! without selecting anything.
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kurbo::Point;
//! use metro_map::{ClickOutcome, EnabledStations, InfoPopup, MapConfig, MetroMap, PopupState};
//!
//! let svg = r#"<svg width="200" height="100">
//!   <g metro-station-name="Арбатская"><circle class="metro-point" cx="40" cy="40" r="5"/></g>
//!   <g metro-station-name="Смоленская"><circle class="metro-point" cx="120" cy="40" r="5"/></g>
//! </svg>"#;
//!
//! let mut map = MetroMap::from_svg(
//!     svg,
//!     MapConfig::default(),
//!     EnabledStations::names(["Арбатская"]),
//! )
//! .unwrap();
//! let popup = Rc::new(RefCell::new(InfoPopup::default()));
//! map.set_popup(Some(Box::new(Rc::clone(&popup))));
//!
//! let ClickOutcome::Selected(event) = map.click(Point::new(40.0, 40.0)) else {
//!     unreachable!()
//! };
//! assert_eq!(event.names, ["Арбатская"]);
//! assert_eq!(map.popup_state(), PopupState::Showing);
//!
//! // Disabled stations swallow the click.
//! assert_eq!(map.click(Point::new(120.0, 40.0)), ClickOutcome::Blocked);
//! assert_eq!(map.popup_state(), PopupState::Showing);
//!
//! // Anywhere else closes the popup.
//! assert_eq!(map.click(Point::new(180.0, 90.0)), ClickOutcome::Dismissed);
//! assert_eq!(map.popup_state(), PopupState::Idle);
//! ```

mod config;
mod error;
mod group;
mod map;
mod markup;
mod popup;
mod registry;
mod selection;
mod styles;

pub use config::MapConfig;
pub use error::{ConfigError, MapError};
pub use group::{GroupAggregator, GroupId, GroupState, PrimaryNamePolicy};
pub use map::MetroMap;
pub use markup::{MarkupConvention, PreparedMarkup, prepare_markup};
pub use popup::{Display, InfoPopup, Popup, Position};
pub use registry::{EnabledStations, InitSummary, StationRegistry, StationState};
pub use selection::{
    Binding, Bindings, ClickContext, ClickOutcome, HandledToken, PopupState,
    SelectionController, SelectionEvent, marker_anchor,
};
pub use styles::{STYLESHEET_ID, ensure_styles, stylesheet};

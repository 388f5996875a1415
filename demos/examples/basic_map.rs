// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small map driven the way a host page would drive it.
//!
//! Builds a map from SVG and a JSON configuration, clicks around, changes the
//! enabled set, and prints the class changes a host would mirror into its DOM.
//!
//! Run:
//! - `RUST_LOG=metro_map=debug cargo run -p metro_demos --example basic_map`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Point;
use metro_map::{EnabledStations, InfoPopup, MetroMap};
use serde_json::json;
use tracing_subscriber::EnvFilter;

const SVG: &str = r##"<svg width="320" height="160">
  <path d="M20 40 L300 40" stroke="#C28FCC" stroke-width="8"/>
  <g metro-station-name="Арбатская"><circle class="metro-point" cx="40" cy="40" r="6" fill="#0078BF"/><text x="30" y="70">Арбатская</text></g>
  <g id="hub" metro-station-group="">
    <g metro-station-name="Курская (Кольцевая)"><circle class="metro-point" cx="160" cy="40" r="6" fill="#9D573E"/></g>
    <g metro-station-name="Курская (Арбатско-Покровская)"><circle class="metro-point" cx="175" cy="40" r="6" fill="#0078BF"/><text x="150" y="70">Курская</text></g>
  </g>
  <g metro-station-name="Бауманская"><circle class="metro-point" cx="280" cy="40" r="6" fill="#0078BF"/></g>
</svg>"##;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    init_tracing();

    let enabled = json!(["Арбатская", "Курская (Кольцевая)"]);
    let mut map = MetroMap::from_json(SVG, r#"{"popup_offset": {"left": 8, "top": -24}}"#, &enabled)
        .expect("valid map");
    let popup = Rc::new(RefCell::new(InfoPopup::new(map.config().popup_offset)));
    map.set_popup(Some(Box::new(Rc::clone(&popup))));
    map.set_on_select(|e| println!("  onSelect({:?}, {:?})", e.names, e.position));
    tracing::info!(stations = map.stations().len(), "map ready");

    println!("== Stations ==");
    for s in map.stations().iter() {
        println!(
            "  {:<32} disabled={:<5} color={}",
            s.name(),
            s.is_disabled(),
            map.station_color(s.name()).unwrap_or_default()
        );
    }
    for g in map.groups() {
        println!(
            "  group #{}: {:?} primary={:?} disabled={}",
            g.id().index(),
            g.member_names().collect::<Vec<_>>(),
            g.primary_name(),
            g.is_disabled()
        );
    }
    let _ = map.scene_mut().take_class_changes();

    for (label, pt) in [
        ("Арбатская marker", Point::new(40.0, 40.0)),
        ("Бауманская (disabled)", Point::new(280.0, 40.0)),
        ("hub label", Point::new(155.0, 65.0)),
        ("empty area", Point::new(100.0, 120.0)),
    ] {
        println!("\nclick {label}:");
        let outcome = map.click(pt);
        println!("  -> {outcome:?}; popup {}", popup.borrow().css());
    }

    println!("\n== Enable Бауманская ==");
    map.set_enabled(EnabledStations::all_except(["Арбатская"]));
    for change in map.scene_mut().take_class_changes() {
        println!(
            "  #{} {}{}",
            change.node.index(),
            if change.present { "+" } else { "-" },
            change.class
        );
    }
}

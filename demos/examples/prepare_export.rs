// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tag a raw design-tool export and write it back out.
//!
//! Exports name station groups `s…` and interchanges `g…` without any map
//! attributes; preparation adds them and the stylesheet.
//!
//! Run:
//! - `cargo run -p metro_demos --example prepare_export`

use metro_map::{MarkupConvention, ensure_styles, prepare_markup};
use metro_scene::Scene;
use tracing_subscriber::EnvFilter;

const RAW: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">
  <g id="g12">
    <g id="s40"><circle class="st29" cx="20" cy="20" r="5"/><text transform="matrix(1 0 0 1 30 25)" class="st26 st27">Курская</text></g>
    <g id="s41"><circle class="st31" cx="35" cy="20" r="5"/><text transform="matrix(1 0 0 1 30 45)" class="st26 st27">Чкаловская</text></g>
  </g>
  <g id="s7"><circle class="st36" cx="150" cy="70" r="5"/></g>
</svg>"#;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut scene = Scene::parse_svg(RAW).expect("valid svg");
    let convention = MarkupConvention::subway();
    let prepared = prepare_markup(&mut scene, &convention);
    ensure_styles(&mut scene, &convention);
    println!("{prepared:?}\n");
    println!("{}", scene.to_svg_string());
}

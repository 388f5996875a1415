// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene → responder adapter with a simple ASCII tree.
//!
//! This example parses a tiny map, resolves a hit for a point, and prints the
//! capture → target → bubble sequence the map's click handling walks.
//!
//! Run:
//! - `cargo run -p metro_demos --example responder_scene`

use kurbo::Point;
use metro_responder::adapters::scene::top_hit_for_point;
use metro_responder::router::{Router, run_dispatch};
use metro_responder::types::{NoParent, Outcome, Phase, WidgetLookup};
use metro_scene::{NodeId, QueryFilter, Scene};

const SVG: &str = r#"<svg width="200" height="120">
  <g id="hub" metro-station-group="">
    <g metro-station-name="Курская"><circle cx="40" cy="40" r="6"/><text x="50" y="45">Курская</text></g>
    <g metro-station-name="Чкаловская"><circle cx="40" cy="70" r="6"/></g>
  </g>
</svg>"#;

// Label each node by its station/group attribute.
struct Labels<'a>(&'a Scene);

impl WidgetLookup<NodeId> for Labels<'_> {
    type WidgetId = String;
    fn widget_of(&self, node: &NodeId) -> Option<String> {
        let scene = self.0;
        if let Some(name) = scene.attr(*node, "metro-station-name") {
            return Some(format!("station {name}"));
        }
        if scene.has_attr(*node, "metro-station-group") {
            return Some("group".into());
        }
        (*node == scene.root()).then(|| "container".into())
    }
}

fn main() {
    let scene = Scene::parse_svg(SVG).expect("valid svg");
    print_ascii_tree(&scene, scene.root(), "");

    let router: Router<NodeId, Labels<'_>, NoParent> = Router::new(Labels(&scene));
    for pt in [Point::new(41.0, 41.0), Point::new(60.0, 40.0), Point::new(150.0, 100.0)] {
        let Some(hit) = top_hit_for_point(&scene, pt, QueryFilter::POINTER) else {
            println!("\n({:.0}, {:.0}): no hit", pt.x, pt.y);
            continue;
        };
        println!("\n== Dispatch @ ({:.0}, {:.0}) ==", pt.x, pt.y);
        let seq = router.handle_with_hits(&[hit]);
        run_dispatch(&seq, |d| {
            if d.phase != Phase::Capture || d.widget.is_some() {
                println!("  {:?}  <{}>  {:?}", d.phase, scene.tag(d.node), d.widget);
            }
            Outcome::Continue
        });
    }
}

fn print_ascii_tree(scene: &Scene, node: NodeId, prefix: &str) {
    if prefix.is_empty() {
        print_node(scene, "", node);
    }
    let kids = scene.children(node);
    for (i, &k) in kids.iter().enumerate() {
        let last = i + 1 == kids.len();
        let branch = if last { "└── " } else { "├── " };
        print_node(scene, &format!("{prefix}{branch}"), k);
        let next = if last { "    " } else { "│   " };
        print_ascii_tree(scene, k, &format!("{prefix}{next}"));
    }
}

fn print_node(scene: &Scene, prefix: &str, id: NodeId) {
    match scene.world_bounds(id) {
        Some(r) => println!(
            "{prefix}<{}> #{}  ({:.0},{:.0})–({:.0},{:.0})",
            scene.tag(id),
            id.index(),
            r.x0,
            r.y0,
            r.x1,
            r.y1
        ),
        None => println!("{prefix}<{}> #{}", scene.tag(id), id.index()),
    }
}

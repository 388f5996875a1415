// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behavior of a small map: enabling, selecting, dismissing.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Affine, Point, Rect};
use metro_map::{
    ClickOutcome, EnabledStations, MapConfig, MetroMap, Popup, PopupState, Position,
    SelectionEvent,
};
use serde_json::json;

const MAP: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="200">
  <path d="M20 50 L280 50" stroke="#D8AC9D" stroke-width="8"/>
  <g metro-station-name="A">
    <circle cx="50" cy="50" r="7" fill="#fff"/>
    <circle class="metro-point" cx="50" cy="50" r="5" fill="#8E479B"/>
    <text x="40" y="80">A</text>
  </g>
  <g metro-station-name="B"><circle class="metro-point" cx="150" cy="50" r="5"/></g>
  <g metro-station-name="C"><circle class="metro-point" cx="250" cy="50" r="5"/></g>
</svg>"##;

#[derive(Default)]
struct Recorded {
    shows: Vec<Position>,
    hides: usize,
    open: bool,
}

// Popup that counts calls.
#[derive(Clone, Default)]
struct CountingPopup(Rc<RefCell<Recorded>>);

impl Popup for CountingPopup {
    fn show(&mut self, position: Position) {
        let mut r = self.0.borrow_mut();
        r.shows.push(position);
        r.open = true;
    }

    fn hide(&mut self) {
        let mut r = self.0.borrow_mut();
        r.hides += 1;
        r.open = false;
    }

    fn is_open(&self) -> bool {
        self.0.borrow().open
    }
}

struct Harness {
    map: MetroMap,
    events: Rc<RefCell<Vec<SelectionEvent>>>,
    popup: CountingPopup,
}

// The drawing sits at (100, 50) in client space inside a container at (90, 40).
fn harness(enabled: EnabledStations) -> Harness {
    let mut map = MetroMap::from_svg(MAP, MapConfig::default(), enabled).unwrap();
    let root = map.scene().root();
    map.scene_mut()
        .set_local_transform(root, Affine::translate((100.0, 50.0)));
    map.set_container(Rect::new(90.0, 40.0, 420.0, 270.0));

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    map.set_on_select(move |e| sink.borrow_mut().push(e.clone()));

    let popup = CountingPopup::default();
    map.set_popup(Some(Box::new(popup.clone())));
    Harness { map, events, popup }
}

fn client(x: f64, y: f64) -> Point {
    Point::new(x + 100.0, y + 50.0)
}

#[test]
fn three_stations_two_enabled() {
    let mut h = harness(EnabledStations::names(["A", "C"]));
    assert!(!h.map.find_station("A").is_disabled());
    assert!(h.map.find_station("B").is_disabled());
    assert!(!h.map.find_station("C").is_disabled());

    assert_eq!(h.map.click(client(150.0, 50.0)), ClickOutcome::Blocked);
    assert!(h.events.borrow().is_empty(), "disabled station fires nothing");
    assert_eq!(h.map.popup_state(), PopupState::Idle);

    let out = h.map.click(client(50.0, 50.0));
    // Marker box starts at (45, 45) in drawing space, (145, 95) in client space.
    let expected = SelectionEvent {
        names: vec!["A".into()],
        position: Some(Position::new(55.0, 55.0)),
    };
    assert_eq!(out, ClickOutcome::Selected(expected.clone()));
    assert_eq!(*h.events.borrow(), [expected]);
    assert_eq!(h.popup.0.borrow().shows, [Position::new(55.0, 55.0)]);
    assert_eq!(h.map.popup_state(), PopupState::Showing);
}

#[test]
fn outer_ring_of_the_marker_still_anchors_on_the_marker() {
    let mut h = harness(EnabledStations::names(["A"]));
    // Inside the white r=7 ring, outside the r=5 marker.
    let out = h.map.click(client(56.5, 50.0));
    assert!(
        matches!(out, ClickOutcome::Selected(ref e) if e.position == Some(Position::new(55.0, 55.0))),
        "{out:?}"
    );
    assert_eq!(h.map.station_position("A"), Some(Position::new(55.0, 55.0)));
}

#[test]
fn neutral_click_hides_exactly_once() {
    let mut h = harness(EnabledStations::names(["A", "C"]));
    h.map.click(client(250.0, 50.0));
    assert_eq!(h.map.popup_state(), PopupState::Showing);

    assert_eq!(h.map.click(client(150.0, 150.0)), ClickOutcome::Dismissed);
    assert_eq!(h.popup.0.borrow().hides, 1);
    assert_eq!(h.map.popup_state(), PopupState::Idle);

    assert_eq!(h.map.click(client(150.0, 150.0)), ClickOutcome::Unhandled);
    assert_eq!(h.popup.0.borrow().hides, 1, "closed popup is not hidden again");

    // The line is not a station either.
    h.map.click(client(50.0, 50.0));
    assert_eq!(h.map.click(client(100.0, 50.0)), ClickOutcome::Dismissed);
    assert_eq!(h.popup.0.borrow().hides, 2);
}

#[test]
fn reselecting_keeps_the_popup_open() {
    let mut h = harness(EnabledStations::names(["A", "C"]));
    h.map.click(client(50.0, 50.0));
    h.map.click(client(250.0, 50.0));
    let r = h.popup.0.borrow();
    assert_eq!(r.hides, 0, "station clicks never reach the dismiss path");
    assert_eq!(r.shows.len(), 2);
    assert_eq!(r.shows[1], Position::new(255.0, 55.0));
}

#[test]
fn reconfiguration_updates_captured_state() {
    let mut h = harness(EnabledStations::names(["A", "C"]));
    let b = h.map.find_station("B");
    let a = h.map.find_station("A");
    assert!(b.is_disabled());

    h.map.set_enabled(EnabledStations::from_value(&json!({"B": {}})));
    assert!(!b.is_disabled());
    assert!(a.is_disabled());

    let b_node = h.map.stations().nodes_of("B")[0];
    assert!(!h.map.scene().has_class(b_node, "disabled"));
    assert!(matches!(
        h.map.click(client(150.0, 50.0)),
        ClickOutcome::Selected(_)
    ));
}

#[test]
fn permissive_paths_never_fail() {
    for cfg in [json!(null), json!(7), json!("A"), json!([1, 2, 3])] {
        let mut h = harness(EnabledStations::from_value(&cfg));
        assert!(h.map.stations().iter().all(|s| s.is_disabled()), "{cfg}");
        assert_eq!(h.map.click(client(50.0, 50.0)), ClickOutcome::Blocked);
    }

    let mut h = harness(EnabledStations::names(["A"]));
    let ghost = h.map.find_station("Z");
    assert!(ghost.is_placeholder() && ghost.is_disabled());

    h.map.set_popup(None);
    h.map.clear_on_select();
    assert!(matches!(
        h.map.click(client(50.0, 50.0)),
        ClickOutcome::Selected(_)
    ));
    assert_eq!(h.map.popup_state(), PopupState::Idle);
    assert_eq!(h.map.click(client(150.0, 150.0)), ClickOutcome::Unhandled);
    assert_eq!(h.map.click(Point::new(-500.0, 0.0)), ClickOutcome::Unhandled);
}

#[test]
fn prepared_exports_behave_like_tagged_markup() {
    let raw = r#"<svg width="200" height="100">
      <g id="g1">
        <g id="s1"><circle cx="20" cy="20" r="5"/><text x="30" y="25">Курская</text></g>
        <g id="s2"><circle cx="60" cy="20" r="5"/><text x="70" y="45">Чкаловская</text></g>
      </g>
      <g id="s3"><circle cx="150" cy="80" r="5"/><text x="160" y="85">Римская</text></g>
    </svg>"#;
    let config = MapConfig::from_json(r#"{"prepare_markup": true, "primary_name": "first_registered"}"#)
        .unwrap();
    let mut map =
        MetroMap::from_svg(raw, config, EnabledStations::all_except(["Римская"])).unwrap();
    assert_eq!(map.stations().len(), 3);

    let group = map.group_of("Чкаловская").unwrap();
    assert_eq!(group.primary_name(), Some("Курская"));
    assert!(!group.is_disabled());

    let out = map.click(Point::new(20.0, 20.0));
    assert!(matches!(out, ClickOutcome::Selected(ref e) if e.names == ["Курская"] && e.position == Some(Position::new(15.0, 15.0))));
    assert_eq!(map.click(Point::new(150.0, 80.0)), ClickOutcome::Blocked);
}

// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The map facade: wiring, configuration changes, and clicks.

use std::rc::Rc;

use kurbo::{Point, Rect};
use metro_responder::adapters::scene::{hit_for_node, top_hit_for_point};
use metro_responder::router::{Router, run_dispatch};
use metro_responder::types::{NoParent, ResolvedHit};
use metro_scene::{NodeId, QueryFilter, Scene};
use serde_json::Value;

use crate::config::MapConfig;
use crate::error::MapError;
use crate::group::{GroupAggregator, GroupId, GroupState};
use crate::markup::prepare_markup;
use crate::popup::{Popup, Position};
use crate::registry::{EnabledStations, StationRegistry, StationState};
use crate::selection::{
    Binding, Bindings, ClickContext, ClickOutcome, PopupState, SelectionController,
    SelectionEvent, marker_anchor,
};
use crate::styles::ensure_styles;

/// An interactive transit map over one SVG document.
///
/// Building a map scans the document for stations and groups, applies the
/// enabled set, binds click handlers, and mirrors the resulting state into
/// class lists. From then on the host feeds it clicks and configuration
/// changes, and mirrors [`Scene::take_class_changes`] into its own DOM.
pub struct MetroMap {
    config: MapConfig,
    scene: Scene,
    registry: StationRegistry,
    groups: GroupAggregator,
    router: Router<NodeId, Bindings, NoParent>,
    controller: SelectionController,
    container: Option<Rect>,
}

impl core::fmt::Debug for MetroMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MetroMap")
            .field("stations", &self.registry.len())
            .field("groups", &self.groups.len())
            .field("bindings", &self.router.lookup().len())
            .field("controller", &self.controller)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

impl MetroMap {
    /// Parse `svg` and build a map over it.
    pub fn from_svg(
        svg: &str,
        config: MapConfig,
        enabled: EnabledStations,
    ) -> Result<Self, MapError> {
        let scene = Scene::parse_svg(svg)?;
        Ok(Self::new(scene, config, enabled))
    }

    /// Build a map from SVG text, a JSON configuration and a JSON enabled set.
    pub fn from_json(svg: &str, config: &str, enabled: &Value) -> Result<Self, MapError> {
        let config = MapConfig::from_json(config)?;
        Self::from_svg(svg, config, EnabledStations::from_value(enabled))
    }

    /// Build a map over an existing scene.
    pub fn new(mut scene: Scene, config: MapConfig, enabled: EnabledStations) -> Self {
        let conv = &config.convention;
        if config.prepare_markup {
            prepare_markup(&mut scene, conv);
        }
        if config.inject_styles {
            ensure_styles(&mut scene, conv);
        }
        scene.commit();

        let mut registry = StationRegistry::new();
        registry.initialize(&scene, &conv.station_attr, &enabled);
        let mut groups = GroupAggregator::new(config.primary_name);
        groups.discover(&scene, &conv.group_attr);

        let mut bindings = Bindings::default();
        for (state, nodes) in registry.iter_with_nodes() {
            for &node in nodes {
                bindings.bind(node, Binding::Station(Rc::clone(state)));
                if let Some(group) =
                    scene.ancestor_where(node, |n| scene.has_attr(n, &conv.group_attr))
                {
                    groups.register_member(group, state.name(), Rc::clone(state));
                }
            }
        }
        // Group labels usually sit inside a member station; being deeper on the
        // path, they see the click before the station does.
        for group in groups.iter() {
            for node in scene.descendants(group.id()) {
                if scene.tag(node) == "text" {
                    bindings.bind(node, Binding::GroupLabel(group.id()));
                }
            }
        }
        bindings.bind(scene.root(), Binding::Container);
        tracing::debug!(
            stations = registry.len(),
            groups = groups.len(),
            bindings = bindings.len(),
            "map wired"
        );

        let mut map = Self {
            controller: SelectionController::new(config.multiple),
            config,
            scene,
            registry,
            groups,
            router: Router::new(bindings),
            container: None,
        };
        map.sync_visuals();
        map
    }

    /// Replace the enabled set and update every station in place.
    ///
    /// States handed out earlier stay valid and reflect the new flags.
    /// Returns the number of elements whose classes changed.
    pub fn set_enabled(&mut self, enabled: EnabledStations) -> usize {
        let summary = self.registry.apply(&enabled);
        tracing::debug!(
            enabled = summary.enabled,
            changed = summary.changed,
            "enabled stations updated"
        );
        self.sync_visuals()
    }

    /// Mirror station and group state into class lists.
    ///
    /// Only effective changes are made. Returns how many there were.
    pub fn sync_visuals(&mut self) -> usize {
        let conv = &self.config.convention;
        let mut changed = 0;
        for (state, nodes) in self.registry.iter_with_nodes() {
            for &node in nodes {
                if self
                    .scene
                    .toggle_class(node, &conv.disabled_class, state.is_disabled())
                {
                    changed += 1;
                }
                if self.config.multiple
                    && self
                        .scene
                        .toggle_class(node, &conv.selected_class, state.is_active())
                {
                    changed += 1;
                }
            }
        }
        changed + self.groups.sync_classes(&mut self.scene, &conv.disabled_class)
    }

    /// State of station `name`; a detached placeholder if unknown.
    pub fn find_station(&self, name: &str) -> Rc<StationState> {
        self.registry.find(name)
    }

    /// The station registry.
    pub fn stations(&self) -> &StationRegistry {
        &self.registry
    }

    /// Group with element `id`.
    pub fn group(&self, id: GroupId) -> Option<&GroupState> {
        self.groups.get(id)
    }

    /// All groups.
    pub fn groups(&self) -> impl Iterator<Item = &GroupState> + '_ {
        self.groups.iter()
    }

    /// Group containing station `name`.
    pub fn group_of(&self, name: &str) -> Option<&GroupState> {
        self.groups.group_of(name)
    }

    /// Register or remove the popup.
    pub fn set_popup(&mut self, popup: Option<Box<dyn Popup>>) {
        self.controller.set_popup(popup);
    }

    /// Register the host's selection callback.
    pub fn set_on_select(&mut self, on_select: impl FnMut(&SelectionEvent) + 'static) {
        self.controller.set_on_select(Some(Box::new(on_select)));
    }

    /// Remove the selection callback.
    pub fn clear_on_select(&mut self) {
        self.controller.set_on_select(None);
    }

    /// Container bounds in client pixels. Defaults to the document's bounds.
    pub fn set_container(&mut self, container: Rect) {
        self.container = Some(container);
    }

    /// Container bounds used for popup positions.
    pub fn container(&self) -> Rect {
        self.container
            .or_else(|| self.scene.world_bounds(self.scene.root()))
            .unwrap_or(Rect::ZERO)
    }

    /// Whether the popup is shown.
    pub fn popup_state(&self) -> PopupState {
        self.controller.popup_state()
    }

    /// Click at `point`, in client pixels.
    ///
    /// Points inside the container but outside the drawing reach the
    /// container only. Points outside the container are ignored.
    pub fn click(&mut self, point: Point) -> ClickOutcome {
        if self.scene.needs_commit() {
            self.scene.commit();
        }
        let container = self.container();
        let hit = match top_hit_for_point(&self.scene, point, QueryFilter::POINTER) {
            Some(hit) => hit,
            None if container.contains(point) => hit_for_node(&self.scene, self.scene.root(), point),
            None => {
                tracing::trace!(x = point.x, y = point.y, "click outside the map");
                return ClickOutcome::Unhandled;
            }
        };
        self.route(hit, container)
    }

    /// Click directly on element `node`, as if at the center of its bounds.
    pub fn click_node(&mut self, node: NodeId) -> ClickOutcome {
        if self.scene.needs_commit() {
            self.scene.commit();
        }
        let center = self
            .scene
            .world_bounds(node)
            .map_or(Point::ORIGIN, |b| b.center());
        let container = self.container();
        let hit = hit_for_node(&self.scene, node, center);
        self.route(hit, container)
    }

    fn route(&mut self, hit: ResolvedHit<NodeId, Point>, container: Rect) -> ClickOutcome {
        let event = self.controller.begin_click();
        let seq = self.router.handle_with_hits(&[hit]);
        let cx = ClickContext {
            scene: &self.scene,
            groups: &self.groups,
            marker_class: &self.config.convention.marker_class,
            container,
        };
        let mut outcome = ClickOutcome::Unhandled;
        let controller = &mut self.controller;
        run_dispatch(&seq, |d| controller.deliver(event, d, &cx, &mut outcome));
        if self.config.multiple && matches!(outcome, ClickOutcome::Selected(_)) {
            self.sync_visuals();
        }
        outcome
    }

    /// Fill color of station `name`: its marker's fill, else the station element's.
    pub fn station_color(&self, name: &str) -> Option<String> {
        let &node = self.registry.nodes_of(name).first()?;
        let marker_class = &self.config.convention.marker_class;
        self.scene
            .descendants(node)
            .into_iter()
            .rev()
            .find(|&n| self.scene.tag(n) == "circle" && self.scene.has_class(n, marker_class))
            .and_then(|m| self.scene.fill(m))
            .or_else(|| self.scene.fill(node))
    }

    /// Popup anchor of station `name` in container coordinates, if it has a marker.
    pub fn station_position(&self, name: &str) -> Option<Position> {
        let marker_class = &self.config.convention.marker_class;
        let container = self.container();
        self.registry
            .nodes_of(name)
            .iter()
            .find_map(|&n| marker_anchor(&self.scene, n, marker_class))
            .map(|a| Position::new(a.x - container.x0, a.y - container.y0))
    }

    /// The configuration the map was built with.
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// The document.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The document, for transforms and draining class changes.
    ///
    /// Structural edits are not picked up; build a new map instead.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
}

// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Click handling: selection, the handled-click token, and popup lifecycle.
//!
//! ## Ordering
//!
//! A click is routed along the scene path from the root to the element under
//! the pointer. Station and group-label bindings sit on that path below the
//! container binding, so they see the bubble first. The first of them records a
//! [`HandledToken`] for the click; the container binding runs last and only
//! dismisses the popup when no token was recorded for the same click. The
//! token is owned here and never written into the event itself.
//!
//! A click on a disabled station or an all-disabled group also records the
//! token, so it keeps an open popup open instead of dismissing it.

use std::fmt;
use std::rc::Rc;

use kurbo::{Point, Rect};
use metro_responder::types::{Dispatch, Outcome, Phase, WidgetLookup};
use metro_scene::{NodeId, Scene};

use crate::group::{GroupAggregator, GroupId};
use crate::popup::{Popup, Position};
use crate::registry::StationState;

/// What a node on the click path reacts as.
#[derive(Clone, Debug)]
pub enum Binding {
    /// A station element.
    Station(Rc<StationState>),
    /// A label (`text`) inside a group element.
    GroupLabel(GroupId),
    /// The map container.
    Container,
}

/// Node → [`Binding`] table used by the click router.
#[derive(Debug, Default)]
pub struct Bindings {
    map: std::collections::HashMap<NodeId, Binding>,
}

impl Bindings {
    /// Bind `node`, replacing any earlier binding.
    pub fn bind(&mut self, node: NodeId, binding: Binding) {
        self.map.insert(node, binding);
    }

    /// Drop every binding.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Number of bound nodes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl WidgetLookup<NodeId> for Bindings {
    type WidgetId = Binding;

    fn widget_of(&self, node: &NodeId) -> Option<Binding> {
        self.map.get(node).cloned()
    }
}

/// One qualifying click.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionEvent {
    /// The selected station, or the enabled members of a clicked group.
    pub names: Vec<String>,
    /// Anchor relative to the container; `None` if the station has no marker.
    pub position: Option<Position>,
}

/// Whether the popup is shown.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PopupState {
    /// No popup is shown.
    Idle,
    /// The popup is shown next to the last selection.
    Showing,
}

/// What a click did.
#[derive(Clone, Debug, PartialEq)]
pub enum ClickOutcome {
    /// A station or group was selected.
    Selected(SelectionEvent),
    /// A disabled station or fully disabled group was clicked; nothing changed.
    Blocked,
    /// A neutral click closed the popup.
    Dismissed,
    /// Nothing reacted.
    Unhandled,
}

/// Marks the click that a station or group binding already handled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HandledToken {
    /// Per-controller click counter.
    pub event: u64,
    /// Node whose binding handled the click.
    pub node: NodeId,
}

/// Read-only map state a click needs.
#[derive(Copy, Clone, Debug)]
pub struct ClickContext<'a> {
    /// The document.
    pub scene: &'a Scene,
    /// Group state.
    pub groups: &'a GroupAggregator,
    /// Class of popup-anchoring circles.
    pub marker_class: &'a str,
    /// Container bounds in the scene's world space.
    pub container: Rect,
}

type SelectCallback = Box<dyn FnMut(&SelectionEvent)>;

/// Turns routed clicks into selections and drives the popup.
pub struct SelectionController {
    multiple: bool,
    popup: Option<Box<dyn Popup>>,
    on_select: Option<SelectCallback>,
    handled: Option<HandledToken>,
    event: u64,
}

impl fmt::Debug for SelectionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionController")
            .field("multiple", &self.multiple)
            .field("popup", &self.popup.as_ref().map(|p| p.is_open()))
            .field("on_select", &self.on_select.is_some())
            .field("handled", &self.handled)
            .field("event", &self.event)
            .finish()
    }
}

impl SelectionController {
    /// A controller; `multiple` enables multi-select toggling.
    pub fn new(multiple: bool) -> Self {
        Self {
            multiple,
            popup: None,
            on_select: None,
            handled: None,
            event: 0,
        }
    }

    /// Whether multi-select is on.
    pub fn multiple(&self) -> bool {
        self.multiple
    }

    /// Register or remove the popup.
    pub fn set_popup(&mut self, popup: Option<Box<dyn Popup>>) {
        self.popup = popup;
    }

    /// Register or remove the host's selection callback.
    pub fn set_on_select(&mut self, on_select: Option<SelectCallback>) {
        self.on_select = on_select;
    }

    /// [`PopupState::Showing`] while a registered popup reports open.
    pub fn popup_state(&self) -> PopupState {
        match &self.popup {
            Some(p) if p.is_open() => PopupState::Showing,
            _ => PopupState::Idle,
        }
    }

    /// Start a new click and return its id. Any earlier token goes stale.
    pub fn begin_click(&mut self) -> u64 {
        self.event += 1;
        self.handled = None;
        self.event
    }

    /// Token recorded for click `event`, if a binding handled it.
    pub fn handled(&self, event: u64) -> Option<HandledToken> {
        self.handled.filter(|t| t.event == event)
    }

    fn claim(&mut self, event: u64, node: NodeId) -> bool {
        if self.handled(event).is_some() {
            return false;
        }
        self.handled = Some(HandledToken { event, node });
        true
    }

    /// Fan a selection out: popup first, then the host callback.
    ///
    /// `anchor` is in world (client) space and is translated into container
    /// coordinates. Without an anchor the callback still fires with `None`
    /// and the popup is left as it is.
    pub fn on_select_station(
        &mut self,
        names: Vec<String>,
        anchor: Option<Point>,
        container: Rect,
    ) -> SelectionEvent {
        let position = anchor.map(|a| Position::new(a.x - container.x0, a.y - container.y0));
        let event = SelectionEvent { names, position };
        tracing::debug!(names = ?event.names, position = ?event.position, "station selected");
        if let (Some(popup), Some(pos)) = (self.popup.as_mut(), position) {
            popup.show(pos);
        }
        if let Some(cb) = self.on_select.as_mut() {
            cb(&event);
        }
        event
    }

    /// Hide the popup if one is registered and open. Returns whether it was hidden.
    pub fn dismiss(&mut self) -> bool {
        match self.popup.as_mut() {
            Some(p) if p.is_open() => {
                p.hide();
                tracing::debug!("popup dismissed");
                true
            }
            _ => false,
        }
    }

    /// Deliver one routed step of click `event`.
    ///
    /// Capture steps are ignored. Station and group-label bindings claim the
    /// click when no earlier binding did; the container binding dismisses
    /// the popup for unclaimed clicks. Propagation always continues.
    pub fn deliver(
        &mut self,
        event: u64,
        d: &Dispatch<NodeId, Binding, Point>,
        cx: &ClickContext<'_>,
        outcome: &mut ClickOutcome,
    ) -> Outcome {
        if d.phase == Phase::Capture {
            return Outcome::Continue;
        }
        let Some(binding) = &d.widget else {
            return Outcome::Continue;
        };
        tracing::trace!(node = d.node.index(), phase = ?d.phase, ?binding, "click step");
        match binding {
            Binding::Station(state) => {
                if !self.claim(event, d.node) {
                    return Outcome::Continue;
                }
                if state.is_disabled() {
                    *outcome = ClickOutcome::Blocked;
                    return Outcome::Continue;
                }
                if self.multiple {
                    state.toggle_active();
                }
                let anchor = marker_anchor(cx.scene, d.node, cx.marker_class);
                let selected =
                    self.on_select_station(vec![state.name().to_string()], anchor, cx.container);
                *outcome = ClickOutcome::Selected(selected);
            }
            Binding::GroupLabel(group) => {
                if !self.claim(event, d.node) {
                    return Outcome::Continue;
                }
                let Some(g) = cx.groups.get(*group).filter(|g| !g.is_disabled()) else {
                    *outcome = ClickOutcome::Blocked;
                    return Outcome::Continue;
                };
                let anchor = cx.scene.world_bounds(d.node).map(|b| b.origin());
                let selected = self.on_select_station(g.enabled_names(), anchor, cx.container);
                *outcome = ClickOutcome::Selected(selected);
            }
            Binding::Container => {
                if self.handled(event).is_none() && self.dismiss() {
                    *outcome = ClickOutcome::Dismissed;
                }
            }
        }
        Outcome::Continue
    }
}

/// Top-left corner of the last marker circle below `station`, in world space.
pub fn marker_anchor(scene: &Scene, station: NodeId, marker_class: &str) -> Option<Point> {
    scene
        .descendants(station)
        .into_iter()
        .rev()
        .find(|&n| scene.tag(n) == "circle" && scene.has_class(n, marker_class))
        .and_then(|n| scene.world_bounds(n))
        .map(|b| b.origin())
}

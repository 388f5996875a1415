// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Station registry: the single name → state table of a map.
//!
//! ## Sharing
//!
//! Each station's state lives in an [`Rc<StationState>`] with interior-mutable
//! flags. Groups, click bindings and the host all hold clones of the same `Rc`,
//! so re-initializing the registry with a new [`EnabledStations`] is visible
//! through every reference taken earlier.
//!
//! ## Lookup
//!
//! [`StationRegistry::find`] never fails. Unknown names yield a fresh
//! placeholder that is disabled, inactive, and detached from the registry:
//! later re-initializations do not touch it.

use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use metro_scene::{NodeId, Scene};
use serde::Deserialize;
use serde_json::Value;

/// Enabled/disabled state of one station.
#[derive(Debug)]
pub struct StationState {
    name: String,
    disabled: Cell<bool>,
    active: Cell<bool>,
    registered: bool,
}

impl StationState {
    fn registered(name: &str, disabled: bool) -> Self {
        Self {
            name: name.to_string(),
            disabled: Cell::new(disabled),
            active: Cell::new(false),
            registered: true,
        }
    }

    /// Inert stand-in for a name the registry does not know.
    pub fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            disabled: Cell::new(true),
            active: Cell::new(false),
            registered: false,
        }
    }

    /// Station name exactly as authored in the markup.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the station is outside the enabled set.
    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    /// Whether the station is toggled on in multi-select mode.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Whether this is a detached placeholder from [`StationRegistry::find`].
    pub fn is_placeholder(&self) -> bool {
        !self.registered
    }

    /// Set the multi-select flag.
    pub fn set_active(&self, active: bool) {
        self.active.set(active);
    }

    /// Flip the multi-select flag and return the new value.
    pub fn toggle_active(&self) -> bool {
        let now = !self.active.get();
        self.active.set(now);
        now
    }

    // Returns `true` if the flag changed.
    fn set_disabled(&self, disabled: bool) -> bool {
        self.disabled.replace(disabled) != disabled
    }
}

/// Which stations a host enables.
///
/// Hosts usually hand over whatever JSON they have; see
/// [`EnabledStations::from_value`] for how each shape is read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum EnabledStations {
    /// No configuration: every station is disabled.
    #[default]
    Absent,
    /// Only the listed names are enabled.
    Sequence(Vec<String>),
    /// Only names present as keys are enabled.
    Mapping(BTreeSet<String>),
    /// Every station except the listed names is enabled.
    AllExcept(Vec<String>),
    /// A configuration of a shape the map does not understand: everything is disabled.
    Unsupported,
}

impl EnabledStations {
    /// Enable exactly `names`.
    pub fn names<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::Sequence(names.into_iter().map(Into::into).collect())
    }

    /// Enable everything except `names`.
    pub fn all_except<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::AllExcept(names.into_iter().map(Into::into).collect())
    }

    /// Read a host-supplied JSON value.
    ///
    /// `null` is absent, an array is a sequence (non-string items are
    /// ignored), an object is a mapping over its keys, and anything else is
    /// unsupported.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Array(items) => Self::Sequence(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            Value::Object(map) => Self::Mapping(map.keys().cloned().collect()),
            other => {
                tracing::debug!(kind = %value_kind(other), "unsupported enabled-stations shape");
                Self::Unsupported
            }
        }
    }

    /// Whether `name` is enabled under this configuration.
    pub fn is_enabled(&self, name: &str) -> bool {
        match self {
            Self::Absent | Self::Unsupported => false,
            Self::Sequence(names) => names.iter().any(|n| n == name),
            Self::Mapping(keys) => keys.contains(name),
            Self::AllExcept(names) => !names.iter().any(|n| n == name),
        }
    }

    /// Names this configuration mentions explicitly.
    pub fn mentioned(&self) -> Vec<&str> {
        match self {
            Self::Absent | Self::Unsupported => Vec::new(),
            Self::Sequence(names) | Self::AllExcept(names) => {
                names.iter().map(String::as_str).collect()
            }
            Self::Mapping(keys) => keys.iter().map(String::as_str).collect(),
        }
    }
}

impl From<Value> for EnabledStations {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

impl From<Vec<String>> for EnabledStations {
    fn from(names: Vec<String>) -> Self {
        Self::Sequence(names)
    }
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Counts reported by [`StationRegistry::initialize`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InitSummary {
    /// Distinct stations known to the registry.
    pub stations: usize,
    /// Entries created by this call.
    pub created: usize,
    /// Stations enabled after this call.
    pub enabled: usize,
    /// Stations whose disabled flag flipped.
    pub changed: usize,
}

#[derive(Debug)]
struct Entry {
    state: Rc<StationState>,
    nodes: Vec<NodeId>,
}

/// Name → [`StationState`] table built from a map document.
#[derive(Debug, Default)]
pub struct StationRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl StationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `scene` for elements carrying `station_attr` and apply `enabled`.
    ///
    /// Known names keep their existing state object; only the disabled flag is
    /// rewritten. Names seen for the first time get a new entry. Entries are
    /// never removed, even if their elements have disappeared from the scene.
    pub fn initialize(
        &mut self,
        scene: &Scene,
        station_attr: &str,
        enabled: &EnabledStations,
    ) -> InitSummary {
        let mut created = 0;
        for e in &mut self.entries {
            e.nodes.clear();
        }
        for node in scene.find_by_attr(station_attr) {
            let Some(name) = scene.attr(node, station_attr) else {
                continue;
            };
            let idx = match self.index.get(&name) {
                Some(&i) => i,
                None => {
                    let disabled = !enabled.is_enabled(&name);
                    self.entries.push(Entry {
                        state: Rc::new(StationState::registered(&name, disabled)),
                        nodes: Vec::new(),
                    });
                    self.index.insert(name, self.entries.len() - 1);
                    created += 1;
                    self.entries.len() - 1
                }
            };
            self.entries[idx].nodes.push(node);
        }
        let mut summary = self.apply(enabled);
        summary.created = created;
        tracing::debug!(
            stations = summary.stations,
            created = summary.created,
            enabled = summary.enabled,
            changed = summary.changed,
            "initialized station registry"
        );
        summary
    }

    /// Re-derive every disabled flag from `enabled` without rescanning.
    pub fn apply(&mut self, enabled: &EnabledStations) -> InitSummary {
        let mut summary = InitSummary {
            stations: self.entries.len(),
            ..InitSummary::default()
        };
        for e in &self.entries {
            let disabled = !enabled.is_enabled(e.state.name());
            if e.state.set_disabled(disabled) {
                summary.changed += 1;
            }
            if !disabled {
                summary.enabled += 1;
            }
        }
        for name in enabled.mentioned() {
            if !self.index.contains_key(name) {
                tracing::warn!(name, "configuration names a station the map does not have");
            }
        }
        summary
    }

    /// State for `name`, or a detached placeholder if the name is unknown.
    pub fn find(&self, name: &str) -> Rc<StationState> {
        match self.get(name) {
            Some(state) => Rc::clone(state),
            None => Rc::new(StationState::placeholder(name)),
        }
    }

    /// State for `name`, if registered.
    pub fn get(&self, name: &str) -> Option<&Rc<StationState>> {
        self.index.get(name).map(|&i| &self.entries[i].state)
    }

    /// Elements carrying `name`, in document order, as of the last scan.
    pub fn nodes_of(&self, name: &str) -> &[NodeId] {
        self.index
            .get(name)
            .map(|&i| self.entries[i].nodes.as_slice())
            .unwrap_or(&[])
    }

    /// All registered stations in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<StationState>> + '_ {
        self.entries.iter().map(|e| &e.state)
    }

    /// Stations with their elements, in discovery order.
    pub fn iter_with_nodes(&self) -> impl Iterator<Item = (&Rc<StationState>, &[NodeId])> + '_ {
        self.entries.iter().map(|e| (&e.state, e.nodes.as_slice()))
    }

    /// Number of registered stations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no station is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

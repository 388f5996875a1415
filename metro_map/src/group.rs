// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interchange groups and their derived disabled flag.

use std::collections::HashMap;
use std::rc::Rc;

use metro_scene::{NodeId, Scene};
use serde::{Deserialize, Serialize};

use crate::registry::StationState;

/// Groups are identified by their element in the scene.
pub type GroupId = NodeId;

/// Which member name represents a group.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryNamePolicy {
    /// Every registration replaces the primary name.
    #[default]
    LastRegistered,
    /// The first registered member stays primary.
    FirstRegistered,
}

/// Stations sharing one physical transfer point.
#[derive(Debug)]
pub struct GroupState {
    id: GroupId,
    members: Vec<Rc<StationState>>,
    primary_name: Option<String>,
}

impl GroupState {
    fn new(id: GroupId) -> Self {
        Self {
            id,
            members: Vec::new(),
            primary_name: None,
        }
    }

    /// Element of the group.
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Member names in registration order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.iter().map(|m| m.name())
    }

    /// Member states in registration order.
    pub fn members(&self) -> &[Rc<StationState>] {
        &self.members
    }

    /// Representative label, if any member has registered.
    pub fn primary_name(&self) -> Option<&str> {
        self.primary_name.as_deref()
    }

    /// `true` iff every member is disabled; an empty group is disabled.
    ///
    /// Derived from the members on every call, so it can never go stale.
    pub fn is_disabled(&self) -> bool {
        self.members.iter().all(|m| m.is_disabled())
    }

    /// Names of the members that are currently enabled, in registration order.
    pub fn enabled_names(&self) -> Vec<String> {
        self.members
            .iter()
            .filter(|m| !m.is_disabled())
            .map(|m| m.name().to_string())
            .collect()
    }
}

/// All groups of a map.
#[derive(Debug, Default)]
pub struct GroupAggregator {
    policy: PrimaryNamePolicy,
    groups: Vec<GroupState>,
    index: HashMap<GroupId, usize>,
    owners: HashMap<String, GroupId>,
}

impl GroupAggregator {
    /// Create an aggregator with the given primary-name policy.
    pub fn new(policy: PrimaryNamePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Create an empty group for every element carrying `group_attr`.
    ///
    /// Returns the number of groups created; existing groups are kept.
    pub fn discover(&mut self, scene: &Scene, group_attr: &str) -> usize {
        let before = self.groups.len();
        for node in scene.find_by_attr(group_attr) {
            self.ensure(node);
        }
        self.groups.len() - before
    }

    fn ensure(&mut self, id: GroupId) -> &mut GroupState {
        let idx = *self.index.entry(id).or_insert_with(|| {
            self.groups.push(GroupState::new(id));
            self.groups.len() - 1
        });
        &mut self.groups[idx]
    }

    /// Add a station to a group, creating the group if needed.
    ///
    /// A station belongs to at most one group: the first registration wins and
    /// returns `true`; repeats, in the same group or another one, return `false`.
    /// Stations register while they are being wired, so membership is fixed
    /// once a map is built.
    pub fn register_member(
        &mut self,
        group: GroupId,
        name: &str,
        state: Rc<StationState>,
    ) -> bool {
        if let Some(&owner) = self.owners.get(name) {
            if owner != group {
                tracing::warn!(
                    name,
                    group = group.index(),
                    owner = owner.index(),
                    "station already belongs to another group, ignored"
                );
            }
            return false;
        }
        self.owners.insert(name.to_string(), group);
        let policy = self.policy;
        let g = self.ensure(group);
        g.members.push(state);
        match policy {
            PrimaryNamePolicy::LastRegistered => g.primary_name = Some(name.to_string()),
            PrimaryNamePolicy::FirstRegistered => {
                g.primary_name.get_or_insert_with(|| name.to_string());
            }
        }
        tracing::debug!(group = group.index(), name, "registered group member");
        true
    }

    /// Whether `group` is disabled. Unknown groups count as empty, hence disabled.
    pub fn is_group_disabled(&self, group: GroupId) -> bool {
        self.get(group).is_none_or(GroupState::is_disabled)
    }

    /// The group with element `id`.
    pub fn get(&self, id: GroupId) -> Option<&GroupState> {
        self.index.get(&id).map(|&i| &self.groups[i])
    }

    /// Group containing station `name`, if any.
    pub fn group_of(&self, name: &str) -> Option<&GroupState> {
        self.owners.get(name).and_then(|&id| self.get(id))
    }

    /// All groups in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &GroupState> + '_ {
        self.groups.iter()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Mirror every group's derived flag into `disabled_class` on its element.
    ///
    /// Returns how many elements actually changed; unchanged groups record
    /// nothing in the scene's class-change log.
    pub fn sync_classes(&self, scene: &mut Scene, disabled_class: &str) -> usize {
        self.groups
            .iter()
            .filter(|g| scene.toggle_class(g.id, disabled_class, g.is_disabled()))
            .count()
    }
}

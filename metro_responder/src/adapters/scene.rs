// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapter helpers for Metro Scene.
//!
//! ## Feature
//!
//! Enable with `scene_adapter`.
//!
//! ## Notes
//!
//! The scene hit test already picks the topmost element, so a click produces
//! at most one candidate. Its depth key still carries the element's z-index and
//! paint order, which matters when callers merge hits from several sources.

use alloc::vec::Vec;

use kurbo::Point;
use metro_scene::{NodeId, QueryFilter, Scene};

use crate::types::{DepthKey, ParentLookup, ResolvedHit};

/// Build a single resolved hit for the topmost element under a point.
///
/// The pointer position travels as the hit's `meta`. Returns `None` if the
/// point misses the document entirely.
pub fn top_hit_for_point(
    scene: &Scene,
    pt: Point,
    filter: QueryFilter,
) -> Option<ResolvedHit<NodeId, Point>> {
    let hit = scene.hit_test_point(pt, filter)?;
    let z = scene.local(hit.node).map_or(0, |l| l.z_index);
    Some(ResolvedHit {
        node: hit.node,
        path: Some(hit.path),
        depth_key: DepthKey {
            z,
            paint_order: hit.paint_order,
        },
        meta: pt,
    })
}

/// Resolved hit for an element known by id, with the path rebuilt from the scene.
///
/// Used to route synthetic clicks that target an element directly rather
/// than a position.
pub fn hit_for_node(scene: &Scene, node: NodeId, meta: Point) -> ResolvedHit<NodeId, Point> {
    let path: Vec<NodeId> = scene.path_to_root(node);
    ResolvedHit {
        node,
        path: Some(path),
        depth_key: DepthKey::default(),
        meta,
    }
}

/// [`ParentLookup`] backed by a scene's element tree.
#[derive(Copy, Clone, Debug)]
pub struct SceneParents<'a>(pub &'a Scene);

impl ParentLookup<NodeId> for SceneParents<'_> {
    fn parent_of(&self, node: &NodeId) -> Option<NodeId> {
        self.0.parent(*node)
    }
}

// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for the responder: phases, outcomes, hits, lookups, and dispatch.
//!
//! ## Overview
//!
//! These types describe the routing protocol and its inputs/outputs.
//! They are referenced by the [`router`](crate::router) and used by the map controller.

use alloc::vec::Vec;

/// Phases of event propagation.
///
/// Appears on each [`Dispatch`] item produced by
/// [`Router::handle_with_hits`](crate::router::Router::handle_with_hits).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Parent-to-target traversal.
    Capture,
    /// Target node.
    Target,
    /// Target-to-parent traversal.
    Bubble,
}

/// Handler outcome controlling propagation.
///
/// Returned by the handler passed to [`run_dispatch`](crate::router::run_dispatch).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Continue within the current phase.
    Continue,
    /// Stop propagation within the current phase.
    Stop,
    /// Stop and mark consumed; remaining phases are skipped.
    StopAndConsume,
}

/// Stacking position of a hit; the greater key is nearer to the user.
///
/// Compares `z` first, then `paint_order` (later painted is nearer).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct DepthKey {
    /// Explicit z-index; higher is nearer.
    pub z: i32,
    /// Position in document paint order; higher is painted later.
    pub paint_order: u32,
}

impl DepthKey {
    /// Depth from paint order alone.
    pub const fn painted(paint_order: u32) -> Self {
        Self { z: 0, paint_order }
    }
}

/// A resolved hit to be routed.
///
/// Typically obtained from a scene hit test (see the `scene_adapter` feature).
/// It is the input to
/// [`Router::handle_with_hits`](crate::router::Router::handle_with_hits).
#[derive(Clone, Debug)]
pub struct ResolvedHit<K, M = ()> {
    /// Node key associated with the hit.
    pub node: K,
    /// Optional root→target path; if absent, the router may consult [`ParentLookup`] to derive one.
    pub path: Option<Vec<K>>,
    /// Ordering key used to pick the winning target from candidates.
    pub depth_key: DepthKey,
    /// Metadata carried alongside the hit (e.g. the pointer position).
    pub meta: M,
}

/// Map nodes to handler bindings.
///
/// Implement this trait and supply it to the router so that each [`Dispatch`]
/// carries the binding (if any) registered for its node.
pub trait WidgetLookup<K> {
    /// Binding type associated with a node.
    type WidgetId: Clone + core::fmt::Debug;
    /// Returns the binding for the given node, if any.
    fn widget_of(&self, node: &K) -> Option<Self::WidgetId>;
}

/// Look up the parent of a node to reconstruct a root→target path for propagation.
///
/// The [router](crate::router::Router) consults this when a [`ResolvedHit::path`] is absent, if you
/// construct it via [`Router::with_parent`](crate::router::Router::with_parent).
pub trait ParentLookup<K> {
    /// Returns the parent of `node`, or `None` if `node` is a root.
    fn parent_of(&self, node: &K) -> Option<K>;
}

/// A no‑op parent provider used by default when no parent lookup is needed.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoParent;

impl<K> ParentLookup<K> for NoParent {
    #[inline]
    fn parent_of(&self, _node: &K) -> Option<K> {
        None
    }
}

/// A single dispatch item.
///
/// Produced by [`Router::handle_with_hits`](crate::router::Router::handle_with_hits)
/// in [`Capture`](Phase::Capture), then [`Target`](Phase::Target), then
/// [`Bubble`](Phase::Bubble) order.
#[derive(Clone, Debug)]
pub struct Dispatch<K, W, M = ()> {
    /// Propagation phase for this step.
    pub phase: Phase,
    /// Node associated with this dispatch step.
    pub node: K,
    /// Binding registered for the node, if any.
    pub widget: Option<W>,
    /// Metadata cloned from the winning hit.
    pub meta: Option<M>,
}

// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router implementation.
//!
//! ## Overview
//!
//! Orders hits, reconstructs paths, and emits dispatch steps.
//! Produces a capture → target → bubble sequence for the selected target.
//!
//! ## Target Selection
//!
//! - Ranks candidates by [`DepthKey`](crate::types::DepthKey): higher z, then later paint order.
//! - Picks exactly one winning candidate; equal depth is stable and the last wins.
//! - `set_scope` filters candidates before ranking.
//!
//! ## Walking the sequence
//!
//! [`run_dispatch`] delivers the entries in order. Because every ancestor
//! sees the bubble entry only after the target and all nodes in between,
//! a binding near the target can leave a mark that an outer binding reads in
//! the same walk. The map's "click elsewhere closes the popup" rule depends
//! on exactly that.

use alloc::vec::Vec;

use crate::types::{Dispatch, NoParent, Outcome, ParentLookup, Phase, ResolvedHit, WidgetLookup};

/// Deterministic responder chain router.
///
/// ## Usage
///
/// - Construct with [`Router::new`] when callers always provide a full path in
///   [`crate::types::ResolvedHit`], or with [`Router::with_parent`] to enable
///   path reconstruction via a [`crate::types::ParentLookup`].
/// - Optionally call [`Router::set_scope`] to filter candidates.
/// - Call [`Router::handle_with_hits`] for each input event to select the winning
///   candidate and produce a capture → target → bubble dispatch sequence.
pub struct Router<K, L: WidgetLookup<K>, P: ParentLookup<K> = NoParent> {
    pub(crate) lookup: L,
    pub(crate) parent: P,
    pub(crate) scope: Option<fn(&K) -> bool>,
    pub(crate) _phantom: core::marker::PhantomData<fn() -> K>,
}

impl<K: Copy + Eq, L: WidgetLookup<K>, P: ParentLookup<K>> core::fmt::Debug for Router<K, L, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Router")
            .field("scoped", &self.scope.is_some())
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq, L: WidgetLookup<K>, P: ParentLookup<K> + Default> Router<K, L, P> {
    /// Create a router with a default parent lookup.
    pub fn new(lookup: L) -> Self {
        Self::with_parent(lookup, P::default())
    }
}

impl<K: Copy + Eq, L: WidgetLookup<K>, P: ParentLookup<K>> Router<K, L, P> {
    /// Create a router with an explicit parent lookup provider.
    pub fn with_parent(lookup: L, parent: P) -> Self {
        Self {
            lookup,
            parent,
            scope: None,
            _phantom: core::marker::PhantomData,
        }
    }

    /// Set an optional scope filter; only nodes that satisfy the predicate are considered.
    pub fn set_scope(&mut self, scope: Option<fn(&K) -> bool>) {
        self.scope = scope;
    }

    /// The binding lookup.
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Handle a pre-resolved sequence of hits and produce a propagation sequence.
    pub fn handle_with_hits<M>(&self, hits: &[ResolvedHit<K, M>]) -> Vec<Dispatch<K, L::WidgetId, M>>
    where
        M: Clone,
    {
        // Single pass; `>=` keeps equal-depth ties stable with the last one winning.
        let mut best_idx: Option<usize> = None;
        for (i, h) in hits.iter().enumerate() {
            if let Some(f) = self.scope
                && !f(&h.node)
            {
                continue;
            }
            match best_idx {
                Some(j) if hits[j].depth_key > h.depth_key => {}
                _ => best_idx = Some(i),
            }
        }

        let Some(i) = best_idx else {
            return Vec::new();
        };
        let best = &hits[i];

        let path: Vec<K> = if let Some(p) = best.path.as_ref().filter(|p| !p.is_empty()) {
            p.clone()
        } else {
            Self::reconstruct_path(best.node, &self.parent)
        };

        self.emit_path(&path, Some(best.meta.clone()))
    }

    fn make_dispatch<M: Clone>(
        &self,
        phase: Phase,
        node: K,
        meta: Option<M>,
    ) -> Dispatch<K, L::WidgetId, M> {
        Dispatch {
            phase,
            node,
            widget: self.lookup.widget_of(&node),
            meta,
        }
    }

    fn reconstruct_path(target: K, parent_lookup: &impl ParentLookup<K>) -> Vec<K> {
        let mut out = Vec::new();
        let mut cur = target;
        // Collect to root; caller ensures acyclic ancestry.
        loop {
            out.push(cur);
            match parent_lookup.parent_of(&cur) {
                Some(p) => cur = p,
                None => break,
            }
        }
        out.reverse();
        out
    }

    fn emit_path<M: Clone>(&self, path: &[K], meta: Option<M>) -> Vec<Dispatch<K, L::WidgetId, M>> {
        let Some((&target, ancestors)) = path.split_last() else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(path.len() * 2 + 1);
        // Capture: root→target
        for &n in path {
            out.push(self.make_dispatch(Phase::Capture, n, meta.clone()));
        }
        out.push(self.make_dispatch(Phase::Target, target, meta.clone()));
        // Bubble: parent of target→root; the target itself already saw the Target phase.
        for &n in ancestors.iter().rev() {
            out.push(self.make_dispatch(Phase::Bubble, n, meta.clone()));
        }
        out
    }
}

/// Walk a dispatch sequence produced by the router.
///
/// `deliver` is called for each entry in order. [`Outcome::Stop`] skips the
/// remaining entries of the current phase; [`Outcome::StopAndConsume`] aborts
/// the walk. Returns `true` if the event was consumed.
pub fn run_dispatch<K, W, M>(
    seq: &[Dispatch<K, W, M>],
    mut deliver: impl FnMut(&Dispatch<K, W, M>) -> Outcome,
) -> bool {
    let mut i = 0;
    while i < seq.len() {
        let phase = seq[i].phase;
        // Process contiguous entries for the same phase.
        while i < seq.len() && seq[i].phase == phase {
            match deliver(&seq[i]) {
                Outcome::Continue => {}
                Outcome::Stop => {
                    while i + 1 < seq.len() && seq[i + 1].phase == phase {
                        i += 1;
                    }
                }
                Outcome::StopAndConsume => return true,
            }
            i += 1;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use alloc::vec;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    struct Node(u32);

    struct Lookup;
    impl WidgetLookup<Node> for Lookup {
        type WidgetId = u32;
        fn widget_of(&self, node: &Node) -> Option<Self::WidgetId> {
            (node.0 % 2 == 0).then_some(node.0 * 10)
        }
    }

    struct Parents;
    impl ParentLookup<Node> for Parents {
        fn parent_of(&self, node: &Node) -> Option<Node> {
            match node.0 {
                3 => Some(Node(2)),
                2 => Some(Node(1)),
                _ => None,
            }
        }
    }

    fn hit(node: u32, path: Option<Vec<Node>>, depth_key: DepthKey) -> ResolvedHit<Node, ()> {
        ResolvedHit {
            node: Node(node),
            path,
            depth_key,
            meta: (),
        }
    }

    #[test]
    fn simple_path_dispatch() {
        let router: Router<Node, Lookup, NoParent> = Router::new(Lookup);
        let hits = vec![hit(
            3,
            Some(vec![Node(1), Node(2), Node(3)]),
            DepthKey::painted(10),
        )];
        let out = router.handle_with_hits::<()>(&hits);
        let phases: Vec<(Phase, u32)> = out.iter().map(|d| (d.phase, d.node.0)).collect();
        assert_eq!(
            phases,
            vec![
                (Phase::Capture, 1),
                (Phase::Capture, 2),
                (Phase::Capture, 3),
                (Phase::Target, 3),
                (Phase::Bubble, 2),
                (Phase::Bubble, 1),
            ]
        );
    }

    #[test]
    fn parent_of_reconstructs_path() {
        let router: Router<Node, Lookup, Parents> = Router::with_parent(Lookup, Parents);
        let out = router.handle_with_hits::<()>(&[hit(3, None, DepthKey::default())]);
        let bubble: Vec<u32> = out
            .iter()
            .filter(|d| d.phase == Phase::Bubble)
            .map(|d| d.node.0)
            .collect();
        assert_eq!(bubble, vec![2, 1]);
    }

    #[test]
    fn nearest_hit_wins_and_ties_go_to_last() {
        let router: Router<Node, Lookup, NoParent> = Router::new(Lookup);
        let hits = vec![
            hit(1, None, DepthKey::painted(5)),
            hit(2, None, DepthKey::painted(9)),
            hit(3, None, DepthKey::painted(9)),
            hit(4, None, DepthKey::painted(2)),
        ];
        let out = router.handle_with_hits::<()>(&hits);
        let tgt = out.iter().find(|d| d.phase == Phase::Target).unwrap();
        assert_eq!(tgt.node.0, 3);
    }

    #[test]
    fn scope_filter_selects_allowed_hit() {
        let mut router: Router<Node, Lookup, NoParent> = Router::new(Lookup);
        router.set_scope(Some(|n: &Node| (n.0 & 1) == 0));
        let hits = vec![
            hit(1, Some(vec![Node(1)]), DepthKey::painted(100)),
            hit(2, Some(vec![Node(2)]), DepthKey::painted(50)),
        ];
        let out = router.handle_with_hits::<()>(&hits);
        let targets: Vec<u32> = out
            .iter()
            .filter(|d| d.phase == Phase::Target)
            .map(|d| d.node.0)
            .collect();
        assert_eq!(targets, vec![2]);
    }

    #[test]
    fn no_hits_no_dispatch() {
        let router: Router<Node, Lookup, NoParent> = Router::new(Lookup);
        assert!(router.handle_with_hits::<()>(&[]).is_empty());
    }

    #[test]
    fn widget_and_meta_are_attached_to_each_step() {
        #[derive(Clone, Debug, PartialEq)]
        struct Meta(&'static str);
        let router: Router<Node, Lookup, Parents> = Router::with_parent(Lookup, Parents);
        let hits = vec![ResolvedHit {
            node: Node(3),
            path: None,
            depth_key: DepthKey::default(),
            meta: Meta("click"),
        }];
        let out = router.handle_with_hits::<Meta>(&hits);
        assert!(out.iter().all(|d| d.meta == Some(Meta("click"))));
        for d in &out {
            assert_eq!(d.widget, (d.node.0 % 2 == 0).then_some(d.node.0 * 10));
        }
    }

    #[test]
    fn run_dispatch_honors_stop_and_consume() {
        let router: Router<Node, Lookup, Parents> = Router::with_parent(Lookup, Parents);
        let seq = router.handle_with_hits::<()>(&[hit(3, None, DepthKey::default())]);

        let mut seen = Vec::new();
        let consumed = run_dispatch(&seq, |d| {
            seen.push((d.phase, d.node.0));
            if d.phase == Phase::Capture && d.node.0 == 1 {
                Outcome::Stop
            } else {
                Outcome::Continue
            }
        });
        assert!(!consumed);
        assert_eq!(
            seen,
            vec![
                (Phase::Capture, 1),
                (Phase::Target, 3),
                (Phase::Bubble, 2),
                (Phase::Bubble, 1),
            ]
        );

        let mut seen = Vec::new();
        let consumed = run_dispatch(&seq, |d| {
            seen.push(d.node.0);
            if d.phase == Phase::Target {
                Outcome::StopAndConsume
            } else {
                Outcome::Continue
            }
        });
        assert!(consumed);
        assert_eq!(seen, vec![1, 2, 3, 3]);
    }
}

// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Metro Responder: a deterministic, `no_std` click router for map widgets.
//!
//! ## Overview
//!
//! This crate turns a hit into the responder chain sequence (capture → target → bubble)
//! and walks it. It does not perform hit testing.
//! Feed it [`ResolvedHit`](crate::types::ResolvedHit) items, for example from
//! [`adapters::scene::top_hit_for_point`] with the `scene_adapter` feature.
//!
//! ## Inputs
//!
//! A [`ResolvedHit`](crate::types::ResolvedHit) contains the node key, an optional root→target `path`,
//! a [`DepthKey`](crate::types::DepthKey) used for ordering, and a `meta` payload (the map uses the pointer position).
//! A [`ParentLookup`](crate::types::ParentLookup) reconstructs a path when `path` is absent.
//!
//! ## Bindings
//!
//! A [`WidgetLookup`](crate::types::WidgetLookup) attaches a binding to each node on the path.
//! In the map these are station, group and container handlers, and the innermost
//! binding on the path is the first to see the bubble.
//!
//! ## Walking
//!
//! [`run_dispatch`](crate::router::run_dispatch) delivers the entries in order and honors
//! [`Outcome::Stop`](crate::types::Outcome::Stop) (skip the rest of the phase) and
//! [`Outcome::StopAndConsume`](crate::types::Outcome::StopAndConsume) (abort the walk).
//!
//! ```
//! use metro_responder::router::{run_dispatch, Router};
//! use metro_responder::types::{DepthKey, NoParent, Outcome, Phase, ResolvedHit, WidgetLookup};
//!
//! struct Handlers;
//! impl WidgetLookup<u32> for Handlers {
//!     type WidgetId = &'static str;
//!     fn widget_of(&self, node: &u32) -> Option<&'static str> {
//!         match node {
//!             0 => Some("container"),
//!             2 => Some("station"),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let router: Router<u32, Handlers, NoParent> = Router::new(Handlers);
//! let seq = router.handle_with_hits(&[ResolvedHit {
//!     node: 3,
//!     path: Some(vec![0, 1, 2, 3]),
//!     depth_key: DepthKey::default(),
//!     meta: (),
//! }]);
//!
//! let mut order = Vec::new();
//! run_dispatch(&seq, |d| {
//!     if let (Phase::Bubble, Some(w)) = (d.phase, d.widget) {
//!         order.push(w);
//!     }
//!     Outcome::Continue
//! });
//! assert_eq!(order, ["station", "container"]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapters;
pub mod router;
pub mod types;

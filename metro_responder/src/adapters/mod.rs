// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapters that feed scene hit tests into the router.
//!
//! Enabled via feature flags so the core stays `no_std`.

#[cfg(feature = "scene_adapter")]
pub mod scene;

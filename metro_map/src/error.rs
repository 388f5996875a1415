// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while loading a map.
//!
//! Only document loading and configuration parsing can fail. Everything a map
//! does once it exists degrades quietly instead.

use metro_scene::SceneError;

/// Configuration could not be read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration text is not valid JSON for [`MapConfig`](crate::MapConfig).
    #[error("invalid map configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// A map could not be built.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The SVG document could not be parsed.
    #[error(transparent)]
    Scene(#[from] SceneError),
    /// The configuration could not be parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

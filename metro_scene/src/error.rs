// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while loading a scene.

/// Failure to turn markup into a [`Scene`](crate::Scene).
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The markup is not well-formed XML.
    #[error("invalid SVG markup: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The document has no `<svg>` element.
    #[error("document has no <svg> element")]
    MissingSvgRoot,
}

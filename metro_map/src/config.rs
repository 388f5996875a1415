// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Map configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::group::PrimaryNamePolicy;
use crate::markup::MarkupConvention;
use crate::popup::Position;

/// How a map reads its markup and behaves on clicks.
///
/// Every field has a default, so `{}` is a complete configuration:
///
/// ```
/// use metro_map::MapConfig;
///
/// let config = MapConfig::from_json(r#"{"convention": "subway", "multiple": true}"#).unwrap();
/// assert!(config.multiple);
/// assert_eq!(config.convention.station_attr, "subway-station-name");
/// assert!(config.inject_styles);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Attribute and class names.
    pub convention: MarkupConvention,
    /// Multi-select: clicks toggle the station's active flag.
    pub multiple: bool,
    /// Which member name represents a group.
    pub primary_name: PrimaryNamePolicy,
    /// Tag a raw export with [`prepare_markup`](crate::prepare_markup) before scanning.
    pub prepare_markup: bool,
    /// Added to every position shown by the default [`InfoPopup`](crate::InfoPopup).
    pub popup_offset: Position,
    /// Insert the behavioural stylesheet into the document.
    pub inject_styles: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            convention: MarkupConvention::default(),
            multiple: false,
            primary_name: PrimaryNamePolicy::default(),
            prepare_markup: false,
            popup_offset: Position::default(),
            inject_styles: true,
        }
    }
}

impl MapConfig {
    /// Parse a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

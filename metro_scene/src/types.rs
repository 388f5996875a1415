// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: node identifiers, flags, element data and local geometry.

use kurbo::{Affine, Rect};

/// Identifier for an element in a [`Scene`](crate::Scene).
///
/// A small, copyable handle. Elements are never removed from a scene, so an
/// identifier stays valid for the lifetime of the scene that produced it.
///
/// Identifiers are allocated in insertion order. For a freshly parsed document
/// this is also document order, but elements inserted later (for example a
/// stylesheet placed as the first child of the root) get larger identifiers
/// than their following siblings. Use [`Scene::descendants`](crate::Scene::descendants)
/// when document order matters.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Raw slot index, useful for logging and stable test output.
    pub const fn index(self) -> u32 {
        self.0
    }
}

bitflags::bitflags! {
    /// Node flags controlling visibility and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible (participates in bounds and hit testing).
        const VISIBLE  = 0b0000_0001;
        /// Node is pickable (participates in hit testing).
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

/// Local geometry for a node.
#[derive(Clone, Debug)]
pub struct LocalNode {
    /// Local (untransformed) bounds of the element's own shape.
    ///
    /// Containers such as `g` have no shape of their own and keep [`Rect::ZERO`];
    /// their measured bounds are the union of their descendants.
    pub local_bounds: Rect,
    /// Local transform relative to parent space.
    pub local_transform: Affine,
    /// Z-order within the parent. Higher is drawn on top; equal values fall back to document order.
    pub z_index: i32,
    /// Visibility and picking flags.
    pub flags: NodeFlags,
}

impl Default for LocalNode {
    fn default() -> Self {
        Self {
            local_bounds: Rect::ZERO,
            local_transform: Affine::IDENTITY,
            z_index: 0,
            flags: NodeFlags::default(),
        }
    }
}

impl LocalNode {
    /// Whether this node has a shape of its own that can be hit.
    pub fn has_shape(&self) -> bool {
        self.local_bounds.width() > 0.0 || self.local_bounds.height() > 0.0
    }
}

/// Markup data of a single element.
///
/// The `class` attribute is not stored here once the element is inside a
/// scene; the scene keeps a class list instead so toggles stay cheap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Local tag name, e.g. `g`, `circle`, `text`.
    pub tag: String,
    /// Attributes in document order, with prefixes for `xlink:`/`xml:` names.
    pub attrs: Vec<(String, String)>,
    /// Character data directly inside this element.
    pub text: Option<String>,
}

impl Element {
    /// Create an element with no attributes and no text.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            text: None,
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Builder-style text setter.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Value of an attribute by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// One effective change to an element's class list.
///
/// Recorded by [`Scene::add_class`](crate::Scene::add_class),
/// [`Scene::remove_class`](crate::Scene::remove_class) and
/// [`Scene::toggle_class`](crate::Scene::toggle_class) only when the list
/// actually changed, and drained with
/// [`Scene::take_class_changes`](crate::Scene::take_class_changes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassChange {
    /// Element whose class list changed.
    pub node: NodeId,
    /// Class name that was added or removed.
    pub class: String,
    /// `true` if the class is now present.
    pub present: bool,
}

// Copyright 2025 the Metro Map Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: structure, class lists, updates, queries.

use kurbo::{Affine, Point, Rect};

use crate::geometry::{derive_local, derive_local_with_text, transform_rect_bbox};
use crate::types::{ClassChange, Element, LocalNode, NodeFlags, NodeId};

/// Results of a hit test.
#[derive(Clone, Debug)]
pub struct Hit {
    /// The matched node.
    pub node: NodeId,
    /// Path from root to node (inclusive).
    pub path: Vec<NodeId>,
    /// Paint position of the matched node; higher is drawn later.
    pub paint_order: u32,
}

/// Filters applied during hit testing.
///
/// Used by [`Scene::hit_test_point`].
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryFilter {
    /// If true, only consider nodes marked [`NodeFlags::VISIBLE`].
    pub visible_only: bool,
    /// If true, only consider nodes marked [`NodeFlags::PICKABLE`].
    pub pickable_only: bool,
}

impl QueryFilter {
    /// Visible and pickable nodes only; what a pointer click sees.
    pub const POINTER: Self = Self {
        visible_only: true,
        pickable_only: true,
    };
}

#[derive(Clone, Debug, Default)]
struct WorldNode {
    world_transform: Affine,
    // AABB of the transformed own shape, if the node has one.
    shape_bounds: Option<Rect>,
    // Union of the own shape and all visible descendants.
    bounds: Option<Rect>,
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    element: Element,
    classes: Vec<String>,
    local: LocalNode,
    world: WorldNode,
}

/// An SVG element tree with world-space geometry.
///
/// The root is always the outermost `svg` element. Call [`Scene::commit`]
/// after changing geometry and before measuring or hit testing.
#[derive(Clone)]
pub struct Scene {
    nodes: Vec<Node>,
    class_log: Vec<ClassChange>,
    dirty: bool,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.len())
            .field("pending_class_changes", &self.class_log.len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

fn split_classes(value: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for c in value.split_whitespace() {
        if !out.iter().any(|o| o == c) {
            out.push(c.to_string());
        }
    }
    out
}

impl Scene {
    /// Create a scene whose root is `root`.
    pub fn new(root: Element) -> Self {
        let mut scene = Self {
            nodes: Vec::new(),
            class_log: Vec::new(),
            dirty: true,
        };
        scene.push_node(None, root);
        scene
    }

    /// The root element (the outermost `svg`).
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of elements in the scene.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A scene always holds at least its root, so this is never true.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push_node(&mut self, parent: Option<NodeId>, mut element: Element) -> NodeId {
        let classes = element
            .attrs
            .iter()
            .position(|(k, _)| k == "class")
            .map(|i| split_classes(&element.attrs.remove(i).1))
            .unwrap_or_default();
        let local = derive_local(&element);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Scenes never hold more than u32::MAX elements."
        )]
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            element,
            classes,
            local,
            world: WorldNode::default(),
        });
        self.dirty = true;
        id
    }

    /// Append a new element as the last child of `parent`.
    ///
    /// Local geometry is derived from the element's attributes.
    pub fn insert(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = self.push_node(Some(parent), element);
        self.nodes[parent.idx()].children.push(id);
        id
    }

    /// Insert a new element as child number `position` of `parent`.
    ///
    /// Positions past the end append.
    pub fn insert_at(&mut self, parent: NodeId, position: usize, element: Element) -> NodeId {
        let id = self.push_node(Some(parent), element);
        let children = &mut self.nodes[parent.idx()].children;
        let position = position.min(children.len());
        children.insert(position, id);
        id
    }

    // --- structure ---

    /// Parent of `id`, `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.idx()).and_then(|n| n.parent)
    }

    /// Direct children of `id` in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.idx())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// `id` and all its descendants, in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if id.idx() >= self.nodes.len() {
            return out;
        }
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            for &c in self.nodes[n.idx()].children.iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Path from the root to `id` (inclusive).
    pub fn path_to_root(&self, mut id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        loop {
            out.push(id);
            match self.parent(id) {
                Some(p) => id = p,
                None => break,
            }
        }
        out.reverse();
        out
    }

    /// Nearest ancestor of `id` (excluding `id` itself) satisfying `pred`.
    pub fn ancestor_where(&self, id: NodeId, pred: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        let mut cur = self.parent(id);
        while let Some(n) = cur {
            if pred(n) {
                return Some(n);
            }
            cur = self.parent(n);
        }
        None
    }

    // --- element data ---

    /// Tag name of `id`.
    pub fn tag(&self, id: NodeId) -> &str {
        self.nodes
            .get(id.idx())
            .map(|n| n.element.tag.as_str())
            .unwrap_or("")
    }

    /// Attribute value of `id`. `class` is served from the class list.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<String> {
        let node = self.nodes.get(id.idx())?;
        if name == "class" {
            return (!node.classes.is_empty()).then(|| node.classes.join(" "));
        }
        node.element.attr(name).map(str::to_string)
    }

    /// Whether `id` carries attribute `name`.
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.nodes.get(id.idx()).is_some_and(|n| {
            if name == "class" {
                !n.classes.is_empty()
            } else {
                n.element.attr(name).is_some()
            }
        })
    }

    /// Set (or replace) an attribute.
    ///
    /// Setting `class` replaces the whole class list and is not recorded as a
    /// class change. Geometry attributes re-derive the local geometry.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(node) = self.nodes.get_mut(id.idx()) else {
            return;
        };
        if name == "class" {
            node.classes = split_classes(value);
            return;
        }
        match node.element.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => node
                .element
                .attrs
                .push((name.to_string(), value.to_string())),
        }
        let z = node.local.z_index;
        node.local = derive_local(&node.element);
        node.local.z_index = z;
        self.dirty = true;
    }

    /// Re-measure every `text` element from the characters of its whole subtree.
    pub(crate) fn refresh_text_geometry(&mut self) {
        for id in self.descendants(self.root()) {
            if self.tag(id) != "text" {
                continue;
            }
            let chars = self.text_content(id).trim().chars().count();
            let node = &mut self.nodes[id.idx()];
            let z = node.local.z_index;
            node.local = derive_local_with_text(&node.element, chars);
            node.local.z_index = z;
        }
        self.dirty = true;
    }

    /// Character data directly inside `id`.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.idx())?.element.text.as_deref()
    }

    /// All character data of `id` and its descendants, concatenated in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for n in self.descendants(id) {
            if let Some(t) = self.text(n) {
                out.push_str(t);
            }
        }
        out
    }

    /// Elements carrying attribute `name`, in document order.
    pub fn find_by_attr(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&n| self.has_attr(n, name))
            .collect()
    }

    /// Elements whose attribute `name` equals `value`, in document order.
    pub fn find_by_attr_value(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&n| self.attr(n, name).as_deref() == Some(value))
            .collect()
    }

    /// Element with the given `id` attribute, if any.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&n| self.nodes[n.idx()].element.attr("id") == Some(id))
    }

    /// Fill color of `id`, from its `fill` attribute or inline style, inherited from ancestors.
    pub fn fill(&self, id: NodeId) -> Option<String> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            let element = &self.nodes.get(n.idx())?.element;
            if let Some(v) = element
                .attr("style")
                .and_then(|s| crate::geometry::style_property(s, "fill"))
            {
                return Some(v.to_string());
            }
            if let Some(v) = element.attr("fill") {
                return Some(v.trim().to_string());
            }
            cur = self.parent(n);
        }
        None
    }

    // --- classes ---

    /// Class list of `id`.
    pub fn classes(&self, id: NodeId) -> &[String] {
        self.nodes
            .get(id.idx())
            .map(|n| n.classes.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `id` has class `class`.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    /// Add a class. Returns `true` if the class list changed.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        self.toggle_class(id, class, true)
    }

    /// Remove a class. Returns `true` if the class list changed.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        self.toggle_class(id, class, false)
    }

    /// Force `class` to be present (`on`) or absent. Returns `true` if the class list changed.
    ///
    /// Only effective changes are recorded in the class-change log.
    pub fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) -> bool {
        let Some(node) = self.nodes.get_mut(id.idx()) else {
            return false;
        };
        let present = node.classes.iter().any(|c| c == class);
        if present == on {
            return false;
        }
        if on {
            node.classes.push(class.to_string());
        } else {
            node.classes.retain(|c| c != class);
        }
        self.class_log.push(ClassChange {
            node: id,
            class: class.to_string(),
            present: on,
        });
        true
    }

    /// Drain the class changes recorded since the last call.
    pub fn take_class_changes(&mut self) -> Vec<ClassChange> {
        core::mem::take(&mut self.class_log)
    }

    // --- geometry ---

    /// Local geometry of `id`.
    pub fn local(&self, id: NodeId) -> Option<&LocalNode> {
        self.nodes.get(id.idx()).map(|n| &n.local)
    }

    /// Update local transform.
    pub fn set_local_transform(&mut self, id: NodeId, tf: Affine) {
        if let Some(n) = self.nodes.get_mut(id.idx()) {
            n.local.local_transform = tf;
            self.dirty = true;
        }
    }

    /// Update z index.
    pub fn set_z_index(&mut self, id: NodeId, z: i32) {
        if let Some(n) = self.nodes.get_mut(id.idx()) {
            n.local.z_index = z;
        }
    }

    /// Update node flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.nodes.get_mut(id.idx()) {
            n.local.flags = flags;
            self.dirty = true;
        }
    }

    /// Whether geometry changed since the last [`Scene::commit`].
    pub fn needs_commit(&self) -> bool {
        self.dirty
    }

    /// Recompute world transforms and bounds for the whole tree.
    pub fn commit(&mut self) {
        self.update_world_recursive(self.root(), Affine::IDENTITY, true);
        self.dirty = false;
    }

    fn update_world_recursive(&mut self, id: NodeId, parent_tf: Affine, parent_visible: bool) {
        let (world_tf, visible, child_ids) = {
            let node = &mut self.nodes[id.idx()];
            let world_tf = parent_tf * node.local.local_transform;
            let visible = parent_visible && node.local.flags.contains(NodeFlags::VISIBLE);
            node.world.world_transform = world_tf;
            node.world.shape_bounds = (visible && node.local.has_shape())
                .then(|| transform_rect_bbox(world_tf, node.local.local_bounds));
            (world_tf, visible, node.children.clone())
        };

        let mut bounds = self.nodes[id.idx()].world.shape_bounds;
        for child in child_ids {
            self.update_world_recursive(child, world_tf, visible);
            if let Some(cb) = self.nodes[child.idx()].world.bounds {
                bounds = Some(bounds.map_or(cb, |b| b.union(cb)));
            }
        }
        self.nodes[id.idx()].world.bounds = bounds;
    }

    /// World transform of `id` as of the last commit.
    pub fn world_transform(&self, id: NodeId) -> Affine {
        self.nodes
            .get(id.idx())
            .map(|n| n.world.world_transform)
            .unwrap_or(Affine::IDENTITY)
    }

    /// Bounding box of `id` in world space as of the last commit.
    ///
    /// For shapes this is the transformed shape; for containers the union of
    /// visible descendants. `None` when there is nothing visible to measure.
    pub fn world_bounds(&self, id: NodeId) -> Option<Rect> {
        self.nodes.get(id.idx()).and_then(|n| n.world.bounds)
    }

    /// Hit test a world-space point. Returns the topmost shape under the point.
    ///
    /// Higher `z_index` wins; equal z falls back to paint (document) order,
    /// later elements being on top. When no shape matches but the point lies
    /// inside the root's bounds, the root itself is returned, so a click on
    /// empty map area still has a target.
    pub fn hit_test_point(&self, pt: Point, filter: QueryFilter) -> Option<Hit> {
        let mut best: Option<(NodeId, i32, u32)> = None;
        for (order, id) in self.descendants(self.root()).into_iter().enumerate() {
            let node = &self.nodes[id.idx()];
            let Some(shape) = node.world.shape_bounds else {
                continue;
            };
            if filter.pickable_only && !self.pickable(id) {
                continue;
            }
            // Invisible subtrees have no shape bounds after commit.
            if filter.visible_only && !node.local.flags.contains(NodeFlags::VISIBLE) {
                continue;
            }
            if !shape.contains(pt) {
                continue;
            }
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Scenes never hold more than u32::MAX nodes."
            )]
            let order = order as u32;
            let z = node.local.z_index;
            match best {
                Some((_, z_best, _)) if z < z_best => {}
                _ => best = Some((id, z, order)),
            }
        }
        if let Some((node, _, paint_order)) = best {
            return Some(Hit {
                node,
                path: self.path_to_root(node),
                paint_order,
            });
        }
        let root = self.root();
        self.world_bounds(root)
            .filter(|b| b.contains(pt))
            .map(|_| Hit {
                node: root,
                path: vec![root],
                paint_order: 0,
            })
    }

    fn pickable(&self, id: NodeId) -> bool {
        self.path_to_root(id)
            .iter()
            .all(|n| self.nodes[n.idx()].local.flags.contains(NodeFlags::PICKABLE))
    }

    pub(crate) fn element(&self, id: NodeId) -> &Element {
        &self.nodes[id.idx()].element
    }
}

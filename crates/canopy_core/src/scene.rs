//! Scene arena: hierarchy editing, transforms, and bounds caching
//!
//! The [`Scene`] owns every node, the root, the activity scheduler, and a
//! single coalesced "paint is stale" flag. Nodes are created detached and
//! become reachable once added under the root.
//!
//! # Bounds caching
//!
//! Each node lazily caches two rects:
//!
//! - **full bounds**: its content bounds unioned with every child's full bounds
//!   mapped through that child's transform (local frame)
//! - **global full bounds**: full bounds mapped through the node's global
//!   transform (root frame)
//!
//! Any transform, content, or topology change clears both caches from the
//! changed node up to the root, and clears the global cache of every node
//! below it.

use std::rc::Rc;

use slotmap::SlotMap;
use tracing::debug;

use crate::error::{Result, SceneError};
use crate::events::Listener;
use crate::geometry::{Point, Rect, Transform2D};
use crate::node::{Node, NodeId, NodeKind, NodeOptions};
use crate::paint::{Color, NodeContent};
use crate::scheduler::ActivityScheduler;

/// A retained 2D scene
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    paint_stale: bool,
    pub(crate) scheduler: ActivityScheduler,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene with a fresh root and a default scheduler
    pub fn new() -> Self {
        Self::with_scheduler(ActivityScheduler::new())
    }

    pub fn with_scheduler(scheduler: ActivityScheduler) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(NodeKind::Root, NodeOptions::default()));
        Self {
            nodes,
            root,
            paint_stale: true,
            scheduler,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes in the arena, root and detached nodes included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(SceneError::UnknownNode(id))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(SceneError::UnknownNode(id))
    }

    pub fn scheduler(&self) -> &ActivityScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut ActivityScheduler {
        &mut self.scheduler
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Creation
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a detached plain node
    pub fn create_node(&mut self, options: NodeOptions) -> NodeId {
        self.nodes.insert(Node::new(NodeKind::Node, options))
    }

    /// Create a detached layer
    pub fn create_layer(&mut self, options: NodeOptions) -> NodeId {
        self.nodes.insert(Node::new(NodeKind::layer(), options))
    }

    /// Create a detached camera whose bounds are its viewport
    pub fn create_camera(&mut self, bounds: Rect) -> NodeId {
        self.nodes.insert(Node::new(
            NodeKind::camera(),
            NodeOptions::new().with_bounds(bounds),
        ))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Hierarchy
    // ─────────────────────────────────────────────────────────────────────────

    /// Append `child` as the last (topmost) child of `parent`
    ///
    /// A child that already has a parent is detached from it first, so adding
    /// a node to its current parent moves it to the top.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(parent)?;
        self.get(child)?;
        if child == self.root {
            return Err(SceneError::invalid("the root cannot be added as a child"));
        }
        if self.ancestors(parent).any(|id| id == child) {
            return Err(SceneError::invalid(
                "adding a node below itself would create a cycle",
            ));
        }

        if let Some(previous) = self.get(child)?.parent {
            self.remove_child(previous, child)?;
        }

        self.get_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);

        self.invalidate_chain(parent);
        self.clear_global_below(child);
        self.invalidate_paint(parent);
        Ok(())
    }

    /// Detach `child` from `parent`; a no-op when it is not a child
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let node = self.get_mut(parent)?;
        let Some(index) = node.children.iter().position(|&id| id == child) else {
            return Ok(());
        };
        node.children.remove(index);
        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = None;
        }

        self.invalidate_chain(parent);
        self.clear_global_below(child);
        self.invalidate_paint(parent);
        Ok(())
    }

    /// Detach a node and free it and its whole subtree from the arena
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(SceneError::invalid("the root cannot be destroyed"));
        }
        if let Some(parent) = self.get(id)?.parent {
            self.remove_child(parent, id)?;
        }

        let subtree = self.descendants(id);
        for &node_id in &subtree {
            let Some(kind) = self.nodes.get(node_id).map(|node| node.kind.clone()) else {
                continue;
            };
            match kind {
                NodeKind::Layer { cameras } => {
                    for camera in cameras {
                        if let Some(NodeKind::Camera { layers, .. }) =
                            self.nodes.get_mut(camera).map(|n| &mut n.kind)
                        {
                            layers.retain(|layer| *layer != node_id);
                        }
                        self.invalidate_paint(camera);
                    }
                }
                NodeKind::Camera { layers, .. } => {
                    for layer in layers {
                        if let Some(NodeKind::Layer { cameras }) =
                            self.nodes.get_mut(layer).map(|n| &mut n.kind)
                        {
                            cameras.retain(|camera| *camera != node_id);
                        }
                    }
                }
                NodeKind::Node | NodeKind::Root => {}
            }
        }

        for node_id in &subtree {
            self.nodes.remove(*node_id);
        }
        debug!("destroyed {} node(s) under {:?}", subtree.len(), id);
        Ok(())
    }

    /// The node itself followed by each of its ancestors, innermost first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes.contains_key(id).then_some(id), move |&current| {
            self.nodes.get(current).and_then(|node| node.parent)
        })
    }

    /// The node and every node below it, depth-first pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// The scene root when `id` is attached to it, `None` for detached subtrees
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).last().filter(|&top| top == self.root)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Node state
    // ─────────────────────────────────────────────────────────────────────────

    pub fn transform(&self, id: NodeId) -> Result<Transform2D> {
        Ok(self.get(id)?.transform)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform2D) -> Result<()> {
        self.edit_transform(id, |t| *t = transform)
    }

    pub fn translate_by(&mut self, id: NodeId, dx: f32, dy: f32) -> Result<()> {
        self.edit_transform(id, |t| t.translate(dx, dy))
    }

    pub fn scale_by(&mut self, id: NodeId, ratio: f32) -> Result<()> {
        self.edit_transform(id, |t| t.scale(ratio))
    }

    pub fn rotate_by(&mut self, id: NodeId, theta: f32) -> Result<()> {
        self.edit_transform(id, |t| t.rotate_in_place(theta))
    }

    fn edit_transform(&mut self, id: NodeId, edit: impl FnOnce(&mut Transform2D)) -> Result<()> {
        edit(&mut self.get_mut(id)?.transform);
        self.invalidate_chain(id);
        self.clear_global_below(id);
        self.invalidate_paint(id);
        Ok(())
    }

    /// Replace the local content bounds
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) -> Result<()> {
        self.get_mut(id)?.bounds = bounds;
        self.invalidate_chain(id);
        self.invalidate_paint(id);
        Ok(())
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        let node = self.get_mut(id)?;
        if node.visible != visible {
            node.visible = visible;
            self.invalidate_paint(id);
        }
        Ok(())
    }

    pub fn set_fill(&mut self, id: NodeId, fill: Option<Color>) -> Result<()> {
        self.get_mut(id)?.fill = fill;
        self.invalidate_paint(id);
        Ok(())
    }

    /// Attach a content extension that paints and sizes the node
    pub fn set_content(&mut self, id: NodeId, content: impl NodeContent + 'static) -> Result<()> {
        self.get_mut(id)?.content = Some(Box::new(content));
        self.invalidate_chain(id);
        self.invalidate_paint(id);
        Ok(())
    }

    /// Content of type `T` attached to the node, if any
    pub fn content<T: NodeContent + 'static>(&self, id: NodeId) -> Option<&T> {
        self.nodes
            .get(id)?
            .content
            .as_deref()
            .and_then(|content| content.as_any().downcast_ref::<T>())
    }

    /// Edit content of type `T` in place; bounds and paint are invalidated afterwards
    ///
    /// Returns `Ok(None)` when the node carries no content of that type.
    pub fn update_content<T, R>(&mut self, id: NodeId, edit: impl FnOnce(&mut T) -> R) -> Result<Option<R>>
    where
        T: NodeContent + 'static,
    {
        let node = self.get_mut(id)?;
        let Some(content) = node
            .content
            .as_deref_mut()
            .and_then(|content| content.as_any_mut().downcast_mut::<T>())
        else {
            return Ok(None);
        };
        let out = edit(content);
        self.invalidate_chain(id);
        self.invalidate_paint(id);
        Ok(Some(out))
    }

    /// Add a listener; adding the same listener twice is a no-op
    pub fn add_listener(&mut self, id: NodeId, listener: Rc<Listener>) -> Result<bool> {
        let node = self.get_mut(id)?;
        if node.listeners.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            return Ok(false);
        }
        node.listeners.push(listener);
        Ok(true)
    }

    pub fn remove_listener(&mut self, id: NodeId, listener: &Rc<Listener>) -> Result<bool> {
        let node = self.get_mut(id)?;
        let before = node.listeners.len();
        node.listeners.retain(|l| !Rc::ptr_eq(l, listener));
        Ok(node.listeners.len() != before)
    }

    pub fn listeners(&self, id: NodeId) -> Result<&[Rc<Listener>]> {
        Ok(self.get(id)?.listeners())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Bounds
    // ─────────────────────────────────────────────────────────────────────────

    /// Own content bounds unioned with all descendants, in the node's frame
    pub fn full_bounds(&self, id: NodeId) -> Result<Rect> {
        Ok(self.full_bounds_of(self.get(id)?))
    }

    pub(crate) fn full_bounds_of(&self, node: &Node) -> Rect {
        if let Some(cached) = node.full_bounds.get() {
            return cached;
        }

        let mut bounds = node
            .content
            .as_deref()
            .and_then(|content| content.layout(node))
            .unwrap_or(node.bounds);
        for &child_id in &node.children {
            if let Some(child) = self.nodes.get(child_id) {
                let child_bounds = self.full_bounds_of(child);
                bounds = bounds.union(&child.transform.map_rect(&child_bounds));
            }
        }

        node.full_bounds.set(Some(bounds));
        bounds
    }

    /// Full bounds in the root's frame
    pub fn global_full_bounds(&self, id: NodeId) -> Result<Rect> {
        let node = self.get(id)?;
        if let Some(cached) = node.global_full_bounds.get() {
            return Ok(cached);
        }
        let bounds = self
            .global_transform(id)?
            .map_rect(&self.full_bounds_of(node));
        node.global_full_bounds.set(Some(bounds));
        Ok(bounds)
    }

    /// Clear both bounds caches on this node and every ancestor
    pub fn invalidate_bounds(&self, id: NodeId) -> Result<()> {
        self.get(id)?;
        self.invalidate_chain(id);
        Ok(())
    }

    fn invalidate_chain(&self, id: NodeId) {
        for ancestor in self.ancestors(id) {
            if let Some(node) = self.nodes.get(ancestor) {
                node.clear_caches();
            }
        }
    }

    /// Global bounds below `id` depend on its transform and ancestry.
    fn clear_global_below(&self, id: NodeId) {
        for node_id in self.descendants(id) {
            if let Some(node) = self.nodes.get(node_id) {
                node.global_full_bounds.set(None);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Coordinate conversion
    // ─────────────────────────────────────────────────────────────────────────

    pub fn local_to_parent(&self, id: NodeId, point: Point) -> Result<Point> {
        Ok(self.get(id)?.transform.map_point(point))
    }

    pub fn parent_to_local(&self, id: NodeId, point: Point) -> Result<Point> {
        Ok(self.get(id)?.transform.invert()?.map_point(point))
    }

    /// Transform from this node's frame to the root's frame
    ///
    /// The root's own transform is not part of the result; a detached
    /// subtree's top node is treated the same way.
    pub fn global_transform(&self, id: NodeId) -> Result<Transform2D> {
        let mut transform = Transform2D::IDENTITY;
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent {
            transform = current.transform.compose(&transform);
            current = self.get(parent)?;
        }
        Ok(transform)
    }

    pub fn local_to_global(&self, id: NodeId, point: Point) -> Result<Point> {
        Ok(self.global_transform(id)?.map_point(point))
    }

    pub fn global_to_local(&self, id: NodeId, point: Point) -> Result<Point> {
        Ok(self.global_transform(id)?.invert()?.map_point(point))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Paint invalidation
    // ─────────────────────────────────────────────────────────────────────────

    /// Mark the scene paint-stale if `id` is attached to the root
    pub fn invalidate_paint(&mut self, id: NodeId) {
        if self.root_of(id).is_some() {
            self.paint_stale = true;
        }
    }

    pub fn is_paint_stale(&self) -> bool {
        self.paint_stale
    }

    /// Clear the paint-stale flag, returning whether it was set
    pub fn take_paint_stale(&mut self) -> bool {
        std::mem::replace(&mut self.paint_stale, false)
    }
}

//! Scene node storage
//!
//! Nodes live in the [`Scene`](crate::scene::Scene) arena and are addressed by
//! [`NodeId`]. A node never owns its parent; the back-reference is just an id.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::events::Listener;
use crate::geometry::{Rect, Transform2D};
use crate::paint::{Color, NodeContent};

new_key_type! {
    /// Unique identifier for a scene node
    pub struct NodeId;
}

/// What a node is, beyond the common node state
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Plain drawable node
    Node,
    /// The scene root; exactly one per scene
    Root,
    /// A layer, with the cameras currently displaying it
    Layer { cameras: SmallVec<[NodeId; 2]> },
    /// A camera, with its layers in paint order and its pan/zoom transform
    Camera {
        layers: Vec<NodeId>,
        view_transform: Transform2D,
    },
}

impl NodeKind {
    pub(crate) fn layer() -> Self {
        NodeKind::Layer {
            cameras: SmallVec::new(),
        }
    }

    pub(crate) fn camera() -> Self {
        NodeKind::Camera {
            layers: Vec::new(),
            view_transform: Transform2D::IDENTITY,
        }
    }
}

/// Construction options for a node
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeOptions {
    /// Fill color for the node's content bounds; `None` paints nothing
    pub fill: Option<Color>,
    /// Local content bounds
    pub bounds: Rect,
}

impl NodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }
}

/// A node in the scene arena
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) transform: Transform2D,
    pub(crate) bounds: Rect,
    pub(crate) visible: bool,
    pub(crate) fill: Option<Color>,
    pub(crate) listeners: Vec<Rc<Listener>>,
    pub(crate) content: Option<Box<dyn NodeContent>>,
    pub(crate) kind: NodeKind,
    /// Local-space union of own and descendant bounds
    pub(crate) full_bounds: Cell<Option<Rect>>,
    /// `full_bounds` in the root's frame
    pub(crate) global_full_bounds: Cell<Option<Rect>>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, options: NodeOptions) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            transform: Transform2D::IDENTITY,
            bounds: options.bounds,
            visible: true,
            fill: options.fill,
            listeners: Vec::new(),
            content: None,
            kind,
            full_bounds: Cell::new(None),
            global_full_bounds: Cell::new(None),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn transform(&self) -> &Transform2D {
        &self.transform
    }

    /// Local content bounds, before any content layout
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn listeners(&self) -> &[Rc<Listener>] {
        &self.listeners
    }

    pub fn content(&self) -> Option<&dyn NodeContent> {
        self.content.as_deref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_layer(&self) -> bool {
        matches!(self.kind, NodeKind::Layer { .. })
    }

    pub fn is_camera(&self) -> bool {
        matches!(self.kind, NodeKind::Camera { .. })
    }

    /// Cameras displaying this node, empty unless it is a layer
    pub fn cameras(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Layer { cameras } => cameras,
            _ => &[],
        }
    }

    /// Layers shown by this node, empty unless it is a camera
    pub fn layers(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Camera { layers, .. } => layers,
            _ => &[],
        }
    }

    pub fn view_transform(&self) -> Option<&Transform2D> {
        match &self.kind {
            NodeKind::Camera { view_transform, .. } => Some(view_transform),
            _ => None,
        }
    }

    pub fn cached_full_bounds(&self) -> Option<Rect> {
        self.full_bounds.get()
    }

    pub fn cached_global_full_bounds(&self) -> Option<Rect> {
        self.global_full_bounds.get()
    }

    pub(crate) fn clear_caches(&self) {
        self.full_bounds.set(None);
        self.global_full_bounds.set(None);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("transform", &self.transform)
            .field("bounds", &self.bounds)
            .field("visible", &self.visible)
            .field("fill", &self.fill)
            .field("listeners", &self.listeners.len())
            .field("has_content", &self.content.is_some())
            .finish()
    }
}

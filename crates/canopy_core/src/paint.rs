//! Painting: the painter contract and the full-paint traversal
//!
//! The scene never rasterizes anything itself. It walks visible nodes and calls
//! a [`Painter`] with, per node: push transform, paint own content, paint the
//! children, paint any after-children content, pop transform. Subtrees whose
//! global bounds miss the painter's clip rect are skipped.
//!
//! # Example
//!
//! ```rust
//! use canopy_core::{Color, NodeOptions, Rect, RecordingPainter, Scene, Size};
//!
//! let mut scene = Scene::new();
//! let node = scene.create_node(
//!     NodeOptions::new()
//!         .with_fill(Color::BLUE)
//!         .with_bounds(Rect::new(0.0, 0.0, 100.0, 50.0)),
//! );
//! scene.add_child(scene.root(), node).unwrap();
//!
//! let mut painter = RecordingPainter::new(Size::new(800.0, 600.0));
//! scene.full_paint(scene.root(), &mut painter).unwrap();
//! assert_eq!(painter.filled_rects().len(), 1);
//! ```

use std::any::Any;

use tracing::{trace, warn};

use crate::error::Result;
use crate::geometry::{Point, Rect, Size, Transform2D};
use crate::image::ImageId;
use crate::node::{Node, NodeId, NodeKind};
use crate::scene::Scene;

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// RGBA color (linear space)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<[f32; 4]> for Color {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Color::rgba(r, g, b, a)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Painter
// ─────────────────────────────────────────────────────────────────────────────

/// Drawing surface consumed by the paint traversal
pub trait Painter {
    /// Push a transform; it applies on top of the current one
    fn push_transform(&mut self, transform: Transform2D);

    /// Pop the top transform from the stack
    fn pop_transform(&mut self);

    /// Get the current combined transform
    fn current_transform(&self) -> Transform2D;

    /// Fill a rect given in the current local frame
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a run of text with its top-left at `origin`
    fn fill_text(&mut self, text: &str, origin: Point, font_size: f32, color: Color);

    /// Draw a loaded image stretched over `rect` in the current local frame
    fn draw_image(&mut self, image: ImageId, rect: Rect);

    /// Visible region in the frame of the nodes being painted, `None` for unbounded
    fn clip_bounds(&self) -> Option<Rect>;

    fn set_clip_bounds(&mut self, clip: Option<Rect>);

    /// Current zoom factor, used by content that fades out when tiny
    fn display_scale(&self) -> f32;

    fn set_display_scale(&mut self, scale: f32);
}

/// A recorded painter call
#[derive(Clone, Debug, PartialEq)]
pub enum PaintCommand {
    PushTransform(Transform2D),
    PopTransform,
    FillRect {
        rect: Rect,
        color: Color,
        /// `rect` mapped through the transform stack at record time
        device_rect: Rect,
    },
    FillText {
        text: String,
        origin: Point,
        font_size: f32,
        color: Color,
    },
    DrawImage {
        image: ImageId,
        rect: Rect,
        device_rect: Rect,
    },
}

/// A painter that records commands instead of drawing
#[derive(Debug)]
pub struct RecordingPainter {
    commands: Vec<PaintCommand>,
    transform_stack: Vec<Transform2D>,
    clip: Option<Rect>,
    display_scale: f32,
    viewport: Size,
}

impl RecordingPainter {
    pub fn new(viewport: Size) -> Self {
        Self {
            commands: Vec::new(),
            transform_stack: vec![Transform2D::IDENTITY],
            clip: None,
            display_scale: 1.0,
            viewport,
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Drop recorded commands and reset all painter state
    pub fn clear(&mut self) {
        self.commands.clear();
        self.transform_stack = vec![Transform2D::IDENTITY];
        self.clip = None;
        self.display_scale = 1.0;
    }

    /// Device-space rects of every fill, in paint order
    pub fn filled_rects(&self) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                PaintCommand::FillRect { device_rect, .. } => Some(*device_rect),
                _ => None,
            })
            .collect()
    }

    /// Images drawn with their device-space rects, in paint order
    pub fn images(&self) -> Vec<(ImageId, Rect)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                PaintCommand::DrawImage {
                    image, device_rect, ..
                } => Some((*image, *device_rect)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                PaintCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Default for RecordingPainter {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl Painter for RecordingPainter {
    fn push_transform(&mut self, transform: Transform2D) {
        self.commands.push(PaintCommand::PushTransform(transform));
        let combined = self.current_transform().compose(&transform);
        self.transform_stack.push(combined);
    }

    fn pop_transform(&mut self) {
        self.commands.push(PaintCommand::PopTransform);
        if self.transform_stack.len() > 1 {
            self.transform_stack.pop();
        }
    }

    fn current_transform(&self) -> Transform2D {
        self.transform_stack.last().copied().unwrap_or_default()
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let device_rect = self.current_transform().map_rect(&rect);
        self.commands.push(PaintCommand::FillRect {
            rect,
            color,
            device_rect,
        });
    }

    fn fill_text(&mut self, text: &str, origin: Point, font_size: f32, color: Color) {
        self.commands.push(PaintCommand::FillText {
            text: text.to_string(),
            origin,
            font_size,
            color,
        });
    }

    fn draw_image(&mut self, image: ImageId, rect: Rect) {
        let device_rect = self.current_transform().map_rect(&rect);
        self.commands.push(PaintCommand::DrawImage {
            image,
            rect,
            device_rect,
        });
    }

    fn clip_bounds(&self) -> Option<Rect> {
        self.clip
    }

    fn set_clip_bounds(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    fn display_scale(&self) -> f32 {
        self.display_scale
    }

    fn set_display_scale(&mut self, scale: f32) {
        self.display_scale = scale;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Node content
// ─────────────────────────────────────────────────────────────────────────────

/// Per-node state handed to content hooks during painting
#[derive(Clone, Copy, Debug)]
pub struct PaintContext<'a> {
    pub id: NodeId,
    pub node: &'a Node,
    pub global_full_bounds: Rect,
    pub display_scale: f32,
}

/// Extension point for nodes that size and paint themselves
pub trait NodeContent {
    /// Content bounds derived by the content; `None` keeps the node's own bounds
    fn layout(&self, _node: &Node) -> Option<Rect> {
        None
    }

    /// Paint the node's own content, replacing the default fill
    fn paint(&self, cx: &PaintContext<'_>, painter: &mut dyn Painter);

    /// Paint on top of the node's children
    fn paint_after_children(&self, _cx: &PaintContext<'_>, _painter: &mut dyn Painter) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Fill the node's content bounds with its fill color, if it has both
pub fn paint_fill(node: &Node, painter: &mut dyn Painter) {
    if let Some(fill) = node.fill {
        if !node.bounds.is_empty() {
            painter.fill_rect(node.bounds, fill);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Traversal
// ─────────────────────────────────────────────────────────────────────────────

impl Scene {
    /// Paint a node and its subtree
    ///
    /// Hidden nodes are skipped along with their children. When the painter
    /// has a clip rect, subtrees whose global full bounds miss it are culled.
    pub fn full_paint(&self, id: NodeId, painter: &mut dyn Painter) -> Result<()> {
        self.get(id)?;
        self.paint_node(id, painter);
        Ok(())
    }

    fn paint_node(&self, id: NodeId, painter: &mut dyn Painter) {
        let Some(node) = self.node(id) else {
            return;
        };
        if !node.visible {
            return;
        }

        let global_full_bounds = match self.global_full_bounds(id) {
            Ok(bounds) => bounds,
            Err(_) => return,
        };
        if let Some(clip) = painter.clip_bounds() {
            if !clip.intersects(&global_full_bounds) {
                trace!("culled {:?}", id);
                return;
            }
        }

        painter.push_transform(node.transform);
        let cx = PaintContext {
            id,
            node,
            global_full_bounds,
            display_scale: painter.display_scale(),
        };

        match node.content.as_deref() {
            Some(content) => content.paint(&cx, painter),
            None => paint_fill(node, painter),
        }
        if let NodeKind::Camera {
            layers,
            view_transform,
        } = &node.kind
        {
            self.paint_camera_view(id, node.bounds, layers, view_transform, painter);
        }

        for &child in &node.children {
            self.paint_node(child, painter);
        }

        if let Some(content) = node.content.as_deref() {
            content.paint_after_children(&cx, painter);
        }
        painter.pop_transform();
    }

    fn paint_camera_view(
        &self,
        camera: NodeId,
        viewport: Rect,
        layers: &[NodeId],
        view_transform: &Transform2D,
        painter: &mut dyn Painter,
    ) {
        let view_inverse = match view_transform.invert() {
            Ok(inverse) => inverse,
            Err(err) => {
                warn!("camera {:?} skipped its layers: {}", camera, err);
                return;
            }
        };

        let previous_clip = painter.clip_bounds();
        let previous_scale = painter.display_scale();
        painter.push_transform(*view_transform);
        painter.set_display_scale(view_transform.uniform_scale_magnitude());
        painter.set_clip_bounds(Some(view_inverse.map_rect(&viewport)));

        for &layer in layers {
            self.paint_node(layer, painter);
        }

        painter.set_clip_bounds(previous_clip);
        painter.set_display_scale(previous_scale);
        painter.pop_transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeOptions;

    fn filled(scene: &mut Scene, bounds: Rect, color: Color) -> NodeId {
        scene.create_node(NodeOptions::new().with_fill(color).with_bounds(bounds))
    }

    #[test]
    fn test_recording_painter() {
        let mut painter = RecordingPainter::new(Size::new(800.0, 600.0));

        painter.push_transform(Transform2D::translation(10.0, 20.0));
        painter.push_transform(Transform2D::scaling(2.0, 2.0));
        painter.fill_rect(Rect::new(0.0, 0.0, 5.0, 5.0), Color::RED);
        painter.pop_transform();
        painter.pop_transform();
        // Popping past the base does not panic.
        painter.pop_transform();

        assert_eq!(painter.commands().len(), 6);
        assert_eq!(
            painter.filled_rects(),
            vec![Rect::new(10.0, 20.0, 10.0, 10.0)]
        );
        assert!(painter.current_transform().is_identity());

        painter.clear();
        assert!(painter.commands().is_empty());
    }

    #[test]
    fn test_paint_order_and_nesting() {
        let mut scene = Scene::new();
        let root = scene.root();
        let parent = filled(&mut scene, Rect::new(0.0, 0.0, 50.0, 50.0), Color::RED);
        let child = filled(&mut scene, Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLUE);
        scene.add_child(root, parent).unwrap();
        scene.add_child(parent, child).unwrap();
        scene.translate_by(child, 5.0, 5.0).unwrap();

        let mut painter = RecordingPainter::default();
        scene.full_paint(root, &mut painter).unwrap();

        assert_eq!(
            painter.filled_rects(),
            vec![
                Rect::new(0.0, 0.0, 50.0, 50.0),
                Rect::new(5.0, 5.0, 10.0, 10.0),
            ]
        );
        let pushes = painter
            .commands()
            .iter()
            .filter(|c| matches!(c, PaintCommand::PushTransform(_)))
            .count();
        let pops = painter
            .commands()
            .iter()
            .filter(|c| matches!(c, PaintCommand::PopTransform))
            .count();
        assert_eq!(pushes, 3);
        assert_eq!(pushes, pops);
    }

    #[test]
    fn test_hidden_subtree_not_painted() {
        let mut scene = Scene::new();
        let root = scene.root();
        let parent = filled(&mut scene, Rect::new(0.0, 0.0, 50.0, 50.0), Color::RED);
        let child = filled(&mut scene, Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLUE);
        scene.add_child(root, parent).unwrap();
        scene.add_child(parent, child).unwrap();
        scene.set_visible(parent, false).unwrap();

        let mut painter = RecordingPainter::default();
        scene.full_paint(root, &mut painter).unwrap();
        assert!(painter.filled_rects().is_empty());
    }

    #[test]
    fn test_empty_bounds_not_filled() {
        let mut scene = Scene::new();
        let root = scene.root();
        let node = scene.create_node(NodeOptions::new().with_fill(Color::RED));
        scene.add_child(root, node).unwrap();

        let mut painter = RecordingPainter::default();
        scene.full_paint(root, &mut painter).unwrap();
        assert!(painter.filled_rects().is_empty());
    }

    #[test]
    fn test_clip_culls_subtrees() {
        let mut scene = Scene::new();
        let root = scene.root();
        let near = filled(&mut scene, Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED);
        let far = filled(&mut scene, Rect::new(500.0, 500.0, 10.0, 10.0), Color::BLUE);
        scene.add_child(root, near).unwrap();
        scene.add_child(root, far).unwrap();

        let mut painter = RecordingPainter::default();
        painter.set_clip_bounds(Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
        scene.full_paint(root, &mut painter).unwrap();
        assert_eq!(
            painter.filled_rects(),
            vec![Rect::new(0.0, 0.0, 10.0, 10.0)]
        );
    }

    #[test]
    fn test_camera_paints_layers_through_view() {
        let mut scene = Scene::new();
        let root = scene.root();
        let layer = scene.create_layer(NodeOptions::new());
        let camera = scene.create_camera(Rect::new(0.0, 0.0, 100.0, 100.0));
        scene.add_child(root, layer).unwrap();
        scene.add_child(root, camera).unwrap();
        scene.add_layer(camera, layer).unwrap();

        let inside = filled(&mut scene, Rect::new(10.0, 10.0, 10.0, 10.0), Color::RED);
        let outside = filled(&mut scene, Rect::new(80.0, 80.0, 10.0, 10.0), Color::BLUE);
        scene.add_child(layer, inside).unwrap();
        scene.add_child(layer, outside).unwrap();

        // Zoomed 2x, the camera sees layer coordinates 0..50.
        scene
            .set_view_transform(camera, Transform2D::scaling(2.0, 2.0))
            .unwrap();

        let mut painter = RecordingPainter::default();
        scene.full_paint(camera, &mut painter).unwrap();

        assert_eq!(
            painter.filled_rects(),
            vec![Rect::new(20.0, 20.0, 20.0, 20.0)]
        );
        // Clip and scale are restored after the camera's layers.
        assert_eq!(painter.clip_bounds(), None);
        assert_eq!(painter.display_scale(), 1.0);
    }

    #[test]
    fn test_degenerate_view_skips_layers() {
        let mut scene = Scene::new();
        let root = scene.root();
        let layer = scene.create_layer(NodeOptions::new());
        let camera = scene.create_camera(Rect::new(0.0, 0.0, 100.0, 100.0));
        scene.add_child(root, layer).unwrap();
        scene.add_child(root, camera).unwrap();
        scene.add_layer(camera, layer).unwrap();
        let node = filled(&mut scene, Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED);
        scene.add_child(layer, node).unwrap();

        scene
            .set_view_transform(camera, Transform2D::scaling(0.0, 0.0))
            .unwrap();
        let mut painter = RecordingPainter::default();
        scene.full_paint(camera, &mut painter).unwrap();
        assert!(painter.filled_rects().is_empty());
    }

    struct Outline {
        color: Color,
    }

    impl NodeContent for Outline {
        fn layout(&self, _node: &Node) -> Option<Rect> {
            Some(Rect::new(0.0, 0.0, 4.0, 4.0))
        }

        fn paint(&self, _cx: &PaintContext<'_>, painter: &mut dyn Painter) {
            painter.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), self.color);
        }

        fn paint_after_children(&self, _cx: &PaintContext<'_>, painter: &mut dyn Painter) {
            painter.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), self.color);
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_content_hooks() {
        let mut scene = Scene::new();
        let root = scene.root();
        let node = filled(&mut scene, Rect::new(0.0, 0.0, 50.0, 50.0), Color::RED);
        let child = filled(&mut scene, Rect::new(2.0, 2.0, 2.0, 2.0), Color::BLUE);
        scene.add_child(root, node).unwrap();
        scene.add_child(node, child).unwrap();
        scene
            .set_content(node, Outline { color: Color::GREEN })
            .unwrap();

        // Content layout replaces the node's own bounds.
        assert_eq!(
            scene.full_bounds(node).unwrap(),
            Rect::new(0.0, 0.0, 4.0, 4.0)
        );

        let mut painter = RecordingPainter::default();
        scene.full_paint(root, &mut painter).unwrap();
        assert_eq!(
            painter.filled_rects(),
            vec![
                Rect::new(0.0, 0.0, 4.0, 4.0),
                Rect::new(2.0, 2.0, 2.0, 2.0),
                Rect::new(0.0, 0.0, 1.0, 1.0),
            ]
        );

        scene
            .update_content(node, |outline: &mut Outline| outline.color = Color::WHITE)
            .unwrap();
        assert_eq!(scene.content::<Outline>(node).unwrap().color, Color::WHITE);
    }
}

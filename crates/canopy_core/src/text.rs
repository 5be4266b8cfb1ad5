//! Text content
//!
//! [`TextContent`] sizes its node from a [`TextMeasurer`] and skips painting
//! while its on-screen height is under [`MIN_VISIBLE_HEIGHT`] pixels.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::geometry::{Point, Rect};
use crate::node::Node;
use crate::paint::{Color, NodeContent, PaintContext, Painter};

pub const DEFAULT_FONT_SIZE: f32 = 20.0;

/// Text shorter than this on screen is not painted
pub const MIN_VISIBLE_HEIGHT: f32 = 3.0;

/// Font metrics provider
pub trait TextMeasurer {
    /// Advance width of `text` at `font_size`
    fn measure_width(&self, text: &str, font_size: f32) -> f32;
}

/// Every glyph advances by a fixed fraction of the font size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasurer {
    pub advance: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self { advance: 0.6 }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * self.advance
    }
}

/// A single run of text
#[derive(Clone)]
pub struct TextContent {
    text: String,
    font_size: f32,
    color: Color,
    measurer: Rc<dyn TextMeasurer>,
}

impl TextContent {
    pub fn new(text: impl Into<String>, measurer: Rc<dyn TextMeasurer>) -> Self {
        Self {
            text: text.into(),
            font_size: DEFAULT_FONT_SIZE,
            color: Color::BLACK,
            measurer,
        }
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn color(&self) -> Color {
        self.color
    }

    fn measured_bounds(&self, node: &Node) -> Rect {
        let origin = if node.bounds().is_initialized() {
            node.bounds().origin()
        } else {
            Point::ZERO
        };
        if self.text.is_empty() {
            return Rect::new(origin.x, origin.y, 0.0, 0.0);
        }
        let width = self.measurer.measure_width(&self.text, self.font_size);
        Rect::new(origin.x, origin.y, width, self.font_size)
    }
}

impl fmt::Debug for TextContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextContent")
            .field("text", &self.text)
            .field("font_size", &self.font_size)
            .field("color", &self.color)
            .finish()
    }
}

impl NodeContent for TextContent {
    fn layout(&self, node: &Node) -> Option<Rect> {
        Some(self.measured_bounds(node))
    }

    fn paint(&self, cx: &PaintContext<'_>, painter: &mut dyn Painter) {
        if self.text.is_empty()
            || cx.global_full_bounds.height() * cx.display_scale < MIN_VISIBLE_HEIGHT
        {
            return;
        }
        let origin = self.measured_bounds(cx.node).origin();
        painter.fill_text(&self.text, origin, self.font_size, self.color);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Transform2D;
    use crate::node::NodeOptions;
    use crate::paint::RecordingPainter;
    use crate::scene::Scene;

    fn measurer() -> Rc<dyn TextMeasurer> {
        Rc::new(MonospaceMeasurer { advance: 0.5 })
    }

    #[test]
    fn test_text_bounds_follow_measurement() {
        let mut scene = Scene::new();
        let root = scene.root();
        let label = scene.create_node(
            NodeOptions::new().with_bounds(Rect::new(10.0, 5.0, 0.0, 0.0)),
        );
        scene.add_child(root, label).unwrap();
        scene
            .set_content(label, TextContent::new("hello", measurer()))
            .unwrap();

        assert_eq!(
            scene.full_bounds(label).unwrap(),
            Rect::new(10.0, 5.0, 50.0, 20.0)
        );

        scene
            .update_content(label, |text: &mut TextContent| text.set_text("hi"))
            .unwrap();
        assert_eq!(
            scene.full_bounds(label).unwrap(),
            Rect::new(10.0, 5.0, 20.0, 20.0)
        );
        assert_eq!(scene.content::<TextContent>(label).unwrap().text(), "hi");
    }

    #[test]
    fn test_text_painted_at_readable_size() {
        let mut scene = Scene::new();
        let root = scene.root();
        let label = scene.create_node(NodeOptions::new());
        scene.add_child(root, label).unwrap();
        scene
            .set_content(
                label,
                TextContent::new("zoom", measurer()).with_color(Color::RED),
            )
            .unwrap();

        let mut painter = RecordingPainter::default();
        scene.full_paint(root, &mut painter).unwrap();
        assert_eq!(painter.texts(), vec!["zoom"]);

        // 20px tall at a display scale of 0.1 is 2px on screen.
        let mut painter = RecordingPainter::default();
        painter.set_display_scale(0.1);
        scene.full_paint(root, &mut painter).unwrap();
        assert!(painter.texts().is_empty());

        // Shrinking the node itself has the same effect.
        scene
            .set_transform(label, Transform2D::scaling(0.1, 0.1))
            .unwrap();
        let mut painter = RecordingPainter::default();
        scene.full_paint(root, &mut painter).unwrap();
        assert!(painter.texts().is_empty());
    }

    #[test]
    fn test_empty_text() {
        let mut scene = Scene::new();
        let label = scene.create_node(NodeOptions::new());
        scene
            .set_content(label, TextContent::new("", measurer()))
            .unwrap();
        assert_eq!(
            scene.full_bounds(label).unwrap(),
            Rect::new(0.0, 0.0, 0.0, 0.0)
        );
        let width = MonospaceMeasurer::default().measure_width("abc", 10.0);
        assert!((width - 18.0).abs() < 1e-4);
    }
}

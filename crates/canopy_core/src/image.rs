//! Image content
//!
//! [`ImageContent`] shows a bitmap supplied by an [`ImageSource`]. Decoding and
//! fetching belong to the host: until the source reports a loaded image the
//! node keeps its own bounds and paints nothing. Once loaded, the node is
//! sized to the image and the painter is asked to draw it by [`ImageId`].

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::Result;
use crate::geometry::{Point, Rect, Size};
use crate::node::{Node, NodeId};
use crate::paint::{NodeContent, PaintContext, Painter};
use crate::scene::Scene;

/// Handle to an image owned by the host's image store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageId(pub u64);

/// A decoded image ready to paint
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadedImage {
    pub id: ImageId,
    /// Natural size in local units
    pub size: Size,
}

/// Reports whether an image has finished loading
pub trait ImageSource {
    fn loaded(&self) -> Option<LoadedImage>;
}

/// Shared slot a host loader fills in when decoding completes
///
/// Clones share the slot. After filling it, call [`Scene::image_loaded`] so
/// the node picks up its new size.
#[derive(Clone, Debug, Default)]
pub struct ImageSlot {
    image: Rc<Cell<Option<LoadedImage>>>,
}

impl ImageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that starts out loaded
    pub fn ready(image: LoadedImage) -> Self {
        let slot = Self::new();
        slot.set(image);
        slot
    }

    pub fn set(&self, image: LoadedImage) {
        self.image.set(Some(image));
    }

    pub fn clear(&self) {
        self.image.set(None);
    }
}

impl ImageSource for ImageSlot {
    fn loaded(&self) -> Option<LoadedImage> {
        self.image.get()
    }
}

/// A bitmap drawn at its natural size
#[derive(Clone)]
pub struct ImageContent {
    source: Rc<dyn ImageSource>,
}

impl ImageContent {
    pub fn new(source: Rc<dyn ImageSource>) -> Self {
        Self { source }
    }

    pub fn is_loaded(&self) -> bool {
        self.source.loaded().is_some()
    }

    fn image_rect(&self, node: &Node) -> Option<(ImageId, Rect)> {
        let image = self.source.loaded()?;
        let origin = if node.bounds().is_initialized() {
            node.bounds().origin()
        } else {
            Point::ZERO
        };
        Some((image.id, Rect::from_origin_size(origin, image.size)))
    }
}

impl fmt::Debug for ImageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageContent")
            .field("loaded", &self.source.loaded())
            .finish()
    }
}

impl NodeContent for ImageContent {
    fn layout(&self, node: &Node) -> Option<Rect> {
        self.image_rect(node).map(|(_, rect)| rect)
    }

    fn paint(&self, cx: &PaintContext<'_>, painter: &mut dyn Painter) {
        if let Some((image, rect)) = self.image_rect(cx.node) {
            painter.draw_image(image, rect);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Scene {
    /// Pick up a finished load on an image node
    ///
    /// Invalidates the node's bounds and paint. Returns whether the image
    /// is now loaded; nodes without [`ImageContent`] report `false`.
    pub fn image_loaded(&mut self, id: NodeId) -> Result<bool> {
        let loaded = self
            .update_content(id, |image: &mut ImageContent| image.is_loaded())?
            .unwrap_or(false);
        debug!("image on {:?} loaded: {}", id, loaded);
        Ok(loaded)
    }
}

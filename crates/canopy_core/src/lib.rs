//! Canopy Core
//!
//! A retained-mode 2D scenegraph:
//!
//! - **Geometry**: points, rects with an "unset" state, and 2×3 affine transforms
//! - **Scene**: an arena of nodes with lazily cached local and global bounds
//! - **Cameras & layers**: view transforms, clip culling, and bounds-based picking
//! - **Painting**: a narrow [`Painter`] trait and a recording implementation
//! - **Content**: text and image nodes that size and paint themselves
//! - **Scheduling**: cooperative, timer-driven [`Activity`] tasks
//!
//! # Example
//!
//! ```rust
//! use canopy_core::{NodeOptions, Point, Rect, Scene};
//!
//! let mut scene = Scene::new();
//! let root = scene.root();
//!
//! let layer = scene.create_layer(NodeOptions::new());
//! let camera = scene.create_camera(Rect::new(0.0, 0.0, 800.0, 600.0));
//! scene.add_child(root, layer).unwrap();
//! scene.add_child(root, camera).unwrap();
//! scene.add_layer(camera, layer).unwrap();
//!
//! let card = scene.create_node(NodeOptions::new().with_bounds(Rect::new(0.0, 0.0, 100.0, 100.0)));
//! scene.add_child(layer, card).unwrap();
//!
//! assert_eq!(scene.picked_nodes(camera, Point::new(50.0, 50.0)).unwrap(), vec![card]);
//! ```

pub mod camera;
pub mod error;
pub mod events;
pub mod geometry;
pub mod image;
pub mod node;
pub mod paint;
pub mod scene;
pub mod scheduler;
pub mod text;

pub use error::{Result, SceneError};
pub use events::{EventCallback, EventType, Listener, PointerEvent};
pub use geometry::{Point, Rect, Size, Transform2D};
pub use image::{ImageContent, ImageId, ImageSlot, ImageSource, LoadedImage};
pub use node::{Node, NodeId, NodeKind, NodeOptions};
pub use paint::{
    paint_fill, Color, NodeContent, PaintCommand, PaintContext, Painter, RecordingPainter,
};
pub use scene::Scene;
pub use scheduler::{
    Activity, ActivityId, ActivityScheduler, ActivityStep, Clock, FnActivity, FrameTimer,
    ManualClock, ManualTimer, SystemClock, DEFAULT_FRAME_INTERVAL,
};
pub use text::{MonospaceMeasurer, TextContent, TextMeasurer, DEFAULT_FONT_SIZE};

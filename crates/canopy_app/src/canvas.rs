//! Canvas driver
//!
//! A [`Canvas`] owns a scene wired the usual way: the root holds one layer
//! and one camera, and the camera shows the layer through a viewport of the
//! configured size. Hosts call [`Canvas::run_frame`] from their frame loop;
//! it ticks activities and repaints only when the scene is paint-stale.

use std::time::{Duration, Instant};

use canopy_animation::SceneAnimationExt;
use canopy_core::{
    ActivityId, ActivityScheduler, EventType, NodeId, NodeOptions, Painter, Point, Scene,
    Transform2D,
};
use tracing::debug;

use crate::config::CanvasConfig;
use crate::error::Result;
use crate::input::{InputRouter, PointerInput};

/// What a single frame did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Whether the scene was repainted
    pub painted: bool,
    /// Activities still live after the tick
    pub active_activities: usize,
    /// Whether the activity timer is still running
    pub timer_running: bool,
}

/// A scene plus its default layer, camera, and input router
pub struct Canvas {
    scene: Scene,
    layer: NodeId,
    camera: NodeId,
    router: InputRouter,
    config: CanvasConfig,
    frames: u64,
}

impl Canvas {
    /// Build a canvas with a wall-clock scheduler
    pub fn new(config: CanvasConfig) -> Result<Self> {
        Self::with_scheduler(config, ActivityScheduler::new())
    }

    /// Build a canvas around a caller-supplied scheduler
    ///
    /// The configured frame interval overrides the scheduler's.
    pub fn with_scheduler(config: CanvasConfig, scheduler: ActivityScheduler) -> Result<Self> {
        config.validate()?;
        let mut scene =
            Scene::with_scheduler(scheduler.with_frame_interval(config.frame_interval()));
        let root = scene.root();

        let layer = scene.create_layer(NodeOptions::new());
        let camera = scene.create_camera(config.viewport());
        scene.add_child(root, layer)?;
        scene.add_child(root, camera)?;
        scene.add_layer(camera, layer)?;

        debug!(
            "canvas {}x{} ready (layer {:?}, camera {:?})",
            config.width, config.height, layer, camera
        );
        Ok(Self {
            scene,
            layer,
            camera,
            router: InputRouter::new(camera),
            config,
            frames: 0,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn root(&self) -> NodeId {
        self.scene.root()
    }

    pub fn layer(&self) -> NodeId {
        self.layer
    }

    pub fn camera(&self) -> NodeId {
        self.camera
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Frames painted so far
    pub fn frames_painted(&self) -> u64 {
        self.frames
    }

    /// Resize the viewport; the camera's bounds follow
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        let mut config = self.config.clone();
        config.width = width;
        config.height = height;
        config.validate()?;

        self.scene.set_bounds(self.camera, config.viewport())?;
        self.config = config;
        Ok(())
    }

    /// Tick activities at `now`, then repaint if anything changed
    ///
    /// An activity error is returned before painting; the failing activity
    /// has already been dropped, so the next frame carries on.
    pub fn run_frame(&mut self, now: Instant, painter: &mut dyn Painter) -> Result<FrameReport> {
        self.scene.tick_at(now)?;

        let painted = self.scene.take_paint_stale();
        if painted {
            painter.fill_rect(self.config.viewport(), self.config.background_color());
            self.scene.full_paint(self.camera, painter)?;
            self.frames += 1;
            debug!("painted frame {}", self.frames);
        }

        let scheduler = self.scene.scheduler();
        Ok(FrameReport {
            painted,
            active_activities: scheduler.len(),
            timer_running: scheduler.is_timer_running(),
        })
    }

    /// Nodes under a screen point
    pub fn picked_nodes(&self, x: f32, y: f32) -> Result<Vec<NodeId>> {
        Ok(self.scene.picked_nodes(self.camera, Point::new(x, y))?)
    }

    /// Route pointer input through the camera to node listeners
    pub fn handle_pointer(
        &mut self,
        input: PointerInput,
        x: f32,
        y: f32,
    ) -> Result<Vec<(NodeId, EventType)>> {
        self.router.handle(&mut self.scene, input, Point::new(x, y))
    }

    /// The pointer left the canvas
    pub fn pointer_exit(&mut self) -> Result<Vec<(NodeId, EventType)>> {
        self.router.pointer_exit(&mut self.scene)
    }

    /// Animate the camera's pan/zoom
    pub fn animate_view_to(
        &mut self,
        view: Transform2D,
        duration: Duration,
    ) -> Result<Option<ActivityId>> {
        Ok(self
            .scene
            .animate_view_to_transform(self.camera, view, duration)?)
    }
}

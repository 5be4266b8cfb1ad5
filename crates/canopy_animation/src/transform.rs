//! Transform animations
//!
//! [`TransformActivity`] moves a node's local transform and
//! [`ViewTransformActivity`] moves a camera's view transform. Both capture the
//! source transform when built, interpolate component-wise, and finish on the
//! exact target. Destroying the animated node ends the animation quietly.

use std::time::Duration;

use canopy_core::{NodeId, Result, Scene, Transform2D};

use crate::activity::{InterpolatingActivity, Interpolator};

/// Interpolates a node's local transform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTransformTween {
    node: NodeId,
    source: Transform2D,
    target: Transform2D,
}

impl NodeTransformTween {
    /// Capture the node's current transform as the source
    pub fn new(scene: &Scene, node: NodeId, target: Transform2D) -> Result<Self> {
        Ok(Self {
            node,
            source: scene.transform(node)?,
            target,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn source(&self) -> Transform2D {
        self.source
    }

    pub fn target(&self) -> Transform2D {
        self.target
    }
}

impl Interpolator for NodeTransformTween {
    fn interpolate(&mut self, scene: &mut Scene, fraction: f32) -> Result<()> {
        scene.set_transform(
            self.node,
            Transform2D::lerp(&self.source, &self.target, fraction),
        )
    }

    fn finish(&mut self, scene: &mut Scene) -> Result<()> {
        scene.set_transform(self.node, self.target)
    }

    fn is_live(&self, scene: &Scene) -> bool {
        scene.contains(self.node)
    }
}

/// Interpolates a camera's view transform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransformTween {
    camera: NodeId,
    source: Transform2D,
    target: Transform2D,
}

impl ViewTransformTween {
    /// Capture the camera's current view transform as the source
    pub fn new(scene: &Scene, camera: NodeId, target: Transform2D) -> Result<Self> {
        Ok(Self {
            camera,
            source: scene.view_transform(camera)?,
            target,
        })
    }

    pub fn camera(&self) -> NodeId {
        self.camera
    }

    pub fn source(&self) -> Transform2D {
        self.source
    }

    pub fn target(&self) -> Transform2D {
        self.target
    }
}

impl Interpolator for ViewTransformTween {
    fn interpolate(&mut self, scene: &mut Scene, fraction: f32) -> Result<()> {
        scene.set_view_transform(
            self.camera,
            Transform2D::lerp(&self.source, &self.target, fraction),
        )
    }

    fn finish(&mut self, scene: &mut Scene) -> Result<()> {
        scene.set_view_transform(self.camera, self.target)
    }

    fn is_live(&self, scene: &Scene) -> bool {
        scene.contains(self.camera)
    }
}

pub type TransformActivity = InterpolatingActivity<NodeTransformTween>;
pub type ViewTransformActivity = InterpolatingActivity<ViewTransformTween>;

/// Build an activity moving `node` to `target` over `duration`
pub fn transform_activity(
    scene: &Scene,
    node: NodeId,
    target: Transform2D,
    duration: Duration,
) -> Result<TransformActivity> {
    Ok(InterpolatingActivity::new(
        duration,
        NodeTransformTween::new(scene, node, target)?,
    ))
}

/// Build an activity moving `camera`'s view to `target` over `duration`
pub fn view_transform_activity(
    scene: &Scene,
    camera: NodeId,
    target: Transform2D,
    duration: Duration,
) -> Result<ViewTransformActivity> {
    Ok(InterpolatingActivity::new(
        duration,
        ViewTransformTween::new(scene, camera, target)?,
    ))
}

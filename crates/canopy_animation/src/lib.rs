//! Canopy Animation
//!
//! Time-based activities on top of the canopy_core scheduler.
//!
//! # Features
//!
//! - **Interpolate**: component-wise blending for scalars, points, rects, colors and transforms
//! - **InterpolatingActivity**: maps elapsed time to a fraction of a fixed duration
//! - **Transform animations**: move a node's transform or a camera's view, ending on the exact target
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use canopy_animation::SceneAnimationExt;
//! use canopy_core::{NodeOptions, Scene, Transform2D};
//!
//! let mut scene = Scene::new();
//! let node = scene.create_node(NodeOptions::new());
//! let id = scene
//!     .animate_to_transform(node, Transform2D::translation(100.0, 0.0), Duration::from_millis(500))
//!     .unwrap();
//! assert!(id.is_some());
//! ```

pub mod activity;
pub mod transform;
pub mod values;

use std::time::Duration;

use canopy_core::{ActivityId, NodeId, Result, Scene, Transform2D};
use tracing::debug;

pub use activity::{InterpolatingActivity, Interpolator, Tween};
pub use transform::{
    transform_activity, view_transform_activity, NodeTransformTween, TransformActivity,
    ViewTransformActivity, ViewTransformTween,
};
pub use values::Interpolate;

/// Animation shortcuts on [`Scene`]
pub trait SceneAnimationExt {
    /// Animate `node`'s transform to `target`
    ///
    /// A zero duration applies the target immediately and schedules nothing.
    fn animate_to_transform(
        &mut self,
        node: NodeId,
        target: Transform2D,
        duration: Duration,
    ) -> Result<Option<ActivityId>>;

    /// Animate `camera`'s view transform to `target`
    ///
    /// A zero duration applies the target immediately and schedules nothing.
    fn animate_view_to_transform(
        &mut self,
        camera: NodeId,
        target: Transform2D,
        duration: Duration,
    ) -> Result<Option<ActivityId>>;
}

impl SceneAnimationExt for Scene {
    fn animate_to_transform(
        &mut self,
        node: NodeId,
        target: Transform2D,
        duration: Duration,
    ) -> Result<Option<ActivityId>> {
        if duration.is_zero() {
            self.set_transform(node, target)?;
            return Ok(None);
        }
        let activity = transform_activity(self, node, target, duration)?;
        let id = self.schedule(activity);
        debug!("animating {:?} over {:?} as {:?}", node, duration, id);
        Ok(Some(id))
    }

    fn animate_view_to_transform(
        &mut self,
        camera: NodeId,
        target: Transform2D,
        duration: Duration,
    ) -> Result<Option<ActivityId>> {
        if duration.is_zero() {
            self.set_view_transform(camera, target)?;
            return Ok(None);
        }
        let activity = view_transform_activity(self, camera, target, duration)?;
        let id = self.schedule(activity);
        debug!("animating view of {:?} over {:?} as {:?}", camera, duration, id);
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::{ActivityScheduler, ManualClock, ManualTimer, NodeOptions, Rect};

    #[test]
    fn test_zero_duration_applies_immediately() {
        let mut scene = Scene::new();
        let node = scene.create_node(NodeOptions::new());
        let target = Transform2D::translation(4.0, 2.0);

        let id = scene
            .animate_to_transform(node, target, Duration::ZERO)
            .unwrap();
        assert!(id.is_none());
        assert_eq!(scene.transform(node).unwrap(), target);
        assert!(scene.scheduler().is_empty());
    }

    #[test]
    fn test_animation_drives_timer() {
        let clock = ManualClock::new();
        let timer = ManualTimer::default();
        let mut scene = Scene::with_scheduler(
            ActivityScheduler::new()
                .with_clock(clock.clone())
                .with_timer(timer),
        );
        let camera = scene.create_camera(Rect::new(0.0, 0.0, 10.0, 10.0));

        let id = scene
            .animate_view_to_transform(
                camera,
                Transform2D::scaling(2.0, 2.0),
                Duration::from_millis(100),
            )
            .unwrap()
            .unwrap();
        assert!(scene.scheduler().contains(id));
        assert!(scene.scheduler().is_timer_running());

        clock.advance(Duration::from_millis(100));
        scene.tick().unwrap();
        assert!(!scene.scheduler().is_timer_running());
        assert_eq!(
            scene.view_transform(camera).unwrap(),
            Transform2D::scaling(2.0, 2.0)
        );
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        let mut scene = Scene::new();
        let node = scene.create_node(NodeOptions::new());
        scene.destroy(node).unwrap();
        assert!(scene
            .animate_to_transform(node, Transform2D::IDENTITY, Duration::from_millis(5))
            .is_err());
    }
}

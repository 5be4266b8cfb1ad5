//! Interpolating activities
//!
//! An [`InterpolatingActivity`] turns elapsed time into a fraction of its
//! duration and hands that to an [`Interpolator`]:
//!
//! - `fraction < 1`: `interpolate(fraction)`, keep running
//! - `fraction >= 1`: done; `finish` then snaps to the exact end state
//!
//! A zero duration finishes on its first step. An interpolator whose target
//! has left the scene ends the activity quietly, without `finish`.

use std::time::Duration;

use canopy_core::{Activity, ActivityStep, Result, Scene};
use tracing::debug;

use crate::values::Interpolate;

/// Applies an animation's state at a given fraction of its duration
pub trait Interpolator {
    /// Called when the activity starts running
    fn start(&mut self, _scene: &mut Scene) -> Result<()> {
        Ok(())
    }

    /// Apply the state at `fraction` in `[0, 1)`
    fn interpolate(&mut self, scene: &mut Scene, fraction: f32) -> Result<()>;

    /// Apply the exact end state
    fn finish(&mut self, scene: &mut Scene) -> Result<()>;

    /// Whether the animated target still exists in `scene`
    fn is_live(&self, _scene: &Scene) -> bool {
        true
    }
}

/// An activity that runs an [`Interpolator`] over a fixed duration
#[derive(Debug)]
pub struct InterpolatingActivity<I> {
    duration: Duration,
    interpolator: I,
}

impl<I: Interpolator> InterpolatingActivity<I> {
    pub fn new(duration: Duration, interpolator: I) -> Self {
        Self {
            duration,
            interpolator,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn interpolator(&self) -> &I {
        &self.interpolator
    }

    /// Fraction of the duration covered by `elapsed`; `>= 1` means done
    pub fn fraction(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()) as f32
    }
}

impl<I: Interpolator> Activity for InterpolatingActivity<I> {
    fn started(&mut self, scene: &mut Scene) -> Result<()> {
        if !self.interpolator.is_live(scene) {
            return Ok(());
        }
        self.interpolator.start(scene)
    }

    fn step(&mut self, scene: &mut Scene, elapsed: Duration) -> Result<ActivityStep> {
        if !self.interpolator.is_live(scene) {
            debug!("animation target gone, ending early");
            return Ok(ActivityStep::Done);
        }
        let fraction = self.fraction(elapsed);
        if fraction >= 1.0 {
            return Ok(ActivityStep::Done);
        }
        self.interpolator.interpolate(scene, fraction)?;
        Ok(ActivityStep::Continue)
    }

    fn finished(&mut self, scene: &mut Scene) -> Result<()> {
        if !self.interpolator.is_live(scene) {
            return Ok(());
        }
        self.interpolator.finish(scene)
    }
}

/// Tweens any [`Interpolate`] value and hands each sample to a setter
pub struct Tween<T, F> {
    from: T,
    to: T,
    apply: F,
}

impl<T, F> Tween<T, F>
where
    T: Interpolate,
    F: FnMut(&mut Scene, T) -> Result<()>,
{
    pub fn new(from: T, to: T, apply: F) -> Self {
        Self { from, to, apply }
    }

    pub fn from_value(&self) -> &T {
        &self.from
    }

    pub fn to_value(&self) -> &T {
        &self.to
    }
}

impl<T, F> Interpolator for Tween<T, F>
where
    T: Interpolate,
    F: FnMut(&mut Scene, T) -> Result<()>,
{
    fn interpolate(&mut self, scene: &mut Scene, fraction: f32) -> Result<()> {
        let value = self.from.lerp(&self.to, fraction);
        (self.apply)(scene, value)
    }

    fn finish(&mut self, scene: &mut Scene) -> Result<()> {
        (self.apply)(scene, self.to.clone())
    }
}

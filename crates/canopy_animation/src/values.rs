//! Animatable value types
//!
//! Provides the [`Interpolate`] trait for values an activity can tween between.

use canopy_core::{Color, Point, Rect, Transform2D};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

// ============================================================================
// Scalars and points
// ============================================================================

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        mix(*self, *other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

impl Interpolate for Point {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Point::new(mix(self.x, other.x, t), mix(self.y, other.y, t))
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

/// An unset end has no geometry to blend: two unset ends stay unset, and a
/// single set end is held for the whole animation.
impl Interpolate for Rect {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        match (self.is_initialized(), other.is_initialized()) {
            (false, false) => return Rect::EMPTY,
            (true, false) => return *self,
            (false, true) => return *other,
            (true, true) => {}
        }
        Rect::new(
            mix(self.x(), other.x(), t),
            mix(self.y(), other.y(), t),
            mix(self.width(), other.width(), t),
            mix(self.height(), other.height(), t),
        )
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.is_initialized() == other.is_initialized()
            && self.origin().approx_eq(&other.origin(), epsilon)
            && (self.width() - other.width()).abs() < epsilon
            && (self.height() - other.height()).abs() < epsilon
    }
}

// ============================================================================
// Transform2D Implementation
// ============================================================================

/// Component-wise, see [`Transform2D::lerp`].
impl Interpolate for Transform2D {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Transform2D::lerp(self, other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        Transform2D::approx_eq(self, other, epsilon)
    }
}

// ============================================================================
// Color Implementation
// ============================================================================

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::rgba(
            mix(self.r, other.r, t),
            mix(self.g, other.g, t),
            mix(self.b, other.b, t),
            mix(self.a, other.a, t),
        )
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

//! Geometry value types for the scenegraph
//!
//! - [`Point`] and [`Size`]: plain 2D pairs
//! - [`Rect`]: axis-aligned bounds with an "initialized" flag, so an unset rect
//!   can act as the identity of [`Rect::union`]
//! - [`Transform2D`]: 2×3 affine matrix used for node transforms, camera view
//!   transforms, and picking

use crate::error::{Result, SceneError};

// ─────────────────────────────────────────────────────────────────────────────
// Point / Size
// ─────────────────────────────────────────────────────────────────────────────

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

impl TryFrom<&[f32]> for Point {
    type Error = SceneError;

    /// Builds a point from zero coordinates (the origin) or exactly two.
    fn try_from(coords: &[f32]) -> Result<Self> {
        match coords {
            [] => Ok(Point::ZERO),
            [x, y] => Ok(Point::new(*x, *y)),
            other => Err(SceneError::invalid(format!(
                "point expects 0 or 2 coordinates, got {}",
                other.len()
            ))),
        }
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Convert to a Rect at the origin (0, 0)
    pub const fn to_rect(self) -> Rect {
        Rect {
            origin: Point::ZERO,
            size: self,
            initialized: true,
        }
    }
}

impl From<Size> for Rect {
    fn from(size: Size) -> Self {
        size.to_rect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rect
// ─────────────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle
///
/// [`Rect::EMPTY`] is "not yet set": it is absorbed by [`Rect::union`], contains
/// no point and intersects nothing. A zero-size rect built with [`Rect::new`] is
/// a real location and takes part in unions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    origin: Point,
    size: Size,
    initialized: bool,
}

impl Default for Rect {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Rect {
    /// The unset rect
    pub const EMPTY: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
        initialized: false,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
            initialized: true,
        }
    }

    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self {
            origin,
            size,
            initialized: true,
        }
    }

    /// Smallest rect containing every point, `EMPTY` for no points
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Rect::EMPTY;
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// True for the unset rect and for a rect with no area on both axes
    pub fn is_empty(&self) -> bool {
        !self.initialized || (self.size.width == 0.0 && self.size.height == 0.0)
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// The four corners, clockwise from the top-left
    pub fn corners(&self) -> [Point; 4] {
        [
            self.origin,
            Point::new(self.right(), self.origin.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.origin.x, self.bottom()),
        ]
    }

    /// Offset the rect by a delta
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Rect {
            origin: Point::new(self.origin.x + dx, self.origin.y + dy),
            ..*self
        }
    }

    /// Union of two rects; an unset rect on either side is ignored
    pub fn union(&self, other: &Rect) -> Self {
        if !self.initialized {
            return *other;
        }
        if !other.initialized {
            return *self;
        }
        let min_x = self.origin.x.min(other.origin.x);
        let min_y = self.origin.y.min(other.origin.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Half-open containment: the left/top edges are inside, right/bottom are not
    pub fn contains(&self, point: Point) -> bool {
        self.initialized
            && point.x >= self.origin.x
            && point.x < self.right()
            && point.y >= self.origin.y
            && point.y < self.bottom()
    }

    /// Closed intersection: rects that only touch along an edge intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        if !self.initialized || !other.initialized {
            return false;
        }
        !(other.right() < self.origin.x
            || other.origin.x > self.right()
            || other.bottom() < self.origin.y
            || other.origin.y > self.bottom())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transform2D
// ─────────────────────────────────────────────────────────────────────────────

/// 2D affine transform
///
/// `compose` and the mapping functions are pure; `scale`, `translate`,
/// `rotate_in_place` and `compose_in_place` edit the matrix in place.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    /// Matrix elements [a, b, c, d, e, f]
    /// | a  c  e |
    /// | b  d  f |
    /// | 0  0  1 |
    pub elements: [f32; 6],
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 6]> for Transform2D {
    fn from(elements: [f32; 6]) -> Self {
        Self { elements }
    }
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D {
        elements: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub const fn new(elements: [f32; 6]) -> Self {
        Self { elements }
    }

    pub fn translation(x: f32, y: f32) -> Self {
        Self {
            elements: [1.0, 0.0, 0.0, 1.0, x, y],
        }
    }

    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self {
            elements: [sx, 0.0, 0.0, sy, 0.0, 0.0],
        }
    }

    pub fn rotation(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Self {
            elements: [c, s, -s, c, 0.0, 0.0],
        }
    }

    /// Translation terms `(e, f)`
    pub fn offset(&self) -> Point {
        Point::new(self.elements[4], self.elements[5])
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn determinant(&self) -> f32 {
        let [a, b, c, d, _, _] = self.elements;
        a * d - b * c
    }

    /// Multiplies the diagonal terms `a` and `d` only.
    pub fn scale(&mut self, ratio: f32) {
        self.elements[0] *= ratio;
        self.elements[3] *= ratio;
    }

    /// Adds directly to the translation terms.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.elements[4] += dx;
        self.elements[5] += dy;
    }

    /// Rotation is applied before the existing transform.
    pub fn rotate_in_place(&mut self, theta: f32) {
        *self = self.compose(&Transform2D::rotation(theta));
    }

    /// `self ∘ other`: the result applies `other` first, then `self`.
    pub fn compose(&self, other: &Transform2D) -> Transform2D {
        let [a1, b1, c1, d1, e1, f1] = self.elements;
        let [a2, b2, c2, d2, e2, f2] = other.elements;

        Transform2D {
            elements: [
                a1 * a2 + c1 * b2,
                b1 * a2 + d1 * b2,
                a1 * c2 + c1 * d2,
                b1 * c2 + d1 * d2,
                a1 * e2 + c1 * f2 + e1,
                b1 * e2 + d1 * f2 + f1,
            ],
        }
    }

    pub fn compose_in_place(&mut self, other: &Transform2D) {
        *self = self.compose(other);
    }

    pub fn map_point(&self, point: Point) -> Point {
        let [a, b, c, d, e, f] = self.elements;
        Point::new(a * point.x + c * point.y + e, b * point.x + d * point.y + f)
    }

    /// Axis-aligned bounds of the four mapped corners of `rect`.
    pub fn map_rect(&self, rect: &Rect) -> Rect {
        if !rect.is_initialized() {
            return Rect::EMPTY;
        }
        Rect::bounding(rect.corners().map(|p| self.map_point(p)))
    }

    /// Inverse transform; fails for singular or non-finite transforms
    pub fn invert(&self) -> Result<Transform2D> {
        if !self.elements.iter().all(|value| value.is_finite()) {
            return Err(SceneError::invalid(format!(
                "cannot invert non-finite transform {:?}",
                self.elements
            )));
        }
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(SceneError::DegenerateTransform { determinant: det });
        }
        let [a, b, c, d, e, f] = self.elements;
        let inverse = Transform2D {
            elements: [
                d / det,
                -b / det,
                -c / det,
                a / det,
                (c * f - d * e) / det,
                (b * e - a * f) / det,
            ],
        };
        // Near-singular transforms can still overflow.
        if !inverse.elements.iter().all(|value| value.is_finite()) {
            return Err(SceneError::DegenerateTransform { determinant: det });
        }
        Ok(inverse)
    }

    /// Length of the unit vector `(0, 1)` after mapping through the linear part.
    ///
    /// Exact only for transforms without shear or non-uniform scale.
    pub fn uniform_scale_magnitude(&self) -> f32 {
        let [_, _, c, d, _, _] = self.elements;
        (c * c + d * d).sqrt()
    }

    /// Component-wise interpolation of all six coefficients.
    ///
    /// Large rotations visibly skew midway; no decomposition is attempted.
    pub fn lerp(from: &Transform2D, to: &Transform2D, fraction: f32) -> Transform2D {
        let mut elements = [0.0; 6];
        for (i, out) in elements.iter_mut().enumerate() {
            *out = from.elements[i] + fraction * (to.elements[i] - from.elements[i]);
        }
        Transform2D { elements }
    }

    pub fn approx_eq(&self, other: &Transform2D, epsilon: f32) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-3;

    fn samples() -> Vec<Transform2D> {
        let mut rotated = Transform2D::translation(12.0, -4.0);
        rotated.rotate_in_place(0.7);
        vec![
            Transform2D::IDENTITY,
            Transform2D::translation(10.0, 20.0),
            Transform2D::scaling(2.0, 0.5),
            Transform2D::rotation(1.3),
            Transform2D::new([1.0, 0.4, -0.2, 1.5, 3.0, 7.0]),
            rotated,
        ]
    }

    fn points() -> Vec<Point> {
        vec![
            Point::ZERO,
            Point::new(1.0, 1.0),
            Point::new(-25.0, 40.0),
            Point::new(300.5, -12.25),
        ]
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn test_compose_order() {
        for a in samples() {
            for b in samples() {
                for p in points() {
                    let composed = a.compose(&b).map_point(p);
                    let chained = a.map_point(b.map_point(p));
                    assert!(close(composed, chained), "{a:?} ∘ {b:?} at {p:?}");
                }
            }
        }
    }

    #[test]
    fn test_inverse_law() {
        for t in samples() {
            let inv = t.invert().unwrap();
            for p in points() {
                assert!(close(t.compose(&inv).map_point(p), p));
                assert!(close(inv.compose(&t).map_point(p), p));
            }
        }
    }

    #[test]
    fn test_invert_scale_translate() {
        let inv = Transform2D::new([2.0, 0.0, 0.0, 2.0, 10.0, 10.0])
            .invert()
            .unwrap();
        assert!(inv.approx_eq(
            &Transform2D::new([0.5, 0.0, 0.0, 0.5, -5.0, -5.0]),
            1e-6
        ));
    }

    #[test]
    fn test_invert_degenerate() {
        let flat = Transform2D::new([1.0, 2.0, 2.0, 4.0, 0.0, 0.0]);
        assert!(matches!(
            flat.invert(),
            Err(SceneError::DegenerateTransform { .. })
        ));

        let mut collapsed = Transform2D::IDENTITY;
        collapsed.scale(0.0);
        assert!(collapsed.invert().is_err());
    }

    #[test]
    fn test_invert_non_finite() {
        let nan_offset = Transform2D::translation(f32::NAN, 0.0);
        assert_eq!(nan_offset.determinant(), 1.0);
        assert!(matches!(
            nan_offset.invert(),
            Err(SceneError::InvalidArgument(_))
        ));

        let infinite_offset = Transform2D::translation(0.0, f32::INFINITY);
        assert!(infinite_offset.invert().is_err());

        let tiny = Transform2D::new([1e-30, 0.0, 0.0, 1e-30, 0.0, 0.0]);
        assert!(matches!(
            tiny.invert(),
            Err(SceneError::DegenerateTransform { .. })
        ));
    }

    #[test]
    fn test_in_place_edits() {
        let mut t = Transform2D::IDENTITY;
        t.scale(2.0);
        t.translate(5.0, 6.0);
        assert_eq!(t.elements, [2.0, 0.0, 0.0, 2.0, 5.0, 6.0]);

        // Rotation happens in the local frame, before the existing matrix.
        t.rotate_in_place(FRAC_PI_2);
        let p = t.map_point(Point::new(1.0, 0.0));
        assert!(close(p, Point::new(5.0, 8.0)));
    }

    #[test]
    fn test_map_rect_four_corners() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let rotated = Transform2D::rotation(std::f32::consts::FRAC_PI_4).map_rect(&rect);

        let half_diag = 10.0 * std::f32::consts::SQRT_2 / 2.0;
        assert!((rotated.x() + half_diag).abs() < EPS);
        assert!((rotated.width() - 2.0 * half_diag).abs() < EPS);
        assert!((rotated.height() - 2.0 * half_diag).abs() < EPS);

        assert_eq!(
            Transform2D::translation(5.0, 5.0).map_rect(&rect),
            Rect::new(5.0, 5.0, 10.0, 10.0)
        );
        assert_eq!(Transform2D::IDENTITY.map_rect(&Rect::EMPTY), Rect::EMPTY);
    }

    #[test]
    fn test_uniform_scale_magnitude() {
        let mut t = Transform2D::scaling(3.0, 3.0).compose(&Transform2D::rotation(0.9));
        t.translate(100.0, 100.0);
        assert!((t.uniform_scale_magnitude() - 3.0).abs() < EPS);
        assert_eq!(Transform2D::IDENTITY.uniform_scale_magnitude(), 1.0);
    }

    #[test]
    fn test_lerp_component_wise() {
        let from = Transform2D::IDENTITY;
        let to = Transform2D::new([3.0, 0.0, 0.0, 3.0, 100.0, -50.0]);
        let mid = Transform2D::lerp(&from, &to, 0.5);
        assert_eq!(mid.elements, [2.0, 0.0, 0.0, 2.0, 50.0, -25.0]);
        assert_eq!(Transform2D::lerp(&from, &to, 0.0), from);
        assert_eq!(Transform2D::lerp(&from, &to, 1.0), to);
    }

    #[test]
    fn test_rect_union_identity() {
        let r = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(Rect::EMPTY.union(&r), r);
        assert_eq!(r.union(&Rect::EMPTY), r);
        assert!(!Rect::EMPTY.union(&Rect::EMPTY).is_initialized());

        // A zero-size rect at a real location still counts.
        let dot = Rect::new(-5.0, 0.0, 0.0, 0.0);
        assert_eq!(r.union(&dot), Rect::new(-5.0, 0.0, 20.0, 15.0));
    }

    #[test]
    fn test_rect_contains_half_open() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(99.9, 50.0)));
        assert!(!r.contains(Point::new(100.0, 50.0)));
        assert!(!r.contains(Point::new(50.0, 100.0)));
        assert!(!Rect::EMPTY.contains(Point::ZERO));
    }

    #[test]
    fn test_rect_intersects_closed() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(a.intersects(&Rect::new(100.0, 0.0, 10.0, 10.0)));
        assert!(a.intersects(&Rect::new(50.0, 50.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(100.5, 0.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::EMPTY));
        assert!(!Rect::EMPTY.intersects(&a));
    }

    #[test]
    fn test_rect_empty() {
        assert!(Rect::EMPTY.is_empty());
        assert!(Rect::new(3.0, 3.0, 0.0, 0.0).is_empty());
        assert!(!Rect::new(3.0, 3.0, 0.0, 1.0).is_empty());
        assert_eq!(Rect::default(), Rect::EMPTY);
    }

    #[test]
    fn test_point_from_slice() {
        assert_eq!(Point::try_from(&[][..]).unwrap(), Point::ZERO);
        assert_eq!(
            Point::try_from(&[3.0, 4.0][..]).unwrap(),
            Point::new(3.0, 4.0)
        );
        assert!(matches!(
            Point::try_from(&[1.0][..]),
            Err(SceneError::InvalidArgument(_))
        ));
        assert!(Point::try_from(&[1.0, 2.0, 3.0][..]).is_err());
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }
}

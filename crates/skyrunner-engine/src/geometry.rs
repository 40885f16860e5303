//! Plane geometry used for sensing and lethal collision checks.
//!
//! Only what the simulation needs is here: point-in-circle for ray casts and a
//! separating test between a convex polygon (a ship's bounding box) and a circle
//! (an obstacle). Touching shapes count as intersecting.

use std::ops::{Add, Mul, Sub};

/// A point or direction in world space.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    #[must_use]
    pub const fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Returns `true` if `point` lies inside the circle or on its boundary.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }
}

/// Axis-aligned rectangle in world space.
///
/// `origin` is the corner with the smallest coordinates (bottom-left in world space).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(origin: Vec2, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Creates a rectangle of the given size centred on `center`.
    #[must_use]
    pub fn centered(center: Vec2, width: f64, height: f64) -> Self {
        Self::new(
            Vec2::new(center.x - width / 2.0, center.y - height / 2.0),
            width,
            height,
        )
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.origin.y + self.height
    }

    /// Corners in counter-clockwise order starting at `origin`.
    #[must_use]
    pub fn corners(&self) -> [Vec2; 4] {
        let Vec2 { x, y } = self.origin;
        [
            Vec2::new(x, y),
            Vec2::new(x + self.width, y),
            Vec2::new(x + self.width, y + self.height),
            Vec2::new(x, y + self.height),
        ]
    }

    #[must_use]
    pub fn to_polygon(&self) -> ConvexPolygon {
        ConvexPolygon {
            points: self.corners().to_vec(),
        }
    }
}

/// A convex polygon given by its vertices in either winding order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPolygon {
    points: Vec<Vec2>,
}

impl ConvexPolygon {
    /// Creates a polygon from its vertices.
    ///
    /// Returns `None` for fewer than three vertices. Convexity is the caller's
    /// responsibility.
    #[must_use]
    pub fn new(points: Vec<Vec2>) -> Option<Self> {
        (points.len() >= 3).then_some(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let next = self.points.iter().cycle().skip(1);
        self.points.iter().copied().zip(next.copied())
    }

    /// Returns `true` if `point` is inside the polygon or on its boundary.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let mut has_positive = false;
        let mut has_negative = false;
        for (a, b) in self.edges() {
            let side = (b - a).cross(point - a);
            has_positive |= side > 0.0;
            has_negative |= side < 0.0;
            if has_positive && has_negative {
                return false;
            }
        }
        true
    }

    /// Returns `true` if the polygon and the circle share at least one point.
    #[must_use]
    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        if self.contains(circle.center) {
            return true;
        }
        let radius_squared = circle.radius * circle.radius;
        self.edges()
            .any(|(a, b)| segment_distance_squared(circle.center, a, b) <= radius_squared)
    }
}

fn segment_distance_squared(point: Vec2, a: Vec2, b: Vec2) -> f64 {
    let edge = b - a;
    let len_squared = edge.length_squared();
    if len_squared == 0.0 {
        return (point - a).length_squared();
    }
    let t = ((point - a).dot(edge) / len_squared).clamp(0.0, 1.0);
    (point - (a + edge * t)).length_squared()
}

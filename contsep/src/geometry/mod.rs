//! Planar polygons for iso-flux contours.

use glam::DVec2;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// Axis-aligned bounds of a point set (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    #[inline]
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Smallest bounds containing every point, or `None` for no points.
    pub fn from_points<I: IntoIterator<Item = DVec2>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |b, p| Self {
            min: b.min.min(p),
            max: b.max.max(p),
        }))
    }

    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Bounds grown by `margin` on every side.
    #[inline]
    pub fn padded(&self, margin: f64) -> Self {
        Self {
            min: self.min - DVec2::splat(margin),
            max: self.max + DVec2::splat(margin),
        }
    }

    #[inline]
    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }
}

/// Simple closed polygon.
///
/// Contour tracers emit rings whose last vertex repeats the first; both that
/// form and the implicitly closed form are accepted. The closing edge is
/// always implied, so a repeated vertex only adds a zero-length edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<DVec2>,
}

impl Polygon {
    /// Fewest vertices a contour ring may have and still be kept.
    pub const MIN_VERTICES: usize = 5;
    /// Areas at or below this (coordinate units squared) are contouring noise.
    pub const MIN_AREA: f64 = 2.0;

    pub fn new(vertices: Vec<DVec2>) -> Self {
        Self { vertices }
    }

    pub fn from_xy(points: &[(f64, f64)]) -> Self {
        Self::new(points.iter().map(|&(x, y)| DVec2::new(x, y)).collect())
    }

    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Whether every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().all(|v| v.is_finite())
    }

    /// Shoelace sum; positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            sum += a.perp_dot(b);
        }
        0.5 * sum
    }

    /// Enclosed area regardless of winding order.
    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Rings that contouring produces as noise: too few vertices,
    /// a non-finite coordinate, or area not above [`Self::MIN_AREA`].
    pub fn is_degenerate(&self) -> bool {
        if self.vertices.len() < Self::MIN_VERTICES || !self.is_finite() {
            return true;
        }
        self.area() <= Self::MIN_AREA
    }

    /// Even-odd ray casting point-in-polygon test.
    ///
    /// Points exactly on an edge may fall either way.
    pub fn contains(&self, p: DVec2) -> bool {
        let n = self.vertices.len();
        if n < 3 || !p.is_finite() {
            return false;
        }

        let mut inside = false;
        for i in 0..n {
            let v0 = self.vertices[i];
            let v1 = self.vertices[(i + 1) % n];

            // Half-open in y so a vertex shared by two edges is counted once
            if (v0.y > p.y) == (v1.y > p.y) {
                continue;
            }
            let t = (p.y - v0.y) / (v1.y - v0.y);
            let x_crossing = v0.x + t * (v1.x - v0.x);
            if x_crossing > p.x {
                inside = !inside;
            }
        }
        inside
    }

    /// Area-weighted centroid, falling back to the vertex mean for zero-area rings.
    pub fn centroid(&self) -> Option<DVec2> {
        let n = self.vertices.len();
        if n == 0 {
            return None;
        }

        let signed_area = self.signed_area();
        if signed_area.abs() < f64::EPSILON {
            let sum: DVec2 = self.vertices.iter().copied().sum();
            return Some(sum / n as f64);
        }

        let mut c = DVec2::ZERO;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            c += (a + b) * a.perp_dot(b);
        }
        Some(c / (6.0 * signed_area))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.vertices.iter().copied())
    }

    /// Polygon with every vertex mapped through `f`.
    pub fn map(&self, f: impl Fn(DVec2) -> DVec2) -> Self {
        Self::new(self.vertices.iter().map(|&v| f(v)).collect())
    }
}

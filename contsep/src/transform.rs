//! Registration transform between reference-image pixels and cube coordinates.

use glam::{DAffine2, DVec2};
use serde::{Deserialize, Serialize};

/// 2D affine map from the REFERENCE frame to the IFU (cube) frame.
///
/// ```text
/// | a  b  tx |
/// | c  d  ty |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub affine: DAffine2,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let t = self.translation_components();
        write!(
            f,
            "Transform(dx={:.2}, dy={:.2}, rot={:.3}°, scale={:.4})",
            t.x,
            t.y,
            self.rotation_angle().to_degrees(),
            self.scale_factor()
        )
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            affine: DAffine2::IDENTITY,
        }
    }

    pub fn translation(t: DVec2) -> Self {
        Self {
            affine: DAffine2::from_translation(t),
        }
    }

    /// Rotation by `angle` radians and uniform `scale`, followed by translation `t`.
    pub fn similarity(t: DVec2, angle: f64, scale: f64) -> Self {
        Self {
            affine: DAffine2::from_scale_angle_translation(DVec2::splat(scale), angle, t),
        }
    }

    /// Map a reference-frame point into the cube frame.
    #[inline]
    pub fn apply(&self, p: DVec2) -> DVec2 {
        self.affine.transform_point2(p)
    }

    /// Cube frame back to the reference frame; `None` for a singular or non-finite map.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.affine.matrix2.determinant();
        if !det.is_finite() || det.abs() < 1e-12 || !self.affine.translation.is_finite() {
            return None;
        }
        Some(Self {
            affine: self.affine.inverse(),
        })
    }

    /// Apply `self` first, then `next`.
    pub fn then(&self, next: &Self) -> Self {
        Self {
            affine: next.affine * self.affine,
        }
    }

    pub fn translation_components(&self) -> DVec2 {
        self.affine.translation
    }

    /// Rotation angle in radians (meaningful for similarity transforms).
    pub fn rotation_angle(&self) -> f64 {
        let a = self.affine.matrix2.x_axis;
        a.y.atan2(a.x)
    }

    /// Uniform scale factor (meaningful for similarity transforms).
    pub fn scale_factor(&self) -> f64 {
        self.affine.matrix2.x_axis.length()
    }
}

/// Serialised form of a similarity registration, as stored in registration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityParams {
    /// Cube units per reference pixel.
    pub scale: f64,
    /// Rotation in degrees, counter-clockwise.
    pub rotation_deg: f64,
    /// Cube-frame position of the reference-image origin.
    pub translation: DVec2,
}

impl Default for SimilarityParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_deg: 0.0,
            translation: DVec2::ZERO,
        }
    }
}

impl From<SimilarityParams> for Transform {
    fn from(p: SimilarityParams) -> Self {
        Transform::similarity(p.translation, p.rotation_deg.to_radians(), p.scale)
    }
}

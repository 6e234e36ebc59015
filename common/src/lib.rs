//! Shared helpers for the contour-separation workspace.

pub mod file_utils;
pub mod float_ext;

/// Tolerance used by [`float_ext::FloatExt::approximately_eq`].
pub const EPSILON: f64 = 1e-6;

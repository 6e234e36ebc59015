//! Which contour polygon holds the target at each magnitude level.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::contour::{ContourMap, LevelKey};
use crate::geometry::Polygon;

/// A polygon containing the target's cube position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPolygonLocation {
    pub magnitude: f64,
    pub key: LevelKey,
    /// Position of the level in the magnitude ladder.
    pub magnitude_index: usize,
    /// Position of the polygon within its level.
    pub polygon_index: usize,
}

impl TargetPolygonLocation {
    /// The located polygon, if `contours` is the map the location was taken from.
    pub fn polygon<'a>(&self, contours: &'a ContourMap) -> Option<&'a Polygon> {
        contours.polygon(self.magnitude_index, self.polygon_index)
    }
}

/// Every polygon of `contours` containing `target`, brightest level first.
///
/// Levels where no polygon contains the target contribute nothing.
pub fn locate_target_polygons(contours: &ContourMap, target: DVec2) -> Vec<TargetPolygonLocation> {
    let locations: Vec<TargetPolygonLocation> = contours
        .levels()
        .iter()
        .enumerate()
        .flat_map(|(magnitude_index, level)| {
            level
                .polygons
                .iter()
                .enumerate()
                .filter(|(_, polygon)| polygon.contains(target))
                .map(move |(polygon_index, _)| TargetPolygonLocation {
                    magnitude: level.magnitude,
                    key: level.key,
                    magnitude_index,
                    polygon_index,
                })
        })
        .collect();

    tracing::debug!(
        levels = contours.len(),
        located = locations.len(),
        target = ?target,
        "located target polygons"
    );

    locations
}

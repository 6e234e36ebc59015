//! Iso-magnitude contour maps.
//!
//! A [`ContourMap`] holds, for every level of the magnitude ladder, the closed
//! polygons tracing that iso-flux boundary. Levels keep ladder order
//! (brightest first) and polygons keep tracing order.

pub mod marching_squares;

#[cfg(test)]
mod tests;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Polygon;
use crate::ladder::MagnitudeLadder;

/// Key of a contour level: its position in the magnitude ladder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LevelKey(pub usize);

impl std::fmt::Display for LevelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// All polygons traced at one magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourLevel {
    pub key: LevelKey,
    pub magnitude: f64,
    pub polygons: Vec<Polygon>,
}

/// Ordered contour levels, brightest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContourMap {
    levels: Vec<ContourLevel>,
}

impl ContourMap {
    pub fn new(levels: Vec<ContourLevel>) -> Self {
        debug_assert!(
            levels.windows(2).all(|w| w[0].magnitude < w[1].magnitude),
            "contour levels must be ordered brightest first"
        );
        Self { levels }
    }

    /// Pair each ladder magnitude with its polygons.
    pub fn from_ladder(ladder: &MagnitudeLadder, polygons: Vec<Vec<Polygon>>) -> Self {
        assert_eq!(
            ladder.len(),
            polygons.len(),
            "one polygon list per ladder level"
        );
        let levels = ladder
            .magnitudes()
            .iter()
            .zip(polygons)
            .enumerate()
            .map(|(i, (&magnitude, polygons))| ContourLevel {
                key: LevelKey(i),
                magnitude,
                polygons,
            })
            .collect();
        Self::new(levels)
    }

    #[inline]
    pub fn levels(&self) -> &[ContourLevel] {
        &self.levels
    }

    #[inline]
    pub fn level(&self, index: usize) -> Option<&ContourLevel> {
        self.levels.get(index)
    }

    pub fn get(&self, key: LevelKey) -> Option<&ContourLevel> {
        self.levels.iter().find(|l| l.key == key)
    }

    /// Polygon `polygon_index` of the level at ladder position `level_index`.
    pub fn polygon(&self, level_index: usize, polygon_index: usize) -> Option<&Polygon> {
        self.levels.get(level_index)?.polygons.get(polygon_index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn polygon_count(&self) -> usize {
        self.levels.iter().map(|l| l.polygons.len()).sum()
    }

    /// Same levels with every vertex mapped through `f`.
    pub fn map_points(&self, f: impl Fn(DVec2) -> DVec2) -> Self {
        Self {
            levels: self
                .levels
                .iter()
                .map(|l| ContourLevel {
                    key: l.key,
                    magnitude: l.magnitude,
                    polygons: l.polygons.iter().map(|p| p.map(&f)).collect(),
                })
                .collect(),
        }
    }

    /// Drop degenerate polygons (see [`Polygon::is_degenerate`]).
    ///
    /// Level keys and the relative order of surviving polygons are preserved;
    /// levels may end up empty but are never removed.
    pub fn cleaned(&self) -> Self {
        let levels: Vec<ContourLevel> = self
            .levels
            .iter()
            .map(|level| {
                let polygons: Vec<Polygon> = level
                    .polygons
                    .iter()
                    .filter(|p| !p.is_degenerate())
                    .cloned()
                    .collect();
                let dropped = level.polygons.len() - polygons.len();
                if dropped > 0 {
                    tracing::debug!(
                        level = %level.key,
                        magnitude = level.magnitude,
                        dropped,
                        kept = polygons.len(),
                        "dropped degenerate contours"
                    );
                }
                ContourLevel {
                    key: level.key,
                    magnitude: level.magnitude,
                    polygons,
                }
            })
            .collect();

        Self { levels }
    }
}

//! Spaxel geometry of an IFU cube.


use std::path::Path;

use glam::DVec2;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Bounds, Polygon};

/// Spatial queries the separator needs from a cube.
///
/// A spaxel has an *index* (the cube's own label, as stored in its files) and
/// an *id* (its position in [`SpaxelCube::indices`]).
pub trait SpaxelCube {
    fn nspaxels(&self) -> usize;

    /// Spaxel indices in id order.
    fn indices(&self) -> &[usize];

    /// Indices of spaxels whose centre lies inside `polygon`, in id order.
    fn spaxels_within_polygon(&self, polygon: &Polygon) -> Vec<usize>;

    /// Extent of the spaxel centres, padded to cover the spaxels themselves.
    fn footprint(&self) -> Option<Bounds>;

    /// Ids of the spaxels whose index is in `indices`.
    fn ids_for(&self, indices: &[usize]) -> Vec<usize> {
        let wanted: HashSet<usize> = indices.iter().copied().collect();
        self.indices()
            .iter()
            .enumerate()
            .filter(|(_, index)| wanted.contains(*index))
            .map(|(id, _)| id)
            .collect()
    }
}

/// One spatial element and its centre in IFU coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spaxel {
    pub index: usize,
    pub position: DVec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CubeFile {
    pitch: f64,
    spaxels: Vec<Spaxel>,
}

/// Spaxel layout of a lenslet cube.
#[derive(Debug, Clone)]
pub struct Cube {
    spaxels: Vec<Spaxel>,
    indices: Vec<usize>,
    pitch: f64,
}

impl Cube {
    /// `pitch` is the centre-to-centre spaxel spacing in IFU units.
    pub fn new(spaxels: Vec<Spaxel>, pitch: f64) -> Result<Self> {
        if spaxels.is_empty() {
            return Err(Error::EmptyCube);
        }
        if !pitch.is_finite() || pitch <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "spaxel pitch must be positive, got {}",
                pitch
            )));
        }
        if let Some(bad) = spaxels.iter().find(|s| !s.position.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "spaxel {} has a non-finite position",
                bad.index
            )));
        }

        let indices = spaxels.iter().map(|s| s.index).collect();
        Ok(Self {
            spaxels,
            indices,
            pitch,
        })
    }

    /// Hexagonal lenslet grid centred on the origin.
    ///
    /// `rings` hexagonal rings surround the central spaxel, giving
    /// `1 + 3 * rings * (rings + 1)` spaxels indexed in ring order.
    pub fn hexagonal(rings: usize, pitch: f64) -> Result<Self> {
        let n = rings as i64;
        let row_height = pitch * 3f64.sqrt() / 2.0;

        let mut axial: Vec<(i64, i64)> = Vec::with_capacity(1 + 3 * rings * (rings + 1));
        for q in -n..=n {
            for r in (-n).max(-q - n)..=n.min(-q + n) {
                axial.push((q, r));
            }
        }
        // Ring number, then angle, so the centre is index 0
        axial.sort_by(|a, b| {
            let ring = |(q, r): (i64, i64)| q.abs().max(r.abs()).max((q + r).abs());
            let angle = |(q, r): (i64, i64)| (r as f64).atan2(q as f64 + r as f64 / 2.0);
            ring(*a)
                .cmp(&ring(*b))
                .then(angle(*a).total_cmp(&angle(*b)))
        });

        let spaxels = axial
            .into_iter()
            .enumerate()
            .map(|(index, (q, r))| Spaxel {
                index,
                position: DVec2::new(
                    pitch * (q as f64 + r as f64 / 2.0),
                    row_height * r as f64,
                ),
            })
            .collect();

        Self::new(spaxels, pitch)
    }

    /// Load a spaxel layout.
    ///
    /// ```yaml
    /// pitch: 1.0
    /// spaxels:
    ///   - { index: 12, position: [0.0, 0.0] }
    ///   - { index: 13, position: [1.0, 0.0] }
    /// ```
    pub fn from_file(path: &Path) -> Result<Self> {
        let file: CubeFile = crate::yaml::load(path)?;
        let cube = Self::new(file.spaxels, file.pitch)?;
        tracing::info!(
            path = %path.display(),
            spaxels = cube.nspaxels(),
            pitch = cube.pitch,
            "loaded cube"
        );
        Ok(cube)
    }

    #[inline]
    pub fn spaxels(&self) -> &[Spaxel] {
        &self.spaxels
    }

    #[inline]
    pub fn pitch(&self) -> f64 {
        self.pitch
    }
}

impl SpaxelCube for Cube {
    fn nspaxels(&self) -> usize {
        self.spaxels.len()
    }

    fn indices(&self) -> &[usize] {
        &self.indices
    }

    fn spaxels_within_polygon(&self, polygon: &Polygon) -> Vec<usize> {
        let Some(bounds) = polygon.bounds() else {
            return Vec::new();
        };
        self.spaxels
            .iter()
            .filter(|s| bounds.contains(s.position) && polygon.contains(s.position))
            .map(|s| s.index)
            .collect()
    }

    fn footprint(&self) -> Option<Bounds> {
        Bounds::from_points(self.spaxels.iter().map(|s| s.position))
            .map(|b| b.padded(self.pitch / 2.0))
    }
}

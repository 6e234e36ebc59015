//! Spaxel classification against the chosen contours.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use super::{ContourSeparator, Separation};
use crate::cube::SpaxelCube;
use crate::error::{Error, Result};
use crate::geometry::Polygon;
use crate::reference::ReferenceModel;

/// How returned spaxels are labelled.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SpaxelLabel {
    /// Position in the cube's index array.
    #[default]
    Id,
    /// The cube's own spaxel index.
    Index,
}

impl<R: ReferenceModel, C: SpaxelCube> ContourSeparator<R, C> {
    /// Spaxels inside the target's separating contour.
    ///
    /// When a catalogued source is co-located with the target, the brightest
    /// level's target polygon is used instead.
    pub fn target_spaxels(&self, label: SpaxelLabel) -> Result<Vec<usize>> {
        let indices = self.target_spaxel_indices()?;
        Ok(self.label(indices, label))
    }

    /// Spaxels of the host and other sources, never overlapping the target's.
    ///
    /// Empty when a catalogued source is co-located with the target.
    pub fn other_spaxels(&self, label: SpaxelLabel) -> Result<Vec<usize>> {
        let magnitude = match self.separation(self.config.method) {
            Separation::Undetermined => return Err(Error::UndeterminedSeparation),
            Separation::CoLocated { .. } => {
                tracing::debug!("co-located target, no other-source spaxels");
                return Ok(Vec::new());
            }
            Separation::Contour { magnitude } => magnitude,
        };

        let target: HashSet<usize> = self.target_spaxel_indices()?.into_iter().collect();
        let contours = self.cleaned_contours();
        let (level_index, level_magnitude) = self.host_level(magnitude);
        let Some(level) = contours.level(level_index) else {
            return Ok(Vec::new());
        };

        let forced = Some(level_index) != self.ladder.position(magnitude);
        let excluded = if forced {
            None
        } else {
            self.target_location(level_index).map(|loc| loc.polygon_index)
        };

        let mut indices: Vec<usize> = level
            .polygons
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != excluded)
            .flat_map(|(_, polygon)| self.cube.spaxels_within_polygon(polygon))
            .filter(|index| !target.contains(index))
            .collect();
        indices.sort_unstable();
        indices.dedup();

        tracing::debug!(
            magnitude = level_magnitude,
            forced,
            polygons = level.polygons.len(),
            spaxels = indices.len(),
            "classified other-source spaxels"
        );

        Ok(self.label(indices, label))
    }

    fn target_spaxel_indices(&self) -> Result<Vec<usize>> {
        let polygon = match self.separation(self.config.method) {
            Separation::Undetermined => return Err(Error::UndeterminedSeparation),
            Separation::CoLocated { .. } => self.brightest_target_polygon(),
            Separation::Contour { magnitude } => {
                let index = self
                    .ladder
                    .position(magnitude)
                    .ok_or(Error::UndeterminedSeparation)?;
                let location = self
                    .target_location(index)
                    .ok_or(Error::UndeterminedSeparation)?;
                location.polygon(self.cleaned_contours())
            }
        };

        let mut indices = match polygon {
            Some(polygon) => self.cube.spaxels_within_polygon(polygon),
            None => Vec::new(),
        };
        indices.sort_unstable();
        indices.dedup();
        tracing::debug!(spaxels = indices.len(), "classified target spaxels");
        Ok(indices)
    }

    /// First located polygon at ladder position `level_index`.
    fn target_location(&self, level_index: usize) -> Option<&super::TargetPolygonLocation> {
        self.target_polygon_locations()
            .iter()
            .find(|loc| loc.magnitude_index == level_index)
    }

    /// Target polygon at the brightest level, or that level's first polygon.
    fn brightest_target_polygon(&self) -> Option<&Polygon> {
        match self.target_location(0) {
            Some(location) => location.polygon(self.cleaned_contours()),
            None => self.cleaned_contours().polygon(0, 0),
        }
    }

    fn label(&self, indices: Vec<usize>, label: SpaxelLabel) -> Vec<usize> {
        match label {
            SpaxelLabel::Index => indices,
            SpaxelLabel::Id => self.cube.ids_for(&indices),
        }
    }
}

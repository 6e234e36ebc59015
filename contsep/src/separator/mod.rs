//! Contour separation of an IFU target from its neighbours.
//!
//! The separator traces iso-magnitude contours of the registered reference
//! image (with a synthetic point source injected at the target), projects
//! them into the cube, and picks the faintest level whose target contour is
//! still free of other sources. Spaxels inside that contour belong to the
//! target; spaxels inside the other contours of the level belong to the host
//! and other sources.
//!
//! Derived state is memoized and dropped by every setter that changes the
//! contours; [`ContourSeparator::generation`] counts those invalidations.

pub mod location;
mod spaxels;
pub mod threshold;


use std::cell::OnceCell;
use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::astrometry::Astrometry;
use crate::config::{SeparationMethod, SeparatorConfig};
use crate::contour::ContourMap;
use crate::cube::{Cube, SpaxelCube};
use crate::error::{Error, Result};
use crate::ladder::MagnitudeLadder;
use crate::night::NightArchive;
use crate::reference::{Frame, ReferenceImage, ReferenceModel};

pub use location::TargetPolygonLocation;
pub use spaxels::SpaxelLabel;
pub use threshold::Separation;

/// Everything derived from one offset, fake magnitude and ladder.
#[derive(Debug)]
struct DerivedState {
    /// Offset the contours were projected with.
    offset: DVec2,
    contours: ContourMap,
    locations: Vec<TargetPolygonLocation>,
    target: DVec2,
    sources: Vec<DVec2>,
    min_distance: Option<f64>,
    area_magnitude: Option<f64>,
    counting_magnitude: Option<f64>,
}

/// Target/host spaxel partition of one cube.
pub struct ContourSeparator<R: ReferenceModel, C: SpaxelCube> {
    reference: R,
    cube: C,
    config: SeparatorConfig,
    ladder: MagnitudeLadder,
    generation: u64,
    state: OnceCell<DerivedState>,
    reference_contours: OnceCell<ContourMap>,
}

impl<R: ReferenceModel, C: SpaxelCube> fmt::Debug for ContourSeparator<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContourSeparator")
            .field("config", &self.config)
            .field("nspaxels", &self.cube.nspaxels())
            .field("generation", &self.generation)
            .field("computed", &self.state.get().is_some())
            .finish()
    }
}

impl ContourSeparator<ReferenceImage, Cube> {
    /// Separator for `target` observed on night `date` (`YYYYMMDD`).
    ///
    /// Exactly one cube and one registration file must match the target.
    pub fn from_night(
        archive: &NightArchive,
        date: &str,
        target: &str,
        config: SeparatorConfig,
    ) -> Result<Self> {
        let cube = Cube::from_file(&archive.cube_file(date, target)?)?;
        let astrometry = Astrometry::from_file(&archive.registration_file(date, target)?)?;
        let reference = ReferenceImage::from_astrometry(astrometry, cube.footprint());
        tracing::info!(date, target, "building separator from night files");
        Self::new(reference, cube, config)
    }
}

impl<R: ReferenceModel, C: SpaxelCube> ContourSeparator<R, C> {
    /// Applies the configured offset and injects the synthetic target into `reference`.
    pub fn new(mut reference: R, cube: C, config: SeparatorConfig) -> Result<Self> {
        config.validate()?;
        if cube.nspaxels() == 0 {
            return Err(Error::EmptyCube);
        }
        let ladder = MagnitudeLadder::from_config(&config.isomag)?;

        reference.set_ifu_offset(config.offset);
        reference.inject_synthetic_source(config.fake_magnitude);

        Ok(Self {
            reference,
            cube,
            config,
            ladder,
            generation: 0,
            state: OnceCell::new(),
            reference_contours: OnceCell::new(),
        })
    }

    fn invalidate(&mut self, reason: &'static str) {
        self.generation += 1;
        self.state = OnceCell::new();
        self.reference_contours = OnceCell::new();
        tracing::debug!(generation = self.generation, reason, "dropped derived contour state");
    }

    // ==== Setters ====

    /// Registration correction between the reference image and the cube.
    pub fn set_offset(&mut self, offset: DVec2) -> Result<()> {
        if !offset.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "offset must be finite, got {}",
                offset
            )));
        }
        if offset == self.config.offset && offset == self.reference.ifu_offset() {
            return Ok(());
        }
        self.config.offset = offset;
        self.reference.set_ifu_offset(offset);
        self.invalidate("offset");
        Ok(())
    }

    /// Re-inject the synthetic target with a new magnitude.
    pub fn set_fake_magnitude(&mut self, magnitude: f64) -> Result<()> {
        if !magnitude.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "fake magnitude must be finite, got {}",
                magnitude
            )));
        }
        self.config.fake_magnitude = magnitude;
        self.reference.inject_synthetic_source(magnitude);
        self.invalidate("fake magnitude");
        Ok(())
    }

    /// Replace the magnitude ladder with `count` levels from `start` to `end`.
    pub fn set_isomag(&mut self, start: f64, end: f64, count: usize) -> Result<()> {
        self.ladder = MagnitudeLadder::new(start, end, count)?;
        self.config.isomag = crate::ladder::LadderConfig { start, end, count };
        self.invalidate("magnitude ladder");
        Ok(())
    }

    /// Only the other-source spaxels depend on this, so nothing is invalidated.
    pub fn set_forced_offset(&mut self, forced_offset: f64) -> Result<()> {
        if !forced_offset.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "forced offset must be finite, got {}",
                forced_offset
            )));
        }
        self.config.forced_offset = forced_offset;
        Ok(())
    }

    pub fn set_method(&mut self, method: SeparationMethod) {
        self.config.method = method;
    }

    // ==== Accessors ====

    #[inline]
    pub fn config(&self) -> &SeparatorConfig {
        &self.config
    }

    #[inline]
    pub fn isomag(&self) -> &MagnitudeLadder {
        &self.ladder
    }

    #[inline]
    pub fn offset(&self) -> DVec2 {
        self.config.offset
    }

    #[inline]
    pub fn fake_magnitude(&self) -> f64 {
        self.config.fake_magnitude
    }

    #[inline]
    pub fn forced_offset(&self) -> f64 {
        self.config.forced_offset
    }

    /// Number of times derived state has been invalidated.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn reference(&self) -> &R {
        &self.reference
    }

    /// Mutable access to the reference model; drops all derived state.
    pub fn reference_mut(&mut self) -> &mut R {
        self.invalidate("reference model borrowed mutably");
        &mut self.reference
    }

    #[inline]
    pub fn cube(&self) -> &C {
        &self.cube
    }

    // ==== Derived state ====

    fn state(&self) -> &DerivedState {
        self.state.get_or_init(|| self.derive())
    }

    fn derive(&self) -> DerivedState {
        let offset = self.reference.ifu_offset();
        let contours = self
            .reference
            .iso_contours(Frame::Ifu, &self.ladder)
            .cleaned();
        let target = self.reference.target_coordinate(Frame::Ifu);
        let locations = location::locate_target_polygons(&contours, target);
        let sources = self.reference.other_source_coordinates(Frame::Ifu, true);
        let min_distance = threshold::min_source_distance(target, &sources);
        let area_magnitude = threshold::faintest_by_area(&contours, &locations);
        let counting_magnitude = threshold::faintest_by_counting(&contours, &locations, &sources);

        tracing::info!(
            generation = self.generation,
            offset = %offset,
            polygons = contours.polygon_count(),
            located = locations.len(),
            sources = sources.len(),
            min_distance = ?min_distance,
            area = ?area_magnitude,
            counting = ?counting_magnitude,
            "derived contour state"
        );

        DerivedState {
            offset,
            contours,
            locations,
            target,
            sources,
            min_distance,
            area_magnitude,
            counting_magnitude,
        }
    }

    /// Cube-frame contours with degenerate polygons removed.
    pub fn cleaned_contours(&self) -> &ContourMap {
        &self.state().contours
    }

    /// Reference-frame contours, unprojected and uncleaned.
    pub fn reference_contours(&self) -> &ContourMap {
        self.reference_contours
            .get_or_init(|| self.reference.iso_contours(Frame::Reference, &self.ladder))
    }

    /// Polygons containing the target, brightest level first.
    pub fn target_polygon_locations(&self) -> &[TargetPolygonLocation] {
        &self.state().locations
    }

    /// Target position in the cube frame.
    pub fn target_coordinate(&self) -> DVec2 {
        self.state().target
    }

    /// Catalogued sources inside the cube, in the cube frame.
    pub fn source_coordinates(&self) -> &[DVec2] {
        &self.state().sources
    }

    /// Distance to the nearest catalogued source, `None` without sources.
    pub fn min_source_distance(&self) -> Option<f64> {
        self.state().min_distance
    }

    pub fn area_method_magnitude(&self) -> Option<f64> {
        self.state().area_magnitude
    }

    pub fn counting_method_magnitude(&self) -> Option<f64> {
        self.state().counting_magnitude
    }

    pub fn separation(&self, method: SeparationMethod) -> Separation {
        let state = self.state();
        threshold::decide(
            method,
            state.min_distance,
            state.area_magnitude,
            state.counting_magnitude,
            self.ladder.brightest(),
        )
    }

    /// Faintest magnitude isolating the target, without the forced offset.
    pub fn target_separation_magnitude(&self, method: SeparationMethod) -> Option<f64> {
        self.separation(method).magnitude()
    }

    /// Ladder level used for other-source spaxels.
    ///
    /// A non-zero forced offset moves the level to the ladder magnitude
    /// nearest `separation + forced_offset`, provided the separation is not
    /// already the faintest level.
    pub fn host_separation_magnitude(&self) -> Option<f64> {
        match self.separation(self.config.method) {
            Separation::Contour { magnitude } => Some(self.host_level(magnitude).1),
            other => other.magnitude(),
        }
    }

    /// `(ladder index, magnitude)` of the other-source level for separation `magnitude`.
    fn host_level(&self, magnitude: f64) -> (usize, f64) {
        let target = if self.config.forced_offset != 0.0 && magnitude < self.ladder.faintest() {
            magnitude + self.config.forced_offset
        } else {
            magnitude
        };
        let index = self.ladder.nearest(target);
        (index, self.ladder.magnitudes()[index])
    }

    /// Offset, magnitudes and spaxel counts of the current separation.
    pub fn summary(&self) -> SeparationSummary {
        let separation = self.separation(self.config.method);
        SeparationSummary {
            offset: self.state().offset,
            fake_magnitude: self.config.fake_magnitude,
            forced_offset: self.config.forced_offset,
            method: self.config.method,
            separation,
            host_magnitude: self.host_separation_magnitude(),
            target_spaxels: self
                .target_spaxels(SpaxelLabel::Index)
                .map_or(0, |s| s.len()),
            other_spaxels: self
                .other_spaxels(SpaxelLabel::Index)
                .map_or(0, |s| s.len()),
        }
    }
}

/// One-line description of a separation result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeparationSummary {
    pub offset: DVec2,
    pub fake_magnitude: f64,
    pub forced_offset: f64,
    pub method: SeparationMethod,
    pub separation: Separation,
    pub host_magnitude: Option<f64>,
    pub target_spaxels: usize,
    pub other_spaxels: usize,
}

impl fmt::Display for SeparationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "offset=({:.1}, {:.1}), fake={:.1} mag, method={}, ",
            self.offset.x, self.offset.y, self.fake_magnitude, self.method
        )?;
        match (self.separation, self.host_magnitude) {
            (Separation::Undetermined, _) => write!(f, "contsep_mag undetermined")?,
            (Separation::CoLocated { magnitude }, _) => {
                write!(f, "contsep_mag for target={:.1} mag (co-located)", magnitude)?
            }
            (Separation::Contour { magnitude }, Some(host)) => write!(
                f,
                "contsep_mag for target={:.1} mag (host={:.1} mag)",
                magnitude, host
            )?,
            (Separation::Contour { magnitude }, None) => {
                write!(f, "contsep_mag for target={:.1} mag", magnitude)?
            }
        }
        write!(
            f,
            ", spaxels target={} other={}",
            self.target_spaxels, self.other_spaxels
        )
    }
}

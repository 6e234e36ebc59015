//! Reference photometry model: the deeper image that defines where sources are.


use glam::DVec2;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::astrometry::Astrometry;
use crate::contour::marching_squares::trace_contours;
use crate::contour::ContourMap;
use crate::geometry::Bounds;
use crate::image::{magnitude_to_flux, FluxImage};
use crate::ladder::MagnitudeLadder;

/// Coordinate frame a position or contour is expressed in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Frame {
    /// Reference-image pixels.
    Reference,
    /// IFU cube coordinates.
    Ifu,
}

/// Source positions and iso-magnitude contours of a registered reference image.
pub trait ReferenceModel {
    /// Additional registration correction applied on top of the reference-to-cube transform.
    fn set_ifu_offset(&mut self, offset: DVec2);

    fn ifu_offset(&self) -> DVec2;

    /// Place a point source of `magnitude` at the target position,
    /// replacing any previously injected one.
    fn inject_synthetic_source(&mut self, magnitude: f64);

    /// Contours of the injected image at every ladder magnitude.
    fn iso_contours(&self, frame: Frame, ladder: &MagnitudeLadder) -> ContourMap;

    fn target_coordinate(&self, frame: Frame) -> DVec2;

    /// Catalogued sources other than the synthetic target.
    ///
    /// With `in_ifu_only`, sources outside the cube footprint are left out.
    fn other_source_coordinates(&self, frame: Frame, in_ifu_only: bool) -> Vec<DVec2>;
}

/// Reference image rendered from the registration catalog.
///
/// Every catalogued source is an elliptical Gaussian whose total flux follows
/// from its magnitude and the image zero point. Contour levels use the same
/// zero point, so a ladder magnitude `m` is the per-pixel flux `10^(-0.4 (m - zp))`.
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    astrometry: Astrometry,
    footprint: Option<Bounds>,
    ifu_offset: DVec2,
    base: FluxImage,
    injected: FluxImage,
    synthetic_magnitude: Option<f64>,
}

impl ReferenceImage {
    /// `footprint` is the cube extent in IFU coordinates, used by `in_ifu_only` queries.
    pub fn from_astrometry(astrometry: Astrometry, footprint: Option<Bounds>) -> Self {
        let geometry = *astrometry.reference();
        let mut base = FluxImage::filled(geometry.width, geometry.height, 0.0);

        for source in astrometry.catalog() {
            let valid_shape = source.fwhm.is_finite()
                && source.fwhm > 0.0
                && source.axis_ratio > 0.0
                && source.axis_ratio <= 1.0;
            if !valid_shape {
                tracing::warn!(
                    position = ?source.position,
                    fwhm = source.fwhm,
                    axis_ratio = source.axis_ratio,
                    "skipping catalog source with invalid shape"
                );
                continue;
            }
            base.add_gaussian(
                source.position,
                magnitude_to_flux(source.magnitude, geometry.zero_point),
                source.fwhm,
                source.axis_ratio,
                source.position_angle_deg.to_radians(),
            );
        }

        tracing::debug!(
            width = geometry.width,
            height = geometry.height,
            sources = astrometry.catalog().len(),
            total_flux = base.total_flux(),
            "rendered reference image"
        );

        Self {
            injected: base.clone(),
            astrometry,
            footprint,
            ifu_offset: DVec2::ZERO,
            base,
            synthetic_magnitude: None,
        }
    }

    #[inline]
    pub fn astrometry(&self) -> &Astrometry {
        &self.astrometry
    }

    /// Catalog-only image, without the synthetic target.
    #[inline]
    pub fn base_image(&self) -> &FluxImage {
        &self.base
    }

    /// Image the contours are traced on.
    #[inline]
    pub fn injected_image(&self) -> &FluxImage {
        &self.injected
    }

    #[inline]
    pub fn synthetic_magnitude(&self) -> Option<f64> {
        self.synthetic_magnitude
    }

    /// Reference pixel to IFU coordinate, including the current offset.
    pub fn to_ifu(&self, p: DVec2) -> DVec2 {
        self.astrometry.transform().apply(p) + self.ifu_offset
    }

    fn project(&self, p: DVec2, frame: Frame) -> DVec2 {
        match frame {
            Frame::Reference => p,
            Frame::Ifu => self.to_ifu(p),
        }
    }
}

impl ReferenceModel for ReferenceImage {
    fn set_ifu_offset(&mut self, offset: DVec2) {
        self.ifu_offset = offset;
    }

    fn ifu_offset(&self) -> DVec2 {
        self.ifu_offset
    }

    fn inject_synthetic_source(&mut self, magnitude: f64) {
        let geometry = self.astrometry.reference();
        let mut injected = self.base.clone();
        injected.add_gaussian(
            self.astrometry.target(),
            magnitude_to_flux(magnitude, geometry.zero_point),
            geometry.psf_fwhm,
            1.0,
            0.0,
        );
        tracing::debug!(
            magnitude,
            target = ?self.astrometry.target(),
            "injected synthetic target"
        );
        self.injected = injected;
        self.synthetic_magnitude = Some(magnitude);
    }

    fn iso_contours(&self, frame: Frame, ladder: &MagnitudeLadder) -> ContourMap {
        let zero_point = self.astrometry.reference().zero_point;
        let polygons = ladder
            .magnitudes()
            .iter()
            .map(|&m| trace_contours(&self.injected, magnitude_to_flux(m, zero_point) as f32))
            .collect();
        let map = ContourMap::from_ladder(ladder, polygons);

        match frame {
            Frame::Reference => map,
            Frame::Ifu => map.map_points(|p| self.to_ifu(p)),
        }
    }

    fn target_coordinate(&self, frame: Frame) -> DVec2 {
        self.project(self.astrometry.target(), frame)
    }

    fn other_source_coordinates(&self, frame: Frame, in_ifu_only: bool) -> Vec<DVec2> {
        self.astrometry
            .catalog()
            .iter()
            .filter(|source| {
                !in_ifu_only
                    || self
                        .footprint
                        .is_none_or(|b| b.contains(self.to_ifu(source.position)))
            })
            .map(|source| self.project(source.position, frame))
            .collect()
    }
}

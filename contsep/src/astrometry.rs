//! Registration record between the reference image and the IFU cube.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transform::{SimilarityParams, Transform};

/// One catalogued source of the reference image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSource {
    /// Position in reference-image pixels.
    pub position: DVec2,
    pub magnitude: f64,
    /// Major-axis FWHM in reference pixels.
    pub fwhm: f64,
    /// Minor/major axis ratio, 1 for point-like sources.
    pub axis_ratio: f64,
    /// Major-axis angle in degrees, counter-clockwise from +x.
    pub position_angle_deg: f64,
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self {
            position: DVec2::ZERO,
            magnitude: f64::NAN,
            fwhm: 2.5,
            axis_ratio: 1.0,
            position_angle_deg: 0.0,
        }
    }
}

impl CatalogSource {
    /// Catalogs mark missing photometry with negative or non-finite magnitudes.
    pub fn has_valid_magnitude(&self) -> bool {
        self.magnitude.is_finite() && self.magnitude >= 0.0
    }
}

/// Geometry and photometric calibration of the reference image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceGeometry {
    pub width: usize,
    pub height: usize,
    /// Magnitude of a source with unit total flux.
    pub zero_point: f64,
    /// Point-spread FWHM in reference pixels, used for the synthetic target.
    pub psf_fwhm: f64,
}

impl Default for ReferenceGeometry {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            zero_point: 25.0,
            psf_fwhm: 2.5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct AstrometryFile {
    registration: SimilarityParams,
    target: DVec2,
    reference: ReferenceGeometry,
    catalog: Vec<CatalogSource>,
}

/// Coordinate registration plus the reference catalog it was solved against.
#[derive(Debug, Clone, PartialEq)]
pub struct Astrometry {
    transform: Transform,
    target: DVec2,
    reference: ReferenceGeometry,
    catalog: Vec<CatalogSource>,
}

impl Astrometry {
    /// Sources with invalid magnitudes are dropped from `catalog`.
    pub fn new(
        transform: Transform,
        target: DVec2,
        reference: ReferenceGeometry,
        catalog: Vec<CatalogSource>,
    ) -> Self {
        assert!(
            reference.psf_fwhm > 0.0,
            "PSF FWHM must be positive, got {}",
            reference.psf_fwhm
        );
        let total = catalog.len();
        let catalog: Vec<CatalogSource> = catalog
            .into_iter()
            .filter(CatalogSource::has_valid_magnitude)
            .collect();
        if catalog.len() < total {
            tracing::debug!(
                dropped = total - catalog.len(),
                kept = catalog.len(),
                "dropped catalog sources without photometry"
            );
        }

        Self {
            transform,
            target,
            reference,
            catalog,
        }
    }

    /// Load a registration file.
    ///
    /// ```yaml
    /// registration: { scale: 0.5, rotation_deg: 12.0, translation: [-20.0, -18.0] }
    /// target: [64.0, 61.5]
    /// reference: { width: 128, height: 128, zero_point: 25.0, psf_fwhm: 2.5 }
    /// catalog:
    ///   - { position: [70.0, 61.0], magnitude: 18.2, fwhm: 6.0, axis_ratio: 0.6 }
    /// ```
    pub fn from_file(path: &Path) -> Result<Self> {
        let file: AstrometryFile = crate::yaml::load(path)?;
        if !file.reference.psf_fwhm.is_finite() || file.reference.psf_fwhm <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "reference psf_fwhm must be positive, got {}",
                file.reference.psf_fwhm
            )));
        }
        if !file.registration.scale.is_finite() || file.registration.scale <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "registration scale must be positive, got {}",
                file.registration.scale
            )));
        }
        let astrometry = Self::new(
            file.registration.into(),
            file.target,
            file.reference,
            file.catalog,
        );
        tracing::info!(
            path = %path.display(),
            transform = %astrometry.transform,
            sources = astrometry.catalog.len(),
            "loaded registration"
        );
        Ok(astrometry)
    }

    /// Reference-to-cube transform, without any IFU offset.
    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Target position in reference pixels.
    #[inline]
    pub fn target(&self) -> DVec2 {
        self.target
    }

    #[inline]
    pub fn reference(&self) -> &ReferenceGeometry {
        &self.reference
    }

    #[inline]
    pub fn catalog(&self) -> &[CatalogSource] {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRATION: &str = "\
registration:
  scale: 0.5
  rotation_deg: 0.0
  translation: [-10.0, -5.0]
target: [40.0, 30.0]
reference:
  width: 80
  height: 60
  zero_point: 26.0
catalog:
  - position: [50.0, 30.0]
    magnitude: 19.0
    fwhm: 5.0
    axis_ratio: 0.7
    position_angle_deg: 30.0
  - position: [10.0, 10.0]
    magnitude: -99.0
  - position: [20.0, 20.0]
";

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guider_ZTF20abc_astrom.yaml");
        std::fs::write(&path, REGISTRATION).unwrap();

        let astrometry = Astrometry::from_file(&path).unwrap();
        assert_eq!(astrometry.target(), DVec2::new(40.0, 30.0));
        assert_eq!(astrometry.reference().width, 80);
        assert_eq!(astrometry.reference().zero_point, 26.0);
        // Unspecified fields keep their defaults
        assert_eq!(astrometry.reference().psf_fwhm, 2.5);

        // Sentinel and missing magnitudes are dropped
        assert_eq!(astrometry.catalog().len(), 1);
        let source = astrometry.catalog()[0];
        assert_eq!(source.magnitude, 19.0);
        assert_eq!(source.axis_ratio, 0.7);

        let cube = astrometry.transform().apply(astrometry.target());
        assert!((cube - DVec2::new(10.0, 10.0)).length() < 1e-9);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Astrometry::from_file(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, Error::ReadFile { .. }));
    }

    #[test]
    fn test_rejects_invalid_psf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_psf.yaml");
        std::fs::write(&path, "reference: { psf_fwhm: 0.0 }\n").unwrap();
        let err = Astrometry::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "registration: [1, 2").unwrap();
        let err = Astrometry::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}

//! Separator configuration.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::{Error, Result};
use crate::ladder::{LadderConfig, MagnitudeLadder};

/// Which threshold heuristic decides the separation magnitude.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SeparationMethod {
    /// Both heuristics; counting wins when they disagree.
    #[default]
    Both,
    /// Contour area growth only.
    Area,
    /// Contamination by catalogued sources only.
    Counting,
}

/// Parameters of a [`crate::ContourSeparator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparatorConfig {
    /// Registration correction `(dx, dy)` in IFU units.
    pub offset: DVec2,
    /// Magnitude of the synthetic point source injected at the target.
    pub fake_magnitude: f64,
    /// Added to the separation magnitude when collecting other-source spaxels.
    /// Positive values go fainter and widen the host region.
    pub forced_offset: f64,
    /// Magnitude ladder contours are traced at.
    pub isomag: LadderConfig,
    pub method: SeparationMethod,
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            offset: DVec2::ZERO,
            fake_magnitude: 16.0,
            forced_offset: 0.0,
            isomag: LadderConfig::default(),
            method: SeparationMethod::Both,
        }
    }
}

impl SeparatorConfig {
    pub fn with_offset(mut self, offset: DVec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_fake_magnitude(mut self, fake_magnitude: f64) -> Self {
        self.fake_magnitude = fake_magnitude;
        self
    }

    pub fn with_forced_offset(mut self, forced_offset: f64) -> Self {
        self.forced_offset = forced_offset;
        self
    }

    /// Set the ladder as `[start, end, count]`.
    pub fn with_isomag(mut self, start: f64, end: f64, count: usize) -> Self {
        self.isomag = LadderConfig { start, end, count };
        self
    }

    pub fn with_method(mut self, method: SeparationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.offset.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "offset must be finite, got {}",
                self.offset
            )));
        }
        if !self.fake_magnitude.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "fake_magnitude must be finite, got {}",
                self.fake_magnitude
            )));
        }
        if !self.forced_offset.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "forced_offset must be finite, got {}",
                self.forced_offset
            )));
        }
        MagnitudeLadder::from_config(&self.isomag)?;
        Ok(())
    }

    /// Load and validate a YAML config; missing fields take their defaults.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let config: Self = crate::yaml::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

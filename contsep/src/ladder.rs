//! Magnitude ladder: the iso-flux levels contours are traced at.

use common::float_ext::{nearest_index, FloatExt};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// `[start, end, count]` triple describing an evenly spaced ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    /// Brightest magnitude.
    pub start: f64,
    /// Faintest magnitude (inclusive).
    pub end: f64,
    /// Number of levels.
    pub count: usize,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            start: 20.0,
            end: 26.0,
            count: 13,
        }
    }
}

/// Strictly increasing magnitudes, brightest first.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeLadder {
    magnitudes: Vec<f64>,
}

impl MagnitudeLadder {
    /// Evenly spaced ladder with both endpoints included.
    pub fn new(start: f64, end: f64, count: usize) -> Result<Self> {
        let invalid = |reason| Error::InvalidLadder {
            start,
            end,
            count,
            reason,
        };

        if !start.is_finite() || !end.is_finite() {
            return Err(invalid("bounds must be finite"));
        }
        if count < 2 {
            return Err(invalid("at least two levels are required"));
        }
        if start >= end {
            return Err(invalid("start must be brighter (smaller) than end"));
        }

        let step = (end - start) / (count - 1) as f64;
        let mut magnitudes: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
        // Pin the last level so the faintest magnitude is exactly `end`
        magnitudes[count - 1] = end;

        Ok(Self { magnitudes })
    }

    pub fn from_config(config: &LadderConfig) -> Result<Self> {
        Self::new(config.start, config.end, config.count)
    }

    #[inline]
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.magnitudes.get(index).copied()
    }

    /// Brightest level.
    #[inline]
    pub fn brightest(&self) -> f64 {
        self.magnitudes[0]
    }

    /// Faintest level.
    #[inline]
    pub fn faintest(&self) -> f64 {
        self.magnitudes[self.magnitudes.len() - 1]
    }

    /// Index of a level equal to `magnitude` within [`common::EPSILON`].
    pub fn position(&self, magnitude: f64) -> Option<usize> {
        self.magnitudes
            .iter()
            .position(|m| m.approximately_eq(magnitude))
    }

    /// Index of the level closest to `magnitude`; out-of-range values clamp to an end.
    pub fn nearest(&self, magnitude: f64) -> usize {
        if magnitude.is_nan() {
            return 0;
        }
        nearest_index(&self.magnitudes, magnitude).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ladder() {
        let ladder = MagnitudeLadder::from_config(&LadderConfig::default()).unwrap();
        assert_eq!(ladder.len(), 13);
        assert_eq!(ladder.brightest(), 20.0);
        assert_eq!(ladder.faintest(), 26.0);
        assert_eq!(ladder.get(1), Some(20.5));
        assert_eq!(ladder.get(13), None);
    }

    #[test]
    fn test_strictly_increasing() {
        let ladder = MagnitudeLadder::new(18.3, 27.1, 41).unwrap();
        assert!(ladder.magnitudes().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ladder.faintest(), 27.1);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(matches!(
            MagnitudeLadder::new(20.0, 26.0, 1),
            Err(Error::InvalidLadder { count: 1, .. })
        ));
        assert!(MagnitudeLadder::new(26.0, 20.0, 13).is_err());
        assert!(MagnitudeLadder::new(20.0, 20.0, 13).is_err());
        assert!(MagnitudeLadder::new(f64::NAN, 26.0, 13).is_err());
        assert!(MagnitudeLadder::new(20.0, f64::INFINITY, 13).is_err());
    }

    #[test]
    fn test_position_and_nearest() {
        let ladder = MagnitudeLadder::new(20.0, 26.0, 13).unwrap();
        assert_eq!(ladder.position(23.5), Some(7));
        assert_eq!(ladder.position(23.5 + 1e-9), Some(7));
        assert_eq!(ladder.position(23.6), None);

        assert_eq!(ladder.nearest(23.6), 7);
        assert_eq!(ladder.nearest(30.0), 12);
        assert_eq!(ladder.nearest(10.0), 0);
    }
}

//! Row-major flux image in reference-frame pixels.

use std::f64::consts::PI;

use glam::DVec2;

/// FWHM of a Gaussian in units of its sigma.
pub const FWHM_TO_SIGMA: f64 = 2.354_820_045_030_949;

/// Total flux of a source of magnitude `mag` for photometric zero point `zero_point`.
#[inline]
pub fn magnitude_to_flux(mag: f64, zero_point: f64) -> f64 {
    10f64.powf(-0.4 * (mag - zero_point))
}

/// Row-major image of flux values; pixel `(x, y)` has its centre at `(x, y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FluxImage {
    pixels: Vec<f32>,
    width: usize,
    height: usize,
}

impl FluxImage {
    pub fn new(width: usize, height: usize, pixels: Vec<f32>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixels length must equal width * height"
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self::new(width, height, vec![value; width * height])
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        debug_assert!(x < self.width && y < self.height);
        self.pixels[y * self.width + x] = value;
    }

    /// Smallest and largest finite pixel values, or `None` if there are none.
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        self.pixels
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Sum of all finite pixels.
    pub fn total_flux(&self) -> f64 {
        self.pixels
            .iter()
            .filter(|v| v.is_finite())
            .map(|&v| v as f64)
            .sum()
    }

    /// Add an elliptical Gaussian profile of integrated flux `flux`.
    ///
    /// `axis_ratio` is minor/major (1 = circular), `angle` rotates the major
    /// axis counter-clockwise from +x, in radians. The profile is evaluated
    /// at pixel centres out to 5 sigma of the major axis.
    pub fn add_gaussian(
        &mut self,
        center: DVec2,
        flux: f64,
        fwhm: f64,
        axis_ratio: f64,
        angle: f64,
    ) {
        assert!(fwhm > 0.0, "FWHM must be positive, got {}", fwhm);
        assert!(
            axis_ratio > 0.0 && axis_ratio <= 1.0,
            "axis ratio must be in (0, 1], got {}",
            axis_ratio
        );
        if !center.is_finite() || !flux.is_finite() || self.pixels.is_empty() {
            return;
        }

        let sigma_major = fwhm / FWHM_TO_SIGMA;
        let sigma_minor = sigma_major * axis_ratio;
        let peak = flux / (2.0 * PI * sigma_major * sigma_minor);
        let (sin_a, cos_a) = angle.sin_cos();

        let reach = 5.0 * sigma_major;
        let x_lo = (center.x - reach).floor().max(0.0) as usize;
        let y_lo = (center.y - reach).floor().max(0.0) as usize;
        let x_hi = ((center.x + reach).ceil().max(0.0) as usize).min(self.width - 1);
        let y_hi = ((center.y + reach).ceil().max(0.0) as usize).min(self.height - 1);
        if x_lo > x_hi || y_lo > y_hi {
            return;
        }

        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                let d = DVec2::new(x as f64, y as f64) - center;
                let u = d.x * cos_a + d.y * sin_a;
                let v = -d.x * sin_a + d.y * cos_a;
                let r2 = (u / sigma_major).powi(2) + (v / sigma_minor).powi(2);
                self.pixels[y * self.width + x] += (peak * (-0.5 * r2).exp()) as f32;
            }
        }
    }
}

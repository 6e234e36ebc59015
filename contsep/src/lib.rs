//! Contsep - contour-based separation of IFU targets from their hosts.
//!
//! Given an IFU cube and a registered reference image, this library decides
//! which spaxels belong to a target and which to the host galaxy and other
//! catalogued sources:
//! - Iso-magnitude contours of the reference image, with a synthetic point
//!   source injected at the target, are projected into the cube
//! - Degenerate contours are dropped and the contours holding the target are located
//! - Area-growth and source-counting heuristics pick the faintest level that
//!   still isolates the target
//! - Spaxels are classified by point-in-polygon tests against that level
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use contsep::{ContourSeparator, NightArchive, SeparatorConfig, SpaxelLabel};
//!
//! let archive = NightArchive::from_env();
//! let config = SeparatorConfig::default().with_forced_offset(1.0);
//! let separator = ContourSeparator::from_night(&archive, "20240315", "ZTF24aaa", config)?;
//!
//! let target = separator.target_spaxels(SpaxelLabel::Id)?;
//! let host = separator.other_spaxels(SpaxelLabel::Id)?;
//! println!("{}", separator.summary());
//! ```

pub mod astrometry;
pub mod config;
pub mod contour;
pub mod cube;
pub mod error;
pub mod geometry;
pub mod image;
pub mod ladder;
pub mod night;
pub mod reference;
pub mod separator;
pub mod transform;
mod yaml;

#[cfg(test)]
pub mod testing;

// ============================================================================
// Separation
// ============================================================================

pub use separator::{
    ContourSeparator, Separation, SeparationSummary, SpaxelLabel, TargetPolygonLocation,
};

// ============================================================================
// Configuration and errors
// ============================================================================

pub use config::{SeparationMethod, SeparatorConfig};
pub use error::{Error, Result};
pub use ladder::{LadderConfig, MagnitudeLadder};

// ============================================================================
// Collaborators
// ============================================================================

pub use astrometry::{Astrometry, CatalogSource, ReferenceGeometry};
pub use cube::{Cube, Spaxel, SpaxelCube};
pub use night::NightArchive;
pub use reference::{Frame, ReferenceImage, ReferenceModel};

// ============================================================================
// Geometry
// ============================================================================

pub use contour::{ContourLevel, ContourMap, LevelKey};
pub use geometry::{Bounds, Polygon};
pub use image::FluxImage;
pub use transform::{SimilarityParams, Transform};

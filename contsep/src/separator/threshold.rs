//! Choosing the faintest magnitude whose contour still isolates the target.
//!
//! Areas are in cube units squared, distances in cube units.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::location::TargetPolygonLocation;
use crate::config::SeparationMethod;
use crate::contour::ContourMap;

/// Target and a catalogued source this close cannot be told apart.
pub const CO_LOCATED_DISTANCE: f64 = 2.0;
/// Two consecutive contours both above this area are blended with another source.
pub const BLENDED_AREA: f64 = 50.0;
/// A contour below this area is the point-like target on its own.
pub const ISOLATED_AREA: f64 = 10.0;
/// Area growth between consecutive levels that means another source was engulfed.
pub const AREA_JUMP: f64 = 40.0;
/// Largest contour the counting heuristic considers.
pub const COUNTING_MAX_AREA: f64 = 100.0;

/// Outcome of threshold selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Separation {
    /// A catalogued source sits on the target; `magnitude` is the brightest ladder level.
    CoLocated { magnitude: f64 },
    /// Faintest contour level isolating the target.
    Contour { magnitude: f64 },
    /// The heuristics could not pick a level.
    Undetermined,
}

impl Separation {
    pub fn magnitude(&self) -> Option<f64> {
        match *self {
            Separation::CoLocated { magnitude } | Separation::Contour { magnitude } => {
                Some(magnitude)
            }
            Separation::Undetermined => None,
        }
    }

    pub fn is_co_located(&self) -> bool {
        matches!(self, Separation::CoLocated { .. })
    }
}

fn located_areas(contours: &ContourMap, locations: &[TargetPolygonLocation]) -> Vec<(f64, f64)> {
    locations
        .iter()
        .filter_map(|loc| loc.polygon(contours).map(|p| (loc.magnitude, p.area())))
        .collect()
}

/// Area-growth heuristic.
///
/// Walks consecutive located polygons from the faintest toward the brightest.
/// Pairs that are both blended are skipped; a small fainter polygon is the
/// answer; a large jump in area answers with the brighter level of the pair.
pub fn faintest_by_area(
    contours: &ContourMap,
    locations: &[TargetPolygonLocation],
) -> Option<f64> {
    let areas = located_areas(contours, locations);

    for pair in areas.windows(2).rev() {
        let (brighter_mag, brighter_area) = pair[0];
        let (fainter_mag, fainter_area) = pair[1];

        if fainter_area > BLENDED_AREA && brighter_area > BLENDED_AREA {
            continue;
        }
        if fainter_area < ISOLATED_AREA {
            tracing::debug!(
                magnitude = fainter_mag,
                area = fainter_area,
                "area method: isolated contour"
            );
            return Some(fainter_mag);
        }
        if (fainter_area - brighter_area).abs() > AREA_JUMP {
            tracing::debug!(
                magnitude = brighter_mag,
                brighter_area,
                fainter_area,
                "area method: area jump"
            );
            return Some(brighter_mag);
        }
    }

    tracing::debug!(located = areas.len(), "area method: no decision");
    None
}

/// Source-counting heuristic.
///
/// Walks located polygons from the faintest toward the brightest and answers
/// with the first one below [`COUNTING_MAX_AREA`] that contains none of `sources`.
pub fn faintest_by_counting(
    contours: &ContourMap,
    locations: &[TargetPolygonLocation],
    sources: &[DVec2],
) -> Option<f64> {
    for loc in locations.iter().rev() {
        let Some(polygon) = loc.polygon(contours) else {
            continue;
        };
        if polygon.area() >= COUNTING_MAX_AREA {
            continue;
        }
        if sources.iter().all(|&s| !polygon.contains(s)) {
            tracing::debug!(magnitude = loc.magnitude, "counting method: uncontaminated contour");
            return Some(loc.magnitude);
        }
    }

    tracing::debug!(located = locations.len(), "counting method: no decision");
    None
}

/// Distance from `target` to the nearest of `sources`, ignoring non-finite positions.
pub fn min_source_distance(target: DVec2, sources: &[DVec2]) -> Option<f64> {
    sources
        .iter()
        .map(|&s| target.distance(s))
        .filter(|d| d.is_finite())
        .min_by(|a, b| a.total_cmp(b))
}

/// Combine the two heuristic results for `method`.
///
/// With [`SeparationMethod::Both`], disagreement resolves to the counting result.
pub fn reconcile(
    method: SeparationMethod,
    area: Option<f64>,
    counting: Option<f64>,
) -> Option<f64> {
    match method {
        SeparationMethod::Area => area,
        SeparationMethod::Counting => counting,
        SeparationMethod::Both => {
            if area != counting {
                tracing::warn!(
                    area = ?area,
                    counting = ?counting,
                    "threshold heuristics disagree, using counting result"
                );
            }
            counting
        }
    }
}

/// Full threshold decision.
///
/// `min_distance` is `None` when there are no catalogued sources, in which
/// case only the area heuristic is meaningful and `method` is overridden.
pub fn decide(
    method: SeparationMethod,
    min_distance: Option<f64>,
    area: Option<f64>,
    counting: Option<f64>,
    brightest: f64,
) -> Separation {
    let method = match min_distance {
        Some(d) if d <= CO_LOCATED_DISTANCE => {
            tracing::info!(
                distance = d,
                magnitude = brightest,
                "target co-located with a catalogued source"
            );
            return Separation::CoLocated {
                magnitude: brightest,
            };
        }
        Some(_) => method,
        None => SeparationMethod::Area,
    };

    match reconcile(method, area, counting) {
        Some(magnitude) => Separation::Contour { magnitude },
        None => Separation::Undetermined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::ContourMap;
    use crate::geometry::Polygon;
    use crate::ladder::MagnitudeLadder;
    use crate::separator::location::locate_target_polygons;

    fn square(center: DVec2, area: f64) -> Polygon {
        let h = area.sqrt() / 2.0;
        let (x, y) = (center.x, center.y);
        Polygon::from_xy(&[
            (x - h, y - h),
            (x + h, y - h),
            (x + h, y + h),
            (x - h, y + h),
            (x - h, y - h),
        ])
    }

    /// One target-centred square per level with the given areas.
    fn map_with_areas(areas: &[f64]) -> (ContourMap, Vec<TargetPolygonLocation>) {
        let ladder = MagnitudeLadder::new(20.0, 20.0 + 0.5 * (areas.len() - 1) as f64, areas.len())
            .unwrap();
        let polygons = areas.iter().map(|&a| vec![square(DVec2::ZERO, a)]).collect();
        let map = ContourMap::from_ladder(&ladder, polygons);
        let locations = locate_target_polygons(&map, DVec2::ZERO);
        (map, locations)
    }

    #[test]
    fn test_area_isolated_fainter_contour() {
        let (map, locs) = map_with_areas(&[3.0, 5.0, 8.0]);
        // Faintest pair: fainter area 8 < 10
        assert_eq!(faintest_by_area(&map, &locs), Some(21.0));
    }

    #[test]
    fn test_area_jump_returns_brighter_level() {
        let (map, locs) = map_with_areas(&[12.0, 20.0, 70.0, 80.0]);
        // (70, 80) blended, (20, 70) jumps by 50
        assert_eq!(faintest_by_area(&map, &locs), Some(20.5));
    }

    #[test]
    fn test_area_all_blended_is_undetermined() {
        let (map, locs) = map_with_areas(&[60.0, 70.0, 80.0, 90.0]);
        assert_eq!(faintest_by_area(&map, &locs), None);
        // A single located polygon has nothing to compare with
        let (map, locs) = map_with_areas(&[5.0, 30.0]);
        assert_eq!(faintest_by_area(&map, &locs[1..]), None);
    }

    #[test]
    fn test_area_gradual_growth_walks_on() {
        // Undecided pairs are walked past
        let (map, locs) = map_with_areas(&[4.0, 9.0, 25.0, 40.0]);
        assert_eq!(faintest_by_area(&map, &locs), Some(20.5));
    }

    #[test]
    fn test_counting_skips_contaminated_and_large() {
        let (map, locs) = map_with_areas(&[4.0, 16.0, 64.0, 144.0]);
        // Source at distance 3 is inside the 64 square (half-width 4),
        // not the 16 one (half-width 2)
        let sources = [DVec2::new(3.0, 0.0)];
        assert_eq!(faintest_by_counting(&map, &locs, &sources), Some(20.5));
        // Without sources, the faintest polygon under the area limit wins
        assert_eq!(faintest_by_counting(&map, &locs, &[]), Some(21.0));
        // Contaminated everywhere
        assert_eq!(faintest_by_counting(&map, &locs, &[DVec2::new(0.5, 0.5)]), None);
    }

    #[test]
    fn test_min_source_distance() {
        assert_eq!(min_source_distance(DVec2::ZERO, &[]), None);
        let sources = [DVec2::new(5.0, 0.0), DVec2::new(0.0, 1.5), DVec2::new(f64::NAN, 0.0)];
        assert_eq!(min_source_distance(DVec2::ZERO, &sources), Some(1.5));
        // Order does not matter
        let sources = [DVec2::new(0.0, 1.5), DVec2::new(5.0, 0.0)];
        assert_eq!(min_source_distance(DVec2::ZERO, &sources), Some(1.5));
    }

    #[test]
    fn test_reconcile_policy() {
        assert_eq!(reconcile(SeparationMethod::Both, Some(23.0), Some(23.0)), Some(23.0));
        assert_eq!(reconcile(SeparationMethod::Both, Some(22.0), Some(23.5)), Some(23.5));
        assert_eq!(reconcile(SeparationMethod::Both, Some(22.0), None), None);
        assert_eq!(reconcile(SeparationMethod::Area, Some(22.0), Some(23.5)), Some(22.0));
        assert_eq!(reconcile(SeparationMethod::Counting, Some(22.0), Some(23.5)), Some(23.5));
    }

    #[test]
    fn test_decide() {
        let co = decide(SeparationMethod::Both, Some(1.5), Some(23.0), Some(24.0), 20.0);
        assert_eq!(co, Separation::CoLocated { magnitude: 20.0 });
        assert!(co.is_co_located());

        let boundary = decide(SeparationMethod::Both, Some(2.0), Some(23.0), Some(24.0), 20.0);
        assert!(boundary.is_co_located());

        let both = decide(SeparationMethod::Both, Some(5.0), Some(23.0), Some(24.0), 20.0);
        assert_eq!(both.magnitude(), Some(24.0));

        // No sources: area regardless of request
        let alone = decide(SeparationMethod::Counting, None, Some(23.0), Some(26.0), 20.0);
        assert_eq!(alone, Separation::Contour { magnitude: 23.0 });

        let none = decide(SeparationMethod::Area, Some(5.0), None, Some(24.0), 20.0);
        assert_eq!(none, Separation::Undetermined);
        assert_eq!(none.magnitude(), None);
    }
}

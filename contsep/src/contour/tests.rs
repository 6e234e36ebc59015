use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

fn ring(center: DVec2, radius: f64, n: usize) -> Polygon {
    let mut pts: Vec<DVec2> = (0..n)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / n as f64;
            center + DVec2::new(a.cos(), a.sin()) * radius
        })
        .collect();
    pts.push(pts[0]);
    Polygon::new(pts)
}

fn ladder3() -> MagnitudeLadder {
    MagnitudeLadder::new(20.0, 21.0, 3).unwrap()
}

#[test]
fn test_from_ladder_assigns_keys_in_order() {
    let map = ContourMap::from_ladder(&ladder3(), vec![vec![], vec![], vec![]]);
    assert_eq!(map.len(), 3);
    let keys: Vec<_> = map.levels().iter().map(|l| l.key).collect();
    assert_eq!(keys, vec![LevelKey(0), LevelKey(1), LevelKey(2)]);
    assert_eq!(map.level(1).unwrap().magnitude, 20.5);
    assert_eq!(map.get(LevelKey(2)).unwrap().magnitude, 21.0);
    assert!(map.get(LevelKey(3)).is_none());
}

#[test]
#[should_panic(expected = "one polygon list per ladder level")]
fn test_from_ladder_length_mismatch_panics() {
    ContourMap::from_ladder(&ladder3(), vec![vec![]]);
}

#[test]
fn test_cleaning_drops_each_degenerate_kind() {
    let good = ring(DVec2::ZERO, 3.0, 16);
    let tiny = ring(DVec2::new(10.0, 0.0), 0.5, 16);
    let triangle = Polygon::from_xy(&[(0.0, 0.0), (9.0, 0.0), (0.0, 9.0), (0.0, 0.0)]);
    let mut nan = ring(DVec2::new(-10.0, 0.0), 3.0, 16);
    nan = nan.map(|v| if v.x < -12.0 { DVec2::new(f64::NAN, v.y) } else { v });

    let map = ContourMap::from_ladder(
        &ladder3(),
        vec![
            vec![tiny.clone(), good.clone(), triangle.clone()],
            vec![nan, good.clone()],
            vec![tiny],
        ],
    );
    let cleaned = map.cleaned();

    assert_eq!(cleaned.len(), 3);
    assert_eq!(cleaned.level(0).unwrap().polygons, vec![good.clone()]);
    assert_eq!(cleaned.level(1).unwrap().polygons, vec![good]);
    assert!(cleaned.level(2).unwrap().polygons.is_empty());
    assert_eq!(cleaned.level(2).unwrap().key, LevelKey(2));
}

#[test]
fn test_cleaning_preserves_relative_order() {
    let a = ring(DVec2::new(0.0, 0.0), 2.0, 12);
    let b = ring(DVec2::new(10.0, 0.0), 2.0, 12);
    let noise = ring(DVec2::new(5.0, 5.0), 0.2, 12);
    let c = ring(DVec2::new(20.0, 0.0), 2.0, 12);
    let map = ContourMap::from_ladder(
        &MagnitudeLadder::new(20.0, 21.0, 2).unwrap(),
        vec![vec![a.clone(), noise, b.clone(), c.clone()], vec![]],
    );
    assert_eq!(map.cleaned().level(0).unwrap().polygons, vec![a, b, c]);
}

#[test]
fn test_cleaned_never_contains_degenerate_polygons() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let ladder = MagnitudeLadder::new(20.0, 26.0, 13).unwrap();

    for _ in 0..20 {
        let polygons: Vec<Vec<Polygon>> = (0..ladder.len())
            .map(|_| {
                (0..rng.random_range(0..8))
                    .map(|_| {
                        let n = rng.random_range(1..12);
                        let mut pts: Vec<DVec2> = (0..n)
                            .map(|_| {
                                DVec2::new(
                                    rng.random_range(-10.0..10.0),
                                    rng.random_range(-10.0..10.0),
                                )
                            })
                            .collect();
                        if rng.random_bool(0.2) {
                            let k = rng.random_range(0..n);
                            pts[k].y = f64::NAN;
                        }
                        Polygon::new(pts)
                    })
                    .collect()
            })
            .collect();

        let cleaned = ContourMap::from_ladder(&ladder, polygons).cleaned();
        assert_eq!(cleaned.len(), ladder.len());
        for level in cleaned.levels() {
            for p in &level.polygons {
                assert!(p.vertex_count() >= Polygon::MIN_VERTICES);
                assert!(p.is_finite());
                assert!(p.area() > Polygon::MIN_AREA);
            }
        }
    }
}

#[test]
fn test_map_points_and_lookup() {
    let p = ring(DVec2::ZERO, 3.0, 8);
    let map = ContourMap::from_ladder(&ladder3(), vec![vec![p], vec![], vec![]]);
    let shifted = map.map_points(|v| v * 2.0 + DVec2::new(1.0, 0.0));
    let q = shifted.polygon(0, 0).unwrap();
    assert!(q.contains(DVec2::new(1.0, 0.0)));
    assert!((q.area() - map.polygon(0, 0).unwrap().area() * 4.0).abs() < 1e-9);
    assert!(shifted.polygon(1, 0).is_none());
    assert_eq!(shifted.polygon_count(), 1);
}

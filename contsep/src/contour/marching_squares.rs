//! Iso-flux contour tracing by marching squares.
//!
//! The image is padded with a one-pixel border below every level, so each
//! traced iso-line is a closed ring. Rings repeat their first vertex at the end.

use glam::DVec2;
use hashbrown::HashMap;

use crate::geometry::Polygon;
use crate::image::FluxImage;

/// Crossing edge id in the padded grid.
/// Horizontal edge `(x, y)-(x+1, y)` is `2 * (y * w + x)`;
/// vertical `(x, y)-(x, y+1)` is that plus one.
type EdgeId = usize;

struct PaddedGrid<'a> {
    image: &'a FluxImage,
    width: usize,
    height: usize,
    floor: f32,
}

impl<'a> PaddedGrid<'a> {
    fn new(image: &'a FluxImage, level: f32) -> Self {
        let floor = match image.finite_range() {
            Some((lo, _)) => lo.min(level) - 1.0,
            None => level - 1.0,
        };
        Self {
            image,
            width: image.width() + 2,
            height: image.height() + 2,
            floor,
        }
    }

    #[inline]
    fn value(&self, x: usize, y: usize) -> f32 {
        if x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1 {
            self.floor
        } else {
            self.image.get(x - 1, y - 1)
        }
    }

    #[inline]
    fn horizontal(&self, x: usize, y: usize) -> EdgeId {
        2 * (y * self.width + x)
    }

    #[inline]
    fn vertical(&self, x: usize, y: usize) -> EdgeId {
        2 * (y * self.width + x) + 1
    }

    /// Interpolated crossing on an edge, in unpadded pixel coordinates.
    fn crossing(&self, edge: EdgeId, level: f32) -> DVec2 {
        let cell = edge / 2;
        let x = cell % self.width;
        let y = cell / self.width;
        let (x1, y1) = if edge % 2 == 0 { (x + 1, y) } else { (x, y + 1) };

        let a = self.value(x, y) as f64;
        let b = self.value(x1, y1) as f64;
        // NaN pixels propagate into the vertex; cleaning drops such rings
        let t = (level as f64 - a) / (b - a);

        let p0 = DVec2::new(x as f64, y as f64);
        let p1 = DVec2::new(x1 as f64, y1 as f64);
        p0 + (p1 - p0) * t - DVec2::ONE
    }
}

/// Trace every closed iso-line of `image` at `level`.
///
/// Pixels at or above `level` are inside; NaN pixels count as outside.
/// Saddle cells are resolved by the mean of their four corners.
pub fn trace_contours(image: &FluxImage, level: f32) -> Vec<Polygon> {
    if image.width() == 0 || image.height() == 0 || level.is_nan() {
        return Vec::new();
    }

    let grid = PaddedGrid::new(image, level);
    let segments = cell_segments(&grid, level);
    link_segments(&grid, &segments, level)
}

fn cell_segments(grid: &PaddedGrid<'_>, level: f32) -> Vec<[EdgeId; 2]> {
    let mut segments = Vec::new();

    for cy in 0..grid.height - 1 {
        for cx in 0..grid.width - 1 {
            let tl = grid.value(cx, cy);
            let tr = grid.value(cx + 1, cy);
            let br = grid.value(cx + 1, cy + 1);
            let bl = grid.value(cx, cy + 1);

            let case = ((tl >= level) as u8) << 3
                | ((tr >= level) as u8) << 2
                | ((br >= level) as u8) << 1
                | (bl >= level) as u8;
            if case == 0 || case == 15 {
                continue;
            }

            let top = grid.horizontal(cx, cy);
            let bottom = grid.horizontal(cx, cy + 1);
            let left = grid.vertical(cx, cy);
            let right = grid.vertical(cx + 1, cy);
            let center_inside = (tl + tr + br + bl) / 4.0 >= level;

            match case {
                1 | 14 => segments.push([left, bottom]),
                2 | 13 => segments.push([bottom, right]),
                3 | 12 => segments.push([left, right]),
                4 | 11 => segments.push([top, right]),
                6 | 9 => segments.push([top, bottom]),
                7 | 8 => segments.push([top, left]),
                5 => {
                    if center_inside {
                        segments.push([top, left]);
                        segments.push([bottom, right]);
                    } else {
                        segments.push([top, right]);
                        segments.push([left, bottom]);
                    }
                }
                10 => {
                    if center_inside {
                        segments.push([top, right]);
                        segments.push([left, bottom]);
                    } else {
                        segments.push([top, left]);
                        segments.push([bottom, right]);
                    }
                }
                _ => unreachable!("marching squares case {} out of range", case),
            }
        }
    }

    segments
}

fn link_segments(grid: &PaddedGrid<'_>, segments: &[[EdgeId; 2]], level: f32) -> Vec<Polygon> {
    let mut by_edge: HashMap<EdgeId, Vec<usize>> = HashMap::with_capacity(segments.len() * 2);
    for (i, seg) in segments.iter().enumerate() {
        by_edge.entry(seg[0]).or_default().push(i);
        by_edge.entry(seg[1]).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut polygons = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let first_edge = segments[start][0];
        let mut ring = vec![grid.crossing(first_edge, level)];
        let mut current = start;
        let mut edge = segments[start][1];

        while edge != first_edge {
            ring.push(grid.crossing(edge, level));
            let next = by_edge
                .get(&edge)
                .and_then(|segs| segs.iter().copied().find(|&s| s != current && !used[s]));
            let Some(next) = next else {
                // Open chain; cannot happen on a padded grid
                break;
            };
            used[next] = true;
            let seg = segments[next];
            edge = if seg[0] == edge { seg[1] } else { seg[0] };
            current = next;
        }

        ring.push(ring[0]);
        polygons.push(Polygon::new(ring));
    }

    polygons
}

//! Land mask rasterization of a boundary onto a lattice.
//!
//! Each polygon is rasterized independently and the results are OR-combined, so the
//! mask does not depend on polygon order and adding a polygon never removes land.
//!
//! The filtered path skips polygons whose (margin-expanded) extent misses the lattice
//! region and rasterizes the rest only inside their own index window, one scanline per
//! lattice column. It shares [`edge_crossing_x`] with [`Polygon::contains`], so it
//! produces exactly the mask of the brute-force path that tests every lattice point
//! against every polygon.
use glam::DVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::events::{EventSink, FieldEvent, FieldEventKind};
use crate::geometry::{edge_crossing_x, ring_edges, Boundary, Polygon};
use crate::lattice::Lattice;
use crate::raster::{Mask, Raster};

/// Options for [`mask_with`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct MaskOptions {
    /// Skip polygons outside the region and limit work to each polygon's window.
    pub prefilter: bool,
    /// Margin added to polygon extents before the region test. `None` uses one
    /// lattice step on each axis.
    pub margin: Option<DVec2>,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            prefilter: true,
            margin: None,
        }
    }
}

impl MaskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefilter(mut self, prefilter: bool) -> Self {
        self.prefilter = prefilter;
        self
    }

    pub fn with_margin(mut self, margin: DVec2) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(m) = self.margin {
            if !(m.is_finite() && m.x >= 0.0 && m.y >= 0.0) {
                return Err(Error::InvalidConfig(
                    "mask margin must be finite and >= 0".into(),
                ));
            }
        }
        Ok(())
    }

    fn effective_margin(&self, lattice: &Lattice) -> DVec2 {
        self.margin.unwrap_or_else(|| lattice.step())
    }
}

/// Summary of a masking pass.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaskReport {
    pub polygons_total: usize,
    pub polygons_skipped: usize,
    pub land_cells: usize,
}

/// Rasterizes `boundary` with default options.
pub fn mask(lattice: &Lattice, boundary: &Boundary) -> Result<Mask> {
    mask_with(lattice, boundary, &MaskOptions::default(), &mut ()).map(|(m, _)| m)
}

/// Rasterizes `boundary` onto `lattice`.
///
/// Fails with [`Error::EmptyBoundary`] when the boundary holds no polygons.
pub fn mask_with(
    lattice: &Lattice,
    boundary: &Boundary,
    opts: &MaskOptions,
    sink: &mut dyn EventSink,
) -> Result<(Mask, MaskReport)> {
    opts.validate()?;
    let polygons = boundary.polygons();
    if polygons.is_empty() {
        return Err(Error::EmptyBoundary);
    }

    let margin = opts.effective_margin(lattice);
    let region = lattice.region();
    let selected: Vec<(usize, &Polygon)> = polygons
        .iter()
        .enumerate()
        .filter(|(index, poly)| {
            if !opts.prefilter {
                return true;
            }
            let hit = poly
                .bounds()
                .is_some_and(|b| b.expand(margin).intersects(&region));
            if !hit {
                debug!("Polygon {} lies outside the lattice region; skipped.", index);
                if sink.wants(FieldEventKind::PolygonSkipped) {
                    sink.send(FieldEvent::PolygonSkipped { index: *index });
                }
            }
            hit
        })
        .collect();
    let skipped = polygons.len() - selected.len();

    let cells_of = |poly: &Polygon| {
        if opts.prefilter {
            scanline_cells(lattice, poly)
        } else {
            brute_force_cells(lattice, poly)
        }
    };

    #[cfg(feature = "parallel")]
    let per_polygon: Vec<(usize, Vec<usize>)> = {
        use rayon::prelude::*;
        selected
            .par_iter()
            .map(|(index, poly)| (*index, cells_of(*poly)))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let per_polygon: Vec<(usize, Vec<usize>)> = selected
        .iter()
        .map(|(index, poly)| (*index, cells_of(*poly)))
        .collect();

    let mut out: Mask = Raster::filled(lattice, false);
    let data = out.as_mut_slice();
    for (index, cells) in &per_polygon {
        debug!("Polygon {} covers {} lattice cells.", index, cells.len());
        if sink.wants(FieldEventKind::PolygonRasterized) {
            sink.send(FieldEvent::PolygonRasterized {
                index: *index,
                cells: cells.len(),
            });
        }
        for &idx in cells {
            data[idx] = true;
        }
    }

    let report = MaskReport {
        polygons_total: polygons.len(),
        polygons_skipped: skipped,
        land_cells: out.count_true(),
    };
    Ok((out, report))
}

/// Mask of the lattice points inside one polygon, using the scanline rasterizer.
pub fn rasterize_polygon(lattice: &Lattice, poly: &Polygon) -> Mask {
    cells_to_mask(lattice, &scanline_cells(lattice, poly))
}

/// Same mask as [`rasterize_polygon`], testing every lattice point with
/// [`Polygon::contains`].
pub fn rasterize_polygon_brute_force(lattice: &Lattice, poly: &Polygon) -> Mask {
    cells_to_mask(lattice, &brute_force_cells(lattice, poly))
}

fn cells_to_mask(lattice: &Lattice, cells: &[usize]) -> Mask {
    let mut out: Mask = Raster::filled(lattice, false);
    let data = out.as_mut_slice();
    for &idx in cells {
        data[idx] = true;
    }
    out
}

/// Storage indices inside `poly`, visiting only its index window.
///
/// For lattice column `j` the crossings of every ring with the line `y = y(j)` are
/// collected and sorted; a lattice `x` is inside a ring when an odd number of its
/// crossings lie strictly to the right.
fn scanline_cells(lattice: &Lattice, poly: &Polygon) -> Vec<usize> {
    let mut cells = Vec::new();
    let Some(bounds) = poly.bounds() else {
        return cells;
    };
    let rows = lattice.x_index_range(bounds.min_x, bounds.max_x);
    let cols = lattice.y_index_range(bounds.min_y, bounds.max_y);

    let mut exterior = Vec::new();
    let mut holes: Vec<Vec<f64>> = vec![Vec::new(); poly.holes.len()];
    for j in cols {
        let y = lattice.y(j);
        ring_crossings(&poly.exterior, y, &mut exterior);
        if exterior.is_empty() {
            continue;
        }
        for (hole, xs) in poly.holes.iter().zip(holes.iter_mut()) {
            ring_crossings(hole, y, xs);
        }
        for i in rows.clone() {
            let x = lattice.x(i);
            if odd_to_the_right(&exterior, x) && !holes.iter().any(|xs| odd_to_the_right(xs, x)) {
                cells.push(lattice.index(i, j));
            }
        }
    }
    cells
}

fn brute_force_cells(lattice: &Lattice, poly: &Polygon) -> Vec<usize> {
    lattice
        .iter()
        .filter(|(_, _, p)| poly.contains(*p))
        .map(|(i, j, _)| lattice.index(i, j))
        .collect()
}

fn ring_crossings(ring: &[DVec2], y: f64, out: &mut Vec<f64>) {
    out.clear();
    out.extend(ring_edges(ring).filter_map(|(a, b)| edge_crossing_x(a, b, y)));
    out.sort_by(f64::total_cmp);
}

#[inline]
fn odd_to_the_right(sorted: &[f64], x: f64) -> bool {
    let right = sorted.len() - sorted.partition_point(|&c| c <= x);
    right % 2 == 1
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::events::VecSink;
    use crate::geometry::{Bounds, MultiPolygon};

    fn make_lattice() -> Lattice {
        Lattice::build(Bounds::new(0.0, 10.0, 0.0, 10.0), 10, 10).unwrap()
    }

    fn square(min: f64, max: f64) -> Polygon {
        Polygon::rect(Bounds::new(min, max, min, max))
    }

    fn rand01(rng: &mut StdRng) -> f64 {
        (rng.next_u32() as f64) / ((u32::MAX as f64) + 1.0)
    }

    /// Star-shaped random polygon around `center`.
    fn random_polygon(rng: &mut StdRng, center: DVec2, radius: f64, n: usize) -> Polygon {
        let ring = (0..n)
            .map(|k| {
                let angle = std::f64::consts::TAU * k as f64 / n as f64;
                let r = radius * (0.4 + 0.6 * rand01(rng));
                center + DVec2::new(angle.cos(), angle.sin()) * r
            })
            .collect();
        Polygon::new(ring)
    }

    fn random_boundary(seed: u64) -> MultiPolygon {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..6)
            .map(|_| {
                let c = DVec2::new(rand01(&mut rng) * 14.0 - 2.0, rand01(&mut rng) * 14.0 - 2.0);
                let radius = 1.0 + rand01(&mut rng) * 3.0;
                let poly = random_polygon(&mut rng, c, radius, 24);
                if rand01(&mut rng) < 0.5 {
                    let hole = random_polygon(&mut rng, c, 0.5, 8).exterior;
                    poly.with_hole(hole)
                } else {
                    poly
                }
            })
            .collect()
    }

    #[test]
    fn left_half_square_covers_half_the_lattice() {
        let lattice = make_lattice();
        let boundary = Boundary::from(Polygon::rect(Bounds::new(-1.0, 5.0, -1.0, 11.0)));
        for prefilter in [true, false] {
            let opts = MaskOptions::new().with_prefilter(prefilter);
            let (m, report) = mask_with(&lattice, &boundary, &opts, &mut ()).unwrap();
            assert_eq!(m.count_true(), 50, "prefilter = {prefilter}");
            assert_eq!(report.land_cells, 50);
            for (i, j, p) in lattice.iter() {
                assert_eq!(m.get(i, j), Some(&(p.x < 5.0)));
            }
        }
    }

    #[test]
    fn prefilter_matches_brute_force() {
        let lattice = Lattice::build(Bounds::new(0.0, 10.0, 0.0, 10.0), 57, 43).unwrap();
        for seed in 0..8 {
            let boundary = Boundary::from(random_boundary(seed));
            let fast = mask_with(&lattice, &boundary, &MaskOptions::new(), &mut ()).unwrap();
            let slow = mask_with(
                &lattice,
                &boundary,
                &MaskOptions::new().with_prefilter(false),
                &mut (),
            )
            .unwrap();
            assert_eq!(fast.0, slow.0, "seed {seed}");
        }
    }

    #[test]
    fn single_polygon_paths_agree() {
        let lattice = Lattice::build(Bounds::new(0.0, 10.0, 0.0, 10.0), 64, 48).unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        let poly = random_polygon(&mut rng, DVec2::new(4.0, 6.0), 5.0, 300)
            .with_hole(random_polygon(&mut rng, DVec2::new(4.0, 6.0), 1.5, 12).exterior);
        let fast = rasterize_polygon(&lattice, &poly);
        assert!(fast.count_true() > 0);
        assert_eq!(fast, rasterize_polygon_brute_force(&lattice, &poly));
    }

    #[test]
    fn polygon_order_does_not_matter() {
        let lattice = Lattice::build(Bounds::new(0.0, 10.0, 0.0, 10.0), 31, 31).unwrap();
        let forward = random_boundary(5);
        let reversed: MultiPolygon = forward.iter().rev().cloned().collect();
        let a = mask(&lattice, &forward.into()).unwrap();
        let b = mask(&lattice, &reversed.into()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn adding_polygons_never_removes_land() {
        let lattice = Lattice::build(Bounds::new(0.0, 10.0, 0.0, 10.0), 31, 31).unwrap();
        let mut boundary = MultiPolygon::default();
        let mut previous: Option<Mask> = None;
        for poly in random_boundary(17).polygons {
            boundary.push(poly);
            let current = mask(&lattice, &boundary.clone().into()).unwrap();
            if let Some(prev) = &previous {
                for (a, b) in prev.as_slice().iter().zip(current.as_slice()) {
                    assert!(!*a || *b);
                }
            }
            previous = Some(current);
        }
    }

    #[test]
    fn holes_and_islands() {
        let lattice = Lattice::build(Bounds::new(0.0, 10.0, 0.0, 10.0), 11, 11).unwrap();
        let main = square(0.5, 6.5).with_hole(square(2.5, 4.5).exterior);
        let island = square(7.5, 9.5);
        let boundary = Boundary::from(MultiPolygon::new(vec![main, island]));
        let m = mask(&lattice, &boundary).unwrap();
        assert_eq!(m.get(1, 1), Some(&true));
        assert_eq!(m.get(3, 3), Some(&false));
        assert_eq!(m.get(8, 8), Some(&true));
        assert_eq!(m.get(7, 7), Some(&false));
        // 6x6 land square minus 2x2 hole plus a 2x2 island.
        assert_eq!(m.count_true(), 36 - 4 + 4);
    }

    #[test]
    fn distant_polygons_are_skipped_with_events() {
        let lattice = make_lattice();
        let boundary = Boundary::from(MultiPolygon::new(vec![
            square(50.0, 60.0),
            square(2.5, 4.5),
        ]));
        let mut sink = VecSink::new();
        let (m, report) = mask_with(&lattice, &boundary, &MaskOptions::new(), &mut sink).unwrap();
        assert_eq!(report.polygons_total, 2);
        assert_eq!(report.polygons_skipped, 1);
        assert_eq!(m.count_true(), 4);
        let events = sink.into_inner();
        assert!(matches!(events[0], FieldEvent::PolygonSkipped { index: 0 }));
        assert!(matches!(
            events[1],
            FieldEvent::PolygonRasterized { index: 1, cells: 4 }
        ));
    }

    #[test]
    fn polygon_just_outside_region_stays_out() {
        let lattice = make_lattice();
        let sliver = Polygon::rect(Bounds::new(10.2, 10.8, 2.0, 8.0));
        let boundary = Boundary::from(sliver);
        let mut sink = VecSink::new();
        let (m, report) =
            mask_with(&lattice, &boundary, &MaskOptions::new(), &mut sink).unwrap();
        // Within one step of the region, so it is rasterized but covers nothing.
        assert_eq!(report.polygons_skipped, 0);
        assert_eq!(m.count_true(), 0);
    }

    #[test]
    fn empty_boundary_is_reported() {
        let lattice = make_lattice();
        let boundary = Boundary::from(MultiPolygon::default());
        assert!(matches!(
            mask(&lattice, &boundary),
            Err(Error::EmptyBoundary)
        ));
    }

    #[test]
    fn negative_margin_is_rejected() {
        assert!(MaskOptions::new()
            .with_margin(DVec2::new(-1.0, 0.0))
            .validate()
            .is_err());
    }
}

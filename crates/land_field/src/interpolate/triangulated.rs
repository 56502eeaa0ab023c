//! Piecewise estimators over a Delaunay triangulation of the samples.
//!
//! `Linear` blends the three vertex values barycentrically. `Cubic` builds one cubic
//! Bernstein-Bezier patch per triangle from vertex values and least-squares vertex
//! gradients. Edge control points only depend on the two edge vertices, so adjacent
//! patches agree along shared edges. Both variants reproduce vertex values exactly and
//! are undefined outside the convex hull.
use glam::DVec2;
use tracing::debug;

use super::delaunay::{orient, Triangulation};
use super::{fill_rows, InterpolationMode, ScatterEstimator};
use crate::lattice::Lattice;
use crate::raster::{Field, Raster};
use crate::sample::Sample;

const BARY_EPS: f64 = 1e-12;
const NEAR_NEIGHBOR_RATIO: f64 = 1e-4;

#[derive(Clone, Debug)]
struct Patch {
    corners: [DVec2; 3],
    det: f64,
    min: DVec2,
    max: DVec2,
    /// `[c300, c030, c003, c210, c201, c120, c021, c102, c012, c111]`. Linear patches
    /// only use the first three.
    coeffs: [f64; 10],
}

impl Patch {
    /// Barycentric weights of `p`, or `None` when `p` lies outside the triangle.
    #[inline]
    fn barycentric(&self, p: DVec2) -> Option<[f64; 3]> {
        let [a, b, c] = self.corners;
        let u = orient(p, b, c) / self.det;
        let v = orient(a, p, c) / self.det;
        let w = orient(a, b, p) / self.det;
        if u >= -BARY_EPS && v >= -BARY_EPS && w >= -BARY_EPS {
            Some([u, v, w])
        } else {
            None
        }
    }

    #[inline]
    fn linear(&self, [u, v, w]: [f64; 3]) -> f64 {
        let k = &self.coeffs;
        u * k[0] + v * k[1] + w * k[2]
    }

    #[inline]
    fn cubic(&self, [u, v, w]: [f64; 3]) -> f64 {
        let k = &self.coeffs;
        k[0] * u * u * u
            + k[1] * v * v * v
            + k[2] * w * w * w
            + 3.0 * k[3] * u * u * v
            + 3.0 * k[4] * u * u * w
            + 3.0 * k[5] * u * v * v
            + 3.0 * k[6] * v * v * w
            + 3.0 * k[7] * u * w * w
            + 3.0 * k[8] * v * w * w
            + 6.0 * k[9] * u * v * w
    }
}

/// Linear or cubic triangulation-based estimator.
#[derive(Clone, Debug)]
pub struct TriangulatedEstimator {
    mode: InterpolationMode,
    triangles: usize,
    patches: Vec<Patch>,
}

impl TriangulatedEstimator {
    /// Triangulates `samples` and prepares one patch per usable triangle.
    ///
    /// `InterpolationMode::Nearest` is treated as `Linear` here. Triangles whose longest
    /// edge exceeds `max_edge_length` get no patch and stay undefined.
    pub fn new(samples: &[Sample], mode: InterpolationMode, max_edge_length: Option<f64>) -> Self {
        let mode = match mode {
            InterpolationMode::Cubic => InterpolationMode::Cubic,
            _ => InterpolationMode::Linear,
        };
        let points: Vec<DVec2> = samples.iter().map(Sample::position).collect();
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let tri = Triangulation::build(&points);

        let gradients = if mode == InterpolationMode::Cubic {
            vertex_gradients(&tri, &values)
        } else {
            Vec::new()
        };

        let mut patches = Vec::with_capacity(tri.len());
        for (t, &[ia, ib, ic]) in tri.triangles().iter().enumerate() {
            let corners = tri.corners(t);
            if let Some(limit) = max_edge_length {
                if longest_edge(&corners) > limit {
                    continue;
                }
            }
            let [a, b, c] = corners;
            let f = [values[ia], values[ib], values[ic]];
            let coeffs = if mode == InterpolationMode::Cubic {
                cubic_coeffs(corners, f, [gradients[ia], gradients[ib], gradients[ic]])
            } else {
                [f[0], f[1], f[2], 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
            };
            patches.push(Patch {
                corners,
                det: orient(a, b, c),
                min: a.min(b).min(c),
                max: a.max(b).max(c),
                coeffs,
            });
        }
        debug!(
            "Prepared {} of {} triangles for {:?} estimation.",
            patches.len(),
            tri.len(),
            mode
        );

        Self {
            mode,
            triangles: tri.len(),
            patches,
        }
    }

    pub fn mode(&self) -> InterpolationMode {
        self.mode
    }

    /// Triangles in the underlying triangulation, including any excluded by edge length.
    pub fn triangle_count(&self) -> usize {
        self.triangles
    }

    /// Triangles that carry a patch.
    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    #[inline]
    fn evaluate(&self, patch: &Patch, bary: [f64; 3]) -> Option<f64> {
        let v = match self.mode {
            InterpolationMode::Cubic => patch.cubic(bary),
            _ => patch.linear(bary),
        };
        v.is_finite().then_some(v)
    }
}

impl ScatterEstimator for TriangulatedEstimator {
    fn estimate(&self, p: DVec2) -> Option<f64> {
        self.patches
            .iter()
            .find_map(|patch| patch.barycentric(p).map(|bary| (patch, bary)))
            .and_then(|(patch, bary)| self.evaluate(patch, bary))
    }

    /// Rasterizes each patch over its own index window. A point belongs to the first
    /// triangle, in triangulation order, that contains it.
    fn estimate_lattice(&self, lattice: &Lattice) -> Field {
        let mut field: Field = Raster::filled(lattice, None);
        if self.patches.is_empty() {
            return field;
        }

        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); lattice.rows()];
        let mut windows = Vec::with_capacity(self.patches.len());
        for (t, patch) in self.patches.iter().enumerate() {
            for i in lattice.x_index_range(patch.min.x, patch.max.x) {
                buckets[i].push(t);
            }
            windows.push(lattice.y_index_range(patch.min.y, patch.max.y));
        }

        let cols = lattice.cols();
        fill_rows(&mut field, |i, row| {
            let x = lattice.x(i);
            let mut claimed = vec![false; cols];
            for &t in &buckets[i] {
                let patch = &self.patches[t];
                for j in windows[t].clone() {
                    if claimed[j] {
                        continue;
                    }
                    if let Some(bary) = patch.barycentric(DVec2::new(x, lattice.y(j))) {
                        claimed[j] = true;
                        row[j] = self.evaluate(patch, bary);
                    }
                }
            }
        });
        field
    }
}

fn longest_edge([a, b, c]: &[DVec2; 3]) -> f64 {
    a.distance(*b).max(b.distance(*c)).max(c.distance(*a))
}

/// Least-squares gradient per vertex from the value differences to its neighbours.
///
/// Neighbours closer than `NEAR_NEIGHBOR_RATIO` times the farthest one are ignored.
/// Vertices whose remaining neighbourhood does not span the plane get a zero gradient.
fn vertex_gradients(tri: &Triangulation, values: &[f64]) -> Vec<DVec2> {
    let points = tri.points();
    tri.neighbors()
        .iter()
        .enumerate()
        .map(|(k, neigh)| {
            let reach = neigh
                .iter()
                .map(|&n| points[n].distance(points[k]))
                .fold(0.0, f64::max);
            let near = reach * NEAR_NEIGHBOR_RATIO;
            let (mut sxx, mut sxy, mut syy, mut sxf, mut syf) = (0.0, 0.0, 0.0, 0.0, 0.0);
            for &n in neigh {
                let d = points[n] - points[k];
                if d.length() < near {
                    continue;
                }
                let df = values[n] - values[k];
                sxx += d.x * d.x;
                sxy += d.x * d.y;
                syy += d.y * d.y;
                sxf += d.x * df;
                syf += d.y * df;
            }
            let det = sxx * syy - sxy * sxy;
            if !det.is_finite() || det.abs() <= 1e-12 * sxx * syy {
                return DVec2::ZERO;
            }
            let g = DVec2::new(syy * sxf - sxy * syf, sxx * syf - sxy * sxf) / det;
            if g.is_finite() {
                g
            } else {
                DVec2::ZERO
            }
        })
        .collect()
}

fn cubic_coeffs(p: [DVec2; 3], f: [f64; 3], g: [DVec2; 3]) -> [f64; 10] {
    let edge = |a: usize, b: usize| f[a] + g[a].dot(p[b] - p[a]) / 3.0;
    let c210 = edge(0, 1);
    let c201 = edge(0, 2);
    let c120 = edge(1, 0);
    let c021 = edge(1, 2);
    let c102 = edge(2, 0);
    let c012 = edge(2, 1);
    // Centre point chosen for quadratic precision.
    let c111 = (c210 + c201 + c120 + c021 + c102 + c012) / 4.0 - (f[0] + f[1] + f[2]) / 6.0;
    [f[0], f[1], f[2], c210, c201, c120, c021, c102, c012, c111]
}

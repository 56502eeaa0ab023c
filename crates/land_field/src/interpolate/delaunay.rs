//! Delaunay triangulation of sample positions.
//!
//! Bowyer-Watson incremental insertion inside a super-triangle. Coordinates are shifted
//! to the centroid of the input extent before the in-circle tests. Triangles are stored
//! counter-clockwise and in a deterministic order for a given input.
use glam::DVec2;

use crate::geometry::Bounds;

/// Counter-clockwise triangles over a set of points.
#[derive(Clone, Debug, Default)]
pub struct Triangulation {
    points: Vec<DVec2>,
    triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    /// Triangulates `points`.
    ///
    /// Fewer than three points, coincident points or collinear points produce an empty
    /// triangulation rather than an error.
    pub fn build(points: &[DVec2]) -> Self {
        let n = points.len();
        let empty = Self {
            points: points.to_vec(),
            triangles: Vec::new(),
        };
        if n < 3 {
            return empty;
        }
        let Some(bounds) = Bounds::from_points(points) else {
            return empty;
        };
        let span = bounds.width().max(bounds.height());
        if !(span.is_finite() && span > 0.0) {
            return empty;
        }

        let center = (bounds.min() + bounds.max()) * 0.5;
        let delta = span * 20.0;
        let mut verts: Vec<DVec2> = points.iter().map(|p| *p - center).collect();
        verts.push(DVec2::new(-delta, -delta));
        verts.push(DVec2::new(delta, -delta));
        verts.push(DVec2::new(0.0, delta));

        let mut triangles: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];
        let mut edges: Vec<(usize, usize)> = Vec::new();

        for i in 0..n {
            let p = verts[i];
            edges.clear();

            // Remove triangles whose circumcircle contains p, remembering their edges.
            triangles.retain(|t| {
                if in_circumcircle(verts[t[0]], verts[t[1]], verts[t[2]], p) {
                    for k in 0..3 {
                        edges.push(normalize_edge(t[k], t[(k + 1) % 3]));
                    }
                    false
                } else {
                    true
                }
            });

            // Edges used by exactly one removed triangle bound the cavity.
            edges.sort_unstable();
            let mut k = 0;
            while k < edges.len() {
                let e = edges[k];
                let mut m = k + 1;
                while m < edges.len() && edges[m] == e {
                    m += 1;
                }
                if m - k == 1 {
                    triangles.push(counter_clockwise(&verts, [e.0, e.1, i]));
                }
                k = m;
            }
        }

        let area_eps = span * span * 1e-14;
        triangles.retain(|t| {
            t.iter().all(|&v| v < n) && orient(verts[t[0]], verts[t[1]], verts[t[2]]) > area_eps
        });

        Self {
            points: points.to_vec(),
            triangles,
        }
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Vertex positions of triangle `t`.
    pub fn corners(&self, t: usize) -> [DVec2; 3] {
        let [a, b, c] = self.triangles[t];
        [self.points[a], self.points[b], self.points[c]]
    }

    /// Sorted, deduplicated neighbour lists per vertex.
    pub fn neighbors(&self) -> Vec<Vec<usize>> {
        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); self.points.len()];
        for t in &self.triangles {
            for k in 0..3 {
                let a = t[k];
                let b = t[(k + 1) % 3];
                adj[a].push(b);
                adj[b].push(a);
            }
        }
        for list in &mut adj {
            list.sort_unstable();
            list.dedup();
        }
        adj
    }
}

/// Twice the signed area of `abc`; positive when counter-clockwise.
#[inline]
pub(crate) fn orient(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// In-circle predicate for a counter-clockwise triangle; points on the circle are outside.
#[inline]
fn in_circumcircle(a: DVec2, b: DVec2, c: DVec2, p: DVec2) -> bool {
    let a = a - p;
    let b = b - p;
    let c = c - p;
    let det = a.length_squared() * b.perp_dot(c) - b.length_squared() * a.perp_dot(c)
        + c.length_squared() * a.perp_dot(b);
    det > 0.0
}

#[inline]
fn normalize_edge(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[inline]
fn counter_clockwise(verts: &[DVec2], t: [usize; 3]) -> [usize; 3] {
    if orient(verts[t[0]], verts[t[1]], verts[t[2]]) < 0.0 {
        [t[0], t[2], t[1]]
    } else {
        t
    }
}

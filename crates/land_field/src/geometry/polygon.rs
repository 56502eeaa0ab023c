//! Polygon, multi-polygon and boundary types with even-odd containment.
use glam::DVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::bounds::Bounds;

/// X coordinate where the edge `a -> b` crosses the horizontal line at `y`.
///
/// Returns `None` when the edge does not straddle `y`. An edge straddles when exactly
/// one endpoint lies strictly above the line, so horizontal and degenerate edges never
/// cross. Every containment test in the crate goes through this helper, which keeps the
/// scanline rasterizer and the per-point test in exact agreement.
#[inline]
pub fn edge_crossing_x(a: DVec2, b: DVec2, y: f64) -> Option<f64> {
    if (a.y > y) != (b.y > y) {
        Some((b.x - a.x) * (y - a.y) / (b.y - a.y) + a.x)
    } else {
        None
    }
}

/// Iterates the edges of a ring, including the implicit closing edge.
#[inline]
pub fn ring_edges(ring: &[DVec2]) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
    let n = ring.len();
    (0..n).map(move |i| {
        let j = if i == 0 { n - 1 } else { i - 1 };
        (ring[j], ring[i])
    })
}

/// Even-odd ray casting: `p` is inside when a ray towards +x crosses the ring an odd
/// number of times.
pub fn point_in_ring(p: DVec2, ring: &[DVec2]) -> bool {
    let mut inside = false;
    for (a, b) in ring_edges(ring) {
        if let Some(x) = edge_crossing_x(a, b, p.y) {
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// A simple polygon with an exterior ring and optional hole rings.
///
/// Rings may or may not repeat their first vertex at the end.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    pub exterior: Vec<DVec2>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub holes: Vec<Vec<DVec2>>,
}

impl Polygon {
    pub fn new(exterior: Vec<DVec2>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    /// Adds an exclusion ring.
    pub fn with_hole(mut self, hole: Vec<DVec2>) -> Self {
        self.holes.push(hole);
        self
    }

    /// Axis-aligned rectangle as a polygon, counter-clockwise.
    pub fn rect(bounds: Bounds) -> Self {
        Self::new(vec![
            DVec2::new(bounds.min_x, bounds.min_y),
            DVec2::new(bounds.max_x, bounds.min_y),
            DVec2::new(bounds.max_x, bounds.max_y),
            DVec2::new(bounds.min_x, bounds.max_y),
        ])
    }

    /// Extent of the exterior ring. `None` when the ring is empty.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.exterior)
    }

    /// Total number of vertices over all rings.
    pub fn vertex_count(&self) -> usize {
        self.exterior.len() + self.holes.iter().map(Vec::len).sum::<usize>()
    }

    /// Inside the exterior ring and outside every hole.
    pub fn contains(&self, p: DVec2) -> bool {
        point_in_ring(p, &self.exterior) && !self.holes.iter().any(|h| point_in_ring(p, h))
    }
}

/// A set of polygons, typically a main landmass plus outlying islands.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiPolygon {
    pub polygons: Vec<Polygon>,
}

impl MultiPolygon {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    pub fn push(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polygon> {
        self.polygons.iter()
    }

    /// Union of all polygon extents.
    pub fn bounds(&self) -> Option<Bounds> {
        self.polygons
            .iter()
            .filter_map(Polygon::bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// Inside any member polygon.
    pub fn contains(&self, p: DVec2) -> bool {
        self.polygons.iter().any(|poly| poly.contains(p))
    }
}

impl FromIterator<Polygon> for MultiPolygon {
    fn from_iter<T: IntoIterator<Item = Polygon>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A landmass boundary as supplied by the geographic data collaborator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum Boundary {
    Polygon(Polygon),
    MultiPolygon(MultiPolygon),
}

impl Boundary {
    /// Decomposes the boundary into its member polygons.
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Boundary::Polygon(p) => std::slice::from_ref(p),
            Boundary::MultiPolygon(mp) => &mp.polygons,
        }
    }

    pub fn into_multi_polygon(self) -> MultiPolygon {
        match self {
            Boundary::Polygon(p) => MultiPolygon::new(vec![p]),
            Boundary::MultiPolygon(mp) => mp,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons().is_empty()
    }
}

impl From<Polygon> for Boundary {
    fn from(value: Polygon) -> Self {
        Boundary::Polygon(value)
    }
}

impl From<MultiPolygon> for Boundary {
    fn from(value: MultiPolygon) -> Self {
        Boundary::MultiPolygon(value)
    }
}

#[cfg(feature = "geo")]
mod geo_interop {
    use super::*;

    fn ring_from(line: &geo::LineString<f64>) -> Vec<DVec2> {
        line.coords().map(|c| DVec2::new(c.x, c.y)).collect()
    }

    impl From<&geo::Polygon<f64>> for Polygon {
        fn from(value: &geo::Polygon<f64>) -> Self {
            Polygon {
                exterior: ring_from(value.exterior()),
                holes: value.interiors().iter().map(ring_from).collect(),
            }
        }
    }

    impl From<geo::Polygon<f64>> for Polygon {
        fn from(value: geo::Polygon<f64>) -> Self {
            Polygon::from(&value)
        }
    }

    impl From<&geo::MultiPolygon<f64>> for MultiPolygon {
        fn from(value: &geo::MultiPolygon<f64>) -> Self {
            value.0.iter().map(Polygon::from).collect()
        }
    }

    impl From<geo::MultiPolygon<f64>> for MultiPolygon {
        fn from(value: geo::MultiPolygon<f64>) -> Self {
            MultiPolygon::from(&value)
        }
    }

    impl From<geo::Polygon<f64>> for Boundary {
        fn from(value: geo::Polygon<f64>) -> Self {
            Boundary::Polygon(value.into())
        }
    }

    impl From<geo::MultiPolygon<f64>> for Boundary {
        fn from(value: geo::MultiPolygon<f64>) -> Self {
            Boundary::MultiPolygon(value.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(min, min),
            DVec2::new(max, min),
            DVec2::new(max, max),
            DVec2::new(min, max),
        ]
    }

    #[test]
    fn edge_crossing_ignores_horizontal_edges() {
        let a = DVec2::new(0.0, 1.0);
        let b = DVec2::new(5.0, 1.0);
        assert_eq!(edge_crossing_x(a, b, 1.0), None);
        assert_eq!(
            edge_crossing_x(DVec2::new(0.0, 0.0), DVec2::new(2.0, 2.0), 1.0),
            Some(1.0)
        );
    }

    #[test]
    fn point_in_ring_for_square() {
        let ring = square(0.0, 4.0);
        assert!(point_in_ring(DVec2::new(2.0, 2.0), &ring));
        assert!(!point_in_ring(DVec2::new(5.0, 2.0), &ring));
        assert!(!point_in_ring(DVec2::new(-1.0, 2.0), &ring));
    }

    #[test]
    fn closed_and_open_rings_agree() {
        let open = square(0.0, 4.0);
        let mut closed = open.clone();
        closed.push(open[0]);
        for &(x, y) in &[(1.0, 1.0), (3.9, 0.1), (4.5, 2.0), (0.0, 2.0), (2.0, 4.0)] {
            let p = DVec2::new(x, y);
            assert_eq!(point_in_ring(p, &open), point_in_ring(p, &closed));
        }
    }

    #[test]
    fn concave_ring_excludes_notch() {
        // U-shape open towards +y.
        let ring = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(3.0, 0.0),
            DVec2::new(3.0, 3.0),
            DVec2::new(2.0, 3.0),
            DVec2::new(2.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, 3.0),
            DVec2::new(0.0, 3.0),
        ];
        assert!(point_in_ring(DVec2::new(0.5, 2.0), &ring));
        assert!(!point_in_ring(DVec2::new(1.5, 2.0), &ring));
        assert!(point_in_ring(DVec2::new(2.5, 2.0), &ring));
        assert!(point_in_ring(DVec2::new(1.5, 0.5), &ring));
    }

    #[test]
    fn polygon_hole_is_excluded() {
        let poly = Polygon::new(square(0.0, 10.0)).with_hole(square(4.0, 6.0));
        assert!(poly.contains(DVec2::new(1.0, 1.0)));
        assert!(!poly.contains(DVec2::new(5.0, 5.0)));
        assert!(!poly.contains(DVec2::new(11.0, 5.0)));
        assert_eq!(poly.vertex_count(), 8);
    }

    #[test]
    fn multi_polygon_contains_any_member() {
        let mp: MultiPolygon = vec![
            Polygon::new(square(0.0, 1.0)),
            Polygon::new(square(5.0, 6.0)),
        ]
        .into_iter()
        .collect();
        assert!(mp.contains(DVec2::new(0.5, 0.5)));
        assert!(mp.contains(DVec2::new(5.5, 5.5)));
        assert!(!mp.contains(DVec2::new(3.0, 3.0)));
        assert_eq!(mp.bounds(), Some(Bounds::new(0.0, 6.0, 0.0, 6.0)));
    }

    #[test]
    fn boundary_decomposes_into_polygons() {
        let single = Boundary::from(Polygon::new(square(0.0, 1.0)));
        assert_eq!(single.polygons().len(), 1);

        let multi = Boundary::from(MultiPolygon::new(vec![
            Polygon::new(square(0.0, 1.0)),
            Polygon::new(square(2.0, 3.0)),
        ]));
        assert_eq!(multi.polygons().len(), 2);
        assert_eq!(multi.clone().into_multi_polygon().len(), 2);

        assert!(Boundary::from(MultiPolygon::default()).is_empty());
    }
}

//! Geometry utilities: bounding boxes, polygon containment and boundary decomposition.
//!
//! Coordinates are `(x, y) = (longitude, latitude)` in degrees, stored as [`glam::DVec2`].
pub mod bounds;
pub mod polygon;

pub use bounds::Bounds;
pub use polygon::{edge_crossing_x, point_in_ring, ring_edges, Boundary, MultiPolygon, Polygon};

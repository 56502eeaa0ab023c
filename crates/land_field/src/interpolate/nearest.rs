//! Nearest-sample estimator used by the fallback pass.
use glam::DVec2;

use super::ScatterEstimator;
use crate::sample::Sample;

/// Returns the value of the closest sample by Euclidean distance in lon/lat.
///
/// Equidistant samples resolve to the one that appears first in the input.
#[derive(Clone, Debug, Default)]
pub struct NearestEstimator {
    points: Vec<DVec2>,
    values: Vec<f64>,
}

impl NearestEstimator {
    pub fn new(samples: &[Sample]) -> Self {
        Self {
            points: samples.iter().map(Sample::position).collect(),
            values: samples.iter().map(|s| s.value).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the closest sample, or `None` without samples.
    pub fn nearest_index(&self, p: DVec2) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (k, q) in self.points.iter().enumerate() {
            let d = q.distance_squared(p);
            match best {
                Some((_, bd)) if d >= bd => {}
                _ => best = Some((k, d)),
            }
        }
        best.map(|(k, _)| k)
    }
}

impl ScatterEstimator for NearestEstimator {
    fn estimate(&self, p: DVec2) -> Option<f64> {
        self.nearest_index(p).map(|k| self.values[k])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::lattice::Lattice;

    #[test]
    fn picks_closest_sample() {
        let est = NearestEstimator::new(&[
            Sample::new(0.0, 0.0, 1.0),
            Sample::new(10.0, 0.0, 2.0),
            Sample::new(0.0, 10.0, 3.0),
        ]);
        assert_eq!(est.estimate(DVec2::new(1.0, 1.0)), Some(1.0));
        assert_eq!(est.estimate(DVec2::new(9.0, 1.0)), Some(2.0));
        assert_eq!(est.estimate(DVec2::new(0.5, 8.0)), Some(3.0));
    }

    #[test]
    fn ties_keep_first_sample() {
        let est = NearestEstimator::new(&[
            Sample::new(-1.0, 0.0, 7.0),
            Sample::new(1.0, 0.0, 8.0),
        ]);
        assert_eq!(est.nearest_index(DVec2::ZERO), Some(0));
        assert_eq!(est.estimate(DVec2::ZERO), Some(7.0));
    }

    #[test]
    fn empty_estimator_returns_none() {
        let est = NearestEstimator::new(&[]);
        assert!(est.is_empty());
        assert_eq!(est.estimate(DVec2::ZERO), None);
    }

    #[test]
    fn lattice_estimate_is_total() {
        let lattice = Lattice::build(Bounds::new(0.0, 4.0, 0.0, 4.0), 9, 7).unwrap();
        let est = NearestEstimator::new(&[Sample::new(2.0, 2.0, 5.0)]);
        let field = est.estimate_lattice(&lattice);
        assert_eq!(field.shape(), (9, 7));
        assert!(field.as_slice().iter().all(|v| *v == Some(5.0)));
    }
}

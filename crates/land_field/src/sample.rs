//! Sensor samples, station ingestion and extreme-value selection.
//!
//! Readings arrive from the data collaborator keyed by an opaque station id. They are
//! assumed already filtered for instrument faults and unit-normalized; this module only
//! converts them into [`Sample`]s in a deterministic order and drops entries that are not
//! finite or fall outside the lon/lat envelope.
use std::cmp::Ordering;

use glam::DVec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One geolocated scalar observation. `x` is longitude, `y` is latitude.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl Sample {
    pub const fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Finite coordinates and value inside `[-180, 180] x [-90, 90]`.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.value.is_finite()
            && (-180.0..=180.0).contains(&self.x)
            && (-90.0..=90.0).contains(&self.y)
    }
}

impl From<(mint::Point2<f64>, f64)> for Sample {
    fn from((p, value): (mint::Point2<f64>, f64)) -> Self {
        Self::new(p.x, p.y, value)
    }
}

/// Reading for one station as delivered by the data collaborator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct StationReading {
    pub latitude: f64,
    pub longitude: f64,
    pub value: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub metadata: Option<String>,
}

impl StationReading {
    pub fn new(latitude: f64, longitude: f64, value: f64) -> Self {
        Self {
            latitude,
            longitude,
            value,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn to_sample(&self) -> Sample {
        Sample::new(self.longitude, self.latitude, self.value)
    }
}

/// A sample tagged with the station it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct StationSample {
    pub station_id: String,
    pub sample: Sample,
}

/// Converts station readings into samples ordered by ascending station id.
///
/// Sorting fixes the iteration order that tie-breaking downstream depends on, whatever
/// map type the collaborator used. Invalid readings are skipped with a warning.
pub fn samples_from_stations<I, K>(readings: I) -> Vec<StationSample>
where
    I: IntoIterator<Item = (K, StationReading)>,
    K: Into<String>,
{
    let mut out: Vec<StationSample> = readings
        .into_iter()
        .filter_map(|(id, reading)| {
            let station_id = id.into();
            let sample = reading.to_sample();
            if sample.is_valid() {
                Some(StationSample { station_id, sample })
            } else {
                warn!(
                    "Skipping station '{}': reading {:?} is outside the valid envelope.",
                    station_id, reading
                );
                None
            }
        })
        .collect();
    out.sort_by(|a, b| a.station_id.cmp(&b.station_id));
    out
}

/// Drops samples that fail [`Sample::is_valid`], returning how many were removed.
pub fn retain_valid(samples: &mut Vec<Sample>) -> usize {
    let before = samples.len();
    samples.retain(Sample::is_valid);
    let dropped = before - samples.len();
    if dropped > 0 {
        warn!("Dropped {} samples outside the valid envelope.", dropped);
    }
    dropped
}

/// Strips station ids, keeping order.
pub fn plain_samples(stations: &[StationSample]) -> Vec<Sample> {
    stations.iter().map(|s| s.sample).collect()
}

/// Top-K highest and lowest samples, for annotating a rendered field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extremes {
    /// Descending by value.
    pub highest: Vec<Sample>,
    /// Ascending by value.
    pub lowest: Vec<Sample>,
}

/// Selects up to `k` extreme samples at each end. Ties keep input order.
pub fn extremes(samples: &[Sample], k: usize) -> Extremes {
    let mut order: Vec<&Sample> = samples.iter().collect();
    // Stable sort keeps input order among equal values.
    order.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    let highest: Vec<Sample> = order.iter().take(k).map(|s| **s).collect();

    order.sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal));
    let lowest: Vec<Sample> = order.iter().take(k).map(|s| **s).collect();

    Extremes { highest, lowest }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn is_valid_checks_envelope_and_finiteness() {
        assert!(Sample::new(121.5, 25.0, 28.3).is_valid());
        assert!(!Sample::new(181.0, 25.0, 1.0).is_valid());
        assert!(!Sample::new(121.0, -91.0, 1.0).is_valid());
        assert!(!Sample::new(121.0, 25.0, f64::NAN).is_valid());
        assert!(!Sample::new(f64::INFINITY, 25.0, 1.0).is_valid());
    }

    #[test]
    fn stations_are_sorted_by_id_and_invalid_dropped() {
        let mut readings = HashMap::new();
        readings.insert("466920", StationReading::new(25.04, 121.51, 29.1));
        readings.insert("467410", StationReading::new(22.99, 120.20, 31.4));
        readings.insert("C0A520", StationReading::new(24.0, 121.0, f64::NAN));
        readings.insert(
            "466881",
            StationReading::new(25.0, 121.44, 28.7).with_metadata("Banqiao"),
        );

        let stations = samples_from_stations(readings);
        let ids: Vec<_> = stations.iter().map(|s| s.station_id.as_str()).collect();
        assert_eq!(ids, vec!["466881", "466920", "467410"]);
        assert_eq!(stations[0].sample, Sample::new(121.44, 25.0, 28.7));
        assert_eq!(plain_samples(&stations).len(), 3);
    }

    #[test]
    fn retain_valid_drops_bad_samples() {
        let mut samples = vec![
            Sample::new(121.0, 23.0, 1.0),
            Sample::new(121.0, 95.0, 2.0),
            Sample::new(121.0, 23.0, f64::INFINITY),
        ];
        assert_eq!(retain_valid(&mut samples), 2);
        assert_eq!(samples, vec![Sample::new(121.0, 23.0, 1.0)]);
    }

    #[test]
    fn extremes_picks_both_ends() {
        let samples = vec![
            Sample::new(0.0, 0.0, 5.0),
            Sample::new(1.0, 0.0, 9.0),
            Sample::new(2.0, 0.0, -3.0),
            Sample::new(3.0, 0.0, 7.0),
        ];
        let ex = extremes(&samples, 2);
        let high: Vec<f64> = ex.highest.iter().map(|s| s.value).collect();
        let low: Vec<f64> = ex.lowest.iter().map(|s| s.value).collect();
        assert_eq!(high, vec![9.0, 7.0]);
        assert_eq!(low, vec![-3.0, 5.0]);
    }

    #[test]
    fn extremes_ties_keep_input_order() {
        let samples = vec![
            Sample::new(0.0, 0.0, 1.0),
            Sample::new(1.0, 0.0, 1.0),
            Sample::new(2.0, 0.0, 1.0),
        ];
        let ex = extremes(&samples, 2);
        assert_eq!(ex.highest[0].x, 0.0);
        assert_eq!(ex.highest[1].x, 1.0);
        assert_eq!(ex.lowest[0].x, 0.0);
    }

    #[test]
    fn extremes_with_large_k_returns_all() {
        let samples = vec![Sample::new(0.0, 0.0, 1.0)];
        let ex = extremes(&samples, 10);
        assert_eq!(ex.highest.len(), 1);
        assert_eq!(ex.lowest.len(), 1);
        assert_eq!(extremes(&[], 3), Extremes::default());
    }
}

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use land_field::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A complete field run described in a RON file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scene {
    pub region: Bounds,
    #[serde(default)]
    pub config: RunConfig,
    /// `None` runs without masking.
    #[serde(default)]
    pub boundary: Option<Boundary>,
    pub stations: BTreeMap<String, StationReading>,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_scale")]
    pub scale: u32,
}

fn default_output() -> String {
    "scene.png".into()
}

fn default_scale() -> u32 {
    2
}

impl Scene {
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let scene: Scene = ron::de::from_bytes(bytes).map_err(|e| anyhow::anyhow!(e))?;
        scene.config.validate()?;
        scene.region.validate()?;
        Ok(scene)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("reading scene {}", path.display()))?;
        let scene = Self::from_bytes(&bytes)
            .with_context(|| format!("parsing scene {}", path.display()))?;
        info!(
            "Loaded scene {} with {} stations.",
            path.display(),
            scene.stations.len()
        );
        Ok(scene)
    }

    /// Station samples in ascending id order.
    pub fn samples(&self) -> Vec<Sample> {
        plain_samples(&samples_from_stations(self.stations.clone()))
    }
}

//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`WorldConfig`]      – size of the box the disks bounce around in
//! - [`ParametersConfig`] – quadtree and time settings
//! - [`GeneratorConfig`]  – optional random body generation
//! - [`BodyConfig`]       – optional explicit initial bodies
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! Every section and field may be left out; missing values fall back to the
//! defaults shown here:
//!
//! ```yaml
//! world:
//!   width: 800.0
//!   height: 600.0
//!
//! parameters:
//!   node_capacity: 2        # bodies per node before it splits
//!   min_region_size: 10.0   # regions smaller than this never split
//!   time_scale: 1.0         # negative runs time backwards
//!   max_collisions: 50      # color saturation point for renderers
//!   ticks: 600              # ticks run by the headless driver
//!
//! generator:                # omit to use only `bodies`
//!   seed: 42
//!   count: 50
//!   min_radius: 1
//!   max_radius: 50
//!   min_velocity: 1.0
//!   max_velocity: 5.0
//!
//! bodies:
//!   - x: [ 100.0, 100.0 ]
//!     v: [ 2.0, 0.0 ]
//!     radius: 10.0
//! ```
//!
//! Generated bodies come first; explicit bodies follow with the next ids.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// World box. Walls sit at `0` and at `width` / `height`.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Quadtree and time settings for a scenario
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    pub node_capacity: usize, // bodies stored per node before it splits
    pub min_region_size: f64, // regions whose longest side is below this never split
    pub time_scale: f64,      // displacement multiplier per tick
    pub max_collisions: u32,  // collision count at which the body color saturates
    pub ticks: u64,           // ticks run by the headless driver
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            node_capacity: 2,
            min_region_size: 10.0,
            time_scale: 1.0,
            max_collisions: 50,
            ticks: 600,
        }
    }
}

/// Random body generation
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,         // deterministic seed to make runs reproducible
    pub count: usize,      // number of bodies
    pub min_radius: u32,   // inclusive radius range
    pub max_radius: u32,
    pub min_velocity: f64, // range for each speed component
    pub max_velocity: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            count: 50,
            min_radius: 1,
            max_radius: 50,
            min_velocity: 1.0,
            max_velocity: 5.0,
        }
    }
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: Vec<f64>,  // initial center `[x, y]`
    pub v: Vec<f64>,  // initial velocity `[vx, vy]`
    pub radius: f64,  // radius; mass is derived from it
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ScenarioConfig {
    pub world: WorldConfig,
    pub parameters: ParametersConfig,
    pub generator: Option<GeneratorConfig>,
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    /// Parse a scenario from a YAML string.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("failed to parse scenario YAML")
    }

    /// Read and parse a scenario file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open scenario {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).with_context(|| format!("failed to parse scenario {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = ScenarioConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg.world.width, 800.0);
        assert_eq!(cfg.world.height, 600.0);
        assert_eq!(cfg.parameters.node_capacity, 2);
        assert_eq!(cfg.parameters.min_region_size, 10.0);
        assert_eq!(cfg.parameters.max_collisions, 50);
        assert!(cfg.generator.is_none());
        assert!(cfg.bodies.is_empty());
    }

    #[test]
    fn partial_sections_fill_in() {
        let yaml = r#"
world:
  width: 400.0
parameters:
  time_scale: -0.5
generator:
  count: 10
bodies:
  - x: [10.0, 20.0]
    v: [1.0, 0.0]
    radius: 3.0
"#;
        let cfg = ScenarioConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.world.width, 400.0);
        assert_eq!(cfg.world.height, 600.0);
        assert_eq!(cfg.parameters.time_scale, -0.5);
        assert_eq!(cfg.parameters.node_capacity, 2);

        let generator = cfg.generator.unwrap();
        assert_eq!(generator.count, 10);
        assert_eq!(generator.max_radius, 50);

        assert_eq!(cfg.bodies.len(), 1);
        assert_eq!(cfg.bodies[0].x, vec![10.0, 20.0]);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(ScenarioConfig::from_yaml_str("parameters: [1, 2").is_err());
        assert!(ScenarioConfig::from_yaml_str("bodies:\n  - x: [1.0]\n").is_err());
    }
}

//! Scene and configuration loading.
//!
//! A scene file is a JSON array of object specs, spawned in order. Specs
//! that sit inside or on top of another object name it by its internal key
//! (`box_0`, `lid_box_1`, `asset_2`, ...), which is assigned per kind in spawn order.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use desk_core::{ObjectSpec, Simulation};
use desk_types::DeskConfig;
use tracing::debug;

/// Read a configuration file, or fall back to the defaults.
pub fn load_config(path: Option<&Path>) -> Result<DeskConfig> {
    let Some(path) = path else {
        return Ok(DeskConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Parse a configuration document. Missing fields take their defaults.
pub fn parse_config(text: &str) -> Result<DeskConfig> {
    let config: DeskConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Read a scene file.
pub fn load_scene(path: &Path) -> Result<Vec<ObjectSpec>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read scene {}", path.display()))?;
    parse_scene(&text).with_context(|| format!("invalid scene {}", path.display()))
}

/// Parse a scene document.
pub fn parse_scene(text: &str) -> Result<Vec<ObjectSpec>> {
    Ok(serde_json::from_str(text)?)
}

/// Build a simulation and spawn every spec into it.
pub fn build(config: DeskConfig, specs: Vec<ObjectSpec>, seed: Option<u64>) -> Result<Simulation> {
    let mut sim = match seed {
        Some(seed) => Simulation::with_seed(config, seed)?,
        None => Simulation::new(config)?,
    };
    for (i, spec) in specs.into_iter().enumerate() {
        let key = sim
            .spawn(spec)
            .with_context(|| format!("failed to spawn scene entry {i}"))?;
        debug!(object = %key, "scene object ready");
    }
    Ok(sim)
}

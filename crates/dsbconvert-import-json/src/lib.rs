//! JSON front end for the translator.
//!
//! Models use this workspace's own schema, not raw HBJSON: rooms are nested
//! under `stories[].rooms[]` (or listed in `unassigned_rooms`), and a
//! `Surface` boundary condition names its partner face directly with
//! `adjacent_face`. Field names otherwise follow the honeybee conventions
//! (`face_type`, `boundary_condition`, `geometry.boundary`, ...). Simulation
//! parameters may leave out any field.

use anyhow::{bail, Context, Result};
use dsbconvert_core::model::Model;
use dsbconvert_core::simulation::SimulationParameters;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

pub fn import_model(path: &Path) -> Result<Model> {
    let json = std::fs::read_to_string(path).with_context(|| format!("read model: {path:?}"))?;
    let model = parse_model(&json).with_context(|| format!("parse model: {path:?}"))?;
    debug!(
        model = %model.identifier,
        stories = model.stories.len(),
        unassigned_rooms = model.unassigned_rooms.len(),
        "imported model"
    );
    Ok(model)
}

pub fn import_simulation_parameter(path: &Path) -> Result<SimulationParameters> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read simulation parameters: {path:?}"))?;
    parse_simulation_parameter(&json)
        .with_context(|| format!("parse simulation parameters: {path:?}"))
}

pub fn parse_model(json: &str) -> Result<Model> {
    let value: Value = serde_json::from_str(json).context("invalid JSON")?;
    check_type(&value, "Model")?;
    serde_json::from_value(value).context("not a model document")
}

pub fn parse_simulation_parameter(json: &str) -> Result<SimulationParameters> {
    let value: Value = serde_json::from_str(json).context("invalid JSON")?;
    check_type(&value, "SimulationParameter")?;
    serde_json::from_value(value).context("not a simulation parameter document")
}

/// Documents may carry a top-level `type` tag; when present it must match.
fn check_type(value: &Value, expected: &str) -> Result<()> {
    let Some(object) = value.as_object() else {
        bail!("expected a JSON object at the top level");
    };
    match object.get("type").and_then(Value::as_str) {
        None => Ok(()),
        Some(found) if found == expected => Ok(()),
        Some(found) => bail!("expected a {expected} document, found type '{found}'"),
    }
}

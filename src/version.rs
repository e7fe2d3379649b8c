//! Compatibility check between a layout's `version` attribute and the engine.
use thiserror::Error;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Layout requires version {required}, but this engine is version {engine}")]
pub struct VersionMismatch {
    pub required: String,
    pub engine: String,
}

fn component(parts: &[&str], index: usize) -> Option<u64> {
    match parts.get(index) {
        Some(p) => p.trim().parse().ok(),
        None => Some(0),
    }
}

/// Accepts `required` unless it names a newer major, minor or patch version than
/// `engine`. An empty requirement and an engine with a non-numeric patch level
/// (development builds) always pass.
pub fn check_version(required: &str, engine: &str) -> Result<(), VersionMismatch> {
    let required = required.trim();
    if required.is_empty() {
        return Ok(());
    }
    let mismatch = || VersionMismatch {
        required: required.to_string(),
        engine: engine.to_string(),
    };
    let engine_parts: Vec<&str> = engine.trim().split('.').collect();
    let Some(engine_patch) = component(&engine_parts, 2) else {
        return Ok(());
    };
    let required_parts: Vec<&str> = required.split('.').collect();
    let wanted = [
        component(&required_parts, 0).ok_or_else(mismatch)?,
        component(&required_parts, 1).ok_or_else(mismatch)?,
        component(&required_parts, 2).ok_or_else(mismatch)?,
    ];
    let have = [
        component(&engine_parts, 0).ok_or_else(mismatch)?,
        component(&engine_parts, 1).ok_or_else(mismatch)?,
        engine_patch,
    ];
    for (w, h) in wanted.into_iter().zip(have) {
        if w > h {
            return Err(mismatch());
        }
        if w < h {
            return Ok(());
        }
    }
    Ok(())
}

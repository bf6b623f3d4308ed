//! Per-skill parameter table loading
//!
//! The table is a JSON object keyed by theme id (see [`bkt_algo::ParameterSet`]).
//! A configured but missing file is not fatal: the service runs on the
//! defaults. A file that exists but cannot be parsed aborts startup.

use std::path::{Path, PathBuf};

use bkt_algo::{BktParams, ParameterSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParamsStoreError {
    #[error("failed to read parameter table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid parameter table {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse the table at `path` on top of `defaults`
pub fn load_from_path(path: &Path, defaults: BktParams) -> Result<ParameterSet, ParamsStoreError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ParamsStoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    ParameterSet::from_json_str(defaults, &raw).map_err(|source| ParamsStoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parameter set for the service: defaults plus the optional table
pub fn load_parameter_set(
    path: Option<&Path>,
    defaults: BktParams,
) -> Result<ParameterSet, ParamsStoreError> {
    let Some(path) = path else {
        return Ok(ParameterSet::new(defaults));
    };

    if !path.exists() {
        tracing::warn!(path = %path.display(), "parameter table not found, using defaults");
        return Ok(ParameterSet::new(defaults));
    }

    let set = load_from_path(path, defaults)?;
    tracing::info!(
        path = %path.display(),
        skills = set.skill_count(),
        "per-skill parameter table loaded"
    );
    Ok(set)
}

//! Idempotent district seed loader
//!
//! Districts are bulk-created once from a static JSON list; a district whose
//! name already exists is skipped, so rerunning at every startup is safe.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ReliefError, Result};
use crate::store::Store;

#[derive(Debug, Deserialize)]
pub struct SeedDistrict {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Load districts from a JSON file, inserting only names not yet present.
/// Returns the number of districts inserted.
pub fn load_districts(store: &mut Store, path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)?;
    let seeds: Vec<SeedDistrict> = serde_json::from_str(&content)
        .map_err(|e| ReliefError::Config(format!("invalid district seed file: {e}")))?;

    let mut inserted = 0;
    for seed in seeds {
        if seed.name.trim().is_empty() {
            warn!("Skipping seed district with empty name");
            continue;
        }
        if store.district_by_name(&seed.name)?.is_some() {
            continue;
        }
        store.insert_district(&seed.name, seed.latitude, seed.longitude)?;
        inserted += 1;
    }

    info!(path = %path.display(), inserted, "District seed loaded");
    Ok(inserted)
}

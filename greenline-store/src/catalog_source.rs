use greenline_catalog::{Trip, TripCatalog};
use std::path::Path;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read catalog seed {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog seed {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog seed rejected trip: {0}")]
    Invalid(#[from] greenline_core::ReservationError),
}

/// Read the operator trip dataset from a JSON file.
pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Vec<Trip>, SeedError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Publish every seed trip into the catalog. Fails on the first trip that
/// does not validate, so a broken dataset is caught at boot rather than at
/// hold time.
pub fn seed_catalog(catalog: &TripCatalog, trips: Vec<Trip>) -> Result<usize, SeedError> {
    let count = trips.len();
    for trip in trips {
        catalog.publish(trip)?;
    }
    info!(trips = count, "trip catalog seeded");
    Ok(count)
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Population grid loading and areal-weighted catchment estimation.
//!
//! Loads a polygonized population grid (GeoJSON, one `pop` count per
//! cell) once per process, builds an R-tree over the cells, and
//! estimates the population inside a catchment polygon by apportioning
//! each overlapping cell's count by the fraction of its area covered.

pub mod grid;

use std::path::Path;
use std::sync::OnceLock;

use thiserror::Error;

pub use grid::{POP_PROPERTY, PopulationGrid};

/// Environment variable overriding the grid file location.
pub const GRID_PATH_ENV: &str = "SITELINE_GRID_PATH";

/// Default grid file location, relative to the working directory.
pub const DEFAULT_GRID_PATH: &str = "data/population_grid.geojson";

/// Errors from loading the population grid.
///
/// All of these are configuration errors: they abort process
/// initialization rather than individual requests.
#[derive(Debug, Error)]
pub enum PopulationError {
    /// The grid file does not exist at the configured path.
    #[error(
        "Missing population grid at {path}. Export the polygonized grid as GeoJSON first \
         (see {GRID_PATH_ENV})."
    )]
    MissingGrid {
        /// The path that was checked.
        path: String,
    },

    /// Reading the grid file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The grid file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    Geojson(#[from] geojson::Error),

    /// The grid file is not a `FeatureCollection`.
    #[error("Population grid must be a GeoJSON FeatureCollection")]
    NotACollection,

    /// A grid cell has no polygon geometry.
    #[error("Grid cell {index} has no usable polygon geometry")]
    InvalidGeometry {
        /// Zero-based feature index in the collection.
        index: usize,
    },

    /// A grid cell is missing its population count.
    #[error("Grid cell {index} is missing the numeric '{POP_PROPERTY}' property")]
    MissingPopulation {
        /// Zero-based feature index in the collection.
        index: usize,
    },
}

static GRID: OnceLock<PopulationGrid> = OnceLock::new();

/// Returns the process-wide population grid, loading it on first use.
///
/// The grid is immutable after loading and safe for unsynchronized
/// concurrent reads. Initialization is idempotent: concurrent first
/// calls may both load the file, but only one result is kept.
///
/// # Errors
///
/// Returns a [`PopulationError`] if the grid file is missing or
/// malformed. A failed load is not cached; a later call retries.
pub fn shared_grid() -> Result<&'static PopulationGrid, PopulationError> {
    if let Some(grid) = GRID.get() {
        return Ok(grid);
    }

    let path = std::env::var(GRID_PATH_ENV).unwrap_or_else(|_| DEFAULT_GRID_PATH.to_string());
    let loaded = PopulationGrid::load(Path::new(&path))?;
    Ok(GRID.get_or_init(|| loaded))
}

//! In-memory population grid with an R-tree spatial index.
//!
//! Cells are loaded from a polygonized raster export (GeoJSON
//! `FeatureCollection`, WGS84 lon/lat), where each feature carries the
//! cell's population count in the `pop` property.

use std::path::Path;

use geo::{BooleanOps, BoundingRect, GeodesicArea, Intersects, MultiPolygon};
use geojson::GeoJson;
use rstar::{AABB, RTree, RTreeObject};

use crate::PopulationError;

/// Feature property holding each cell's population count.
pub const POP_PROPERTY: &str = "pop";

/// A grid cell stored in the R-tree with its population count.
#[derive(Debug)]
struct GridCell {
    population: f64,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for GridCell {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Immutable population grid, shared read-only across all requests.
#[derive(Debug)]
pub struct PopulationGrid {
    cells: RTree<GridCell>,
}

impl PopulationGrid {
    /// Loads the grid from a `GeoJSON` file and builds the R-tree index.
    ///
    /// # Errors
    ///
    /// Returns a [`PopulationError`] if the file is missing, is not a
    /// `FeatureCollection`, or any cell lacks polygon geometry or a
    /// numeric `pop` property. These are fatal configuration errors.
    pub fn load(path: &Path) -> Result<Self, PopulationError> {
        if !path.exists() {
            return Err(PopulationError::MissingGrid {
                path: path.display().to_string(),
            });
        }

        let raw = std::fs::read_to_string(path)?;
        let grid = Self::from_geojson(&raw)?;
        log::info!(
            "Loaded {} population grid cells from {}",
            grid.len(),
            path.display()
        );
        Ok(grid)
    }

    /// Parses a grid from raw `GeoJSON` text.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`PopulationGrid::load`], minus the file
    /// system ones.
    pub fn from_geojson(raw: &str) -> Result<Self, PopulationError> {
        let geojson: GeoJson = raw.parse()?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(PopulationError::NotACollection);
        };

        let mut cells = Vec::with_capacity(collection.features.len());

        for (index, feature) in collection.features.into_iter().enumerate() {
            let population = feature
                .properties
                .as_ref()
                .and_then(|props| props.get(POP_PROPERTY))
                .and_then(serde_json::Value::as_f64)
                .ok_or(PopulationError::MissingPopulation { index })?;

            let polygon = feature
                .geometry
                .and_then(|geom| to_multipolygon(&geom))
                .ok_or(PopulationError::InvalidGeometry { index })?;

            let envelope = compute_envelope(&polygon);

            cells.push(GridCell {
                population,
                envelope,
                polygon,
            });
        }

        Ok(Self {
            cells: RTree::bulk_load(cells),
        })
    }

    /// Number of cells in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.size()
    }

    /// Whether the grid contains no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.size() == 0
    }

    /// Estimates the population inside a catchment polygon.
    ///
    /// Candidate cells come from the R-tree envelope filter, confirmed
    /// with an exact intersects test. Each cell contributes its count
    /// weighted by `intersection_area / cell_area`, with areas measured
    /// geodesically on the WGS84 ellipsoid. Rounding happens exactly
    /// once, on the final sum, to keep cumulative rounding error out of
    /// the result. A degenerate catchment yields 0.
    #[must_use]
    pub fn estimate_population(&self, catchment: &MultiPolygon<f64>) -> u64 {
        let Some(rect) = catchment.bounding_rect() else {
            return 0;
        };
        let envelope = AABB::from_corners(
            [rect.min().x, rect.min().y],
            [rect.max().x, rect.max().y],
        );

        let mut total = 0.0_f64;
        let mut overlapping = 0_usize;

        for cell in self.cells.locate_in_envelope_intersecting(&envelope) {
            if !cell.polygon.intersects(catchment) {
                continue;
            }

            let cell_area = cell.polygon.geodesic_area_unsigned();
            if cell_area <= 0.0 {
                continue;
            }

            let overlap = cell.polygon.intersection(catchment);
            // Clamp for floating-point slop at shared boundaries.
            let overlap_area = overlap.geodesic_area_unsigned().min(cell_area);

            total += cell.population * (overlap_area / cell_area);
            overlapping += 1;
        }

        log::debug!("Catchment overlaps {overlapping} grid cells, estimated population {total:.1}");

        if total <= 0.0 {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            total.round() as u64
        }
    }
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: &geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    /// A 1°x1° cell at (lon, lat) with the given population.
    fn cell_feature(lon: f64, lat: f64, pop: u64) -> String {
        format!(
            r#"{{"type":"Feature","properties":{{"pop":{pop}}},"geometry":{{"type":"Polygon",
                "coordinates":[[[{lon},{lat}],[{e},{lat}],[{e},{n}],[{lon},{n}],[{lon},{lat}]]]}}}}"#,
            e = lon + 1.0,
            n = lat + 1.0,
        )
    }

    fn grid_of(features: &[String]) -> PopulationGrid {
        let raw = format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            features.join(",")
        );
        PopulationGrid::from_geojson(&raw).unwrap()
    }

    fn rect(w: f64, s: f64, e: f64, n: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: w, y: s),
            (x: e, y: s),
            (x: e, y: n),
            (x: w, y: n),
        ]])
    }

    #[test]
    fn full_cell_coverage_returns_full_population() {
        let grid = grid_of(&[cell_feature(10.0, 50.0, 12_345)]);
        let catchment = rect(10.0, 50.0, 11.0, 51.0);
        assert_eq!(grid.estimate_population(&catchment), 12_345);
    }

    #[test]
    fn half_cell_coverage_apportions_by_area() {
        // Splitting the cell along a meridian halves its geodesic area
        // exactly, so the estimate is exactly half the count.
        let grid = grid_of(&[cell_feature(10.0, 50.0, 10_000)]);
        let catchment = rect(10.0, 50.0, 10.5, 51.0);
        assert_eq!(grid.estimate_population(&catchment), 5_000);
    }

    #[test]
    fn overlap_spanning_two_cells_sums_before_rounding() {
        let grid = grid_of(&[
            cell_feature(10.0, 50.0, 100),
            cell_feature(11.0, 50.0, 100),
        ]);
        // Quarter of each cell (by longitude slice).
        let catchment = rect(10.75, 50.0, 11.25, 51.0);
        assert_eq!(grid.estimate_population(&catchment), 50);
    }

    #[test]
    fn disjoint_catchment_returns_zero() {
        let grid = grid_of(&[cell_feature(10.0, 50.0, 9_999)]);
        let catchment = rect(20.0, 20.0, 21.0, 21.0);
        assert_eq!(grid.estimate_population(&catchment), 0);
    }

    #[test]
    fn empty_catchment_returns_zero() {
        let grid = grid_of(&[cell_feature(10.0, 50.0, 9_999)]);
        let catchment = MultiPolygon::<f64>(vec![]);
        assert_eq!(grid.estimate_population(&catchment), 0);
    }

    #[test]
    fn missing_pop_property_is_fatal() {
        let raw = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Polygon",
             "coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}]}"#;
        let err = PopulationGrid::from_geojson(raw).unwrap_err();
        assert!(matches!(
            err,
            PopulationError::MissingPopulation { index: 0 }
        ));
    }

    #[test]
    fn non_polygon_cell_is_fatal() {
        let raw = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"pop":5},"geometry":{"type":"Point",
             "coordinates":[10.0,50.0]}}]}"#;
        let err = PopulationGrid::from_geojson(raw).unwrap_err();
        assert!(matches!(err, PopulationError::InvalidGeometry { index: 0 }));
    }
}

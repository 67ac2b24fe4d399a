use crate::*;

/// A source of ground elevation (metres above mean sea level).
///
/// `None` is _no data_ and is treated as sea level by the reach search.
pub trait Terrain {
    fn elevation_at(&self, location: GeoPoint) -> Option<f64>;
}

impl<F> Terrain for F
where
    F: Fn(GeoPoint) -> Option<f64>,
{
    fn elevation_at(&self, location: GeoPoint) -> Option<f64> {
        self(location)
    }
}

impl Terrain for TerrainGrid {
    fn elevation_at(&self, location: GeoPoint) -> Option<f64> {
        self.sample(location)
    }
}

/// Elevation with missing data as sea level.
pub(crate) fn ground(terrain: Option<&(dyn Terrain + Sync)>, location: GeoPoint) -> f64 {
    terrain
        .and_then(|t| t.elevation_at(location))
        .filter(|h| h.is_finite())
        .unwrap_or_default()
}

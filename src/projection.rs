use crate::*;

/// Mean earth radius (metres).
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Geodetic location, in degrees.
#[derive(Copy, Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Finite and within the usual degree ranges.
    pub fn is_valid(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude)
            && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// Wrap a longitude (or longitude difference) into `[-180, 180)`. Values already in
/// `[-180, 180]` are returned as is.
pub fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        longitude
    } else {
        (longitude + 540.0).rem_euclid(360.0) - 180.0
    }
}

/// Geodetic location with an altitude (metres above mean sea level).
#[derive(Copy, Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AGeoPoint {
    pub location: GeoPoint,
    pub altitude: f64,
}

impl AGeoPoint {
    pub const fn new(location: GeoPoint, altitude: f64) -> Self {
        Self { location, altitude }
    }
}

/// A geodetic lat/lon aligned box.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    pub fn new(south_west: GeoPoint, north_east: GeoPoint) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn corners(&self) -> [GeoPoint; 4] {
        let Self {
            south_west: sw,
            north_east: ne,
        } = *self;
        [
            sw,
            GeoPoint::new(ne.longitude, sw.latitude),
            ne,
            GeoPoint::new(sw.longitude, ne.latitude),
        ]
    }
}

/// Equirectangular flat-earth projection about a centre.
///
/// Good for the few hundred kilometres a glider covers: x is scaled by the cosine of the centre
/// latitude, so distances in flat space are metres (times `units_per_metre`) near the centre.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlatProjection {
    centre: GeoPoint,
    cos_centre: f64,
    units_per_metre: f64,
}

impl FlatProjection {
    /// Project about `centre`, one flat unit per metre.
    pub fn new(centre: GeoPoint) -> Self {
        Self::with_scale(centre, 1.0)
    }

    pub fn with_scale(centre: GeoPoint, units_per_metre: f64) -> Self {
        Self {
            centre,
            cos_centre: centre.latitude.to_radians().cos(),
            units_per_metre,
        }
    }

    pub fn centre(&self) -> GeoPoint {
        self.centre
    }

    /// Float projection, before rounding to integer units.
    pub fn project_p2(&self, p: GeoPoint) -> Point2 {
        let k = EARTH_RADIUS * self.units_per_metre;
        let dlon = wrap_longitude(p.longitude - self.centre.longitude);
        let x = dlon.to_radians() * self.cos_centre * k;
        let y = (p.latitude - self.centre.latitude).to_radians() * k;
        [x, y]
    }

    pub fn project(&self, p: GeoPoint) -> FlatPoint {
        FlatPoint::from_p2(self.project_p2(p))
    }

    pub fn unproject_p2(&self, [x, y]: Point2) -> GeoPoint {
        let k = (EARTH_RADIUS * self.units_per_metre).recip();
        let latitude = self.centre.latitude + (y * k).to_degrees();
        let longitude = self.centre.longitude + (x * k / self.cos_centre).to_degrees();
        GeoPoint::new(wrap_longitude(longitude), latitude)
    }

    pub fn unproject(&self, p: FlatPoint) -> GeoPoint {
        self.unproject_p2(p.to_p2())
    }

    /// The flat box enclosing the geodetic bounds.
    pub fn project_bounds(&self, bounds: &GeoBounds) -> FlatBoundingBox {
        bounds.corners().into_iter().map(|c| self.project(c)).collect()
    }

    pub fn metres_to_flat(&self, metres: f64) -> f64 {
        metres * self.units_per_metre
    }

    pub fn flat_to_metres(&self, units: f64) -> f64 {
        units / self.units_per_metre
    }
}

use std::{cmp::Ordering, ops};

/// 2D float vector (X,Y), used for directions and intermediate projected math.
pub type Point2 = [f64; 2];

/// Integer projected (flat-earth) location.
///
/// Units are those of the [`FlatProjection`](crate::FlatProjection) that produced the point.
/// Ordering is total: **x ascending, then y descending**, so points can key ordered
/// containers deterministically.
///
/// `+` and `-` work in `i32`. Distances and bearings widen first, so they hold for any pair.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FlatPoint {
    pub x: i32,
    pub y: i32,
}

impl FlatPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Round a float point to the nearest integer location.
    pub fn from_p2([x, y]: Point2) -> Self {
        Self::new(x.round() as i32, y.round() as i32)
    }

    pub fn to_p2(self) -> Point2 {
        [self.x as f64, self.y as f64]
    }

    /// Scale point by multiplying both dimensions by `scalar`, rounding to the nearest unit.
    pub fn scale(self, scalar: f64) -> Self {
        Self::from_p2(self.to_p2().map(|v| v * scalar))
    }

    pub fn dot(self, other: Self) -> i64 {
        self.x as i64 * other.x as i64 + self.y as i64 * other.y as i64
    }

    /// The z component of the 3D cross product.
    /// Positive when `other` is counter-clockwise of `self`.
    pub fn cross(self, other: Self) -> i64 {
        self.x as i64 * other.y as i64 - self.y as i64 * other.x as i64
    }

    /// Squared distance in projected units, saturating at `u64::MAX`.
    pub fn distance_sq_to(self, other: Self) -> u64 {
        let dx = (other.x as i64 - self.x as i64).unsigned_abs();
        let dy = (other.y as i64 - self.y as i64).unsigned_abs();
        (dx * dx).saturating_add(dy * dy)
    }

    /// Distance in projected units, rounded.
    pub fn distance_to(self, other: Self) -> u32 {
        (self.distance_sq_to(other) as f64).sqrt().round() as u32
    }

    /// Unrounded distance in projected units.
    pub fn mag_to(self, other: Self) -> f64 {
        (self.distance_sq_to(other) as f64).sqrt()
    }

    /// Bearing from `self` to `other` in degrees clockwise from north (+y), in `[0, 360)`.
    pub fn bearing_to(self, other: Self) -> f64 {
        let dx = other.x as f64 - self.x as f64;
        let dy = other.y as f64 - self.y as f64;
        dx.atan2(dy).to_degrees().rem_euclid(360.0)
    }
}

impl ops::Add for FlatPoint {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl ops::Sub for FlatPoint {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl ops::Mul<f64> for FlatPoint {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl Ord for FlatPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x.cmp(&other.x).then_with(|| other.y.cmp(&self.y))
    }
}

impl PartialOrd for FlatPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(i32, i32)> for FlatPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// A [`FlatPoint`] with a nav reference altitude (metres).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AltitudeFlatPoint {
    pub point: FlatPoint,
    pub altitude: i16,
}

impl AltitudeFlatPoint {
    pub const fn new(point: FlatPoint, altitude: i16) -> Self {
        Self { point, altitude }
    }

    /// Round the location onto a 4 unit grid.
    ///
    /// This bounds the number of distinct states a search or reach expansion can visit: two
    /// nearby points with the same altitude collapse into one.
    pub fn round_location(&mut self) {
        self.point.x = (self.point.x >> 2) << 2;
        self.point.y = (self.point.y >> 2) << 2;
    }

    /// Consuming version of [`Self::round_location`].
    pub fn rounded(mut self) -> Self {
        self.round_location();
        self
    }
}

impl Ord for AltitudeFlatPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.point
            .cmp(&other.point)
            .then_with(|| other.altitude.cmp(&self.altitude))
    }
}

impl PartialOrd for AltitudeFlatPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Helper to clamp a float altitude into the `i16` range used by fans and search nodes.
pub(crate) fn clamp_altitude(alt: f64) -> i16 {
    alt.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

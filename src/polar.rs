//! Glide performance models.
//!
//! Bearings are degrees clockwise from north, heights and distances are metres.

/// A glide performance model: how far over the ground the aircraft goes per metre of height.
///
/// Implementors must be monotonic in height, the reach search relies on a glide never getting
/// longer by having less height to spend.
pub trait GlidePolar {
    /// Glide ratio over the ground when flying along `bearing`, wind included.
    /// A ratio `<= 0` means no forward progress is possible.
    fn glide_ratio(&self, bearing: f64) -> f64;

    /// Maximum ground distance achievable along `bearing` spending `height`.
    fn distance_for_height(&self, bearing: f64, height: f64) -> f64 {
        let ratio = self.glide_ratio(bearing);
        if height <= 0.0 || ratio <= 0.0 {
            0.0
        } else {
            height * ratio
        }
    }

    /// Height needed to cover `distance` along `bearing`.
    /// Infinite if the aircraft cannot make progress in that direction.
    fn height_for_distance(&self, bearing: f64, distance: f64) -> f64 {
        let ratio = self.glide_ratio(bearing);
        if distance <= 0.0 {
            0.0
        } else if ratio <= 0.0 {
            f64::INFINITY
        } else {
            distance / ratio
        }
    }
}

impl<P: GlidePolar + ?Sized> GlidePolar for &P {
    fn glide_ratio(&self, bearing: f64) -> f64 {
        (**self).glide_ratio(bearing)
    }
}

/// Wind, as speed (m/s) and the bearing it blows **from**.
#[derive(Copy, Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub bearing: f64,
}

impl Wind {
    pub fn new(speed: f64, bearing: f64) -> Self {
        Self { speed, bearing }
    }

    /// Tailwind component (m/s) when flying along `bearing`. Negative is a headwind.
    pub fn tailwind(&self, bearing: f64) -> f64 {
        -self.speed * (bearing - self.bearing).to_radians().cos()
    }
}

/// A speed polar fitted through three points with a wind.
///
/// The sink rate (positive downwards, m/s) at airspeed `v` (m/s) is `a·v² + b·v + c`.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RoutePolar {
    a: f64,
    b: f64,
    c: f64,
    v_min: f64,
    v_max: f64,
    wind: Wind,
}

impl RoutePolar {
    /// Fit a polar through three `(speed, vertical speed)` points.
    ///
    /// Speeds are m/s, vertical speeds are m/s with sink **negative** as polar tables list them.
    /// The fitted polar is only trusted between the slowest and fastest point.
    ///
    /// # Example
    /// ```rust
    /// # use glide_reach::*;
    /// // a standard class glider
    /// let polar = RoutePolar::from_3vw([(22.2, -0.64), (27.8, -0.75), (41.7, -1.64)]).unwrap();
    /// assert!((polar.still_air_ratio() - 38.0).abs() < 2.0);
    /// ```
    pub fn from_3vw(points: [(f64, f64); 3]) -> Result<Self, &'static str> {
        if points.iter().any(|(v, w)| !v.is_finite() || !w.is_finite()) {
            return Err("polar points must be finite");
        }

        let [(v1, w1), (v2, w2), (v3, w3)] = points.map(|(v, w)| (v, -w));

        let d = v1 * v1 * (v2 - v3) + v2 * v2 * (v3 - v1) + v3 * v3 * (v1 - v2);
        if d.abs() < f64::EPSILON {
            return Err("polar speeds must be distinct");
        }

        let a = ((v2 - v3) * (w1 - w3) + (v3 - v1) * (w2 - w3)) / d;
        let b = -((v2 * v2 - v3 * v3) * (w1 - w3) + (v3 * v3 - v1 * v1) * (w2 - w3)) / d;
        let c = w3 - a * v3 * v3 - b * v3;

        if a <= 0.0 || c <= 0.0 {
            return Err("polar must be a sink curve, concave up with a positive minimum sink");
        }

        let v_min = v1.min(v2).min(v3);
        let v_max = v1.max(v2).max(v3);
        if v_min <= 0.0 {
            return Err("polar speeds must be positive");
        }

        Ok(Self {
            a,
            b,
            c,
            v_min,
            v_max,
            wind: Wind::default(),
        })
    }

    pub fn with_wind(mut self, wind: Wind) -> Self {
        self.wind = wind;
        self
    }

    pub fn wind(&self) -> Wind {
        self.wind
    }

    /// Sink rate (positive, m/s) at airspeed `v`.
    pub fn sink(&self, v: f64) -> f64 {
        self.a * v * v + self.b * v + self.c
    }

    /// Airspeed of the best still-air glide.
    pub fn best_glide_speed(&self) -> f64 {
        (self.c / self.a).sqrt().clamp(self.v_min, self.v_max)
    }

    pub fn still_air_ratio(&self) -> f64 {
        let v = self.best_glide_speed();
        v / self.sink(v)
    }

    /// Airspeed giving the best glide over the ground with a tailwind `u` (negative headwind).
    fn speed_to_fly(&self, u: f64) -> f64 {
        // maximise (v + u) / s(v) => a·v² + 2a·u·v + (b·u - c) = 0
        let disc = u * u - (self.b * u - self.c) / self.a;
        if disc < 0.0 {
            return self.v_max;
        }
        (-u + disc.sqrt()).clamp(self.v_min, self.v_max)
    }
}

impl GlidePolar for RoutePolar {
    fn glide_ratio(&self, bearing: f64) -> f64 {
        let u = self.wind.tailwind(bearing);
        let v = self.speed_to_fly(u);
        let ground = v + u;
        if ground <= 0.0 {
            return 0.0;
        }
        ground / self.sink(v)
    }
}

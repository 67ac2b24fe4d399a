use crate::*;

/// Tuning of the reach search.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReachConfig {
    /// Rays sampled around the compass by the root fan.
    pub root_rays: u32,
    /// Levels of child fans below the root. Each level doubles the angular resolution.
    pub max_depth: u8,
    /// Clearance (metres) a glide must keep above terrain.
    pub safety_height: f64,
    /// Distance (metres) between terrain samples along a glide.
    pub terrain_step: f64,
    /// Chord subdivisions tested between adjacent rays.
    pub gap_samples: u32,
}

impl Default for ReachConfig {
    fn default() -> Self {
        Self {
            root_rays: 36,
            max_depth: 4,
            safety_height: 150.0,
            terrain_step: 100.0,
            gap_samples: 8,
        }
    }
}

impl ReachConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.root_rays < 3 {
            return Err("at least 3 root rays are required");
        }
        if self.max_depth > 16 || (self.root_rays as u64) << self.max_depth > u32::MAX as u64 {
            return Err("max_depth too large for the ray count");
        }
        if !self.safety_height.is_finite() || self.safety_height < 0.0 {
            return Err("safety height must be finite and non-negative");
        }
        if !self.terrain_step.is_finite() || self.terrain_step <= 0.0 {
            return Err("terrain step must be finite and positive");
        }
        if self.gap_samples == 0 {
            return Err("gap samples must be at least 1");
        }
        Ok(())
    }

    /// Polar indices per revolution, the finest angular resolution.
    pub fn polar_steps(&self) -> u32 {
        self.root_rays << self.max_depth
    }

    /// Polar indices between adjacent root rays.
    pub fn root_stride(&self) -> u32 {
        1 << self.max_depth
    }

    /// Bearing (degrees) of a polar index. Indices wrap around the revolution.
    pub fn bearing(&self, index: u32) -> f64 {
        let steps = self.polar_steps();
        (index % steps) as f64 * 360.0 / steps as f64
    }
}

/// Everything a fan needs while it is being built or queried.
#[derive(Copy, Clone)]
pub struct ReachFanParms<'a> {
    pub polar: &'a (dyn GlidePolar + Sync),
    pub terrain: Option<&'a (dyn Terrain + Sync)>,
    pub projection: &'a FlatProjection,
    pub config: &'a ReachConfig,
}

/// The area reachable in a glide from an origin, around terrain.
///
/// # Example
/// ```rust
/// # use glide_reach::*;
/// let polar = RoutePolar::from_3vw([(22.2, -0.64), (27.8, -0.75), (41.7, -1.64)]).unwrap();
/// let origin = AGeoPoint::new(GeoPoint::new(147.0, -35.0), 1500.0);
///
/// let mut reach = ReachFan::default();
/// assert!(reach.solve(origin, &polar, None));
///
/// // 20 km north is an easy glide from 1500 m
/// let dest = GeoPoint::new(147.0, -35.0 + 20_000.0 / 111_195.0);
/// assert!(reach.is_inside(dest, false));
/// assert!(reach.find_positive_arrival(dest, &polar).unwrap() > 900);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ReachFan {
    config: ReachConfig,
    projection: FlatProjection,
    origin: Option<AGeoPoint>,
    tree: FanTree,
}

impl Default for ReachFan {
    fn default() -> Self {
        Self::new(ReachConfig::default())
    }
}

impl ReachFan {
    pub fn new(config: ReachConfig) -> Self {
        Self {
            config,
            projection: FlatProjection::new(GeoPoint::default()),
            origin: None,
            tree: FanTree::new(),
        }
    }

    pub fn config(&self) -> &ReachConfig {
        &self.config
    }

    pub fn projection(&self) -> &FlatProjection {
        &self.projection
    }

    /// The origin of the last successful solve.
    pub fn origin(&self) -> Option<AGeoPoint> {
        self.origin
    }

    pub fn tree(&self) -> &FanTree {
        &self.tree
    }

    /// Discard the solved reach.
    pub fn reset(&mut self) {
        self.tree.clear();
        self.origin = None;
    }

    /// Build the reach from `origin`, replacing any previous one.
    ///
    /// Returns `false` if the origin is invalid, the configuration is invalid, or nothing is
    /// reachable.
    pub fn solve<P>(
        &mut self,
        origin: AGeoPoint,
        polar: &P,
        terrain: Option<&(dyn Terrain + Sync)>,
    ) -> bool
    where
        P: GlidePolar + Sync,
    {
        self.reset();

        if !origin.location.is_valid()
            || !origin.altitude.is_finite()
            || origin.altitude < i16::MIN as f64
            || origin.altitude > i16::MAX as f64
        {
            log::warn!("rejecting reach origin {:?}", origin);
            return false;
        }

        if let Err(e) = self.config.validate() {
            log::warn!("invalid reach config: {}", e);
            return false;
        }

        self.projection = FlatProjection::new(origin.location);
        let apex = AltitudeFlatPoint::new(FlatPoint::default(), clamp_altitude(origin.altitude));
        let parms = ReachFanParms {
            polar,
            terrain,
            projection: &self.projection,
            config: &self.config,
        };

        if !self.tree.fill_reach(apex, &parms) {
            log::debug!("no reach from {:?}", origin);
            return false;
        }

        log::debug!(
            "reach from {:?}: {} fans, depth {}",
            origin,
            self.tree.len(),
            self.tree.depth()
        );

        self.origin = Some(origin);
        true
    }

    /// Highest altitude (metres) `dest` can be arrived at, if it is reachable.
    pub fn find_positive_arrival<P>(&self, dest: GeoPoint, polar: &P) -> Option<i16>
    where
        P: GlidePolar + Sync,
    {
        if self.tree.is_empty() {
            return None;
        }

        let parms = ReachFanParms {
            polar,
            terrain: None,
            projection: &self.projection,
            config: &self.config,
        };
        self.tree
            .find_positive_arrival(self.projection.project(dest), &parms)
    }

    /// Test if `location` is reachable.
    ///
    /// With `turning`, glides that turn around terrain count, otherwise only the straight glide
    /// from the origin does.
    pub fn is_inside(&self, location: GeoPoint, turning: bool) -> bool {
        self.tree
            .is_inside_tree(self.projection.project(location), turning)
    }

    /// Visit the fans that overlap `bounds`.
    pub fn accept_in_range<V>(&self, bounds: &GeoBounds, visitor: &mut V)
    where
        V: TriangleFanVisitor + ?Sized,
    {
        let bounds = self.projection.project_bounds(bounds);
        self.tree
            .accept_in_range(bounds, &self.projection, visitor)
    }
}

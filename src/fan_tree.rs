//! A tree of triangle fans covering the area reachable in a glide.
//!
//! The root fan is rooted at the glide origin with rays sampled around the compass. Where terrain
//! shadows part of the interval between two rays, the shadow is cut out of the fan as a notch and
//! a child fan is grown from a _pivot_, a point along the clear ray beside the obstacle. Children
//! sample their sector at double the angular resolution of their parent.
use crate::*;
use rayon::prelude::*;

/// Handle into a [`FanTree`].
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct FanId(usize);

impl FanId {
    pub const ROOT: FanId = FanId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FanNode {
    pub fan: TriangleFan,
    pub apex: AltitudeFlatPoint,
    /// Polar indices (low, high) of the bounding rays.
    /// The root spans the whole revolution.
    pub sector: (u32, u32),
    /// Covers this fan and every descendant.
    pub bounds_children: FlatBoundingBox,
    pub children: Vec<FanId>,
    pub depth: u8,
}

/// Receives fans as loops of geodetic points.
pub trait TriangleFanVisitor {
    fn start_fan(&mut self);
    /// Start a fan whose apex is at `height` metres. Defaults to [`Self::start_fan`].
    fn start_fan_at(&mut self, height: i16) {
        let _ = height;
        self.start_fan();
    }
    fn add_point(&mut self, p: GeoPoint);
    fn end_fan(&mut self);
}

/// Collects each visited fan as a loop.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FanLoops {
    pub loops: Vec<Vec<GeoPoint>>,
}

impl FanLoops {
    pub fn into_loops(self) -> Vec<Vec<GeoPoint>> {
        self.loops
    }
}

impl TriangleFanVisitor for FanLoops {
    fn start_fan(&mut self) {
        self.loops.push(Vec::new());
    }

    fn add_point(&mut self, p: GeoPoint) {
        if let Some(l) = self.loops.last_mut() {
            l.push(p);
        }
    }

    fn end_fan(&mut self) {}
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FanTree {
    nodes: Vec<FanNode>,
}

/// The end of a glide along a bearing.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Glide {
    end: FlatPoint,
    /// Metres from the apex to `end`.
    distance: f64,
    /// Terrain (or the polar) stopped the glide short.
    blocked: bool,
}

/// Result of a failed gap test.
#[derive(Clone, Debug, PartialEq)]
struct Notch {
    /// Chord samples in order, blocked samples pulled back to their last clear point.
    points: Vec<FlatPoint>,
    /// Shortest blocked glide (metres).
    nearest: f64,
}

/// An interval between two rays that failed its gap test.
struct Gap {
    low: (u32, Glide),
    high: (u32, Glide),
    nearest: f64,
}

impl FanTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of fans.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> Option<&FanNode> {
        self.nodes.first()
    }

    pub fn get(&self, id: FanId) -> Option<&FanNode> {
        self.nodes.get(id.0)
    }

    /// All fans, parents before their children.
    pub fn nodes(&self) -> &[FanNode] {
        &self.nodes
    }

    /// Deepest level reached, the root is 0.
    pub fn depth(&self) -> u8 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or_default()
    }

    /// Rebuild the tree from `origin`.
    ///
    /// Returns `false` if the root fan is degenerate, in which case the tree is left empty.
    pub fn fill_reach(&mut self, origin: AltitudeFlatPoint, parms: &ReachFanParms) -> bool {
        self.clear();

        let config = parms.config;
        let stride = config.root_stride();
        let ray_count = config.root_rays;

        let rays = (0..ray_count)
            .into_par_iter()
            .map(|i| reach_intercept(i * stride, origin, parms))
            .collect::<Vec<_>>();

        let mut fan = TriangleFan::new(origin.altitude);
        let mut gaps = Vec::new();
        for i in 0..rays.len() {
            let j = (i + 1) % rays.len();
            let (e1, e2) = (rays[i], rays[j]);
            fan.add_point(e1.end);

            if let Some(notch) = check_gap(origin, e1.end, e2.end, parms) {
                log::trace!(
                    "root gap {}..{} blocked, nearest {:.0} m",
                    i as u32 * stride,
                    (i as u32 + 1) * stride,
                    notch.nearest
                );
                fan.extend(notch.points.iter().copied());
                gaps.push(Gap {
                    low: (i as u32 * stride, e1),
                    high: ((i as u32 + 1) * stride, e2),
                    nearest: notch.nearest,
                });
            }
        }

        // a closed loop, the last point may have wrapped onto the first
        if fan.len() > 1 && fan.vertices().first() == fan.vertices().last() {
            let mut vs = fan.vertices().to_vec();
            vs.pop();
            fan.clear();
            fan.extend(vs);
        }

        if fan.is_empty() {
            return false;
        }

        self.nodes.push(FanNode {
            bounds_children: fan.bounds(),
            fan,
            apex: origin,
            sector: (0, config.polar_steps()),
            children: Vec::new(),
            depth: 0,
        });

        let mut expanded = HashSet::default();
        expanded.insert(origin);
        for gap in gaps {
            self.grow_child(FanId::ROOT, gap, parms, &mut expanded);
        }

        true
    }

    /// Grow a child fan from the pivot of a blocked gap, if one is warranted.
    fn grow_child(
        &mut self,
        parent: FanId,
        gap: Gap,
        parms: &ReachFanParms,
        expanded: &mut HashSet<AltitudeFlatPoint>,
    ) {
        let config = parms.config;
        let node = &self.nodes[parent.0];
        let (apex, depth) = (node.apex, node.depth);
        let (low, high) = (gap.low.0, gap.high.0);

        if depth >= config.max_depth || high - low < 2 {
            log::trace!("gap {}..{} accepted at depth {}", low, high, depth);
            return;
        }

        // the pivot is on the longer ray, alongside the obstacle
        let (index, ray) = if gap.high.1.distance > gap.low.1.distance {
            gap.high
        } else {
            gap.low
        };
        let distance = gap.nearest.min(ray.distance);
        if distance < config.terrain_step {
            return;
        }

        let bearing = config.bearing(index);
        let altitude = apex.altitude as f64 - parms.polar.height_for_distance(bearing, distance);
        let pivot = AltitudeFlatPoint::new(
            point_along(apex.point, bearing, distance, parms.projection),
            clamp_altitude(altitude),
        )
        .rounded();

        if !expanded.insert(pivot) {
            return;
        }

        if let Some(child) = self.fill_reach_sector(pivot, low, high, depth + 1, parms, expanded) {
            let bounds = self.nodes[child.0].bounds_children;
            let node = &mut self.nodes[parent.0];
            node.children.push(child);
            node.bounds_children = node.bounds_children.union(bounds);
        }
    }

    /// Build a sector fan from `apex` spanning polar indices `low..=high`, and recurse into its
    /// blocked gaps.
    fn fill_reach_sector(
        &mut self,
        apex: AltitudeFlatPoint,
        low: u32,
        high: u32,
        depth: u8,
        parms: &ReachFanParms,
        expanded: &mut HashSet<AltitudeFlatPoint>,
    ) -> Option<FanId> {
        let mid = low + (high - low) / 2;
        let indices = [low, mid, high];
        let rays = indices.map(|i| reach_intercept(i, apex, parms));

        let mut fan = TriangleFan::new(apex.altitude);
        fan.add_point(apex.point);

        let mut gaps = Vec::new();
        for k in 0..2 {
            let (e1, e2) = (rays[k], rays[k + 1]);
            fan.add_point(e1.end);
            if let Some(notch) = check_gap(apex, e1.end, e2.end, parms) {
                log::trace!(
                    "gap {}..{} blocked at depth {}, nearest {:.0} m",
                    indices[k],
                    indices[k + 1],
                    depth,
                    notch.nearest
                );
                fan.extend(notch.points.iter().copied());
                gaps.push(Gap {
                    low: (indices[k], e1),
                    high: (indices[k + 1], e2),
                    nearest: notch.nearest,
                });
            }
        }
        fan.add_point(rays[2].end);

        if fan.is_empty() {
            return None;
        }

        let id = FanId(self.nodes.len());
        self.nodes.push(FanNode {
            bounds_children: fan.bounds(),
            fan,
            apex,
            sector: (low, high),
            children: Vec::new(),
            depth,
        });

        for gap in gaps {
            self.grow_child(id, gap, parms, expanded);
        }

        Some(id)
    }

    /// Test if `p` is inside the root fan, or any fan when `include_children` is set.
    pub fn is_inside_tree(&self, p: FlatPoint, include_children: bool) -> bool {
        !self.is_empty() && self.is_inside_node(FanId::ROOT, p, include_children)
    }

    fn is_inside_node(&self, id: FanId, p: FlatPoint, include_children: bool) -> bool {
        let node = &self.nodes[id.0];
        if !node.bounds_children.envelops(p) {
            return false;
        }

        if node.fan.is_inside(p) {
            return true;
        }

        include_children
            && node
                .children
                .iter()
                .any(|c| self.is_inside_node(*c, p, include_children))
    }

    /// The highest altitude any fan containing `p` can arrive at `p` with.
    ///
    /// `None` if no fan contains `p` with a non-negative arrival.
    pub fn find_positive_arrival(&self, p: FlatPoint, parms: &ReachFanParms) -> Option<i16> {
        let mut best = None;
        if !self.is_empty() {
            self.find_arrival_node(FanId::ROOT, p, parms, &mut best);
        }
        best.map(clamp_altitude)
    }

    fn find_arrival_node(
        &self,
        id: FanId,
        p: FlatPoint,
        parms: &ReachFanParms,
        best: &mut Option<f64>,
    ) {
        let node = &self.nodes[id.0];
        if !node.bounds_children.envelops(p) {
            return;
        }

        if node.fan.is_inside(p) || node.apex.point == p {
            let apex = node.apex.point;
            let distance = parms.projection.flat_to_metres(apex.mag_to(p));
            let h = node.fan.height() as f64
                - parms
                    .polar
                    .height_for_distance(apex.bearing_to(p), distance);
            if h >= 0.0 && best.map_or(true, |b| h > b) {
                *best = Some(h);
            }
        }

        for c in &node.children {
            self.find_arrival_node(*c, p, parms, best);
        }
    }

    /// Visit every fan whose bounds intersect `bounds`, parents before children.
    pub fn accept_in_range<V>(
        &self,
        bounds: FlatBoundingBox,
        projection: &FlatProjection,
        visitor: &mut V,
    ) where
        V: TriangleFanVisitor + ?Sized,
    {
        if !self.is_empty() {
            self.accept_node(FanId::ROOT, bounds, projection, visitor);
        }
    }

    fn accept_node<V>(
        &self,
        id: FanId,
        bounds: FlatBoundingBox,
        projection: &FlatProjection,
        visitor: &mut V,
    ) where
        V: TriangleFanVisitor + ?Sized,
    {
        let node = &self.nodes[id.0];
        if !node.bounds_children.intersects(bounds) {
            return;
        }

        if !node.fan.is_empty() && node.fan.bounds().intersects(bounds) {
            visitor.start_fan_at(node.fan.height());
            for v in node.fan.vertices() {
                visitor.add_point(projection.unproject(*v));
            }
            visitor.end_fan();
        }

        for c in &node.children {
            self.accept_node(*c, bounds, projection, visitor);
        }
    }
}

/// Glide along polar `index` from `apex` until terrain or height runs out.
fn reach_intercept(index: u32, apex: AltitudeFlatPoint, parms: &ReachFanParms) -> Glide {
    glide_along(apex, parms.config.bearing(index), None, parms)
}

/// Walk a glide along `bearing` in terrain steps.
///
/// Stops at the last point clear of terrain (plus the safety height), at the polar's full reach,
/// or at `limit` metres. Reaching less than `limit` is reported as blocked.
fn glide_along(
    apex: AltitudeFlatPoint,
    bearing: f64,
    limit: Option<f64>,
    parms: &ReachFanParms,
) -> Glide {
    let ReachFanParms {
        polar,
        terrain,
        projection,
        config,
    } = *parms;

    let top = apex.altitude as f64;
    let margin = config.safety_height;
    let full = polar.distance_for_height(bearing, top - margin);
    let target = limit.map_or(full, |l| l.min(full));
    let step = config.terrain_step.max(1.0);

    let (sin, cos) = bearing.to_radians().sin_cos();
    let [ax, ay] = apex.point.to_p2();
    let at = |s: f64| {
        let r = projection.metres_to_flat(s);
        [ax + r * sin, ay + r * cos]
    };

    let mut clear = 0.0;
    let mut s = step.min(target);
    while s > 0.0 {
        let altitude = top - polar.height_for_distance(bearing, s);
        let ground = crate::terrain::ground(terrain, projection.unproject_p2(at(s)));
        if altitude < ground + margin {
            return Glide {
                end: FlatPoint::from_p2(at(clear)),
                distance: clear,
                blocked: true,
            };
        }

        clear = s;
        if s >= target {
            break;
        }
        s = (s + step).min(target);
    }

    Glide {
        end: FlatPoint::from_p2(at(target)),
        distance: target,
        blocked: limit.map_or(false, |l| l > full + 1.0),
    }
}

/// Test the interval between two ray ends by gliding directly at points along the chord.
///
/// `None` if every sample is clear, otherwise the notch to cut into the fan.
fn check_gap(
    apex: AltitudeFlatPoint,
    e1: FlatPoint,
    e2: FlatPoint,
    parms: &ReachFanParms,
) -> Option<Notch> {
    let n = parms.config.gap_samples.max(1);
    let [x1, y1] = e1.to_p2();
    let [x2, y2] = e2.to_p2();
    let [ax, ay] = apex.point.to_p2();

    let mut points = Vec::with_capacity(n as usize);
    let mut nearest = None::<f64>;

    for k in 1..n {
        let t = k as f64 / n as f64;
        let q = [x1 + (x2 - x1) * t, y1 + (y2 - y1) * t];
        let (dx, dy) = (q[0] - ax, q[1] - ay);
        let metres = parms.projection.flat_to_metres(dx.hypot(dy));
        if metres < 1.0 {
            points.push(FlatPoint::from_p2(q));
            continue;
        }

        let bearing = dx.atan2(dy).to_degrees().rem_euclid(360.0);
        let glide = glide_along(apex, bearing, Some(metres), parms);
        if glide.blocked {
            nearest = Some(nearest.map_or(glide.distance, |d| d.min(glide.distance)));
            points.push(glide.end);
        } else {
            points.push(FlatPoint::from_p2(q));
        }
    }

    nearest.map(|nearest| Notch { points, nearest })
}

fn point_along(
    from: FlatPoint,
    bearing: f64,
    metres: f64,
    projection: &FlatProjection,
) -> FlatPoint {
    let r = projection.metres_to_flat(metres);
    let (sin, cos) = bearing.to_radians().sin_cos();
    FlatPoint::from_p2([from.x as f64 + r * sin, from.y as f64 + r * cos])
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ratio(f64);

    impl GlidePolar for Ratio {
        fn glide_ratio(&self, _: f64) -> f64 {
            self.0
        }
    }

    fn config() -> ReachConfig {
        ReachConfig {
            safety_height: 0.0,
            ..ReachConfig::default()
        }
    }

    fn origin() -> AltitudeFlatPoint {
        AltitudeFlatPoint::new(FlatPoint::default(), 1000)
    }

    fn proj() -> FlatProjection {
        FlatProjection::new(GeoPoint::new(147.0, -35.0))
    }

    /// A tall box of terrain in flat coordinates.
    fn ridge(proj: FlatProjection) -> impl Fn(GeoPoint) -> Option<f64> + Sync {
        move |p| {
            let [x, y] = proj.project_p2(p);
            let inside = (524.0..=1219.0).contains(&x) && (10_000.0..=12_000.0).contains(&y);
            Some(if inside { 3000.0 } else { 0.0 })
        }
    }

    #[test]
    fn flat_terrain_accepts_gaps() {
        let (polar, proj, config) = (Ratio(40.0), proj(), config());
        let flat = |_: GeoPoint| Some(0.0);
        let parms = ReachFanParms {
            polar: &polar,
            terrain: Some(&flat),
            projection: &proj,
            config: &config,
        };

        let e1 = reach_intercept(0, origin(), &parms);
        let e2 = reach_intercept(config.root_stride(), origin(), &parms);
        assert!(!e1.blocked && !e2.blocked);
        assert_eq!(e1.end, FlatPoint::new(0, 40_000));
        assert!((e2.distance - 40_000.0).abs() < 1e-6);
        assert_eq!(check_gap(origin(), e1.end, e2.end, &parms), None);

        let mut tree = FanTree::new();
        assert!(tree.fill_reach(origin(), &parms));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().map(|r| r.fan.len()), Some(36));
    }

    #[test]
    fn ridge_forces_one_child() {
        let (polar, proj, config) = (Ratio(40.0), proj(), config());
        let terrain = ridge(proj);
        let parms = ReachFanParms {
            polar: &polar,
            terrain: Some(&terrain),
            projection: &proj,
            config: &config,
        };

        let mut tree = FanTree::new();
        assert!(tree.fill_reach(origin(), &parms));
        assert_eq!(tree.len(), 2);

        let root = tree.root().unwrap();
        assert_eq!(root.children, vec![FanId(1)]);

        let child = tree.get(FanId(1)).unwrap();
        assert_eq!(child.sector, (0, config.root_stride()));
        assert_eq!(child.depth, 1);
        assert_eq!(child.apex.point, FlatPoint::new(0, 10_000));
        assert_eq!(child.apex.altitude, 750);
        assert!(child.children.is_empty());
        assert!(root.bounds_children.union(child.fan.bounds()) == root.bounds_children);

        // behind the ridge
        let p = FlatPoint::new(900, 16_000);
        assert!(!tree.is_inside_tree(p, false));
        assert!(tree.is_inside_tree(p, true));

        let arrival = tree.find_positive_arrival(p, &parms).unwrap();
        let coarse = 1000.0 - FlatPoint::default().mag_to(p) / 40.0;
        assert!((arrival as f64) < coarse, "{} !< {}", arrival, coarse);
        assert_eq!(arrival, 598);
    }

    #[test]
    fn blocked_glides_stop_short() {
        let (polar, proj, config) = (Ratio(40.0), proj(), config());
        let terrain = ridge(proj);
        let parms = ReachFanParms {
            polar: &polar,
            terrain: Some(&terrain),
            projection: &proj,
            config: &config,
        };

        // straight through the ridge
        let g = glide_along(origin(), 5.0, None, &parms);
        assert!(g.blocked);
        assert_eq!(g.distance, 10_000.0);

        // a glide at a limit short of the ridge is clear
        let g = glide_along(origin(), 5.0, Some(5_000.0), &parms);
        assert!(!g.blocked);

        // beyond what the polar allows
        let g = glide_along(origin(), 90.0, Some(50_000.0), &parms);
        assert!(g.blocked);
        assert_eq!(g.distance, 40_000.0);
    }

    #[test]
    fn too_low_is_degenerate() {
        let polar = Ratio(40.0);
        let proj = proj();
        let config = ReachConfig::default(); // 150 m safety height
        let parms = ReachFanParms {
            polar: &polar,
            terrain: None,
            projection: &proj,
            config: &config,
        };

        let mut tree = FanTree::new();
        let low = AltitudeFlatPoint::new(FlatPoint::default(), 100);
        assert!(!tree.fill_reach(low, &parms));
        assert!(tree.is_empty());
        assert!(!tree.is_inside_tree(FlatPoint::default(), true));
        assert_eq!(tree.find_positive_arrival(FlatPoint::default(), &parms), None);
    }

    #[test]
    fn visiting_fans() {
        let (polar, proj, config) = (Ratio(40.0), proj(), config());
        let terrain = ridge(proj);
        let parms = ReachFanParms {
            polar: &polar,
            terrain: Some(&terrain),
            projection: &proj,
            config: &config,
        };

        let mut tree = FanTree::new();
        tree.fill_reach(origin(), &parms);

        let everything = FlatBoundingBox::from_min_max(
            FlatPoint::new(-50_000, -50_000),
            FlatPoint::new(50_000, 50_000),
        );
        let mut loops = FanLoops::default();
        tree.accept_in_range(everything, &proj, &mut loops);
        assert_eq!(loops.loops.len(), 2);
        assert_eq!(loops.loops[1].len(), tree.nodes()[1].fan.len());

        // south of the origin only the root is in range
        let south = FlatBoundingBox::from_min_max(
            FlatPoint::new(-1_000, -30_000),
            FlatPoint::new(1_000, -20_000),
        );
        let mut loops = FanLoops::default();
        tree.accept_in_range(south, &proj, &mut loops);
        assert_eq!(loops.into_loops().len(), 1);
    }
}

use crate::*;

/// A closed loop of flat points, all reachable at or above a reference `height`.
///
/// For a fan rooted at the glide origin the loop is just the ray end points. A fan grown around
/// an obstacle starts with its apex. Either way it is tested as a (possibly non-convex) polygon.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TriangleFan {
    vertices: Vec<FlatPoint>,
    bounds: FlatBoundingBox,
    height: i16,
}

impl TriangleFan {
    pub fn new(height: i16) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    /// Altitude (metres) of the fan's apex, arrival heights are measured from here.
    pub fn height(&self) -> i16 {
        self.height
    }

    pub fn vertices(&self) -> &[FlatPoint] {
        &self.vertices
    }

    pub fn bounds(&self) -> FlatBoundingBox {
        self.bounds
    }

    /// Append a vertex. A vertex equal to the previous one is skipped.
    pub fn add_point(&mut self, p: FlatPoint) {
        if self.push(p) {
            self.calc_bb();
        }
    }

    /// Append each vertex, skipping consecutive duplicates.
    pub fn extend<I>(&mut self, ps: I)
    where
        I: IntoIterator<Item = FlatPoint>,
    {
        for p in ps {
            self.push(p);
        }
        self.calc_bb();
    }

    /// Insert vertices before position `at`. Consecutive duplicates are skipped.
    pub fn insert_points<I>(&mut self, at: usize, ps: I)
    where
        I: IntoIterator<Item = FlatPoint>,
    {
        let tail = self.vertices.split_off(at.min(self.vertices.len()));
        self.extend(ps.into_iter().chain(tail));
    }

    fn push(&mut self, p: FlatPoint) -> bool {
        let dup = self.vertices.last() == Some(&p);
        if !dup {
            self.vertices.push(p);
        }
        !dup
    }

    /// Recompute the bounds from the vertices. Every vertex change goes through here.
    pub fn calc_bb(&mut self) {
        self.bounds = self.vertices.iter().copied().collect();
    }

    /// Fewer than 3 vertices has no area, and contains nothing.
    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 3
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.bounds = FlatBoundingBox::zero();
    }

    pub fn is_inside(&self, p: FlatPoint) -> bool {
        !self.is_empty() && self.bounds.envelops(p) && polygon::point_inside(&self.vertices, p)
    }
}

/// The _plan_ area in squared projected units.
impl Area for TriangleFan {
    fn area(&self) -> f64 {
        (polygon::signed_area2(&self.vertices) as f64 / 2.0).abs()
    }
}

impl Envelops<FlatPoint> for TriangleFan {
    fn envelops(&self, p: FlatPoint) -> bool {
        self.is_inside(p)
    }
}

use crate::*;

/// Integer axis aligned bounding box in flat-earth space.
///
/// Like the float extents it is stored as an `origin` (the minimum corner) and a `size`.
/// Bounds are _inclusive_ of the maximum corner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FlatBoundingBox {
    pub origin: FlatPoint,
    pub size: FlatPoint,
}

impl FlatBoundingBox {
    /// A zero-sized box about `p`.
    pub fn at(p: FlatPoint) -> Self {
        Self {
            origin: p,
            size: FlatPoint::default(),
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_min_max(min: FlatPoint, max: FlatPoint) -> Self {
        let size = max - min;
        Self { origin: min, size }
    }

    pub fn min(&self) -> FlatPoint {
        self.origin
    }

    pub fn max(&self) -> FlatPoint {
        self.origin + self.size
    }

    /// Returns if the box covers no area (a point or a line).
    pub fn is_degenerate(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }

    pub fn union(self, other: Self) -> Self {
        let (a, b) = (self.max(), other.max());
        let origin = FlatPoint::new(
            self.origin.x.min(other.origin.x),
            self.origin.y.min(other.origin.y),
        );
        let max = FlatPoint::new(a.x.max(b.x), a.y.max(b.y));
        Self::from_min_max(origin, max)
    }

    pub fn intersects(self, other: Self) -> bool {
        let (a, b) = (self.max(), other.max());
        let outside = a.x < other.origin.x
            || a.y < other.origin.y
            || self.origin.x > b.x
            || self.origin.y > b.y;

        !outside
    }

    /// Expand the box by a value in each direction.
    ///
    /// A negative value can be used to _shrink_ the box.
    /// Shrinking beyond `size / 2` will result in a zero-sized box about the centre.
    ///
    /// # Example
    /// ```rust
    /// # use glide_reach::*;
    /// let b = FlatBoundingBox::from_min_max(FlatPoint::new(0, 0), FlatPoint::new(10, 10));
    ///
    /// assert_eq!(b.expand(5), FlatBoundingBox {
    ///     origin: FlatPoint::new(-5, -5),
    ///     size: FlatPoint::new(20, 20),
    /// });
    /// ```
    pub fn expand(self, by: i32) -> Self {
        let size = self.size + FlatPoint::new(by * 2, by * 2);
        if size.x < 0 || size.y < 0 {
            return Self::at(self.centre());
        }

        let origin = self.origin - FlatPoint::new(by, by);
        Self { origin, size }
    }

    pub fn centre(&self) -> FlatPoint {
        self.origin + FlatPoint::new(self.size.x / 2, self.size.y / 2)
    }
}

/// Builds the tightest box about the points.
/// If the iterator is empty, a zero-sized box about the origin is returned.
impl FromIterator<FlatPoint> for FlatBoundingBox {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = FlatPoint>,
    {
        let mut iter = iter.into_iter();
        let Some(init) = iter.next() else { return Self::zero(); };

        let (min, max) = iter.fold((init, init), |(min, max), p| {
            (
                FlatPoint::new(min.x.min(p.x), min.y.min(p.y)),
                FlatPoint::new(max.x.max(p.x), max.y.max(p.y)),
            )
        });

        Self::from_min_max(min, max)
    }
}

/// Build the union of an iterator of boxes.
/// If the iterator is empty, a zero-sized box about the origin is returned.
impl FromIterator<Self> for FlatBoundingBox {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Self>,
    {
        iter.into_iter()
            .reduce(FlatBoundingBox::union)
            .unwrap_or_else(FlatBoundingBox::zero)
    }
}

impl Envelops<FlatPoint> for FlatBoundingBox {
    fn envelops(&self, p: FlatPoint) -> bool {
        let FlatPoint { x, y } = p;

        if x < self.origin.x || y < self.origin.y {
            return false;
        }

        let max = self.max();

        x <= max.x && y <= max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    type B = ((i16, i16), (i16, i16));

    fn to_b(((ax, ay), (bx, by)): B) -> FlatBoundingBox {
        [
            FlatPoint::new(ax as i32, ay as i32),
            FlatPoint::new(bx as i32, by as i32),
        ]
        .into_iter()
        .collect()
    }

    #[quickcheck]
    fn intersects_commutative(a: B, b: B) -> bool {
        let (a, b) = (to_b(a), to_b(b));
        a.intersects(b) == b.intersects(a)
    }

    #[quickcheck]
    fn union_envelops_both(a: B, b: B) -> bool {
        let (a, b) = (to_b(a), to_b(b));
        let u = a.union(b);
        [a.min(), a.max(), b.min(), b.max()]
            .into_iter()
            .all(|p| u.envelops(p))
    }

    #[quickcheck]
    fn from_points_envelops_all(ps: Vec<(i16, i16)>) -> TestResult {
        if ps.is_empty() {
            return TestResult::discard();
        }
        let ps = ps
            .into_iter()
            .map(|(x, y)| FlatPoint::new(x as i32, y as i32))
            .collect::<Vec<_>>();
        let b = ps.iter().copied().collect::<FlatBoundingBox>();
        TestResult::from_bool(ps.into_iter().all(|p| b.envelops(p)))
    }

    #[test]
    fn intersection_tests() {
        let a = FlatBoundingBox::from_min_max(FlatPoint::new(0, 0), FlatPoint::new(10, 10));
        let b = FlatBoundingBox {
            origin: FlatPoint::new(0, 20),
            size: FlatPoint::new(10, 10),
        };
        assert!(!a.intersects(b));

        let c = FlatBoundingBox {
            origin: FlatPoint::new(10, 10),
            size: FlatPoint::new(1, 1),
        };
        assert!(a.intersects(c)); // touching corners
    }

    #[test]
    fn envelops_is_inclusive() {
        let a = FlatBoundingBox::from_min_max(FlatPoint::new(-5, -5), FlatPoint::new(5, 5));
        assert!(a.envelops(FlatPoint::new(5, 5)));
        assert!(a.envelops(FlatPoint::new(-5, 0)));
        assert!(!a.envelops(FlatPoint::new(6, 0)));
        assert!(!a.envelops(FlatPoint::new(0, -6)));

        let p = FlatBoundingBox::at(FlatPoint::new(1, 1));
        assert!(p.is_degenerate());
        assert!(p.envelops(FlatPoint::new(1, 1)));
    }

    #[test]
    fn expand_test() {
        let e = FlatBoundingBox::from_min_max(FlatPoint::new(0, 0), FlatPoint::new(10, 10));

        assert_eq!(
            e.expand(-2),
            FlatBoundingBox {
                origin: FlatPoint::new(2, 2),
                size: FlatPoint::new(6, 6),
            }
        );

        assert_eq!(e.expand(-8), FlatBoundingBox::at(FlatPoint::new(5, 5)));
    }

    #[test]
    fn union_of_nothing_is_zero() {
        let u = std::iter::empty::<FlatBoundingBox>().collect::<FlatBoundingBox>();
        assert_eq!(u, FlatBoundingBox::zero());
    }
}

use crate::*;

/// Test if a point is _inside_ a polygon, represented by a loop of points.
///
/// Uses a winding counting number test, so non-convex (but simple) loops are fine.
/// The loop is implicitly closed. Fewer than 3 points is not a polygon and is never
/// inside.
pub fn point_inside(ps: &[FlatPoint], point: FlatPoint) -> bool {
    use std::iter::*;

    if ps.len() < 3 {
        return false;
    }

    /// Test if a point is on a line.
    /// > 0 : p is left of line
    /// = 0 : p is on line
    /// < 0 : p is right of line
    fn on((from, to): (FlatPoint, FlatPoint), p: FlatPoint) -> i64 {
        (to - from).cross(p - from)
    }

    let one_off = ps.len() - 1;
    let segments = ps[..one_off]
        .iter()
        .zip(ps[1..].iter())
        .chain(once((&ps[one_off], &ps[0])))
        .map(|(a, b)| (*a, *b));

    let mut winding = 0;

    let pointy = point.y;
    for (from, to) in segments {
        if from.y <= pointy {
            if to.y > pointy && on((from, to), point) > 0 {
                winding += 1;
            }
        } else if to.y <= pointy && on((from, to), point) < 0 {
            winding -= 1;
        }
    }

    winding != 0
}

/// Twice the signed area of a loop (positive when counter-clockwise).
pub fn signed_area2(ps: &[FlatPoint]) -> i64 {
    if ps.len() < 3 {
        return 0;
    }

    ps.iter()
        .zip(ps.iter().skip(1).chain(std::iter::once(&ps[0])))
        .map(|(a, b)| a.cross(*b))
        .sum()
}

//! Glide reachability over terrain, and the search structures behind it.
use rustc_hash::FxHashMap as HashMap;
use rustc_hash::FxHashSet as HashSet;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

mod dijkstra;
mod extents;
mod fan;
mod fan_tree;
mod grid;
#[cfg(feature = "io")]
pub mod io;
mod point;
mod polar;
pub mod polygon;
mod projection;
mod reach;
mod terrain;

pub use dijkstra::*;
pub use extents::*;
pub use fan::*;
pub use fan_tree::*;
pub use grid::*;
pub use point::*;
pub use polar::*;
pub use projection::*;
pub use reach::*;
pub use terrain::*;

pub trait Envelops<O> {
    fn envelops(&self, object: O) -> bool;
}

/// Area can be calculated from an object.
///
/// Note that area is contextual from the object.
/// For instance, a [`TriangleFan`] is the _plan_ area in projected units.
/// If implementing this trait be sure to be **explicit** about the area being calculated.
pub trait Area {
    /// Calculate the area of an object.
    fn area(&self) -> f64;
}

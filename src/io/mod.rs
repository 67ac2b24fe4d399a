//! Data interop: terrain tiles and polar files in, reach footprints out.
use crate::*;
use std::{error::Error, io::Cursor};

pub mod hgt;
pub mod polar;
pub mod reach;

type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

fn to_dxf_point([x, y, z]: [f64; 3]) -> ::dxf::Point {
    ::dxf::Point { x, y, z }
}

fn to_polyline(
    drawing: &mut ::dxf::Drawing,
    ps: impl Iterator<Item = [f64; 3]>,
) -> ::dxf::entities::Polyline {
    let mut polyline = ::dxf::entities::Polyline::default();

    let vertices = ps.map(to_dxf_point).map(::dxf::entities::Vertex::new);

    for vertex in vertices {
        polyline.add_vertex(drawing, vertex);
    }

    polyline.set_is_3d_polyline(true);
    polyline.set_is_closed(true);

    polyline
}

use super::*;

pub const LAYER: &str = "reach";

/// Write each fan overlapping `bounds` as a closed 3D polyline on the `reach` layer.
///
/// Coordinates are metres in the reach's projection (centred on the origin) and each loop sits
/// at its fan's height.
pub fn to_dxf(reach: &ReachFan, bounds: &GeoBounds) -> Vec<u8> {
    let mut w = DxfFans {
        drawing: ::dxf::Drawing::new(),
        projection: *reach.projection(),
        height: 0.0,
        vertices: Vec::new(),
    };
    reach.accept_in_range(bounds, &mut w);

    let mut d = w.drawing;
    d.normalize();
    let mut buf = Vec::new();
    d.save(&mut buf).expect("writing dxf to memory buffer");

    buf
}

struct DxfFans {
    drawing: ::dxf::Drawing,
    projection: FlatProjection,
    height: f64,
    vertices: Vec<[f64; 3]>,
}

impl TriangleFanVisitor for DxfFans {
    fn start_fan(&mut self) {
        self.start_fan_at(0);
    }

    fn start_fan_at(&mut self, height: i16) {
        self.height = height as f64;
        self.vertices.clear();
    }

    fn add_point(&mut self, p: GeoPoint) {
        let proj = &self.projection;
        let [x, y] = proj.project(p).to_p2().map(|v| proj.flat_to_metres(v));
        self.vertices.push([x, y, self.height]);
    }

    fn end_fan(&mut self) {
        use ::dxf::entities::*;

        let ps = std::mem::take(&mut self.vertices);
        let polyline = to_polyline(&mut self.drawing, ps.into_iter());
        let mut entity = Entity::new(EntityType::Polyline(polyline));
        entity.common.layer = LAYER.to_string();
        self.drawing.add_entity(entity);
    }
}

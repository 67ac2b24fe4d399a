//! SRTM `.hgt` terrain tiles.
//!
//! A tile is a square of big-endian `i16` elevations covering 1° × 1°, rows running north to
//! south. The filename encodes the south-west corner, eg `N45E006.hgt`.
use super::*;
use byteorder::{ReadBytesExt, BE};

/// Void value (no data).
pub const HGT_VOID: i16 = -32768;

/// Decode a tile with its south-west corner at `south_west`.
///
/// 3 arc-second (1201²) and 1 arc-second (3601²) tiles are supported.
pub fn from_hgt(hgt: &[u8], south_west: GeoPoint) -> Result<TerrainGrid> {
    let side = match hgt.len() {
        n if n == 1201 * 1201 * 2 => 1201,
        n if n == 3601 * 3601 * 2 => 3601,
        n => return Err(format!("unexpected hgt size: {} bytes", n).into()),
    };

    let mut grid = TerrainGrid::new(south_west, side, side, 1.0 / (side - 1) as f64);
    let mut c = Cursor::new(hgt);

    // rows are north first
    for row in 0..side {
        let y = side - 1 - row;
        for x in 0..side {
            let z = c.read_i16::<BE>()?;
            grid.set(x, y, (z != HGT_VOID).then_some(z));
        }
    }

    log::debug!(
        "decoded {0}x{0} hgt tile at {1:?}, {2} voids",
        side,
        south_west,
        grid.len() - grid.len_nonempty()
    );

    Ok(grid)
}

/// South-west corner from a tile name like `N45E006.hgt` or `s10w045`.
pub fn tile_south_west(name: &str) -> Result<GeoPoint> {
    let stem = name.split('.').next().unwrap_or(name);
    let bad = || format!("cannot parse hgt tile name '{}'", name);

    if stem.len() != 7 || !stem.is_ascii() {
        return Err(bad().into());
    }

    let lat_sign = match &stem[0..1] {
        "N" | "n" => 1.0,
        "S" | "s" => -1.0,
        _ => return Err(bad().into()),
    };
    let lon_sign = match &stem[3..4] {
        "E" | "e" => 1.0,
        "W" | "w" => -1.0,
        _ => return Err(bad().into()),
    };
    let lat: f64 = stem[1..3].parse().map_err(|_| bad())?;
    let lon: f64 = stem[4..7].parse().map_err(|_| bad())?;

    Ok(GeoPoint::new(lon * lon_sign, lat * lat_sign))
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn tile(f: impl Fn(usize, usize) -> i16) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1201 * 1201 * 2);
        for row in 0..1201 {
            for col in 0..1201 {
                buf.write_i16::<BE>(f(row, col)).unwrap();
            }
        }
        buf
    }

    #[test]
    fn decoding_a_tile() {
        let bytes = tile(|row, col| match (row, col) {
            (0, 0) => 1000,
            (1200, 0) => 10,
            (600, 600) => HGT_VOID,
            _ => -5,
        });

        let g = from_hgt(&bytes, GeoPoint::new(6.0, 45.0)).unwrap();
        assert_eq!(g.x_count(), 1201);
        assert_eq!(g.y_count(), 1201);
        assert_eq!(g.spacing(), 1.0 / 1200.0);
        assert_eq!(g.len_nonempty(), 1201 * 1201 - 1);

        // first row is the northern edge
        assert_eq!(g.get(0, 1200), Some(1000));
        assert_eq!(g.get(0, 0), Some(10));
        assert_eq!(g.get(600, 600), None);
        assert_eq!(g.get(1, 1), Some(-5));

        let ne = g.bounds().north_east;
        assert!((ne.longitude - 7.0).abs() < 1e-9);
        assert!((ne.latitude - 46.0).abs() < 1e-9);
        assert_eq!(g.elevation_at(GeoPoint::new(6.0, 46.0)), Some(1000.0));
    }

    #[test]
    fn bad_sizes() {
        assert!(from_hgt(&[0; 100], GeoPoint::default()).is_err());
        assert!(from_hgt(&[], GeoPoint::default()).is_err());
    }

    #[test]
    fn tile_names() {
        assert_eq!(tile_south_west("N45E006.hgt").unwrap(), GeoPoint::new(6.0, 45.0));
        assert_eq!(tile_south_west("s10w045").unwrap(), GeoPoint::new(-45.0, -10.0));
        assert!(tile_south_west("X45E006.hgt").is_err());
        assert!(tile_south_west("N4E006.hgt").is_err());
        assert!(tile_south_west("N45E0x6.hgt").is_err());
    }
}

use crate::*;

/// A geodetic elevation raster.
///
/// The grid is evenly spaced (in degrees) in longitude and latitude, with sample `0,0` at the
/// south-west corner. Elevations are whole metres, `None` where the source has no data.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TerrainGrid {
    /// The location of sample 0,0.
    south_west: GeoPoint,

    /// The **X** (longitude) count, such that the samples are stored row-first.
    stride: usize,

    /// Degrees between samples in one axis.
    spacing: f64,

    zs: Vec<Option<i16>>,
}

impl TerrainGrid {
    /// Create a new, empty, grid with the given south-west corner, size, and spacing.
    pub fn new(south_west: GeoPoint, x_count: usize, y_count: usize, spacing: f64) -> Self {
        Self {
            south_west,
            stride: x_count,
            spacing,
            zs: vec![None; x_count * y_count],
        }
    }

    pub fn south_west(&self) -> GeoPoint {
        self.south_west
    }

    /// The geodetic bounds covered by the samples.
    pub fn bounds(&self) -> GeoBounds {
        let w = self.x_count().saturating_sub(1) as f64 * self.spacing;
        let h = self.y_count().saturating_sub(1) as f64 * self.spacing;
        let sw = self.south_west;
        GeoBounds::new(sw, GeoPoint::new(sw.longitude + w, sw.latitude + h))
    }

    /// The number of samples along a row (longitude).
    pub fn x_count(&self) -> usize {
        self.stride
    }

    /// The number of rows (latitude).
    pub fn y_count(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.zs.len() / self.stride
        }
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// The _size_ of the grid, this **includes** empty samples.
    pub fn len(&self) -> usize {
        self.zs.len()
    }

    /// The number of samples that are **not** `None`.
    pub fn len_nonempty(&self) -> usize {
        self.zs.iter().filter(|x| x.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.zs.is_empty()
    }

    /// Location of the `x` and `y` indices, whether or not the sample exists.
    pub fn get_location(&self, x: usize, y: usize) -> GeoPoint {
        GeoPoint::new(
            self.south_west.longitude + x as f64 * self.spacing,
            self.south_west.latitude + y as f64 * self.spacing,
        )
    }

    /// The sample at `x, y`. Out of bounds is `None`.
    pub fn get(&self, x: usize, y: usize) -> Option<i16> {
        self.idx(x, y).and_then(|i| self.zs[i])
    }

    /// Set a sample. Out of bounds indices are ignored.
    pub fn set(&mut self, x: usize, y: usize, z: impl Into<Option<i16>>) {
        if let Some(i) = self.idx(x, y) {
            self.zs[i] = z.into();
        }
    }

    fn idx(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.stride && y < self.y_count()).then(|| self.stride * y + x)
    }

    /// Elevation at a location.
    ///
    /// Bilinear between the four surrounding samples when they all exist, otherwise the nearest
    /// sample. Outside the grid is `None`.
    pub fn sample(&self, location: GeoPoint) -> Option<f64> {
        if self.is_empty() || self.spacing <= 0.0 {
            return None;
        }

        let fx = (location.longitude - self.south_west.longitude) / self.spacing;
        let fy = (location.latitude - self.south_west.latitude) / self.spacing;
        let xmax = (self.x_count() - 1) as f64;
        let ymax = (self.y_count() - 1) as f64;
        if !(0.0..=xmax).contains(&fx) || !(0.0..=ymax).contains(&fy) {
            return None;
        }

        let (x0, y0) = (fx.floor() as usize, fy.floor() as usize);
        let x1 = (x0 + 1).min(self.x_count() - 1);
        let y1 = (y0 + 1).min(self.y_count() - 1);

        let corners = [
            self.get(x0, y0),
            self.get(x1, y0),
            self.get(x0, y1),
            self.get(x1, y1),
        ];

        match corners {
            [Some(a), Some(b), Some(c), Some(d)] => {
                let [a, b, c, d] = [a, b, c, d].map(f64::from);
                let (tx, ty) = (fx - x0 as f64, fy - y0 as f64);
                let bottom = a + (b - a) * tx;
                let top = c + (d - c) * tx;
                Some(bottom + (top - bottom) * ty)
            }
            _ => self
                .get(fx.round() as usize, fy.round() as usize)
                .map(f64::from),
        }
    }

    /// Downsample the grid by _dropping_ `skip` samples between samples.
    ///
    /// Note that a `skip` of 0 just returns the grid.
    pub fn downsample(self, skip: usize) -> Self {
        if skip == 0 {
            return self;
        }

        let Self {
            south_west,
            stride,
            spacing,
            mut zs,
        } = self;

        // retain visits elements in order exactly once, so an index can track the x,y
        // a sample is kept when both x and y are multiples of (skip + 1)
        let mut idx = 0;
        let modby = skip + 1;
        zs.retain(|_| {
            let i = idx;
            idx += 1;

            let y = i / stride;
            if y % modby != 0 {
                return false;
            }

            let x = i.saturating_sub(y * stride);
            x % modby == 0
        });

        let stride = (stride + skip) / modby;
        let spacing = spacing * modby as f64;

        Self {
            south_west,
            stride,
            spacing,
            zs,
        }
    }
}

//! Glider polar files.
//!
//! One data line of comma separated values:
//! `mass, max_ballast, v1, w1, v2, w2, v3, w3[, wing_area]`
//! with mass in kg, ballast in litres, speeds in km/h, sink rates in m/s (negative) and wing area
//! in m². Lines starting with `*` or `#` are comments.
use super::*;

/// A polar as written in a polar file.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PolarInfo {
    pub reference_mass: f64,
    pub max_ballast: f64,
    /// `(km/h, m/s)` pairs.
    pub points: [(f64, f64); 3],
    pub wing_area: Option<f64>,
}

impl PolarInfo {
    pub fn to_route_polar(&self) -> Result<RoutePolar> {
        let points = self.points.map(|(v, w)| (v / 3.6, w));
        RoutePolar::from_3vw(points).map_err(Into::into)
    }
}

pub fn from_polar_file(text: &str) -> Result<PolarInfo> {
    fn de(s: &str) -> std::result::Result<Vec<f64>, nom::Err<()>> {
        use nom::{
            character::complete::*, combinator::*, multi::*, number::complete::*, sequence::*,
            IResult,
        };

        fn comma(i: &str) -> IResult<&str, char, ()> {
            delimited(space0, char(','), space0)(i)
        }

        let (_, fields) = all_consuming(delimited(
            space0,
            separated_list1(comma, double),
            space0,
        ))(s)?;

        Ok(fields)
    }

    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !(l.is_empty() || l.starts_with('*') || l.starts_with('#')))
        .ok_or("polar file has no data line")?;

    let fs = de(line).map_err(|_| format!("malformed polar line '{}'", line))?;

    match fs.as_slice() {
        &[mass, ballast, v1, w1, v2, w2, v3, w3, ref rest @ ..] if rest.len() <= 1 => Ok(PolarInfo {
            reference_mass: mass,
            max_ballast: ballast,
            points: [(v1, w1), (v2, w2), (v3, w3)],
            wing_area: rest.first().copied(),
        }),
        _ => Err(format!("expecting 8 or 9 polar values, found {}", fs.len()).into()),
    }
}

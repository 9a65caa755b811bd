use std::fmt;

use smallvec::SmallVec;

use super::{format_float, MapValue, Value};
use crate::error::{CypherError, Result};

const EARTH_RADIUS_METERS: f64 = 6_378_140.0;

/// Coordinate reference system of a point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Crs {
    /// 2D cartesian, SRID 7203.
    Cartesian,
    /// 3D cartesian, SRID 9157.
    Cartesian3D,
    /// 2D geographic, SRID 4326.
    Wgs84,
    /// 3D geographic, SRID 4979.
    Wgs84_3D,
}

impl Crs {
    /// Numeric SRID.
    pub fn srid(self) -> i64 {
        match self {
            Crs::Cartesian => 7203,
            Crs::Cartesian3D => 9157,
            Crs::Wgs84 => 4326,
            Crs::Wgs84_3D => 4979,
        }
    }

    /// Name used in literals.
    pub fn name(self) -> &'static str {
        match self {
            Crs::Cartesian => "cartesian",
            Crs::Cartesian3D => "cartesian-3d",
            Crs::Wgs84 => "wgs-84",
            Crs::Wgs84_3D => "wgs-84-3d",
        }
    }

    /// Number of coordinates.
    pub fn dimension(self) -> usize {
        match self {
            Crs::Cartesian | Crs::Wgs84 => 2,
            Crs::Cartesian3D | Crs::Wgs84_3D => 3,
        }
    }

    /// Whether coordinates are longitude/latitude.
    pub fn is_geographic(self) -> bool {
        matches!(self, Crs::Wgs84 | Crs::Wgs84_3D)
    }

    /// Looks a CRS up by SRID.
    pub fn from_srid(srid: i64) -> Option<Crs> {
        [Crs::Cartesian, Crs::Cartesian3D, Crs::Wgs84, Crs::Wgs84_3D]
            .into_iter()
            .find(|crs| crs.srid() == srid)
    }

    /// Looks a CRS up by name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Crs> {
        [Crs::Cartesian, Crs::Cartesian3D, Crs::Wgs84, Crs::Wgs84_3D]
            .into_iter()
            .find(|crs| crs.name().eq_ignore_ascii_case(name))
    }

    fn infer(geographic: bool, dimension: usize) -> Crs {
        match (geographic, dimension) {
            (false, 2) => Crs::Cartesian,
            (false, _) => Crs::Cartesian3D,
            (true, 2) => Crs::Wgs84,
            (true, _) => Crs::Wgs84_3D,
        }
    }
}

/// A point in some coordinate reference system.
#[derive(Clone, Debug, PartialEq)]
pub struct PointValue {
    crs: Crs,
    coords: SmallVec<[f64; 3]>,
}

impl PointValue {
    /// Creates a point; the coordinate count must match the CRS dimension.
    pub fn new(crs: Crs, coords: &[f64]) -> Result<Self> {
        if coords.len() != crs.dimension() {
            return Err(CypherError::invalid_argument(format!(
                "Cannot create point with {}D coordinate reference system and {} coordinates",
                crs.dimension(),
                coords.len()
            )));
        }
        if crs.is_geographic() && !(-90.0..=90.0).contains(&coords[1]) {
            return Err(CypherError::invalid_argument(
                "Cannot create WGS84 point with invalid coordinate: latitude must be in [-90, 90]",
            ));
        }
        Ok(Self {
            crs,
            coords: SmallVec::from_slice(coords),
        })
    }

    /// 2D cartesian point.
    pub fn cartesian(x: f64, y: f64) -> Self {
        Self {
            crs: Crs::Cartesian,
            coords: SmallVec::from_slice(&[x, y]),
        }
    }

    /// Coordinate reference system.
    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Raw coordinates.
    pub fn coordinates(&self) -> &[f64] {
        &self.coords
    }

    /// Builds a point from `x/y/z`, `longitude/latitude/height`, `crs` and `srid` keys.
    pub fn from_map(map: &MapValue) -> Result<Self> {
        let number = |key: &str| -> Result<Option<f64>> {
            match map.get(key) {
                Value::Undefined => Ok(None),
                v => v.as_f64().map(Some).ok_or_else(|| {
                    CypherError::invalid_argument(format!(
                        "Cannot assign non-numeric value {v} to point coordinate '{key}'"
                    ))
                }),
            }
        };
        let (coords, geographic) = match (number("x")?, number("y")?) {
            (Some(x), Some(y)) => {
                let mut coords: SmallVec<[f64; 3]> = SmallVec::from_slice(&[x, y]);
                coords.extend(number("z")?);
                (coords, false)
            }
            _ => match (number("longitude")?, number("latitude")?) {
                (Some(lon), Some(lat)) => {
                    let mut coords: SmallVec<[f64; 3]> = SmallVec::from_slice(&[lon, lat]);
                    coords.extend(number("height")?);
                    (coords, true)
                }
                _ => {
                    return Err(CypherError::invalid_argument(
                        "A point must contain either 'x' and 'y' or 'latitude' and 'longitude'",
                    ))
                }
            },
        };
        let crs = match (map.get("crs"), map.get("srid")) {
            (Value::Text(name), _) => Crs::from_name(&name).ok_or_else(|| {
                CypherError::invalid_argument(format!("Unknown coordinate reference system: {name}"))
            })?,
            (Value::Undefined, Value::Integer(srid)) => Crs::from_srid(srid).ok_or_else(|| {
                CypherError::invalid_argument(format!("Unknown coordinate reference system code: {srid}"))
            })?,
            (Value::Undefined, Value::Undefined) => Crs::infer(geographic, coords.len()),
            (crs, srid) => {
                return Err(CypherError::invalid_argument(format!(
                    "Invalid coordinate reference system: crs={crs}, srid={srid}"
                )))
            }
        };
        Self::new(crs, &coords)
    }

    /// Reads a named component (`x`, `latitude`, `crs`, `srid`, ...).
    pub fn field(&self, name: &str) -> Result<Value> {
        let geographic = self.crs.is_geographic();
        let coord = |idx: usize| self.coords.get(idx).copied().map(Value::Float);
        let value = match name.to_ascii_lowercase().as_str() {
            "x" => coord(0),
            "y" => coord(1),
            "z" => coord(2),
            "longitude" if geographic => coord(0),
            "latitude" if geographic => coord(1),
            "height" if geographic => coord(2),
            "crs" => Some(Value::text(self.crs.name())),
            "srid" => Some(Value::Integer(self.crs.srid())),
            _ => None,
        };
        value.ok_or_else(|| {
            CypherError::invalid_argument(format!(
                "No such field in {} point: {name}",
                self.crs.name()
            ))
        })
    }

    /// Distance to `other`, or `None` when the reference systems differ.
    ///
    /// Geographic points use the haversine formula on a spherical earth; the
    /// 3D variant combines it with the height difference.
    pub fn distance(&self, other: &PointValue) -> Option<f64> {
        if self.crs != other.crs {
            return None;
        }
        if !self.crs.is_geographic() {
            let sum: f64 = self
                .coords
                .iter()
                .zip(other.coords.iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            return Some(sum.sqrt());
        }
        let (lon1, lat1) = (self.coords[0].to_radians(), self.coords[1].to_radians());
        let (lon2, lat2) = (other.coords[0].to_radians(), other.coords[1].to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = lon2 - lon1;
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        let surface = EARTH_RADIUS_METERS * c;
        match (self.coords.get(2), other.coords.get(2)) {
            (Some(h1), Some(h2)) => Some((surface * surface + (h2 - h1) * (h2 - h1)).sqrt()),
            _ => Some(surface),
        }
    }

    /// Whether the point lies inside the box spanned by `lower_left` and
    /// `upper_right`, or `None` when reference systems differ.
    ///
    /// For geographic points a lower-left longitude east of the upper-right
    /// one describes a box crossing the antimeridian.
    pub fn within_bbox(&self, lower_left: &PointValue, upper_right: &PointValue) -> Option<bool> {
        if self.crs != lower_left.crs || self.crs != upper_right.crs {
            return None;
        }
        let inside = self.coords.iter().enumerate().all(|(idx, value)| {
            let (lo, hi) = (lower_left.coords[idx], upper_right.coords[idx]);
            if idx == 0 && self.crs.is_geographic() && lo > hi {
                *value >= lo || *value <= hi
            } else {
                lo <= *value && *value <= hi
            }
        });
        Some(inside)
    }
}

impl fmt::Display for PointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "point({{")?;
        for (name, value) in ["x", "y", "z"].iter().zip(self.coords.iter()) {
            write!(f, "{name}: {}, ", format_float(*value))?;
        }
        write!(f, "crs: '{}'}})", self.crs.name())
    }
}

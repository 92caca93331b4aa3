// src/region.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InputError;

/// Meters per degree of latitude, used for buffering in degrees.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Axis-aligned bounds in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BBox {
    pub fn intersects(&self, other: &BBox) -> bool {
        self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
    }

    /// Grow the box by `meters` on every side.
    ///
    /// Longitude degrees shrink towards the poles, so the east-west margin
    /// is scaled by the cosine of the box's central latitude.
    pub fn buffered(&self, meters: f64) -> BBox {
        if meters <= 0.0 {
            return *self;
        }
        let dlat = meters / METERS_PER_DEGREE;
        let mid_lat = ((self.min_lat + self.max_lat) / 2.0).to_radians();
        let dlon = meters / (METERS_PER_DEGREE * mid_lat.cos().max(1e-6));
        BBox {
            min_lon: self.min_lon - dlon,
            min_lat: self.min_lat - dlat,
            max_lon: self.max_lon + dlon,
            max_lat: self.max_lat + dlat,
        }
    }
}

/// Field boundary polygon, outer ring only, coordinates as `[lon, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct Region {
    ring: Vec<[f64; 2]>,
}

impl Region {
    /// Build a region from a ring of `[lon, lat]` pairs. The ring is closed
    /// if the last vertex does not repeat the first.
    pub fn new(mut ring: Vec<[f64; 2]>) -> Result<Self, InputError> {
        for &[lon, lat] in &ring {
            if !lon.is_finite() || !lat.is_finite() || lon.abs() > 180.0 || lat.abs() > 90.0 {
                return Err(InputError::BadCoordinate { lon, lat });
            }
        }

        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        ring.dedup();

        if ring.len() < 3 {
            return Err(InputError::TooFewVertices(ring.len()));
        }

        let first = ring[0];
        ring.push(first);
        Ok(Self { ring })
    }

    /// Parse a drawn boundary: a GeoJSON `Feature`, a `Polygon` geometry,
    /// or the bare `coordinates` array of a polygon.
    pub fn from_geojson(value: &Value) -> Result<Self, InputError> {
        let coordinates = match value {
            Value::Object(obj) => match obj.get("type").and_then(Value::as_str) {
                Some("Feature") => {
                    let geometry = obj
                        .get("geometry")
                        .ok_or_else(|| InputError::Geometry("feature without geometry".into()))?;
                    return Self::from_geojson(geometry);
                }
                Some("Polygon") => obj
                    .get("coordinates")
                    .ok_or_else(|| InputError::Geometry("polygon without coordinates".into()))?,
                Some(other) => return Err(InputError::Geometry(other.to_string())),
                None => return Err(InputError::Geometry("object without type".into())),
            },
            Value::Array(_) => value,
            _ => return Err(InputError::Geometry("expected object or array".into())),
        };

        // Polygon coordinates are a list of rings; accept a single bare ring too.
        let rings = coordinates
            .as_array()
            .ok_or_else(|| InputError::Geometry("coordinates must be an array".into()))?;
        let outer = match rings.first() {
            Some(Value::Array(inner)) if inner.first().map_or(false, Value::is_array) => inner,
            _ => rings,
        };

        let ring = outer
            .iter()
            .map(|pair| {
                let lon = pair.get(0).and_then(Value::as_f64);
                let lat = pair.get(1).and_then(Value::as_f64);
                match (lon, lat) {
                    (Some(lon), Some(lat)) => Ok([lon, lat]),
                    _ => Err(InputError::Geometry(format!("bad position {pair}"))),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(ring)
    }

    /// Closed ring, first vertex repeated at the end.
    pub fn ring(&self) -> &[[f64; 2]] {
        &self.ring
    }

    pub fn bbox(&self) -> BBox {
        let mut bbox = BBox {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        };
        for &[lon, lat] in &self.ring {
            bbox.min_lon = bbox.min_lon.min(lon);
            bbox.min_lat = bbox.min_lat.min(lat);
            bbox.max_lon = bbox.max_lon.max(lon);
            bbox.max_lat = bbox.max_lat.max(lat);
        }
        bbox
    }

    /// Even-odd ray casting test.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let mut inside = false;
        for edge in self.ring.windows(2) {
            let [x1, y1] = edge[0];
            let [x2, y2] = edge[1];
            if (y1 > lat) != (y2 > lat) {
                let x_cross = x1 + (lat - y1) * (x2 - x1) / (y2 - y1);
                if lon < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

impl TryFrom<Vec<[f64; 2]>> for Region {
    type Error = InputError;

    fn try_from(ring: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        Region::new(ring)
    }
}

impl From<Region> for Vec<[f64; 2]> {
    fn from(region: Region) -> Self {
        region.ring
    }
}

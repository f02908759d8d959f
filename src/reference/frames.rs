use std::f64::consts::FRAC_PI_4;

use crate::error::ReferenceError;
use crate::math::Point2;

use super::{Direction, Reprojector};

/// Semi-major axis of the WGS 84 ellipsoid in metres.
const WGS84_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the spherical Mercator square.
const MERCATOR_MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Pseudo-Mercator (EPSG:3857) computed analytically, without PROJ.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl WebMercator {
    /// EPSG codes this frame answers to.
    pub const CODES: [u32; 3] = [3857, 3785, 900_913];
}

impl Reprojector for WebMercator {
    fn reproject(
        &self,
        code: u32,
        direction: Direction,
        point: Point2,
    ) -> Result<Point2, ReferenceError> {
        if !Self::CODES.contains(&code) {
            return Err(ReferenceError::UnsupportedFrame(code));
        }
        let out = match direction {
            Direction::FromGeodetic => {
                if point.y.abs() > MERCATOR_MAX_LATITUDE {
                    return Err(ReferenceError::ReprojectionFailure(format!(
                        "latitude {} is outside the Mercator range",
                        point.y
                    )));
                }
                let x = WGS84_RADIUS * point.x.to_radians();
                let y = WGS84_RADIUS * (FRAC_PI_4 + point.y.to_radians() / 2.0).tan().ln();
                Point2::new(x, y)
            }
            Direction::ToGeodetic => {
                let lon = (point.x / WGS84_RADIUS).to_degrees();
                let lat = 2.0 * (point.y / WGS84_RADIUS).exp().atan() - 2.0 * FRAC_PI_4;
                let lat = lat.to_degrees();
                Point2::new(lon, lat)
            }
        };
        if out.x.is_finite() && out.y.is_finite() {
            Ok(out)
        } else {
            Err(ReferenceError::ReprojectionFailure(format!(
                "non-finite result for ({}, {})",
                point.x, point.y
            )))
        }
    }
}

/// Reprojection through the PROJ library.
#[cfg(feature = "proj")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjReprojector;

#[cfg(feature = "proj")]
impl Reprojector for ProjReprojector {
    fn reproject(
        &self,
        code: u32,
        direction: Direction,
        point: Point2,
    ) -> Result<Point2, ReferenceError> {
        use proj::Proj;

        let projected = format!("EPSG:{code}");
        let geodetic = format!("EPSG:{}", super::GEODETIC_CODE);
        let (from, to) = match direction {
            Direction::ToGeodetic => (projected.as_str(), geodetic.as_str()),
            Direction::FromGeodetic => (geodetic.as_str(), projected.as_str()),
        };

        // new_known_crs normalises axis order to (lon, lat)
        let transformer = Proj::new_known_crs(from, to, None).map_err(|e| {
            ReferenceError::ReprojectionFailure(format!("failed to create transform: {e}"))
        })?;
        let (x, y) = transformer.convert((point.x, point.y)).map_err(|e| {
            ReferenceError::ReprojectionFailure(format!(
                "transform failed at ({}, {}): {e}",
                point.x, point.y
            ))
        })?;
        Ok(Point2::new(x, y))
    }
}

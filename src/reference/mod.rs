//! Reference systems: the reprojection contract, EPSG code extraction and
//! the planar offset between a document and the host scene.

mod frames;
mod resolve;
mod tile;

pub use frames::WebMercator;
#[cfg(feature = "proj")]
pub use frames::ProjReprojector;
pub use resolve::{resolve, PlanarOffset, SiteResolution};
pub use tile::{national_grid_bounds, tile_bounds, PlanarBounds, NATIONAL_GRID_CODE};

use serde::{Deserialize, Serialize};

use crate::error::ReferenceError;
use crate::math::Point2;

/// EPSG code of WGS 84 geodetic coordinates.
pub const GEODETIC_CODE: u32 = 4326;

/// A geodetic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeodeticPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeodeticPoint {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// The point in `(x = longitude, y = latitude)` order, as reprojectors expect.
    #[must_use]
    pub fn to_lon_lat(self) -> Point2 {
        Point2::new(self.longitude, self.latitude)
    }

    #[must_use]
    pub fn from_lon_lat(point: Point2) -> Self {
        Self::new(point.y, point.x)
    }
}

/// Direction of a reprojection relative to geodetic degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Projected coordinates in the given code to geodetic `(lon, lat)`.
    ToGeodetic,
    /// Geodetic `(lon, lat)` to projected coordinates in the given code.
    FromGeodetic,
}

/// Reprojects single points between a projected frame and geodetic degrees.
///
/// Implemented by the built-in frames and by any closure with the same
/// signature, so hosts can plug in their own projection library.
pub trait Reprojector {
    /// Reprojects `point` between EPSG `code` and geodetic degrees.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::UnsupportedFrame`] if `code` is unknown to
    /// the implementation, or [`ReferenceError::ReprojectionFailure`] if the
    /// point cannot be transformed.
    fn reproject(
        &self,
        code: u32,
        direction: Direction,
        point: Point2,
    ) -> Result<Point2, ReferenceError>;
}

impl<F> Reprojector for F
where
    F: Fn(u32, Direction, Point2) -> Result<Point2, ReferenceError>,
{
    fn reproject(
        &self,
        code: u32,
        direction: Direction,
        point: Point2,
    ) -> Result<Point2, ReferenceError> {
        self(code, direction, point)
    }
}

/// Extracts the EPSG code from a reference system identifier.
///
/// The code is the segment after the last `/`, or after the last `:` when
/// there is no `/`. Both `https://www.opengis.net/def/crs/EPSG/0/7415` and
/// `urn:ogc:def:crs:EPSG::7415` yield `7415`.
///
/// # Errors
///
/// Returns [`ReferenceError::InvalidCode`] if the trailing segment is not
/// an integer.
pub fn epsg_code(reference_system: &str) -> Result<u32, ReferenceError> {
    let start = reference_system
        .rfind('/')
        .or_else(|| reference_system.rfind(':'))
        .map_or(0, |i| i + 1);
    reference_system[start..]
        .trim()
        .parse()
        .map_err(|_| ReferenceError::InvalidCode(reference_system.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_from_url() {
        assert_eq!(
            epsg_code("https://www.opengis.net/def/crs/EPSG/0/7415").ok(),
            Some(7415)
        );
    }

    #[test]
    fn code_from_urn_and_short_forms() {
        assert_eq!(epsg_code("urn:ogc:def:crs:EPSG::28992").ok(), Some(28992));
        assert_eq!(epsg_code("EPSG:3857").ok(), Some(3857));
        assert_eq!(epsg_code("2056").ok(), Some(2056));
    }

    #[test]
    fn non_numeric_code_is_rejected() {
        assert!(matches!(
            epsg_code("urn:ogc:def:crs:EPSG::"),
            Err(ReferenceError::InvalidCode(_))
        ));
        assert!(matches!(epsg_code("WGS84"), Err(ReferenceError::InvalidCode(_))));
    }

    #[test]
    fn lon_lat_order() {
        let p = GeodeticPoint::new(52.0, 4.3);
        assert_eq!(p.to_lon_lat(), Point2::new(4.3, 52.0));
        assert_eq!(GeodeticPoint::from_lon_lat(p.to_lon_lat()), p);
    }
}

use std::fmt;

use crate::error::Result;

use super::{Direction, GeodeticPoint, Reprojector};

/// EPSG code of the Dutch national grid (Amersfoort / RD New), in which
/// tile indexes are queried.
pub const NATIONAL_GRID_CODE: u32 = 28992;

/// A planar axis-aligned box in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Formats as `xmin,ymin,xmax,ymax`, the WFS `bbox` parameter layout.
impl fmt::Display for PlanarBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// Computes the square planar box of half-side `half_side` around a
/// geodetic center, expressed in EPSG `code`.
///
/// # Errors
///
/// Returns the reprojection error if `center` cannot be projected.
pub fn tile_bounds(
    center: GeodeticPoint,
    half_side: f64,
    code: u32,
    frame: &impl Reprojector,
) -> Result<PlanarBounds> {
    let c = frame.reproject(code, Direction::FromGeodetic, center.to_lon_lat())?;
    Ok(PlanarBounds {
        min_x: c.x - half_side,
        min_y: c.y - half_side,
        max_x: c.x + half_side,
        max_y: c.y + half_side,
    })
}

/// [`tile_bounds`] in the fixed [`NATIONAL_GRID_CODE`].
///
/// # Errors
///
/// Returns the reprojection error if `center` cannot be projected.
pub fn national_grid_bounds(
    center: GeodeticPoint,
    half_side: f64,
    frame: &impl Reprojector,
) -> Result<PlanarBounds> {
    tile_bounds(center, half_side, NATIONAL_GRID_CODE, frame)
}

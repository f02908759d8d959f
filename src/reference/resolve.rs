use crate::document::Document;
use crate::error::{ReferenceError, Result};
use crate::math::Point2;

use super::{epsg_code, Direction, GeodeticPoint, Reprojector};

/// Horizontal translation applied to every scaled vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlanarOffset {
    pub dx: f64,
    pub dy: f64,
}

impl PlanarOffset {
    /// No translation: the document is already in scene space.
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };
}

/// Result of placing a document relative to the host scene anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteResolution {
    /// EPSG code of the document's projected frame.
    pub code: u32,
    /// Geodetic location of the document's `translate` point.
    pub document_site: GeodeticPoint,
    /// Offset from the document frame to the anchor, in document units.
    pub offset: PlanarOffset,
}

impl SiteResolution {
    /// Returns `true` if the document site differs from `anchor`.
    #[must_use]
    pub fn differs_from(&self, anchor: GeodeticPoint) -> bool {
        self.document_site != anchor
    }
}

/// Computes the planar offset between a document and the scene anchor.
///
/// `translate` is projected forward to geodetic degrees to locate the
/// document site. The anchor is projected in reverse into the document's own
/// frame, and the offset is `translate - anchor` on each horizontal axis.
/// Vertices themselves are never reprojected.
///
/// # Errors
///
/// Returns [`ReferenceError::NoReferenceSystem`] if the document declares no
/// reference system (callers fall back to [`PlanarOffset::ZERO`]),
/// [`ReferenceError::InvalidCode`] if its code is unreadable, and
/// reprojection errors from `frame`.
pub fn resolve(
    document: &Document,
    anchor: GeodeticPoint,
    frame: &impl Reprojector,
) -> Result<SiteResolution> {
    let reference = document
        .reference_system
        .as_deref()
        .ok_or(ReferenceError::NoReferenceSystem)?;
    let code = epsg_code(reference)?;

    let [tx, ty, _] = document.transform.translate;
    let translate = Point2::new(tx, ty);

    let site = frame.reproject(code, Direction::ToGeodetic, translate)?;
    let anchor_planar = frame.reproject(code, Direction::FromGeodetic, anchor.to_lon_lat())?;

    Ok(SiteResolution {
        code,
        document_site: GeodeticPoint::from_lon_lat(site),
        offset: PlanarOffset {
            dx: translate.x - anchor_planar.x,
            dy: translate.y - anchor_planar.y,
        },
    })
}

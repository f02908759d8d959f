//! Materialises the raw vertex pool into absolute scene positions.

use crate::document::Document;
use crate::error::GeometryError;
use crate::math::{Aabb, Point3};
use crate::reference::PlanarOffset;

/// Metres to decimal feet, the internal length unit of the usual host.
pub const METERS_TO_FEET: f64 = 1.0 / 0.3048;

/// The affine mapping from raw vertex components to scene positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexMapping {
    pub scale: [f64; 3],
    pub offset: PlanarOffset,
    pub unit_factor: f64,
}

impl VertexMapping {
    /// Maps a raw vertex to its scene position.
    ///
    /// `z` is never offset: the scene anchor only carries a horizontal position.
    #[must_use]
    pub fn apply(&self, raw: &[f64; 3]) -> Point3 {
        let [sx, sy, sz] = self.scale;
        Point3::new(
            (raw[0] * sx + self.offset.dx) * self.unit_factor,
            (raw[1] * sy + self.offset.dy) * self.unit_factor,
            raw[2] * sz * self.unit_factor,
        )
    }

    /// Inverse of [`apply`](Self::apply).
    #[must_use]
    pub fn invert(&self, point: &Point3) -> [f64; 3] {
        let [sx, sy, sz] = self.scale;
        [
            (point.x / self.unit_factor - self.offset.dx) / sx,
            (point.y / self.unit_factor - self.offset.dy) / sy,
            point.z / self.unit_factor / sz,
        ]
    }
}

/// Absolute vertex positions shared read-only by every geometry walk.
#[derive(Debug, Clone)]
pub struct VertexPool {
    points: Vec<Point3>,
    bounds: Option<Aabb>,
    mapping: VertexMapping,
}

impl VertexPool {
    /// Returns the number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the pool holds no vertex.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns all positions in pool order.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Returns the bounding box of every vertex, `None` for an empty pool.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Returns the mapping the pool was produced with.
    #[must_use]
    pub fn mapping(&self) -> &VertexMapping {
        &self.mapping
    }

    /// Looks up a vertex by its 0-based pool index.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`] if `index` is past the end.
    pub fn get(&self, index: usize) -> Result<Point3, GeometryError> {
        self.points
            .get(index)
            .copied()
            .ok_or(GeometryError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
    }

    /// Maps a scene position back to raw vertex components.
    #[must_use]
    pub fn to_raw(&self, point: &Point3) -> [f64; 3] {
        self.mapping.invert(point)
    }
}

/// Applies scale, offset and unit conversion to a document's vertex pool.
pub struct Materialize {
    offset: PlanarOffset,
    unit_factor: f64,
}

impl Materialize {
    /// Creates a new `Materialize` operation.
    #[must_use]
    pub fn new(offset: PlanarOffset, unit_factor: f64) -> Self {
        Self {
            offset,
            unit_factor,
        }
    }

    /// Executes the operation over the whole pool, referenced or not,
    /// tracking the bounding box in the same pass.
    #[must_use]
    pub fn execute(&self, document: &Document) -> VertexPool {
        let mapping = VertexMapping {
            scale: document.transform.scale,
            offset: self.offset,
            unit_factor: self.unit_factor,
        };

        let mut points = Vec::with_capacity(document.vertices.len());
        let mut bounds: Option<Aabb> = None;
        for raw in &document.vertices {
            let p = mapping.apply(raw);
            match bounds.as_mut() {
                Some(b) => b.include(&p),
                None => bounds = Some(Aabb::from_point(p)),
            }
            points.push(p);
        }

        VertexPool {
            points,
            bounds,
            mapping,
        }
    }
}

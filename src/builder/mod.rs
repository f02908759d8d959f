mod closure;
mod face_set;
mod shape;

pub use closure::IsClosed;
pub use face_set::{BuilderState, FaceSetBuilder};
pub use shape::ShapeBuilder;

use std::collections::BTreeMap;

use crate::material::MaterialCategory;
use crate::math::Point3;

/// One face of a solid: the outer loop followed by its holes, in absolute
/// scene positions.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLoops {
    pub loops: Vec<Vec<Point3>>,
    pub material: Option<MaterialCategory>,
}

impl FaceLoops {
    /// The outer boundary loop.
    #[must_use]
    pub fn outer(&self) -> &[Point3] {
        self.loops.first().map_or(&[], Vec::as_slice)
    }

    /// The hole loops.
    #[must_use]
    pub fn holes(&self) -> &[Vec<Point3>] {
        self.loops.get(1..).unwrap_or(&[])
    }
}

/// A solid built from one geometry of one city object, handed to the scene
/// sink once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSolid {
    pub source_object_id: String,
    pub semantic_type: String,
    pub lod: String,
    pub material: MaterialCategory,
    pub faces: Vec<FaceLoops>,
    /// Own attributes over inherited ones, plus the reserved names.
    pub attributes: BTreeMap<String, String>,
    /// `false` when the faces do not bound a volume and the solid is an open mesh.
    pub closed: bool,
}

impl ResolvedSolid {
    /// Total number of loops over every face.
    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.faces.iter().map(|f| f.loops.len()).sum()
    }
}

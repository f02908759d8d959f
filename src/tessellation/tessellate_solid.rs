use tracing::debug;

use crate::builder::ResolvedSolid;
use crate::error::Result;

use super::{TessellateFace, TessellationParams, TriangleMesh};

/// Tessellates all faces of a solid into a combined triangle mesh.
pub struct TessellateSolid<'a> {
    solid: &'a ResolvedSolid,
    params: TessellationParams,
}

impl<'a> TessellateSolid<'a> {
    /// Creates a new `TessellateSolid` operation.
    #[must_use]
    pub fn new(solid: &'a ResolvedSolid, params: TessellationParams) -> Self {
        Self { solid, params }
    }

    /// Executes the tessellation, returning a combined triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if any face of the solid cannot be tessellated.
    pub fn execute(&self) -> Result<TriangleMesh> {
        let mut combined = TriangleMesh::default();
        for face in &self.solid.faces {
            let face_mesh = TessellateFace::new(face, self.params).execute()?;
            combined.merge(&face_mesh);
        }
        debug!(
            object = %self.solid.source_object_id,
            triangles = combined.triangle_count(),
            "solid tessellated"
        );
        Ok(combined)
    }
}

impl ResolvedSolid {
    /// Triangulates every face of the solid, holes included.
    ///
    /// # Errors
    ///
    /// Returns an error if a face is degenerate.
    pub fn tessellate(&self, params: TessellationParams) -> Result<TriangleMesh> {
        TessellateSolid::new(self, params).execute()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::builder::FaceLoops;
    use crate::material::MaterialCategory;
    use crate::math::Point3;
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn unit_cube() -> ResolvedSolid {
        let v = |x: f64, y: f64, z: f64| Point3::new(x, y, z);
        let quads = [
            [v(0., 0., 0.), v(0., 1., 0.), v(1., 1., 0.), v(1., 0., 0.)],
            [v(0., 0., 1.), v(1., 0., 1.), v(1., 1., 1.), v(0., 1., 1.)],
            [v(0., 0., 0.), v(1., 0., 0.), v(1., 0., 1.), v(0., 0., 1.)],
            [v(1., 0., 0.), v(1., 1., 0.), v(1., 1., 1.), v(1., 0., 1.)],
            [v(1., 1., 0.), v(0., 1., 0.), v(0., 1., 1.), v(1., 1., 1.)],
            [v(0., 1., 0.), v(0., 0., 0.), v(0., 0., 1.), v(0., 1., 1.)],
        ];
        ResolvedSolid {
            source_object_id: "cube".into(),
            semantic_type: "Building".into(),
            lod: "2.2".into(),
            material: MaterialCategory::Building,
            faces: quads
                .iter()
                .map(|q| FaceLoops {
                    loops: vec![q.to_vec()],
                    material: Some(MaterialCategory::Building),
                })
                .collect(),
            attributes: BTreeMap::new(),
            closed: true,
        }
    }

    #[test]
    fn cube_surface_area() {
        let mesh = unit_cube().tessellate(TessellationParams::default()).unwrap();
        assert_eq!(mesh.triangle_count(), 12);
        assert_relative_eq!(mesh.area(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn normals_point_outwards() {
        let mesh = unit_cube().tessellate(TessellationParams::default()).unwrap();
        let center = Point3::new(0.5, 0.5, 0.5);
        for (p, n) in mesh.vertices.iter().zip(&mesh.normals) {
            assert!((p - center).dot(n) > 0.0);
        }
    }
}

use tracing::debug;

use crate::attributes::{resolve_attributes, ParentAttributes};
use crate::document::{Boundaries, CityObject, Geometry, Ring};
use crate::error::{GeometryError, Result};
use crate::material::MaterialCategory;
use crate::topology::{ShellId, TopologyStore};
use crate::vertices::VertexPool;

use super::{FaceLoops, FaceSetBuilder, ResolvedSolid};

/// Builds the solids of one city object at the selected level of detail.
///
/// The vertex pool and the inherited attributes are read-only context shared
/// by every object of a document.
#[derive(Debug, Clone, Copy)]
pub struct ShapeBuilder<'a> {
    lod: &'a str,
    pool: &'a VertexPool,
    parents: &'a ParentAttributes,
}

impl<'a> ShapeBuilder<'a> {
    /// Creates a new `ShapeBuilder`.
    #[must_use]
    pub fn new(lod: &'a str, pool: &'a VertexPool, parents: &'a ParentAttributes) -> Self {
        Self { lod, pool, parents }
    }

    /// Returns the level of detail solids are built at.
    #[must_use]
    pub fn lod(&self) -> &str {
        self.lod
    }

    /// Emits one solid per geometry of `object` whose `LoD` matches.
    ///
    /// An object without a matching geometry yields no solid. A geometry whose
    /// faces are all degenerate yields no solid either.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the object's geometry could not be
    /// decoded, if a boundary is malformed or if it references a vertex
    /// outside the pool. The whole object is abandoned.
    pub fn build(&self, object: &CityObject) -> Result<Vec<ResolvedSolid>> {
        if let Some(reason) = &object.malformed {
            return Err(GeometryError::MalformedGeometry(reason.clone()).into());
        }

        let material = MaterialCategory::classify(&object.kind);
        let attributes = resolve_attributes(object, self.parents.get(&object.id));

        let mut solids = Vec::new();
        for (n, geometry) in object.geometries.iter().enumerate() {
            if geometry.lod.as_deref() != Some(self.lod) {
                continue;
            }

            let mut store = TopologyStore::new();
            let shell = self.build_shell(&mut store, geometry, material)?;
            let faces = face_loops(&store, shell)?;
            if faces.is_empty() {
                debug!(object = %object.id, geometry = n, "no face left after cleanup");
                continue;
            }

            let closed = store.shell(shell)?.is_closed;
            debug!(object = %object.id, faces = faces.len(), closed, "solid built");
            solids.push(ResolvedSolid {
                source_object_id: object.id.clone(),
                semantic_type: object.kind.clone(),
                lod: self.lod.to_owned(),
                material,
                faces,
                attributes: attributes.clone(),
                closed,
            });
        }
        Ok(solids)
    }

    fn build_shell(
        &self,
        store: &mut TopologyStore,
        geometry: &Geometry,
        material: MaterialCategory,
    ) -> Result<ShellId> {
        let shells = match &geometry.boundaries {
            Boundaries::Shells(shells) => shells,
            Boundaries::Invalid(reason) => {
                return Err(GeometryError::MalformedGeometry(reason.clone()).into());
            }
        };

        let mut builder = FaceSetBuilder::new(store, self.pool);
        builder.open_face_set()?;
        for ring in shells.iter().flat_map(|s| &s.rings) {
            match ring {
                Ring::SimpleLoop(indices) => {
                    builder.add_loop(indices)?;
                    builder.emit_face(Some(material))?;
                }
                Ring::LoopWithHoles(loops) if loops.is_empty() => {}
                Ring::LoopWithHoles(loops) => {
                    for indices in loops {
                        builder.add_loop(indices)?;
                    }
                    builder.emit_face(Some(material))?;
                }
            }
        }
        builder.close_face_set()
    }
}

/// Reads back the faces of a shell as loops of absolute positions.
fn face_loops(store: &TopologyStore, shell: ShellId) -> Result<Vec<FaceLoops>> {
    let shell = store.shell(shell)?;
    let mut faces = Vec::with_capacity(shell.faces.len());
    for &face_id in &shell.faces {
        let face = store.face(face_id)?;
        let loops = face
            .wires()
            .map(|w| store.wire_points(w))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        faces.push(FaceLoops {
            loops,
            material: face.material,
        });
    }
    Ok(faces)
}

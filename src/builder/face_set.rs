use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::material::MaterialCategory;
use crate::topology::{
    EdgeData, EdgeId, FaceData, FaceId, OrientedEdge, ShellData, ShellId, TopologyStore,
    VertexData, VertexId, WireData, WireId,
};
use crate::vertices::VertexPool;

use super::IsClosed;

/// Where a [`FaceSetBuilder`] stands in the accumulation of one geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// No face set is open.
    Idle,
    /// A face set is open and holds no pending loop.
    Empty,
    /// Loops are buffered for the next face.
    Accumulating,
    /// The last buffered loops were emitted as a face.
    FaceEmitted,
}

/// Incremental builder turning loops of pool indices into faces of one shell.
///
/// Vertices and edges are shared across faces through their pool indices,
/// so two loops running over the same pair of indices use the same edge.
pub struct FaceSetBuilder<'a> {
    store: &'a mut TopologyStore,
    pool: &'a VertexPool,
    state: BuilderState,
    faces: Vec<FaceId>,
    pending: Vec<Option<WireId>>,
    vertices: HashMap<usize, VertexId>,
    edges: HashMap<(usize, usize), EdgeId>,
}

impl<'a> FaceSetBuilder<'a> {
    /// Creates an idle builder writing into `store`.
    pub fn new(store: &'a mut TopologyStore, pool: &'a VertexPool) -> Self {
        Self {
            store,
            pool,
            state: BuilderState::Idle,
            faces: Vec::new(),
            pending: Vec::new(),
            vertices: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Opens a new face set.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidState`] if a face set is already open.
    pub fn open_face_set(&mut self) -> Result<()> {
        if self.state != BuilderState::Idle {
            return Err(TopologyError::InvalidState("face set already open".into()).into());
        }
        self.faces.clear();
        self.pending.clear();
        self.state = BuilderState::Empty;
        Ok(())
    }

    /// Buffers one loop of pool indices for the next face.
    ///
    /// Repeated consecutive indices and an explicit closing index are
    /// collapsed. A loop left with fewer than three vertices is kept as a
    /// placeholder and dropped when the face is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::IndexOutOfRange`](crate::error::GeometryError::IndexOutOfRange)
    /// if an index is past the end of the pool, or
    /// [`TopologyError::InvalidState`] if no face set is open.
    pub fn add_loop(&mut self, indices: &[usize]) -> Result<()> {
        if self.state == BuilderState::Idle {
            return Err(TopologyError::InvalidState("no open face set".into()).into());
        }
        for &index in indices {
            self.pool.get(index)?;
        }

        let ring = normalize_loop(indices);
        let wire = if ring.len() < 3 {
            debug!(vertices = ring.len(), "degenerate loop");
            None
        } else {
            Some(self.make_wire(&ring)?)
        };
        self.pending.push(wire);
        self.state = BuilderState::Accumulating;
        Ok(())
    }

    /// Emits the buffered loops as one face: the first loop is the outer
    /// boundary, the others are holes.
    ///
    /// Returns `None` when the outer loop was degenerate and the face was
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidState`] if no loop is buffered.
    pub fn emit_face(&mut self, material: Option<MaterialCategory>) -> Result<Option<FaceId>> {
        if self.state != BuilderState::Accumulating {
            return Err(TopologyError::InvalidState("no loop to emit".into()).into());
        }
        let mut loops = std::mem::take(&mut self.pending).into_iter();
        self.state = BuilderState::FaceEmitted;

        let Some(Some(outer_wire)) = loops.next() else {
            debug!("face dropped: degenerate outer loop");
            return Ok(None);
        };
        let face = self.store.add_face(FaceData {
            outer_wire,
            inner_wires: loops.flatten().collect(),
            material,
        });
        self.faces.push(face);
        Ok(Some(face))
    }

    /// Closes the face set into a shell and decides whether it is closed.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidState`] if no face set is open or
    /// loops are still buffered.
    pub fn close_face_set(&mut self) -> Result<ShellId> {
        match self.state {
            BuilderState::Empty | BuilderState::FaceEmitted => {}
            BuilderState::Idle => {
                return Err(TopologyError::InvalidState("no open face set".into()).into());
            }
            BuilderState::Accumulating => {
                return Err(TopologyError::InvalidState("loops left unemitted".into()).into());
            }
        }

        let shell = self.store.add_shell(ShellData {
            faces: std::mem::take(&mut self.faces),
            is_closed: false,
        });
        let closed = IsClosed::new(shell).execute(self.store)?;
        self.store.shell_mut(shell)?.is_closed = closed;
        self.state = BuilderState::Idle;
        Ok(shell)
    }

    fn vertex(&mut self, index: usize) -> Result<VertexId> {
        if let Some(&id) = self.vertices.get(&index) {
            return Ok(id);
        }
        let point = self.pool.get(index)?;
        let id = self.store.add_vertex(VertexData::new(point, index));
        self.vertices.insert(index, id);
        Ok(id)
    }

    fn edge(&mut self, from: usize, to: usize) -> Result<OrientedEdge> {
        let key = (from.min(to), from.max(to));
        let id = if let Some(&id) = self.edges.get(&key) {
            id
        } else {
            let start = self.vertex(key.0)?;
            let end = self.vertex(key.1)?;
            let id = self.store.add_edge(EdgeData { start, end });
            self.edges.insert(key, id);
            id
        };
        Ok(OrientedEdge::new(id, from < to))
    }

    fn make_wire(&mut self, ring: &[usize]) -> Result<WireId> {
        let mut edges = Vec::with_capacity(ring.len());
        for (i, &from) in ring.iter().enumerate() {
            let to = ring[(i + 1) % ring.len()];
            edges.push(self.edge(from, to)?);
        }
        Ok(self.store.add_wire(WireData { edges }))
    }
}

/// Removes consecutive duplicates, including a closing index equal to the
/// first one.
fn normalize_loop(indices: &[usize]) -> Vec<usize> {
    let mut ring: Vec<usize> = Vec::with_capacity(indices.len());
    for &index in indices {
        if ring.last() != Some(&index) {
            ring.push(index);
        }
    }
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::decode;
    use crate::error::{CitySolidError, GeometryError};
    use crate::reference::PlanarOffset;
    use crate::vertices::Materialize;

    fn pool() -> VertexPool {
        let doc = decode(
            r#"{ "type": "CityJSON", "version": "1.1",
                "transform": { "scale": [1, 1, 1], "translate": [0, 0, 0] },
                "vertices": [[0,0,0],[1,0,0],[1,1,0],[0,1,0],[0,0,1],[1,0,1],[1,1,1],[0,1,1]],
                "CityObjects": {} }"#,
        )
        .unwrap();
        Materialize::new(PlanarOffset::ZERO, 1.0).execute(&doc)
    }

    #[test]
    fn loops_are_normalized() {
        assert_eq!(normalize_loop(&[0, 1, 1, 2, 0]), vec![0, 1, 2]);
        assert_eq!(normalize_loop(&[3, 3, 3]), vec![3]);
        assert!(normalize_loop(&[]).is_empty());
    }

    #[test]
    fn state_machine_transitions() {
        let pool = pool();
        let mut store = TopologyStore::new();
        let mut builder = FaceSetBuilder::new(&mut store, &pool);
        assert_eq!(builder.state(), BuilderState::Idle);

        builder.open_face_set().unwrap();
        assert_eq!(builder.state(), BuilderState::Empty);
        builder.add_loop(&[0, 1, 2, 3]).unwrap();
        assert_eq!(builder.state(), BuilderState::Accumulating);
        builder.emit_face(None).unwrap();
        assert_eq!(builder.state(), BuilderState::FaceEmitted);
        builder.close_face_set().unwrap();
        assert_eq!(builder.state(), BuilderState::Idle);
    }

    #[test]
    fn misuse_is_an_invalid_state() {
        let pool = pool();
        let mut store = TopologyStore::new();
        let mut builder = FaceSetBuilder::new(&mut store, &pool);

        assert!(matches!(
            builder.add_loop(&[0, 1, 2]),
            Err(CitySolidError::Topology(TopologyError::InvalidState(_)))
        ));
        builder.open_face_set().unwrap();
        assert!(builder.open_face_set().is_err());
        assert!(builder.emit_face(None).is_err());
        builder.add_loop(&[0, 1, 2]).unwrap();
        assert!(builder.close_face_set().is_err());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let pool = pool();
        let mut store = TopologyStore::new();
        let mut builder = FaceSetBuilder::new(&mut store, &pool);
        builder.open_face_set().unwrap();
        assert!(matches!(
            builder.add_loop(&[0, 1, 8]),
            Err(CitySolidError::Geometry(GeometryError::IndexOutOfRange { index: 8, len: 8 }))
        ));
    }

    #[test]
    fn holes_share_one_face() {
        let pool = pool();
        let mut store = TopologyStore::new();
        let mut builder = FaceSetBuilder::new(&mut store, &pool);
        builder.open_face_set().unwrap();
        builder.add_loop(&[0, 1, 2, 3]).unwrap();
        builder.add_loop(&[4, 5, 6]).unwrap();
        builder.add_loop(&[4, 6, 7]).unwrap();
        let face = builder.emit_face(Some(MaterialCategory::Road)).unwrap().unwrap();
        builder.close_face_set().unwrap();

        let face = store.face(face).unwrap();
        assert_eq!(face.inner_wires.len(), 2);
        assert_eq!(face.material, Some(MaterialCategory::Road));
    }

    #[test]
    fn degenerate_loops_are_dropped() {
        let pool = pool();
        let mut store = TopologyStore::new();
        let mut builder = FaceSetBuilder::new(&mut store, &pool);
        builder.open_face_set().unwrap();

        builder.add_loop(&[0, 1, 1, 0]).unwrap();
        builder.add_loop(&[4, 5, 6]).unwrap();
        assert!(builder.emit_face(None).unwrap().is_none());

        builder.add_loop(&[0, 1, 2, 3]).unwrap();
        builder.add_loop(&[4, 4]).unwrap();
        let face = builder.emit_face(None).unwrap().unwrap();
        let shell = builder.close_face_set().unwrap();

        assert!(store.face(face).unwrap().inner_wires.is_empty());
        assert_eq!(store.shell(shell).unwrap().faces, vec![face]);
    }

    #[test]
    fn shared_edges_are_reused() {
        let pool = pool();
        let mut store = TopologyStore::new();
        let mut builder = FaceSetBuilder::new(&mut store, &pool);
        builder.open_face_set().unwrap();
        builder.add_loop(&[0, 1, 2]).unwrap();
        let a = builder.emit_face(None).unwrap().unwrap();
        builder.add_loop(&[0, 2, 3]).unwrap();
        let b = builder.emit_face(None).unwrap().unwrap();
        builder.close_face_set().unwrap();

        let diagonal = |face| {
            let wire = store.wire(store.face(face).unwrap().outer_wire).unwrap();
            wire.edges
                .iter()
                .find(|oe| {
                    let e = store.edge(oe.edge).unwrap();
                    let s = store.vertex(e.start).unwrap().pool_index;
                    let t = store.vertex(e.end).unwrap().pool_index;
                    (s, t) == (0, 2)
                })
                .copied()
                .unwrap()
        };
        let (da, db) = (diagonal(a), diagonal(b));
        assert_eq!(da.edge, db.edge);
        assert_ne!(da.forward, db.forward);
    }
}

use crate::math::Point3;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the topology store.
    pub struct VertexId;
}

/// Data associated with a topological vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The absolute position of the vertex.
    pub point: Point3,
    /// Index of the vertex in the document's vertex pool.
    pub pool_index: usize,
}

impl VertexData {
    /// Creates a new vertex at the given point.
    #[must_use]
    pub fn new(point: Point3, pool_index: usize) -> Self {
        Self { point, pool_index }
    }
}

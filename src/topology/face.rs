use crate::material::MaterialCategory;

use super::wire::WireId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
}

/// Data associated with a topological face.
///
/// A face is a planar polygon bounded by an outer wire and optionally inner
/// wires (holes).
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The outer boundary wire.
    pub outer_wire: WireId,
    /// Inner boundary wires (holes).
    pub inner_wires: Vec<WireId>,
    /// Material category the face is rendered with.
    pub material: Option<MaterialCategory>,
}

impl FaceData {
    /// Iterates over the outer wire followed by the holes.
    pub fn wires(&self) -> impl Iterator<Item = WireId> + '_ {
        std::iter::once(self.outer_wire).chain(self.inner_wires.iter().copied())
    }
}

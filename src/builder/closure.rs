use std::collections::HashMap;

use crate::error::TopologyError;
use crate::topology::{EdgeId, ShellId, TopologyStore};

/// Decides whether a shell bounds a volume.
///
/// A shell is closed when it has at least one face and every edge is used
/// by exactly two face loops.
pub struct IsClosed {
    shell: ShellId,
}

impl IsClosed {
    /// Creates a new `IsClosed` query.
    #[must_use]
    pub fn new(shell: ShellId) -> Self {
        Self { shell }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell or one of its faces or wires is not
    /// found in the store.
    pub fn execute(&self, store: &TopologyStore) -> Result<bool, TopologyError> {
        let shell = store.shell(self.shell)?;
        if shell.faces.is_empty() {
            return Ok(false);
        }

        let mut uses: HashMap<EdgeId, u32> = HashMap::new();
        for &face_id in &shell.faces {
            for wire_id in store.face(face_id)?.wires() {
                for oe in &store.wire(wire_id)?.edges {
                    *uses.entry(oe.edge).or_default() += 1;
                }
            }
        }

        Ok(uses.values().all(|&n| n == 2))
    }
}

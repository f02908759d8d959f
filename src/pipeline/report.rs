use std::fmt;

use crate::math::Aabb;
use crate::reference::{GeodeticPoint, SiteResolution};

/// An object abandoned because its geometry could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedObject {
    pub id: String,
    pub reason: String,
}

/// Summary of one conversion run, surfaced to the user as a single message.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// Level of detail the solids were built at; `None` if the document
    /// holds no geometry.
    pub lod: Option<String>,
    /// Site resolution of the document, `None` without a reference system.
    pub site: Option<SiteResolution>,
    /// New host site when the site was relocated to the document.
    pub relocated_site: Option<GeodeticPoint>,
    /// Bounding box of every vertex in scene units.
    pub bounds: Option<Aabb>,
    /// Attribute names declared before solids were emitted.
    pub attribute_names: Vec<String>,
    /// Objects that yielded at least one solid.
    pub objects_built: usize,
    pub solids_emitted: usize,
    pub skipped: Vec<SkippedObject>,
    /// Recoverable conditions, e.g. a missing reference system.
    pub warnings: Vec<String>,
    pub cancelled: bool,
}

impl ConversionReport {
    /// Returns `true` if no object was skipped and the run was not cancelled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && !self.cancelled
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} solid{} from {} object{}",
            self.solids_emitted,
            plural(self.solids_emitted),
            self.objects_built,
            plural(self.objects_built),
        )?;
        if let Some(lod) = &self.lod {
            write!(f, " at LoD {lod}")?;
        }
        if !self.skipped.is_empty() {
            write!(
                f,
                ", {} object{} skipped",
                self.skipped.len(),
                plural(self.skipped.len())
            )?;
            for (i, s) in self.skipped.iter().enumerate() {
                let sep = if i == 0 { " (" } else { "; " };
                write!(f, "{sep}{}: {}", s.id, s.reason)?;
            }
            f.write_str(")")?;
        }
        if self.cancelled {
            f.write_str(", cancelled")?;
        }
        Ok(())
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_skips() {
        let report = ConversionReport {
            lod: Some("2.2".into()),
            objects_built: 3,
            solids_emitted: 4,
            skipped: vec![
                SkippedObject {
                    id: "b1".into(),
                    reason: "malformed geometry: surface has nesting depth 3".into(),
                },
                SkippedObject {
                    id: "b7".into(),
                    reason: "vertex index 12 is out of range for a pool of 8 vertices".into(),
                },
            ],
            ..ConversionReport::default()
        };
        assert_eq!(
            report.to_string(),
            "4 solids from 3 objects at LoD 2.2, 2 objects skipped \
             (b1: malformed geometry: surface has nesting depth 3; \
             b7: vertex index 12 is out of range for a pool of 8 vertices)"
        );
        assert!(!report.is_complete());
    }

    #[test]
    fn summary_of_empty_run() {
        let report = ConversionReport {
            objects_built: 1,
            cancelled: true,
            ..ConversionReport::default()
        };
        assert_eq!(report.to_string(), "0 solids from 1 object, cancelled");
    }
}

use serde::{Deserialize, Serialize};

use crate::reference::GeodeticPoint;
use crate::vertices::METERS_TO_FEET;

/// What happens to the host site when a document is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnchorPolicy {
    /// The host site stays put; vertices are offset relative to its anchor.
    #[default]
    KeepSite,
    /// The host site moves to the document's location; no offset is applied.
    RelocateSite,
}

/// Parameters of one conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertParams {
    /// Geodetic position of the destination scene's origin.
    pub anchor: GeodeticPoint,
    /// Factor from document metres to scene length units.
    pub unit_factor: f64,
    pub anchor_policy: AnchorPolicy,
    /// Build objects on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ConvertParams {
    fn default() -> Self {
        Self {
            anchor: GeodeticPoint::default(),
            unit_factor: METERS_TO_FEET,
            anchor_policy: AnchorPolicy::default(),
            parallel: false,
        }
    }
}

impl ConvertParams {
    /// Sets the destination anchor.
    #[must_use]
    pub fn with_anchor(mut self, anchor: GeodeticPoint) -> Self {
        self.anchor = anchor;
        self
    }

    /// Sets the unit conversion factor.
    #[must_use]
    pub fn with_unit_factor(mut self, unit_factor: f64) -> Self {
        self.unit_factor = unit_factor;
        self
    }

    /// Sets the anchor policy.
    #[must_use]
    pub fn with_anchor_policy(mut self, anchor_policy: AnchorPolicy) -> Self {
        self.anchor_policy = anchor_policy;
        self
    }

    /// Enables or disables parallel object building.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

//! Classification of semantic object types into material categories.

use std::fmt;

/// Material category assigned to every face of a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialCategory {
    Building,
    Bridge,
    Group,
    Furniture,
    Landuse,
    Plants,
    Railway,
    Road,
    Tunnel,
    Water,
    #[default]
    Default,
}

impl MaterialCategory {
    /// Every category, in palette order.
    pub const ALL: [Self; 11] = [
        Self::Building,
        Self::Bridge,
        Self::Group,
        Self::Furniture,
        Self::Landuse,
        Self::Plants,
        Self::Railway,
        Self::Road,
        Self::Tunnel,
        Self::Water,
        Self::Default,
    ];

    /// Maps a CityJSON semantic type to its category. Unknown types map to
    /// [`MaterialCategory::Default`].
    #[must_use]
    pub fn classify(semantic_type: &str) -> Self {
        match semantic_type {
            "Building" | "BuildingPart" | "BuildingInstallation" | "BuildingConstructiveElement"
            | "BuildingFurniture" | "BuildingStorey" | "BuildingRoom" | "BuildingUnit" => {
                Self::Building
            }
            "Bridge" | "BridgePart" | "BridgeInstallation" | "BridgeConstructiveElement"
            | "BridgeRoom" | "BridgeFurniture" => Self::Bridge,
            "CityObjectGroup" => Self::Group,
            "CityFurniture" => Self::Furniture,
            "LandUse" => Self::Landuse,
            "PlantCover" | "SolitaryVegetationObject" => Self::Plants,
            "Railway" => Self::Railway,
            "Road" | "TransportSquare" => Self::Road,
            "Tunnel" | "TunnelPart" | "TunnelInstallation" | "TunnelConstructiveElement"
            | "TunnelHollowSpace" | "TunnelFurniture" => Self::Tunnel,
            "WaterBody" | "Waterway" => Self::Water,
            _ => Self::Default,
        }
    }

    /// Host material name, e.g. `cj-Building`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Building => "cj-Building",
            Self::Bridge => "cj-Bridge",
            Self::Group => "cj-Group",
            Self::Furniture => "cj-Furniture",
            Self::Landuse => "cj-Landuse",
            Self::Plants => "cj-Plants",
            Self::Railway => "cj-Railway",
            Self::Road => "cj-Road",
            Self::Tunnel => "cj-Tunnel",
            Self::Water => "cj-Water",
            Self::Default => "cj-Default",
        }
    }
}

impl fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

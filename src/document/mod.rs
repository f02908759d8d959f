//! In-memory model of a CityJSON document.
//!
//! The model is purely structural: vertex indices are not resolved and
//! boundaries are only classified into shells and rings. Fields the
//! pipeline does not use are ignored while decoding.

mod boundary;
mod decode;

pub use decode::decode;

use indexmap::IndexMap;

/// Value of the `type` member every CityJSON document carries.
pub const FORMAT_TYPE: &str = "CityJSON";

/// Attribute bundle of a city object, values already stringified.
pub type Attributes = IndexMap<String, String>;

/// Supported CityJSON versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    V1_0,
    V1_1,
}

impl FormatVersion {
    /// Parses the `version` member of a document.
    #[must_use]
    pub fn parse(version: &str) -> Option<Self> {
        match version {
            "1.0" => Some(Self::V1_0),
            "1.1" => Some(Self::V1_1),
            _ => None,
        }
    }

    /// Returns the version as written in documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
        }
    }
}

/// The `transform` member: integer vertices are multiplied by `scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: [f64; 3],
    pub translate: [f64; 3],
}

/// A decoded CityJSON document.
#[derive(Debug, Clone)]
pub struct Document {
    pub version: FormatVersion,
    /// Reference system identifier, e.g. `https://www.opengis.net/def/crs/EPSG/0/7415`.
    pub reference_system: Option<String>,
    /// `[minx, miny, minz, maxx, maxy, maxz]` from the metadata, if declared.
    pub geographical_extent: Option<[f64; 6]>,
    pub transform: Transform,
    /// Raw vertex pool, before scaling.
    pub vertices: Vec<[f64; 3]>,
    /// City objects in document order.
    pub city_objects: IndexMap<String, CityObject>,
}

impl Document {
    /// Iterates over every geometry of every city object, in document order.
    pub fn geometries(&self) -> impl Iterator<Item = &Geometry> {
        self.city_objects.values().flat_map(|o| o.geometries.iter())
    }
}

/// A city object: a semantically typed feature with optional geometry.
#[derive(Debug, Clone, Default)]
pub struct CityObject {
    pub id: String,
    /// Semantic type, e.g. `Building` or `WaterBody`.
    pub kind: String,
    pub attributes: Attributes,
    /// Identifiers of child objects. Advisory only.
    pub children: Vec<String>,
    pub geometries: Vec<Geometry>,
    /// Why the object's geometry could not be read, if it could not. Such an
    /// object is skipped when built.
    pub malformed: Option<String>,
}

/// One geometry representation of a city object.
#[derive(Debug, Clone)]
pub struct Geometry {
    /// Geometry type, e.g. `Solid` or `MultiSurface`.
    pub kind: Option<String>,
    /// Level-of-detail label. Missing for templated geometry.
    pub lod: Option<String>,
    pub boundaries: Boundaries,
}

/// Boundaries of a geometry, classified once while decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Boundaries {
    /// Surface shells made of rings.
    Shells(Vec<Shell>),
    /// The nesting does not describe surfaces. The reason is reported when
    /// the owning object is built.
    Invalid(String),
}

/// The outermost grouping of rings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shell {
    pub rings: Vec<Ring>,
}

/// A ring entry of a shell.
#[derive(Debug, Clone, PartialEq)]
pub enum Ring {
    /// A flat list of vertex indices forming one face loop.
    SimpleLoop(Vec<usize>),
    /// An outer loop followed by hole loops, all belonging to one face.
    LoopWithHoles(Vec<Vec<usize>>),
}

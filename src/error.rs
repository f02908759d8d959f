use thiserror::Error;

/// Top-level error type for the CityJSON conversion pipeline.
#[derive(Debug, Error)]
pub enum CitySolidError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Lod(#[from] LodError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

impl CitySolidError {
    /// Returns `true` if the error must abort the whole document.
    ///
    /// A missing reference system and an ambiguous `LoD` can be recovered
    /// from by the caller; geometry errors are isolated to one object.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Reference(ReferenceError::NoReferenceSystem)
                | Self::Lod(LodError::Ambiguous { .. })
                | Self::Geometry(_)
        )
    }
}

/// Structural validation failures of the exchange document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid CityJSON document: {reason}")]
    InvalidDocument { reason: String },
}

impl DocumentError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            reason: reason.into(),
        }
    }
}

/// Errors related to reference systems and reprojection.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("document declares no reference system")]
    NoReferenceSystem,

    #[error("cannot read an EPSG code from reference system {0:?}")]
    InvalidCode(String),

    #[error("reference system EPSG:{0} is not supported by this frame")]
    UnsupportedFrame(u32),

    #[error("reprojection failed: {0}")]
    ReprojectionFailure(String),
}

/// Errors related to level-of-detail selection.
#[derive(Debug, Error)]
pub enum LodError {
    #[error("geometry without lod: templated or pre-1.0 geometry is not supported")]
    Unsupported,

    #[error("several levels of detail are present: {candidates:?}")]
    Ambiguous { candidates: Vec<String> },

    #[error("no level of detail was chosen")]
    EmptyChoice,

    #[error("chosen level of detail {0:?} is not present in the document")]
    UnknownChoice(String),
}

/// Errors in the boundary structure of a single city object.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("malformed geometry: {0}")]
    MalformedGeometry(String),

    #[error("vertex index {index} is out of range for a pool of {len} vertices")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors related to topological operations.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("invalid builder state: {0}")]
    InvalidState(String),
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`CitySolidError`].
pub type Result<T> = std::result::Result<T, CitySolidError>;

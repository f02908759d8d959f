//! Conversion of CityJSON city models into closed, tessellated, attributed
//! solids placed in a local scene.

pub mod attributes;
pub mod builder;
pub mod document;
pub mod error;
pub mod lod;
pub mod material;
pub mod math;
pub mod pipeline;
pub mod reference;
pub mod tessellation;
pub mod topology;
pub mod vertices;

pub use builder::{FaceLoops, ResolvedSolid};
pub use document::{decode, Document};
pub use error::{CitySolidError, Result};
pub use material::MaterialCategory;
pub use pipeline::{convert, Conversion, ConversionReport, Convert, ConvertParams};

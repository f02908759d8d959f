use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{DocumentError, Result};

use super::boundary;
use super::{Attributes, CityObject, Document, FormatVersion, Geometry, Transform, FORMAT_TYPE};

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "type")]
    kind: Option<String>,
    version: Option<String>,
    metadata: Option<RawMetadata>,
    transform: Option<RawTransform>,
    vertices: Option<Vec<[f64; 3]>>,
    #[serde(rename = "CityObjects")]
    city_objects: Option<IndexMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(rename = "referenceSystem")]
    reference_system: Option<Value>,
    #[serde(rename = "geographicalExtent")]
    geographical_extent: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawTransform {
    scale: Option<[f64; 3]>,
    translate: Option<[f64; 3]>,
}

/// Members are kept as raw values so a badly shaped optional member only
/// affects its own object.
#[derive(Debug, Deserialize)]
struct RawCityObject {
    #[serde(rename = "type")]
    kind: Option<Value>,
    attributes: Option<Value>,
    children: Option<Value>,
    geometry: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: Option<Value>,
    lod: Option<Value>,
    #[serde(default)]
    boundaries: Value,
}

/// Validates and decodes CityJSON text into a [`Document`].
///
/// Decoding is structural: boundaries are classified into shells and rings
/// but vertex indices are not checked against the pool.
///
/// # Errors
///
/// Returns [`DocumentError::InvalidDocument`] if the text is not JSON, if
/// `type` is not `CityJSON`, if the version is neither `1.0` nor `1.1`, or if
/// `CityObjects`, `transform.scale`, `transform.translate` or `vertices` is
/// missing. No partial document is ever returned.
pub fn decode(text: &str) -> Result<Document> {
    let raw: RawDocument = serde_json::from_str(text)
        .map_err(|e| DocumentError::invalid(format!("malformed JSON: {e}")))?;

    match raw.kind.as_deref() {
        Some(FORMAT_TYPE) => {}
        Some(other) => {
            let reason = format!("type is {other:?}, expected \"CityJSON\"");
            return Err(DocumentError::invalid(reason).into());
        }
        None => return Err(DocumentError::invalid("missing 'type'").into()),
    }

    let version = raw
        .version
        .ok_or_else(|| DocumentError::invalid("missing 'version'"))?;
    let version = FormatVersion::parse(&version)
        .ok_or_else(|| DocumentError::invalid(format!("unsupported version {version:?}")))?;

    let transform = raw
        .transform
        .ok_or_else(|| DocumentError::invalid("missing 'transform'"))?;
    let transform = Transform {
        scale: transform
            .scale
            .ok_or_else(|| DocumentError::invalid("missing 'transform.scale'"))?,
        translate: transform
            .translate
            .ok_or_else(|| DocumentError::invalid("missing 'transform.translate'"))?,
    };

    let vertices = raw
        .vertices
        .ok_or_else(|| DocumentError::invalid("missing 'vertices'"))?;
    let raw_objects = raw
        .city_objects
        .ok_or_else(|| DocumentError::invalid("missing 'CityObjects'"))?;

    let mut city_objects = IndexMap::with_capacity(raw_objects.len());
    for (id, value) in raw_objects {
        let object = decode_object(&id, value);
        city_objects.insert(id, object);
    }

    let (reference_system, geographical_extent) = match raw.metadata {
        Some(meta) => (
            meta.reference_system.as_ref().and_then(scalar_text),
            meta.geographical_extent.as_ref().and_then(extent),
        ),
        None => (None, None),
    };

    Ok(Document {
        version,
        reference_system,
        geographical_extent,
        transform,
        vertices,
        city_objects,
    })
}

/// Decodes one city object. Only the geometry decides whether the object
/// can be built; other badly shaped members are dropped with a warning.
fn decode_object(id: &str, value: Value) -> CityObject {
    let mut object = CityObject {
        id: id.to_owned(),
        ..CityObject::default()
    };
    let raw: RawCityObject = match value {
        Value::Object(_) => match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(object = id, error = %e, "unreadable city object");
                object.malformed = Some(format!("unreadable city object: {e}"));
                return object;
            }
        },
        other => {
            warn!(object = id, "city object is not a JSON object");
            object.malformed = Some(format!("city object must be an object, found {other}"));
            return object;
        }
    };

    match raw.kind {
        Some(Value::String(kind)) => object.kind = kind,
        Some(other) => warn!(object = id, kind = %other, "ignoring non-text type"),
        None => {}
    }

    match raw.attributes {
        Some(Value::Object(members)) => {
            object.attributes = members
                .into_iter()
                .filter_map(|(name, value)| attribute_text(&value).map(|text| (name, text)))
                .collect::<Attributes>();
        }
        None => {}
        Some(other) => warn!(object = id, attributes = %other, "ignoring malformed attributes"),
    }

    match raw.children {
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(child) => object.children.push(child),
                    other => warn!(object = id, child = %other, "ignoring non-text child id"),
                }
            }
        }
        None => {}
        Some(other) => warn!(object = id, children = %other, "ignoring malformed children"),
    }

    match raw.geometry {
        Some(Value::Array(items)) => {
            for (n, item) in items.into_iter().enumerate() {
                match decode_geometry(item) {
                    Ok(geometry) => object.geometries.push(geometry),
                    Err(reason) => {
                        warn!(object = id, geometry = n, "{reason}");
                        object.malformed = Some(reason);
                    }
                }
            }
        }
        None => {}
        Some(other) => {
            warn!(object = id, "geometry is not an array");
            object.malformed = Some(format!("geometry must be an array, found {other}"));
        }
    }

    object
}

fn decode_geometry(value: Value) -> std::result::Result<Geometry, String> {
    if !value.is_object() {
        return Err(format!("geometry entry must be an object, found {value}"));
    }
    let raw: RawGeometry =
        serde_json::from_value(value).map_err(|e| format!("unreadable geometry: {e}"))?;
    Ok(Geometry {
        kind: raw.kind.as_ref().and_then(scalar_text),
        lod: raw.lod.as_ref().and_then(scalar_text),
        boundaries: boundary::classify(&raw.boundaries),
    })
}

/// Text of a string or number; 1.0 documents store `lod` as a number.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Attribute values as the host stores them: text, or compact JSON for
/// nested values. `null` means the attribute is absent.
fn attribute_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn extent(value: &Value) -> Option<[f64; 6]> {
    let items = value.as_array()?;
    if items.len() < 6 {
        return None;
    }
    let mut out = [0.0; 6];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64()?;
    }
    Some(out)
}

use serde_json::Value;

use super::{Boundaries, Ring, Shell};

/// Classifies raw `boundaries` into shells of typed rings.
///
/// The depth of the whole array decides the reading. Depth 3 is a single
/// surface group (MultiSurface, CompositeSurface) whose entries are surfaces.
/// Depth 4 is a list of shells (Solid) and depth 5 a list of solids whose
/// shells are flattened. A surface is a flat index list or a list of index
/// lists (outer loop followed by holes).
pub(crate) fn classify(value: &Value) -> Boundaries {
    match shells(value) {
        Ok(shells) => Boundaries::Shells(shells),
        Err(reason) => Boundaries::Invalid(reason),
    }
}

fn shells(value: &Value) -> Result<Vec<Shell>, String> {
    let entries = value
        .as_array()
        .ok_or_else(|| "boundaries must be an array".to_string())?;
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    match depth(value)? {
        3 => Ok(vec![shell(value)?]),
        4 => entries.iter().map(shell).collect(),
        5 => {
            let mut shells = Vec::new();
            for solid in entries {
                for inner in as_list(solid)? {
                    shells.push(shell(inner)?);
                }
            }
            Ok(shells)
        }
        d => Err(format!("boundaries have nesting depth {d}")),
    }
}

fn shell(value: &Value) -> Result<Shell, String> {
    let rings = as_list(value)?.iter().map(ring).collect::<Result<_, _>>()?;
    Ok(Shell { rings })
}

fn ring(value: &Value) -> Result<Ring, String> {
    match depth(value)? {
        1 => Ok(Ring::SimpleLoop(indices(value)?)),
        2 => Ok(Ring::LoopWithHoles(
            as_list(value)?
                .iter()
                .map(indices)
                .collect::<Result<_, _>>()?,
        )),
        d => Err(format!("surface has nesting depth {d}")),
    }
}

fn indices(value: &Value) -> Result<Vec<usize>, String> {
    as_list(value)?
        .iter()
        .map(|v| {
            v.as_u64()
                .and_then(|i| usize::try_from(i).ok())
                .ok_or_else(|| format!("vertex index {v} is not a non-negative integer"))
        })
        .collect()
}

fn as_list(value: &Value) -> Result<&Vec<Value>, String> {
    value
        .as_array()
        .ok_or_else(|| format!("expected an array, found {value}"))
}

/// Nesting depth: a number is 0, an array is one more than its deepest item.
fn depth(value: &Value) -> Result<usize, String> {
    match value {
        Value::Number(_) => Ok(0),
        Value::Array(items) => {
            let mut deepest = 0;
            for item in items {
                deepest = deepest.max(depth(item)?);
            }
            Ok(deepest + 1)
        }
        other => Err(format!("unexpected boundary value {other}")),
    }
}

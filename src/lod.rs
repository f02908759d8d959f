//! Selection of the single level of detail a document is converted at.

use crate::document::Document;
use crate::error::{LodError, Result};

/// Outcome of scanning the `LoD` labels of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LodChoice {
    /// Exactly one label is present.
    Resolved(String),
    /// Several labels coexist, in first-seen order. The host decides.
    AmbiguousChoice(Vec<String>),
    /// A geometry has no label: templated or pre-`LoD` geometry.
    Unsupported,
    /// The document has no geometry at all.
    NoGeometry,
}

/// External decision used when several levels of detail coexist.
pub trait LodChooser {
    /// Picks one of `candidates`; `None` means the user declined.
    fn choose(&self, candidates: &[String]) -> Option<String>;
}

impl<F> LodChooser for F
where
    F: Fn(&[String]) -> Option<String>,
{
    fn choose(&self, candidates: &[String]) -> Option<String> {
        self(candidates)
    }
}

/// Scans every geometry once and classifies the labels found.
#[must_use]
pub fn select(document: &Document) -> LodChoice {
    let mut labels: Vec<String> = Vec::new();
    for geometry in document.geometries() {
        let Some(lod) = &geometry.lod else {
            return LodChoice::Unsupported;
        };
        if !labels.contains(lod) {
            labels.push(lod.clone());
        }
    }

    match labels.len() {
        0 => LodChoice::NoGeometry,
        1 => LodChoice::Resolved(labels.swap_remove(0)),
        _ => LodChoice::AmbiguousChoice(labels),
    }
}

/// Turns a [`LodChoice`] into the label to build, consulting `chooser` only
/// when the choice is ambiguous. Returns `None` for a document without
/// geometry.
///
/// # Errors
///
/// Returns [`LodError::Unsupported`] for unlabelled geometry,
/// [`LodError::EmptyChoice`] if the chooser declines or answers with an
/// empty label, and [`LodError::UnknownChoice`] if it answers with a label
/// that is not a candidate.
pub fn resolve(choice: LodChoice, chooser: &impl LodChooser) -> Result<Option<String>> {
    match choice {
        LodChoice::Resolved(lod) => Ok(Some(lod)),
        LodChoice::NoGeometry => Ok(None),
        LodChoice::Unsupported => Err(LodError::Unsupported.into()),
        LodChoice::AmbiguousChoice(candidates) => match chooser.choose(&candidates) {
            None => Err(LodError::EmptyChoice.into()),
            Some(lod) if lod.is_empty() => Err(LodError::EmptyChoice.into()),
            Some(lod) if candidates.contains(&lod) => Ok(Some(lod)),
            Some(lod) => Err(LodError::UnknownChoice(lod).into()),
        },
    }
}

/// A chooser that never decides, turning ambiguity into an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChooser;

impl LodChooser for NoChooser {
    fn choose(&self, _candidates: &[String]) -> Option<String> {
        None
    }
}

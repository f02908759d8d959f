//! End-to-end conversion of a CityJSON document into attributed solids.
//!
//! Decoding, site resolution, `LoD` selection and vertex materialisation run
//! once per document; objects are then built independently and their solids
//! handed to a [`SolidSink`] in document order.

mod config;
mod ledger;
mod report;

pub use config::{AnchorPolicy, ConvertParams};
pub use ledger::{DelimitedLedger, ProcessedLedger};
pub use report::{ConversionReport, SkippedObject};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::attributes::{discover_attribute_names, ParentAttributes};
use crate::builder::{ResolvedSolid, ShapeBuilder};
use crate::document::{decode, CityObject, Document};
use crate::error::{CitySolidError, LodError, ReferenceError, Result};
use crate::lod::{self, LodChoice, LodChooser};
use crate::reference::{resolve, PlanarOffset, Reprojector};
use crate::vertices::Materialize;

/// Cooperative cancellation flag, checked between objects.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Objects already built are still emitted.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Receives solids as they are produced, typically to allocate host geometry.
pub trait SolidSink {
    /// Called once, before any solid, with every attribute name solids may carry.
    fn declare_attributes(&mut self, _names: &[String]) {}

    fn accept(&mut self, solid: ResolvedSolid);
}

impl SolidSink for Vec<ResolvedSolid> {
    fn accept(&mut self, solid: ResolvedSolid) {
        self.push(solid);
    }
}

impl<F> SolidSink for F
where
    F: FnMut(ResolvedSolid),
{
    fn accept(&mut self, solid: ResolvedSolid) {
        self(solid);
    }
}

/// Solids of a run collected in memory, with the run's report.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub solids: Vec<ResolvedSolid>,
    pub report: ConversionReport,
}

/// Converts CityJSON text into solids placed in the destination scene.
pub struct Convert<'a, R, C> {
    params: ConvertParams,
    frame: &'a R,
    chooser: &'a C,
    cancel: CancelToken,
}

impl<'a, R, C> Convert<'a, R, C>
where
    R: Reprojector,
    C: LodChooser,
{
    /// Creates a new `Convert` operation.
    ///
    /// `frame` reprojects the document's reference system; `chooser` is
    /// consulted only when several levels of detail coexist.
    #[must_use]
    pub fn new(params: ConvertParams, frame: &'a R, chooser: &'a C) -> Self {
        Self {
            params,
            frame,
            chooser,
            cancel: CancelToken::default(),
        }
    }

    /// Uses `cancel` to abort the run between objects.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Executes the conversion, collecting every solid in memory.
    ///
    /// # Errors
    ///
    /// See [`execute_into`](Self::execute_into).
    pub fn execute(&self, text: &str) -> Result<Conversion> {
        let mut solids = Vec::new();
        let report = self.execute_into(text, &mut solids)?;
        Ok(Conversion { solids, report })
    }

    /// Executes the conversion, handing solids to `sink` in document order.
    ///
    /// Objects with malformed geometry are skipped and listed in the report.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is invalid, its reference system
    /// cannot be reprojected, its geometry carries no `LoD`, or the `LoD`
    /// choice is declined.
    pub fn execute_into(
        &self,
        text: &str,
        sink: &mut impl SolidSink,
    ) -> Result<ConversionReport> {
        let document = decode(text)?;
        info!(
            version = document.version.as_str(),
            objects = document.city_objects.len(),
            vertices = document.vertices.len(),
            "document decoded"
        );

        let mut report = ConversionReport::default();
        let offset = self.place(&document, &mut report)?;

        let choice = lod::select(&document);
        if let LodChoice::AmbiguousChoice(candidates) = &choice {
            let note = LodError::Ambiguous {
                candidates: candidates.clone(),
            }
            .to_string();
            info!("{note}");
            report.warnings.push(note);
        }
        let lod = lod::resolve(choice, self.chooser)?;

        let pool = Materialize::new(offset, self.params.unit_factor).execute(&document);
        report.bounds = pool.bounds();
        report.attribute_names = discover_attribute_names(&document);
        sink.declare_attributes(&report.attribute_names);

        let Some(lod) = lod else {
            info!("document holds no geometry");
            return Ok(report);
        };
        info!(lod = %lod, "level of detail selected");

        let parents = ParentAttributes::build(&document);
        debug!(children = parents.len(), "parent attributes collected");
        let builder = ShapeBuilder::new(&lod, &pool, &parents);
        self.build_objects(&document, &builder, sink, &mut report)?;
        report.lod = Some(lod);

        info!(summary = %report, "conversion finished");
        Ok(report)
    }

    /// Converts the document unless `ledger` already lists `id`, recording
    /// `id` after a run that was not cancelled. Returns `None` when the
    /// document was already converted.
    ///
    /// # Errors
    ///
    /// See [`execute_into`](Self::execute_into). The ledger is left untouched
    /// on error.
    pub fn execute_once(
        &self,
        id: &str,
        text: &str,
        ledger: &mut impl ProcessedLedger,
        sink: &mut impl SolidSink,
    ) -> Result<Option<ConversionReport>> {
        if ledger.contains(id) {
            info!(id, "document already converted");
            return Ok(None);
        }
        let report = self.execute_into(text, sink)?;
        if !report.cancelled {
            ledger.record(id);
        }
        Ok(Some(report))
    }

    /// Resolves the document's site and returns the offset applied to every vertex.
    fn place(&self, document: &Document, report: &mut ConversionReport) -> Result<PlanarOffset> {
        let site = match resolve(document, self.params.anchor, self.frame) {
            Ok(site) => site,
            Err(CitySolidError::Reference(ReferenceError::NoReferenceSystem)) => {
                warn!("no reference system, the document is taken as already in scene space");
                report
                    .warnings
                    .push(ReferenceError::NoReferenceSystem.to_string());
                return Ok(PlanarOffset::ZERO);
            }
            Err(e) => return Err(e),
        };

        debug!(
            code = site.code,
            latitude = site.document_site.latitude,
            longitude = site.document_site.longitude,
            "document site resolved"
        );
        report.site = Some(site);
        match self.params.anchor_policy {
            AnchorPolicy::KeepSite => Ok(site.offset),
            AnchorPolicy::RelocateSite => {
                info!("host site relocated to the document site");
                report.relocated_site = Some(site.document_site);
                Ok(PlanarOffset::ZERO)
            }
        }
    }

    fn build_objects(
        &self,
        document: &Document,
        builder: &ShapeBuilder<'_>,
        sink: &mut impl SolidSink,
        report: &mut ConversionReport,
    ) -> Result<()> {
        let objects: Vec<&CityObject> = document.city_objects.values().collect();

        if self.params.parallel {
            let cancel = &self.cancel;
            let built: Vec<Option<Result<Vec<ResolvedSolid>>>> = objects
                .par_iter()
                .map(|object| (!cancel.is_cancelled()).then(|| builder.build(object)))
                .collect();
            for (object, outcome) in objects.iter().zip(built) {
                let Some(outcome) = outcome else {
                    report.cancelled = true;
                    break;
                };
                emit(object, outcome, sink, report)?;
            }
        } else {
            for object in objects {
                if self.cancel.is_cancelled() {
                    report.cancelled = true;
                    break;
                }
                emit(object, builder.build(object), sink, report)?;
            }
        }

        if report.cancelled {
            warn!(solids = report.solids_emitted, "conversion cancelled");
        }
        Ok(())
    }
}

/// Hands the solids of one object to the sink, or records why it was skipped.
fn emit(
    object: &CityObject,
    outcome: Result<Vec<ResolvedSolid>>,
    sink: &mut impl SolidSink,
    report: &mut ConversionReport,
) -> Result<()> {
    match outcome {
        Ok(solids) => {
            if !solids.is_empty() {
                report.objects_built += 1;
            }
            report.solids_emitted += solids.len();
            for solid in solids {
                sink.accept(solid);
            }
            Ok(())
        }
        Err(e) if !e.is_fatal() => {
            warn!(object = %object.id, error = %e, "object skipped");
            report.skipped.push(SkippedObject {
                id: object.id.clone(),
                reason: e.to_string(),
            });
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Converts `text` with default cancellation, collecting solids in memory.
///
/// # Errors
///
/// See [`Convert::execute_into`].
pub fn convert(
    text: &str,
    params: ConvertParams,
    frame: &impl Reprojector,
    chooser: &impl LodChooser,
) -> Result<Conversion> {
    Convert::new(params, frame, chooser).execute(text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::DocumentError;
    use crate::lod::NoChooser;
    use crate::math::Point2;
    use crate::reference::{Direction, GeodeticPoint};
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    fn frame(
        code: u32,
        direction: Direction,
        p: Point2,
    ) -> std::result::Result<Point2, ReferenceError> {
        if code != 7415 {
            return Err(ReferenceError::UnsupportedFrame(code));
        }
        Ok(match direction {
            Direction::ToGeodetic => Point2::new(p.x / 1000.0, p.y / 1000.0),
            Direction::FromGeodetic => Point2::new(p.x * 1000.0, p.y * 1000.0),
        })
    }

    fn document(metadata: &str, lods: [&str; 2]) -> String {
        format!(
            r#"{{
                "type": "CityJSON", "version": "1.1", {metadata}
                "transform": {{
                    "scale": [0.001, 0.001, 0.001], "translate": [5000.0, 52000.0, 0.0]
                }},
                "vertices": [[0,0,0],[1000,0,0],[1000,1000,0],[0,1000,0]],
                "CityObjects": {{
                    "a": {{ "type": "Road", "geometry": [
                        {{ "type": "MultiSurface", "lod": "{}", "boundaries": [[[0,1,2,3]]] }}
                    ] }},
                    "b": {{ "type": "WaterBody", "geometry": [
                        {{ "type": "MultiSurface", "lod": "{}", "boundaries": [[[0,1,7]]] }}
                    ] }},
                    "c": {{
                        "type": "PlantCover", "attributes": {{ "species": "oak" }},
                        "geometry": [
                            {{ "type": "MultiSurface", "lod": "{}", "boundaries": [[[3,2,1,0]]] }}
                        ]
                    }}
                }}
            }}"#,
            lods[0], lods[1], lods[0]
        )
    }

    const GEOREFERENCED: &str = r#""metadata": {
        "referenceSystem": "https://www.opengis.net/def/crs/EPSG/0/7415"
    },"#;

    fn params() -> ConvertParams {
        ConvertParams::default()
            .with_unit_factor(1.0)
            .with_anchor(GeodeticPoint::new(51.999, 4.999))
    }

    #[test]
    fn malformed_object_is_skipped() {
        let text = document(GEOREFERENCED, ["2.2", "2.2"]);
        let out = convert(&text, params(), &frame, &NoChooser).unwrap();

        let ids: Vec<_> = out.solids.iter().map(|s| s.source_object_id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(out.report.skipped.len(), 1);
        assert_eq!(out.report.skipped[0].id, "b");
        assert_eq!(out.report.solids_emitted, 2);
        assert_eq!(out.report.lod.as_deref(), Some("2.2"));
    }

    #[test]
    fn vertices_are_offset_from_anchor() {
        let text = document(GEOREFERENCED, ["2.2", "2.2"]);
        let out = convert(&text, params(), &frame, &NoChooser).unwrap();

        let site = out.report.site.unwrap();
        assert_relative_eq!(site.offset.dx, 1.0, epsilon = 1e-9);
        assert_relative_eq!(site.offset.dy, 1.0, epsilon = 1e-9);
        let first = out.solids[0].faces[0].outer()[0];
        assert_relative_eq!(first.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(first.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn relocation_drops_the_offset() {
        let text = document(GEOREFERENCED, ["2.2", "2.2"]);
        let params = params().with_anchor_policy(AnchorPolicy::RelocateSite);
        let out = convert(&text, params, &frame, &NoChooser).unwrap();

        let relocated = out.report.relocated_site.unwrap();
        assert_relative_eq!(relocated.latitude, 52.0, epsilon = 1e-12);
        assert_relative_eq!(relocated.longitude, 5.0, epsilon = 1e-12);
        let bounds = out.report.bounds.unwrap();
        assert_relative_eq!(bounds.min.x, 0.0);
        assert_relative_eq!(bounds.max.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn missing_reference_system_is_a_warning() {
        let text = document("", ["2.2", "2.2"]);
        let out = convert(&text, params(), &frame, &NoChooser).unwrap();
        assert!(out.report.site.is_none());
        assert_eq!(out.report.warnings.len(), 1);
        assert_eq!(out.solids.len(), 2);
    }

    #[test]
    fn reprojection_failure_is_fatal() {
        let text = document(r#""metadata": { "referenceSystem": "EPSG:2056" },"#, ["2.2", "2.2"]);
        assert!(matches!(
            convert(&text, params(), &frame, &NoChooser),
            Err(CitySolidError::Reference(ReferenceError::UnsupportedFrame(2056)))
        ));
    }

    #[test]
    fn invalid_document_aborts() {
        let mut sink: Vec<ResolvedSolid> = Vec::new();
        let err = Convert::new(params(), &frame, &NoChooser)
            .execute_into("{ \"type\": \"CityJSON\" }", &mut sink)
            .unwrap_err();
        assert!(matches!(err, CitySolidError::Document(DocumentError::InvalidDocument { .. })));
        assert!(sink.is_empty());
    }

    #[test]
    fn ambiguous_lod_is_delegated() {
        let text = document(GEOREFERENCED, ["1.2", "2.2"]);
        assert!(matches!(
            convert(&text, params(), &frame, &NoChooser),
            Err(CitySolidError::Lod(LodError::EmptyChoice))
        ));

        let pick = |c: &[String]| c.first().cloned();
        let out = convert(&text, params(), &frame, &pick).unwrap();
        assert_eq!(out.report.lod.as_deref(), Some("1.2"));
        assert_eq!(out.solids.len(), 2);
        assert!(out.report.skipped.is_empty());
    }

    #[test]
    fn parallel_run_keeps_document_order() {
        let text = document(GEOREFERENCED, ["2.2", "2.2"]);
        let sequential = convert(&text, params(), &frame, &NoChooser).unwrap();
        let parallel = convert(&text, params().with_parallel(true), &frame, &NoChooser).unwrap();
        assert_eq!(sequential.solids, parallel.solids);
        assert_eq!(sequential.report.skipped, parallel.report.skipped);
    }

    #[test]
    fn cancelled_before_start_emits_nothing() {
        let text = document(GEOREFERENCED, ["2.2", "2.2"]);
        let cancel = CancelToken::new();
        cancel.cancel();
        let out = Convert::new(params(), &frame, &NoChooser)
            .with_cancel(cancel)
            .execute(&text)
            .unwrap();
        assert!(out.report.cancelled);
        assert!(out.solids.is_empty());
    }

    #[test]
    fn cancellation_between_objects() {
        let text = document(GEOREFERENCED, ["2.2", "2.2"]);
        let cancel = CancelToken::new();
        let convert = Convert::new(params(), &frame, &NoChooser).with_cancel(cancel.clone());
        let mut seen = Vec::new();
        let mut sink = |solid: ResolvedSolid| {
            seen.push(solid.source_object_id);
            cancel.cancel();
        };
        let report = convert.execute_into(&text, &mut sink).unwrap();
        assert!(report.cancelled);
        assert_eq!(seen, ["a"]);
    }

    #[test]
    fn ledger_admits_a_document_once() {
        let text = document(GEOREFERENCED, ["2.2", "2.2"]);
        let convert = Convert::new(params(), &frame, &NoChooser);
        let mut ledger: HashSet<String> = HashSet::new();
        let mut sink = Vec::new();

        let first = convert
            .execute_once("delft.json", &text, &mut ledger, &mut sink)
            .unwrap();
        assert!(first.is_some());
        let second = convert
            .execute_once("delft.json", &text, &mut ledger, &mut sink)
            .unwrap();
        assert!(second.is_none());
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn attribute_names_are_declared_first() {
        struct Recorder {
            names: Vec<String>,
            solids_before_names: usize,
            solids: usize,
        }
        impl SolidSink for Recorder {
            fn declare_attributes(&mut self, names: &[String]) {
                self.solids_before_names = self.solids;
                self.names = names.to_vec();
            }
            fn accept(&mut self, _solid: ResolvedSolid) {
                self.solids += 1;
            }
        }

        let text = document(GEOREFERENCED, ["2.2", "2.2"]);
        let mut recorder = Recorder {
            names: vec![],
            solids_before_names: usize::MAX,
            solids: 0,
        };
        Convert::new(params(), &frame, &NoChooser)
            .execute_into(&text, &mut recorder)
            .unwrap();
        assert_eq!(recorder.solids_before_names, 0);
        assert_eq!(recorder.names, ["species", "Object Name", "Object Type"]);
        assert_eq!(recorder.solids, 2);
    }
}

use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::builder::FaceLoops;
use crate::error::{Result, TessellationError};
use crate::math::polygon_3d::PlaneFrame;
use crate::math::{Point2, Point3};

use super::{TessellationParams, TriangleMesh};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Tessellates one planar face with holes into a triangle mesh.
///
/// The loops are flattened onto the best-fit plane of the outer loop and
/// triangulated with a constrained Delaunay triangulation; triangles are
/// wound counter-clockwise around the outer loop's normal.
pub struct TessellateFace<'a> {
    face: &'a FaceLoops,
    params: TessellationParams,
}

impl<'a> TessellateFace<'a> {
    /// Creates a new `TessellateFace` operation.
    #[must_use]
    pub fn new(face: &'a FaceLoops, params: TessellationParams) -> Self {
        Self { face, params }
    }

    /// Executes the tessellation, returning a triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the outer loop is degenerate or a point cannot be
    /// inserted into the triangulation.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        let outer = self.face.outer();
        let frame = PlaneFrame::of_polygon(outer)
            .ok_or_else(|| TessellationError::Failed("degenerate outer loop".into()))?;
        let normal = *frame.normal();

        let mut cdt = Cdt::new();
        for ring in &self.face.loops {
            let flat = self.flatten(&frame, ring);
            if flat.len() >= 3 {
                insert_constraint_loop(&mut cdt, &flat)?;
            }
        }

        let interior = classify_interior_faces(&cdt);
        let mut mesh = TriangleMesh::default();
        let mut vertex_map: HashMap<usize, u32> = HashMap::new();

        for face_handle in cdt.inner_faces() {
            if !interior.contains(&face_handle.fix().index()) {
                continue;
            }

            let mut triangle = [0u32; 3];
            for (slot, vh) in triangle.iter_mut().zip(face_handle.vertices()) {
                let idx = vh.fix().index();
                *slot = *vertex_map.entry(idx).or_insert_with(|| {
                    let pos = vh.position();
                    let uv = Point2::new(pos.x, pos.y);
                    mesh.vertices.push(frame.lift(&uv));
                    mesh.normals.push(normal);
                    mesh.uvs.push(uv);
                    (mesh.vertices.len() - 1) as u32
                });
            }
            mesh.indices.push(triangle);
        }

        Ok(mesh)
    }

    /// Projects a loop into the frame, skipping points within tolerance of
    /// their predecessor.
    fn flatten(&self, frame: &PlaneFrame, ring: &[Point3]) -> Vec<SpadePoint2<f64>> {
        let mut flat: Vec<Point2> = Vec::with_capacity(ring.len());
        for p in ring {
            let uv = frame.project(p);
            if flat
                .last()
                .map_or(true, |last| (uv - last).norm() > self.params.tolerance)
            {
                flat.push(uv);
            }
        }
        if flat.len() > 1 && (flat[0] - flat[flat.len() - 1]).norm() <= self.params.tolerance {
            flat.pop();
        }
        flat.into_iter().map(|p| SpadePoint2::new(p.x, p.y)).collect()
    }
}

/// Inserts a closed loop as a chain of constraint edges.
fn insert_constraint_loop(cdt: &mut Cdt, points: &[SpadePoint2<f64>]) -> Result<()> {
    let mut handles = Vec::with_capacity(points.len());
    for &pt in points {
        let h = cdt
            .insert(pt)
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for (i, &from) in handles.iter().enumerate() {
        let to = handles[(i + 1) % handles.len()];
        if from != to && cdt.can_add_constraint(from, to) {
            cdt.add_constraint(from, to);
        }
    }
    Ok(())
}

/// Flood-fills the triangulation from the convex hull inwards; each crossed
/// constraint edge flips inside/outside. Odd depth is interior, so holes
/// come out at even depth.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let n_idx = neighbor.fix().index();
            if depth_map.contains_key(&n_idx) {
                continue;
            }
            let crossed = cdt.is_constraint_edge(edge.as_undirected().fix());
            let new_depth = depth + u32::from(crossed);
            depth_map.insert(n_idx, new_depth);
            if new_depth % 2 == 1 {
                interior.insert(n_idx);
            }
            queue.push_back((neighbor.fix(), new_depth));
        }
    }

    interior
}

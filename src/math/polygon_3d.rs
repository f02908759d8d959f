use super::{Point2, Point3, Vector3, TOLERANCE};

/// Computes the unit normal of a polygon using Newell's method.
///
/// Returns `None` when the polygon is degenerate (collinear or fewer than
/// three points).
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Option<Vector3> {
    let n = points.len();
    if n < 3 {
        return None;
    }
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    let len = normal.norm();
    if len < TOLERANCE {
        return None;
    }
    Some(normal / len)
}

/// An orthonormal 2D frame lying in the plane of a polygon.
///
/// Used to flatten coplanar loops before 2D triangulation.
#[derive(Debug, Clone, Copy)]
pub struct PlaneFrame {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl PlaneFrame {
    /// Builds a frame at `origin` whose third axis is `normal`.
    #[must_use]
    pub fn new(origin: Point3, normal: Vector3) -> Self {
        // Choose a reference vector not parallel to the normal
        let reference = if normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u_dir = normal.cross(&reference).normalize();
        let v_dir = normal.cross(&u_dir);
        Self {
            origin,
            u_dir,
            v_dir,
            normal,
        }
    }

    /// Builds the frame of a polygon, or `None` if it is degenerate.
    #[must_use]
    pub fn of_polygon(points: &[Point3]) -> Option<Self> {
        let normal = newell_normal(points)?;
        Some(Self::new(points[0], normal))
    }

    /// Returns the frame's unit normal.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Projects a point into the frame's `(u, v)` coordinates.
    #[must_use]
    pub fn project(&self, point: &Point3) -> Point2 {
        let d = point - self.origin;
        Point2::new(d.dot(&self.u_dir), d.dot(&self.v_dir))
    }

    /// Lifts `(u, v)` coordinates back onto the plane.
    #[must_use]
    pub fn lift(&self, uv: &Point2) -> Point3 {
        self.origin + self.u_dir * uv.x + self.v_dir * uv.y
    }
}

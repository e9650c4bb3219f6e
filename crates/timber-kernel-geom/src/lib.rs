#![warn(missing_docs)]

//! Frames, line segments and box solids for the timber joinery kernel.
//!
//! Provides the small set of analytic types that beam and dowel geometry is
//! built from: oriented frames (planes with a full coordinate system),
//! finite lines with extension and scaling, line–plane intersection,
//! least-squares line fitting, and oriented box solids.

use nalgebra::{Matrix3, SymmetricEigen};
use timber_kernel_math::{Dir3, Point3, Tolerance, Transform, Vec3};

// =============================================================================
// Frame
// =============================================================================

/// An oriented plane: an origin plus a right-handed orthonormal frame.
///
/// Parameterization: `P(u, v) = origin + u * x_dir + v * y_dir`, with
/// `normal_dir = x_dir × y_dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Origin point on the plane.
    pub origin: Point3,
    /// Unit vector along the u direction.
    pub x_dir: Dir3,
    /// Unit vector along the v direction.
    pub y_dir: Dir3,
    /// Unit normal (x_dir × y_dir).
    pub normal_dir: Dir3,
}

impl Frame {
    /// Create a frame from origin and two direction vectors.
    ///
    /// `x_dir` is normalized as given; `y_dir` is made orthogonal to it
    /// before normalizing, so only the plane spanned by the two vectors and
    /// the side `y_dir` points to matter. A zero `x_dir`, or a `y_dir`
    /// parallel to it, gives NaN axes; use [`Frame::try_new`] for input that
    /// has not been checked.
    pub fn new(origin: Point3, x_dir: Vec3, y_dir: Vec3) -> Self {
        let x = Dir3::new_normalize(x_dir);
        let y = Dir3::new_normalize(y_dir - y_dir.dot(x.as_ref()) * x.as_ref());
        let n = Dir3::new_normalize(x.as_ref().cross(y.as_ref()));
        Self {
            origin,
            x_dir: x,
            y_dir: y,
            normal_dir: n,
        }
    }

    /// Checked [`Frame::new`]: `None` when any input is non-finite, `x_dir`
    /// is zero, or `y_dir` has no component orthogonal to `x_dir`.
    pub fn try_new(origin: Point3, x_dir: Vec3, y_dir: Vec3) -> Option<Self> {
        let finite = |v: &Vec3| v.iter().all(|c| c.is_finite());
        if !(finite(&origin.coords) && finite(&x_dir) && finite(&y_dir)) {
            return None;
        }
        let x = Dir3::try_new(x_dir, f64::EPSILON)?;
        let y_perp = y_dir - y_dir.dot(x.as_ref()) * x.as_ref();
        let y = Dir3::try_new(y_perp, Tolerance::DEFAULT.angular * y_dir.norm())?;
        let n = Dir3::new_normalize(x.as_ref().cross(y.as_ref()));
        Some(Self {
            origin,
            x_dir: x,
            y_dir: y,
            normal_dir: n,
        })
    }

    /// Create a frame from origin and normal. X/Y directions are chosen arbitrarily.
    pub fn from_normal(origin: Point3, normal: Vec3) -> Self {
        let n = Dir3::new_normalize(normal);
        let arbitrary = if n.as_ref().x.abs() < 0.9 {
            Vec3::x()
        } else {
            Vec3::y()
        };
        let y = Dir3::new_normalize(n.as_ref().cross(&arbitrary));
        let x = Dir3::new_normalize(y.as_ref().cross(n.as_ref()));
        Self {
            origin,
            x_dir: x,
            y_dir: y,
            normal_dir: n,
        }
    }

    /// World XY frame at the origin.
    pub fn world_xy() -> Self {
        Self::new(Point3::origin(), Vec3::x(), Vec3::y())
    }

    /// Unit X axis as a plain vector.
    pub fn x_axis(&self) -> Vec3 {
        *self.x_dir.as_ref()
    }

    /// Unit Y axis as a plain vector.
    pub fn y_axis(&self) -> Vec3 {
        *self.y_dir.as_ref()
    }

    /// Unit normal as a plain vector.
    pub fn normal(&self) -> Vec3 {
        *self.normal_dir.as_ref()
    }

    /// Point at `(u, v)` in this frame's plane.
    pub fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.origin + u * self.x_dir.as_ref() + v * self.y_dir.as_ref()
    }

    /// Signed distance from a point to this plane.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(self.normal_dir.as_ref())
    }

    /// Same orientation, moved by `offset`.
    pub fn translated(&self, offset: &Vec3) -> Self {
        Self {
            origin: self.origin + offset,
            ..self.clone()
        }
    }

    /// Same orientation, moved to `origin`.
    pub fn with_origin(&self, origin: Point3) -> Self {
        Self {
            origin,
            ..self.clone()
        }
    }

    /// Apply a rigid transform, returning a new frame.
    ///
    /// The axes are renormalized, which keeps the frame orthonormal under
    /// rigid motions; non-rigid transforms are not meaningful here.
    pub fn transform(&self, t: &Transform) -> Self {
        let origin = t.apply_point(&self.origin);
        let x = t.apply_vec(self.x_dir.as_ref());
        let y = t.apply_vec(self.y_dir.as_ref());
        Self::new(origin, x, y)
    }

    /// The transform that maps the world frame onto this frame.
    pub fn to_world_transform(&self) -> Transform {
        Transform::from_basis(
            &self.origin,
            self.x_dir.as_ref(),
            self.y_dir.as_ref(),
            self.normal_dir.as_ref(),
        )
    }

    /// The rigid transform taking `src` onto `dst`: the origin of `src` lands
    /// on the origin of `dst` and each axis on the matching axis.
    pub fn plane_to_plane(src: &Frame, dst: &Frame) -> Transform {
        // src axes are orthonormal, so the inverse is the transposed basis
        let to_src = src.to_world_transform();
        let mut inv = to_src.clone();
        let r = to_src.matrix.fixed_view::<3, 3>(0, 0).transpose();
        let o = -(r * src.origin.coords);
        for i in 0..3 {
            for j in 0..3 {
                inv.matrix[(i, j)] = r[(i, j)];
            }
            inv.matrix[(i, 3)] = o[i];
        }
        dst.to_world_transform().then(&inv)
    }
}

// =============================================================================
// Line3d
// =============================================================================

/// A finite 3D line segment defined by origin and direction.
///
/// Parameterization: `P(t) = origin + t * direction`, with `t = 0` at the
/// start and `t = 1` at the end. Parameters outside `[0, 1]` address the
/// infinite carrier line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line3d {
    /// Starting point.
    pub origin: Point3,
    /// Direction; its magnitude is the segment length.
    pub direction: Vec3,
}

impl Line3d {
    /// Create a line from two endpoints, parameterized so `t=0` gives `start`
    /// and `t=1` gives `end`.
    pub fn from_points(start: Point3, end: Point3) -> Self {
        Self {
            origin: start,
            direction: end - start,
        }
    }

    /// Start point.
    pub fn start(&self) -> Point3 {
        self.origin
    }

    /// End point.
    pub fn end(&self) -> Point3 {
        self.origin + self.direction
    }

    /// Midpoint.
    pub fn midpoint(&self) -> Point3 {
        self.origin + 0.5 * self.direction
    }

    /// Evaluate the carrier line at parameter `t`.
    pub fn point_at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction
    }

    /// Segment length.
    pub fn length(&self) -> f64 {
        self.direction.norm()
    }

    /// Unit direction, or `None` for a zero-length segment.
    pub fn unit_direction(&self) -> Option<Dir3> {
        Dir3::try_new(self.direction, f64::EPSILON)
    }

    /// Lengthen the segment by `start_len` before its start and `end_len`
    /// past its end. Negative values shorten it.
    pub fn extend(&self, start_len: f64, end_len: f64) -> Option<Self> {
        let dir = self.unit_direction()?;
        let start = self.start() - start_len * dir.as_ref();
        let end = self.end() + end_len * dir.as_ref();
        Some(Self::from_points(start, end))
    }

    /// Scale the segment about its midpoint by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        let mid = self.midpoint();
        let half = 0.5 * factor * self.direction;
        Self::from_points(mid - half, mid + half)
    }

    /// Distance from a point to the infinite carrier line.
    pub fn distance_to_carrier(&self, p: &Point3) -> f64 {
        match self.unit_direction() {
            Some(dir) => {
                let d = p - self.origin;
                (d - d.dot(dir.as_ref()) * dir.as_ref()).norm()
            }
            None => (p - self.origin).norm(),
        }
    }

    /// Apply a transform to both endpoints.
    pub fn transform(&self, t: &Transform) -> Self {
        Self::from_points(t.apply_point(&self.start()), t.apply_point(&self.end()))
    }
}

// =============================================================================
// Intersection and fitting
// =============================================================================

/// Intersect the infinite carrier of `line` with `plane`.
///
/// Returns the line parameter of the hit, or `None` if the line is parallel
/// to the plane (or has zero length).
pub fn intersect_line_plane(line: &Line3d, plane: &Frame) -> Option<f64> {
    let normal = plane.normal_dir.as_ref();
    let denom = line.direction.dot(normal);

    if denom.abs() < 1e-12 * line.length().max(1.0) {
        return None;
    }

    Some((plane.origin - line.origin).dot(normal) / denom)
}

/// Least-squares line through `points`.
///
/// The carrier passes through the centroid along the principal axis of the
/// point scatter. The returned segment spans the projections of the points
/// onto that axis and is oriented from the first point toward the last.
/// Returns `None` for fewer than two points or when all points coincide.
pub fn fit_line_to_points(points: &[Point3]) -> Option<Line3d> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let centroid = points.iter().fold(Vec3::zeros(), |acc, p| acc + p.coords) / n;

    let mut cov: Matrix3<f64> = Matrix3::zeros();
    for p in points {
        let d = p.coords - centroid;
        cov += d * d.transpose();
    }

    let eigen = SymmetricEigen::new(cov);
    let (idx, max_val) = eigen
        .eigenvalues
        .iter()
        .enumerate()
        .fold((0, f64::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best });

    if max_val <= Tolerance::DEFAULT.linear * Tolerance::DEFAULT.linear {
        return None;
    }

    let mut axis: Vec3 = eigen.eigenvectors.column(idx).into_owned();
    let span = points[points.len() - 1] - points[0];
    if axis.dot(&span) < 0.0 {
        axis = -axis;
    }

    let (t_min, t_max) = points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
        let t = (p.coords - centroid).dot(&axis);
        (lo.min(t), hi.max(t))
    });

    let c = Point3::from(centroid);
    Some(Line3d::from_points(c + t_min * axis, c + t_max * axis))
}

// =============================================================================
// BoxSolid
// =============================================================================

/// A box expressed in a local frame: intervals along the frame's X, Y and
/// normal axes.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSolid {
    /// Local frame of the box.
    pub frame: Frame,
    /// Extent along the frame X axis `(min, max)`.
    pub x: (f64, f64),
    /// Extent along the frame Y axis `(min, max)`.
    pub y: (f64, f64),
    /// Extent along the frame normal `(min, max)`.
    pub z: (f64, f64),
}

impl BoxSolid {
    /// Box of size `(sx, sy, sz)` centered at the frame origin.
    pub fn centered(frame: Frame, sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            frame,
            x: (-0.5 * sx, 0.5 * sx),
            y: (-0.5 * sy, 0.5 * sy),
            z: (-0.5 * sz, 0.5 * sz),
        }
    }

    /// Edge lengths along X, Y and normal.
    pub fn dimensions(&self) -> Vec3 {
        Vec3::new(self.x.1 - self.x.0, self.y.1 - self.y.0, self.z.1 - self.z.0)
    }

    /// Enclosed volume.
    pub fn volume(&self) -> f64 {
        let d = self.dimensions();
        d.x * d.y * d.z
    }

    /// World-space center.
    pub fn center(&self) -> Point3 {
        self.local_to_world(
            0.5 * (self.x.0 + self.x.1),
            0.5 * (self.y.0 + self.y.1),
            0.5 * (self.z.0 + self.z.1),
        )
    }

    /// The 8 corners in world space, bottom face first (counter-clockwise
    /// seen from +normal), then the top face in the same order.
    pub fn corners(&self) -> [Point3; 8] {
        let (x0, x1) = self.x;
        let (y0, y1) = self.y;
        let (z0, z1) = self.z;
        [
            self.local_to_world(x0, y0, z0),
            self.local_to_world(x1, y0, z0),
            self.local_to_world(x1, y1, z0),
            self.local_to_world(x0, y1, z0),
            self.local_to_world(x0, y0, z1),
            self.local_to_world(x1, y0, z1),
            self.local_to_world(x1, y1, z1),
            self.local_to_world(x0, y1, z1),
        ]
    }

    /// Whether a world-space point lies inside the box (boundary included,
    /// within `tol.linear`).
    pub fn contains(&self, p: &Point3, tol: &Tolerance) -> bool {
        let d = p - self.frame.origin;
        let u = d.dot(self.frame.x_dir.as_ref());
        let v = d.dot(self.frame.y_dir.as_ref());
        let w = d.dot(self.frame.normal_dir.as_ref());
        let inside =
            |val: f64, (lo, hi): (f64, f64)| val >= lo - tol.linear && val <= hi + tol.linear;
        inside(u, self.x) && inside(v, self.y) && inside(w, self.z)
    }

    fn local_to_world(&self, u: f64, v: f64, w: f64) -> Point3 {
        self.frame.point_at(u, v) + w * self.frame.normal_dir.as_ref()
    }
}

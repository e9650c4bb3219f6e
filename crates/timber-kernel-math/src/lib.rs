#![warn(missing_docs)]

//! Math types for the timber joinery kernel.
//!
//! Thin wrappers around nalgebra providing the domain types used to place
//! beams and dowel holes: points, vectors, directions, rigid transforms,
//! and tolerance constants.

use nalgebra::{Matrix3, Matrix4, Rotation3, Unit, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A 4x4 affine transformation matrix.
///
/// Beam geometry only ever moves rigidly; [`Transform::is_rigid`] tells a
/// caller whether a matrix qualifies.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        Self::rotation_about_axis(&Vec3::x_axis(), angle)
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        Self::rotation_about_axis(&Vec3::z_axis(), angle)
    }

    /// Rotation about an axis through the origin by `angle` radians
    /// (counter-clockwise looking down the axis).
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        Self {
            matrix: Rotation3::from_axis_angle(axis, angle).to_homogeneous(),
        }
    }

    /// Map the world frame onto the frame `(origin, x, y, z)`.
    ///
    /// The axis vectors become the columns of the rotation block, so the
    /// result is rigid exactly when the axes are orthonormal and right-handed.
    pub fn from_basis(origin: &Point3, x: &Vec3, y: &Vec3, z: &Vec3) -> Self {
        let mut m = Matrix4::identity();
        for (col, axis) in [x, y, z].into_iter().enumerate() {
            m[(0, col)] = axis.x;
            m[(1, col)] = axis.y;
            m[(2, col)] = axis.z;
        }
        m[(0, 3)] = origin.x;
        m[(1, 3)] = origin.y;
        m[(2, 3)] = origin.z;
        Self { matrix: m }
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// As a matrix product, `a.then(&b)` applies `b` first and `a` second.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.matrix.transform_point(p)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.matrix.transform_vector(v)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// Whether this is a proper rigid motion: orthonormal rotation block with
    /// determinant +1 and an affine bottom row.
    pub fn is_rigid(&self, tol: &Tolerance) -> bool {
        let r: Matrix3<f64> = self.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let gram = r.transpose() * r - Matrix3::identity();
        let row = self.matrix.fixed_view::<1, 4>(3, 0);
        gram.amax() < tol.linear
            && (r.determinant() - 1.0).abs() < tol.linear
            && row[0].abs() < tol.linear
            && row[1].abs() < tol.linear
            && row[2].abs() < tol.linear
            && (row[3] - 1.0).abs() < tol.linear
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 mm linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Check if an angle is effectively zero or a half turn, i.e. the two
    /// directions it was measured between are parallel.
    pub fn is_parallel_angle(&self, angle: f64) -> bool {
        angle.sin().abs() < self.angular
    }
}

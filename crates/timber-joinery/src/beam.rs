//! As-built beams and the dowels attached to them.
//!
//! [`JointBeam`] is the narrow capability the joint solver and the
//! fabrication export need from a beam. [`Beam`] is the plain implementation
//! used throughout the crate; other beam models can implement the trait
//! directly.

use timber_kernel_geom::{Frame, Line3d};
use timber_kernel_math::{Point3, Vec3};

/// What joint and fabrication code reads from and writes to a beam.
pub trait JointBeam {
    /// Frame at the beam center: X along the beam, Y across its width,
    /// normal across its height.
    fn base_frame(&self) -> &Frame;

    /// Stock length along X.
    fn dx(&self) -> f64;

    /// Width along Y.
    fn dy(&self) -> f64;

    /// Height along the normal.
    fn dz(&self) -> f64;

    /// Grow the stock length by `delta`.
    fn extend(&mut self, delta: f64);

    /// Dowels attached so far, in attachment order.
    fn dowels(&self) -> &[Dowel];

    /// Attach a dowel.
    fn add_dowel(&mut self, dowel: Dowel);

    /// Safety stock kept at each end.
    fn extension(&self) -> f64;

    /// Dowel cover kept at each end.
    fn end_cover(&self) -> f64;

    /// Design centerline, `t = 0` at the `-X` end and `t = 1` at the `+X` end.
    fn baseline(&self) -> Line3d;
}

/// A beam as placed in the structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    /// Frame at the beam center.
    pub base_frame: Frame,
    /// Design length of the centerline.
    pub length: f64,
    /// Stock length; starts at `length` and grows as joints extend the beam.
    pub dx: f64,
    /// Width.
    pub dy: f64,
    /// Height.
    pub dz: f64,
    /// Safety stock at each end.
    pub extension: f64,
    /// Dowel cover at each end.
    pub end_cover: f64,
    dowels: Vec<Dowel>,
}

impl Beam {
    /// Beam centered on `base_frame` with the given design length and section.
    pub fn new(base_frame: Frame, length: f64, dy: f64, dz: f64) -> Self {
        Self {
            base_frame,
            length,
            dx: length,
            dy,
            dz,
            extension: 0.0,
            end_cover: 0.0,
            dowels: Vec::new(),
        }
    }

    /// Beam whose centerline runs from `start` to `end`, with its width
    /// direction taken from `width_hint` (made orthogonal to the centerline).
    pub fn from_centerline(start: Point3, end: Point3, width_hint: Vec3, dy: f64, dz: f64) -> Self {
        let axis = end - start;
        let frame = Frame::new(Point3::from((start.coords + end.coords) * 0.5), axis, width_hint);
        Self::new(frame, axis.norm(), dy, dz)
    }

    /// Set the end stock values.
    pub fn with_end_stock(mut self, extension: f64, end_cover: f64) -> Self {
        self.extension = extension;
        self.end_cover = end_cover;
        self
    }
}

impl JointBeam for Beam {
    fn base_frame(&self) -> &Frame {
        &self.base_frame
    }

    fn dx(&self) -> f64 {
        self.dx
    }

    fn dy(&self) -> f64 {
        self.dy
    }

    fn dz(&self) -> f64 {
        self.dz
    }

    fn extend(&mut self, delta: f64) {
        self.dx += delta;
    }

    fn dowels(&self) -> &[Dowel] {
        &self.dowels
    }

    fn add_dowel(&mut self, dowel: Dowel) {
        self.dowels.push(dowel);
    }

    fn extension(&self) -> f64 {
        self.extension
    }

    fn end_cover(&self) -> f64 {
        self.end_cover
    }

    fn baseline(&self) -> Line3d {
        let half = 0.5 * self.length * self.base_frame.x_dir.as_ref();
        Line3d::from_points(self.base_frame.origin - half, self.base_frame.origin + half)
    }
}

/// A straight bore axis shared by the beams of one joint.
#[derive(Debug, Clone, PartialEq)]
pub struct Dowel {
    line: Line3d,
    hole: Option<Frame>,
    radius: Option<f64>,
}

impl Dowel {
    /// Dowel along `line`.
    pub fn new(line: Line3d) -> Self {
        Self {
            line,
            hole: None,
            radius: None,
        }
    }

    /// The axis, scaled about its midpoint by `scale_value`.
    pub fn get_line(&self, scale_value: f64) -> Line3d {
        self.line.scaled(scale_value)
    }

    /// Drilling orientation: the assigned hole frame, or a frame at the axis
    /// midpoint whose normal runs along the axis.
    pub fn get_plane(&self) -> Frame {
        match &self.hole {
            Some(frame) => frame.clone(),
            None => Frame::from_normal(self.line.midpoint(), self.line.direction),
        }
    }

    /// Record the hole frame and bore radius chosen for this dowel.
    pub fn assign_hole(&mut self, frame: Frame, radius: f64) {
        self.hole = Some(frame);
        self.radius = Some(radius);
    }

    /// Bore radius, once assigned.
    pub fn radius(&self) -> Option<f64> {
        self.radius
    }

    /// The unscaled axis.
    pub fn line(&self) -> &Line3d {
        &self.line
    }
}

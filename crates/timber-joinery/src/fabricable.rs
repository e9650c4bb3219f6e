//! Fabrication-ready beams: an oriented stock box plus drill frames.

use timber_kernel_geom::{intersect_line_plane, BoxSolid, Frame, Line3d};
use timber_kernel_math::{Tolerance, Transform};

use crate::beam::JointBeam;
use crate::config::FabricationConfig;
use crate::error::{JoineryError, Result};

/// Half-length of the construction line cast along a hole axis. Anything
/// longer than the thickest beam works; the line is only intersected.
const HOLE_AXIS_REACH: f64 = 9999.0;

/// Factor a dowel axis is scaled by before its entry point is located.
pub const DEFAULT_DOWEL_SCALE: f64 = 1.2;

fn frame_is_finite(frame: &Frame) -> bool {
    frame
        .origin
        .iter()
        .chain(frame.x_axis().iter())
        .chain(frame.y_axis().iter())
        .chain(frame.normal().iter())
        .all(|c| c.is_finite())
}

/// A beam reduced to what the CNC needs: its stock box and the frames of
/// the holes to drill.
///
/// Every operation returns a new value; a `FabricableBeam` is never changed
/// in place.
#[derive(Debug, Clone, PartialEq)]
pub struct FabricableBeam {
    base_frame: Frame,
    dx: f64,
    dy: f64,
    dz: f64,
    holes: Vec<Frame>,
}

impl FabricableBeam {
    /// Beam with stock box `dx × dy × dz` centered on `base_frame`.
    ///
    /// Fails with [`JoineryError::InvalidDimensions`] unless all three
    /// dimensions are positive and finite, and with
    /// [`JoineryError::InvalidFrame`] if a frame has NaN or infinite parts.
    pub fn new(base_frame: Frame, dx: f64, dy: f64, dz: f64, holes: Vec<Frame>) -> Result<Self> {
        for (name, value) in [("dx", dx), ("dy", dy), ("dz", dz)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(JoineryError::InvalidDimensions(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !frame_is_finite(&base_frame) {
            return Err(JoineryError::InvalidFrame("base frame has non-finite components".into()));
        }
        if let Some(i) = holes.iter().position(|h| !frame_is_finite(h)) {
            return Err(JoineryError::InvalidFrame(format!("hole {i} has non-finite components")));
        }
        Ok(Self {
            base_frame,
            dx,
            dy,
            dz,
            holes,
        })
    }

    /// Frame at the center of the stock box.
    pub fn base_frame(&self) -> &Frame {
        &self.base_frame
    }

    /// Length along the frame X axis.
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Width along the frame Y axis.
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Height along the frame normal.
    pub fn dz(&self) -> f64 {
        self.dz
    }

    /// Hole frames: origin at the drill entry point, normal along the drill.
    pub fn holes(&self) -> &[Frame] {
        &self.holes
    }

    /// Copy of this beam moved by a rigid transform.
    pub fn transform(&self, t: &Transform) -> Self {
        Self {
            base_frame: self.base_frame.transform(t),
            dx: self.dx,
            dy: self.dy,
            dz: self.dz,
            holes: self.holes.iter().map(|h| h.transform(t)).collect(),
        }
    }

    /// The stock box, centered on the base frame.
    pub fn create_box_solid(&self) -> BoxSolid {
        BoxSolid::centered(self.base_frame.clone(), self.dx, self.dy, self.dz)
    }

    /// End-cut planes of the stock: at `+X·dx/2` facing `+X`, and at
    /// `-X·dx/2` facing `-X`.
    pub fn end_cut_frames(&self) -> (Frame, Frame) {
        let half = 0.5 * self.dx * self.base_frame.x_axis();
        let y = self.base_frame.y_axis();
        let z = self.base_frame.normal();
        let start = Frame::new(self.base_frame.origin + half, y, z);
        let end = Frame::new(self.base_frame.origin - half, -y, z);
        (start, end)
    }

    /// Bore line for every hole, long enough to clear both beam faces.
    ///
    /// The segment between the two faces is lengthened on each end by
    /// `(diff + extension) / 2`, with
    /// `diff = dz / (2 sin θ) + |dowel_radius / tan θ|` and θ the angle
    /// between the beam normal and the hole axis. A hole axis parallel to
    /// the beam normal gives [`JoineryError::DegenerateAngle`]; one lying in
    /// the face plane gives [`JoineryError::NoIntersection`].
    pub fn get_dowel_lines(&self, extension: f64, dowel_radius: f64) -> Result<Vec<Line3d>> {
        let normal = self.base_frame.normal();
        let half_dz = 0.5 * self.dz;
        let top = self.base_frame.translated(&(normal * half_dz));
        let bottom = self.base_frame.translated(&(-normal * half_dz));

        let mut lines = Vec::with_capacity(self.holes.len());
        for (i, hole) in self.holes.iter().enumerate() {
            let angle = normal.angle(&hole.normal());
            if Tolerance::DEFAULT.is_parallel_angle(angle) {
                return Err(JoineryError::DegenerateAngle { angle });
            }

            let reach = hole.normal() * HOLE_AXIS_REACH;
            let axis = Line3d::from_points(hole.origin + reach, hole.origin - reach);
            let t_top = intersect_line_plane(&axis, &top).ok_or_else(|| {
                JoineryError::no_intersection(format!("hole {i} runs along the top face"))
            })?;
            let t_bottom = intersect_line_plane(&axis, &bottom).ok_or_else(|| {
                JoineryError::no_intersection(format!("hole {i} runs along the bottom face"))
            })?;
            let bore = Line3d::from_points(axis.point_at(t_top), axis.point_at(t_bottom));

            let diff = half_dz / angle.sin() + (dowel_radius / angle.tan()).abs();
            let diff = (diff + extension) * 0.5;
            let line = bore
                .extend(diff, diff)
                .ok_or(JoineryError::DegenerateAngle { angle })?;
            lines.push(line);
        }
        Ok(lines)
    }

    /// [`get_dowel_lines`](Self::get_dowel_lines) with the configured
    /// extension and drill radius.
    pub fn dowel_lines(&self, config: &FabricationConfig) -> Result<Vec<Line3d>> {
        self.get_dowel_lines(config.dowel_extension, config.dowel_radius)
    }

    /// Fabricable beam for an as-built beam and its attached dowels.
    ///
    /// Each dowel's axis, scaled by [`DEFAULT_DOWEL_SCALE`], is intersected
    /// with the beam's base plane to get the entry point; the hole frame
    /// keeps the dowel's own orientation. The stock grows by
    /// `extension + end_cover` at both ends.
    pub fn instantiate_from_beam<B: JointBeam + ?Sized>(beam: &B) -> Result<Self> {
        Self::instantiate_from_beam_with(beam, DEFAULT_DOWEL_SCALE)
    }

    /// [`instantiate_from_beam`](Self::instantiate_from_beam) with an explicit
    /// dowel scale factor.
    pub fn instantiate_from_beam_with<B: JointBeam + ?Sized>(
        beam: &B,
        dowel_scale: f64,
    ) -> Result<Self> {
        let base = beam.base_frame();
        let holes = beam
            .dowels()
            .iter()
            .enumerate()
            .map(|(i, dowel)| {
                let line = dowel.get_line(dowel_scale);
                let t = intersect_line_plane(&line, base).ok_or_else(|| {
                    JoineryError::no_intersection(format!(
                        "dowel {i} is parallel to the beam base plane"
                    ))
                })?;
                Ok(dowel.get_plane().with_origin(line.point_at(t)))
            })
            .collect::<Result<Vec<_>>>()?;

        let dx = beam.dx() + (beam.extension() + beam.end_cover()) * 2.0;
        Self::new(base.clone(), dx, beam.dy(), beam.dz(), holes)
    }

    /// Move a whole assembly so that `src` lands on `target`.
    pub fn orient_structure(
        beams: &[FabricableBeam],
        src: &Frame,
        target: &Frame,
    ) -> Vec<FabricableBeam> {
        let t = Frame::plane_to_plane(src, target);
        beams.iter().map(|b| b.transform(&t)).collect()
    }

    /// [`orient_structure`](Self::orient_structure) onto the world XY frame.
    pub fn orient_structure_to_world(beams: &[FabricableBeam], src: &Frame) -> Vec<FabricableBeam> {
        Self::orient_structure(beams, src, &Frame::world_xy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::{Beam, Dowel};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;
    use timber_kernel_math::{Dir3, Point3, Vec3};

    fn hole_at_angle(theta: f64) -> Frame {
        // Hole axis tilted by theta from the beam normal, inside the XZ plane
        let axis = Vec3::new(theta.sin(), 0.0, theta.cos());
        Frame::new(Point3::origin(), Vec3::y(), axis.cross(&Vec3::y()))
    }

    fn beam_with_holes(holes: Vec<Frame>) -> FabricableBeam {
        FabricableBeam::new(Frame::world_xy(), 1000.0, 100.0, 100.0, holes).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let err = FabricableBeam::new(Frame::world_xy(), 0.0, 1.0, 1.0, vec![]).unwrap_err();
        assert!(matches!(err, JoineryError::InvalidDimensions(_)));
        assert!(FabricableBeam::new(Frame::world_xy(), 1.0, f64::NAN, 1.0, vec![]).is_err());
        assert!(FabricableBeam::new(Frame::world_xy(), 1.0, 1.0, 1.0, vec![]).is_ok());
    }

    #[test]
    fn test_rejects_degenerate_frames() {
        // parallel axes normalize to NaN
        let flat = Frame::new(Point3::origin(), Vec3::x(), Vec3::new(2.0, 0.0, 0.0));
        let err = FabricableBeam::new(flat.clone(), 1.0, 1.0, 1.0, vec![]).unwrap_err();
        assert!(matches!(err, JoineryError::InvalidFrame(_)));

        let holes = vec![hole_at_angle(0.3), flat];
        let err = FabricableBeam::new(Frame::world_xy(), 1.0, 1.0, 1.0, holes).unwrap_err();
        assert_eq!(err.to_string(), "invalid frame: hole 1 has non-finite components");
    }

    #[test]
    fn test_hole_at_angle_helper() {
        let hole = hole_at_angle(0.4);
        assert!((Vec3::z().angle(&hole.normal()) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_transform_leaves_receiver_untouched() {
        let hole = Frame::new(Point3::new(100.0, 0.0, 0.0), Vec3::x(), Vec3::z());
        let beam = beam_with_holes(vec![hole.clone()]);
        let t = Transform::translation(0.0, 0.0, 500.0).then(&Transform::rotation_z(PI / 2.0));
        let moved = beam.transform(&t);

        assert_eq!(beam.holes()[0], hole);
        assert_relative_eq!(
            moved.base_frame().origin,
            Point3::new(0.0, 0.0, 500.0),
            epsilon = 1e-9
        );
        assert_relative_eq!(
            moved.holes()[0].origin,
            Point3::new(0.0, 100.0, 500.0),
            epsilon = 1e-9
        );
        assert_eq!(moved.dx(), 1000.0);
    }

    #[test]
    fn test_transform_composition() {
        let hole = Frame::new(Point3::new(120.0, 10.0, 0.0), Vec3::new(1.0, 1.0, 0.0), Vec3::z());
        let beam = beam_with_holes(vec![hole]);
        let t1 = Transform::rotation_about_axis(&Dir3::new_normalize(Vec3::new(0.2, 1.0, 0.4)), 0.9)
            .then(&Transform::translation(5.0, -3.0, 8.0));
        let t2 = Transform::translation(-40.0, 2.0, 1.0).then(&Transform::rotation_x(-1.3));

        let stepwise = beam.transform(&t1).transform(&t2);
        let composed = beam.transform(&t2.then(&t1));

        for (a, b) in std::iter::once((stepwise.base_frame(), composed.base_frame()))
            .chain(stepwise.holes().iter().zip(composed.holes()))
        {
            assert_relative_eq!(a.origin, b.origin, epsilon = 1e-9);
            assert_relative_eq!(a.x_axis(), b.x_axis(), epsilon = 1e-9);
            assert_relative_eq!(a.y_axis(), b.y_axis(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_create_box_solid() {
        let beam = beam_with_holes(vec![]);
        let solid = beam.create_box_solid();
        assert_eq!(solid.x, (-500.0, 500.0));
        assert_eq!(solid.y, (-50.0, 50.0));
        assert_eq!(solid.z, (-50.0, 50.0));
        assert!((solid.volume() - 1.0e7).abs() < 1e-6);
    }

    #[test]
    fn test_end_cut_frames() {
        let beam = beam_with_holes(vec![]);
        let (start, end) = beam.end_cut_frames();
        assert_relative_eq!(start.origin, Point3::new(500.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(start.normal(), Vec3::x(), epsilon = 1e-12);
        assert_relative_eq!(end.origin, Point3::new(-500.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(end.normal(), -Vec3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_dowel_line_length_formula() {
        let theta = PI / 4.0;
        let beam = beam_with_holes(vec![hole_at_angle(theta)]);
        let lines = beam.get_dowel_lines(10.0, 50.0).unwrap();
        assert_eq!(lines.len(), 1);

        let between_faces = 100.0 / theta.cos();
        let diff = 50.0 / theta.sin() + (50.0 / theta.tan()).abs();
        let expected = between_faces + diff + 10.0;
        assert!((lines[0].length() - expected).abs() < 1e-9);

        // Symmetric about the hole origin
        assert_relative_eq!(lines[0].midpoint(), Point3::origin(), epsilon = 1e-9);
    }

    #[test]
    fn test_dowel_line_grows_toward_normal() {
        let lengths: Vec<f64> = [40.0_f64, 30.0, 20.0, 10.0, 5.0, 1.0]
            .iter()
            .map(|deg| {
                let beam = beam_with_holes(vec![hole_at_angle(deg.to_radians())]);
                beam.get_dowel_lines(0.0, 50.0).unwrap()[0].length()
            })
            .collect();
        for pair in lengths.windows(2) {
            assert!(pair[1] > pair[0], "lengths not increasing: {lengths:?}");
        }
    }

    #[test]
    fn test_dowel_line_degenerate_angle() {
        let straight = Frame::world_xy();
        let beam = beam_with_holes(vec![straight]);
        let err = beam.get_dowel_lines(0.0, 50.0).unwrap_err();
        assert!(matches!(err, JoineryError::DegenerateAngle { .. }));

        let flipped = Frame::new(Point3::origin(), Vec3::x(), -Vec3::y());
        let beam = beam_with_holes(vec![flipped]);
        assert!(matches!(
            beam.get_dowel_lines(0.0, 50.0),
            Err(JoineryError::DegenerateAngle { .. })
        ));
    }

    #[test]
    fn test_dowel_line_in_face_plane() {
        let sideways = Frame::new(Point3::origin(), Vec3::y(), Vec3::z());
        let beam = beam_with_holes(vec![sideways]);
        assert!(matches!(
            beam.get_dowel_lines(0.0, 50.0),
            Err(JoineryError::NoIntersection(_))
        ));
    }

    #[test]
    fn test_dowel_lines_use_config() {
        let beam = beam_with_holes(vec![hole_at_angle(0.5)]);
        let cfg = FabricationConfig {
            dowel_radius: 20.0,
            dowel_extension: 30.0,
            ..FabricationConfig::default()
        };
        assert_eq!(beam.dowel_lines(&cfg).unwrap(), beam.get_dowel_lines(30.0, 20.0).unwrap());
    }

    #[test]
    fn test_instantiate_from_beam() {
        let mut beam =
            Beam::new(Frame::world_xy(), 1000.0, 100.0, 100.0).with_end_stock(20.0, 30.0);
        let axis =
            Line3d::from_points(Point3::new(200.0, 0.0, 50.0), Point3::new(260.0, 0.0, -50.0));
        beam.add_dowel(Dowel::new(axis.clone()));

        let fab = FabricableBeam::instantiate_from_beam(&beam).unwrap();
        assert_eq!(fab.dx(), 1000.0 + 2.0 * (20.0 + 30.0));
        assert_eq!(fab.dy(), 100.0);
        assert_eq!(fab.holes().len(), 1);

        let hole = &fab.holes()[0];
        assert_relative_eq!(hole.origin, Point3::new(230.0, 0.0, 0.0), epsilon = 1e-9);
        let along = axis.unit_direction().unwrap();
        assert!((hole.normal().dot(along.as_ref()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_instantiate_from_beam_parallel_dowel() {
        let mut beam = Beam::new(Frame::world_xy(), 1000.0, 100.0, 100.0);
        beam.add_dowel(Dowel::new(Line3d::from_points(
            Point3::new(0.0, 0.0, 10.0),
            Point3::new(100.0, 0.0, 10.0),
        )));
        let err = FabricableBeam::instantiate_from_beam(&beam).unwrap_err();
        assert!(matches!(err, JoineryError::NoIntersection(_)));
    }

    #[test]
    fn test_orient_structure() {
        let src = Frame::new(Point3::new(1000.0, 500.0, 0.0), Vec3::y(), -Vec3::x());
        let a = FabricableBeam::new(src.clone(), 800.0, 80.0, 80.0, vec![]).unwrap();
        let b = FabricableBeam::new(
            src.translated(&Vec3::new(0.0, 0.0, 80.0)),
            600.0,
            80.0,
            80.0,
            vec![],
        )
        .unwrap();

        let oriented = FabricableBeam::orient_structure_to_world(&[a.clone(), b.clone()], &src);
        assert_relative_eq!(oriented[0].base_frame().origin, Point3::origin(), epsilon = 1e-9);
        assert_relative_eq!(oriented[0].base_frame().x_axis(), Vec3::x(), epsilon = 1e-9);
        assert_relative_eq!(
            oriented[1].base_frame().origin,
            Point3::new(0.0, 0.0, 80.0),
            epsilon = 1e-9
        );

        // Relative placement survives
        let before = b.base_frame().origin - a.base_frame().origin;
        let after = oriented[1].base_frame().origin - oriented[0].base_frame().origin;
        assert!((before.norm() - after.norm()).abs() < 1e-9);
    }
}

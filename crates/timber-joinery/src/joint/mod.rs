//! Dowel hole placement at multi-beam joints.
//!
//! [`JointHoles`] takes the beams meeting at one joint, ordered along the
//! run, and a [`JointType`]. For each beam it builds two sides of three
//! candidate hole points around the joint point on the beam's baseline,
//! picks one candidate per beam, and draws a single dowel axis through the
//! picks. Every beam is then lengthened by the hole offset and receives its
//! own [`Dowel`] on the shared axis.
//!
//! Solving is split in two: [`JointHoles::evaluate`] only reads the beams
//! and records a [`BeamPatch`] per beam; [`JointHoles::apply`] writes the
//! patches back. [`JointHoles::new`] does both.

mod kind;
mod mapping;

pub use kind::{
    DowelLineMode, EndSide, HoleOffsets, JointFamily, JointFlags, JointType, ParamRange,
    ParametricOffsets, Symmetry, TypeArg, DEFAULT_ARG_COUNT, PARAMETRIC_ARG_COUNT,
};
pub use mapping::LocationMap;

use timber_kernel_geom::{fit_line_to_points, Line3d};
use timber_kernel_math::Point3;
use tracing::{debug, warn};

use crate::beam::{Dowel, JointBeam};
use crate::error::JoineryError;

/// Candidate hole points of one beam: two sides, three rows each.
pub type HoleCandidates = [[Point3; 3]; 2];

/// Candidate hole points of `beam` around the joint point at baseline
/// parameter `t`, and the length the beam must grow by to hold them.
///
/// Row 1 of each side is the middle hole, shifted `x0_ext` along the beam
/// axis (forward on side 0, backward on side 1). Rows 0 and 2 sit either
/// side of it, across the width at `cover_h` below the edge and a further
/// `x1_ext` along the axis.
pub fn type_hole_pt_transform<B: JointBeam + ?Sized>(
    beam: &B,
    t: f64,
    offsets: &HoleOffsets,
    flags: &JointFlags,
) -> (HoleCandidates, f64) {
    let v1_sw = flags.v1_sw();
    let x1 = offsets.x1_ext * flags.v2_sw();
    let frame = beam.base_frame();
    let x = frame.x_axis();
    let y = frame.y_axis();

    let vec_0 = x * offsets.x0_ext;
    let vec_1 = y * ((beam.dy() / 2.0 - offsets.cover_h) * v1_sw);
    let vec_2a = x * x1;
    let vec_2b = vec_2a * v1_sw;

    let p = beam.baseline().point_at(t);
    let mid_0 = p + vec_0;
    let mid_1 = p - vec_0;
    let side_0 = [mid_0 + (vec_1 + vec_2a), mid_0, mid_0 - (vec_1 + vec_2a)];
    let side_1 = [mid_1 + (vec_1 + vec_2b), mid_1, mid_1 - (vec_1 + vec_2b)];

    ([side_0, side_1], offsets.x0_ext + x1)
}

/// Change a solved joint makes to one beam.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamPatch {
    /// Growth of the stock length.
    pub extension: f64,
    /// Dowel to attach.
    pub dowel: Dowel,
}

/// How a joint solve ended.
#[derive(Debug)]
pub enum JointOutcome {
    /// Dowel points and axis computed.
    Completed,
    /// The joint type places no holes.
    Reserved,
    /// Arguments or beams did not fit the joint type. Nothing was computed.
    Failed(JoineryError),
}

/// A solved (or rejected) joint.
#[derive(Debug)]
pub struct JointHoles {
    loc_index: Option<i64>,
    type_code: u8,
    joint_type: Option<JointType>,
    location: Option<LocationMap>,
    candidates: Vec<HoleCandidates>,
    dowel_pts: Vec<Point3>,
    dowel_line: Option<Line3d>,
    patches: Vec<BeamPatch>,
    outcome: JointOutcome,
}

impl JointHoles {
    /// Solve the joint and write the result into `beams`.
    pub fn new<B: JointBeam>(
        beams: &mut [B],
        loc_index: Option<i64>,
        type_code: u8,
        type_args: &[TypeArg],
    ) -> Self {
        let joint = Self::evaluate(beams, loc_index, type_code, type_args);
        joint.apply(beams);
        joint
    }

    /// Solve the joint without touching `beams`.
    ///
    /// Bad arguments do not return an error: the result is inert, with
    /// [`is_completed`](Self::is_completed) false and the reason in
    /// [`error_message`](Self::error_message).
    pub fn evaluate<B: JointBeam>(
        beams: &[B],
        loc_index: Option<i64>,
        type_code: u8,
        type_args: &[TypeArg],
    ) -> Self {
        match JointType::from_code(type_code, type_args) {
            Ok(joint_type) => Self::evaluate_typed(beams, loc_index, joint_type),
            Err(e) => Self::failed(loc_index, type_code, None, e),
        }
    }

    /// Solve an already typed joint without touching `beams`.
    pub fn evaluate_typed<B: JointBeam>(
        beams: &[B],
        loc_index: Option<i64>,
        joint_type: JointType,
    ) -> Self {
        let type_code = joint_type.code();
        let (Some(family), Some(offsets), Some(flags)) =
            (joint_type.family(), joint_type.offsets(), joint_type.flags())
        else {
            debug!(type_code, "joint type places no holes");
            return Self {
                joint_type: Some(joint_type),
                ..Self::empty(loc_index, type_code, JointOutcome::Reserved)
            };
        };

        let expected = family.beam_count();
        if beams.len() != expected {
            return Self::failed(
                loc_index,
                type_code,
                Some(joint_type),
                JoineryError::BeamCountMismatch {
                    expected,
                    actual: beams.len(),
                },
            );
        }

        let location = LocationMap::for_joint(family, loc_index);
        let mut candidates = Vec::with_capacity(beams.len());
        let mut dowel_pts = Vec::with_capacity(beams.len());
        let mut extensions = Vec::with_capacity(beams.len());
        for (i, beam) in beams.iter().enumerate() {
            let t = location.t_locs_beam[i];
            let (cands, extension) = type_hole_pt_transform(beam, t, &offsets, &flags);
            let pt = cands[location.side][location.rows[i]];
            debug!(beam = i, t, extension, ?pt, "placed joint hole");
            candidates.push(cands);
            dowel_pts.push(pt);
            extensions.push(extension);
        }

        let line = Self::dowel_axis(family, flags.line_mode, &dowel_pts);
        let patches = extensions
            .into_iter()
            .map(|extension| BeamPatch {
                extension,
                dowel: Dowel::new(line.clone()),
            })
            .collect();
        debug!(type_code, loc_index = ?loc_index, length = line.length(), "joint dowel axis");

        Self {
            loc_index,
            type_code,
            joint_type: Some(joint_type),
            location: Some(location),
            candidates,
            dowel_pts,
            dowel_line: Some(line),
            patches,
            outcome: JointOutcome::Completed,
        }
    }

    /// Solve an already typed joint and write the result into `beams`.
    pub fn solve<B: JointBeam>(
        beams: &mut [B],
        loc_index: Option<i64>,
        joint_type: JointType,
    ) -> Self {
        let joint = Self::evaluate_typed(beams, loc_index, joint_type);
        joint.apply(beams);
        joint
    }

    /// Extend each beam and attach its dowel. Beams are matched to patches
    /// by position; does nothing unless the joint completed.
    pub fn apply<B: JointBeam>(&self, beams: &mut [B]) {
        if !self.is_completed() {
            return;
        }
        for (beam, patch) in beams.iter_mut().zip(&self.patches) {
            beam.extend(patch.extension);
            beam.add_dowel(patch.dowel.clone());
        }
    }

    fn dowel_axis(family: JointFamily, mode: DowelLineMode, pts: &[Point3]) -> Line3d {
        let endpoints = || Line3d::from_points(pts[0], pts[pts.len() - 1]);
        match (family, mode) {
            (JointFamily::Triple, DowelLineMode::Fitted) => {
                fit_line_to_points(pts).unwrap_or_else(|| {
                    warn!("dowel points coincide, using the endpoint axis");
                    endpoints()
                })
            }
            _ => endpoints(),
        }
    }

    fn empty(loc_index: Option<i64>, type_code: u8, outcome: JointOutcome) -> Self {
        Self {
            loc_index,
            type_code,
            joint_type: None,
            location: None,
            candidates: Vec::new(),
            dowel_pts: Vec::new(),
            dowel_line: None,
            patches: Vec::new(),
            outcome,
        }
    }

    fn failed(
        loc_index: Option<i64>,
        type_code: u8,
        joint_type: Option<JointType>,
        error: JoineryError,
    ) -> Self {
        warn!(type_code, %error, "joint rejected");
        Self {
            joint_type,
            ..Self::empty(loc_index, type_code, JointOutcome::Failed(error))
        }
    }

    /// Whether dowel points and axis were computed.
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, JointOutcome::Completed)
    }

    /// How the solve ended.
    pub fn outcome(&self) -> &JointOutcome {
        &self.outcome
    }

    /// Why the joint was rejected.
    pub fn error(&self) -> Option<&JoineryError> {
        match &self.outcome {
            JointOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Rejection message, if the joint was rejected.
    pub fn error_message(&self) -> Option<String> {
        self.error().map(|e| e.to_string())
    }

    /// Requested location index.
    pub fn loc_index(&self) -> Option<i64> {
        self.loc_index
    }

    /// Numeric joint type code as requested.
    pub fn type_code(&self) -> u8 {
        self.type_code
    }

    /// Typed joint, when the arguments were valid.
    pub fn joint_type(&self) -> Option<&JointType> {
        self.joint_type.as_ref()
    }

    /// Baseline parameter of the joint point on each beam.
    pub fn t_locs_beam(&self) -> &[f64] {
        self.location.as_ref().map_or(&[][..], |l| l.t_locs_beam.as_slice())
    }

    /// Candidate side and per-beam rows picked.
    pub fn dow_pts_i(&self) -> Option<(usize, &[usize])> {
        self.location.as_ref().map(|l| (l.side, l.rows.as_slice()))
    }

    /// Resolved hole offsets.
    pub fn translation_variables(&self) -> Option<HoleOffsets> {
        self.joint_type.as_ref().and_then(JointType::offsets)
    }

    /// Offset ranges of a parametric joint.
    pub fn translation_variable_sets(&self) -> Option<ParametricOffsets> {
        self.joint_type.as_ref().and_then(JointType::ranges)
    }

    /// Sign of the cross-beam offset.
    pub fn v1_sw(&self) -> Option<f64> {
        self.joint_type.as_ref().and_then(JointType::flags).map(|f| f.v1_sw())
    }

    /// Sign of the `x1_ext` shift.
    pub fn v2_sw(&self) -> Option<f64> {
        self.joint_type.as_ref().and_then(JointType::flags).map(|f| f.v2_sw())
    }

    /// Candidate points of each beam.
    pub fn hole_candidates(&self) -> &[HoleCandidates] {
        &self.candidates
    }

    /// Picked dowel point of each beam.
    pub fn dowel_pts(&self) -> &[Point3] {
        &self.dowel_pts
    }

    /// Shared dowel axis.
    pub fn dowel_line(&self) -> Option<&Line3d> {
        self.dowel_line.as_ref()
    }

    /// Per-beam changes, in beam order.
    pub fn patches(&self) -> &[BeamPatch] {
        &self.patches
    }
}

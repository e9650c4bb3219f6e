#![warn(missing_docs)]

//! Dowel joinery for timber frame structures.
//!
//! This crate places dowel holes where beams of a structure meet and turns
//! the resulting beams into fabrication-ready stock:
//!
//! - [`JointHoles`] solves one joint: it picks a hole point on each beam
//!   around the joint, draws the shared dowel axis, lengthens the beams and
//!   attaches a [`Dowel`] to each of them.
//! - [`FabricableBeam`] is the machining view of a beam: a base frame, its
//!   stock dimensions and the entry frame of every hole.
//! - [`FabricableBeam::write_as_json`] and [`FabricableBeam::read_from_json`]
//!   exchange beams with the CNC tooling.
//!
//! # Example
//!
//! ```ignore
//! use timber_joinery::{Beam, FabricableBeam, FabricationConfig, JointHoles, TypeArg};
//!
//! let mut beams: Vec<Beam> = /* three beams meeting at one point */;
//! let args: Vec<TypeArg> = vec![
//!     50.0.into(), 20.0.into(), 50.0.into(),
//!     true.into(), false.into(), false.into(),
//! ];
//! let joint = JointHoles::new(&mut beams, Some(1), 0, &args);
//! assert!(joint.is_completed());
//!
//! let config = FabricationConfig::load("fabrication.toml")?;
//! let stock = beams
//!     .iter()
//!     .map(|b| FabricableBeam::instantiate_from_beam_with(b, config.dowel_scale))
//!     .collect::<Result<Vec<_>, _>>()?;
//! FabricableBeam::write_as_json(&stock, "layer_0", None, &config)?;
//! ```

pub mod beam;
pub mod config;
pub mod error;
pub mod fabricable;
pub mod joint;
pub mod persist;

pub use beam::{Beam, Dowel, JointBeam};
pub use config::FabricationConfig;
pub use error::{JoineryError, Result};
pub use fabricable::{FabricableBeam, DEFAULT_DOWEL_SCALE};
pub use joint::{
    type_hole_pt_transform, BeamPatch, DowelLineMode, EndSide, HoleCandidates, HoleOffsets,
    JointFamily, JointFlags, JointHoles, JointOutcome, JointType, LocationMap, ParamRange,
    ParametricOffsets, Symmetry, TypeArg,
};
pub use persist::{BeamRecord, PlaneRecord};

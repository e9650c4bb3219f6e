//! Joint types and their parameters.
//!
//! Host code describes a joint with a numeric type code and a flat argument
//! list; [`JointType::from_code`] is the one place that list is checked and
//! turned into typed parameters.

use crate::error::{JoineryError, Result};

/// One positional joint argument: a measurement or a switch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeArg {
    /// A length or parameter value.
    Number(f64),
    /// A switch.
    Flag(bool),
}

impl TypeArg {
    /// Numeric value; flags read as `1.0` / `0.0`.
    pub fn as_f64(&self) -> f64 {
        match *self {
            TypeArg::Number(v) => v,
            TypeArg::Flag(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Switch value; numbers read as set when non-zero.
    pub fn as_flag(&self) -> bool {
        match *self {
            TypeArg::Number(v) => v != 0.0,
            TypeArg::Flag(b) => b,
        }
    }
}

impl From<f64> for TypeArg {
    fn from(v: f64) -> Self {
        TypeArg::Number(v)
    }
}

impl From<i32> for TypeArg {
    fn from(v: i32) -> Self {
        TypeArg::Number(f64::from(v))
    }
}

impl From<bool> for TypeArg {
    fn from(b: bool) -> Self {
        TypeArg::Flag(b)
    }
}

/// Hole offsets measured on each beam of the joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoleOffsets {
    /// Shift along the beam axis from the joint point to the middle hole.
    pub x0_ext: f64,
    /// Distance of the outer holes below the beam edge.
    pub cover_h: f64,
    /// Further shift along the beam axis from the middle hole to the outer holes.
    pub x1_ext: f64,
}

/// A parametric range `[min, max]` and where in it to sit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Position in the range, `0` at `min` and `1` at `max` (clamped).
    pub param: f64,
}

impl ParamRange {
    /// Value at `param`.
    pub fn resolve(&self) -> f64 {
        self.min + (self.max - self.min) * self.param.clamp(0.0, 1.0)
    }
}

/// Ranged version of [`HoleOffsets`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParametricOffsets {
    /// Range for `x0_ext`.
    pub x0_ext: ParamRange,
    /// Range for `cover_h`.
    pub cover_h: ParamRange,
    /// Range for `x1_ext`.
    pub x1_ext: ParamRange,
}

impl ParametricOffsets {
    /// Concrete offsets.
    pub fn resolve(&self) -> HoleOffsets {
        HoleOffsets {
            x0_ext: self.x0_ext.resolve(),
            cover_h: self.cover_h.resolve(),
            x1_ext: self.x1_ext.resolve(),
        }
    }
}

/// How the holes on the two sides of a beam relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    /// Mirrored about the beam axis.
    Axis,
    /// Mirrored through the joint point.
    Point,
}

/// How the shared dowel axis of a triple joint is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DowelLineMode {
    /// Least-squares line through all three dowel points.
    Fitted,
    /// Line through the first and last dowel points; the middle beam does
    /// not constrain the drill angle.
    Endpoints,
}

/// Switches shared by every joint type that places holes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointFlags {
    /// Hole symmetry.
    pub symmetry: Symmetry,
    /// Flip the direction of the `x1_ext` shift.
    pub invert: bool,
    /// Dowel axis construction for triple joints.
    pub line_mode: DowelLineMode,
}

impl JointFlags {
    fn from_args(args: &[TypeArg]) -> Self {
        Self {
            symmetry: if args[0].as_flag() {
                Symmetry::Axis
            } else {
                Symmetry::Point
            },
            invert: args[1].as_flag(),
            line_mode: if args[2].as_flag() {
                DowelLineMode::Fitted
            } else {
                DowelLineMode::Endpoints
            },
        }
    }

    /// Sign applied to the cross-beam offset.
    pub fn v1_sw(&self) -> f64 {
        match self.symmetry {
            Symmetry::Axis => -1.0,
            Symmetry::Point => 1.0,
        }
    }

    /// Sign applied to the `x1_ext` shift.
    pub fn v2_sw(&self) -> f64 {
        if self.invert {
            -1.0
        } else {
            1.0
        }
    }
}

/// Which end of the run a naked-edge joint sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndSide {
    /// The run starts here (codes 1 and 4).
    Start,
    /// The run ends here (codes 2 and 5).
    End,
}

/// Geometric family of a hole-placing joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointFamily {
    /// Three beams, one dowel through all of them.
    Triple,
    /// Two beams at a naked edge.
    End(EndSide),
}

impl JointFamily {
    /// Number of beams a joint of this family connects.
    pub fn beam_count(&self) -> usize {
        match self {
            JointFamily::Triple => 3,
            JointFamily::End(_) => 2,
        }
    }
}

/// A joint type with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointType {
    /// Code 0: triple joint with fixed offsets.
    TripleDefault {
        /// Hole offsets.
        offsets: HoleOffsets,
        /// Switches.
        flags: JointFlags,
    },
    /// Codes 1 and 2: naked-edge joint with fixed offsets.
    EndDefault {
        /// Which end.
        side: EndSide,
        /// Hole offsets.
        offsets: HoleOffsets,
        /// Switches.
        flags: JointFlags,
    },
    /// Code 3: triple joint with ranged offsets.
    TripleParametric {
        /// Offset ranges.
        ranges: ParametricOffsets,
        /// Switches.
        flags: JointFlags,
    },
    /// Codes 4 and 5: naked-edge joint with ranged offsets.
    EndParametric {
        /// Which end.
        side: EndSide,
        /// Offset ranges.
        ranges: ParametricOffsets,
        /// Switches.
        flags: JointFlags,
    },
    /// Code 6: foundation connection. Places no holes yet.
    Foundation,
    /// Code 7: top beams. Places no holes yet.
    Top,
    /// Code 8: construction seams. Places no holes yet.
    Seam,
}

/// Argument count of the fixed-offset joint codes.
pub const DEFAULT_ARG_COUNT: usize = 6;

/// Argument count of the ranged-offset joint codes.
pub const PARAMETRIC_ARG_COUNT: usize = 12;

impl JointType {
    /// Build a joint type from its code and positional arguments.
    ///
    /// Codes 0–2 take `[x0_ext, cover_h, x1_ext, symmetry, invert, fit_line]`.
    /// Codes 3–5 take three `[min, max, param]` ranges for the same offsets,
    /// then the same three switches. Codes 6–8 ignore their arguments.
    pub fn from_code(code: u8, args: &[TypeArg]) -> Result<Self> {
        let check = |expected: usize| {
            if args.len() == expected {
                Ok(())
            } else {
                Err(JoineryError::ParameterCountMismatch {
                    expected,
                    actual: args.len(),
                })
            }
        };

        match code {
            0..=2 => {
                check(DEFAULT_ARG_COUNT)?;
                let offsets = HoleOffsets {
                    x0_ext: args[0].as_f64(),
                    cover_h: args[1].as_f64(),
                    x1_ext: args[2].as_f64(),
                };
                let flags = JointFlags::from_args(&args[3..6]);
                Ok(match code {
                    0 => JointType::TripleDefault { offsets, flags },
                    1 => JointType::EndDefault {
                        side: EndSide::Start,
                        offsets,
                        flags,
                    },
                    _ => JointType::EndDefault {
                        side: EndSide::End,
                        offsets,
                        flags,
                    },
                })
            }
            3..=5 => {
                check(PARAMETRIC_ARG_COUNT)?;
                let range = |i: usize| ParamRange {
                    min: args[i].as_f64(),
                    max: args[i + 1].as_f64(),
                    param: args[i + 2].as_f64(),
                };
                let ranges = ParametricOffsets {
                    x0_ext: range(0),
                    cover_h: range(3),
                    x1_ext: range(6),
                };
                let flags = JointFlags::from_args(&args[9..12]);
                Ok(match code {
                    3 => JointType::TripleParametric { ranges, flags },
                    4 => JointType::EndParametric {
                        side: EndSide::Start,
                        ranges,
                        flags,
                    },
                    _ => JointType::EndParametric {
                        side: EndSide::End,
                        ranges,
                        flags,
                    },
                })
            }
            6 => Ok(JointType::Foundation),
            7 => Ok(JointType::Top),
            8 => Ok(JointType::Seam),
            other => Err(JoineryError::UnknownJointType(other)),
        }
    }

    /// Numeric code of this joint type.
    pub fn code(&self) -> u8 {
        match self {
            JointType::TripleDefault { .. } => 0,
            JointType::EndDefault {
                side: EndSide::Start,
                ..
            } => 1,
            JointType::EndDefault { side: EndSide::End, .. } => 2,
            JointType::TripleParametric { .. } => 3,
            JointType::EndParametric {
                side: EndSide::Start,
                ..
            } => 4,
            JointType::EndParametric { side: EndSide::End, .. } => 5,
            JointType::Foundation => 6,
            JointType::Top => 7,
            JointType::Seam => 8,
        }
    }

    /// Family of a hole-placing type; `None` for the reserved types.
    pub fn family(&self) -> Option<JointFamily> {
        match self {
            JointType::TripleDefault { .. } | JointType::TripleParametric { .. } => {
                Some(JointFamily::Triple)
            }
            JointType::EndDefault { side, .. } | JointType::EndParametric { side, .. } => {
                Some(JointFamily::End(*side))
            }
            JointType::Foundation | JointType::Top | JointType::Seam => None,
        }
    }

    /// Whether the offsets come from ranges.
    pub fn is_parametric(&self) -> bool {
        matches!(
            self,
            JointType::TripleParametric { .. } | JointType::EndParametric { .. }
        )
    }

    /// Switches, for hole-placing types.
    pub fn flags(&self) -> Option<JointFlags> {
        match self {
            JointType::TripleDefault { flags, .. }
            | JointType::EndDefault { flags, .. }
            | JointType::TripleParametric { flags, .. }
            | JointType::EndParametric { flags, .. } => Some(*flags),
            _ => None,
        }
    }

    /// Concrete hole offsets, resolving ranges for the parametric types.
    pub fn offsets(&self) -> Option<HoleOffsets> {
        match self {
            JointType::TripleDefault { offsets, .. } | JointType::EndDefault { offsets, .. } => {
                Some(*offsets)
            }
            JointType::TripleParametric { ranges, .. }
            | JointType::EndParametric { ranges, .. } => Some(ranges.resolve()),
            _ => None,
        }
    }

    /// The offset ranges of the parametric types.
    pub fn ranges(&self) -> Option<ParametricOffsets> {
        match self {
            JointType::TripleParametric { ranges, .. }
            | JointType::EndParametric { ranges, .. } => Some(*ranges),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[f64], flags: [bool; 3]) -> Vec<TypeArg> {
        values
            .iter()
            .map(|&v| TypeArg::from(v))
            .chain(flags.iter().map(|&b| TypeArg::from(b)))
            .collect()
    }

    #[test]
    fn test_triple_default() {
        let jt = JointType::from_code(0, &args(&[40.0, 20.0, 20.0], [true, false, false])).unwrap();
        assert_eq!(jt.code(), 0);
        assert_eq!(jt.family(), Some(JointFamily::Triple));
        assert_eq!(
            jt.offsets(),
            Some(HoleOffsets {
                x0_ext: 40.0,
                cover_h: 20.0,
                x1_ext: 20.0
            })
        );
        let flags = jt.flags().unwrap();
        assert_eq!(flags.symmetry, Symmetry::Axis);
        assert_eq!(flags.v1_sw(), -1.0);
        assert_eq!(flags.v2_sw(), 1.0);
        assert_eq!(flags.line_mode, DowelLineMode::Endpoints);
        assert!(jt.ranges().is_none());
    }

    #[test]
    fn test_end_codes_pick_side() {
        let a = args(&[1.0, 2.0, 3.0], [false, true, true]);
        assert_eq!(
            JointType::from_code(1, &a).unwrap().family(),
            Some(JointFamily::End(EndSide::Start))
        );
        let end = JointType::from_code(2, &a).unwrap();
        assert_eq!(end.family(), Some(JointFamily::End(EndSide::End)));
        assert_eq!(end.code(), 2);
        let flags = end.flags().unwrap();
        assert_eq!(flags.v1_sw(), 1.0);
        assert_eq!(flags.v2_sw(), -1.0);
        assert_eq!(flags.line_mode, DowelLineMode::Fitted);
    }

    #[test]
    fn test_parametric_resolves_ranges() {
        let a = args(
            &[30.0, 50.0, 0.5, 10.0, 30.0, 0.0, 20.0, 40.0, 2.0],
            [true, false, true],
        );
        let jt = JointType::from_code(3, &a).unwrap();
        assert!(jt.is_parametric());
        let offsets = jt.offsets().unwrap();
        assert_eq!(offsets.x0_ext, 40.0);
        assert_eq!(offsets.cover_h, 10.0);
        // param is clamped to the range
        assert_eq!(offsets.x1_ext, 40.0);
        assert_eq!(jt.ranges().unwrap().x0_ext.min, 30.0);

        assert_eq!(JointType::from_code(5, &a).unwrap().code(), 5);
    }

    #[test]
    fn test_count_mismatch_message() {
        let err = JointType::from_code(0, &args(&[40.0, 20.0], [true, false, false])).unwrap_err();
        assert_eq!(err.to_string(), "You should've given 6 values, but you only gave 5");

        let short = args(&[40.0, 20.0, 20.0], [true, false, false]);
        let err = JointType::from_code(4, &short).unwrap_err();
        assert!(matches!(
            err,
            JoineryError::ParameterCountMismatch {
                expected: 12,
                actual: 6
            }
        ));
    }

    #[test]
    fn test_reserved_and_unknown_codes() {
        assert_eq!(JointType::from_code(6, &[]).unwrap(), JointType::Foundation);
        assert_eq!(JointType::from_code(7, &[TypeArg::Number(1.0)]).unwrap(), JointType::Top);
        assert_eq!(JointType::from_code(8, &[]).unwrap().family(), None);
        assert!(matches!(
            JointType::from_code(9, &[]),
            Err(JoineryError::UnknownJointType(9))
        ));
    }

    #[test]
    fn test_type_arg_conversions() {
        assert!(TypeArg::Number(2.0).as_flag());
        assert!(!TypeArg::Number(0.0).as_flag());
        assert_eq!(TypeArg::Flag(true).as_f64(), 1.0);
        assert_eq!(TypeArg::from(50).as_f64(), 50.0);
    }
}

//! Where on each beam a joint's dowel point sits.

use tracing::warn;

use super::kind::{EndSide, JointFamily};

/// Per-beam baseline parameters and candidate selection for one joint.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationMap {
    /// Baseline parameter of the joint point on each beam.
    pub t_locs_beam: Vec<f64>,
    /// Candidate side (0 or 1) used on every beam.
    pub side: usize,
    /// Candidate row (0, 1 or 2) used on each beam.
    pub rows: Vec<usize>,
}

impl LocationMap {
    fn new(t_locs_beam: &[f64], side: usize, rows: &[usize]) -> Self {
        Self {
            t_locs_beam: t_locs_beam.to_vec(),
            side,
            rows: rows.to_vec(),
        }
    }

    /// Mapping for `family` at `loc_index`.
    ///
    /// Index 1 and index 0 are mirror images of each other. Any other value
    /// is logged and mapped to the family's default.
    pub fn for_joint(family: JointFamily, loc_index: Option<i64>) -> Self {
        match (family, loc_index) {
            (JointFamily::Triple, Some(1)) => Self::new(&[1.0, 0.0, 1.0], 0, &[0, 1, 2]),
            (JointFamily::Triple, Some(0)) => Self::new(&[0.0, 1.0, 0.0], 1, &[0, 1, 2]),
            (JointFamily::End(EndSide::Start), Some(1)) => Self::new(&[0.0, 1.0], 0, &[1, 2]),
            (JointFamily::End(EndSide::Start), Some(0)) => Self::new(&[1.0, 0.0], 1, &[1, 2]),
            (JointFamily::End(EndSide::End), Some(1)) => Self::new(&[1.0, 0.0], 0, &[0, 1]),
            (JointFamily::End(EndSide::End), Some(0)) => Self::new(&[0.0, 1.0], 1, &[0, 1]),
            (family, other) => {
                warn!(
                    ?family,
                    loc_index = ?other,
                    "unknown joint location index, using default mapping"
                );
                match family {
                    JointFamily::Triple => Self::new(&[1.0, 0.0, 1.0], 1, &[0, 1, 2]),
                    JointFamily::End(EndSide::Start) => Self::new(&[1.0, 0.0], 1, &[1, 2]),
                    JointFamily::End(EndSide::End) => Self::new(&[1.0, 0.0], 0, &[0, 1]),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triple_locations_mirror() {
        let one = LocationMap::for_joint(JointFamily::Triple, Some(1));
        let zero = LocationMap::for_joint(JointFamily::Triple, Some(0));
        assert_eq!(one.t_locs_beam, vec![1.0, 0.0, 1.0]);
        assert_eq!(zero.t_locs_beam, vec![0.0, 1.0, 0.0]);
        assert_eq!((one.side, zero.side), (0, 1));
        assert_eq!(one.rows, zero.rows);
    }

    #[test]
    fn test_end_locations() {
        let start = LocationMap::for_joint(JointFamily::End(EndSide::Start), Some(1));
        assert_eq!(start, LocationMap::new(&[0.0, 1.0], 0, &[1, 2]));
        let end = LocationMap::for_joint(JointFamily::End(EndSide::End), Some(0));
        assert_eq!(end, LocationMap::new(&[0.0, 1.0], 1, &[0, 1]));
    }

    #[test]
    fn test_unknown_index_falls_back() {
        let triple = LocationMap::for_joint(JointFamily::Triple, Some(7));
        assert_eq!(triple, LocationMap::new(&[1.0, 0.0, 1.0], 1, &[0, 1, 2]));
        let start = LocationMap::for_joint(JointFamily::End(EndSide::Start), None);
        assert_eq!(start, LocationMap::new(&[1.0, 0.0], 1, &[1, 2]));
        let end = LocationMap::for_joint(JointFamily::End(EndSide::End), Some(-1));
        assert_eq!(end, LocationMap::new(&[1.0, 0.0], 0, &[0, 1]));
    }
}

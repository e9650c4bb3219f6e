//! JSON exchange format for fabricable beams.
//!
//! A file holds an array of beam records:
//!
//! ```json
//! [{"plane": {"x": 0, "y": 0, "z": 0, "xx": 1, "xy": 0, "xz": 0, "yx": 0, "yy": 1, "yz": 0},
//!   "dx": 1000, "dy": 100, "dz": 100,
//!   "holes": [{"x": 230, "y": 0, "z": 0, "xx": 0, "xy": 1, "xz": 0, "yx": -1, "yy": 0, "yz": 0}]}]
//! ```
//!
//! Planes store the origin and the X and Y axes; the normal is implied.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use timber_kernel_geom::Frame;
use timber_kernel_math::{Point3, Vec3};
use tracing::{debug, info};

use crate::config::FabricationConfig;
use crate::error::{JoineryError, Result};
use crate::fabricable::FabricableBeam;

/// Persisted frame: origin plus X and Y axis components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneRecord {
    /// Origin X.
    pub x: f64,
    /// Origin Y.
    pub y: f64,
    /// Origin Z.
    pub z: f64,
    /// X axis, x component.
    pub xx: f64,
    /// X axis, y component.
    pub xy: f64,
    /// X axis, z component.
    pub xz: f64,
    /// Y axis, x component.
    pub yx: f64,
    /// Y axis, y component.
    pub yy: f64,
    /// Y axis, z component.
    pub yz: f64,
}

impl From<&Frame> for PlaneRecord {
    fn from(frame: &Frame) -> Self {
        let x = frame.x_axis();
        let y = frame.y_axis();
        Self {
            x: frame.origin.x,
            y: frame.origin.y,
            z: frame.origin.z,
            xx: x.x,
            xy: x.y,
            xz: x.z,
            yx: y.x,
            yy: y.y,
            yz: y.z,
        }
    }
}

impl TryFrom<&PlaneRecord> for Frame {
    type Error = JoineryError;

    fn try_from(r: &PlaneRecord) -> Result<Self> {
        Frame::try_new(
            Point3::new(r.x, r.y, r.z),
            Vec3::new(r.xx, r.xy, r.xz),
            Vec3::new(r.yx, r.yy, r.yz),
        )
        .ok_or_else(|| {
            JoineryError::InvalidFrame(format!(
                "x axis ({}, {}, {}) and y axis ({}, {}, {}) do not span a plane",
                r.xx, r.xy, r.xz, r.yx, r.yy, r.yz
            ))
        })
    }
}

/// Persisted beam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamRecord {
    /// Base frame.
    pub plane: PlaneRecord,
    /// Length along X.
    pub dx: f64,
    /// Width along Y.
    pub dy: f64,
    /// Height along the normal.
    pub dz: f64,
    /// Hole frames.
    pub holes: Vec<PlaneRecord>,
}

impl From<&FabricableBeam> for BeamRecord {
    fn from(beam: &FabricableBeam) -> Self {
        Self {
            plane: beam.base_frame().into(),
            dx: beam.dx(),
            dy: beam.dy(),
            dz: beam.dz(),
            holes: beam.holes().iter().map(PlaneRecord::from).collect(),
        }
    }
}

impl TryFrom<&BeamRecord> for FabricableBeam {
    type Error = JoineryError;

    fn try_from(r: &BeamRecord) -> Result<Self> {
        let holes = r
            .holes
            .iter()
            .map(Frame::try_from)
            .collect::<Result<Vec<_>>>()?;
        FabricableBeam::new(Frame::try_from(&r.plane)?, r.dx, r.dy, r.dz, holes)
    }
}

impl FabricableBeam {
    /// Serialize beams to the JSON exchange format.
    pub fn to_json_string(beams: &[FabricableBeam]) -> Result<String> {
        let records: Vec<BeamRecord> = beams.iter().map(BeamRecord::from).collect();
        Ok(serde_json::to_string(&records)?)
    }

    /// Parse beams from the JSON exchange format. Any malformed record
    /// fails the whole parse.
    pub fn from_json_str(text: &str) -> Result<Vec<FabricableBeam>> {
        let records: Vec<BeamRecord> = serde_json::from_str(text)?;
        records.iter().map(FabricableBeam::try_from).collect()
    }

    /// Write beams to `<output_root>/<to>/<name>.json`, creating the
    /// directory if needed. `to = None` uses the configured default
    /// subdirectory.
    ///
    /// The file is written next to its target and renamed into place, so a
    /// failed write never leaves a partial file under the final name.
    pub fn write_as_json(
        beams: &[FabricableBeam],
        name: &str,
        to: Option<&str>,
        config: &FabricationConfig,
    ) -> Result<PathBuf> {
        let dir = config.output_dir(to);
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{name}.json"));
        let staging = dir.join(format!(".{name}.json.partial"));
        let text = Self::to_json_string(beams)?;

        debug!(path = %staging.display(), bytes = text.len(), "staging beam export");
        if let Err(e) = fs::write(&staging, &text).and_then(|_| fs::rename(&staging, &path)) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }

        info!(path = %path.display(), beams = beams.len(), "wrote fabricable beams");
        Ok(path)
    }

    /// Read beams written by [`write_as_json`](Self::write_as_json).
    pub fn read_from_json(path: impl AsRef<Path>) -> Result<Vec<FabricableBeam>> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let beams = Self::from_json_str(&text)?;
        info!(path = %path.display(), beams = beams.len(), "read fabricable beams");
        Ok(beams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timber_kernel_math::{Dir3, Transform};

    fn sample_beams() -> Vec<FabricableBeam> {
        let axis = Dir3::new_normalize(Vec3::new(0.3, -0.4, 1.0));
        let tilt = Transform::rotation_about_axis(&axis, 0.77);
        let base = Frame::new(Point3::new(12.5, -3.25, 1.0 / 3.0), Vec3::x(), Vec3::y())
            .transform(&tilt);
        let hole = Frame::new(
            Point3::new(0.1, 0.2, 0.3),
            Vec3::new(1.0, 2.0, 0.5),
            Vec3::new(-0.2, 0.1, 1.0),
        );
        vec![
            FabricableBeam::new(
                base,
                1234.5678,
                100.1,
                99.9,
                vec![hole.clone(), hole.transform(&tilt)],
            )
            .unwrap(),
            FabricableBeam::new(Frame::world_xy(), 1.0 / 7.0, 2.0, 3.0, vec![]).unwrap(),
        ]
    }

    fn frames_close(a: &Frame, b: &Frame) -> bool {
        (a.origin - b.origin).norm() <= 1e-9 * (1.0 + a.origin.coords.norm())
            && (a.x_axis() - b.x_axis()).norm() <= 1e-9
            && (a.y_axis() - b.y_axis()).norm() <= 1e-9
    }

    #[test]
    fn test_string_round_trip() {
        let beams = sample_beams();
        let text = FabricableBeam::to_json_string(&beams).unwrap();
        let back = FabricableBeam::from_json_str(&text).unwrap();

        assert_eq!(back.len(), beams.len());
        for (a, b) in beams.iter().zip(&back) {
            assert_eq!(a.dx(), b.dx());
            assert_eq!(a.dy(), b.dy());
            assert_eq!(a.dz(), b.dz());
            assert!(frames_close(a.base_frame(), b.base_frame()));
            assert_eq!(a.holes().len(), b.holes().len());
            for (ha, hb) in a.holes().iter().zip(b.holes()) {
                assert!(frames_close(ha, hb));
            }
        }
    }

    #[test]
    fn test_record_field_names() {
        let beams = sample_beams();
        let text = FabricableBeam::to_json_string(&beams[1..]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let record = &value[0];
        for key in ["plane", "dx", "dy", "dz", "holes"] {
            assert!(record.get(key).is_some(), "missing {key}");
        }
        for key in ["x", "y", "z", "xx", "xy", "xz", "yx", "yy", "yz"] {
            assert!(record["plane"].get(key).is_some(), "missing plane.{key}");
        }
        assert_eq!(record["plane"]["xx"], 1.0);
    }

    #[test]
    fn test_missing_key_fails() {
        let text = r#"[{"plane": {"x": 0, "y": 0, "z": 0,
                                  "xx": 1, "xy": 0, "xz": 0, "yx": 0, "yy": 1, "yz": 0},
                        "dx": 10, "dy": 1, "holes": []}]"#;
        assert!(matches!(FabricableBeam::from_json_str(text), Err(JoineryError::Json(_))));
    }

    #[test]
    fn test_invalid_dimension_fails() {
        let text = r#"[{"plane": {"x": 0, "y": 0, "z": 0,
                                  "xx": 1, "xy": 0, "xz": 0, "yx": 0, "yy": 1, "yz": 0},
                        "dx": -10, "dy": 1, "dz": 1, "holes": []}]"#;
        assert!(matches!(
            FabricableBeam::from_json_str(text),
            Err(JoineryError::InvalidDimensions(_))
        ));
    }

    fn record_text(plane_x: &str, plane_y: &str, hole_x: &str) -> String {
        format!(
            r#"[{{"plane": {{"x": 0, "y": 0, "z": 0, {plane_x}, {plane_y}}},
                 "dx": 10, "dy": 1, "dz": 1,
                 "holes": [{{"x": 5, "y": 0, "z": 0, {hole_x}, "yx": 0, "yy": 0, "yz": 1}}]}}]"#
        )
    }

    #[test]
    fn test_degenerate_planes_fail() {
        let good = record_text(
            r#""xx": 1, "xy": 0, "xz": 0"#,
            r#""yx": 0, "yy": 1, "yz": 0"#,
            r#""xx": 1, "xy": 0, "xz": 0"#,
        );
        assert!(FabricableBeam::from_json_str(&good).is_ok());

        // y axis parallel to x
        let parallel = record_text(
            r#""xx": 1, "xy": 0, "xz": 0"#,
            r#""yx": 2, "yy": 0, "yz": 0"#,
            r#""xx": 1, "xy": 0, "xz": 0"#,
        );
        assert!(matches!(
            FabricableBeam::from_json_str(&parallel),
            Err(JoineryError::InvalidFrame(_))
        ));

        // hole with a zero x axis
        let zero_hole = record_text(
            r#""xx": 1, "xy": 0, "xz": 0"#,
            r#""yx": 0, "yy": 1, "yz": 0"#,
            r#""xx": 0, "xy": 0, "xz": 0"#,
        );
        assert!(matches!(
            FabricableBeam::from_json_str(&zero_hole),
            Err(JoineryError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_plane_record_conversion() {
        let frame = Frame::new(Point3::new(1.0, 2.0, 3.0), Vec3::y(), Vec3::z());
        let record = PlaneRecord::from(&frame);
        assert_eq!(Frame::try_from(&record).unwrap(), frame);

        let zero = PlaneRecord {
            xx: 0.0,
            xy: 0.0,
            xz: 0.0,
            ..record
        };
        assert!(Frame::try_from(&zero).is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let root = std::env::temp_dir()
            .join(format!("timber_joinery_persist_{}", std::process::id()));
        let config = FabricationConfig::default().with_output_root(&root);
        let beams = sample_beams();

        let path =
            FabricableBeam::write_as_json(&beams, "layer_0", Some("export"), &config).unwrap();
        assert_eq!(path, root.join("export").join("layer_0.json"));
        assert!(!root.join("export").join(".layer_0.json.partial").exists());

        let back = FabricableBeam::read_from_json(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].dx(), beams[0].dx());

        let default_dir = FabricableBeam::write_as_json(&beams, "layer_1", None, &config).unwrap();
        assert_eq!(default_dir, root.join("data").join("layer_1.json"));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_read_missing_file() {
        let path = std::env::temp_dir().join("timber_joinery_does_not_exist.json");
        assert!(matches!(FabricableBeam::read_from_json(path), Err(JoineryError::Io(_))));
    }
}

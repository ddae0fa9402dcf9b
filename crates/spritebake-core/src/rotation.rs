//! Capture directions.
//!
//! Multi-direction sprites rotate the camera, not the model, so one import
//! serves every direction of an asset.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Compass label of a capture direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compass {
    South,
    East,
    North,
    West,
}

impl Compass {
    /// Returns the label as written to metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Compass::South => "South",
            Compass::East => "East",
            Compass::North => "North",
            Compass::West => "West",
        }
    }

    /// Filename suffix used in 4-direction runs.
    pub fn suffix(&self) -> &'static str {
        match self {
            Compass::South => "_s",
            Compass::East => "_e",
            Compass::North => "_n",
            Compass::West => "_w",
        }
    }
}

impl fmt::Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-render parameters for one direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction {
    /// Camera yaw used for the render, in degrees.
    pub yaw_degrees: f64,
    /// Rotation reported in metadata, in degrees.
    pub rotation_degrees: u32,
    pub compass: Compass,
    /// Appended to the output file stem; empty for single renders.
    pub suffix: &'static str,
}

/// Yaw of the South direction in 4-direction runs.
pub const FOUR_WAY_BASE_YAW: f64 = 0.0;

const FOUR_WAY: [(u32, Compass); 4] = [
    (0, Compass::South),
    (90, Compass::East),
    (180, Compass::North),
    (270, Compass::West),
];

/// Expands a rotation count into capture directions.
///
/// A count of 4 yields South, East, North, West at 0/90/180/270 degrees from
/// a fixed base. Any other count yields one South render at `baseline_yaw`
/// with no filename suffix.
pub fn directions(rotations: u32, baseline_yaw: f64) -> Vec<Direction> {
    if rotations == 4 {
        FOUR_WAY
            .iter()
            .map(|&(degrees, compass)| Direction {
                yaw_degrees: FOUR_WAY_BASE_YAW + f64::from(degrees),
                rotation_degrees: degrees,
                compass,
                suffix: compass.suffix(),
            })
            .collect()
    } else {
        vec![Direction {
            yaw_degrees: baseline_yaw,
            rotation_degrees: 0,
            compass: Compass::South,
            suffix: "",
        }]
    }
}

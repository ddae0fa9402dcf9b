//! Camera placement.
//!
//! The camera sits on a sphere around the bounds center and looks at it.
//! Under an orthographic projection the sphere radius does not change the
//! apparent size of the model, it only has to be positive, so framing depends
//! on nothing but the center, the pitch and the yaw.
//!
//! Conventions: Z is up. At yaw 0 the camera sits on the -Y side of the
//! model looking toward +Y. Increasing yaw moves the camera clockwise around
//! the vertical axis as seen from above. The camera looks down its local -Z
//! axis with local +Y as its up axis.

use serde::{Deserialize, Serialize};

use crate::scene::Vec3;

/// Distance from the camera to the bounds center.
pub const CAMERA_DISTANCE: f64 = 10.0;

/// Horizontal view components below this length count as a vertical view.
const VERTICAL_EPSILON: f64 = 1e-9;

/// Camera position and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// World-space position.
    pub position: Vec3,
    /// Unit quaternion `[w, x, y, z]`.
    pub rotation: [f64; 4],
}

impl CameraPose {
    /// Rotates a camera-local vector into world space.
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let [w, x, y, z] = self.rotation;
        let q = [x, y, z];
        let t = scale(cross(q, v), 2.0);
        add(add(v, scale(t, w)), cross(q, t))
    }

    /// World-space view direction (camera local -Z).
    pub fn forward(&self) -> Vec3 {
        self.rotate([0.0, 0.0, -1.0])
    }

    /// World-space right axis (camera local +X).
    pub fn right(&self) -> Vec3 {
        self.rotate([1.0, 0.0, 0.0])
    }

    /// World-space up axis (camera local +Y).
    pub fn up(&self) -> Vec3 {
        self.rotate([0.0, 1.0, 0.0])
    }
}

/// Offset of the camera from the target for a pitch and yaw in degrees.
///
/// ```text
/// forward = -distance * cos(pitch)
/// up      =  distance * sin(pitch)
/// offset  = (forward * sin(yaw), forward * cos(yaw), up)
/// ```
pub fn camera_offset(pitch_degrees: f64, yaw_degrees: f64, distance: f64) -> Vec3 {
    let pitch = pitch_degrees.to_radians();
    let yaw = yaw_degrees.to_radians();

    let local_forward = -distance * pitch.cos();
    let local_up = distance * pitch.sin();

    [local_forward * yaw.sin(), local_forward * yaw.cos(), local_up]
}

/// Places the camera around `center` and points it at `center`.
pub fn place_camera(center: Vec3, pitch_degrees: f64, yaw_degrees: f64) -> CameraPose {
    let offset = camera_offset(pitch_degrees, yaw_degrees, CAMERA_DISTANCE);
    let position = add(center, offset);
    CameraPose {
        position,
        rotation: look_at(position, center),
    }
}

/// Orientation that points the camera's -Z axis from `eye` at `target`,
/// keeping the right axis horizontal (no roll).
///
/// A vertical view has no unique horizontal right axis; world +X is used so
/// the straight-down view does not depend on yaw.
pub fn look_at(eye: Vec3, target: Vec3) -> [f64; 4] {
    let back = normalize(sub(eye, target));

    // right = world_up x back, which is always horizontal.
    let horizontal = [-back[1], back[0], 0.0];
    let right = if length(horizontal) < VERTICAL_EPSILON {
        [1.0, 0.0, 0.0]
    } else {
        normalize(horizontal)
    };
    let up = cross(back, right);

    quaternion_from_basis(right, up, back)
}

/// Converts an orthonormal basis (the columns of a rotation matrix) into a
/// unit quaternion `[w, x, y, z]` with `w >= 0`.
fn quaternion_from_basis(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> [f64; 4] {
    // m[row][col]
    let m = [
        [x_axis[0], y_axis[0], z_axis[0]],
        [x_axis[1], y_axis[1], z_axis[1]],
        [x_axis[2], y_axis[2], z_axis[2]],
    ];
    let trace = m[0][0] + m[1][1] + m[2][2];

    let q = if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        [
            0.25 * s,
            (m[2][1] - m[1][2]) / s,
            (m[0][2] - m[2][0]) / s,
            (m[1][0] - m[0][1]) / s,
        ]
    } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
        let s = (1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt() * 2.0;
        [
            (m[2][1] - m[1][2]) / s,
            0.25 * s,
            (m[0][1] + m[1][0]) / s,
            (m[0][2] + m[2][0]) / s,
        ]
    } else if m[1][1] > m[2][2] {
        let s = (1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt() * 2.0;
        [
            (m[0][2] - m[2][0]) / s,
            (m[0][1] + m[1][0]) / s,
            0.25 * s,
            (m[1][2] + m[2][1]) / s,
        ]
    } else {
        let s = (1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt() * 2.0;
        [
            (m[1][0] - m[0][1]) / s,
            (m[0][2] + m[2][0]) / s,
            (m[1][2] + m[2][1]) / s,
            0.25 * s,
        ]
    };

    let norm = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    let sign = if q[0] < 0.0 { -1.0 } else { 1.0 };
    [
        sign * q[0] / norm,
        sign * q[1] / norm,
        sign * q[2] / norm,
        sign * q[3] / norm,
    ]
}

fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(a: Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn length(a: Vec3) -> f64 {
    (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt()
}

fn normalize(a: Vec3) -> Vec3 {
    let len = length(a);
    if len == 0.0 {
        a
    } else {
        scale(a, 1.0 / len)
    }
}

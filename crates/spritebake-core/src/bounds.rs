//! World-space bounds of the imported geometry.

use serde::{Deserialize, Serialize};

use crate::scene::{Mat4, MeshNode, Vec3};

/// Axis-aligned bounds of every mesh in the scene, in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneBounds {
    /// Minimum corner [X, Y, Z].
    pub min: Vec3,
    /// Maximum corner [X, Y, Z].
    pub max: Vec3,
    /// Number of mesh nodes that contributed.
    pub mesh_count: usize,
}

impl SceneBounds {
    /// Midpoint of the box.
    pub fn center(&self) -> Vec3 {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }

    /// Extent along X.
    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    /// Extent along Y.
    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// Extent along Z.
    pub fn depth(&self) -> f64 {
        self.max[2] - self.min[2]
    }

    /// Largest of width, height and depth.
    pub fn max_dimension(&self) -> f64 {
        self.width().max(self.height()).max(self.depth())
    }
}

/// Computes the bounds of `meshes`, or `None` when there are no meshes.
///
/// Every corner of every local box is transformed, so rotated or skewed
/// children are bounded tightly rather than by their parent's box.
pub fn scene_bounds(meshes: &[MeshNode]) -> Option<SceneBounds> {
    if meshes.is_empty() {
        return None;
    }

    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];

    for mesh in meshes {
        for corner in &mesh.bound_box {
            let world = transform_point(&mesh.matrix_world, corner);
            for axis in 0..3 {
                min[axis] = min[axis].min(world[axis]);
                max[axis] = max[axis].max(world[axis]);
            }
        }
    }

    Some(SceneBounds {
        min,
        max,
        mesh_count: meshes.len(),
    })
}

/// Applies an affine row-major transform to a point.
pub fn transform_point(m: &Mat4, p: &Vec3) -> Vec3 {
    let mut out = [0.0; 3];
    for (row, value) in out.iter_mut().enumerate() {
        *value = m[row][0] * p[0] + m[row][1] * p[1] + m[row][2] * p[2] + m[row][3];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::IDENTITY;

    const EPS: f64 = 1e-9;

    fn translation(t: Vec3) -> Mat4 {
        let mut m = IDENTITY;
        m[0][3] = t[0];
        m[1][3] = t[1];
        m[2][3] = t[2];
        m
    }

    fn rotation_z(degrees: f64) -> Mat4 {
        let (s, c) = degrees.to_radians().sin_cos();
        [
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn test_empty_scene_has_no_bounds() {
        assert!(scene_bounds(&[]).is_none());
    }

    #[test]
    fn test_single_translated_box() {
        let mesh = MeshNode::from_local_box(
            "crate",
            [-1.0, -1.0, 0.0],
            [1.0, 1.0, 2.0],
            translation([5.0, 0.0, 1.0]),
        );
        let bounds = scene_bounds(&[mesh]).unwrap();

        assert_eq!(bounds.min, [4.0, -1.0, 1.0]);
        assert_eq!(bounds.max, [6.0, 1.0, 3.0]);
        assert_eq!(bounds.center(), [5.0, 0.0, 2.0]);
        assert_eq!(bounds.width(), 2.0);
        assert_eq!(bounds.height(), 2.0);
        assert_eq!(bounds.depth(), 2.0);
        assert_eq!(bounds.mesh_count, 1);
    }

    #[test]
    fn test_union_of_several_meshes() {
        let a = MeshNode::from_local_box("a", [0.0; 3], [1.0; 3], IDENTITY);
        let b = MeshNode::from_local_box("b", [0.0; 3], [1.0; 3], translation([-3.0, 2.0, 0.5]));
        let bounds = scene_bounds(&[a, b]).unwrap();

        assert_eq!(bounds.min, [-3.0, 0.0, 0.0]);
        assert_eq!(bounds.max, [1.0, 3.0, 1.5]);
        assert_eq!(bounds.max_dimension(), 4.0);
    }

    #[test]
    fn test_rotated_child_uses_transformed_corners() {
        // A 2x2 box rotated 45 degrees spans the full diagonal.
        let mesh = MeshNode::from_local_box("diamond", [-1.0, -1.0, 0.0], [1.0, 1.0, 1.0], rotation_z(45.0));
        let bounds = scene_bounds(&[mesh]).unwrap();

        let half_diagonal = 2f64.sqrt();
        assert!((bounds.max[0] - half_diagonal).abs() < EPS);
        assert!((bounds.min[1] + half_diagonal).abs() < EPS);
        assert!((bounds.width() - 2.0 * half_diagonal).abs() < EPS);
    }
}

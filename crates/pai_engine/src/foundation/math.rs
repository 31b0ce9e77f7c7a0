//! Math types used by the renderer
//!
//! Thin aliases over nalgebra plus the object transform.

pub use nalgebra::{Matrix4, Rotation3, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Column-major array form of a [`Mat4`], matching GLSL `mat4` memory layout
pub fn mat4_to_cols(matrix: &Mat4) -> [[f32; 4]; 4] {
    let mut cols = [[0.0; 4]; 4];
    for (c, col) in cols.iter_mut().enumerate() {
        for (r, value) in col.iter_mut().enumerate() {
            *value = matrix[(r, c)];
        }
    }
    cols
}

/// Translation, Euler rotation and scale of a renderable object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub translation: Vec3,

    /// Euler angles in radians (x = roll, y = pitch, z = yaw)
    pub rotation: Vec3,

    /// Per-axis scale. Point lights store their billboard radius in `scale.x`.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Transform with only a translation
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }
}

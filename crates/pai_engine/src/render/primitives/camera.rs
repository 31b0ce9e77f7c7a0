//! # Camera
//!
//! Stores the projection, view and inverse view matrices uploaded in the
//! global uniform block.
//!
//! ## Conventions
//! - Right-handed world space, the camera looks down its +Z axis
//! - Vulkan clip space: Y points down, depth ranges over 0..1
//! - The inverse view is kept alongside the view so the camera position is
//!   available without a matrix inversion

use crate::foundation::math::{Mat4, Vec3};

/// Camera matrices for one viewpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    projection: Mat4,
    view: Mat4,
    inverse_view: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Mat4::identity(),
            view: Mat4::identity(),
            inverse_view: Mat4::identity(),
        }
    }
}

impl Camera {
    /// Create a camera at the origin with identity matrices
    pub fn new() -> Self {
        Self::default()
    }

    /// Orthographic projection of the box bounded by the given planes
    pub fn set_orthographic_projection(
        &mut self,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) {
        let mut projection = Mat4::identity();
        projection[(0, 0)] = 2.0 / (right - left);
        projection[(1, 1)] = 2.0 / (bottom - top);
        projection[(2, 2)] = 1.0 / (far - near);
        projection[(0, 3)] = -(right + left) / (right - left);
        projection[(1, 3)] = -(bottom + top) / (bottom - top);
        projection[(2, 3)] = -near / (far - near);
        self.projection = projection;
    }

    /// Perspective projection
    ///
    /// `fovy` is the vertical field of view in radians, `aspect` is width over height.
    pub fn set_perspective_projection(&mut self, fovy: f32, aspect: f32, near: f32, far: f32) {
        debug_assert!(aspect.abs() > f32::EPSILON, "aspect ratio must be non-zero");
        let tan_half_fovy = (fovy / 2.0).tan();
        let mut projection = Mat4::zeros();
        projection[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        projection[(1, 1)] = 1.0 / tan_half_fovy;
        projection[(2, 2)] = far / (far - near);
        projection[(3, 2)] = 1.0;
        projection[(2, 3)] = -(far * near) / (far - near);
        self.projection = projection;
    }

    /// Look from `position` along `direction`
    pub fn set_view_direction(&mut self, position: Vec3, direction: Vec3, up: Vec3) {
        let w = direction.normalize();
        let u = w.cross(&up).normalize();
        let v = w.cross(&u);
        self.set_view_basis(position, u, v, w);
    }

    /// Look from `position` at `target`
    pub fn set_view_target(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        self.set_view_direction(position, target - position, up);
    }

    /// Orient the camera with Tait-Bryan angles applied in Y, X, Z order
    pub fn set_view_yxz(&mut self, position: Vec3, rotation: Vec3) {
        let (s3, c3) = rotation.z.sin_cos();
        let (s2, c2) = rotation.x.sin_cos();
        let (s1, c1) = rotation.y.sin_cos();
        let u = Vec3::new(c1 * c3 + s1 * s2 * s3, c2 * s3, c1 * s2 * s3 - c3 * s1);
        let v = Vec3::new(c3 * s1 * s2 - c1 * s3, c2 * c3, c1 * c3 * s2 + s1 * s3);
        let w = Vec3::new(c2 * s1, -s2, c1 * c2);
        self.set_view_basis(position, u, v, w);
    }

    fn set_view_basis(&mut self, position: Vec3, u: Vec3, v: Vec3, w: Vec3) {
        let mut view = Mat4::identity();
        let mut inverse_view = Mat4::identity();
        for (row, axis) in [u, v, w].iter().enumerate() {
            for col in 0..3 {
                view[(row, col)] = axis[col];
                inverse_view[(col, row)] = axis[col];
            }
            view[(row, 3)] = -axis.dot(&position);
            inverse_view[(row, 3)] = position[row];
        }
        self.view = view;
        self.inverse_view = inverse_view;
    }

    /// Projection matrix
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// World to camera matrix
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Camera to world matrix
    pub fn inverse_view(&self) -> &Mat4 {
        &self.inverse_view
    }

    /// Camera position in world space
    pub fn position(&self) -> Vec3 {
        self.inverse_view.fixed_view::<3, 1>(0, 3).into_owned()
    }
}

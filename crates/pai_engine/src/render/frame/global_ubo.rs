//! Global uniform block
//!
//! Mirrors the `GlobalUbo` block declared in the shaders with std140 layout:
//! three `mat4`, one `vec4`, `MAX_LIGHTS` point lights of two `vec4` each and
//! an `int` count, padded to a multiple of 16 bytes.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{mat4_to_cols, Mat4, Vec3};
use crate::render::primitives::Camera;

/// Capacity of the point light array
pub const MAX_LIGHTS: usize = 100;

/// Default ambient light: white at 2% intensity
pub const DEFAULT_AMBIENT_LIGHT: [f32; 4] = [1.0, 1.0, 1.0, 0.02];

/// Point light entry of the uniform block
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PointLight {
    /// World position, `w` ignored
    pub position: [f32; 4],
    /// RGB color, intensity in `w`
    pub color: [f32; 4],
}

impl PointLight {
    /// Light at `position` with `color` and `intensity`
    pub fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position: [position.x, position.y, position.z, 1.0],
            color: [color.x, color.y, color.z, intensity],
        }
    }
}

/// Camera matrices, ambient light and point lights, uploaded once per frame
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalUbo {
    /// Projection matrix, column-major
    pub projection: [[f32; 4]; 4],
    /// View matrix, column-major
    pub view: [[f32; 4]; 4],
    /// Inverse view matrix, column-major
    pub inverse_view: [[f32; 4]; 4],
    /// Ambient color, intensity in `w`
    pub ambient_light_color: [f32; 4],
    /// Point lights; only the first `num_lights` are meaningful
    pub point_lights: [PointLight; MAX_LIGHTS],
    /// Active light count
    pub num_lights: i32,
    _padding: [i32; 3],
}

impl Default for GlobalUbo {
    fn default() -> Self {
        let identity = mat4_to_cols(&Mat4::identity());
        Self {
            projection: identity,
            view: identity,
            inverse_view: identity,
            ambient_light_color: DEFAULT_AMBIENT_LIGHT,
            point_lights: [PointLight::default(); MAX_LIGHTS],
            num_lights: 0,
            _padding: [0; 3],
        }
    }
}

impl GlobalUbo {
    /// Block with the camera's matrices, `ambient_light_color` and no lights
    pub fn new(camera: &Camera, ambient_light_color: [f32; 4]) -> Self {
        let mut ubo = Self {
            ambient_light_color,
            ..Self::default()
        };
        ubo.set_camera(camera);
        ubo
    }

    /// Copy the camera's matrices
    pub fn set_camera(&mut self, camera: &Camera) {
        self.projection = mat4_to_cols(camera.projection());
        self.view = mat4_to_cols(camera.view());
        self.inverse_view = mat4_to_cols(camera.inverse_view());
    }

    /// Forget all point lights
    pub fn clear_point_lights(&mut self) {
        self.num_lights = 0;
    }

    /// Append a point light
    ///
    /// # Panics
    ///
    /// Panics when the block already holds [`MAX_LIGHTS`] lights. Dropping the
    /// extra light silently would render the scene without it.
    pub fn push_point_light(&mut self, light: PointLight) {
        let index = self.light_count();
        assert!(
            index < MAX_LIGHTS,
            "point lights exceed maximum of {MAX_LIGHTS}"
        );
        self.point_lights[index] = light;
        self.num_lights += 1;
    }

    /// Number of active lights
    pub fn light_count(&self) -> usize {
        usize::try_from(self.num_lights).unwrap_or(0)
    }

    /// The active point lights
    pub fn active_point_lights(&self) -> &[PointLight] {
        &self.point_lights[..self.light_count().min(MAX_LIGHTS)]
    }

    /// Raw bytes as uploaded to the GPU
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_std140_block() {
        assert_eq!(std::mem::size_of::<PointLight>(), 32);
        assert_eq!(std::mem::size_of::<GlobalUbo>(), 3424);
        assert_eq!(std::mem::size_of::<GlobalUbo>() % 16, 0);

        let mut ubo = GlobalUbo::default();
        ubo.point_lights[0].color = [9.0; 4];
        ubo.num_lights = 7;
        let bytes = ubo.as_bytes();
        assert_eq!(&bytes[192..196], &1.0f32.to_ne_bytes());
        assert_eq!(&bytes[224..228], &9.0f32.to_ne_bytes());
        assert_eq!(&bytes[3408..3412], &7i32.to_ne_bytes());
    }

    #[test]
    fn default_has_ambient_and_no_lights() {
        let ubo = GlobalUbo::default();
        assert_eq!(ubo.ambient_light_color, [1.0, 1.0, 1.0, 0.02]);
        assert!(ubo.active_point_lights().is_empty());
        assert_eq!(ubo.projection[0], [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn camera_matrices_are_copied_column_major() {
        let mut camera = Camera::new();
        camera.set_view_direction(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, -1.0, 0.0),
        );
        let ubo = GlobalUbo::new(&camera, [0.5; 4]);
        assert_eq!(ubo.inverse_view[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(ubo.ambient_light_color, [0.5; 4]);
    }

    #[test]
    fn pushed_lights_are_read_back_in_order() {
        let mut ubo = GlobalUbo::default();
        let first = PointLight::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 0.5);
        let second = PointLight::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 0.25);
        ubo.push_point_light(first);
        ubo.push_point_light(second);

        assert_eq!(ubo.num_lights, 2);
        assert_eq!(ubo.active_point_lights(), &[first, second]);
        assert_eq!(first.position[3], 1.0);
        assert_eq!(second.color[3], 0.25);

        ubo.clear_point_lights();
        assert!(ubo.active_point_lights().is_empty());
    }

    #[test]
    fn fills_to_capacity() {
        let mut ubo = GlobalUbo::default();
        for _ in 0..MAX_LIGHTS {
            ubo.push_point_light(PointLight::default());
        }
        assert_eq!(ubo.light_count(), MAX_LIGHTS);
    }

    #[test]
    #[should_panic(expected = "point lights exceed maximum")]
    fn overflow_panics() {
        let mut ubo = GlobalUbo::default();
        for _ in 0..=MAX_LIGHTS {
            ubo.push_point_light(PointLight::default());
        }
    }
}

//! Renderable object representation for the scene

use crate::foundation::math::{Transform, Vec3};

/// Marks an object as an emissive point light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightComponent {
    /// Light intensity, written into the alpha channel of the light color
    pub light_intensity: f32,
}

impl Default for PointLightComponent {
    fn default() -> Self {
        Self { light_intensity: 1.0 }
    }
}

/// An object in the scene
///
/// Regular objects carry only a transform and a color. Objects with a
/// [`PointLightComponent`] are picked up by the point light system, which orbits
/// them and draws them as billboards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderableObject {
    /// World-space transform
    pub transform: Transform,

    /// Base color (RGB)
    pub color: Vec3,

    /// Present on light-emitting objects
    pub point_light: Option<PointLightComponent>,
}

impl RenderableObject {
    /// Create a plain, non-emissive object
    pub fn new(transform: Transform, color: Vec3) -> Self {
        Self {
            transform,
            color,
            point_light: None,
        }
    }

    /// Create a point light object
    ///
    /// The billboard radius is kept in `transform.scale.x`.
    pub fn point_light(intensity: f32, radius: f32, color: Vec3) -> Self {
        Self {
            transform: Transform {
                scale: Vec3::new(radius, 1.0, 1.0),
                ..Transform::default()
            },
            color,
            point_light: Some(PointLightComponent {
                light_intensity: intensity,
            }),
        }
    }

    /// Builder-style translation setter
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.transform.translation = translation;
        self
    }

    /// Whether the point light system should handle this object
    pub fn is_point_light(&self) -> bool {
        self.point_light.is_some()
    }

    /// Billboard radius of a point light
    pub fn light_radius(&self) -> f32 {
        self.transform.scale.x
    }
}

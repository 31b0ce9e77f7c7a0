//! Render systems that run inside the frame renderer's render pass

pub mod point_light;

pub use point_light::{LightOrbit, PointLightPushConstants, PointLightSystem};

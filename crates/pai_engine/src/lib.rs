//! # PAI Engine
//!
//! Frame rendering core for a small Vulkan renderer.
//!
//! ## Features
//!
//! - **Frame renderer**: per-image command buffers, acquire/record/submit loop
//! - **Procedural geometry**: Sierpinski triangle mesh uploaded once at startup
//! - **Point lights**: orbiting lights rendered as alpha-blended billboards
//! - **Pluggable host**: device, swapchain, window and uniforms are traits
//!
//! The host application creates the Vulkan instance, device, swapchain and
//! window, then hands them to [`render::FrameRenderer`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pai_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     pai_engine::foundation::logging::init();
//!     let mut config = RendererConfig::load_from_file("renderer.toml")?;
//!     config.resolve_shader_paths();
//!     println!("clear color {:?}", config.clear_color);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;

#[cfg(test)]
pub(crate) mod testing;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, LightOrbitConfig, MeshConfig, RendererConfig, ShaderConfig},
        foundation::{
            math::{Mat4, Transform, Vec2, Vec3, Vec4},
            time::FrameTimer,
        },
        render::{
            api::{GlobalUniforms, GpuDevice, Swapchain, WindowHost},
            frame::{FrameContext, GlobalUbo, PointLight, MAX_LIGHTS},
            primitives::{Camera, Model, Vertex},
            systems::{LightOrbit, PointLightSystem},
            FrameRenderer, RenderError, RenderResult,
        },
        scene::{ObjectId, PointLightComponent, RenderableObject, SceneObjects},
    };
}

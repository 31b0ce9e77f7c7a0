//! Render primitives: vertices, procedural meshes, GPU models and the camera

pub mod camera;
pub mod mesh;
pub mod model;

pub use camera::Camera;
pub use mesh::{sierpinski, sierpinski_mesh, sierpinski_vertex_count, Vertex};
pub use model::Model;

//! Graphics pipeline configuration

pub mod pipeline_config;
pub mod vertex_layout;

pub use pipeline_config::PipelineConfig;
pub use vertex_layout::VertexLayout;

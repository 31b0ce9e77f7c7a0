//! Vertex input descriptions for [`Vertex`]

use ash::vk;
use std::mem;

use crate::render::primitives::Vertex;

/// Vertex input state of the base geometry pipeline
pub struct VertexLayout;

impl VertexLayout {
    /// Single per-vertex binding at binding 0
    pub fn binding_descriptions() -> Vec<vk::VertexInputBindingDescription> {
        vec![vk::VertexInputBindingDescription {
            binding: 0,
            stride: mem::size_of::<Vertex>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }]
    }

    /// Position (location 0) and color (location 1)
    pub fn attribute_descriptions() -> Vec<vk::VertexInputAttributeDescription> {
        vec![
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 0,
                format: vk::Format::R32G32_SFLOAT,
                offset: 0,
            },
            vk::VertexInputAttributeDescription {
                binding: 0,
                location: 1,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: 2 * mem::size_of::<f32>() as u32,
            },
        ]
    }
}

//! Scene objects handed to the renderer each frame
//!
//! The host owns the collection. Render systems borrow it for a single frame,
//! mutate transforms in place and never insert or remove objects.

pub mod renderable_object;

pub use renderable_object::{PointLightComponent, RenderableObject};

slotmap::new_key_type! {
    /// Stable identifier of a [`RenderableObject`] within [`SceneObjects`]
    pub struct ObjectId;
}

/// Arena of renderable objects keyed by stable [`ObjectId`]s
pub type SceneObjects = slotmap::SlotMap<ObjectId, RenderableObject>;

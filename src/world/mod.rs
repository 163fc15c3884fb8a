//! World model: what the renderer shows and what authoring asks for.

mod fields;
mod state;
mod target;

pub use fields::{clamp_to, BackgroundField, FieldPath, FieldValue, MeshField};
pub use state::WorldState;
pub use target::{
    accept_target, BackgroundParams, BackgroundStyle, MeshParams, Mood, RenderMode, WorldTarget,
    TRANSITION_SECONDS_RANGE,
};

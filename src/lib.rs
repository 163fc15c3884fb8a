//! moodmesh library - audio-reactive creature mesh with authored mood plans

pub mod audio;
pub mod authoring;
pub mod blend;
pub mod color;
pub mod deform;
pub mod error;
pub mod json;
pub mod logging;
pub mod params;
pub mod plan;
pub mod session;
pub mod timeline;
pub mod transition;
pub mod world;

pub use error::{Error, Result};

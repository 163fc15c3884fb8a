use serde::Serialize;

use super::fields::{FieldPath, FieldValue};
use super::target::{BackgroundParams, MeshParams, Mood, RenderMode, WorldTarget};
use crate::color::Rgb;

/// Live world values as seen by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    pub render_mode: RenderMode,
    pub mood: Mood,
    #[serde(rename = "ferro")]
    pub mesh: MeshParams,
    pub background: BackgroundParams,
    /// Displayed creature color
    pub surface_color: Rgb,
    /// Bumped on every change
    pub revision: u64,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::from_target(&WorldTarget::default())
    }
}

impl WorldState {
    /// Snapshot a target as an already-settled state
    pub fn from_target(target: &WorldTarget) -> Self {
        let target = target.clamped();
        Self {
            render_mode: target.render_mode,
            mood: target.mood,
            mesh: target.mesh,
            background: target.background,
            surface_color: target.mesh.base_color,
            revision: 0,
        }
    }

    pub fn get(&self, path: FieldPath) -> FieldValue {
        match path {
            FieldPath::Mesh(field) => self.mesh.get(field),
            FieldPath::Background(field) => self.background.get(field),
            FieldPath::SurfaceColor => FieldValue::Color(self.surface_color),
        }
    }

    pub fn set(&mut self, path: FieldPath, value: FieldValue) {
        match (path, value) {
            (FieldPath::Mesh(field), value) => self.mesh.set(field, value),
            (FieldPath::Background(field), value) => self.background.set(field, value),
            (FieldPath::SurfaceColor, FieldValue::Color(c)) => self.surface_color = c,
            (FieldPath::SurfaceColor, FieldValue::Scalar(_)) => {}
        }
    }
}

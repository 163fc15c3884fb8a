//! Authored world targets: parameter groups, clamping, acceptance.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::fields::{clamp_to, BackgroundField, FieldValue, MeshField};
use crate::color::Rgb;
use crate::error::AuthoringError;
use crate::json::{extract_object, lenient_f64, lenient_str};

/// Allowed transition request range (seconds)
pub const TRANSITION_SECONDS_RANGE: (f32, f32) = (5.0, 20.0);

/// Effect budget of the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Full,
    Reduced,
}

impl RenderMode {
    pub fn from_tag(tag: &str) -> Option<RenderMode> {
        match tag.trim().to_lowercase().as_str() {
            "full" => Some(RenderMode::Full),
            "reduced" | "lite" | "low" => Some(RenderMode::Reduced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Calm,
    Dreamy,
    #[default]
    Neutral,
    Tense,
    Wild,
}

impl Mood {
    pub fn from_tag(tag: &str) -> Option<Mood> {
        match tag.trim().to_lowercase().as_str() {
            "calm" => Some(Mood::Calm),
            "dreamy" => Some(Mood::Dreamy),
            "neutral" => Some(Mood::Neutral),
            "tense" => Some(Mood::Tense),
            "wild" => Some(Mood::Wild),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundStyle {
    #[default]
    Gradient,
    Nebula,
    Aurora,
    Void,
}

impl BackgroundStyle {
    pub fn from_tag(tag: &str) -> Option<BackgroundStyle> {
        match tag.trim().to_lowercase().as_str() {
            "gradient" => Some(BackgroundStyle::Gradient),
            "nebula" => Some(BackgroundStyle::Nebula),
            "aurora" => Some(BackgroundStyle::Aurora),
            "void" => Some(BackgroundStyle::Void),
            _ => None,
        }
    }
}

/// Creature material and deformation parameters
///
/// Scalar ranges are listed on [`MeshField::range`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshParams {
    pub base_color: Rgb,
    pub accent_color: Rgb,
    pub saturation: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub env_intensity: f32,
    pub deform_strength: f32,
    pub deform_scale: f32,
    pub deform_speed: f32,
    pub sway_amount: f32,
    pub sway_speed: f32,
    pub pulse_amount: f32,
    #[serde(alias = "gravityStrength")]
    pub attraction_strength: f32,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            base_color: Rgb::new(0.35, 0.3, 0.8),
            accent_color: Rgb::new(0.9, 0.4, 0.6),
            saturation: 0.7,
            roughness: 0.3,
            metalness: 0.8,
            env_intensity: 1.0,
            deform_strength: 1.0,
            deform_scale: 1.0,
            deform_speed: 1.0,
            sway_amount: 0.2,
            sway_speed: 0.5,
            pulse_amount: 0.3,
            attraction_strength: 1.0,
        }
    }
}

impl MeshParams {
    pub fn get(&self, field: MeshField) -> FieldValue {
        use FieldValue::{Color, Scalar};
        match field {
            MeshField::BaseColor => Color(self.base_color),
            MeshField::AccentColor => Color(self.accent_color),
            MeshField::Saturation => Scalar(self.saturation),
            MeshField::Roughness => Scalar(self.roughness),
            MeshField::Metalness => Scalar(self.metalness),
            MeshField::EnvIntensity => Scalar(self.env_intensity),
            MeshField::DeformStrength => Scalar(self.deform_strength),
            MeshField::DeformScale => Scalar(self.deform_scale),
            MeshField::DeformSpeed => Scalar(self.deform_speed),
            MeshField::SwayAmount => Scalar(self.sway_amount),
            MeshField::SwaySpeed => Scalar(self.sway_speed),
            MeshField::PulseAmount => Scalar(self.pulse_amount),
            MeshField::AttractionStrength => Scalar(self.attraction_strength),
        }
    }

    /// Write a field; a value of the wrong kind is ignored
    pub fn set(&mut self, field: MeshField, value: FieldValue) {
        match (field, value) {
            (MeshField::BaseColor, FieldValue::Color(c)) => self.base_color = c,
            (MeshField::AccentColor, FieldValue::Color(c)) => self.accent_color = c,
            (field, FieldValue::Scalar(v)) => {
                if let Some(slot) = self.scalar_mut(field) {
                    *slot = v;
                }
            }
            _ => {}
        }
    }

    fn scalar_mut(&mut self, field: MeshField) -> Option<&mut f32> {
        Some(match field {
            MeshField::Saturation => &mut self.saturation,
            MeshField::Roughness => &mut self.roughness,
            MeshField::Metalness => &mut self.metalness,
            MeshField::EnvIntensity => &mut self.env_intensity,
            MeshField::DeformStrength => &mut self.deform_strength,
            MeshField::DeformScale => &mut self.deform_scale,
            MeshField::DeformSpeed => &mut self.deform_speed,
            MeshField::SwayAmount => &mut self.sway_amount,
            MeshField::SwaySpeed => &mut self.sway_speed,
            MeshField::PulseAmount => &mut self.pulse_amount,
            MeshField::AttractionStrength => &mut self.attraction_strength,
            MeshField::BaseColor | MeshField::AccentColor => return None,
        })
    }

    pub fn clamped(mut self) -> Self {
        for field in MeshField::ALL {
            let value = match (self.get(field), field.range()) {
                (FieldValue::Scalar(v), Some(range)) => FieldValue::Scalar(clamp_to(v, range)),
                (FieldValue::Color(c), _) => FieldValue::Color(c.clamped()),
                (other, None) => other,
            };
            self.set(field, value);
        }
        self
    }
}

/// Backdrop parameters
///
/// Effect ceilings depend on the render mode, see [`BackgroundField::range`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundParams {
    pub bg_style: BackgroundStyle,
    pub bg_gradient_a: Rgb,
    pub bg_gradient_b: Rgb,
    pub noise_amount: f32,
    pub fog_density: f32,
    pub vignette: f32,
    pub motion_amount: f32,
    pub bloom_intensity: f32,
    pub grain_amount: f32,
}

impl Default for BackgroundParams {
    fn default() -> Self {
        Self {
            bg_style: BackgroundStyle::Gradient,
            bg_gradient_a: Rgb::new(0.05, 0.05, 0.12),
            bg_gradient_b: Rgb::new(0.2, 0.1, 0.3),
            noise_amount: 0.3,
            fog_density: 0.4,
            vignette: 0.5,
            motion_amount: 0.3,
            bloom_intensity: 0.6,
            grain_amount: 0.05,
        }
    }
}

impl BackgroundParams {
    pub fn get(&self, field: BackgroundField) -> FieldValue {
        use FieldValue::{Color, Scalar};
        match field {
            BackgroundField::GradientA => Color(self.bg_gradient_a),
            BackgroundField::GradientB => Color(self.bg_gradient_b),
            BackgroundField::NoiseAmount => Scalar(self.noise_amount),
            BackgroundField::FogDensity => Scalar(self.fog_density),
            BackgroundField::Vignette => Scalar(self.vignette),
            BackgroundField::MotionAmount => Scalar(self.motion_amount),
            BackgroundField::BloomIntensity => Scalar(self.bloom_intensity),
            BackgroundField::GrainAmount => Scalar(self.grain_amount),
        }
    }

    /// Write a field; a value of the wrong kind is ignored
    pub fn set(&mut self, field: BackgroundField, value: FieldValue) {
        match (field, value) {
            (BackgroundField::GradientA, FieldValue::Color(c)) => self.bg_gradient_a = c,
            (BackgroundField::GradientB, FieldValue::Color(c)) => self.bg_gradient_b = c,
            (field, FieldValue::Scalar(v)) => {
                if let Some(slot) = self.scalar_mut(field) {
                    *slot = v;
                }
            }
            _ => {}
        }
    }

    fn scalar_mut(&mut self, field: BackgroundField) -> Option<&mut f32> {
        Some(match field {
            BackgroundField::NoiseAmount => &mut self.noise_amount,
            BackgroundField::FogDensity => &mut self.fog_density,
            BackgroundField::Vignette => &mut self.vignette,
            BackgroundField::MotionAmount => &mut self.motion_amount,
            BackgroundField::BloomIntensity => &mut self.bloom_intensity,
            BackgroundField::GrainAmount => &mut self.grain_amount,
            BackgroundField::GradientA | BackgroundField::GradientB => return None,
        })
    }

    pub fn clamped(mut self, mode: RenderMode) -> Self {
        for field in BackgroundField::ALL {
            let value = match (self.get(field), field.range(mode)) {
                (FieldValue::Scalar(v), Some(range)) => FieldValue::Scalar(clamp_to(v, range)),
                (FieldValue::Color(c), _) => FieldValue::Color(c.clamped()),
                (other, None) => other,
            };
            self.set(field, value);
        }
        self
    }
}

/// A complete desired world look
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldTarget {
    pub render_mode: RenderMode,
    pub mood: Mood,
    /// Requested transition length (seconds)
    pub transition_seconds: f32,
    #[serde(rename = "ferro")]
    pub mesh: MeshParams,
    pub background: BackgroundParams,
}

impl Default for WorldTarget {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Full,
            mood: Mood::Neutral,
            transition_seconds: 8.0,
            mesh: MeshParams::default(),
            background: BackgroundParams::default(),
        }
    }
}

impl WorldTarget {
    /// Clamp every field into its declared range
    pub fn clamped(self) -> Self {
        Self {
            transition_seconds: clamp_to(self.transition_seconds, TRANSITION_SECONDS_RANGE),
            mesh: self.mesh.clamped(),
            background: self.background.clamped(self.render_mode),
            ..self
        }
    }
}

/// Turn a raw authoring response into a clamped target
pub fn accept_target(raw: &str) -> Result<WorldTarget, AuthoringError> {
    let target = match serde_json::from_str::<WorldTarget>(raw) {
        Ok(target) => target,
        Err(strict) => {
            warn!("World target failed strict validation ({}), attempting repair", strict);
            lenient_target(raw)?
        }
    };
    Ok(target.clamped())
}

/// Overlay whatever recognizable fields a response carries onto defaults
fn lenient_target(raw: &str) -> Result<WorldTarget, AuthoringError> {
    let object = extract_object(raw)
        .ok_or_else(|| AuthoringError::Malformed("no JSON object in target response".into()))?;

    let mesh_group = object
        .get("ferro")
        .or_else(|| object.get("mesh"))
        .and_then(Value::as_object);
    let background_group = object.get("background").and_then(Value::as_object);
    let mood = lenient_str(&object, &["mood"]).and_then(|tag| Mood::from_tag(&tag));

    if mesh_group.is_none() && background_group.is_none() && mood.is_none() {
        return Err(AuthoringError::Rejected(
            "target has no mood and no parameter groups".into(),
        ));
    }

    let mut target = WorldTarget::default();
    if let Some(mood) = mood {
        target.mood = mood;
    }
    if let Some(mode) = lenient_str(&object, &["renderMode"]).and_then(|t| RenderMode::from_tag(&t)) {
        target.render_mode = mode;
    }
    if let Some(seconds) = lenient_f64(&object, &["transitionSeconds", "duration"]) {
        target.transition_seconds = seconds as f32;
    }

    if let Some(group) = mesh_group {
        for field in MeshField::ALL {
            let keys: &[&str] = match field {
                MeshField::AttractionStrength => &["attractionStrength", "gravityStrength"],
                _ => &[field.key()],
            };
            if let Some(value) = lenient_value(group, keys, target.mesh.get(field)) {
                target.mesh.set(field, value);
            }
        }
    }
    if let Some(group) = background_group {
        if let Some(style) = lenient_str(group, &["bgStyle", "style"])
            .and_then(|tag| BackgroundStyle::from_tag(&tag))
        {
            target.background.bg_style = style;
        }
        for field in BackgroundField::ALL {
            if let Some(value) = lenient_value(group, &[field.key()], target.background.get(field)) {
                target.background.set(field, value);
            }
        }
    }

    Ok(target)
}

/// Parse a field of the same kind as `current`
fn lenient_value(group: &Map<String, Value>, keys: &[&str], current: FieldValue) -> Option<FieldValue> {
    match current {
        FieldValue::Scalar(_) => lenient_f64(group, keys).map(|v| FieldValue::Scalar(v as f32)),
        FieldValue::Color(_) => keys
            .iter()
            .filter_map(|key| group.get(*key))
            .find_map(Rgb::from_json_lenient)
            .map(FieldValue::Color),
    }
}

//! Addressable world fields and their declared ranges.

use std::fmt;

use super::RenderMode;
use crate::color::Rgb;

/// Animatable field of the creature material/deformation group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshField {
    BaseColor,
    AccentColor,
    Saturation,
    Roughness,
    Metalness,
    EnvIntensity,
    DeformStrength,
    DeformScale,
    DeformSpeed,
    SwayAmount,
    SwaySpeed,
    PulseAmount,
    AttractionStrength,
}

impl MeshField {
    pub const ALL: [MeshField; 13] = [
        MeshField::BaseColor,
        MeshField::AccentColor,
        MeshField::Saturation,
        MeshField::Roughness,
        MeshField::Metalness,
        MeshField::EnvIntensity,
        MeshField::DeformStrength,
        MeshField::DeformScale,
        MeshField::DeformSpeed,
        MeshField::SwayAmount,
        MeshField::SwaySpeed,
        MeshField::PulseAmount,
        MeshField::AttractionStrength,
    ];

    /// Wire key inside the `ferro` object
    pub fn key(self) -> &'static str {
        match self {
            MeshField::BaseColor => "baseColor",
            MeshField::AccentColor => "accentColor",
            MeshField::Saturation => "saturation",
            MeshField::Roughness => "roughness",
            MeshField::Metalness => "metalness",
            MeshField::EnvIntensity => "envIntensity",
            MeshField::DeformStrength => "deformStrength",
            MeshField::DeformScale => "deformScale",
            MeshField::DeformSpeed => "deformSpeed",
            MeshField::SwayAmount => "swayAmount",
            MeshField::SwaySpeed => "swaySpeed",
            MeshField::PulseAmount => "pulseAmount",
            MeshField::AttractionStrength => "attractionStrength",
        }
    }

    /// Declared range; `None` for colors
    pub fn range(self) -> Option<(f32, f32)> {
        match self {
            MeshField::BaseColor | MeshField::AccentColor => None,
            MeshField::Saturation | MeshField::Roughness | MeshField::Metalness => Some((0.0, 1.0)),
            MeshField::EnvIntensity => Some((0.0, 3.0)),
            MeshField::DeformStrength => Some((0.0, 2.0)),
            MeshField::DeformScale => Some((0.1, 5.0)),
            MeshField::DeformSpeed => Some((0.0, 3.0)),
            MeshField::SwayAmount => Some((0.0, 1.0)),
            MeshField::SwaySpeed => Some((0.0, 3.0)),
            MeshField::PulseAmount => Some((0.0, 1.0)),
            MeshField::AttractionStrength => Some((0.0, 2.0)),
        }
    }
}

/// Animatable field of the backdrop group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackgroundField {
    GradientA,
    GradientB,
    NoiseAmount,
    FogDensity,
    Vignette,
    MotionAmount,
    BloomIntensity,
    GrainAmount,
}

impl BackgroundField {
    pub const ALL: [BackgroundField; 8] = [
        BackgroundField::GradientA,
        BackgroundField::GradientB,
        BackgroundField::NoiseAmount,
        BackgroundField::FogDensity,
        BackgroundField::Vignette,
        BackgroundField::MotionAmount,
        BackgroundField::BloomIntensity,
        BackgroundField::GrainAmount,
    ];

    /// Wire key inside the `background` object
    pub fn key(self) -> &'static str {
        match self {
            BackgroundField::GradientA => "bgGradientA",
            BackgroundField::GradientB => "bgGradientB",
            BackgroundField::NoiseAmount => "noiseAmount",
            BackgroundField::FogDensity => "fogDensity",
            BackgroundField::Vignette => "vignette",
            BackgroundField::MotionAmount => "motionAmount",
            BackgroundField::BloomIntensity => "bloomIntensity",
            BackgroundField::GrainAmount => "grainAmount",
        }
    }

    /// Declared range under a render mode; `None` for colors
    pub fn range(self, mode: RenderMode) -> Option<(f32, f32)> {
        let reduced = mode == RenderMode::Reduced;
        match self {
            BackgroundField::GradientA | BackgroundField::GradientB => None,
            BackgroundField::NoiseAmount
            | BackgroundField::FogDensity
            | BackgroundField::Vignette
            | BackgroundField::MotionAmount => Some((0.0, 1.0)),
            BackgroundField::BloomIntensity => Some((0.0, if reduced { 0.5 } else { 1.2 })),
            BackgroundField::GrainAmount => Some((0.0, if reduced { 0.1 } else { 0.3 })),
        }
    }

    /// Fields that never move faster than the slow-field floor
    pub fn is_slow(self) -> bool {
        matches!(
            self,
            BackgroundField::FogDensity | BackgroundField::BloomIntensity
        )
    }
}

/// Full address of one animatable world field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    Mesh(MeshField),
    Background(BackgroundField),
    /// Displayed creature color
    SurfaceColor,
}

impl FieldPath {
    /// Dotted path, e.g. `ferro.saturation`
    pub fn as_str(self) -> &'static str {
        match self {
            FieldPath::Mesh(field) => match field {
                MeshField::BaseColor => "ferro.baseColor",
                MeshField::AccentColor => "ferro.accentColor",
                MeshField::Saturation => "ferro.saturation",
                MeshField::Roughness => "ferro.roughness",
                MeshField::Metalness => "ferro.metalness",
                MeshField::EnvIntensity => "ferro.envIntensity",
                MeshField::DeformStrength => "ferro.deformStrength",
                MeshField::DeformScale => "ferro.deformScale",
                MeshField::DeformSpeed => "ferro.deformSpeed",
                MeshField::SwayAmount => "ferro.swayAmount",
                MeshField::SwaySpeed => "ferro.swaySpeed",
                MeshField::PulseAmount => "ferro.pulseAmount",
                MeshField::AttractionStrength => "ferro.attractionStrength",
            },
            FieldPath::Background(field) => match field {
                BackgroundField::GradientA => "background.bgGradientA",
                BackgroundField::GradientB => "background.bgGradientB",
                BackgroundField::NoiseAmount => "background.noiseAmount",
                BackgroundField::FogDensity => "background.fogDensity",
                BackgroundField::Vignette => "background.vignette",
                BackgroundField::MotionAmount => "background.motionAmount",
                BackgroundField::BloomIntensity => "background.bloomIntensity",
                BackgroundField::GrainAmount => "background.grainAmount",
            },
            FieldPath::SurfaceColor => "surfaceColor",
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value held by a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Scalar(f32),
    Color(Rgb),
}

impl FieldValue {
    /// Interpolate toward `to`; mismatched kinds snap to `to`
    pub fn lerp(self, to: FieldValue, t: f32) -> FieldValue {
        match (self, to) {
            (FieldValue::Scalar(a), FieldValue::Scalar(b)) => FieldValue::Scalar(a + (b - a) * t),
            (FieldValue::Color(a), FieldValue::Color(b)) => FieldValue::Color(a.lerp(b, t)),
            _ => to,
        }
    }
}

/// Clamp into a range; NaN becomes the minimum
pub fn clamp_to(value: f32, (lo, hi): (f32, f32)) -> f32 {
    if value.is_nan() {
        lo
    } else {
        value.clamp(lo, hi)
    }
}

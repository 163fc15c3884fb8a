//! Per-tick radial displacement of the creature sphere.

use glam::Vec3;
use noise::{NoiseFn, OpenSimplex, Perlin};
use tracing::trace;

use super::mesh::{SphereMesh, Vertex};
use crate::blend::BlendedParams;
use crate::params::DeformParams;
use crate::world::WorldState;

/// Optional 3D attractor, e.g. a projected cursor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub position: Vec3,
    pub active: bool,
}

/// Noise drivers after authored intent and world scaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseDrivers {
    pub amplitude: f32,
    pub spatial_scale: f32,
    pub time_scale: f32,
}

pub struct Deformer {
    params: DeformParams,
    mesh: SphereMesh,
    perlin: Perlin,
    spike_noise: OpenSimplex,
    spike_direction: Vec3,
}

impl Deformer {
    pub fn new(params: DeformParams) -> Self {
        let mesh = SphereMesh::new(params.rings, params.segments);
        let spike_direction = Vec3::from_array(params.spike_direction)
            .try_normalize()
            .unwrap_or(Vec3::Y);
        Self {
            perlin: Perlin::new(params.noise_seed),
            spike_noise: OpenSimplex::new(params.noise_seed.wrapping_add(1)),
            mesh,
            spike_direction,
            params,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.mesh.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.mesh.indices
    }

    pub fn mesh(&self) -> &SphereMesh {
        &self.mesh
    }

    /// Amplitude, spatial scale and time scale for this tick
    pub fn drivers(&self, blended: &BlendedParams, world: &WorldState) -> NoiseDrivers {
        let p = &self.params;
        let (amplitude, boost) = if blended.authored {
            (p.amplitude_authored, p.time_scale_authored_boost)
        } else {
            (p.amplitude, 1.0)
        };
        NoiseDrivers {
            amplitude: amplitude * world.mesh.deform_strength,
            spatial_scale: p.noise_scale * world.mesh.deform_scale,
            time_scale: blended.motion_style.time_scale(&p.time_scales) * boost * world.mesh.deform_speed,
        }
    }

    /// Radial distance of the vertex with unit direction `n`
    pub fn distance(&self, n: Vec3, blended: &BlendedParams, drivers: &NoiseDrivers, time_s: f64) -> f32 {
        let p = &self.params;
        let t = time_s * drivers.time_scale as f64;
        let q = n * drivers.spatial_scale;

        let primary = self.perlin.get([q.x as f64 + t, q.y as f64 + t, q.z as f64 + t]) as f32;
        let noise = primary * drivers.amplitude * blended.noise_amount * blended.treble * p.treble_gain;

        let s = n * p.spike_noise_scale;
        let texture = self
            .spike_noise
            .get([s.x as f64 + t, s.y as f64 + t, s.z as f64 + t])
            .max(0.0) as f32;
        let texture_spike = texture * p.spike_texture_gain * blended.spike_amount;

        let focus = n.dot(self.spike_direction).max(0.0).powf(p.sharpness);
        let bump = focus * (p.bump_height + p.bump_spike_gain * blended.spike_amount);

        p.base_radius * (1.0 + blended.pulse) + blended.bass * p.bass_gain + noise + texture_spike + bump
    }

    /// Displace every vertex for this tick and return the buffer
    pub fn update(
        &mut self,
        blended: &BlendedParams,
        world: &WorldState,
        time_s: f64,
        pointer: Option<&Pointer>,
    ) -> &[Vertex] {
        let drivers = self.drivers(blended, world);
        let phase = (time_s * world.mesh.sway_speed as f64).sin() as f32;
        let sway = phase * world.mesh.sway_amount * self.params.sway_gain;
        let offset = Vec3::new(sway, 0.0, 0.0);
        let pointer = pointer.filter(|p| p.active);
        let attraction = self.params.pointer_gain * world.mesh.attraction_strength;

        trace!(
            "Deform: amp={:.3} scale={:.2} speed={:.2} sway={:.3}",
            drivers.amplitude,
            drivers.spatial_scale,
            drivers.time_scale,
            sway
        );

        for i in 0..self.mesh.directions.len() {
            let n = self.mesh.directions[i];
            let mut radius = self.distance(n, blended, &drivers, time_s);

            if let Some(pointer) = pointer {
                radius += self.pull(n * radius, n, pointer.position, attraction);
            }

            self.mesh.vertices[i].position = (n * radius + offset).to_array();
        }

        self.mesh.recompute_normals();
        &self.mesh.vertices
    }

    /// Radial pull toward the pointer, zero outside the pull radius
    fn pull(&self, position: Vec3, n: Vec3, target: Vec3, strength: f32) -> f32 {
        let to_target = target - position;
        let d = to_target.length();
        if d > self.params.pointer_radius {
            return 0.0;
        }
        let align = n.dot(to_target.normalize_or_zero()).max(0.0);
        strength * align / (d * d + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::MotionStyle;

    fn small_params() -> DeformParams {
        DeformParams {
            rings: 12,
            segments: 16,
            ..DeformParams::default()
        }
    }

    fn quiet() -> BlendedParams {
        BlendedParams {
            noise_amount: 1.0,
            ..BlendedParams::default()
        }
    }

    fn radius_of(v: &Vertex) -> f32 {
        Vec3::from_array(v.position).length()
    }

    #[test]
    fn test_silence_rests_at_base_radius_away_from_bump() {
        let mut deformer = Deformer::new(small_params());
        let mut world = WorldState::default();
        world.mesh.sway_amount = 0.0;
        let vertices = deformer.update(&quiet(), &world, 1.0, None).to_vec();
        let directions = &deformer.mesh().directions;

        for (v, n) in vertices.iter().zip(directions) {
            if n.y < 0.5 {
                assert!((radius_of(v) - 1.0).abs() < 1e-4);
            }
        }
        // North pole carries the resting bump
        assert!((radius_of(&vertices[0]) - 1.25).abs() < 1e-4);
    }

    #[test]
    fn test_bass_and_pulse_grow_radius() {
        let deformer = Deformer::new(small_params());
        let world = WorldState::default();
        let blended = BlendedParams {
            bass: 1.0,
            pulse: 0.2,
            ..quiet()
        };
        let drivers = deformer.drivers(&blended, &world);
        let r = deformer.distance(Vec3::NEG_Y, &blended, &drivers, 0.0);
        assert!((r - (1.0 * 1.2 + 0.35)).abs() < 1e-4);
    }

    #[test]
    fn test_spike_amount_amplifies_bump() {
        let deformer = Deformer::new(small_params());
        let world = WorldState::default();
        let blended = BlendedParams {
            spike_amount: 1.0,
            ..quiet()
        };
        let drivers = deformer.drivers(&blended, &world);
        let top = deformer.distance(Vec3::Y, &blended, &drivers, 0.0);
        // Bump 0.25 + 0.5 gain, texture spike is non-negative
        assert!(top >= 1.75 - 1e-4);
    }

    #[test]
    fn test_authored_intent_raises_drivers() {
        let deformer = Deformer::new(small_params());
        let world = WorldState::default();
        let plain = deformer.drivers(&quiet(), &world);
        let authored = deformer.drivers(
            &BlendedParams {
                authored: true,
                ..quiet()
            },
            &world,
        );
        assert!(authored.amplitude > plain.amplitude);
        assert!(authored.time_scale > plain.time_scale);
    }

    #[test]
    fn test_world_scales_drivers() {
        let deformer = Deformer::new(small_params());
        let mut world = WorldState::default();
        world.mesh.deform_strength = 2.0;
        world.mesh.deform_scale = 0.5;
        world.mesh.deform_speed = 3.0;
        let blended = BlendedParams {
            motion_style: MotionStyle::Intense,
            ..quiet()
        };
        let drivers = deformer.drivers(&blended, &world);
        assert!((drivers.amplitude - 0.36).abs() < 1e-5);
        assert!((drivers.spatial_scale - 0.8).abs() < 1e-5);
        assert!((drivers.time_scale - 4.2).abs() < 1e-5);
    }

    #[test]
    fn test_no_treble_means_no_noise() {
        let deformer = Deformer::new(small_params());
        let world = WorldState::default();
        let drivers = deformer.drivers(&quiet(), &world);
        let side = Vec3::X;
        let a = deformer.distance(side, &quiet(), &drivers, 0.0);
        let b = deformer.distance(side, &quiet(), &drivers, 7.3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_noise_keeps_moving_late_in_session() {
        let deformer = Deformer::new(small_params());
        let world = WorldState::default();
        let blended = BlendedParams {
            treble: 1.0,
            ..quiet()
        };
        let drivers = deformer.drivers(&blended, &world);
        let side = Vec3::new(0.6, 0.0, 0.8);
        // Two days in, 10ms apart; below f32 resolution at this magnitude
        let a = deformer.distance(side, &blended, &drivers, 172_800.0);
        let b = deformer.distance(side, &blended, &drivers, 172_800.01);
        assert_ne!(a, b);
    }

    #[test]
    fn test_pointer_pulls_nearby_vertices() {
        let mut deformer = Deformer::new(small_params());
        let mut world = WorldState::default();
        world.mesh.sway_amount = 0.0;
        let rest = deformer.update(&quiet(), &world, 0.0, None).to_vec();

        let pointer = Pointer {
            position: Vec3::new(1.5, 0.0, 0.0),
            active: true,
        };
        let pulled = deformer.update(&quiet(), &world, 0.0, Some(&pointer)).to_vec();
        let directions = deformer.mesh().directions.clone();

        let facing = directions
            .iter()
            .position(|n| n.x > 0.95)
            .unwrap();
        assert!(radius_of(&pulled[facing]) > radius_of(&rest[facing]));

        let away = directions.iter().position(|n| n.x < -0.95).unwrap();
        assert_eq!(radius_of(&pulled[away]), radius_of(&rest[away]));

        let inactive = Pointer { active: false, ..pointer };
        let ignored = deformer.update(&quiet(), &world, 0.0, Some(&inactive)).to_vec();
        assert_eq!(ignored, rest);
    }

    #[test]
    fn test_sway_offsets_whole_shape() {
        let mut deformer = Deformer::new(small_params());
        let mut world = WorldState::default();
        world.mesh.sway_amount = 1.0;
        world.mesh.sway_speed = 1.0;
        let t = std::f64::consts::FRAC_PI_2;
        let vertices = deformer.update(&quiet(), &world, t, None);
        // South pole sits on the axis, so its x is the sway offset
        let south = vertices.last().unwrap();
        assert!((south.position[0] - 0.15).abs() < 1e-4);
    }
}

//! Creature geometry: sphere topology and per-tick displacement.

mod deformer;
mod mesh;

pub use deformer::{Deformer, NoiseDrivers, Pointer};
pub use mesh::{SphereMesh, Vertex};

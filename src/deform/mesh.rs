//! Closed UV-sphere mesh with shared poles and no seam duplicates.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex data for the creature mesh (position + normal)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Unit sphere topology plus the live vertex buffer
pub struct SphereMesh {
    /// Unit directions of the undeformed sphere, one per vertex
    pub directions: Vec<Vec3>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Build a sphere with `rings` latitude bands and `segments` longitude slices
    ///
    /// Both counts are raised to at least 3. Every edge is shared by exactly
    /// two triangles, winding is counter-clockwise seen from outside.
    pub fn new(rings: usize, segments: usize) -> Self {
        let rings = rings.max(3);
        let segments = segments.max(3);

        let mut directions = Vec::with_capacity(2 + (rings - 1) * segments);
        directions.push(Vec3::Y);
        for ring in 1..rings {
            let theta = std::f32::consts::PI * ring as f32 / rings as f32;
            for segment in 0..segments {
                let phi = std::f32::consts::TAU * segment as f32 / segments as f32;
                directions.push(Vec3::new(
                    theta.sin() * phi.cos(),
                    theta.cos(),
                    theta.sin() * phi.sin(),
                ));
            }
        }
        directions.push(Vec3::NEG_Y);

        let row = |ring: usize, segment: usize| (1 + (ring - 1) * segments + segment % segments) as u32;
        let south = (directions.len() - 1) as u32;
        let mut indices = Vec::with_capacity(6 * segments * (rings - 1));

        // North cap
        for j in 0..segments {
            indices.extend_from_slice(&[0, row(1, j + 1), row(1, j)]);
        }
        // Bands between consecutive rings
        for ring in 1..rings - 1 {
            for j in 0..segments {
                let up_west = row(ring, j);
                let up_east = row(ring, j + 1);
                let low_west = row(ring + 1, j);
                let low_east = row(ring + 1, j + 1);
                indices.extend_from_slice(&[
                    up_west, low_east, low_west,
                    up_west, up_east, low_east,
                ]);
            }
        }
        // South cap
        for j in 0..segments {
            indices.extend_from_slice(&[south, row(rings - 1, j), row(rings - 1, j + 1)]);
        }

        let vertices = directions
            .iter()
            .map(|d| Vertex {
                position: d.to_array(),
                normal: d.to_array(),
            })
            .collect();

        Self {
            directions,
            vertices,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Recompute smooth vertex normals from the current positions
    ///
    /// Face normals are area-weighted; a vertex whose faces cancel out falls
    /// back to its undeformed direction.
    pub fn recompute_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let v0 = Vec3::from_array(self.vertices[i0].position);
            let v1 = Vec3::from_array(self.vertices[i1].position);
            let v2 = Vec3::from_array(self.vertices[i2].position);
            let face = (v1 - v0).cross(v2 - v0);
            accum[i0] += face;
            accum[i1] += face;
            accum[i2] += face;
        }
        for ((vertex, sum), direction) in self.vertices.iter_mut().zip(accum).zip(&self.directions) {
            let normal = sum.try_normalize().unwrap_or(*direction);
            vertex.normal = normal.to_array();
        }
    }
}

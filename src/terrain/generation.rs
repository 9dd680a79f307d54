use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use noise::{NoiseFn, Perlin};

use crate::error::{ensure_finite, GenerationError};
use crate::procedural::TerrainFeature;

// Builds the displaced dome meshes for mounds, hills, rocks and bank segments.
#[derive(Resource)]
pub struct TerrainGenerator {
    pub noise: Perlin,
    pub rings: u32,
    pub sectors: u32,
    pub roughness: f32,
}

impl TerrainGenerator {
    pub fn new(seed: u32, rings: u32, sectors: u32, roughness: f32) -> Self {
        Self {
            noise: Perlin::new(seed),
            rings,
            sectors,
            roughness,
        }
    }

    // Unit dome (radius 1, height 1) displaced by Perlin noise sampled around
    // the feature's world position. The feature transform supplies the
    // non-uniform scale.
    pub fn build_mound_mesh(&self, feature: &TerrainFeature) -> Result<Mesh, GenerationError> {
        for (name, value) in [
            ("position.x", feature.position.x),
            ("position.z", feature.position.z),
            ("scale.x", feature.scale.x),
            ("scale.y", feature.scale.y),
            ("scale.z", feature.scale.z),
            ("yaw", feature.yaw),
        ] {
            ensure_finite(name, value)?;
        }
        let radius = feature.scale.x.min(feature.scale.z);
        if radius <= 0.0 || feature.scale.y <= 0.0 {
            return Err(GenerationError::DegenerateFootprint {
                radius,
                height: feature.scale.y,
            });
        }
        if self.rings < 2 || self.sectors < 3 {
            return Err(GenerationError::TooFewSegments {
                rings: self.rings,
                sectors: self.sectors,
            });
        }

        let rings = self.rings;
        let sectors = self.sectors;
        let origin = [feature.position.x as f64, feature.position.z as f64];

        let mut vertices = Vec::with_capacity((1 + rings * sectors) as usize);
        let mut uvs = Vec::with_capacity(vertices.capacity());
        let mut indices = Vec::new();

        let apex_bump = self.sample(origin, 0.0, 0.0);
        vertices.push([0.0, 1.0 + apex_bump, 0.0]);
        uvs.push([0.5, 0.5]);

        for ring in 1..=rings {
            let r = ring as f32 / rings as f32;
            for sector in 0..sectors {
                let theta = sector as f32 / sectors as f32 * std::f32::consts::TAU;
                let (sin, cos) = theta.sin_cos();
                let bump = self.sample(origin, cos * r, sin * r);
                // The rim stays on the ground so the mound meets the plane.
                let y = if ring == rings {
                    0.0
                } else {
                    (1.0 - r * r).sqrt() * (1.0 + bump)
                };
                let spread = r * (1.0 + bump * 0.5);
                vertices.push([cos * spread, y, sin * spread]);
                uvs.push([0.5 + cos * r * 0.5, 0.5 + sin * r * 0.5]);
            }
        }

        let ring_start = |ring: u32| 1 + (ring - 1) * sectors;
        for sector in 0..sectors {
            let next = (sector + 1) % sectors;
            indices.extend_from_slice(&[0, ring_start(1) + next, ring_start(1) + sector]);
        }
        for ring in 1..rings {
            let inner = ring_start(ring);
            let outer = ring_start(ring + 1);
            for sector in 0..sectors {
                let next = (sector + 1) % sectors;
                // First triangle
                indices.extend_from_slice(&[inner + sector, outer + next, outer + sector]);
                // Second triangle
                indices.extend_from_slice(&[inner + sector, inner + next, outer + next]);
            }
        }

        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vertices);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
        mesh.insert_indices(Indices::U32(indices));
        mesh.compute_smooth_normals();
        Ok(mesh)
    }

    fn sample(&self, origin: [f64; 2], u: f32, v: f32) -> f32 {
        let p = [origin[0] * 0.05 + u as f64 * 1.7, origin[1] * 0.05 + v as f64 * 1.7];
        self.noise.get(p) as f32 * self.roughness
    }
}

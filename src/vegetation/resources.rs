use bevy::prelude::*;

use super::instancing::{GrassRanges, WindParams};

#[derive(Resource, Clone, Debug)]
pub struct GrassConfig {
    // Blades per unit of `size^2` on hills, rocks and mounds.
    pub interior_density: f32,
    // Blades per unit of `size^2` on riverbank segments.
    pub bank_density: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub max_lean: f32,
    pub wind_speed: f32,
    pub wind_strength: f32,
    pub patches_per_frame: usize,
    pub instances_per_patch: usize,
}

impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            interior_density: 50.0,
            bank_density: 80.0,
            min_height: 0.35,
            max_height: 0.7,
            min_width: 0.08,
            max_width: 0.16,
            max_lean: 0.12,
            wind_speed: 1.8,
            wind_strength: 0.18,
            patches_per_frame: 5,
            instances_per_patch: 15,
        }
    }
}

impl GrassConfig {
    pub fn ranges(&self) -> GrassRanges {
        GrassRanges {
            height: self.min_height..self.max_height.max(self.min_height + f32::EPSILON),
            width: self.min_width..self.max_width.max(self.min_width + f32::EPSILON),
            max_lean: self.max_lean.abs(),
        }
    }

    pub fn wind(&self) -> WindParams {
        WindParams {
            speed: self.wind_speed,
            strength: self.wind_strength,
        }
    }
}

// The single blade mesh and material every patch refers to.
#[derive(Resource)]
pub struct GrassTemplate {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

// Present when blades may carry their own tint. Each palette entry is a tinted
// variant of the template material sharing its texture.
#[derive(Resource)]
pub struct InstanceColorSupport {
    pub palette: Vec<Handle<StandardMaterial>>,
}

// Shared bush and flower assets for decorative flora.
#[derive(Resource)]
pub struct FloraAssets {
    pub bush_mesh: Handle<Mesh>,
    pub bush_material: Handle<StandardMaterial>,
    pub flower_mesh: Handle<Mesh>,
    pub flower_materials: Vec<Handle<StandardMaterial>>,
}

#[derive(Resource, Default, Debug)]
pub struct WindState {
    pub next_patch: usize,
    pub touched_last_frame: usize,
    // Blades whose entity was missing when the wind reached them.
    pub skipped: u64,
}

#[derive(Resource, Default, Debug)]
pub struct VegetationStats {
    pub patches: usize,
    pub blades: usize,
    pub flora: usize,
}

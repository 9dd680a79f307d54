use bevy::prelude::*;

use crate::procedural::{BankLayout, TerrainFeature};

#[derive(Resource, Clone, Debug)]
pub struct RiverConfig {
    pub width: f32,
    pub length: f32,
    pub width_segments: u32,
    pub length_segments: u32,
    pub water_level: f32,
    pub bank_width: f32,
    pub bank_segment_length: f32,
    // Chance a bank segment scatters sand, mud, pebbles, reeds or lily pads.
    pub detail_chance: f64,
    pub base_hue: f32,
    pub hue_swing: f32,
    pub hue_speed: f32,
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            width: 12.0,
            length: 400.0,
            width_segments: 8,
            length_segments: 200,
            water_level: 0.0,
            bank_width: 6.0,
            bank_segment_length: 6.0,
            detail_chance: 0.35,
            base_hue: 198.0,
            hue_swing: 8.0,
            hue_speed: 0.25,
        }
    }
}

impl RiverConfig {
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    // Lowest and highest z the river (and its foam) covers.
    pub fn z_bounds(&self) -> (f32, f32) {
        (-self.length * 0.5, self.length * 0.5)
    }

    pub fn bank_layout(&self) -> BankLayout {
        BankLayout {
            half_width: self.half_width(),
            bank_width: self.bank_width,
            segment_length: self.bank_segment_length,
            water_level: self.water_level,
        }
    }
}

#[derive(Resource, Clone, Debug)]
pub struct FoamConfig {
    pub count: usize,
    // World units per second toward -z.
    pub flow_speed: f32,
    // Peak lateral drift per unit of downstream travel.
    pub wobble: f32,
    pub particle_radius: f32,
}

impl Default for FoamConfig {
    fn default() -> Self {
        Self {
            count: 800,
            flow_speed: 4.0,
            wobble: 0.3,
            particle_radius: 0.08,
        }
    }
}

// Riverbank segments in build order, with their spawned roots.
#[derive(Resource, Default)]
pub struct RiverBanks {
    pub segments: Vec<TerrainFeature>,
    pub roots: Vec<Entity>,
    pub detail_items: usize,
}

// Slow hue oscillation on the shared water material.
#[derive(Resource)]
pub struct WaterTint {
    pub material: Handle<StandardMaterial>,
    pub base_hue: f32,
    pub swing: f32,
    pub speed: f32,
}

impl WaterTint {
    pub fn color_at(&self, elapsed: f32) -> Color {
        let hue = (self.base_hue + (elapsed * self.speed).sin() * self.swing).rem_euclid(360.0);
        Color::hsla(hue, 0.55, 0.45, 0.82)
    }
}

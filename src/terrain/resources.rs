use bevy::prelude::*;
use std::collections::HashMap;

use crate::curve::RiverCurve;
use crate::procedural::{cell_seed, generate_cell_features, FeatureRules, RandomSource, TerrainFeature};

#[derive(Resource, Clone, Debug)]
pub struct TerrainConfig {
    pub cell_size: f32,
    // Cells materialized on each side of the origin at startup.
    pub extent_cells: i32,
    // Radius a camera-following grid would keep active. Unused while the grid
    // is static.
    pub visible_radius: i32,
    pub world_seed: u64,
    // Extra clearance beyond the river half-width.
    pub river_margin: f32,
    pub marker_chance: f64,
    pub min_features: u32,
    pub max_features: u32,
    pub mound_rings: u32,
    pub mound_sectors: u32,
    pub roughness: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            cell_size: 24.0,
            extent_cells: 3,
            visible_radius: 3,
            world_seed: 0,
            river_margin: 4.0,
            marker_chance: 0.3,
            min_features: 3,
            max_features: 6,
            mound_rings: 6,
            mound_sectors: 18,
            roughness: 0.12,
        }
    }
}

impl TerrainConfig {
    pub fn feature_rules(&self, river_width: f32) -> FeatureRules {
        FeatureRules {
            cell_size: self.cell_size,
            features_per_cell: self.min_features..=self.max_features,
            river_buffer: self.river_buffer(river_width),
            marker_chance: self.marker_chance,
            ..default()
        }
    }

    pub fn river_buffer(&self, river_width: f32) -> f32 {
        river_width * 0.5 + self.river_margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Clear,
    // A corner or the center sits in the river buffer; no features.
    RiverBlocked,
}

#[derive(Debug, Clone)]
pub struct TerrainCell {
    pub grid_x: i32,
    pub grid_z: i32,
    pub seed: u64,
    pub state: CellState,
    pub features: Vec<TerrainFeature>,
    // Spawned root entity per feature, parallel to `features`.
    pub roots: Vec<Entity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellOutcome {
    Existing,
    Blocked,
    Created(usize),
}

// Every materialized cell, keyed by grid coordinate.
#[derive(Resource, Default)]
pub struct TerrainGrid {
    cells: HashMap<(i32, i32), TerrainCell>,
    order: Vec<(i32, i32)>,
}

// Samples the four corners and the center of a cell against the river buffer.
pub fn cell_touches_river(
    grid_x: i32,
    grid_z: i32,
    cell_size: f32,
    curve: &RiverCurve,
    buffer: f32,
) -> bool {
    let center = Vec2::new(grid_x as f32, grid_z as f32) * cell_size;
    let half = cell_size * 0.5;
    [
        center,
        center + Vec2::new(-half, -half),
        center + Vec2::new(half, -half),
        center + Vec2::new(-half, half),
        center + Vec2::new(half, half),
    ]
    .iter()
    .any(|p| curve.distance(p.x, p.y) < buffer)
}

impl TerrainGrid {
    pub fn ensure_cell(
        &mut self,
        grid_x: i32,
        grid_z: i32,
        curve: &RiverCurve,
        rules: &FeatureRules,
        world_seed: u64,
    ) -> CellOutcome {
        let key = (grid_x, grid_z);
        if self.cells.contains_key(&key) {
            return CellOutcome::Existing;
        }

        let seed = cell_seed(grid_x, grid_z, world_seed);
        let blocked = cell_touches_river(grid_x, grid_z, rules.cell_size, curve, rules.river_buffer);
        let (state, features) = if blocked {
            (CellState::RiverBlocked, Vec::new())
        } else {
            let mut rng = RandomSource::seeded(seed);
            (
                CellState::Clear,
                generate_cell_features(grid_x, grid_z, &mut rng, curve, rules),
            )
        };

        let outcome = match state {
            CellState::RiverBlocked => CellOutcome::Blocked,
            CellState::Clear => CellOutcome::Created(features.len()),
        };
        self.cells.insert(
            key,
            TerrainCell {
                grid_x,
                grid_z,
                seed,
                state,
                features,
                roots: Vec::new(),
            },
        );
        self.order.push(key);
        outcome
    }

    // Materializes `[-extent, extent]^2` and returns the coordinates of the
    // cells that were created with at least one feature.
    pub fn generate_around_origin(
        &mut self,
        extent: i32,
        curve: &RiverCurve,
        rules: &FeatureRules,
        world_seed: u64,
    ) -> Vec<(i32, i32)> {
        let mut populated = Vec::new();
        for grid_z in -extent..=extent {
            for grid_x in -extent..=extent {
                if let CellOutcome::Created(n) = self.ensure_cell(grid_x, grid_z, curve, rules, world_seed) {
                    if n > 0 {
                        populated.push((grid_x, grid_z));
                    }
                }
            }
        }
        populated
    }

    pub fn cell(&self, grid_x: i32, grid_z: i32) -> Option<&TerrainCell> {
        self.cells.get(&(grid_x, grid_z))
    }

    pub fn cell_mut(&mut self, grid_x: i32, grid_z: i32) -> Option<&mut TerrainCell> {
        self.cells.get_mut(&(grid_x, grid_z))
    }

    // Cells in creation order.
    pub fn cells(&self) -> impl Iterator<Item = &TerrainCell> {
        self.order.iter().filter_map(|key| self.cells.get(key))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn blocked_count(&self) -> usize {
        self.cells
            .values()
            .filter(|c| c.state == CellState::RiverBlocked)
            .count()
    }

    pub fn feature_count(&self) -> usize {
        self.cells.values().map(|c| c.features.len()).sum()
    }

    pub fn features(&self) -> impl Iterator<Item = &TerrainFeature> {
        self.cells().flat_map(|c| c.features.iter())
    }
}

#[derive(Component)]
pub struct TerrainMound;

// Unscaled parent of a feature's mound, grass, flora and marker.
#[derive(Component)]
pub struct FeatureRoot;

#[derive(Component)]
pub struct Ground;

#[derive(Event)]
pub struct GenerateTerrainEvent {
    pub extent: i32,
}

#[derive(Debug, Clone)]
pub enum FeatureBatch {
    Cells(Vec<(i32, i32)>),
    Banks,
}

// Feature roots exist for this batch; vegetation and markers hang off them.
#[derive(Event)]
pub struct FeaturesSpawned(pub FeatureBatch);

pub mod generation;
pub mod resources;
pub mod systems;

use bevy::prelude::*;
pub use resources::*;
use systems::*;

pub struct TerrainPlugin {
    pub world_seed: u64,
    pub extent_cells: i32,
}

impl Default for TerrainPlugin {
    fn default() -> Self {
        Self {
            world_seed: 0,
            extent_cells: 3,
        }
    }
}

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        let config = TerrainConfig {
            world_seed: self.world_seed,
            extent_cells: self.extent_cells,
            ..default()
        };

        app.insert_resource(generation::TerrainGenerator::new(
            self.world_seed as u32,
            config.mound_rings,
            config.mound_sectors,
            config.roughness,
        ));
        app.insert_resource(config);
        app.init_resource::<TerrainGrid>();

        app.add_event::<GenerateTerrainEvent>();
        app.add_event::<FeaturesSpawned>();

        app.add_systems(Startup, (setup_terrain_assets, generate_initial_terrain).chain());
        app.add_systems(Update, handle_terrain_generation.in_set(crate::frame::FrameSet::Assets));
    }
}

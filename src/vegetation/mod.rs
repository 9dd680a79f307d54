//! Grass instancing and decorative flora on terrain features and riverbanks.

pub mod components;
pub mod instancing;
pub mod resources;
pub mod systems;
pub mod template;

use bevy::prelude::*;
pub use components::*;
pub use instancing::{grass_count, InstanceBuffer};
pub use resources::*;
use systems::*;

use crate::frame::FrameSet;

#[derive(Default)]
pub struct VegetationPlugin {
    // Give each blade a palette tint instead of the uniform material.
    pub instance_colors: bool,
}

impl Plugin for VegetationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(InstanceColorRequest(self.instance_colors))
            .init_resource::<GrassConfig>()
            .init_resource::<WindState>()
            .init_resource::<VegetationStats>()
            // Template once, patches whenever features appear
            .add_systems(Startup, setup_vegetation_assets)
            .add_systems(
                Update,
                (
                    populate_vegetation
                        .in_set(FrameSet::Assets)
                        .after(crate::terrain::systems::handle_terrain_generation),
                    animate_wind.in_set(FrameSet::Wind),
                ),
            );
    }
}

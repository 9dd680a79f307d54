//! The river: a curve-warped water surface, riverbank segments with their
//! detail, recycling foam and a slowly shifting water tint.

pub mod components;
pub mod foam;
pub mod mesh;
pub mod resources;
pub mod systems;

use bevy::prelude::*;
pub use components::*;
pub use foam::{FoamField, FoamParticle};
pub use resources::*;
use systems::*;

use crate::frame::FrameSet;

pub struct RiverPlugin;

impl Plugin for RiverPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RiverConfig>()
            .init_resource::<FoamConfig>()
            .init_resource::<RiverBanks>()
            .add_systems(
                Startup,
                setup_river.after(crate::terrain::systems::setup_terrain_assets),
            )
            .add_systems(
                Update,
                (
                    attach_decor.in_set(FrameSet::Assets),
                    advance_foam.in_set(FrameSet::Foam),
                    animate_water_tint.in_set(FrameSet::WaterTint),
                ),
            );
    }
}

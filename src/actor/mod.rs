pub mod flight;
pub mod systems;

use bevy::prelude::*;
pub use flight::{FlightConfig, FlightPhase, FlightPlan};
use systems::*;

use crate::frame::FrameSet;
use crate::procedural::RandomSource;

#[derive(Resource, Clone, Debug)]
pub struct ActorConfig {
    pub model_path: String,
    pub model_scale: f32,
    // Turns the model so its nose points along -Z.
    pub model_yaw: f32,
    pub start_z: f32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            model_path: "models/flamingo.glb".to_string(),
            model_scale: 0.03,
            model_yaw: std::f32::consts::PI,
            start_z: 120.0,
        }
    }
}

// The flying creature. Carries the `FlightPlan`.
#[derive(Component)]
pub struct Actor;

// Present once the model scene hangs under the actor; the flight and camera
// follow check for it every frame.
#[derive(Component)]
pub struct ActorModel(pub Entity);

#[derive(Resource)]
pub struct ActorAssets {
    pub scene: Handle<Scene>,
    pub graph: Handle<AnimationGraph>,
    pub node: AnimationNodeIndex,
}

#[derive(Resource)]
pub struct ActorRng(pub RandomSource);

pub struct ActorPlugin;

impl Plugin for ActorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActorConfig>()
            .init_resource::<FlightConfig>()
            .insert_resource(ActorRng(RandomSource::ambient()))
            .add_systems(Startup, spawn_actor)
            .add_systems(
                Update,
                (
                    // Load events from last frame's poll
                    (attach_actor_model, start_actor_animation).in_set(FrameSet::Assets),
                    fly_actor.in_set(FrameSet::Actor),
                ),
            );
    }
}

//! Asynchronous model loads turned into frame-ordered events.
//!
//! Loads are fire-and-forget on the `AssetServer`. A poll in `Last` notices
//! completion and writes `ModelLoaded` / `ModelFailed`, which the owning
//! plugin consumes at the start of the next frame's `Update`. Features that
//! depend on a model check for it every frame instead of blocking.

use bevy::asset::{LoadState, UntypedHandle};
use bevy::prelude::*;

use crate::debug::DebugLog;
use crate::error::LandscapeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelSlot {
    // The animated flamingo.
    Actor,
    // Static decorative scene on the riverbank.
    Decor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    Pending,
    Loaded,
    Failed,
}

struct TrackedModel {
    slot: ModelSlot,
    path: String,
    handle: UntypedHandle,
    status: ModelStatus,
}

#[derive(Resource, Default)]
pub struct ModelLoads {
    tracked: Vec<TrackedModel>,
}

impl ModelLoads {
    pub fn track(&mut self, slot: ModelSlot, path: impl Into<String>, handle: UntypedHandle) {
        self.tracked.push(TrackedModel {
            slot,
            path: path.into(),
            handle,
            status: ModelStatus::Pending,
        });
    }

    pub fn status(&self, slot: ModelSlot) -> Option<ModelStatus> {
        self.tracked.iter().find(|m| m.slot == slot).map(|m| m.status)
    }
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ModelLoaded {
    pub slot: ModelSlot,
}

#[derive(Event, Debug, Clone)]
pub struct ModelFailed {
    pub slot: ModelSlot,
    pub error: LandscapeError,
}

pub struct ModelLoadPlugin;

impl Plugin for ModelLoadPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelLoads>()
            .add_event::<ModelLoaded>()
            .add_event::<ModelFailed>()
            .add_systems(Last, poll_model_loads);
    }
}

fn poll_model_loads(
    asset_server: Res<AssetServer>,
    mut loads: ResMut<ModelLoads>,
    mut loaded_events: EventWriter<ModelLoaded>,
    mut failed_events: EventWriter<ModelFailed>,
    mut log: ResMut<DebugLog>,
) {
    for model in loads
        .tracked
        .iter_mut()
        .filter(|m| m.status == ModelStatus::Pending)
    {
        match asset_server.load_state(model.handle.id()) {
            LoadState::Loaded => {
                model.status = ModelStatus::Loaded;
                info!("Model {:?} loaded from {}", model.slot, model.path);
                loaded_events.write(ModelLoaded { slot: model.slot });
            }
            LoadState::Failed(err) => {
                model.status = ModelStatus::Failed;
                let error = LandscapeError::AssetLoad {
                    path: model.path.clone(),
                    reason: err.to_string(),
                };
                log.warn(format!("{error}; continuing without it"));
                failed_events.write(ModelFailed {
                    slot: model.slot,
                    error,
                });
            }
            LoadState::NotLoaded | LoadState::Loading => {}
        }
    }
}

//! Per-frame ordering, viewport tracking and teardown.
//!
//! Every frame runs the sets in order: asset completions, actor flight, camera
//! follow, grass wind, foam, water tint, then pointer interaction. Later sets
//! always see transforms the earlier ones wrote this frame. Bevy renders after
//! `Update`.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::actor::Actor;
use crate::debug::DebugLog;
use crate::picking::TopicOutbox;
use crate::river::{BankDetailItem, Decor, FoamSprite, RiverWater};
use crate::terrain::{FeatureRoot, Ground};

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Assets,
    Actor,
    Camera,
    Wind,
    Foam,
    WaterTint,
    Interaction,
}

/// Logical size of the primary window.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl ViewportSize {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

pub struct FramePlugin;

impl Plugin for FramePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewportSize>()
            .configure_sets(
                Update,
                (
                    FrameSet::Assets,
                    FrameSet::Actor,
                    FrameSet::Camera,
                    FrameSet::Wind,
                    FrameSet::Foam,
                    FrameSet::WaterTint,
                    FrameSet::Interaction,
                )
                    .chain(),
            )
            .add_systems(Startup, read_initial_viewport)
            .add_systems(PreUpdate, track_viewport)
            .add_systems(Last, teardown_on_exit);
    }
}

fn read_initial_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<ViewportSize>,
) {
    if let Ok(window) = windows.single() {
        viewport.width = window.width();
        viewport.height = window.height();
    }
}

fn track_viewport(
    mut resized: EventReader<WindowResized>,
    primary: Query<Entity, With<PrimaryWindow>>,
    mut viewport: ResMut<ViewportSize>,
) {
    let Ok(primary) = primary.single() else {
        resized.clear();
        return;
    };
    if let Some(event) = resized.read().filter(|e| e.window == primary).last() {
        viewport.width = event.width;
        viewport.height = event.height;
        debug!("Viewport resized to {}x{}", event.width, event.height);
    }
}

type LandscapeRoots = Or<(
    With<FeatureRoot>,
    With<Ground>,
    With<RiverWater>,
    With<FoamSprite>,
    With<BankDetailItem>,
    With<Decor>,
    With<Actor>,
)>;

/// Releases the scene when the app is asked to exit; no frame runs after it.
fn teardown_on_exit(
    mut commands: Commands,
    mut exits: EventReader<AppExit>,
    roots: Query<Entity, LandscapeRoots>,
    log: Option<Res<DebugLog>>,
) {
    if exits.read().next().is_none() {
        return;
    }
    let mut released = 0;
    for entity in &roots {
        commands.entity(entity).despawn();
        released += 1;
    }
    commands.remove_resource::<TopicOutbox>();
    let warnings = log.map(|l| l.warnings()).unwrap_or_default();
    info!("Landscape torn down: {released} roots released, {warnings} warnings this session");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport_size() {
        assert_eq!(ViewportSize::default().size(), Vec2::new(1280.0, 720.0));
    }

    #[test]
    fn test_resize_event_updates_viewport() {
        let mut app = App::new();
        app.add_event::<WindowResized>()
            .init_resource::<ViewportSize>()
            .add_systems(Update, track_viewport);
        let window = app
            .world_mut()
            .spawn((Window::default(), PrimaryWindow))
            .id();
        app.world_mut().send_event(WindowResized {
            window,
            width: 640.0,
            height: 480.0,
        });
        app.update();
        assert_eq!(
            *app.world().resource::<ViewportSize>(),
            ViewportSize {
                width: 640.0,
                height: 480.0
            }
        );
    }
}

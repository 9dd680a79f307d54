//! Orbit camera for manual exploration and a follow mode that trails the
//! flamingo. `ToggleFollow` switches between the two.

pub mod follow;

use bevy::prelude::*;
use bevy_blendy_cameras::{BlendyCamerasPlugin, OrbitCameraController};
pub use follow::{follow_targets, smoothing_factor, FollowConfig, FollowPose};

use crate::actor::{Actor, ActorModel, FlightPlan};
use crate::frame::FrameSet;

#[derive(Component)]
pub struct MainCamera;

#[derive(Resource, Default)]
pub struct CameraFollow {
    pub enabled: bool,
    pub pose: FollowPose,
}

/// Flip between orbit and follow. Bound to `F`; hosts may send it too.
#[derive(Event, Debug, Clone, Copy)]
pub struct ToggleFollow;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(BlendyCamerasPlugin)
            .init_resource::<CameraFollow>()
            .init_resource::<FollowConfig>()
            .add_event::<ToggleFollow>()
            .add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (follow_key, apply_toggle_follow, follow_actor)
                    .chain()
                    .in_set(FrameSet::Camera),
            );
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        MainCamera,
        Camera3d::default(),
        Transform::from_xyz(30.0, 40.0, 80.0).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitCameraController::default(),
        Name::new("Main Camera"),
    ));
}

fn follow_key(keyboard: Res<ButtonInput<KeyCode>>, mut toggles: EventWriter<ToggleFollow>) {
    if keyboard.just_pressed(KeyCode::KeyF) {
        toggles.write(ToggleFollow);
    }
}

fn apply_toggle_follow(
    mut toggles: EventReader<ToggleFollow>,
    mut follow: ResMut<CameraFollow>,
    mut controllers: Query<&mut OrbitCameraController, With<MainCamera>>,
) {
    // Only the parity of the toggles matters.
    let flips = toggles.read().count();
    if flips % 2 == 0 {
        return;
    }
    let look = follow.pose.look();
    follow.enabled = !follow.enabled;
    follow.pose.reset();
    for mut controller in &mut controllers {
        if follow.enabled {
            controller.is_enabled = false;
        } else {
            hand_back_to_orbit(&mut controller, look);
        }
    }
    info!("Camera follow {}", if follow.enabled { "on" } else { "off" });
}

// Orbit state is re-derived from the camera's current transform around the
// last followed look point, so the first drag continues from where follow left off.
fn hand_back_to_orbit(controller: &mut OrbitCameraController, look: Option<Vec3>) {
    controller.focus = look.unwrap_or(controller.focus);
    controller.yaw = None;
    controller.pitch = None;
    controller.radius = None;
    controller.is_initialized = false;
    controller.is_enabled = true;
}

fn follow_actor(
    time: Res<Time>,
    config: Res<FollowConfig>,
    mut follow: ResMut<CameraFollow>,
    actors: Query<&FlightPlan, (With<Actor>, With<ActorModel>)>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    if !follow.enabled {
        return;
    }
    let Ok(plan) = actors.single() else {
        return;
    };
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };

    let targets = follow_targets(plan.position(), plan.yaw(), &config);
    let factor = smoothing_factor(config.stiffness, time.delta_secs());
    let (eye, look) = follow.pose.step(transform.translation, targets, factor);
    transform.translation = eye;
    transform.look_at(look, Vec3::Y);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orbit_camera(app: &mut App) -> Entity {
        app.world_mut()
            .spawn((
                MainCamera,
                Transform::from_xyz(30.0, 40.0, 80.0),
                Projection::default(),
                OrbitCameraController {
                    yaw: Some(0.36),
                    pitch: Some(0.43),
                    radius: Some(94.0),
                    is_initialized: true,
                    ..default()
                },
            ))
            .id()
    }

    #[test]
    fn test_ending_follow_reinitializes_orbit_around_last_look() {
        let mut app = App::new();
        app.add_event::<ToggleFollow>()
            .init_resource::<CameraFollow>()
            .add_systems(Update, apply_toggle_follow);
        let camera = orbit_camera(&mut app);

        app.world_mut().send_event(ToggleFollow);
        app.update();
        assert!(app.world().resource::<CameraFollow>().enabled);
        let controller = app.world().get::<OrbitCameraController>(camera).expect("controller");
        assert!(!controller.is_enabled);

        // Follow flies the camera somewhere else and settles its look point.
        let look = Vec3::new(4.0, 3.0, -156.0);
        app.world_mut().resource_mut::<CameraFollow>().pose.step(
            Vec3::new(5.0, 6.0, -150.0),
            (Vec3::new(5.0, 6.0, -150.0), look),
            1.0,
        );
        app.world_mut().entity_mut(camera).insert(Transform::from_xyz(5.0, 6.0, -150.0));

        app.world_mut().send_event(ToggleFollow);
        app.update();
        assert!(!app.world().resource::<CameraFollow>().enabled);
        let controller = app.world().get::<OrbitCameraController>(camera).expect("controller");
        assert!(controller.is_enabled);
        assert!(!controller.is_initialized);
        assert_eq!(controller.focus, look);
        assert_eq!(controller.yaw, None);
        assert_eq!(controller.pitch, None);
        assert_eq!(controller.radius, None);
    }

    #[test]
    fn test_paired_toggles_in_one_frame_cancel_out() {
        let mut app = App::new();
        app.add_event::<ToggleFollow>()
            .init_resource::<CameraFollow>()
            .add_systems(Update, apply_toggle_follow);
        let camera = orbit_camera(&mut app);

        app.world_mut().send_event(ToggleFollow);
        app.world_mut().send_event(ToggleFollow);
        app.update();
        assert!(!app.world().resource::<CameraFollow>().enabled);
        let controller = app.world().get::<OrbitCameraController>(camera).expect("controller");
        assert!(controller.is_initialized);
        assert_eq!(controller.radius, Some(94.0));
    }
}

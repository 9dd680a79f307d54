//! Procedural riverside landscape: terrain mounds around a meandering river,
//! instanced grass swaying in the wind, a flamingo flying waypoint cycles and
//! clickable topic markers.
//!
//! Hosts either call [`run`] with a [`MountSurface`], or add
//! [`LandscapePlugin`] to an app they assemble themselves.

pub mod actor;
pub mod assets;
pub mod camera;
pub mod curve;
pub mod debug;
pub mod error;
pub mod frame;
pub mod landscape;
pub mod picking;
pub mod procedural;
pub mod river;
pub mod terrain;
pub mod vegetation;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

pub use camera::{CameraFollow, ToggleFollow};
pub use curve::RiverCurve;
pub use error::{GenerationError, LandscapeError};
pub use landscape::{Landscape, LandscapeSummary};
pub use picking::{TopicDescriptor, TopicOpened, TopicOutbox};

/// Every engine plugin. Needs `DefaultPlugins` (or equivalent) in the app.
pub struct LandscapePlugin {
    pub world_seed: u64,
    pub extent_cells: i32,
    /// Tint grass blades individually instead of sharing one color.
    pub instance_colors: bool,
}

impl Default for LandscapePlugin {
    fn default() -> Self {
        Self {
            world_seed: 0,
            extent_cells: 3,
            instance_colors: true,
        }
    }
}

impl Plugin for LandscapePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<debug::DebugLog>()
            .init_resource::<RiverCurve>()
            .insert_resource(ClearColor(Color::srgb(0.62, 0.8, 0.93)))
            .add_plugins((
                frame::FramePlugin,
                assets::ModelLoadPlugin,
                terrain::TerrainPlugin {
                    world_seed: self.world_seed,
                    extent_cells: self.extent_cells,
                },
                river::RiverPlugin,
                vegetation::VegetationPlugin {
                    instance_colors: self.instance_colors,
                },
                actor::ActorPlugin,
                camera::CameraPlugin,
                picking::PickingPlugin,
            ))
            .add_systems(Startup, setup_scene);
    }
}

/// Where the landscape is drawn.
#[derive(Debug, Clone)]
pub struct MountSurface {
    pub title: String,
    pub width: f32,
    pub height: f32,
    /// CSS selector of the canvas to draw into on the web.
    pub canvas: Option<String>,
}

impl Default for MountSurface {
    fn default() -> Self {
        Self {
            title: "Meander".to_string(),
            width: 1280.0,
            height: 720.0,
            canvas: None,
        }
    }
}

impl MountSurface {
    fn window(&self) -> Window {
        Window {
            title: self.title.clone(),
            resolution: (self.width, self.height).into(),
            canvas: self.canvas.clone(),
            fit_canvas_to_parent: self.canvas.is_some(),
            ..default()
        }
    }
}

/// The app `run` would start, for hosts that want to add to it first.
pub fn build_app(surface: MountSurface) -> App {
    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(surface.window()),
        ..default()
    }))
    .add_plugins(EguiPlugin::default())
    .add_plugins(LandscapePlugin::default())
    .add_plugins(debug::DebugOverlayPlugin);
    app
}

pub fn run(surface: MountSurface) -> AppExit {
    build_app(surface).run()
}

fn setup_scene(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.85, 0.9, 1.0),
        brightness: 400.0,
        ..default()
    });

    let light_pos = Vec3::new(40.0, 80.0, 30.0);
    commands.spawn((
        DirectionalLight {
            color: Color::srgb(1.0, 0.97, 0.9),
            illuminance: 15000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(light_pos).looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("Sun"),
    ));
}

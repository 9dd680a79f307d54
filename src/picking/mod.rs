//! Topic markers (pole and flag) on terrain features, and click picking that
//! hands the clicked marker's topic to the host.

pub mod registry;
pub mod topics;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
pub use registry::{ndc_from_screen, ray_from_ndc, MarkerEntry, MarkerRegistry, MarkerShape};
pub use topics::{TopicCatalog, TopicDescriptor, TopicOpened, TopicOutbox};

use crate::camera::MainCamera;
use crate::frame::{FrameSet, ViewportSize};
use crate::terrain::{FeatureBatch, FeaturesSpawned, TerrainGrid};

#[derive(Resource, Clone, Debug)]
pub struct PickingConfig {
    pub max_distance: f32,
    pub shape: MarkerShape,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            max_distance: 1000.0,
            shape: MarkerShape::default(),
        }
    }
}

#[derive(Component)]
pub struct TopicMarker;

#[derive(Component)]
pub struct MarkerFlag(pub TopicDescriptor);

#[derive(Resource)]
struct MarkerAssets {
    pole_mesh: Handle<Mesh>,
    flag_mesh: Handle<Mesh>,
    pole_material: Handle<StandardMaterial>,
    flag_material: Handle<StandardMaterial>,
}

pub struct PickingPlugin;

impl Plugin for PickingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PickingConfig>()
            .init_resource::<TopicCatalog>()
            .init_resource::<MarkerRegistry>()
            .add_event::<TopicOpened>()
            .add_event::<PointerRay>()
            .add_systems(Startup, setup_marker_assets)
            .add_systems(
                Update,
                (
                    spawn_markers
                        .in_set(FrameSet::Assets)
                        .after(crate::terrain::systems::handle_terrain_generation),
                    (ray_on_click, open_picked_topic)
                        .chain()
                        .in_set(FrameSet::Interaction),
                ),
            );
    }
}

fn setup_marker_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<PickingConfig>,
) {
    let shape = config.shape;
    commands.insert_resource(MarkerAssets {
        pole_mesh: meshes.add(Cylinder::new(shape.pole_radius, shape.pole_height)),
        flag_mesh: meshes.add(Cuboid::from_size(shape.flag_size)),
        pole_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.85, 0.82, 0.75),
            ..default()
        }),
        flag_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.93, 0.36, 0.5),
            double_sided: true,
            cull_mode: None,
            ..default()
        }),
    });
}

// Puts a marker on the summit of every marked feature in the batch.
fn spawn_markers(
    mut commands: Commands,
    mut events: EventReader<FeaturesSpawned>,
    assets: Option<Res<MarkerAssets>>,
    config: Res<PickingConfig>,
    grid: Res<TerrainGrid>,
    mut catalog: ResMut<TopicCatalog>,
    mut registry: ResMut<MarkerRegistry>,
) {
    let Some(assets) = assets else {
        return;
    };
    let shape = config.shape;

    for FeaturesSpawned(batch) in events.read() {
        let FeatureBatch::Cells(cells) = batch else {
            continue;
        };
        for cell in cells.iter().filter_map(|&(x, z)| grid.cell(x, z)) {
            for (feature, &root) in cell.features.iter().zip(cell.roots.iter()) {
                if !feature.has_marker {
                    continue;
                }
                let Some(topic) = catalog.assign() else {
                    continue;
                };

                let summit = Vec3::Y * feature.height();
                let mut flag = Entity::PLACEHOLDER;
                commands.entity(root).with_children(|parent| {
                    parent
                        .spawn((
                            TopicMarker,
                            Transform::from_translation(summit),
                            Visibility::default(),
                            Name::new(format!("Marker {}", topic.display_name)),
                        ))
                        .with_children(|marker| {
                            marker.spawn((
                                Mesh3d(assets.pole_mesh.clone()),
                                MeshMaterial3d(assets.pole_material.clone()),
                                Transform::from_xyz(0.0, shape.pole_height * 0.5, 0.0),
                            ));
                            flag = marker
                                .spawn((
                                    MarkerFlag(topic.clone()),
                                    Mesh3d(assets.flag_mesh.clone()),
                                    MeshMaterial3d(assets.flag_material.clone()),
                                    Transform::from_translation(shape.flag_offset()),
                                ))
                                .id();
                        });
                });

                registry.register(flag, shape.hit_box(feature.summit()), topic);
            }
        }
        info!("{} topic markers registered", registry.len());
    }
}

// A world-space pick request. Left clicks produce one; hosts may send their own.
#[derive(Event, Debug, Clone, Copy)]
pub struct PointerRay(pub Ray3d);

fn ray_on_click(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    viewport: Res<ViewportSize>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut rays: EventWriter<PointerRay>,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Some(ndc) = ndc_from_screen(cursor, viewport.size()) else {
        return;
    };
    if let Some(ray) = ray_from_ndc(camera, camera_transform, ndc) {
        rays.write(PointerRay(ray));
    }
}

fn open_picked_topic(
    mut rays: EventReader<PointerRay>,
    config: Res<PickingConfig>,
    registry: Res<MarkerRegistry>,
    outbox: Option<Res<TopicOutbox>>,
    mut opened: EventWriter<TopicOpened>,
) {
    for PointerRay(ray) in rays.read() {
        // A miss opens nothing.
        let Some(marker) = registry.pick(*ray, config.max_distance) else {
            continue;
        };

        info!("Opening topic {}", marker.topic.identifier);
        opened.write(TopicOpened(marker.topic.clone()));
        if let Some(outbox) = outbox.as_ref() {
            if !outbox.send(marker.topic.clone()) {
                debug!("Topic viewer is gone; {} not delivered", marker.topic.identifier);
            }
        }
    }
}

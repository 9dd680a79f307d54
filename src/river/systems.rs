use std::collections::HashMap;

use bevy::prelude::*;
use rand::Rng;

use crate::assets::{ModelLoaded, ModelLoads, ModelSlot};
use crate::curve::RiverCurve;
use crate::debug::DebugLog;
use crate::procedural::{
    bank_segment, scatter_bank_detail, BankDetail, BankSide, DetailKind, RandomSource,
};
use crate::river::components::*;
use crate::river::foam::FoamField;
use crate::river::mesh::create_river_water_mesh;
use crate::river::resources::*;
use crate::terrain::generation::TerrainGenerator;
use crate::terrain::systems::spawn_feature;
use crate::terrain::{FeatureBatch, FeaturesSpawned};

pub const DECOR_MODEL_PATH: &str = "models/decor.glb";

// Scene handle held until the decor model reports in.
#[derive(Resource)]
pub struct DecorScene(pub Handle<Scene>);

#[allow(clippy::too_many_arguments)]
pub fn setup_river(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    config: Res<RiverConfig>,
    foam_config: Res<FoamConfig>,
    curve: Res<RiverCurve>,
    generator: Res<TerrainGenerator>,
    mut banks: ResMut<RiverBanks>,
    mut loads: ResMut<ModelLoads>,
    mut spawned_events: EventWriter<FeaturesSpawned>,
    mut log: ResMut<DebugLog>,
) {
    info!("Building river: {}x{} units", config.width, config.length);

    // Water surface following the meander

    let tint = WaterTint {
        material: Handle::default(),
        base_hue: config.base_hue,
        swing: config.hue_swing,
        speed: config.hue_speed,
    };
    let water_material = materials.add(StandardMaterial {
        base_color: tint.color_at(0.0),
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 0.08,
        reflectance: 0.6,
        ..default()
    });

    commands.spawn((
        RiverWater,
        Mesh3d(meshes.add(create_river_water_mesh(&curve, &config))),
        MeshMaterial3d(water_material.clone()),
        Transform::default(),
        Name::new("River Water"),
    ));
    commands.insert_resource(WaterTint {
        material: water_material,
        ..tint
    });

    // Banks on both sides, with random detail
    let mut rng = RandomSource::ambient();
    spawn_banks(
        &mut commands,
        &mut meshes,
        &mut materials,
        &generator,
        &curve,
        &config,
        &mut banks,
        &mut rng,
        &mut log,
    );
    info!(
        "Riverbanks ready: {} segments, {} detail items",
        banks.segments.len(),
        banks.detail_items
    );
    if !banks.segments.is_empty() {
        spawned_events.write(FeaturesSpawned(FeatureBatch::Banks));
    }

    // Foam pool spread over the whole river
    let foam = FoamField::new(
        foam_config.count,
        config.z_bounds(),
        config.half_width(),
        config.water_level + 0.03,
        RandomSource::ambient(),
    );
    spawn_foam_sprites(&mut commands, &mut meshes, &mut materials, &foam, &curve, &foam_config);
    commands.insert_resource(foam);

    // Decor waits on its loader; the placeholder stays empty if it fails.
    let decor_z = 24.0;
    let decor_lateral = -(config.half_width() + config.bank_width * 0.7);
    commands.spawn((
        Decor,
        Transform::from_translation(curve.position(decor_z, decor_lateral, 0.4))
            .with_scale(Vec3::splat(1.5)),
        Visibility::default(),
        Name::new("Decor"),
    ));
    let scene: Handle<Scene> = asset_server.load(format!("{DECOR_MODEL_PATH}#Scene0"));
    loads.track(ModelSlot::Decor, DECOR_MODEL_PATH, scene.clone().untyped());
    commands.insert_resource(DecorScene(scene));
}

#[allow(clippy::too_many_arguments)]
fn spawn_banks(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    generator: &TerrainGenerator,
    curve: &RiverCurve,
    config: &RiverConfig,
    banks: &mut RiverBanks,
    rng: &mut RandomSource,
    log: &mut DebugLog,
) {
    let layout = config.bank_layout();
    let (z_min, z_max) = config.z_bounds();
    let steps = ((z_max - z_min) / layout.segment_length).floor() as usize;
    let detail_assets = DetailAssets::new(meshes, materials);

    for step in 0..=steps {
        let z = z_min + step as f32 * layout.segment_length;
        for side in BankSide::BOTH {
            let segment = bank_segment(rng, curve, z, side, &layout);
            let index = banks.segments.len();
            // Same mound builder as the terrain, so banks get their own noise
            let mesh = match generator.build_mound_mesh(&segment) {
                Ok(mesh) => mesh,
                Err(err) => {
                    log.warn(format!("Skipping bank segment at z={z:.1} ({side:?}): {err}"));
                    continue;
                }
            };
            let root = spawn_feature(
                commands,
                meshes,
                materials,
                mesh,
                &segment,
                format!("Bank_{side:?}_{step}"),
            );
            commands.entity(root).insert(RiverBank { segment: index });
            banks.segments.push(segment);
            banks.roots.push(root);

            if rng.random_bool(config.detail_chance) {
                for detail in scatter_bank_detail(rng, curve, z, side, &layout) {
                    detail_assets.spawn(commands, &detail);
                    banks.detail_items += 1;
                }
            }
        }
    }
}

// One mesh and material per detail kind, shared by every item of that kind.
struct DetailAssets {
    kinds: HashMap<DetailKind, (Handle<Mesh>, Handle<StandardMaterial>)>,
}

impl DetailAssets {
    fn new(meshes: &mut Assets<Mesh>, materials: &mut Assets<StandardMaterial>) -> Self {
        let mut material = |color: Color, roughness: f32| {
            materials.add(StandardMaterial {
                base_color: color,
                perceptual_roughness: roughness,
                ..default()
            })
        };
        let sand = material(Color::srgb(0.86, 0.78, 0.56), 1.0);
        let mud = material(Color::srgb(0.36, 0.27, 0.18), 0.7);
        let pebble = material(Color::srgb(0.55, 0.55, 0.52), 0.8);
        let reed = material(Color::srgb(0.42, 0.55, 0.22), 0.9);
        let lily = material(Color::srgb(0.22, 0.5, 0.2), 0.6);

        let flat = meshes.add(Cylinder::new(0.5, 1.0));
        let kinds = HashMap::from([
            (DetailKind::Sand, (flat.clone(), sand)),
            (DetailKind::Mud, (flat.clone(), mud)),
            (DetailKind::Pebble, (meshes.add(Sphere::new(0.5).mesh().uv(8, 6)), pebble)),
            (DetailKind::Reed, (meshes.add(Cylinder::new(0.5, 1.0)), reed)),
            (DetailKind::LilyPad, (flat, lily)),
        ]);
        Self { kinds }
    }

    fn spawn(&self, commands: &mut Commands, detail: &BankDetail) {
        let Some((mesh, material)) = self.kinds.get(&detail.kind) else {
            return;
        };
        // Reeds stand on the ground, everything else is centered on it.
        let lift = match detail.kind {
            DetailKind::Reed => detail.scale.y * 0.5,
            _ => 0.0,
        };
        commands.spawn((
            BankDetailItem(detail.kind),
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(detail.position + Vec3::Y * lift)
                .with_rotation(Quat::from_rotation_y(detail.yaw))
                .with_scale(detail.scale),
        ));
    }
}

fn spawn_foam_sprites(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    foam: &FoamField,
    curve: &RiverCurve,
    config: &FoamConfig,
) {
    let mesh = meshes.add(Sphere::new(config.particle_radius).mesh().uv(6, 4));
    let material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.95, 0.97, 1.0, 0.85),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });

    for index in 0..foam.len() {
        let Some(position) = foam.position(index, curve) else {
            continue;
        };
        commands.spawn((
            FoamSprite(index),
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(position),
        ));
    }
}

pub fn attach_decor(
    mut commands: Commands,
    mut loaded_events: EventReader<ModelLoaded>,
    scene: Option<Res<DecorScene>>,
    placeholders: Query<Entity, With<Decor>>,
) {
    for event in loaded_events.read() {
        if event.slot != ModelSlot::Decor {
            continue;
        }
        let Some(scene) = scene.as_ref() else {
            continue;
        };
        for entity in &placeholders {
            commands.entity(entity).insert(SceneRoot(scene.0.clone()));
        }
        info!("Decor attached");
    }
}

pub fn advance_foam(
    time: Res<Time>,
    config: Res<FoamConfig>,
    curve: Res<RiverCurve>,
    foam: Option<ResMut<FoamField>>,
    mut sprites: Query<(&FoamSprite, &mut Transform)>,
) {
    let Some(mut foam) = foam else {
        return;
    };
    foam.advance(
        config.flow_speed * time.delta_secs(),
        config.wobble,
        time.elapsed_secs(),
    );
    for (sprite, mut transform) in &mut sprites {
        if let Some(position) = foam.position(sprite.0, &curve) {
            transform.translation = position;
        }
    }
}

pub fn animate_water_tint(
    time: Res<Time>,
    tint: Option<Res<WaterTint>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut water: Query<&mut Transform, With<RiverWater>>,
) {
    let Some(tint) = tint else {
        return;
    };
    let elapsed = time.elapsed_secs();
    if let Some(material) = materials.get_mut(&tint.material) {
        material.base_color = tint.color_at(elapsed);
    }
    for mut transform in &mut water {
        transform.translation.y = (elapsed * 0.6).sin() * 0.015;
    }
}

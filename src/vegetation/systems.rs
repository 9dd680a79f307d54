use bevy::prelude::*;
use rand::seq::IndexedRandom;

use super::components::*;
use super::instancing::{grass_count, scatter_grass, wind_window, InstanceBuffer};
use super::resources::*;
use super::template::{blade_material, blade_texture, build_blade_mesh};
use crate::debug::DebugLog;
use crate::error::LandscapeError;
use crate::procedural::{scatter_flora, FloraKind, RandomSource, TerrainFeature};
use crate::river::RiverBanks;
use crate::terrain::{FeatureBatch, FeaturesSpawned, TerrainGrid};

// Tints applied to the palette variants of the blade material.
const GRASS_TINTS: [(f32, f32, f32); 5] = [
    (1.0, 1.0, 1.0),
    (0.85, 0.95, 0.8),
    (1.05, 1.0, 0.75),
    (0.75, 0.9, 0.7),
    (1.1, 1.05, 0.9),
];

// Marker resource set by the plugin when the host asked for per-instance color.
#[derive(Resource, Clone, Copy)]
pub struct InstanceColorRequest(pub bool);

pub fn setup_vegetation_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    request: Res<InstanceColorRequest>,
    mut log: ResMut<DebugLog>,
) {
    info!("Building grass template...");

    let texture = images.add(blade_texture());
    let material = materials.add(blade_material(texture.clone(), Color::WHITE));
    let mesh = meshes.add(build_blade_mesh());

    if request.0 {
        let palette = GRASS_TINTS
            .iter()
            .map(|&(r, g, b)| materials.add(blade_material(texture.clone(), Color::srgb(r, g, b))))
            .collect();
        commands.insert_resource(InstanceColorSupport { palette });
    } else {
        let missing = LandscapeError::MissingCapability("per-instance grass color");
        log.info(format!("{missing}; blades use the uniform material"));
    }

    commands.insert_resource(GrassTemplate { mesh, material });

    let flower_materials = [
        Color::srgb(0.95, 0.85, 0.3),
        Color::srgb(0.92, 0.45, 0.6),
        Color::srgb(0.95, 0.95, 0.95),
        Color::srgb(0.6, 0.5, 0.9),
    ]
    .into_iter()
    .map(|color| {
        materials.add(StandardMaterial {
            base_color: color,
            perceptual_roughness: 0.7,
            ..default()
        })
    })
    .collect();

    commands.insert_resource(FloraAssets {
        bush_mesh: meshes.add(Sphere::new(0.5).mesh().uv(10, 8)),
        bush_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.2, 0.42, 0.18),
            perceptual_roughness: 0.95,
            ..default()
        }),
        flower_mesh: meshes.add(Sphere::new(0.25).mesh().uv(6, 4)),
        flower_materials,
    });
}

#[allow(clippy::too_many_arguments)]
pub fn populate_vegetation(
    mut commands: Commands,
    mut events: EventReader<FeaturesSpawned>,
    template: Option<Res<GrassTemplate>>,
    flora: Option<Res<FloraAssets>>,
    colors: Option<Res<InstanceColorSupport>>,
    config: Res<GrassConfig>,
    mut grid: ResMut<TerrainGrid>,
    mut banks: ResMut<RiverBanks>,
    mut stats: ResMut<VegetationStats>,
) {
    let (Some(template), Some(flora)) = (template, flora) else {
        return;
    };
    let colors = colors.as_deref();

    for FeaturesSpawned(batch) in events.read() {
        let before = stats.blades;
        match batch {
            FeatureBatch::Cells(cells) => {
                for &(grid_x, grid_z) in cells {
                    let Some(cell) = grid.cell_mut(grid_x, grid_z) else {
                        continue;
                    };
                    let seed = cell.seed;
                    for (index, (feature, &root)) in
                        cell.features.iter_mut().zip(cell.roots.iter()).enumerate()
                    {
                        // Seeded per feature
                        let mut rng = RandomSource::seeded(
                            seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15),
                        );
                        let feature_ref = FeatureRef::Cell {
                            grid_x,
                            grid_z,
                            index,
                        };
                        let (patch, blades) = spawn_grass_patch(
                            &mut commands,
                            &template,
                            colors,
                            &config,
                            &mut rng,
                            feature,
                            root,
                            feature_ref,
                        );
                        // Back-references on the feature record
                        feature.grass_patch = Some(patch);
                        feature.vegetation = spawn_flora(&mut commands, &flora, &mut rng, feature, root);
                        stats.patches += 1;
                        stats.blades += blades;
                        stats.flora += feature.vegetation.len();
                    }
                }
            }
            // Bank segments get grass only, from ambient randomness
            FeatureBatch::Banks => {
                let mut rng = RandomSource::ambient();
                let banks = &mut *banks;
                for (index, (segment, &root)) in
                    banks.segments.iter_mut().zip(banks.roots.iter()).enumerate()
                {
                    // Already grassed
                    if segment.grass_patch.is_some() {
                        continue;
                    }
                    let (patch, blades) = spawn_grass_patch(
                        &mut commands,
                        &template,
                        colors,
                        &config,
                        &mut rng,
                        segment,
                        root,
                        FeatureRef::Bank(index),
                    );
                    segment.grass_patch = Some(patch);
                    stats.patches += 1;
                    stats.blades += blades;
                }
            }
        }
        debug!("Vegetation batch {:?}: {} blades", batch, stats.blades - before);
    }
}

// Spawns the patch under the feature root and one blade per instance, all
// sharing the template mesh. Returns the patch entity and its blade count.
#[allow(clippy::too_many_arguments)]
fn spawn_grass_patch(
    commands: &mut Commands,
    template: &GrassTemplate,
    colors: Option<&InstanceColorSupport>,
    config: &GrassConfig,
    rng: &mut RandomSource,
    feature: &TerrainFeature,
    root: Entity,
    feature_ref: FeatureRef,
) -> (Entity, usize) {
    let count = grass_count(feature, config.interior_density, config.bank_density);
    let mut buffer = InstanceBuffer::new(scatter_grass(rng, feature, count, &config.ranges()));
    if let Some(colors) = colors {
        buffer = buffer.with_colors(rng, colors.palette.len());
    }

    let patch = commands
        .spawn((
            Transform::default(),
            Visibility::default(),
            ChildOf(root),
            Name::new("Grass"),
        ))
        .id();

    let blades: Vec<Entity> = buffer
        .transforms()
        .iter()
        .enumerate()
        .map(|(index, transform)| {
            let material = buffer
                .color_index(index)
                .and_then(|c| colors.and_then(|p| p.palette.get(c)))
                .unwrap_or(&template.material)
                .clone();
            commands
                .spawn((
                    GrassBlade(index),
                    Mesh3d(template.mesh.clone()),
                    MeshMaterial3d(material),
                    *transform,
                    ChildOf(patch),
                ))
                .id()
        })
        .collect();

    let count = blades.len();
    commands.entity(patch).insert(GrassPatch {
        feature: feature_ref,
        buffer,
        blades,
    });
    (patch, count)
}

fn spawn_flora(
    commands: &mut Commands,
    flora: &FloraAssets,
    rng: &mut RandomSource,
    feature: &TerrainFeature,
    root: Entity,
) -> Vec<Entity> {
    scatter_flora(rng, feature)
        .into_iter()
        .filter_map(|placement| {
            let (mesh, material, scale) = match placement.kind {
                FloraKind::Bush => (
                    &flora.bush_mesh,
                    &flora.bush_material,
                    Vec3::new(1.0, 0.8, 1.0) * placement.scale,
                ),
                FloraKind::Flower => (
                    &flora.flower_mesh,
                    flora.flower_materials.choose(rng)?,
                    Vec3::splat(placement.scale),
                ),
            };
            let entity = commands
                .spawn((
                    VegetationItem(placement.kind),
                    Mesh3d(mesh.clone()),
                    MeshMaterial3d(material.clone()),
                    Transform::from_translation(placement.offset + Vec3::Y * scale.y * 0.3)
                        .with_rotation(Quat::from_rotation_y(placement.yaw))
                        .with_scale(scale),
                    ChildOf(root),
                ))
                .id();
            Some(entity)
        })
        .collect()
}

// Sways a bounded subset of blades: a few patches per frame, a few blades in
// each, round robin.
pub fn animate_wind(
    time: Res<Time>,
    config: Res<GrassConfig>,
    mut wind: ResMut<WindState>,
    mut patches: Query<&mut GrassPatch>,
    mut blades: Query<&mut Transform, With<GrassBlade>>,
) {
    let patch_count = patches.iter().count();
    let selected = wind_window(wind.next_patch, patch_count, config.patches_per_frame);
    if selected.is_empty() {
        return;
    }

    let elapsed = time.elapsed_secs();
    let params = config.wind();
    let mut touched = 0;
    for (index, mut patch) in patches.iter_mut().enumerate() {
        if !selected.contains(&index) {
            continue;
        }
        let swayed = patch
            .buffer
            .sway_next(config.instances_per_patch, elapsed, &params);
        for blade in swayed {
            let (Some(&entity), Some(transform)) =
                (patch.blades.get(blade), patch.buffer.transform(blade))
            else {
                wind.skipped += 1;
                continue;
            };
            match blades.get_mut(entity) {
                Ok(mut blade_transform) => {
                    *blade_transform = *transform;
                    touched += 1;
                }
                Err(_) => wind.skipped += 1,
            }
        }
    }

    wind.next_patch = (wind.next_patch + selected.len()) % patch_count;
    wind.touched_last_frame = touched;
}

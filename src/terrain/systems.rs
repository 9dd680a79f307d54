use bevy::prelude::*;

use crate::curve::RiverCurve;
use crate::debug::DebugLog;
use crate::error::GenerationError;
use crate::procedural::TerrainFeature;
use crate::river::RiverConfig;
use crate::terrain::generation::TerrainGenerator;
use crate::terrain::resources::*;

const GROUND_SIZE: f32 = 600.0;

pub fn setup_terrain_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    info!("Setting up terrain ground...");

    let ground_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.32, 0.52, 0.24),
        perceptual_roughness: 0.95,
        metallic: 0.0,
        ..default()
    });

    // Slightly below the water so the river reads as a channel.
    commands.spawn((
        Ground,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(ground_material),
        Transform::from_xyz(0.0, -0.05, 0.0),
        Name::new("Ground"),
    ));
}

pub fn generate_initial_terrain(
    mut generate_events: EventWriter<GenerateTerrainEvent>,
    config: Res<TerrainConfig>,
) {
    info!("Starting initial terrain generation ({} cells each way)", config.extent_cells);
    generate_events.write(GenerateTerrainEvent {
        extent: config.extent_cells,
    });
}

#[allow(clippy::too_many_arguments)]
pub fn handle_terrain_generation(
    mut commands: Commands,
    mut events: EventReader<GenerateTerrainEvent>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut grid: ResMut<TerrainGrid>,
    generator: Res<TerrainGenerator>,
    config: Res<TerrainConfig>,
    river: Res<RiverConfig>,
    curve: Res<RiverCurve>,
    mut spawned_events: EventWriter<FeaturesSpawned>,
    mut log: ResMut<DebugLog>,
) {
    for event in events.read() {
        let rules = config.feature_rules(river.width);
        let populated = grid.generate_around_origin(event.extent, &curve, &rules, config.world_seed);

        let mut spawned = Vec::with_capacity(populated.len());
        for &(grid_x, grid_z) in &populated {
            let Some(cell) = grid.cell_mut(grid_x, grid_z) else {
                continue;
            };
            spawn_cell_features(&mut commands, &mut meshes, &mut materials, &generator, cell, &mut log);
            if !cell.features.is_empty() {
                spawned.push((grid_x, grid_z));
            }
        }

        info!(
            "Terrain ready: {} cells ({} blocked by the river), {} features",
            grid.len(),
            grid.blocked_count(),
            grid.feature_count()
        );

        if !spawned.is_empty() {
            spawned_events.write(FeaturesSpawned(FeatureBatch::Cells(spawned)));
        }
    }
}

// Spawns every feature of the cell whose mesh builds; the rest are logged and
// dropped from the cell so the grid only lists what exists in the scene.
fn spawn_cell_features(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    generator: &TerrainGenerator,
    cell: &mut TerrainCell,
    log: &mut DebugLog,
) {
    let mut kept = Vec::with_capacity(cell.features.len());
    let mut roots = Vec::with_capacity(cell.features.len());

    for (index, feature) in cell.features.drain(..).enumerate() {
        match generator.build_mound_mesh(&feature) {
            Ok(mesh) => {
                let name = format!("Feature_{}_{}_{}", cell.grid_x, cell.grid_z, index);
                roots.push(spawn_feature(commands, meshes, materials, mesh, &feature, name));
                kept.push(feature);
            }
            // A generator that cannot build any mound is misconfigured, not unlucky.
            Err(err @ GenerationError::TooFewSegments { .. }) => log.error(format!(
                "Skipping feature {index} of cell ({}, {}): {err}",
                cell.grid_x, cell.grid_z
            )),
            Err(err) => log.warn(format!(
                "Skipping feature {index} of cell ({}, {}): {err}",
                cell.grid_x, cell.grid_z
            )),
        }
    }

    cell.features = kept;
    cell.roots = roots;
}

// Root entity at the feature's base with the scaled, turned mound as a child.
pub fn spawn_feature(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    mesh: Mesh,
    feature: &TerrainFeature,
    name: String,
) -> Entity {
    let material = materials.add(StandardMaterial {
        base_color: feature.color,
        perceptual_roughness: 0.9,
        metallic: 0.0,
        ..default()
    });
    let mesh = meshes.add(mesh);

    commands
        .spawn((
            FeatureRoot,
            Transform::from_translation(feature.position),
            Visibility::default(),
            Name::new(name),
        ))
        .with_children(|parent| {
            parent.spawn((
                TerrainMound,
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::from_rotation(feature.rotation()).with_scale(feature.scale),
            ));
        })
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::world::CommandQueue;

    fn populated_cell() -> TerrainCell {
        let config = TerrainConfig::default();
        let rules = config.feature_rules(RiverConfig::default().width);
        let mut grid = TerrainGrid::default();
        grid.ensure_cell(3, 0, &RiverCurve, &rules, config.world_seed);
        grid.cell(3, 0).cloned().expect("cell (3, 0) stored")
    }

    fn spawn(cell: &mut TerrainCell, generator: &TerrainGenerator) -> (World, DebugLog) {
        let mut world = World::new();
        let mut queue = CommandQueue::default();
        let mut meshes = Assets::<Mesh>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let mut log = DebugLog::default();
        {
            let mut commands = Commands::new(&mut queue, &world);
            spawn_cell_features(&mut commands, &mut meshes, &mut materials, generator, cell, &mut log);
        }
        queue.apply(&mut world);
        (world, log)
    }

    fn root_count(world: &mut World) -> usize {
        world.query_filtered::<(), With<FeatureRoot>>().iter(world).count()
    }

    #[test]
    fn test_malformed_feature_is_skipped_and_siblings_spawn() {
        let generator = TerrainGenerator::new(0, 6, 18, 0.12);
        let mut cell = populated_cell();
        let total = cell.features.len();
        cell.features[1].scale.y = f32::NAN;
        let bad = cell.features[1].position;

        let (mut world, log) = spawn(&mut cell, &generator);
        assert_eq!(cell.features.len(), total - 1);
        assert_eq!(cell.roots.len(), total - 1);
        assert!(cell.features.iter().all(|f| f.position != bad));
        assert_eq!(root_count(&mut world), total - 1);
        assert_eq!(log.warnings(), 1);
        assert_eq!(log.errors(), 0);
    }

    #[test]
    fn test_flat_feature_is_skipped() {
        let generator = TerrainGenerator::new(0, 6, 18, 0.12);
        let mut cell = populated_cell();
        let total = cell.features.len();
        cell.features[0].scale.x = 0.0;

        let (mut world, log) = spawn(&mut cell, &generator);
        assert_eq!(root_count(&mut world), total - 1);
        assert_eq!(log.warnings(), 1);
    }

    #[test]
    fn test_misconfigured_generator_logs_errors_and_spawns_nothing() {
        let generator = TerrainGenerator::new(0, 1, 18, 0.12);
        let mut cell = populated_cell();
        let total = cell.features.len();

        let (mut world, log) = spawn(&mut cell, &generator);
        assert!(cell.features.is_empty());
        assert!(cell.roots.is_empty());
        assert_eq!(root_count(&mut world), 0);
        assert_eq!(log.errors(), total);
        assert_eq!(log.warnings(), 0);
    }
}

use bevy::prelude::*;
use meander::actor::{FlightConfig, FlightPhase, FlightPlan};
use meander::curve::{RiverCurve, MAX_OFFSET};
use meander::debug::DebugLog;
use meander::picking::{MarkerRegistry, MarkerShape, TopicCatalog};
use meander::procedural::{bank_segment, BankSide, FeatureKind, RandomSource};
use meander::river::{FoamField, RiverConfig};
use meander::terrain::{CellOutcome, CellState, FeatureRoot, TerrainConfig, TerrainGrid, TerrainPlugin};
use meander::vegetation::instancing::{scatter_grass, GrassRanges, InstanceBuffer, WindParams};
use meander::vegetation::grass_count;

fn rules() -> (TerrainConfig, meander::procedural::FeatureRules) {
    let config = TerrainConfig::default();
    let rules = config.feature_rules(RiverConfig::default().width);
    (config, rules)
}

#[test]
fn cell_on_the_river_is_blocked_and_cell_beside_it_is_populated() {
    let curve = RiverCurve;
    let (config, rules) = rules();
    let mut grid = TerrainGrid::default();

    assert_eq!(grid.ensure_cell(0, 0, &curve, &rules, config.world_seed), CellOutcome::Blocked);
    let origin = grid.cell(0, 0).expect("cell stored");
    assert_eq!(origin.state, CellState::RiverBlocked);
    assert!(origin.features.is_empty());

    let CellOutcome::Created(count) = grid.ensure_cell(3, 0, &curve, &rules, config.world_seed) else {
        panic!("cell (3, 0) should be clear of the river");
    };
    assert!((3..=6).contains(&count));
    let cell = grid.cell(3, 0).expect("cell stored");
    for feature in &cell.features {
        assert!(curve.distance(feature.position.x, feature.position.z) >= rules.river_buffer);
    }
}

#[test]
fn ensure_cell_is_idempotent() {
    let curve = RiverCurve;
    let (config, rules) = rules();
    let mut grid = TerrainGrid::default();
    grid.ensure_cell(-2, 1, &curve, &rules, config.world_seed);
    let before: Vec<Vec3> = grid
        .cell(-2, 1)
        .map(|c| c.features.iter().map(|f| f.position).collect())
        .unwrap_or_default();

    assert_eq!(grid.ensure_cell(-2, 1, &curve, &rules, config.world_seed), CellOutcome::Existing);
    let after: Vec<Vec3> = grid
        .cell(-2, 1)
        .map(|c| c.features.iter().map(|f| f.position).collect())
        .unwrap_or_default();
    assert_eq!(before, after);
    assert_eq!(grid.len(), 1);
}

#[test]
fn whole_grid_keeps_features_off_the_water() {
    let curve = RiverCurve;
    let (_, rules) = rules();
    let mut grid = TerrainGrid::default();
    grid.generate_around_origin(3, &curve, &rules, 99);
    assert_eq!(grid.len(), 49);
    assert!(grid.blocked_count() > 0);
    for feature in grid.features() {
        assert!(curve.distance(feature.position.x, feature.position.z) >= rules.river_buffer);
    }
    // The meander never strays past its envelope.
    for z in -200..=200 {
        assert!(curve.offset(z as f32).abs() <= MAX_OFFSET);
    }
}

#[test]
fn only_bank_segments_sit_inside_the_river_buffer() {
    let curve = RiverCurve;
    let (config, rules) = rules();
    let river = RiverConfig::default();
    let mut grid = TerrainGrid::default();
    grid.generate_around_origin(3, &curve, &rules, config.world_seed);
    assert!(grid.features().all(|f| f.kind != FeatureKind::Bank));

    let layout = river.bank_layout();
    let mut rng = RandomSource::seeded(3);
    for z in [-150.0, -40.0, 0.0, 75.0] {
        for side in BankSide::BOTH {
            let segment = bank_segment(&mut rng, &curve, z, side, &layout);
            assert_eq!(segment.kind, FeatureKind::Bank);
            let distance = curve.distance(segment.position.x, segment.position.z);
            assert!((distance - (layout.half_width + layout.bank_width * 0.5)).abs() < 1e-3);
            assert!(distance < rules.river_buffer);
        }
    }
}

#[test]
fn same_seed_builds_the_same_world() {
    let curve = RiverCurve;
    let (_, rules) = rules();
    let mut a = TerrainGrid::default();
    let mut b = TerrainGrid::default();
    a.generate_around_origin(2, &curve, &rules, 1234);
    b.generate_around_origin(2, &curve, &rules, 1234);
    let positions = |g: &TerrainGrid| g.features().map(|f| f.position).collect::<Vec<_>>();
    assert_eq!(positions(&a), positions(&b));
}

#[test]
fn flight_completes_eight_transits_and_starts_a_fresh_cycle() {
    let curve = RiverCurve;
    let config = FlightConfig::default();
    let mut rng = RandomSource::seeded(77);
    let mut plan = FlightPlan::new(Vec3::new(0.0, 3.0, -140.0));

    plan.tick(1.0 / 60.0, &mut rng, &curve, &config);
    let first = plan.waypoints().to_vec();
    assert_eq!(first.len(), 8);

    while plan.cycle() < 2 {
        plan.tick(1.0 / 60.0, &mut rng, &curve, &config);
    }
    assert_eq!(plan.last_cycle_transits(), 8);
    assert_eq!(plan.phase(), FlightPhase::Traveling(0));
    assert_ne!(plan.waypoints(), first.as_slice());
}

#[test]
fn picking_hits_only_registered_markers() {
    let curve = RiverCurve;
    let (config, rules) = rules();
    let mut grid = TerrainGrid::default();
    grid.generate_around_origin(3, &curve, &rules, config.world_seed);

    let shape = MarkerShape::default();
    let mut catalog = TopicCatalog::default();
    let mut registry = MarkerRegistry::default();
    let feature = grid.features().next().expect("grid has features");
    let topic = catalog.assign().expect("catalog has topics");
    registry.register(Entity::from_raw(10), shape.hit_box(feature.summit()), topic.clone());

    let flag = feature.summit() + shape.flag_offset();
    let eye = flag + Vec3::new(0.0, 15.0, 40.0);

    let miss = Ray3d {
        origin: eye,
        direction: Dir3::new(Vec3::new(0.0, 1.0, 0.0)).unwrap_or(Dir3::Y),
    };
    assert!(registry.pick(miss, 1000.0).is_none());

    let hit = Ray3d {
        origin: eye,
        direction: Dir3::new(flag - eye).unwrap_or(Dir3::NEG_Z),
    };
    let picked = registry.pick(hit, 1000.0).map(|m| m.topic.clone());
    assert_eq!(picked, Some(topic));
}

#[test]
fn grass_patch_count_survives_wind() {
    let curve = RiverCurve;
    let (config, rules) = rules();
    let mut grid = TerrainGrid::default();
    grid.ensure_cell(3, 0, &curve, &rules, config.world_seed);
    let feature = grid.features().next().expect("cell (3, 0) has features");

    let count = grass_count(feature, 50.0, 80.0);
    assert_eq!(count, (feature.size * feature.size * 50.0).floor() as usize);

    let ranges = GrassRanges {
        height: 0.35..0.7,
        width: 0.08..0.16,
        max_lean: 0.12,
    };
    let wind = WindParams {
        speed: 1.8,
        strength: 0.18,
    };
    let mut rng = RandomSource::seeded(4);
    let mut buffer = InstanceBuffer::new(scatter_grass(&mut rng, feature, count, &ranges));
    for frame in 0..1000 {
        let touched = buffer.sway_next(15, frame as f32 / 60.0, &wind);
        assert!(touched.len() <= 15);
        assert_eq!(buffer.len(), count);
    }
}

#[test]
fn foam_recycles_at_far_end_inside_the_banks() {
    let curve = RiverCurve;
    let river = RiverConfig::default();
    let mut foam = FoamField::new(
        800,
        river.z_bounds(),
        river.half_width(),
        river.water_level,
        RandomSource::seeded(12),
    );
    let (lower, upper) = river.z_bounds();
    let step = 4.0 / 60.0;
    for frame in 0..3000 {
        let before: Vec<f32> = foam.particles().iter().map(|p| p.z).collect();
        foam.advance(step, 0.3, frame as f32 / 60.0);
        for (i, particle) in foam.particles().iter().enumerate() {
            let position = foam.position(i, &curve).expect("particle exists");
            assert!(curve.distance(position.x, position.z) <= river.half_width() + 1e-3);
            if before[i] - step < lower {
                assert_eq!(particle.z, upper);
            }
        }
    }
    assert_eq!(foam.len(), 800);
    assert!(foam.recycled() > 0);
}

#[test]
fn terrain_plugin_spawns_one_root_per_feature() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .init_resource::<Assets<Mesh>>()
        .init_resource::<Assets<StandardMaterial>>()
        .init_resource::<DebugLog>()
        .init_resource::<RiverCurve>()
        .init_resource::<RiverConfig>()
        .add_plugins(TerrainPlugin {
            world_seed: 7,
            extent_cells: 2,
        });
    app.update();
    app.update();

    let features = app.world().resource::<TerrainGrid>().feature_count();
    let cells = app.world().resource::<TerrainGrid>().len();
    let roots = app
        .world_mut()
        .query_filtered::<(), With<FeatureRoot>>()
        .iter(app.world())
        .count();
    assert_eq!(cells, 25);
    assert!(features > 0);
    assert_eq!(roots, features);
}

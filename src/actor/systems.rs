use bevy::prelude::*;

use super::flight::{FlightConfig, FlightPlan};
use super::{Actor, ActorAssets, ActorConfig, ActorModel, ActorRng};
use crate::assets::{ModelFailed, ModelLoaded, ModelLoads, ModelSlot};
use crate::curve::RiverCurve;

pub fn spawn_actor(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    config: Res<ActorConfig>,
    curve: Res<RiverCurve>,
    mut loads: ResMut<ModelLoads>,
) {
    let path = config.model_path.clone();
    info!("Loading actor model from {path}");

    let scene: Handle<Scene> = asset_server.load(format!("{path}#Scene0"));
    let clip: Handle<AnimationClip> = asset_server.load(format!("{path}#Animation0"));
    let (graph, node) = AnimationGraph::from_clip(clip);
    loads.track(ModelSlot::Actor, path, scene.clone().untyped());

    commands.insert_resource(ActorAssets {
        scene,
        graph: graphs.add(graph),
        node,
    });

    let start = curve.position(config.start_z, 0.0, 3.0);
    commands.spawn((
        Actor,
        FlightPlan::new(start),
        Transform::from_translation(start),
        Visibility::default(),
        Name::new("Flamingo"),
    ));
}

// Runs at the start of the frame after the loader reported in.
pub fn attach_actor_model(
    mut commands: Commands,
    mut loaded_events: EventReader<ModelLoaded>,
    mut failed_events: EventReader<ModelFailed>,
    assets: Option<Res<ActorAssets>>,
    config: Res<ActorConfig>,
    actors: Query<Entity, (With<Actor>, Without<ActorModel>)>,
) {
    for event in failed_events.read() {
        if event.slot == ModelSlot::Actor {
            warn!("Flamingo stays grounded: {}", event.error);
        }
    }

    for event in loaded_events.read() {
        if event.slot != ModelSlot::Actor {
            continue;
        }
        let Some(assets) = assets.as_ref() else {
            continue;
        };
        for actor in &actors {
            let model = commands
                .spawn((
                    SceneRoot(assets.scene.clone()),
                    Transform::from_rotation(Quat::from_rotation_y(config.model_yaw))
                        .with_scale(Vec3::splat(config.model_scale)),
                    ChildOf(actor),
                ))
                .id();
            commands.entity(actor).insert(ActorModel(model));
            info!("Flamingo model attached");
        }
    }
}

// Starts the flight clip on every animation player that appears under the actor.
pub fn start_actor_animation(
    mut commands: Commands,
    assets: Option<Res<ActorAssets>>,
    mut players: Query<(Entity, &mut AnimationPlayer), Added<AnimationPlayer>>,
    parents: Query<&ChildOf>,
    actors: Query<(), With<Actor>>,
) {
    let Some(assets) = assets else {
        return;
    };
    for (entity, mut player) in &mut players {
        if !parents
            .iter_ancestors(entity)
            .any(|ancestor| actors.contains(ancestor))
        {
            continue;
        }
        player.play(assets.node).repeat();
        commands
            .entity(entity)
            .insert(AnimationGraphHandle(assets.graph.clone()));
    }
}

// Advances the flight plan. Nothing moves until the model is attached.
pub fn fly_actor(
    time: Res<Time>,
    config: Res<FlightConfig>,
    curve: Res<RiverCurve>,
    mut rng: ResMut<ActorRng>,
    mut actors: Query<(&mut FlightPlan, &mut Transform), (With<Actor>, With<ActorModel>)>,
) {
    for (mut plan, mut transform) in &mut actors {
        let cycle = plan.cycle();
        plan.tick(time.delta_secs(), &mut rng.0, &curve, &config);
        if plan.cycle() != cycle {
            debug!("Flamingo starts flight cycle {}", plan.cycle());
        }
        *transform = plan.rendered_transform(time.elapsed_secs(), &config);
    }
}

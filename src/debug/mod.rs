//! Debug channel and the egui overlay that shows it.

pub mod log;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
pub use log::{DebugLog, LogEntry, LogLevel};

use crate::actor::{Actor, ActorModel, FlightConfig, FlightPhase, FlightPlan};
use crate::assets::{ModelLoads, ModelSlot, ModelStatus};
use crate::camera::{CameraFollow, FollowConfig, ToggleFollow};
use crate::landscape::Landscape;
use crate::river::FoamConfig;
use crate::vegetation::GrassConfig;

const RECENT_ENTRIES: usize = 8;

// Egui window with world statistics, live tuning and recent warnings.
// Requires `EguiPlugin`.
pub struct DebugOverlayPlugin;

impl Plugin for DebugOverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugLog>()
            .add_systems(EguiPrimaryContextPass, debug_overlay_ui);
    }
}

#[allow(clippy::too_many_arguments)]
fn debug_overlay_ui(
    mut contexts: EguiContexts,
    landscape: Landscape,
    log: Res<DebugLog>,
    loads: Res<ModelLoads>,
    actors: Query<(&FlightPlan, Has<ActorModel>), With<Actor>>,
    mut grass: ResMut<GrassConfig>,
    mut foam: ResMut<FoamConfig>,
    mut flight: ResMut<FlightConfig>,
    mut follow_config: ResMut<FollowConfig>,
    follow: Res<CameraFollow>,
    mut toggles: EventWriter<ToggleFollow>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let summary = landscape.summary();

    egui::Window::new("Landscape")
        .default_width(300.0)
        .show(ctx, |ui| {
            ui.heading("World");
            ui.label(format!(
                "Cells: {} ({} blocked by the river)",
                summary.cells, summary.blocked_cells
            ));
            ui.label(format!(
                "Features: {} ({} marked)",
                summary.features, summary.marked_features
            ));
            ui.label(format!(
                "Bank segments: {}, detail items: {}",
                summary.bank_segments, summary.bank_details
            ));
            ui.label(format!(
                "Grass: {} patches, {} blades, {} flora",
                summary.grass_patches, summary.grass_blades, summary.flora
            ));
            ui.label(format!(
                "Wind touched {} blades last frame ({} skipped)",
                landscape.wind.touched_last_frame, landscape.wind.skipped
            ));
            ui.label(format!("Markers: {}", summary.markers));
            let decor = match loads.status(ModelSlot::Decor) {
                Some(ModelStatus::Loaded) => "placed",
                Some(ModelStatus::Failed) => "missing",
                Some(ModelStatus::Pending) => "loading",
                None => "none",
            };
            ui.label(format!("Bank decor: {decor}"));
            ui.label(format!(
                "Foam: {} particles, {} recycled",
                summary.foam_particles, summary.foam_recycled
            ));

            ui.separator();
            ui.heading("Flamingo");
            match actors.single() {
                Ok((plan, true)) => {
                    let phase = match plan.phase() {
                        FlightPhase::Idle => "idle".to_string(),
                        FlightPhase::Traveling(i) => {
                            format!("to waypoint {} of {}", i + 1, plan.waypoints().len())
                        }
                        FlightPhase::Hovering(i) => format!("hovering at waypoint {}", i + 1),
                    };
                    ui.label(format!("Cycle {}: {phase}", plan.cycle()));
                    ui.label(format!(
                        "Last cycle flew {} transits",
                        plan.last_cycle_transits()
                    ));
                }
                Ok((_, false)) => match loads.status(ModelSlot::Actor) {
                    Some(ModelStatus::Failed) => {
                        ui.colored_label(egui::Color32::YELLOW, "Model failed to load; grounded");
                    }
                    _ => {
                        ui.label("Model loading...");
                    }
                },
                Err(_) => {
                    ui.colored_label(egui::Color32::GRAY, "No flamingo");
                }
            }
            let label = if follow.enabled { "Stop following" } else { "Follow flamingo (F)" };
            if ui.button(label).clicked() {
                toggles.write(ToggleFollow);
            }

            ui.separator();
            ui.collapsing("Tuning", |ui| {
                ui.add(egui::Slider::new(&mut grass.wind_strength, 0.0..=0.6).text("Wind strength"));
                ui.add(egui::Slider::new(&mut grass.wind_speed, 0.0..=6.0).text("Wind speed"));
                ui.add(egui::Slider::new(&mut foam.flow_speed, 0.0..=15.0).text("Flow speed"));
                ui.add(egui::Slider::new(&mut foam.wobble, 0.0..=2.0).text("Foam wobble"));
                ui.add(egui::Slider::new(&mut flight.hover_chance, 0.0..=1.0).text("Hover chance"));
                ui.add(
                    egui::Slider::new(&mut follow_config.stiffness, 0.5..=10.0)
                        .text("Follow stiffness"),
                );
            });

            ui.separator();
            ui.heading(format!(
                "Log ({} warnings, {} errors)",
                log.warnings(),
                log.errors()
            ));
            for entry in log.recent().take(RECENT_ENTRIES) {
                let color = match entry.level {
                    LogLevel::Info => egui::Color32::LIGHT_GRAY,
                    LogLevel::Warn => egui::Color32::YELLOW,
                    LogLevel::Error => egui::Color32::RED,
                };
                ui.colored_label(color, &entry.message);
            }
        });
}

//! Waypoint flight for the flamingo: a cycle of eight waypoints that alternate
//! between skimming the river and circling over the terrain, regenerated every
//! time the cycle finishes.

use std::f32::consts::PI;
use std::ops::Range;

use bevy::prelude::*;
use rand::Rng;

use crate::curve::RiverCurve;

#[derive(Resource, Clone, Debug)]
pub struct FlightConfig {
    pub waypoints_per_cycle: usize,
    pub river_altitude: Range<f32>,
    pub terrain_altitude: Range<f32>,
    // Distance from the center line of the over-terrain waypoints.
    pub terrain_offset: Range<f32>,
    pub z_step: f32,
    // Waypoints never leave `[-half_extent, half_extent]` along z.
    pub half_extent: f32,
    pub base_duration: f32,
    pub seconds_per_unit: f32,
    pub hover_chance: f64,
    pub hover_duration: Range<f32>,
    pub hover_lift: f32,
    pub bob_speed: f32,
    pub bob_amplitude: f32,
    pub roll_speed: f32,
    pub roll_amplitude: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            waypoints_per_cycle: 8,
            river_altitude: 2.0..3.0,
            terrain_altitude: 6.0..10.0,
            terrain_offset: 12.0..22.0,
            z_step: 20.0,
            half_extent: 180.0,
            base_duration: 1.5,
            seconds_per_unit: 0.12,
            hover_chance: 0.25,
            hover_duration: 1.0..2.0,
            hover_lift: 0.4,
            bob_speed: 2.0,
            bob_amplitude: 0.3,
            roll_speed: 1.5,
            roll_amplitude: 0.1,
        }
    }
}

impl FlightConfig {
    pub fn transit_duration(&self, distance: f32) -> f32 {
        self.base_duration + distance * self.seconds_per_unit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightPhase {
    Idle,
    Traveling(usize),
    Hovering(usize),
}

#[derive(Debug, Clone, Copy)]
struct Transit {
    from: Vec3,
    to: Vec3,
    from_yaw: f32,
    to_yaw: f32,
    duration: f32,
    elapsed: f32,
}

#[derive(Debug, Clone, Copy)]
struct Hover {
    total: f32,
    left: f32,
}

// Heading for a model whose forward axis is -Z.
pub fn yaw_toward(from: Vec3, to: Vec3) -> Option<f32> {
    let d = to - from;
    if d.x * d.x + d.z * d.z < 1e-8 {
        return None;
    }
    Some((-d.x).atan2(-d.z))
}

// Shortest-arc interpolation between two headings.
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let delta = (to - from + PI).rem_euclid(2.0 * PI) - PI;
    from + delta * t
}

pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

// Builds one cycle starting from `from`. Even waypoints follow the river at low
// altitude, odd ones swing out over the terrain on a random side. The z
// coordinate steps toward the world center.
pub fn generate_waypoints(
    rng: &mut impl Rng,
    curve: &RiverCurve,
    from: Vec3,
    config: &FlightConfig,
) -> Vec<Vec3> {
    let direction = if from.z > 0.0 {
        -1.0
    } else if from.z < 0.0 {
        1.0
    } else if rng.random_bool(0.5) {
        1.0
    } else {
        -1.0
    };

    let mut z = from.z;
    (0..config.waypoints_per_cycle)
        .map(|i| {
            z = (z + direction * config.z_step * rng.random_range(0.8..1.2))
                .clamp(-config.half_extent, config.half_extent);
            if i % 2 == 0 {
                let lateral = rng.random_range(-2.0..2.0);
                curve.position(z, lateral, rng.random_range(config.river_altitude.clone()))
            } else {
                let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                let lateral = side * rng.random_range(config.terrain_offset.clone());
                curve.position(z, lateral, rng.random_range(config.terrain_altitude.clone()))
            }
        })
        .collect()
}

// Flight state for the actor. `tick` advances it; `rendered_transform`
// layers bob, roll and hover lift over the logical pose.
#[derive(Component, Debug, Clone)]
pub struct FlightPlan {
    waypoints: Vec<Vec3>,
    phase: FlightPhase,
    transit: Option<Transit>,
    hover: Option<Hover>,
    position: Vec3,
    yaw: f32,
    cycle: u32,
    transits_this_cycle: usize,
    last_cycle_transits: usize,
}

impl FlightPlan {
    pub fn new(start: Vec3) -> Self {
        Self {
            waypoints: Vec::new(),
            phase: FlightPhase::Idle,
            transit: None,
            hover: None,
            position: start,
            yaw: 0.0,
            cycle: 0,
            transits_this_cycle: 0,
            last_cycle_transits: 0,
        }
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    // Completed cycles plus the one in flight.
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn last_cycle_transits(&self) -> usize {
        self.last_cycle_transits
    }

    pub fn tick(&mut self, dt: f32, rng: &mut impl Rng, curve: &RiverCurve, config: &FlightConfig) {
        match self.phase {
            FlightPhase::Idle => self.begin_cycle(rng, curve, config),
            FlightPhase::Traveling(index) => {
                let Some(transit) = self.transit.as_mut() else {
                    self.begin_transit(index, config);
                    return;
                };
                transit.elapsed += dt;
                let u = (transit.elapsed / transit.duration).min(1.0);
                self.position = transit.from.lerp(transit.to, ease_in_out(u));
                // Turn during the first third, then hold the heading.
                self.yaw = lerp_angle(transit.from_yaw, transit.to_yaw, (u * 3.0).min(1.0));
                // Arrived
                if u >= 1.0 {
                    self.position = transit.to;
                    self.transit = None;
                    self.transits_this_cycle += 1;
                    if rng.random_bool(config.hover_chance) {
                        let total = rng.random_range(config.hover_duration.clone());
                        self.hover = Some(Hover { total, left: total });
                        self.phase = FlightPhase::Hovering(index);
                    } else {
                        self.advance(index, rng, curve, config);
                    }
                }
            }
            FlightPhase::Hovering(index) => {
                let done = match self.hover.as_mut() {
                    Some(hover) => {
                        hover.left -= dt;
                        hover.left <= 0.0
                    }
                    None => true,
                };
                if done {
                    self.hover = None;
                    self.advance(index, rng, curve, config);
                }
            }
        }
    }

    fn begin_cycle(&mut self, rng: &mut impl Rng, curve: &RiverCurve, config: &FlightConfig) {
        // The previous queue is discarded
        self.waypoints = generate_waypoints(rng, curve, self.position, config);
        self.cycle += 1;
        self.transits_this_cycle = 0;
        if self.waypoints.is_empty() {
            return;
        }
        self.begin_transit(0, config);
    }

    fn begin_transit(&mut self, index: usize, config: &FlightConfig) {
        let Some(&to) = self.waypoints.get(index) else {
            self.phase = FlightPhase::Idle;
            return;
        };
        let from = self.position;
        self.transit = Some(Transit {
            from,
            to,
            from_yaw: self.yaw,
            to_yaw: yaw_toward(from, to).unwrap_or(self.yaw),
            duration: config.transit_duration(from.distance(to)),
            elapsed: 0.0,
        });
        self.phase = FlightPhase::Traveling(index);
    }

    fn advance(&mut self, index: usize, rng: &mut impl Rng, curve: &RiverCurve, config: &FlightConfig) {
        if index + 1 < self.waypoints.len() {
            self.begin_transit(index + 1, config);
        } else {
            self.last_cycle_transits = self.transits_this_cycle;
            self.phase = FlightPhase::Idle;
            self.begin_cycle(rng, curve, config);
        }
    }

    // Logical pose plus cosmetic bob, roll and hover lift.
    pub fn rendered_transform(&self, elapsed: f32, config: &FlightConfig) -> Transform {
        let bob = (elapsed * config.bob_speed).sin() * config.bob_amplitude;
        let roll = (elapsed * config.roll_speed).sin() * config.roll_amplitude;
        let lift = self
            .hover
            .map(|h| {
                let u = 1.0 - (h.left / h.total).clamp(0.0, 1.0);
                (PI * u).sin() * config.hover_lift
            })
            .unwrap_or(0.0);
        Transform::from_translation(self.position + Vec3::Y * (bob + lift))
            .with_rotation(Quat::from_rotation_y(self.yaw) * Quat::from_rotation_z(roll))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedural::RandomSource;

    #[test]
    fn test_waypoints_alternate_river_and_terrain() {
        let curve = RiverCurve;
        let config = FlightConfig::default();
        let mut rng = RandomSource::seeded(21);
        let points = generate_waypoints(&mut rng, &curve, Vec3::new(0.0, 3.0, 150.0), &config);
        assert_eq!(points.len(), 8);
        for (i, p) in points.iter().enumerate() {
            let distance = curve.distance(p.x, p.z);
            if i % 2 == 0 {
                assert!(distance <= 2.0 + 1e-3);
                assert!(config.river_altitude.contains(&p.y));
            } else {
                assert!((12.0 - 1e-3..=22.0 + 1e-3).contains(&distance));
                assert!(config.terrain_altitude.contains(&p.y));
            }
            assert!(p.z.abs() <= config.half_extent);
        }
        // Starting at +150 the cycle heads toward the center.
        assert!(points.windows(2).all(|w| w[1].z <= w[0].z));
    }

    #[test]
    fn test_waypoints_clamped_to_world() {
        let config = FlightConfig {
            z_step: 200.0,
            ..default()
        };
        let mut rng = RandomSource::seeded(3);
        let points = generate_waypoints(&mut rng, &RiverCurve, Vec3::new(0.0, 3.0, -10.0), &config);
        assert!(points.iter().all(|p| p.z.abs() <= 180.0));
    }

    #[test]
    fn test_cycle_completes_eight_transits_then_regenerates() {
        let curve = RiverCurve;
        let config = FlightConfig::default();
        let mut rng = RandomSource::seeded(5);
        let mut plan = FlightPlan::new(Vec3::new(0.0, 3.0, 100.0));

        plan.tick(0.0, &mut rng, &curve, &config);
        assert_eq!(plan.cycle(), 1);
        assert_eq!(plan.phase(), FlightPhase::Traveling(0));
        let first_cycle = plan.waypoints().to_vec();

        let mut steps = 0;
        while plan.cycle() < 2 {
            plan.tick(0.05, &mut rng, &curve, &config);
            steps += 1;
            assert!(steps < 100_000, "flight never finished its cycle");
        }

        assert_eq!(plan.last_cycle_transits(), 8);
        assert_eq!(plan.phase(), FlightPhase::Traveling(0));
        assert_eq!(plan.waypoints().len(), 8);
        assert_ne!(plan.waypoints(), first_cycle.as_slice());
        // The new cycle starts where the old one ended.
        assert_eq!(plan.position(), first_cycle[7]);
    }

    #[test]
    fn test_yaw_faces_next_waypoint_after_first_third() {
        let curve = RiverCurve;
        let config = FlightConfig {
            hover_chance: 0.0,
            ..default()
        };
        let mut rng = RandomSource::seeded(9);
        let mut plan = FlightPlan::new(Vec3::new(0.0, 3.0, 60.0));
        plan.tick(0.0, &mut rng, &curve, &config);
        let target = plan.waypoints()[0];
        let start = plan.position();
        let duration = config.transit_duration(start.distance(target));

        plan.tick(duration * 0.5, &mut rng, &curve, &config);
        let expected = yaw_toward(start, target).unwrap_or_default();
        let diff = (plan.yaw() - expected + PI).rem_euclid(2.0 * PI) - PI;
        assert!(diff.abs() < 1e-4);
    }

    #[test]
    fn test_transit_duration_grows_with_distance() {
        let config = FlightConfig::default();
        assert_eq!(config.transit_duration(0.0), 1.5);
        assert!((config.transit_duration(10.0) - 2.7).abs() < 1e-5);
    }

    #[test]
    fn test_bob_and_roll_stay_off_the_logical_pose() {
        let config = FlightConfig::default();
        let plan = FlightPlan::new(Vec3::new(1.0, 4.0, 2.0));
        for t in [0.3, 1.1, 7.9] {
            let rendered = plan.rendered_transform(t, &config);
            assert!((rendered.translation.y - 4.0).abs() <= 0.3 + 1e-5);
            assert_eq!(plan.position(), Vec3::new(1.0, 4.0, 2.0));
        }
    }

    #[test]
    fn test_lerp_angle_takes_short_way() {
        let a = lerp_angle(PI - 0.1, -PI + 0.1, 0.5);
        assert!((a.abs() - PI).abs() < 1e-4);
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
    }
}

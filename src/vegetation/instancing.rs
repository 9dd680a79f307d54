//! Per-feature grass instance batches and the bounded wind pass over them.

use std::ops::Range;

use bevy::prelude::*;
use rand::Rng;

use crate::procedural::{disk_sample, TerrainFeature};

// Placement and rest pose of one grass blade, relative to its feature root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrassInstance {
    pub offset: Vec3,
    // World-space x/z, used as the wind phase.
    pub world: Vec2,
    pub yaw: f32,
    // Rest lean around x and z.
    pub lean: Vec2,
    pub height: f32,
    pub width: f32,
}

impl GrassInstance {
    fn rotation(&self, sway: f32) -> Quat {
        Quat::from_rotation_y(self.yaw)
            * Quat::from_rotation_x(self.lean.x)
            * Quat::from_rotation_z(self.lean.y + sway)
    }

    pub fn rest_transform(&self) -> Transform {
        self.swayed_transform(0.0)
    }

    pub fn swayed_transform(&self, sway: f32) -> Transform {
        Transform::from_translation(self.offset)
            .with_rotation(self.rotation(sway))
            .with_scale(Vec3::new(self.width, self.height, self.width))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WindParams {
    pub speed: f32,
    pub strength: f32,
}

// `sin(t * speed + x * 0.35 + z * 0.25) * strength`.
pub fn wind_tilt(elapsed: f32, world: Vec2, wind: &WindParams) -> f32 {
    (elapsed * wind.speed + world.x * 0.35 + world.y * 0.25).sin() * wind.strength
}

#[derive(Debug, Clone)]
pub struct GrassRanges {
    pub height: Range<f32>,
    pub width: Range<f32>,
    pub max_lean: f32,
}

// `floor(size^2 * density)`.
pub fn grass_count(feature: &TerrainFeature, interior_density: f32, bank_density: f32) -> usize {
    let density = if feature.kind.is_riverbank() {
        bank_density
    } else {
        interior_density
    };
    (feature.size * feature.size * density).floor() as usize
}

pub fn scatter_grass(
    rng: &mut impl Rng,
    feature: &TerrainFeature,
    count: usize,
    ranges: &GrassRanges,
) -> Vec<GrassInstance> {
    (0..count)
        .map(|_| {
            let offset = feature.surface_point(disk_sample(rng, 1.0));
            let world = feature.position + offset;
            GrassInstance {
                offset,
                world: Vec2::new(world.x, world.z),
                yaw: rng.random_range(0.0..std::f32::consts::TAU),
                lean: Vec2::new(
                    rng.random_range(-ranges.max_lean..=ranges.max_lean),
                    rng.random_range(-ranges.max_lean..=ranges.max_lean),
                ),
                height: rng.random_range(ranges.height.clone()),
                width: rng.random_range(ranges.width.clone()),
            }
        })
        .collect()
}

// Fixed-size batch of blade transforms. The count is set at construction and
// only transform values change afterwards.
#[derive(Debug, Clone)]
pub struct InstanceBuffer {
    instances: Vec<GrassInstance>,
    transforms: Vec<Transform>,
    // Palette index per instance, present only with per-instance color.
    colors: Option<Vec<usize>>,
    cursor: usize,
}

impl InstanceBuffer {
    pub fn new(instances: Vec<GrassInstance>) -> Self {
        let transforms = instances.iter().map(GrassInstance::rest_transform).collect();
        Self {
            instances,
            transforms,
            colors: None,
            cursor: 0,
        }
    }

    pub fn with_colors(mut self, rng: &mut impl Rng, palette_len: usize) -> Self {
        if palette_len > 0 {
            let colors = (0..self.instances.len())
                .map(|_| rng.random_range(0..palette_len))
                .collect();
            self.colors = Some(colors);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn transform(&self, index: usize) -> Option<&Transform> {
        self.transforms.get(index)
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn color_index(&self, index: usize) -> Option<usize> {
        self.colors.as_ref().and_then(|c| c.get(index).copied())
    }

    // Re-derives the sway of the next `max` instances (round robin) and
    // returns the touched indices.
    pub fn sway_next(&mut self, max: usize, elapsed: f32, wind: &WindParams) -> Vec<usize> {
        let len = self.instances.len();
        if len == 0 || max == 0 {
            return Vec::new();
        }
        let touched: Vec<usize> = (0..max.min(len)).map(|i| (self.cursor + i) % len).collect();
        for &index in &touched {
            let instance = &self.instances[index];
            self.transforms[index] = instance.swayed_transform(wind_tilt(elapsed, instance.world, wind));
        }
        self.cursor = (self.cursor + touched.len()) % len;
        touched
    }
}

// Round-robin window of at most `max` items out of `len`, starting at `start`.
pub fn wind_window(start: usize, len: usize, max: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    (0..max.min(len)).map(|i| (start + i) % len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedural::{FeatureKind, RandomSource};

    fn feature(kind: FeatureKind, size: f32) -> TerrainFeature {
        TerrainFeature {
            kind,
            position: Vec3::new(40.0, 0.0, -12.0),
            size,
            scale: Vec3::new(size * 4.0, 2.0, size * 3.0),
            yaw: 0.7,
            color: Color::WHITE,
            has_marker: false,
            grass_patch: None,
            vegetation: Vec::new(),
        }
    }

    fn ranges() -> GrassRanges {
        GrassRanges {
            height: 0.35..0.7,
            width: 0.08..0.16,
            max_lean: 0.12,
        }
    }

    fn wind() -> WindParams {
        WindParams {
            speed: 1.8,
            strength: 0.18,
        }
    }

    #[test]
    fn test_grass_count_uses_bank_density() {
        assert_eq!(grass_count(&feature(FeatureKind::Hill, 1.5), 50.0, 80.0), 112);
        assert_eq!(grass_count(&feature(FeatureKind::Bank, 1.5), 50.0, 80.0), 180);
        assert_eq!(grass_count(&feature(FeatureKind::Rock, 0.1), 50.0, 80.0), 0);
    }

    #[test]
    fn test_scatter_stays_on_footprint() {
        let feature = feature(FeatureKind::Mound, 1.2);
        let mut rng = RandomSource::seeded(8);
        let blades = scatter_grass(&mut rng, &feature, 300, &ranges());
        assert_eq!(blades.len(), 300);
        for blade in &blades {
            let local = feature.rotation().inverse() * blade.offset;
            let r = (local.x / feature.scale.x).powi(2) + (local.z / feature.scale.z).powi(2);
            assert!(r <= 0.9 * 0.9 + 1e-4);
            assert!(blade.offset.y >= 0.0 && blade.offset.y <= feature.height() + 1e-4);
            assert!(ranges().height.contains(&blade.height));
        }
    }

    #[test]
    fn test_count_is_invariant_across_wind_frames() {
        let feature = feature(FeatureKind::Bank, 1.0);
        let mut rng = RandomSource::seeded(2);
        let mut buffer = InstanceBuffer::new(scatter_grass(&mut rng, &feature, 80, &ranges()));
        for frame in 0..500 {
            let before = buffer.transforms().to_vec();
            let touched = buffer.sway_next(15, frame as f32 / 60.0, &wind());
            assert_eq!(buffer.len(), 80);
            assert!(touched.len() <= 15);
            for (i, (old, new)) in before.iter().zip(buffer.transforms()).enumerate() {
                if !touched.contains(&i) {
                    assert_eq!(old, new);
                }
            }
        }
    }

    #[test]
    fn test_sway_round_robin_covers_every_blade() {
        let feature = feature(FeatureKind::Hill, 1.0);
        let mut rng = RandomSource::seeded(3);
        let mut buffer = InstanceBuffer::new(scatter_grass(&mut rng, &feature, 40, &ranges()));
        let mut seen = vec![false; 40];
        for _ in 0..3 {
            for i in buffer.sway_next(15, 1.0, &wind()) {
                seen[i] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_sway_keeps_translation_and_scale() {
        let feature = feature(FeatureKind::Hill, 1.0);
        let mut rng = RandomSource::seeded(5);
        let mut buffer = InstanceBuffer::new(scatter_grass(&mut rng, &feature, 10, &ranges()));
        let rest = buffer.transforms().to_vec();
        buffer.sway_next(10, 2.5, &wind());
        for (a, b) in rest.iter().zip(buffer.transforms()) {
            assert_eq!(a.translation, b.translation);
            assert_eq!(a.scale, b.scale);
        }
    }

    #[test]
    fn test_wind_tilt_bounded_by_strength() {
        for t in 0..100 {
            let tilt = wind_tilt(t as f32 * 0.37, Vec2::new(12.0, -40.0), &wind());
            assert!(tilt.abs() <= 0.18 + 1e-6);
        }
    }

    #[test]
    fn test_colors_only_with_palette() {
        let mut rng = RandomSource::seeded(1);
        let blades = scatter_grass(&mut rng, &feature(FeatureKind::Hill, 1.0), 20, &ranges());
        let plain = InstanceBuffer::new(blades.clone()).with_colors(&mut rng, 0);
        assert_eq!(plain.color_index(0), None);
        let tinted = InstanceBuffer::new(blades).with_colors(&mut rng, 4);
        assert!((0..20).all(|i| tinted.color_index(i).is_some_and(|c| c < 4)));
    }

    #[test]
    fn test_wind_window_wraps() {
        assert_eq!(wind_window(3, 5, 5), vec![3, 4, 0, 1, 2]);
        assert_eq!(wind_window(0, 2, 5), vec![0, 1]);
        assert!(wind_window(0, 0, 5).is_empty());
    }
}

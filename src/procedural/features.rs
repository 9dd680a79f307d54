use std::ops::RangeInclusive;

use bevy::prelude::*;
use rand::Rng;

use crate::curve::RiverCurve;

// World radius of a feature footprint per unit of `size`.
pub const FOOTPRINT_PER_SIZE: f32 = 4.0;

// Fraction of the footprint radius that placements may use.
pub const FOOTPRINT_FILL: f32 = 0.9;

// Decorative plants per unit of feature size.
pub const FLORA_PER_SIZE: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Hill,
    Rock,
    Mound,
    // Terrain-like riverbank segment built by the river system.
    Bank,
}

impl FeatureKind {
    // Base (hue, saturation, lightness) the per-feature color is perturbed around.
    fn base_hsl(self) -> (f32, f32, f32) {
        match self {
            FeatureKind::Hill => (105.0, 0.45, 0.38),
            FeatureKind::Mound => (90.0, 0.40, 0.42),
            FeatureKind::Rock => (35.0, 0.12, 0.45),
            FeatureKind::Bank => (75.0, 0.35, 0.40),
        }
    }

    pub fn is_riverbank(self) -> bool {
        self == FeatureKind::Bank
    }

    fn pick(rng: &mut impl Rng) -> Self {
        match rng.random_range(0..100) {
            0..45 => FeatureKind::Hill,
            45..80 => FeatureKind::Mound,
            _ => FeatureKind::Rock,
        }
    }
}

// A placed landform. Geometry is a dome of radii `scale.x`/`scale.z` and
// height `scale.y`, turned by `yaw` around its base center `position`.
#[derive(Debug, Clone)]
pub struct TerrainFeature {
    pub kind: FeatureKind,
    pub position: Vec3,
    // Footprint size in feature units; drives grass and flora counts.
    pub size: f32,
    pub scale: Vec3,
    pub yaw: f32,
    pub color: Color,
    pub has_marker: bool,
    pub grass_patch: Option<Entity>,
    pub vegetation: Vec<Entity>,
}

impl TerrainFeature {
    pub fn height(&self) -> f32 {
        self.scale.y
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    // Point on the dome, relative to `position`, for a sample in the unit disk.
    pub fn surface_point(&self, unit: Vec2) -> Vec3 {
        let local = Vec3::new(
            unit.x * self.scale.x,
            dome_height(self.scale.y, unit.length()),
            unit.y * self.scale.z,
        );
        self.rotation() * local
    }

    pub fn summit(&self) -> Vec3 {
        self.position + Vec3::Y * self.scale.y
    }
}

// Placement rules for one terrain cell.
#[derive(Debug, Clone)]
pub struct FeatureRules {
    pub cell_size: f32,
    pub features_per_cell: RangeInclusive<u32>,
    // `river_width / 2 + margin`.
    pub river_buffer: f32,
    pub marker_chance: f64,
    pub size_range: RangeInclusive<f32>,
    pub height_range: RangeInclusive<f32>,
}

impl Default for FeatureRules {
    fn default() -> Self {
        Self {
            cell_size: 24.0,
            features_per_cell: 3..=6,
            river_buffer: 10.0,
            marker_chance: 0.3,
            size_range: 0.8..=1.6,
            height_range: 1.2..=3.5,
        }
    }
}

// Dome profile `h * sqrt(1 - r^2)` for a normalized radius.
pub fn dome_height(height: f32, r: f32) -> f32 {
    height * (1.0 - r * r).max(0.0).sqrt()
}

// Uniform areal sample of a disk: `r = sqrt(u) * radius * 0.9`.
pub fn disk_sample(rng: &mut impl Rng, radius: f32) -> Vec2 {
    let r = rng.random::<f32>().sqrt() * radius * FOOTPRINT_FILL;
    let theta = rng.random_range(0.0..std::f32::consts::TAU);
    Vec2::new(theta.cos() * r, theta.sin() * r)
}

pub fn perturbed_color(rng: &mut impl Rng, kind: FeatureKind) -> Color {
    let (h, s, l) = kind.base_hsl();
    Color::hsl(
        (h + rng.random_range(-12.0..12.0)).rem_euclid(360.0),
        (s + rng.random_range(-0.06..0.06)).clamp(0.0, 1.0),
        (l + rng.random_range(-0.06..0.06)).clamp(0.0, 1.0),
    )
}

// Number of decorative plants a feature carries; linear in its size.
pub fn vegetation_count(size: f32) -> usize {
    (size.max(0.0) * FLORA_PER_SIZE).floor() as usize
}

// Rolls 3-6 candidates inside the cell. Candidates inside the river buffer are
// dropped, not retried, so cells near the water come out sparser.
pub fn generate_cell_features(
    grid_x: i32,
    grid_z: i32,
    rng: &mut impl Rng,
    curve: &RiverCurve,
    rules: &FeatureRules,
) -> Vec<TerrainFeature> {
    let center = Vec2::new(grid_x as f32, grid_z as f32) * rules.cell_size;
    let spread = rules.cell_size * 0.4;
    let candidates = rng.random_range(rules.features_per_cell.clone());

    let mut features = Vec::with_capacity(candidates as usize);
    for _ in 0..candidates {
        // All draws happen before the river check
        let x = center.x + rng.random_range(-spread..=spread);
        let z = center.y + rng.random_range(-spread..=spread);
        let kind = FeatureKind::pick(rng);
        let size = rng.random_range(rules.size_range.clone());
        let mut height = rng.random_range(rules.height_range.clone());
        let mut radius = size * FOOTPRINT_PER_SIZE;
        // Rocks are narrower and steeper
        if kind == FeatureKind::Rock {
            radius *= 0.6;
            height *= 1.2;
        }
        let scale = Vec3::new(
            radius * rng.random_range(0.8..1.2),
            height,
            radius * rng.random_range(0.8..1.2),
        );
        let yaw = rng.random_range(0.0..std::f32::consts::TAU);
        let color = perturbed_color(rng, kind);
        let has_marker = rng.random_bool(rules.marker_chance);

        // Too close to the water: dropped, not retried
        if curve.distance(x, z) < rules.river_buffer {
            continue;
        }

        features.push(TerrainFeature {
            kind,
            position: Vec3::new(x, 0.0, z),
            size,
            scale,
            yaw,
            color,
            has_marker,
            grass_patch: None,
            vegetation: Vec::new(),
        });
    }
    features
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloraKind {
    Bush,
    Flower,
}

#[derive(Debug, Clone, Copy)]
pub struct FloraPlacement {
    pub kind: FloraKind,
    // Relative to the feature's base center.
    pub offset: Vec3,
    pub scale: f32,
    pub yaw: f32,
}

pub fn scatter_flora(rng: &mut impl Rng, feature: &TerrainFeature) -> Vec<FloraPlacement> {
    (0..vegetation_count(feature.size))
        .map(|_| {
            let kind = if rng.random_bool(0.6) {
                FloraKind::Bush
            } else {
                FloraKind::Flower
            };
            let scale = match kind {
                FloraKind::Bush => rng.random_range(0.35..0.7),
                FloraKind::Flower => rng.random_range(0.2..0.35),
            };
            FloraPlacement {
                kind,
                offset: feature.surface_point(disk_sample(rng, 1.0)),
                scale,
                yaw: rng.random_range(0.0..std::f32::consts::TAU),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedural::RandomSource;

    #[test]
    fn test_disk_sample_stays_inside_fill_radius() {
        let mut rng = RandomSource::seeded(11);
        for _ in 0..2000 {
            let p = disk_sample(&mut rng, 5.0);
            assert!(p.length() <= 5.0 * FOOTPRINT_FILL + 1e-4);
        }
    }

    #[test]
    fn test_disk_sample_is_areal_uniform() {
        // Half the area of the fill disk lies inside radius R / sqrt(2).
        let mut rng = RandomSource::seeded(12);
        let n = 20_000;
        let inner = (0..n)
            .filter(|_| disk_sample(&mut rng, 1.0).length() < FOOTPRINT_FILL / 2f32.sqrt())
            .count();
        let ratio = inner as f32 / n as f32;
        assert!((ratio - 0.5).abs() < 0.03, "ratio {ratio}");
    }

    #[test]
    fn test_dome_height_profile() {
        assert_eq!(dome_height(3.0, 0.0), 3.0);
        assert_eq!(dome_height(3.0, 1.0), 0.0);
        assert_eq!(dome_height(3.0, 1.5), 0.0);
        assert!(dome_height(3.0, 0.5) < 3.0);
    }

    #[test]
    fn test_vegetation_count_is_linear_in_size() {
        assert_eq!(vegetation_count(0.0), 0);
        assert_eq!(vegetation_count(1.0), 3);
        assert_eq!(vegetation_count(2.0), 6);
        assert!(vegetation_count(1.6) >= vegetation_count(0.8));
    }

    #[test]
    fn test_cell_features_respect_river_buffer() {
        let curve = RiverCurve;
        let rules = FeatureRules::default();
        for gx in -3..=3 {
            for gz in -3..=3 {
                let mut rng = RandomSource::seeded((gx * 31 + gz) as u64);
                for f in generate_cell_features(gx, gz, &mut rng, &curve, &rules) {
                    assert!(curve.distance(f.position.x, f.position.z) >= rules.river_buffer);
                }
            }
        }
    }

    #[test]
    fn test_cell_features_far_from_river_are_all_kept() {
        let curve = RiverCurve;
        let rules = FeatureRules::default();
        let mut rng = RandomSource::seeded(99);
        let features = generate_cell_features(5, -2, &mut rng, &curve, &rules);
        assert!(rules.features_per_cell.contains(&(features.len() as u32)));
        for f in &features {
            assert!(f.scale.x > 0.0 && f.scale.y > 0.0 && f.scale.z > 0.0);
            assert!((f.position.x - 5.0 * rules.cell_size).abs() <= rules.cell_size * 0.5);
        }
    }

    #[test]
    fn test_flora_sits_on_the_dome() {
        let mut rng = RandomSource::seeded(3);
        let rules = FeatureRules::default();
        let features = generate_cell_features(4, 4, &mut rng, &RiverCurve, &rules);
        let feature = &features[0];
        let flora = scatter_flora(&mut rng, feature);
        assert_eq!(flora.len(), vegetation_count(feature.size));
        for plant in flora {
            assert!(plant.offset.y >= 0.0 && plant.offset.y <= feature.height() + 1e-4);
        }
    }
}

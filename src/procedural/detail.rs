use bevy::prelude::*;
use rand::Rng;

use super::features::{perturbed_color, FeatureKind, TerrainFeature, FOOTPRINT_PER_SIZE};
use crate::curve::RiverCurve;

// Which side of the river a bank segment sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankSide {
    Left,
    Right,
}

impl BankSide {
    pub const BOTH: [BankSide; 2] = [BankSide::Left, BankSide::Right];

    pub fn sign(self) -> f32 {
        match self {
            BankSide::Left => -1.0,
            BankSide::Right => 1.0,
        }
    }
}

// Shape of the river a bank pass works against.
#[derive(Debug, Clone, Copy)]
pub struct BankLayout {
    pub half_width: f32,
    pub bank_width: f32,
    pub segment_length: f32,
    pub water_level: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailKind {
    Sand,
    Mud,
    Pebble,
    Reed,
    LilyPad,
}

#[derive(Debug, Clone, Copy)]
pub struct BankDetail {
    pub kind: DetailKind,
    pub position: Vec3,
    pub scale: Vec3,
    pub yaw: f32,
}

// A short terrain-like segment hugging the water at `z`.
pub fn bank_segment(
    rng: &mut impl Rng,
    curve: &RiverCurve,
    z: f32,
    side: BankSide,
    layout: &BankLayout,
) -> TerrainFeature {
    let lateral = side.sign() * (layout.half_width + layout.bank_width * 0.5);
    let tangent = curve.tangent(z);
    let scale = Vec3::new(
        layout.bank_width * 0.5 * rng.random_range(1.0..1.3),
        rng.random_range(0.6..1.2),
        layout.segment_length * rng.random_range(0.6..0.8),
    );
    TerrainFeature {
        kind: FeatureKind::Bank,
        position: curve.position(z, lateral, 0.0),
        size: (scale.x + scale.z) * 0.5 / FOOTPRINT_PER_SIZE,
        scale,
        yaw: tangent.x.atan2(tangent.z),
        color: perturbed_color(rng, FeatureKind::Bank),
        has_marker: false,
        grass_patch: None,
        vegetation: Vec::new(),
    }
}

// Sand, mud, pebbles and reeds land on the bank, squared toward the water
// edge; lily pads float just inside it.
pub fn scatter_bank_detail(
    rng: &mut impl Rng,
    curve: &RiverCurve,
    z: f32,
    side: BankSide,
    layout: &BankLayout,
) -> Vec<BankDetail> {
    let count = rng.random_range(1..=4);
    (0..count)
        .map(|_| {
            let kind = match rng.random_range(0..100) {
                0..25 => DetailKind::Pebble,
                25..45 => DetailKind::Sand,
                45..60 => DetailKind::Mud,
                60..82 => DetailKind::Reed,
                _ => DetailKind::LilyPad,
            };
            let dz = rng.random_range(-0.5..0.5) * layout.segment_length;
            let item_z = z + dz;
            let (distance, y, scale) = match kind {
                DetailKind::LilyPad => (
                    layout.half_width - rng.random_range(0.5..2.5),
                    layout.water_level + 0.02,
                    Vec3::new(0.6, 0.02, 0.6) * rng.random_range(0.7..1.3),
                ),
                _ => {
                    let u: f32 = rng.random();
                    let distance = layout.half_width + u * u * layout.bank_width * 0.8;
                    let scale = match kind {
                        DetailKind::Pebble => Vec3::splat(rng.random_range(0.12..0.3)),
                        DetailKind::Sand => Vec3::new(1.4, 0.03, 1.0) * rng.random_range(0.8..1.5),
                        DetailKind::Mud => Vec3::new(1.1, 0.03, 0.9) * rng.random_range(0.8..1.4),
                        _ => Vec3::new(0.05, rng.random_range(0.9..1.8), 0.05),
                    };
                    (distance, 0.02, scale)
                }
            };
            BankDetail {
                kind,
                position: curve.position(item_z, side.sign() * distance, y),
                scale,
                yaw: rng.random_range(0.0..std::f32::consts::TAU),
            }
        })
        .collect()
}

use bevy::prelude::*;

/// Lateral envelope of the river wander: the sum of the three sine amplitudes.
pub const MAX_OFFSET: f32 = 7.0;

// (amplitude, frequency, phase)
const MEANDER_TERMS: [(f32, f32, f32); 3] = [
    (4.0, 0.05, 0.0),
    (2.0, 0.13, 1.3),
    (1.0, 0.31, 2.1),
];

/// The river center line, `x = offset(z)`.
///
/// Every spatial system (water mesh, banks, terrain avoidance, foam drift and
/// flamingo waypoints) reads the same resource so they all agree on where the
/// water is.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct RiverCurve;

impl RiverCurve {
    pub fn offset(&self, z: f32) -> f32 {
        MEANDER_TERMS
            .iter()
            .map(|&(amplitude, frequency, phase)| (z * frequency + phase).sin() * amplitude)
            .sum()
    }

    /// Lateral distance from `x` to the center line at `z`.
    pub fn distance(&self, x: f32, z: f32) -> f32 {
        (x - self.offset(z)).abs()
    }

    /// World point `lateral` units off the center line.
    pub fn position(&self, z: f32, lateral: f32, y: f32) -> Vec3 {
        Vec3::new(self.offset(z) + lateral, y, z)
    }

    /// Unit tangent of the center line in the XZ plane, pointing toward +z.
    pub fn tangent(&self, z: f32) -> Vec3 {
        let dz = 0.5;
        let dx = self.offset(z + dz) - self.offset(z - dz);
        Vec3::new(dx, 0.0, 2.0 * dz).try_normalize().unwrap_or(Vec3::Z)
    }
}

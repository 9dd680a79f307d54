use bevy::prelude::*;
use rand::Rng;

use crate::curve::RiverCurve;
use crate::procedural::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoamParticle {
    pub z: f32,
    // Offset from the center line, kept between frames so particles drift
    // with the bends instead of snapping to the middle.
    pub lateral: f32,
    pub phase: f32,
}

// Fixed pool of foam flecks flowing toward -z and recycled at the far end.
#[derive(Resource)]
pub struct FoamField {
    particles: Vec<FoamParticle>,
    lower: f32,
    upper: f32,
    half_width: f32,
    surface_y: f32,
    recycled: u64,
    rng: RandomSource,
}

impl FoamField {
    pub fn new(
        count: usize,
        (lower, upper): (f32, f32),
        half_width: f32,
        surface_y: f32,
        mut rng: RandomSource,
    ) -> Self {
        let particles = (0..count)
            .map(|i| FoamParticle {
                z: lower + (i as f32 + rng.random::<f32>()) / count.max(1) as f32 * (upper - lower),
                lateral: rng.random_range(-half_width..=half_width),
                phase: rng.random_range(0.0..std::f32::consts::TAU),
            })
            .collect();
        Self {
            particles,
            lower,
            upper,
            half_width,
            surface_y,
            recycled: 0,
            rng,
        }
    }

    // Moves every particle `step` units downstream. Lateral drift is a slow
    // wobble around the previous offset, clamped to the half-width.
    pub fn advance(&mut self, step: f32, wobble: f32, elapsed: f32) {
        for particle in &mut self.particles {
            particle.z -= step;
            if particle.z < self.lower {
                particle.z = self.upper;
                particle.lateral = self.rng.random_range(-self.half_width..=self.half_width);
                self.recycled += 1;
                continue;
            }
            let drift = (elapsed * 1.3 + particle.phase).sin() * wobble * step;
            particle.lateral = (particle.lateral + drift).clamp(-self.half_width, self.half_width);
        }
    }

    pub fn position(&self, index: usize, curve: &RiverCurve) -> Option<Vec3> {
        self.particles
            .get(index)
            .map(|p| curve.position(p.z, p.lateral, self.surface_y))
    }

    pub fn particles(&self) -> &[FoamParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn recycled(&self) -> u64 {
        self.recycled
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }
}

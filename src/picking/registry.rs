use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::prelude::*;

use super::topics::TopicDescriptor;

#[derive(Debug, Clone)]
pub struct MarkerEntry {
    pub flag: Entity,
    pub hit_box: Aabb3d,
    pub topic: TopicDescriptor,
}

/// Flat list of clickable flags. Picking tests only these boxes, never the
/// rest of the scene.
#[derive(Resource, Default, Debug)]
pub struct MarkerRegistry {
    markers: Vec<MarkerEntry>,
}

impl MarkerRegistry {
    pub fn register(&mut self, flag: Entity, hit_box: Aabb3d, topic: TopicDescriptor) {
        self.markers.push(MarkerEntry {
            flag,
            hit_box,
            topic,
        });
    }

    /// Nearest marker whose hit box the ray enters within `max_distance`.
    pub fn pick(&self, ray: Ray3d, max_distance: f32) -> Option<&MarkerEntry> {
        let cast = RayCast3d::from_ray(ray, max_distance);
        self.markers
            .iter()
            .filter_map(|marker| {
                cast.aabb_intersection_at(&marker.hit_box)
                    .map(|distance| (distance, marker))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, marker)| marker)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Window coordinates (origin top-left, y down) to NDC (origin center, y up).
pub fn ndc_from_screen(cursor: Vec2, viewport: Vec2) -> Option<Vec2> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        cursor.x / viewport.x * 2.0 - 1.0,
        1.0 - cursor.y / viewport.y * 2.0,
    ))
}

/// Ray from the near plane through `ndc` toward the far plane. Bevy's reverse-z
/// puts the near plane at depth 1.
pub fn ray_from_ndc(camera: &Camera, camera_transform: &GlobalTransform, ndc: Vec2) -> Option<Ray3d> {
    let near = camera.ndc_to_world(camera_transform, ndc.extend(1.0))?;
    let far = camera.ndc_to_world(camera_transform, ndc.extend(f32::EPSILON))?;
    let direction = Dir3::new(far - near).ok()?;
    Some(Ray3d {
        origin: near,
        direction,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct MarkerShape {
    pub pole_height: f32,
    pub pole_radius: f32,
    pub flag_size: Vec3,
    /// Extra margin around the flag for the hit box.
    pub hit_padding: f32,
}

impl Default for MarkerShape {
    fn default() -> Self {
        Self {
            pole_height: 2.2,
            pole_radius: 0.05,
            flag_size: Vec3::new(0.9, 0.55, 0.04),
            hit_padding: 0.1,
        }
    }
}

impl MarkerShape {
    /// Flag center relative to the pole base: hung off the top of the pole
    /// toward +x.
    pub fn flag_offset(&self) -> Vec3 {
        Vec3::new(
            self.flag_size.x * 0.5 + self.pole_radius,
            self.pole_height - self.flag_size.y * 0.5,
            0.0,
        )
    }

    pub fn hit_box(&self, base: Vec3) -> Aabb3d {
        Aabb3d::new(
            base + self.flag_offset(),
            self.flag_size * 0.5 + Vec3::splat(self.hit_padding),
        )
    }
}

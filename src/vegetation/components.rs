use bevy::prelude::*;

use super::instancing::InstanceBuffer;
use crate::procedural::FloraKind;

// Where a patch's feature lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureRef {
    Cell { grid_x: i32, grid_z: i32, index: usize },
    Bank(usize),
}

#[derive(Component)]
pub struct GrassPatch {
    pub feature: FeatureRef,
    pub buffer: InstanceBuffer,
    // Blade entity per instance, same order as the buffer.
    pub blades: Vec<Entity>,
}

#[derive(Component)]
pub struct GrassBlade(pub usize);

#[derive(Component)]
pub struct VegetationItem(pub FloraKind);

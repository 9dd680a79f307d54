use bevy::prelude::*;

use crate::procedural::DetailKind;

#[derive(Component)]
pub struct RiverWater;

#[derive(Component)]
pub struct RiverBank {
    pub segment: usize,
}

#[derive(Component)]
pub struct BankDetailItem(pub DetailKind);

// Render proxy for one entry of the foam field.
#[derive(Component)]
pub struct FoamSprite(pub usize);

// Placeholder that receives the decorative scene once it has loaded.
#[derive(Component)]
pub struct Decor;

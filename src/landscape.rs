//! Read access to the named collections that make up the generated world.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::picking::MarkerRegistry;
use crate::river::{FoamField, RiverBanks};
use crate::terrain::TerrainGrid;
use crate::vegetation::{VegetationStats, WindState};

/// Cells, banks, markers, foam and vegetation in one system parameter.
#[derive(SystemParam)]
pub struct Landscape<'w> {
    pub grid: Res<'w, TerrainGrid>,
    pub banks: Res<'w, RiverBanks>,
    pub markers: Res<'w, MarkerRegistry>,
    pub foam: Option<Res<'w, FoamField>>,
    pub vegetation: Res<'w, VegetationStats>,
    pub wind: Res<'w, WindState>,
}

impl Landscape<'_> {
    pub fn summary(&self) -> LandscapeSummary {
        LandscapeSummary::collect(
            &self.grid,
            &self.banks,
            &self.markers,
            self.foam.as_deref(),
            &self.vegetation,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LandscapeSummary {
    pub cells: usize,
    pub blocked_cells: usize,
    pub features: usize,
    pub marked_features: usize,
    pub bank_segments: usize,
    pub bank_details: usize,
    pub grass_patches: usize,
    pub grass_blades: usize,
    pub flora: usize,
    pub markers: usize,
    pub foam_particles: usize,
    pub foam_recycled: u64,
}

impl LandscapeSummary {
    pub fn collect(
        grid: &TerrainGrid,
        banks: &RiverBanks,
        markers: &MarkerRegistry,
        foam: Option<&FoamField>,
        vegetation: &VegetationStats,
    ) -> Self {
        Self {
            cells: grid.len(),
            blocked_cells: grid.blocked_count(),
            features: grid.feature_count(),
            marked_features: grid.features().filter(|f| f.has_marker).count(),
            bank_segments: banks.segments.len(),
            bank_details: banks.detail_items,
            grass_patches: vegetation.patches,
            grass_blades: vegetation.blades,
            flora: vegetation.flora,
            markers: markers.len(),
            foam_particles: foam.map(FoamField::len).unwrap_or_default(),
            foam_recycled: foam.map(FoamField::recycled).unwrap_or_default(),
        }
    }
}

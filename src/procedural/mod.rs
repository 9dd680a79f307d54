//! Seeded and ambient procedural placement: terrain features per cell,
//! decorative flora, riverbank segments and bank detail.

pub mod detail;
pub mod features;
pub mod rng;

pub use detail::{bank_segment, scatter_bank_detail, BankDetail, BankLayout, BankSide, DetailKind};
pub use features::{
    disk_sample, dome_height, generate_cell_features, scatter_flora, vegetation_count,
    FeatureKind, FeatureRules, FloraKind, FloraPlacement, TerrainFeature,
};
pub use rng::{cell_seed, RandomSource};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

// One random interface with two capabilities.
//
// Terrain cells draw from a seeded sequence so a cell always looks the same for
// a given coordinate; detail passes (bank decoration, foam, flight paths) use
// ambient randomness.
#[derive(Clone, Debug)]
pub enum RandomSource {
    Seeded(StdRng),
    Ambient(StdRng),
}

impl RandomSource {
    pub fn seeded(seed: u64) -> Self {
        Self::Seeded(StdRng::seed_from_u64(seed))
    }

    pub fn ambient() -> Self {
        Self::Ambient(StdRng::from_os_rng())
    }

    fn inner(&mut self) -> &mut StdRng {
        match self {
            Self::Seeded(rng) | Self::Ambient(rng) => rng,
        }
    }
}

impl RngCore for RandomSource {
    fn next_u32(&mut self) -> u32 {
        self.inner().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner().next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.inner().fill_bytes(dst)
    }
}

// Spatial hash of grid coordinates, mixed with the world seed.
pub fn cell_seed(grid_x: i32, grid_z: i32, world_seed: u64) -> u64 {
    let x = (grid_x as i64 as u64).wrapping_mul(73_856_093);
    let z = (grid_z as i64 as u64).wrapping_mul(19_349_663);
    let mut h = x ^ z ^ world_seed.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    // splitmix64 finalizer
    h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}

//! Where point sources go relative to the image centre.

use std::f64::consts::SQRT_2;

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    constants::{RANDOM_SOURCE_INSIDE_STEPS, RANDOM_SOURCE_REGION_STEPS},
    coords::Offset,
};

/// The region point sources are scattered over. Offsets lie on the diamond
/// `|ΔRA| + |ΔDEC| = l1_radius_arcsec`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetRegion {
    pub l1_radius_arcsec: f64,
}

impl OffsetRegion {
    /// The region for point sources sprinkled over an extended source
    /// `angular_size_arcmin` across.
    ///
    /// A diamond through the corners of the square inscribed in the halo has
    /// an L1 radius of `√2 r`; stretching it by 47/44 puts a few sources just
    /// outside the halo.
    pub fn around_extended(angular_size_arcmin: f64) -> OffsetRegion {
        let radius_arcsec = angular_size_arcmin * 60.0 / 2.0;
        OffsetRegion {
            l1_radius_arcsec: SQRT_2 * radius_arcsec * f64::from(RANDOM_SOURCE_REGION_STEPS)
                / f64::from(RANDOM_SOURCE_INSIDE_STEPS),
        }
    }
}

/// Something that decides point-source offsets. Inject one into
/// [`SourceModelBuilder::build`](super::SourceModelBuilder::build) to control
/// placement.
pub trait OffsetGenerator {
    /// Produce at most `count` offsets within `region`.
    fn offsets(&mut self, count: usize, region: &OffsetRegion) -> Vec<Offset>;
}

/// Random offsets on the region's edge.
///
/// `count` points are drawn along one edge of the diamond (quantised into
/// [RANDOM_SOURCE_REGION_STEPS] steps), reflected into all four quadrants,
/// and `count` of the reflections are kept.
pub struct RandomOffsets<R: Rng = ChaCha8Rng> {
    rng: R,
}

impl RandomOffsets<ChaCha8Rng> {
    /// A reproducible generator.
    pub fn from_seed(seed: u64) -> RandomOffsets<ChaCha8Rng> {
        RandomOffsets {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomOffsets<R> {
    pub fn new(rng: R) -> RandomOffsets<R> {
        RandomOffsets { rng }
    }
}

impl<R: Rng> OffsetGenerator for RandomOffsets<R> {
    fn offsets(&mut self, count: usize, region: &OffsetRegion) -> Vec<Offset> {
        let steps = RANDOM_SOURCE_REGION_STEPS;
        let l1 = region.l1_radius_arcsec;
        let rng = &mut self.rng;

        let candidates: Vec<Offset> = (0..count)
            .flat_map(|_| {
                let step = rng.gen_range(1..steps);
                let d_ra = l1 * f64::from(step) / f64::from(steps);
                let d_dec = l1 - d_ra;
                [(1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (-1.0, 1.0)].map(|(s_ra, s_dec)| Offset {
                    ra_arcsec: s_ra * d_ra,
                    dec_arcsec: s_dec * d_dec,
                })
            })
            .collect();

        candidates.choose_multiple(rng, count).copied().collect()
    }
}

/// Offsets chosen ahead of time. Hands out the first `count` of them.
#[derive(Debug, Clone, Default)]
pub struct FixedOffsets(pub Vec<Offset>);

impl OffsetGenerator for FixedOffsets {
    fn offsets(&mut self, count: usize, _region: &OffsetRegion) -> Vec<Offset> {
        self.0.iter().take(count).copied().collect()
    }
}

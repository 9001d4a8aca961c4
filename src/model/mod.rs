//! Per-redshift sky models.
//!
//! A source of fixed linear size and reference flux density is "moved" to each
//! requested redshift; the cosmology decides how big and how bright it looks.

pub mod offsets;
#[cfg(test)]
mod tests;

pub use offsets::{FixedOffsets, OffsetGenerator, OffsetRegion, RandomOffsets};

use rayon::prelude::*;
use vec1::Vec1;

use crate::{
    constants::{
        DEFAULT_POSITION_ANGLE_DEG, NUM_RANDOM_POINT_SOURCES, POINT_SOURCE_FLUX_STEP_JY,
        POINT_SOURCE_SIZE_ARCSEC, REFERENCE_DEC_ARCSEC, REFERENCE_RA_ARCSEC,
    },
    coords::{CoordError, SkyPosition},
    cosmology::CosmologyCalculator,
    validate::{
        validate_flux_density, validate_linear_size, validate_redshifts,
        validate_spectral_index, ValidationError,
    },
    SourceType,
};

/// The shape of a Gaussian sky component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentShape {
    /// A resolved source, e.g. a radio halo. Major and minor axes are both
    /// `angular_size_arcmin`.
    Extended { angular_size_arcmin: f64 },

    /// An unresolved source with a fixed [POINT_SOURCE_SIZE_ARCSEC] beam.
    Point,
}

impl ComponentShape {
    /// The major (and minor) axis of the Gaussian \[arcsec\].
    pub fn major_axis_arcsec(&self) -> f64 {
        match self {
            ComponentShape::Extended {
                angular_size_arcmin,
            } => angular_size_arcmin * 60.0,
            ComponentShape::Point => POINT_SOURCE_SIZE_ARCSEC,
        }
    }
}

/// One component of a sky model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceDescriptor {
    pub shape: ComponentShape,

    /// \[Jy\]
    pub flux_jy: f64,

    pub position: SkyPosition,

    /// \[degrees\]
    pub position_angle_deg: f64,
}

/// An extended source scaled by convention: `size / size_divisor` paired with
/// `flux * flux_factor`. These are alternate layouts (e.g. core + halo) and
/// aren't physically tied to one another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtendedVariant {
    pub size_divisor: f64,
    pub flux_factor: f64,

    /// \[arcmin\]
    pub angular_size_arcmin: f64,

    /// \[Jy\]
    pub flux_jy: f64,
}

/// Everything needed to make the model image at one redshift.
#[derive(Debug, Clone, PartialEq)]
pub struct SkyModel {
    pub redshift: f64,

    /// \[Mpc\]
    pub angular_diameter_distance_mpc: f64,

    /// The primary source followed by the halved/doubled and thirded/tripled
    /// variants.
    pub variants: [ExtendedVariant; 3],

    /// The components to put in the image, depending on the [SourceType].
    pub components: Vec<SourceDescriptor>,
}

impl SkyModel {
    pub fn primary(&self) -> &ExtendedVariant {
        &self.variants[0]
    }
}

/// Builds a [SkyModel] for each redshift of a list.
#[derive(Debug, Clone)]
pub struct SourceModelBuilder {
    cosmology: CosmologyCalculator,
    source_type: SourceType,
    reference_position: SkyPosition,
    num_point_sources: usize,
    position_angle_deg: f64,
}

impl SourceModelBuilder {
    pub fn new(cosmology: CosmologyCalculator) -> SourceModelBuilder {
        SourceModelBuilder {
            cosmology,
            source_type: SourceType::Extended,
            reference_position: default_reference_position(),
            num_point_sources: NUM_RANDOM_POINT_SOURCES,
            position_angle_deg: DEFAULT_POSITION_ANGLE_DEG,
        }
    }

    pub fn with_source_type(mut self, source_type: SourceType) -> SourceModelBuilder {
        self.source_type = source_type;
        self
    }

    pub fn with_reference_position(mut self, position: SkyPosition) -> SourceModelBuilder {
        self.reference_position = position;
        self
    }

    pub fn with_num_point_sources(mut self, num_point_sources: usize) -> SourceModelBuilder {
        self.num_point_sources = num_point_sources;
        self
    }

    pub fn with_position_angle(mut self, position_angle_deg: f64) -> SourceModelBuilder {
        self.position_angle_deg = position_angle_deg;
        self
    }

    pub fn cosmology(&self) -> &CosmologyCalculator {
        &self.cosmology
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn reference_position(&self) -> SkyPosition {
        self.reference_position
    }

    /// Validate the inputs and place point sources, ready to make one
    /// [SkyModel] per redshift. The first redshift is the one
    /// `reference_flux_jy` is given at.
    ///
    /// Point sources (if the source type has any) are placed here, once, using
    /// `offsets`, and share positions across every redshift.
    pub fn prepare<G: OffsetGenerator + ?Sized>(
        &self,
        redshifts: &[f64],
        linear_size_mpc: f64,
        reference_flux_jy: f64,
        spectral_index: f64,
        offsets: &mut G,
    ) -> Result<PreparedModels<'_>, ValidationError> {
        let redshifts = validate_redshifts(redshifts)?;
        validate_spectral_index(spectral_index)?;
        validate_flux_density(reference_flux_jy)?;
        validate_linear_size(linear_size_mpc)?;

        let point_sources = if self.source_type.has_point_sources() {
            self.point_sources(&redshifts, linear_size_mpc, offsets)?
        } else {
            vec![]
        };

        Ok(PreparedModels {
            builder: self,
            redshifts,
            linear_size_mpc,
            reference_flux_jy,
            spectral_index,
            point_sources,
        })
    }

    /// Build one [SkyModel] per redshift, in the order of `redshifts`, in
    /// parallel. See [SourceModelBuilder::prepare].
    pub fn build<G: OffsetGenerator + ?Sized>(
        &self,
        redshifts: &[f64],
        linear_size_mpc: f64,
        reference_flux_jy: f64,
        spectral_index: f64,
        offsets: &mut G,
    ) -> Result<Vec1<SkyModel>, ValidationError> {
        let prepared = self.prepare(
            redshifts,
            linear_size_mpc,
            reference_flux_jy,
            spectral_index,
            offsets,
        )?;
        let models: Vec<SkyModel> = prepared
            .redshifts
            .par_iter()
            .map(|&z| prepared.model_at(z))
            .collect();

        Vec1::try_from_vec(models).map_err(|_| ValidationError::NoRedshifts)
    }

    /// Point sources around the reference position. The placement region is
    /// sized from the nearest extended source (the smallest non-zero
    /// redshift), which looks the biggest.
    fn point_sources<G: OffsetGenerator + ?Sized>(
        &self,
        redshifts: &[f64],
        linear_size_mpc: f64,
        offsets: &mut G,
    ) -> Result<Vec<SourceDescriptor>, CoordError> {
        let nearest_size = redshifts
            .iter()
            .copied()
            .filter(|&z| z > 0.0)
            .reduce(f64::min)
            .map(|z| self.cosmology.calculate_angular_size(linear_size_mpc, z))
            .unwrap_or(0.0);
        let region = OffsetRegion::around_extended(nearest_size);

        offsets
            .offsets(self.num_point_sources, &region)
            .into_iter()
            .enumerate()
            .map(|(i, offset)| {
                Ok(SourceDescriptor {
                    shape: ComponentShape::Point,
                    flux_jy: POINT_SOURCE_FLUX_STEP_JY * (i + 1) as f64,
                    position: self.reference_position.offset_by(offset)?,
                    position_angle_deg: self.position_angle_deg,
                })
            })
            .collect()
    }
}

/// Validated inputs and placed point sources; makes the [SkyModel] of any
/// redshift on demand.
#[derive(Debug, Clone)]
pub struct PreparedModels<'a> {
    builder: &'a SourceModelBuilder,
    redshifts: Vec1<f64>,
    linear_size_mpc: f64,
    reference_flux_jy: f64,
    spectral_index: f64,
    point_sources: Vec<SourceDescriptor>,
}

impl PreparedModels<'_> {
    pub fn redshifts(&self) -> &Vec1<f64> {
        &self.redshifts
    }

    pub fn point_sources(&self) -> &[SourceDescriptor] {
        &self.point_sources
    }

    /// The sky models, one redshift at a time, in order.
    pub fn iter(&self) -> impl Iterator<Item = SkyModel> + '_ {
        self.redshifts.iter().map(|&z| self.model_at(z))
    }

    /// The sky model at redshift `z`.
    pub fn model_at(&self, z: f64) -> SkyModel {
        let b = self.builder;
        let z_ref = *self.redshifts.first();
        let flux = b.cosmology.calculate_flux_density(
            self.reference_flux_jy,
            z_ref,
            z,
            self.spectral_index,
        );
        let angular_size = b.cosmology.calculate_angular_size(self.linear_size_mpc, z);
        let variants = [1.0, 2.0, 3.0].map(|factor| ExtendedVariant {
            size_divisor: factor,
            flux_factor: factor,
            angular_size_arcmin: angular_size / factor,
            flux_jy: flux * factor,
        });

        let extended = |v: &ExtendedVariant| SourceDescriptor {
            shape: ComponentShape::Extended {
                angular_size_arcmin: v.angular_size_arcmin,
            },
            flux_jy: v.flux_jy,
            position: b.reference_position,
            position_angle_deg: b.position_angle_deg,
        };
        let components = match b.source_type {
            SourceType::Extended => vec![extended(&variants[0])],
            SourceType::Point => self.point_sources.clone(),
            SourceType::Mixed => variants
                .iter()
                .map(extended)
                .chain(self.point_sources.iter().copied())
                .collect(),
        };

        SkyModel {
            redshift: z,
            angular_diameter_distance_mpc: b.cosmology.angular_diameter_distance(z),
            variants,
            components,
        }
    }
}

/// The image centre: 04h00m00.0s, -20d00m00.0s.
pub fn default_reference_position() -> SkyPosition {
    SkyPosition::new(REFERENCE_RA_ARCSEC, REFERENCE_DEC_ARCSEC)
        .unwrap_or_else(|_| unreachable!("the reference position is on the sky"))
}

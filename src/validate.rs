//! Checks on caller-supplied parameters and on the files the simulation
//! depends on.

use std::path::{Path, PathBuf};

use thiserror::Error;
use vec1::Vec1;

use crate::{
    constants::{
        CONFIG_FILE_EXTENSION, MAX_FLUX_DENSITY_JY, MAX_REDSHIFT, MAX_SPECTRAL_INDEX,
        MIN_FLUX_DENSITY_JY, MIN_REDSHIFT, MIN_SPECTRAL_INDEX,
    },
    coords::{parse_dec_dms, parse_ra_hms, CoordError, CoordKind},
    quantity::{Dimension, Quantity},
};

/// A parameter is outside its documented physical or syntactic range.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Redshifts must be a non-empty list")]
    NoRedshifts,

    #[error("Redshift at index {index} must be numeric, got {value}")]
    NonNumericRedshift { index: usize, value: String },

    #[error("Redshift {0} out of range [{}, {}]", MIN_REDSHIFT, MAX_REDSHIFT)]
    RedshiftOutOfRange(f64),

    #[error(
        "Spectral index {0} out of range [{}, {}]",
        MIN_SPECTRAL_INDEX,
        MAX_SPECTRAL_INDEX
    )]
    SpectralIndexOutOfRange(f64),

    #[error(
        "Flux density {0} Jy out of range [{}, {}]",
        MIN_FLUX_DENSITY_JY,
        MAX_FLUX_DENSITY_JY
    )]
    FluxDensityOutOfRange(f64),

    #[error("Linear size must be a non-negative number of Mpc, got {0}")]
    LinearSize(f64),

    #[error("Hubble constant must be positive, got {0} km/s/Mpc")]
    HubbleConstant(f64),

    #[error("Matter density parameter must be in (0, 1), got {0}")]
    MatterDensity(f64),

    #[error("Invalid quantity '{input}': {reason}")]
    InvalidQuantity { input: String, reason: &'static str },

    #[error("Expected a {expected} quantity, got '{got}'")]
    WrongDimension { expected: Dimension, got: Quantity },

    #[error("{what} must be positive, got '{got}'")]
    NotPositive { what: &'static str, got: Quantity },

    #[error("Image size must be a positive number of pixels, got {0}")]
    ImageSize(usize),

    #[error("Number of {what} must be at least 1")]
    ZeroCount { what: &'static str },

    #[error("Source type must be 1 (extended), 2 (point) or 3 (mixed), got {0}")]
    SourceType(i64),

    #[error("Scan duration ({scan_duration_sec} s) is shorter than an integration ({integration_sec} s)")]
    ScanShorterThanIntegration {
        scan_duration_sec: f64,
        integration_sec: f64,
    },

    #[error("{what} must be a finite, non-negative number of seconds, got {value}")]
    ScanTime { what: &'static str, value: f64 },

    #[error(transparent)]
    Coordinate(#[from] CoordError),
}

/// A file the simulation depends on is missing or unusable.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error(
        "Configuration file must have a .{} extension, got {}",
        CONFIG_FILE_EXTENSION,
        .0.display()
    )]
    WrongExtension(PathBuf),

    #[error("Configuration file is empty: {}", .0.display())]
    Empty(PathBuf),

    #[error("Couldn't inspect {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Check that there is at least one redshift and that they are all finite and
/// within `[MIN_REDSHIFT, MAX_REDSHIFT]`.
pub fn validate_redshifts(redshifts: &[f64]) -> Result<Vec1<f64>, ValidationError> {
    for (index, &z) in redshifts.iter().enumerate() {
        if !z.is_finite() {
            return Err(ValidationError::NonNumericRedshift {
                index,
                value: z.to_string(),
            });
        }
        if !(MIN_REDSHIFT..=MAX_REDSHIFT).contains(&z) {
            return Err(ValidationError::RedshiftOutOfRange(z));
        }
    }
    Vec1::try_from_vec(redshifts.to_vec()).map_err(|_| ValidationError::NoRedshifts)
}

pub fn validate_spectral_index(alpha: f64) -> Result<(), ValidationError> {
    if (MIN_SPECTRAL_INDEX..=MAX_SPECTRAL_INDEX).contains(&alpha) {
        Ok(())
    } else {
        Err(ValidationError::SpectralIndexOutOfRange(alpha))
    }
}

pub fn validate_flux_density(flux_jy: f64) -> Result<(), ValidationError> {
    if (MIN_FLUX_DENSITY_JY..=MAX_FLUX_DENSITY_JY).contains(&flux_jy) {
        Ok(())
    } else {
        Err(ValidationError::FluxDensityOutOfRange(flux_jy))
    }
}

pub fn validate_linear_size(linear_size_mpc: f64) -> Result<(), ValidationError> {
    if linear_size_mpc.is_finite() && linear_size_mpc >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::LinearSize(linear_size_mpc))
    }
}

/// Check that `freq` is a positive frequency, returning it in \[Hz\].
pub fn validate_frequency(freq: &Quantity) -> Result<f64, ValidationError> {
    let hz = freq.to_hz()?;
    if hz > 0.0 {
        Ok(hz)
    } else {
        Err(ValidationError::NotPositive {
            what: "Frequency",
            got: *freq,
        })
    }
}

/// Check the grammar and ranges of an RA or DEC string.
pub fn validate_coordinate_string(coord: &str, kind: CoordKind) -> Result<(), ValidationError> {
    match kind {
        CoordKind::Ra => parse_ra_hms(coord)?,
        CoordKind::Dec => parse_dec_dms(coord)?,
    };
    Ok(())
}

/// The layout of a model image, validated once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageParams {
    /// The angular size of a pixel.
    pub cell_size: Quantity,

    /// The number of pixels along each side.
    pub image_size: usize,

    /// The frequency the image is made at.
    pub reference_frequency: Quantity,
}

impl ImageParams {
    pub fn new(
        cell_size: Quantity,
        image_size: usize,
        reference_frequency: Quantity,
    ) -> Result<ImageParams, ValidationError> {
        if cell_size.to_radians()? <= 0.0 {
            return Err(ValidationError::NotPositive {
                what: "Cell size",
                got: cell_size,
            });
        }
        if image_size == 0 {
            return Err(ValidationError::ImageSize(image_size));
        }
        validate_frequency(&reference_frequency)?;

        Ok(ImageParams {
            cell_size,
            image_size,
            reference_frequency,
        })
    }

    /// The image width on the sky \[arcsec\].
    pub fn field_of_view_arcsec(&self) -> f64 {
        // Dimensions were checked on construction.
        self.cell_size.to_arcsec().unwrap_or_default() * self.image_size as f64
    }
}

pub fn validate_file_exists<P: AsRef<Path>>(path: P) -> Result<(), ResourceError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ResourceError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(ResourceError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Check that a telescope array configuration exists, has a `.cfg` extension
/// and isn't empty. Its contents belong to the imaging toolkit.
pub fn validate_config_file<P: AsRef<Path>>(path: P) -> Result<(), ResourceError> {
    let path = path.as_ref();
    validate_file_exists(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    if extension.as_deref() != Some(CONFIG_FILE_EXTENSION) {
        return Err(ResourceError::WrongExtension(path.to_path_buf()));
    }

    let metadata = std::fs::metadata(path).map_err(|source| ResourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() == 0 {
        return Err(ResourceError::Empty(path.to_path_buf()));
    }

    Ok(())
}

//! Useful constants.
//!
//! All constants are double precision. Values that feed the cosmology and the
//! coordinate codec are fixed; changing them changes every sky model produced.

use lazy_static::lazy_static;
use vec1::{vec1, Vec1};

// Coordinate conversions.

/// Arcseconds per radian.
pub const ARCSEC_PER_RADIAN: f64 = 206264.81;
/// Arcminutes per radian. Used when projecting linear sizes onto the sky.
pub const ARCMIN_PER_RADIAN: f64 = 3437.75;
/// Arcseconds of arc per second of right ascension.
pub const RA_ARCSEC_PER_SECOND: f64 = 15.0;
/// Arcseconds of arc in a full circle of right ascension (24h).
pub const RA_ARCSEC_PER_DAY: f64 = 24.0 * 3600.0 * RA_ARCSEC_PER_SECOND;

// Cosmology. Planck 2015 flat ΛCDM (http://arxiv.org/pdf/1502.01589.pdf).

/// Speed of light \[km/s\]
pub const SPEED_OF_LIGHT_KM_S: f64 = 299792.458;
/// Hubble constant H0 \[km/s/Mpc\]
pub const HUBBLE_CONSTANT: f64 = 67.8;
/// Matter density parameter Ω_m.
pub const MATTER_DENSITY_PARAMETER: f64 = 0.308;

/// When a spectral index must be assumed, this value is used. Radio halos
/// have steep spectra.
pub const DEFAULT_SPECTRAL_INDEX: f64 = -1.6;

// Validation ranges.

pub const MIN_REDSHIFT: f64 = 0.0;
pub const MAX_REDSHIFT: f64 = 10.0;
pub const MIN_SPECTRAL_INDEX: f64 = -5.0;
pub const MAX_SPECTRAL_INDEX: f64 = 0.0;
/// \[Jy\]
pub const MIN_FLUX_DENSITY_JY: f64 = 0.0;
/// \[Jy\]
pub const MAX_FLUX_DENSITY_JY: f64 = 1e6;

// Sky model.

/// The Gaussian beam size given to every point source \[arcsec\]
pub const POINT_SOURCE_SIZE_ARCSEC: f64 = 3.0;
/// Position angle given to Gaussian components \[degrees\]
pub const DEFAULT_POSITION_ANGLE_DEG: f64 = 45.0;
/// How many point sources a point or mixed sky model gets.
pub const NUM_RANDOM_POINT_SOURCES: usize = 5;
/// Point-source offsets are quantised into this many steps along the edge of
/// the placement region.
pub const RANDOM_SOURCE_REGION_STEPS: u32 = 47;
/// The number of steps that would keep every point source inside the halo.
/// The ratio of [RANDOM_SOURCE_REGION_STEPS] to this lets a few sources land
/// just outside.
pub const RANDOM_SOURCE_INSIDE_STEPS: u32 = 44;
/// Flux density of the first point source \[Jy\]. Each following source is
/// brighter by the same amount.
pub const POINT_SOURCE_FLUX_STEP_JY: f64 = 0.1;

/// Reference right ascension of the image centre (04h00m00.0s) \[arcsec\]
pub const REFERENCE_RA_ARCSEC: f64 = 4.0 * 3600.0 * RA_ARCSEC_PER_SECOND;
/// Reference declination of the image centre (-20d00m00.0s) \[arcsec\]
pub const REFERENCE_DEC_ARCSEC: f64 = -20.0 * 3600.0;

// Telescope and observation.

/// \[degrees\]
pub const TELESCOPE_ELEVATION_LIMIT: f64 = 17.0;
/// Antenna shadowing limit, in units of image pixels.
pub const TELESCOPE_SHADOW_LIMIT: f64 = 0.001;
pub const DEFAULT_NOISE_LEVEL: &str = "0.0Jy";
pub const DEFAULT_STOKES: &str = "RR LL";
/// Telescopes with equatorial mounts; everything else is alt-az.
pub const EQUATORIAL_MOUNT_TELESCOPES: [&str; 3] = ["DRAO", "WSRT", "ASKAP"];

/// \[MHz\]
pub const DEFAULT_FREQUENCY_RESOLUTION_MHZ: f64 = 50.0;
pub const DEFAULT_INTEGRATION_TIME: &str = "1s";
pub const DEFAULT_CELL_SIZE: &str = "0.01arcsec";
/// Image side length \[pixels\]. Big enough to cover the SKA primary beam.
pub const DEFAULT_IMAGE_SIZE: usize = 7200;
pub const DEFAULT_REFERENCE_FREQUENCY: &str = "9.2GHz";
pub const DEFAULT_BRIGHTNESS_UNIT: &str = "Jy/pixel";
pub const DEFAULT_FREQUENCY_INCREMENT: &str = "0.5GHz";
pub const DEFAULT_LINEAR_SIZE_MPC: f64 = 0.5;
pub const DEFAULT_FLUX_DENSITY_JY: f64 = 0.6;
pub const DEFAULT_TELESCOPE_CONFIG: &str = "ska_mid197_new.cfg";
/// 2014/06/30 22:33:42 UTC, rounded to the day (MJD).
pub const DEFAULT_RISE_TIME: &str = "56839.0d";

/// The file extension of telescope array configurations.
pub const CONFIG_FILE_EXTENSION: &str = "cfg";
pub const COMPONENT_LIST_EXTENSION: &str = "cl";
pub const IMAGE_EXTENSION: &str = "im";

lazy_static! {
    /// The redshifts used when none are supplied.
    pub static ref DEFAULT_REDSHIFTS: Vec1<f64> = vec1![
        0.05, 0.1, 0.13, 0.15, 0.17, 0.2, 0.3, 0.4, 0.5, 0.6, 0.8, 0.9, 1.0
    ];
}

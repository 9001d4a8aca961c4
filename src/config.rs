//! Simulation configuration, read from a TOML file.
//!
//! Every key has a default, so an empty file (or no file at all) describes the
//! standard run: a 0.5 Mpc, 0.6 Jy extended source at 13 redshifts, imaged at
//! 9.2 GHz and observed by SKA1-Mid.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::*,
    quantity::{Quantity, Unit},
    validate::{
        validate_file_exists, validate_flux_density, validate_frequency, validate_linear_size,
        validate_redshifts, validate_spectral_index, ImageParams, ResourceError, ValidationError,
    },
    SourceType,
};

/// Every key a configuration file may set.
pub const RECOGNISED_KEYS: [&str; 18] = [
    "simulation.redshifts",
    "simulation.spectral_index",
    "simulation.channels",
    "simulation.frequency_resolution_mhz",
    "simulation.integration_time",
    "source.linear_size_mpc",
    "source.flux_density_jy",
    "source.source_type",
    "image.cell_size",
    "image.image_size",
    "image.reference_frequency",
    "telescope.config_file",
    "telescope.elevation_limit",
    "observation.rise_time",
    "observation.num_scans",
    "observation.start_time_sec",
    "observation.scan_duration_sec",
    "observation.scan_gap_sec",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Couldn't read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Couldn't parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Couldn't serialise config: {0}")]
    Serialise(#[from] toml::ser::Error),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub image: ImageSettings,
    #[serde(default)]
    pub telescope: TelescopeSettings,
    #[serde(default)]
    pub observation: ObservationSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationSettings {
    /// The first redshift is the one the source flux density is given at.
    #[serde(default = "default_redshifts")]
    pub redshifts: Vec<f64>,
    #[serde(default = "default_spectral_index")]
    pub spectral_index: f64,
    #[serde(default = "default_channels")]
    pub channels: usize,
    #[serde(default = "default_frequency_resolution_mhz")]
    pub frequency_resolution_mhz: f64,
    #[serde(default = "default_integration_time")]
    pub integration_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSettings {
    #[serde(default = "default_linear_size_mpc")]
    pub linear_size_mpc: f64,
    #[serde(default = "default_flux_density_jy")]
    pub flux_density_jy: f64,
    /// 1 (extended), 2 (point) or 3 (mixed).
    #[serde(default = "default_source_type")]
    pub source_type: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageSettings {
    #[serde(default = "default_cell_size")]
    pub cell_size: String,
    #[serde(default = "default_image_size")]
    pub image_size: usize,
    #[serde(default = "default_reference_frequency")]
    pub reference_frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelescopeSettings {
    /// The array configuration. Only its name and existence matter here.
    #[serde(default = "default_config_file")]
    pub config_file: PathBuf,
    /// \[degrees\]
    #[serde(default = "default_elevation_limit")]
    pub elevation_limit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservationSettings {
    /// MJD (UTC) the scans are scheduled from, e.g. "56839.0d".
    #[serde(default = "default_rise_time")]
    pub rise_time: String,
    #[serde(default = "default_num_scans")]
    pub num_scans: usize,
    #[serde(default = "default_start_time_sec")]
    pub start_time_sec: f64,
    #[serde(default = "default_scan_duration_sec")]
    pub scan_duration_sec: f64,
    #[serde(default = "default_scan_gap_sec")]
    pub scan_gap_sec: f64,
}

fn default_redshifts() -> Vec<f64> {
    DEFAULT_REDSHIFTS.to_vec()
}

fn default_spectral_index() -> f64 {
    DEFAULT_SPECTRAL_INDEX
}

fn default_channels() -> usize {
    1
}

fn default_frequency_resolution_mhz() -> f64 {
    DEFAULT_FREQUENCY_RESOLUTION_MHZ
}

fn default_integration_time() -> String {
    DEFAULT_INTEGRATION_TIME.to_string()
}

fn default_linear_size_mpc() -> f64 {
    DEFAULT_LINEAR_SIZE_MPC
}

fn default_flux_density_jy() -> f64 {
    DEFAULT_FLUX_DENSITY_JY
}

fn default_source_type() -> i64 {
    SourceType::Extended.code()
}

fn default_cell_size() -> String {
    DEFAULT_CELL_SIZE.to_string()
}

fn default_image_size() -> usize {
    DEFAULT_IMAGE_SIZE
}

fn default_reference_frequency() -> String {
    DEFAULT_REFERENCE_FREQUENCY.to_string()
}

fn default_config_file() -> PathBuf {
    PathBuf::from(DEFAULT_TELESCOPE_CONFIG)
}

fn default_elevation_limit() -> f64 {
    TELESCOPE_ELEVATION_LIMIT
}

fn default_rise_time() -> String {
    DEFAULT_RISE_TIME.to_string()
}

fn default_num_scans() -> usize {
    1
}

fn default_start_time_sec() -> f64 {
    1.0
}

fn default_scan_duration_sec() -> f64 {
    2.0
}

fn default_scan_gap_sec() -> f64 {
    0.0
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            redshifts: default_redshifts(),
            spectral_index: default_spectral_index(),
            channels: default_channels(),
            frequency_resolution_mhz: default_frequency_resolution_mhz(),
            integration_time: default_integration_time(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings {
            linear_size_mpc: default_linear_size_mpc(),
            flux_density_jy: default_flux_density_jy(),
            source_type: default_source_type(),
        }
    }
}

impl Default for ImageSettings {
    fn default() -> Self {
        ImageSettings {
            cell_size: default_cell_size(),
            image_size: default_image_size(),
            reference_frequency: default_reference_frequency(),
        }
    }
}

impl Default for TelescopeSettings {
    fn default() -> Self {
        TelescopeSettings {
            config_file: default_config_file(),
            elevation_limit: default_elevation_limit(),
        }
    }
}

impl Default for ObservationSettings {
    fn default() -> Self {
        ObservationSettings {
            rise_time: default_rise_time(),
            num_scans: default_num_scans(),
            start_time_sec: default_start_time_sec(),
            scan_duration_sec: default_scan_duration_sec(),
            scan_gap_sec: default_scan_gap_sec(),
        }
    }
}

impl ObservationSettings {
    /// Scan start time, duration and gap \[s\] must be finite and
    /// non-negative.
    pub fn validate_scan_times(&self) -> Result<(), ValidationError> {
        for (what, value) in [
            ("Scan start time", self.start_time_sec),
            ("Scan duration", self.scan_duration_sec),
            ("Scan gap", self.scan_gap_sec),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ValidationError::ScanTime { what, value });
            }
        }
        Ok(())
    }
}

impl SimConfig {
    /// Load and validate a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SimConfig, ConfigError> {
        let path = path.as_ref();
        validate_file_exists(path)?;
        info!("Reading config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        content.parse()
    }

    /// Write out a configuration with every key at its default.
    pub fn write_default<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(&SimConfig::default())?;
        fs::write(path, content)?;
        info!("Wrote the default config to {}", path.display());
        Ok(())
    }

    /// Check every value. Strings holding quantities must parse with the right
    /// dimension.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_redshifts(&self.simulation.redshifts)?;
        validate_spectral_index(self.simulation.spectral_index)?;
        validate_flux_density(self.source.flux_density_jy)?;
        validate_linear_size(self.source.linear_size_mpc)?;
        self.source_type()?;
        self.image_params()?;
        if self.simulation.channels == 0 {
            return Err(ValidationError::ZeroCount { what: "channels" });
        }
        if !(self.simulation.frequency_resolution_mhz > 0.0) {
            return Err(ValidationError::NotPositive {
                what: "Frequency resolution",
                got: self.frequency_resolution(),
            });
        }
        let integration_time = self.integration_time()?;
        if !(integration_time.to_seconds()? > 0.0) {
            return Err(ValidationError::NotPositive {
                what: "Integration time",
                got: integration_time,
            });
        }
        self.rise_time()?.to_days()?;
        if self.observation.num_scans == 0 {
            return Err(ValidationError::ZeroCount { what: "scans" });
        }
        self.observation.validate_scan_times()?;

        Ok(())
    }

    pub fn source_type(&self) -> Result<SourceType, ValidationError> {
        SourceType::from_code(self.source.source_type)
    }

    pub fn image_params(&self) -> Result<ImageParams, ValidationError> {
        ImageParams::new(
            self.image.cell_size.parse()?,
            self.image.image_size,
            self.image.reference_frequency.parse()?,
        )
    }

    /// The reference frequency \[Hz\].
    pub fn reference_frequency_hz(&self) -> Result<f64, ValidationError> {
        validate_frequency(&self.image.reference_frequency.parse()?)
    }

    pub fn frequency_resolution(&self) -> Quantity {
        Quantity::new(self.simulation.frequency_resolution_mhz, Unit::MHz)
    }

    pub fn integration_time(&self) -> Result<Quantity, ValidationError> {
        self.simulation.integration_time.parse()
    }

    pub fn rise_time(&self) -> Result<Quantity, ValidationError> {
        self.observation.rise_time.parse()
    }

    /// Look up a value by its dotted key, e.g. `image.cell_size`. Unknown keys
    /// give `None`.
    pub fn get(&self, key: &str) -> Option<toml::Value> {
        let root = toml::Value::try_from(self).ok()?;
        key.split('.')
            .try_fold(root, |value, part| value.get(part).cloned())
    }
}

impl FromStr for SimConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let table: toml::Table = toml::from_str(s)?;
        check_redshift_entries(&table)?;
        let config: SimConfig = toml::Value::Table(table).try_into()?;
        config.validate()?;
        debug!("{config:#?}");
        Ok(config)
    }
}

/// Redshifts must all be numbers. Checked before deserialising so that the
/// offending entry can be reported.
fn check_redshift_entries(table: &toml::Table) -> Result<(), ValidationError> {
    let entries = match table
        .get("simulation")
        .and_then(|s| s.get("redshifts"))
        .and_then(|r| r.as_array())
    {
        Some(entries) => entries,
        None => return Ok(()),
    };
    for (index, entry) in entries.iter().enumerate() {
        match entry {
            toml::Value::Integer(_) | toml::Value::Float(_) => (),
            other => {
                return Err(ValidationError::NonNumericRedshift {
                    index,
                    value: other.to_string(),
                })
            }
        }
    }
    Ok(())
}

//! How the sky models are to be observed: which telescope, which channels and
//! when.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use hifitime::{Duration, Epoch};
use itertools::Itertools;
use log::{debug, info};
use vec1::Vec1;

use crate::{
    config::SimConfig,
    constants::{
        DEFAULT_NOISE_LEVEL, DEFAULT_STOKES, EQUATORIAL_MOUNT_TELESCOPES, TELESCOPE_SHADOW_LIMIT,
    },
    cosmology::scale_to_frequency,
    quantity::Quantity,
    validate::{validate_frequency, ValidationError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mount {
    AltAz,
    Equatorial,
}

impl Display for Mount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mount::AltAz => write!(f, "alt-az"),
            Mount::Equatorial => write!(f, "EQUATORIAL"),
        }
    }
}

/// The array the visibilities are simulated for. Everything here is derived
/// from the array configuration's file name; the file's contents belong to the
/// imaging toolkit.
#[derive(Debug, Clone, PartialEq)]
pub struct TelescopeSetup {
    pub name: String,
    pub config_file: PathBuf,
    pub mount: Mount,
    /// \[degrees\]
    pub elevation_limit_deg: f64,
    pub shadow_limit: f64,
}

impl TelescopeSetup {
    pub fn new<P: AsRef<Path>>(config_file: P, elevation_limit_deg: f64) -> TelescopeSetup {
        let config_file = config_file.as_ref().to_path_buf();
        let name = config_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let upper = name.to_uppercase();
        let mount = if EQUATORIAL_MOUNT_TELESCOPES
            .iter()
            .any(|telescope| upper.contains(telescope))
        {
            Mount::Equatorial
        } else {
            Mount::AltAz
        };

        TelescopeSetup {
            name,
            config_file,
            mount,
            elevation_limit_deg,
            shadow_limit: TELESCOPE_SHADOW_LIMIT,
        }
    }

    /// The observatory whose location the toolkit should use. SKA1-Mid
    /// configurations are named after the array but located at MeerKAT.
    pub fn observatory(&self) -> &str {
        if self.name.to_lowercase().starts_with("ska_mid") {
            observatory_location("SKA_Mid")
        } else {
            observatory_location(&self.name)
        }
    }
}

/// The name an observatory's location is known by.
pub fn observatory_location(observatory: &str) -> &str {
    match observatory {
        "SKA_Mid" => "MeerKAT",
        other => other,
    }
}

/// `num_channels` channel frequencies, starting at `reference_hz` and spaced
/// by `resolution_hz`.
pub fn channel_frequencies(
    reference_hz: f64,
    resolution_hz: f64,
    num_channels: usize,
) -> Result<Vec1<f64>, ValidationError> {
    let freqs = (0..num_channels)
        .map(|i| reference_hz + i as f64 * resolution_hz)
        .collect();
    Vec1::try_from_vec(freqs).map_err(|_| ValidationError::ZeroCount { what: "channels" })
}

/// A flux density given at the first channel, scaled to every channel.
pub fn channel_fluxes(flux_jy: f64, channel_freqs_hz: &Vec1<f64>, spectral_index: f64) -> Vec<f64> {
    let reference = *channel_freqs_hz.first();
    channel_freqs_hz
        .iter()
        .map(|&f| scale_to_frequency(flux_jy, reference, f, spectral_index))
        .collect()
}

/// A continuous stretch of observing.
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    pub index: usize,

    /// The leading edge of the first integration.
    pub start: Epoch,

    /// The trailing edge of the scan.
    pub end: Epoch,

    /// The centroids of the integrations in this scan.
    pub timestamps: Vec1<Epoch>,
}

/// Lay out `num_scans` scans of `scan_duration`, the first starting
/// `start_offset` after `reference`, each separated by `gap`. A scan holds as
/// many whole integrations as fit in it.
pub fn schedule_scans(
    reference: Epoch,
    start_offset: Duration,
    scan_duration: Duration,
    gap: Duration,
    integration_time: Duration,
    num_scans: usize,
) -> Result<Vec1<Scan>, ValidationError> {
    let int_ns = integration_time.total_nanoseconds();
    let scan_ns = scan_duration.total_nanoseconds();
    if int_ns <= 0 || scan_ns < int_ns {
        return Err(ValidationError::ScanShorterThanIntegration {
            scan_duration_sec: scan_duration.to_seconds(),
            integration_sec: integration_time.to_seconds(),
        });
    }
    let num_integrations = (scan_ns / int_ns) as usize;

    let mut scans = Vec::with_capacity(num_scans);
    for index in 0..num_scans {
        let start = reference + start_offset + (scan_duration + gap) * index as f64;
        let timestamps = (0..num_integrations)
            .map(|i| start + integration_time * (i as f64 + 0.5))
            .collect();
        scans.push(Scan {
            index,
            start,
            end: start + scan_duration,
            // At least one integration fits, checked above.
            timestamps: Vec1::try_from_vec(timestamps)
                .map_err(|_| ValidationError::ZeroCount { what: "integrations" })?,
        });
    }

    Vec1::try_from_vec(scans).map_err(|_| ValidationError::ZeroCount { what: "scans" })
}

/// Everything about the observation that isn't the sky.
#[derive(Debug, Clone)]
pub struct ObservationPlan {
    pub telescope: TelescopeSetup,

    /// The centre frequency of each channel \[Hz\].
    pub channel_freqs_hz: Vec1<f64>,

    /// \[Hz\]
    pub freq_res_hz: f64,

    pub integration_time: Duration,

    pub scans: Vec1<Scan>,

    pub noise: Quantity,

    pub stokes: &'static str,

    pub spectral_index: f64,
}

impl ObservationPlan {
    pub fn new(config: &SimConfig) -> Result<ObservationPlan, ValidationError> {
        let reference_hz = validate_frequency(&config.image.reference_frequency.parse()?)?;
        let freq_res_hz = validate_frequency(&config.frequency_resolution())?;
        let channel_freqs_hz =
            channel_frequencies(reference_hz, freq_res_hz, config.simulation.channels)?;

        let integration_time = config.integration_time()?.to_duration()?;
        let rise = Epoch::from_mjd_utc(config.rise_time()?.to_days()?);
        let obs = &config.observation;
        obs.validate_scan_times()?;
        let scans = schedule_scans(
            rise,
            Duration::from_seconds(obs.start_time_sec),
            Duration::from_seconds(obs.scan_duration_sec),
            Duration::from_seconds(obs.scan_gap_sec),
            integration_time,
            obs.num_scans,
        )?;

        Ok(ObservationPlan {
            telescope: TelescopeSetup::new(
                &config.telescope.config_file,
                config.telescope.elevation_limit,
            ),
            channel_freqs_hz,
            freq_res_hz,
            integration_time,
            scans,
            // The default noise level always parses.
            noise: DEFAULT_NOISE_LEVEL.parse()?,
            stokes: DEFAULT_STOKES,
            spectral_index: config.simulation.spectral_index,
        })
    }

    pub fn num_timesteps(&self) -> usize {
        self.scans.iter().map(|s| s.timestamps.len()).sum()
    }

    /// Per-channel flux densities for a source of `flux_jy` at the first
    /// channel.
    pub fn channel_fluxes(&self, flux_jy: f64) -> Vec<f64> {
        channel_fluxes(flux_jy, &self.channel_freqs_hz, self.spectral_index)
    }

    pub fn log_summary(&self) {
        info!(
            "Telescope: {} ({} mount, observatory {})",
            self.telescope.name,
            self.telescope.mount,
            self.telescope.observatory()
        );
        info!(
            "{} channel(s) from {} GHz, {} MHz apart",
            self.channel_freqs_hz.len(),
            self.channel_freqs_hz.first() / 1e9,
            self.freq_res_hz / 1e6
        );
        info!(
            "{} scan(s), {} integration(s) of {}",
            self.scans.len(),
            self.num_timesteps(),
            self.integration_time
        );
        debug!(
            "Elevation limit {} deg, shadow limit {}, noise {}, stokes '{}'",
            self.telescope.elevation_limit_deg,
            self.telescope.shadow_limit,
            self.noise,
            self.stokes
        );
        for scan in &self.scans {
            debug!(
                "Scan {}: {} to {} ({})",
                scan.index,
                scan.start,
                scan.end,
                scan.timestamps.iter().map(|t| t.to_mjd_utc_days()).join(", ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    #[test]
    fn telescope_from_config_name() {
        let t = TelescopeSetup::new("/data/ska_mid197_new.cfg", 17.0);
        assert_eq!(t.name, "ska_mid197_new");
        assert_eq!(t.mount, Mount::AltAz);
        assert_eq!(t.observatory(), "MeerKAT");
        assert_eq!(t.shadow_limit, 0.001);
        assert_eq!(t.mount.to_string(), "alt-az");

        let t = TelescopeSetup::new("WSRT.cfg", 10.0);
        assert_eq!(t.mount, Mount::Equatorial);
        assert_eq!(t.observatory(), "WSRT");
        assert_eq!(t.mount.to_string(), "EQUATORIAL");
        assert_eq!(TelescopeSetup::new("askap36.cfg", 10.0).mount, Mount::Equatorial);
        assert_eq!(TelescopeSetup::new("vla.a.cfg", 10.0).mount, Mount::AltAz);

        assert_eq!(observatory_location("SKA_Mid"), "MeerKAT");
        assert_eq!(observatory_location("VLA"), "VLA");
    }

    #[test]
    fn channels() {
        let freqs = channel_frequencies(9.2e9, 50e6, 3).unwrap();
        assert_eq!(freqs.as_slice(), &[9.2e9, 9.25e9, 9.3e9]);
        assert!(channel_frequencies(9.2e9, 50e6, 0).is_err());

        let fluxes = channel_fluxes(0.6, &freqs, -1.6);
        assert_eq!(fluxes[0], 0.6);
        assert!(fluxes[1] < fluxes[0]);
        assert!(fluxes[2] < fluxes[1]);
        assert_relative_eq!(
            fluxes[2],
            0.6 * (9.3f64 / 9.2).powf(-1.6),
            max_relative = 1e-12
        );

        // A flat spectrum doesn't change.
        assert!(channel_fluxes(0.6, &freqs, 0.0).iter().all(|&f| f == 0.6));
    }

    #[test]
    fn scans_are_laid_out_back_to_back() {
        let rise = Epoch::from_mjd_utc(56839.0);
        let scans = schedule_scans(
            rise,
            Duration::from_seconds(1.0),
            Duration::from_seconds(2.0),
            Duration::from_seconds(3.0),
            Duration::from_seconds(1.0),
            3,
        )
        .unwrap();
        assert_eq!(scans.len(), 3);
        for (i, scan) in scans.iter().enumerate() {
            assert_eq!(scan.index, i);
            let start = (scan.start - rise).to_seconds();
            assert_abs_diff_eq!(start, 1.0 + 5.0 * i as f64, epsilon = 1e-6);
            assert_abs_diff_eq!((scan.end - scan.start).to_seconds(), 2.0, epsilon = 1e-6);
            assert_eq!(scan.timestamps.len(), 2);
            assert_abs_diff_eq!(
                (scan.timestamps[0] - scan.start).to_seconds(),
                0.5,
                epsilon = 1e-6
            );
            assert_abs_diff_eq!(
                (scan.timestamps[1] - scan.start).to_seconds(),
                1.5,
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn scan_shorter_than_an_integration() {
        let rise = Epoch::from_mjd_utc(56839.0);
        assert!(matches!(
            schedule_scans(
                rise,
                Duration::from_seconds(0.0),
                Duration::from_seconds(1.0),
                Duration::from_seconds(0.0),
                Duration::from_seconds(2.0),
                1,
            ),
            Err(ValidationError::ScanShorterThanIntegration { .. })
        ));
    }

    #[test]
    fn default_plan() {
        let plan = ObservationPlan::new(&SimConfig::default()).unwrap();
        assert_eq!(plan.telescope.name, "ska_mid197_new");
        assert_eq!(plan.channel_freqs_hz.len(), 1);
        assert_abs_diff_eq!(*plan.channel_freqs_hz.first(), 9.2e9, epsilon = 1e-3);
        assert_abs_diff_eq!(plan.freq_res_hz, 50e6, epsilon = 1e-6);
        assert_eq!(plan.integration_time, Duration::from_seconds(1.0));
        assert_eq!(plan.scans.len(), 1);
        assert_eq!(plan.num_timesteps(), 2);
        assert_eq!(plan.noise.to_string(), "0Jy");
        assert_eq!(plan.stokes, "RR LL");
        assert_eq!(plan.channel_fluxes(0.6), vec![0.6]);

        let first = plan.scans.first();
        assert_abs_diff_eq!(
            (first.start - Epoch::from_mjd_utc(56839.0)).to_seconds(),
            1.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn plan_rejects_bad_timing() {
        let mut config = SimConfig::default();
        config.simulation.integration_time = "5s".to_string();
        assert!(matches!(
            ObservationPlan::new(&config),
            Err(ValidationError::ScanShorterThanIntegration { .. })
        ));

        let mut config = SimConfig::default();
        config.observation.scan_duration_sec = f64::NAN;
        assert!(matches!(
            ObservationPlan::new(&config),
            Err(ValidationError::ScanTime { .. })
        ));

        let mut config = SimConfig::default();
        config.observation.rise_time = "56839.0GHz".to_string();
        assert!(matches!(
            ObservationPlan::new(&config),
            Err(ValidationError::WrongDimension { .. })
        ));
    }
}

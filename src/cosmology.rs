//! Distances and source scaling in a flat ΛCDM universe.

use crate::{
    constants::{
        ARCMIN_PER_RADIAN, HUBBLE_CONSTANT, MATTER_DENSITY_PARAMETER, SPEED_OF_LIGHT_KM_S,
    },
    validate::ValidationError,
};

/// Cosmological distances and source properties for fixed `(H0, Ω_m)`. The
/// parameters can't change after construction, so every derived value is
/// consistent with them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CosmologyCalculator {
    /// Hubble constant \[km/s/Mpc\]
    h0: f64,
    /// Matter density parameter.
    omega_m: f64,
}

impl Default for CosmologyCalculator {
    /// Planck 2015.
    fn default() -> Self {
        CosmologyCalculator {
            h0: HUBBLE_CONSTANT,
            omega_m: MATTER_DENSITY_PARAMETER,
        }
    }
}

impl CosmologyCalculator {
    pub fn new(h0: f64, omega_m: f64) -> Result<CosmologyCalculator, ValidationError> {
        if !(h0.is_finite() && h0 > 0.0) {
            return Err(ValidationError::HubbleConstant(h0));
        }
        if !(omega_m > 0.0 && omega_m < 1.0) {
            return Err(ValidationError::MatterDensity(omega_m));
        }
        Ok(CosmologyCalculator { h0, omega_m })
    }

    pub fn h0(&self) -> f64 {
        self.h0
    }

    pub fn omega_m(&self) -> f64 {
        self.omega_m
    }

    /// Dark energy density parameter; the universe is flat.
    pub fn omega_l(&self) -> f64 {
        1.0 - self.omega_m
    }

    /// Angular diameter distance \[Mpc\] at redshift `z`.
    ///
    /// This is the closed-form approximation from Schneider (2006),
    /// "Extragalactic Astronomy and Cosmology", section 4.3.3, not the exact
    /// ΛCDM integral. Previously simulated data used it, so it must stay
    /// as-is. The distance is exactly 0 at `z = 0`, where the expression has
    /// a removable singularity. It is not monotonic in `z`.
    pub fn angular_diameter_distance(&self, z: f64) -> f64 {
        if z == 0.0 {
            return 0.0;
        }

        let omega_m = self.omega_m;
        let omega_l = self.omega_l();
        let numerator = SPEED_OF_LIGHT_KM_S
            * 2.0
            * (omega_m * z + (omega_l - 2.0) * ((1.0 + omega_m * z).sqrt() - 1.0));
        let denominator = self.h0 * (omega_m * (1.0 + z)).powi(2);

        numerator / denominator
    }

    /// Angular size \[arcmin\] of an object `linear_size_mpc` across at
    /// redshift `z`. Zero wherever the angular diameter distance is zero.
    pub fn calculate_angular_size(&self, linear_size_mpc: f64, z: f64) -> f64 {
        let d_a = self.angular_diameter_distance(z);
        if d_a == 0.0 {
            return 0.0;
        }

        (linear_size_mpc / d_a) * ARCMIN_PER_RADIAN
    }

    /// Scale a flux density \[Jy\] observed at `z_ref` to `z_target`:
    /// inverse-square dimming in angular diameter distance, with a spectral
    /// k-correction for `spectral_index`.
    ///
    /// If either distance is zero `flux_ref_jy` is returned unchanged. That
    /// is a degenerate short-circuit, not a physical answer.
    pub fn calculate_flux_density(
        &self,
        flux_ref_jy: f64,
        z_ref: f64,
        z_target: f64,
        spectral_index: f64,
    ) -> f64 {
        let d_ref = self.angular_diameter_distance(z_ref);
        let d_target = self.angular_diameter_distance(z_target);
        if d_ref == 0.0 || d_target == 0.0 {
            return flux_ref_jy;
        }

        let k_correction = ((1.0 + z_target) / (1.0 + z_ref)).powf(spectral_index);
        flux_ref_jy * (d_ref / d_target).powi(2) * k_correction
    }
}

/// Scale a flux density from `ref_freq` to `target_freq` with a power law
/// `S ∝ ν^α`. The frequencies only need to share a unit.
pub fn scale_to_frequency(flux_jy: f64, ref_freq: f64, target_freq: f64, spectral_index: f64) -> f64 {
    flux_jy * (target_freq / ref_freq).powf(spectral_index)
}

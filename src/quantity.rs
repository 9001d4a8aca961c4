//! Physical quantities written as text, e.g. `9.2GHz`, `0.01arcsec`, `1s`,
//! `56839.0d` or `0.0Jy`.
//!
//! A [Quantity] is parsed once where it enters the program and converted to
//! whatever unit a caller needs from then on.

use std::{fmt::Display, str::FromStr};

use hifitime::Duration;
use qtty::{angular::Angular, frequency::FrequencyDim, time::Time, Per};

use crate::validate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Frequency,
    Angle,
    Time,
    FluxDensity,
}

impl Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Dimension::Frequency => "frequency",
            Dimension::Angle => "angle",
            Dimension::Time => "time",
            Dimension::FluxDensity => "flux density",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Hz,
    KHz,
    MHz,
    GHz,
    Rad,
    Deg,
    Arcmin,
    Arcsec,
    Second,
    Minute,
    Hour,
    Day,
    Jy,
}

const ALL_UNITS: [Unit; 13] = [
    Unit::Hz,
    Unit::KHz,
    Unit::MHz,
    Unit::GHz,
    Unit::Rad,
    Unit::Deg,
    Unit::Arcmin,
    Unit::Arcsec,
    Unit::Second,
    Unit::Minute,
    Unit::Hour,
    Unit::Day,
    Unit::Jy,
];

impl Unit {
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Hz => "Hz",
            Unit::KHz => "kHz",
            Unit::MHz => "MHz",
            Unit::GHz => "GHz",
            Unit::Rad => "rad",
            Unit::Deg => "deg",
            Unit::Arcmin => "arcmin",
            Unit::Arcsec => "arcsec",
            Unit::Second => "s",
            Unit::Minute => "min",
            Unit::Hour => "h",
            Unit::Day => "d",
            Unit::Jy => "Jy",
        }
    }

    pub fn dimension(self) -> Dimension {
        match self {
            Unit::Hz | Unit::KHz | Unit::MHz | Unit::GHz => Dimension::Frequency,
            Unit::Rad | Unit::Deg | Unit::Arcmin | Unit::Arcsec => Dimension::Angle,
            Unit::Second | Unit::Minute | Unit::Hour | Unit::Day => Dimension::Time,
            Unit::Jy => Dimension::FluxDensity,
        }
    }
}

impl FromStr for Unit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_UNITS
            .iter()
            .copied()
            .find(|u| u.symbol() == s)
            .ok_or(())
    }
}

// Radio frequencies are cycles (turns) per unit time.
type Hertz = Per<qtty::Turn, qtty::Second>;
type Kilohertz = Per<qtty::Turn, qtty::Millisecond>;
type Megahertz = Per<qtty::Turn, qtty::Microsecond>;
type Gigahertz = Per<qtty::Turn, qtty::Nanosecond>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    pub magnitude: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: Unit) -> Quantity {
        Quantity { magnitude, unit }
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }

    fn wrong_dimension(&self, expected: Dimension) -> ValidationError {
        ValidationError::WrongDimension {
            expected,
            got: *self,
        }
    }

    fn frequency_in<T: qtty::Unit<Dim = FrequencyDim>>(&self) -> Result<f64, ValidationError> {
        let m = self.magnitude;
        let q = match self.unit {
            Unit::Hz => qtty::Quantity::<Hertz>::new(m).to::<T>(),
            Unit::KHz => qtty::Quantity::<Kilohertz>::new(m).to::<T>(),
            Unit::MHz => qtty::Quantity::<Megahertz>::new(m).to::<T>(),
            Unit::GHz => qtty::Quantity::<Gigahertz>::new(m).to::<T>(),
            _ => return Err(self.wrong_dimension(Dimension::Frequency)),
        };
        Ok(q.value())
    }

    fn angle_in<T: qtty::Unit<Dim = Angular>>(&self) -> Result<f64, ValidationError> {
        let m = self.magnitude;
        let q = match self.unit {
            Unit::Rad => qtty::Radians::new(m).to::<T>(),
            Unit::Deg => qtty::Degrees::new(m).to::<T>(),
            Unit::Arcmin => qtty::Arcminutes::new(m).to::<T>(),
            Unit::Arcsec => qtty::Arcseconds::new(m).to::<T>(),
            _ => return Err(self.wrong_dimension(Dimension::Angle)),
        };
        Ok(q.value())
    }

    fn time_in<T: qtty::Unit<Dim = Time>>(&self) -> Result<f64, ValidationError> {
        let m = self.magnitude;
        let q = match self.unit {
            Unit::Second => qtty::Seconds::new(m).to::<T>(),
            Unit::Minute => qtty::Minutes::new(m).to::<T>(),
            Unit::Hour => qtty::Hours::new(m).to::<T>(),
            Unit::Day => qtty::Days::new(m).to::<T>(),
            _ => return Err(self.wrong_dimension(Dimension::Time)),
        };
        Ok(q.value())
    }

    /// \[Hz\]
    pub fn to_hz(&self) -> Result<f64, ValidationError> {
        self.frequency_in::<Hertz>()
    }

    /// \[GHz\]
    pub fn to_ghz(&self) -> Result<f64, ValidationError> {
        self.frequency_in::<Gigahertz>()
    }

    pub fn to_radians(&self) -> Result<f64, ValidationError> {
        self.angle_in::<qtty::Radian>()
    }

    pub fn to_degrees(&self) -> Result<f64, ValidationError> {
        self.angle_in::<qtty::Degree>()
    }

    pub fn to_arcmin(&self) -> Result<f64, ValidationError> {
        self.angle_in::<qtty::Arcminute>()
    }

    pub fn to_arcsec(&self) -> Result<f64, ValidationError> {
        self.angle_in::<qtty::Arcsecond>()
    }

    pub fn to_seconds(&self) -> Result<f64, ValidationError> {
        self.time_in::<qtty::Second>()
    }

    pub fn to_days(&self) -> Result<f64, ValidationError> {
        self.time_in::<qtty::Day>()
    }

    pub fn to_duration(&self) -> Result<Duration, ValidationError> {
        Ok(Duration::from_seconds(self.to_seconds()?))
    }

    /// \[Jy\]
    pub fn to_jy(&self) -> Result<f64, ValidationError> {
        match self.unit {
            Unit::Jy => Ok(self.magnitude),
            _ => Err(self.wrong_dimension(Dimension::FluxDensity)),
        }
    }
}

impl FromStr for Quantity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ValidationError::InvalidQuantity {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        // The unit is the trailing run of letters, so "1e9Hz" keeps its
        // exponent.
        let split = trimmed
            .trim_end_matches(|c: char| c.is_ascii_alphabetic())
            .len();
        let (magnitude, symbol) = trimmed.split_at(split);
        if symbol.is_empty() {
            return Err(invalid("missing unit"));
        }
        let unit: Unit = symbol.parse().map_err(|_| invalid("unknown unit"))?;
        let magnitude: f64 = magnitude
            .trim_end()
            .parse()
            .map_err(|_| invalid("magnitude is not a number"))?;
        if !magnitude.is_finite() {
            return Err(invalid("magnitude is not finite"));
        }

        Ok(Quantity { magnitude, unit })
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.symbol())
    }
}

//! Conversions between arcseconds and sexagesimal RA/DEC strings.
//!
//! Right ascension is encoded as `HHhMMmSS.SSs` and declination as
//! `±DDdMMmSS.SSs`. Seconds are rounded to two decimal places, so decoding an
//! encoded value can be off by up to 0.01 seconds.


use std::fmt::Display;

use thiserror::Error;

use crate::constants::{ARCSEC_PER_RADIAN, RA_ARCSEC_PER_DAY, RA_ARCSEC_PER_SECOND};

/// Which kind of sexagesimal coordinate a string holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordKind {
    Ra,
    Dec,
}

impl CoordKind {
    /// The textual grammar expected for this kind of coordinate.
    pub fn expected(self) -> &'static str {
        match self {
            CoordKind::Ra => "HHhMMmSS.SSs",
            CoordKind::Dec => "±DDdMMmSS.SSs",
        }
    }
}

impl Display for CoordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordKind::Ra => write!(f, "RA"),
            CoordKind::Dec => write!(f, "DEC"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordError {
    /// A numeric input violates a mathematical precondition.
    #[error("Right ascension must be non-negative, got {0} arcsec")]
    NegativeRa(f64),

    #[error("{kind} must be finite, got {value} arcsec")]
    NonFinite { kind: CoordKind, value: f64 },

    #[error("Declination must be within ±90°, got {0} arcsec")]
    BeyondPole(f64),

    /// The string doesn't follow the sexagesimal grammar.
    #[error("Invalid {kind} format: '{input}'. Expected format: {}", .kind.expected())]
    Format { kind: CoordKind, input: String },

    /// The string is well formed but a component is out of range.
    #[error("{kind} values out of range: '{input}'")]
    OutOfRange { kind: CoordKind, input: String },
}

impl CoordError {
    /// Is this a malformed-string failure (bad grammar or out-of-range
    /// component), as opposed to a bad numeric input?
    pub fn is_format_error(&self) -> bool {
        matches!(self, CoordError::Format { .. } | CoordError::OutOfRange { .. })
    }
}

/// A value split into whole units, minutes and seconds, with seconds rounded
/// to two decimal places. Always built from a non-negative value.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sexagesimal {
    whole: u32,
    minutes: u32,
    seconds: f64,
}

impl Sexagesimal {
    fn from_decimal(value: f64) -> Sexagesimal {
        let whole = value.trunc();
        let remainder = 60.0 * (value - whole);
        let minutes = remainder.trunc();
        let seconds = 60.0 * (remainder - minutes);

        Sexagesimal {
            whole: whole as u32,
            minutes: minutes as u32,
            seconds: (seconds * 100.0).round() / 100.0,
        }
        .normalise()
    }

    /// Rounding can produce 60.00 seconds; carry it into the minutes, and
    /// carry 60 minutes into the whole units.
    fn normalise(mut self) -> Sexagesimal {
        if self.seconds >= 60.0 {
            self.seconds -= 60.0;
            self.minutes += 1;
        }
        if self.minutes >= 60 {
            self.minutes -= 60;
            self.whole += 1;
        }
        self
    }
}

/// Convert a right ascension \[arcsec\] to an `HHhMMmSS.SSs` string. Hours
/// wrap at 24.
pub fn ra_arcsec_to_hms(ra_arcsec: f64) -> Result<String, CoordError> {
    check_ra(ra_arcsec)?;
    Ok(format_ra(ra_arcsec))
}

fn check_ra(ra_arcsec: f64) -> Result<(), CoordError> {
    if !ra_arcsec.is_finite() {
        return Err(CoordError::NonFinite {
            kind: CoordKind::Ra,
            value: ra_arcsec,
        });
    }
    if ra_arcsec < 0.0 {
        return Err(CoordError::NegativeRa(ra_arcsec));
    }
    Ok(())
}

fn check_dec(dec_arcsec: f64) -> Result<(), CoordError> {
    if !dec_arcsec.is_finite() {
        return Err(CoordError::NonFinite {
            kind: CoordKind::Dec,
            value: dec_arcsec,
        });
    }
    if dec_arcsec.abs() > 90.0 * 3600.0 {
        return Err(CoordError::BeyondPole(dec_arcsec));
    }
    Ok(())
}

/// Infallible RA formatting; the caller guarantees a finite `ra_arcsec >= 0`.
fn format_ra(ra_arcsec: f64) -> String {
    let ra_hours = ra_arcsec / (3600.0 * RA_ARCSEC_PER_SECOND);
    let mut hms = Sexagesimal::from_decimal(ra_hours.rem_euclid(24.0));
    hms.whole %= 24;
    format!("{:02}h{:02}m{:05.2}s", hms.whole, hms.minutes, hms.seconds)
}

/// Convert a declination \[arcsec\] to a `±DDdMMmSS.SSs` string. The sign
/// belongs to the whole string, never to a single component.
pub fn dec_arcsec_to_dms(dec_arcsec: f64) -> Result<String, CoordError> {
    check_dec(dec_arcsec)?;
    Ok(format_dec(dec_arcsec))
}

/// Infallible DEC formatting; the caller guarantees a finite `|dec| <= 90°`.
fn format_dec(dec_arcsec: f64) -> String {
    let dec_degrees = dec_arcsec / 3600.0;
    let sign = if dec_degrees.is_sign_negative() && dec_degrees != 0.0 {
        '-'
    } else {
        '+'
    };
    let dms = Sexagesimal::from_decimal(dec_degrees.abs());
    format!(
        "{sign}{:02}d{:02}m{:05.2}s",
        dms.whole, dms.minutes, dms.seconds
    )
}

/// Convert radians to arcseconds.
pub fn radians_to_arcsec(radians: f64) -> f64 {
    radians * ARCSEC_PER_RADIAN
}

/// Parse an `HHhMMmSS.SSs` string into decimal hours. The trailing `s` is
/// optional; the `h` and `m` separators are not.
pub fn parse_ra_hms(ra: &str) -> Result<f64, CoordError> {
    let (hours, minutes, seconds) =
        split_sexagesimal(ra, 'h').ok_or_else(|| CoordError::Format {
            kind: CoordKind::Ra,
            input: ra.to_string(),
        })?;

    if !((0.0..24.0).contains(&hours)
        && (0.0..60.0).contains(&minutes)
        && (0.0..60.0).contains(&seconds))
    {
        return Err(CoordError::OutOfRange {
            kind: CoordKind::Ra,
            input: ra.to_string(),
        });
    }

    Ok(hours + minutes / 60.0 + seconds / 3600.0)
}

/// Parse a `±DDdMMmSS.SSs` string into decimal degrees. A missing sign means
/// positive.
pub fn parse_dec_dms(dec: &str) -> Result<f64, CoordError> {
    let (sign, unsigned) = match dec.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, dec.strip_prefix('+').unwrap_or(dec)),
    };
    let (degrees, arcminutes, arcseconds) =
        split_sexagesimal(unsigned, 'd').ok_or_else(|| CoordError::Format {
            kind: CoordKind::Dec,
            input: dec.to_string(),
        })?;

    let value = degrees + arcminutes / 60.0 + arcseconds / 3600.0;
    if !((0.0..=90.0).contains(&degrees)
        && (0.0..60.0).contains(&arcminutes)
        && (0.0..60.0).contains(&arcseconds)
        && value <= 90.0)
    {
        return Err(CoordError::OutOfRange {
            kind: CoordKind::Dec,
            input: dec.to_string(),
        });
    }

    Ok(sign * value)
}

/// Parse an RA/DEC string pair into (decimal hours, decimal degrees).
pub fn parse_ra_dec(ra: &str, dec: &str) -> Result<(f64, f64), CoordError> {
    Ok((parse_ra_hms(ra)?, parse_dec_dms(dec)?))
}

/// Split `<1-2 digits><sep><1-2 digits>m<1-2 digits>[.digits][s]` into its
/// three numeric components.
fn split_sexagesimal(s: &str, sep: char) -> Option<(f64, f64, f64)> {
    let (whole, rest) = s.split_once(sep)?;
    let (minutes, seconds) = rest.split_once('m')?;
    let seconds = seconds.strip_suffix('s').unwrap_or(seconds);

    if !(is_integer_field(whole) && is_integer_field(minutes) && is_seconds_field(seconds)) {
        return None;
    }

    Some((
        whole.parse().ok()?,
        minutes.parse().ok()?,
        seconds.parse().ok()?,
    ))
}

fn is_integer_field(field: &str) -> bool {
    (1..=2).contains(&field.len()) && field.bytes().all(|b| b.is_ascii_digit())
}

fn is_seconds_field(field: &str) -> bool {
    match field.split_once('.') {
        Some((int, frac)) => {
            is_integer_field(int) && !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => is_integer_field(field),
    }
}

/// An angular offset on the sky \[arcsec\]. The RA component is in arcseconds
/// of arc, so 15 of them make one second of time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub ra_arcsec: f64,
    pub dec_arcsec: f64,
}

/// A direction on the sky. RA is kept in `[0, 24h)` and DEC in `[-90°, 90°]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPosition {
    ra_arcsec: f64,
    dec_arcsec: f64,
}

impl SkyPosition {
    pub fn new(ra_arcsec: f64, dec_arcsec: f64) -> Result<SkyPosition, CoordError> {
        check_ra(ra_arcsec)?;
        check_dec(dec_arcsec)?;
        Ok(SkyPosition {
            ra_arcsec: ra_arcsec.rem_euclid(RA_ARCSEC_PER_DAY),
            dec_arcsec,
        })
    }

    /// Build a position from `HHhMMmSS.SSs` and `±DDdMMmSS.SSs` strings.
    pub fn from_sexagesimal(ra: &str, dec: &str) -> Result<SkyPosition, CoordError> {
        let (ra_hours, dec_degrees) = parse_ra_dec(ra, dec)?;
        SkyPosition::new(
            ra_hours * 3600.0 * RA_ARCSEC_PER_SECOND,
            dec_degrees * 3600.0,
        )
    }

    pub fn ra_arcsec(&self) -> f64 {
        self.ra_arcsec
    }

    pub fn dec_arcsec(&self) -> f64 {
        self.dec_arcsec
    }

    /// Shift this position. RA wraps around 24h; DEC can't be pushed past a
    /// pole.
    pub fn offset_by(&self, offset: Offset) -> Result<SkyPosition, CoordError> {
        let ra_arcsec = self.ra_arcsec + offset.ra_arcsec;
        if !ra_arcsec.is_finite() {
            return Err(CoordError::NonFinite {
                kind: CoordKind::Ra,
                value: ra_arcsec,
            });
        }
        SkyPosition::new(
            ra_arcsec.rem_euclid(RA_ARCSEC_PER_DAY),
            self.dec_arcsec + offset.dec_arcsec,
        )
    }

    pub fn ra_hms(&self) -> String {
        format_ra(self.ra_arcsec)
    }

    pub fn dec_dms(&self) -> String {
        format_dec(self.dec_arcsec)
    }

    /// The direction as a J2000 string, e.g. `J2000 04h00m00.00s -20d00m00.00s`.
    pub fn to_j2000(&self) -> String {
        format!("J2000 {} {}", self.ra_hms(), self.dec_dms())
    }

    /// (RA, DEC) \[radians\]
    pub fn to_radians(&self) -> (f64, f64) {
        (
            self.ra_arcsec / ARCSEC_PER_RADIAN,
            self.dec_arcsec / ARCSEC_PER_RADIAN,
        )
    }
}

impl Display for SkyPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_j2000())
    }
}

//! Sky models of a radio source placed at many redshifts, and the inputs
//! needed to simulate observing them with an interferometer.

pub mod config;
pub mod constants;
pub mod coords;
pub mod cosmology;
mod error;
pub mod model;
pub mod observation;
pub mod quantity;
pub mod validate;
pub mod write;

pub use error::SosError;

use std::{fmt::Display, str::FromStr};

use validate::ValidationError;

/// What goes into a sky model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    /// A single extended source, e.g. a radio halo.
    Extended,

    /// Only point sources.
    Point,

    /// Extended sources with point sources scattered around them.
    Mixed,
}

impl SourceType {
    /// The code used for this type in configuration files.
    pub fn code(self) -> i64 {
        match self {
            SourceType::Extended => 1,
            SourceType::Point => 2,
            SourceType::Mixed => 3,
        }
    }

    pub fn from_code(code: i64) -> Result<SourceType, ValidationError> {
        match code {
            1 => Ok(SourceType::Extended),
            2 => Ok(SourceType::Point),
            3 => Ok(SourceType::Mixed),
            _ => Err(ValidationError::SourceType(code)),
        }
    }

    /// The tag used in output file names.
    pub fn tag(self) -> &'static str {
        match self {
            SourceType::Extended => "E",
            SourceType::Point => "P",
            SourceType::Mixed => "EnP",
        }
    }

    pub fn has_point_sources(self) -> bool {
        matches!(self, SourceType::Point | SourceType::Mixed)
    }
}

impl FromStr for SourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "extended" | "e" | "1" => Ok(SourceType::Extended),
            "point" | "p" | "2" => Ok(SourceType::Point),
            "mixed" | "enp" | "3" => Ok(SourceType::Mixed),
            _ => Err(format!(
                "unknown source type '{s}'; expected one of extended, point, mixed"
            )),
        }
    }
}

impl Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceType::Extended => "extended",
            SourceType::Point => "point",
            SourceType::Mixed => "mixed",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_type_codes() {
        for t in [SourceType::Extended, SourceType::Point, SourceType::Mixed] {
            assert_eq!(SourceType::from_code(t.code()), Ok(t));
            assert_eq!(t.to_string().parse::<SourceType>(), Ok(t));
            assert_eq!(t.tag().parse::<SourceType>(), Ok(t));
        }
        assert_eq!(
            SourceType::from_code(4),
            Err(ValidationError::SourceType(4))
        );
        assert!("halo".parse::<SourceType>().is_err());
        assert!(!SourceType::Extended.has_point_sources());
        assert!(SourceType::Mixed.has_point_sources());
    }
}

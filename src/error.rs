//! All the errors a run can end with.

use thiserror::Error;

use crate::{
    config::ConfigError,
    coords::CoordError,
    validate::{ResourceError, ValidationError},
    write::WriteError,
};

#[derive(Error, Debug)]
pub enum SosError {
    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

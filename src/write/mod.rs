//! Hand sky models over to the imaging toolkit.
//!
//! The toolkit rasterises model images and predicts visibilities; what it
//! needs from us is one component list per redshift (plain text, one Gaussian
//! component per line) and a logbook describing the run.


use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crossbeam_channel::Receiver;
use crossbeam_utils::atomic::AtomicCell;
use indicatif::ProgressBar;
use itertools::Itertools;
use log::{debug, trace};
use thiserror::Error;

use crate::{
    constants::{
        COMPONENT_LIST_EXTENSION, DEFAULT_BRIGHTNESS_UNIT,
        DEFAULT_FREQUENCY_INCREMENT, IMAGE_EXTENSION,
    },
    coords::SkyPosition,
    model::{ComponentShape, SkyModel, SourceDescriptor},
    validate::ImageParams,
    SourceType,
};

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Couldn't create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// The name of the image made at redshift `z`, e.g. `haloE_0.05`.
pub fn image_name(prefix: &str, source_type: SourceType, z: f64) -> String {
    // Debug formatting keeps the ".0" on whole redshifts.
    format!("{prefix}{}_{z:?}", source_type.tag())
}

/// The logbook file name for a source type, e.g. `logbookEnP.txt`.
pub fn logbook_name(source_type: SourceType) -> String {
    format!("logbook{}.txt", source_type.tag())
}

/// One component in the toolkit's component-list syntax.
pub fn format_component(component: &SourceDescriptor, frequency: &str) -> String {
    let axis = match component.shape {
        ComponentShape::Extended {
            angular_size_arcmin,
        } => format!("{angular_size_arcmin}arcmin"),
        ComponentShape::Point => format!("{}arcsec", component.shape.major_axis_arcsec()),
    };
    format!(
        "dir=\"{}\" flux={} fluxunit=Jy freq={frequency} shape=Gaussian majoraxis={axis} minoraxis={axis} positionangle={}deg",
        component.position.to_j2000(),
        component.flux_jy,
        component.position_angle_deg,
    )
}

fn create(path: &Path) -> Result<BufWriter<File>, WriteError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| WriteError::Create {
            path: path.to_path_buf(),
            source,
        })
}

fn write_component_list(
    path: &Path,
    name: &str,
    image: &ImageParams,
    centre: SkyPosition,
    model: &SkyModel,
) -> Result<(), WriteError> {
    let frequency = image.reference_frequency.to_string();
    let mut out = create(path)?;
    writeln!(out, "# image={name}.{IMAGE_EXTENSION}")?;
    writeln!(out, "# shape=[{0}, {0}, 1, 1]", image.image_size)?;
    writeln!(out, "# cell={}", image.cell_size)?;
    writeln!(out, "# reference={}", centre.to_j2000())?;
    let (ra_rad, dec_rad) = centre.to_radians();
    writeln!(out, "# reference_rad=[{ra_rad}, {dec_rad}]")?;
    writeln!(out, "# frequency={frequency}")?;
    writeln!(out, "# frequency_increment={DEFAULT_FREQUENCY_INCREMENT}")?;
    writeln!(out, "# brightness_unit={DEFAULT_BRIGHTNESS_UNIT}")?;
    writeln!(out, "# redshift={:?}", model.redshift)?;
    for component in &model.components {
        writeln!(out, "{}", format_component(component, &frequency))?;
    }
    out.flush()?;
    Ok(())
}

/// Receive sky models and write a component list for each of them into
/// `dir`. This is intended to be run concurrently with the thread building
/// the models.
///
/// # Arguments
///
/// * `dir` - the directory the component lists go into.
/// * `prefix` - prepended to every image name.
/// * `source_type` - the kind of sky models being received; used for naming.
/// * `image` - the layout of the images the toolkit should make.
/// * `centre` - the image centre.
/// * `rx` - the channel to receive sky models from.
/// * `error` - a thread-safe [`bool`] to indicate if an error has occurred.
///   Receiving `true` signals that we should not continue, as another thread
///   has experienced an error. If writing fails, this is set to `true`.
/// * `progress_bar` - an optional progress bar to increment with writing
///   progress.
///
/// # Returns
///
/// * The paths of the component lists written, in the order they were
///   received.
#[allow(clippy::too_many_arguments)]
pub fn write_component_lists(
    dir: &Path,
    prefix: &str,
    source_type: SourceType,
    image: &ImageParams,
    centre: SkyPosition,
    rx: Receiver<SkyModel>,
    error: &AtomicCell<bool>,
    progress_bar: Option<ProgressBar>,
) -> Result<Vec<PathBuf>, WriteError> {
    let mut written = vec![];
    for model in rx.iter() {
        // Should we continue?
        if error.load() {
            return Ok(written);
        }

        let name = image_name(prefix, source_type, model.redshift);
        let path = dir.join(format!("{name}.{COMPONENT_LIST_EXTENSION}"));
        debug!(
            "Writing {} ({} components)",
            path.display(),
            model.components.len()
        );
        trace!("{model:?}");
        if let Err(e) = write_component_list(&path, &name, image, centre, &model) {
            error.store(true);
            return Err(e);
        }
        written.push(path);

        if let Some(progress_bar) = progress_bar.as_ref() {
            progress_bar.inc(1);
        }
    }

    if let Some(progress_bar) = progress_bar.as_ref() {
        progress_bar.abandon_with_message("Finished writing component lists");
    }
    debug!("Finished writing");
    Ok(written)
}

/// Write the run summary: redshifts, distances, source sizes and fluxes,
/// positions and image names.
pub fn write_logbook(
    path: &Path,
    prefix: &str,
    source_type: SourceType,
    centre: SkyPosition,
    models: &[SkyModel],
) -> Result<(), WriteError> {
    let mut out = create(path)?;
    let list = |f: fn(&SkyModel, usize) -> f64, i: usize| {
        models.iter().map(|m| format!("{:?}", f(m, i))).join(", ")
    };

    writeln!(out, "source type: {source_type}")?;
    writeln!(out, "\nredshifts:\n[{}]", list(|m, _| m.redshift, 0))?;
    writeln!(
        out,
        "\nangular diameter distances [Mpc]:\n[{}]",
        list(|m, _| m.angular_diameter_distance_mpc, 0)
    )?;
    for (i, label) in ["theta1", "theta2", "theta3"].iter().enumerate() {
        writeln!(
            out,
            "\n{label} [arcmin]:\n[{}]",
            list(|m, i| m.variants[i].angular_size_arcmin, i)
        )?;
    }
    for (i, label) in ["flux1", "flux2", "flux3"].iter().enumerate() {
        writeln!(
            out,
            "\n{label} [Jy]:\n[{}]",
            list(|m, i| m.variants[i].flux_jy, i)
        )?;
    }

    writeln!(out, "\nreference position: {}", centre.to_j2000())?;
    writeln!(out, "reference RA [arcsec]: {}", centre.ra_arcsec())?;
    writeln!(out, "reference DEC [arcsec]: {}", centre.dec_arcsec())?;

    if source_type.has_point_sources() {
        let points = models
            .first()
            .map(|m| {
                m.components
                    .iter()
                    .filter(|c| c.shape == ComponentShape::Point)
                    .map(|c| format!("{} ({} Jy)", c.position.to_j2000(), c.flux_jy))
                    .join("\n")
            })
            .unwrap_or_default();
        writeln!(out, "\npoint sources:\n{points}")?;
    }

    writeln!(
        out,
        "\nname of the images:\n[{}]",
        models
            .iter()
            .map(|m| image_name(prefix, source_type, m.redshift))
            .join(", ")
    )?;
    out.flush()?;
    debug!("Wrote logbook {}", path.display());
    Ok(())
}

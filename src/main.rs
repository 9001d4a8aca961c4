use std::{path::PathBuf, process::exit, thread::scope};

use clap::{AppSettings, Parser};
use crossbeam_channel::bounded;
use crossbeam_utils::atomic::AtomicCell;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info, warn};

use sos::{
    config::SimConfig,
    cosmology::CosmologyCalculator,
    model::{default_reference_position, RandomOffsets, SourceModelBuilder},
    observation::ObservationPlan,
    validate::validate_config_file,
    write::{logbook_name, write_component_lists, write_logbook},
    SosError, SourceType,
};

#[derive(Parser)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_long_args = true)]
struct Args {
    /// The TOML configuration of the simulation. Every key has a default.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// The directory to write component lists and the logbook into.
    #[clap(short, long, default_value = ".")]
    output: PathBuf,

    /// Prepended to the name of every image.
    #[clap(long, default_value = "")]
    prefix: String,

    /// Override the configured redshifts. The first is the one the source
    /// flux density is given at.
    #[clap(short, long, multiple_values(true))]
    redshifts: Option<Vec<f64>>,

    /// Override the configured source type: extended, point or mixed.
    #[clap(short, long)]
    source_type: Option<SourceType>,

    /// Seed for placing point sources. If not given, a random seed is used
    /// (and reported).
    #[clap(long)]
    seed: Option<u64>,

    /// How many point sources point and mixed sky models get.
    #[clap(long, default_value = "5")]
    num_point_sources: usize,

    /// Write a configuration file with every key at its default, then exit.
    #[clap(long)]
    write_default_config: Option<PathBuf>,

    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,

    /// Disable progress bars.
    #[clap(long)]
    no_progress_bars: bool,
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbosity);

    if let Err(e) = try_main(args) {
        eprintln!("{e}");
        exit(1);
    }
}

fn try_main(args: Args) -> Result<(), SosError> {
    if let Some(path) = args.write_default_config {
        SimConfig::write_default(&path)?;
        return Ok(());
    }

    let mut config = match args.config.as_ref() {
        Some(path) => SimConfig::from_file(path)?,
        None => {
            info!("No config given; using defaults");
            SimConfig::default()
        }
    };
    if let Some(redshifts) = args.redshifts {
        config.simulation.redshifts = redshifts;
    }
    if let Some(source_type) = args.source_type {
        config.source.source_type = source_type.code();
    }
    config.validate()?;
    let source_type = config.source_type()?;
    let image = config.image_params()?;

    // The array configuration is only needed by the toolkit, later.
    if let Err(e) = validate_config_file(&config.telescope.config_file) {
        warn!("{e}; visibilities can't be simulated without it");
    }
    let plan = ObservationPlan::new(&config)?;
    plan.log_summary();

    let cosmology = CosmologyCalculator::default();
    info!(
        "Cosmology: H0 = {} km/s/Mpc, Ω_m = {}, Ω_Λ = {}",
        cosmology.h0(),
        cosmology.omega_m(),
        cosmology.omega_l()
    );
    let centre = default_reference_position();
    let builder = SourceModelBuilder::new(cosmology)
        .with_source_type(source_type)
        .with_num_point_sources(args.num_point_sources);

    let seed = args.seed.unwrap_or_else(rand::random);
    if source_type.has_point_sources() {
        info!("Placing point sources with seed {seed}");
    }
    let mut offsets = RandomOffsets::from_seed(seed);
    let prepared = builder.prepare(
        &config.simulation.redshifts,
        config.source.linear_size_mpc,
        config.source.flux_density_jy,
        config.simulation.spectral_index,
        &mut offsets,
    )?;
    let num_models = prepared.redshifts().len();
    info!(
        "Building {num_models} {source_type} sky model(s) at {}",
        image.reference_frequency
    );

    std::fs::create_dir_all(&args.output)?;

    // Models are built on one thread and written on another, with a bounded
    // channel between them.
    let (tx, rx) = bounded(5);
    let error = AtomicCell::new(false);
    let multi_progress = MultiProgress::with_draw_target(if args.no_progress_bars {
        ProgressDrawTarget::hidden()
    } else {
        ProgressDrawTarget::stdout()
    });
    let pb_style = ProgressStyle::default_bar()
        .template("{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} redshifts ({elapsed_precise}<{eta_precise})")
        .unwrap()
        .progress_chars("=> ");
    let build_progress = multi_progress.add(
        ProgressBar::new(num_models as _)
            .with_style(pb_style.clone())
            .with_position(0)
            .with_message("Building"),
    );
    let write_progress = multi_progress.add(
        ProgressBar::new(num_models as _)
            .with_style(pb_style.clone())
            .with_position(0)
            .with_message("Writing"),
    );
    build_progress.tick();
    write_progress.tick();

    let (models, written) = scope(|s| {
        let builder_handle = s.spawn(|| {
            let mut models = Vec::with_capacity(num_models);
            for model in prepared.iter() {
                // Should we continue?
                if error.load() {
                    break;
                }
                debug!(
                    "z = {}: D_A = {:.2} Mpc, {:.4} arcmin, {:.6} Jy ({} Jy at the last channel)",
                    model.redshift,
                    model.angular_diameter_distance_mpc,
                    model.primary().angular_size_arcmin,
                    model.primary().flux_jy,
                    plan.channel_fluxes(model.primary().flux_jy)
                        .last()
                        .copied()
                        .unwrap_or_default()
                );
                models.push(model.clone());
                if tx.send(model).is_err() {
                    error.store(true);
                    break;
                }
                build_progress.inc(1);
            }
            drop(tx);
            build_progress.abandon_with_message("Finished building");
            models
        });

        let written = write_component_lists(
            &args.output,
            &args.prefix,
            source_type,
            &image,
            centre,
            rx,
            &error,
            Some(write_progress),
        );
        let models = builder_handle
            .join()
            .unwrap_or_else(|e| std::panic::resume_unwind(e));
        (models, written)
    });
    let written = written?;
    for path in &written {
        debug!("Wrote {}", path.display());
    }
    info!(
        "Wrote {} component list(s) to {}",
        written.len(),
        args.output.display()
    );

    let logbook = args.output.join(logbook_name(source_type));
    write_logbook(&logbook, &args.prefix, source_type, centre, &models)?;
    info!("Wrote {}", logbook.display());

    Ok(())
}

fn setup_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.init();
}

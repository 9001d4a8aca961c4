//! End-to-end runs of the library, from configuration to files on disk.

use approx::assert_relative_eq;
use crossbeam_channel::bounded;
use crossbeam_utils::atomic::AtomicCell;

use sos::{
    config::SimConfig,
    coords::{dec_arcsec_to_dms, parse_dec_dms, parse_ra_hms, ra_arcsec_to_hms, radians_to_arcsec},
    cosmology::CosmologyCalculator,
    model::{default_reference_position, RandomOffsets, SourceModelBuilder},
    observation::ObservationPlan,
    write::{logbook_name, write_component_lists, write_logbook},
    SourceType,
};

#[test]
fn default_cosmology_scenario() {
    let c = CosmologyCalculator::default();
    let d_low = c.angular_diameter_distance(0.1);
    let d_high = c.angular_diameter_distance(1.0);
    assert!(d_low > 0.0 && d_low.is_finite());
    assert!(d_high > 0.0 && d_high.is_finite());

    let size_low = c.calculate_angular_size(1.0, 0.1);
    let size_high = c.calculate_angular_size(1.0, 1.0);
    assert!(size_low > size_high && size_high > 0.0);

    let near = c.calculate_flux_density(1.0, 0.05, 0.1, -1.6);
    let far = c.calculate_flux_density(1.0, 0.05, 1.0, -1.6);
    assert!(far < near && near < 1.0);
}

#[test]
fn coordinates_survive_a_round_trip() {
    for ra_arcsec in [0.0, 15.0, 216000.0, 243900.0, 1_000_000.0] {
        let hours = parse_ra_hms(&ra_arcsec_to_hms(ra_arcsec).unwrap()).unwrap();
        assert!((hours - ra_arcsec / 54000.0).abs() <= 0.01 / 3600.0);
    }
    for dec_arcsec in [-324000.0, -72000.0, -1.5, 0.0, 163815.5, 324000.0] {
        let degrees = parse_dec_dms(&dec_arcsec_to_dms(dec_arcsec).unwrap()).unwrap();
        assert!((degrees - dec_arcsec / 3600.0).abs() <= 0.01 / 3600.0);
        if dec_arcsec < 0.0 {
            assert!(degrees < 0.0);
        }
    }
    let arcsec = radians_to_arcsec(1.0);
    assert!(arcsec > 206264.0 && arcsec < 206265.0);
}

#[test]
fn writer_failure_stops_the_builder() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    let builder = SourceModelBuilder::new(CosmologyCalculator::default());
    let redshifts: Vec<f64> = (1..=50).map(|i| i as f64 * 0.1).collect();
    let prepared = builder
        .prepare(&redshifts, 0.5, 0.6, -1.6, &mut RandomOffsets::from_seed(1))
        .unwrap();

    let (tx, rx) = bounded(1);
    let error = AtomicCell::new(false);
    let (built, result) = std::thread::scope(|s| {
        let producer = s.spawn(|| {
            let mut built = 0;
            for model in prepared.iter() {
                if error.load() {
                    break;
                }
                if tx.send(model).is_err() {
                    error.store(true);
                    break;
                }
                built += 1;
            }
            drop(tx);
            built
        });
        let result = write_component_lists(
            &missing,
            "",
            SourceType::Extended,
            &SimConfig::default().image_params().unwrap(),
            default_reference_position(),
            rx,
            &error,
            None,
        );
        (producer.join().unwrap(), result)
    });
    assert!(result.is_err());
    assert!(error.load());
    assert!(built < redshifts.len());
}

#[test]
fn config_to_files() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("sos.toml");
    std::fs::write(
        &config_path,
        r#"
[simulation]
redshifts = [0.05, 0.2, 0.5]
channels = 2

[source]
source_type = 3
"#,
    )
    .unwrap();
    let config = SimConfig::from_file(&config_path).unwrap();
    let source_type = config.source_type().unwrap();
    assert_eq!(source_type, SourceType::Mixed);

    let plan = ObservationPlan::new(&config).unwrap();
    assert_eq!(plan.channel_freqs_hz.len(), 2);

    let builder = SourceModelBuilder::new(CosmologyCalculator::default()).with_source_type(source_type);
    let prepared = builder
        .prepare(
            &config.simulation.redshifts,
            config.source.linear_size_mpc,
            config.source.flux_density_jy,
            config.simulation.spectral_index,
            &mut RandomOffsets::from_seed(2017),
        )
        .unwrap();
    assert_eq!(prepared.redshifts().len(), 3);

    // Build on one thread, write on another.
    let (tx, rx) = bounded(1);
    let error = AtomicCell::new(false);
    let (models, written) = std::thread::scope(|s| {
        let producer = s.spawn(|| {
            let mut models = vec![];
            for model in prepared.iter() {
                if error.load() {
                    break;
                }
                models.push(model.clone());
                if tx.send(model).is_err() {
                    error.store(true);
                    break;
                }
            }
            drop(tx);
            models
        });
        let written = write_component_lists(
            dir.path(),
            "",
            source_type,
            &config.image_params().unwrap(),
            default_reference_position(),
            rx,
            &error,
            None,
        )
        .unwrap();
        (producer.join().unwrap(), written)
    });
    assert!(!error.load());
    assert_eq!(models.len(), 3);
    assert_relative_eq!(models[0].primary().flux_jy, 0.6, max_relative = 1e-6);
    assert_eq!(written.len(), 3);
    assert!(written.iter().all(|p| p.exists()));
    assert!(written[2].ends_with("EnP_0.5.cl"));

    let logbook = dir.path().join(logbook_name(source_type));
    write_logbook(
        &logbook,
        "",
        source_type,
        default_reference_position(),
        &models,
    )
    .unwrap();
    let content = std::fs::read_to_string(logbook).unwrap();
    assert!(content.contains("[EnP_0.05, EnP_0.2, EnP_0.5]"));
}

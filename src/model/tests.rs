use approx::{assert_abs_diff_eq, assert_relative_eq};

use super::*;
use crate::{constants::DEFAULT_REDSHIFTS, coords::Offset};

fn builder(source_type: SourceType) -> SourceModelBuilder {
    SourceModelBuilder::new(CosmologyCalculator::default()).with_source_type(source_type)
}

fn fixed() -> FixedOffsets {
    FixedOffsets(
        (1..=5)
            .map(|i| Offset {
                ra_arcsec: i as f64,
                dec_arcsec: -(i as f64),
            })
            .collect(),
    )
}

#[test]
fn one_model_per_redshift_in_order() {
    let zs = [0.5, 0.05, 1.0, 0.2];
    let models = builder(SourceType::Extended)
        .build(&zs, 0.5, 0.6, -1.6, &mut fixed())
        .unwrap();
    assert_eq!(models.len(), zs.len());
    for (model, z) in models.iter().zip(zs) {
        assert_eq!(model.redshift, z);
    }

    let models = builder(SourceType::Extended)
        .build(&DEFAULT_REDSHIFTS, 0.5, 0.6, -1.6, &mut fixed())
        .unwrap();
    assert_eq!(models.len(), 13);
}

#[test]
fn reference_redshift_keeps_reference_flux() {
    let models = builder(SourceType::Extended)
        .build(&[0.05, 0.1, 1.0], 0.5, 0.6, -1.6, &mut fixed())
        .unwrap();
    assert_relative_eq!(models[0].primary().flux_jy, 0.6, max_relative = 1e-6);
    assert_relative_eq!(models[1].primary().flux_jy, 0.1654, max_relative = 1e-3);
    assert!(models[2].primary().flux_jy < models[1].primary().flux_jy);

    let c = CosmologyCalculator::default();
    assert_eq!(
        models[1].angular_diameter_distance_mpc,
        c.angular_diameter_distance(0.1)
    );
    assert_eq!(
        models[1].primary().angular_size_arcmin,
        c.calculate_angular_size(0.5, 0.1)
    );
}

#[test]
fn variants_scale_size_down_and_flux_up() {
    let models = builder(SourceType::Extended)
        .build(&[0.05, 0.3], 0.5, 0.6, -1.6, &mut fixed())
        .unwrap();
    for model in &models {
        let [primary, halved, thirded] = model.variants;
        assert_eq!((primary.size_divisor, primary.flux_factor), (1.0, 1.0));
        assert_eq!((halved.size_divisor, halved.flux_factor), (2.0, 2.0));
        assert_eq!((thirded.size_divisor, thirded.flux_factor), (3.0, 3.0));
        assert_abs_diff_eq!(
            halved.angular_size_arcmin,
            primary.angular_size_arcmin / 2.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(halved.flux_jy, primary.flux_jy * 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            thirded.angular_size_arcmin,
            primary.angular_size_arcmin / 3.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(thirded.flux_jy, primary.flux_jy * 3.0, epsilon = 1e-12);
    }
}

#[test]
fn zero_redshift_gives_zero_size_and_unscaled_flux() {
    let models = builder(SourceType::Extended)
        .build(&[0.0, 0.1], 0.5, 0.6, -1.6, &mut fixed())
        .unwrap();
    assert_eq!(models[0].angular_diameter_distance_mpc, 0.0);
    assert_eq!(models[0].primary().angular_size_arcmin, 0.0);
    assert_eq!(models[0].primary().flux_jy, 0.6);
    // The reference distance is zero, so the flux short-circuits everywhere.
    assert_eq!(models[1].primary().flux_jy, 0.6);
}

#[test]
fn components_depend_on_source_type() {
    let zs = [0.05, 0.1];

    let extended = builder(SourceType::Extended)
        .build(&zs, 0.5, 0.6, -1.6, &mut fixed())
        .unwrap();
    for model in &extended {
        assert_eq!(model.components.len(), 1);
        let c = model.components[0];
        assert_eq!(
            c.shape,
            ComponentShape::Extended {
                angular_size_arcmin: model.primary().angular_size_arcmin
            }
        );
        assert_eq!(c.position, default_reference_position());
        assert_eq!(c.position_angle_deg, 45.0);
    }

    let point = builder(SourceType::Point)
        .build(&zs, 0.5, 0.6, -1.6, &mut fixed())
        .unwrap();
    for model in &point {
        assert_eq!(model.components.len(), 5);
        for (i, c) in model.components.iter().enumerate() {
            assert_eq!(c.shape, ComponentShape::Point);
            assert_eq!(c.shape.major_axis_arcsec(), 3.0);
            assert_abs_diff_eq!(c.flux_jy, 0.1 * (i + 1) as f64, epsilon = 1e-12);
        }
    }

    let mixed = builder(SourceType::Mixed)
        .build(&zs, 0.5, 0.6, -1.6, &mut fixed())
        .unwrap();
    for model in &mixed {
        assert_eq!(model.components.len(), 3 + 5);
        let extended_count = model
            .components
            .iter()
            .filter(|c| matches!(c.shape, ComponentShape::Extended { .. }))
            .count();
        assert_eq!(extended_count, 3);
    }
}

#[test]
fn point_sources_use_injected_offsets() {
    let models = builder(SourceType::Point)
        .build(&[0.05, 0.5], 0.5, 0.6, -1.6, &mut fixed())
        .unwrap();
    let reference = default_reference_position();
    for model in &models {
        for (i, c) in model.components.iter().enumerate() {
            let expected = reference
                .offset_by(Offset {
                    ra_arcsec: (i + 1) as f64,
                    dec_arcsec: -((i + 1) as f64),
                })
                .unwrap();
            assert_eq!(c.position, expected);
        }
    }
    // Positions are shared across redshifts.
    assert_eq!(models[0].components, models[1].components);
}

#[test]
fn prepared_models_match_the_parallel_build() {
    let zs = [0.05, 0.1, 1.0, 0.0];
    let b = builder(SourceType::Mixed);
    let built = b.build(&zs, 0.5, 0.6, -1.6, &mut fixed()).unwrap();
    let prepared = b.prepare(&zs, 0.5, 0.6, -1.6, &mut fixed()).unwrap();
    assert_eq!(prepared.redshifts().iter().copied().collect::<Vec<_>>(), zs);
    assert_eq!(prepared.point_sources().len(), 5);

    let streamed: Vec<SkyModel> = prepared.iter().collect();
    assert_eq!(streamed, built.to_vec());
    assert_eq!(prepared.model_at(1.0), built[2]);
}

#[test]
fn offsets_past_a_pole_are_rejected() {
    // The fixed offsets all head south.
    let near_pole = SkyPosition::new(0.0, -(90.0 * 3600.0 - 0.5)).unwrap();
    let result = builder(SourceType::Point)
        .with_reference_position(near_pole)
        .build(&[0.05], 0.5, 0.6, -1.6, &mut fixed());
    assert!(matches!(
        result,
        Err(ValidationError::Coordinate(CoordError::BeyondPole(_)))
    ));

    // Extended sources don't need offsets, so they still work.
    assert!(builder(SourceType::Extended)
        .with_reference_position(near_pole)
        .build(&[0.05], 0.5, 0.6, -1.6, &mut fixed())
        .is_ok());
}

#[test]
fn fewer_offsets_than_requested_gives_fewer_point_sources() {
    let mut offsets = FixedOffsets(vec![Offset::default(); 2]);
    let models = builder(SourceType::Point)
        .build(&[0.1], 0.5, 0.6, -1.6, &mut offsets)
        .unwrap();
    assert_eq!(models[0].components.len(), 2);

    let models = builder(SourceType::Point)
        .with_num_point_sources(0)
        .build(&[0.1], 0.5, 0.6, -1.6, &mut fixed())
        .unwrap();
    assert!(models[0].components.is_empty());
}

#[test]
fn seeded_offsets_are_reproducible() {
    let b = builder(SourceType::Mixed);
    let first = b
        .build(&[0.05, 0.2], 0.5, 0.6, -1.6, &mut RandomOffsets::from_seed(42))
        .unwrap();
    let second = b
        .build(&[0.05, 0.2], 0.5, 0.6, -1.6, &mut RandomOffsets::from_seed(42))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn random_offsets_lie_on_the_region_edge() {
    let c = CosmologyCalculator::default();
    let region = OffsetRegion::around_extended(c.calculate_angular_size(0.5, 0.05));
    let mut generator = RandomOffsets::from_seed(7);
    for _ in 0..20 {
        let offsets = generator.offsets(5, &region);
        assert_eq!(offsets.len(), 5);
        for o in offsets {
            assert_abs_diff_eq!(
                o.ra_arcsec.abs() + o.dec_arcsec.abs(),
                region.l1_radius_arcsec,
                epsilon = 1e-9
            );
            assert!(o.ra_arcsec != 0.0);
            assert!(o.dec_arcsec != 0.0);
        }
    }
}

#[test]
fn region_is_sized_from_the_nearest_source() {
    let c = CosmologyCalculator::default();
    let size = c.calculate_angular_size(0.5, 0.05);
    let region = OffsetRegion::around_extended(size);
    assert_relative_eq!(
        region.l1_radius_arcsec,
        std::f64::consts::SQRT_2 * size * 30.0 * 47.0 / 44.0,
        max_relative = 1e-12
    );

    // Zero redshift is skipped when picking the nearest source.
    let models = builder(SourceType::Point)
        .build(&[0.0, 0.05, 0.5], 0.5, 0.6, -1.6, &mut RandomOffsets::from_seed(1))
        .unwrap();
    let reference = default_reference_position();
    for comp in &models[0].components {
        let d_ra = comp.position.ra_arcsec() - reference.ra_arcsec();
        let d_dec = comp.position.dec_arcsec() - reference.dec_arcsec();
        assert_abs_diff_eq!(
            d_ra.abs() + d_dec.abs(),
            region.l1_radius_arcsec,
            epsilon = 1e-6
        );
    }
}

#[test]
fn builder_options_are_applied() {
    let centre = SkyPosition::from_sexagesimal("12h00m00.00s", "+10d00m00.00s").unwrap();
    let models = builder(SourceType::Extended)
        .with_reference_position(centre)
        .with_position_angle(30.0)
        .build(&[0.1], 0.5, 0.6, -1.6, &mut fixed())
        .unwrap();
    let c = models[0].components[0];
    assert_eq!(c.position, centre);
    assert_eq!(c.position_angle_deg, 30.0);
}

#[test]
fn invalid_inputs_fail_without_results() {
    let b = builder(SourceType::Mixed);
    assert_eq!(
        b.build(&[], 0.5, 0.6, -1.6, &mut fixed()),
        Err(ValidationError::NoRedshifts)
    );
    assert_eq!(
        b.build(&[0.1, -0.1], 0.5, 0.6, -1.6, &mut fixed()),
        Err(ValidationError::RedshiftOutOfRange(-0.1))
    );
    assert!(matches!(
        b.build(&[0.1, f64::INFINITY], 0.5, 0.6, -1.6, &mut fixed()),
        Err(ValidationError::NonNumericRedshift { index: 1, .. })
    ));
    assert_eq!(
        b.build(&[0.1], 0.5, 0.6, 1.0, &mut fixed()),
        Err(ValidationError::SpectralIndexOutOfRange(1.0))
    );
    assert_eq!(
        b.build(&[0.1], 0.5, -0.6, -1.6, &mut fixed()),
        Err(ValidationError::FluxDensityOutOfRange(-0.6))
    );
    assert_eq!(
        b.build(&[0.1], -0.5, 0.6, -1.6, &mut fixed()),
        Err(ValidationError::LinearSize(-0.5))
    );
}

use escapewonder_core::config::MAX_REGION_SAMPLES;
use escapewonder_core::precision::NATIVE_MANTISSA_BITS;
use escapewonder_core::{
    configure, required_precision_bits, AspectFix, ConfigError, Info, NumericsMode,
    NumericsStrategy, RenderMode, RenderStrategy, Request,
};

// ============================================================================
// Numerics selection
// ============================================================================

#[test]
fn deep_window_selects_arbitrary_under_auto() {
    // Thirteen significant digits: native parsing alone would accept the strings
    let request = Request::with_bounds("-0.75", "-0.7499999999999", "0.1", "0.1000000000001");
    assert_eq!(request.numerics, NumericsMode::Auto);

    let info = configure(&request).unwrap();
    let required = required_precision_bits(&info.bounds, info.image_size(), 255);

    assert!(required > NATIVE_MANTISSA_BITS, "required {}", required);
    assert_eq!(info.numerics_strategy, NumericsStrategy::Arbitrary);
    assert!(info.precision >= required);
    assert!(info.bounds.real_min.is_arbitrary());
}

#[test]
fn shallow_window_stays_native() {
    let info = configure(&Request::default()).unwrap();
    assert_eq!(info.numerics_strategy, NumericsStrategy::Native);
    assert_eq!(info.precision, NATIVE_MANTISSA_BITS);
    assert!(!info.bounds.real_min.is_arbitrary());
}

#[test]
fn explicit_native_is_honoured_for_deep_window() {
    let request = Request {
        numerics: NumericsMode::Native,
        ..Request::with_bounds("-0.75", "-0.7499999999999", "0.1", "0.1000000000001")
    };
    let info = configure(&request).unwrap();
    assert_eq!(info.numerics_strategy, NumericsStrategy::Native);
    assert_eq!(info.precision, NATIVE_MANTISSA_BITS);
}

#[test]
fn precision_above_maximum_is_rejected() {
    let request = Request {
        numerics: NumericsMode::Arbitrary,
        precision: usize::MAX,
        ..Request::default()
    };
    let err = configure(&request).unwrap_err();
    assert_eq!(err.field_name(), Some("precision"));
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn configuring_a_resolved_request_changes_nothing() {
    let requests = [
        Request::default(),
        Request {
            jobs: 8,
            image_width: 320,
            image_height: 200,
            ..Request::with_bounds("-1.5", "-1", "-0.25", "0.25")
        },
        Request {
            render_mode: RenderMode::Region,
            iterate_limit: 1000,
            ..Request::with_bounds("0.25", "0.5", "0", "0.25")
        },
    ];

    for request in requests {
        let info = configure(&request).unwrap();
        let again = configure(&info.to_request()).unwrap();
        assert_eq!(again, info, "{:?}", request);
    }
}

#[test]
fn explicit_strategies_survive_reconfiguration() {
    let request = Request {
        render_mode: RenderMode::SharedRegion,
        numerics: NumericsMode::Arbitrary,
        precision: 100,
        image_width: 16,
        image_height: 16,
        ..Request::default()
    };
    let info = configure(&request).unwrap();
    let again = configure(&info.to_request()).unwrap();

    assert_eq!(again.render_strategy, RenderStrategy::SharedRegion);
    assert_eq!(again.numerics_strategy, NumericsStrategy::Arbitrary);
    assert_eq!(again.precision, 100);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn each_invalid_field_is_named() {
    let cases = [
        (
            Request {
                iterate_limit: 0,
                ..Request::default()
            },
            "iterate_limit",
        ),
        (
            Request {
                diverge_limit: f64::NAN,
                ..Request::default()
            },
            "diverge_limit",
        ),
        (
            Request {
                jobs: 0,
                ..Request::default()
            },
            "jobs",
        ),
        (
            Request {
                image_width: 0,
                ..Request::default()
            },
            "image_width",
        ),
        (Request::with_bounds("-2", "oops", "-1", "1"), "real_max"),
    ];

    for (request, field) in cases {
        let err = configure(&request).unwrap_err();
        assert_eq!(err.field_name(), Some(field), "{}", err);
    }
}

#[test]
fn oversized_sample_lattice_is_rejected() {
    let request = Request {
        region_samples: 20_000_000,
        render_mode: RenderMode::Region,
        image_width: 64,
        image_height: 64,
        ..Request::default()
    };
    let err = configure(&request).unwrap_err();
    assert_eq!(err.field_name(), Some("region_samples"));

    let largest = Request {
        region_samples: MAX_REGION_SAMPLES,
        ..request
    };
    assert!(configure(&largest).is_ok());
}

#[test]
fn inverted_plane_window_is_rejected() {
    let err = configure(&Request::with_bounds("-2", "1", "1", "-1")).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBounds(_)));
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn request_json_uses_snake_case_names() {
    let request = Request {
        render_mode: RenderMode::SharedRegion,
        fix_aspect: AspectFix::Grow,
        ..Request::default()
    };
    let json = request.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["render_mode"], "shared_region");
    assert_eq!(value["fix_aspect"], "grow");
    assert_eq!(value["real_min"], "-2.01");
    assert_eq!(Request::from_json(&json).unwrap(), request);
}

#[test]
fn info_json_roundtrip_native() {
    let info = configure(&Request {
        jobs: 4,
        ..Request::default()
    })
    .unwrap();
    let json = info.to_json().unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["render_strategy"], "shared_region");
    assert_eq!(value["numerics_strategy"], "native");
    assert!(value.get("bounds").is_none());

    assert_eq!(Info::from_json(&json).unwrap(), info);
}

#[test]
fn info_json_keeps_arbitrary_bounds() {
    let request = Request::with_bounds(
        "-0.743643887037158704752191506114774",
        "-0.743643887037158704752191506114700",
        "0.131825904205311970493132056385139",
        "0.131825904205311970493132056385200",
    );
    let info = configure(&request).unwrap();
    assert_eq!(info.numerics_strategy, NumericsStrategy::Arbitrary);

    let restored = Info::from_json(&info.to_json().unwrap()).unwrap();
    assert_eq!(restored.precision, info.precision);

    let drift = restored.bounds.real_min.sub(&info.bounds.real_min).abs();
    assert!(drift.log2_approx() < -(info.precision as f64) + 8.0);
}

#[test]
fn malformed_descriptor_is_reported() {
    assert!(matches!(
        Info::from_json("{\"precision\": 53}"),
        Err(ConfigError::Descriptor(_))
    ));
}

// Ingestion tests - the aggregator driven through a recording surface

mod common;

use std::time::Duration;

use common::harness::{instant, stream};
use common::tracing::init_tracing_from_env;
use livechart::app::{run, IngestError, LineOutcome};
use livechart::config::{ChartConfig, SubplotConfig};
use livechart::services::diagnostics::DeferredDiagnostics;
use livechart::services::time_source::TestTimeSource;
use livechart::view::headless::HeadlessSurface;
use livechart::view::layout::SubplotGrid;
use proptest::prelude::*;

fn config() -> ChartConfig {
    ChartConfig::default()
}

#[test]
fn test_objects_become_named_series() {
    init_tracing_from_env();
    let out = stream(
        &config(),
        &[(0, r#"{"x": 1}"#), (100, r#"{"x": 2}"#), (100, r#"{"x": 3}"#)],
        Duration::ZERO,
    );

    let report = out.report();
    assert_eq!(report.series.values("x"), Some(&[1.0, 2.0, 3.0][..]));
    assert_eq!(report.series.times(), &[0.0, 0.1, 0.2]);
    assert!(out.diagnostics.is_empty());
}

#[test]
fn test_bare_numbers_use_the_default_series() {
    let out = stream(&config(), &instant(&["5", "7", "9"]), Duration::ZERO);

    let report = out.report();
    assert_eq!(report.series.schema().names(), &["value".to_string()]);
    assert_eq!(report.series.values("value"), Some(&[5.0, 7.0, 9.0][..]));
}

#[test]
fn test_schema_drift_stops_the_run() {
    let out = stream(
        &config(),
        &instant(&[r#"{"a":1,"b":2}"#, r#"{"a":3}"#]),
        Duration::ZERO,
    );

    match &out.result {
        Err(IngestError::SchemaDrift {
            line_number,
            missing,
            unexpected,
        }) => {
            assert_eq!(*line_number, 2);
            assert_eq!(missing, &vec!["b".to_string()]);
            assert!(unexpected.is_empty());
        }
        Err(other) => panic!("expected schema drift, got {other}"),
        Ok(_) => panic!("expected schema drift"),
    }
    assert!(out.surface.passes.is_empty());
    assert!(out.surface.presented.is_empty());
}

#[test]
fn test_garbage_first_line_is_fatal() {
    let out = stream(
        &config(),
        &instant(&["not json", r#"{"a":1}"#]),
        Duration::ZERO,
    );

    assert!(matches!(out.result, Err(IngestError::InvalidFirstLine(_))));
    assert_eq!(out.diagnostics.len(), 1);
    assert!(out.diagnostics[0].contains("not json"));
}

#[test]
fn test_garbage_later_is_only_a_diagnostic() {
    let out = stream(
        &config(),
        &instant(&[r#"{"a":1}"#, "not json", "", "true", r#"{"a":2}"#]),
        Duration::ZERO,
    );

    assert_eq!(
        out.outcomes,
        vec![
            LineOutcome::Skipped,
            LineOutcome::Skipped,
            LineOutcome::Skipped,
            LineOutcome::Accepted
        ]
    );
    let report = out.report();
    assert_eq!(report.skipped_lines, 3);
    assert_eq!(report.series.values("a"), Some(&[1.0, 2.0][..]));
    assert_eq!(out.diagnostics.len(), 3);
    assert!(out.diagnostics[2].contains("not a chartable data-type"));
    assert_eq!(out.final_pass().skipped_lines, 3);
}

#[test]
fn test_empty_input_is_fatal() {
    let out = stream(&config(), &[], Duration::ZERO);
    assert!(matches!(out.result, Err(IngestError::EmptyInput)));
}

#[test]
fn test_normalization_happens_at_render_time() {
    let config = ChartConfig {
        normalize: true,
        ..config()
    };
    let out = stream(&config, &instant(&["-4", "2", "4"]), Duration::ZERO);

    assert_eq!(out.final_pass().values("value"), Some(&[-1.0, 0.5, 1.0][..]));
    assert_eq!(
        out.report().series.values("value"),
        Some(&[-4.0, 2.0, 4.0][..])
    );
}

#[test]
fn test_no_pass_before_the_interval() {
    init_tracing_from_env();
    let lines = [
        (0, "0"),
        (400, "1"),
        (400, "2"),
        (400, "3"),
        (400, "4"),
        (400, "5"),
        (400, "6"),
    ];
    let out = stream(&config(), &lines, Duration::ZERO);

    use LineOutcome::{Accepted, Rendered};
    assert_eq!(
        out.outcomes,
        vec![Accepted, Accepted, Rendered, Accepted, Accepted, Rendered]
    );
    // Two cadence passes plus the final one
    assert_eq!(out.report().render_passes, 3);
    assert_eq!(out.surface.passes.len(), 3);
    assert_eq!(out.surface.passes[0].times.len(), 4);
    assert_eq!(out.surface.presented.len(), 1);
}

#[test]
fn test_bulk_mode_renders_once() {
    let config = ChartConfig {
        no_refresh: true,
        render_interval: 0.0,
        ..config()
    };
    let lines: Vec<(u64, &str)> = (0..20).map(|_| (500, "1")).collect();
    let out = stream(&config, &lines, Duration::ZERO);

    assert!(out.outcomes.iter().all(|o| *o == LineOutcome::Accepted));
    assert_eq!(out.surface.passes.len(), 1);
    assert_eq!(out.surface.passes[0].times.len(), 20);
}

#[test]
fn test_zero_interval_renders_every_line() {
    let config = ChartConfig {
        render_interval: 0.0,
        ..config()
    };
    let out = stream(&config, &instant(&["1", "2", "3"]), Duration::ZERO);

    assert_eq!(out.outcomes, vec![LineOutcome::Rendered; 2]);
    assert_eq!(out.surface.passes.len(), 3);
}

#[test]
fn test_render_time_is_excluded_from_the_time_axis() {
    let lines = [(0, "1"), (1000, "2"), (1000, "3"), (1000, "4")];
    let out = stream(&config(), &lines, Duration::from_millis(500));

    assert_eq!(out.report().series.times(), &[0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn test_raw_time_keeps_render_time() {
    let config = ChartConfig {
        compensate_render_time: false,
        ..config()
    };
    let lines = [(0, "1"), (1000, "2"), (1000, "3"), (1000, "4")];
    let out = stream(&config, &lines, Duration::from_millis(500));

    assert_eq!(out.report().series.times(), &[0.0, 1.0, 2.5, 4.0]);
}

#[test]
fn test_subplots_get_a_cell_and_title_each() {
    let config = ChartConfig {
        subplots: SubplotConfig::auto(),
        ..config()
    };
    let out = stream(
        &config,
        &instant(&[r#"{"a":1,"b":2,"c":3}"#, r#"{"a":2,"b":3,"c":4}"#]),
        Duration::ZERO,
    );

    let pass = out.final_pass();
    assert_eq!(
        pass.grid,
        Some(SubplotGrid {
            vertical: 2,
            horizontal: 2
        })
    );
    assert_eq!(
        pass.titles,
        vec![
            Some("a".to_string()),
            Some("b".to_string()),
            Some("c".to_string())
        ]
    );
    assert!(!pass.legend);
}

#[test]
fn test_shared_chart_needs_a_legend_for_several_series() {
    let out = stream(
        &config(),
        &instant(&[r#"{"a":1,"b":2}"#]),
        Duration::ZERO,
    );
    assert!(out.final_pass().legend);

    let out = stream(&config(), &instant(&["1"]), Duration::ZERO);
    assert!(!out.final_pass().legend);
}

#[test]
fn test_explicit_grid_too_small() {
    let config = ChartConfig {
        subplots: SubplotConfig::grid(2, 1),
        ..config()
    };
    let out = stream(
        &config,
        &instant(&[r#"{"a":1,"b":2,"c":3}"#, r#"{"a":1,"b":2,"c":3}"#]),
        Duration::ZERO,
    );

    assert!(matches!(
        out.result,
        Err(IngestError::GridTooSmall {
            capacity: 2,
            series: 3
        })
    ));
    assert!(out.outcomes.is_empty());
}

#[test]
fn test_explicit_grid_too_large() {
    let config = ChartConfig {
        subplots: SubplotConfig::grid(usize::MAX, 2),
        ..config()
    };
    let out = stream(&config, &instant(&[r#"{"a":1,"b":2,"c":3}"#]), Duration::ZERO);

    assert!(matches!(
        out.result,
        Err(IngestError::GridTooLarge {
            vertical: 2,
            horizontal: usize::MAX
        })
    ));
    assert!(out.surface.passes.is_empty());
}

#[test]
fn test_run_reads_crlf_input_into_headless_json() {
    let mut out = Vec::new();
    let report = run(
        "{\"x\":1}\r\n{\"x\":2}\r\n".as_bytes(),
        &config(),
        HeadlessSurface::new(&mut out),
        DeferredDiagnostics::new(),
        TestTimeSource::shared(),
    )
    .unwrap();
    assert_eq!(report.series.values("x"), Some(&[1.0, 2.0][..]));

    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["series"][0]["name"], "x");
    assert_eq!(json["series"][0]["values"], serde_json::json!([1.0, 2.0]));
    assert_eq!(json["time"].as_array().map(Vec::len), Some(2));
}

fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (-1e6f64..1e6, -1e6f64..1e6).prop_map(|(a, b)| format!(r#"{{"a":{a},"b":{b}}}"#)),
        (-1e6f64..1e6, -1e6f64..1e6).prop_map(|(a, b)| format!(r#"{{"b":{b},"a":{a}}}"#)),
        Just("garbage".to_string()),
        Just("[1, 2]".to_string()),
        Just(r#"{"a":"x","b":1}"#.to_string()),
    ]
}

proptest! {
    #[test]
    fn prop_series_stay_aligned_with_time(
        lines in prop::collection::vec((0u64..2000, line_strategy()), 0..60),
        interval in 0.0f64..2.0,
        render_cost in 0u64..300,
    ) {
        let config = ChartConfig { render_interval: interval, ..config() };
        let mut timeline: Vec<(u64, &str)> = vec![(0, r#"{"a":0,"b":0}"#)];
        timeline.extend(lines.iter().map(|(delay, line)| (*delay, line.as_str())));

        let out = stream(&config, &timeline, Duration::from_millis(render_cost));
        let report = out.report();

        let accepted = out.outcomes.iter().filter(|o| **o != LineOutcome::Skipped).count();
        prop_assert_eq!(report.series.len(), accepted + 1);
        prop_assert_eq!(report.skipped_lines, lines.len() - accepted);
        prop_assert_eq!(out.diagnostics.len(), report.skipped_lines);
        for (_, values) in report.series.iter() {
            prop_assert_eq!(values.len(), report.series.times().len());
        }
        prop_assert!(report.series.times().windows(2).all(|w| w[0] <= w[1]));
    }
}

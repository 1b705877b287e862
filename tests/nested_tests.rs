mod common;

use colflow::DistributionReport;
use colflow::layout::{ColumnLocator, LocatorStack, Translation};
use colflow::types::BoxId;
use common::fixtures::*;
use common::{TestResult, heights, row_positions, run, starts};
use serde_json::json;

const INNER: u32 = 500;

/// Sixty lines of 10 in a three-column container nested in a two-column
/// container of height 100.
fn nested_script() -> serde_json::Value {
    let outer = json!({
        "column_count": 2,
        "column_width": 320,
        "column_gap": 20,
        "content_width": 660,
        "max_height": 100,
        "virtual_height": 600,
        "always_balance": false
    });
    let inner = json!({
        "column_count": 3,
        "column_width": 100,
        "column_gap": 10,
        "content_width": 320,
        "virtual_height": 600,
        "always_balance": false
    });

    let mut events = vec![
        json!({ "event": "enter_child", "offset": 0, "nested_container": INNER }),
        json!({ "event": "push", "id": INNER, "container": { "mode": "columns", "config": inner } }),
    ];
    events.extend(lines(1, 0, 60, 10).0);
    events.push(finalize());
    events.push(json!({ "event": "pop" }));
    events.push(json!({ "event": "leave_child", "offset": 0 }));
    events.push(finalize());

    columns_script(outer, json!([]), events)
}

/// Total translation of line `line` of the inner container, found by
/// walking the flow through both levels.
fn locate(report: &DistributionReport, line: u32) -> Result<Translation, Box<dyn std::error::Error>> {
    let target = BoxId::new(line);
    let inner_rows = &report.nested[0].rows;

    let mut locators = LocatorStack::new(ColumnLocator::new(target, &report.root.rows, 0)?);
    locators.enter_child(0)?;
    locators.push(ColumnLocator::new(target, inner_rows, 0)?)?;

    for id in 2..=61u32 {
        let top = (id as i32 - 2) * 10;
        locators.set_position(top);
        if id == line {
            locators.set_box_start_found();
        }
        locators.set_position(top + 10);
        if id == line {
            locators.set_box_end_found();
            break;
        }
    }

    assert!(locators.is_box_end_found());
    Ok(locators.total_translation())
}

#[test]
fn inner_container_is_reported_separately() -> TestResult {
    let report = run(nested_script())?;

    assert_eq!(report.nested.len(), 1);
    let inner = &report.nested[0];
    assert_eq!(inner.container, Some(BoxId::new(INNER)));
    assert_eq!(row_positions(&inner.rows), vec![0, 100]);
    assert_eq!(starts(&inner.rows), vec![0, 100, 200, 300, 400, 500]);
    assert_eq!(heights(&inner.rows), vec![100; 6]);

    assert_eq!(starts(&report.root.rows), vec![0, 100]);
    assert_eq!(heights(&report.root.rows), vec![100, 100]);
    Ok(())
}

#[test]
fn nested_offsets_round_trip_through_both_levels() -> TestResult {
    let report = run(nested_script())?;

    for line in [2u32, 12, 20, 42, 55, 61] {
        let local_y = (line as i32 - 2) * 10;
        let total = locate(&report, line)?;
        let screen_y = local_y + total.y;

        // Every line ends up inside the single outer row.
        assert!((0..100).contains(&screen_y), "line {} at {}", line, screen_y);
        assert_eq!(screen_y - total.y, local_y);
    }

    assert_eq!(locate(&report, 42)?, Translation::new(450, -400));
    assert_eq!(locate(&report, 61)?, Translation::new(560, -500));
    Ok(())
}

#[test]
fn nested_report_is_deterministic() -> TestResult {
    let first = run(nested_script())?.to_json(false)?;
    let second = run(nested_script())?.to_json(false)?;

    assert_eq!(first, second);
    Ok(())
}

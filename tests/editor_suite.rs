use std::path::{Path, PathBuf};

use pie_allocator::normalize::chart_entries;
use pie_allocator::{
    AllocationStore, Config, EditorSession, PayloadError, PointerEvent, Resolution, normalize,
    parse_weights,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("fixture read failed")
}

fn session_for(name: &str) -> EditorSession {
    EditorSession::from_payload(&read_fixture(name), Config::default())
        .unwrap_or_else(|err| panic!("{name}: {err}"))
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.starts_with("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.ends_with("</svg>"), "{fixture}: missing </svg tag");
    assert!(!svg.contains("NaN"), "{fixture}: NaN coordinate");
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new payload shapes must be added intentionally.
    let candidates = ["goals.json", "statement.json5", "pairs.json", "thirds.json"];
    for fixture in candidates {
        let session = session_for(fixture);
        assert!(session.store().is_balanced(), "{fixture}: not balanced");
        assert_valid_svg(&session.render_svg(), fixture);
    }
}

#[test]
fn default_goal_payload_round_trips_unchanged() {
    let session = session_for("goals.json");
    assert_eq!(session.store(), &AllocationStore::default_goals());
}

#[test]
fn default_goal_mapping_normalizes_unchanged() {
    let payload = r#"{"Groceries":20,"Travel":15,"Entertainment":10,"Shopping":15,"Bills":20,"Eating Out":10,"Everything Else":10}"#;
    let entries = parse_weights(payload).unwrap();
    let values: Vec<f64> = chart_entries(&entries)
        .iter()
        .map(|entry| entry.value)
        .collect();
    assert_eq!(values, vec![20.0, 15.0, 10.0, 15.0, 20.0, 10.0, 10.0]);

    let session = EditorSession::from_payload(payload, Config::default()).unwrap();
    assert_eq!(session.store(), &AllocationStore::default_goals());
}

#[test]
fn mapping_keeps_key_order_and_reads_currency() {
    let session = session_for("statement.json5");
    let names: Vec<&str> = session
        .store()
        .segments()
        .iter()
        .map(|segment| segment.name.as_str())
        .collect();
    assert_eq!(names, vec!["Rent", "Groceries", "Travel"]);
    assert_eq!(
        session.store().percentages().collect::<Vec<_>>(),
        vec![60, 15, 25]
    );
}

#[test]
fn repeated_pair_names_are_merged() {
    let session = session_for("pairs.json");
    assert_eq!(session.store().len(), 2);
    assert_eq!(session.store().percentage_of("Bills"), Some(67));
    assert_eq!(session.store().percentage_of("Fun"), Some(33));
}

#[test]
fn chart_entries_sum_to_exactly_one_hundred() {
    let entries = parse_weights(&read_fixture("thirds.json")).unwrap();
    let chart = chart_entries(&entries);
    let values: Vec<f64> = chart.iter().map(|entry| entry.value).collect();
    assert_eq!(values, vec![33.34, 33.33, 33.33]);

    let units: u64 = normalize(&entries, Resolution::Hundredths)
        .iter()
        .map(|share| share.units)
        .sum();
    assert_eq!(units, 10_000);
}

#[test]
fn replayed_drag_moves_only_the_shared_boundary() {
    let mut session = session_for("goals.json");
    let events: Vec<PointerEvent> =
        serde_json::from_str(&read_fixture("travel_drag.json")).unwrap();
    assert_eq!(session.replay(&events), 1);

    let store = session.store();
    assert_eq!(store.percentage_of("Travel"), Some(20));
    assert_eq!(store.percentage_of("Entertainment"), Some(5));
    assert_eq!(store.percentage_of("Groceries"), Some(20));
    assert_eq!(store.percentage_of("Shopping"), Some(15));
    assert!(store.is_balanced());
    assert!(!session.controller().is_dragging());
}

#[test]
fn manual_entry_then_auto_fill_rebalances() {
    let mut session = session_for("goals.json");
    let bills = session.store().index_of("Bills").unwrap();
    session
        .store_mut()
        .set_percentage_from_input(bills, "45")
        .unwrap();
    assert_eq!(session.store().total(), 125);
    assert!(session.render_svg().contains("Total must equal 100%"));

    assert!(session.auto_fill());
    assert!(session.store().is_balanced());
    assert!(session.render_svg().contains("Total: 100%"));
}

#[test]
fn malformed_payloads_are_rejected() {
    assert!(matches!(
        parse_weights("{ not json"),
        Err(PayloadError::Syntax(_))
    ));
    assert!(matches!(
        parse_weights("42"),
        Err(PayloadError::UnsupportedShape(_))
    ));
    assert!(EditorSession::from_payload("\"Rent\"", Config::default()).is_err());
}

#[test]
fn zero_weights_render_an_empty_pie() {
    let session =
        EditorSession::from_payload(r#"{"Rent": 0, "Food": "n/a"}"#, Config::default()).unwrap();
    assert_eq!(session.store().total(), 0);
    let svg = session.render_svg();
    assert_valid_svg(&svg, "zero weights");
    assert!(!svg.contains("<path "));
    assert!(svg.contains("Total: 0%"));
}

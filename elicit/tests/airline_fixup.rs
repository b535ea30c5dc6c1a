//! Batch validation of the airline booking spec.
//!
//! Runs the fixup compiler over the built-in schedule and checks the wire
//! shape of accepted values and per-field feedback.

use elicit::airline::{airline_spec, default_flights};
use elicit::core::candidates::NO_MATCHING_OPTIONS;
use elicit::core::types::{Domain, FieldFeedback, FixupOutcome};
use elicit::fixup::compile_fixup;
use indexmap::IndexMap;
use serde_json::{Value, json};

fn fixup(input: Value) -> FixupOutcome {
    let spec = airline_spec(default_flights()).expect("airline spec");
    let input: Domain = serde_json::from_value(input).expect("object input");
    compile_fixup(&spec).run(&input).expect("fixup")
}

fn feedback(outcome: FixupOutcome) -> IndexMap<String, FieldFeedback> {
    match outcome {
        FixupOutcome::Rejected { validation_results } => validation_results,
        FixupOutcome::Accepted { value } => panic!("expected rejection, got {value:?}"),
    }
}

/// Empty input: departure lists every departure city, everything else waits
/// on its dependencies.
#[test]
fn empty_input_reports_dependency_chain() {
    let outcome = fixup(json!({}));
    assert_eq!(
        serde_json::to_value(&outcome).expect("serialize"),
        json!({
            "tag": "rejected",
            "validationResults": {
                "departure": {
                    "valid": false,
                    "allowedOptions": ["London", "Berlin", "Paris", "New York"],
                },
                "arrival": { "valid": false, "needsValidFields": ["departure"] },
                "date": { "valid": false, "needsValidFields": ["departure", "arrival"] },
                "passengers": {
                    "valid": false,
                    "needsValidFields": ["departure", "arrival", "date"],
                },
            },
        })
    );
}

/// A complete matching booking is accepted unchanged.
#[test]
fn matching_booking_is_accepted() {
    let outcome = fixup(json!({
        "departure": "Berlin",
        "arrival": "London",
        "date": "2026-10-04",
        "passengers": 2,
    }));
    assert_eq!(
        serde_json::to_value(&outcome).expect("serialize"),
        json!({
            "tag": "accepted",
            "value": {
                "departure": "Berlin",
                "arrival": "London",
                "date": "2026-10-04",
                "passengers": 2,
            },
        })
    );
}

/// An unreachable arrival is refused with the reachable ones; dependents
/// point at it.
#[test]
fn unreachable_arrival_is_refused() {
    let results = feedback(fixup(json!({ "departure": "London", "arrival": "Tokyo" })));

    assert!(results["departure"].valid);
    assert_eq!(
        results["arrival"],
        FieldFeedback::refused(NO_MATCHING_OPTIONS, Some(vec![json!("New York")]))
    );
    assert_eq!(
        results["date"].needs_valid_fields(),
        Some(&["arrival".to_string()][..])
    );
    assert_eq!(
        results["passengers"].needs_valid_fields(),
        Some(&["arrival".to_string(), "date".to_string()][..])
    );
}

#[test]
fn too_many_passengers_are_refused() {
    let results = feedback(fixup(json!({
        "departure": "London",
        "arrival": "New York",
        "date": "2026-10-02",
        "passengers": 5,
    })));

    assert!(results["date"].valid);
    assert_eq!(
        results["date"].allowed_options,
        Some(vec![json!("2026-10-01"), json!("2026-10-02")])
    );
    assert_eq!(
        results["passengers"].refusal_reason(),
        Some("not enough seats available (5 passengers, max is 1)")
    );
}

/// Passenger counts given as digit strings are normalized to numbers.
#[test]
fn string_passenger_count_is_normalized() {
    let outcome = fixup(json!({
        "departure": "Berlin",
        "arrival": "London",
        "date": "2026-10-04",
        "passengers": "2",
    }));
    let FixupOutcome::Accepted { value } = outcome else {
        panic!("expected acceptance, got {outcome:?}");
    };
    assert_eq!(value["passengers"], json!(2));
}

/// Matching is exact: case and whitespace variants are refused.
#[test]
fn near_miss_values_are_refused() {
    for near in ["berlin", "Berlin ", "BERLIN"] {
        let results = feedback(fixup(json!({ "departure": near })));
        assert_eq!(
            results["departure"].refusal_reason(),
            Some(NO_MATCHING_OPTIONS),
            "expected refusal for {near:?}"
        );
    }
}

/// Fixing up an accepted value again accepts the identical value.
#[test]
fn fixup_is_idempotent() {
    let input = json!({
        "departure": "London",
        "arrival": "New York",
        "date": "2026-10-01",
        "passengers": "3",
        "seat_class": "economy",
    });
    let first = fixup(input.clone());
    assert_eq!(first, fixup(input));

    let FixupOutcome::Accepted { value } = first else {
        panic!("expected acceptance, got {first:?}");
    };
    let again = fixup(serde_json::to_value(&value).expect("serialize"));
    assert_eq!(again, FixupOutcome::Accepted { value });
}

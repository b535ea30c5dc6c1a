//! Airline booking demo: a four-field spec over a flight schedule.
//!
//! `departure -> arrival -> date -> passengers`, each field narrowing the
//! schedule for the next. Used by the CLI and the integration tests.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::types::{FieldContext, OptionChoice, ValidationResult};
use crate::error::SpecError;
use crate::spec::{FieldSpec, FlowSpec, OptionsPipeline, ValidateFn};

pub const FIELDS: [&str; 4] = ["departure", "arrival", "date", "passengers"];

/// Largest party a single booking may carry, whatever the aircraft size.
pub const MAX_PASSENGERS_PER_BOOKING: u64 = 9;

/// One scheduled flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightEntry {
    pub departure: String,
    pub arrival: String,
    pub date: String,
    pub seats: u64,
}

impl FlightEntry {
    fn new(departure: &str, arrival: &str, date: &str, seats: u64) -> Self {
        Self {
            departure: departure.to_string(),
            arrival: arrival.to_string(),
            date: date.to_string(),
            seats,
        }
    }
}

/// Built-in schedule used when no dataset file is given.
pub fn default_flights() -> Vec<FlightEntry> {
    vec![
        FlightEntry::new("London", "New York", "2026-10-01", 100),
        FlightEntry::new("London", "New York", "2026-10-02", 1),
        FlightEntry::new("Berlin", "New York", "2026-10-03", 2),
        FlightEntry::new("Berlin", "London", "2026-10-04", 2),
        FlightEntry::new("Paris", "Tokyo", "2026-10-05", 50),
        FlightEntry::new("New York", "Los Angeles", "2026-10-06", 25),
    ]
}

/// Load a JSON array of flight entries.
pub fn load_flights(path: &Path) -> Result<Vec<FlightEntry>> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

/// Read-only flight lookup shared by every field.
#[derive(Debug, Clone)]
pub struct AirlineSchedule {
    flights: Vec<FlightEntry>,
}

impl AirlineSchedule {
    pub fn new(flights: Vec<FlightEntry>) -> Self {
        Self { flights }
    }

    /// Flights matching every route value present in `ctx`.
    pub fn available(&self, ctx: &FieldContext) -> impl Iterator<Item = &FlightEntry> {
        let departure = ctx.get_str("departure").map(str::to_string);
        let arrival = ctx.get_str("arrival").map(str::to_string);
        let date = ctx.get_str("date").map(str::to_string);
        self.flights.iter().filter(move |flight| {
            departure.as_ref().is_none_or(|d| *d == flight.departure)
                && arrival.as_ref().is_none_or(|a| *a == flight.arrival)
                && date.as_ref().is_none_or(|d| *d == flight.date)
        })
    }

    /// Most seats on any flight matching `ctx`.
    pub fn max_seats(&self, ctx: &FieldContext) -> u64 {
        self.available(ctx)
            .map(|flight| flight.seats)
            .max()
            .unwrap_or(0)
    }
}

/// Distinct values in first-seen order.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<OptionChoice> {
    let mut seen: Vec<&str> = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen.into_iter()
        .map(|value| OptionChoice::from_value(Value::from(value)))
        .collect()
}

/// Accept positive integers given as numbers or digit strings.
fn normalize_passengers(raw: &Value) -> Option<Value> {
    let count = match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    (count > 0).then(|| Value::from(count))
}

fn check_passengers(
    schedule: &AirlineSchedule,
    value: Option<&Value>,
    ctx: &FieldContext,
) -> ValidationResult {
    let max = schedule.max_seats(ctx);
    let Some(value) = value else {
        let bookable = max.min(MAX_PASSENGERS_PER_BOOKING);
        return ValidationResult::Skip {
            allowed_options: Some((1..=bookable).map(Value::from).collect()),
        };
    };
    match value.as_u64() {
        Some(count) if count > max => ValidationResult::Err {
            refusal_reason: format!(
                "not enough seats available ({count} passengers, max is {max})"
            ),
            allowed_options: None,
        },
        Some(count) if count > MAX_PASSENGERS_PER_BOOKING => ValidationResult::Err {
            refusal_reason: format!(
                "at most {} passengers per booking ({count} requested)",
                MAX_PASSENGERS_PER_BOOKING
            ),
            allowed_options: None,
        },
        Some(_) => ValidationResult::Ok {
            value: value.clone(),
            allowed_options: None,
        },
        None => ValidationResult::Err {
            refusal_reason: "passengers must be a positive integer".to_string(),
            allowed_options: None,
        },
    }
}

/// Build the booking spec over `flights`.
pub fn airline_spec(flights: Vec<FlightEntry>) -> Result<FlowSpec, SpecError> {
    let schedule = Arc::new(AirlineSchedule::new(flights));

    let departures = Arc::clone(&schedule);
    let departure = FieldSpec::new(OptionsPipeline::new(move |ctx: &FieldContext| {
        Ok(distinct(
            departures.available(ctx).map(|f| f.departure.as_str()),
        ))
    }))
    .influenced_by(["arrival"])
    .description("City the flight departs from.");

    let arrivals = Arc::clone(&schedule);
    let arrival = FieldSpec::new(OptionsPipeline::new(move |ctx: &FieldContext| {
        Ok(distinct(arrivals.available(ctx).map(|f| f.arrival.as_str())))
    }))
    .requires(["departure"])
    .influenced_by(["date"])
    .description("City the flight arrives in.");

    let dates = Arc::clone(&schedule);
    let date = FieldSpec::new(OptionsPipeline::new(move |ctx: &FieldContext| {
        let passengers = ctx.get_u64("passengers").unwrap_or(1);
        Ok(distinct(
            dates
                .available(ctx)
                .filter(|f| f.seats >= passengers)
                .map(|f| f.date.as_str()),
        ))
    }))
    .requires(["departure", "arrival"])
    .influenced_by(["passengers"])
    .description("Travel date (YYYY-MM-DD).");

    let seats = Arc::clone(&schedule);
    let passengers = FieldSpec::new(
        ValidateFn::new(move |value, ctx| Ok(check_passengers(&seats, value, ctx)))
            .with_normalize(normalize_passengers),
    )
    .requires(["departure", "arrival", "date"])
    .description("Number of passengers travelling.");

    FlowSpec::builder(FIELDS)
        .field("departure", departure)
        .field("arrival", arrival)
        .field("date", date)
        .field("passengers", passengers)
        .build()
}

/// JSON Schema for loose fixup input. Every field is optional; passengers
/// may arrive as a number or a digit string.
pub fn loose_input_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": {
            "departure": { "type": "string" },
            "arrival": { "type": "string" },
            "date": { "type": "string" },
            "passengers": {
                "anyOf": [
                    { "type": "integer", "minimum": 1 },
                    { "type": "string", "pattern": "^\\s*[0-9]+\\s*$" }
                ]
            }
        }
    })
}

//! Flight board: the one flight-listing view, with round-trip pairing.

use anyhow::bail;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use charterdesk_flights::{group_by_date, project, Flight, PairingWarning};

/// One table row of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRow {
    pub flight_id: String,
    pub flight_numbers: String,
    pub route: String,
    pub schedule: String,
    pub return_schedule: Option<String>,
    pub status: String,
    pub status_tone: &'static str,
    pub is_round_trip: bool,
    pub dangling_reference: bool,
}

/// Flight numbers scheduled on one day, return legs included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayGroup {
    pub date: Option<NaiveDate>,
    pub flight_numbers: Vec<String>,
}

/// Rendered-ready board, owned so it can outlive the fetched payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightBoard {
    pub rows: Vec<BoardRow>,
    pub total: usize,
    pub round_trip_count: usize,
    pub single_sector_count: usize,
    pub timeline: Vec<DayGroup>,
    pub warnings: Vec<PairingWarning>,
}

impl FlightBoard {
    pub fn from_flights(flights: &[Flight]) -> Self {
        let listing = project(flights);

        let rows = listing
            .projections
            .iter()
            .map(|p| BoardRow {
                flight_id: p.outbound.id.to_string(),
                flight_numbers: p.display_flight_numbers.clone(),
                route: p.display_route.clone(),
                schedule: p.display_schedule.clone(),
                return_schedule: p.return_schedule.clone(),
                status: p.display_status.clone(),
                status_tone: p.outbound.status.tone(),
                is_round_trip: p.is_round_trip,
                dangling_reference: p.has_dangling_reference(),
            })
            .collect();

        let timeline = group_by_date(flights)
            .into_iter()
            .map(|(date, day)| DayGroup {
                date,
                flight_numbers: day.iter().map(|f| f.flight_no.clone()).collect(),
            })
            .collect();

        Self {
            rows,
            total: listing.total(),
            round_trip_count: listing.round_trip_count(),
            single_sector_count: listing.single_sector_count(),
            timeline,
            warnings: listing.warnings,
        }
    }
}

/// Extract flights from a flight-list response body.
///
/// Accepts either a bare array or the backend envelope `{ "data": [...] }`.
/// Records that do not parse as flights are skipped with a warning; a body
/// with no list at all is an error.
pub fn parse_flights(body: &str) -> anyhow::Result<Vec<Flight>> {
    let value: Value = serde_json::from_str(body)?;
    let records = match &value {
        Value::Array(items) => items,
        Value::Object(envelope) => match envelope.get("data") {
            Some(Value::Array(items)) => items,
            _ => bail!("flight response has no `data` list"),
        },
        _ => bail!("flight response is neither a list nor an envelope"),
    };

    let mut flights = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match serde_json::from_value::<Flight>(record.clone()) {
            Ok(flight) => flights.push(flight),
            Err(err) => tracing::warn!(index, %err, "skipping unreadable flight record"),
        }
    }
    Ok(flights)
}

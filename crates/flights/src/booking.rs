//! Turning the create-flight form into backend payloads.
//!
//! A round trip is created as two flights followed by a link update on the
//! outbound flight once both identifiers are known.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use charterdesk_core::{DomainError, DomainResult, FlightId};

use crate::FlightStatus;

/// Optional overrides for the return leg. Blank fields fall back to the
/// outbound values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReturnDraft {
    pub flight_no: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub status: Option<FlightStatus>,
}

/// Create-flight form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoundTripDraft {
    pub flight_no: String,
    pub origin: String,
    pub destination: String,
    pub date: Option<NaiveDate>,
    pub time: String,
    pub aircraft: Option<String>,
    pub status: FlightStatus,
    /// `Some` when the round-trip option is ticked.
    pub round_trip: Option<ReturnDraft>,
}

/// Payload for creating one flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFlight {
    pub flight_no: String,
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft: Option<String>,
    pub status: FlightStatus,
    pub is_round_trip: bool,
}

/// Update linking an outbound flight to its freshly created return leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReturnLeg {
    #[serde(skip)]
    pub flight_id: FlightId,
    pub return_flight_id: FlightId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPlan {
    pub outbound: NewFlight,
    pub return_leg: Option<NewFlight>,
}

impl BookingPlan {
    /// The follow-up update once both flights exist. `None` for single sectors.
    pub fn link(&self, outbound_id: FlightId, return_id: FlightId) -> Option<LinkReturnLeg> {
        self.return_leg.as_ref().map(|_| LinkReturnLeg {
            flight_id: outbound_id,
            return_flight_id: return_id,
        })
    }
}

fn required(field: &str, value: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Blank strings count as "not provided".
fn provided(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl RoundTripDraft {
    /// Validate the draft and derive the flights to create.
    pub fn plan(&self) -> DomainResult<BookingPlan> {
        let flight_no = required("flightNo", &self.flight_no)?.to_uppercase();
        let origin = required("origin", &self.origin)?.to_uppercase();
        let destination = required("destination", &self.destination)?.to_uppercase();
        let time = required("time", &self.time)?;
        let date = self
            .date
            .ok_or_else(|| DomainError::validation("date is required"))?;
        if origin == destination {
            return Err(DomainError::validation("origin and destination must differ"));
        }
        let aircraft = provided(self.aircraft.as_deref()).map(str::to_string);

        let outbound = NewFlight {
            flight_no: flight_no.clone(),
            origin: origin.clone(),
            destination: destination.clone(),
            date,
            time: time.clone(),
            aircraft: aircraft.clone(),
            status: self.status,
            is_round_trip: self.round_trip.is_some(),
        };

        let Some(back) = &self.round_trip else {
            return Ok(BookingPlan {
                outbound,
                return_leg: None,
            });
        };

        let return_date = back.date.unwrap_or(date);
        if return_date < date {
            return Err(DomainError::validation("return date precedes outbound date"));
        }
        let return_leg = NewFlight {
            flight_no: provided(back.flight_no.as_deref())
                .map(str::to_uppercase)
                .unwrap_or_else(|| format!("{flight_no}R")),
            origin: destination,
            destination: origin,
            date: return_date,
            time: provided(back.time.as_deref()).map(str::to_string).unwrap_or(time),
            aircraft,
            status: back.status.unwrap_or(self.status),
            is_round_trip: true,
        };

        Ok(BookingPlan {
            outbound,
            return_leg: Some(return_leg),
        })
    }
}

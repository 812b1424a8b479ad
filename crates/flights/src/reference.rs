//! Return-leg references.
//!
//! The flight data source hydrates `returnFlightId` differently depending on
//! the query: sometimes a bare identifier, sometimes the whole return flight.
//! The shape is decided once here, at the deserialization boundary, so the
//! projector never has to sniff it.

use serde::{Deserialize, Deserializer, Serialize};
use chrono::NaiveDate;
use serde_json::Value;

use charterdesk_core::FlightId;

use crate::flight::{lenient_date, null_as_default};
use crate::{Flight, FlightStatus};

/// A return-leg reference as hydrated by the fetch layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlightReference {
    /// Only the identifier is known.
    Unresolved(FlightId),
    /// The return flight was populated inline.
    Resolved(Box<Flight>),
}

impl FlightReference {
    /// Canonical identifier regardless of shape.
    pub fn id(&self) -> &FlightId {
        match self {
            FlightReference::Unresolved(id) => id,
            FlightReference::Resolved(flight) => &flight.id,
        }
    }

    pub fn resolved(&self) -> Option<&Flight> {
        match self {
            FlightReference::Resolved(flight) => Some(flight),
            FlightReference::Unresolved(_) => None,
        }
    }

    /// Interpret a raw JSON reference.
    ///
    /// - string or number: bare identifier
    /// - object with `_id`/`id`: populated flight; fields the query did not
    ///   select stay empty
    /// - anything else (null, bool, array, blank id): no reference
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(_) | Value::Number(_) => scalar_id(value).map(FlightReference::Unresolved),
            Value::Object(fields) => {
                let id = fields.get("_id").or_else(|| fields.get("id")).and_then(scalar_id);
                let Some(id) = id else {
                    tracing::debug!("return reference object carries no identifier; ignoring");
                    return None;
                };
                match serde_json::from_value::<PopulatedLeg>(value.clone()) {
                    Ok(leg) => Some(FlightReference::Resolved(Box::new(leg.into_flight(id)))),
                    Err(err) => {
                        tracing::debug!(%id, %err, "unreadable populated return leg; keeping its id");
                        Some(FlightReference::Unresolved(id))
                    }
                }
            }
            other => {
                tracing::debug!(shape = ?other, "malformed return reference; ignoring");
                None
            }
        }
    }
}

/// An embedded return flight. Populate queries may select only some
/// fields, so everything but the identifier is optional.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PopulatedLeg {
    #[serde(default, deserialize_with = "null_as_default")]
    flight_no: String,
    #[serde(default, deserialize_with = "null_as_default")]
    origin: String,
    #[serde(default, deserialize_with = "null_as_default")]
    destination: String,
    #[serde(default, deserialize_with = "lenient_date")]
    date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    time: String,
    #[serde(default)]
    aircraft: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    status: FlightStatus,
    #[serde(
        rename = "returnFlightId",
        alias = "returnFlightReference",
        default,
        deserialize_with = "lenient_reference"
    )]
    return_flight: Option<FlightReference>,
}

impl PopulatedLeg {
    fn into_flight(self, id: FlightId) -> Flight {
        Flight {
            id,
            flight_no: self.flight_no,
            origin: self.origin,
            destination: self.destination,
            date: self.date,
            time: self.time,
            aircraft: self.aircraft,
            status: self.status,
            return_flight: self.return_flight,
        }
    }
}

fn scalar_id(value: &Value) -> Option<FlightId> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    FlightId::new(raw).ok()
}

/// Serde hook for `Flight::return_flight`. Never fails on shape.
pub(crate) fn lenient_reference<'de, D>(deserializer: D) -> Result<Option<FlightReference>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(FlightReference::from_value))
}

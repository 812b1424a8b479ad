use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use charterdesk_core::{Entity, FlightId};

use crate::reference::{lenient_reference, FlightReference};

/// Operational status of a flight.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlightStatus {
    #[default]
    Scheduled,
    Delayed,
    Cancelled,
    Completed,
    InProgress,
    /// Any status this build does not recognise.
    #[serde(other)]
    Unknown,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "scheduled",
            FlightStatus::Delayed => "delayed",
            FlightStatus::Cancelled => "cancelled",
            FlightStatus::Completed => "completed",
            FlightStatus::InProgress => "in-progress",
            FlightStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "Scheduled",
            FlightStatus::Delayed => "Delayed",
            FlightStatus::Cancelled => "Cancelled",
            FlightStatus::Completed => "Completed",
            FlightStatus::InProgress => "In Progress",
            FlightStatus::Unknown => "Unknown",
        }
    }

    /// Badge colour.
    pub fn tone(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "blue",
            FlightStatus::Delayed => "yellow",
            FlightStatus::Cancelled => "red",
            FlightStatus::Completed => "green",
            FlightStatus::InProgress => "purple",
            FlightStatus::Unknown => "gray",
        }
    }
}

impl core::fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flight record as delivered by the flight data source.
///
/// `return_flight` is whatever the fetch layer chose to hydrate: a bare
/// identifier, a populated flight, or nothing. Malformed shapes are already
/// reduced to `None` during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    #[serde(rename = "_id", alias = "id")]
    pub id: FlightId,
    pub flight_no: String,
    pub origin: String,
    pub destination: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,
    #[serde(default)]
    pub aircraft: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: FlightStatus,
    #[serde(
        rename = "returnFlightId",
        alias = "returnFlightReference",
        default,
        deserialize_with = "lenient_reference",
        skip_serializing_if = "Option::is_none"
    )]
    pub return_flight: Option<FlightReference>,
}

impl Flight {
    pub fn new(
        id: FlightId,
        flight_no: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            id,
            flight_no: flight_no.into(),
            origin: origin.into(),
            destination: destination.into(),
            date: None,
            time: String::new(),
            aircraft: None,
            status: FlightStatus::default(),
            return_flight: None,
        }
    }

    pub fn with_return(mut self, reference: FlightReference) -> Self {
        self.return_flight = Some(reference);
        self
    }

    /// Canonical identifier of the referenced return leg, whatever its shape.
    pub fn return_reference_id(&self) -> Option<&FlightId> {
        self.return_flight.as_ref().map(FlightReference::id)
    }

    /// Whether this flight names itself as its own return leg.
    pub fn references_itself(&self) -> bool {
        self.return_reference_id() == Some(&self.id)
    }

    /// Single-sector route, e.g. `MXP → DXB`.
    pub fn route(&self) -> String {
        format!("{} → {}", self.origin, self.destination)
    }

    /// Date and time as shown in listings, e.g. `2025-03-01 09:30`.
    pub fn schedule(&self) -> String {
        let date = self
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        format!("{date} {}", self.time).trim().to_string()
    }
}

impl Entity for Flight {
    type Id = FlightId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a plain date or a full timestamp; anything else becomes `None`.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    let Some(serde_json::Value::String(text)) = raw else {
        return Ok(None);
    };
    Ok(parse_date(&text))
}

pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(err) => {
            tracing::debug!(%err, value = text, "unparseable flight date");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_flight() {
        let flight: Flight = serde_json::from_str(
            r#"{
                "_id": "f1",
                "flightNo": "MJ101",
                "origin": "MXP",
                "destination": "DXB",
                "date": "2025-03-01T00:00:00.000Z",
                "time": "09:30",
                "aircraft": "G650",
                "status": "in-progress",
                "returnFlightId": "f2"
            }"#,
        )
        .unwrap();

        assert_eq!(flight.id.as_str(), "f1");
        assert_eq!(flight.status, FlightStatus::InProgress);
        assert_eq!(flight.status.label(), "In Progress");
        assert_eq!(flight.schedule(), "2025-03-01 09:30");
        assert_eq!(flight.route(), "MXP → DXB");
        assert_eq!(flight.return_reference_id().unwrap().as_str(), "f2");
    }

    #[test]
    fn unknown_status_and_bad_date_degrade() {
        let flight: Flight = serde_json::from_str(
            r#"{"id":"f1","flightNo":"X","origin":"A","destination":"B",
                "date":"soon","status":"boarding"}"#,
        )
        .unwrap();
        assert_eq!(flight.status, FlightStatus::Unknown);
        assert_eq!(flight.status.tone(), "gray");
        assert!(flight.date.is_none());
        assert_eq!(flight.schedule(), "");
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let flight: Flight = serde_json::from_str(
            r#"{"_id":"f3","flightNo":"MJ3","origin":"LIN","destination":"NCE",
                "date":null,"time":null,"aircraft":null,"status":null,"returnFlightId":null}"#,
        )
        .unwrap();
        assert_eq!(flight.time, "");
        assert_eq!(flight.status, FlightStatus::Scheduled);
        assert!(flight.aircraft.is_none());
        assert!(flight.return_flight.is_none());
        assert_eq!(flight.route(), "LIN → NCE");
    }

    #[test]
    fn plain_date_is_accepted() {
        assert_eq!(parse_date("2025-12-31"), NaiveDate::from_ymd_opt(2025, 12, 31));
    }

    #[test]
    fn serializes_without_absent_reference() {
        let flight = Flight::new(FlightId::new("f1").unwrap(), "MJ1", "LIN", "NCE");
        let json = serde_json::to_value(&flight).unwrap();
        assert_eq!(json["_id"], "f1");
        assert_eq!(json["flightNo"], "MJ1");
        assert!(json.get("returnFlightId").is_none());
    }

    #[test]
    fn self_reference_is_detected() {
        let id = FlightId::new("f1").unwrap();
        let flight = Flight::new(id.clone(), "MJ1", "LIN", "NCE")
            .with_return(FlightReference::Unresolved(id));
        assert!(flight.references_itself());
    }

    #[test]
    fn refetched_snapshot_keeps_identity() {
        let first = Flight::new(FlightId::new("f1").unwrap(), "MJ1", "LIN", "NCE");
        let mut refetched = first.clone();
        refetched.status = FlightStatus::Delayed;
        assert_ne!(first, refetched);
        assert!(first.same_identity(&refetched));
    }
}

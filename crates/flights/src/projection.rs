//! Round-trip projection over a fetched flight list.
//!
//! A flight named as someone else's return leg is hidden from the primary
//! listing and shown nested under its outbound flight. Only one hop is
//! considered; longer chains and other suspicious shapes are reported as
//! [`PairingWarning`]s, never as errors.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use charterdesk_core::FlightId;

use crate::{Flight, FlightReference};

/// What the outbound flight's return reference resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ReturnLeg<'a> {
    /// Single-sector flight.
    None,
    /// Return leg populated inline.
    Paired(&'a Flight),
    /// Only the identifier is known; no return-leg data to show.
    Unpopulated(&'a FlightId),
    /// The flight names itself; shown standalone.
    SelfReference,
}

/// Display row for one outbound flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTripProjection<'a> {
    pub outbound: &'a Flight,
    pub return_leg: ReturnLeg<'a>,
    pub is_round_trip: bool,
    /// `MXP-DXB-MXP` when paired, `MXP → DXB` otherwise.
    pub display_route: String,
    pub display_flight_numbers: String,
    pub display_status: String,
    pub display_schedule: String,
    pub return_schedule: Option<String>,
}

impl<'a> RoundTripProjection<'a> {
    fn new(outbound: &'a Flight, return_leg: ReturnLeg<'a>) -> Self {
        let is_round_trip = matches!(return_leg, ReturnLeg::Paired(_) | ReturnLeg::Unpopulated(_));

        let (display_route, display_flight_numbers, display_status, return_schedule) =
            match return_leg {
                ReturnLeg::Paired(back) => (
                    format!("{}-{}-{}", outbound.origin, outbound.destination, back.destination),
                    format!("{} / {}", outbound.flight_no, back.flight_no),
                    format!("{} / {} (Return)", outbound.status, back.status),
                    Some(format!("Return: {}", back.schedule())),
                ),
                _ => (
                    outbound.route(),
                    outbound.flight_no.clone(),
                    outbound.status.to_string(),
                    None,
                ),
            };

        Self {
            outbound,
            return_leg,
            is_round_trip,
            display_route,
            display_flight_numbers,
            display_status,
            display_schedule: outbound.schedule(),
            return_schedule,
        }
    }

    pub fn return_flight(&self) -> Option<&'a Flight> {
        match self.return_leg {
            ReturnLeg::Paired(flight) => Some(flight),
            _ => None,
        }
    }

    /// The reference points at nothing displayable.
    pub fn has_dangling_reference(&self) -> bool {
        matches!(self.return_leg, ReturnLeg::Unpopulated(_) | ReturnLeg::SelfReference)
    }
}

/// Data-quality findings from a projection pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PairingWarning {
    SelfReference { flight: FlightId },
    /// A return leg that itself names a further return leg (A→B→C).
    ChainedReturnLeg { return_leg: FlightId, next: FlightId },
    /// Several outbound flights claim the same return leg.
    SharedReturnLeg { return_leg: FlightId, outbound: Vec<FlightId> },
    /// Unpopulated reference to an id absent from the list.
    MissingReturnLeg { flight: FlightId, reference: FlightId },
}

/// Result of one projection pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightListing<'a> {
    pub projections: Vec<RoundTripProjection<'a>>,
    /// Flights hidden from the primary listing, in input order.
    pub return_legs: Vec<&'a Flight>,
    pub warnings: Vec<PairingWarning>,
}

impl<'a> FlightListing<'a> {
    pub fn outbound(&self) -> impl Iterator<Item = &'a Flight> + '_ {
        self.projections.iter().map(|p| p.outbound)
    }

    pub fn total(&self) -> usize {
        self.projections.len()
    }

    pub fn round_trip_count(&self) -> usize {
        self.projections.iter().filter(|p| p.is_round_trip).count()
    }

    pub fn single_sector_count(&self) -> usize {
        self.total() - self.round_trip_count()
    }
}

/// Partition `flights` into outbound rows and hidden return legs.
///
/// Linear in the list size, pure, and safe to rerun on every render.
pub fn project(flights: &[Flight]) -> FlightListing<'_> {
    let mut warnings = Vec::new();

    // return leg id -> outbound flights naming it
    let mut claimed: BTreeMap<&FlightId, Vec<&FlightId>> = BTreeMap::new();
    for flight in flights {
        match flight.return_reference_id() {
            Some(target) if *target == flight.id => {
                tracing::debug!(flight = %flight.id, "flight names itself as return leg");
                warnings.push(PairingWarning::SelfReference {
                    flight: flight.id.clone(),
                });
            }
            Some(target) => claimed.entry(target).or_default().push(&flight.id),
            None => {}
        }
    }

    let known: HashSet<&FlightId> = flights.iter().map(|f| &f.id).collect();
    let mut projections = Vec::with_capacity(flights.len());
    let mut return_legs = Vec::new();

    for flight in flights {
        let is_return_leg = !flight.references_itself() && claimed.contains_key(&flight.id);
        if is_return_leg {
            if let Some(next) = flight.return_reference_id() {
                tracing::warn!(return_leg = %flight.id, %next, "return leg carries its own return reference");
                warnings.push(PairingWarning::ChainedReturnLeg {
                    return_leg: flight.id.clone(),
                    next: next.clone(),
                });
            }
            return_legs.push(flight);
            continue;
        }

        let return_leg = match &flight.return_flight {
            None => ReturnLeg::None,
            Some(_) if flight.references_itself() => ReturnLeg::SelfReference,
            Some(FlightReference::Resolved(back)) => ReturnLeg::Paired(back.as_ref()),
            Some(FlightReference::Unresolved(id)) => {
                if !known.contains(id) {
                    warnings.push(PairingWarning::MissingReturnLeg {
                        flight: flight.id.clone(),
                        reference: id.clone(),
                    });
                }
                ReturnLeg::Unpopulated(id)
            }
        };
        projections.push(RoundTripProjection::new(flight, return_leg));
    }

    for (return_leg, outbound) in &claimed {
        if outbound.len() > 1 {
            tracing::warn!(%return_leg, count = outbound.len(), "return leg shared by several flights");
            warnings.push(PairingWarning::SharedReturnLeg {
                return_leg: (*return_leg).clone(),
                outbound: outbound.iter().map(|id| (*id).clone()).collect(),
            });
        }
    }

    FlightListing {
        projections,
        return_legs,
        warnings,
    }
}

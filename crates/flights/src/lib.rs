//! `charterdesk-flights` — flight records and the round-trip projection.
//!
//! Pure domain logic only: the flight list arrives already fetched, and every
//! view computed here is derived fresh from it without touching the records.

pub mod booking;
pub mod flight;
pub mod projection;
pub mod reference;
pub mod timeline;

pub use booking::{BookingPlan, LinkReturnLeg, NewFlight, ReturnDraft, RoundTripDraft};
pub use flight::{Flight, FlightStatus};
pub use projection::{project, FlightListing, PairingWarning, ReturnLeg, RoundTripProjection};
pub use reference::FlightReference;
pub use timeline::group_by_date;

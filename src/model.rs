//! Core data model for flightdrop.
//!
//! These types carry a check from end to end:
//! route requests going in, flight offers coming back, and the
//! history entries recorded for each route.

mod history;
mod offer;
mod route;

pub use history::HistoryEntry;
pub use offer::FlightOffer;
pub use route::{DepartureWindow, ReturnWindow, RouteSearchRequest, Trip, TripType};

//! Clients for the two things we watch on the seed box.

pub mod geo;
pub mod transmission;

pub use geo::{CountryPolicy, GeoLocator};
pub use transmission::TransmissionClient;

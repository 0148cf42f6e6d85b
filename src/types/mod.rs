//! Shared types.

pub mod config;
pub mod errors;
pub mod geo;
pub mod place;

pub use geo::{Bounds, LatLng, QueryType};
pub use place::Place;

//! Upstream places sources.
//!
//! The gateway only needs something that turns a query type and a box into a
//! list of places; [`TravelAdvisorFetcher`] is the HTTP implementation.

mod travel_advisor;

pub use travel_advisor::TravelAdvisorFetcher;

use async_trait::async_trait;

use crate::types::{LatLng, Place, QueryType};
use crate::PlacegateResult;

/// Fetches places inside a bounding box from an upstream service.
#[async_trait]
pub trait PlacesFetcher: Send + Sync {
    /// Returns the name of the fetcher.
    fn name(&self) -> &str;

    /// Fetches places of `query_type` between the two corners.
    async fn fetch_places(
        &self,
        query_type: &QueryType,
        sw: LatLng,
        ne: LatLng,
    ) -> PlacegateResult<Vec<Place>>;
}

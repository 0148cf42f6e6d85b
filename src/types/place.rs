//! Place records returned by the upstream API.
//!
//! Records are kept as opaque JSON so the cache stores exactly what the
//! upstream sent. The accessors only read the few fields used for filtering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single place record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Place(pub Value);

impl Place {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Number of reviews; the upstream sends this as a string or a number.
    pub fn num_reviews(&self) -> Option<u64> {
        match self.0.get("num_reviews")? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn rating(&self) -> Option<f64> {
        match self.0.get("rating")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Place {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Keeps places that have a name and at least one review.
///
/// The upstream mixes ads and placeholder rows into its lists; those lack
/// one or both fields.
pub fn filter_valid(places: Vec<Place>) -> Vec<Place> {
    places
        .into_iter()
        .filter(|p| p.name().is_some_and(|n| !n.is_empty()) && p.num_reviews().unwrap_or(0) > 0)
        .collect()
}

/// Keeps places rated at least `min_rating`. Unrated places are dropped.
pub fn filter_by_rating(places: Vec<Place>, min_rating: f64) -> Vec<Place> {
    places
        .into_iter()
        .filter(|p| p.rating().is_some_and(|r| r >= min_rating))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors_accept_strings_and_numbers() {
        let place = Place::new(json!({"name": "Cafe", "num_reviews": "12", "rating": "4.5"}));
        assert_eq!(place.name(), Some("Cafe"));
        assert_eq!(place.num_reviews(), Some(12));
        assert_eq!(place.rating(), Some(4.5));

        let place = Place::new(json!({"name": "Bar", "num_reviews": 3, "rating": 4}));
        assert_eq!(place.num_reviews(), Some(3));
        assert_eq!(place.rating(), Some(4.0));
    }

    #[test]
    fn test_filter_valid() {
        let places = vec![
            Place::new(json!({"name": "Good", "num_reviews": "10"})),
            Place::new(json!({"name": "", "num_reviews": "10"})),
            Place::new(json!({"name": "No reviews", "num_reviews": "0"})),
            Place::new(json!({"ad_position": "inline1"})),
        ];

        let valid = filter_valid(places);
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].name(), Some("Good"));
    }

    #[test]
    fn test_filter_by_rating() {
        let places = vec![
            Place::new(json!({"name": "A", "rating": "4.5"})),
            Place::new(json!({"name": "B", "rating": "3.0"})),
            Place::new(json!({"name": "C"})),
        ];

        let rated = filter_by_rating(places, 4.0);
        assert_eq!(rated.len(), 1);
        assert_eq!(rated[0].name(), Some("A"));
    }
}

//! Geographic primitives: points, bounding boxes and place categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{PlacegateError, PlacegateResult};

/// A point in latitude/longitude space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl FromStr for LatLng {
    type Err = PlacegateError;

    /// Parses `"lat,lng"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| PlacegateError::InvalidBounds(format!("expected LAT,LNG, got '{}'", s)))?;

        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| PlacegateError::InvalidBounds(format!("'{}': {}", part.trim(), e)))
        };

        Ok(Self::new(parse(lat)?, parse(lng)?))
    }
}

/// A rectangle defined by its southwest and northeast corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub sw: LatLng,
    pub ne: LatLng,
}

impl Bounds {
    /// Creates a bounding box, rejecting inverted or non-finite corners.
    pub fn new(sw: LatLng, ne: LatLng) -> PlacegateResult<Self> {
        let bounds = Self { sw, ne };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Checks `sw <= ne` on both axes.
    pub fn validate(&self) -> PlacegateResult<()> {
        let coords = [self.sw.lat, self.sw.lng, self.ne.lat, self.ne.lng];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(PlacegateError::InvalidBounds(
                "coordinates must be finite".to_string(),
            ));
        }
        if self.sw.lat > self.ne.lat || self.sw.lng > self.ne.lng {
            return Err(PlacegateError::InvalidBounds(format!(
                "southwest ({}, {}) is not below-left of northeast ({}, {})",
                self.sw.lat, self.sw.lng, self.ne.lat, self.ne.lng
            )));
        }
        Ok(())
    }

    /// Returns true if `inner` lies entirely inside this box (edges inclusive).
    pub fn contains(&self, inner: &Bounds) -> bool {
        inner.sw.lat >= self.sw.lat
            && inner.sw.lng >= self.sw.lng
            && inner.ne.lat <= self.ne.lat
            && inner.ne.lng <= self.ne.lng
    }

    /// Grows the box by `factor` times its span on every side.
    ///
    /// A factor of 0.5 turns a 1x1 box into a 2x2 box with the same center.
    pub fn expand(&self, factor: f64) -> Bounds {
        let lat_diff = self.ne.lat - self.sw.lat;
        let lng_diff = self.ne.lng - self.sw.lng;

        Bounds {
            sw: LatLng::new(self.sw.lat - lat_diff * factor, self.sw.lng - lng_diff * factor),
            ne: LatLng::new(self.ne.lat + lat_diff * factor, self.ne.lng + lng_diff * factor),
        }
    }
}

/// Category of place data requested from the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryType {
    Restaurants,
    Hotels,
    Attractions,
    /// Any other category the upstream understands.
    Other(String),
}

impl QueryType {
    pub fn as_str(&self) -> &str {
        match self {
            QueryType::Restaurants => "restaurants",
            QueryType::Hotels => "hotels",
            QueryType::Attractions => "attractions",
            QueryType::Other(s) => s,
        }
    }

    /// Maps a category name onto a variant without validating it.
    /// Persisted entries go through here so old state always loads.
    fn from_name(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "restaurants" => QueryType::Restaurants,
            "hotels" => QueryType::Hotels,
            "attractions" => QueryType::Attractions,
            other => QueryType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = PlacegateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() || s.contains(char::is_whitespace) {
            return Err(PlacegateError::InvalidQueryType(s.to_string()));
        }
        Ok(QueryType::from_name(s))
    }
}

impl Serialize for QueryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for QueryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(QueryType::from_name(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(sw_lat: f64, sw_lng: f64, ne_lat: f64, ne_lng: f64) -> Bounds {
        Bounds::new(LatLng::new(sw_lat, sw_lng), LatLng::new(ne_lat, ne_lng)).unwrap()
    }

    #[test]
    fn test_contains_inner_box() {
        let outer = bounds(0.0, 0.0, 10.0, 10.0);
        assert!(outer.contains(&bounds(2.0, 2.0, 8.0, 8.0)));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&bounds(-1.0, 2.0, 8.0, 8.0)));
        assert!(!outer.contains(&bounds(2.0, 2.0, 8.0, 10.5)));
    }

    #[test]
    fn test_expand_doubles_span() {
        let expanded = bounds(10.0, 20.0, 12.0, 24.0).expand(0.5);
        assert_eq!(expanded.sw, LatLng::new(9.0, 18.0));
        assert_eq!(expanded.ne, LatLng::new(13.0, 26.0));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let result = Bounds::new(LatLng::new(5.0, 0.0), LatLng::new(1.0, 1.0));
        assert!(matches!(result, Err(PlacegateError::InvalidBounds(_))));

        let result = Bounds::new(LatLng::new(0.0, f64::NAN), LatLng::new(1.0, 1.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_latlng_parse() {
        let point: LatLng = "48.85, 2.35".parse().unwrap();
        assert_eq!(point, LatLng::new(48.85, 2.35));
        assert!("48.85".parse::<LatLng>().is_err());
        assert!("abc,2".parse::<LatLng>().is_err());
    }

    #[test]
    fn test_query_type_roundtrip_names() {
        assert_eq!("Hotels".parse::<QueryType>().unwrap(), QueryType::Hotels);
        assert_eq!(
            "campgrounds".parse::<QueryType>().unwrap(),
            QueryType::Other("campgrounds".to_string())
        );

        let json = serde_json::to_string(&QueryType::Attractions).unwrap();
        assert_eq!(json, "\"attractions\"");
    }

    #[test]
    fn test_query_type_rejects_blank_and_spaced_names() {
        for raw in ["", "   ", "foo bar", "hotels\t"] {
            let result = raw.parse::<QueryType>();
            assert!(
                matches!(result, Err(PlacegateError::InvalidQueryType(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_persisted_query_type_always_loads() {
        let parsed: QueryType = serde_json::from_str("\"Hotels\"").unwrap();
        assert_eq!(parsed, QueryType::Hotels);
    }
}

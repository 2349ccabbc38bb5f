use std::{fmt, sync::Arc};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable key for a geographic unit within a snapshot.
/// Keeps the original identifier text (with leading zeros) but avoids repeated owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeoId(Arc<str>);

impl GeoId {
    pub fn new(id: impl AsRef<str>) -> Self { Self(Arc::from(id.as_ref())) }

    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for GeoId {
    fn from(id: &str) -> Self { Self::new(id) }
}

impl From<String> for GeoId {
    fn from(id: String) -> Self { Self(Arc::from(id)) }
}

impl fmt::Display for GeoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl Serialize for GeoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for GeoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(GeoId::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_leading_zeros() {
        let id = GeoId::new("06073000100");
        assert_eq!(id.as_str(), "06073000100");
        assert_eq!(id.to_string(), "06073000100");
    }

    #[test]
    fn orders_lexicographically() {
        assert!(GeoId::from("06073000100") < GeoId::from("06073000200"));
    }

    #[test]
    fn serializes_as_plain_string() {
        assert_eq!(serde_json::to_string(&GeoId::from("a1")).unwrap(), "\"a1\"");
    }
}

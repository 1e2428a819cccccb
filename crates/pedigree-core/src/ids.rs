//! Opaque identifiers for graph entities.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Placeholder for records whose id is minted on insertion.
            pub fn empty() -> Self {
                Self(String::new())
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of an [`Individual`](crate::Individual).
    IndividualId
);

string_id!(
    /// Identifier of a [`Partnership`](crate::Partnership).
    PartnershipId
);

string_id!(
    /// Identifier of a [`Pregnancy`](crate::Pregnancy).
    PregnancyId
);

string_id!(
    /// Identifier of an [`ArtRecord`](crate::ArtRecord).
    ArtId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = IndividualId::new("I7");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""I7""#);
        let back: IndividualId = serde_json::from_str(r#""I7""#).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ids_can_be_looked_up_by_str() {
        let mut map = std::collections::HashMap::new();
        map.insert(PartnershipId::new("U1"), 1);
        assert_eq!(map.get("U1"), Some(&1));
    }
}

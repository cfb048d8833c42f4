//! Strongly typed identifiers.
//!
//! Scenario content addresses everything by string keys. Wrapping each kind
//! of key in its own type keeps a question id from being passed where an
//! option id is expected.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifies a scenario, e.g. `"hanoi_easy_1"`.
    ScenarioId
);

string_id!(
    /// Identifies a question within one scenario.
    QuestionId
);

string_id!(
    /// Identifies an option within one question.
    OptionId
);

string_id!(
    /// A behavioral signal attached to an option. Doubles as the archetype
    /// identifier, since every archetype is keyed by the trait it describes.
    TraitTag
);

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let tag = TraitTag::new("brave");

        let json = serde_json::to_string(&tag).unwrap();

        assert_eq!(json, "\"brave\"");
        assert_eq!(serde_json::from_str::<TraitTag>(&json).unwrap(), tag);
    }

    #[test]
    fn test_ids_can_be_looked_up_by_str() {
        let mut map = HashMap::new();
        map.insert(QuestionId::new("q1"), 7);

        assert_eq!(map.get("q1"), Some(&7));
        assert_eq!(QuestionId::from("q1").to_string(), "q1");
    }
}

//! Newtype IDs for catalog identifiers.
//!
//! Variant ids are globally unique across products, so the cart keys lines by
//! `VariantId` alone. Keeping it distinct from `ProductId` stops a card from
//! looking up a quantity with the wrong kind of id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate string-backed ID newtypes.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of a product in the catalog.
    ProductId
);
define_id!(
    /// Identifier of one purchasable size of a product.
    VariantId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_str() {
        let id: VariantId = "v1".into();
        assert_eq!(id.as_str(), "v1");
        assert_eq!(id.to_string(), "v1");
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = ProductId::new("p-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p-42\"");

        let back: ProductId = serde_json::from_str("\"p-42\"").unwrap();
        assert_eq!(back, id);
    }
}

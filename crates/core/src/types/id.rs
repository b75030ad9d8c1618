//! Newtype global IDs for type-safe platform resource references.
//!
//! Shopify identifies resources with global IDs of the form
//! `gid://shopify/<Resource>/<number>`. Use the `define_gid!` macro to create
//! wrappers that prevent accidentally mixing IDs from different resources.

/// Prefix shared by every Shopify global ID.
pub const GID_PREFIX: &str = "gid://shopify/";

/// Errors that can occur when parsing a global ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GidError {
    /// The input does not start with `gid://shopify/`.
    #[error("global id must start with {GID_PREFIX}")]
    MissingPrefix,
    /// The resource segment does not match the expected resource.
    #[error("expected a {expected} id, got {found}")]
    WrongResource {
        /// Resource the ID type accepts.
        expected: &'static str,
        /// Resource found in the input.
        found: String,
    },
    /// The trailing segment is empty or not numeric.
    #[error("global id must end with a numeric id")]
    InvalidNumber,
}

/// Macro to define a type-safe global ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `parse()` validating the `gid://shopify/<Resource>/<n>` shape
/// - `from_number()`, `as_str()` and `number()`
///
/// # Example
///
/// ```rust
/// # use sticky_cart_core::define_gid;
/// define_gid!(ProductId, "Product");
///
/// let id = ProductId::from_number(42);
/// assert_eq!(id.as_str(), "gid://shopify/Product/42");
/// assert!(ProductId::parse("gid://shopify/Order/42").is_err());
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $resource:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Resource name embedded in the global ID.
            pub const RESOURCE: &'static str = $resource;

            /// Parse a global ID, checking the resource segment.
            ///
            /// # Errors
            ///
            /// Returns an error if the prefix, resource or numeric part is invalid.
            pub fn parse(s: &str) -> Result<Self, $crate::types::id::GidError> {
                let rest = s
                    .strip_prefix($crate::types::id::GID_PREFIX)
                    .ok_or($crate::types::id::GidError::MissingPrefix)?;
                let (resource, number) = rest
                    .split_once('/')
                    .ok_or($crate::types::id::GidError::InvalidNumber)?;
                if resource != Self::RESOURCE {
                    return Err($crate::types::id::GidError::WrongResource {
                        expected: Self::RESOURCE,
                        found: resource.to_owned(),
                    });
                }
                if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
                    return Err($crate::types::id::GidError::InvalidNumber);
                }
                Ok(Self(s.to_owned()))
            }

            /// Build a global ID from the numeric legacy ID.
            #[must_use]
            pub fn from_number(number: u64) -> Self {
                Self(format!(
                    "{}{}/{}",
                    $crate::types::id::GID_PREFIX,
                    Self::RESOURCE,
                    number
                ))
            }

            /// Get the full global ID string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Get the numeric legacy ID.
            #[must_use]
            pub fn number(&self) -> Option<u64> {
                self.0.rsplit('/').next().and_then(|n| n.parse().ok())
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::GidError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_gid!(ScriptTagId, "ScriptTag");
define_gid!(WebhookSubscriptionId, "WebhookSubscription");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script_tag_id() {
        let id = ScriptTagId::parse("gid://shopify/ScriptTag/171016618150").unwrap();
        assert_eq!(id.number(), Some(171_016_618_150));
        assert_eq!(id.to_string(), "gid://shopify/ScriptTag/171016618150");
    }

    #[test]
    fn test_parse_rejects_other_resource() {
        let err = ScriptTagId::parse("gid://shopify/Product/1").unwrap_err();
        assert_eq!(
            err,
            GidError::WrongResource {
                expected: "ScriptTag",
                found: "Product".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert_eq!(
            ScriptTagId::parse("ScriptTag/1").unwrap_err(),
            GidError::MissingPrefix
        );
        assert_eq!(
            ScriptTagId::parse("gid://shopify/ScriptTag/").unwrap_err(),
            GidError::InvalidNumber
        );
        assert_eq!(
            ScriptTagId::parse("gid://shopify/ScriptTag/12a").unwrap_err(),
            GidError::InvalidNumber
        );
    }

    #[test]
    fn test_from_number() {
        let id = WebhookSubscriptionId::from_number(7);
        assert_eq!(id.as_str(), "gid://shopify/WebhookSubscription/7");
    }

    #[test]
    fn test_serde_transparent() {
        let id = ScriptTagId::from_number(5);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"gid://shopify/ScriptTag/5\"");
    }
}

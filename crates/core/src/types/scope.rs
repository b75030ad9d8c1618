//! OAuth access scope sets.

use core::fmt;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A set of OAuth access scopes.
///
/// Scopes are parsed from comma-separated lists (as found in the `SCOPES`
/// environment variable and in the platform's token response). A `write_x`
/// scope implies `read_x`, so `"read_products,write_products"` and
/// `"write_products"` are the same set.
///
/// ```
/// use sticky_cart_core::AuthScopes;
///
/// let configured = AuthScopes::parse("write_script_tags, read_script_tags");
/// let granted = AuthScopes::parse("write_script_tags");
/// assert_eq!(configured, granted);
/// assert!(granted.has("read_script_tags"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AuthScopes {
    /// Scopes with implied `read_*` entries removed.
    compressed: BTreeSet<String>,
}

impl AuthScopes {
    /// Parse a comma-separated scope list. Blank entries are ignored.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let scopes: BTreeSet<String> = s
            .split(',')
            .map(str::trim)
            .filter(|scope| !scope.is_empty())
            .map(str::to_owned)
            .collect();

        let implied: BTreeSet<String> = scopes.iter().filter_map(|s| implied_read(s)).collect();

        Self {
            compressed: scopes.difference(&implied).cloned().collect(),
        }
    }

    /// Check whether a scope is granted, directly or by implication.
    #[must_use]
    pub fn has(&self, scope: &str) -> bool {
        let scope = scope.trim();
        self.compressed.contains(scope)
            || self
                .compressed
                .iter()
                .filter_map(|s| implied_read(s))
                .any(|implied| implied == scope)
    }

    /// Check whether every scope of `other` is granted here.
    #[must_use]
    pub fn contains_all(&self, other: &Self) -> bool {
        other.compressed.iter().all(|scope| self.has(scope))
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compressed.is_empty()
    }

    /// Iterate over the compressed scope list in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.compressed.iter().map(String::as_str)
    }
}

/// The `read_` scope a `write_` scope implies, if any.
fn implied_read(scope: &str) -> Option<String> {
    if let Some(rest) = scope.strip_prefix("unauthenticated_write_") {
        return Some(format!("unauthenticated_read_{rest}"));
    }
    scope.strip_prefix("write_").map(|rest| format!("read_{rest}"))
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.iter().collect::<Vec<_>>().join(",");
        f.write_str(&joined)
    }
}

impl From<String> for AuthScopes {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<AuthScopes> for String {
    fn from(scopes: AuthScopes) -> Self {
        scopes.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_skips_blanks() {
        let scopes = AuthScopes::parse(" read_orders, ,write_script_tags ,");
        assert_eq!(scopes.to_string(), "read_orders,write_script_tags");
    }

    #[test]
    fn test_write_implies_read() {
        let scopes = AuthScopes::parse("write_products");
        assert!(scopes.has("read_products"));
        assert!(scopes.has("write_products"));
        assert!(!scopes.has("read_orders"));
    }

    #[test]
    fn test_equality_ignores_implied_and_order() {
        assert_eq!(
            AuthScopes::parse("read_products,write_products,read_orders"),
            AuthScopes::parse("read_orders,write_products")
        );
        assert_ne!(
            AuthScopes::parse("read_products"),
            AuthScopes::parse("write_products")
        );
    }

    #[test]
    fn test_unauthenticated_scopes() {
        let scopes = AuthScopes::parse("unauthenticated_write_checkouts");
        assert!(scopes.has("unauthenticated_read_checkouts"));
        assert!(!scopes.has("read_checkouts"));
    }

    #[test]
    fn test_contains_all() {
        let granted = AuthScopes::parse("write_products,read_orders");
        assert!(granted.contains_all(&AuthScopes::parse("read_products,read_orders")));
        assert!(!granted.contains_all(&AuthScopes::parse("write_orders")));
    }

    #[test]
    fn test_empty() {
        assert!(AuthScopes::parse("").is_empty());
        assert!(AuthScopes::parse(" , ").is_empty());
    }
}

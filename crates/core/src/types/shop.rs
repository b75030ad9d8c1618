//! Shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Domain suffix every shop domain must carry.
const SHOP_SUFFIX: &str = ".myshopify.com";

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop cannot be empty")]
    Empty,
    /// The input does not end with `.myshopify.com`.
    #[error("shop must be a {SHOP_SUFFIX} domain")]
    WrongSuffix,
    /// The shop name before the suffix is empty or contains invalid characters.
    #[error("shop name may only contain letters, digits, '-' and '_'")]
    InvalidName,
}

/// A shop's `*.myshopify.com` domain.
///
/// Shop domains arrive in query strings and webhook headers, so they are
/// validated before they are used to build redirect or API URLs.
///
/// ## Constraints
///
/// - Ends with `.myshopify.com` (case-insensitive; stored lowercase)
/// - Name starts with a letter or digit, then letters, digits, `-` or `_`
/// - A single trailing `/` is tolerated and stripped
///
/// ## Examples
///
/// ```
/// use sticky_cart_core::ShopDomain;
///
/// assert!(ShopDomain::parse("my-store.myshopify.com").is_ok());
/// assert!(ShopDomain::parse("evil.example.com").is_err());
/// assert!(ShopDomain::parse("my-store.myshopify.com.evil.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, is not a `.myshopify.com`
    /// domain, or has an invalid shop name.
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        let trimmed = s.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        let lower = trimmed.to_ascii_lowercase();
        let name = lower
            .strip_suffix(SHOP_SUFFIX)
            .ok_or(ShopDomainError::WrongSuffix)?;

        let mut chars = name.chars();
        let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphanumeric());
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid_start || !valid_rest {
            return Err(ShopDomainError::InvalidName);
        }

        Ok(Self(lower))
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the shop's `https://` origin.
    #[must_use]
    pub fn origin(&self) -> String {
        format!("https://{}", self.0)
    }

    /// Returns the shop's admin apps page.
    #[must_use]
    pub fn admin_apps_url(&self) -> String {
        format!("https://{}/admin/apps", self.0)
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShopDomain {
    type Error = ShopDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShopDomain> for String {
    fn from(shop: ShopDomain) -> Self {
        shop.0
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_shops() {
        assert!(ShopDomain::parse("store.myshopify.com").is_ok());
        assert!(ShopDomain::parse("my-store_2.myshopify.com").is_ok());
        assert!(ShopDomain::parse("9store.myshopify.com").is_ok());
    }

    #[test]
    fn test_parse_normalizes() {
        let shop = ShopDomain::parse("  My-Store.MyShopify.com/ ").unwrap();
        assert_eq!(shop.as_str(), "my-store.myshopify.com");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ShopDomain::parse(""), Err(ShopDomainError::Empty));
        assert_eq!(ShopDomain::parse("/"), Err(ShopDomainError::Empty));
    }

    #[test]
    fn test_parse_foreign_hosts() {
        assert_eq!(
            ShopDomain::parse("store.example.com"),
            Err(ShopDomainError::WrongSuffix)
        );
        assert_eq!(
            ShopDomain::parse("store.myshopify.com.evil.com"),
            Err(ShopDomainError::WrongSuffix)
        );
        assert_eq!(
            ShopDomain::parse("undefined"),
            Err(ShopDomainError::WrongSuffix)
        );
    }

    #[test]
    fn test_parse_invalid_names() {
        assert_eq!(
            ShopDomain::parse(".myshopify.com"),
            Err(ShopDomainError::InvalidName)
        );
        assert_eq!(
            ShopDomain::parse("-store.myshopify.com"),
            Err(ShopDomainError::InvalidName)
        );
        assert_eq!(
            ShopDomain::parse("evil.com/x.myshopify.com"),
            Err(ShopDomainError::InvalidName)
        );
    }

    #[test]
    fn test_urls() {
        let shop = ShopDomain::parse("store.myshopify.com").unwrap();
        assert_eq!(shop.origin(), "https://store.myshopify.com");
        assert_eq!(
            shop.admin_apps_url(),
            "https://store.myshopify.com/admin/apps"
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<ShopDomain, _> = serde_json::from_str("\"store.myshopify.com\"");
        assert!(ok.is_ok());
        let bad: Result<ShopDomain, _> = serde_json::from_str("\"store.example.com\"");
        assert!(bad.is_err());
    }
}

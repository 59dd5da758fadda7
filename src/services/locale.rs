//! Storefront locale routing
//!
//! Decides which storefront paths carry a locale prefix, picks a locale for
//! requests that lack one, and recognizes old product URLs that used the
//! product UUID instead of its slug.

use crate::config::SiteConfig;
use once_cell::sync::Lazy;
use regex::Regex;

/// Cookie remembering the visitor's locale choice
pub const LOCALE_COOKIE: &str = "NEXT_LOCALE";

static LEGACY_PRODUCT_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^/([a-z]{2})/products/([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})$",
    )
    .expect("legacy product URL pattern is valid")
});

/// An old `/{locale}/products/{uuid}` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyProductUrl {
    pub locale: String,
    pub product_id: String,
}

/// Match an old product URL
pub fn detect_legacy_product_url(path: &str) -> Option<LegacyProductUrl> {
    let caps = LEGACY_PRODUCT_URL.captures(path)?;
    Some(LegacyProductUrl {
        locale: caps[1].to_string(),
        product_id: caps[2].to_string(),
    })
}

/// Whether the locale middleware handles this path.
///
/// Skips framework internals (`/_next`, `/_vercel`), the API and anything that
/// looks like a file (a dot anywhere in the path).
pub fn is_localized_path(path: &str) -> bool {
    let first = path.trim_start_matches('/').split('/').next().unwrap_or_default();
    !(first == "_next" || first == "_vercel" || first == "api" || path.contains('.'))
}

/// The supported locale the path starts with, if any
pub fn path_locale<'a>(path: &str, site: &'a SiteConfig) -> Option<&'a str> {
    let first = path.trim_start_matches('/').split('/').next()?;
    site.locales
        .iter()
        .find(|l| l.eq_ignore_ascii_case(first))
        .map(String::as_str)
}

/// Locale stored in the `NEXT_LOCALE` cookie
pub fn cookie_locale(cookie_header: &str) -> Option<&str> {
    cookie_header.split(';').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name.trim() == LOCALE_COOKIE).then(|| value.trim())
    })
}

/// Language ranges from an `Accept-Language` header, best first
pub fn accept_language(header: &str) -> Vec<String> {
    let mut ranges: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let q = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (q > 0.0).then(|| (tag.to_ascii_lowercase(), q))
        })
        .collect();
    // Stable sort keeps header order among equal weights
    ranges.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranges.into_iter().map(|(tag, _)| tag).collect()
}

/// Pick the locale for a request: path prefix, then cookie, then
/// `Accept-Language`, then the default
pub fn negotiate(
    path: &str,
    cookie_header: Option<&str>,
    accept_language_header: Option<&str>,
    site: &SiteConfig,
) -> String {
    if let Some(locale) = path_locale(path, site) {
        return locale.to_string();
    }
    if let Some(locale) = cookie_header.and_then(cookie_locale).and_then(|c| supported(c, site)) {
        return locale.to_string();
    }
    if let Some(header) = accept_language_header {
        for range in accept_language(header) {
            let primary = range.split('-').next().unwrap_or_default();
            if let Some(locale) = supported(primary, site) {
                return locale.to_string();
            }
        }
    }
    site.default_locale.clone()
}

fn supported<'a>(code: &str, site: &'a SiteConfig) -> Option<&'a str> {
    site.locales
        .iter()
        .find(|l| l.eq_ignore_ascii_case(code))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        serde_yaml::from_str("url: https://sawavo.com").unwrap()
    }

    #[test]
    fn test_detect_legacy_product_url() {
        let found = detect_legacy_product_url("/en/products/0B6F2C4E-6d1b-4f7e-9a53-0d7d3f0b8e11").unwrap();
        assert_eq!(found.locale, "en");
        assert_eq!(found.product_id, "0B6F2C4E-6d1b-4f7e-9a53-0d7d3f0b8e11");

        assert!(detect_legacy_product_url("/en/products/hydrating-serum").is_none());
        assert!(detect_legacy_product_url("/products/0b6f2c4e-6d1b-4f7e-9a53-0d7d3f0b8e11").is_none());
        assert!(detect_legacy_product_url("/en/products/0b6f2c4e-6d1b-4f7e-9a53-0d7d3f0b8e11/reviews").is_none());
    }

    #[test]
    fn test_is_localized_path() {
        assert!(is_localized_path("/"));
        assert!(is_localized_path("/en/products/serum"));
        assert!(is_localized_path("/blog"));
        assert!(!is_localized_path("/favicon.ico"));
        assert!(!is_localized_path("/_next/static/chunk"));
        assert!(!is_localized_path("/_vercel/insights"));
        assert!(!is_localized_path("/api/v1/products"));
    }

    #[test]
    fn test_cookie_and_accept_language_parsing() {
        assert_eq!(cookie_locale("theme=dark; NEXT_LOCALE=ar"), Some("ar"));
        assert_eq!(cookie_locale("theme=dark"), None);

        assert_eq!(
            accept_language("en-US;q=0.7, ar-JO, fr;q=0"),
            vec!["ar-jo".to_string(), "en-us".to_string()]
        );
    }

    #[test]
    fn test_negotiate_precedence() {
        let site = site();
        assert_eq!(negotiate("/ar/blog", Some("NEXT_LOCALE=en"), Some("en"), &site), "ar");
        assert_eq!(negotiate("/blog", Some("NEXT_LOCALE=ar"), Some("en"), &site), "ar");
        assert_eq!(negotiate("/blog", Some("NEXT_LOCALE=de"), Some("fr, ar;q=0.5"), &site), "ar");
        assert_eq!(negotiate("/blog", None, Some("de-DE"), &site), "en");
        assert_eq!(negotiate("/", None, None, &site), "en");
    }
}

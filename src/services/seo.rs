//! Product page metadata
//!
//! Title, description, keywords, canonical and hreflang URLs, OpenGraph and
//! Twitter card data and crawler directives for a storefront product page.

use crate::config::SiteConfig;
use crate::models::Product;
use serde::Serialize;
use std::collections::BTreeMap;

pub const SITE_NAME: &str = "Sawavo";
pub const PRICE_CURRENCY: &str = "JOD";
const PLACEHOLDER_IMAGE: &str = "/product-holder.webp";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMetadata {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    /// Locale → URL
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub alternates: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_graph: Option<OpenGraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<TwitterCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductTags>,
    pub robots: Robots,
}

/// Crawler directives (`<meta name="robots">` and `googlebot`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Robots {
    pub index: bool,
    pub follow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_bot: Option<GoogleBot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GoogleBot {
    pub index: bool,
    pub follow: bool,
    /// -1 means no limit
    pub max_video_preview: i32,
    pub max_image_preview: String,
    pub max_snippet: i32,
}

impl Robots {
    /// Indexable page with unrestricted previews
    pub fn indexable() -> Self {
        Self {
            index: true,
            follow: true,
            google_bot: Some(GoogleBot {
                index: true,
                follow: true,
                max_video_preview: -1,
                max_image_preview: "large".to_string(),
                max_snippet: -1,
            }),
        }
    }

    /// Keep the page out of the index but let crawlers follow its links
    pub fn noindex() -> Self {
        Self {
            index: false,
            follow: true,
            google_bot: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    pub url: String,
    pub images: Vec<OpenGraphImage>,
    #[serde(rename = "type")]
    pub kind: String,
    pub locale: String,
    pub site_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenGraphImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwitterCard {
    pub card: String,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub site: String,
}

/// `product:*` meta tags
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTags {
    pub price_amount: String,
    pub price_currency: String,
    pub availability: String,
    pub brand: String,
    pub category: String,
}

impl ProductMetadata {
    fn bare(title: &str, description: &str, robots: Robots) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            keywords: None,
            canonical: None,
            alternates: BTreeMap::new(),
            open_graph: None,
            twitter: None,
            product: None,
            robots,
        }
    }

    /// Metadata for an unknown product
    pub fn not_found() -> Self {
        Self::bare(
            "Product Not Found | Sawavo",
            "The requested product could not be found.",
            Robots::noindex(),
        )
    }

    /// Metadata when the product could not be loaded
    pub fn fallback() -> Self {
        Self::bare(
            "Product | Sawavo",
            "Premium skincare products from Sawavo",
            Robots::indexable(),
        )
    }
}

/// Build page metadata for `product` in `locale`
pub fn product_metadata(product: Option<&Product>, locale: &str, site: &SiteConfig) -> ProductMetadata {
    let Some(product) = product else {
        return ProductMetadata::not_found();
    };

    let name = product.localized_title(locale).to_string();
    let brand = product.localized_brand(locale).filter(|b| !b.trim().is_empty());
    let category = product.localized_category(locale).filter(|c| !c.trim().is_empty());

    let title = match brand {
        Some(brand) => format!("{} | {} | {}", name, brand, SITE_NAME),
        None => format!("{} | {}", name, SITE_NAME),
    };
    let description = product
        .localized_description(locale)
        .filter(|d| !d.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} - Premium skincare product from Sawavo", name));

    let keywords = [Some(name.as_str()), brand, category, Some("skincare"), Some("beauty")]
        .into_iter()
        .flatten()
        .chain(product.concerns.iter().map(String::as_str))
        .filter(|k| !k.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let base = site.base_url();
    let product_url = |loc: &str| format!("{}/{}/products/{}", base, loc, product.slug);
    let canonical = product_url(locale);
    let alternates = site
        .locales
        .iter()
        .map(|loc| (loc.clone(), product_url(loc.as_str())))
        .collect();
    // share image is the first in display order, not the flagged main image
    let image = product
        .images
        .first()
        .map(|img| img.url.clone())
        .unwrap_or_else(|| format!("{}{}", base, PLACEHOLDER_IMAGE));

    ProductMetadata {
        title,
        keywords: Some(keywords),
        canonical: Some(canonical.clone()),
        alternates,
        open_graph: Some(OpenGraph {
            title: name.clone(),
            description: description.clone(),
            url: canonical,
            images: vec![OpenGraphImage {
                url: image.clone(),
                width: 1200,
                height: 630,
                alt: name.clone(),
            }],
            kind: "website".to_string(),
            locale: if locale.eq_ignore_ascii_case("ar") { "ar_SA" } else { "en_US" }.to_string(),
            site_name: SITE_NAME.to_string(),
        }),
        twitter: Some(TwitterCard {
            card: "summary_large_image".to_string(),
            title: name,
            description: description.clone(),
            images: vec![image],
            site: format!("@{}", SITE_NAME),
        }),
        product: Some(ProductTags {
            price_amount: product.price.to_string(),
            price_currency: PRICE_CURRENCY.to_string(),
            availability: if product.is_in_stock() { "in stock" } else { "out of stock" }.to_string(),
            brand: brand.unwrap_or(SITE_NAME).to_string(),
            category: category.unwrap_or("Skincare").to_string(),
        }),
        robots: Robots::indexable(),
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_product, ProductImage};

    fn site() -> SiteConfig {
        serde_yaml::from_str("url: https://sawavo.com").unwrap()
    }

    #[test]
    fn test_missing_product() {
        let meta = product_metadata(None, "en", &site());
        assert_eq!(meta.title, "Product Not Found | Sawavo");
        assert!(meta.open_graph.is_none());
    }

    #[test]
    fn test_english_metadata() {
        let meta = product_metadata(Some(&sample_product()), "en", &site());

        assert_eq!(meta.title, "Hydrating Serum | Glow Lab | Sawavo");
        assert_eq!(meta.description, "Deep hydration");
        assert_eq!(
            meta.keywords.as_deref(),
            Some("Hydrating Serum, Glow Lab, Serums, skincare, beauty, dryness")
        );
        assert_eq!(meta.canonical.as_deref(), Some("https://sawavo.com/en/products/hydrating-serum"));
        assert_eq!(meta.alternates["ar"], "https://sawavo.com/ar/products/hydrating-serum");

        let og = meta.open_graph.unwrap();
        assert_eq!(og.locale, "en_US");
        assert_eq!(og.images[0].url, "https://sawavo.com/product-holder.webp");

        let tags = meta.product.unwrap();
        assert_eq!(tags.price_amount, "25");
        assert_eq!(tags.price_currency, "JOD");
        assert_eq!(tags.availability, "in stock");
    }

    #[test]
    fn test_arabic_metadata_with_fallbacks() {
        let mut product = sample_product();
        product.brand = None;
        product.category = None;
        product.description_en = None;
        product.stock_quantity = 0;
        product.price = 12.5;
        product.images = vec![ProductImage {
            id: "i".into(),
            url: "https://cdn.test/serum.webp".into(),
            is_main: true,
            sort_order: 0,
        }];

        let meta = product_metadata(Some(&product), "ar", &site());
        assert_eq!(meta.title, "سيروم مرطب | Sawavo");
        assert_eq!(meta.description, "سيروم مرطب - Premium skincare product from Sawavo");
        assert_eq!(meta.open_graph.as_ref().map(|og| og.locale.as_str()), Some("ar_SA"));
        assert_eq!(meta.twitter.as_ref().map(|t| t.images[0].as_str()), Some("https://cdn.test/serum.webp"));

        let tags = meta.product.unwrap();
        assert_eq!(tags.price_amount, "12.5");
        assert_eq!(tags.availability, "out of stock");
        assert_eq!(tags.brand, "Sawavo");
        assert_eq!(tags.category, "Skincare");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(product_metadata(Some(&sample_product()), "en", &site())).unwrap();
        assert_eq!(json["openGraph"]["type"], "website");
        assert_eq!(json["openGraph"]["siteName"], "Sawavo");
        assert_eq!(json["product"]["priceCurrency"], "JOD");

        let missing = serde_json::to_value(ProductMetadata::not_found()).unwrap();
        assert!(missing.get("openGraph").is_none());
        assert!(missing.get("alternates").is_none());
        assert_eq!(missing["robots"], serde_json::json!({ "index": false, "follow": true }));
    }

    #[test]
    fn test_product_page_robots() {
        let json = serde_json::to_value(product_metadata(Some(&sample_product()), "en", &site())).unwrap();
        assert_eq!(
            json["robots"],
            serde_json::json!({
                "index": true,
                "follow": true,
                "googleBot": {
                    "index": true,
                    "follow": true,
                    "max-video-preview": -1,
                    "max-image-preview": "large",
                    "max-snippet": -1,
                },
            })
        );
        assert_eq!(ProductMetadata::fallback().robots, Robots::indexable());
    }

    #[test]
    fn test_share_image_is_first_in_order() {
        let image = |id: &str, is_main: bool, sort_order: i32| ProductImage {
            id: id.into(),
            url: format!("https://cdn.test/{}.webp", id),
            is_main,
            sort_order,
        };
        let mut product = sample_product();
        product.images = vec![image("front", false, 0), image("back", true, 1)];

        let meta = product_metadata(Some(&product), "en", &site());
        assert_eq!(meta.open_graph.unwrap().images[0].url, "https://cdn.test/front.webp");
        assert_eq!(meta.twitter.unwrap().images, vec!["https://cdn.test/front.webp".to_string()]);
    }
}

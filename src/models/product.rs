//! Product model
//!
//! Catalog products with bilingual (English/Arabic) text, stock, merchandising
//! flags and an ordered image list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pagination::ListParams;

/// Stock at or below this level counts as low stock
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// UUID
    pub id: String,
    /// URL slug (unique)
    pub slug: String,
    pub title: String,
    pub title_ar: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub sku: Option<String>,
    pub price: f64,
    pub compare_at_price: Option<f64>,
    pub stock_quantity: i64,
    pub brand: Option<String>,
    pub brand_ar: Option<String>,
    pub category: Option<String>,
    pub category_ar: Option<String>,
    /// Skin concerns this product addresses
    #[serde(default)]
    pub concerns: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_today_deal: bool,
    pub is_new: bool,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= LOW_STOCK_THRESHOLD
    }

    /// The image flagged as main, else the first image
    pub fn main_image(&self) -> Option<&ProductImage> {
        self.images
            .iter()
            .find(|img| img.is_main)
            .or_else(|| self.images.first())
    }

    /// Title for the locale, falling back to the English title
    pub fn localized_title(&self, locale: &str) -> &str {
        localized(locale, &self.title_ar).unwrap_or(&self.title)
    }

    pub fn localized_description(&self, locale: &str) -> Option<&str> {
        localized(locale, &self.description_ar).or(self.description_en.as_deref())
    }

    pub fn localized_brand(&self, locale: &str) -> Option<&str> {
        localized(locale, &self.brand_ar).or(self.brand.as_deref())
    }

    pub fn localized_category(&self, locale: &str) -> Option<&str> {
        localized(locale, &self.category_ar).or(self.category.as_deref())
    }
}

fn localized<'a>(locale: &str, arabic: &'a Option<String>) -> Option<&'a str> {
    if locale.eq_ignore_ascii_case("ar") {
        arabic.as_deref().filter(|s| !s.trim().is_empty())
    } else {
        None
    }
}

/// Product image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: String,
    pub url: String,
    pub is_main: bool,
    pub sort_order: i32,
}

/// Image supplied when creating or updating a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageInput {
    pub url: String,
    #[serde(default)]
    pub is_main: bool,
}

/// Input for creating a product
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    /// Generated from the title when absent
    pub slug: Option<String>,
    pub title: String,
    pub title_ar: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub sku: Option<String>,
    pub price: f64,
    pub compare_at_price: Option<f64>,
    #[serde(default)]
    pub stock_quantity: i64,
    pub brand: Option<String>,
    pub brand_ar: Option<String>,
    pub category: Option<String>,
    pub category_ar: Option<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    /// Defaults to true
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_today_deal: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub images: Vec<ProductImageInput>,
}

/// Input for updating a product; `None` leaves a field unchanged.
///
/// Optional text fields are cleared with a blank string and the compare-at
/// price with an explicit `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub title_ar: Option<String>,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub sku: Option<String>,
    pub price: Option<f64>,
    /// `Some(None)` removes the compare-at price
    #[serde(default, deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Option<f64>>,
    pub stock_quantity: Option<i64>,
    pub brand: Option<String>,
    pub brand_ar: Option<String>,
    pub category: Option<String>,
    pub category_ar: Option<String>,
    pub concerns: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_today_deal: Option<bool>,
    pub is_new: Option<bool>,
    /// Replaces the whole image list when present
    pub images: Option<Vec<ProductImageInput>>,
}

impl UpdateProductInput {
    pub fn has_changes(&self) -> bool {
        self.slug.is_some()
            || self.title.is_some()
            || self.title_ar.is_some()
            || self.description_en.is_some()
            || self.description_ar.is_some()
            || self.sku.is_some()
            || self.price.is_some()
            || self.compare_at_price.is_some()
            || self.stock_quantity.is_some()
            || self.brand.is_some()
            || self.brand_ar.is_some()
            || self.category.is_some()
            || self.category_ar.is_some()
            || self.concerns.is_some()
            || self.is_active.is_some()
            || self.is_featured.is_some()
            || self.is_today_deal.is_some()
            || self.is_new.is_some()
            || self.images.is_some()
    }

    /// Apply the set fields onto an existing product. Text is trimmed; a
    /// blank optional text field becomes `None`.
    pub fn apply_to(&self, product: &mut Product) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_text(target: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = value {
                let v = v.trim();
                *target = (!v.is_empty()).then(|| v.to_string());
            }
        }

        set(&mut product.slug, &self.slug);
        if let Some(ref title) = self.title {
            product.title = title.trim().to_string();
        }
        set_text(&mut product.title_ar, &self.title_ar);
        set_text(&mut product.description_en, &self.description_en);
        set_text(&mut product.description_ar, &self.description_ar);
        set_text(&mut product.sku, &self.sku);
        set(&mut product.price, &self.price);
        set(&mut product.compare_at_price, &self.compare_at_price);
        set(&mut product.stock_quantity, &self.stock_quantity);
        set_text(&mut product.brand, &self.brand);
        set_text(&mut product.brand_ar, &self.brand_ar);
        set_text(&mut product.category, &self.category);
        set_text(&mut product.category_ar, &self.category_ar);
        set(&mut product.concerns, &self.concerns);
        set(&mut product.is_active, &self.is_active);
        set(&mut product.is_featured, &self.is_featured);
        set(&mut product.is_today_deal, &self.is_today_deal);
        set(&mut product.is_new, &self.is_new);
    }
}

/// Tells a missing field (`None`) apart from an explicit `null` (`Some(None)`)
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Product listing query.
///
/// Serialized as the `GET /products` query string, so field names are camelCase
/// and unset filters are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_today_deal: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Only products with stock at or below the low-stock threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock: Option<bool>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            search: None,
            is_featured: None,
            is_today_deal: None,
            is_new: None,
            is_active: None,
            low_stock: None,
        }
    }
}

impl ProductQuery {
    /// Clamped pagination parameters
    pub fn params(&self) -> ListParams {
        ListParams::new(self.page, self.limit)
    }

    /// Trimmed search text, `None` when blank
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Counts removed by a delete-all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllOutcome {
    pub deleted_products_count: u64,
    pub deleted_images_count: u64,
}

#[cfg(test)]
pub(crate) fn sample_product() -> Product {
    let now = Utc::now();
    Product {
        id: "0b6f2c4e-6d1b-4f7e-9a53-0d7d3f0b8e11".to_string(),
        slug: "hydrating-serum".to_string(),
        title: "Hydrating Serum".to_string(),
        title_ar: Some("سيروم مرطب".to_string()),
        description_en: Some("Deep hydration".to_string()),
        description_ar: None,
        sku: Some("SRM-001".to_string()),
        price: 25.0,
        compare_at_price: Some(30.0),
        stock_quantity: 40,
        brand: Some("Glow Lab".to_string()),
        brand_ar: None,
        category: Some("Serums".to_string()),
        category_ar: None,
        concerns: vec!["dryness".to_string()],
        is_active: true,
        is_featured: false,
        is_today_deal: false,
        is_new: true,
        images: vec![],
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: &str, is_main: bool) -> ProductImage {
        ProductImage {
            id: id.to_string(),
            url: format!("https://cdn.test/{}.webp", id),
            is_main,
            sort_order: 0,
        }
    }

    #[test]
    fn test_stock_helpers() {
        let mut product = sample_product();
        assert!(product.is_in_stock());
        assert!(!product.is_low_stock());

        product.stock_quantity = 10;
        assert!(product.is_low_stock());

        product.stock_quantity = 0;
        assert!(!product.is_in_stock());
        assert!(product.is_low_stock());
    }

    #[test]
    fn test_main_image_prefers_flagged() {
        let mut product = sample_product();
        assert!(product.main_image().is_none());

        product.images = vec![image("a", false), image("b", true)];
        assert_eq!(product.main_image().map(|i| i.id.as_str()), Some("b"));

        product.images = vec![image("a", false), image("c", false)];
        assert_eq!(product.main_image().map(|i| i.id.as_str()), Some("a"));
    }

    #[test]
    fn test_localized_fields() {
        let product = sample_product();
        assert_eq!(product.localized_title("ar"), "سيروم مرطب");
        assert_eq!(product.localized_title("en"), "Hydrating Serum");
        // No Arabic description: fall back to English
        assert_eq!(product.localized_description("ar"), Some("Deep hydration"));
    }

    #[test]
    fn test_update_input_has_changes_and_apply() {
        let empty = UpdateProductInput::default();
        assert!(!empty.has_changes());

        let input = UpdateProductInput {
            price: Some(19.5),
            is_featured: Some(true),
            ..Default::default()
        };
        assert!(input.has_changes());

        let mut product = sample_product();
        input.apply_to(&mut product);
        assert_eq!(product.price, 19.5);
        assert!(product.is_featured);
        assert_eq!(product.title, "Hydrating Serum");
    }

    #[test]
    fn test_update_input_clears_optional_fields() {
        let input: UpdateProductInput =
            serde_json::from_str(r#"{"compareAtPrice": null, "brand": "  ", "sku": " SRM-9 "}"#).unwrap();
        assert_eq!(input.compare_at_price, Some(None));
        assert!(input.has_changes());

        let mut product = sample_product();
        input.apply_to(&mut product);
        assert_eq!(product.compare_at_price, None);
        assert_eq!(product.brand, None);
        assert_eq!(product.sku.as_deref(), Some("SRM-9"));
        // untouched
        assert_eq!(product.category.as_deref(), Some("Serums"));

        let absent: UpdateProductInput = serde_json::from_str(r#"{"price": 30}"#).unwrap();
        assert_eq!(absent.compare_at_price, None);
        let mut product = sample_product();
        absent.apply_to(&mut product);
        assert_eq!(product.compare_at_price, Some(30.0));
    }

    #[test]
    fn test_query_defaults_and_search_term() {
        let query: ProductQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);

        let query = ProductQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), None);
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let json = serde_json::to_value(sample_product()).unwrap();
        assert!(json.get("stockQuantity").is_some());
        assert!(json.get("isTodayDeal").is_some());
        assert!(json.get("stock_quantity").is_none());
    }
}

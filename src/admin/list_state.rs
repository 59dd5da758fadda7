//! Product list view state
//!
//! Filter, pagination, search and bulk selection for the admin product list.
//! The state only decides *what* to ask the API for; fetching is done by the
//! caller with [`ProductListState::to_query`] and fed back through
//! [`ProductListState::apply_page`] or [`ProductListState::apply_failure`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::api::responses::ProductListResponse;
use crate::models::{Product, ProductQuery};

/// Page size the list starts with
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Quick filter chips above the list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductFilter {
    #[default]
    All,
    Featured,
    TodayDeal,
    LowStock,
    New,
}

impl ProductFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductFilter::All => "all",
            ProductFilter::Featured => "featured",
            ProductFilter::TodayDeal => "today-deal",
            ProductFilter::LowStock => "low-stock",
            ProductFilter::New => "new",
        }
    }
}

impl fmt::Display for ProductFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ProductFilter::All),
            "featured" => Ok(ProductFilter::Featured),
            "today-deal" => Ok(ProductFilter::TodayDeal),
            "low-stock" => Ok(ProductFilter::LowStock),
            "new" => Ok(ProductFilter::New),
            _ => Err(anyhow::anyhow!("Invalid product filter: {}", s)),
        }
    }
}

/// State of the admin product list
#[derive(Debug, Clone)]
pub struct ProductListState {
    products: Vec<Product>,
    total: i64,
    loading: bool,
    search: String,
    filter: ProductFilter,
    /// 0-based
    page_index: u32,
    page_size: u32,
    selection_mode: bool,
    selected: BTreeSet<String>,
}

impl Default for ProductListState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductListState {
    /// Empty list, waiting for its first page
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
            total: 0,
            loading: true,
            search: String::new(),
            filter: ProductFilter::All,
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            selection_mode: false,
            selected: BTreeSet::new(),
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filter(&self) -> ProductFilter {
        self.filter
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Query for the current view. Only active products are listed.
    pub fn to_query(&self) -> ProductQuery {
        let search = self.search.trim();
        let mut query = ProductQuery {
            page: self.page_index + 1,
            limit: self.page_size,
            search: (!search.is_empty()).then(|| search.to_string()),
            is_active: Some(true),
            ..Default::default()
        };
        match self.filter {
            ProductFilter::All => {}
            ProductFilter::Featured => query.is_featured = Some(true),
            ProductFilter::TodayDeal => query.is_today_deal = Some(true),
            ProductFilter::LowStock => query.low_stock = Some(true),
            ProductFilter::New => query.is_new = Some(true),
        }
        query
    }

    /// Mark a fetch as started
    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    pub fn set_filter(&mut self, filter: ProductFilter) {
        self.filter = filter;
        self.page_index = 0;
    }

    /// Apply a (debounced) search text
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page_index = 0;
    }

    /// Paginator change. A new page size starts over at the first page.
    pub fn set_page(&mut self, page_index: u32, page_size: u32) {
        let page_size = page_size.max(1);
        if page_size != self.page_size {
            self.page_size = page_size;
            self.page_index = 0;
        } else {
            self.page_index = page_index;
        }
    }

    pub fn apply_page(&mut self, page: ProductListResponse) {
        self.total = page.pagination.total;
        self.products = page.products;
        self.loading = false;
    }

    /// A failed fetch leaves an empty list
    pub fn apply_failure(&mut self) {
        self.products.clear();
        self.total = 0;
        self.loading = false;
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn is_selection_mode(&self) -> bool {
        self.selection_mode
    }

    /// Enter or leave selection mode; leaving clears the selection
    pub fn toggle_selection_mode(&mut self) {
        self.selection_mode = !self.selection_mode;
        if !self.selection_mode {
            self.selected.clear();
        }
    }

    pub fn toggle_selected(&mut self, product_id: &str) {
        if !self.selected.remove(product_id) {
            self.selected.insert(product_id.to_string());
        }
    }

    /// Select every listed product, or none when all already are
    pub fn toggle_select_all(&mut self) {
        if self.is_all_selected() {
            self.selected.clear();
        } else {
            self.selected = self.products.iter().map(|p| p.id.clone()).collect();
        }
    }

    pub fn is_selected(&self, product_id: &str) -> bool {
        self.selected.contains(product_id)
    }

    pub fn is_all_selected(&self) -> bool {
        !self.products.is_empty() && self.selected.len() == self.products.len()
    }

    /// Some but not all products selected
    pub fn is_indeterminate(&self) -> bool {
        !self.selected.is_empty() && self.selected.len() < self.products.len()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    /// After a successful bulk delete: clear the selection and leave
    /// selection mode
    pub fn finish_bulk_delete(&mut self) {
        self.selected.clear();
        self.selection_mode = false;
    }
}

/// URL of the image to show for a product: the main image, else the first
pub fn main_image_url(product: &Product) -> Option<&str> {
    product
        .images
        .iter()
        .find(|img| img.is_main)
        .map(|img| img.url.as_str())
        .filter(|url| !url.is_empty())
        .or_else(|| product.images.first().map(|img| img.url.as_str()))
        .filter(|url| !url.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::responses::Pagination;
    use crate::models::{sample_product, ProductImage};
    use proptest::prelude::*;

    fn product(id: &str) -> Product {
        let mut p = sample_product();
        p.id = id.to_string();
        p
    }

    fn page(ids: &[&str], total: i64) -> ProductListResponse {
        ProductListResponse {
            products: ids.iter().map(|id| product(id)).collect(),
            pagination: Pagination {
                page: 1,
                limit: 10,
                total,
                total_pages: 1,
            },
        }
    }

    #[test]
    fn test_default_query() {
        let state = ProductListState::new();
        assert!(state.is_loading());
        assert_eq!(
            state.to_query(),
            ProductQuery {
                page: 1,
                limit: 10,
                is_active: Some(true),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_filters_map_to_query_flags() {
        let mut state = ProductListState::new();

        state.set_filter(ProductFilter::Featured);
        assert_eq!(state.to_query().is_featured, Some(true));

        state.set_filter(ProductFilter::TodayDeal);
        assert_eq!(state.to_query().is_today_deal, Some(true));

        state.set_filter(ProductFilter::LowStock);
        let query = state.to_query();
        assert_eq!(query.low_stock, Some(true));
        assert_eq!(query.is_featured, None);
        assert_eq!(query.is_active, Some(true));

        state.set_filter(ProductFilter::New);
        assert_eq!(state.to_query().is_new, Some(true));

        assert_eq!("today-deal".parse::<ProductFilter>().unwrap(), ProductFilter::TodayDeal);
        assert_eq!(ProductFilter::LowStock.to_string(), "low-stock");
        assert!("sale".parse::<ProductFilter>().is_err());
    }

    #[test]
    fn test_search_is_trimmed_and_resets_page() {
        let mut state = ProductListState::new();
        state.set_page(3, 10);
        state.set_search("  serum ");
        assert_eq!(state.page_index(), 0);
        assert_eq!(state.to_query().search.as_deref(), Some("serum"));

        state.set_search("   ");
        assert_eq!(state.to_query().search, None);
    }

    #[test]
    fn test_filter_resets_page() {
        let mut state = ProductListState::new();
        state.set_page(2, 10);
        state.set_filter(ProductFilter::New);
        assert_eq!(state.to_query().page, 1);
    }

    #[test]
    fn test_page_navigation() {
        let mut state = ProductListState::new();
        state.set_page(4, 10);
        assert_eq!(state.to_query().page, 5);

        state.set_page(4, 25);
        assert_eq!((state.page_index(), state.page_size()), (0, 25));
    }

    #[test]
    fn test_apply_page_and_failure() {
        let mut state = ProductListState::new();
        state.apply_page(page(&["a", "b"], 12));
        assert_eq!(state.products().len(), 2);
        assert_eq!(state.total(), 12);
        assert!(!state.is_loading());

        state.begin_loading();
        state.apply_failure();
        assert!(state.products().is_empty());
        assert_eq!(state.total(), 0);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_selection() {
        let mut state = ProductListState::new();
        state.apply_page(page(&["a", "b", "c"], 3));
        state.toggle_selection_mode();

        state.toggle_selected("b");
        assert!(state.is_selected("b"));
        assert!(state.is_indeterminate());
        assert!(!state.is_all_selected());

        state.toggle_select_all();
        assert!(state.is_all_selected());
        assert!(!state.is_indeterminate());
        assert_eq!(state.selected_ids(), vec!["a", "b", "c"]);

        state.toggle_select_all();
        assert_eq!(state.selected_count(), 0);

        state.toggle_selected("a");
        state.toggle_selected("a");
        assert_eq!(state.selected_count(), 0);

        state.toggle_selected("c");
        state.toggle_selection_mode();
        assert!(!state.is_selection_mode());
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_finish_bulk_delete() {
        let mut state = ProductListState::new();
        state.apply_page(page(&["a"], 1));
        state.toggle_selection_mode();
        state.toggle_select_all();
        state.finish_bulk_delete();
        assert!(!state.is_selection_mode());
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_empty_list_is_never_all_selected() {
        let state = ProductListState::new();
        assert!(!state.is_all_selected());
        assert!(!state.is_indeterminate());
    }

    #[test]
    fn test_main_image_url() {
        let image = |url: &str, is_main: bool| ProductImage {
            id: url.to_string(),
            url: url.to_string(),
            is_main,
            sort_order: 0,
        };
        let mut p = sample_product();
        assert_eq!(main_image_url(&p), None);

        p.images = vec![image("first.webp", false), image("main.webp", true)];
        assert_eq!(main_image_url(&p), Some("main.webp"));

        p.images = vec![image("first.webp", false), image("", true)];
        assert_eq!(main_image_url(&p), Some("first.webp"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn property_page_size_change_resets_page(
            start in 0u32..50,
            target in 0u32..50,
            size in prop::sample::select(vec![5u32, 10, 25, 50, 100]),
        ) {
            let mut state = ProductListState::new();
            state.set_page(start, DEFAULT_PAGE_SIZE);
            state.set_page(target, size);
            if size == DEFAULT_PAGE_SIZE {
                prop_assert_eq!(state.page_index(), target);
            } else {
                prop_assert_eq!(state.page_index(), 0);
            }
            prop_assert_eq!(state.to_query().page, state.page_index() + 1);
        }
    }
}

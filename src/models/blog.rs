//! Blog models
//!
//! Posts, categories, authors and tags. Every user-facing text exists in an
//! English and an Arabic variant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Blog category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogCategory {
    pub id: String,
    pub name_en: String,
    pub name_ar: String,
    pub slug_en: String,
    pub slug_ar: String,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    /// Hex color used by the storefront badge
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Blog author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogAuthor {
    pub id: String,
    pub name_en: String,
    pub name_ar: String,
    #[serde(skip_serializing)]
    pub email: String,
    pub avatar: Option<String>,
    pub bio_en: Option<String>,
    pub bio_ar: Option<String>,
    /// Network name → handle
    #[serde(default)]
    pub social_links: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// Blog tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogTag {
    pub id: String,
    pub name_en: String,
    pub name_ar: String,
    pub slug_en: String,
    pub slug_ar: String,
    pub created_at: DateTime<Utc>,
}

/// Blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title_en: String,
    pub title_ar: String,
    pub slug_en: String,
    pub slug_ar: String,
    pub excerpt_en: Option<String>,
    pub excerpt_ar: Option<String>,
    /// Markdown source
    pub content_en: String,
    /// Markdown source
    pub content_ar: String,
    pub featured_image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub read_time_en: Option<String>,
    pub read_time_ar: Option<String>,
    pub featured: bool,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub seo_title_en: Option<String>,
    pub seo_title_ar: Option<String>,
    pub seo_description_en: Option<String>,
    pub seo_description_ar: Option<String>,
    pub views: i64,
    pub likes: i64,
    pub comments_count: i64,
    pub category_id: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    /// Slug used under the given locale
    pub fn slug_for(&self, locale: &str) -> &str {
        if locale.eq_ignore_ascii_case("ar") {
            &self.slug_ar
        } else {
            &self.slug_en
        }
    }

    pub fn title_for(&self, locale: &str) -> &str {
        if locale.eq_ignore_ascii_case("ar") {
            &self.title_ar
        } else {
            &self.title_en
        }
    }

    pub fn content_for(&self, locale: &str) -> &str {
        if locale.eq_ignore_ascii_case("ar") {
            &self.content_ar
        } else {
            &self.content_en
        }
    }

    /// Whether this post is visible to readers
    pub fn is_visible(&self) -> bool {
        self.published && self.published_at.map_or(true, |at| at <= Utc::now())
    }
}

/// New category; upserted by `slug_en`
#[derive(Debug, Clone, Default)]
pub struct NewBlogCategory {
    pub name_en: String,
    pub name_ar: String,
    pub slug_en: String,
    pub slug_ar: String,
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub color: Option<String>,
}

/// New author; looked up by `email` before creation
#[derive(Debug, Clone, Default)]
pub struct NewBlogAuthor {
    pub name_en: String,
    pub name_ar: String,
    pub email: String,
    pub avatar: Option<String>,
    pub bio_en: Option<String>,
    pub bio_ar: Option<String>,
    pub social_links: BTreeMap<String, String>,
}

/// New tag; upserted by `slug_en`
#[derive(Debug, Clone, Default)]
pub struct NewBlogTag {
    pub name_en: String,
    pub name_ar: String,
    pub slug_en: String,
    pub slug_ar: String,
}

/// New post
#[derive(Debug, Clone, Default)]
pub struct NewBlogPost {
    pub title_en: String,
    pub title_ar: String,
    pub slug_en: String,
    pub slug_ar: String,
    pub excerpt_en: Option<String>,
    pub excerpt_ar: Option<String>,
    pub content_en: String,
    pub content_ar: String,
    pub featured_image: Option<String>,
    pub images: Vec<String>,
    pub read_time_en: Option<String>,
    pub read_time_ar: Option<String>,
    pub featured: bool,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub seo_title_en: Option<String>,
    pub seo_title_ar: Option<String>,
    pub seo_description_en: Option<String>,
    pub seo_description_ar: Option<String>,
    pub views: i64,
    pub likes: i64,
    pub category_id: String,
    pub author_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> BlogPost {
        let now = Utc::now();
        BlogPost {
            id: "p".into(),
            title_en: "Sunscreen 101".into(),
            title_ar: "واقي الشمس".into(),
            slug_en: "sunscreen-101".into(),
            slug_ar: "واقي-الشمس".into(),
            excerpt_en: None,
            excerpt_ar: None,
            content_en: "# Hi".into(),
            content_ar: "# مرحبا".into(),
            featured_image: None,
            images: vec![],
            read_time_en: None,
            read_time_ar: None,
            featured: false,
            published: true,
            published_at: Some(now - chrono::Duration::days(1)),
            seo_title_en: None,
            seo_title_ar: None,
            seo_description_en: None,
            seo_description_ar: None,
            views: 0,
            likes: 0,
            comments_count: 0,
            category_id: "c".into(),
            author_id: "a".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_locale_accessors() {
        let post = post();
        assert_eq!(post.slug_for("en"), "sunscreen-101");
        assert_eq!(post.slug_for("AR"), "واقي-الشمس");
        assert_eq!(post.title_for("ar"), "واقي الشمس");
        assert_eq!(post.content_for("fr"), "# Hi");
    }

    #[test]
    fn test_visibility() {
        let mut post = post();
        assert!(post.is_visible());

        post.published_at = Some(Utc::now() + chrono::Duration::days(3));
        assert!(!post.is_visible());

        post.published_at = None;
        post.published = false;
        assert!(!post.is_visible());
    }
}

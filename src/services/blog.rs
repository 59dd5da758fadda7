//! Blog service
//!
//! Read side of the bilingual beauty blog plus the seeding routine behind the
//! `seed-blogs` binary:
//! - published post listing, optionally by category
//! - post lookup by either locale slug, with Markdown rendered to HTML
//! - categories and tags
//! - `seed_beauty_blog`, safe to run repeatedly

use crate::db::repositories::BlogRepository;
use crate::models::{BlogAuthor, BlogCategory, BlogPost, BlogTag, ListParams, NewBlogPost, PagedResult};
use crate::services::blog_seed::{self, SeedPost};
use crate::services::markdown::MarkdownRenderer;
use crate::services::slug::{slugify_ar, slugify_en};
use anyhow::{anyhow, Context};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Error types for blog service operations
#[derive(Debug, thiserror::Error)]
pub enum BlogServiceError {
    /// Post not found or not yet published
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// A published post with rendered bodies and its relations
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: BlogPost,
    pub content_html_en: String,
    pub content_html_ar: String,
    pub category: Option<BlogCategory>,
    pub author: Option<BlogAuthor>,
    pub tags: Vec<BlogTag>,
}

/// What a seeding run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub tags: usize,
    pub authors_created: usize,
    pub authors_existing: usize,
    pub posts_created: usize,
    pub posts_skipped: usize,
}

/// Blog service for published content and seeding
pub struct BlogService {
    repo: Arc<dyn BlogRepository>,
    renderer: MarkdownRenderer,
}

impl BlogService {
    pub fn new(repo: Arc<dyn BlogRepository>) -> Self {
        Self {
            repo,
            renderer: MarkdownRenderer::new(),
        }
    }

    /// Published posts, newest first
    pub async fn list_published(
        &self,
        params: &ListParams,
        category_slug: Option<&str>,
    ) -> Result<PagedResult<BlogPost>, BlogServiceError> {
        let category_slug = category_slug.map(str::trim).filter(|s| !s.is_empty());
        Ok(self
            .repo
            .list_published(params, category_slug)
            .await
            .context("Failed to list blog posts")?)
    }

    /// Look up a visible post by its English or Arabic slug
    pub async fn get_post_by_slug(&self, slug: &str) -> Result<PostDetail, BlogServiceError> {
        let post = self
            .repo
            .get_post_by_slug(slug)
            .await
            .context("Failed to get blog post")?
            .filter(BlogPost::is_visible)
            .ok_or_else(|| BlogServiceError::NotFound(slug.to_string()))?;

        let category = self.repo.get_category(&post.category_id).await.context("Failed to get category")?;
        let author = self.repo.get_author(&post.author_id).await.context("Failed to get author")?;
        let tags = self.repo.tags_for_post(&post.id).await.context("Failed to get post tags")?;

        Ok(PostDetail {
            content_html_en: self.renderer.render(&post.content_en),
            content_html_ar: self.renderer.render(&post.content_ar),
            post,
            category,
            author,
            tags,
        })
    }

    pub async fn list_categories(&self) -> Result<Vec<BlogCategory>, BlogServiceError> {
        Ok(self.repo.list_categories().await.context("Failed to list categories")?)
    }

    pub async fn list_tags(&self) -> Result<Vec<BlogTag>, BlogServiceError> {
        Ok(self.repo.list_tags().await.context("Failed to list tags")?)
    }

    /// Load the beauty blog starter content.
    ///
    /// Categories and tags are matched on their English slug and authors on
    /// their email, so existing rows are reused. A post whose generated slug is
    /// already taken in either locale is skipped.
    pub async fn seed_beauty_blog(&self) -> Result<SeedReport, BlogServiceError> {
        let mut report = SeedReport::default();

        let mut category_ids = HashMap::new();
        for input in blog_seed::categories() {
            let category = self.repo.upsert_category_by_slug(&input).await?;
            tracing::debug!(slug = %category.slug_en, "Blog category ready");
            category_ids.insert(category.slug_en, category.id);
            report.categories += 1;
        }

        let mut author_ids = HashMap::new();
        for input in blog_seed::authors() {
            let author = match self.repo.find_author_by_email(&input.email).await? {
                Some(existing) => {
                    report.authors_existing += 1;
                    existing
                }
                None => {
                    report.authors_created += 1;
                    self.repo.create_author(&input).await?
                }
            };
            author_ids.insert(author.email, author.id);
        }

        let mut tag_ids = HashMap::new();
        for input in blog_seed::tags() {
            let tag = self.repo.upsert_tag_by_slug(&input).await?;
            tag_ids.insert(tag.slug_en, tag.id);
            report.tags += 1;
        }

        for seed in blog_seed::POSTS {
            let slug_en = slugify_en(seed.title_en);
            let slug_ar = slugify_ar(seed.title_ar);
            if self.repo.post_slug_exists(&slug_en).await? || self.repo.post_slug_exists(&slug_ar).await? {
                tracing::info!(slug = %slug_en, "Blog post already exists, skipping");
                report.posts_skipped += 1;
                continue;
            }

            let input = new_post(&seed, slug_en, slug_ar, &category_ids, &author_ids)?;
            let post = self.repo.create_post(&input).await?;
            for tag in seed.tags {
                let tag_id = tag_ids
                    .get(*tag)
                    .ok_or_else(|| anyhow!("Seed post references unknown tag {}", tag))?;
                self.repo.attach_tag(&post.id, tag_id).await?;
            }

            tracing::info!(title = %post.title_en, "Created blog post");
            report.posts_created += 1;
        }

        Ok(report)
    }
}

fn new_post(
    seed: &SeedPost,
    slug_en: String,
    slug_ar: String,
    category_ids: &HashMap<String, String>,
    author_ids: &HashMap<String, String>,
) -> anyhow::Result<NewBlogPost> {
    let category_id = category_ids
        .get(seed.category)
        .ok_or_else(|| anyhow!("Seed post references unknown category {}", seed.category))?;
    let author_id = author_ids
        .get(seed.author_email)
        .ok_or_else(|| anyhow!("Seed post references unknown author {}", seed.author_email))?;

    Ok(NewBlogPost {
        title_en: seed.title_en.to_string(),
        title_ar: seed.title_ar.to_string(),
        slug_en,
        slug_ar,
        excerpt_en: Some(seed.excerpt_en.to_string()),
        excerpt_ar: Some(seed.excerpt_ar.to_string()),
        content_en: seed.content_en.to_string(),
        content_ar: seed.content_ar.to_string(),
        featured_image: Some(blog_seed::FEATURED_IMAGE.to_string()),
        images: blog_seed::GALLERY.iter().map(|s| s.to_string()).collect(),
        read_time_en: Some(blog_seed::READ_TIME_EN.to_string()),
        read_time_ar: Some(blog_seed::READ_TIME_AR.to_string()),
        featured: seed.featured,
        published: true,
        published_at: Some(Utc::now()),
        seo_title_en: Some(seed.title_en.to_string()),
        seo_title_ar: Some(seed.title_ar.to_string()),
        seo_description_en: Some(seed.excerpt_en.to_string()),
        seo_description_ar: Some(seed.excerpt_ar.to_string()),
        views: seed.views,
        likes: seed.likes,
        category_id: category_id.clone(),
        author_id: author_id.clone(),
    })
}

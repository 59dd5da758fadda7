//! Blog repository
//!
//! Posts, categories, authors, tags and the post/tag join table.

use crate::db::repositories::decode_json;
use crate::db::DynDatabasePool;
use crate::models::{
    BlogAuthor, BlogCategory, BlogPost, BlogTag, ListParams, NewBlogAuthor, NewBlogCategory, NewBlogPost,
    NewBlogTag, PagedResult,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;

const CATEGORY_COLUMNS: &str =
    "id, name_en, name_ar, slug_en, slug_ar, description_en, description_ar, color, created_at";
const TAG_COLUMNS: &str = "id, name_en, name_ar, slug_en, slug_ar, created_at";
const AUTHOR_COLUMNS: &str = "id, name_en, name_ar, email, avatar, bio_en, bio_ar, social_links, created_at";
const POST_COLUMNS: &str = "id, title_en, title_ar, slug_en, slug_ar, excerpt_en, excerpt_ar, content_en, \
     content_ar, featured_image, images, read_time_en, read_time_ar, featured, published, published_at, \
     seo_title_en, seo_title_ar, seo_description_en, seo_description_ar, views, likes, comments_count, \
     category_id, author_id, created_at, updated_at";

/// Published-and-due condition; binds the current time once
const VISIBLE: &str = "published = ? AND (published_at IS NULL OR published_at <= ?)";

/// Locale slugs and last modification time of a published post
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapPost {
    pub slug_en: String,
    pub slug_ar: String,
    pub updated_at: DateTime<Utc>,
}

/// Blog repository trait
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Return the category with `slug_en`, creating it when missing
    async fn upsert_category_by_slug(&self, input: &NewBlogCategory) -> Result<BlogCategory>;

    /// Return the tag with `slug_en`, creating it when missing
    async fn upsert_tag_by_slug(&self, input: &NewBlogTag) -> Result<BlogTag>;

    async fn find_author_by_email(&self, email: &str) -> Result<Option<BlogAuthor>>;

    async fn create_author(&self, input: &NewBlogAuthor) -> Result<BlogAuthor>;

    async fn get_author(&self, id: &str) -> Result<Option<BlogAuthor>>;

    async fn get_category(&self, id: &str) -> Result<Option<BlogCategory>>;

    async fn create_post(&self, input: &NewBlogPost) -> Result<BlogPost>;

    /// Whether a post already uses `slug` in either locale
    async fn post_slug_exists(&self, slug: &str) -> Result<bool>;

    /// Link a tag to a post; linking twice is a no-op
    async fn attach_tag(&self, post_id: &str, tag_id: &str) -> Result<()>;

    /// Visible posts, newest publication first, optionally within a category slug
    async fn list_published(&self, params: &ListParams, category_slug: Option<&str>) -> Result<PagedResult<BlogPost>>;

    /// Any post whose English or Arabic slug equals `slug`
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>>;

    async fn list_categories(&self) -> Result<Vec<BlogCategory>>;

    async fn list_tags(&self) -> Result<Vec<BlogTag>>;

    async fn tags_for_post(&self, post_id: &str) -> Result<Vec<BlogTag>>;

    /// Visible posts for the sitemap
    async fn list_published_for_sitemap(&self) -> Result<Vec<SitemapPost>>;
}

/// SQLx-based blog repository implementation
pub struct SqlxBlogRepository {
    pool: DynDatabasePool,
}

impl SqlxBlogRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn BlogRepository> {
        Arc::new(Self::new(pool))
    }
}

macro_rules! category_from_row {
    ($row:expr) => {{
        let row = $row;
        BlogCategory {
            id: row.try_get("id")?,
            name_en: row.try_get("name_en")?,
            name_ar: row.try_get("name_ar")?,
            slug_en: row.try_get("slug_en")?,
            slug_ar: row.try_get("slug_ar")?,
            description_en: row.try_get("description_en")?,
            description_ar: row.try_get("description_ar")?,
            color: row.try_get("color")?,
            created_at: row.try_get("created_at")?,
        }
    }};
}

macro_rules! tag_from_row {
    ($row:expr) => {{
        let row = $row;
        BlogTag {
            id: row.try_get("id")?,
            name_en: row.try_get("name_en")?,
            name_ar: row.try_get("name_ar")?,
            slug_en: row.try_get("slug_en")?,
            slug_ar: row.try_get("slug_ar")?,
            created_at: row.try_get("created_at")?,
        }
    }};
}

macro_rules! author_from_row {
    ($row:expr) => {{
        let row = $row;
        BlogAuthor {
            id: row.try_get("id")?,
            name_en: row.try_get("name_en")?,
            name_ar: row.try_get("name_ar")?,
            email: row.try_get("email")?,
            avatar: row.try_get("avatar")?,
            bio_en: row.try_get("bio_en")?,
            bio_ar: row.try_get("bio_ar")?,
            social_links: decode_json("social_links", row.try_get("social_links")?)?,
            created_at: row.try_get("created_at")?,
        }
    }};
}

macro_rules! post_from_row {
    ($row:expr) => {{
        let row = $row;
        BlogPost {
            id: row.try_get("id")?,
            title_en: row.try_get("title_en")?,
            title_ar: row.try_get("title_ar")?,
            slug_en: row.try_get("slug_en")?,
            slug_ar: row.try_get("slug_ar")?,
            excerpt_en: row.try_get("excerpt_en")?,
            excerpt_ar: row.try_get("excerpt_ar")?,
            content_en: row.try_get("content_en")?,
            content_ar: row.try_get("content_ar")?,
            featured_image: row.try_get("featured_image")?,
            images: decode_json("images", row.try_get("images")?)?,
            read_time_en: row.try_get("read_time_en")?,
            read_time_ar: row.try_get("read_time_ar")?,
            featured: row.try_get("featured")?,
            published: row.try_get("published")?,
            published_at: row.try_get("published_at")?,
            seo_title_en: row.try_get("seo_title_en")?,
            seo_title_ar: row.try_get("seo_title_ar")?,
            seo_description_en: row.try_get("seo_description_en")?,
            seo_description_ar: row.try_get("seo_description_ar")?,
            views: row.try_get("views")?,
            likes: row.try_get("likes")?,
            comments_count: row.try_get("comments_count")?,
            category_id: row.try_get("category_id")?,
            author_id: row.try_get("author_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }
    }};
}

impl SqlxBlogRepository {
    async fn category_by_slug(&self, slug_en: &str) -> Result<Option<BlogCategory>> {
        let sql = format!("SELECT {} FROM blog_categories WHERE slug_en = ?", CATEGORY_COLUMNS);
        on_pool!(self.pool, |conn| {
            let row = sqlx::query(&sql)
                .bind(slug_en)
                .fetch_optional(conn)
                .await
                .context("Failed to get blog category by slug")?;
            match row {
                Some(row) => Ok(Some(category_from_row!(&row))),
                None => Ok(None),
            }
        })
    }

    async fn tag_by_slug(&self, slug_en: &str) -> Result<Option<BlogTag>> {
        let sql = format!("SELECT {} FROM blog_tags WHERE slug_en = ?", TAG_COLUMNS);
        on_pool!(self.pool, |conn| {
            let row = sqlx::query(&sql)
                .bind(slug_en)
                .fetch_optional(conn)
                .await
                .context("Failed to get blog tag by slug")?;
            match row {
                Some(row) => Ok(Some(tag_from_row!(&row))),
                None => Ok(None),
            }
        })
    }
}

#[async_trait]
impl BlogRepository for SqlxBlogRepository {
    async fn upsert_category_by_slug(&self, input: &NewBlogCategory) -> Result<BlogCategory> {
        if let Some(existing) = self.category_by_slug(&input.slug_en).await? {
            return Ok(existing);
        }

        let category = BlogCategory {
            id: Uuid::new_v4().to_string(),
            name_en: input.name_en.clone(),
            name_ar: input.name_ar.clone(),
            slug_en: input.slug_en.clone(),
            slug_ar: input.slug_ar.clone(),
            description_en: input.description_en.clone(),
            description_ar: input.description_ar.clone(),
            color: input.color.clone(),
            created_at: Utc::now(),
        };

        on_pool!(self.pool, |conn| {
            sqlx::query(
                "INSERT INTO blog_categories (id, name_en, name_ar, slug_en, slug_ar, description_en, \
                 description_ar, color, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&category.id)
            .bind(&category.name_en)
            .bind(&category.name_ar)
            .bind(&category.slug_en)
            .bind(&category.slug_ar)
            .bind(&category.description_en)
            .bind(&category.description_ar)
            .bind(&category.color)
            .bind(category.created_at)
            .execute(conn)
            .await
            .context("Failed to create blog category")?;
        });

        Ok(category)
    }

    async fn upsert_tag_by_slug(&self, input: &NewBlogTag) -> Result<BlogTag> {
        if let Some(existing) = self.tag_by_slug(&input.slug_en).await? {
            return Ok(existing);
        }

        let tag = BlogTag {
            id: Uuid::new_v4().to_string(),
            name_en: input.name_en.clone(),
            name_ar: input.name_ar.clone(),
            slug_en: input.slug_en.clone(),
            slug_ar: input.slug_ar.clone(),
            created_at: Utc::now(),
        };

        on_pool!(self.pool, |conn| {
            sqlx::query(
                "INSERT INTO blog_tags (id, name_en, name_ar, slug_en, slug_ar, created_at) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&tag.id)
            .bind(&tag.name_en)
            .bind(&tag.name_ar)
            .bind(&tag.slug_en)
            .bind(&tag.slug_ar)
            .bind(tag.created_at)
            .execute(conn)
            .await
            .context("Failed to create blog tag")?;
        });

        Ok(tag)
    }

    async fn find_author_by_email(&self, email: &str) -> Result<Option<BlogAuthor>> {
        let sql = format!("SELECT {} FROM blog_authors WHERE email = ?", AUTHOR_COLUMNS);
        on_pool!(self.pool, |conn| {
            let row = sqlx::query(&sql)
                .bind(email)
                .fetch_optional(conn)
                .await
                .context("Failed to get blog author by email")?;
            match row {
                Some(row) => Ok(Some(author_from_row!(&row))),
                None => Ok(None),
            }
        })
    }

    async fn create_author(&self, input: &NewBlogAuthor) -> Result<BlogAuthor> {
        let author = BlogAuthor {
            id: Uuid::new_v4().to_string(),
            name_en: input.name_en.clone(),
            name_ar: input.name_ar.clone(),
            email: input.email.clone(),
            avatar: input.avatar.clone(),
            bio_en: input.bio_en.clone(),
            bio_ar: input.bio_ar.clone(),
            social_links: input.social_links.clone(),
            created_at: Utc::now(),
        };
        let social_links = serde_json::to_string(&author.social_links)?;

        on_pool!(self.pool, |conn| {
            sqlx::query(
                "INSERT INTO blog_authors (id, name_en, name_ar, email, avatar, bio_en, bio_ar, \
                 social_links, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&author.id)
            .bind(&author.name_en)
            .bind(&author.name_ar)
            .bind(&author.email)
            .bind(&author.avatar)
            .bind(&author.bio_en)
            .bind(&author.bio_ar)
            .bind(&social_links)
            .bind(author.created_at)
            .execute(conn)
            .await
            .context("Failed to create blog author")?;
        });

        Ok(author)
    }

    async fn get_author(&self, id: &str) -> Result<Option<BlogAuthor>> {
        let sql = format!("SELECT {} FROM blog_authors WHERE id = ?", AUTHOR_COLUMNS);
        on_pool!(self.pool, |conn| {
            let row = sqlx::query(&sql)
                .bind(id)
                .fetch_optional(conn)
                .await
                .context("Failed to get blog author")?;
            match row {
                Some(row) => Ok(Some(author_from_row!(&row))),
                None => Ok(None),
            }
        })
    }

    async fn get_category(&self, id: &str) -> Result<Option<BlogCategory>> {
        let sql = format!("SELECT {} FROM blog_categories WHERE id = ?", CATEGORY_COLUMNS);
        on_pool!(self.pool, |conn| {
            let row = sqlx::query(&sql)
                .bind(id)
                .fetch_optional(conn)
                .await
                .context("Failed to get blog category")?;
            match row {
                Some(row) => Ok(Some(category_from_row!(&row))),
                None => Ok(None),
            }
        })
    }

    async fn create_post(&self, input: &NewBlogPost) -> Result<BlogPost> {
        let now = Utc::now();
        let post = BlogPost {
            id: Uuid::new_v4().to_string(),
            title_en: input.title_en.clone(),
            title_ar: input.title_ar.clone(),
            slug_en: input.slug_en.clone(),
            slug_ar: input.slug_ar.clone(),
            excerpt_en: input.excerpt_en.clone(),
            excerpt_ar: input.excerpt_ar.clone(),
            content_en: input.content_en.clone(),
            content_ar: input.content_ar.clone(),
            featured_image: input.featured_image.clone(),
            images: input.images.clone(),
            read_time_en: input.read_time_en.clone(),
            read_time_ar: input.read_time_ar.clone(),
            featured: input.featured,
            published: input.published,
            published_at: input.published_at,
            seo_title_en: input.seo_title_en.clone(),
            seo_title_ar: input.seo_title_ar.clone(),
            seo_description_en: input.seo_description_en.clone(),
            seo_description_ar: input.seo_description_ar.clone(),
            views: input.views,
            likes: input.likes,
            comments_count: 0,
            category_id: input.category_id.clone(),
            author_id: input.author_id.clone(),
            created_at: now,
            updated_at: now,
        };
        let images = serde_json::to_string(&post.images)?;

        on_pool!(self.pool, |conn| {
            sqlx::query(&format!(
                "INSERT INTO blog_posts ({}) VALUES ({})",
                POST_COLUMNS,
                super::placeholders(27)
            ))
            .bind(&post.id)
            .bind(&post.title_en)
            .bind(&post.title_ar)
            .bind(&post.slug_en)
            .bind(&post.slug_ar)
            .bind(&post.excerpt_en)
            .bind(&post.excerpt_ar)
            .bind(&post.content_en)
            .bind(&post.content_ar)
            .bind(&post.featured_image)
            .bind(&images)
            .bind(&post.read_time_en)
            .bind(&post.read_time_ar)
            .bind(post.featured)
            .bind(post.published)
            .bind(post.published_at)
            .bind(&post.seo_title_en)
            .bind(&post.seo_title_ar)
            .bind(&post.seo_description_en)
            .bind(&post.seo_description_ar)
            .bind(post.views)
            .bind(post.likes)
            .bind(post.comments_count)
            .bind(&post.category_id)
            .bind(&post.author_id)
            .bind(post.created_at)
            .bind(post.updated_at)
            .execute(conn)
            .await
            .context("Failed to create blog post")?;
        });

        Ok(post)
    }

    async fn post_slug_exists(&self, slug: &str) -> Result<bool> {
        on_pool!(self.pool, |conn| {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_posts WHERE slug_en = ? OR slug_ar = ?")
                .bind(slug)
                .bind(slug)
                .fetch_one(conn)
                .await
                .context("Failed to check blog post slug")?;
            Ok(count > 0)
        })
    }

    async fn attach_tag(&self, post_id: &str, tag_id: &str) -> Result<()> {
        on_pool!(self.pool, |conn| {
            let linked: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_post_tags WHERE post_id = ? AND tag_id = ?")
                .bind(post_id)
                .bind(tag_id)
                .fetch_one(conn)
                .await
                .context("Failed to check post tag link")?;
            if linked == 0 {
                sqlx::query("INSERT INTO blog_post_tags (post_id, tag_id) VALUES (?, ?)")
                    .bind(post_id)
                    .bind(tag_id)
                    .execute(conn)
                    .await
                    .context("Failed to attach tag to post")?;
            }
        });
        Ok(())
    }

    async fn list_published(&self, params: &ListParams, category_slug: Option<&str>) -> Result<PagedResult<BlogPost>> {
        let now = Utc::now();
        let category_filter = if category_slug.is_some() {
            " AND category_id IN (SELECT id FROM blog_categories WHERE slug_en = ? OR slug_ar = ?)"
        } else {
            ""
        };
        let count_sql = format!("SELECT COUNT(*) FROM blog_posts WHERE {}{}", VISIBLE, category_filter);
        let list_sql = format!(
            "SELECT {} FROM blog_posts WHERE {}{} ORDER BY COALESCE(published_at, created_at) DESC, id ASC LIMIT ? OFFSET ?",
            POST_COLUMNS, VISIBLE, category_filter
        );

        on_pool!(self.pool, |conn| {
            let mut count = sqlx::query_scalar::<_, i64>(&count_sql).bind(true).bind(now);
            let mut list = sqlx::query(&list_sql).bind(true).bind(now);
            if let Some(slug) = category_slug {
                count = count.bind(slug).bind(slug);
                list = list.bind(slug).bind(slug);
            }

            let total = count
                .fetch_one(conn)
                .await
                .context("Failed to count blog posts")?;
            let rows = list
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(conn)
                .await
                .context("Failed to list blog posts")?;

            let posts = rows
                .iter()
                .map(|row| -> Result<BlogPost> { Ok(post_from_row!(row)) })
                .collect::<Result<Vec<_>>>()?;
            Ok(PagedResult::new(posts, total, params))
        })
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>> {
        let sql = format!(
            "SELECT {} FROM blog_posts WHERE slug_en = ? OR slug_ar = ? LIMIT 1",
            POST_COLUMNS
        );
        on_pool!(self.pool, |conn| {
            let row = sqlx::query(&sql)
                .bind(slug)
                .bind(slug)
                .fetch_optional(conn)
                .await
                .context("Failed to get blog post by slug")?;
            match row {
                Some(row) => Ok(Some(post_from_row!(&row))),
                None => Ok(None),
            }
        })
    }

    async fn list_categories(&self) -> Result<Vec<BlogCategory>> {
        let sql = format!("SELECT {} FROM blog_categories ORDER BY name_en ASC", CATEGORY_COLUMNS);
        on_pool!(self.pool, |conn| {
            let rows = sqlx::query(&sql)
                .fetch_all(conn)
                .await
                .context("Failed to list blog categories")?;
            rows.iter()
                .map(|row| -> Result<BlogCategory> { Ok(category_from_row!(row)) })
                .collect()
        })
    }

    async fn list_tags(&self) -> Result<Vec<BlogTag>> {
        let sql = format!("SELECT {} FROM blog_tags ORDER BY name_en ASC", TAG_COLUMNS);
        on_pool!(self.pool, |conn| {
            let rows = sqlx::query(&sql)
                .fetch_all(conn)
                .await
                .context("Failed to list blog tags")?;
            rows.iter()
                .map(|row| -> Result<BlogTag> { Ok(tag_from_row!(row)) })
                .collect()
        })
    }

    async fn tags_for_post(&self, post_id: &str) -> Result<Vec<BlogTag>> {
        let sql = "SELECT t.id, t.name_en, t.name_ar, t.slug_en, t.slug_ar, t.created_at \
                   FROM blog_tags t INNER JOIN blog_post_tags pt ON pt.tag_id = t.id \
                   WHERE pt.post_id = ? ORDER BY t.name_en ASC";
        on_pool!(self.pool, |conn| {
            let rows = sqlx::query(sql)
                .bind(post_id)
                .fetch_all(conn)
                .await
                .context("Failed to list tags for post")?;
            rows.iter()
                .map(|row| -> Result<BlogTag> { Ok(tag_from_row!(row)) })
                .collect()
        })
    }

    async fn list_published_for_sitemap(&self) -> Result<Vec<SitemapPost>> {
        let sql = format!(
            "SELECT slug_en, slug_ar, updated_at FROM blog_posts WHERE {} ORDER BY updated_at DESC",
            VISIBLE
        );
        let now = Utc::now();
        on_pool!(self.pool, |conn| {
            let rows = sqlx::query(&sql)
                .bind(true)
                .bind(now)
                .fetch_all(conn)
                .await
                .context("Failed to list blog posts for sitemap")?;
            rows.iter()
                .map(|row| -> Result<SitemapPost> {
                    Ok(SitemapPost {
                        slug_en: row.try_get("slug_en")?,
                        slug_ar: row.try_get("slug_ar")?,
                        updated_at: row.try_get("updated_at")?,
                    })
                })
                .collect()
        })
    }
}

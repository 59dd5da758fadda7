//! Blog API endpoints
//!
//! Public, read-only:
//! - GET /api/v1/blog/posts - Published posts, optionally by category
//! - GET /api/v1/blog/posts/{slug} - One post by English or Arabic slug
//! - GET /api/v1/blog/categories
//! - GET /api/v1/blog/tags

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::PostListResponse;
use crate::models::{BlogCategory, BlogTag, ListParams};
use crate::services::PostDetail;

/// Query parameters for listing posts
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// English category slug
    pub category: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    9
}

/// Build the blog router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/{slug}", get(get_post))
        .route("/categories", get(list_categories))
        .route("/tags", get(list_tags))
}

/// GET /api/v1/blog/posts
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let params = ListParams::new(query.page, query.limit);
    let result = state
        .blog_service
        .list_published(&params, query.category.as_deref())
        .await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/blog/posts/{slug}
async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetail>, ApiError> {
    Ok(Json(state.blog_service.get_post_by_slug(&slug).await?))
}

/// GET /api/v1/blog/categories
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<BlogCategory>>, ApiError> {
    Ok(Json(state.blog_service.list_categories().await?))
}

/// GET /api/v1/blog/tags
async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<BlogTag>>, ApiError> {
    Ok(Json(state.blog_service.list_tags().await?))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::test_server;
    use serde_json::Value;

    #[tokio::test]
    async fn test_seeded_blog_is_served() {
        let (server, state) = test_server().await;
        state.blog_service.seed_beauty_blog().await.unwrap();

        let list: Value = server.get("/api/v1/blog/posts").await.json();
        assert_eq!(list["pagination"]["total"], 4);
        let slug = list["posts"][0]["slugEn"].as_str().unwrap().to_string();
        let slug_ar = list["posts"][0]["slugAr"].as_str().unwrap().to_string();

        let post: Value = server.get(&format!("/api/v1/blog/posts/{}", slug)).await.json();
        assert!(post["contentHtmlEn"].as_str().unwrap().contains("<h2>"));
        assert!(post["author"].get("email").is_none());
        assert!(!post["tags"].as_array().unwrap().is_empty());

        let by_arabic: Value = server
            .get(&format!("/api/v1/blog/posts/{}", urlencoding::encode(&slug_ar)))
            .await
            .json();
        assert_eq!(by_arabic["id"], post["id"]);

        let makeup: Value = server
            .get("/api/v1/blog/posts")
            .add_query_param("category", "makeup")
            .await
            .json();
        assert!(makeup["pagination"]["total"].as_i64().unwrap() < 4);

        let categories: Value = server.get("/api/v1/blog/categories").await.json();
        assert_eq!(categories.as_array().unwrap().len(), 2);
        let tags: Value = server.get("/api/v1/blog/tags").await.json();
        assert_eq!(tags.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let (server, _) = test_server().await;
        let response = server.get("/api/v1/blog/posts/no-such-post").await;
        response.assert_status_not_found();
        assert_eq!(response.json::<Value>()["error"]["code"], "NOT_FOUND");
    }
}

//! REST client for the admin product list
//!
//! Talks to `/api/v1` with a bearer session token. Every non-2xx answer is
//! turned into [`ClientError::Api`] carrying the server's error message.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::api::auth::{AuthResponse, LoginRequest};
use crate::api::middleware::ApiError;
use crate::api::products::{BulkDeleteRequest, DeleteAllRequest};
use crate::api::responses::{BulkDeleteResult, DataResponse, ProductListResponse};
use crate::models::{DeleteAllOutcome, Product, ProductQuery, User};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error types for API client calls
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// An admin call was made before `login`
    #[error("Not logged in")]
    NotAuthenticated,

    /// Transport or decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Admin API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    /// API root, e.g. `http://localhost:4008/api/v1`
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Reuse a session token from an earlier login
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        Ok(builder.bearer_auth(token))
    }

    /// Log in and keep the session token for later calls
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.client.post(self.url("/auth/login")).json(&body).send().await?;
        let auth: AuthResponse = parse(response).await?;
        self.token = Some(auth.token);
        Ok(auth.user)
    }

    /// One page of products
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductListResponse, ClientError> {
        let response = self.client.get(self.url("/products")).query(query).send().await?;
        parse(response).await
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, ClientError> {
        let path = format!("/products/{}", urlencoding::encode(id));
        let response = self.client.get(self.url(&path)).send().await?;
        parse(response).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), ClientError> {
        let path = format!("/admin/products/{}", urlencoding::encode(id));
        let response = self.authorized(self.client.delete(self.url(&path)))?.send().await?;
        check(response).await.map(|_| ())
    }

    /// Delete several products; returns how many the server removed
    pub async fn delete_products(&self, ids: &[String]) -> Result<u64, ClientError> {
        let body = BulkDeleteRequest { ids: ids.to_vec() };
        let response = self
            .authorized(self.client.post(self.url("/admin/products/bulk-delete")))?
            .json(&body)
            .send()
            .await?;
        let result: DataResponse<BulkDeleteResult> = parse(response).await?;
        Ok(result.data.deleted_count)
    }

    /// Wipe the catalog; `confirm` must be the exact confirmation phrase
    pub async fn delete_all_products(&self, confirm: &str) -> Result<DeleteAllOutcome, ClientError> {
        let body = DeleteAllRequest {
            confirm: confirm.to_string(),
        };
        let response = self
            .authorized(self.client.delete(self.url("/admin/products")))?
            .json(&body)
            .send()
            .await?;
        let result: DataResponse<DeleteAllOutcome> = parse(response).await?;
        Ok(result.data)
    }
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| fallback_message(status, body));
    tracing::warn!(status = status.as_u16(), "API request failed: {}", message);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

fn fallback_message(status: StatusCode, body: String) -> String {
    if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("Request failed").to_string()
    } else {
        body
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(check(response).await?.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_router;
    use crate::api::test_support::{test_state, ADMIN_EMAIL, ADMIN_PASSWORD};
    use crate::api::AppState;
    use crate::models::CreateProductInput;
    use crate::services::DELETE_ALL_CONFIRMATION;

    /// Serve the real router on an ephemeral port
    async fn spawn_server() -> (String, AppState) {
        let state = test_state().await;
        state.user_service.ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/api/v1", addr), state)
    }

    async fn seed(state: &AppState, titles: &[&str]) -> Vec<String> {
        let mut ids = Vec::new();
        for title in titles {
            let product = state
                .product_service
                .create(CreateProductInput {
                    title: title.to_string(),
                    price: 10.0,
                    stock_quantity: 50,
                    ..Default::default()
                })
                .await
                .unwrap();
            ids.push(product.id);
        }
        ids
    }

    #[tokio::test]
    async fn test_admin_calls_require_login() {
        let (base, _) = spawn_server().await;
        let client = ApiClient::new(base).unwrap();
        assert!(matches!(client.delete_product("x").await, Err(ClientError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_list_get_and_delete() {
        let (base, state) = spawn_server().await;
        let ids = seed(&state, &["Clay Mask", "Lip Balm", "Eye Cream"]).await;

        let mut client = ApiClient::new(base).unwrap();
        let user = client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
        assert!(user.is_admin());
        assert!(client.token().is_some());

        let page = client
            .list_products(&ProductQuery { limit: 2, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.total_pages, 2);

        let product = client.get_product(&ids[0]).await.unwrap();
        assert_eq!(product.title, "Clay Mask");

        client.delete_product(&ids[0]).await.unwrap();
        let err = client.get_product(&ids[0]).await.unwrap_err();
        assert_eq!(err.status(), Some(404));

        let page = client.list_products(&ProductQuery::default()).await.unwrap();
        assert!(page.products.iter().all(|p| p.id != ids[0]));

        assert_eq!(client.delete_products(&ids[1..]).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_all_reports_server_message() {
        let (base, state) = spawn_server().await;
        seed(&state, &["Face Oil"]).await;

        let mut client = ApiClient::new(base).unwrap();
        client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

        match client.delete_all_products("delete everything").await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Confirmation phrase does not match");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let outcome = client.delete_all_products(DELETE_ALL_CONFIRMATION).await.unwrap();
        assert_eq!(outcome.deleted_products_count, 1);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let (base, _) = spawn_server().await;
        let mut client = ApiClient::new(base).unwrap();
        let err = client.login(ADMIN_EMAIL, "wrong").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(client.token().is_none());
    }
}

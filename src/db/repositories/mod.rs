//! Database repositories
//!
//! One trait plus an `Sqlx*Repository` per aggregate. Every table uses string
//! (UUID) keys and portable SQL, so each query body is written once and expanded
//! for both backends by [`on_pool!`].

/// Run `$body` against the concrete pool selected by the driver.
///
/// `$conn` is bound to `&SqlitePool` or `&MySqlPool`; the body is compiled once
/// per backend, so row types and binds resolve to the right database.
macro_rules! on_pool {
    ($pool:expr, |$conn:ident| $body:expr) => {
        match $pool.driver() {
            $crate::config::DatabaseDriver::Sqlite => {
                let $conn = anyhow::Context::context($pool.as_sqlite(), "SQLite pool unavailable")?;
                $body
            }
            $crate::config::DatabaseDriver::Mysql => {
                let $conn = anyhow::Context::context($pool.as_mysql(), "MySQL pool unavailable")?;
                $body
            }
        }
    };
}

/// Bind every value in `$binds` onto the query `$query`, in order.
macro_rules! bind_all {
    ($query:expr, $binds:expr) => {{
        let mut query = $query;
        for value in $binds.iter() {
            query = match value {
                $crate::db::repositories::BindValue::Text(s) => query.bind(s.clone()),
                $crate::db::repositories::BindValue::Int(i) => query.bind(*i),
                $crate::db::repositories::BindValue::Bool(b) => query.bind(*b),
            };
        }
        query
    }};
}

pub mod blog;
pub mod product;
pub mod session;
pub mod user;

pub use blog::{BlogRepository, SitemapPost, SqlxBlogRepository};
pub use product::{ProductRepository, SitemapProduct, SqlxProductRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};

/// A value bound into a dynamically assembled statement
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BindValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

/// `?, ?, ?` for an `IN (...)` list of `n` items
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Decode a JSON text column, treating blank text as the type's default
pub(crate) fn decode_json<T: serde::de::DeserializeOwned + Default>(column: &str, raw: Option<String>) -> anyhow::Result<T> {
    match raw {
        Some(text) if !text.trim().is_empty() => serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("Invalid JSON in column {}: {}", column, e)),
        _ => Ok(T::default()),
    }
}

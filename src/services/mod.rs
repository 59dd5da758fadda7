//! Services layer - Business logic
//!
//! Services sit between the API handlers and the repositories. They:
//! - enforce validation and business rules
//! - keep the catalog cache consistent with the database
//! - render derived documents (sitemap, SEO metadata, blog HTML)

pub mod blog;
pub mod blog_seed;
pub mod locale;
pub mod markdown;
pub mod password;
pub mod product;
pub mod seo;
pub mod sitemap;
pub mod slug;
pub mod user;

pub use blog::{BlogService, BlogServiceError, PostDetail, SeedReport};
pub use markdown::MarkdownRenderer;
pub use password::{hash_password, validate_password, verify_password, PasswordError, MIN_PASSWORD_LENGTH};
pub use product::{ProductService, ProductServiceError, DELETE_ALL_CONFIRMATION};
pub use seo::{product_metadata, ProductMetadata};
pub use sitemap::{SitemapEntry, SitemapService};
pub use slug::{product_slug, slugify_ar, slugify_en};
pub use user::{AdminBootstrap, LoginInput, UserService, UserServiceError};

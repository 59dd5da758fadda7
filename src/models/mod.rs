//! Data models
//!
//! Database entities (Product, BlogPost and its taxonomy, User, Session) and the
//! input/query types the services and API exchange.

mod blog;
mod pagination;
mod product;
mod session;
mod user;

pub use blog::{BlogAuthor, BlogCategory, BlogPost, BlogTag, NewBlogAuthor, NewBlogCategory, NewBlogPost, NewBlogTag};
pub use pagination::{ListParams, PagedResult, MAX_PAGE_SIZE};
pub use product::{
    CreateProductInput, DeleteAllOutcome, Product, ProductImage, ProductImageInput, ProductQuery,
    UpdateProductInput, LOW_STOCK_THRESHOLD,
};
#[cfg(test)]
pub(crate) use product::sample_product;
pub use session::Session;
pub use user::{CreateUserInput, User, UserRole};

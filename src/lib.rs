//! Sawavo - Catalog, blog and storefront backend for a skincare shop
//!
//! This library provides the core functionality behind the Sawavo storefront:
//! the product catalog, the bilingual blog, admin authentication, SEO metadata,
//! the sitemap and the admin product-management client.

pub mod admin;
pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

//! Sitemap generation
//!
//! Builds the storefront `sitemap.xml`: static marketing routes, every active
//! product and every published blog post, once per locale, each carrying
//! `hreflang` alternates for all locales. The rendered document is cached until
//! a product mutation clears it or its TTL runs out.

use crate::cache::{keys, CacheLayer, SharedCache};
use crate::config::SiteConfig;
use crate::db::repositories::{BlogRepository, ProductRepository};
use crate::models::MAX_PAGE_SIZE;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tera::{Context as TeraContext, Tera, Value};

const TEMPLATE_NAME: &str = "sitemap.xml";

const SITEMAP_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:xhtml="http://www.w3.org/1999/xhtml">
{%- for entry in entries %}
  <url>
    <loc>{{ entry.loc | xml_escape }}</loc>
    <lastmod>{{ entry.lastmod }}</lastmod>
    <changefreq>{{ entry.changefreq }}</changefreq>
    <priority>{{ entry.priority }}</priority>
    {%- for alt in entry.alternates %}
    <xhtml:link rel="alternate" hreflang="{{ alt.hreflang | xml_escape }}" href="{{ alt.href | xml_escape }}"/>
    {%- endfor %}
  </url>
{%- endfor %}
</urlset>
"#;

/// Storefront pages that exist in every locale
pub const STATIC_ROUTES: [&str; 10] = [
    "",
    "/about",
    "/products",
    "/shop",
    "/blog",
    "/routines",
    "/skin-analysis",
    "/faq",
    "/privacy",
    "/terms",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Daily,
    Weekly,
}

/// A localized page link for `xhtml:link`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternate {
    pub hreflang: String,
    pub href: String,
}

/// One `<url>` element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub loc: String,
    #[serde(serialize_with = "serialize_lastmod")]
    pub lastmod: DateTime<Utc>,
    pub changefreq: ChangeFreq,
    pub priority: f64,
    pub alternates: Vec<Alternate>,
}

fn serialize_lastmod<S: serde::Serializer>(at: &DateTime<Utc>, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Sitemap service
pub struct SitemapService {
    products: Arc<dyn ProductRepository>,
    blog: Arc<dyn BlogRepository>,
    cache: SharedCache,
    site: SiteConfig,
    tera: Tera,
}

impl SitemapService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        blog: Arc<dyn BlogRepository>,
        cache: SharedCache,
        site: SiteConfig,
    ) -> Result<Self> {
        let mut tera = Tera::default();
        // Escaping is explicit through the filter so URLs keep their slashes
        tera.autoescape_on(vec![]);
        tera.register_filter("xml_escape", xml_escape_filter);
        tera.add_raw_template(TEMPLATE_NAME, SITEMAP_TEMPLATE)
            .context("Failed to load sitemap template")?;

        Ok(Self {
            products,
            blog,
            cache,
            site,
            tera,
        })
    }

    /// The sitemap document, from cache when available
    pub async fn xml(&self) -> Result<String> {
        if let Some(xml) = self.cache.get::<String>(keys::SITEMAP_XML).await.ok().flatten() {
            return Ok(xml);
        }

        let entries = self.entries().await;
        let xml = self.render_xml(&entries)?;
        if let Err(e) = self.cache.set_default(keys::SITEMAP_XML, &xml).await {
            tracing::warn!("Failed to cache sitemap: {}", e);
        }
        tracing::debug!(entries = entries.len(), "Sitemap generated");
        Ok(xml)
    }

    /// All sitemap entries. Product and post sections are skipped, with a
    /// warning, when they cannot be loaded.
    pub async fn entries(&self) -> Vec<SitemapEntry> {
        let mut entries = self.static_entries(Utc::now());
        let (products, posts) = futures::join!(
            self.products.list_active_for_sitemap(i64::from(MAX_PAGE_SIZE)),
            self.blog.list_published_for_sitemap(),
        );

        match products {
            Ok(products) => {
                for product in products {
                    let path = format!("/products/{}", urlencoding::encode(&product.slug));
                    for locale in &self.site.locales {
                        entries.push(SitemapEntry {
                            loc: self.url(locale, &path),
                            lastmod: product.updated_at,
                            changefreq: ChangeFreq::Weekly,
                            priority: 0.8,
                            alternates: self.alternates(|_| path.clone()),
                        });
                    }
                }
            }
            Err(e) => tracing::warn!("Error generating product sitemap entries: {:#}", e),
        }

        match posts {
            Ok(posts) => {
                for post in posts {
                    let path_for = |locale: &str| {
                        let slug = if locale.eq_ignore_ascii_case("ar") { &post.slug_ar } else { &post.slug_en };
                        format!("/blog/{}", urlencoding::encode(slug))
                    };
                    for locale in &self.site.locales {
                        entries.push(SitemapEntry {
                            loc: self.url(locale, &path_for(locale.as_str())),
                            lastmod: post.updated_at,
                            changefreq: ChangeFreq::Weekly,
                            priority: 0.7,
                            alternates: self.alternates(&path_for),
                        });
                    }
                }
            }
            Err(e) => tracing::warn!("Error generating blog sitemap entries: {:#}", e),
        }

        entries
    }

    fn static_entries(&self, now: DateTime<Utc>) -> Vec<SitemapEntry> {
        let mut entries = Vec::with_capacity(STATIC_ROUTES.len() * self.site.locales.len());
        for locale in &self.site.locales {
            for route in STATIC_ROUTES {
                let (changefreq, priority) = match route {
                    "" => (ChangeFreq::Daily, 1.0),
                    "/products" | "/blog" => (ChangeFreq::Daily, 0.9),
                    _ => (ChangeFreq::Weekly, 0.7),
                };
                entries.push(SitemapEntry {
                    loc: self.url(locale, route),
                    lastmod: now,
                    changefreq,
                    priority,
                    alternates: self.alternates(|_| route.to_string()),
                });
            }
        }
        entries
    }

    fn url(&self, locale: &str, path: &str) -> String {
        format!("{}/{}{}", self.site.base_url(), locale, path)
    }

    fn alternates(&self, path_for: impl Fn(&str) -> String) -> Vec<Alternate> {
        self.site
            .locales
            .iter()
            .map(|locale| Alternate {
                hreflang: locale.clone(),
                href: self.url(locale, &path_for(locale.as_str())),
            })
            .collect()
    }

    /// Render entries into a `<urlset>` document
    pub fn render_xml(&self, entries: &[SitemapEntry]) -> Result<String> {
        let mut context = TeraContext::new();
        context.insert("entries", entries);
        self.tera
            .render(TEMPLATE_NAME, &context)
            .context("Failed to render sitemap")
    }
}

fn xml_escape_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = tera::try_get_value!("xml_escape", "value", String, value);
    Ok(Value::String(xml_escape(&text)))
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

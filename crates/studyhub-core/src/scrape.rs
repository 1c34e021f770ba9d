//! Web page scraper: turns a URL into clean study material
//!
//! Chrome-masquerading fetch with a 15 second timeout, then selector-based
//! extraction of title, visible text, links, and images. Script, style, and
//! chrome elements (nav, footer, header) are excluded from the text.

use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::{Html, Node, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::Result;
use crate::format::clean_text;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const FETCH_TIMEOUT_SECS: u64 = 15;
const MAX_LINKS: usize = 20;
const MAX_IMAGES: usize = 10;

/// Elements whose text never belongs in study material.
const EXCLUDED_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "header"];

/// A link found on the scraped page, absolutized against the page URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLink {
    pub url: String,
    pub text: String,
}

/// An image found on the scraped page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageImage {
    pub url: String,
    pub alt: String,
}

/// Everything extracted from one page. Failures are represented in-band
/// (`scraping_successful: false` plus `error`) so callers can always render
/// a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub url: String,
    pub title: String,
    pub text: String,
    pub links: Vec<PageLink>,
    pub images: Vec<PageImage>,
    pub word_count: usize,
    pub scraping_successful: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ScrapeResult {
    fn failed(url: &str, error: String) -> Self {
        Self {
            url: url.to_string(),
            title: String::new(),
            text: String::new(),
            links: Vec::new(),
            images: Vec::new(),
            word_count: 0,
            scraping_successful: false,
            error: Some(error),
            timestamp: Utc::now(),
        }
    }
}

/// Fetches and extracts pages.
pub struct Scraper {
    client: Client,
}

impl Scraper {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    /// Scrape `url`. Never fails: fetch and parse errors come back as a
    /// result with `scraping_successful: false`.
    pub async fn scrape(&self, url: &str) -> ScrapeResult {
        match self.fetch(url).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Scraping {} failed: {}", url, e);
                ScrapeResult::failed(url, e.to_string())
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<ScrapeResult> {
        let parsed: Url = url
            .parse()
            .map_err(|e| crate::error::Error::InvalidInput(format!("invalid url '{}': {}", url, e)))?;

        debug!("Fetching {}", url);
        let response = self.client.get(parsed.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(crate::error::Error::Provider {
                status: status.as_u16(),
                message: format!("page fetch failed for {}", url),
            });
        }
        let html = response.text().await?;

        // Parsing happens after the last await: scraper's DOM is not Send.
        Ok(extract(&parsed, &html))
    }
}

impl Default for Scraper {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure extraction over fetched HTML.
fn extract(url: &Url, html: &str) -> ScrapeResult {
    let doc = Html::parse_document(html);

    let title_selector = Selector::parse("title").expect("valid selector");
    let title = doc
        .select(&title_selector)
        .next()
        .map(|t| clean_text(&t.text().collect::<String>()))
        .unwrap_or_else(|| "No Title".to_string());

    let text = clean_text(&visible_text(&doc));

    let link_selector = Selector::parse("a[href]").expect("valid selector");
    let links: Vec<PageLink> = doc
        .select(&link_selector)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let label = clean_text(&a.text().collect::<String>());
            if label.len() <= 3 {
                return None;
            }
            let absolute = url.join(href).ok()?;
            Some(PageLink {
                url: absolute.to_string(),
                text: label,
            })
        })
        .take(MAX_LINKS)
        .collect();

    let image_selector = Selector::parse("img[src]").expect("valid selector");
    let images: Vec<PageImage> = doc
        .select(&image_selector)
        .filter_map(|img| {
            let src = img.value().attr("src")?;
            let absolute = url.join(src).ok()?;
            Some(PageImage {
                url: absolute.to_string(),
                alt: clean_text(img.value().attr("alt").unwrap_or("")),
            })
        })
        .take(MAX_IMAGES)
        .collect();

    ScrapeResult {
        url: url.to_string(),
        word_count: text.split_whitespace().count(),
        title,
        text,
        links,
        images,
        scraping_successful: true,
        error: None,
        timestamp: Utc::now(),
    }
}

/// Collect text nodes, skipping excluded elements and their subtrees.
fn visible_text(doc: &Html) -> String {
    let mut out = String::new();
    let mut stack = vec![doc.tree.root()];

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Element(el) if EXCLUDED_ELEMENTS.contains(&el.name()) => continue,
            Node::Text(t) => {
                out.push_str(t);
                out.push(' ');
            }
            _ => {}
        }
        let children: Vec<_> = node.children().collect();
        for child in children.into_iter().rev() {
            stack.push(child);
        }
    }

    out
}

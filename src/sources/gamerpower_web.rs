//! GamerPower "free games" listing pages.
//!
//! The listing links to GamerPower detail pages; the store link comes from
//! resolving the matching `/open/<slug>` tracking URL on the same host.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use super::{element_text, redirect, Source};
use crate::config::SourcesConfig;
use crate::error::Result;
use crate::global::Global;
use crate::types::game::TITLE_MARKERS;
use crate::types::{GameRecord, Platform};

static TITLE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".card-title").expect("invalid card title selector"));
static PRICE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$[\d.]+").expect("invalid price regex"));

pub struct GamerPowerWeb;

/// A listing card before its tracking link has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub name: String,
    pub platform: Platform,
    pub price: String,
    pub open_url: String,
}

impl Listing {
    fn into_record(self, link: String) -> GameRecord {
        GameRecord {
            name: self.name,
            description: None,
            price: Some(self.price),
            post_date: None,
            link: Some(link),
            platform: Some(self.platform),
        }
    }
}

/// Cards on one listing page. Relative links resolve against `page_url`.
pub fn parse_listing_page(html: &str, page_url: &Url) -> Vec<Listing> {
    let document = Html::parse_document(html);
    let mut seen_links = HashSet::new();
    let mut listings = Vec::new();

    for title in document.select(&TITLE_SEL) {
        let marker = title
            .children()
            .filter_map(|node| node.value().as_text())
            .find_map(|text| TITLE_MARKERS.iter().find(|(marker, _)| text.contains(marker)));

        let Some((marker, platform)) = marker else {
            continue;
        };

        let Some(href) = enclosing_anchor(&title).and_then(|a| a.value().attr("href")) else {
            continue;
        };

        let Ok(link) = page_url.join(href).map(String::from) else {
            continue;
        };

        if !seen_links.insert(link.clone()) {
            continue;
        }

        let Some(slug) = slug_of(&link) else {
            continue;
        };

        let Ok(open_url) = page_url.join(&format!("/open/{slug}")) else {
            continue;
        };

        let name = element_text(&title, "").replace(marker, "").trim().to_string();

        let price = enclosing_card(&title)
            .and_then(|card| card.text().find_map(|t| PRICE_RE.find(t)).map(|m| format!("{} → Free", m.as_str())))
            .unwrap_or_else(|| "Free".to_string());

        tracing::debug!(%name, %platform, %link, "found listing");

        listings.push(Listing {
            name,
            platform: *platform,
            price,
            open_url: open_url.into(),
        });
    }

    listings
}

fn enclosing_anchor<'a>(title: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    if title.value().name() == "a" {
        return Some(*title);
    }

    title
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "a")
}

fn enclosing_card<'a>(title: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    title
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "div" && e.value().classes().any(|c| c.contains("card")))
}

/// Last non-empty path segment of a listing link.
fn slug_of(link: &str) -> Option<&str> {
    let parts: Vec<&str> = link.split('/').collect();
    if parts.len() < 4 {
        return None;
    }

    let last = parts[parts.len() - 1];
    let slug = if last.is_empty() { parts[parts.len() - 2] } else { last };

    (!slug.is_empty()).then_some(slug)
}

#[tracing::instrument(skip(global))]
async fn fetch_page(global: &Global, page: usize) -> Vec<Listing> {
    let config = &global.config.sources.gamerpower_web;
    let page_param = page.to_string();

    let fetched = async {
        let resp = global
            .http_client
            .get(&config.base_url)
            .query(&[("sort_by", "date"), ("page", page_param.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let url = resp.url().clone();
        resp.text().await.map(|html| (html, url))
    }
    .await;

    match fetched {
        Ok((html, url)) => {
            let listings = parse_listing_page(&html, &url);
            tracing::info!(count = listings.len(), "parsed listing page");
            listings
        }
        Err(e) => {
            tracing::error!(error = %e, "listing page failed");
            Vec::new()
        }
    }
}

#[async_trait]
impl Source for GamerPowerWeb {
    fn name(&self) -> &'static str {
        "gamerpower-web"
    }

    fn snapshot_file(&self) -> &'static str {
        "games.gpWEB.json"
    }

    fn enabled(&self, config: &SourcesConfig) -> bool {
        config.gamerpower_web.enabled
    }

    #[tracing::instrument(name = "gamerpower-web", skip_all)]
    async fn fetch(&self, global: &Arc<Global>) -> Result<Vec<GameRecord>> {
        let config = &global.config.sources.gamerpower_web;
        let workers = config.workers.max(1);

        let listings: Vec<Listing> = stream::iter(1..=config.pages)
            .map(|page| fetch_page(global, page))
            .buffered(workers)
            .flat_map(stream::iter)
            .collect()
            .await;

        let records = stream::iter(listings)
            .map(|listing| async move {
                let link = redirect::resolve_open_url(global, &listing.open_url).await;
                listing.into_record(link)
            })
            .buffered(workers)
            .collect()
            .await;

        Ok(records)
    }
}

//! Public preview of a Telegram channel (`t.me/s/<channel>`).
//!
//! Posts look like `[Windows] [Game Name] [$19.99 → Free] [Long blurb...]`
//! followed by a store link. Only Windows posts with a recognised store link
//! are kept.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::{element_text, Source};
use crate::config::SourcesConfig;
use crate::error::Result;
use crate::global::Global;
use crate::types::{GameRecord, Platform};

static WINDOWS_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[(?:Windows|Win)\]").expect("invalid windows tag regex"));
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[(?:Windows|Win)\]\s*\[(.*?)\]").expect("invalid name regex"));
static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([^\]]*?(?:\$|€|£|₹)[^\]]*?(?:→|->)[^\]]*?)\]").expect("invalid price regex")
});
static PRICE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\$|€|£|₹)[^\]]*?(?:→|->)").expect("invalid price shape regex"));
static PLATFORM_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:Windows|Win)").expect("invalid platform word regex"));
static BRACKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.*?)\]").expect("invalid bracket regex"));

static MESSAGE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.tgme_widget_message").expect("invalid message selector"));
static PAGINATED_MESSAGE_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.tgme_widget_message[data-post]").expect("invalid data-post selector")
});
static TEXT_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.tgme_widget_message_text").expect("invalid text selector"));
static TIME_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time[datetime]").expect("invalid time selector"));
static LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("invalid link selector"));

/// Descriptions shorter than this are tags or prices, not blurbs.
const MIN_DESCRIPTION_CHARS: usize = 20;

pub struct Telegram;

#[derive(Debug, PartialEq, Eq)]
pub struct MessageInfo {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<String>,
}

#[derive(Debug, Default)]
pub struct ChannelPage {
    pub records: Vec<GameRecord>,
    /// Id of the first (oldest) post on the page, used to request older posts.
    pub oldest_post_id: Option<String>,
}

/// Pull name, price and description out of a post's flattened text.
pub fn parse_message_text(text: &str) -> Option<MessageInfo> {
    if !WINDOWS_TAG_RE.is_match(text) {
        return None;
    }

    let name = NAME_RE.captures(text)?[1].trim().to_string();

    let price = PRICE_RE.captures(text).map(|c| c[1].trim().to_string());

    // Last qualifying bracket wins.
    let description = BRACKET_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .filter(|bracket| {
            bracket.chars().count() > MIN_DESCRIPTION_CHARS
                && !PLATFORM_WORD_RE.is_match(bracket)
                && bracket.trim() != name
                && !PRICE_SHAPE_RE.is_match(bracket)
        })
        .last()
        .map(|bracket| bracket.trim().to_string());

    Some(MessageInfo {
        name,
        description,
        price,
    })
}

pub fn parse_page(html: &str) -> ChannelPage {
    let document = Html::parse_document(html);
    let mut records = Vec::new();

    for container in document.select(&MESSAGE_SEL) {
        let Some(message) = container.select(&TEXT_SEL).next() else {
            continue;
        };

        let Some(info) = parse_message_text(&element_text(&message, " ")) else {
            continue;
        };

        let post_date = container
            .select(&TIME_SEL)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .map(str::to_string);

        let link = container
            .select(&LINK_SEL)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| !href.contains("t.me") && href.starts_with("http"))
            .map(str::to_string);

        let Some(platform) = link.as_deref().and_then(Platform::from_link) else {
            tracing::debug!(name = %info.name, "skipped, no recognised store link");
            continue;
        };

        tracing::debug!(name = %info.name, %platform, "found");

        records.push(GameRecord {
            name: info.name,
            description: info.description,
            price: info.price,
            post_date,
            link,
            platform: Some(platform),
        });
    }

    let oldest_post_id = document
        .select(&PAGINATED_MESSAGE_SEL)
        .next()
        .and_then(|m| m.value().attr("data-post"))
        .and_then(|post| post.rsplit('/').next())
        .map(str::to_string);

    ChannelPage {
        records,
        oldest_post_id,
    }
}

async fn fetch_page(global: &Global, url: &str) -> Result<String> {
    Ok(global
        .http_client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?)
}

#[async_trait]
impl Source for Telegram {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn snapshot_file(&self) -> &'static str {
        "games.tg.json"
    }

    fn enabled(&self, config: &SourcesConfig) -> bool {
        config.telegram.enabled
    }

    #[tracing::instrument(name = "telegram", skip_all)]
    async fn fetch(&self, global: &Arc<Global>) -> Result<Vec<GameRecord>> {
        let config = &global.config.sources.telegram;
        let mut records = Vec::new();
        let mut url = config.channel_url.clone();

        for page in 1..=config.pages {
            tracing::info!(page, pages = config.pages, %url, "fetching channel page");

            let html = match fetch_page(global, &url).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!(error = %e, "channel page failed, stopping pagination");
                    break;
                }
            };

            let parsed = parse_page(&html);
            tracing::info!(count = parsed.records.len(), "parsed channel page");
            records.extend(parsed.records);

            let Some(before) = parsed.oldest_post_id else {
                tracing::info!("no more messages");
                break;
            };

            url = format!("{}?before={}", config.channel_url, before);

            if page < config.pages {
                tokio::time::sleep(Duration::from_millis(config.page_delay_ms)).await;
            }
        }

        Ok(records)
    }

    /// Newest post first; undated posts sink to the bottom.
    fn prepare_snapshot(&self, records: &mut [GameRecord]) {
        records.sort_by(|a, b| {
            b.post_date
                .as_deref()
                .unwrap_or("")
                .cmp(a.post_date.as_deref().unwrap_or(""))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sources::stub_server::{global_with, Reply, StubServer};

    const PAGE: &str = r#"
<html><body>
<div class="tgme_widget_message_wrap">
  <div class="tgme_widget_message" data-post="freegames/4101">
    <div class="tgme_widget_message_text">[Windows] [Hades] [$24.99 → Free] [Defy the god of the dead in this rogue-like dungeon crawler.]</div>
    <a href="https://t.me/freegames/4101">share</a>
    <a href="https://store.steampowered.com/app/1145360/Hades/">Get it</a>
    <time datetime="2025-03-01T10:00:00+00:00">Mar 1</time>
  </div>
</div>
<div class="tgme_widget_message_wrap">
  <div class="tgme_widget_message" data-post="freegames/4102">
    <div class="tgme_widget_message_text">[Android] [Some Mobile Game] [$0.99 → Free]</div>
    <a href="https://play.google.com/store/apps/details?id=x">Get it</a>
  </div>
</div>
<div class="tgme_widget_message_wrap">
  <div class="tgme_widget_message" data-post="freegames/4103">
    <div class="tgme_widget_message_text">[Win] [Indie Thing] [Free]</div>
    <a href="https://indie.itch.io/thing">Get it</a>
  </div>
</div>
<div class="tgme_widget_message_wrap">
  <div class="tgme_widget_message" data-post="freegames/4104">
    <div class="tgme_widget_message_text">[WINDOWS] <b>[Control]</b> [€29,99 -&gt; Free]</div>
    <a href="https://store.epicgames.com/p/control">Get it</a>
  </div>
</div>
</body></html>
"#;

    #[test]
    fn parses_full_message() {
        let info = parse_message_text(
            "[Windows] [Hades] [$24.99 → Free] [Defy the god of the dead in this rogue-like dungeon crawler.]",
        )
        .unwrap();

        assert_eq!(info.name, "Hades");
        assert_eq!(info.price.as_deref(), Some("$24.99 → Free"));
        assert_eq!(
            info.description.as_deref(),
            Some("Defy the god of the dead in this rogue-like dungeon crawler.")
        );
    }

    #[test]
    fn description_skips_short_and_tagged_brackets() {
        let info = parse_message_text(
            "[Win] [A Very Long Game Name For Testing] [£5 -> Free] [Short blurb] [Runs great on Windows 11 machines]",
        )
        .unwrap();

        assert_eq!(info.name, "A Very Long Game Name For Testing");
        assert_eq!(info.price.as_deref(), Some("£5 -> Free"));
        assert_eq!(info.description, None);
    }

    #[test]
    fn description_is_the_last_long_bracket() {
        let info = parse_message_text(
            "[Windows] [Inside] [$19.99 → Free] [A boy alone in a dark and hostile world.] [Claim before the weekend is over]",
        )
        .unwrap();

        assert_eq!(info.description.as_deref(), Some("Claim before the weekend is over"));
    }

    #[test]
    fn ignores_non_windows_posts() {
        assert_eq!(parse_message_text("[Android] [Some Mobile Game] [$0.99 → Free]"), None);
        assert_eq!(parse_message_text("[Windows] no name bracket"), None);
    }

    #[test]
    fn parses_channel_page() {
        let page = parse_page(PAGE);

        assert_eq!(page.records.len(), 2);

        let hades = &page.records[0];
        assert_eq!(hades.name, "Hades");
        assert_eq!(hades.platform, Some(Platform::Steam));
        assert_eq!(hades.link.as_deref(), Some("https://store.steampowered.com/app/1145360/Hades/"));
        assert_eq!(hades.post_date.as_deref(), Some("2025-03-01T10:00:00+00:00"));
        assert_eq!(hades.price.as_deref(), Some("$24.99 → Free"));

        let control = &page.records[1];
        assert_eq!(control.name, "Control");
        assert_eq!(control.platform, Some(Platform::EpicGamesStore));
        assert_eq!(control.price.as_deref(), Some("€29,99 -> Free"));
        assert_eq!(control.post_date, None);

        assert_eq!(page.oldest_post_id.as_deref(), Some("4101"));
    }

    #[test]
    fn empty_page_has_no_pagination_cursor() {
        let page = parse_page("<html><body><p>nothing here</p></body></html>");

        assert!(page.records.is_empty());
        assert_eq!(page.oldest_post_id, None);
    }

    #[test]
    fn snapshot_sorts_newest_first() {
        let mut records = vec![
            GameRecord {
                post_date: Some("2025-01-01T00:00:00+00:00".into()),
                ..GameRecord::named("Old")
            },
            GameRecord::named("Undated"),
            GameRecord {
                post_date: Some("2025-03-01T00:00:00+00:00".into()),
                ..GameRecord::named("New")
            },
        ];

        Telegram.prepare_snapshot(&mut records);

        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["New", "Old", "Undated"]);
    }

    const NEWEST_PAGE: &str = r#"
<div class="tgme_widget_message" data-post="freegames/4101">
  <div class="tgme_widget_message_text">[Windows] [Hades] [$24.99 → Free]</div>
  <a href="https://store.steampowered.com/app/1145360/Hades/">Get it</a>
</div>
<div class="tgme_widget_message" data-post="freegames/4102">
  <div class="tgme_widget_message_text">[Windows] [Control] [$29.99 → Free]</div>
  <a href="https://store.epicgames.com/p/control">Get it</a>
</div>
"#;

    const OLDER_PAGE: &str = r#"
<div class="tgme_widget_message" data-post="freegames/4050">
  <div class="tgme_widget_message_text">[Windows] [Inside] [$19.99 → Free]</div>
  <a href="https://www.gog.com/game/inside">Get it</a>
</div>
"#;

    fn channel_config(server: &StubServer, pages: usize, page_delay_ms: u64) -> Config {
        let mut config = Config::default();
        config.sources.telegram.channel_url = server.url("/s/freegames");
        config.sources.telegram.pages = pages;
        config.sources.telegram.page_delay_ms = page_delay_ms;
        config
    }

    #[tokio::test]
    async fn fetch_pages_back_until_a_page_fails() {
        let server = StubServer::start(|target, _| match target {
            "/s/freegames" => Reply::ok(NEWEST_PAGE),
            "/s/freegames?before=4101" => Reply::ok(OLDER_PAGE),
            _ => Reply::status(500),
        })
        .await;
        let global = global_with(channel_config(&server, 5, 0));

        let records = Telegram.fetch(&global).await.unwrap();

        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Hades", "Control", "Inside"]);
        assert_eq!(records[2].platform, Some(Platform::Gog));
        assert_eq!(
            server.requests(),
            ["/s/freegames", "/s/freegames?before=4101", "/s/freegames?before=4050"]
        );
    }

    #[tokio::test]
    async fn fetch_stops_on_page_without_messages() {
        let server = StubServer::start(|target, _| match target {
            "/s/freegames" => Reply::ok(NEWEST_PAGE),
            _ => Reply::ok("<html><body></body></html>"),
        })
        .await;
        let global = global_with(channel_config(&server, 5, 0));

        let records = Telegram.fetch(&global).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(server.requests(), ["/s/freegames", "/s/freegames?before=4101"]);
    }

    #[tokio::test]
    async fn fetch_does_not_wait_after_last_page() {
        let server = StubServer::start(|_, _| Reply::ok(NEWEST_PAGE)).await;
        let global = global_with(channel_config(&server, 1, 600_000));

        let records = tokio::time::timeout(Duration::from_secs(10), Telegram.fetch(&global))
            .await
            .expect("fetch slept after the last page")
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(server.requests(), ["/s/freegames"]);
    }
}

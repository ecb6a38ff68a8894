//! GamerPower JSON API (`/api/filter`).

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;

use super::filter::{clean_game_name, is_valid_giveaway};
use super::{redirect, Source};
use crate::config::SourcesConfig;
use crate::error::{Error, Result};
use crate::global::Global;
use crate::types::{GameRecord, Platform};

/// Status code the API puts in its body when nothing is on offer.
const NO_GIVEAWAYS_STATUS: u64 = 201;

pub struct GamerPowerApi;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Giveaway {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub worth: Option<String>,
    pub published_date: Option<String>,
    pub open_giveaway_url: Option<String>,
    pub giveaway_url: Option<String>,
}

/// Decode the API body, which is a list, a single giveaway, or a
/// "no giveaways" status object.
pub fn parse_response(body: Value) -> Result<Vec<Giveaway>> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => Ok(serde_json::from_value(body)?),
        Value::Object(ref object) if object.is_empty() => Ok(Vec::new()),
        Value::Object(ref object)
            if object.get("status_code").and_then(Value::as_u64) == Some(NO_GIVEAWAYS_STATUS) =>
        {
            Ok(Vec::new())
        }
        Value::Object(_) => Ok(vec![serde_json::from_value(body)?]),
        other => Err(Error::unexpected(
            "gamerpower-api",
            format!("expected a list of giveaways, got {other}"),
        )),
    }
}

/// `"Free"` for worthless or unknown worth, otherwise `"$N → Free"`.
pub fn format_worth(worth: Option<&str>) -> String {
    match worth.map(str::trim) {
        None => "Free".to_string(),
        Some(w) if w == "N/A" || w.eq_ignore_ascii_case("free") => "Free".to_string(),
        Some(w) => format!("${} → Free", w.replace('$', "").trim()),
    }
}

/// Record for a giveaway, minus its resolved link, plus the link to resolve.
/// `None` when the giveaway is DLC, a pack, or on an untracked store.
pub fn to_record(giveaway: &Giveaway) -> Option<(GameRecord, Option<String>)> {
    if !is_valid_giveaway(&giveaway.title, giveaway.description.as_deref()) {
        tracing::debug!(title = %giveaway.title, "skipped, not a full game giveaway");
        return None;
    }

    let record = GameRecord {
        name: clean_game_name(&giveaway.title),
        description: giveaway.description.clone(),
        price: Some(format_worth(giveaway.worth.as_deref())),
        post_date: giveaway.published_date.clone(),
        link: None,
        platform: Platform::from_title(&giveaway.title),
    };

    let url = giveaway
        .open_giveaway_url
        .clone()
        .or_else(|| giveaway.giveaway_url.clone());

    Some((record, url))
}

#[async_trait]
impl Source for GamerPowerApi {
    fn name(&self) -> &'static str {
        "gamerpower-api"
    }

    fn snapshot_file(&self) -> &'static str {
        "games.gpAPI.json"
    }

    fn enabled(&self, config: &SourcesConfig) -> bool {
        config.gamerpower_api.enabled
    }

    #[tracing::instrument(name = "gamerpower-api", skip_all)]
    async fn fetch(&self, global: &Arc<Global>) -> Result<Vec<GameRecord>> {
        let config = &global.config.sources.gamerpower_api;
        let platforms = Platform::TRACKED
            .iter()
            .map(Platform::slug)
            .collect::<Vec<_>>()
            .join(".");

        let body = global
            .http_client
            .get(&config.url)
            .query(&[
                ("platform", platforms.as_str()),
                ("type", "game.loot"),
                ("sort-by", "date"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let giveaways = parse_response(body)?;
        tracing::info!(count = giveaways.len(), "fetched giveaways");

        let candidates: Vec<_> = giveaways.iter().filter_map(to_record).collect();

        let records = stream::iter(candidates)
            .map(|(mut record, url)| async move {
                if let Some(url) = url {
                    record.link = Some(redirect::follow(global, &url).await);
                }
                record
            })
            .buffered(config.workers.max(1))
            .collect()
            .await;

        Ok(records)
    }
}

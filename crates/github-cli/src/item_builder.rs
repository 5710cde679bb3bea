use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use docweave_core::Item;

use crate::config::ServiceConfig;
use crate::normalize::normalize_content;
use crate::service::RequestOptions;

/// Option names consumed by the connector itself. They steer a request and
/// must never leak into an item as extra fields. `type` and `layout` need
/// no entry here: they are required item keys and already excluded by the
/// collision check.
pub const RESERVED_OPTION_KEYS: [&'static str; 4] =
    ["query", "max_amount", "max_content_lines", "id_prefix"];

/// One search hit as the provider returns it. Typed deserialization is the
/// single boundary where missing provider fields turn into mapping errors.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: String,
    pub labels: Vec<RawLabel>,
    pub user: RawAuthor,
    pub html_url: String,
    pub created_at: String,
    pub updated_at: String,
    pub closed_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAuthor {
    pub login: String,
    pub avatar_url: String,
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("search hit is missing expected provider fields")]
    Malformed(#[source] serde_json::Error),
}

/// Projects one raw search hit into an item.
///
/// `id_prefix` and `max_content_lines` take the per-request override when
/// present, the configured default otherwise, and shape the derived fields
/// (`id`, `content`). `type` and `layout` resolve the same way but land as
/// plain field values. Everything else is a direct projection.
pub fn map_record(
    config: &ServiceConfig,
    options: &RequestOptions,
    raw: &Value,
) -> Result<Item, MappingError> {
    let record: RawRecord = serde_json::from_value(raw.clone()).map_err(MappingError::Malformed)?;

    let id_prefix = options.id_prefix().unwrap_or(&config.id_prefix);
    let max_content_lines = options
        .max_content_lines()
        .unwrap_or(config.max_content_lines);

    let tags = record
        .labels
        .iter()
        .map(|label| label.name.as_str())
        .collect::<Vec<_>>()
        .join(",");

    Ok(Item {
        item_type: options.item_type().unwrap_or(&config.item_type).to_string(),
        layout: options.layout().unwrap_or(&config.layout).to_string(),
        id: format!("{id_prefix}{}", record.number),
        title: record.title,
        content: normalize_content(&record.body, max_content_lines),
        status: record.state,
        tags,
        user: record.user.login,
        url: record.html_url,
        avatar: record.user.avatar_url,
        created_at: record.created_at,
        updated_at: record.updated_at,
        closed_at: record.closed_at,
        extra: BTreeMap::new(),
    })
}

/// Merges caller-supplied extra options into a mapped item.
///
/// Set-difference merge: a pair is added only when its key is neither a
/// reserved option name nor already present on the item. Fetched and
/// derived keys stay authoritative; extra keys are additive only.
pub fn merge_extra_options(item: &mut Item, options: &RequestOptions) {
    for (key, value) in options.pairs() {
        if RESERVED_OPTION_KEYS.contains(&key) || item.contains_key(key) {
            continue;
        }

        item.extra.insert(key.to_string(), value.clone());
    }
}

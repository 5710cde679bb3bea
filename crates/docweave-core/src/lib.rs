use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One normalized record as consumed by the docweave rendering pipeline.
///
/// Every connector produces the same flat shape: the fixed keys below plus
/// arbitrary extra keys a caller injected per request. `closed_at` stays
/// nullable because open records have no close timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    #[serde(rename = "type")]
    pub item_type: String,
    pub layout: String,
    pub id: String,
    pub title: String,
    pub content: String,
    pub status: String,
    pub tags: String,
    pub user: String,
    pub url: String,
    pub avatar: String,
    pub created_at: String,
    pub updated_at: String,
    pub closed_at: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Item {
    /// Keys every item carries. Extra caller keys must never collide with
    /// these; `contains_key` is the collision check used by connectors.
    pub const REQUIRED_KEYS: [&'static str; 13] = [
        "type",
        "layout",
        "id",
        "title",
        "content",
        "status",
        "tags",
        "user",
        "url",
        "avatar",
        "created_at",
        "updated_at",
        "closed_at",
    ];

    pub fn contains_key(&self, key: &str) -> bool {
        Self::REQUIRED_KEYS.contains(&key) || self.extra.contains_key(key)
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Static field-placement description for one item layout: which meta
/// fields render where. Declarative only; the rendering pipeline owns the
/// placeholder syntax inside the strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutTemplate {
    pub grid: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub head_left: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub head: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub head_right: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta_left: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta_right: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footer_left: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footer: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footer_right: Vec<String>,
}

/// Name-keyed layout store owned by the hosting application.
///
/// Connectors ship a default template and install it with
/// `install_default`, which never replaces an entry the host already
/// registered. Host-side customization goes through `set`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutRegistry {
    templates: BTreeMap<String, LayoutTemplate>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `template` under `name` only when no template of that name
    /// exists yet. Returns whether the template was installed.
    pub fn install_default(&mut self, name: &str, template: LayoutTemplate) -> bool {
        if self.templates.contains_key(name) {
            return false;
        }

        self.templates.insert(name.to_string(), template);
        true
    }

    /// Registers or replaces a template unconditionally.
    pub fn set(&mut self, name: impl Into<String>, template: LayoutTemplate) {
        self.templates.insert(name.into(), template);
    }

    pub fn get(&self, name: &str) -> Option<&LayoutTemplate> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

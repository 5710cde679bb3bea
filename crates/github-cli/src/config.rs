use std::collections::HashMap;

use thiserror::Error;

const URL_ENV: &str = "GITHUB_CONNECTOR_URL";
pub const KIND_ENV: &str = "GITHUB_CONNECTOR_KIND";
const TYPE_ENV: &str = "GITHUB_CONNECTOR_TYPE";
const MAX_AMOUNT_ENV: &str = "GITHUB_CONNECTOR_MAX_AMOUNT";
const MAX_CONTENT_LINES_ENV: &str = "GITHUB_CONNECTOR_MAX_CONTENT_LINES";
const ID_PREFIX_ENV: &str = "GITHUB_CONNECTOR_ID_PREFIX";
const LAYOUT_ENV: &str = "GITHUB_CONNECTOR_LAYOUT";

pub const DEFAULT_BASE_URL: &str = "https://api.github.com/";
pub const DEFAULT_MAX_AMOUNT: u32 = 5;
pub const DEFAULT_MAX_CONTENT_LINES: i64 = -1;
pub const DEFAULT_ID_PREFIX: &str = "GITHUB_";
pub const DEFAULT_LAYOUT: &str = "github";

const MIN_AMOUNT: i64 = 1;
const MAX_AMOUNT: i64 = 100;

/// Category of searchable object. Determines the search endpoint path and
/// the provider-syntax filter appended to every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Issue,
    PullRequest,
    Commit,
}

impl RecordKind {
    pub const SUPPORTED: [&'static str; 3] = ["issue", "pull-request", "commit"];

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim() {
            "issue" => Ok(Self::Issue),
            "pull-request" => Ok(Self::PullRequest),
            "commit" => Ok(Self::Commit),
            other => Err(ConfigError::UnsupportedKind(other.to_string())),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::PullRequest => "pull-request",
            Self::Commit => "commit",
        }
    }

    /// Provider-search-syntax fragment appended to the caller query.
    /// Commit search has no equivalent qualifier, hence the empty fragment.
    pub fn query_filter(self) -> &'static str {
        match self {
            Self::Issue => "is:issue",
            Self::PullRequest => "is:pr",
            Self::Commit => "",
        }
    }

    /// Path of the search endpoint below the base URL. Issues and pull
    /// requests share one endpoint and are told apart by the query filter.
    pub fn endpoint_path(self) -> &'static str {
        match self {
            Self::Issue | Self::PullRequest => "search/issues",
            Self::Commit => "search/commits",
        }
    }
}

/// Process-wide connector configuration, immutable once the service is
/// constructed. Per-request options may override `item_type`, `layout`,
/// `id_prefix`, `max_amount` and `max_content_lines`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub name: String,
    pub base_url: String,
    pub kind: RecordKind,
    pub item_type: String,
    pub max_amount: u32,
    pub max_content_lines: i64,
    pub id_prefix: String,
    pub layout: String,
}

impl ServiceConfig {
    pub fn new(name: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            name: name.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            kind,
            item_type: kind.label().to_string(),
            max_amount: DEFAULT_MAX_AMOUNT,
            max_content_lines: DEFAULT_MAX_CONTENT_LINES,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            layout: DEFAULT_LAYOUT.to_string(),
        }
    }

    pub fn from_env(name: impl Into<String>) -> Result<Self, ConfigError> {
        Self::from_pairs(name, std::env::vars())
    }

    /// Builds the configuration from `(key, value)` pairs. The record kind
    /// is required; everything else falls back to the connector defaults.
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env_map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        let kind = match non_empty(env_map.get(KIND_ENV)) {
            Some(raw) => RecordKind::parse(raw)?,
            None => return Err(ConfigError::MissingKind),
        };

        let mut config = Self::new(name, kind);

        if let Some(url) = non_empty(env_map.get(URL_ENV)) {
            config.base_url = url.to_string();
        }
        if let Some(item_type) = non_empty(env_map.get(TYPE_ENV)) {
            config.item_type = item_type.to_string();
        }
        if let Some(raw) = non_empty(env_map.get(MAX_AMOUNT_ENV)) {
            config.max_amount = parse_max_amount(raw)?;
        }
        if let Some(raw) = non_empty(env_map.get(MAX_CONTENT_LINES_ENV)) {
            config.max_content_lines = raw
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidMaxContentLines(raw.to_string()))?;
        }
        if let Some(prefix) = non_empty(env_map.get(ID_PREFIX_ENV)) {
            config.id_prefix = prefix.to_string();
        }
        if let Some(layout) = non_empty(env_map.get(LAYOUT_ENV)) {
            config.layout = layout.to_string();
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_item_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = item_type.into();
        self
    }

    pub fn with_max_amount(mut self, max_amount: u32) -> Self {
        self.max_amount = max_amount;
        self
    }

    pub fn with_max_content_lines(mut self, max_content_lines: i64) -> Self {
        self.max_content_lines = max_content_lines;
        self
    }

    pub fn with_id_prefix(mut self, id_prefix: impl Into<String>) -> Self {
        self.id_prefix = id_prefix.into();
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }
}

fn non_empty(raw: Option<&String>) -> Option<&str> {
    raw.map(String::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_max_amount(raw: &str) -> Result<u32, ConfigError> {
    let parsed = raw
        .parse::<i64>()
        .map_err(|_| ConfigError::InvalidMaxAmount(raw.to_string()))?;

    Ok(parsed.clamp(MIN_AMOUNT, MAX_AMOUNT) as u32)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("record kind \"{0}\" not supported (use: issue, pull-request, commit)")]
    UnsupportedKind(String),
    #[error("record kind missing (use: issue, pull-request, commit)")]
    MissingKind,
    #[error("invalid GITHUB_CONNECTOR_MAX_AMOUNT: {0}")]
    InvalidMaxAmount(String),
    #[error("invalid GITHUB_CONNECTOR_MAX_CONTENT_LINES: {0}")]
    InvalidMaxContentLines(String),
}

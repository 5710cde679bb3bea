use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use docweave_core::{Item, LayoutRegistry};

use crate::config::ServiceConfig;
use crate::github_api::{
    GithubApiError, HttpTransport, SearchTransport, compose_query, effective_limit,
};
use crate::item_builder::{map_record, merge_extra_options};
use crate::layout::default_layout;

/// Per-request options: a string-keyed map in which a handful of keys are
/// recognized connector options and every other key passes through into
/// the produced items. `query` is the one mandatory key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    values: BTreeMap<String, Value>,
}

impl RequestOptions {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn query(&self) -> Option<&str> {
        self.string_option("query")
    }

    pub fn max_amount(&self) -> Option<i64> {
        self.integer_option("max_amount")
    }

    pub fn max_content_lines(&self) -> Option<i64> {
        self.integer_option("max_content_lines")
    }

    pub fn id_prefix(&self) -> Option<&str> {
        self.string_option("id_prefix")
    }

    pub fn item_type(&self) -> Option<&str> {
        self.string_option("type")
    }

    pub fn layout(&self) -> Option<&str> {
        self.string_option("layout")
    }

    /// All pairs in key order, recognized options included. The merge step
    /// filters reserved and colliding keys.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    fn string_option(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Integer options accept JSON numbers and numeric strings; the CLI
    /// hands every option over as a string.
    fn integer_option(&self, key: &str) -> Option<i64> {
        let value = self.values.get(key)?;
        value
            .as_i64()
            .or_else(|| value.as_str()?.trim().parse().ok())
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("\"query\" missing as option for github service")]
    MissingQuery,
    #[error(transparent)]
    Api(#[from] GithubApiError),
}

/// Request façade: validates options, composes the provider query, fetches
/// one page of search hits and turns each into an item.
#[derive(Debug)]
pub struct GithubService<T = HttpTransport> {
    config: ServiceConfig,
    transport: T,
}

impl GithubService<HttpTransport> {
    pub fn new(config: ServiceConfig) -> Self {
        let transport = HttpTransport::new(&config);
        Self { config, transport }
    }
}

impl<T: SearchTransport> GithubService<T> {
    pub fn with_transport(config: ServiceConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Installs the connector's default layout under the configured layout
    /// name unless the host already registered one. Returns whether the
    /// default was installed.
    pub fn register_layout(&self, registry: &mut LayoutRegistry) -> bool {
        registry.install_default(&self.config.layout, default_layout())
    }

    /// Runs one request cycle and returns the items in provider response
    /// order. Transport failures abort the call with no partial batch; a
    /// hit that cannot be mapped is skipped with a warning.
    pub fn request(&self, options: &RequestOptions) -> Result<Vec<Item>, RequestError> {
        let Some(query) = options.query() else {
            return Err(RequestError::MissingQuery);
        };
        log::debug!("requesting data for service {}", self.config.name);

        let composed = compose_query(query, self.config.kind);
        let limit = effective_limit(options.max_amount(), self.config.max_amount);
        let hits = self.transport.fetch(&composed, limit)?;

        let mut items = Vec::with_capacity(hits.len());
        for hit in &hits {
            match map_record(&self.config, options, hit) {
                Ok(mut item) => {
                    merge_extra_options(&mut item, options);
                    items.push(item);
                }
                Err(error) => {
                    log::warn!(
                        "service {} skipping search hit that failed to map: {error}",
                        self.config.name
                    );
                }
            }
        }

        Ok(items)
    }
}

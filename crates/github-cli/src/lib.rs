//! GitHub search connector for the docweave pipeline.
//!
//! - `config`: record kind, service defaults, environment parsing.
//! - `github_api`: query composition + blocking search transport.
//! - `normalize`: reflow/truncate free-text bodies into literal blocks.
//! - `item_builder`: raw search hit to item projection and option merge.
//! - `layout`: default item layout + registry installation.
//! - `service`: request façade tying the stages together.

pub mod config;
pub mod github_api;
pub mod item_builder;
pub mod layout;
pub mod normalize;
pub mod service;

pub use config::{ConfigError, RecordKind, ServiceConfig};
pub use github_api::{GithubApiError, HttpTransport, SearchTransport, compose_query};
pub use service::{GithubService, RequestError, RequestOptions};

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::{RecordKind, ServiceConfig};

const USER_AGENT: &str = "docweave-github-connector/0.1.0";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Ceiling of the provider's `per_page` parameter.
pub const MAX_PER_PAGE: u32 = 100;

/// Composes the provider search query: the caller query verbatim, then the
/// kind filter. The caller query is never validated or rewritten.
pub fn compose_query(caller_query: &str, kind: RecordKind) -> String {
    let filter = kind.query_filter();
    if filter.is_empty() {
        caller_query.to_string()
    } else {
        format!("{caller_query} {filter}")
    }
}

pub fn build_endpoint(base_url: &str, kind: RecordKind) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), kind.endpoint_path())
}

pub fn build_query_params(query: &str, limit: u32) -> Vec<(String, String)> {
    vec![
        ("q".to_string(), query.to_string()),
        ("per_page".to_string(), limit.to_string()),
    ]
}

/// Resolves the page-size limit for one request. A missing or non-positive
/// requested amount falls back to the configured default; the result is
/// clamped to the provider range so a bad override can never ask for zero
/// or negative results.
pub fn effective_limit(requested: Option<i64>, default: u32) -> u32 {
    let value = match requested {
        Some(amount) if amount > 0 => amount,
        _ => i64::from(default),
    };

    value.clamp(1, i64::from(MAX_PER_PAGE)) as u32
}

/// Boundary the service façade depends on: given a composed query and a
/// limit, return the raw search hits or fail. Implementations must not
/// retry and must not return partial data on failure.
pub trait SearchTransport {
    fn fetch(&self, query: &str, limit: u32) -> Result<Vec<Value>, GithubApiError>;
}

/// Blocking HTTP transport against the provider's search endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    service_name: String,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            service_name: config.name.clone(),
            endpoint: build_endpoint(&config.base_url, config.kind),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SearchTransport for HttpTransport {
    fn fetch(&self, query: &str, limit: u32) -> Result<Vec<Value>, GithubApiError> {
        log::info!(
            "service {} requesting data for query: {query}",
            self.service_name
        );

        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|source| GithubApiError::Transport { source })?;

        let response = client
            .get(&self.endpoint)
            .query(&build_query_params(query, limit))
            .send()
            .map_err(|source| GithubApiError::Transport { source })?;

        let status_code = response.status().as_u16();
        let body = response
            .text()
            .map_err(|source| GithubApiError::Transport { source })?;

        parse_search_response(status_code, &body)
    }
}

/// Parses one search response body into its raw hits. Non-2xx responses
/// surface the provider's own error message when the body carries one.
pub fn parse_search_response(status_code: u16, body: &str) -> Result<Vec<Value>, GithubApiError> {
    if !(200..=299).contains(&status_code) {
        let message = extract_error_message(body).unwrap_or_else(|| format!("HTTP {status_code}"));
        return Err(GithubApiError::Http {
            status: status_code,
            message,
        });
    }

    let payload: SearchResponse =
        serde_json::from_str(body).map_err(GithubApiError::InvalidResponse)?;

    Ok(payload.items)
}

fn extract_error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;

    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(ToOwned::to_owned)
}

#[derive(Debug, Error)]
pub enum GithubApiError {
    #[error("github search request failed")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    #[error("github search error ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("invalid github search response")]
    InvalidResponse(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_composition_starts_with_caller_query_verbatim() {
        let composed = compose_query("bug in:title  label:critical", RecordKind::Issue);

        assert!(composed.starts_with("bug in:title  label:critical"));
        assert!(composed.ends_with(" is:issue"));
    }

    #[test]
    fn query_filter_depends_only_on_record_kind() {
        assert_eq!(compose_query("x", RecordKind::Issue), "x is:issue");
        assert_eq!(compose_query("x", RecordKind::PullRequest), "x is:pr");
        assert_eq!(
            compose_query("y", RecordKind::PullRequest),
            "y is:pr",
            "caller input must not change the filter"
        );
    }

    #[test]
    fn query_commit_kind_appends_no_filter() {
        assert_eq!(compose_query("fix typo", RecordKind::Commit), "fix typo");
    }

    #[test]
    fn endpoint_joins_base_url_and_kind_path_without_double_slash() {
        assert_eq!(
            build_endpoint("https://api.github.com/", RecordKind::Issue),
            "https://api.github.com/search/issues"
        );
        assert_eq!(
            build_endpoint("https://github.example/api", RecordKind::Commit),
            "https://github.example/api/search/commits"
        );
    }

    #[test]
    fn query_params_follow_provider_contract() {
        let params = build_query_params("bug is:issue", 30);

        assert_eq!(
            params,
            vec![
                ("q".to_string(), "bug is:issue".to_string()),
                ("per_page".to_string(), "30".to_string()),
            ]
        );
    }

    #[test]
    fn effective_limit_falls_back_to_default_for_missing_or_non_positive() {
        assert_eq!(effective_limit(None, 5), 5);
        assert_eq!(effective_limit(Some(0), 5), 5);
        assert_eq!(effective_limit(Some(-7), 5), 5);
        assert_eq!(effective_limit(Some(12), 5), 12);
    }

    #[test]
    fn effective_limit_clamps_to_provider_page_ceiling() {
        assert_eq!(effective_limit(Some(5000), 5), MAX_PER_PAGE);
    }

    #[test]
    fn parse_search_response_returns_hits_in_response_order() {
        let body = r#"{"total_count": 2, "items": [{"number": 2}, {"number": 1}]}"#;

        let hits = parse_search_response(200, body).expect("response should parse");

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].get("number").and_then(Value::as_u64), Some(2));
        assert_eq!(hits[1].get("number").and_then(Value::as_u64), Some(1));
    }

    #[test]
    fn parse_search_response_surfaces_provider_error_message() {
        let body = r#"{"message": "Validation Failed", "errors": []}"#;

        let err = parse_search_response(422, body).expect_err("non-2xx should fail");

        match err {
            GithubApiError::Http { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Validation Failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_search_response_falls_back_to_status_code_message() {
        let err = parse_search_response(502, "bad gateway").expect_err("non-2xx should fail");

        match err {
            GithubApiError::Http { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "HTTP 502");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_search_response_rejects_bodies_without_items_list() {
        let err = parse_search_response(200, r#"{"total_count": 0}"#)
            .expect_err("missing items should fail");

        assert!(matches!(err, GithubApiError::InvalidResponse(_)));
    }

    #[test]
    fn parse_search_response_rejects_invalid_success_json() {
        let err = parse_search_response(200, "not-json").expect_err("invalid JSON should fail");

        assert!(matches!(err, GithubApiError::InvalidResponse(_)));
    }

    #[test]
    fn http_transport_builds_endpoint_from_config() {
        let config = ServiceConfig::new("github", RecordKind::PullRequest);
        let transport = HttpTransport::new(&config);

        assert_eq!(transport.endpoint(), "https://api.github.com/search/issues");
    }
}

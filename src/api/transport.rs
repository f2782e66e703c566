//! Remote transport: the `GraphQl` seam and its HTTP implementation.
//!
//! The core only ever sees [`GraphQl`]: named operations with a variables
//! object in, a `data` object out. Tests substitute a closure-backed mock;
//! production uses [`GitHubTransport`], a blocking HTTP client posting to
//! the GitHub GraphQL endpoint. One call is outstanding at a time and the
//! per-request timeout applies per individual call.

use crate::api::errors;
use crate::error::{PmuError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::Duration;

/// Feature preview flags sent with every request; sub-issue fields are
/// still gated behind these on the remote side.
const FEATURE_PREVIEWS: &str = "sub_issues,issue_types";

const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Opaque remote transport: named queries and mutations over variables.
pub trait GraphQl {
    /// Execute a read operation, returning the response `data` object.
    ///
    /// # Errors
    ///
    /// Returns a classified transport error on any remote failure.
    fn query(&self, name: &str, document: &str, variables: Value) -> Result<Value>;

    /// Execute a write operation, returning the response `data` object.
    ///
    /// # Errors
    ///
    /// Returns a classified transport error on any remote failure.
    fn mutate(&self, name: &str, document: &str, variables: Value) -> Result<Value>;
}

/// Request envelope for the GraphQL endpoint.
#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

/// Response envelope from the GraphQL endpoint.
#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

/// One entry of the response `errors` array.
#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
}

impl GraphQlError {
    /// Join the structured code (when present) with the prose message so
    /// classification sees both forms.
    fn render(&self) -> String {
        self.error_type.as_ref().map_or_else(
            || self.message.clone(),
            |code| format!("{code}: {}", self.message),
        )
    }
}

/// Blocking HTTP transport against the GitHub GraphQL API.
pub struct GitHubTransport {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl GitHubTransport {
    /// Build a transport from the environment.
    ///
    /// The token comes from `GITHUB_TOKEN` (or `GH_TOKEN`); the endpoint
    /// can be overridden with `PMU_GRAPHQL_URL` for GitHub Enterprise
    /// hosts.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when no token is set — before any remote
    /// call is attempted.
    pub fn from_env() -> Result<Self> {
        let token = env::var("GITHUB_TOKEN")
            .or_else(|_| env::var("GH_TOKEN"))
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(PmuError::AuthRequired)?;
        let endpoint =
            env::var("PMU_GRAPHQL_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::new(&token, endpoint)
    }

    /// Build a transport with an explicit token and endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the token is not a valid header value or the
    /// HTTP client cannot be constructed.
    pub fn new(token: &str, endpoint: String) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("pmu"),
        );
        headers.insert(
            "GraphQL-Features",
            reqwest::header::HeaderValue::from_static(FEATURE_PREVIEWS),
        );
        let auth = format!("Bearer {}", token.trim());
        let mut auth_value = reqwest::header::HeaderValue::from_str(&auth)
            .map_err(|_| PmuError::AuthRequired)?;
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let http = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, endpoint })
    }

    fn post(&self, name: &str, document: &str, variables: Value) -> Result<Value> {
        tracing::debug!(operation = name, "graphql request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&GraphQlRequest {
                query: document,
                variables,
            })
            .send()?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PmuError::AuthRequired);
        }
        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            // Secondary rate limits arrive as HTTP-level 403/429.
            return Err(errors::from_remote(format!(
                "HTTP {status}: {}",
                response.text().unwrap_or_default()
            )));
        }
        if !status.is_success() {
            return Err(PmuError::Transport {
                message: format!("HTTP {status} from {}", self.endpoint),
            });
        }

        let envelope: GraphQlResponse = response.json()?;
        if let Some(remote_errors) = envelope.errors {
            if !remote_errors.is_empty() {
                let joined = remote_errors
                    .iter()
                    .map(GraphQlError::render)
                    .collect::<Vec<_>>()
                    .join("; ");
                tracing::debug!(operation = name, error = %joined, "graphql error");
                return Err(errors::from_remote(joined));
            }
        }

        envelope.data.ok_or_else(|| PmuError::Transport {
            message: format!("empty response for {name}"),
        })
    }
}

impl GraphQl for GitHubTransport {
    fn query(&self, name: &str, document: &str, variables: Value) -> Result<Value> {
        self.post(name, document, variables)
    }

    fn mutate(&self, name: &str, document: &str, variables: Value) -> Result<Value> {
        self.post(name, document, variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_error_render_includes_code() {
        let err = GraphQlError {
            message: "Could not resolve to a User".to_string(),
            error_type: Some("NOT_FOUND".to_string()),
        };
        assert_eq!(err.render(), "NOT_FOUND: Could not resolve to a User");

        let err = GraphQlError {
            message: "boom".to_string(),
            error_type: None,
        };
        assert_eq!(err.render(), "boom");
    }

    #[test]
    fn test_response_envelope_parses_errors() {
        let raw = r#"{"data":null,"errors":[{"message":"Could not resolve to an Issue","type":"NOT_FOUND"}]}"#;
        let envelope: GraphQlResponse = serde_json::from_str(raw).unwrap();
        let errs = envelope.errors.unwrap();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].error_type.as_deref(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_transport_construction_rejects_bad_token() {
        assert!(GitHubTransport::new("bad\ntoken", DEFAULT_ENDPOINT.to_string()).is_err());
        assert!(GitHubTransport::new("good-token", DEFAULT_ENDPOINT.to_string()).is_ok());
    }
}

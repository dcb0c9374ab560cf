//! Web tools.

use std::time::Duration;

use serde_json::json;

use factotum_core::schema::{ParamSpec, ParamType, ToolArgs, ToolSpec};
use factotum_core::tool::{FailureKind, Tool, ToolKind, ToolOutcome};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetch the text content of a URL.
pub struct FetchUrlContentTool;

impl Tool for FetchUrlContentTool {
    fn kind(&self) -> ToolKind {
        ToolKind::FetchUrlContent
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            self.kind(),
            "Fetches and returns the text content of a given URL.",
        )
        .with_param(ParamSpec::required(
            "url",
            ParamType::String,
            "The URL to fetch content from.",
        ))
    }

    fn call(&self, args: ToolArgs) -> ToolOutcome {
        let url = args.str_or("url", "");

        let client = match reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                return ToolOutcome::failed(FailureKind::Internal {
                    message: format!("failed to build HTTP client: {e}"),
                });
            }
        };

        let response = match client.get(url).send() {
            Ok(response) => response,
            Err(e) => {
                return ToolOutcome::failed(FailureKind::Network {
                    message: format!("failed to fetch URL: {e}"),
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ToolOutcome::failed(FailureKind::Network {
                message: format!("failed to fetch URL: HTTP {status}"),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains("text") {
            return ToolOutcome::failed(FailureKind::InvalidInput {
                message: format!(
                    "URL does not point to a text-based document (content-type: {content_type})"
                ),
            });
        }

        match response.text() {
            Ok(content) => ToolOutcome::success(json!({
                "url": url,
                "content": content,
                "status_code": status.as_u16(),
            })),
            Err(e) => ToolOutcome::failed(FailureKind::Network {
                message: format!("failed to read response body: {e}"),
            }),
        }
    }
}

use anyhow::anyhow;
use serde::Deserialize;
use std::error::Error as StdError;
use std::io::ErrorKind;

fn error_chain_has_io_kind(
    err: &(dyn StdError + 'static),
    kind: ErrorKind,
    needle: &str,
) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    error_chain_has_io_kind(err, ErrorKind::ConnectionRefused, "connection refused")
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    error_chain_has_io_kind(err, ErrorKind::TimedOut, "timed out")
}

pub(crate) fn groq_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: Option<u64>,
) -> anyhow::Error {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return match timeout_secs {
            Some(secs) => anyhow!(
                "Groq request timed out after {}s while calling '{}'. \
                 Increase GROQ_TIMEOUT_SECS or retry later.",
                secs,
                api_url
            ),
            None => anyhow!("Groq request timed out while calling '{}'.", api_url),
        };
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return anyhow!(
                "Connection refused by Groq API at '{}'. Check GROQ_BASE_URL.",
                api_url
            );
        }

        return anyhow!(
            "Failed to connect to Groq API at '{}'. \
             Check GROQ_BASE_URL and network connectivity.",
            api_url
        );
    }

    anyhow!("Failed to call Groq API at '{}': {}", api_url, err)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub(crate) error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub(crate) message: String,
}

/// Prefers the API's `error.message` over the raw body.
pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

pub(crate) fn groq_status_error(status: reqwest::StatusCode, body: &str) -> anyhow::Error {
    anyhow!(
        "Groq API returned status {}: {}",
        status.as_u16(),
        api_error_message(body)
    )
}

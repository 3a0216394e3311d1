use anyhow::{Context, Result, anyhow};
use async_stream::stream;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::ChunkStream;
use crate::config::Config;
use crate::credential::Credential;
use crate::model::{ChatRequest, Message, ModelDescriptor, ResponseChunk, ResponseFormat};
use crate::providers::http_errors::{ApiErrorBody, groq_request_error, groq_status_error};
use crate::providers::sse::{SseDecoder, SseEvent};

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

fn models_url(base_url: &str) -> String {
    format!("{}/models", base_url.trim_end_matches('/'))
}

fn chat_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

async fn check_status(response: reqwest::Response, api_url: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let response_body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read response body>".to_string());
    warn!(
        api_url = %api_url,
        status = %status,
        response_body_len = response_body.len(),
        "groq returned non-success status"
    );
    Err(groq_status_error(status, &response_body))
}

pub async fn list_models(
    client: &Client,
    cfg: &Config,
    credential: &Credential,
) -> Result<Vec<ModelDescriptor>> {
    let api_url = models_url(&cfg.base_url);
    debug!(api_url = %api_url, "listing groq models");

    let response = client
        .get(&api_url)
        .bearer_auth(credential.expose())
        .send()
        .await
        .map_err(|err| {
            warn!(api_url = %api_url, error = %err, "groq model listing failed");
            groq_request_error(err, &api_url, cfg.timeout_secs)
        })?;
    let response = check_status(response, &api_url).await?;

    let parsed: ModelList = response
        .json()
        .await
        .context("Failed to parse model list response")?;
    debug!(model_count = parsed.data.len(), "received groq model list");
    Ok(parsed
        .data
        .into_iter()
        .map(|entry| ModelDescriptor::new(entry.id))
        .collect())
}

pub async fn chat_stream(
    client: &Client,
    cfg: &Config,
    credential: &Credential,
    request: &ChatRequest,
) -> Result<ChunkStream<'static>> {
    let api_url = chat_url(&cfg.base_url);
    let body = ChatCompletionBody {
        model: request.model.id(),
        messages: &request.messages,
        stream: true,
        response_format: request.response_format,
    };
    debug!(
        api_url = %api_url,
        model = %request.model,
        message_count = request.messages.len(),
        roles = ?request.messages.iter().map(|msg| msg.role.as_str()).collect::<Vec<_>>(),
        json_mode = request.response_format.is_some(),
        "sending groq chat completion request"
    );

    let response = client
        .post(&api_url)
        .bearer_auth(credential.expose())
        .header("Accept", "text/event-stream")
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %api_url,
                model = %request.model,
                error = %err,
                "groq chat request failed"
            );
            groq_request_error(err, &api_url, cfg.timeout_secs)
        })?;
    let response = check_status(response, &api_url).await?;

    let timeout_secs = cfg.timeout_secs;
    let mut byte_stream = response.bytes_stream();
    let chunks = stream! {
        let mut decoder = SseDecoder::new();
        let mut stop = false;
        while !stop {
            let (events, exhausted) = match byte_stream.next().await {
                Some(Ok(bytes)) => (decoder.push(&bytes), false),
                Some(Err(err)) => {
                    yield Err(groq_request_error(err, &api_url, timeout_secs));
                    break;
                }
                None => (decoder.finish().into_iter().collect::<Vec<_>>(), true),
            };

            for event in events {
                match event {
                    SseEvent::Done => {
                        stop = true;
                        break;
                    }
                    SseEvent::Data(data) => {
                        let chunk = decode_chunk(&data);
                        stop = chunk.is_err();
                        yield chunk;
                        if stop {
                            break;
                        }
                    }
                }
            }
            stop |= exhausted;
        }
        debug!(api_url = %api_url, "groq stream finished");
    };

    Ok(Box::pin(chunks))
}

fn decode_chunk(data: &str) -> Result<ResponseChunk> {
    if let Ok(api_error) = serde_json::from_str::<ApiErrorBody>(data) {
        return Err(anyhow!(api_error.error.message));
    }

    let parsed: StreamChunk =
        serde_json::from_str(data).context("Failed to parse streamed chat chunk")?;
    let delta = parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.delta)
        .unwrap_or_default();
    if let Some(role) = &delta.role {
        debug!(role = %role, "stream delta carries role");
    }
    Ok(ResponseChunk {
        content: delta.content,
    })
}

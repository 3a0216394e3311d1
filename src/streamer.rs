use anyhow::{Context, Result, bail};
use futures_util::StreamExt;
use std::io::Write;
use tracing::debug;

use crate::api::GroqApi;
use crate::model::ModelDescriptor;
use crate::prompt::PromptRequest;

const ERROR_PREFIX: &str = "Error in Groq API call: ";

/// Sends one chat request and writes each fragment to `out` as it arrives,
/// flushing after every write. Ends with a single newline.
pub async fn stream_completion<A, W>(
    api: &A,
    model: &ModelDescriptor,
    request: &PromptRequest,
    out: &mut W,
) -> Result<()>
where
    A: GroqApi + ?Sized,
    W: Write,
{
    if model.id().is_empty() {
        bail!("model id must not be empty");
    }
    if request.text().is_empty() {
        bail!("prompt must not be empty");
    }

    let mut chunks = api.chat_stream(request.to_chat_request(model)).await?;
    let mut fragments = 0usize;
    while let Some(chunk) = chunks.next().await {
        let Some(content) = chunk?.content else {
            continue;
        };
        out.write_all(content.as_bytes())
            .context("Failed to write response fragment")?;
        out.flush().context("Failed to flush stdout")?;
        fragments += 1;
    }
    writeln!(out).context("Failed to write trailing newline")?;

    debug!(model = %model, fragments, "completion stream drained");
    Ok(())
}

/// Like [`stream_completion`], but a failure is reported on `out` and
/// swallowed. Anything already written stays written.
pub async fn run_completion<A, W>(
    api: &A,
    model: &ModelDescriptor,
    request: &PromptRequest,
    out: &mut W,
) where
    A: GroqApi + ?Sized,
    W: Write,
{
    if let Err(err) = stream_completion(api, model, request, out).await {
        debug!(model = %model, error = %format!("{err:#}"), "completion failed");
        if let Err(write_err) = writeln!(out, "{ERROR_PREFIX}{err:#}").and_then(|()| out.flush())
        {
            debug!(error = %write_err, "failed to report completion error");
        }
    }
}

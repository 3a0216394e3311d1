use anyhow::Result;
use futures_util::Stream;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

use crate::config::Config;
use crate::credential::Credential;
use crate::model::{ChatRequest, ModelDescriptor, ResponseChunk};
use crate::providers;

/// Ordered, single-pass sequence of streamed fragments.
pub type ChunkStream<'a> = Pin<Box<dyn Stream<Item = Result<ResponseChunk>> + 'a>>;

pub type ModelListFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<ModelDescriptor>>> + 'a>>;
pub type ChatStreamFuture<'a> = Pin<Box<dyn Future<Output = Result<ChunkStream<'a>>> + 'a>>;

/// The two remote calls the program makes.
pub trait GroqApi {
    fn list_models<'a>(&'a self) -> ModelListFuture<'a>;
    fn chat_stream<'a>(&'a self, request: ChatRequest) -> ChatStreamFuture<'a>;
}

/// Only constructible with a [`Credential`], so no remote call can be made
/// without one.
pub struct HttpGroqApi<'a> {
    client: &'a Client,
    cfg: &'a Config,
    credential: &'a Credential,
}

impl<'a> HttpGroqApi<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config, credential: &'a Credential) -> Self {
        Self {
            client,
            cfg,
            credential,
        }
    }
}

impl GroqApi for HttpGroqApi<'_> {
    fn list_models<'b>(&'b self) -> ModelListFuture<'b> {
        Box::pin(async move {
            providers::groq::list_models(self.client, self.cfg, self.credential).await
        })
    }

    fn chat_stream<'b>(&'b self, request: ChatRequest) -> ChatStreamFuture<'b> {
        Box::pin(async move {
            let chunks =
                providers::groq::chat_stream(self.client, self.cfg, self.credential, &request)
                    .await?;
            Ok(chunks as ChunkStream<'b>)
        })
    }
}

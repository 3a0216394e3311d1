pub mod api;
pub mod cli;
pub mod config;
pub mod credential;
pub mod logging;
pub mod model;
pub mod prompt;
pub mod providers;
pub mod selection;
pub mod selector;
pub mod streamer;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use std::io;
use tracing::info;

use api::HttpGroqApi;
use cli::Cli;
use config::Config;
use credential::ensure_credential_present;
use prompt::PromptRequest;
use selection::SelectionStore;
use selector::resolve_model;
use streamer::run_completion;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let credential = ensure_credential_present();
    let cli = Cli::parse();

    let cfg = Config::from_env();
    info!(
        base_url = %cfg.base_url,
        timeout_secs = ?cfg.timeout_secs,
        selection_path = %cfg.selection_path.display(),
        force_reselect = cli.model,
        force_json = cli.json,
        "loaded runtime configuration"
    );

    let client = build_client(&cfg)?;
    let api = HttpGroqApi::new(&client, &cfg, &credential);
    let store = SelectionStore::new(cfg.selection_path.clone());

    let model = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        resolve_model(cli.model, &store, &api, &mut input, &mut io::stdout()).await?
    };

    let request = PromptRequest::new(cli.prompt, cli.json);
    run_completion(&api, &model, &request, &mut io::stdout()).await;
    Ok(())
}

fn build_client(cfg: &Config) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = cfg.timeout() {
        builder = builder.timeout(timeout);
    }
    builder.build().context("Failed to initialize HTTP client")
}

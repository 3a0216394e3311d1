#![allow(dead_code)]

use serde_json::json;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_KEY: &str = "gsk_integration";
pub const MODELS: [&str; 3] = ["llama-3.1-8b-instant", "gemma2-9b-it", "mixtral-8x7b-32768"];

pub fn groqsh_command(dir: &Path, base_url: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_groqsh"));
    cmd.current_dir(dir)
        .env("GROQ_API_KEY", TEST_KEY)
        .env("GROQ_BASE_URL", base_url)
        .env_remove("GROQ_TIMEOUT_SECS")
        .env_remove("GROQSH_SELECTION_FILE")
        .env_remove("RUST_LOG")
        .env_remove("LOG_FORMAT")
        .env_remove("LOG_OUTPUT")
        .env_remove("LOG_FILE_PATH");
    cmd
}

/// Runs the binary off the async runtime so the mock server keeps serving.
pub async fn run_with_stdin(mut cmd: Command, stdin: &'static [u8]) -> Output {
    tokio::task::spawn_blocking(move || {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn().expect("failed to spawn groqsh");
        {
            let mut child_stdin = child.stdin.take().expect("stdin should be piped");
            child_stdin
                .write_all(stdin)
                .expect("failed to write to groqsh stdin");
        }
        child.wait_with_output().expect("failed to wait for groqsh")
    })
    .await
    .expect("blocking task should join")
}

pub fn persist_model(dir: &Path, model: &str) {
    fs::write(
        dir.join("selected_model.json"),
        json!({ "model": model }).to_string(),
    )
    .expect("failed to write selection file");
}

pub fn sse_body(events: &[&str]) -> String {
    events
        .iter()
        .map(|event| format!("data: {event}\n\n"))
        .collect()
}

pub fn content_event(text: &str) -> String {
    json!({ "choices": [{ "index": 0, "delta": { "content": text } }] }).to_string()
}

pub async fn mount_models(server: &MockServer, expected_calls: u64) {
    let data: Vec<_> = MODELS
        .iter()
        .map(|id| json!({ "id": id, "object": "model" }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": data
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub async fn mount_hello_stream(server: &MockServer) {
    let hel = content_event("Hel");
    let lo = content_event("lo");
    let bang = content_event("!");
    let body = sse_body(&[hel.as_str(), lo.as_str(), bang.as_str(), "[DONE]"]);
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(server)
        .await;
}

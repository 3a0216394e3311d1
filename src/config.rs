use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_SELECTION_FILE: &str = "selected_model.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    /// `None` leaves the HTTP client's own defaults in place.
    pub timeout_secs: Option<u64>,
    pub selection_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env_with(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    pub(crate) fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            base_url: parse_base_url(get_var("GROQ_BASE_URL").as_deref()),
            timeout_secs: parse_timeout_secs(get_var("GROQ_TIMEOUT_SECS").as_deref()),
            selection_path: parse_selection_path(get_var("GROQSH_SELECTION_FILE").as_deref()),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn parse_base_url(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .trim_end_matches('/')
        .to_string()
}

fn parse_timeout_secs(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}

fn parse_selection_path(raw: Option<&str>) -> PathBuf {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SELECTION_FILE))
}

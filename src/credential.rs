use std::env;
use std::error::Error;
use std::fmt;
use std::process;

use tracing::debug;

use crate::config::API_KEY_VAR;

const MISSING_CREDENTIAL_EXIT_CODE: i32 = 1;

/// API key read once from the environment. Never logged or written to disk.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingCredential {
    var: &'static str,
}

impl MissingCredential {
    pub fn remediation(&self) -> String {
        format!(
            "Error: {var} is not set in your environment.\n\
             Please set your Groq API key using:\n\
             export {var}='your-api-key-here'",
            var = self.var
        )
    }
}

impl fmt::Display for MissingCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not set", self.var)
    }
}

impl Error for MissingCredential {}

/// Presence is all that matters; an empty value still counts as set.
pub fn require_credential(
    mut get_var: impl FnMut(&str) -> Option<String>,
) -> Result<Credential, MissingCredential> {
    get_var(API_KEY_VAR)
        .map(Credential::new)
        .ok_or(MissingCredential { var: API_KEY_VAR })
}

/// Exits the process with status 1 when the credential is absent.
pub fn ensure_credential_present() -> Credential {
    match require_credential(|key| env::var(key).ok()) {
        Ok(credential) => {
            debug!(var = API_KEY_VAR, "credential present");
            credential
        }
        Err(missing) => {
            println!("{}", missing.remediation());
            process::exit(MISSING_CREDENTIAL_EXIT_CODE);
        }
    }
}

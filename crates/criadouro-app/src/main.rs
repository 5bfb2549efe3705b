#![warn(missing_docs)]
//! # criadouro-app binary
//!
//! Headless entry point: prints build/runtime configuration and the stored
//! session state so deployments can verify which backend the client is
//! wired against.

use std::sync::Arc;

use criadouro_gateway::BackendConfig;
use criadouro_session::{FileSessionStorage, Session};

/// Env var pointing at the local session file.
const STATE_FILE_ENV: &str = "CRIADOURO_STATE_FILE";
/// Default session file, next to the working directory.
const DEFAULT_STATE_FILE: &str = "criadouro-session.json";

/// CLI entry point.
fn main() {
    env_logger::init();

    println!("criadouro-app {}", criadouro_app::app_version());

    let base_url = criadouro_app::backend_base_url_from_env();
    match BackendConfig::new(&base_url) {
        Ok(config) => println!("backend endpoint: {}", config.base_url()),
        Err(error) => {
            eprintln!("invalid backend endpoint {base_url}: {error}");
            std::process::exit(1);
        }
    }

    if let Err(error) = criadouro_app::default_transport() {
        eprintln!("transport initialization failed: {error}");
        std::process::exit(1);
    }

    let state_file =
        std::env::var(STATE_FILE_ENV).unwrap_or_else(|_| DEFAULT_STATE_FILE.to_string());
    let session = Session::new(Arc::new(FileSessionStorage::new(&state_file)));
    match session.user() {
        Ok(Some(profile)) => println!("session: authenticated as {}", profile.email),
        Ok(None) => println!("session: not authenticated"),
        Err(error) => println!("session: unreadable state file {state_file}: {error}"),
    }
}

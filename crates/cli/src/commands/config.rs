use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use agentdir_core::config::{AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

/// Renders the effective config. Exits 2 when the config does not load.
pub fn run() -> CommandResult {
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => CommandResult { exit_code: 0, output: render(&config) },
        Err(error) => {
            CommandResult { exit_code: 2, output: format!("config validation failed: {error}") }
        }
    }
}

fn render(config: &AppConfig) -> String {
    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let entries = [
        (
            "database.url",
            config.database.url.clone(),
            source("database.url", &["AGENTDIR_DATABASE_URL"]),
        ),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            source("database.max_connections", &["AGENTDIR_DATABASE_MAX_CONNECTIONS"]),
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            source("database.timeout_secs", &["AGENTDIR_DATABASE_TIMEOUT_SECS"]),
        ),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            source("server.bind_address", &["AGENTDIR_SERVER_BIND_ADDRESS"]),
        ),
        (
            "server.port",
            config.server.port.to_string(),
            source("server.port", &["AGENTDIR_SERVER_PORT"]),
        ),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            source("server.graceful_shutdown_secs", &["AGENTDIR_SERVER_GRACEFUL_SHUTDOWN_SECS"]),
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            source("logging.level", &["AGENTDIR_LOGGING_LEVEL", "AGENTDIR_LOG_LEVEL"]),
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            source("logging.format", &["AGENTDIR_LOGGING_FORMAT", "AGENTDIR_LOG_FORMAT"]),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.iter().map(|(key, value, source)| render_line(key, value, source)));
    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    ["agentdir.toml", "config/agentdir.toml"].into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: &str) -> String {
    format!("- {key} = {value} (source: {source})")
}

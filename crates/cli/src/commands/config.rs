use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use bookstore_core::config::{AppConfig, LoadOptions, DEFAULT_CONFIG_FILES};
use secrecy::ExposeSecret;
use toml::Value;

struct Field {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

fn field(key: &'static str, env_keys: &'static [&'static str], value: String) -> Field {
    Field { key, env_keys, value }
}

struct ConfigFile {
    path: PathBuf,
    doc: Value,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };
    let file = load_config_file();

    let api_key = config
        .llm
        .api_key
        .as_ref()
        .map(|key| redact_secret(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    let fields = [
        field("agent.name", &["BOOKSTORE_AGENT_NAME"], config.agent.name.clone()),
        field("agent.description", &["BOOKSTORE_AGENT_DESCRIPTION"], config.agent.description.clone()),
        field("llm.provider", &["BOOKSTORE_LLM_PROVIDER"], format!("{:?}", config.llm.provider)),
        field("llm.model", &["BOOKSTORE_LLM_MODEL"], config.llm.model.clone()),
        field(
            "llm.base_url",
            &["BOOKSTORE_LLM_BASE_URL"],
            config.llm.base_url.clone().unwrap_or_else(|| "<unset>".to_string()),
        ),
        field("llm.api_key", &["BOOKSTORE_LLM_API_KEY"], api_key),
        field("llm.timeout_secs", &["BOOKSTORE_LLM_TIMEOUT_SECS"], config.llm.timeout_secs.to_string()),
        field("llm.temperature", &["BOOKSTORE_LLM_TEMPERATURE"], config.llm.temperature.to_string()),
        field(
            "server.bind_address",
            &["BOOKSTORE_SERVER_BIND_ADDRESS"],
            config.server.bind_address.clone(),
        ),
        field("server.port", &["BOOKSTORE_SERVER_PORT"], config.server.port.to_string()),
        field(
            "server.graceful_shutdown_secs",
            &["BOOKSTORE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            config.server.graceful_shutdown_secs.to_string(),
        ),
        field(
            "server.max_sessions",
            &["BOOKSTORE_SERVER_MAX_SESSIONS"],
            config.server.max_sessions.to_string(),
        ),
        field(
            "server.session_idle_secs",
            &["BOOKSTORE_SERVER_SESSION_IDLE_SECS"],
            config.server.session_idle_secs.to_string(),
        ),
        field(
            "logging.level",
            &["BOOKSTORE_LOGGING_LEVEL", "BOOKSTORE_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        field(
            "logging.format",
            &["BOOKSTORE_LOGGING_FORMAT", "BOOKSTORE_LOG_FORMAT"],
            format!("{:?}", config.logging.format),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields {
        let source = field_source(field.key, field.env_keys, file.as_ref());
        lines.push(format!("- {} = {} (source: {source})", field.key, field.value));
    }
    lines.join("\n")
}

fn load_config_file() -> Option<ConfigFile> {
    let path = DEFAULT_CONFIG_FILES.into_iter().map(PathBuf::from).find(|path| path.exists())?;
    let doc = fs::read_to_string(&path).ok()?.parse::<Value>().ok()?;
    Some(ConfigFile { path, doc })
}

fn field_source(key_path: &str, env_keys: &[&str], file: Option<&ConfigFile>) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    match file {
        Some(file) if contains_path(&file.doc, key_path) => {
            format!("file ({})", display_path(&file.path))
        }
        _ => "default".to_string(),
    }
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

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

/// Keeps a short prefix such as `sk-` so operators can tell keys apart.
fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}

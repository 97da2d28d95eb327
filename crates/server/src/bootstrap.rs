use std::sync::Arc;
use std::time::Duration;

use bookstore_agent::{AgentRuntime, SessionLimits, SessionStore};
use bookstore_core::config::{AppConfig, ConfigError, LoadOptions};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub runtime: Arc<AgentRuntime>,
    pub sessions: Arc<SessionStore>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("agent runtime could not be assembled: {0}")]
    Runtime(#[source] anyhow::Error),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        agent = %config.agent.name,
        "starting application bootstrap"
    );

    let runtime = AgentRuntime::bookstore(&config).map_err(BootstrapError::Runtime)?;
    info!(
        event_name = "system.bootstrap.runtime_ready",
        correlation_id = "bootstrap",
        tools = runtime.tools().len(),
        llm_enabled = runtime.uses_llm(),
        "agent runtime assembled"
    );

    let sessions = SessionStore::new(SessionLimits {
        max_sessions: config.server.max_sessions,
        idle_ttl: Duration::from_secs(config.server.session_idle_secs),
    });

    Ok(Application { config, runtime: Arc::new(runtime), sessions: Arc::new(sessions) })
}

#[cfg(test)]
mod tests {
    use bookstore_core::config::{AppConfig, ConfigOverrides, LlmProvider, LoadOptions};

    use crate::bootstrap::{bootstrap, bootstrap_with_config};

    #[test]
    fn bootstrap_fails_fast_when_openai_has_no_key() {
        let result = bootstrap(LoadOptions {
            config_path: Some("does-not-exist.toml".into()),
            require_file: false,
            overrides: ConfigOverrides {
                llm_provider: Some(LlmProvider::OpenAi),
                llm_api_key: Some("   ".to_string()),
                ..ConfigOverrides::default()
            },
        });

        let message = result.err().map(|error| error.to_string()).unwrap_or_default();
        assert!(message.contains("llm.api_key"), "unexpected message: {message}");
    }

    #[tokio::test]
    async fn offline_bootstrap_serves_the_purchase_journey() {
        let app = bootstrap_with_config(AppConfig::default()).expect("offline config is valid");
        assert!(!app.runtime.uses_llm());
        assert_eq!(app.runtime.tools().len(), 4);

        let mut session = app.sessions.create().await;
        let reply = app
            .runtime
            .handle_message(&mut session, "I want to buy a book")
            .await
            .expect("reply");
        assert!(reply.text.contains("Which one would you like?"));
    }
}

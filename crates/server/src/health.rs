use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct HealthState {
    pub agent_name: String,
    pub tool_count: usize,
    pub llm_enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub tools: HealthCheck,
    pub llm: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let tools = if state.tool_count > 0 {
        HealthCheck { status: "ready", detail: format!("{} tools registered", state.tool_count) }
    } else {
        HealthCheck { status: "degraded", detail: "no tools registered".to_string() }
    };
    let ready = tools.status == "ready";

    let llm = if state.llm_enabled {
        HealthCheck { status: "ready", detail: "LLM rephrasing enabled".to_string() }
    } else {
        HealthCheck { status: "ready", detail: "offline mode, scripted replies".to_string() }
    };

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: format!("{} runtime initialized", state.agent_name),
        },
        tools,
        llm,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bookstore_agent::tools::ToolDescriptor;
use bookstore_agent::{AgentDescription, AgentReply, AgentRuntime, Session, SessionStore};
use bookstore_core::{ApplicationError, DomainError, InterfaceError, SessionId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::health::{self, HealthState};

#[derive(Clone)]
pub struct ApiState {
    pub runtime: Arc<AgentRuntime>,
    pub sessions: Arc<SessionStore>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
    pub correlation_id: String,
}

/// Maps the interface error taxonomy onto HTTP statuses.
pub struct ApiError(InterfaceError);

impl From<InterfaceError> for ApiError {
    fn from(value: InterfaceError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(
            event_name = "api.request.failed",
            correlation_id = %self.0.correlation_id(),
            status = status.as_u16(),
            error = %self.0,
            "request failed"
        );
        let body = ErrorBody {
            error: self.0.user_message(),
            detail: self.0.to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ToolResponse {
    pub tool: String,
    pub output: Value,
}

pub fn router(state: ApiState) -> Router {
    let health_state = HealthState {
        agent_name: state.runtime.blueprint().name.clone(),
        tool_count: state.runtime.tools().len(),
        llm_enabled: state.runtime.uses_llm(),
    };

    Router::new()
        .route("/agent", get(describe_agent))
        .route("/tools", get(list_tools))
        .route("/tools/{name}", post(invoke_tool))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/messages", post(post_message))
        .with_state(state)
        .merge(health::router(health_state))
}

async fn describe_agent(State(state): State<ApiState>) -> Json<AgentDescription> {
    Json(state.runtime.blueprint().describe())
}

async fn list_tools(State(state): State<ApiState>) -> Json<Vec<ToolDescriptor>> {
    Json(state.runtime.tools().descriptors())
}

async fn invoke_tool(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    body: Option<Json<Value>>,
) -> Result<Json<ToolResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let input = body.map(|Json(value)| value).unwrap_or(Value::Null);
    let output = state
        .runtime
        .invoke_tool(&name, input)
        .await
        .map_err(|error| classify(error).into_interface(&correlation_id))?;

    info!(
        event_name = "api.tool.invoked",
        correlation_id = %correlation_id,
        tool = %name,
        "tool invoked over HTTP"
    );
    Ok(Json(ToolResponse { tool: name, output: output.data }))
}

async fn create_session(State(state): State<ApiState>) -> (StatusCode, Json<Session>) {
    let session = state.sessions.create().await;
    info!(
        event_name = "api.session.created",
        correlation_id = "unknown",
        session_id = %session.id,
        "session created"
    );
    (StatusCode::CREATED, Json(session))
}

async fn get_session(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let session = load_session(&state.sessions, id, &correlation_id).await?;
    Ok(Json(session))
}

async fn post_message(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<AgentReply>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    if request.text.trim().is_empty() {
        return Err(ApplicationError::from(DomainError::InvariantViolation(
            "message text must not be empty".to_string(),
        ))
        .into_interface(&correlation_id)
        .into());
    }

    let mut session = load_session(&state.sessions, id, &correlation_id).await?;
    let reply = state
        .runtime
        .handle_message(&mut session, request.text.trim())
        .await
        .map_err(|error| classify(error).into_interface(&correlation_id))?;
    state.sessions.save(session).await;
    Ok(Json(reply))
}

async fn load_session(
    sessions: &SessionStore,
    id: String,
    correlation_id: &str,
) -> Result<Session, ApiError> {
    let id = SessionId(id);
    match sessions.get(&id).await {
        Some(session) => Ok(session),
        None => Err(ApplicationError::SessionNotFound(id.0).into_interface(correlation_id).into()),
    }
}

/// Domain failures stay client errors; anything else is treated as an
/// upstream integration failure.
fn classify(error: anyhow::Error) -> ApplicationError {
    match error.downcast::<DomainError>() {
        Ok(domain) => ApplicationError::Domain(domain),
        Err(other) => ApplicationError::Integration(format!("{other:#}")),
    }
}

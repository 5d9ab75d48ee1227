use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tracing::error;

use crate::agent::{AgentClient, AgentOutcome};
use crate::config::ServerConfig;
use crate::protocol::{ChatError, ChatResponse, FieldIssue};

const UNCONFIGURED_MSG: &str =
    "AI Mentor is not properly configured. Please set up the API key.";
const UPSTREAM_FAILED_MSG: &str = "Failed to get response from AI Mentor";
const UNEXPECTED_MSG: &str = "An unexpected error occurred";

struct ServerState {
    // None when no API key was configured; every chat request answers 500
    // until the operator fixes that.
    agent: Option<AgentClient>,
}

pub fn router(config: ServerConfig) -> Router {
    let agent = config
        .api_key
        .clone()
        .map(|key| AgentClient::new(&config, key));
    let state = Arc::new(ServerState { agent });

    Router::new()
        .route("/api/chat", post(chat))
        .with_state(state)
}

/// `POST /api/chat`: validate, forward once to the inference provider,
/// normalize the result. Terminal statuses: 200, 400, 500, 502. Detail is
/// logged here; only coarse messages cross the wire.
async fn chat(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    // Credential check comes first: an unconfigured server answers 500 no
    // matter what the body looks like.
    let Some(agent) = &state.agent else {
        error!("chat request refused: API key is not configured");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, UNCONFIGURED_MSG);
    };

    let body = match payload {
        Ok(Json(value)) => value,
        Err(rejection) => {
            return invalid_request(vec![FieldIssue::new("body", &rejection.body_text())]);
        }
    };

    let message = match validate(&body) {
        Ok(message) => message,
        Err(issues) => return invalid_request(issues),
    };

    match agent.send(&message).await {
        Ok(AgentOutcome::Reply(reply)) => (
            StatusCode::OK,
            Json(ChatResponse {
                response: reply.into_text(),
            }),
        )
            .into_response(),
        Ok(AgentOutcome::Failed(status)) => {
            error!(%status, "inference provider returned an error status");
            error_response(StatusCode::BAD_GATEWAY, UPSTREAM_FAILED_MSG)
        }
        Err(err) => {
            error!(error = %err, "chat request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_MSG)
        }
    }
}

/// Structural validation of the request body. Returns the trimmed message
/// text, which is what gets forwarded.
fn validate(body: &Value) -> Result<String, Vec<FieldIssue>> {
    let Value::Object(map) = body else {
        return Err(vec![FieldIssue::new("body", "Expected an object")]);
    };
    let Some(message) = map.get("message") else {
        return Err(vec![FieldIssue::new("message", "Required")]);
    };
    let Value::String(text) = message else {
        return Err(vec![FieldIssue::new("message", "Expected a string")]);
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(vec![FieldIssue::new("message", "Message must not be empty")]);
    }
    Ok(trimmed.to_string())
}

fn invalid_request(issues: Vec<FieldIssue>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ChatError {
            error: "Invalid request".to_string(),
            details: Some(issues),
        }),
    )
        .into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ChatError {
            error: message.to_string(),
            details: None,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_trims_message() {
        let message = validate(&json!({"message": "  hello  "})).unwrap();
        assert_eq!(message, "hello");
    }

    #[test]
    fn test_validate_rejects_missing_message() {
        let issues = validate(&json!({})).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "message");
    }

    #[test]
    fn test_validate_rejects_non_string_message() {
        assert!(validate(&json!({"message": 7})).is_err());
        assert!(validate(&json!(["message"])).is_err());
    }

    #[test]
    fn test_validate_rejects_blank_message() {
        assert!(validate(&json!({"message": "   "})).is_err());
    }
}

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use anyhow::Result;

use crate::config::ServerConfig;

#[derive(Serialize)]
struct AgentRequest<'a> {
    user_id: &'a str,
    agent_id: &'a str,
    session_id: &'a str,
    message: &'a str,
}

/// What came back from the inference provider. A non-2xx status is a normal
/// outcome here (the handler maps it to 502); only transport or decode
/// failures surface as `Err`.
#[derive(Debug)]
pub enum AgentOutcome {
    Reply(AgentReply),
    Failed(StatusCode),
}

/// The provider's reply shape is not under our control, so the possible
/// forms are modeled explicitly. Precedence when extracting the reply text:
/// `response` field, then `message` field, then a bare JSON string, then
/// the whole body stringified. A field only counts when it is a non-empty
/// string; anything else falls through to the next rule.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    Response(String),
    Message(String),
    Plain(String),
    Opaque(Value),
}

impl AgentReply {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(s)) = map.get("response") {
                    if !s.is_empty() {
                        return AgentReply::Response(s.clone());
                    }
                }
                if let Some(Value::String(s)) = map.get("message") {
                    if !s.is_empty() {
                        return AgentReply::Message(s.clone());
                    }
                }
                AgentReply::Opaque(Value::Object(map))
            }
            Value::String(s) => AgentReply::Plain(s),
            other => AgentReply::Opaque(other),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            AgentReply::Response(s) | AgentReply::Message(s) | AgentReply::Plain(s) => s,
            AgentReply::Opaque(value) => value.to_string(),
        }
    }
}

/// Client for the external inference provider. One outbound POST per chat
/// request, carrying the API key header and the fixed routing identifiers
/// from configuration. No retries, no explicit timeout.
#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    url: String,
    api_key: String,
    user_id: String,
    agent_id: String,
    session_id: String,
}

impl AgentClient {
    pub fn new(config: &ServerConfig, api_key: String) -> Self {
        Self {
            client: Client::new(),
            url: config.agent_url.clone(),
            api_key,
            user_id: config.user_id.clone(),
            agent_id: config.agent_id.clone(),
            session_id: config.session_id.clone(),
        }
    }

    pub async fn send(&self, message: &str) -> Result<AgentOutcome> {
        let request = AgentRequest {
            user_id: &self.user_id,
            agent_id: &self.agent_id,
            session_id: &self.session_id,
            message,
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(AgentOutcome::Failed(response.status()));
        }

        let body: Value = response.json().await?;
        Ok(AgentOutcome::Reply(AgentReply::from_value(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_field_wins() {
        let reply = AgentReply::from_value(json!({"response": "hi", "message": "other"}));
        assert_eq!(reply, AgentReply::Response("hi".to_string()));
        assert_eq!(reply.into_text(), "hi");
    }

    #[test]
    fn test_message_field_is_fallback() {
        let reply = AgentReply::from_value(json!({"message": "hi"}));
        assert_eq!(reply, AgentReply::Message("hi".to_string()));
    }

    #[test]
    fn test_empty_response_falls_through_to_message() {
        let reply = AgentReply::from_value(json!({"response": "", "message": "hi"}));
        assert_eq!(reply, AgentReply::Message("hi".to_string()));
    }

    #[test]
    fn test_non_string_response_falls_through() {
        let reply = AgentReply::from_value(json!({"response": 42, "message": "hi"}));
        assert_eq!(reply, AgentReply::Message("hi".to_string()));
    }

    #[test]
    fn test_bare_string_body() {
        let reply = AgentReply::from_value(json!("just text"));
        assert_eq!(reply, AgentReply::Plain("just text".to_string()));
    }

    #[test]
    fn test_opaque_body_is_stringified() {
        let reply = AgentReply::from_value(json!({"choices": [1, 2]}));
        assert_eq!(reply.into_text(), r#"{"choices":[1,2]}"#);
    }
}

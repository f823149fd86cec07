//! Wire protocol types for the Medica assistant backend.

mod error;

pub use error::BackendError;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Body for `POST /auth/signup`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignupRequest {
    /// Display name for the new account.
    pub full_name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Requested role, `"doctor"` or `"patient"`.
    pub role: String,
}

/// Response body shared by login and signup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    /// Opaque bearer token.
    pub access_token: String,
    /// Token scheme, always `"bearer"` from the current backend.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Role string for the authenticated user.
    pub user_role: String,
    /// Display name.
    pub user_name: String,
    /// Account email.
    pub user_email: String,
    /// Account id.
    pub user_id: Uuid,
    /// Informational message (signup sends "Account created successfully").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Message as carried on the wire: role string plus text, no metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireMessage {
    /// `"user"` or `"assistant"`.
    pub role: String,
    /// Message text.
    pub text: String,
}

/// Body for `POST /agent/chat`.
///
/// `messages` carries the full prior transcript so the backend can stay
/// stateless across turns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The newly submitted user message.
    pub message: String,
    /// Prior transcript, oldest first.
    pub messages: Vec<WireMessage>,
}

/// Response body for `POST /agent/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    /// Assistant reply text; may be empty.
    #[serde(default)]
    pub reply: String,
}

/// Body for `POST /agent/chat/get-summary` (doctor-only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryRequest {
    /// Free-form input the report is generated from.
    pub input: String,
}

/// Response body for `POST /agent/chat/get-summary`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryReply {
    /// Generated report text.
    pub message: String,
}

/// Rejection body shape used by the backend (`{"detail": "..."}`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ErrorBody {
    /// Human-readable rejection reason.
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{AuthResponse, ChatReply, ChatRequest, ErrorBody, WireMessage};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn auth_response_decodes_backend_shape() {
        let user_id = Uuid::new_v4();
        let value = json!({
            "access_token": "tok",
            "token_type": "bearer",
            "user_role": "doctor",
            "user_name": "Dr. Gregory",
            "user_email": "greg@example.com",
            "user_id": user_id.to_string(),
        });
        let response: AuthResponse = serde_json::from_value(value).expect("decode");
        assert_eq!(response.access_token, "tok");
        assert_eq!(response.user_role, "doctor");
        assert_eq!(response.user_id, user_id);
        assert_eq!(response.message, None);
    }

    #[test]
    fn auth_response_defaults_token_type() {
        let value = json!({
            "access_token": "tok",
            "user_role": "patient",
            "user_name": "Pat",
            "user_email": "pat@example.com",
            "user_id": Uuid::new_v4().to_string(),
        });
        let response: AuthResponse = serde_json::from_value(value).expect("decode");
        assert_eq!(response.token_type, "bearer");
    }

    #[test]
    fn chat_request_serializes_transcript_in_order() {
        let request = ChatRequest {
            message: "and now?".to_string(),
            messages: vec![
                WireMessage {
                    role: "assistant".to_string(),
                    text: "hello".to_string(),
                },
                WireMessage {
                    role: "user".to_string(),
                    text: "hi".to_string(),
                },
            ],
        };
        let value = serde_json::to_value(&request).expect("encode");
        assert_eq!(value["message"], "and now?");
        assert_eq!(value["messages"][0]["role"], "assistant");
        assert_eq!(value["messages"][1]["text"], "hi");
    }

    #[test]
    fn chat_reply_tolerates_missing_field() {
        let reply: ChatReply = serde_json::from_value(json!({})).expect("decode");
        assert_eq!(reply.reply, "");
    }

    #[test]
    fn error_body_tolerates_unknown_shape() {
        let body: ErrorBody = serde_json::from_value(json!({})).expect("decode");
        assert_eq!(body.detail, None);
        let body: ErrorBody =
            serde_json::from_value(json!({"detail": "Email already registered"})).expect("decode");
        assert_eq!(body.detail.as_deref(), Some("Email already registered"));
    }
}

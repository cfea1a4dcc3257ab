use serde::{Deserialize, Serialize};

/// One message in the chat history sent to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// One decoded envelope frame from the streaming chat endpoint.
///
/// The backend streams `message` frames carrying text deltas, then a single
/// terminal `result` frame; `error` replaces the result when the request
/// fails server-side.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StreamFrame {
    Delta { message: DeltaPayload },
    Result { result: ResultPayload },
    Error { error: ErrorPayload },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeltaPayload {
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ResultPayload {
    /// Full response text, when the backend repeats it in the terminal frame.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

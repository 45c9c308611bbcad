use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;
use tokio_tungstenite::tungstenite;

use crate::payload::GraphqlError;

#[derive(Debug)]
pub enum TransportError {
    Request(reqwest::Error),
    Status(StatusCode, String),
    /// The server answered but reported GraphQL errors.
    Graphql(Vec<String>),
    Serde(JsonError),
    WebSocket(Box<tungstenite::Error>),
    /// The server broke the `graphql-ws` message contract.
    Protocol(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::Graphql(messages) => write!(f, "graphql error: {}", messages.join("; ")),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::WebSocket(error) => write!(f, "websocket error: {error}"),
            Self::Protocol(message) => write!(f, "protocol error: {message}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for TransportError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

impl From<tungstenite::Error> for TransportError {
    fn from(error: tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(error))
    }
}

/// Best human-readable message for a failed HTTP response body.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let messages = serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| {
            parsed
                .errors
                .iter()
                .map(GraphqlError::message_or_fallback)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if !messages.is_empty() {
        return messages.join("; ");
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}

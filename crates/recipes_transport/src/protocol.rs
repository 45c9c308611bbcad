//! `graphql-ws` (subscriptions-transport-ws) message framing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;
use crate::payload::{GraphqlRequest, GraphqlResponse};

pub const SUBPROTOCOL: &str = "graphql-ws";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ConnectionInit {
        payload: Value,
    },
    Start {
        id: String,
        payload: GraphqlRequest,
    },
    Stop {
        id: String,
    },
    ConnectionTerminate,
}

impl ClientMessage {
    pub fn connection_init() -> Self {
        Self::ConnectionInit {
            payload: Value::Object(Default::default()),
        }
    }

    pub fn to_text(&self) -> Result<String, TransportError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionAck {
        #[serde(default)]
        payload: Option<Value>,
    },
    ConnectionError {
        #[serde(default)]
        payload: Option<Value>,
    },
    #[serde(rename = "ka")]
    KeepAlive,
    Data {
        id: String,
        payload: GraphqlResponse,
    },
    Error {
        id: String,
        #[serde(default)]
        payload: Option<Value>,
    },
    Complete {
        id: String,
    },
}

impl ServerMessage {
    pub fn parse(text: &str) -> Result<Self, TransportError> {
        Ok(serde_json::from_str(text)?)
    }
}

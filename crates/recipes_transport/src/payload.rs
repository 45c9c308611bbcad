use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CREATE_OPERATION_MUTATION: &str = "mutation ($recipePath: String!, $projectRoot: String!) { createOperation(recipePath: $recipePath, projectRoot: $projectRoot) }";
pub const SEND_EVENT_MUTATION: &str =
    "mutation ($event: String!, $input: String) { sendEvent(event: $event, input: $input) }";
pub const OPERATION_SUBSCRIPTION: &str = "subscription { operation { state } }";

/// A GraphQL document plus its variables, as sent over HTTP or inside a
/// websocket `start` message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Map::new(),
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

pub fn create_operation(recipe_path: &str, project_root: &str) -> GraphqlRequest {
    GraphqlRequest::new(CREATE_OPERATION_MUTATION)
        .with_variable("recipePath", recipe_path)
        .with_variable("projectRoot", project_root)
}

/// `input` is omitted from the variables entirely when absent.
pub fn send_event(event: &str, input: Option<String>) -> GraphqlRequest {
    let request = GraphqlRequest::new(SEND_EVENT_MUTATION).with_variable("event", event);
    match input {
        Some(input) => request.with_variable("input", input),
        None => request,
    }
}

pub fn operation_subscription() -> GraphqlRequest {
    GraphqlRequest::new(OPERATION_SUBSCRIPTION)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GraphqlError {
    #[serde(default)]
    pub message: Option<String>,
}

impl GraphqlError {
    pub fn message_or_fallback(&self) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or("unknown error")
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

impl GraphqlResponse {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(GraphqlError::message_or_fallback)
            .collect()
    }

    /// The raw `operation.state` string carried by a subscription result.
    pub fn operation_state(&self) -> Option<&str> {
        self.data
            .as_ref()?
            .get("operation")?
            .get("state")?
            .as_str()
    }
}

//! Decoding of operation snapshots pushed by the remote executor.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::DecodeError;

/// Execution phase of a remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Listing,
    Loading,
    PlanPresented,
    Installing,
    Done,
    DoneError,
}

impl Phase {
    /// Maps an executor state name onto a phase. Intermediate states such as
    /// `parsingRecipe` or `creatingPlan` all count as loading.
    pub fn from_wire(name: &str) -> Self {
        match name {
            "listing" => Phase::Listing,
            "presentPlan" | "planPresented" => Phase::PlanPresented,
            "applyingPlan" | "installing" => Phase::Installing,
            "done" => Phase::Done,
            "doneError" => Phase::DoneError,
            _ => Phase::Loading,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::DoneError)
    }
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // nested state values arrive as objects
        Ok(match Value::deserialize(deserializer)? {
            Value::String(name) => Phase::from_wire(&name),
            _ => Phase::Loading,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlanStep {
    #[serde(rename = "resourceName", default)]
    pub resource_name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub describe: String,
    #[serde(default)]
    pub diff: Option<String>,
    #[serde(rename = "isDone", default)]
    pub is_done: bool,
    #[serde(rename = "_message", alias = "message", default)]
    pub message: Option<String>,
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    #[serde(rename = "_uuid", default)]
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OperationContext {
    pub plan: Vec<PlanStep>,
    pub steps: Vec<String>,
    pub exports: Vec<String>,
    pub error: Option<Value>,
    #[serde(alias = "elapsedMs", deserialize_with = "number_or_zero")]
    pub elapsed: f64,
}

impl OperationContext {
    /// Elapsed execution time in seconds, unrounded, in the shortest form
    /// that reads back to the same value.
    pub fn elapsed_seconds(&self) -> String {
        (self.elapsed / 1000.0).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperationState {
    pub value: Phase,
    #[serde(default)]
    pub context: OperationContext,
}

impl OperationState {
    pub fn phase(&self) -> Phase {
        self.value
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64().unwrap_or(0.0))
}

/// Holds the most recently decoded operation state.
///
/// Snapshots replace the state wholesale; the last one received wins.
#[derive(Debug, Default)]
pub struct OperationStateClient {
    latest: Option<OperationState>,
}

impl OperationStateClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `raw` and makes it the current state. A payload that fails to
    /// decode leaves the previous state in place.
    pub fn apply_snapshot(&mut self, raw: &str) -> Result<&OperationState, DecodeError> {
        let state: OperationState = serde_json::from_str(raw)?;
        Ok(self.latest.insert(state))
    }

    pub fn latest(&self) -> Option<&OperationState> {
        self.latest.as_ref()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.latest.as_ref().map(OperationState::phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_names_map_to_phases() {
        assert_eq!(Phase::from_wire("presentPlan"), Phase::PlanPresented);
        assert_eq!(Phase::from_wire("applyingPlan"), Phase::Installing);
        assert_eq!(Phase::from_wire("done"), Phase::Done);
        assert_eq!(Phase::from_wire("doneError"), Phase::DoneError);
        assert_eq!(Phase::from_wire("creatingPlan"), Phase::Loading);
        assert!(Phase::DoneError.is_terminal());
        assert!(!Phase::Installing.is_terminal());
    }

    #[test]
    fn snapshot_decodes_context_fields() {
        let raw = json!({
            "value": "applyingPlan",
            "context": {
                "plan": [{
                    "resourceName": "NPMPackage",
                    "describe": "Install jest",
                    "isDone": true,
                    "_message": "Installed jest",
                    "_key": "jest"
                }],
                "steps": ["# Jest"],
                "exports": [],
                "elapsed": 1500
            }
        })
        .to_string();

        let mut client = OperationStateClient::new();
        let state = client.apply_snapshot(&raw).unwrap();
        assert_eq!(state.phase(), Phase::Installing);
        assert_eq!(state.context.plan[0].message.as_deref(), Some("Installed jest"));
        assert_eq!(state.context.plan[0].key.as_deref(), Some("jest"));
        assert_eq!(state.context.elapsed_seconds(), "1.5");
    }

    #[test]
    fn missing_context_defaults() {
        let mut client = OperationStateClient::new();
        let state = client.apply_snapshot(r#"{"value":"parsingRecipe"}"#).unwrap();
        assert_eq!(state.phase(), Phase::Loading);
        assert_eq!(state.context, OperationContext::default());
    }

    #[test]
    fn object_state_values_count_as_loading() {
        let mut client = OperationStateClient::new();
        let state = client
            .apply_snapshot(r#"{"value":{"creatingPlan":"fetching"},"context":{"elapsed":null}}"#)
            .unwrap();
        assert_eq!(state.phase(), Phase::Loading);
        assert_eq!(state.context.elapsed, 0.0);
    }

    #[test]
    fn failed_decode_keeps_previous_state() {
        let mut client = OperationStateClient::new();
        client.apply_snapshot(r#"{"value":"presentPlan"}"#).unwrap();
        assert!(client.apply_snapshot("{not json").is_err());
        assert_eq!(client.phase(), Some(Phase::PlanPresented));
    }

    #[test]
    fn elapsed_seconds_keep_full_precision() {
        let context = |elapsed| OperationContext {
            elapsed,
            ..OperationContext::default()
        };
        assert_eq!(context(1234.5).elapsed_seconds(), "1.2345");
        assert_eq!(context(2000.0).elapsed_seconds(), "2");
        assert_eq!(context(7.0).elapsed_seconds(), "0.007");
    }

    #[test]
    fn latest_is_empty_before_first_snapshot() {
        assert!(OperationStateClient::new().latest().is_none());
    }
}

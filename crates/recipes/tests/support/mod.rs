#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::BoxFuture;
use recipes::app::{HostOps, Outcome};
use recipes_transport::{CallTransport, GraphqlRequest, TransportError};
use recipes_tui::Terminal;
use serde_json::{json, Value};

type InputHandler = Box<dyn FnMut(String) + Send>;
type ResizeHandler = Box<dyn FnMut() + Send>;

#[derive(Default)]
pub struct TerminalTrace {
    pub writes: Vec<String>,
    pub start_calls: usize,
    pub stop_calls: usize,
    pub drain_calls: Vec<(u64, u64)>,
    /// Number of writes seen when `stop` was called.
    pub writes_at_stop: Option<usize>,
    pub on_input: Option<InputHandler>,
    pub on_resize: Option<ResizeHandler>,
}

pub struct SharedTerminal {
    state: Arc<Mutex<TerminalTrace>>,
    columns: u16,
    rows: u16,
}

impl SharedTerminal {
    pub fn new(columns: u16, rows: u16) -> (Self, Arc<Mutex<TerminalTrace>>) {
        let state = Arc::new(Mutex::new(TerminalTrace::default()));
        (
            Self {
                state: Arc::clone(&state),
                columns,
                rows,
            },
            state,
        )
    }
}

impl Terminal for SharedTerminal {
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> std::io::Result<()> {
        let mut state = lock_unpoisoned(&self.state);
        state.start_calls += 1;
        state.on_input = Some(on_input);
        state.on_resize = Some(on_resize);
        Ok(())
    }

    fn stop(&mut self) -> std::io::Result<()> {
        let mut state = lock_unpoisoned(&self.state);
        state.stop_calls += 1;
        state.writes_at_stop = Some(state.writes.len());
        Ok(())
    }

    fn drain_input(&mut self, max_ms: u64, idle_ms: u64) {
        let mut state = lock_unpoisoned(&self.state);
        state.drain_calls.push((max_ms, idle_ms));
    }

    fn write(&mut self, data: &str) {
        let mut state = lock_unpoisoned(&self.state);
        state.writes.push(data.to_string());
    }

    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }
}

pub fn inject_input(state: &Arc<Mutex<TerminalTrace>>, data: &str) {
    let mut state = lock_unpoisoned(state);
    let Some(on_input) = state.on_input.as_mut() else {
        panic!("terminal input handler is not registered");
    };

    on_input(data.to_string());
}

pub fn rendered_output(state: &Arc<Mutex<TerminalTrace>>) -> String {
    lock_unpoisoned(state).writes.join("")
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    CreateOperation {
        recipe_path: String,
        project_root: String,
    },
    SendEvent {
        event: String,
        input: Option<Value>,
    },
    Shutdown(Outcome),
}

#[derive(Default)]
pub struct HostSpy {
    pub calls: Vec<HostCall>,
    pub render_requests: usize,
}

impl HostSpy {
    pub fn sent_events(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::SendEvent { event, .. } => Some(event.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn created_operations(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::CreateOperation { recipe_path, .. } => Some(recipe_path.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn shutdowns(&self) -> Vec<Outcome> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Shutdown(outcome) => Some(*outcome),
                _ => None,
            })
            .collect()
    }
}

impl HostOps for HostSpy {
    fn create_operation(&mut self, recipe_path: &str, project_root: &str) {
        self.calls.push(HostCall::CreateOperation {
            recipe_path: recipe_path.to_string(),
            project_root: project_root.to_string(),
        });
    }

    fn send_event(&mut self, event: &str, input: Option<Value>) {
        self.calls.push(HostCall::SendEvent {
            event: event.to_string(),
            input,
        });
    }

    fn request_render(&mut self) {
        self.render_requests += 1;
    }

    fn schedule_shutdown(&mut self, outcome: Outcome) {
        self.calls.push(HostCall::Shutdown(outcome));
    }
}

/// Records the variables of every request and answers with `null` data.
#[derive(Default, Clone)]
pub struct RecordingTransport {
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl RecordingTransport {
    pub fn variables(&self) -> Vec<Value> {
        lock_unpoisoned(&self.requests)
            .iter()
            .map(|request| request["variables"].clone())
            .collect()
    }
}

impl CallTransport for RecordingTransport {
    fn call(&self, request: GraphqlRequest) -> BoxFuture<'static, Result<Value, TransportError>> {
        let encoded = serde_json::to_value(&request).unwrap_or(Value::Null);
        lock_unpoisoned(&self.requests).push(encoded);
        Box::pin(async { Ok(Value::Null) })
    }
}

pub fn snapshot(phase: &str, context: Value) -> String {
    json!({ "value": phase, "context": context }).to_string()
}

pub fn plan_context() -> Value {
    json!({
        "plan": [
            {
                "resourceName": "NPMPackage",
                "describe": "Install jest",
                "_key": "jest",
                "isDone": false
            },
            {
                "resourceName": "Input",
                "describe": "Project name",
                "_key": "name"
            }
        ],
        "steps": ["# Add Jest\n\n<NPMPackage _key=\"jest\" />"],
        "exports": []
    })
}

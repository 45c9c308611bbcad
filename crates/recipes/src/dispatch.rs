//! Commands sent back to the remote executor.

use std::sync::Arc;

use recipes_transport::payload;
use recipes_transport::{CallTransport, GraphqlRequest};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Event that advances the executor past its current phase.
pub const CONTINUE_EVENT: &str = "CONTINUE";

/// Fire-and-forget sender for executor mutations.
///
/// Every call runs on its own task. Failures are logged and dropped; nothing
/// is retried.
#[derive(Clone)]
pub struct EventDispatcher {
    transport: Arc<dyn CallTransport>,
}

impl EventDispatcher {
    pub fn new(transport: Arc<dyn CallTransport>) -> Self {
        Self { transport }
    }

    /// Sends `event`. When `input` is given it travels JSON-encoded in the
    /// `input` variable; otherwise the variable is left out.
    pub fn send_event<T>(&self, event: &str, input: Option<&T>) -> Option<JoinHandle<()>>
    where
        T: Serialize + ?Sized,
    {
        let input = match input.map(serde_json::to_string).transpose() {
            Ok(input) => input,
            Err(err) => {
                warn!(%err, event, "failed to encode event input");
                return None;
            }
        };
        Some(self.dispatch("sendEvent", payload::send_event(event, input)))
    }

    pub fn create_operation(&self, recipe_path: &str, project_root: &str) -> JoinHandle<()> {
        self.dispatch(
            "createOperation",
            payload::create_operation(recipe_path, project_root),
        )
    }

    fn dispatch(&self, label: &'static str, request: GraphqlRequest) -> JoinHandle<()> {
        let call = self.transport.call(request);
        tokio::spawn(async move {
            match call.await {
                Ok(_) => debug!(mutation = label, "mutation accepted"),
                Err(err) => warn!(%err, mutation = label, "mutation failed"),
            }
        })
    }
}

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::payload::GraphqlRequest;
use crate::protocol::{ClientMessage, ServerMessage, SUBPROTOCOL};
use crate::retry::reconnect_delay;

const SUBSCRIPTION_ID: &str = "1";
const CLOSE_GRACE: Duration = Duration::from_millis(250);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Events forwarded from the subscription task to its consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The server acknowledged a (re)connection.
    Connected,
    /// Raw `operation.state` payload from a `data` message.
    Snapshot(String),
    Disconnected { reason: String },
}

/// Owner of the background subscription task.
///
/// Dropping the handle aborts the task; [`SubscriptionHandle::close`] first
/// gives it a chance to send `connection_terminate`.
#[derive(Debug)]
pub struct SubscriptionHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn spawn(
        config: TransportConfig,
        request: GraphqlRequest,
    ) -> (Self, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(config, request, events_tx, shutdown_rx));
        (
            Self {
                shutdown: Some(shutdown_tx),
                task,
            },
            events_rx,
        )
    }

    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if tokio::time::timeout(CLOSE_GRACE, &mut self.task).await.is_err() {
            debug!("subscription task did not stop within grace period");
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Shutdown,
    Lost(String),
}

async fn run(
    config: TransportConfig,
    request: GraphqlRequest,
    events: mpsc::UnboundedSender<ChannelEvent>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let url = config.ws_url();
    let mut attempt = 0u32;

    loop {
        let reason = match run_session(&url, &request, &events, &mut shutdown, &mut attempt).await
        {
            SessionEnd::Shutdown => return,
            SessionEnd::Lost(reason) => reason,
        };

        warn!(%url, %reason, "subscription connection lost");
        if events
            .send(ChannelEvent::Disconnected {
                reason: reason.clone(),
            })
            .is_err()
        {
            return;
        }

        let delay = reconnect_delay(attempt);
        attempt = attempt.saturating_add(1);
        tokio::select! {
            _ = &mut shutdown => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

async fn run_session(
    url: &str,
    request: &GraphqlRequest,
    events: &mpsc::UnboundedSender<ChannelEvent>,
    shutdown: &mut oneshot::Receiver<()>,
    attempt: &mut u32,
) -> SessionEnd {
    let connect = tokio::select! {
        _ = &mut *shutdown => return SessionEnd::Shutdown,
        connect = connect(url) => connect,
    };
    let mut socket = match connect {
        Ok(socket) => socket,
        Err(error) => return SessionEnd::Lost(error.to_string()),
    };

    if let Err(error) = send(&mut socket, &ClientMessage::connection_init()).await {
        return SessionEnd::Lost(error.to_string());
    }

    loop {
        let message = tokio::select! {
            _ = &mut *shutdown => {
                let _ = send(&mut socket, &ClientMessage::ConnectionTerminate).await;
                let _ = socket.close(None).await;
                return SessionEnd::Shutdown;
            }
            message = socket.next() => message,
        };

        let text = match message {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) | None => {
                return SessionEnd::Lost("connection closed".to_string())
            }
            Some(Ok(_)) => continue,
            Some(Err(error)) => return SessionEnd::Lost(TransportError::from(error).to_string()),
        };

        let message = match ServerMessage::parse(&text) {
            Ok(message) => message,
            Err(error) => {
                warn!(%error, "ignoring unparseable subscription message");
                continue;
            }
        };

        match message {
            ServerMessage::ConnectionAck { .. } => {
                info!(%url, "subscription connected");
                *attempt = 0;
                if events.send(ChannelEvent::Connected).is_err() {
                    return SessionEnd::Shutdown;
                }
                let start = ClientMessage::Start {
                    id: SUBSCRIPTION_ID.to_string(),
                    payload: request.clone(),
                };
                if let Err(error) = send(&mut socket, &start).await {
                    return SessionEnd::Lost(error.to_string());
                }
            }
            ServerMessage::KeepAlive => {}
            ServerMessage::Data { payload, .. } => {
                if let Some(state) = payload.operation_state() {
                    if events
                        .send(ChannelEvent::Snapshot(state.to_string()))
                        .is_err()
                    {
                        return SessionEnd::Shutdown;
                    }
                } else if !payload.errors.is_empty() {
                    warn!(errors = ?payload.error_messages(), "subscription data carried errors");
                } else {
                    debug!("subscription data without operation state");
                }
            }
            ServerMessage::Error { id, payload } => {
                warn!(%id, ?payload, "subscription error");
            }
            ServerMessage::Complete { id } => {
                return SessionEnd::Lost(format!("subscription {id} completed by server"));
            }
            ServerMessage::ConnectionError { payload } => {
                let detail = payload.map(|value| value.to_string()).unwrap_or_default();
                return SessionEnd::Lost(
                    TransportError::Protocol(format!("connection rejected {detail}"))
                        .to_string(),
                );
            }
        }
    }
}

async fn connect(url: &str) -> Result<Socket, TransportError> {
    let mut request = url.into_client_request()?;
    request
        .headers_mut()
        .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));
    let (socket, _) = connect_async(request).await?;
    Ok(socket)
}

async fn send(socket: &mut Socket, message: &ClientMessage) -> Result<(), TransportError> {
    socket.send(Message::Text(message.to_text()?)).await?;
    Ok(())
}

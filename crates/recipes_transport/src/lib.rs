//! GraphQL transport for the recipes client.
//!
//! Two paths share one [`TransportConfig`]:
//! - [`TransportClient::call`] issues a single HTTP POST per request and maps a
//!   non-empty GraphQL `errors` array onto [`TransportError::Graphql`].
//! - [`SubscriptionHandle::spawn`] keeps a `graphql-ws` websocket subscription
//!   alive in a background task, reconnecting with exponential backoff and
//!   forwarding each operation snapshot as a [`ChannelEvent`].
//!
//! The crate holds no UI state; callers decide what a snapshot means.

pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod protocol;
pub mod retry;
pub mod subscription;

pub use client::{CallTransport, TransportClient};
pub use config::TransportConfig;
pub use error::TransportError;
pub use payload::{GraphqlRequest, GraphqlResponse};
pub use subscription::{ChannelEvent, SubscriptionHandle};

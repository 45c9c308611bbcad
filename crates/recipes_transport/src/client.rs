use futures_util::future::BoxFuture;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::TransportConfig;
use crate::error::{parse_error_message, TransportError};
use crate::payload::{GraphqlRequest, GraphqlResponse};

/// Request/response half of the transport. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TransportClient {
    http: Client,
    config: TransportConfig,
}

impl TransportClient {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(TransportError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn endpoint(&self) -> String {
        self.config.http_url()
    }

    pub fn build_request(&self, request: &GraphqlRequest) -> reqwest::RequestBuilder {
        let builder = self.http.post(self.endpoint()).json(request);
        match self.config.user_agent.as_deref() {
            Some(user_agent) => builder.header(USER_AGENT, user_agent),
            None => builder,
        }
    }

    /// Sends one GraphQL request and returns its `data` member.
    ///
    /// A response carrying a non-empty `errors` array is a failure even when
    /// the HTTP status is a success. No retries are attempted.
    pub async fn call(&self, request: &GraphqlRequest) -> Result<Value, TransportError> {
        let response = self.build_request(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status(
                status,
                parse_error_message(status, &body),
            ));
        }

        let parsed: GraphqlResponse = serde_json::from_str(&body)?;
        if !parsed.errors.is_empty() {
            return Err(TransportError::Graphql(parsed.error_messages()));
        }

        debug!(endpoint = %self.endpoint(), "graphql call completed");
        Ok(parsed.data.unwrap_or(Value::Null))
    }
}

/// Seam over [`TransportClient::call`] so dispatchers can run against fakes.
pub trait CallTransport: Send + Sync {
    fn call(&self, request: GraphqlRequest) -> BoxFuture<'static, Result<Value, TransportError>>;
}

impl CallTransport for TransportClient {
    fn call(&self, request: GraphqlRequest) -> BoxFuture<'static, Result<Value, TransportError>> {
        let client = self.clone();
        Box::pin(async move { TransportClient::call(&client, &request).await })
    }
}

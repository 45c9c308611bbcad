use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 50400;
pub const DEFAULT_PATH: &str = "/graphql";

/// Endpoint and HTTP settings shared by calls and the subscription socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Host of the recipes GraphQL server.
    pub host: String,
    pub port: u16,
    /// Path of the GraphQL endpoint, shared by HTTP and websocket.
    pub path: String,
    /// Optional per-request timeout for HTTP calls.
    pub timeout: Option<Duration>,
    /// Optional `User-Agent` override for HTTP calls.
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            timeout: None,
            user_agent: None,
        }
    }
}

impl TransportConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn http_url(&self) -> String {
        self.url_with_scheme("http")
    }

    pub fn ws_url(&self) -> String {
        self.url_with_scheme("ws")
    }

    fn url_with_scheme(&self, scheme: &str) -> String {
        let path = self.path.trim();
        let separator = if path.starts_with('/') { "" } else { "/" };
        format!("{scheme}://{}:{}{separator}{path}", self.host.trim(), self.port)
    }
}

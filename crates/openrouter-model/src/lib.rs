//! A model provider for the OpenRouter chat completions API.

#[macro_use]
extern crate tracing;

mod config;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use gonepal_model::{
    ChatCompletion, ErrorKind, ModelProvider, ModelProviderError, ModelRequest,
};
use reqwest::{Client, RequestBuilder, header};

pub use config::{
    API_KEY_VARS, DEFAULT_APP_TITLE, DEFAULT_BASE_URL, DEFAULT_MODEL,
    DEFAULT_SITE_URL, OpenRouterConfig, OpenRouterConfigBuilder,
};

/// Error type for [`OpenRouterProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    #[inline]
    fn transport(err: reqwest::Error) -> Self {
        Self::new(format!("{err}"), ErrorKind::Transport)
    }

    /// Returns the error message.
    ///
    /// For a remote rejection this is the `error.message` the service sent,
    /// or the HTTP status text when the body carried none.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// OpenRouter model provider.
#[derive(Clone, Debug)]
pub struct OpenRouterProvider {
    client: Client,
    config: Arc<OpenRouterConfig>,
}

impl OpenRouterProvider {
    /// Creates a new `OpenRouterProvider` with the given configuration.
    #[inline]
    pub fn new(config: OpenRouterConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Creates a provider configured from the process environment.
    ///
    /// Fails with [`ErrorKind::Configuration`] when no API key is set.
    #[inline]
    pub fn from_env() -> Result<Self, Error> {
        let config = OpenRouterConfigBuilder::from_env().build()?;
        Ok(Self::new(config))
    }

    /// Returns the configuration of this provider.
    #[inline]
    pub fn config(&self) -> &OpenRouterConfig {
        &self.config
    }

    fn build_request(&self, req: &ModelRequest) -> RequestBuilder {
        let body = proto::create_request(req, &self.config);
        self.client
            .post(self.config.completions_url())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header("HTTP-Referer", &self.config.site_url)
            .header("X-Title", &self.config.app_title)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
    }
}

impl ModelProvider for OpenRouterProvider {
    type Error = Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ChatCompletion, Self::Error>> + Send + 'static
    {
        let message_count = req.messages.len();
        let model = self.config.model.clone();
        let resp_fut = self.build_request(req).send();

        async move {
            debug!("sending {message_count} messages to {model}");
            let resp = resp_fut.await.map_err(Error::transport)?;
            let status = resp.status();
            let body = resp.bytes().await.map_err(Error::transport)?;
            trace!("got response: {status}, {} bytes", body.len());

            response::interpret(status, &body)
        }
    }
}

#[cfg(test)]
mod tests {
    use gonepal_model::Message;
    use serde_json::{Value, json};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    fn provider_at(base_url: &str) -> OpenRouterProvider {
        let config = OpenRouterConfigBuilder::with_api_key("sk-or-xxx")
            .with_base_url(base_url)
            .build()
            .unwrap();
        OpenRouterProvider {
            client: Client::builder().no_proxy().build().unwrap(),
            config: Arc::new(config),
        }
    }

    /// Answers a single request on a local port and hands back the raw
    /// request it received.
    async fn serve_once(
        status_line: &'static str,
        body: &'static [u8],
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/api/v1", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                if n == 0 || is_request_complete(&raw) {
                    break;
                }
            }
            let head = format!(
                "HTTP/1.1 {status_line}\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).await.unwrap();
            stream.write_all(body).await.unwrap();
            stream.shutdown().await.ok();
            String::from_utf8(raw).unwrap()
        });
        (base_url, handle)
    }

    fn is_request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if !name.eq_ignore_ascii_case("content-length") {
                    return None;
                }
                value.trim().parse::<usize>().ok()
            })
            .unwrap_or(0);
        body.len() >= length
    }

    #[tokio::test]
    async fn test_send_request() {
        let (base_url, server) = serve_once(
            "200 OK",
            include_bytes!("../fixtures/completion_response.json"),
        )
        .await;
        let provider = provider_at(&base_url);
        let req = ModelRequest::with_messages([Message::user("Plan my day")]);

        let completion = provider.send_request(&req).await.unwrap();
        assert!(
            completion
                .first_content()
                .unwrap()
                .starts_with("# Day 1: Kathmandu")
        );

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/v1/chat/completions HTTP/1.1"));
        let lowered = raw.to_ascii_lowercase();
        assert!(lowered.contains("authorization: bearer sk-or-xxx"));
        assert!(lowered.contains("x-title: ai travel assistant"));
        assert!(raw.contains("Plan my day"));
    }

    #[tokio::test]
    async fn test_send_request_rejected() {
        let (base_url, server) = serve_once(
            "429 Too Many Requests",
            include_bytes!("../fixtures/rate_limited.json"),
        )
        .await;
        let provider = provider_at(&base_url);

        let err = provider
            .send_request(&ModelRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.message(), "rate limited");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_request_unreachable() {
        // Nothing listens on a port that was just released.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let provider = provider_at(&format!("http://127.0.0.1:{port}"));

        let err = provider
            .send_request(&ModelRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_request_shape() {
        let config = OpenRouterConfigBuilder::with_api_key("sk-or-xxx")
            .with_site_url("https://gonepal.example")
            .build()
            .unwrap();
        let provider = OpenRouterProvider::new(config);
        let req = ModelRequest::with_messages([
            Message::system("You are GoNepal."),
            Message::user("Best time for Annapurna?"),
        ]);

        let request = provider.build_request(&req).build().unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://openrouter.ai/api/v1/chat/completions"
        );

        let headers = request.headers();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer sk-or-xxx");
        assert_eq!(headers["HTTP-Referer"], "https://gonepal.example");
        assert_eq!(headers["X-Title"], DEFAULT_APP_TITLE);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers.get_all(header::CONTENT_TYPE).iter().count(), 1);

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let body: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(
            body,
            json!({
                "model": DEFAULT_MODEL,
                "messages": [
                    { "role": "system", "content": "You are GoNepal." },
                    { "role": "user", "content": "Best time for Annapurna?" }
                ]
            })
        );
    }

    #[test]
    fn test_provider_requires_key() {
        // Without a credential there is no config, hence no provider and no
        // request to send.
        let err = OpenRouterConfigBuilder::new()
            .with_model(DEFAULT_MODEL)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}

//! A local fake model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gonepal_model::{
    ChatCompletion, ErrorKind, ModelProvider, ModelProviderError, ModelRequest,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Shared {
    script: VecDeque<PresetResponse>,
    requests: Vec<ModelRequest>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, push the outcomes the provider should produce,
/// one per request, in order. Every request is recorded before its outcome
/// is produced, so tests can assert on exactly what would have gone over
/// the wire, and on how many requests were made at all. A request beyond
/// the end of the script fails with [`ErrorKind::Remote`].
///
/// Clones share the same script and request log.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    shared: Arc<Mutex<Shared>>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    /// Appends an outcome to the script.
    #[inline]
    pub fn push_response(&self, preset: PresetResponse) {
        self.lock().script.push_back(preset);
    }

    /// Appends a successful reply to the script.
    #[inline]
    pub fn push_reply<S: Into<String>>(&self, content: S) {
        self.push_response(PresetResponse::reply(content));
    }

    /// Appends a failure to the script.
    #[inline]
    pub fn push_failure<S: Into<String>>(&self, kind: ErrorKind, message: S) {
        self.push_response(PresetResponse::failure(kind, message));
    }

    /// Delays every outcome by `duration`.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns all requests received so far, oldest first.
    #[inline]
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.lock().requests.clone()
    }

    /// Returns how many requests were received.
    #[inline]
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Returns the most recent request.
    #[inline]
    pub fn last_request(&self) -> Option<ModelRequest> {
        self.lock().requests.last().cloned()
    }

    #[inline]
    fn lock(&self) -> std::sync::MutexGuard<'_, Shared> {
        // A panicking test thread must not hide the log from the others.
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ChatCompletion, Self::Error>> + Send + 'static
    {
        let preset = {
            let mut shared = self.lock();
            shared.requests.push(req.clone());
            shared.script.pop_front()
        };
        let delay = self.delay;

        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            match preset {
                Some(PresetResponse::Reply(content)) => {
                    Ok(ChatCompletion::with_content(content))
                }
                Some(PresetResponse::Empty) => {
                    Ok(ChatCompletion { choices: vec![] })
                }
                Some(PresetResponse::Failure(failure)) => Err(Error {
                    message: failure.message,
                    kind: failure.kind,
                }),
                Some(PresetResponse::Panic) => {
                    panic!("the script asked the provider to panic")
                }
                None => Err(Error {
                    message: "no enough steps".to_owned(),
                    kind: ErrorKind::Remote,
                }),
            }
        }
    }
}

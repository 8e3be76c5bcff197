mod builder;

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};

use gonepal_model::{ErrorKind, Message, ModelProviderError, ModelRequest};

pub use builder::ChatWidgetBuilder;

use crate::conversation::Transcript;
use crate::lock;
use crate::model_client::{ModelClient, ModelClientResponse};
use crate::stage::Stage;

/// The assistant message appended in place of a reply when a request
/// fails for any reason.
pub const APOLOGY_MESSAGE: &str =
    "Sorry, I encountered an error. Please check the logs.";

/// The persona sent as the system prompt unless replaced.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    include_str!("prompts/chat_system_prompt.md");

/// Why a submission was not sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmitError {
    /// The input is empty or only whitespace.
    Empty,
    /// Another submission of this widget is still in flight.
    Busy,
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Empty => write!(f, "nothing to send"),
            SubmitError::Busy => write!(f, "a message is already being sent"),
        }
    }
}

impl StdError for SubmitError {}

/// The assistant message a submission ended with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    /// The message appended to the transcript.
    pub message: Message,
    /// Set when the message is the apology standing in for a failed
    /// request.
    pub error: Option<ErrorKind>,
}

impl Reply {
    /// Returns `true` if the request failed.
    #[inline]
    pub fn is_apology(&self) -> bool {
        self.error.is_some()
    }
}

struct ChatState {
    transcript: Transcript,
    system_prompt: String,
    stage: Stage,
}

impl ChatState {
    fn build_model_request(&self) -> ModelRequest {
        let system = (!self.system_prompt.is_empty())
            .then(|| Message::system(self.system_prompt.clone()));
        ModelRequest {
            messages: system
                .into_iter()
                .chain(self.transcript.iter().cloned())
                .collect(),
        }
    }

    fn complete(
        &mut self,
        result: Result<ModelClientResponse, Box<dyn ModelProviderError>>,
    ) -> Reply {
        let reply = match result {
            Ok(resp) => Reply {
                message: Message::assistant(resp.content),
                error: None,
            },
            Err(err) => {
                debug!("chat request failed: {err}");
                Reply {
                    message: Message::assistant(APOLOGY_MESSAGE),
                    error: Some(err.kind()),
                }
            }
        };
        self.transcript.push(reply.message.clone());
        self.stage.finish(reply.error.is_none());
        reply
    }
}

/// A chat session, like a floating panel that displays messages and has an
/// input box.
///
/// The widget owns a transcript that only grows, and a system prompt that
/// can be replaced at any time and applies from the next submission on.
/// Clones share the same session.
///
/// At most one submission is in flight per widget: a second [`submit`]
/// while the first is outstanding is rejected with [`SubmitError::Busy`].
/// Separate widgets are fully independent.
///
/// [`submit`]: ChatWidget::submit
#[derive(Clone)]
pub struct ChatWidget {
    model_client: ModelClient,
    state: Arc<Mutex<ChatState>>,
}

impl ChatWidget {
    fn from_builder(builder: ChatWidgetBuilder) -> Self {
        let ChatWidgetBuilder {
            model_client,
            system_prompt,
        } = builder;
        let state = ChatState {
            transcript: Default::default(),
            system_prompt,
            stage: Default::default(),
        };
        Self {
            model_client,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Sends `input` as a user message together with the system prompt and
    /// the whole transcript, and appends the assistant's reply.
    ///
    /// Empty input and submissions while busy leave the transcript alone
    /// and never reach the model. Any request failure is turned into the
    /// [`APOLOGY_MESSAGE`] reply.
    ///
    /// The request runs on its own task: dropping the returned future does
    /// not abort it, and its reply is still appended.
    pub async fn submit<S: Into<String>>(
        &self,
        input: S,
    ) -> Result<Reply, SubmitError> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(SubmitError::Empty);
        }

        let request = {
            let mut state = self.lock();
            if state.stage.try_begin_send().is_err() {
                debug!("rejected a submission while sending");
                return Err(SubmitError::Busy);
            }
            state.transcript.push(Message::user(input));
            state.build_model_request()
        };

        let model_client = self.model_client.clone();
        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            let result = model_client.send_request(request).await;
            lock(&state).complete(result)
        });
        Ok(task.await.expect("chat request task has panicked"))
    }

    /// Replaces the system prompt. Messages already sent are unaffected.
    ///
    /// An empty prompt means no system message is sent at all.
    #[inline]
    pub fn set_system_prompt<S: Into<String>>(&self, prompt: S) {
        self.lock().system_prompt = prompt.into();
    }

    /// Returns the current system prompt.
    #[inline]
    pub fn system_prompt(&self) -> String {
        self.lock().system_prompt.clone()
    }

    /// Returns a snapshot of the transcript.
    #[inline]
    pub fn transcript(&self) -> Transcript {
        self.lock().transcript.clone()
    }

    /// Returns the current stage.
    #[inline]
    pub fn stage(&self) -> Stage {
        self.lock().stage
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, ChatState> {
        lock(&self.state)
    }
}

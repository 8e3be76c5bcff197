use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::pin::Pin;
use std::sync::Arc;

use gonepal_model::{
    ChatCompletion, ErrorKind, ModelProvider, ModelProviderError, ModelRequest,
};
use tracing::Instrument;

type SendRequestResult =
    Result<ModelClientResponse, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn = Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// A wrapper around a model provider that provides a type-erased
/// interface for the widgets.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since the widgets don't have a
        // generic parameter and we don't want them either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    let resp_or_err = fut.await;
                    handle_response::<P>(resp_or_err)
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and returns the first choice of the response.
    ///
    /// The provider runs on its own task. If it panics, the request fails
    /// with [`ErrorKind::InvalidResponse`] like any other bad response.
    pub async fn send_request(&self, req: ModelRequest) -> SendRequestResult {
        let handler_fn = Arc::clone(&self.handler_fn);
        match tokio::spawn(async move { handler_fn(req).await }).await {
            Ok(result) => result,
            Err(err) => {
                error!("model request has panicked: {err}");
                Err(Box::new(PanickedError))
            }
        }
    }
}

/// A completely received response from the model client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelClientResponse {
    /// Content of the first choice, verbatim.
    pub content: String,
    /// How many choices the service returned. Only the first is used.
    pub choice_count: usize,
}

/// A success response without any choice.
#[derive(Debug)]
struct NoChoiceError;

impl Display for NoChoiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "the completion has no choices")
    }
}

impl StdError for NoChoiceError {}

impl ModelProviderError for NoChoiceError {
    #[inline]
    fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidResponse
    }
}

/// The provider panicked before producing a response.
#[derive(Debug)]
struct PanickedError;

impl Display for PanickedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "the model request has panicked")
    }
}

impl StdError for PanickedError {}

impl ModelProviderError for PanickedError {
    #[inline]
    fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidResponse
    }
}

fn handle_response<P: ModelProvider + 'static>(
    resp_or_err: Result<ChatCompletion, P::Error>,
) -> SendRequestResult {
    let resp = match resp_or_err {
        Ok(resp) => resp,
        Err(err) => {
            error!("got an error ({}): {err}", err.kind());
            return Err(Box::new(err));
        }
    };

    let choice_count = resp.choices.len();
    if choice_count > 1 {
        debug!("ignoring {} extra choices", choice_count - 1);
    }
    let Some(content) = resp.into_first_content() else {
        error!("got a completion without choices");
        return Err(Box::new(NoChoiceError));
    };

    trace!("finished a request");

    Ok(ModelClientResponse {
        content,
        choice_count,
    })
}

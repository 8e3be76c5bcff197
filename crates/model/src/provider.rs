use std::error::Error;

use crate::error::ErrorKind;
use crate::request::ModelRequest;
use crate::response::ChatCompletion;

/// The error type for a model provider.
pub trait ModelProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a model provider, which is the entry for sending
/// a transcript to a completion service.
///
/// Once the provider is created, it should behave like a stateless object.
/// Creating a provider is the point where configuration problems must be
/// reported, so that `send_request` never starts with a missing credential.
pub trait ModelProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Sends the whole transcript as one request and resolves the decoded
    /// completion, unmodified.
    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ChatCompletion, Self::Error>> + Send + 'static;
}

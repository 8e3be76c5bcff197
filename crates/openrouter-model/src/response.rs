use gonepal_model::{ChatCompletion, ErrorKind};
use reqwest::StatusCode;

use crate::Error;
use crate::proto::ErrorResponse;

/// Turns a received status and body into a completion or an error.
///
/// A non-success status is a remote rejection: its message is the
/// `error.message` from the body when the body parses and carries one,
/// otherwise the status text. A success status must carry a completion.
pub fn interpret(status: StatusCode, body: &[u8]) -> Result<ChatCompletion, Error> {
    if !status.is_success() {
        let server_message = serde_json::from_slice::<ErrorResponse>(body)
            .ok()
            .and_then(|resp| resp.message().map(ToOwned::to_owned));
        let message = server_message.unwrap_or_else(|| status_text(status));
        warn!("request rejected with {status}: {message}");
        return Err(Error::new(message, ErrorKind::Remote));
    }

    serde_json::from_slice::<ChatCompletion>(body).map_err(|err| {
        Error::new(
            format!("malformed completion: {err}"),
            ErrorKind::InvalidResponse,
        )
    })
}

#[inline]
fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| status.as_str().to_owned())
}

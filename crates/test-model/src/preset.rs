use gonepal_model::ErrorKind;
use serde::{Deserialize, Serialize};

/// The preset outcome of one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetResponse {
    /// Answer with a single choice carrying this content.
    #[serde(rename = "reply")]
    Reply(String),
    /// Answer with a completion that has no choices.
    #[serde(rename = "empty")]
    Empty,
    /// Fail the request.
    #[serde(rename = "failure")]
    Failure(PresetFailure),
    /// Panic while producing the outcome.
    #[serde(rename = "panic")]
    Panic,
}

/// A preset error.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetFailure {
    /// How the failure should be classified.
    #[serde(with = "kind_name")]
    pub kind: ErrorKind,
    /// The surfaced message.
    pub message: String,
}

impl PresetResponse {
    /// Creates a reply preset.
    #[inline]
    pub fn reply<S: Into<String>>(content: S) -> Self {
        Self::Reply(content.into())
    }

    /// Creates a failure preset.
    #[inline]
    pub fn failure<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self::Failure(PresetFailure {
            kind,
            message: message.into(),
        })
    }
}

mod kind_name {
    use gonepal_model::ErrorKind;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        kind: &ErrorKind,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match kind {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Remote => "remote",
            ErrorKind::Transport => "transport",
            ErrorKind::InvalidResponse => "invalid_response",
        })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<ErrorKind, D::Error> {
        let name = String::deserialize(deserializer)?;
        match name.as_str() {
            "configuration" => Ok(ErrorKind::Configuration),
            "remote" => Ok(ErrorKind::Remote),
            "transport" => Ok(ErrorKind::Transport),
            "invalid_response" => Ok(ErrorKind::InvalidResponse),
            other => Err(D::Error::custom(format!("unknown kind: {other}"))),
        }
    }
}

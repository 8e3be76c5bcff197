use serde::{Deserialize, Serialize};

/// A completion returned by the service.
///
/// Only `choices` is modelled; other fields the service may send (ids,
/// usage, provider names) are ignored when decoding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// Candidate replies, in the order the service returned them.
    pub choices: Vec<Choice>,
}

/// One candidate reply.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice {
    /// The reply message.
    pub message: ChoiceMessage,
}

/// The message inside a [`Choice`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChoiceMessage {
    /// The reply text, usually markdown.
    pub content: String,
}

impl ChatCompletion {
    /// Creates a completion with a single choice.
    #[inline]
    pub fn with_content<S: Into<String>>(content: S) -> Self {
        Self {
            choices: vec![Choice {
                message: ChoiceMessage {
                    content: content.into(),
                },
            }],
        }
    }

    /// Returns the content of the first choice, which is the only one
    /// consumers look at.
    #[inline]
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
    }

    /// Consumes the completion and returns the first choice's content.
    #[inline]
    pub fn into_first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
    }
}

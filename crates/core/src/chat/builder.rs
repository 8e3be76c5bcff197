use gonepal_model::ModelProvider;

use super::{ChatWidget, DEFAULT_SYSTEM_PROMPT};
use crate::model_client::ModelClient;

/// [`ChatWidget`] builder.
pub struct ChatWidgetBuilder {
    pub(crate) model_client: ModelClient,
    pub(crate) system_prompt: String,
}

impl ChatWidgetBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
        }
    }

    /// Sets the initial system prompt.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Builds the widget.
    #[inline]
    pub fn build(self) -> ChatWidget {
        ChatWidget::from_builder(self)
    }
}

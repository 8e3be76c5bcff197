use gonepal_core::{ChatWidget, ChatWidgetBuilder, Planner};
use gonepal_model::ModelProvider;
use gonepal_openrouter_model::{Error as OpenRouterError, OpenRouterProvider};

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    chat_builder: ChatWidgetBuilder,
    planner: Planner,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    ///
    /// The chat widget and the planner each get a clone of the provider.
    pub fn with_model_provider<M: ModelProvider + Clone + 'static>(
        provider: M,
    ) -> Self {
        let planner = Planner::with_model_provider(provider.clone());
        let chat_builder = ChatWidgetBuilder::with_model_provider(provider);
        Self {
            chat_builder,
            planner,
        }
    }

    /// Sets the initial system prompt of the chat widget.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.chat_builder = self.chat_builder.with_system_prompt(prompt);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Session {
        Session {
            chat: self.chat_builder.build(),
            planner: self.planner,
        }
    }
}

/// Everything the assistant page hosts: one chat widget and one planner.
///
/// The two never share a transcript or a stage, so a chat message can be
/// sent while a plan is being prepared.
pub struct Session {
    chat: ChatWidget,
    planner: Planner,
}

impl Session {
    /// Creates a session talking to OpenRouter, configured from the process
    /// environment.
    pub fn from_env() -> Result<Self, OpenRouterError> {
        let provider = OpenRouterProvider::from_env()?;
        debug!("using model {}", provider.config().model());
        Ok(SessionBuilder::with_model_provider(provider).build())
    }

    /// Returns the chat widget.
    #[inline]
    pub fn chat(&self) -> &ChatWidget {
        &self.chat
    }

    /// Returns the itinerary planner.
    #[inline]
    pub fn planner(&self) -> &Planner {
        &self.planner
    }
}

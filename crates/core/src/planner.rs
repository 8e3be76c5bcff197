//! The itinerary planner.
//!
//! Unlike the chat widget, the planner never keeps a conversation. Every
//! request is exactly a system persona plus one user prompt: either built
//! from the trip selections, or a refinement that quotes the latest
//! itinerary.

mod choices;
mod prompt;
#[cfg(test)]
mod tests;

use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex};

use gonepal_model::{Message, ModelProvider, ModelProviderError, ModelRequest};

pub use choices::{
    Budget, Difficulty, Interest, Refinement, TripDuration, TripPreferences,
    UnknownChoice,
};
pub use prompt::{initial_prompt, refinement_prompt};

use crate::lock;
use crate::model_client::ModelClient;
use crate::stage::Stage;

/// The persona sent with every planner request.
pub const PLANNER_SYSTEM_PROMPT: &str =
    include_str!("prompts/planner_system_prompt.md");

/// Why the planner did not produce an itinerary.
pub enum PlanError {
    /// No interest is selected.
    MissingInterest,
    /// No duration is selected.
    MissingDuration,
    /// A refinement was asked for before any itinerary exists.
    NoItinerary,
    /// Another request of this planner is still in flight.
    Busy,
    /// The request failed. The previous itinerary is kept.
    Request(Box<dyn ModelProviderError>),
}

impl Debug for PlanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::MissingInterest => write!(f, "MissingInterest"),
            PlanError::MissingDuration => write!(f, "MissingDuration"),
            PlanError::NoItinerary => write!(f, "NoItinerary"),
            PlanError::Busy => write!(f, "Busy"),
            PlanError::Request(err) => f
                .debug_struct("Request")
                .field("kind", &err.kind())
                .field("message", &err.to_string())
                .finish(),
        }
    }
}

impl Display for PlanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::MissingInterest => write!(f, "select an interest first"),
            PlanError::MissingDuration => write!(f, "select a duration first"),
            PlanError::NoItinerary => write!(f, "there is no plan to refine"),
            PlanError::Busy => write!(f, "a plan is already being prepared"),
            PlanError::Request(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PlanError {}

#[derive(Default)]
struct PlannerState {
    preferences: TripPreferences,
    itinerary: Option<String>,
    pending_refinement: Option<Refinement>,
    stage: Stage,
}

/// A trip planner, like the planner section of the page: a set of
/// selections, a button to plan, and refinement buttons once a plan
/// exists.
///
/// Clones share the same planner. At most one request is in flight per
/// planner.
#[derive(Clone)]
pub struct Planner {
    model_client: ModelClient,
    state: Arc<Mutex<PlannerState>>,
}

impl Planner {
    /// Creates a planner with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            state: Default::default(),
        }
    }

    /// Returns the current selections.
    #[inline]
    pub fn preferences(&self) -> TripPreferences {
        lock(&self.state).preferences
    }

    /// Changes the selections in place.
    #[inline]
    pub fn update_preferences(&self, f: impl FnOnce(&mut TripPreferences)) {
        f(&mut lock(&self.state).preferences);
    }

    /// Returns the latest itinerary, verbatim.
    #[inline]
    pub fn itinerary(&self) -> Option<String> {
        lock(&self.state).itinerary.clone()
    }

    /// Returns the refinement being requested right now, if any.
    #[inline]
    pub fn pending_refinement(&self) -> Option<Refinement> {
        lock(&self.state).pending_refinement.clone()
    }

    /// Returns the current stage.
    #[inline]
    pub fn stage(&self) -> Stage {
        lock(&self.state).stage
    }

    /// Requests an itinerary for the current selections.
    pub async fn plan(&self) -> Result<String, PlanError> {
        let prompt = {
            let state = lock(&self.state);
            let prefs = &state.preferences;
            let Some(prompt) = initial_prompt(prefs) else {
                return Err(if prefs.interest.is_none() {
                    PlanError::MissingInterest
                } else {
                    PlanError::MissingDuration
                });
            };
            prompt
        };
        self.send(prompt, None).await
    }

    /// Requests a revision of the latest itinerary.
    ///
    /// The request quotes only the latest itinerary, not the selections or
    /// any earlier plan.
    pub async fn refine(
        &self,
        refinement: Refinement,
    ) -> Result<String, PlanError> {
        let prompt = {
            let state = lock(&self.state);
            let Some(itinerary) = &state.itinerary else {
                return Err(PlanError::NoItinerary);
            };
            refinement_prompt(&refinement, itinerary)
        };
        self.send(prompt, Some(refinement)).await
    }

    async fn send(
        &self,
        prompt: String,
        refinement: Option<Refinement>,
    ) -> Result<String, PlanError> {
        {
            let mut state = lock(&self.state);
            if state.stage.try_begin_send().is_err() {
                return Err(PlanError::Busy);
            }
            state.pending_refinement = refinement;
        }

        let request = ModelRequest::with_messages([
            Message::system(PLANNER_SYSTEM_PROMPT),
            Message::user(prompt),
        ]);
        let model_client = self.model_client.clone();
        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            let result = model_client.send_request(request).await;
            let mut state = lock(&state);
            state.pending_refinement = None;
            match result {
                Ok(resp) => {
                    state.itinerary = Some(resp.content.clone());
                    state.stage.finish(true);
                    Ok(resp.content)
                }
                Err(err) => {
                    debug!("failed to plan trip: {err}");
                    state.stage.finish(false);
                    Err(PlanError::Request(err))
                }
            }
        });
        task.await.expect("planner request task has panicked")
    }
}

//! Core logic of the GoNepal assistant: the chat widget, the itinerary
//! planner, and the plumbing between them and a model provider.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod chat;
pub mod conversation;
mod model_client;
pub mod planner;
mod stage;

use std::sync::{Mutex, MutexGuard};

pub use chat::{
    APOLOGY_MESSAGE, ChatWidget, ChatWidgetBuilder, DEFAULT_SYSTEM_PROMPT,
    Reply, SubmitError,
};
pub use planner::{PlanError, Planner};
pub use stage::Stage;

/// Locks a widget state.
///
/// The state is only touched between awaits and stays consistent even if a
/// holder panicked, so poisoning is ignored.
#[inline]
pub(crate) fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

//! The GoNepal travel assistant: a chat widget and a trip planner backed by
//! OpenRouter, plus a terminal renderer for their markdown replies.
//!
//! The crate includes a CLI for using in the terminal. And you can also use
//! it as a library to bring the assistant into your own host apps.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

pub mod render;
mod session;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`gonepal_core`] crate.
pub mod core {
    pub use gonepal_core::*;
}

/// Re-exports of [`gonepal_openrouter_model`] crate.
pub mod openrouter {
    pub use gonepal_openrouter_model::*;
}

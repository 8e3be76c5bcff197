//! Provider-neutral types for talking to a chat completion service.
//!
//! This crate fixes the shape of a chat request (an ordered transcript of
//! role-tagged messages) and of the completion that comes back, so that the
//! widgets in `gonepal-core` never depend on a concrete HTTP service.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the provider implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod response;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;

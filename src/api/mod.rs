//! # API Module
//!
//! HTTP endpoints served by the local callback server during the browser
//! login (see [`crate::server`]).
//!
//! - [`callback`] - Receives the authorization code from Spotify's
//!   authorization server, exchanges it for a token and hands the result to
//!   the waiting login through a one-shot channel. Only the first request is
//!   handled.
//! - [`health`] - Returns application status and version, handy to check that
//!   the callback server is reachable on the configured address.

mod callback;
mod health;

pub use callback::CallbackState;
pub use callback::callback;
pub use health::health;

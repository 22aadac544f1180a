//! persona-sim — persona synthesis and persona-grounded chat.
//!
//! Collects public-profile hints about a person, asks a hosted model to
//! synthesize a redacted persona profile, and drives a chat loop that
//! role-plays as that persona. The generation itself is delegated upstream;
//! this crate owns prompt assembly, redaction enforcement, session state,
//! and the terminal surface.
//!
//! See `DESIGN.md` for the component layout.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chat;
pub mod config;
pub mod logging;
pub mod persona;
pub mod providers;
pub mod session;

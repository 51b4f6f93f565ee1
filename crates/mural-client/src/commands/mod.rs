//! Command handlers.
//!
//! Each sub-module groups the handlers of one page region. Handlers take
//! their inputs as arguments, report failures through
//! [`AppContext::report`](crate::context::AppContext::report), and still
//! return the `Result` so callers and tests can inspect it.

pub mod account;
pub mod media;
pub mod reviews;
pub mod session;
pub mod settings;

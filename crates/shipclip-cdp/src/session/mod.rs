//! Per-tab CDP session.
//!
//! Split across files by concern:
//! - `core`: session struct and command dispatch
//! - `dom`: selector queries, attributes, waiting
//! - `js`: JavaScript evaluation and remote function calls

mod core;
mod dom;
mod js;

pub use core::TabSession;

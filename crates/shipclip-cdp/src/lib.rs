//! CDP transport for shipclip.
//!
//! Talks to a running Chrome/Chromium over the Chrome DevTools Protocol:
//!
//! ```text
//! ┌─────────────────┐    WebSocket     ┌──────────────────┐
//! │    shipclip     │ ◄──────────────► │   Chrome/Edge    │
//! │  (this crate)   │       CDP        │  (user's browser)│
//! └─────────────────┘                  └──────────────────┘
//! ```
//!
//! The browser must be started with remote debugging enabled
//! (`chrome --remote-debugging-port=9222`); shipclip attaches to the
//! user's existing tabs so logged-in sessions are preserved.
//!
//! This crate deliberately exposes only what the copy/paste pipelines
//! consume: endpoint discovery, tab attachment, selector queries, and
//! JavaScript execution against resolved nodes. There is no synthetic
//! input layer; the pipelines act on elements the way a content script
//! would, via `Runtime.callFunctionOn`.

mod client;
mod discovery;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use discovery::{fetch_pages, fetch_version};
pub use error::CdpError;
pub use protocol::{BrowserVersion, PageInfo, RemoteObject};
pub use session::TabSession;

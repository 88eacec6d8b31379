//! # queued-client
//!
//! A thread-safe client for the line-oriented TCP control protocol of a
//! media-queue daemon, with:
//! - Lazy connection and challenge-response authentication
//! - Pipelined command execution with strict request/response correlation
//! - A long-lived event-stream subscription with automatic reconnection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Callers                              │
//! │                  (Multiple Threads)                         │
//! └──────────┬─────────────────────────────────┬────────────────┘
//!            │ execute                         │ monitor
//! ┌──────────▼──────────┐             ┌────────▼────────┐
//! │  Pipelined Executor │             │  Event Stream   │
//! │ (send/receive lock) │             │   (EventSink)   │
//! └──────────┬──────────┘             └────────┬────────┘
//!            │                                 │
//! ┌──────────▼─────────────────────────────────▼────────────────┐
//! │                      Connection                             │
//! │              (TCP + challenge-response auth)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use queued_client::{Client, Config};
//!
//! # fn main() -> queued_client::Result<()> {
//! let config = Config::builder()
//!     .host("jukebox.example.com")
//!     .port(9599)
//!     .username("alice")
//!     .password("secret")
//!     .build();
//! let client = Client::new(config);
//! println!("server version {}", client.version()?);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod client;
pub mod event;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ClientError, Result};
pub use config::{AddressFamily, Config};
pub use client::Client;
pub use event::EventSink;
pub use protocol::{CommandKind, Origin, Request, Response, State, TrackInfo};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of queued-client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

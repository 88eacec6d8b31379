//! Network Module
//!
//! TCP connection establishment and authentication.
//!
//! ## Architecture
//! - One lazily-opened socket per client instance
//! - Split read/write halves handed to the executor's lock pair

mod connection;

pub use connection::Connection;
